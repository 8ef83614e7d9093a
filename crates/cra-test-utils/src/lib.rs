//! Testing utilities for CRA workspace
//!
//! Shared fixtures, a scripted HTTP transport and an in-memory scenario
//! source.

#![allow(missing_docs)]

use async_trait::async_trait;
use cra_client::{ClientConfig, DatasetClient, HttpRequest, HttpResponse, Transport};
use cra_core::{ClimateError, Credentials, DatasetStatistic, Location, ScenarioSource, WarmingScenario};
use parking_lot::Mutex;
use serde_json::json;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

pub const TEST_TOKEN_URL: &str = "https://auth.test/oauth/token";
pub const TEST_API_URL: &str = "https://api.test";
pub const TEST_GRAPHQL_URL: &str = "https://api.test/graphql";
pub const TEST_TOKEN: &str = "test-token";

pub fn test_credentials() -> Credentials {
    Credentials::new("test-client", "test-secret")
}

pub fn test_config() -> ClientConfig {
    ClientConfig::new()
        .with_token_url(TEST_TOKEN_URL)
        .with_api_url(TEST_API_URL)
        .with_audience("https://api.test")
}

pub fn alba() -> Location {
    Location::new("Alba", "Italy")
}

/// Two plausible rows tagged with `scenario`
pub fn sample_statistics(scenario: &str) -> Vec<DatasetStatistic> {
    vec![
        DatasetStatistic {
            dataset_id: 40601,
            mid_value: 1.2,
            name: "Change in total annual precipitation".to_string(),
            unit: "mm".to_string(),
            warming_scenario: scenario.to_string(),
            latitude: 44.7,
            longitude: 8.03,
            info: String::new(),
        },
        DatasetStatistic {
            dataset_id: 40104,
            mid_value: 12.0,
            name: "Days above 32°C (90°F)".to_string(),
            unit: "days".to_string(),
            warming_scenario: scenario.to_string(),
            latitude: 44.7,
            longitude: 8.03,
            info: String::new(),
        },
    ]
}

/// Provider-shaped GraphQL body carrying `rows`
pub fn statistics_body(rows: &[DatasetStatistic]) -> String {
    let rows: Vec<_> = rows
        .iter()
        .map(|r| {
            json!({
                "datasetId": r.dataset_id,
                "midValue": r.mid_value.to_string(),
                "name": r.name,
                "unit": r.unit,
                "warmingScenario": r.warming_scenario,
                "latitude": r.latitude,
                "longitude": r.longitude,
                "info": r.info,
            })
        })
        .collect();
    json!({"data": {"getDatasetStatistics": {"datasetStatisticsResponses": rows}}}).to_string()
}

/// Scenario label bound into a GraphQL request, if any
pub fn scenario_of(request: &HttpRequest) -> Option<String> {
    request.body["variables"]["warmingScenario"]
        .as_str()
        .map(str::to_string)
}

type Responder = Box<dyn Fn(&HttpRequest) -> Result<HttpResponse, ClimateError> + Send + Sync>;

/// Transport answering from per-URL closures and recording every request
///
/// Requests to a URL without a route fail as transport errors.
#[derive(Default)]
pub struct ScriptedTransport {
    routes: HashMap<String, Responder>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Token and GraphQL routes of [`test_config`] answering successfully
    pub fn provider() -> Self {
        Self::new()
            .route(TEST_TOKEN_URL, |_| {
                Ok(HttpResponse::new(
                    200,
                    json!({"access_token": TEST_TOKEN, "token_type": "Bearer"}).to_string(),
                ))
            })
            .route(TEST_GRAPHQL_URL, |request| {
                let scenario = scenario_of(request).unwrap_or_default();
                Ok(HttpResponse::new(
                    200,
                    statistics_body(&sample_statistics(&scenario)),
                ))
            })
    }

    #[must_use]
    pub fn route(
        mut self,
        url: impl Into<String>,
        responder: impl Fn(&HttpRequest) -> Result<HttpResponse, ClimateError> + Send + Sync + 'static,
    ) -> Self {
        self.routes.insert(url.into(), Box::new(responder));
        self
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().len()
    }

    pub fn calls_to(&self, url: &str) -> usize {
        self.requests.lock().iter().filter(|r| r.url == url).count()
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().clone()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn post_json(&self, request: HttpRequest) -> Result<HttpResponse, ClimateError> {
        self.requests.lock().push(request.clone());
        match self.routes.get(&request.url) {
            Some(responder) => responder(&request),
            None => Err(ClimateError::transport(format!("no route for {}", request.url))),
        }
    }
}

/// Dataset client over `transport` configured with [`test_config`]
pub fn scripted_client(transport: Arc<ScriptedTransport>) -> DatasetClient {
    DatasetClient::new(transport, &test_config())
}

/// In-memory scenario source
///
/// Answers with fixed rows (or [`sample_statistics`] when none are set)
/// and fails the scenarios marked as failing.
#[derive(Default)]
pub struct StaticSource {
    rows: Option<Vec<DatasetStatistic>>,
    failing: HashSet<String>,
    queried: Mutex<Vec<WarmingScenario>>,
}

impl StaticSource {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_rows(mut self, rows: Vec<DatasetStatistic>) -> Self {
        self.rows = Some(rows);
        self
    }

    #[must_use]
    pub fn failing(mut self, scenario: &str) -> Self {
        self.failing.insert(scenario.to_string());
        self
    }

    pub fn call_count(&self) -> usize {
        self.queried.lock().len()
    }

    pub fn queried(&self) -> Vec<WarmingScenario> {
        self.queried.lock().clone()
    }
}

#[async_trait]
impl ScenarioSource for StaticSource {
    async fn query(
        &self,
        _location: &Location,
        scenario: &WarmingScenario,
        _credentials: &Credentials,
    ) -> Result<Vec<DatasetStatistic>, ClimateError> {
        self.queried.lock().push(scenario.clone());
        if self.failing.contains(scenario.as_str()) {
            return Err(ClimateError::http_status(500, "scenario unavailable"));
        }
        Ok(self
            .rows
            .clone()
            .unwrap_or_else(|| sample_statistics(scenario.as_str())))
    }
}
