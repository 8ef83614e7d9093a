//! Dataset statistics client
//!
//! One call = one token exchange + one GraphQL request.

use crate::config::ClientConfig;
use crate::query::DatasetQueryBuilder;
use crate::token::TokenProvider;
use crate::transport::{HttpRequest, ReqwestTransport, Transport};
use async_trait::async_trait;
use cra_core::{
    ClimateError, ConfigurationError, Credentials, DatasetStatistic, Location, ScenarioSource,
    WarmingScenario,
};
use serde::Deserialize;
use std::fmt;
use std::sync::Arc;

#[derive(Deserialize)]
struct GraphQlResponse {
    data: Option<StatisticsData>,
    #[serde(default)]
    errors: Vec<GraphQlError>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct StatisticsData {
    get_dataset_statistics: Option<StatisticsPayload>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct StatisticsPayload {
    dataset_statistics_responses: Option<Vec<DatasetStatistic>>,
}

#[derive(Deserialize)]
struct GraphQlError {
    message: String,
}

/// Authenticated client for the dataset statistics endpoint
#[derive(Clone)]
pub struct DatasetClient {
    transport: Arc<dyn Transport>,
    tokens: TokenProvider,
    builder: DatasetQueryBuilder,
    graphql_url: String,
}

impl fmt::Debug for DatasetClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatasetClient")
            .field("graphql_url", &self.graphql_url)
            .field("tokens", &self.tokens)
            .finish_non_exhaustive()
    }
}

impl DatasetClient {
    /// Create client over any transport
    #[must_use]
    pub fn new(transport: Arc<dyn Transport>, config: &ClientConfig) -> Self {
        Self {
            tokens: TokenProvider::new(Arc::clone(&transport), config),
            transport,
            builder: DatasetQueryBuilder::new(),
            graphql_url: config.graphql_url(),
        }
    }

    /// Create client over HTTP
    ///
    /// # Errors
    /// `ConfigurationError` if the settings are invalid or the HTTP client
    /// cannot be built.
    pub fn from_config(config: &ClientConfig) -> Result<Self, ConfigurationError> {
        config.validate()?;
        let transport = ReqwestTransport::new(config.request_timeout())?;
        Ok(Self::new(Arc::new(transport), config))
    }

    /// Fetch statistics for one location and scenario
    ///
    /// # Errors
    /// - Any [`TokenProvider::fetch`] error
    /// - `ClimateError::Transport` on a non-success status or no response
    /// - `ClimateError::Protocol` if the body is not the expected response
    pub async fn query(
        &self,
        location: &Location,
        scenario: &WarmingScenario,
        credentials: &Credentials,
    ) -> Result<Vec<DatasetStatistic>, ClimateError> {
        let token = self.tokens.fetch(credentials).await?;
        let payload = self.builder.build(location, scenario);
        let request =
            HttpRequest::json(self.graphql_url.as_str(), &payload)?.with_bearer(token.value());

        tracing::debug!(
            endpoint = %self.graphql_url,
            location = %location,
            scenario = %scenario,
            "querying dataset statistics"
        );
        let response = self.transport.post_json(request).await?;
        if !response.is_success() {
            return Err(ClimateError::http_status(response.status, response.excerpt()));
        }

        parse_statistics(&response.body)
    }
}

#[async_trait]
impl ScenarioSource for DatasetClient {
    async fn query(
        &self,
        location: &Location,
        scenario: &WarmingScenario,
        credentials: &Credentials,
    ) -> Result<Vec<DatasetStatistic>, ClimateError> {
        DatasetClient::query(self, location, scenario, credentials).await
    }
}

/// Extract statistic rows from a GraphQL response body
fn parse_statistics(body: &str) -> Result<Vec<DatasetStatistic>, ClimateError> {
    let response: GraphQlResponse = serde_json::from_str(body)
        .map_err(|e| ClimateError::Protocol(format!("invalid statistics response: {e}")))?;

    let errors = response
        .errors
        .iter()
        .map(|e| e.message.as_str())
        .collect::<Vec<_>>()
        .join("; ");

    let Some(payload) = response.data.and_then(|d| d.get_dataset_statistics) else {
        return Err(ClimateError::Protocol(if errors.is_empty() {
            "response has no getDatasetStatistics data".to_string()
        } else {
            format!("provider reported errors: {errors}")
        }));
    };

    if !errors.is_empty() {
        tracing::warn!(errors = %errors, "provider returned partial data with errors");
    }

    Ok(payload.dataset_statistics_responses.unwrap_or_default())
}
