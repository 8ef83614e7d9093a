//! Core types for CRA
//!
//! Defines the fundamental values flowing through the pipeline:
//! - Locations, warming scenarios and credentials
//! - Dataset statistics returned by the provider
//! - Per-scenario batches and the final impact analysis

use crate::error::ConfigurationError;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;
use std::ops::Index;

/// Named place an analysis is run for
///
/// Values are forwarded to the provider as given; an unknown place surfaces
/// as whatever error the provider returns.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Location {
    address: String,
    country: String,
}

impl Location {
    /// Create new location
    #[inline]
    #[must_use]
    pub fn new(address: impl Into<String>, country: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            country: country.into(),
        }
    }

    /// Street address, town or region
    #[inline]
    #[must_use]
    pub fn address(&self) -> &str {
        &self.address
    }

    /// Country name
    #[inline]
    #[must_use]
    pub fn country(&self) -> &str {
        &self.country
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, {}", self.address, self.country)
    }
}

/// Warming scenario label in degrees Celsius (`"1.5"`, `"2.0"`, ...)
///
/// Opaque key: compared and looked up as a string, never parsed.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WarmingScenario(String);

impl WarmingScenario {
    /// Create new scenario label
    #[inline]
    #[must_use]
    pub fn new(label: impl Into<String>) -> Self {
        Self(label.into())
    }

    /// Label as sent to the provider
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for WarmingScenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for WarmingScenario {
    fn from(label: &str) -> Self {
        Self::new(label)
    }
}

impl From<String> for WarmingScenario {
    fn from(label: String) -> Self {
        Self(label)
    }
}

impl Borrow<str> for WarmingScenario {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// Client credentials for the provider's identity service
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    client_id: String,
    client_secret: String,
}

impl Credentials {
    /// Create new credentials
    #[inline]
    #[must_use]
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
        }
    }

    /// Client identifier
    #[inline]
    #[must_use]
    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    /// Client secret
    #[inline]
    #[must_use]
    pub fn client_secret(&self) -> &str {
        &self.client_secret
    }

    /// Check both fields are present
    ///
    /// # Errors
    /// - `ConfigurationError::MissingClientId` if the id is blank
    /// - `ConfigurationError::MissingClientSecret` if the secret is blank
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.client_id.trim().is_empty() {
            return Err(ConfigurationError::MissingClientId);
        }
        if self.client_secret.trim().is_empty() {
            return Err(ConfigurationError::MissingClientSecret);
        }
        Ok(())
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .finish()
    }
}

/// One climate statistic row returned by the provider
///
/// Deserializes from the provider's camelCase field names as well as the
/// snake_case names this type serializes to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetStatistic {
    /// Provider dataset identifier
    #[serde(alias = "datasetId", deserialize_with = "lenient::integer")]
    pub dataset_id: i64,
    /// Middle value of the projected range
    #[serde(alias = "midValue", deserialize_with = "lenient::number")]
    pub mid_value: f64,
    /// Dataset name
    #[serde(default, deserialize_with = "lenient::text")]
    pub name: String,
    /// Unit of `mid_value`
    #[serde(default, deserialize_with = "lenient::text")]
    pub unit: String,
    /// Scenario the row was computed for
    #[serde(alias = "warmingScenario", deserialize_with = "lenient::text")]
    pub warming_scenario: String,
    /// Latitude of the resolved location
    #[serde(deserialize_with = "lenient::number")]
    pub latitude: f64,
    /// Longitude of the resolved location
    #[serde(deserialize_with = "lenient::number")]
    pub longitude: f64,
    /// Free-form provider notes
    #[serde(default, deserialize_with = "lenient::text")]
    pub info: String,
}

/// Outcome for one scenario: the retrieved rows or the failure message
pub type ScenarioResult = Result<Vec<DatasetStatistic>, String>;

/// Ordered per-scenario outcomes for one request
///
/// Keys keep the order scenarios were requested in. Inserting a key twice
/// keeps its first position and the last value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScenarioBatch(IndexMap<WarmingScenario, ScenarioResult>);

impl ScenarioBatch {
    /// Create empty batch
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the outcome for a scenario, returning any previous outcome
    pub fn insert(
        &mut self,
        scenario: WarmingScenario,
        result: ScenarioResult,
    ) -> Option<ScenarioResult> {
        self.0.insert(scenario, result)
    }

    /// Outcome for a scenario label
    #[inline]
    #[must_use]
    pub fn get(&self, scenario: &str) -> Option<&ScenarioResult> {
        self.0.get(scenario)
    }

    /// Whether an outcome was recorded for the label
    #[inline]
    #[must_use]
    pub fn contains(&self, scenario: &str) -> bool {
        self.0.contains_key(scenario)
    }

    /// Number of scenarios recorded
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no scenario was recorded
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate outcomes in request order
    pub fn iter(&self) -> impl Iterator<Item = (&WarmingScenario, &ScenarioResult)> {
        self.0.iter()
    }

    /// Scenario labels in request order
    pub fn scenarios(&self) -> impl Iterator<Item = &WarmingScenario> {
        self.0.keys()
    }

    /// Scenarios whose data was retrieved
    #[must_use]
    pub fn ok_count(&self) -> usize {
        self.0.values().filter(|r| r.is_ok()).count()
    }

    /// Scenarios that failed
    #[must_use]
    pub fn err_count(&self) -> usize {
        self.0.values().filter(|r| r.is_err()).count()
    }

    /// Failed scenarios with their messages, in request order
    pub fn failures(&self) -> impl Iterator<Item = (&WarmingScenario, &str)> {
        self.0
            .iter()
            .filter_map(|(s, r)| r.as_ref().err().map(|e| (s, e.as_str())))
    }
}

impl Index<&str> for ScenarioBatch {
    type Output = ScenarioResult;

    fn index(&self, scenario: &str) -> &Self::Output {
        &self.0[scenario]
    }
}

impl FromIterator<(WarmingScenario, ScenarioResult)> for ScenarioBatch {
    fn from_iter<I: IntoIterator<Item = (WarmingScenario, ScenarioResult)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a ScenarioBatch {
    type Item = (&'a WarmingScenario, &'a ScenarioResult);
    type IntoIter = indexmap::map::Iter<'a, WarmingScenario, ScenarioResult>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Result of one niche-agriculture impact analysis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImpactAnalysis {
    agriculture_type: String,
    location: Location,
    climate_risks: ScenarioBatch,
    recommendation: String,
}

impl ImpactAnalysis {
    /// Assemble an analysis record
    #[inline]
    #[must_use]
    pub fn new(
        agriculture_type: impl Into<String>,
        location: Location,
        climate_risks: ScenarioBatch,
        recommendation: impl Into<String>,
    ) -> Self {
        Self {
            agriculture_type: agriculture_type.into(),
            location,
            climate_risks,
            recommendation: recommendation.into(),
        }
    }

    /// Agriculture type as requested by the caller
    #[inline]
    #[must_use]
    pub fn agriculture_type(&self) -> &str {
        &self.agriculture_type
    }

    /// Analysed location
    #[inline]
    #[must_use]
    pub fn location(&self) -> &Location {
        &self.location
    }

    /// Per-scenario outcomes
    #[inline]
    #[must_use]
    pub fn climate_risks(&self) -> &ScenarioBatch {
        &self.climate_risks
    }

    /// Advisory text
    #[inline]
    #[must_use]
    pub fn recommendation(&self) -> &str {
        &self.recommendation
    }
}

/// The provider serializes some numbers as strings and sometimes sends
/// `info` as an object or null.
mod lenient {
    use serde::de::Error;
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;

    pub(super) fn number<'de, D: Deserializer<'de>>(d: D) -> Result<f64, D::Error> {
        match Value::deserialize(d)? {
            Value::Number(n) => n
                .as_f64()
                .ok_or_else(|| D::Error::custom("number out of range")),
            Value::String(s) => s
                .trim()
                .parse()
                .map_err(|_| D::Error::custom(format!("expected a number, found {s:?}"))),
            other => Err(D::Error::custom(format!("expected a number, found {other}"))),
        }
    }

    pub(super) fn integer<'de, D: Deserializer<'de>>(d: D) -> Result<i64, D::Error> {
        match Value::deserialize(d)? {
            Value::Number(n) => n
                .as_i64()
                .ok_or_else(|| D::Error::custom(format!("expected an integer, found {n}"))),
            Value::String(s) => s
                .trim()
                .parse()
                .map_err(|_| D::Error::custom(format!("expected an integer, found {s:?}"))),
            other => Err(D::Error::custom(format!(
                "expected an integer, found {other}"
            ))),
        }
    }

    pub(super) fn text<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
        Ok(match Value::deserialize(d)? {
            Value::String(s) => s,
            Value::Null => String::new(),
            Value::Number(n) => n.to_string(),
            other => other.to_string(),
        })
    }
}
