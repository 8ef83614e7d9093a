//! Dataset statistics query construction
//!
//! The GraphQL document is constant. Location strings and the scenario
//! label travel as variables and are escaped by the JSON encoder, so
//! quotes or braces in an address cannot alter the query.

use cra_core::{Location, WarmingScenario};
use serde::Serialize;

/// Fields requested for every statistic row
pub const STATISTIC_FIELDS: [&str; 8] = [
    "datasetId",
    "midValue",
    "name",
    "unit",
    "warmingScenario",
    "latitude",
    "longitude",
    "info",
];

/// Dataset statistics mutation
pub const DATASET_STATISTICS_MUTATION: &str = "\
mutation GetDatasetStatistics($country: String!, $address: String!, $warmingScenario: String!) {
  getDatasetStatistics(input: { country: $country, address: $address, warmingScenario: $warmingScenario }) {
    datasetStatisticsResponses {
      datasetId
      midValue
      name
      unit
      warmingScenario
      latitude
      longitude
      info
    }
  }
}";

/// Variables bound into [`DATASET_STATISTICS_MUTATION`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryVariables {
    /// Location country
    pub country: String,
    /// Location address
    pub address: String,
    /// Scenario label
    pub warming_scenario: String,
}

/// Request body for the GraphQL endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QueryPayload {
    /// GraphQL document
    pub query: &'static str,
    /// Bound variables
    pub variables: QueryVariables,
}

/// Builds dataset statistics payloads
#[derive(Debug, Clone, Copy, Default)]
pub struct DatasetQueryBuilder;

impl DatasetQueryBuilder {
    /// Create new builder
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Payload for one location and scenario
    #[must_use]
    pub fn build(&self, location: &Location, scenario: &WarmingScenario) -> QueryPayload {
        QueryPayload {
            query: DATASET_STATISTICS_MUTATION,
            variables: QueryVariables {
                country: location.country().to_string(),
                address: location.address().to_string(),
                warming_scenario: scenario.as_str().to_string(),
            },
        }
    }
}
