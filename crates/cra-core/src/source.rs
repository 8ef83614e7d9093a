//! Seam between the pipeline and the dataset provider

use crate::error::ClimateError;
use crate::types::{Credentials, DatasetStatistic, Location, WarmingScenario};
use async_trait::async_trait;
use std::sync::Arc;

/// Anything able to fetch the statistics of one location and scenario
///
/// The HTTP implementation lives in `cra-client`; tests substitute
/// scripted sources.
#[async_trait]
pub trait ScenarioSource: Send + Sync {
    /// Fetch statistics for one location and warming scenario
    ///
    /// # Errors
    /// Any [`ClimateError`]; the aggregator records scenario-scoped errors
    /// in the batch instead of propagating them.
    async fn query(
        &self,
        location: &Location,
        scenario: &WarmingScenario,
        credentials: &Credentials,
    ) -> Result<Vec<DatasetStatistic>, ClimateError>;
}

#[async_trait]
impl<T: ScenarioSource + ?Sized> ScenarioSource for Arc<T> {
    async fn query(
        &self,
        location: &Location,
        scenario: &WarmingScenario,
        credentials: &Credentials,
    ) -> Result<Vec<DatasetStatistic>, ClimateError> {
        (**self).query(location, scenario, credentials).await
    }
}
