//! Scenario aggregation
//!
//! Runs one provider query per warming scenario:
//! - Bounded parallelism (a limit of 1 gives strictly sequential requests)
//! - Each scenario in its own task, so a panic stays local
//! - Failures recorded per scenario, never propagated
//! - Results merged in request order once every task has finished
//! - Dropping the aggregate future aborts the scenario tasks still running

use crate::config::AnalysisConfig;
use crate::error::ClimateError;
use crate::source::ScenarioSource;
use crate::types::{Credentials, Location, ScenarioBatch, ScenarioResult, WarmingScenario};
use futures::stream::{self, StreamExt};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::Instrument;

/// Default number of scenarios fetched at the same time
pub const DEFAULT_MAX_CONCURRENT: usize = 4;

/// Fans a location out over warming scenarios
#[derive(Clone)]
pub struct ScenarioAggregator {
    /// Provider access
    source: Arc<dyn ScenarioSource>,
    /// Maximum in-flight scenarios
    max_concurrent: usize,
    /// Optional bound per scenario
    scenario_timeout: Option<Duration>,
}

impl std::fmt::Debug for ScenarioAggregator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScenarioAggregator")
            .field("max_concurrent", &self.max_concurrent)
            .field("scenario_timeout", &self.scenario_timeout)
            .finish_non_exhaustive()
    }
}

impl ScenarioAggregator {
    /// Create new aggregator over a provider
    #[inline]
    #[must_use]
    pub fn new(source: Arc<dyn ScenarioSource>) -> Self {
        Self {
            source,
            max_concurrent: DEFAULT_MAX_CONCURRENT,
            scenario_timeout: None,
        }
    }

    /// Create aggregator from analysis settings
    #[must_use]
    pub fn from_config(source: Arc<dyn ScenarioSource>, config: &AnalysisConfig) -> Self {
        let aggregator = Self::new(source).with_max_concurrent(config.max_concurrent_scenarios);
        match config.scenario_timeout() {
            Some(limit) => aggregator.with_scenario_timeout(limit),
            None => aggregator,
        }
    }

    /// With max in-flight scenarios (at least 1)
    #[inline]
    #[must_use]
    pub fn with_max_concurrent(mut self, max: usize) -> Self {
        self.max_concurrent = max.max(1);
        self
    }

    /// With a per-scenario timeout
    #[inline]
    #[must_use]
    pub fn with_scenario_timeout(mut self, limit: Duration) -> Self {
        self.scenario_timeout = Some(limit);
        self
    }

    /// Max in-flight scenarios
    #[inline]
    #[must_use]
    pub fn max_concurrent(&self) -> usize {
        self.max_concurrent
    }

    /// Query every scenario and collect the outcomes
    ///
    /// Every requested scenario gets exactly one entry (duplicates collapse
    /// to one). This never fails: errors are stored as `Err` entries.
    ///
    /// # Arguments
    /// * `location` - Place to query
    /// * `scenarios` - Scenario labels in request order
    /// * `credentials` - Passed through to the provider
    pub async fn aggregate(
        &self,
        location: &Location,
        scenarios: &[WarmingScenario],
        credentials: &Credentials,
    ) -> ScenarioBatch {
        let span = tracing::info_span!(
            "aggregate",
            location = %location,
            scenarios = scenarios.len(),
            max_concurrent = self.max_concurrent
        );

        async move {
            let outcomes: Vec<(WarmingScenario, ScenarioResult)> =
                stream::iter(scenarios.iter().cloned())
                    .map(|scenario| {
                        self.spawn_scenario(location.clone(), scenario, credentials.clone())
                    })
                    .buffered(self.max_concurrent)
                    .collect()
                    .await;

            let batch: ScenarioBatch = outcomes.into_iter().collect();
            tracing::info!(
                ok = batch.ok_count(),
                failed = batch.err_count(),
                "scenario batch complete"
            );
            batch
        }
        .instrument(span)
        .await
    }

    /// Start one scenario task; the returned future yields its outcome
    fn spawn_scenario(
        &self,
        location: Location,
        scenario: WarmingScenario,
        credentials: Credentials,
    ) -> impl Future<Output = (WarmingScenario, ScenarioResult)> {
        let source = Arc::clone(&self.source);
        let limit = self.scenario_timeout;
        let span = tracing::debug_span!("scenario", scenario = %scenario);
        let task_scenario = scenario.clone();

        let mut task = AbortOnDrop(tokio::spawn(
            async move { run_scenario(&*source, &location, &task_scenario, &credentials, limit).await }
                .instrument(span),
        ));

        async move {
            let result = match (&mut task.0).await {
                Ok(result) => result,
                Err(join_error) => {
                    tracing::error!(scenario = %scenario, "scenario task aborted: {join_error}");
                    Err(format!("scenario task aborted: {join_error}"))
                }
            };
            (scenario, result)
        }
    }
}

/// Aborts the scenario task when its outcome is no longer awaited
struct AbortOnDrop(JoinHandle<ScenarioResult>);

impl Drop for AbortOnDrop {
    fn drop(&mut self) {
        self.0.abort();
    }
}

/// Query one scenario and convert the outcome into a batch entry
async fn run_scenario(
    source: &dyn ScenarioSource,
    location: &Location,
    scenario: &WarmingScenario,
    credentials: &Credentials,
    limit: Option<Duration>,
) -> ScenarioResult {
    let query = source.query(location, scenario, credentials);
    let outcome = match limit {
        Some(limit) => tokio::time::timeout(limit, query).await.unwrap_or_else(|_| {
            Err(ClimateError::transport(format!(
                "scenario timed out after {limit:?}"
            )))
        }),
        None => query.await,
    };

    match outcome {
        Ok(rows) => {
            tracing::debug!(rows = rows.len(), "scenario retrieved");
            Ok(rows)
        }
        Err(e) => {
            tracing::warn!(error = %e, "scenario failed");
            Err(e.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::DatasetStatistic;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Fails for one label, panics for another, succeeds otherwise
    #[derive(Default)]
    struct ScriptedSource {
        calls: AtomicUsize,
        in_flight: AtomicUsize,
        peak: AtomicUsize,
        finished: AtomicUsize,
    }

    #[async_trait]
    impl ScenarioSource for ScriptedSource {
        async fn query(
            &self,
            _location: &Location,
            scenario: &WarmingScenario,
            _credentials: &Credentials,
        ) -> Result<Vec<DatasetStatistic>, ClimateError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(5)).await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);

            match scenario.as_str() {
                "fail" => return Err(ClimateError::http_status(500, "upstream error")),
                "panic" => panic!("provider exploded"),
                "slow" => {
                    tokio::time::sleep(Duration::from_secs(5)).await;
                }
                "lagging" => tokio::time::sleep(Duration::from_millis(200)).await,
                _ => {}
            }
            self.finished.fetch_add(1, Ordering::SeqCst);
            Ok(Vec::new())
        }
    }

    fn labels(labels: &[&str]) -> Vec<WarmingScenario> {
        labels.iter().copied().map(WarmingScenario::from).collect()
    }

    fn location() -> Location {
        Location::new("Alba", "Italy")
    }

    fn credentials() -> Credentials {
        Credentials::new("id", "secret")
    }

    #[tokio::test]
    async fn one_failure_does_not_abort_batch() {
        let aggregator = ScenarioAggregator::new(Arc::new(ScriptedSource::default()));
        let batch = aggregator
            .aggregate(&location(), &labels(&["1.5", "fail", "3.0"]), &credentials())
            .await;

        assert_eq!(batch.len(), 3);
        assert_eq!(batch.ok_count(), 2);
        assert_eq!(batch.err_count(), 1);
        let message = batch["fail"].as_ref().unwrap_err();
        assert!(message.contains("HTTP 500"), "{message}");
    }

    #[tokio::test]
    async fn panicking_scenario_is_recorded() {
        let aggregator = ScenarioAggregator::new(Arc::new(ScriptedSource::default()));
        let batch = aggregator
            .aggregate(&location(), &labels(&["panic", "2.0"]), &credentials())
            .await;

        assert_eq!(batch.len(), 2);
        assert!(batch["panic"].as_ref().unwrap_err().contains("aborted"));
        assert!(batch["2.0"].is_ok());
    }

    #[tokio::test]
    async fn results_keep_request_order() {
        let aggregator =
            ScenarioAggregator::new(Arc::new(ScriptedSource::default())).with_max_concurrent(3);
        let requested = labels(&["4.0", "1.5", "fail", "2.5"]);
        let batch = aggregator
            .aggregate(&location(), &requested, &credentials())
            .await;

        let order: Vec<_> = batch.scenarios().cloned().collect();
        assert_eq!(order, requested);
    }

    #[tokio::test]
    async fn concurrency_is_bounded() {
        let source = Arc::new(ScriptedSource::default());
        let aggregator = ScenarioAggregator::new(source.clone()).with_max_concurrent(2);
        aggregator
            .aggregate(
                &location(),
                &labels(&["1", "2", "3", "4", "5", "6"]),
                &credentials(),
            )
            .await;

        assert_eq!(source.calls.load(Ordering::SeqCst), 6);
        assert!(source.peak.load(Ordering::SeqCst) <= 2);
    }

    #[tokio::test]
    async fn sequential_when_limit_is_one() {
        let source = Arc::new(ScriptedSource::default());
        let aggregator = ScenarioAggregator::new(source.clone()).with_max_concurrent(0);
        assert_eq!(aggregator.max_concurrent(), 1);

        aggregator
            .aggregate(&location(), &labels(&["1.5", "2.0", "3.0"]), &credentials())
            .await;
        assert_eq!(source.peak.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn timeout_is_scenario_scoped() {
        let aggregator = ScenarioAggregator::new(Arc::new(ScriptedSource::default()))
            .with_scenario_timeout(Duration::from_millis(100));
        let batch = aggregator
            .aggregate(&location(), &labels(&["slow", "1.5"]), &credentials())
            .await;

        assert!(batch["slow"].as_ref().unwrap_err().contains("timed out"));
        assert!(batch["1.5"].is_ok());
    }

    #[tokio::test]
    async fn cancelled_aggregate_stops_queries() {
        let source = Arc::new(ScriptedSource::default());
        let aggregator = ScenarioAggregator::new(source.clone());
        let requested = labels(&["lagging", "lagging", "lagging"]);

        let outcome = tokio::time::timeout(
            Duration::from_millis(50),
            aggregator.aggregate(&location(), &requested, &credentials()),
        )
        .await;
        assert!(outcome.is_err());

        tokio::time::sleep(Duration::from_millis(400)).await;
        assert_eq!(source.calls.load(Ordering::SeqCst), 3);
        assert_eq!(source.finished.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn duplicate_scenarios_collapse() {
        let source = Arc::new(ScriptedSource::default());
        let aggregator = ScenarioAggregator::new(source.clone());
        let batch = aggregator
            .aggregate(&location(), &labels(&["2.0", "2.0"]), &credentials())
            .await;

        assert_eq!(batch.len(), 1);
        assert_eq!(source.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn empty_request_gives_empty_batch() {
        let aggregator = ScenarioAggregator::new(Arc::new(ScriptedSource::default()));
        let batch = aggregator.aggregate(&location(), &[], &credentials()).await;
        assert!(batch.is_empty());
    }
}
