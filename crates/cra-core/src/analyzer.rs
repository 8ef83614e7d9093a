//! Impact analysis orchestration
//!
//! Composes the pipeline stages into one record:
//! 1. Validate credentials (the only failure a caller can observe)
//! 2. Resolve the scenarios relevant to the agriculture type
//! 3. Aggregate provider data across those scenarios
//! 4. Compute the advisory
//! 5. Assemble the [`ImpactAnalysis`]

use crate::aggregator::ScenarioAggregator;
use crate::config::AnalysisConfig;
use crate::error::ConfigurationError;
use crate::recommendation::RecommendationEngine;
use crate::sensitivity::{SensitivityTable, DEFAULT_SCENARIOS};
use crate::source::ScenarioSource;
use crate::types::{Credentials, ImpactAnalysis, Location, ScenarioBatch, WarmingScenario};
use std::sync::Arc;

/// Runs niche-agriculture impact analyses
///
/// Owns the credentials for its lifetime and shares no mutable state
/// between calls.
#[derive(Debug, Clone)]
pub struct ImpactAnalyzer {
    /// Provider credentials
    credentials: Credentials,
    /// Agriculture type to scenarios
    sensitivity: SensitivityTable,
    /// Per-scenario fan-out
    aggregator: ScenarioAggregator,
    /// Advisory text
    engine: RecommendationEngine,
}

impl ImpactAnalyzer {
    /// Create analyzer with the standard sensitivity table
    #[inline]
    #[must_use]
    pub fn new(source: Arc<dyn ScenarioSource>, credentials: Credentials) -> Self {
        Self {
            credentials,
            sensitivity: SensitivityTable::default(),
            aggregator: ScenarioAggregator::new(source),
            engine: RecommendationEngine::new(),
        }
    }

    /// Create analyzer from analysis settings
    ///
    /// # Errors
    /// `ConfigurationError::InvalidSetting` if the settings are unusable.
    pub fn from_config(
        source: Arc<dyn ScenarioSource>,
        credentials: Credentials,
        config: &AnalysisConfig,
    ) -> Result<Self, ConfigurationError> {
        config.validate()?;
        Ok(Self {
            credentials,
            sensitivity: SensitivityTable::default().with_overrides(&config.sensitivity),
            aggregator: ScenarioAggregator::from_config(source, config),
            engine: RecommendationEngine::new(),
        })
    }

    /// With a different sensitivity table
    #[inline]
    #[must_use]
    pub fn with_sensitivity(mut self, sensitivity: SensitivityTable) -> Self {
        self.sensitivity = sensitivity;
        self
    }

    /// With a differently tuned aggregator
    #[inline]
    #[must_use]
    pub fn with_aggregator(mut self, aggregator: ScenarioAggregator) -> Self {
        self.aggregator = aggregator;
        self
    }

    /// Analyse climate risk for an agriculture type at a location
    ///
    /// # Returns
    /// A complete record; failed scenarios appear as `Err` entries in
    /// `climate_risks`.
    ///
    /// # Errors
    /// `ConfigurationError` if the credentials are incomplete. No request is
    /// made in that case.
    pub async fn analyze(
        &self,
        agriculture_type: &str,
        location: &Location,
    ) -> Result<ImpactAnalysis, ConfigurationError> {
        self.credentials.validate()?;
        tracing::info!(agriculture_type, location = %location, "analysing impact");

        let scenarios = self.sensitivity.resolve(agriculture_type);
        let climate_risks = self
            .aggregator
            .aggregate(location, &scenarios, &self.credentials)
            .await;
        let recommendation = self.engine.recommend(agriculture_type, &climate_risks);

        Ok(ImpactAnalysis::new(
            agriculture_type,
            location.clone(),
            climate_risks,
            recommendation,
        ))
    }

    /// Fetch caller-chosen scenarios for a location
    ///
    /// An empty list requests the default scenarios.
    ///
    /// # Errors
    /// `ConfigurationError` if the credentials are incomplete.
    pub async fn project(
        &self,
        location: &Location,
        scenarios: &[WarmingScenario],
    ) -> Result<ScenarioBatch, ConfigurationError> {
        self.credentials.validate()?;

        let defaults: Vec<WarmingScenario>;
        let scenarios = if scenarios.is_empty() {
            defaults = DEFAULT_SCENARIOS.into_iter().map(WarmingScenario::from).collect();
            &defaults
        } else {
            scenarios
        };

        tracing::info!(location = %location, count = scenarios.len(), "projecting scenarios");
        Ok(self
            .aggregator
            .aggregate(location, scenarios, &self.credentials)
            .await)
    }

    /// Sensitivity table in use
    #[inline]
    #[must_use]
    pub fn sensitivity(&self) -> &SensitivityTable {
        &self.sensitivity
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ClimateError;
    use crate::types::DatasetStatistic;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct CountingSource {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl ScenarioSource for CountingSource {
        async fn query(
            &self,
            _location: &Location,
            _scenario: &WarmingScenario,
            _credentials: &Credentials,
        ) -> Result<Vec<DatasetStatistic>, ClimateError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(Vec::new())
        }
    }

    #[tokio::test]
    async fn analyze_resolves_scenarios_for_type() {
        let source = Arc::new(CountingSource::default());
        let analyzer = ImpactAnalyzer::new(source.clone(), Credentials::new("id", "secret"));

        let analysis = analyzer
            .analyze("Ice_Wine", &Location::new("Niagara", "Canada"))
            .await
            .unwrap();

        let scenarios: Vec<_> = analysis
            .climate_risks()
            .scenarios()
            .map(WarmingScenario::as_str)
            .collect();
        assert_eq!(scenarios, vec!["2.0", "3.0"]);
        assert_eq!(analysis.agriculture_type(), "Ice_Wine");
        assert!(analysis.recommendation().to_lowercase().contains("ice wine"));
        assert_eq!(source.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn missing_secret_fails_before_any_query() {
        let source = Arc::new(CountingSource::default());
        let analyzer = ImpactAnalyzer::new(source.clone(), Credentials::new("id", ""));

        let result = analyzer
            .analyze("truffle", &Location::new("Alba", "Italy"))
            .await;

        assert_eq!(result, Err(ConfigurationError::MissingClientSecret));
        assert_eq!(source.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn project_defaults_when_no_scenarios_given() {
        let source = Arc::new(CountingSource::default());
        let analyzer = ImpactAnalyzer::new(source.clone(), Credentials::new("id", "secret"));

        let batch = analyzer
            .project(&Location::new("Mombasa", "Kenya"), &[])
            .await
            .unwrap();

        assert_eq!(batch.len(), 3);
        assert!(batch.contains("1.5") && batch.contains("2.0") && batch.contains("3.0"));
    }

    #[tokio::test]
    async fn project_rejects_missing_client_id() {
        let source = Arc::new(CountingSource::default());
        let analyzer = ImpactAnalyzer::new(source.clone(), Credentials::new(" ", "secret"));

        let result = analyzer
            .project(&Location::new("Mombasa", "Kenya"), &["1.5".into()])
            .await;
        assert_eq!(result, Err(ConfigurationError::MissingClientId));
        assert_eq!(source.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn from_config_rejects_invalid_settings() {
        let config = AnalysisConfig::new().with_max_concurrent_scenarios(0);
        let result = ImpactAnalyzer::from_config(
            Arc::new(CountingSource::default()),
            Credentials::new("id", "secret"),
            &config,
        );
        assert!(result.is_err());
    }
}
