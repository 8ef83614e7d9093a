//! Analysis configuration

use crate::error::ConfigurationError;
use crate::sensitivity::SensitivityOverrides;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Settings for the aggregation and analysis stages
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Scenarios fetched at the same time (1 = strictly sequential)
    pub max_concurrent_scenarios: usize,
    /// Upper bound for one scenario's token + data round trips
    pub scenario_timeout_secs: Option<u64>,
    /// Sensitivity table overrides
    pub sensitivity: SensitivityOverrides,
}

impl AnalysisConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With max concurrent scenarios
    #[inline]
    #[must_use]
    pub fn with_max_concurrent_scenarios(mut self, max: usize) -> Self {
        self.max_concurrent_scenarios = max;
        self
    }

    /// With per-scenario timeout
    #[inline]
    #[must_use]
    pub fn with_scenario_timeout_secs(mut self, secs: u64) -> Self {
        self.scenario_timeout_secs = Some(secs);
        self
    }

    /// Per-scenario timeout as a duration
    #[inline]
    #[must_use]
    pub fn scenario_timeout(&self) -> Option<Duration> {
        self.scenario_timeout_secs.map(Duration::from_secs)
    }

    /// Reject unusable values
    ///
    /// # Errors
    /// `ConfigurationError::InvalidSetting` for a zero concurrency limit or
    /// a zero timeout.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.max_concurrent_scenarios == 0 {
            return Err(ConfigurationError::invalid(
                "max_concurrent_scenarios",
                "must be at least 1",
            ));
        }
        if self.scenario_timeout_secs == Some(0) {
            return Err(ConfigurationError::invalid(
                "scenario_timeout_secs",
                "must be greater than zero",
            ));
        }
        Ok(())
    }
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            max_concurrent_scenarios: 4,
            scenario_timeout_secs: None,
            sensitivity: SensitivityOverrides::default(),
        }
    }
}
