//! Agriculture sensitivity table
//!
//! Maps an agriculture type to the warming scenarios relevant to its risk
//! assessment. Lookups are case-insensitive and unknown types fall back to
//! the default scenario list.

use crate::types::WarmingScenario;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Scenarios requested for an unknown agriculture type
pub const DEFAULT_SCENARIOS: [&str; 3] = ["1.5", "2.0", "3.0"];

/// Agriculture types with a dedicated sensitivity profile and advisory
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KnownCrop {
    /// Truffles: very sensitive to warming
    Truffle,
    /// Ice wine: depends on reliable hard frosts
    IceWine,
    /// Saffron: narrow flowering temperature window
    Saffron,
}

impl KnownCrop {
    /// All known crops
    pub const ALL: [KnownCrop; 3] = [KnownCrop::Truffle, KnownCrop::IceWine, KnownCrop::Saffron];

    /// Match a caller-supplied agriculture type, ignoring case
    #[must_use]
    pub fn parse(agriculture_type: &str) -> Option<Self> {
        let key = agriculture_type.to_lowercase();
        Self::ALL.into_iter().find(|crop| crop.key() == key)
    }

    /// Lower-case lookup key
    #[inline]
    #[must_use]
    pub fn key(self) -> &'static str {
        match self {
            KnownCrop::Truffle => "truffle",
            KnownCrop::IceWine => "ice_wine",
            KnownCrop::Saffron => "saffron",
        }
    }

    /// Scenarios relevant to this crop
    #[inline]
    #[must_use]
    pub fn scenarios(self) -> &'static [&'static str] {
        match self {
            KnownCrop::Truffle => &["3.0", "4.0"],
            KnownCrop::IceWine => &["2.0", "3.0"],
            KnownCrop::Saffron => &["2.5", "3.5"],
        }
    }
}

/// Table override as written in configuration files
///
/// ```toml
/// [analysis.sensitivity]
/// default = ["1.5", "2.0"]
///
/// [analysis.sensitivity.entries]
/// hops = ["2.0", "3.0"]
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SensitivityOverrides {
    /// Replacement for the fallback list
    pub default: Option<Vec<String>>,
    /// Extra or replaced per-type entries
    pub entries: HashMap<String, Vec<String>>,
}

/// Sensitivity lookup table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SensitivityTable {
    entries: HashMap<String, Vec<WarmingScenario>>,
    fallback: Vec<WarmingScenario>,
}

impl SensitivityTable {
    /// Create the standard table
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a table with no entries and the given fallback
    #[must_use]
    pub fn empty<S: Into<WarmingScenario>>(fallback: impl IntoIterator<Item = S>) -> Self {
        Self {
            entries: HashMap::new(),
            fallback: fallback.into_iter().map(Into::into).collect(),
        }
    }

    /// With an entry for an agriculture type (replaces any existing one)
    #[must_use]
    pub fn with_entry<S: Into<WarmingScenario>>(
        mut self,
        agriculture_type: &str,
        scenarios: impl IntoIterator<Item = S>,
    ) -> Self {
        self.entries.insert(
            agriculture_type.to_lowercase(),
            scenarios.into_iter().map(Into::into).collect(),
        );
        self
    }

    /// With a different fallback list
    #[must_use]
    pub fn with_fallback<S: Into<WarmingScenario>>(
        mut self,
        scenarios: impl IntoIterator<Item = S>,
    ) -> Self {
        self.fallback = scenarios.into_iter().map(Into::into).collect();
        self
    }

    /// Apply configuration overrides on top of this table
    #[must_use]
    pub fn with_overrides(mut self, overrides: &SensitivityOverrides) -> Self {
        if let Some(default) = &overrides.default {
            self = self.with_fallback(default.iter().map(String::as_str));
        }
        for (agriculture_type, scenarios) in &overrides.entries {
            self = self.with_entry(agriculture_type, scenarios.iter().map(String::as_str));
        }
        self
    }

    /// Scenarios to request for an agriculture type
    ///
    /// Never fails: unknown types get the fallback list.
    #[must_use]
    pub fn resolve(&self, agriculture_type: &str) -> Vec<WarmingScenario> {
        let scenarios = self
            .entries
            .get(&agriculture_type.to_lowercase())
            .unwrap_or(&self.fallback)
            .clone();
        tracing::debug!(
            agriculture_type,
            count = scenarios.len(),
            "resolved sensitivity scenarios"
        );
        scenarios
    }

    /// Fallback list for unknown types
    #[inline]
    #[must_use]
    pub fn fallback(&self) -> &[WarmingScenario] {
        &self.fallback
    }
}

impl Default for SensitivityTable {
    fn default() -> Self {
        KnownCrop::ALL
            .into_iter()
            .fold(Self::empty(DEFAULT_SCENARIOS), |table, crop| {
                table.with_entry(crop.key(), crop.scenarios().iter().copied())
            })
    }
}
