//! CRA Core - Climate Risk Assistant
//!
//! The scenario acquisition and aggregation pipeline:
//! - Resolves the warming scenarios relevant to an agriculture type
//! - Queries the dataset provider once per scenario, isolating failures
//! - Merges outcomes into an ordered per-scenario batch
//! - Derives an advisory and assembles the impact analysis
//!
//! # Example
//!
//! ```rust,ignore
//! use cra_core::{Credentials, ImpactAnalyzer, Location};
//!
//! # async fn example(source: std::sync::Arc<dyn cra_core::ScenarioSource>) -> Result<(), Box<dyn std::error::Error>> {
//! let analyzer = ImpactAnalyzer::new(source, Credentials::new("id", "secret"));
//! let analysis = analyzer.analyze("truffle", &Location::new("Alba", "Italy")).await?;
//!
//! for (scenario, outcome) in analysis.climate_risks() {
//!     match outcome {
//!         Ok(rows) => println!("{scenario}: {} statistics", rows.len()),
//!         Err(e) => println!("{scenario}: unavailable ({e})"),
//!     }
//! }
//! # Ok(())
//! # }
//! ```

#![warn(unreachable_pub)]

// Core modules
pub mod aggregator;
pub mod analyzer;
pub mod config;
pub mod error;
pub mod recommendation;
pub mod report;
pub mod sensitivity;
pub mod source;
pub mod types;

// Re-exports for convenience
pub use aggregator::ScenarioAggregator;
pub use analyzer::ImpactAnalyzer;
pub use config::AnalysisConfig;
pub use error::{ClimateError, ConfigurationError};
pub use recommendation::RecommendationEngine;
pub use report::{report_stem, AnalysisSink, RiskRow, RiskSummary, SinkError, COMPARISON_STEM};
pub use sensitivity::{KnownCrop, SensitivityOverrides, SensitivityTable, DEFAULT_SCENARIOS};
pub use source::ScenarioSource;
pub use types::{
    Credentials, DatasetStatistic, ImpactAnalysis, Location, ScenarioBatch, ScenarioResult,
    WarmingScenario,
};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for working with CRA Core
    pub use crate::{
        ClimateError, ConfigurationError, Credentials, DatasetStatistic, ImpactAnalysis,
        ImpactAnalyzer, Location, ScenarioBatch, ScenarioSource, WarmingScenario,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
