//! Comparative summaries and the report sink seam
//!
//! Report rendering is a capability the hosting application wires in; the
//! analyzer never depends on it.

use crate::types::ImpactAnalysis;
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use std::path::PathBuf;

/// File stem of the comparative report
pub const COMPARISON_STEM: &str = "comparative_agriculture_risk_analysis";

/// Sink errors
#[derive(Debug, thiserror::Error)]
pub enum SinkError {
    /// Writing the report failed
    #[error("report I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// Encoding the report failed
    #[error("report encoding failed: {0}")]
    Encode(#[from] serde_json::Error),

    /// Nothing to report
    #[error("no analyses to report")]
    Empty,
}

/// Consumer of finished analyses (charts, files, dashboards)
///
/// A pure sink: nothing flows back into the pipeline.
pub trait AnalysisSink {
    /// Publish a single analysis, returning where it was written
    ///
    /// # Errors
    /// [`SinkError`] if the report cannot be produced.
    fn publish_analysis(&self, analysis: &ImpactAnalysis) -> Result<PathBuf, SinkError>;

    /// Publish a comparison across analyses, returning where it was written
    ///
    /// # Errors
    /// [`SinkError::Empty`] for an empty slice, otherwise as for
    /// [`AnalysisSink::publish_analysis`].
    fn publish_comparison(&self, analyses: &[ImpactAnalysis]) -> Result<PathBuf, SinkError>;
}

/// File stem for an analysis: `<type>_<address>_<country>_impact`
///
/// Every character outside `[A-Za-z0-9_.-]` becomes an underscore and
/// dot runs are collapsed, so the stem is always a single file name.
#[must_use]
pub fn report_stem(analysis: &ImpactAnalysis) -> String {
    let location = analysis.location();
    let mut stem: String = format!(
        "{}_{}_{}_impact",
        analysis.agriculture_type(),
        location.address(),
        location.country()
    )
    .chars()
    .map(|c| {
        if c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-') {
            c
        } else {
            '_'
        }
    })
    .collect();
    while stem.contains("..") {
        stem = stem.replace("..", "_");
    }
    stem
}

/// One row of a comparative summary
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskRow {
    /// Agriculture type as requested
    pub agriculture_type: String,
    /// `"<address>, <country>"`
    pub location: String,
    /// Scenarios with retrieved data
    pub risk_score: usize,
    /// Scenarios that failed
    pub failed_scenarios: usize,
    /// Scenario labels in request order
    pub scenarios: Vec<String>,
}

impl RiskRow {
    /// Summarise one analysis
    #[must_use]
    pub fn from_analysis(analysis: &ImpactAnalysis) -> Self {
        let risks = analysis.climate_risks();
        Self {
            agriculture_type: analysis.agriculture_type().to_string(),
            location: analysis.location().to_string(),
            risk_score: risks.ok_count(),
            failed_scenarios: risks.err_count(),
            scenarios: risks.scenarios().map(ToString::to_string).collect(),
        }
    }
}

/// Side-by-side view of several analyses
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskSummary {
    /// Rows in input order
    pub rows: Vec<RiskRow>,
}

impl RiskSummary {
    /// Summarise analyses in the given order
    #[must_use]
    pub fn from_analyses(analyses: &[ImpactAnalysis]) -> Self {
        Self {
            rows: analyses.iter().map(RiskRow::from_analysis).collect(),
        }
    }

    /// Row with the highest risk score (first one on ties)
    #[must_use]
    pub fn highest(&self) -> Option<&RiskRow> {
        self.rows
            .iter()
            .rev()
            .max_by_key(|row| row.risk_score)
    }

    /// Plain-text table for terminals
    #[must_use]
    pub fn render_table(&self) -> String {
        let type_width = self
            .rows
            .iter()
            .map(|r| r.agriculture_type.chars().count())
            .chain(std::iter::once("type".len()))
            .max()
            .unwrap_or(4);
        let location_width = self
            .rows
            .iter()
            .map(|r| r.location.chars().count())
            .chain(std::iter::once("location".len()))
            .max()
            .unwrap_or(8);

        let mut out = String::new();
        let _ = writeln!(
            out,
            "{:<type_width$}  {:<location_width$}  {:>5}  {:>6}  scenarios",
            "type", "location", "score", "failed"
        );
        for row in &self.rows {
            let _ = writeln!(
                out,
                "{:<type_width$}  {:<location_width$}  {:>5}  {:>6}  {}",
                row.agriculture_type,
                row.location,
                row.risk_score,
                row.failed_scenarios,
                row.scenarios.join(", ")
            );
        }
        out
    }
}
