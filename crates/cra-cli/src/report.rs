use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::PathBuf;

use cra_core::{
    report_stem, AnalysisSink, ImpactAnalysis, RiskSummary, SinkError, COMPARISON_STEM,
};
use serde::Serialize;

/// Writes analyses as pretty JSON files into one directory.
#[derive(Debug, Clone)]
pub(crate) struct JsonReportSink {
    dir: PathBuf,
}

#[derive(Serialize)]
struct ComparisonReport<'a> {
    summary: RiskSummary,
    analyses: &'a [ImpactAnalysis],
}

impl JsonReportSink {
    /// Create sink, creating `dir` if needed.
    pub(crate) fn new(dir: impl Into<PathBuf>) -> Result<Self, SinkError> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    fn write(&self, stem: &str, value: &impl Serialize) -> Result<PathBuf, SinkError> {
        let path = self.dir.join(format!("{stem}.json"));
        let mut writer = BufWriter::new(File::create(&path)?);
        serde_json::to_writer_pretty(&mut writer, value)?;
        writer.write_all(b"\n")?;
        writer.flush()?;
        tracing::info!(path = %path.display(), "report written");
        Ok(path)
    }
}

impl AnalysisSink for JsonReportSink {
    fn publish_analysis(&self, analysis: &ImpactAnalysis) -> Result<PathBuf, SinkError> {
        self.write(&report_stem(analysis), analysis)
    }

    fn publish_comparison(&self, analyses: &[ImpactAnalysis]) -> Result<PathBuf, SinkError> {
        if analyses.is_empty() {
            return Err(SinkError::Empty);
        }
        self.write(
            COMPARISON_STEM,
            &ComparisonReport {
                summary: RiskSummary::from_analyses(analyses),
                analyses,
            },
        )
    }
}
