use std::sync::Arc;

use anyhow::{Context as _, Result};
use cra_client::DatasetClient;
use cra_core::{AnalysisSink, Credentials, ImpactAnalyzer, RiskSummary, WarmingScenario};
use serde::Serialize;

use crate::cli::{AnalyzeArgs, CompareArgs, FetchArgs, ProjectArgs};
use crate::config::AppConfig;
use crate::report::JsonReportSink;

/// Shared inputs of every subcommand.
pub(crate) struct Session {
    pub(crate) config: AppConfig,
    pub(crate) credentials: Credentials,
}

impl Session {
    fn client(&self) -> Result<DatasetClient> {
        Ok(DatasetClient::from_config(&self.config.client)?)
    }

    fn analyzer(&self) -> Result<ImpactAnalyzer> {
        let source = Arc::new(self.client()?);
        Ok(ImpactAnalyzer::from_config(
            source,
            self.credentials.clone(),
            &self.config.analysis,
        )?)
    }
}

fn print_json(value: &impl Serialize) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub(crate) async fn fetch(session: &Session, args: FetchArgs) -> Result<()> {
    let location = args.location.location();
    let scenario = WarmingScenario::new(args.scenario);
    let rows = session
        .client()?
        .query(&location, &scenario, &session.credentials)
        .await
        .with_context(|| format!("fetching scenario {scenario} for {location}"))?;
    print_json(&rows)
}

pub(crate) async fn project(session: &Session, args: ProjectArgs) -> Result<()> {
    let scenarios: Vec<WarmingScenario> =
        args.scenarios.into_iter().map(WarmingScenario::new).collect();
    let batch = session
        .analyzer()?
        .project(&args.location.location(), &scenarios)
        .await?;
    print_json(&batch)
}

pub(crate) async fn analyze(session: &Session, args: AnalyzeArgs) -> Result<()> {
    let analysis = session
        .analyzer()?
        .analyze(&args.agriculture_type, &args.location.location())
        .await?;
    print_json(&analysis)?;

    if let Some(dir) = args.report_dir {
        let path = JsonReportSink::new(dir)?.publish_analysis(&analysis)?;
        eprintln!("Report written to {}", path.display());
    }
    Ok(())
}

pub(crate) async fn compare(session: &Session, args: CompareArgs) -> Result<()> {
    let analyzer = session.analyzer()?;
    let mut analyses = Vec::with_capacity(args.targets.len());
    for target in &args.targets {
        analyses.push(
            analyzer
                .analyze(&target.agriculture_type, &target.location)
                .await?,
        );
    }

    let summary = RiskSummary::from_analyses(&analyses);
    print!("{}", summary.render_table());
    if let Some(row) = summary.highest() {
        println!(
            "\nHighest exposure: {} at {} ({} scenarios)",
            row.agriculture_type, row.location, row.risk_score
        );
    }

    if let Some(dir) = args.report_dir {
        let sink = JsonReportSink::new(dir)?;
        for analysis in &analyses {
            sink.publish_analysis(analysis)?;
        }
        let path = sink.publish_comparison(&analyses)?;
        eprintln!("Comparative report written to {}", path.display());
    }
    Ok(())
}
