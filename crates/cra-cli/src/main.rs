//! `cra` - climate risk analyses for niche agriculture

mod cli;
mod commands;
mod config;
mod logging;
mod report;

use std::process;

use anyhow::Result;
use clap::Parser;
use cra_core::Credentials;

use crate::cli::{Cli, Command};
use crate::commands::Session;
use crate::config::AppConfig;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose, cli.log_json);

    if let Err(e) = run(cli).await {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let session = Session {
        config: AppConfig::load(cli.config.as_deref())?,
        // Blank credentials are reported by the pipeline itself.
        credentials: Credentials::new(
            cli.client_id.unwrap_or_default(),
            cli.client_secret.unwrap_or_default(),
        ),
    };

    match cli.command {
        Command::Fetch(args) => commands::fetch(&session, args).await,
        Command::Project(args) => commands::project(&session, args).await,
        Command::Analyze(args) => commands::analyze(&session, args).await,
        Command::Compare(args) => commands::compare(&session, args).await,
    }
}
