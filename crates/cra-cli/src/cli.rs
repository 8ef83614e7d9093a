use std::path::PathBuf;
use std::str::FromStr;

use clap::{Parser, Subcommand};
use cra_core::Location;

/// Climate risk assistant for niche agriculture.
#[derive(Debug, Parser)]
#[command(
    name = "cra",
    version,
    about = "Climate risk analyses for niche agriculture"
)]
pub(crate) struct Cli {
    /// Increase verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub(crate) verbose: u8,

    /// Emit logs as JSON lines.
    #[arg(long, global = true)]
    pub(crate) log_json: bool,

    /// Path to TOML configuration file (defaults to ./cra.toml if present).
    #[arg(short, long, global = true)]
    pub(crate) config: Option<PathBuf>,

    /// OAuth client identifier.
    #[arg(long, global = true, env = "CLIENT_ID", hide_env_values = true)]
    pub(crate) client_id: Option<String>,

    /// OAuth client secret.
    #[arg(long, global = true, env = "CLIENT_SECRET", hide_env_values = true)]
    pub(crate) client_secret: Option<String>,

    /// Subcommand to run.
    #[command(subcommand)]
    pub(crate) command: Command,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub(crate) enum Command {
    /// Fetch raw statistics for one scenario.
    Fetch(FetchArgs),
    /// Fetch several scenarios for a location.
    Project(ProjectArgs),
    /// Analyse climate risk for one agriculture type.
    Analyze(AnalyzeArgs),
    /// Analyse and rank several agriculture types and locations.
    Compare(CompareArgs),
}

/// Location shared by the single-location subcommands.
#[derive(Debug, clap::Args)]
pub(crate) struct LocationArgs {
    /// Street address, town or region.
    #[arg(long)]
    pub(crate) address: String,

    /// Country name.
    #[arg(long)]
    pub(crate) country: String,
}

impl LocationArgs {
    pub(crate) fn location(&self) -> Location {
        Location::new(self.address.as_str(), self.country.as_str())
    }
}

/// Arguments for the `fetch` subcommand.
#[derive(Debug, clap::Args)]
pub(crate) struct FetchArgs {
    #[command(flatten)]
    pub(crate) location: LocationArgs,

    /// Warming scenario label.
    #[arg(long, default_value = "1.5")]
    pub(crate) scenario: String,
}

/// Arguments for the `project` subcommand.
#[derive(Debug, clap::Args)]
pub(crate) struct ProjectArgs {
    #[command(flatten)]
    pub(crate) location: LocationArgs,

    /// Warming scenario label; repeat for several (default 1.5 2.0 3.0).
    #[arg(long = "scenario")]
    pub(crate) scenarios: Vec<String>,
}

/// Arguments for the `analyze` subcommand.
#[derive(Debug, clap::Args)]
pub(crate) struct AnalyzeArgs {
    /// Agriculture type (truffle, ice_wine, saffron, ...).
    #[arg(long = "type")]
    pub(crate) agriculture_type: String,

    #[command(flatten)]
    pub(crate) location: LocationArgs,

    /// Directory to write the JSON report into.
    #[arg(long)]
    pub(crate) report_dir: Option<PathBuf>,
}

/// Arguments for the `compare` subcommand.
#[derive(Debug, clap::Args)]
pub(crate) struct CompareArgs {
    /// Analysis target as TYPE:ADDRESS:COUNTRY; repeat for several.
    #[arg(long = "target", required = true)]
    pub(crate) targets: Vec<Target>,

    /// Directory to write the JSON reports into.
    #[arg(long)]
    pub(crate) report_dir: Option<PathBuf>,
}

/// One `compare` target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Target {
    pub(crate) agriculture_type: String,
    pub(crate) location: Location,
}

impl FromStr for Target {
    type Err = String;

    /// Type is everything before the first colon, country everything after
    /// the last; the address keeps any colons in between.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parse = || {
            let (agriculture_type, rest) = s.split_once(':')?;
            let (address, country) = rest.rsplit_once(':')?;
            [agriculture_type, address, country]
                .iter()
                .all(|part| !part.trim().is_empty())
                .then(|| Self {
                    agriculture_type: agriculture_type.trim().to_string(),
                    location: Location::new(address.trim(), country.trim()),
                })
        };
        parse().ok_or_else(|| format!("expected TYPE:ADDRESS:COUNTRY, got {s:?}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn target_parses_three_parts() {
        let target: Target = "ice_wine:Niagara-on-the-Lake:Canada".parse().unwrap();
        assert_eq!(
            target,
            Target {
                agriculture_type: "ice_wine".to_string(),
                location: Location::new("Niagara-on-the-Lake", "Canada"),
            }
        );
    }

    #[test]
    fn target_address_may_contain_colons() {
        let target: Target = "saffron:Unit 4: Old Mill:Spain".parse().unwrap();
        assert_eq!(target.location.address(), "Unit 4: Old Mill");
        assert_eq!(target.location.country(), "Spain");
    }

    #[test]
    fn malformed_targets_rejected() {
        for bad in ["truffle", "truffle:Alba", "truffle::Italy", ":Alba:Italy"] {
            assert!(bad.parse::<Target>().is_err(), "{bad}");
        }
    }

    #[test]
    fn compare_collects_repeated_targets() {
        let cli = Cli::try_parse_from([
            "cra",
            "-vv",
            "compare",
            "--target",
            "truffle:Alba:Italy",
            "--target",
            "saffron:La Mancha:Spain",
        ])
        .unwrap();

        assert_eq!(cli.verbose, 2);
        let Command::Compare(args) = cli.command else {
            panic!("expected compare");
        };
        assert_eq!(args.targets.len(), 2);
        assert_eq!(args.targets[1].location.address(), "La Mancha");
        assert!(args.report_dir.is_none());
    }

    #[test]
    fn fetch_defaults_to_lowest_scenario() {
        let cli =
            Cli::try_parse_from(["cra", "fetch", "--address", "Alba", "--country", "Italy"])
                .unwrap();
        let Command::Fetch(args) = cli.command else {
            panic!("expected fetch");
        };
        assert_eq!(args.scenario, "1.5");
        assert_eq!(args.location.location(), Location::new("Alba", "Italy"));
    }

    #[test]
    fn project_scenarios_are_optional() {
        let cli = Cli::try_parse_from([
            "cra", "project", "--address", "Alba", "--country", "Italy",
        ])
        .unwrap();
        let Command::Project(args) = cli.command else {
            panic!("expected project");
        };
        assert!(args.scenarios.is_empty());
    }
}
