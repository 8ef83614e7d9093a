use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use cra_client::ClientConfig;
use cra_core::AnalysisConfig;
use serde::Deserialize;

/// Config file picked up from the working directory when `--config` is absent.
const DEFAULT_CONFIG_FILE: &str = "cra.toml";

/// Top-level CRA configuration.
///
/// ```toml
/// [client]
/// request_timeout_secs = 20
///
/// [analysis]
/// max_concurrent_scenarios = 2
/// ```
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct AppConfig {
    /// Provider endpoints and HTTP settings.
    pub(crate) client: ClientConfig,

    /// Aggregation and sensitivity settings.
    pub(crate) analysis: AnalysisConfig,
}

impl AppConfig {
    /// Load the explicit file, else `./cra.toml` if it exists, else defaults.
    pub(crate) fn load(explicit: Option<&Path>) -> Result<Self> {
        let path = match explicit {
            Some(path) => path.to_path_buf(),
            None => {
                let fallback = PathBuf::from(DEFAULT_CONFIG_FILE);
                if !fallback.is_file() {
                    tracing::debug!("no config file, using defaults");
                    return Ok(Self::default());
                }
                fallback
            }
        };
        Self::from_file(&path)
    }

    fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let config: Self =
            toml::from_str(&text).with_context(|| format!("parsing config {}", path.display()))?;
        config.client.validate()?;
        config.analysis.validate()?;
        tracing::info!(path = %path.display(), "loaded configuration");
        Ok(config)
    }
}
