//! Client configuration

use cra_core::ConfigurationError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default dataset API base URL
pub const DEFAULT_API_URL: &str = "https://graphql.probablefutures.org";
/// Default OAuth token endpoint
pub const DEFAULT_TOKEN_URL: &str = "https://probablefutures.us.auth0.com/oauth/token";
/// Default token audience
pub const DEFAULT_AUDIENCE: &str = "https://graphql.probablefutures.com";

/// Endpoints and transport settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Dataset API base URL (`/graphql` is appended)
    pub api_url: String,
    /// OAuth token endpoint
    pub token_url: String,
    /// Audience requested in the client-credentials grant
    pub audience: String,
    /// Per-request HTTP timeout
    pub request_timeout_secs: u64,
}

impl ClientConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With dataset API base URL
    #[inline]
    #[must_use]
    pub fn with_api_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = url.into();
        self
    }

    /// With token endpoint
    #[inline]
    #[must_use]
    pub fn with_token_url(mut self, url: impl Into<String>) -> Self {
        self.token_url = url.into();
        self
    }

    /// With token audience
    #[inline]
    #[must_use]
    pub fn with_audience(mut self, audience: impl Into<String>) -> Self {
        self.audience = audience.into();
        self
    }

    /// With HTTP timeout
    #[inline]
    #[must_use]
    pub fn with_request_timeout_secs(mut self, secs: u64) -> Self {
        self.request_timeout_secs = secs;
        self
    }

    /// Full GraphQL endpoint
    #[must_use]
    pub fn graphql_url(&self) -> String {
        format!("{}/graphql", self.api_url.trim_end_matches('/'))
    }

    /// HTTP timeout as a duration
    #[inline]
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Reject unusable values
    ///
    /// # Errors
    /// `ConfigurationError::InvalidSetting` for a non-HTTP URL, an empty
    /// audience or a zero timeout.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        check_url("api_url", &self.api_url)?;
        check_url("token_url", &self.token_url)?;
        if self.audience.trim().is_empty() {
            return Err(ConfigurationError::invalid("audience", "must not be empty"));
        }
        if self.request_timeout_secs == 0 {
            return Err(ConfigurationError::invalid(
                "request_timeout_secs",
                "must be greater than zero",
            ));
        }
        Ok(())
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            token_url: DEFAULT_TOKEN_URL.to_string(),
            audience: DEFAULT_AUDIENCE.to_string(),
            request_timeout_secs: 30,
        }
    }
}

fn check_url(field: &'static str, url: &str) -> Result<(), ConfigurationError> {
    if url.starts_with("https://") || url.starts_with("http://") {
        Ok(())
    } else {
        Err(ConfigurationError::invalid(
            field,
            format!("expected an http(s) URL, got {url:?}"),
        ))
    }
}
