//! Error types for CRA Core
//!
//! Provides the error taxonomy for the acquisition pipeline:
//! - Configuration failures (fatal to a whole analysis)
//! - Token exchange failures
//! - Transport failures against either endpoint
//! - Malformed provider responses
//!
//! Only [`ConfigurationError`] ever escapes an analysis. The other kinds are
//! scoped to one scenario and end up stringified inside the batch.

/// Main CRA error type
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ClimateError {
    /// Missing credentials or invalid settings
    #[error("configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    /// Token exchange failed
    #[error("authentication failed: {0}")]
    Auth(String),

    /// Network or HTTP-level failure
    #[error("transport failed: {message}")]
    Transport {
        /// HTTP status, when a response was received at all
        status: Option<u16>,
        /// Failure description
        message: String,
    },

    /// Response body did not have the expected shape
    #[error("unexpected response: {0}")]
    Protocol(String),
}

impl ClimateError {
    /// Create a transport error without a status code
    #[inline]
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            status: None,
            message: message.into(),
        }
    }

    /// Create a transport error for a non-success HTTP status
    #[inline]
    pub fn http_status(status: u16, message: impl Into<String>) -> Self {
        Self::Transport {
            status: Some(status),
            message: format!("HTTP {status}: {}", message.into()),
        }
    }

    /// Check if error belongs to a single scenario rather than the whole run
    #[inline]
    #[must_use]
    pub fn is_scenario_scoped(&self) -> bool {
        !matches!(self, Self::Configuration(_))
    }

    /// Check if retrying the same request could succeed
    #[inline]
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Transport { status: None, .. } => true,
            Self::Transport {
                status: Some(status),
                ..
            } => *status == 429 || *status >= 500,
            Self::Auth(_) | Self::Protocol(_) | Self::Configuration(_) => false,
        }
    }
}

/// Configuration errors
///
/// Raised before any network I/O takes place.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigurationError {
    /// `client_id` is empty or absent
    #[error("client_id must be set")]
    MissingClientId,

    /// `client_secret` is empty or absent
    #[error("client_secret must be set")]
    MissingClientSecret,

    /// A setting has an unusable value
    #[error("invalid setting `{field}`: {reason}")]
    InvalidSetting {
        /// Setting name
        field: &'static str,
        /// Why it was rejected
        reason: String,
    },
}

impl ConfigurationError {
    /// Create an invalid setting error
    #[inline]
    pub fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidSetting {
            field,
            reason: reason.into(),
        }
    }
}
