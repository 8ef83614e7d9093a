//! HTTP transport seam
//!
//! The token provider and dataset client only ever POST JSON, so the seam
//! is a single operation. [`ReqwestTransport`] is the production
//! implementation; tests script responses instead.

use async_trait::async_trait;
use cra_core::{ClimateError, ConfigurationError};
use serde::Serialize;
use std::fmt;
use std::time::Duration;

/// Longest response excerpt quoted in error messages
const EXCERPT_CHARS: usize = 200;

/// Outbound JSON POST
#[derive(Clone, PartialEq)]
pub struct HttpRequest {
    /// Target URL
    pub url: String,
    /// JSON body
    pub body: serde_json::Value,
    /// Bearer token for the `Authorization` header
    pub bearer_token: Option<String>,
}

impl HttpRequest {
    /// Create request with a JSON-encoded body
    ///
    /// # Errors
    /// `ClimateError::Protocol` if the body cannot be encoded.
    pub fn json(url: impl Into<String>, body: &impl Serialize) -> Result<Self, ClimateError> {
        let body = serde_json::to_value(body)
            .map_err(|e| ClimateError::Protocol(format!("cannot encode request: {e}")))?;
        Ok(Self {
            url: url.into(),
            body,
            bearer_token: None,
        })
    }

    /// With bearer authorization
    #[inline]
    #[must_use]
    pub fn with_bearer(mut self, token: impl Into<String>) -> Self {
        self.bearer_token = Some(token.into());
        self
    }
}

// Bodies carry client secrets and requests carry tokens.
impl fmt::Debug for HttpRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpRequest")
            .field("url", &self.url)
            .field("authorized", &self.bearer_token.is_some())
            .finish_non_exhaustive()
    }
}

/// Status and raw body of a response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    /// HTTP status code
    pub status: u16,
    /// Response body text
    pub body: String,
}

impl HttpResponse {
    /// Create response
    #[inline]
    #[must_use]
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// 2xx status
    #[inline]
    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Start of the body, for error messages
    #[must_use]
    pub fn excerpt(&self) -> String {
        let mut excerpt: String = self.body.chars().take(EXCERPT_CHARS).collect();
        if self.body.chars().nth(EXCERPT_CHARS).is_some() {
            excerpt.push('…');
        }
        excerpt
    }
}

/// Sends JSON POST requests
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send a request and return whatever the server answered
    ///
    /// Non-success statuses are returned as responses, not errors.
    ///
    /// # Errors
    /// `ClimateError::Transport` if no response was received.
    async fn post_json(&self, request: HttpRequest) -> Result<HttpResponse, ClimateError>;
}

/// `reqwest`-backed transport
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Create transport with a per-request timeout
    ///
    /// # Errors
    /// `ConfigurationError::InvalidSetting` if the HTTP client cannot be
    /// initialised.
    pub fn new(timeout: Duration) -> Result<Self, ConfigurationError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("cra/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ConfigurationError::invalid("http_client", e.to_string()))?;
        Ok(Self { client })
    }

    /// Wrap an existing client
    #[inline]
    #[must_use]
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn post_json(&self, request: HttpRequest) -> Result<HttpResponse, ClimateError> {
        let mut builder = self.client.post(&request.url).json(&request.body);
        if let Some(token) = &request.bearer_token {
            builder = builder.bearer_auth(token);
        }

        let response = builder.send().await.map_err(|e| {
            let kind = if e.is_timeout() { "timed out" } else { "request failed" };
            ClimateError::transport(format!("{kind}: {}: {e}", request.url))
        })?;
        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| ClimateError::transport(format!("reading body from {}: {e}", request.url)))?;

        tracing::debug!(url = %request.url, status, bytes = body.len(), "response received");
        Ok(HttpResponse { status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn debug_hides_body_and_token() {
        let request = HttpRequest::json("https://auth.test/token", &json!({"client_secret": "s3cr3t"}))
            .unwrap()
            .with_bearer("tok-123");
        let debug = format!("{request:?}");

        assert!(debug.contains("https://auth.test/token"));
        assert!(!debug.contains("s3cr3t"));
        assert!(!debug.contains("tok-123"));
    }

    #[test]
    fn success_range() {
        assert!(HttpResponse::new(200, "").is_success());
        assert!(HttpResponse::new(204, "").is_success());
        assert!(!HttpResponse::new(302, "").is_success());
        assert!(!HttpResponse::new(401, "").is_success());
    }

    #[test]
    fn excerpt_truncates_long_bodies() {
        let short = HttpResponse::new(500, "oops");
        assert_eq!(short.excerpt(), "oops");

        let long = HttpResponse::new(500, "é".repeat(300));
        let excerpt = long.excerpt();
        assert_eq!(excerpt.chars().count(), EXCERPT_CHARS + 1);
        assert!(excerpt.ends_with('…'));
    }

    #[test]
    fn reqwest_transport_builds() {
        assert!(ReqwestTransport::new(Duration::from_secs(5)).is_ok());
    }
}
