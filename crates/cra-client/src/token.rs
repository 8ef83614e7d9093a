//! OAuth client-credentials token exchange
//!
//! No caching: every call performs a fresh exchange.

use crate::config::ClientConfig;
use crate::transport::{HttpRequest, Transport};
use chrono::{DateTime, Utc};
use cra_core::{ClimateError, Credentials};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Bearer token with the time it was issued to us
#[derive(Clone, PartialEq, Eq)]
pub struct Token {
    value: String,
    obtained_at: DateTime<Utc>,
}

impl Token {
    /// Create token obtained now
    #[inline]
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            obtained_at: Utc::now(),
        }
    }

    /// Token value for the `Authorization` header
    #[inline]
    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }

    /// When the exchange completed
    #[inline]
    #[must_use]
    pub fn obtained_at(&self) -> DateTime<Utc> {
        self.obtained_at
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Token")
            .field("value", &"<redacted>")
            .field("obtained_at", &self.obtained_at)
            .finish()
    }
}

#[derive(Serialize)]
struct TokenRequest<'a> {
    client_id: &'a str,
    client_secret: &'a str,
    audience: &'a str,
    grant_type: &'static str,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
}

/// Exchanges client credentials for bearer tokens
#[derive(Clone)]
pub struct TokenProvider {
    transport: Arc<dyn Transport>,
    token_url: String,
    audience: String,
}

impl fmt::Debug for TokenProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenProvider")
            .field("token_url", &self.token_url)
            .field("audience", &self.audience)
            .finish_non_exhaustive()
    }
}

impl TokenProvider {
    /// Create provider for the configured token endpoint
    #[must_use]
    pub fn new(transport: Arc<dyn Transport>, config: &ClientConfig) -> Self {
        Self {
            transport,
            token_url: config.token_url.clone(),
            audience: config.audience.clone(),
        }
    }

    /// Exchange credentials for a token
    ///
    /// # Errors
    /// - `ClimateError::Configuration` if a credential is blank (no request
    ///   is sent)
    /// - `ClimateError::Transport` if the endpoint cannot be reached
    /// - `ClimateError::Auth` on a non-success status or a response without
    ///   an access token
    pub async fn fetch(&self, credentials: &Credentials) -> Result<Token, ClimateError> {
        credentials.validate()?;

        let request = HttpRequest::json(
            self.token_url.as_str(),
            &TokenRequest {
                client_id: credentials.client_id(),
                client_secret: credentials.client_secret(),
                audience: &self.audience,
                grant_type: "client_credentials",
            },
        )?;

        tracing::debug!(endpoint = %self.token_url, "requesting access token");
        let response = self.transport.post_json(request).await?;

        if !response.is_success() {
            return Err(ClimateError::Auth(format!(
                "token endpoint returned HTTP {}: {}",
                response.status,
                response.excerpt()
            )));
        }

        let parsed: TokenResponse = serde_json::from_str(&response.body)
            .map_err(|e| ClimateError::Auth(format!("unreadable token response: {e}")))?;
        let value = parsed
            .access_token
            .filter(|t| !t.is_empty())
            .ok_or_else(|| ClimateError::Auth("token response has no access_token".to_string()))?;

        Ok(Token::new(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::{HttpResponse, MockTransport};
    use cra_core::ConfigurationError;

    fn provider(mock: MockTransport) -> TokenProvider {
        let config = ClientConfig::new()
            .with_token_url("https://auth.test/oauth/token")
            .with_audience("https://api.test");
        TokenProvider::new(Arc::new(mock), &config)
    }

    #[tokio::test]
    async fn sends_client_credentials_grant() {
        let mut mock = MockTransport::new();
        mock.expect_post_json()
            .times(1)
            .withf(|request| {
                request.url == "https://auth.test/oauth/token"
                    && request.bearer_token.is_none()
                    && request.body
                        == serde_json::json!({
                            "client_id": "id",
                            "client_secret": "secret",
                            "audience": "https://api.test",
                            "grant_type": "client_credentials",
                        })
            })
            .returning(|_| Ok(HttpResponse::new(200, r#"{"access_token":"tok","expires_in":86400}"#)));

        let token = provider(mock)
            .fetch(&Credentials::new("id", "secret"))
            .await
            .unwrap();
        assert_eq!(token.value(), "tok");
        assert!(token.obtained_at() <= Utc::now());
    }

    #[tokio::test]
    async fn blank_credentials_never_reach_the_network() {
        let mut mock = MockTransport::new();
        mock.expect_post_json().never();

        let err = provider(mock)
            .fetch(&Credentials::new("", "secret"))
            .await
            .unwrap_err();
        assert_eq!(
            err,
            ClimateError::Configuration(ConfigurationError::MissingClientId)
        );
    }

    #[tokio::test]
    async fn rejected_credentials_are_auth_errors() {
        let mut mock = MockTransport::new();
        mock.expect_post_json()
            .returning(|_| Ok(HttpResponse::new(401, r#"{"error":"access_denied"}"#)));

        let err = provider(mock)
            .fetch(&Credentials::new("id", "wrong"))
            .await
            .unwrap_err();
        assert!(matches!(&err, ClimateError::Auth(m) if m.contains("HTTP 401")), "{err}");
    }

    #[tokio::test]
    async fn missing_access_token_is_auth_error() {
        let mut mock = MockTransport::new();
        mock.expect_post_json()
            .returning(|_| Ok(HttpResponse::new(200, r#"{"token_type":"Bearer"}"#)));

        let err = provider(mock)
            .fetch(&Credentials::new("id", "secret"))
            .await
            .unwrap_err();
        assert_eq!(
            err,
            ClimateError::Auth("token response has no access_token".to_string())
        );
    }

    #[tokio::test]
    async fn unreachable_endpoint_is_transport_error() {
        let mut mock = MockTransport::new();
        mock.expect_post_json()
            .returning(|_| Err(ClimateError::transport("connection refused")));

        let err = provider(mock)
            .fetch(&Credentials::new("id", "secret"))
            .await
            .unwrap_err();
        assert!(matches!(err, ClimateError::Transport { status: None, .. }));
    }

    #[test]
    fn token_debug_is_redacted() {
        let debug = format!("{:?}", Token::new("very-secret-token"));
        assert!(!debug.contains("very-secret-token"));
    }
}
