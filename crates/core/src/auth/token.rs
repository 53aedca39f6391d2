//! Access token type, provider trait and the shared token-endpoint call.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use super::AuthError;

/// Tokens are considered stale this many seconds before their real expiry.
pub const EXPIRY_SKEW_SECS: i64 = 60;

/// Something that can hand out a bearer token for API requests.
#[async_trait]
pub trait TokenProvider: Send + Sync {
    /// Short name for logs ("service_account", "authorized_user", ...).
    fn kind(&self) -> &'static str;

    /// Return a valid access token, refreshing it if needed.
    async fn access_token(&self) -> Result<String, AuthError>;
}

/// A bearer token with its expiry.
#[derive(Debug, Clone, PartialEq)]
pub struct AccessToken {
    pub value: String,
    pub expires_at: DateTime<Utc>,
}

impl AccessToken {
    /// Whether the token can still be used at `now`.
    pub fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        now + Duration::seconds(EXPIRY_SKEW_SECS) < self.expires_at
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default = "default_expires_in")]
    expires_in: i64,
}

fn default_expires_in() -> i64 {
    3600
}

/// POST a form to an OAuth token endpoint and parse the access token.
pub(super) async fn request_token(
    client: &Client,
    token_uri: &str,
    form: &[(&str, &str)],
) -> Result<AccessToken, AuthError> {
    debug!("Requesting access token from {}", token_uri);

    let response = client.post(token_uri).form(form).send().await?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(AuthError::TokenRejected {
            status: status.as_u16(),
            message: body,
        });
    }

    let token: TokenResponse = response
        .json()
        .await
        .map_err(|e| AuthError::ParseError(e.to_string()))?;

    if token.access_token.is_empty() {
        return Err(AuthError::ParseError(
            "token response has an empty access_token".to_string(),
        ));
    }

    Ok(AccessToken {
        value: token.access_token,
        expires_at: Utc::now() + Duration::seconds(token.expires_in),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_fresh_until_skew() {
        let now = Utc::now();
        let token = AccessToken {
            value: "t".to_string(),
            expires_at: now + Duration::seconds(EXPIRY_SKEW_SECS + 10),
        };
        assert!(token.is_fresh(now));
        assert!(!token.is_fresh(now + Duration::seconds(20)));
    }

    #[test]
    fn test_expired_token_not_fresh() {
        let now = Utc::now();
        let token = AccessToken {
            value: "t".to_string(),
            expires_at: now - Duration::seconds(1),
        };
        assert!(!token.is_fresh(now));
    }

    #[test]
    fn test_token_response_default_expiry() {
        let parsed: TokenResponse =
            serde_json::from_str(r#"{"access_token": "abc", "token_type": "Bearer"}"#).unwrap();
        assert_eq!(parsed.access_token, "abc");
        assert_eq!(parsed.expires_in, 3600);
    }
}
