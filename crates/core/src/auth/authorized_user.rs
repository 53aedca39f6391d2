//! Pre-authorized user credentials (refresh-token grant).
//!
//! The token file is produced out of band by a one-time consent flow and
//! uses Google's `authorized_user` JSON layout.

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::debug;

use super::token::{request_token, AccessToken, TokenProvider};
use super::AuthError;

/// Contents of an authorized-user token file.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AuthorizedUserToken {
    pub client_id: String,
    pub client_secret: String,
    pub refresh_token: String,
    /// Last access token, reused while it is still fresh.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiry: Option<DateTime<Utc>>,
    #[serde(default = "super::default_token_uri")]
    pub token_uri: String,
}

/// Token provider backed by a refresh token.
pub struct AuthorizedUserCredentials {
    client: Client,
    token: AuthorizedUserToken,
    cached: RwLock<Option<AccessToken>>,
}

impl AuthorizedUserCredentials {
    /// Load an authorized-user token file.
    pub fn from_file(path: &Path) -> Result<Self, AuthError> {
        let raw = std::fs::read_to_string(path).map_err(|e| AuthError::ReadFailed {
            path: path.to_path_buf(),
            source: e,
        })?;

        let token: AuthorizedUserToken =
            serde_json::from_str(&raw).map_err(|e| AuthError::InvalidCredentials {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;

        if token.refresh_token.is_empty() {
            return Err(AuthError::InvalidCredentials {
                path: path.to_path_buf(),
                reason: "refresh_token is empty".to_string(),
            });
        }

        Self::new(token)
    }

    /// Build credentials from an already parsed token.
    pub fn new(token: AuthorizedUserToken) -> Result<Self, AuthError> {
        let client = Client::builder().timeout(Duration::from_secs(30)).build()?;

        let cached = match (&token.token, token.expiry) {
            (Some(value), Some(expires_at)) if !value.is_empty() => Some(AccessToken {
                value: value.clone(),
                expires_at,
            }),
            _ => None,
        };

        Ok(Self {
            client,
            token,
            cached: RwLock::new(cached),
        })
    }
}

#[async_trait]
impl TokenProvider for AuthorizedUserCredentials {
    fn kind(&self) -> &'static str {
        "authorized_user"
    }

    async fn access_token(&self) -> Result<String, AuthError> {
        if let Some(token) = self.cached.read().await.as_ref() {
            if token.is_fresh(Utc::now()) {
                return Ok(token.value.clone());
            }
        }

        debug!("Refreshing user access token");
        let token = request_token(
            &self.client,
            &self.token.token_uri,
            &[
                ("grant_type", "refresh_token"),
                ("client_id", &self.token.client_id),
                ("client_secret", &self.token.client_secret),
                ("refresh_token", &self.token.refresh_token),
            ],
        )
        .await?;

        let value = token.value.clone();
        *self.cached.write().await = Some(token);
        Ok(value)
    }
}
