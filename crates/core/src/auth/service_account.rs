//! Service-account credentials (JWT-bearer grant).

use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::debug;

use super::token::{request_token, AccessToken, TokenProvider};
use super::AuthError;

/// Read-only Drive scope.
pub const DRIVE_READONLY_SCOPE: &str = "https://www.googleapis.com/auth/drive.readonly";

const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";

/// Lifetime of a signed assertion (Google caps it at one hour).
const ASSERTION_LIFETIME_SECS: i64 = 3600;

/// The subset of a Google service-account key file we need.
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceAccountKey {
    #[serde(rename = "type", default)]
    pub key_type: Option<String>,
    pub client_email: String,
    pub private_key: String,
    #[serde(default)]
    pub private_key_id: Option<String>,
    #[serde(default = "super::default_token_uri")]
    pub token_uri: String,
}

#[derive(Debug, Serialize)]
struct AssertionClaims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

/// Token provider backed by a service-account key.
pub struct ServiceAccountCredentials {
    client: Client,
    key: ServiceAccountKey,
    encoding_key: EncodingKey,
    scope: String,
    cached: RwLock<Option<AccessToken>>,
}

impl ServiceAccountCredentials {
    /// Load a key file and prepare it for signing.
    ///
    /// The private key is parsed here so a broken key file fails the run
    /// before anything else happens.
    pub fn from_file(path: &Path, scope: &str) -> Result<Self, AuthError> {
        let raw = std::fs::read_to_string(path).map_err(|e| AuthError::ReadFailed {
            path: path.to_path_buf(),
            source: e,
        })?;

        let key: ServiceAccountKey =
            serde_json::from_str(&raw).map_err(|e| AuthError::InvalidCredentials {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;

        Self::from_key(key, scope, path.to_path_buf())
    }

    fn from_key(key: ServiceAccountKey, scope: &str, origin: PathBuf) -> Result<Self, AuthError> {
        if let Some(kind) = key.key_type.as_deref() {
            if kind != "service_account" {
                return Err(AuthError::InvalidCredentials {
                    path: origin,
                    reason: format!("expected type \"service_account\", got \"{}\"", kind),
                });
            }
        }

        if key.client_email.is_empty() {
            return Err(AuthError::InvalidCredentials {
                path: origin,
                reason: "client_email is empty".to_string(),
            });
        }

        let encoding_key = EncodingKey::from_rsa_pem(key.private_key.as_bytes()).map_err(|e| {
            AuthError::InvalidCredentials {
                path: origin.clone(),
                reason: format!("private_key is not a valid RSA PEM key: {}", e),
            }
        })?;

        let client = Client::builder().timeout(Duration::from_secs(30)).build()?;

        Ok(Self {
            client,
            key,
            encoding_key,
            scope: scope.to_string(),
            cached: RwLock::new(None),
        })
    }

    /// Service account email (the assertion issuer).
    pub fn client_email(&self) -> &str {
        &self.key.client_email
    }

    /// Build a signed assertion valid from `now`.
    fn assertion(&self, now: DateTime<Utc>) -> Result<String, AuthError> {
        let iat = now.timestamp();
        let claims = AssertionClaims {
            iss: &self.key.client_email,
            scope: &self.scope,
            aud: &self.key.token_uri,
            iat,
            exp: iat + ASSERTION_LIFETIME_SECS,
        };

        let mut header = Header::new(Algorithm::RS256);
        header.kid = self.key.private_key_id.clone();

        Ok(jsonwebtoken::encode(&header, &claims, &self.encoding_key)?)
    }
}

#[async_trait]
impl TokenProvider for ServiceAccountCredentials {
    fn kind(&self) -> &'static str {
        "service_account"
    }

    async fn access_token(&self) -> Result<String, AuthError> {
        let now = Utc::now();
        if let Some(token) = self.cached.read().await.as_ref() {
            if token.is_fresh(now) {
                return Ok(token.value.clone());
            }
        }

        debug!(
            "Exchanging service account assertion for {}",
            self.key.client_email
        );
        let assertion = self.assertion(now)?;
        let token = request_token(
            &self.client,
            &self.key.token_uri,
            &[("grant_type", JWT_BEARER_GRANT), ("assertion", &assertion)],
        )
        .await?;

        let value = token.value.clone();
        *self.cached.write().await = Some(token);
        Ok(value)
    }
}
