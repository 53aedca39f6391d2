//! Google OAuth credentials for the file store and the publishing API.
//!
//! Two independent credential sources are supported:
//! - [`ServiceAccountCredentials`]: a service-account key exchanged for
//!   access tokens with a signed JWT assertion (used for read-only Drive).
//! - [`AuthorizedUserCredentials`]: a pre-authorized user token carrying a
//!   refresh token (used for the YouTube channel).
//!
//! Both implement [`TokenProvider`], which the API clients call before
//! every request. Tokens are cached until shortly before they expire.

mod authorized_user;
mod service_account;
mod token;

pub use authorized_user::{AuthorizedUserCredentials, AuthorizedUserToken};
pub use service_account::{ServiceAccountCredentials, ServiceAccountKey, DRIVE_READONLY_SCOPE};
pub use token::{AccessToken, TokenProvider, EXPIRY_SKEW_SECS};

use std::path::PathBuf;
use thiserror::Error;

/// Default Google OAuth token endpoint.
pub const GOOGLE_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

/// Errors raised while loading credentials or exchanging them for tokens.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Credential file could not be read.
    #[error("Failed to read credential file {path}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Credential file was read but is not usable.
    #[error("Invalid credential file {path}: {reason}")]
    InvalidCredentials { path: PathBuf, reason: String },

    /// JWT assertion could not be signed.
    #[error("Failed to sign token assertion: {0}")]
    SigningFailed(#[from] jsonwebtoken::errors::Error),

    /// HTTP request to the token endpoint failed.
    #[error("Token request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    /// Token endpoint answered with an error status.
    #[error("Token endpoint rejected the request: {status} - {message}")]
    TokenRejected { status: u16, message: String },

    /// Token endpoint answered with an unexpected body.
    #[error("Failed to parse token response: {0}")]
    ParseError(String),
}

fn default_token_uri() -> String {
    GOOGLE_TOKEN_URI.to_string()
}
