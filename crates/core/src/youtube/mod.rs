//! Publishing to YouTube.
//!
//! The orchestrator only sees the [`VideoPublisher`] trait. [`YouTubeClient`]
//! implements it with the resumable upload protocol: one request opens an
//! upload session, then the file is sent in fixed-size chunks until the
//! server answers with the created video.

mod client;
mod types;

pub use client::{content_type_for, YouTubeClient, YouTubeClientConfig};
pub use types::{PrivacyStatus, PublishedVideo, VideoMetadata};

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use thiserror::Error;

use crate::auth::AuthError;

/// Errors that can occur while publishing a video.
#[derive(Debug, Error)]
pub enum PublishError {
    /// Could not obtain an access token.
    #[error("Authentication failed: {0}")]
    Auth(#[from] AuthError),

    /// HTTP request failed (connection, timeout, broken body).
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    /// API returned an error.
    #[error("API error: {status} - {message}")]
    ApiError { status: u16, message: String },

    /// Server response did not follow the resumable upload protocol.
    #[error("Upload protocol error: {0}")]
    Protocol(String),

    /// Failed to parse response.
    #[error("Failed to parse response: {0}")]
    ParseError(String),

    /// Local media file could not be read.
    #[error("Failed to read media file {path}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Local media file is empty.
    #[error("Media file is empty: {0}")]
    EmptyFile(PathBuf),
}

/// A platform that videos can be published to.
#[async_trait]
pub trait VideoPublisher: Send + Sync {
    /// Upload `media` with `metadata` and return the created video.
    async fn publish(
        &self,
        media: &Path,
        metadata: &VideoMetadata,
    ) -> Result<PublishedVideo, PublishError>;
}
