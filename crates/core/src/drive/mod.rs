//! File store access (Google Drive).
//!
//! The orchestrator only sees the [`FileSource`] trait: list the candidate
//! videos of a folder and download one of them to a local path.

mod client;
mod types;

pub use client::{DriveClient, DriveClientConfig};
pub use types::*;

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use thiserror::Error;

use crate::auth::AuthError;

/// Errors that can occur when talking to the file store.
#[derive(Debug, Error)]
pub enum SourceError {
    /// Could not obtain an access token.
    #[error("Authentication failed: {0}")]
    Auth(#[from] AuthError),

    /// HTTP request failed (connection, timeout, broken body).
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    /// File not found (404).
    #[error("File not found: {0}")]
    NotFound(String),

    /// API returned an error.
    #[error("API error: {status} - {message}")]
    ApiError { status: u16, message: String },

    /// Failed to parse response.
    #[error("Failed to parse response: {0}")]
    ParseError(String),

    /// Writing the downloaded content failed.
    #[error("Failed to write {path}")]
    WriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// A store of candidate video files.
#[async_trait]
pub trait FileSource: Send + Sync {
    /// List every candidate video directly under `folder_id`, following
    /// pagination to the end.
    async fn list_candidates(&self, folder_id: &str) -> Result<Vec<CandidateFile>, SourceError>;

    /// Download the content of `file_id` into `destination`.
    ///
    /// Returns the number of bytes written.
    async fn download(&self, file_id: &str, destination: &Path) -> Result<u64, SourceError>;
}
