//! Types for the upload orchestrator.

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::auth::AuthError;
use crate::drive::{CandidateFile, SourceError};
use crate::ledger::LedgerError;
use crate::youtube::PublishError;

/// Steps of a run, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStage {
    Init,
    CredentialsLoaded,
    CandidatesListed,
    NoCandidates,
    CandidateChosen,
    Downloaded,
    Uploaded,
    BookkeepingDone,
    CleanedUp,
}

impl fmt::Display for RunStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RunStage::Init => "init",
            RunStage::CredentialsLoaded => "credentials_loaded",
            RunStage::CandidatesListed => "candidates_listed",
            RunStage::NoCandidates => "no_candidates",
            RunStage::CandidateChosen => "candidate_chosen",
            RunStage::Downloaded => "downloaded",
            RunStage::Uploaded => "uploaded",
            RunStage::BookkeepingDone => "bookkeeping_done",
            RunStage::CleanedUp => "cleaned_up",
        };
        f.write_str(name)
    }
}

/// Errors that end a run.
#[derive(Debug, Error)]
pub enum OrchestratorError {
    /// A credential file could not be loaded.
    #[error("Failed to load credentials: {0}")]
    Credentials(#[from] AuthError),

    /// The Drive client could not be constructed.
    #[error("Failed to initialize Drive client: {0}")]
    DriveClient(#[source] SourceError),

    /// The YouTube client could not be constructed.
    #[error("Failed to initialize YouTube client: {0}")]
    YouTubeClient(#[source] PublishError),

    /// Folder listing failed.
    #[error("Failed to list candidates: {0}")]
    Listing(#[source] SourceError),

    /// A ledger record could not be read.
    #[error("Failed to read ledger: {0}")]
    LedgerRead(#[source] LedgerError),

    /// Download of the chosen file failed. The staged file may be left behind.
    #[error("Failed to download {name}: {source}")]
    Download {
        name: String,
        staged: PathBuf,
        #[source]
        source: SourceError,
    },

    /// Upload failed. The candidate stays unprocessed; the staged file is left behind.
    #[error("Failed to upload {name}: {source}")]
    Upload {
        name: String,
        staged: PathBuf,
        #[source]
        source: PublishError,
    },

    /// The video is published but could not be fully recorded.
    #[error("Video {video_id} was published but bookkeeping failed: {source}")]
    Bookkeeping {
        video_id: String,
        #[source]
        source: LedgerError,
    },
}

impl OrchestratorError {
    /// Last stage the run completed before failing.
    pub fn stage(&self) -> RunStage {
        match self {
            OrchestratorError::Credentials(_)
            | OrchestratorError::DriveClient(_)
            | OrchestratorError::YouTubeClient(_) => RunStage::Init,
            OrchestratorError::Listing(_) => RunStage::CredentialsLoaded,
            OrchestratorError::LedgerRead(_) => RunStage::CandidatesListed,
            OrchestratorError::Download { .. } => RunStage::CandidateChosen,
            OrchestratorError::Upload { .. } => RunStage::Downloaded,
            OrchestratorError::Bookkeeping { .. } => RunStage::Uploaded,
        }
    }

    /// Local file the failed run may have left behind.
    pub fn leftover_file(&self) -> Option<&PathBuf> {
        match self {
            OrchestratorError::Download { staged, .. } | OrchestratorError::Upload { staged, .. } => {
                Some(staged)
            }
            _ => None,
        }
    }
}

/// Result of a run that did not fail.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum RunOutcome {
    /// One video was uploaded and recorded.
    Uploaded(UploadReport),
    /// Every candidate in the folder was already processed (or the folder is empty).
    NoCandidates {
        folder_id: String,
        total_candidates: usize,
        processed_count: usize,
    },
}

impl RunOutcome {
    /// Whether the run should be reported as successful.
    pub fn is_success(&self) -> bool {
        matches!(self, RunOutcome::Uploaded(_))
    }
}

/// Summary of a successful upload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadReport {
    pub candidate: CandidateFile,
    pub video_id: String,
    pub title: String,
    pub watch_url: String,
    pub file_size_bytes: u64,
    pub file_size_mb: f64,
    /// Uploads recorded today, including this one.
    pub daily_count: u32,
    /// Unprocessed candidates left after this upload.
    pub remaining: usize,
    /// Processed IDs recorded, including this one.
    pub processed_count: usize,
}

/// Candidates not yet uploaded, as reported by a dry listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingCandidates {
    pub folder_id: String,
    pub unprocessed: Vec<CandidateFile>,
    pub total_candidates: usize,
    pub processed_count: usize,
}
