//! Bookkeeping of processed files, upload history and the daily counter.
//!
//! The records live behind the [`LedgerStore`] trait. [`JsonLedgerStore`]
//! keeps them as human-readable JSON files; `testing::MemoryLedgerStore`
//! keeps them in memory.

mod json_store;
mod types;

pub use json_store::JsonLedgerStore;
pub use types::*;

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised by ledger storage.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// Record file exists but could not be read.
    #[error("Failed to read {path}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Record file is not valid JSON for its record type.
    #[error("Failed to parse {path}")]
    ParseFailed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Record could not be written.
    #[error("Failed to write {path}")]
    WriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Backend unavailable (used by non-file stores).
    #[error("Ledger storage unavailable: {0}")]
    Unavailable(String),
}

/// Storage for the three bookkeeping records.
///
/// Loading an absent record yields its empty value; the daily counter is
/// `None` when it has never been written.
pub trait LedgerStore: Send + Sync {
    fn load_processed(&self) -> Result<ProcessedSet, LedgerError>;

    fn save_processed(&self, processed: &ProcessedSet) -> Result<(), LedgerError>;

    fn load_history(&self) -> Result<UploadHistory, LedgerError>;

    fn save_history(&self, history: &UploadHistory) -> Result<(), LedgerError>;

    fn load_daily_counter(&self) -> Result<Option<DailyCounter>, LedgerError>;

    fn save_daily_counter(&self, counter: &DailyCounter) -> Result<(), LedgerError>;
}
