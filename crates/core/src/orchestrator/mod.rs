//! Upload orchestrator.
//!
//! Runs one upload per invocation. The process is started by an external
//! scheduler; nothing here loops or retries.

mod config;
mod runner;
mod types;

pub use config::OrchestratorSettings;
pub use runner::{filter_unprocessed, UploadOrchestrator};
pub use types::{OrchestratorError, PendingCandidates, RunOutcome, RunStage, UploadReport};
