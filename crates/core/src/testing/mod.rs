//! Testing utilities and mock implementations.
//!
//! Mocks for every collaborator of the upload orchestrator, so a full run
//! can be exercised without Drive, YouTube or real randomness.
//!
//! # Example
//!
//! ```rust,ignore
//! use drivetube_core::testing::{fixtures, FixedSelector, MemoryLedgerStore, MockFileSource, MockPublisher};
//!
//! let source = MockFileSource::with_candidates(vec![fixtures::candidate("id1", "a.mp4")]);
//! let publisher = MockPublisher::new();
//! let ledger = MemoryLedgerStore::new();
//!
//! // Wire into UploadOrchestrator and call run()...
//! ```

mod memory_ledger;
mod mock_file_source;
mod mock_publisher;
mod stubs;

pub use memory_ledger::{LedgerRecord, MemoryLedgerStore};
pub use mock_file_source::{MockFileSource, RecordedDownload};
pub use mock_publisher::{MockPublisher, RecordedPublish};
pub use stubs::{FixedClock, FixedSelector, SequenceSelector, StaticTokenProvider};

/// Test fixtures and helper functions.
pub mod fixtures {
    use std::path::Path;

    use crate::drive::CandidateFile;
    use crate::metadata::MetadataTemplate;
    use crate::orchestrator::OrchestratorSettings;

    /// A candidate stored directly in the folder.
    pub fn candidate(id: &str, name: &str) -> CandidateFile {
        CandidateFile::direct(id, name)
    }

    /// A shortcut candidate whose content lives at `real_id`.
    pub fn shortcut(id: &str, real_id: &str, name: &str) -> CandidateFile {
        CandidateFile {
            id: id.to_string(),
            real_id: real_id.to_string(),
            name: name.to_string(),
        }
    }

    /// `count` direct candidates named `video_<n>.mp4` with IDs `id<n>`.
    pub fn candidates(count: usize) -> Vec<CandidateFile> {
        (1..=count)
            .map(|n| candidate(&format!("id{}", n), &format!("video_{}.mp4", n)))
            .collect()
    }

    pub fn metadata_template() -> MetadataTemplate {
        MetadataTemplate::new(
            vec![
                "Morning on the farm".to_string(),
                "Feeding time".to_string(),
            ],
            "Daily life on a small farm.",
            vec!["farm".to_string(), "animals".to_string()],
            "15",
        )
    }

    /// Settings that stage downloads into `staging_dir`.
    pub fn settings(staging_dir: &Path) -> OrchestratorSettings {
        OrchestratorSettings {
            folder_id: "test-folder".to_string(),
            staging_dir: staging_dir.to_path_buf(),
            file_prefix: "drivetube".to_string(),
            watch_url_base: "https://youtu.be".to_string(),
            metadata: metadata_template(),
        }
    }
}
