pub mod auth;
pub mod clock;
pub mod config;
pub mod drive;
pub mod ledger;
pub mod metadata;
pub mod naming;
pub mod orchestrator;
pub mod selection;
pub mod testing;
pub mod youtube;

pub use auth::{
    AuthError, AuthorizedUserCredentials, ServiceAccountCredentials, TokenProvider,
    DRIVE_READONLY_SCOPE,
};
pub use clock::{Clock, SystemClock};
pub use config::{
    load_config, load_config_from_str, validate_config, Config, ConfigError, SanitizedConfig,
};
pub use drive::{CandidateFile, DriveClient, FileSource, SourceError};
pub use ledger::{
    DailyCounter, HistoryEntry, JsonLedgerStore, LedgerError, LedgerStore, ProcessedSet,
    UploadHistory,
};
pub use metadata::MetadataTemplate;
pub use orchestrator::{
    OrchestratorError, OrchestratorSettings, PendingCandidates, RunOutcome, RunStage,
    UploadOrchestrator, UploadReport,
};
pub use selection::{RandomSelector, Selector};
pub use youtube::{PrivacyStatus, PublishError, VideoMetadata, VideoPublisher, YouTubeClient};
