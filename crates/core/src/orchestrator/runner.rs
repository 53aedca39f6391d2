//! Upload orchestrator implementation.
//!
//! One call to [`UploadOrchestrator::run`] performs one upload:
//! list → filter → pick → download → publish → record → clean up.

use std::path::Path;
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::auth::{
    AuthorizedUserCredentials, ServiceAccountCredentials, TokenProvider, DRIVE_READONLY_SCOPE,
};
use crate::clock::{Clock, SystemClock};
use crate::config::Config;
use crate::drive::{CandidateFile, DriveClient, FileSource};
use crate::ledger::{
    size_in_mb, DailyCounter, HistoryEntry, JsonLedgerStore, LedgerError, LedgerStore,
    ProcessedSet, UploadHistory,
};
use crate::naming::staging_path;
use crate::selection::{choose, RandomSelector, Selector};
use crate::youtube::{PublishedVideo, VideoMetadata, VideoPublisher, YouTubeClient};

use super::config::OrchestratorSettings;
use super::types::{OrchestratorError, PendingCandidates, RunOutcome, RunStage, UploadReport};

/// Candidates whose listing ID is not in `processed`, in listing order.
pub fn filter_unprocessed(
    candidates: &[CandidateFile],
    processed: &ProcessedSet,
) -> Vec<CandidateFile> {
    candidates
        .iter()
        .filter(|c| !processed.contains(&c.id))
        .cloned()
        .collect()
}

/// Ledger records loaded at the start of a run.
struct LoadedRecords {
    processed: ProcessedSet,
    history: UploadHistory,
    counter: Option<DailyCounter>,
}

/// Drives a single upload from the source folder to the publishing platform.
pub struct UploadOrchestrator {
    settings: OrchestratorSettings,
    source: Arc<dyn FileSource>,
    publisher: Arc<dyn VideoPublisher>,
    ledger: Arc<dyn LedgerStore>,
    selector: Arc<dyn Selector>,
    clock: Arc<dyn Clock>,
}

impl UploadOrchestrator {
    /// Create an orchestrator with a random selector and the system clock.
    pub fn new(
        settings: OrchestratorSettings,
        source: Arc<dyn FileSource>,
        publisher: Arc<dyn VideoPublisher>,
        ledger: Arc<dyn LedgerStore>,
    ) -> Self {
        Self {
            settings,
            source,
            publisher,
            ledger,
            selector: Arc::new(RandomSelector),
            clock: Arc::new(SystemClock),
        }
    }

    /// Build the production orchestrator: load both credentials and create
    /// the Drive client, YouTube client and JSON ledger store.
    ///
    /// Nothing is touched remotely; a missing or malformed credential file
    /// fails here.
    pub fn from_config(config: &Config) -> Result<Self, OrchestratorError> {
        info!("[1/5] Initializing API clients");

        let drive_token: Arc<dyn TokenProvider> = Arc::new(ServiceAccountCredentials::from_file(
            &config.credentials.drive_service_account,
            DRIVE_READONLY_SCOPE,
        )?);
        let youtube_token: Arc<dyn TokenProvider> = Arc::new(
            AuthorizedUserCredentials::from_file(&config.credentials.youtube_token)?,
        );
        debug!(
            drive = drive_token.kind(),
            youtube = youtube_token.kind(),
            "Credentials loaded"
        );

        let source = DriveClient::new((&config.source).into(), drive_token)
            .map_err(OrchestratorError::DriveClient)?;
        let publisher = YouTubeClient::new((&config.publish).into(), youtube_token)
            .map_err(OrchestratorError::YouTubeClient)?;
        let ledger = JsonLedgerStore::new(config.ledger.clone());

        info!("  Drive and YouTube clients ready");

        Ok(Self::new(
            OrchestratorSettings::from_config(config),
            Arc::new(source),
            Arc::new(publisher),
            Arc::new(ledger),
        ))
    }

    pub fn with_selector(mut self, selector: Arc<dyn Selector>) -> Self {
        self.selector = selector;
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn settings(&self) -> &OrchestratorSettings {
        &self.settings
    }

    /// List and filter without downloading, uploading or writing anything.
    pub async fn pending(&self) -> Result<PendingCandidates, OrchestratorError> {
        let candidates = self.list_candidates().await?;
        let processed = self
            .ledger
            .load_processed()
            .map_err(OrchestratorError::LedgerRead)?;
        let unprocessed = filter_unprocessed(&candidates, &processed);

        Ok(PendingCandidates {
            folder_id: self.settings.folder_id.clone(),
            unprocessed,
            total_candidates: candidates.len(),
            processed_count: processed.len(),
        })
    }

    /// Perform one upload.
    ///
    /// Returns [`RunOutcome::NoCandidates`] without side effects when every
    /// candidate was already processed. The processed set is only updated
    /// after the platform confirmed the upload.
    pub async fn run(&self) -> Result<RunOutcome, OrchestratorError> {
        let mut stage = RunStage::CredentialsLoaded;

        info!("[2/5] Checking Drive folder for videos");
        let candidates = self.list_candidates().await?;
        advance(&mut stage, RunStage::CandidatesListed);

        let records = self.load_records()?;
        let unprocessed = filter_unprocessed(&candidates, &records.processed);
        info!("  Found {} video(s) in folder", candidates.len());
        info!("  Already uploaded: {}", records.processed.len());
        info!("  Available to upload: {}", unprocessed.len());

        let Some(chosen) = choose(self.selector.as_ref(), &unprocessed).cloned() else {
            advance(&mut stage, RunStage::NoCandidates);
            warn!("No new videos to upload");
            if candidates.is_empty() {
                warn!("The folder has no video files");
            } else {
                warn!("All {} video(s) have already been uploaded", candidates.len());
            }
            info!("  Add more videos at {}", self.settings.folder_url());
            return Ok(RunOutcome::NoCandidates {
                folder_id: self.settings.folder_id.clone(),
                total_candidates: candidates.len(),
                processed_count: records.processed.len(),
            });
        };
        advance(&mut stage, RunStage::CandidateChosen);
        info!("[3/5] Selected: {}", chosen.name);
        if chosen.is_shortcut() {
            debug!(
                id = %chosen.id,
                real_id = %chosen.real_id,
                "Candidate is a shortcut, downloading its target"
            );
        }

        info!("[4/5] Downloading from Drive");
        let staged = staging_path(
            &self.settings.staging_dir,
            &self.settings.file_prefix,
            self.clock.now().naive_local(),
            &chosen.name,
        );
        let bytes = match self.source.download(&chosen.real_id, &staged).await {
            Ok(bytes) => bytes,
            Err(source) => {
                warn!("Download failed, staged file may remain at {}", staged.display());
                return Err(OrchestratorError::Download {
                    name: chosen.name.clone(),
                    staged,
                    source,
                });
            }
        };
        let file_size_mb = size_in_mb(bytes);
        advance(&mut stage, RunStage::Downloaded);
        info!("  Downloaded: {:.1} MB", file_size_mb);

        info!("[5/5] Uploading to YouTube");
        let metadata = self.settings.metadata.render(
            self.selector.as_ref(),
            records.processed.next_sequence_number(),
        );
        info!("  Title: {}", metadata.title);
        let video = match self.publisher.publish(&staged, &metadata).await {
            Ok(video) => video,
            Err(source) => {
                warn!("Upload failed, staged file left at {}", staged.display());
                return Err(OrchestratorError::Upload {
                    name: chosen.name.clone(),
                    staged,
                    source,
                });
            }
        };
        advance(&mut stage, RunStage::Uploaded);
        info!("  Upload complete: {}", video.id);

        let (processed_count, daily_count) = self
            .record_upload(records, &chosen, &metadata, &video, file_size_mb)
            .map_err(|source| OrchestratorError::Bookkeeping {
                video_id: video.id.clone(),
                source,
            })?;
        advance(&mut stage, RunStage::BookkeepingDone);

        remove_staged(&staged).await;
        advance(&mut stage, RunStage::CleanedUp);

        Ok(RunOutcome::Uploaded(UploadReport {
            watch_url: self.settings.watch_url(&video.id),
            video_id: video.id,
            title: metadata.title,
            candidate: chosen,
            file_size_bytes: bytes,
            file_size_mb,
            daily_count,
            remaining: unprocessed.len().saturating_sub(1),
            processed_count,
        }))
    }

    async fn list_candidates(&self) -> Result<Vec<CandidateFile>, OrchestratorError> {
        self.source
            .list_candidates(&self.settings.folder_id)
            .await
            .map_err(OrchestratorError::Listing)
    }

    fn load_records(&self) -> Result<LoadedRecords, OrchestratorError> {
        let processed = self
            .ledger
            .load_processed()
            .map_err(OrchestratorError::LedgerRead)?;
        let history = self
            .ledger
            .load_history()
            .map_err(OrchestratorError::LedgerRead)?;
        let counter = self
            .ledger
            .load_daily_counter()
            .map_err(OrchestratorError::LedgerRead)?;

        Ok(LoadedRecords {
            processed,
            history,
            counter,
        })
    }

    /// Persist processed set, history and daily counter, in that order.
    ///
    /// Returns the new processed count and today's upload count.
    fn record_upload(
        &self,
        records: LoadedRecords,
        chosen: &CandidateFile,
        metadata: &VideoMetadata,
        video: &PublishedVideo,
        file_size_mb: f64,
    ) -> Result<(usize, u32), LedgerError> {
        let LoadedRecords {
            mut processed,
            mut history,
            counter,
        } = records;
        let now = self.clock.now().naive_local();
        let today = now.date();

        if !processed.insert(chosen.id.clone()) {
            warn!("{} was already marked as processed", chosen.id);
        }
        self.ledger.save_processed(&processed)?;

        history.append(HistoryEntry {
            timestamp: now,
            title: metadata.title.clone(),
            destination_video_id: video.id.clone(),
            source_file_name: chosen.name.clone(),
            file_size_mb,
        });
        self.ledger.save_history(&history)?;

        let counter = counter
            .unwrap_or_else(|| DailyCounter::fresh(today))
            .record_upload(today);
        self.ledger.save_daily_counter(&counter)?;

        debug!(
            processed = processed.len(),
            history = history.len(),
            today = counter.count,
            "Bookkeeping saved"
        );

        Ok((processed.len(), counter.count))
    }
}

fn advance(stage: &mut RunStage, next: RunStage) {
    debug!(from = %stage, to = %next, "Run stage");
    *stage = next;
}

/// Delete the staged copy. Failure is logged; the upload is already recorded.
async fn remove_staged(path: &Path) {
    match tokio::fs::remove_file(path).await {
        Ok(()) => debug!("Removed staged file {}", path.display()),
        Err(e) => warn!("Failed to remove staged file {}: {}", path.display(), e),
    }
}
