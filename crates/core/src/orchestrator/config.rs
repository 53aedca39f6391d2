//! Orchestrator settings.

use std::path::PathBuf;

use crate::config::Config;
use crate::metadata::MetadataTemplate;

/// Everything the orchestrator needs besides its collaborators.
#[derive(Debug, Clone)]
pub struct OrchestratorSettings {
    /// Drive folder to pick candidates from.
    pub folder_id: String,
    /// Directory the chosen file is downloaded into.
    pub staging_dir: PathBuf,
    /// Prefix for staged file names.
    pub file_prefix: String,
    /// Base of the watch link in the report (e.g. "https://youtu.be").
    pub watch_url_base: String,
    pub metadata: MetadataTemplate,
}

impl OrchestratorSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            folder_id: config.source.folder_id.clone(),
            staging_dir: config.download.temp_dir.clone(),
            file_prefix: config.download.file_prefix.clone(),
            watch_url_base: config.publish.watch_url_base.clone(),
            metadata: MetadataTemplate::from(&config.publish),
        }
    }

    /// Public link to an uploaded video.
    pub fn watch_url(&self, video_id: &str) -> String {
        format!("{}/{}", self.watch_url_base.trim_end_matches('/'), video_id)
    }

    /// Browser link to the source folder.
    pub fn folder_url(&self) -> String {
        format!("https://drive.google.com/drive/folders/{}", self.folder_id)
    }
}
