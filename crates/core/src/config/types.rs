use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::youtube::PrivacyStatus;

/// Root configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub source: SourceConfig,
    pub publish: PublishConfig,
    #[serde(default)]
    pub credentials: CredentialsConfig,
    #[serde(default)]
    pub ledger: LedgerConfig,
    #[serde(default)]
    pub download: DownloadConfig,
}

/// Drive folder the candidates are listed from
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SourceConfig {
    /// Drive folder ID whose direct children are candidates.
    pub folder_id: String,
    /// Drive v3 API base URL.
    #[serde(default = "default_drive_api_url")]
    pub api_base_url: String,
    /// Entries requested per listing page (1-1000).
    #[serde(default = "default_page_size")]
    pub page_size: u32,
    /// Timeout for listing requests in seconds (default: 60).
    /// Also used as the connect timeout for downloads.
    #[serde(default = "default_source_timeout")]
    pub timeout_secs: u32,
}

fn default_drive_api_url() -> String {
    "https://www.googleapis.com/drive/v3".to_string()
}

fn default_page_size() -> u32 {
    100
}

fn default_source_timeout() -> u32 {
    60
}

/// Publishing target and the metadata attached to each upload
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PublishConfig {
    /// YouTube resumable upload endpoint.
    #[serde(default = "default_upload_url")]
    pub upload_url: String,
    /// Base for the watch link printed after an upload.
    #[serde(default = "default_watch_url_base")]
    pub watch_url_base: String,
    /// Title templates; one is picked per upload and suffixed with ` #<n>`.
    pub titles: Vec<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub tags: Vec<String>,
    /// YouTube category (default: "26", Howto & Style).
    #[serde(default = "default_category_id")]
    pub category_id: String,
    #[serde(default)]
    pub privacy_status: PrivacyStatus,
    #[serde(default)]
    pub made_for_kids: bool,
    /// Bytes per upload chunk; must be a multiple of 256 KiB.
    #[serde(default = "default_chunk_size")]
    pub chunk_size_bytes: u64,
    /// Timeout per upload request in seconds (default: 300).
    #[serde(default = "default_publish_timeout")]
    pub timeout_secs: u32,
}

fn default_upload_url() -> String {
    "https://www.googleapis.com/upload/youtube/v3/videos".to_string()
}

fn default_watch_url_base() -> String {
    "https://youtu.be".to_string()
}

fn default_category_id() -> String {
    "26".to_string()
}

fn default_chunk_size() -> u64 {
    8 * 1024 * 1024 // 8 MB
}

fn default_publish_timeout() -> u32 {
    300
}

/// Credential file locations
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CredentialsConfig {
    /// Service-account key used for read-only Drive access.
    #[serde(default = "default_service_account_path")]
    pub drive_service_account: PathBuf,
    /// Authorized-user token (with refresh token) for the YouTube channel.
    #[serde(default = "default_youtube_token_path")]
    pub youtube_token: PathBuf,
}

impl Default for CredentialsConfig {
    fn default() -> Self {
        Self {
            drive_service_account: default_service_account_path(),
            youtube_token: default_youtube_token_path(),
        }
    }
}

fn default_service_account_path() -> PathBuf {
    PathBuf::from("service-account-key.json")
}

fn default_youtube_token_path() -> PathBuf {
    PathBuf::from("youtube-token.json")
}

/// Locations of the three bookkeeping files
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LedgerConfig {
    #[serde(default = "default_processed_path")]
    pub processed_path: PathBuf,
    #[serde(default = "default_history_path")]
    pub history_path: PathBuf,
    #[serde(default = "default_daily_count_path")]
    pub daily_count_path: PathBuf,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            processed_path: default_processed_path(),
            history_path: default_history_path(),
            daily_count_path: default_daily_count_path(),
        }
    }
}

fn default_processed_path() -> PathBuf {
    PathBuf::from("processed_videos.json")
}

fn default_history_path() -> PathBuf {
    PathBuf::from("upload_history.json")
}

fn default_daily_count_path() -> PathBuf {
    PathBuf::from("daily_upload_count.json")
}

/// Local staging of the downloaded file
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DownloadConfig {
    #[serde(default = "default_temp_dir")]
    pub temp_dir: PathBuf,
    /// Prefix of the staged file name.
    #[serde(default = "default_file_prefix")]
    pub file_prefix: String,
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            temp_dir: default_temp_dir(),
            file_prefix: default_file_prefix(),
        }
    }
}

fn default_temp_dir() -> PathBuf {
    std::env::temp_dir()
}

fn default_file_prefix() -> String {
    "drivetube".to_string()
}

/// Sanitized config for log output (no paths to secrets' contents, no text blobs)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedConfig {
    pub folder_id: String,
    pub page_size: u32,
    pub title_templates: usize,
    pub tags: usize,
    pub category_id: String,
    pub privacy_status: PrivacyStatus,
    pub made_for_kids: bool,
    pub chunk_size_bytes: u64,
    pub service_account_configured: bool,
    pub youtube_token_configured: bool,
    pub ledger: LedgerConfig,
    pub temp_dir: PathBuf,
}

impl From<&Config> for SanitizedConfig {
    fn from(config: &Config) -> Self {
        Self {
            folder_id: config.source.folder_id.clone(),
            page_size: config.source.page_size,
            title_templates: config.publish.titles.len(),
            tags: config.publish.tags.len(),
            category_id: config.publish.category_id.clone(),
            privacy_status: config.publish.privacy_status,
            made_for_kids: config.publish.made_for_kids,
            chunk_size_bytes: config.publish.chunk_size_bytes,
            service_account_configured: config.credentials.drive_service_account.exists(),
            youtube_token_configured: config.credentials.youtube_token.exists(),
            ledger: config.ledger.clone(),
            temp_dir: config.download.temp_dir.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"
[source]
folder_id = "folder-123"

[publish]
titles = ["Watch this"]
"#;

    #[test]
    fn test_deserialize_minimal_config() {
        let config: Config = toml::from_str(MINIMAL).unwrap();
        assert_eq!(config.source.folder_id, "folder-123");
        assert_eq!(config.source.page_size, 100);
        assert_eq!(
            config.source.api_base_url,
            "https://www.googleapis.com/drive/v3"
        );
        assert_eq!(config.publish.titles, vec!["Watch this"]);
        assert_eq!(config.publish.category_id, "26");
        assert_eq!(config.publish.privacy_status, PrivacyStatus::Public);
        assert!(!config.publish.made_for_kids);
        assert_eq!(config.publish.chunk_size_bytes, 8 * 1024 * 1024);
    }

    #[test]
    fn test_deserialize_with_default_ledger() {
        let config: Config = toml::from_str(MINIMAL).unwrap();
        assert_eq!(
            config.ledger.processed_path.to_str().unwrap(),
            "processed_videos.json"
        );
        assert_eq!(
            config.ledger.history_path.to_str().unwrap(),
            "upload_history.json"
        );
        assert_eq!(
            config.ledger.daily_count_path.to_str().unwrap(),
            "daily_upload_count.json"
        );
    }

    #[test]
    fn test_deserialize_missing_source_fails() {
        let toml = r#"
[publish]
titles = ["Watch this"]
"#;
        let result: Result<Config, _> = toml::from_str(toml);
        assert!(result.is_err());
    }

    #[test]
    fn test_deserialize_full_publish_section() {
        let toml = r#"
[source]
folder_id = "folder-123"
page_size = 50

[publish]
titles = ["A", "B"]
description = "Subscribe!"
tags = ["farming", "tractor"]
category_id = "22"
privacy_status = "unlisted"
made_for_kids = true
chunk_size_bytes = 262144

[download]
temp_dir = "/var/tmp/staging"
file_prefix = "farm"
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.source.page_size, 50);
        assert_eq!(config.publish.description, "Subscribe!");
        assert_eq!(config.publish.tags.len(), 2);
        assert_eq!(config.publish.category_id, "22");
        assert_eq!(config.publish.privacy_status, PrivacyStatus::Unlisted);
        assert!(config.publish.made_for_kids);
        assert_eq!(config.publish.chunk_size_bytes, 262144);
        assert_eq!(config.download.temp_dir.to_str().unwrap(), "/var/tmp/staging");
        assert_eq!(config.download.file_prefix, "farm");
    }

    #[test]
    fn test_sanitized_config() {
        let config: Config = toml::from_str(MINIMAL).unwrap();
        let sanitized = SanitizedConfig::from(&config);
        assert_eq!(sanitized.folder_id, "folder-123");
        assert_eq!(sanitized.title_templates, 1);
        assert_eq!(sanitized.tags, 0);
        // Default credential paths don't exist in the test working directory
        assert!(!sanitized.youtube_token_configured);
    }
}
