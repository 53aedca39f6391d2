//! Google Drive v3 API client.
//!
//! Only two endpoints are used: `files.list` for the folder listing and
//! `files.get?alt=media` for the content download.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response};
use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

use crate::auth::TokenProvider;
use crate::config::SourceConfig;

use super::types::{CandidateFile, DriveEntry, FileListPage};
use super::{FileSource, SourceError};

const LIST_FIELDS: &str = "nextPageToken, files(id, name, mimeType, shortcutDetails)";

/// Connection settings for [`DriveClient`].
#[derive(Debug, Clone)]
pub struct DriveClientConfig {
    /// API base URL (e.g. "https://www.googleapis.com/drive/v3").
    pub base_url: String,
    /// Entries per listing page.
    pub page_size: u32,
    /// Timeout for listing requests, and connect timeout for downloads.
    pub timeout_secs: u32,
}

impl From<&SourceConfig> for DriveClientConfig {
    fn from(config: &SourceConfig) -> Self {
        Self {
            base_url: config.api_base_url.clone(),
            page_size: config.page_size,
            timeout_secs: config.timeout_secs,
        }
    }
}

/// Drive API client.
pub struct DriveClient {
    client: Client,
    config: DriveClientConfig,
    token: Arc<dyn TokenProvider>,
}

impl DriveClient {
    /// Create a new Drive client.
    pub fn new(
        config: DriveClientConfig,
        token: Arc<dyn TokenProvider>,
    ) -> Result<Self, SourceError> {
        // No overall timeout: downloads of large videos may take a long time.
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(config.timeout_secs as u64))
            .build()?;

        Ok(Self {
            client,
            config,
            token,
        })
    }

    /// Get the base URL without trailing slash.
    fn base_url(&self) -> &str {
        self.config.base_url.trim_end_matches('/')
    }

    fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.config.timeout_secs as u64)
    }

    async fn fetch_page(
        &self,
        query: &str,
        page_token: Option<&str>,
    ) -> Result<FileListPage, SourceError> {
        let url = format!("{}/files", self.base_url());
        let token = self.token.access_token().await?;
        let page_size = self.config.page_size.to_string();

        let mut request = self
            .client
            .get(&url)
            .bearer_auth(token)
            .timeout(self.request_timeout())
            .query(&[
                ("q", query),
                ("fields", LIST_FIELDS),
                ("pageSize", page_size.as_str()),
                ("supportsAllDrives", "true"),
                ("includeItemsFromAllDrives", "true"),
            ]);

        if let Some(page_token) = page_token {
            request = request.query(&[("pageToken", page_token)]);
        }

        let response = check_status(request.send().await?, "folder listing").await?;

        response.json().await.map_err(|e| {
            SourceError::ParseError(format!("Failed to parse file listing response: {}", e))
        })
    }
}

/// Map error statuses onto [`SourceError`].
async fn check_status(response: Response, what: &str) -> Result<Response, SourceError> {
    let status = response.status();
    if status == 404 {
        return Err(SourceError::NotFound(what.to_string()));
    }
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(SourceError::ApiError {
            status: status.as_u16(),
            message: body,
        });
    }
    Ok(response)
}

/// Build the `q` filter for the direct, non-trashed children of a folder.
fn folder_query(folder_id: &str) -> String {
    let escaped = folder_id.replace('\\', "\\\\").replace('\'', "\\'");
    format!("'{}' in parents and trashed = false", escaped)
}

#[async_trait]
impl FileSource for DriveClient {
    async fn list_candidates(&self, folder_id: &str) -> Result<Vec<CandidateFile>, SourceError> {
        let query = folder_query(folder_id);
        debug!("Drive listing: q=\"{}\"", query);

        let mut candidates = Vec::new();
        let mut page_token: Option<String> = None;
        let mut pages = 0usize;

        loop {
            let page = self.fetch_page(&query, page_token.as_deref()).await?;
            pages += 1;

            debug!(
                "Drive listing page {}: {} entries, more={}",
                pages,
                page.files.len(),
                page.next_page_token.is_some()
            );

            candidates.extend(page.files.into_iter().filter_map(DriveEntry::into_candidate));

            match page.next_page_token {
                Some(token) if !token.is_empty() => page_token = Some(token),
                _ => break,
            }
        }

        debug!(
            "Drive listing finished: {} candidates over {} pages",
            candidates.len(),
            pages
        );
        Ok(candidates)
    }

    async fn download(&self, file_id: &str, destination: &Path) -> Result<u64, SourceError> {
        let url = format!("{}/files/{}", self.base_url(), file_id);
        let token = self.token.access_token().await?;

        debug!("Drive download: id={} -> {:?}", file_id, destination);

        let response = self
            .client
            .get(&url)
            .bearer_auth(token)
            .query(&[("alt", "media"), ("supportsAllDrives", "true")])
            .send()
            .await?;
        let mut response = check_status(response, &format!("file {}", file_id)).await?;

        let total = response.content_length();
        let write_failed = |e| SourceError::WriteFailed {
            path: destination.to_path_buf(),
            source: e,
        };

        let mut file = File::create(destination).await.map_err(write_failed)?;
        let mut written: u64 = 0;
        let mut next_report: u64 = 25;

        while let Some(chunk) = response.chunk().await? {
            file.write_all(&chunk).await.map_err(write_failed)?;
            written += chunk.len() as u64;

            if let Some(total) = total.filter(|t| *t > 0) {
                let pct = written * 100 / total;
                if pct >= next_report && pct < 100 {
                    info!("  Download progress: {}%", pct);
                    next_report = (pct / 25 + 1) * 25;
                }
            }
        }

        file.flush().await.map_err(write_failed)?;

        Ok(written)
    }
}
