//! Mock file source for testing.

use async_trait::async_trait;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::drive::{CandidateFile, FileSource, SourceError};

/// A recorded download for test assertions.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedDownload {
    /// ID passed to `download` (the content ID for shortcuts).
    pub file_id: String,
    pub destination: PathBuf,
}

/// Mock implementation of the FileSource trait.
///
/// Downloads write real bytes to the destination so that later steps
/// (upload, cleanup) see a file on disk.
///
/// # Example
///
/// ```rust,ignore
/// let source = MockFileSource::new();
/// source.set_candidates(vec![CandidateFile::direct("id1", "a.mp4")]).await;
/// source.set_content("id1", b"fake video".to_vec()).await;
///
/// let bytes = source.download("id1", &path).await?;
/// assert_eq!(source.recorded_downloads().await.len(), 1);
/// ```
#[derive(Debug)]
pub struct MockFileSource {
    candidates: Arc<RwLock<Vec<CandidateFile>>>,
    /// Content by file ID; unknown IDs get `default_content`.
    contents: Arc<RwLock<HashMap<String, Vec<u8>>>>,
    default_content: Vec<u8>,
    downloads: Arc<RwLock<Vec<RecordedDownload>>>,
    list_calls: Arc<RwLock<u32>>,
    /// If set, the next operation will fail with this error.
    next_error: Arc<RwLock<Option<SourceError>>>,
    /// If set, the next download writes its content and then fails.
    fail_after_write: Arc<RwLock<bool>>,
}

impl Default for MockFileSource {
    fn default() -> Self {
        Self::new()
    }
}

impl MockFileSource {
    pub fn new() -> Self {
        Self {
            candidates: Arc::new(RwLock::new(Vec::new())),
            contents: Arc::new(RwLock::new(HashMap::new())),
            default_content: b"mock video content".to_vec(),
            downloads: Arc::new(RwLock::new(Vec::new())),
            list_calls: Arc::new(RwLock::new(0)),
            next_error: Arc::new(RwLock::new(None)),
            fail_after_write: Arc::new(RwLock::new(false)),
        }
    }

    /// Mock pre-populated with candidates.
    pub fn with_candidates(candidates: Vec<CandidateFile>) -> Self {
        Self {
            candidates: Arc::new(RwLock::new(candidates)),
            ..Self::new()
        }
    }

    pub async fn set_candidates(&self, candidates: Vec<CandidateFile>) {
        *self.candidates.write().await = candidates;
    }

    /// Set the bytes a download of `file_id` produces.
    pub async fn set_content(&self, file_id: impl Into<String>, content: Vec<u8>) {
        self.contents.write().await.insert(file_id.into(), content);
    }

    pub async fn recorded_downloads(&self) -> Vec<RecordedDownload> {
        self.downloads.read().await.clone()
    }

    pub async fn list_call_count(&self) -> u32 {
        *self.list_calls.read().await
    }

    /// Configure the next operation to fail with the given error.
    pub async fn set_next_error(&self, error: SourceError) {
        *self.next_error.write().await = Some(error);
    }

    /// Make the next download write a partial file and then fail.
    pub async fn fail_next_download_after_write(&self) {
        *self.fail_after_write.write().await = true;
    }

    async fn take_error(&self) -> Option<SourceError> {
        self.next_error.write().await.take()
    }
}

#[async_trait]
impl FileSource for MockFileSource {
    async fn list_candidates(&self, _folder_id: &str) -> Result<Vec<CandidateFile>, SourceError> {
        *self.list_calls.write().await += 1;
        if let Some(err) = self.take_error().await {
            return Err(err);
        }
        Ok(self.candidates.read().await.clone())
    }

    async fn download(&self, file_id: &str, destination: &Path) -> Result<u64, SourceError> {
        if let Some(err) = self.take_error().await {
            return Err(err);
        }

        self.downloads.write().await.push(RecordedDownload {
            file_id: file_id.to_string(),
            destination: destination.to_path_buf(),
        });

        let content = self
            .contents
            .read()
            .await
            .get(file_id)
            .cloned()
            .unwrap_or_else(|| self.default_content.clone());

        tokio::fs::write(destination, &content)
            .await
            .map_err(|source| SourceError::WriteFailed {
                path: destination.to_path_buf(),
                source,
            })?;

        let mut fail_after_write = self.fail_after_write.write().await;
        if *fail_after_write {
            *fail_after_write = false;
            return Err(SourceError::ApiError {
                status: 500,
                message: "connection reset mid-download".to_string(),
            });
        }

        Ok(content.len() as u64)
    }
}
