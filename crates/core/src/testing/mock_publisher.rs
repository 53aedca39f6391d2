//! Mock video publisher for testing.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::youtube::{PublishError, PublishedVideo, VideoMetadata, VideoPublisher};

/// A recorded publish call for test assertions.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedPublish {
    pub media: PathBuf,
    pub metadata: VideoMetadata,
    /// Size of the media file when publish was called.
    pub media_size: u64,
}

/// Mock implementation of the VideoPublisher trait.
///
/// Returns sequential IDs (`mockvid0001`, `mockvid0002`, ...) unless a
/// fixed ID is configured.
#[derive(Debug)]
pub struct MockPublisher {
    published: Arc<RwLock<Vec<RecordedPublish>>>,
    next_error: Arc<RwLock<Option<PublishError>>>,
    fixed_id: Arc<RwLock<Option<String>>>,
    counter: Arc<RwLock<u32>>,
}

impl Default for MockPublisher {
    fn default() -> Self {
        Self::new()
    }
}

impl MockPublisher {
    pub fn new() -> Self {
        Self {
            published: Arc::new(RwLock::new(Vec::new())),
            next_error: Arc::new(RwLock::new(None)),
            fixed_id: Arc::new(RwLock::new(None)),
            counter: Arc::new(RwLock::new(0)),
        }
    }

    /// Every publish returns this ID.
    pub async fn set_video_id(&self, id: impl Into<String>) {
        *self.fixed_id.write().await = Some(id.into());
    }

    pub async fn recorded_publishes(&self) -> Vec<RecordedPublish> {
        self.published.read().await.clone()
    }

    pub async fn publish_count(&self) -> usize {
        self.published.read().await.len()
    }

    /// Configure the next publish to fail with the given error.
    pub async fn set_next_error(&self, error: PublishError) {
        *self.next_error.write().await = Some(error);
    }

    async fn next_id(&self) -> String {
        if let Some(id) = self.fixed_id.read().await.clone() {
            return id;
        }
        let mut counter = self.counter.write().await;
        *counter += 1;
        format!("mockvid{:04}", *counter)
    }
}

#[async_trait]
impl VideoPublisher for MockPublisher {
    async fn publish(
        &self,
        media: &Path,
        metadata: &VideoMetadata,
    ) -> Result<PublishedVideo, PublishError> {
        if let Some(err) = self.next_error.write().await.take() {
            return Err(err);
        }

        let media_size = tokio::fs::metadata(media)
            .await
            .map_err(|source| PublishError::ReadFailed {
                path: media.to_path_buf(),
                source,
            })?
            .len();

        self.published.write().await.push(RecordedPublish {
            media: media.to_path_buf(),
            metadata: metadata.clone(),
            media_size,
        });

        Ok(PublishedVideo {
            id: self.next_id().await,
        })
    }
}
