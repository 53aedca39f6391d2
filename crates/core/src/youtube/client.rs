//! YouTube Data API v3 resumable upload client.

use std::io::SeekFrom;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{CONTENT_RANGE, LOCATION, RANGE};
use reqwest::{redirect, Client, StatusCode};
use tokio::fs::File;
use tokio::io::{AsyncReadExt, AsyncSeekExt};
use tracing::{debug, info};

use crate::auth::TokenProvider;
use crate::config::PublishConfig;

use super::types::{PublishedVideo, VideoInsertBody, VideoMetadata};
use super::{PublishError, VideoPublisher};

const FALLBACK_CONTENT_TYPE: &str = "video/mp4";

/// Upload settings for [`YouTubeClient`].
#[derive(Debug, Clone)]
pub struct YouTubeClientConfig {
    /// Resumable upload endpoint for `videos.insert`.
    pub upload_url: String,
    /// Bytes per chunk (multiple of 256 KiB).
    pub chunk_size_bytes: u64,
    /// Timeout per request in seconds.
    pub timeout_secs: u32,
}

impl From<&PublishConfig> for YouTubeClientConfig {
    fn from(config: &PublishConfig) -> Self {
        Self {
            upload_url: config.upload_url.clone(),
            chunk_size_bytes: config.chunk_size_bytes,
            timeout_secs: config.timeout_secs,
        }
    }
}

/// YouTube upload client.
pub struct YouTubeClient {
    client: Client,
    config: YouTubeClientConfig,
    token: Arc<dyn TokenProvider>,
}

impl YouTubeClient {
    /// Create a new YouTube client.
    pub fn new(
        config: YouTubeClientConfig,
        token: Arc<dyn TokenProvider>,
    ) -> Result<Self, PublishError> {
        // 308 is the protocol's "resume incomplete", never a redirect here
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs as u64))
            .redirect(redirect::Policy::none())
            .build()?;

        Ok(Self {
            client,
            config,
            token,
        })
    }

    /// Open an upload session and return its URI.
    async fn start_session(
        &self,
        metadata: &VideoMetadata,
        content_type: &str,
        size: u64,
    ) -> Result<String, PublishError> {
        let token = self.token.access_token().await?;

        debug!(
            "YouTube upload session: title='{}', size={}, type={}",
            metadata.title, size, content_type
        );

        let response = self
            .client
            .post(&self.config.upload_url)
            .bearer_auth(token)
            .query(&[("uploadType", "resumable"), ("part", "snippet,status")])
            .header("X-Upload-Content-Type", content_type)
            .header("X-Upload-Content-Length", size.to_string())
            .json(&VideoInsertBody::from(metadata))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(PublishError::ApiError {
                status: status.as_u16(),
                message: body,
            });
        }

        response
            .headers()
            .get(LOCATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
            .ok_or_else(|| {
                PublishError::Protocol("upload session response has no Location header".to_string())
            })
    }

    /// Send one chunk starting at `offset`.
    async fn send_chunk(
        &self,
        session_uri: &str,
        file: &mut File,
        media: &Path,
        offset: u64,
        size: u64,
    ) -> Result<ChunkOutcome, PublishError> {
        let end = (offset + self.config.chunk_size_bytes).min(size);
        let mut buf = vec![0u8; (end - offset) as usize];

        let read_failed = |e| PublishError::ReadFailed {
            path: media.to_path_buf(),
            source: e,
        };
        file.seek(SeekFrom::Start(offset)).await.map_err(read_failed)?;
        file.read_exact(&mut buf).await.map_err(read_failed)?;

        let token = self.token.access_token().await?;
        let response = self
            .client
            .put(session_uri)
            .bearer_auth(token)
            .header(CONTENT_RANGE, format!("bytes {}-{}/{}", offset, end - 1, size))
            .body(buf)
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::PERMANENT_REDIRECT {
            let next = response
                .headers()
                .get(RANGE)
                .and_then(|v| v.to_str().ok())
                .and_then(parse_range_end)
                .map(|last| last + 1)
                .unwrap_or(0);
            return Ok(ChunkOutcome::Incomplete { next_offset: next });
        }

        if status == StatusCode::OK || status == StatusCode::CREATED {
            let video: PublishedVideo = response.json().await.map_err(|e| {
                PublishError::ParseError(format!("Failed to parse video resource: {}", e))
            })?;
            return Ok(ChunkOutcome::Complete(video));
        }

        let body = response.text().await.unwrap_or_default();
        Err(PublishError::ApiError {
            status: status.as_u16(),
            message: body,
        })
    }
}

enum ChunkOutcome {
    Incomplete { next_offset: u64 },
    Complete(PublishedVideo),
}

/// Parse the last persisted byte from a `Range: bytes=0-N` header.
fn parse_range_end(value: &str) -> Option<u64> {
    value
        .trim()
        .strip_prefix("bytes=")?
        .split_once('-')?
        .1
        .trim()
        .parse()
        .ok()
}

/// Upload content type for a local file, falling back to `video/mp4`.
pub fn content_type_for(path: &Path) -> String {
    mime_guess::from_path(path)
        .first()
        .filter(|m| m.type_() == mime_guess::mime::VIDEO)
        .map(|m| m.essence_str().to_string())
        .unwrap_or_else(|| FALLBACK_CONTENT_TYPE.to_string())
}

#[async_trait]
impl VideoPublisher for YouTubeClient {
    async fn publish(
        &self,
        media: &Path,
        metadata: &VideoMetadata,
    ) -> Result<PublishedVideo, PublishError> {
        let mut file = File::open(media)
            .await
            .map_err(|e| PublishError::ReadFailed {
                path: media.to_path_buf(),
                source: e,
            })?;
        let size = file
            .metadata()
            .await
            .map_err(|e| PublishError::ReadFailed {
                path: media.to_path_buf(),
                source: e,
            })?
            .len();

        if size == 0 {
            return Err(PublishError::EmptyFile(media.to_path_buf()));
        }

        let content_type = content_type_for(media);
        let session_uri = self.start_session(metadata, &content_type, size).await?;

        let mut offset = 0u64;
        loop {
            match self
                .send_chunk(&session_uri, &mut file, media, offset, size)
                .await?
            {
                ChunkOutcome::Complete(video) => {
                    info!("  Upload progress: 100%");
                    return Ok(video);
                }
                ChunkOutcome::Incomplete { next_offset } => {
                    if next_offset <= offset {
                        return Err(PublishError::Protocol(format!(
                            "server persisted no new bytes after offset {}",
                            offset
                        )));
                    }
                    if next_offset >= size {
                        return Err(PublishError::Protocol(
                            "server acknowledged every byte without returning the video"
                                .to_string(),
                        ));
                    }
                    info!("  Upload progress: {}%", next_offset * 100 / size);
                    offset = next_offset;
                }
            }
        }
    }
}
