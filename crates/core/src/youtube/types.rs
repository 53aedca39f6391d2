//! Types for the YouTube Data API upload.

use serde::{Deserialize, Serialize};

/// Visibility of a published video.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrivacyStatus {
    #[default]
    Public,
    Unlisted,
    Private,
}

impl PrivacyStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PrivacyStatus::Public => "public",
            PrivacyStatus::Unlisted => "unlisted",
            PrivacyStatus::Private => "private",
        }
    }
}

/// Everything attached to an upload besides the media bytes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoMetadata {
    pub title: String,
    pub description: String,
    pub tags: Vec<String>,
    pub category_id: String,
    pub privacy_status: PrivacyStatus,
    pub made_for_kids: bool,
}

/// The video resource the platform created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublishedVideo {
    /// Platform-assigned video ID.
    pub id: String,
}

/// Body of the `videos.insert` call (`part=snippet,status`).
#[derive(Debug, Serialize)]
pub(crate) struct VideoInsertBody<'a> {
    pub snippet: VideoSnippet<'a>,
    pub status: VideoStatus,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct VideoSnippet<'a> {
    pub title: &'a str,
    pub description: &'a str,
    pub tags: &'a [String],
    pub category_id: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct VideoStatus {
    pub privacy_status: PrivacyStatus,
    pub made_for_kids: bool,
}

impl<'a> From<&'a VideoMetadata> for VideoInsertBody<'a> {
    fn from(metadata: &'a VideoMetadata) -> Self {
        Self {
            snippet: VideoSnippet {
                title: &metadata.title,
                description: &metadata.description,
                tags: &metadata.tags,
                category_id: &metadata.category_id,
            },
            status: VideoStatus {
                privacy_status: metadata.privacy_status,
                made_for_kids: metadata.made_for_kids,
            },
        }
    }
}
