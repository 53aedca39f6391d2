//! Drive listing entries and the candidates derived from them.

use serde::{Deserialize, Serialize};

/// MIME type Drive uses for shortcut entries.
pub const SHORTCUT_MIME_TYPE: &str = "application/vnd.google-apps.shortcut";

/// A file eligible for upload.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CandidateFile {
    /// Listing identity; this is what the processed set records.
    pub id: String,
    /// Content identity used for the download (differs from `id` for shortcuts).
    pub real_id: String,
    /// Display name in the folder.
    pub name: String,
}

impl CandidateFile {
    /// Candidate for a file stored directly in the folder.
    pub fn direct(id: impl Into<String>, name: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            real_id: id.clone(),
            id,
            name: name.into(),
        }
    }

    /// Whether this candidate points at content stored elsewhere.
    pub fn is_shortcut(&self) -> bool {
        self.id != self.real_id
    }
}

/// One `files[]` element of a Drive listing response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DriveEntry {
    pub id: String,
    pub name: String,
    pub mime_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shortcut_details: Option<ShortcutDetails>,
}

/// Target of a shortcut entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShortcutDetails {
    #[serde(default)]
    pub target_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_mime_type: Option<String>,
}

impl DriveEntry {
    /// Classify the entry.
    ///
    /// Shortcuts resolve to their target; a shortcut without a target, or
    /// whose target is known not to be a video, is skipped. Direct entries
    /// are kept when their MIME type is `video/*`. Everything else is
    /// ignored.
    pub fn into_candidate(self) -> Option<CandidateFile> {
        if self.mime_type == SHORTCUT_MIME_TYPE {
            let details = self.shortcut_details?;
            let target_id = details.target_id.filter(|t| !t.is_empty())?;
            if let Some(target_mime) = details.target_mime_type.as_deref() {
                if !is_video_mime(target_mime) {
                    return None;
                }
            }
            return Some(CandidateFile {
                id: self.id,
                real_id: target_id,
                name: self.name,
            });
        }

        if is_video_mime(&self.mime_type) {
            return Some(CandidateFile::direct(self.id, self.name));
        }

        None
    }
}

fn is_video_mime(mime: &str) -> bool {
    mime.starts_with("video/")
}

/// One page of a Drive listing.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct FileListPage {
    #[serde(default)]
    pub files: Vec<DriveEntry>,
    #[serde(default)]
    pub next_page_token: Option<String>,
}
