//! Upload metadata built from the configured templates.

use crate::config::PublishConfig;
use crate::selection::{choose, Selector};
use crate::youtube::{PrivacyStatus, VideoMetadata};

/// Fixed parts of every upload's metadata.
#[derive(Debug, Clone)]
pub struct MetadataTemplate {
    titles: Vec<String>,
    description: String,
    tags: Vec<String>,
    category_id: String,
    privacy_status: PrivacyStatus,
    made_for_kids: bool,
}

impl MetadataTemplate {
    pub fn new(
        titles: Vec<String>,
        description: impl Into<String>,
        tags: Vec<String>,
        category_id: impl Into<String>,
    ) -> Self {
        Self {
            titles: titles.into_iter().filter(|t| !t.trim().is_empty()).collect(),
            description: description.into(),
            tags,
            category_id: category_id.into(),
            privacy_status: PrivacyStatus::Public,
            made_for_kids: false,
        }
    }

    pub fn with_privacy(mut self, privacy_status: PrivacyStatus) -> Self {
        self.privacy_status = privacy_status;
        self
    }

    pub fn with_made_for_kids(mut self, made_for_kids: bool) -> Self {
        self.made_for_kids = made_for_kids;
        self
    }

    /// Metadata for the upload numbered `sequence`.
    ///
    /// The title is a template picked by `selector` followed by ` #<sequence>`.
    pub fn render(&self, selector: &dyn Selector, sequence: usize) -> VideoMetadata {
        let hook = choose(selector, &self.titles)
            .map(String::as_str)
            .unwrap_or("Video");

        VideoMetadata {
            title: format!("{} #{}", hook, sequence),
            description: self.description.clone(),
            tags: self.tags.clone(),
            category_id: self.category_id.clone(),
            privacy_status: self.privacy_status,
            made_for_kids: self.made_for_kids,
        }
    }
}

impl From<&PublishConfig> for MetadataTemplate {
    fn from(config: &PublishConfig) -> Self {
        Self::new(
            config.titles.clone(),
            config.description.clone(),
            config.tags.clone(),
            config.category_id.clone(),
        )
        .with_privacy(config.privacy_status)
        .with_made_for_kids(config.made_for_kids)
    }
}
