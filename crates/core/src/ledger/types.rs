//! The three bookkeeping records.

use std::collections::BTreeSet;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::value::RawValue;

/// IDs of candidates that were already uploaded.
///
/// Serialized as a flat JSON array of strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProcessedSet {
    ids: BTreeSet<String>,
}

impl ProcessedSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    /// Record an ID. Returns false if it was already present.
    pub fn insert(&mut self, id: impl Into<String>) -> bool {
        self.ids.insert(id.into())
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.ids.iter().map(String::as_str)
    }

    /// Running number used in the next upload's title.
    pub fn next_sequence_number(&self) -> usize {
        self.ids.len() + 1
    }
}

impl<S: Into<String>> FromIterator<S> for ProcessedSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            ids: iter.into_iter().map(Into::into).collect(),
        }
    }
}

/// One successful upload.
///
/// Key names match the history files written by earlier deployments
/// (`video_id`, `drive_file`), so existing files keep loading and earlier
/// entries are written back unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// Local wall-clock time of the upload.
    pub timestamp: NaiveDateTime,
    pub title: String,
    #[serde(rename = "video_id")]
    pub destination_video_id: String,
    #[serde(rename = "drive_file")]
    pub source_file_name: String,
    /// Size of the uploaded file, rounded to 0.1 MB.
    pub file_size_mb: f64,
}

/// Append-only list of uploads, oldest first.
///
/// Entries read from disk keep their original JSON text and are written back
/// verbatim. Only entries appended in this process are serialized.
#[derive(Debug, Clone, Default)]
pub struct UploadHistory {
    entries: Vec<HistoryEntry>,
    /// Source text of `entries[..loaded.len()]`.
    loaded: Vec<Box<RawValue>>,
}

impl UploadHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, entry: HistoryEntry) {
        self.entries.push(entry);
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn last(&self) -> Option<&HistoryEntry> {
        self.entries.last()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl PartialEq for UploadHistory {
    fn eq(&self, other: &Self) -> bool {
        self.entries == other.entries
    }
}

impl From<Vec<HistoryEntry>> for UploadHistory {
    fn from(entries: Vec<HistoryEntry>) -> Self {
        Self {
            entries,
            loaded: Vec::new(),
        }
    }
}

enum StoredEntry<'a> {
    Verbatim(&'a RawValue),
    Appended(&'a HistoryEntry),
}

impl Serialize for StoredEntry<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            StoredEntry::Verbatim(raw) => raw.serialize(serializer),
            StoredEntry::Appended(entry) => entry.serialize(serializer),
        }
    }
}

impl Serialize for UploadHistory {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.entries.iter().enumerate().map(|(i, entry)| {
            match self.loaded.get(i) {
                Some(raw) => StoredEntry::Verbatim(raw),
                None => StoredEntry::Appended(entry),
            }
        }))
    }
}

impl<'de> Deserialize<'de> for UploadHistory {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let loaded = Vec::<Box<RawValue>>::deserialize(deserializer)?;
        let entries = loaded
            .iter()
            .map(|raw| serde_json::from_str::<HistoryEntry>(raw.get()))
            .collect::<Result<Vec<_>, _>>()
            .map_err(serde::de::Error::custom)?;
        Ok(Self { entries, loaded })
    }
}

/// Uploads performed on one calendar date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyCounter {
    /// Serialized as `YYYY-MM-DD`.
    pub date: NaiveDate,
    pub count: u32,
}

impl DailyCounter {
    /// Counter for a day with no uploads yet.
    pub fn fresh(today: NaiveDate) -> Self {
        Self {
            date: today,
            count: 0,
        }
    }

    /// Uploads counted for `today` (0 if the counter is from another day).
    pub fn count_on(&self, today: NaiveDate) -> u32 {
        if self.date == today {
            self.count
        } else {
            0
        }
    }

    /// Count one upload on `today`, starting over if the stored date is stale.
    pub fn record_upload(self, today: NaiveDate) -> Self {
        let base = if self.date == today {
            self
        } else {
            Self::fresh(today)
        };
        Self {
            date: today,
            count: base.count + 1,
        }
    }
}

/// Bytes to megabytes, rounded to one decimal.
pub fn size_in_mb(bytes: u64) -> f64 {
    (bytes as f64 / (1024.0 * 1024.0) * 10.0).round() / 10.0
}
