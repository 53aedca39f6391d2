//! JSON file backed ledger store.

use std::fs::{self, File};
use std::io::{BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use crate::config::LedgerConfig;

use super::types::{DailyCounter, ProcessedSet, UploadHistory};
use super::{LedgerError, LedgerStore};

/// Ledger store keeping each record in its own JSON file.
///
/// Writes go to a sibling `.tmp` file which is then renamed over the
/// record, so an interrupted run leaves either the old or the new content.
#[derive(Debug, Clone)]
pub struct JsonLedgerStore {
    config: LedgerConfig,
}

impl JsonLedgerStore {
    pub fn new(config: LedgerConfig) -> Self {
        Self { config }
    }

    /// Store with all three files inside `dir`, using the default names.
    pub fn in_dir(dir: &Path) -> Self {
        let defaults = LedgerConfig::default();
        Self::new(LedgerConfig {
            processed_path: dir.join(&defaults.processed_path),
            history_path: dir.join(&defaults.history_path),
            daily_count_path: dir.join(&defaults.daily_count_path),
        })
    }

    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>, LedgerError> {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            debug!("{:?} does not exist yet", path);
            return Ok(None);
        }
        Err(e) => {
            return Err(LedgerError::ReadFailed {
                path: path.to_path_buf(),
                source: e,
            })
        }
    };

    serde_json::from_slice(&bytes)
        .map(Some)
        .map_err(|e| LedgerError::ParseFailed {
            path: path.to_path_buf(),
            source: e,
        })
}

fn temp_path_for(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    path.with_file_name(name)
}

fn write_json_atomic<T: Serialize>(path: &Path, value: &T, pretty: bool) -> Result<(), LedgerError> {
    let write_failed = |e: std::io::Error| LedgerError::WriteFailed {
        path: path.to_path_buf(),
        source: e,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(write_failed)?;
    }

    let tmp = temp_path_for(path);
    let file = File::create(&tmp).map_err(write_failed)?;
    let mut writer = BufWriter::new(file);

    let result = if pretty {
        serde_json::to_writer_pretty(&mut writer, value)
    } else {
        serde_json::to_writer(&mut writer, value)
    };
    result.map_err(|e| write_failed(e.into()))?;

    writer.flush().map_err(write_failed)?;
    writer.get_ref().sync_all().map_err(write_failed)?;
    drop(writer);

    fs::rename(&tmp, path).map_err(write_failed)?;
    debug!("Wrote {:?}", path);
    Ok(())
}

impl LedgerStore for JsonLedgerStore {
    fn load_processed(&self) -> Result<ProcessedSet, LedgerError> {
        Ok(read_json(&self.config.processed_path)?.unwrap_or_default())
    }

    fn save_processed(&self, processed: &ProcessedSet) -> Result<(), LedgerError> {
        write_json_atomic(&self.config.processed_path, processed, false)
    }

    fn load_history(&self) -> Result<UploadHistory, LedgerError> {
        Ok(read_json(&self.config.history_path)?.unwrap_or_default())
    }

    fn save_history(&self, history: &UploadHistory) -> Result<(), LedgerError> {
        write_json_atomic(&self.config.history_path, history, true)
    }

    fn load_daily_counter(&self) -> Result<Option<DailyCounter>, LedgerError> {
        read_json(&self.config.daily_count_path)
    }

    fn save_daily_counter(&self, counter: &DailyCounter) -> Result<(), LedgerError> {
        write_json_atomic(&self.config.daily_count_path, counter, true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::HistoryEntry;
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn store() -> (JsonLedgerStore, TempDir) {
        let dir = TempDir::new().unwrap();
        (JsonLedgerStore::in_dir(dir.path()), dir)
    }

    #[test]
    fn test_absent_files_load_as_empty() {
        let (store, _dir) = store();
        assert!(store.load_processed().unwrap().is_empty());
        assert!(store.load_history().unwrap().is_empty());
        assert!(store.load_daily_counter().unwrap().is_none());
    }

    #[test]
    fn test_processed_written_compact() {
        let (store, _dir) = store();
        let set: ProcessedSet = ["1", "2"].into_iter().collect();
        store.save_processed(&set).unwrap();

        let raw = fs::read_to_string(&store.config().processed_path).unwrap();
        assert_eq!(raw, r#"["1","2"]"#);
        assert_eq!(store.load_processed().unwrap(), set);
    }

    #[test]
    fn test_history_written_pretty_and_appends() {
        let (store, _dir) = store();
        let mut history = UploadHistory::new();
        history.append(HistoryEntry {
            timestamp: NaiveDate::from_ymd_opt(2024, 5, 1)
                .unwrap()
                .and_hms_opt(8, 0, 0)
                .unwrap(),
            title: "First #1".to_string(),
            destination_video_id: "vid1".to_string(),
            source_file_name: "a.mp4".to_string(),
            file_size_mb: 3.2,
        });
        store.save_history(&history).unwrap();

        let raw = fs::read_to_string(&store.config().history_path).unwrap();
        assert!(raw.contains("\n  {"));
        assert!(raw.contains("\"video_id\": \"vid1\""));

        let loaded = store.load_history().unwrap();
        assert_eq!(loaded, history);
    }

    #[test]
    fn test_appending_keeps_earlier_entries_byte_identical() {
        let (store, _dir) = store();
        let earlier = r#"[
  {
    "timestamp": "2024-05-01T08:00:00.250000",
    "title": "The Future of Farming is HERE! \ud83c\udf3e #3",
    "video_id": "old-video",
    "drive_file": "video_3.mp4",
    "file_size_mb": 48.0
  }
]"#;
        fs::write(&store.config().history_path, earlier).unwrap();

        let mut history = store.load_history().unwrap();
        assert_eq!(
            history.entries()[0].title,
            "The Future of Farming is HERE! \u{1f33e} #3"
        );
        history.append(HistoryEntry {
            timestamp: NaiveDate::from_ymd_opt(2024, 5, 2)
                .unwrap()
                .and_hms_opt(9, 0, 0)
                .unwrap(),
            title: "Feeding time #4".to_string(),
            destination_video_id: "new-video".to_string(),
            source_file_name: "video_4.mp4".to_string(),
            file_size_mb: 12.5,
        });
        store.save_history(&history).unwrap();

        let raw = fs::read_to_string(&store.config().history_path).unwrap();
        let kept = earlier.strip_suffix("\n]").unwrap();
        assert!(raw.starts_with(&format!("{},\n  {{\n    \"timestamp\"", kept)));
        assert!(raw.contains("\"video_id\": \"new-video\""));
        assert!(raw.ends_with("\n  }\n]"));
        assert_eq!(store.load_history().unwrap().len(), 2);
    }

    #[test]
    fn test_daily_counter_round_trip() {
        let (store, _dir) = store();
        let counter = DailyCounter {
            date: NaiveDate::from_ymd_opt(2024, 5, 2).unwrap(),
            count: 4,
        };
        store.save_daily_counter(&counter).unwrap();
        assert_eq!(store.load_daily_counter().unwrap(), Some(counter));
    }

    #[test]
    fn test_corrupt_file_is_parse_error() {
        let (store, _dir) = store();
        fs::write(&store.config().processed_path, "{not json").unwrap();
        let result = store.load_processed();
        assert!(matches!(result, Err(LedgerError::ParseFailed { .. })));
    }

    #[test]
    fn test_write_leaves_no_temp_file() {
        let (store, dir) = store();
        store.save_processed(&ProcessedSet::new()).unwrap();

        let leftovers: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().ends_with(".tmp"))
            .collect();
        assert!(leftovers.is_empty());
    }

    #[test]
    fn test_write_creates_parent_directories() {
        let dir = TempDir::new().unwrap();
        let store = JsonLedgerStore::new(LedgerConfig {
            processed_path: dir.path().join("state/processed.json"),
            history_path: dir.path().join("state/history.json"),
            daily_count_path: dir.path().join("state/daily.json"),
        });
        store.save_processed(&["x"].into_iter().collect()).unwrap();
        assert!(dir.path().join("state/processed.json").exists());
    }

    #[test]
    fn test_temp_path_for() {
        assert_eq!(
            temp_path_for(Path::new("/data/processed.json")),
            PathBuf::from("/data/processed.json.tmp")
        );
    }
}
