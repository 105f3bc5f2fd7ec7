use std::fs;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::shared::constants::HISTORY_LIMIT;
use crate::transcription::domain::transcript::{TranscriptChunk, Transcription};

/// One past transcription. Entries are ordered newest first.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub text: String,
    pub chunks: Vec<TranscriptChunk>,
    pub created_at: DateTime<Utc>,
}

impl HistoryEntry {
    /// Rehydrate the entry as a displayable transcription.
    pub fn transcription(&self) -> Transcription {
        Transcription {
            text: self.text.clone(),
            chunks: self.chunks.clone(),
        }
    }
}

/// Persisted transcription history, capped at [`HISTORY_LIMIT`] entries.
///
/// Storage failures never propagate: a corrupt or unreadable file loads as
/// an empty history, and save errors are logged and swallowed.
pub struct HistoryStore {
    path: PathBuf,
    entries: Vec<HistoryEntry>,
}

impl HistoryStore {
    /// Open the history at `path`. A missing or corrupt file is an empty
    /// history.
    pub fn open(path: PathBuf) -> Self {
        let entries = match fs::read_to_string(&path) {
            Ok(json) => match serde_json::from_str::<Vec<HistoryEntry>>(&json) {
                Ok(mut entries) => {
                    entries.truncate(HISTORY_LIMIT);
                    entries
                }
                Err(e) => {
                    log::warn!("discarding corrupt history file {}: {e}", path.display());
                    Vec::new()
                }
            },
            Err(_) => Vec::new(),
        };
        Self { path, entries }
    }

    /// Open the history at the platform default location.
    pub fn open_default() -> Self {
        let path = dirs::config_dir()
            .map(|d| d.join("Murmur").join("history.json"))
            .unwrap_or_else(|| PathBuf::from("murmur-history.json"));
        Self::open(path)
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Record a completed transcription as the newest entry, truncate to
    /// the cap, and persist synchronously.
    pub fn record(&mut self, transcription: &Transcription) {
        self.entries.insert(
            0,
            HistoryEntry {
                text: transcription.text.clone(),
                chunks: transcription.chunks.clone(),
                created_at: Utc::now(),
            },
        );
        self.entries.truncate(HISTORY_LIMIT);
        self.save();
    }

    /// Remove every entry, in memory and on disk.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.save();
    }

    fn save(&self) {
        if let Some(parent) = self.path.parent() {
            let _ = fs::create_dir_all(parent);
        }
        match serde_json::to_string_pretty(&self.entries) {
            Ok(json) => {
                if let Err(e) = fs::write(&self.path, json) {
                    log::warn!("failed to save history to {}: {e}", self.path.display());
                }
            }
            Err(e) => log::warn!("failed to serialize history: {e}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn transcription(text: &str) -> Transcription {
        Transcription {
            text: text.to_string(),
            chunks: vec![TranscriptChunk {
                text: text.to_string(),
                start: 0.0,
                end: 1.0,
            }],
        }
    }

    #[test]
    fn test_open_missing_file_is_empty() {
        let tmp = TempDir::new().unwrap();
        let store = HistoryStore::open(tmp.path().join("history.json"));
        assert!(store.is_empty());
    }

    #[test]
    fn test_open_corrupt_file_is_empty() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("history.json");
        fs::write(&path, "{not json").unwrap();
        let store = HistoryStore::open(path);
        assert!(store.is_empty());
    }

    #[test]
    fn test_record_prepends_newest() {
        let tmp = TempDir::new().unwrap();
        let mut store = HistoryStore::open(tmp.path().join("history.json"));
        store.record(&transcription("first"));
        store.record(&transcription("second"));
        assert_eq!(store.len(), 2);
        assert_eq!(store.entries()[0].text, "second");
        assert_eq!(store.entries()[1].text, "first");
    }

    #[test]
    fn test_length_never_exceeds_cap() {
        let tmp = TempDir::new().unwrap();
        let mut store = HistoryStore::open(tmp.path().join("history.json"));
        for i in 0..HISTORY_LIMIT + 5 {
            store.record(&transcription(&format!("entry {i}")));
        }
        assert_eq!(store.len(), HISTORY_LIMIT);
        // Newest survives, oldest got dropped
        assert_eq!(store.entries()[0].text, format!("entry {}", HISTORY_LIMIT + 4));
    }

    #[test]
    fn test_reload_round_trips_entries() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("history.json");
        let mut store = HistoryStore::open(path.clone());
        store.record(&transcription("kept"));
        let saved = store.entries().to_vec();

        let reloaded = HistoryStore::open(path);
        assert_eq!(reloaded.entries(), &saved[..]);
    }

    #[test]
    fn test_clear_empties_memory_and_disk() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("history.json");
        let mut store = HistoryStore::open(path.clone());
        store.record(&transcription("gone"));
        store.clear();
        assert!(store.is_empty());

        let reloaded = HistoryStore::open(path);
        assert!(reloaded.is_empty());
    }

    #[test]
    fn test_entry_rehydrates_to_transcription() {
        let tmp = TempDir::new().unwrap();
        let mut store = HistoryStore::open(tmp.path().join("history.json"));
        let t = transcription("echo");
        store.record(&t);
        assert_eq!(store.entries()[0].transcription(), t);
    }
}
