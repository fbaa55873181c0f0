use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::{
    error::WatchlistResult,
    models::{normalize_records, WatchlistEntry},
    storage::LocalDurableStore,
};

/// Watchlist persisted as a JSON array in a single file
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write(&self, items: &[WatchlistEntry]) -> WatchlistResult<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_vec_pretty(items)?;

        // Atomic write: write to temp file, then rename
        let temp_path = self.path.with_extension("json.tmp");
        std::fs::write(&temp_path, json)?;
        std::fs::rename(&temp_path, &self.path)?;

        Ok(())
    }
}

impl LocalDurableStore for JsonFileStore {
    fn load(&self) -> Option<Vec<WatchlistEntry>> {
        let data = match std::fs::read(&self.path) {
            Ok(data) => data,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!(path = %self.path.display(), "No stored watchlist");
                return None;
            }
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "Failed to read stored watchlist");
                return None;
            }
        };

        match serde_json::from_slice::<Vec<serde_json::Value>>(&data) {
            Ok(records) => {
                let items = normalize_records(records, "file");
                tracing::debug!(path = %self.path.display(), count = items.len(), "Loaded stored watchlist");
                Some(items)
            }
            Err(e) => {
                tracing::warn!(
                    path = %self.path.display(),
                    error = %e,
                    "Stored watchlist is unreadable, starting empty"
                );
                None
            }
        }
    }

    fn save(&self, items: &[WatchlistEntry]) {
        match self.write(items) {
            Ok(()) => {
                tracing::debug!(path = %self.path.display(), count = items.len(), "Saved watchlist")
            }
            Err(e) => {
                tracing::error!(path = %self.path.display(), error = %e, "Failed to save watchlist")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Vec<WatchlistEntry> {
        vec![
            WatchlistEntry::new("27205", "Inception"),
            WatchlistEntry::new("603", "The Matrix"),
        ]
    }

    #[test]
    fn test_missing_file_loads_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("watchlist.json"));
        assert_eq!(store.load(), None);
    }

    #[test]
    fn test_save_then_load_preserves_order() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("nested").join("watchlist.json"));

        store.save(&sample());

        assert_eq!(store.load(), Some(sample()));
        assert!(!store.path().with_extension("json.tmp").exists());
    }

    #[test]
    fn test_save_replaces_whole_list() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("watchlist.json"));

        store.save(&sample());
        store.save(&[]);

        assert_eq!(store.load(), Some(vec![]));
    }

    #[test]
    fn test_corrupt_file_loads_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("watchlist.json");
        std::fs::write(&path, b"{not json").unwrap();

        let store = JsonFileStore::new(path);
        assert_eq!(store.load(), None);
    }

    #[test]
    fn test_reads_legacy_numeric_ids() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("watchlist.json");
        std::fs::write(&path, br#"[{"movieId": 27205, "title": "Inception"}]"#).unwrap();

        let items = JsonFileStore::new(path).load().unwrap();
        assert_eq!(items[0].movie_id.as_str(), "27205");
    }

    #[test]
    fn test_reads_records_keyed_by_legacy_id() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("watchlist.json");
        std::fs::write(&path, br#"[{"id": 27205, "title": "Inception"}]"#).unwrap();

        let items = JsonFileStore::new(path).load().unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].movie_id.as_str(), "27205");
        assert_eq!(items[0].title, "Inception");
    }

    #[test]
    fn test_one_bad_record_keeps_the_rest() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("watchlist.json");
        std::fs::write(
            &path,
            br#"[{"movieId": "1", "title": "A"}, {"title": "No id"}, {"movieId": "2"}, 42]"#,
        )
        .unwrap();

        let items = JsonFileStore::new(path).load().unwrap();
        let ids: Vec<&str> = items.iter().map(|e| e.movie_id.as_str()).collect();
        assert_eq!(ids, vec!["1", "2"]);
        assert_eq!(items[0].title, "A");
    }
}
