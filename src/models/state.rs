use serde::Serialize;

use super::{MovieId, WatchlistEntry};

/// Where the watchlist's source of truth currently lives
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncMode {
    /// Unauthenticated; items are persisted to the local durable store
    #[default]
    Local,
    /// An authenticated fetch has succeeded; the remote service is authoritative
    Backend,
}

/// Snapshot of the watchlist as seen by readers
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WatchlistState {
    pub items: Vec<WatchlistEntry>,
    pub is_loading: bool,
    pub error: Option<String>,
    pub sync_mode: SyncMode,
}

impl WatchlistState {
    /// Creates a local-mode state holding `items`
    pub fn with_items(items: Vec<WatchlistEntry>) -> Self {
        Self {
            items,
            ..Default::default()
        }
    }

    pub fn contains(&self, movie_id: &MovieId) -> bool {
        self.items.iter().any(|entry| &entry.movie_id == movie_id)
    }

    pub fn get(&self, movie_id: &MovieId) -> Option<&WatchlistEntry> {
        self.items.iter().find(|entry| &entry.movie_id == movie_id)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
