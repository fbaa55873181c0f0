use std::sync::{Mutex, PoisonError};

use crate::{models::WatchlistEntry, storage::LocalDurableStore};

/// In-process store for ephemeral sessions; keeps a log of every save
#[derive(Debug, Default)]
pub struct MemoryStore {
    stored: Mutex<Option<Vec<WatchlistEntry>>>,
    saves: Mutex<Vec<Vec<WatchlistEntry>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store that already holds `items`
    pub fn with_items(items: Vec<WatchlistEntry>) -> Self {
        Self {
            stored: Mutex::new(Some(items)),
            saves: Mutex::new(Vec::new()),
        }
    }

    /// Every list passed to `save`, oldest first
    pub fn saves(&self) -> Vec<Vec<WatchlistEntry>> {
        self.saves
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn save_count(&self) -> usize {
        self.saves
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn last_saved(&self) -> Option<Vec<WatchlistEntry>> {
        self.saves
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .last()
            .cloned()
    }
}

impl LocalDurableStore for MemoryStore {
    fn load(&self) -> Option<Vec<WatchlistEntry>> {
        self.stored
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn save(&self, items: &[WatchlistEntry]) {
        *self.stored.lock().unwrap_or_else(PoisonError::into_inner) = Some(items.to_vec());
        self.saves
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(items.to_vec());
    }
}
