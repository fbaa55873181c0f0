//! Local durable persistence for the unauthenticated watchlist
//!
//! The whole list is written on every change and read back once at start-up.
//! Implementations never fail outward: unreadable data loads as "nothing stored" and
//! write failures are logged.
use crate::models::WatchlistEntry;

pub mod file;
pub mod memory;

pub use file::JsonFileStore;
pub use memory::MemoryStore;

/// Synchronous key-value style persistence of a serialized watchlist
pub trait LocalDurableStore: Send + Sync {
    /// Returns the stored list, or `None` when nothing usable is stored
    fn load(&self) -> Option<Vec<WatchlistEntry>>;

    /// Replaces the stored list with `items`
    fn save(&self, items: &[WatchlistEntry]);
}
