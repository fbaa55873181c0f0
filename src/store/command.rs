use crate::models::{MovieId, WatchlistEntry};

/// A watchlist mutation with its optimistic effect and its compensation.
///
/// `apply` runs before the service has confirmed anything. `compensate` runs when the
/// confirmation fails. Only adds are compensated: once an entry has been removed its
/// data is gone, and the next fetch restores whatever the service still holds.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Add(WatchlistEntry),
    Remove(MovieId),
}

impl Command {
    pub fn movie_id(&self) -> &MovieId {
        match self {
            Command::Add(entry) => &entry.movie_id,
            Command::Remove(movie_id) => movie_id,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Command::Add(_) => "add",
            Command::Remove(_) => "remove",
        }
    }

    /// Applies the optimistic change; returns whether `items` changed
    pub fn apply(&self, items: &mut Vec<WatchlistEntry>) -> bool {
        match self {
            Command::Add(entry) => {
                if items.iter().any(|e| e.movie_id == entry.movie_id) {
                    false
                } else {
                    items.push(entry.clone());
                    true
                }
            }
            Command::Remove(movie_id) => {
                let before = items.len();
                items.retain(|e| &e.movie_id != movie_id);
                items.len() != before
            }
        }
    }

    /// Reverts `apply` after a failed confirmation; returns whether `items` changed
    pub fn compensate(&self, items: &mut Vec<WatchlistEntry>) -> bool {
        match self {
            Command::Add(entry) => {
                let before = items.len();
                items.retain(|e| e.movie_id != entry.movie_id);
                items.len() != before
            }
            Command::Remove(_) => false,
        }
    }

    /// Re-asserts this command on top of `items` when its confirmed list arrived after a
    /// newer one was already applied. An add takes the service's copy of the entry
    /// when `confirmed` has one.
    pub fn reconcile(&self, items: &mut Vec<WatchlistEntry>, confirmed: &[WatchlistEntry]) {
        match self {
            Command::Add(entry) => {
                let latest = confirmed
                    .iter()
                    .find(|e| e.movie_id == entry.movie_id)
                    .unwrap_or(entry);
                match items.iter_mut().find(|e| e.movie_id == entry.movie_id) {
                    Some(existing) => *existing = latest.clone(),
                    None => items.push(latest.clone()),
                }
            }
            Command::Remove(_) => {
                self.apply(items);
            }
        }
    }
}
