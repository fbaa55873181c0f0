//! Remote watchlist service abstraction
//!
//! Every call returns the full authoritative list held by the service, so callers
//! can replace their copy wholesale instead of patching it.
use crate::{
    error::WatchlistResult,
    models::{MovieId, WatchlistEntry},
};

pub mod http;
pub mod request_id;

pub use http::HttpWatchlistService;

/// Network collaborator holding each user's watchlist
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait RemoteWatchlistService: Send + Sync {
    /// Fetch the user's watchlist
    async fn fetch(&self, user_id: &str) -> WatchlistResult<Vec<WatchlistEntry>>;

    /// Add an entry and return the updated list
    async fn add(&self, user_id: &str, entry: &WatchlistEntry)
        -> WatchlistResult<Vec<WatchlistEntry>>;

    /// Remove an entry and return the updated list
    async fn remove(&self, user_id: &str, movie_id: &MovieId)
        -> WatchlistResult<Vec<WatchlistEntry>>;
}
