pub mod auth;
pub mod config;
pub mod error;
pub mod models;
pub mod remote;
pub mod storage;
pub mod store;

pub use auth::{AuthContext, Session, SharedAuth};
pub use error::{WatchlistError, WatchlistResult};
pub use models::{MovieId, NewEntry, SyncMode, WatchlistEntry, WatchlistState};
pub use remote::{HttpWatchlistService, RemoteWatchlistService};
pub use storage::{JsonFileStore, LocalDurableStore, MemoryStore};
pub use store::{Outcome, Pending, WatchlistStore};
