mod entry;
mod record;
mod state;

pub use entry::{
    unique_by_movie_id, MovieId, NewEntry, WatchlistEntry, PLACEHOLDER_POSTER, POSTER_BASE_URL,
};
pub(crate) use record::normalize_records;
pub use state::{SyncMode, WatchlistState};
