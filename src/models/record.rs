use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;

use super::{
    entry::deserialize_optional_lenient_string, unique_by_movie_id, MovieId, WatchlistEntry,
    PLACEHOLDER_POSTER,
};

/// A watchlist record in any shape it was ever written in.
///
/// Older records carry the catalog id under `id` instead of `movieId`, sometimes as a
/// number, and may lack a title or poster.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredRecord {
    #[serde(default)]
    movie_id: Option<MovieId>,
    #[serde(default)]
    id: Option<MovieId>,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    poster: Option<String>,
    #[serde(default)]
    overview: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_lenient_string")]
    year: Option<String>,
    #[serde(default)]
    added_at: Option<DateTime<Utc>>,
}

impl StoredRecord {
    fn into_entry(self) -> Option<WatchlistEntry> {
        let movie_id = self
            .movie_id
            .filter(|id| !id.is_empty())
            .or(self.id.filter(|id| !id.is_empty()))?;

        Some(WatchlistEntry {
            movie_id,
            title: self.title.unwrap_or_default(),
            poster: self
                .poster
                .filter(|p| !p.trim().is_empty())
                .unwrap_or_else(|| PLACEHOLDER_POSTER.to_string()),
            overview: self.overview,
            year: self.year,
            added_at: self.added_at,
        })
    }
}

/// Turns raw records into canonical entries.
///
/// Records that do not parse or carry no movie id are dropped one by one, and later
/// duplicates of a movie id are dropped after them.
pub(crate) fn normalize_records(records: Vec<Value>, source: &'static str) -> Vec<WatchlistEntry> {
    let total = records.len();
    let entries: Vec<WatchlistEntry> = records
        .into_iter()
        .filter_map(|record| match serde_json::from_value::<StoredRecord>(record) {
            Ok(record) => record.into_entry(),
            Err(e) => {
                tracing::debug!(source, error = %e, "Unparseable watchlist record");
                None
            }
        })
        .collect();

    if entries.len() != total {
        tracing::warn!(
            source,
            dropped = total - entries.len(),
            "Dropped watchlist records without a usable movie id"
        );
    }

    unique_by_movie_id(entries)
}
