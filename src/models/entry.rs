use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::{collections::HashSet, fmt::Display};

/// Base URL prepended to catalog poster paths (e.g. "/abc.jpg")
pub const POSTER_BASE_URL: &str = "https://image.tmdb.org/t/p/w500";

/// Poster shown for titles the catalog has no artwork for
pub const PLACEHOLDER_POSTER: &str = "https://via.placeholder.com/500x750?text=No+Image";

/// Identifier of a movie in the external catalog.
///
/// The catalog hands out numeric ids while the watchlist backend stores strings, so
/// the id is always kept (and compared) in its string form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct MovieId(String);

impl MovieId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into().trim().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Display for MovieId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(&self.0)
    }
}

impl From<&str> for MovieId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for MovieId {
    fn from(id: String) -> Self {
        Self::new(id)
    }
}

impl From<&String> for MovieId {
    fn from(id: &String) -> Self {
        Self::new(id.as_str())
    }
}

impl From<&MovieId> for MovieId {
    fn from(id: &MovieId) -> Self {
        id.clone()
    }
}

impl From<u64> for MovieId {
    fn from(id: u64) -> Self {
        Self(id.to_string())
    }
}

impl From<u32> for MovieId {
    fn from(id: u32) -> Self {
        Self(id.to_string())
    }
}

impl From<i64> for MovieId {
    fn from(id: i64) -> Self {
        Self(id.to_string())
    }
}

impl From<i32> for MovieId {
    fn from(id: i32) -> Self {
        Self(id.to_string())
    }
}

impl<'de> Deserialize<'de> for MovieId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(MovieId::new(deserialize_lenient_string(deserializer)?))
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StringOrNumber {
    Text(String),
    Number(serde_json::Number),
}

/// Accepts either a JSON string or a JSON number and yields its string form.
pub(crate) fn deserialize_lenient_string<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<String, D::Error> {
    Ok(match StringOrNumber::deserialize(deserializer)? {
        StringOrNumber::Text(text) => text,
        StringOrNumber::Number(number) => number.to_string(),
    })
}

/// Optional variant of [`deserialize_lenient_string`], for use with `#[serde(default)]`.
pub(crate) fn deserialize_optional_lenient_string<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<String>, D::Error> {
    Ok(Option::<StringOrNumber>::deserialize(deserializer)?.map(|raw| match raw {
        StringOrNumber::Text(text) => text,
        StringOrNumber::Number(number) => number.to_string(),
    }))
}

/// A movie on the user's watchlist, in its one canonical shape
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WatchlistEntry {
    pub movie_id: MovieId,
    pub title: String,
    #[serde(default = "placeholder_poster")]
    pub poster: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overview: Option<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_optional_lenient_string"
    )]
    pub year: Option<String>,
    /// Set by the watchlist service; absent for entries that only ever lived locally
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub added_at: Option<DateTime<Utc>>,
}

fn placeholder_poster() -> String {
    PLACEHOLDER_POSTER.to_string()
}

impl WatchlistEntry {
    pub fn new(movie_id: impl Into<MovieId>, title: impl Into<String>) -> Self {
        Self {
            movie_id: movie_id.into(),
            title: title.into(),
            poster: placeholder_poster(),
            overview: None,
            year: None,
            added_at: None,
        }
    }
}

/// Input to a watchlist add, as handed over by the catalog views.
///
/// Converting it into a [`WatchlistEntry`] resolves the poster URL and the year.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewEntry {
    pub movie_id: MovieId,
    pub title: String,
    /// Either a full URL or a catalog poster path such as "/abc.jpg"
    pub poster: Option<String>,
    pub overview: Option<String>,
    pub year: Option<String>,
    /// Release date as `YYYY-MM-DD`
    pub release_date: Option<String>,
}

impl NewEntry {
    pub fn new(movie_id: impl Into<MovieId>, title: impl Into<String>) -> Self {
        Self {
            movie_id: movie_id.into(),
            title: title.into(),
            ..Default::default()
        }
    }

    pub fn poster(mut self, poster: impl Into<String>) -> Self {
        self.poster = Some(poster.into());
        self
    }

    pub fn overview(mut self, overview: impl Into<String>) -> Self {
        self.overview = Some(overview.into());
        self
    }

    pub fn year(mut self, year: impl Into<String>) -> Self {
        self.year = Some(year.into());
        self
    }

    pub fn release_date(mut self, release_date: impl Into<String>) -> Self {
        self.release_date = Some(release_date.into());
        self
    }
}

impl From<NewEntry> for WatchlistEntry {
    fn from(draft: NewEntry) -> Self {
        let year = draft
            .year
            .map(|y| y.trim().to_string())
            .filter(|y| !y.is_empty())
            .or_else(|| draft.release_date.as_deref().and_then(release_year))
            .unwrap_or_else(|| Utc::now().year().to_string());

        WatchlistEntry {
            movie_id: draft.movie_id,
            title: draft.title,
            poster: resolve_poster(draft.poster.as_deref()),
            overview: draft.overview.filter(|o| !o.trim().is_empty()),
            year: Some(year),
            added_at: None,
        }
    }
}

impl From<WatchlistEntry> for NewEntry {
    fn from(entry: WatchlistEntry) -> Self {
        NewEntry {
            movie_id: entry.movie_id,
            title: entry.title,
            poster: Some(entry.poster),
            overview: entry.overview,
            year: entry.year,
            release_date: None,
        }
    }
}

fn release_year(release_date: &str) -> Option<String> {
    NaiveDate::parse_from_str(release_date.trim(), "%Y-%m-%d")
        .ok()
        .map(|date| date.year().to_string())
}

fn resolve_poster(poster: Option<&str>) -> String {
    match poster.map(str::trim) {
        Some(path) if path.starts_with('/') => format!("{}{}", POSTER_BASE_URL, path),
        Some(url) if !url.is_empty() => url.to_string(),
        _ => placeholder_poster(),
    }
}

/// Drops later duplicates so that every `movie_id` appears at most once, keeping order.
pub fn unique_by_movie_id(items: Vec<WatchlistEntry>) -> Vec<WatchlistEntry> {
    let mut seen = HashSet::new();
    let before = items.len();
    let unique: Vec<WatchlistEntry> = items
        .into_iter()
        .filter(|entry| seen.insert(entry.movie_id.clone()))
        .collect();

    if unique.len() != before {
        tracing::warn!(
            dropped = before - unique.len(),
            "Dropped duplicate watchlist entries"
        );
    }

    unique
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_movie_id_from_number_and_string_match() {
        assert_eq!(MovieId::from(27205u64), MovieId::from("27205"));
        assert_eq!(MovieId::from(" 27205 "), MovieId::from("27205"));
    }

    #[test]
    fn test_movie_id_deserializes_numbers_and_strings() {
        let from_number: MovieId = serde_json::from_str("27205").unwrap();
        let from_string: MovieId = serde_json::from_str(r#""27205""#).unwrap();
        assert_eq!(from_number, from_string);
        assert_eq!(serde_json::to_string(&from_number).unwrap(), r#""27205""#);
    }

    #[test]
    fn test_new_entry_resolves_poster_path() {
        let entry: WatchlistEntry = NewEntry::new(27205u64, "Inception")
            .poster("/9gk7adHYeDvHkCSEqAvQNLV5Uge.jpg")
            .release_date("2010-07-15")
            .into();

        assert_eq!(entry.movie_id.as_str(), "27205");
        assert_eq!(
            entry.poster,
            "https://image.tmdb.org/t/p/w500/9gk7adHYeDvHkCSEqAvQNLV5Uge.jpg"
        );
        assert_eq!(entry.year.as_deref(), Some("2010"));
        assert_eq!(entry.added_at, None);
    }

    #[test]
    fn test_new_entry_keeps_full_poster_url_and_explicit_year() {
        let entry: WatchlistEntry = NewEntry::new("603", "The Matrix")
            .poster("https://example.com/matrix.jpg")
            .year("1999")
            .release_date("2021-12-22")
            .into();

        assert_eq!(entry.poster, "https://example.com/matrix.jpg");
        assert_eq!(entry.year.as_deref(), Some("1999"));
    }

    #[test]
    fn test_new_entry_without_poster_or_dates() {
        let entry: WatchlistEntry = NewEntry::new("1", "Untitled").poster("  ").into();

        assert_eq!(entry.poster, PLACEHOLDER_POSTER);
        assert_eq!(entry.year, Some(Utc::now().year().to_string()));
    }

    #[test]
    fn test_bare_entry_is_normalized_like_a_draft() {
        let mut bare = WatchlistEntry::new("27205", "Inception");
        bare.poster = "/9gk7adHYeDvHkCSEqAvQNLV5Uge.jpg".to_string();

        let entry = WatchlistEntry::from(NewEntry::from(bare));
        assert_eq!(
            entry.poster,
            "https://image.tmdb.org/t/p/w500/9gk7adHYeDvHkCSEqAvQNLV5Uge.jpg"
        );
        assert_eq!(entry.year, Some(Utc::now().year().to_string()));

        let listed = WatchlistEntry::from(NewEntry::from(WatchlistEntry::new("603", "The Matrix")));
        assert_eq!(listed.poster, PLACEHOLDER_POSTER);
    }

    #[test]
    fn test_entry_wire_shape() {
        let mut entry = WatchlistEntry::new("27205", "Inception");
        entry.year = Some("2010".to_string());

        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["movieId"], "27205");
        assert_eq!(json["year"], "2010");
        assert!(json.get("addedAt").is_none());
        assert!(json.get("overview").is_none());
    }

    #[test]
    fn test_entry_accepts_numeric_year() {
        let entry: WatchlistEntry =
            serde_json::from_str(r#"{"movieId": 603, "title": "The Matrix", "year": 1999}"#)
                .unwrap();

        assert_eq!(entry.movie_id.as_str(), "603");
        assert_eq!(entry.year.as_deref(), Some("1999"));
        assert_eq!(entry.poster, PLACEHOLDER_POSTER);
    }

    #[test]
    fn test_unique_by_movie_id_keeps_first() {
        let items = vec![
            WatchlistEntry::new("1", "First"),
            WatchlistEntry::new("2", "Second"),
            WatchlistEntry::new("1", "Duplicate"),
        ];

        let unique = unique_by_movie_id(items);
        assert_eq!(unique.len(), 2);
        assert_eq!(unique[0].title, "First");
        assert_eq!(unique[1].title, "Second");
    }
}
