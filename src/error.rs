use reqwest::StatusCode;

/// Watchlist-level errors
#[derive(thiserror::Error, Debug)]
pub enum WatchlistError {
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Session expired, please log in again")]
    AuthExpired,

    #[error("Watchlist service returned {status}: {message}")]
    Remote { status: StatusCode, message: String },

    #[error("Not authenticated")]
    NotAuthenticated,

    #[error("Storage error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl WatchlistError {
    /// True for failures caused by missing or expired credentials.
    ///
    /// The application shell uses this to clear credentials; the store itself
    /// treats these like any other failed round-trip.
    pub fn is_auth_failure(&self) -> bool {
        matches!(self, WatchlistError::AuthExpired | WatchlistError::NotAuthenticated)
    }
}

pub type WatchlistResult<T> = Result<T, WatchlistError>;
