use serde::Deserialize;
use std::path::PathBuf;

/// Application configuration loaded from environment variables
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Base URL of the watchlist backend API
    #[serde(default = "default_backend_url")]
    pub backend_url: String,

    /// File the unauthenticated watchlist is persisted to
    #[serde(default = "default_watchlist_path")]
    pub watchlist_path: PathBuf,

    /// Bearer token sent to the backend
    #[serde(default)]
    pub auth_token: Option<String>,

    /// Authenticated user; when unset the watchlist stays local
    #[serde(default)]
    pub user_id: Option<String>,

    /// Timeout applied to every backend request
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_backend_url() -> String {
    "http://localhost:5000/api".to_string()
}

fn default_watchlist_path() -> PathBuf {
    PathBuf::from("watchlist.json")
}

fn default_request_timeout_secs() -> u64 {
    10
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        envy::from_env::<Config>().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))
    }
}
