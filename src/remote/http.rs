//! Watchlist backend client
//!
//! Speaks the backend's REST shape:
//! - `GET    {base}/users/{user_id}/watchlist`
//! - `POST   {base}/users/{user_id}/watchlist`
//! - `DELETE {base}/users/{user_id}/watchlist/{movie_id}`
//!
//! Every response body is `{"watchlist": [...]}`. Records are normalized into
//! [`WatchlistEntry`] here, so nothing past this module sees the backend's shapes.
use std::time::Duration;

use reqwest::{header::AUTHORIZATION, Client as HttpClient, RequestBuilder, StatusCode, Url};
use serde::Deserialize;
use serde_json::Value;
use tracing::{field, instrument, Span};

use crate::{
    config::Config,
    error::{WatchlistError, WatchlistResult},
    models::{normalize_records, MovieId, WatchlistEntry},
    remote::{
        request_id::{RequestId, REQUEST_ID_HEADER},
        RemoteWatchlistService,
    },
};

#[derive(Debug, Deserialize)]
struct ApiWatchlistResponse {
    #[serde(default)]
    watchlist: Vec<Value>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Clone)]
pub struct HttpWatchlistService {
    http_client: HttpClient,
    base_url: Url,
    auth_token: Option<String>,
}

impl HttpWatchlistService {
    pub fn new(base_url: &str, auth_token: Option<String>) -> WatchlistResult<Self> {
        Self::with_client(HttpClient::new(), base_url, auth_token)
    }

    pub fn from_config(config: &Config) -> WatchlistResult<Self> {
        let http_client = HttpClient::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;

        Self::with_client(http_client, &config.backend_url, config.auth_token.clone())
    }

    fn with_client(
        http_client: HttpClient,
        base_url: &str,
        auth_token: Option<String>,
    ) -> WatchlistResult<Self> {
        let base_url = Url::parse(base_url).map_err(|e| {
            WatchlistError::InvalidConfig(format!("backend URL {:?}: {}", base_url, e))
        })?;

        if base_url.cannot_be_a_base() {
            return Err(WatchlistError::InvalidConfig(format!(
                "backend URL {:?} cannot be used as a base",
                base_url.as_str()
            )));
        }

        Ok(Self {
            http_client,
            base_url,
            auth_token: auth_token.filter(|t| !t.is_empty()),
        })
    }

    /// Builds `{base}/users/{user_id}/watchlist[/{movie_id}]` with escaped segments
    fn watchlist_url(&self, user_id: &str, movie_id: Option<&MovieId>) -> WatchlistResult<Url> {
        let mut url = self.base_url.clone();
        {
            let mut segments = url.path_segments_mut().map_err(|_| {
                WatchlistError::InvalidConfig("backend URL cannot be a base".to_string())
            })?;
            segments.pop_if_empty().extend(["users", user_id, "watchlist"]);
            if let Some(movie_id) = movie_id {
                segments.push(movie_id.as_str());
            }
        }
        Ok(url)
    }

    async fn send(&self, request: RequestBuilder) -> WatchlistResult<Vec<WatchlistEntry>> {
        let request_id = RequestId::new();
        Span::current().record("request_id", field::display(&request_id));
        let mut request = request.header(REQUEST_ID_HEADER, request_id.as_str());
        if let Some(token) = &self.auth_token {
            request = request.header(AUTHORIZATION, format!("Bearer {}", token));
        }

        let response = request.send().await?;
        let status = response.status();

        if status == StatusCode::UNAUTHORIZED {
            tracing::warn!(request_id = %request_id, "Watchlist service rejected credentials");
            return Err(WatchlistError::AuthExpired);
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ApiErrorBody>(&body)
                .ok()
                .and_then(|b| b.message.or(b.error))
                .unwrap_or(body);
            tracing::warn!(
                request_id = %request_id,
                status = %status,
                message = %message,
                "Watchlist service call failed"
            );
            return Err(WatchlistError::Remote { status, message });
        }

        let body: ApiWatchlistResponse = response.json().await?;
        let entries = normalize_records(body.watchlist, "service");

        tracing::debug!(
            request_id = %request_id,
            count = entries.len(),
            "Watchlist service call completed"
        );

        Ok(entries)
    }
}

#[async_trait::async_trait]
impl RemoteWatchlistService for HttpWatchlistService {
    #[instrument(skip(self), fields(provider = "http", request_id = field::Empty))]
    async fn fetch(&self, user_id: &str) -> WatchlistResult<Vec<WatchlistEntry>> {
        let url = self.watchlist_url(user_id, None)?;
        self.send(self.http_client.get(url)).await
    }

    #[instrument(
        skip(self, entry),
        fields(provider = "http", movie_id = %entry.movie_id, request_id = field::Empty)
    )]
    async fn add(
        &self,
        user_id: &str,
        entry: &WatchlistEntry,
    ) -> WatchlistResult<Vec<WatchlistEntry>> {
        let url = self.watchlist_url(user_id, None)?;
        self.send(self.http_client.post(url).json(entry)).await
    }

    #[instrument(skip(self), fields(provider = "http", request_id = field::Empty))]
    async fn remove(
        &self,
        user_id: &str,
        movie_id: &MovieId,
    ) -> WatchlistResult<Vec<WatchlistEntry>> {
        let url = self.watchlist_url(user_id, Some(movie_id))?;
        self.send(self.http_client.delete(url)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fmt::Debug;
    use std::sync::{Arc, Mutex};
    use tracing::{field::Visit, span, Subscriber};
    use tracing_subscriber::layer::{Context, Layer, SubscriberExt};
    use uuid::Uuid;

    fn parse(json: &str) -> Vec<WatchlistEntry> {
        let response: ApiWatchlistResponse = serde_json::from_str(json).unwrap();
        normalize_records(response.watchlist, "service")
    }

    /// Collects every `request_id` recorded onto a span
    struct RecordedRequestIds(Arc<Mutex<Vec<String>>>);

    struct RequestIdVisitor<'a>(&'a Mutex<Vec<String>>);

    impl Visit for RequestIdVisitor<'_> {
        fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn Debug) {
            if field.name() == "request_id" {
                self.0.lock().unwrap().push(format!("{:?}", value));
            }
        }
    }

    impl<S: Subscriber> Layer<S> for RecordedRequestIds {
        fn on_record(&self, _id: &span::Id, values: &span::Record<'_>, _ctx: Context<'_, S>) {
            values.record(&mut RequestIdVisitor(&self.0));
        }
    }

    #[test]
    fn test_watchlist_url_keeps_base_path() {
        let service = HttpWatchlistService::new("http://localhost:5000/api", None).unwrap();

        let url = service.watchlist_url("u1", None).unwrap();
        assert_eq!(url.as_str(), "http://localhost:5000/api/users/u1/watchlist");

        let url = service
            .watchlist_url("u1", Some(&MovieId::from("27205")))
            .unwrap();
        assert_eq!(
            url.as_str(),
            "http://localhost:5000/api/users/u1/watchlist/27205"
        );
    }

    #[test]
    fn test_watchlist_url_trailing_slash_and_escaping() {
        let service = HttpWatchlistService::new("http://localhost:5000/api/", None).unwrap();

        let url = service
            .watchlist_url("a/b", Some(&MovieId::from("1 2")))
            .unwrap();
        assert_eq!(
            url.as_str(),
            "http://localhost:5000/api/users/a%2Fb/watchlist/1%202"
        );
    }

    #[test]
    fn test_invalid_base_url() {
        let result = HttpWatchlistService::new("not a url", None);
        assert!(matches!(result, Err(WatchlistError::InvalidConfig(_))));
    }

    #[test]
    fn test_response_records_are_normalized() {
        let entries = parse(
            r#"{"watchlist": [
                {"movieId": "27205", "title": "Inception", "year": "2010"},
                {"id": 603, "title": "The Matrix", "poster": ""},
                {"title": "No id at all"}
            ]}"#,
        );

        assert_eq!(entries.len(), 2);
        assert_eq!(entries[1].movie_id.as_str(), "603");
        assert_eq!(entries[1].poster, crate::models::PLACEHOLDER_POSTER);
    }

    #[test]
    fn test_missing_watchlist_field_is_empty() {
        assert!(parse("{}").is_empty());
    }

    #[tokio::test]
    async fn test_request_id_recorded_on_call_span() {
        let recorded = Arc::new(Mutex::new(Vec::new()));
        let subscriber =
            tracing_subscriber::registry().with(RecordedRequestIds(recorded.clone()));
        let _guard = tracing::subscriber::set_default(subscriber);

        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let service = HttpWatchlistService::new(&format!("http://{}/api", addr), None).unwrap();
        assert!(service.fetch("u1").await.is_err());

        let ids = recorded.lock().unwrap().clone();
        assert_eq!(ids.len(), 1);
        assert!(Uuid::parse_str(&ids[0]).is_ok());
    }
}
