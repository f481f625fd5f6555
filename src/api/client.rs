//! Cache-augmented client for the transit query API
//!
//! Every accessor goes through the same path: serve from the response cache
//! when possible, otherwise fetch over HTTP and write the body back to the
//! cache. When the backend is unreachable the client falls back to whatever
//! the cache still holds and flags the result as stale, so the UI keeps
//! working through backend cold starts and outages.

use reqwest::Client;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

use super::models::{DayType, Direction, IntervalStats, Route, Stop, TripDurations};
use crate::cache::{CacheKey, ResponseCache};
use crate::store::KeyValueStore;

/// Default backend base URL
const DEFAULT_BASE_URL: &str = "https://gtfs-moscow-api.onrender.com";

/// Request timeout; generous because the free-tier backend cold-starts
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Timeout for the liveness probe
const HEALTH_TIMEOUT: Duration = Duration::from_secs(5);

/// Errors that can occur when querying the backend
#[derive(Debug, Error)]
pub enum ApiError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Backend answered with a non-success status
    #[error("Backend returned status {0}")]
    Status(reqwest::StatusCode),

    /// Failed to parse the response body
    #[error("Failed to parse response: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Degradation notice attached to a fetched result
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchWarning {
    /// The backend was unreachable; a previously cached value is shown
    StaleDataShown,
}

/// A fetched value plus where it came from
#[derive(Debug, Clone, PartialEq)]
pub struct Fetched<T> {
    pub data: T,
    /// True when the value came out of the response cache
    pub from_cache: bool,
    pub warning: Option<FetchWarning>,
}

impl<T> Fetched<T> {
    /// Transforms the payload, keeping the cache metadata.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Fetched<U> {
        Fetched {
            data: f(self.data),
            from_cache: self.from_cache,
            warning: self.warning,
        }
    }
}

/// Client for the transit schedule backend
#[derive(Clone)]
pub struct ApiClient {
    http: Client,
    base_url: String,
    cache: ResponseCache,
    use_cache: bool,
}

impl ApiClient {
    /// Creates a client against the default backend, caching into `store`.
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self::with_base_url(store, DEFAULT_BASE_URL.to_string())
    }

    /// Creates a client against a custom backend URL.
    pub fn with_base_url(store: Arc<dyn KeyValueStore>, base_url: String) -> Self {
        let http = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_else(|_| Client::new());
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            cache: ResponseCache::new(store),
            use_cache: true,
        }
    }

    /// Disables reading from and writing to the response cache.
    pub fn without_cache(mut self) -> Self {
        self.use_cache = false;
        self
    }

    /// The response cache backing this client.
    pub fn cache(&self) -> &ResponseCache {
        &self.cache
    }

    /// Generic cache-or-fetch for a GET endpoint.
    ///
    /// Order of attempts: cache hit (if caching is on), live fetch with
    /// write-through, then cache fallback with a staleness warning. Only when
    /// all three fail does the error propagate.
    async fn get_json(
        &self,
        endpoint: &str,
        params: &[(&str, String)],
    ) -> Result<Fetched<Value>, ApiError> {
        let mut key = CacheKey::new(endpoint);
        for (name, value) in params {
            key = key.param(*name, value.clone());
        }

        if self.use_cache {
            if let Some(cached) = self.cache.get(&key) {
                return Ok(Fetched {
                    data: cached,
                    from_cache: true,
                    warning: None,
                });
            }
        }

        match self.fetch(endpoint, params).await {
            Ok(body) => {
                if self.use_cache {
                    self.cache.set(&key, body.clone());
                }
                Ok(Fetched {
                    data: body,
                    from_cache: false,
                    warning: None,
                })
            }
            Err(error) => {
                // Any cached value still within its TTL beats an error page
                if let Some(cached) = self.cache.get(&key) {
                    return Ok(Fetched {
                        data: cached,
                        from_cache: true,
                        warning: Some(FetchWarning::StaleDataShown),
                    });
                }
                Err(error)
            }
        }
    }

    /// Performs the actual HTTP GET.
    async fn fetch(&self, endpoint: &str, params: &[(&str, String)]) -> Result<Value, ApiError> {
        let url = format!("{}{}", self.base_url, endpoint);
        let response = self.http.get(&url).query(params).send().await?;
        if !response.status().is_success() {
            return Err(ApiError::Status(response.status()));
        }
        let text = response.text().await?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Fetches the full route list.
    pub async fn routes(&self) -> Result<Fetched<Vec<Route>>, ApiError> {
        let fetched = self.get_json("/api/routes", &[]).await?;
        Ok(fetched.map(|body| field(&body, "routes")))
    }

    /// Fetches the ordered stop list for a route and direction.
    pub async fn stops(
        &self,
        route: &str,
        direction: Direction,
    ) -> Result<Fetched<Vec<Stop>>, ApiError> {
        let endpoint = format!("/api/route/{}/stops", path_segment(route));
        let params = [("direction", direction.as_query().to_string())];
        let fetched = self.get_json(&endpoint, &params).await?;
        Ok(fetched.map(|body| field(&body, "stops")))
    }

    /// Fetches the departure times for a stop as "HH:MM[:SS]" strings.
    pub async fn schedule(
        &self,
        route: &str,
        stop_name: &str,
        direction: Direction,
        day_type: DayType,
    ) -> Result<Fetched<Vec<String>>, ApiError> {
        let endpoint = format!("/api/route/{}/schedule", path_segment(route));
        let params = [
            ("stop_name", stop_name.to_string()),
            ("direction", direction.as_query().to_string()),
            ("day_type", day_type.as_str().to_string()),
        ];
        let fetched = self.get_json(&endpoint, &params).await?;
        Ok(fetched.map(|body| field(&body, "schedule")))
    }

    /// Fetches per-hour headway statistics for a stop.
    pub async fn intervals(
        &self,
        route: &str,
        stop_name: &str,
        direction: Direction,
        day_type: DayType,
    ) -> Result<Fetched<IntervalStats>, ApiError> {
        let endpoint = format!("/api/route/{}/intervals", path_segment(route));
        let params = [
            ("stop_name", stop_name.to_string()),
            ("direction", direction.as_query().to_string()),
            ("day_type", day_type.as_str().to_string()),
        ];
        let fetched = self.get_json(&endpoint, &params).await?;
        Ok(fetched.map(|body| field(&body, "intervals")))
    }

    /// Fetches trip duration statistics for a route and direction.
    pub async fn durations(
        &self,
        route: &str,
        direction: Direction,
        day_type: DayType,
    ) -> Result<Fetched<TripDurations>, ApiError> {
        let endpoint = format!("/api/route/{}/durations", path_segment(route));
        let params = [
            ("direction", direction.as_query().to_string()),
            ("day_type", day_type.as_str().to_string()),
        ];
        let fetched = self.get_json(&endpoint, &params).await?;
        Ok(fetched.map(|body| field(&body, "durations")))
    }

    /// Liveness probe with a short timeout, used to wake the backend.
    ///
    /// Never errors; any failure reads as "not healthy".
    pub async fn health(&self) -> bool {
        let url = format!("{}/health", self.base_url);
        match self.http.get(&url).timeout(HEALTH_TIMEOUT).send().await {
            Ok(response) => response.status().is_success(),
            Err(_) => false,
        }
    }
}

/// Extracts and deserializes a named field, defaulting when missing or
/// malformed. A well-formed-but-empty response is never an error.
fn field<T: DeserializeOwned + Default>(body: &Value, name: &str) -> T {
    body.get(name)
        .cloned()
        .and_then(|value| serde_json::from_value(value).ok())
        .unwrap_or_default()
}

/// Percent-encodes a route name for use as a URL path segment.
///
/// Route short names can carry Cyrillic letters and spaces ("т25", "Бк").
fn path_segment(raw: &str) -> String {
    let mut encoded = String::with_capacity(raw.len());
    for byte in raw.bytes() {
        match byte {
            b'a'..=b'z' | b'A'..=b'Z' | b'0'..=b'9' | b'-' | b'.' | b'_' | b'~' => {
                encoded.push(byte as char);
            }
            _ => encoded.push_str(&format!("%{:02X}", byte)),
        }
    }
    encoded
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use serde_json::json;

    fn create_test_client() -> ApiClient {
        // Unroutable base URL: every fetch fails fast, which is exactly what
        // the fallback tests need
        ApiClient::with_base_url(
            Arc::new(MemoryStore::new()),
            "http://127.0.0.1:1".to_string(),
        )
    }

    #[test]
    fn test_path_segment_passes_unreserved() {
        assert_eq!(path_segment("12"), "12");
        assert_eq!(path_segment("m4-a"), "m4-a");
    }

    #[test]
    fn test_path_segment_encodes_cyrillic_and_spaces() {
        assert_eq!(path_segment("т25"), "%D1%8225");
        assert_eq!(path_segment("a b"), "a%20b");
    }

    #[test]
    fn test_field_defaults_when_missing() {
        let body = json!({"count": 0});

        let routes: Vec<Route> = field(&body, "routes");

        assert!(routes.is_empty());
    }

    #[test]
    fn test_field_extracts_typed_list() {
        let body = json!({
            "routes": [
                {"route_id": "4126", "route_short_name": "1", "route_long_name": "A - B"}
            ]
        });

        let routes: Vec<Route> = field(&body, "routes");

        assert_eq!(routes.len(), 1);
        assert_eq!(routes[0].route_short_name, "1");
    }

    #[test]
    fn test_field_defaults_on_shape_mismatch() {
        let body = json!({"schedule": {"unexpected": "object"}});

        let schedule: Vec<String> = field(&body, "schedule");

        assert!(schedule.is_empty());
    }

    #[tokio::test]
    async fn test_fetch_failure_without_cache_propagates() {
        let client = create_test_client();

        let result = client.routes().await;

        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_fetch_failure_falls_back_to_cached_value() {
        let client = create_test_client();
        let key = CacheKey::new("/api/routes");
        client.cache().set(
            &key,
            json!({"routes": [{"route_short_name": "12", "route_long_name": "", "route_id": ""}]}),
        );

        let fetched = client.routes().await.expect("Should fall back to cache");

        assert!(fetched.from_cache);
        assert_eq!(fetched.warning, Some(FetchWarning::StaleDataShown));
        assert_eq!(fetched.data.len(), 1);
        assert_eq!(fetched.data[0].route_short_name, "12");
    }

    #[tokio::test]
    async fn test_cache_hit_skips_network() {
        // The base URL is unroutable, so a successful result proves the
        // cache answered without a network call
        let client = create_test_client();
        let key = CacheKey::new("/api/route/12/schedule")
            .param("stop_name", "Main St")
            .param("direction", "0")
            .param("day_type", "weekday");
        client
            .cache()
            .set(&key, json!({"schedule": ["05:00", "05:20"]}));

        let fetched = client
            .schedule("12", "Main St", Direction::Outbound, DayType::Weekday)
            .await
            .expect("Should be served from cache");

        assert!(fetched.from_cache);
        assert!(fetched.warning.is_none());
        assert_eq!(fetched.data, vec!["05:00", "05:20"]);
    }

    #[tokio::test]
    async fn test_without_cache_ignores_cached_value() {
        let client = create_test_client();
        let key = CacheKey::new("/api/routes");
        client.cache().set(&key, json!({"routes": []}));
        let client = client.without_cache();

        // With caching off the cached entry is not used as a primary source;
        // the unroutable fetch still falls back to it as a last resort
        let fetched = client.routes().await.expect("Fallback still applies");
        assert_eq!(fetched.warning, Some(FetchWarning::StaleDataShown));
    }

    #[tokio::test]
    async fn test_health_is_false_when_unreachable() {
        let client = create_test_client();

        assert!(!client.health().await);
    }
}
