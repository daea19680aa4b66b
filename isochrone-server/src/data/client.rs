//! HTTP client for the published transit data.
//!
//! Documents are plain JSON under a base URL:
//!
//! - `locations.json`: the master location list
//! - `routes/{route_id}.json`: route topology
//! - `wait-times/{date}/{stat}[_{bucket}].json`: wait-time table
//! - `ride-times/{date}/{stat}[_{bucket}].json`: ride-time table
//!
//! A 404 means "no data for this key" and is reported as `Ok(None)`.

use std::sync::Arc;

use reqwest::header::{HeaderMap, HeaderValue};
use serde::de::DeserializeOwned;
use tokio::sync::Semaphore;
use tracing::debug;

use crate::domain::{Location, RideTimeTable, RouteId, RouteInfo, StatsKey, WaitTimeTable};

use super::DataProvider;
use super::convert::{convert_locations, convert_ride_times, convert_route, convert_wait_times};
use super::error::DataError;
use super::types::{LocationDto, RideTimesDto, RouteDto, WaitTimesDto};

/// Default maximum concurrent requests.
const DEFAULT_MAX_CONCURRENT: usize = 8;

/// Configuration for the data client.
#[derive(Debug, Clone)]
pub struct DataClientConfig {
    /// Base URL the documents are published under
    pub base_url: String,
    /// Optional API key, sent as `x-apikey`
    pub api_key: Option<String>,
    /// Maximum concurrent requests
    pub max_concurrent: usize,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl DataClientConfig {
    /// Create a new config for the given base URL.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: None,
            max_concurrent: DEFAULT_MAX_CONCURRENT,
            timeout_secs: 30,
        }
    }

    /// Send an API key with every request.
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Set maximum concurrent requests.
    pub fn with_max_concurrent(mut self, n: usize) -> Self {
        self.max_concurrent = n;
        self
    }

    /// Set request timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

/// HTTP data client.
///
/// Uses a semaphore to limit concurrent requests; a single search can fan out
/// to many route fetches at once.
#[derive(Debug, Clone)]
pub struct DataClient {
    http: reqwest::Client,
    base_url: String,
    semaphore: Arc<Semaphore>,
}

impl DataClient {
    /// Create a new client with the given configuration.
    pub fn new(config: DataClientConfig) -> Result<Self, DataError> {
        let mut headers = HeaderMap::new();
        if let Some(key) = &config.api_key {
            let value = HeaderValue::from_str(key).map_err(|_| DataError::ApiError {
                status: 0,
                message: "Invalid API key format".to_string(),
            })?;
            headers.insert("x-apikey", value);
        }

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            semaphore: Arc::new(Semaphore::new(config.max_concurrent.max(1))),
        })
    }

    /// Full URL of a document.
    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    /// Fetch and decode one JSON document. 404 yields `Ok(None)`.
    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<Option<T>, DataError> {
        let _permit = self
            .semaphore
            .acquire()
            .await
            .map_err(|_| DataError::ApiError {
                status: 0,
                message: "Semaphore closed".to_string(),
            })?;

        let url = self.url(path);
        debug!(%url, "fetching");
        let response = self.http.get(&url).send().await?;

        let status = response.status();

        if status == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }

        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            return Err(DataError::Unauthorized);
        }

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(DataError::RateLimited);
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DataError::ApiError {
                status: status.as_u16(),
                message: body,
            });
        }

        let body = response.text().await?;

        serde_json::from_str(&body)
            .map(Some)
            .map_err(|e| DataError::Json {
                message: e.to_string(),
                body: Some(body.chars().take(500).collect()),
            })
    }
}

/// Relative path of a route topology document.
pub(crate) fn route_path(route: &RouteId) -> String {
    format!("routes/{}.json", route)
}

/// Relative path of a statistics table under `kind` (`wait-times` or `ride-times`).
pub(crate) fn stats_path(kind: &str, key: &StatsKey) -> String {
    format!("{}/{}/{}.json", kind, key.date_str(), key.file_stem())
}

impl DataProvider for DataClient {
    async fn fetch_locations(&self) -> Result<Vec<Location>, DataError> {
        let dtos: Vec<LocationDto> =
            self.get_json("locations.json")
                .await?
                .ok_or_else(|| DataError::ApiError {
                    status: 404,
                    message: "location list not published".to_string(),
                })?;
        Ok(convert_locations(dtos)?)
    }

    async fn fetch_route(&self, route: &RouteId) -> Result<Option<RouteInfo>, DataError> {
        let dto: Option<RouteDto> = self.get_json(&route_path(route)).await?;
        Ok(dto.map(convert_route).transpose()?)
    }

    async fn fetch_wait_times(&self, key: &StatsKey) -> Result<Option<WaitTimeTable>, DataError> {
        let dto: Option<WaitTimesDto> = self.get_json(&stats_path("wait-times", key)).await?;
        Ok(dto.map(convert_wait_times))
    }

    async fn fetch_ride_times(&self, key: &StatsKey) -> Result<Option<RideTimeTable>, DataError> {
        let dto: Option<RideTimesDto> = self.get_json(&stats_path("ride-times", key)).await?;
        Ok(dto.map(convert_ride_times))
    }
}
