//! Mock data client for testing and offline development.
//!
//! Serves in-memory tables, either built up with the `with_*` methods or
//! loaded from a directory laid out like the published data:
//!
//! ```text
//! locations.json
//! routes/{route_id}.json
//! wait-times/{date}/{stat}[_{HHMM-HHMM}].json
//! ride-times/{date}/{stat}[_{HHMM-HHMM}].json
//! ```
//!
//! Every fetch is counted, and failures can be injected per route or per
//! table kind.

use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use serde::de::DeserializeOwned;

use crate::domain::{
    Location, RideTimeTable, RouteId, RouteInfo, StatKind, StatsKey, TimeBucket, WaitTimeTable,
    parse_date,
};

use super::DataProvider;
use super::convert::{convert_locations, convert_ride_times, convert_route, convert_wait_times};
use super::error::DataError;
use super::types::{LocationDto, RideTimesDto, RouteDto, WaitTimesDto};

#[derive(Debug, Default)]
struct FetchCounts {
    locations: AtomicUsize,
    routes: AtomicUsize,
    wait_times: AtomicUsize,
    ride_times: AtomicUsize,
}

/// Mock data client that serves in-memory tables.
#[derive(Debug, Clone, Default)]
pub struct MockDataClient {
    locations: Vec<Location>,
    routes: HashMap<RouteId, RouteInfo>,
    wait_times: HashMap<StatsKey, WaitTimeTable>,
    ride_times: HashMap<StatsKey, RideTimeTable>,
    failing_routes: HashSet<RouteId>,
    fail_locations: bool,
    fail_wait_times: bool,
    fail_ride_times: bool,
    counts: Arc<FetchCounts>,
}

fn injected() -> DataError {
    DataError::ApiError {
        status: 503,
        message: "injected failure".to_string(),
    }
}

impl MockDataClient {
    /// Create an empty mock.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_location(mut self, location: Location) -> Self {
        self.locations.push(location);
        self
    }

    pub fn with_route(mut self, route: RouteInfo) -> Self {
        self.routes.insert(route.id.clone(), route);
        self
    }

    pub fn with_wait_times(mut self, key: StatsKey, table: WaitTimeTable) -> Self {
        self.wait_times.insert(key, table);
        self
    }

    pub fn with_ride_times(mut self, key: StatsKey, table: RideTimeTable) -> Self {
        self.ride_times.insert(key, table);
        self
    }

    /// Make every topology fetch for `route` fail.
    pub fn failing_route(mut self, route: RouteId) -> Self {
        self.failing_routes.insert(route);
        self
    }

    /// Make the location list fetch fail.
    pub fn failing_locations(mut self) -> Self {
        self.fail_locations = true;
        self
    }

    /// Make every wait-time table fetch fail.
    pub fn failing_wait_times(mut self) -> Self {
        self.fail_wait_times = true;
        self
    }

    /// Make every ride-time table fetch fail.
    pub fn failing_ride_times(mut self) -> Self {
        self.fail_ride_times = true;
        self
    }

    /// Load mock data from a directory.
    ///
    /// `locations.json` is required; the other directories are optional.
    pub fn load_dir(dir: impl AsRef<Path>) -> Result<Self, DataError> {
        let dir = dir.as_ref();
        let mut mock = Self::new();

        let locations: Vec<LocationDto> = read_json(&dir.join("locations.json"))?;
        mock.locations = convert_locations(locations)?;

        for path in json_files(&dir.join("routes"))? {
            let route = convert_route(read_json::<RouteDto>(&path)?)?;
            mock.routes.insert(route.id.clone(), route);
        }

        for (key, path) in stats_files(&dir.join("wait-times"))? {
            let table = convert_wait_times(read_json::<WaitTimesDto>(&path)?);
            mock.wait_times.insert(key, table);
        }

        for (key, path) in stats_files(&dir.join("ride-times"))? {
            let table = convert_ride_times(read_json::<RideTimesDto>(&path)?);
            mock.ride_times.insert(key, table);
        }

        Ok(mock)
    }

    /// Number of route topology fetches served so far.
    pub fn route_fetches(&self) -> usize {
        self.counts.routes.load(Ordering::SeqCst)
    }

    /// Number of wait-time table fetches served so far.
    pub fn wait_time_fetches(&self) -> usize {
        self.counts.wait_times.load(Ordering::SeqCst)
    }

    /// Number of ride-time table fetches served so far.
    pub fn ride_time_fetches(&self) -> usize {
        self.counts.ride_times.load(Ordering::SeqCst)
    }

    /// Number of location list fetches served so far.
    pub fn location_fetches(&self) -> usize {
        self.counts.locations.load(Ordering::SeqCst)
    }
}

fn io_error(path: &Path, e: impl std::fmt::Display) -> DataError {
    DataError::Io {
        path: path.display().to_string(),
        message: e.to_string(),
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, DataError> {
    let json = std::fs::read_to_string(path).map_err(|e| io_error(path, e))?;
    serde_json::from_str(&json).map_err(|e| DataError::Json {
        message: format!("{}: {}", path.display(), e),
        body: None,
    })
}

/// `.json` files directly inside `dir`, sorted. A missing directory is empty.
fn json_files(dir: &Path) -> Result<Vec<std::path::PathBuf>, DataError> {
    if !dir.is_dir() {
        return Ok(Vec::new());
    }
    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(|e| io_error(dir, e))? {
        let path = entry.map_err(|e| io_error(dir, e))?.path();
        if path.is_file() && path.extension().and_then(|s| s.to_str()) == Some("json") {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Statistics tables under `{dir}/{date}/{stem}.json`, with their keys.
fn stats_files(dir: &Path) -> Result<Vec<(StatsKey, std::path::PathBuf)>, DataError> {
    if !dir.is_dir() {
        return Ok(Vec::new());
    }
    let mut found = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(|e| io_error(dir, e))? {
        let date_dir = entry.map_err(|e| io_error(dir, e))?.path();
        let Some(date) = date_dir
            .file_name()
            .and_then(|s| s.to_str())
            .and_then(|s| parse_date(s).ok())
        else {
            continue;
        };
        for path in json_files(&date_dir)? {
            let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or_default();
            match parse_stats_stem(stem) {
                Some((time, stat)) => found.push((StatsKey::new(date, time, stat), path)),
                None => {
                    return Err(io_error(&path, "file name is not {stat}[_{HHMM-HHMM}]"));
                }
            }
        }
    }
    Ok(found)
}

/// Parse `median` or `median_0700-1000`.
fn parse_stats_stem(stem: &str) -> Option<(Option<TimeBucket>, StatKind)> {
    let (stat, token) = match stem.split_once('_') {
        Some((stat, token)) => (stat, Some(token)),
        None => (stem, None),
    };
    let stat = StatKind::parse(stat).ok()?;
    let time = match token {
        Some(token) => {
            let (start, end) = token.split_once('-')?;
            let hhmm = |s: &str| s.len() == 4 && s.bytes().all(|b| b.is_ascii_digit());
            if !hhmm(start) || !hhmm(end) {
                return None;
            }
            let bucket = format!("{}:{}-{}:{}", &start[..2], &start[2..], &end[..2], &end[2..]);
            Some(TimeBucket::parse(&bucket).ok()?)
        }
        None => None,
    };
    Some((time, stat))
}

impl DataProvider for MockDataClient {
    async fn fetch_locations(&self) -> Result<Vec<Location>, DataError> {
        self.counts.locations.fetch_add(1, Ordering::SeqCst);
        if self.fail_locations {
            return Err(injected());
        }
        Ok(self.locations.clone())
    }

    async fn fetch_route(&self, route: &RouteId) -> Result<Option<RouteInfo>, DataError> {
        self.counts.routes.fetch_add(1, Ordering::SeqCst);
        if self.failing_routes.contains(route) {
            return Err(injected());
        }
        Ok(self.routes.get(route).cloned())
    }

    async fn fetch_wait_times(&self, key: &StatsKey) -> Result<Option<WaitTimeTable>, DataError> {
        self.counts.wait_times.fetch_add(1, Ordering::SeqCst);
        if self.fail_wait_times {
            return Err(injected());
        }
        Ok(self.wait_times.get(key).cloned())
    }

    async fn fetch_ride_times(&self, key: &StatsKey) -> Result<Option<RideTimeTable>, DataError> {
        self.counts.ride_times.fetch_add(1, Ordering::SeqCst);
        if self.fail_ride_times {
            return Err(injected());
        }
        Ok(self.ride_times.get(key).cloned())
    }
}
