//! Data transfer objects for web requests and responses.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::cache::CacheStats;
use crate::domain::{LatLon, RouteId, RunId, StatKind, StatsKey, TimeBucket, parse_date};
use crate::search::{SearchError, SearchRequest};

/// Request to start an isochrone run.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct IsochroneRequest {
    /// Host-chosen run id; must increase across requests
    pub run_id: u64,

    /// Initial point
    pub lat: f64,
    pub lon: f64,

    /// Ascending elapsed-time thresholds in minutes
    pub thresholds: Vec<f64>,

    /// Route ids that may be ridden
    #[serde(default)]
    pub routes: Vec<String>,

    /// Statistics date, `YYYY-MM-DD`
    pub date: String,

    /// Optional time-of-day bucket, `HH:MM-HH:MM`
    pub time: Option<String>,

    /// Statistic kind (defaults to median)
    pub stat: Option<String>,
}

/// Treat an empty string the same as a missing field.
fn present(s: &Option<String>) -> Option<&str> {
    s.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

impl IsochroneRequest {
    /// Parse and validate into a search request.
    pub fn into_search_request(self) -> Result<SearchRequest, SearchError> {
        let origin = LatLon::new(self.lat, self.lon)?;
        let routes = self
            .routes
            .iter()
            .map(|r| RouteId::parse(r))
            .collect::<Result<HashSet<_>, _>>()?;
        let date = parse_date(&self.date)?;
        let time = present(&self.time).map(TimeBucket::parse).transpose()?;
        let stat = present(&self.stat)
            .map(StatKind::parse)
            .transpose()?
            .unwrap_or_default();

        let request = SearchRequest::new(
            RunId(self.run_id),
            origin,
            self.thresholds,
            routes,
            StatsKey::new(date, time, stat),
        );
        request.validate()?;
        Ok(request)
    }
}

/// Server status.
#[derive(Debug, Serialize)]
pub struct StatsResponse {
    /// Most recently accepted run id (0 before any)
    pub latest_run: RunId,

    /// Loaded location count, if loaded
    pub locations: Option<usize>,

    /// Cache entry counts
    pub cache: CacheStats,
}

/// Error response.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::DomainError;

    fn request() -> IsochroneRequest {
        serde_json::from_str(
            r#"{"run_id": 3, "lat": 37.77, "lon": -122.42, "thresholds": [5, 10],
                "routes": ["14", "J"], "date": "2019-12-04", "time": "07:00-10:00"}"#,
        )
        .unwrap()
    }

    #[test]
    fn converts_full_request() {
        let req = request().into_search_request().unwrap();
        assert_eq!(req.run_id, RunId(3));
        assert_eq!(req.thresholds, vec![5.0, 10.0]);
        assert_eq!(req.enabled_routes.len(), 2);
        assert_eq!(req.stats.stat, StatKind::Median);
        assert_eq!(req.stats.file_stem(), "median_0700-1000");
    }

    #[test]
    fn empty_optional_fields_are_absent() {
        let mut raw = request();
        raw.time = Some(String::new());
        raw.stat = Some(" ".into());
        let req = raw.into_search_request().unwrap();
        assert_eq!(req.stats.time, None);
        assert_eq!(req.stats.stat, StatKind::Median);
    }

    #[test]
    fn rejects_malformed_fields() {
        let mut raw = request();
        raw.lat = 123.0;
        assert!(matches!(
            raw.into_search_request(),
            Err(SearchError::Domain(DomainError::InvalidCoordinate { .. }))
        ));

        let mut raw = request();
        raw.date = "yesterday".into();
        assert!(raw.into_search_request().is_err());

        let mut raw = request();
        raw.time = Some("10:00-07:00".into());
        assert!(raw.into_search_request().is_err());

        let mut raw = request();
        raw.stat = Some("p50".into());
        assert!(raw.into_search_request().is_err());

        let mut raw = request();
        raw.routes = vec!["".into()];
        assert!(raw.into_search_request().is_err());

        let mut raw = request();
        raw.thresholds = vec![10.0, 5.0];
        assert!(matches!(
            raw.into_search_request(),
            Err(SearchError::InvalidRequest(_))
        ));
    }
}
