//! Search requests and their validation.

use std::collections::HashSet;

use crate::domain::{DomainError, LatLon, RouteId, RunId, StatsKey};

/// Error from an invalid search request.
///
/// These are raised before a run is created.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SearchError {
    /// A field failed validation
    #[error("invalid search request: {0}")]
    InvalidRequest(String),

    /// A field could not be parsed
    #[error(transparent)]
    Domain(#[from] DomainError),
}

/// Request for a reachability search.
#[derive(Debug, Clone)]
pub struct SearchRequest {
    /// Host-chosen identifier; must increase across requests.
    pub run_id: RunId,

    /// The initial point.
    pub origin: LatLon,

    /// Elapsed-time thresholds to report, strictly ascending (minutes).
    pub thresholds: Vec<f64>,

    /// Routes that may be ridden.
    pub enabled_routes: HashSet<RouteId>,

    /// Which statistics tables to use.
    pub stats: StatsKey,
}

impl SearchRequest {
    /// Create a new search request.
    pub fn new(
        run_id: RunId,
        origin: LatLon,
        thresholds: Vec<f64>,
        enabled_routes: HashSet<RouteId>,
        stats: StatsKey,
    ) -> Self {
        Self {
            run_id,
            origin,
            thresholds,
            enabled_routes,
            stats,
        }
    }

    /// Validate the search request.
    pub fn validate(&self) -> Result<(), SearchError> {
        if self.run_id.0 == 0 {
            return Err(SearchError::InvalidRequest(
                "run id must be positive".to_string(),
            ));
        }

        if self.thresholds.is_empty() {
            return Err(SearchError::InvalidRequest(
                "at least one threshold is required".to_string(),
            ));
        }

        if let Some(bad) = self
            .thresholds
            .iter()
            .find(|t| !t.is_finite() || **t <= 0.0)
        {
            return Err(SearchError::InvalidRequest(format!(
                "threshold {bad} is not a positive number of minutes"
            )));
        }

        if self.thresholds.windows(2).any(|w| w[0] >= w[1]) {
            return Err(SearchError::InvalidRequest(
                "thresholds must be strictly ascending".to_string(),
            ));
        }

        Ok(())
    }

    /// The largest threshold; nothing beyond it is explored.
    pub fn max_threshold(&self) -> f64 {
        self.thresholds.last().copied().unwrap_or(0.0)
    }

    pub fn route_enabled(&self, route: &RouteId) -> bool {
        self.enabled_routes.contains(route)
    }
}
