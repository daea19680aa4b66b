//! Physical locations.

use serde::Serialize;

use super::{DomainError, LocationId, RouteId, StopId};

/// A validated WGS84 coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LatLon {
    lat: f64,
    lon: f64,
}

impl LatLon {
    /// Construct a coordinate, rejecting out-of-range or non-finite values.
    pub fn new(lat: f64, lon: f64) -> Result<Self, DomainError> {
        let valid = lat.is_finite()
            && lon.is_finite()
            && (-90.0..=90.0).contains(&lat)
            && (-180.0..=180.0).contains(&lon);
        if !valid {
            return Err(DomainError::InvalidCoordinate { lat, lon });
        }
        Ok(Self { lat, lon })
    }

    pub fn lat(&self) -> f64 {
        self.lat
    }

    pub fn lon(&self) -> f64 {
        self.lon
    }

    /// The coordinate as a `geo` point (x = longitude, y = latitude).
    pub fn to_point(self) -> geo::Point<f64> {
        geo::Point::new(self.lon, self.lat)
    }
}

/// One route serving a location, with the route-local stop id.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RouteStop {
    pub route: RouteId,
    pub stop: StopId,
}

impl RouteStop {
    pub fn new(route: RouteId, stop: StopId) -> Self {
        Self { route, stop }
    }
}

/// A physical place: a transit stop, or the initial point of a search.
///
/// Immutable reference data, loaded once per process.
#[derive(Debug, Clone, PartialEq)]
pub struct Location {
    pub id: LocationId,
    pub position: LatLon,
    pub title: String,
    /// Routes serving this location. Empty for the initial point.
    pub stops: Vec<RouteStop>,
}

impl Location {
    pub fn new(id: LocationId, position: LatLon, title: impl Into<String>) -> Self {
        Self {
            id,
            position,
            title: title.into(),
            stops: Vec::new(),
        }
    }

    /// Add a route-stop record.
    pub fn with_stop(mut self, route: RouteId, stop: StopId) -> Self {
        self.stops.push(RouteStop::new(route, stop));
        self
    }

    /// The synthetic location standing for a search's initial point.
    pub fn origin(position: LatLon) -> Self {
        Self::new(LocationId::origin(), position, "Starting point")
    }
}
