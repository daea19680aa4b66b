//! Conversion from wire DTOs to domain types.
//!
//! Individual malformed entries (a stop with an empty id, a location with an
//! impossible coordinate) are skipped with a warning rather than failing the
//! whole document. Statistics that are null, negative or not finite are
//! dropped: the search relies on every edge weight being non-negative.

use std::collections::{HashMap, HashSet};

use tracing::warn;

use crate::domain::{
    Direction, DirectionId, LatLon, Location, LocationId, RideTimeTable, RouteId, RouteInfo,
    RouteStopInfo, StopId, WaitTimeTable,
};

use super::types::{LocationDto, RideTimesDto, RouteDto, WaitTimesDto};

/// Error during DTO to domain conversion.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConversionError {
    /// Two locations share an id
    #[error("duplicate location id {0}")]
    DuplicateLocation(String),

    /// A data location uses the id reserved for the search origin
    #[error("location id {0} is reserved")]
    ReservedLocation(String),

    /// Route document has no usable id
    #[error("invalid route id: {0:?}")]
    InvalidRoute(String),
}

/// Convert the master location list.
pub fn convert_locations(dtos: Vec<LocationDto>) -> Result<Vec<Location>, ConversionError> {
    let mut seen = HashSet::with_capacity(dtos.len());
    let mut locations = Vec::with_capacity(dtos.len());

    for dto in dtos {
        let id = match LocationId::parse(&dto.id) {
            Ok(id) => id,
            Err(e) => {
                warn!(error = %e, "skipping location with invalid id");
                continue;
            }
        };
        if id.is_origin() {
            return Err(ConversionError::ReservedLocation(dto.id));
        }
        if !seen.insert(id.clone()) {
            return Err(ConversionError::DuplicateLocation(dto.id));
        }

        let [lat, lon] = dto.lat_lon;
        let position = match LatLon::new(lat, lon) {
            Ok(p) => p,
            Err(e) => {
                warn!(location = %id, error = %e, "skipping location");
                continue;
            }
        };

        let mut location = Location::new(id, position, dto.title);
        for stop in dto.stops {
            match (RouteId::parse(&stop.route_id), StopId::parse(&stop.stop_id)) {
                (Ok(route), Ok(stop)) => location = location.with_stop(route, stop),
                _ => warn!(
                    location = %location.id,
                    route = %stop.route_id,
                    stop = %stop.stop_id,
                    "skipping route-stop record"
                ),
            }
        }
        locations.push(location);
    }

    Ok(locations)
}

/// Convert a route topology document.
pub fn convert_route(dto: RouteDto) -> Result<RouteInfo, ConversionError> {
    let id = RouteId::parse(&dto.id).map_err(|_| ConversionError::InvalidRoute(dto.id.clone()))?;

    let directions = dto
        .directions
        .into_iter()
        .filter_map(|d| {
            let dir_id = DirectionId::parse(&d.id).ok()?;
            let stops = d
                .stops
                .iter()
                .filter_map(|s| StopId::parse(s).ok())
                .collect();
            Some(Direction::new(dir_id, stops))
        })
        .collect();

    let mut stops = HashMap::with_capacity(dto.stops.len());
    for (stop_id, info) in dto.stops {
        let parsed = (
            StopId::parse(&stop_id),
            LocationId::parse(&info.location_id),
            LatLon::new(info.lat, info.lon),
        );
        match parsed {
            (Ok(stop), Ok(location), Ok(position)) => {
                stops.insert(
                    stop,
                    RouteStopInfo {
                        location,
                        position,
                        title: info.title,
                    },
                );
            }
            _ => warn!(route = %id, stop = %stop_id, "skipping malformed route stop"),
        }
    }

    Ok(RouteInfo {
        id,
        directions,
        stops,
    })
}

/// Keep a statistic only if it can be used as an edge weight.
fn usable_minutes(value: Option<f64>) -> Option<f64> {
    value.filter(|m| m.is_finite() && *m >= 0.0)
}

/// Convert a wait-time table.
pub fn convert_wait_times(dto: WaitTimesDto) -> WaitTimeTable {
    let mut table = WaitTimeTable::new();
    for (route, directions) in dto.routes {
        let Ok(route) = RouteId::parse(&route) else {
            continue;
        };
        for (direction, stops) in directions {
            let Ok(direction) = DirectionId::parse(&direction) else {
                continue;
            };
            for (stop, minutes) in stops {
                if let (Ok(stop), Some(minutes)) = (StopId::parse(&stop), usable_minutes(minutes)) {
                    table.insert(route.clone(), direction.clone(), stop, minutes);
                }
            }
        }
    }
    table
}

/// Convert a ride-time table.
pub fn convert_ride_times(dto: RideTimesDto) -> RideTimeTable {
    let mut table = RideTimeTable::new();
    for (route, directions) in dto.routes {
        let Ok(route) = RouteId::parse(&route) else {
            continue;
        };
        for (direction, from_stops) in directions {
            let Ok(direction) = DirectionId::parse(&direction) else {
                continue;
            };
            for (from, to_stops) in from_stops {
                let Ok(from) = StopId::parse(&from) else {
                    continue;
                };
                let times: HashMap<StopId, f64> = to_stops
                    .into_iter()
                    .filter_map(|(to, minutes)| {
                        Some((StopId::parse(&to).ok()?, usable_minutes(minutes)?))
                    })
                    .collect();
                table.insert(route.clone(), direction.clone(), from, times);
            }
        }
    }
    table
}
