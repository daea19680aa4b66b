//! Domain types for the isochrone engine.
//!
//! This module contains the validated reference data (locations, route
//! topology, statistics tables) and the trip provenance types. All types
//! enforce their invariants at construction time, so code that receives
//! them can trust their validity.

mod error;
mod ids;
mod location;
mod route;
mod stats;
mod trip;

pub use error::DomainError;
pub use ids::{DirectionId, LocationId, RouteId, RunId, StopId};
pub use location::{LatLon, Location, RouteStop};
pub use route::{Direction, RouteInfo, RouteStopInfo};
pub use stats::{
    RideTimeTable, RideTimes, StatKind, StatsKey, TimeBucket, WaitTimeTable, parse_date,
};
pub use trip::{ArrivalKind, Trip, TripLeg};
