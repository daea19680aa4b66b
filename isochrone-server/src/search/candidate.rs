//! Queue entries.

use crate::domain::{ArrivalKind, LatLon, LocationId, Trip};

/// A proposed arrival at a location.
///
/// Candidates are never mutated once queued; a better arrival is a new
/// candidate and the old one is skipped when popped.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub location: LocationId,
    pub position: LatLon,
    pub title: String,
    /// Elapsed minutes from the origin along this candidate's trip.
    pub trip_mins: f64,
    pub trip: Trip,
    pub kind: ArrivalKind,
}

impl Candidate {
    /// The initial point, at elapsed time zero.
    pub fn origin(position: LatLon) -> Self {
        Self {
            location: LocationId::origin(),
            position,
            title: "Starting point".to_string(),
            trip_mins: 0.0,
            trip: Trip::start(),
            kind: ArrivalKind::Origin,
        }
    }
}
