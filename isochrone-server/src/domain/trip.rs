//! Trip provenance.
//!
//! A `Trip` records how a candidate reached its location: the legs taken so
//! far and the route path. It is kept for diagnostics; the search itself only
//! needs the accumulated minutes.

use serde::Serialize;

use super::{DirectionId, RouteId, StopId};

/// How a location was reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ArrivalKind {
    /// The initial point of the search.
    Origin,
    /// Reached on foot from a hub.
    Walk,
    /// Reached by riding a route.
    Transit,
}

impl ArrivalKind {
    /// Hubs are the centres of walking circles: the origin and transit arrivals.
    pub fn is_hub(&self) -> bool {
        matches!(self, ArrivalKind::Origin | ArrivalKind::Transit)
    }
}

/// One leg of a trip.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TripLeg {
    Walk {
        minutes: f64,
        meters: f64,
        description: String,
    },
    Wait {
        minutes: f64,
        route: RouteId,
        direction: DirectionId,
        stop: StopId,
        description: String,
    },
    Ride {
        minutes: f64,
        route: RouteId,
        direction: DirectionId,
        from_stop: StopId,
        to_stop: StopId,
        description: String,
    },
}

impl TripLeg {
    pub fn minutes(&self) -> f64 {
        match self {
            TripLeg::Walk { minutes, .. }
            | TripLeg::Wait { minutes, .. }
            | TripLeg::Ride { minutes, .. } => *minutes,
        }
    }

    pub fn description(&self) -> &str {
        match self {
            TripLeg::Walk { description, .. }
            | TripLeg::Wait { description, .. }
            | TripLeg::Ride { description, .. } => description,
        }
    }

    pub fn is_walk(&self) -> bool {
        matches!(self, TripLeg::Walk { .. })
    }
}

/// The legs taken to reach a location, plus the `/`-joined route path.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Trip {
    pub legs: Vec<TripLeg>,
    pub routes: String,
}

impl Trip {
    /// The empty trip of the initial point.
    pub fn start() -> Self {
        Self::default()
    }

    /// A copy of this trip extended by a walk.
    pub fn then_walk(&self, minutes: f64, meters: f64, to_title: &str) -> Self {
        let mut legs = self.legs.clone();
        legs.push(TripLeg::Walk {
            minutes,
            meters,
            description: format!("Walk {:.0} m to {}", meters, to_title),
        });
        Self {
            legs,
            routes: self.routes.clone(),
        }
    }

    /// A copy of this trip extended by waiting for and riding a route.
    pub fn then_ride(&self, wait: TripLeg, ride: TripLeg, route: &RouteId) -> Self {
        let mut legs = self.legs.clone();
        legs.push(wait);
        legs.push(ride);
        let routes = if self.routes.is_empty() {
            route.to_string()
        } else {
            format!("{}/{}", self.routes, route)
        };
        Self { legs, routes }
    }

    /// Sum of all leg durations.
    pub fn total_minutes(&self) -> f64 {
        self.legs.iter().map(TripLeg::minutes).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn route(s: &str) -> RouteId {
        RouteId::parse(s).unwrap()
    }

    fn wait_and_ride(r: &str, wait: f64, ride: f64) -> (TripLeg, TripLeg) {
        let dir = DirectionId::parse("0").unwrap();
        let a = StopId::parse("a").unwrap();
        let b = StopId::parse("b").unwrap();
        (
            TripLeg::Wait {
                minutes: wait,
                route: route(r),
                direction: dir.clone(),
                stop: a.clone(),
                description: format!("Wait for {r}"),
            },
            TripLeg::Ride {
                minutes: ride,
                route: route(r),
                direction: dir,
                from_stop: a,
                to_stop: b,
                description: format!("Ride {r}"),
            },
        )
    }

    #[test]
    fn hubs() {
        assert!(ArrivalKind::Origin.is_hub());
        assert!(ArrivalKind::Transit.is_hub());
        assert!(!ArrivalKind::Walk.is_hub());
    }

    #[test]
    fn route_path_concatenates() {
        let (w1, r1) = wait_and_ride("14", 5.0, 10.0);
        let (w2, r2) = wait_and_ride("J", 3.0, 7.0);
        let trip = Trip::start()
            .then_walk(2.0, 160.0, "Mission St & 16th St")
            .then_ride(w1, r1, &route("14"))
            .then_ride(w2, r2, &route("J"));

        assert_eq!(trip.routes, "14/J");
        assert_eq!(trip.legs.len(), 5);
        assert_eq!(trip.total_minutes(), 27.0);
        assert!(trip.legs[0].is_walk());
        assert_eq!(trip.legs[0].description(), "Walk 160 m to Mission St & 16th St");
    }

    #[test]
    fn extending_leaves_original_untouched() {
        let base = Trip::start().then_walk(1.0, 80.0, "A");
        let longer = base.then_walk(1.0, 80.0, "B");
        assert_eq!(base.legs.len(), 1);
        assert_eq!(longer.legs.len(), 2);
    }

    #[test]
    fn legs_serialize_with_kind_tag() {
        let trip = Trip::start().then_walk(1.5, 120.0, "A");
        let json = serde_json::to_value(&trip).unwrap();
        assert_eq!(json["legs"][0]["kind"], "walk");
        assert_eq!(json["legs"][0]["minutes"], 1.5);
    }
}
