//! Route topology: ordered stop sequences per direction.

use std::collections::HashMap;

use super::{DirectionId, LatLon, LocationId, RouteId, StopId};

/// One direction of a route, with its stops in travel order.
#[derive(Debug, Clone, PartialEq)]
pub struct Direction {
    pub id: DirectionId,
    pub stops: Vec<StopId>,
}

impl Direction {
    pub fn new(id: DirectionId, stops: Vec<StopId>) -> Self {
        Self { id, stops }
    }

    /// Position of `stop` in this direction, if it is served.
    pub fn position_of(&self, stop: &StopId) -> Option<usize> {
        self.stops.iter().position(|s| s == stop)
    }

    /// Stops after position `idx`, in travel order.
    pub fn stops_after(&self, idx: usize) -> &[StopId] {
        self.stops.get(idx + 1..).unwrap_or(&[])
    }
}

/// Per-route details of a stop.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteStopInfo {
    pub location: LocationId,
    pub position: LatLon,
    pub title: String,
}

/// Topology of one route.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteInfo {
    pub id: RouteId,
    pub directions: Vec<Direction>,
    pub stops: HashMap<StopId, RouteStopInfo>,
}

impl RouteInfo {
    /// Directions that serve `stop`, with the stop's position in each.
    pub fn boardings<'a>(
        &'a self,
        stop: &'a StopId,
    ) -> impl Iterator<Item = (&'a Direction, usize)> + 'a {
        self.directions
            .iter()
            .filter_map(move |d| d.position_of(stop).map(|idx| (d, idx)))
    }

    /// Look up the stop details for a route-local stop id.
    pub fn stop(&self, stop: &StopId) -> Option<&RouteStopInfo> {
        self.stops.get(stop)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stop(s: &str) -> StopId {
        StopId::parse(s).unwrap()
    }

    fn route() -> RouteInfo {
        RouteInfo {
            id: RouteId::parse("J").unwrap(),
            directions: vec![
                Direction::new(
                    DirectionId::parse("out").unwrap(),
                    vec![stop("a"), stop("b"), stop("c")],
                ),
                Direction::new(
                    DirectionId::parse("in").unwrap(),
                    vec![stop("c"), stop("b"), stop("a")],
                ),
            ],
            stops: HashMap::new(),
        }
    }

    #[test]
    fn boardings_in_every_direction() {
        let r = route();
        let b = stop("b");
        let found: Vec<_> = r
            .boardings(&b)
            .map(|(d, idx)| (d.id.as_str().to_string(), idx))
            .collect();
        assert_eq!(found, vec![("out".to_string(), 1), ("in".to_string(), 1)]);
    }

    #[test]
    fn stops_after_terminus_is_empty() {
        let r = route();
        let out = &r.directions[0];
        assert_eq!(out.stops_after(0), &[stop("b"), stop("c")]);
        assert!(out.stops_after(2).is_empty());
        assert!(out.stops_after(10).is_empty());
    }

    #[test]
    fn unknown_stop_has_no_boardings() {
        let r = route();
        let z = stop("z");
        assert_eq!(r.boardings(&z).count(), 0);
    }
}
