//! Small transit networks for tests.
//!
//! Locations are placed by metre offsets from the origin so walking times are
//! easy to reason about (80 m is one minute at the default speed).

use std::collections::{HashMap, HashSet};

use crate::data::MockDataClient;
use crate::domain::{
    Direction, DirectionId, LatLon, Location, LocationId, RideTimeTable, RouteId, RouteInfo,
    RouteStopInfo, RunId, StatKind, StatsKey, StopId, WaitTimeTable, parse_date,
};
use crate::geodesy::MetersPerDegree;
use crate::search::SearchRequest;

pub(crate) fn stats_key() -> StatsKey {
    StatsKey::new(parse_date("2019-12-04").unwrap(), None, StatKind::Median)
}

pub(crate) fn location_id(s: &str) -> LocationId {
    LocationId::parse(s).unwrap()
}

pub(crate) fn route_id(s: &str) -> RouteId {
    RouteId::parse(s).unwrap()
}

fn stop_id(location: &str) -> StopId {
    StopId::parse(&format!("s-{location}")).unwrap()
}

/// A network under construction.
#[derive(Debug, Clone)]
pub(crate) struct Network {
    origin: LatLon,
    locations: Vec<Location>,
    routes: Vec<RouteInfo>,
    waits: WaitTimeTable,
    rides: RideTimeTable,
    failing: Vec<RouteId>,
}

impl Network {
    pub(crate) fn new() -> Self {
        Self {
            origin: LatLon::new(37.77, -122.42).unwrap(),
            locations: Vec::new(),
            routes: Vec::new(),
            waits: WaitTimeTable::new(),
            rides: RideTimeTable::new(),
            failing: Vec::new(),
        }
    }

    /// A point `north_m` north and `east_m` east of the origin.
    pub(crate) fn offset(&self, north_m: f64, east_m: f64) -> LatLon {
        let mpd = MetersPerDegree::at(self.origin);
        LatLon::new(
            self.origin.lat() + north_m / mpd.lat,
            self.origin.lon() + east_m / mpd.lon,
        )
        .unwrap()
    }

    pub(crate) fn location(mut self, id: &str, north_m: f64, east_m: f64) -> Self {
        let position = self.offset(north_m, east_m);
        self.locations
            .push(Location::new(location_id(id), position, id));
        self
    }

    /// A one-direction route through `stops` (location ids, already added).
    ///
    /// Every stop but the last has a wait of `wait`; `legs[i]` is the ride
    /// from stop `i` to stop `i + 1`, and longer rides are sums of legs.
    pub(crate) fn route(mut self, id: &str, stops: &[&str], wait: f64, legs: &[f64]) -> Self {
        assert_eq!(legs.len() + 1, stops.len());
        let route = route_id(id);
        let direction = DirectionId::parse("0").unwrap();

        let mut stop_infos = HashMap::new();
        for &loc in stops {
            let location = self
                .locations
                .iter_mut()
                .find(|l| l.id.as_str() == loc)
                .unwrap();
            location.stops.push(crate::domain::RouteStop::new(route.clone(), stop_id(loc)));
            stop_infos.insert(
                stop_id(loc),
                RouteStopInfo {
                    location: location.id.clone(),
                    position: location.position,
                    title: location.title.clone(),
                },
            );
        }

        for (i, &from) in stops.iter().enumerate().take(stops.len() - 1) {
            self.waits
                .insert(route.clone(), direction.clone(), stop_id(from), wait);
            let mut elapsed = 0.0;
            let mut times = HashMap::new();
            for (j, &to) in stops.iter().enumerate().skip(i + 1) {
                elapsed += legs[j - 1];
                times.insert(stop_id(to), elapsed);
            }
            self.rides
                .insert(route.clone(), direction.clone(), stop_id(from), times);
        }

        self.routes.push(RouteInfo {
            id: route,
            directions: vec![Direction::new(
                direction,
                stops.iter().map(|s| stop_id(s)).collect(),
            )],
            stops: stop_infos,
        });
        self
    }

    /// Make topology fetches for `route` fail.
    pub(crate) fn failing_route(mut self, id: &str) -> Self {
        self.failing.push(route_id(id));
        self
    }

    pub(crate) fn mock(&self) -> MockDataClient {
        let mut mock = self
            .locations
            .iter()
            .cloned()
            .fold(MockDataClient::new(), MockDataClient::with_location);
        for route in &self.routes {
            mock = mock.with_route(route.clone());
        }
        for route in &self.failing {
            mock = mock.failing_route(route.clone());
        }
        mock.with_wait_times(stats_key(), self.waits.clone())
            .with_ride_times(stats_key(), self.rides.clone())
    }

    pub(crate) fn location_count(&self) -> usize {
        self.locations.len()
    }

    /// A request from the origin with every route enabled.
    pub(crate) fn request(&self, run_id: u64, thresholds: Vec<f64>) -> SearchRequest {
        let routes: HashSet<RouteId> = self.routes.iter().map(|r| r.id.clone()).collect();
        SearchRequest::new(RunId(run_id), self.origin, thresholds, routes, stats_key())
    }

    /// Two-minute walk to stop A, five-minute wait, ten-minute ride to B.
    pub(crate) fn scenario() -> Self {
        Self::new()
            .location("A", 160.0, 0.0)
            .location("B", 5000.0, 0.0)
            .route("14", &["A", "B"], 5.0, &[10.0])
    }
}
