//! The reachability search loop.
//!
//! A Dijkstra-style expansion over locations with lazy deletion. Two kinds of
//! edge leave a finalized location:
//!
//! - **walk**: from a hub (the origin or a transit arrival) to every location
//!   within the walking radius left before the largest threshold
//! - **ride**: from any location served by an enabled route, waiting the
//!   expected time at the stop and riding to each later stop
//!
//! Walking arrivals do not walk on; the hub walk that produced them already
//! covers their neighbourhood.
//!
//! All edge weights are non-negative, so locations are finalized in
//! non-decreasing time order and the first pop of a location is its optimum.

use std::sync::Arc;

use futures::future::join_all;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, trace, warn};

use crate::cache::ScheduleCache;
use crate::controller::{ErrorKind, Event, RunToken};
use crate::data::{DataError, DataProvider};
use crate::domain::{ArrivalKind, LocationId, Location, RouteStop, RunId, StatsKey, TripLeg};
use crate::render::BandRenderer;
use crate::spatial::LocationTable;

use super::candidate::Candidate;
use super::config::SearchConfig;
use super::frontier::FrontierQueue;
use super::request::SearchRequest;
use super::state::SearchState;

/// How a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    /// The queue emptied and every threshold was emitted.
    Completed,
    /// A newer run took over.
    Superseded,
    /// Nobody is listening for events any more.
    Disconnected,
}

/// A location accepted as final.
#[derive(Debug, Clone, PartialEq)]
pub struct Finalized {
    pub location: LocationId,
    pub trip_mins: f64,
    pub kind: ArrivalKind,
}

/// Outcome of one run.
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub run_id: RunId,
    pub status: RunStatus,
    /// Finalized locations in finalization order.
    pub finalized: Vec<Finalized>,
}

/// Event output gated on the run still being current.
struct Outbox<'a> {
    token: &'a RunToken,
    events: &'a UnboundedSender<Event>,
}

impl Outbox<'_> {
    fn emit(&self, event: Event) -> Result<(), RunStatus> {
        if !self.token.is_current() {
            return Err(RunStatus::Superseded);
        }
        self.events
            .send(event)
            .map_err(|_| RunStatus::Disconnected)
    }
}

/// A ride expansion that could not complete.
struct BranchFailure {
    kind: ErrorKind,
    route_stop: RouteStop,
    error: Arc<DataError>,
}

impl BranchFailure {
    fn new(kind: ErrorKind, route_stop: &RouteStop) -> impl FnOnce(Arc<DataError>) -> Self {
        let route_stop = route_stop.clone();
        move |error| Self {
            kind,
            route_stop,
            error,
        }
    }
}

/// Reachability search engine.
pub struct Engine<'a, P: DataProvider> {
    cache: &'a ScheduleCache<P>,
    locations: &'a LocationTable,
    config: &'a SearchConfig,
}

impl<'a, P: DataProvider> Engine<'a, P> {
    /// Create a new engine.
    pub fn new(
        cache: &'a ScheduleCache<P>,
        locations: &'a LocationTable,
        config: &'a SearchConfig,
    ) -> Self {
        Self {
            cache,
            locations,
            config,
        }
    }

    /// Run one search to completion or until superseded.
    ///
    /// The request must already be validated.
    pub async fn run(
        &self,
        request: &SearchRequest,
        token: &RunToken,
        events: &UnboundedSender<Event>,
    ) -> RunSummary {
        let outbox = Outbox { token, events };
        let max_threshold = request.max_threshold();
        let batch_size = self.config.batch_size.max(1);

        let mut frontier = FrontierQueue::new();
        let mut state = SearchState::new();
        let mut renderer = BandRenderer::new(request.run_id, &request.thresholds, self.config);
        let mut finalized = Vec::new();

        let origin = Candidate::origin(request.origin);
        state.offer(&origin.location, 0.0);
        frontier.push(0.0, origin);

        debug!(
            run_id = %request.run_id,
            thresholds = ?request.thresholds,
            routes = request.enabled_routes.len(),
            "starting run"
        );

        let summary = |status, finalized| RunSummary {
            run_id: request.run_id,
            status,
            finalized,
        };

        let mut processed = 0usize;
        loop {
            if !token.is_current() {
                debug!(run_id = %request.run_id, "superseded");
                return summary(RunStatus::Superseded, finalized);
            }

            let Some((trip_mins, candidate)) = frontier.pop() else {
                break;
            };

            if state.finalize(&candidate.location) {
                trace!(
                    run_id = %request.run_id,
                    location = %candidate.location,
                    trip_mins,
                    kind = ?candidate.kind,
                    "finalized"
                );
                finalized.push(Finalized {
                    location: candidate.location.clone(),
                    trip_mins,
                    kind: candidate.kind,
                });

                for snapshot in renderer.on_finalized(&candidate) {
                    if let Err(status) = outbox.emit(Event::Snapshot(snapshot)) {
                        return summary(status, finalized);
                    }
                }

                if candidate.kind.is_hub() {
                    self.expand_walk(&candidate, max_threshold, &mut state, &mut frontier);
                }

                if let Some(location) = self.locations.get(&candidate.location) {
                    let outcome = self
                        .expand_rides(location, &candidate, request, &mut state, &mut frontier, &outbox)
                        .await;
                    if let Err(status) = outcome {
                        return summary(status, finalized);
                    }
                }
            }

            processed += 1;
            if processed % batch_size == 0 {
                tokio::task::yield_now().await;
            }
        }

        for snapshot in renderer.finish() {
            if let Err(status) = outbox.emit(Event::Snapshot(snapshot)) {
                return summary(status, finalized);
            }
        }

        debug!(
            run_id = %request.run_id,
            finalized = finalized.len(),
            processed,
            "run completed"
        );
        summary(RunStatus::Completed, finalized)
    }

    /// Queue walks from a hub to every location in reach.
    fn expand_walk(
        &self,
        from: &Candidate,
        max_threshold: f64,
        state: &mut SearchState,
        frontier: &mut FrontierQueue<Candidate>,
    ) {
        let radius_m = self.config.walk_radius_m(max_threshold - from.trip_mins);
        if radius_m <= 0.0 {
            return;
        }

        for nearby in self.locations.within(from.position, radius_m) {
            let target = nearby.location;
            let minutes = self.config.walk_minutes(nearby.meters);
            let trip_mins = from.trip_mins + minutes;
            if !state.offer(&target.id, trip_mins) {
                continue;
            }
            frontier.push(
                trip_mins,
                Candidate {
                    location: target.id.clone(),
                    position: target.position,
                    title: target.title.clone(),
                    trip_mins,
                    trip: from.trip.then_walk(minutes, nearby.meters, &target.title),
                    kind: ArrivalKind::Walk,
                },
            );
        }
    }

    /// Fan out over the location's enabled route-stops, then queue every
    /// improving arrival. Branches run concurrently; a failed branch is
    /// reported and skipped without affecting the others.
    async fn expand_rides(
        &self,
        location: &Location,
        from: &Candidate,
        request: &SearchRequest,
        state: &mut SearchState,
        frontier: &mut FrontierQueue<Candidate>,
        outbox: &Outbox<'_>,
    ) -> Result<(), RunStatus> {
        let max_threshold = request.max_threshold();
        let branches: Vec<_> = {
            let state = &*state;
            let futures = location
                .stops
                .iter()
                .filter(|rs| request.route_enabled(&rs.route))
                .map(|rs| self.ride_branch(rs, from, &request.stats, max_threshold, state));
            join_all(futures).await
        };

        for branch in branches {
            match branch {
                Ok(arrivals) => {
                    for arrival in arrivals {
                        if state.offer(&arrival.location, arrival.trip_mins) {
                            frontier.push(arrival.trip_mins, arrival);
                        }
                    }
                }
                Err(failure) => {
                    warn!(
                        run_id = %request.run_id,
                        route = %failure.route_stop.route,
                        stop = %failure.route_stop.stop,
                        error = %failure.error,
                        "expansion skipped"
                    );
                    outbox.emit(Event::Error {
                        run_id: request.run_id,
                        kind: failure.kind,
                        message: format!(
                            "route {} at stop {}: {}",
                            failure.route_stop.route, failure.route_stop.stop, failure.error
                        ),
                    })?;
                }
            }
        }
        Ok(())
    }

    /// Arrivals reachable by boarding one route at one stop.
    ///
    /// Missing topology or statistics prune the branch silently.
    async fn ride_branch(
        &self,
        route_stop: &RouteStop,
        from: &Candidate,
        key: &StatsKey,
        max_threshold: f64,
        state: &SearchState,
    ) -> Result<Vec<Candidate>, BranchFailure> {
        let Some(route) = self
            .cache
            .route(&route_stop.route)
            .await
            .map_err(BranchFailure::new(ErrorKind::RouteLoad, route_stop))?
        else {
            return Ok(Vec::new());
        };

        let mut arrivals = Vec::new();
        for (direction, idx) in route.boardings(&route_stop.stop) {
            let Some(wait) = self
                .cache
                .wait_time(&route.id, &direction.id, &route_stop.stop, key)
                .await
                .map_err(BranchFailure::new(ErrorKind::WaitTimeLoad, route_stop))?
            else {
                continue;
            };
            let Some(rides) = self
                .cache
                .ride_times(&route.id, &direction.id, &route_stop.stop, key)
                .await
                .map_err(BranchFailure::new(ErrorKind::RideTimeLoad, route_stop))?
            else {
                continue;
            };

            let departure = from.trip_mins + wait;
            for to_stop in direction.stops_after(idx) {
                let Some(&ride) = rides.get(to_stop) else {
                    continue;
                };
                let trip_mins = departure + ride;
                if ride <= 0.0 || trip_mins > max_threshold {
                    continue;
                }
                let Some(info) = route.stop(to_stop) else {
                    continue;
                };
                if !state.improves(&info.location, trip_mins) {
                    continue;
                }

                let wait_leg = TripLeg::Wait {
                    minutes: wait,
                    route: route.id.clone(),
                    direction: direction.id.clone(),
                    stop: route_stop.stop.clone(),
                    description: format!("Wait {:.0} min for {} at {}", wait, route.id, from.title),
                };
                let ride_leg = TripLeg::Ride {
                    minutes: ride,
                    route: route.id.clone(),
                    direction: direction.id.clone(),
                    from_stop: route_stop.stop.clone(),
                    to_stop: to_stop.clone(),
                    description: format!("Ride {} to {}", route.id, info.title),
                };
                arrivals.push(Candidate {
                    location: info.location.clone(),
                    position: info.position,
                    title: info.title.clone(),
                    trip_mins,
                    trip: from.trip.then_ride(wait_leg, ride_leg, &route.id),
                    kind: ArrivalKind::Transit,
                });
            }
        }
        Ok(arrivals)
    }
}

#[cfg(test)]
#[path = "engine_tests.rs"]
mod tests;
