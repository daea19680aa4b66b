//! Threshold snapshots.
//!
//! The renderer watches locations being finalized in non-decreasing time
//! order. When a finalized time passes the next unshown threshold, every hub
//! seen so far is already known, so that threshold's coverage can be drawn.

use std::collections::VecDeque;

use geo::{BooleanOps, MultiPolygon};
use serde::{Serialize, Serializer};

use crate::domain::{LatLon, LocationId, RunId, TripLeg};
use crate::search::{Candidate, SearchConfig};

use super::circle::circle;

/// A hub's walking circle at one threshold.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HubCircle {
    pub location: LocationId,
    pub title: String,
    pub position: LatLon,
    pub radius_m: f64,
    /// Elapsed minutes at which the hub was reached.
    pub trip_mins: f64,
    /// Route path taken, `/`-joined.
    pub routes: String,
    pub legs: Vec<TripLeg>,
}

/// One emitted isochrone band.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ThresholdSnapshot {
    pub threshold: f64,
    pub run_id: RunId,
    pub hub_circles: Vec<HubCircle>,
    /// Area reachable at this threshold but not at the previous one.
    #[serde(serialize_with = "as_geojson")]
    pub incremental_area: MultiPolygon<f64>,
}

fn as_geojson<S: Serializer>(area: &MultiPolygon<f64>, s: S) -> Result<S::Ok, S::Error> {
    geojson::Geometry::new(geojson::Value::from(area)).serialize(s)
}

/// Builds threshold snapshots from finalize notifications.
pub struct BandRenderer {
    run_id: RunId,
    config: SearchConfig,
    pending: VecDeque<f64>,
    hubs: Vec<Candidate>,
    coverage: MultiPolygon<f64>,
}

impl BandRenderer {
    /// `thresholds` must be strictly ascending.
    pub fn new(run_id: RunId, thresholds: &[f64], config: &SearchConfig) -> Self {
        Self {
            run_id,
            config: config.clone(),
            pending: thresholds.iter().copied().collect(),
            hubs: Vec::new(),
            coverage: MultiPolygon::new(vec![]),
        }
    }

    /// Record a finalized location and emit every threshold it passes.
    pub fn on_finalized(&mut self, candidate: &Candidate) -> Vec<ThresholdSnapshot> {
        let mut out = Vec::new();
        while let Some(&threshold) = self.pending.front() {
            if threshold > candidate.trip_mins {
                break;
            }
            self.pending.pop_front();
            out.push(self.snapshot(threshold));
        }

        // A hub reached at `t` has no circle for thresholds <= `t`, so it is
        // added after the thresholds it passed have been drawn.
        if candidate.kind.is_hub() {
            self.hubs.push(candidate.clone());
        }
        out
    }

    /// Emit every threshold not yet shown.
    pub fn finish(&mut self) -> Vec<ThresholdSnapshot> {
        let mut out = Vec::with_capacity(self.pending.len());
        while let Some(threshold) = self.pending.pop_front() {
            out.push(self.snapshot(threshold));
        }
        out
    }

    /// Cumulative area covered by the last emitted threshold.
    pub fn coverage(&self) -> &MultiPolygon<f64> {
        &self.coverage
    }

    pub fn hub_count(&self) -> usize {
        self.hubs.len()
    }

    fn snapshot(&mut self, threshold: f64) -> ThresholdSnapshot {
        let mut hub_circles = Vec::new();
        let mut union = MultiPolygon::new(vec![]);

        for hub in &self.hubs {
            let radius_m = self.config.walk_radius_m(threshold - hub.trip_mins);
            if radius_m <= 0.0 {
                continue;
            }
            let disc = MultiPolygon::new(vec![circle(
                hub.position,
                radius_m,
                self.config.circle_segments,
            )]);
            union = union.union(&disc);
            hub_circles.push(HubCircle {
                location: hub.location.clone(),
                title: hub.title.clone(),
                position: hub.position,
                radius_m,
                trip_mins: hub.trip_mins,
                routes: hub.trip.routes.clone(),
                legs: hub.trip.legs.clone(),
            });
        }

        let incremental_area = union.difference(&self.coverage);
        self.coverage = union;

        ThresholdSnapshot {
            threshold,
            run_id: self.run_id,
            hub_circles,
            incremental_area,
        }
    }
}
