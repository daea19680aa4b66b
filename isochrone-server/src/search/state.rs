//! Per-run search state: best known times and finalized locations.

use std::collections::{HashMap, HashSet};

use crate::domain::LocationId;

#[derive(Debug, Default)]
pub struct SearchState {
    best_known: HashMap<LocationId, f64>,
    finalized: HashSet<LocationId>,
}

impl SearchState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether reaching `location` at `trip_mins` beats everything seen so far.
    pub fn improves(&self, location: &LocationId, trip_mins: f64) -> bool {
        !self.finalized.contains(location)
            && self
                .best_known
                .get(location)
                .is_none_or(|best| trip_mins < *best)
    }

    /// Record `trip_mins` as the best known time if it is strictly better.
    ///
    /// Returns `false` when the offer is dominated and should not be queued.
    pub fn offer(&mut self, location: &LocationId, trip_mins: f64) -> bool {
        if !self.improves(location, trip_mins) {
            return false;
        }
        self.best_known.insert(location.clone(), trip_mins);
        true
    }

    /// Mark `location` final. Returns `false` if it already was.
    pub fn finalize(&mut self, location: &LocationId) -> bool {
        self.finalized.insert(location.clone())
    }

    pub fn is_finalized(&self, location: &LocationId) -> bool {
        self.finalized.contains(location)
    }

    pub fn best_known(&self, location: &LocationId) -> Option<f64> {
        self.best_known.get(location).copied()
    }

    pub fn finalized_count(&self) -> usize {
        self.finalized.len()
    }
}
