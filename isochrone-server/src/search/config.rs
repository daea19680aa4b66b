//! Search configuration for the reachability engine.

/// Configuration parameters for reachability search.
#[derive(Debug, Clone)]
pub struct SearchConfig {
    /// Walking speed (metres per minute).
    pub walk_meters_per_minute: f64,

    /// Longest walk considered from any hub (metres).
    pub max_walk_radius_m: f64,

    /// Candidates processed between voluntary yields.
    /// Lower values let a superseding request take over sooner.
    pub batch_size: usize,

    /// Vertices per walking circle.
    pub circle_segments: usize,
}

impl SearchConfig {
    pub fn with_walk_speed(mut self, meters_per_minute: f64) -> Self {
        self.walk_meters_per_minute = meters_per_minute;
        self
    }

    pub fn with_max_walk_radius(mut self, meters: f64) -> Self {
        self.max_walk_radius_m = meters;
        self
    }

    pub fn with_batch_size(mut self, n: usize) -> Self {
        self.batch_size = n;
        self
    }

    pub fn with_circle_segments(mut self, n: usize) -> Self {
        self.circle_segments = n;
        self
    }

    /// Radius walkable within `budget_mins`, capped at the max walk radius.
    ///
    /// Zero or negative means no walking is possible.
    pub fn walk_radius_m(&self, budget_mins: f64) -> f64 {
        (self.walk_meters_per_minute * budget_mins).min(self.max_walk_radius_m)
    }

    /// Minutes needed to walk `meters`.
    pub fn walk_minutes(&self, meters: f64) -> f64 {
        meters / self.walk_meters_per_minute
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            walk_meters_per_minute: 80.0, // ~4.8 km/h
            max_walk_radius_m: 1800.0,
            batch_size: 250,
            circle_segments: 32,
        }
    }
}
