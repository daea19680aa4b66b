//! Historical wait-time and ride-time statistics.
//!
//! Statistics are published per (date, time-of-day bucket, statistic) as whole
//! tables covering every route. A `StatsKey` names one such table.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use chrono::{NaiveDate, NaiveTime};

use super::{DirectionId, DomainError, RouteId, StopId};

/// Which statistic to read from the historical tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum StatKind {
    #[default]
    Median,
    Mean,
    P10,
    P90,
}

impl StatKind {
    pub fn parse(s: &str) -> Result<Self, DomainError> {
        match s.trim().to_ascii_lowercase().as_str() {
            "median" => Ok(StatKind::Median),
            "mean" => Ok(StatKind::Mean),
            "p10" => Ok(StatKind::P10),
            "p90" => Ok(StatKind::P90),
            _ => Err(DomainError::UnknownStat(s.to_string())),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            StatKind::Median => "median",
            StatKind::Mean => "mean",
            StatKind::P10 => "p10",
            StatKind::P90 => "p90",
        }
    }
}

impl fmt::Display for StatKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A time-of-day range selecting a statistics bucket, e.g. `07:00-10:00`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimeBucket {
    start: NaiveTime,
    end: NaiveTime,
}

impl TimeBucket {
    /// Parse `HH:MM-HH:MM`. The start must be before the end.
    pub fn parse(s: &str) -> Result<Self, DomainError> {
        let invalid = || DomainError::InvalidTimeBucket(s.to_string());
        let (start, end) = s.trim().split_once('-').ok_or_else(invalid)?;
        let start = NaiveTime::parse_from_str(start.trim(), "%H:%M").map_err(|_| invalid())?;
        let end = NaiveTime::parse_from_str(end.trim(), "%H:%M").map_err(|_| invalid())?;
        if start >= end {
            return Err(invalid());
        }
        Ok(Self { start, end })
    }

    /// The bucket with colons removed, as used in table file names (`0700-1000`).
    pub fn file_token(&self) -> String {
        format!("{}-{}", self.start.format("%H%M"), self.end.format("%H%M"))
    }
}

impl fmt::Display for TimeBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start.format("%H:%M"), self.end.format("%H:%M"))
    }
}

/// Parse a `YYYY-MM-DD` date.
pub fn parse_date(s: &str) -> Result<NaiveDate, DomainError> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .map_err(|_| DomainError::InvalidDate(s.to_string()))
}

/// Names one published statistics table.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StatsKey {
    pub date: NaiveDate,
    /// `None` selects the all-day table.
    pub time: Option<TimeBucket>,
    pub stat: StatKind,
}

impl StatsKey {
    pub fn new(date: NaiveDate, time: Option<TimeBucket>, stat: StatKind) -> Self {
        Self { date, time, stat }
    }

    /// `YYYY-MM-DD`.
    pub fn date_str(&self) -> String {
        self.date.format("%Y-%m-%d").to_string()
    }

    /// File stem of the table within its date directory, e.g. `median_0700-1000`.
    pub fn file_stem(&self) -> String {
        match &self.time {
            Some(bucket) => format!("{}_{}", self.stat, bucket.file_token()),
            None => self.stat.to_string(),
        }
    }
}

/// Minutes from one stop to each later stop on the same direction.
pub type RideTimes = Arc<HashMap<StopId, f64>>;

/// Expected wait (minutes) for boarding at each (route, direction, stop).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WaitTimeTable {
    routes: HashMap<RouteId, HashMap<DirectionId, HashMap<StopId, f64>>>,
}

impl WaitTimeTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, route: RouteId, direction: DirectionId, stop: StopId, minutes: f64) {
        self.routes
            .entry(route)
            .or_default()
            .entry(direction)
            .or_default()
            .insert(stop, minutes);
    }

    pub fn get(&self, route: &RouteId, direction: &DirectionId, stop: &StopId) -> Option<f64> {
        self.routes.get(route)?.get(direction)?.get(stop).copied()
    }

    /// Number of (route, direction, stop) entries.
    pub fn len(&self) -> usize {
        self.routes
            .values()
            .flat_map(|dirs| dirs.values())
            .map(|stops| stops.len())
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Ride minutes between stop pairs for each (route, direction).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RideTimeTable {
    routes: HashMap<RouteId, HashMap<DirectionId, HashMap<StopId, RideTimes>>>,
}

impl RideTimeTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(
        &mut self,
        route: RouteId,
        direction: DirectionId,
        from: StopId,
        times: HashMap<StopId, f64>,
    ) {
        self.routes
            .entry(route)
            .or_default()
            .entry(direction)
            .or_default()
            .insert(from, Arc::new(times));
    }

    /// Ride times from `from` to every later stop with recorded data.
    pub fn from_stop(
        &self,
        route: &RouteId,
        direction: &DirectionId,
        from: &StopId,
    ) -> Option<RideTimes> {
        self.routes.get(route)?.get(direction)?.get(from).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_stats() {
        assert_eq!(StatKind::parse("median").unwrap(), StatKind::Median);
        assert_eq!(StatKind::parse(" P90 ").unwrap(), StatKind::P90);
        assert!(StatKind::parse("p50").is_err());
        assert_eq!(StatKind::default(), StatKind::Median);
    }

    #[test]
    fn parse_time_bucket() {
        let b = TimeBucket::parse("07:00-10:00").unwrap();
        assert_eq!(b.to_string(), "07:00-10:00");
        assert_eq!(b.file_token(), "0700-1000");
    }

    #[test]
    fn reject_bad_time_buckets() {
        assert!(TimeBucket::parse("07:00").is_err());
        assert!(TimeBucket::parse("10:00-07:00").is_err());
        assert!(TimeBucket::parse("07:00-07:00").is_err());
        assert!(TimeBucket::parse("7am-9am").is_err());
        assert!(TimeBucket::parse("25:00-26:00").is_err());
    }

    #[test]
    fn parse_dates() {
        let d = parse_date("2019-12-04").unwrap();
        assert_eq!(d, NaiveDate::from_ymd_opt(2019, 12, 4).unwrap());
        assert!(parse_date("04/12/2019").is_err());
        assert!(parse_date("2019-02-30").is_err());
    }

    #[test]
    fn file_stems() {
        let date = parse_date("2019-12-04").unwrap();
        let all_day = StatsKey::new(date, None, StatKind::Median);
        assert_eq!(all_day.date_str(), "2019-12-04");
        assert_eq!(all_day.file_stem(), "median");

        let bucket = TimeBucket::parse("16:00-19:00").unwrap();
        let peak = StatsKey::new(date, Some(bucket), StatKind::P90);
        assert_eq!(peak.file_stem(), "p90_1600-1900");
    }

    #[test]
    fn wait_table_lookup() {
        let mut table = WaitTimeTable::new();
        let route = RouteId::parse("14").unwrap();
        let dir = DirectionId::parse("0").unwrap();
        let stop = StopId::parse("s1").unwrap();
        table.insert(route.clone(), dir.clone(), stop.clone(), 4.5);

        assert_eq!(table.get(&route, &dir, &stop), Some(4.5));
        assert_eq!(table.len(), 1);
        let other = StopId::parse("s2").unwrap();
        assert_eq!(table.get(&route, &dir, &other), None);
    }

    #[test]
    fn ride_table_lookup() {
        let mut table = RideTimeTable::new();
        let route = RouteId::parse("14").unwrap();
        let dir = DirectionId::parse("0").unwrap();
        let a = StopId::parse("a").unwrap();
        let b = StopId::parse("b").unwrap();
        table.insert(
            route.clone(),
            dir.clone(),
            a.clone(),
            HashMap::from([(b.clone(), 6.0)]),
        );

        let rides = table.from_stop(&route, &dir, &a).unwrap();
        assert_eq!(rides.get(&b), Some(&6.0));
        assert!(table.from_stop(&route, &dir, &b).is_none());
    }
}
