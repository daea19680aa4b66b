//! Data collaborators.
//!
//! The engine reads four kinds of published data:
//! - the master location list (fetched once per process)
//! - route topology, per route
//! - wait-time tables, per (date, time bucket, statistic)
//! - ride-time tables, per (date, time bucket, statistic)
//!
//! Missing data is `Ok(None)`; only transport or decoding failures are errors.

mod client;
mod convert;
mod error;
mod mock;
mod types;

use std::future::Future;

use crate::domain::{Location, RideTimeTable, RouteId, RouteInfo, StatsKey, WaitTimeTable};

pub use client::{DataClient, DataClientConfig};
pub use convert::ConversionError;
pub use error::DataError;
pub use mock::MockDataClient;
pub use types::{
    DirectionDto, LocationDto, LocationStopDto, RideTimesDto, RouteDto, RouteStopDto, WaitTimesDto,
};

/// Source of reference data and travel-time statistics.
pub trait DataProvider: Send + Sync {
    /// Fetch the master location list.
    fn fetch_locations(&self) -> impl Future<Output = Result<Vec<Location>, DataError>> + Send;

    /// Fetch a route's topology. `None` if the route is unknown.
    fn fetch_route(
        &self,
        route: &RouteId,
    ) -> impl Future<Output = Result<Option<RouteInfo>, DataError>> + Send;

    /// Fetch the wait-time table for a statistics key.
    fn fetch_wait_times(
        &self,
        key: &StatsKey,
    ) -> impl Future<Output = Result<Option<WaitTimeTable>, DataError>> + Send;

    /// Fetch the ride-time table for a statistics key.
    fn fetch_ride_times(
        &self,
        key: &StatsKey,
    ) -> impl Future<Output = Result<Option<RideTimeTable>, DataError>> + Send;
}

/// The data source chosen at startup.
#[derive(Debug, Clone)]
pub enum DataBackend {
    Http(DataClient),
    Mock(MockDataClient),
}

impl DataProvider for DataBackend {
    async fn fetch_locations(&self) -> Result<Vec<Location>, DataError> {
        match self {
            DataBackend::Http(c) => c.fetch_locations().await,
            DataBackend::Mock(c) => c.fetch_locations().await,
        }
    }

    async fn fetch_route(&self, route: &RouteId) -> Result<Option<RouteInfo>, DataError> {
        match self {
            DataBackend::Http(c) => c.fetch_route(route).await,
            DataBackend::Mock(c) => c.fetch_route(route).await,
        }
    }

    async fn fetch_wait_times(&self, key: &StatsKey) -> Result<Option<WaitTimeTable>, DataError> {
        match self {
            DataBackend::Http(c) => c.fetch_wait_times(key).await,
            DataBackend::Mock(c) => c.fetch_wait_times(key).await,
        }
    }

    async fn fetch_ride_times(&self, key: &StatsKey) -> Result<Option<RideTimeTable>, DataError> {
        match self {
            DataBackend::Http(c) => c.fetch_ride_times(key).await,
            DataBackend::Mock(c) => c.fetch_ride_times(key).await,
        }
    }
}
