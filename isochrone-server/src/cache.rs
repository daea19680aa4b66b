//! Caching layer for route topology and statistics tables.
//!
//! Published data does not change while the process runs, so entries never
//! expire. Absence is cached too: a route with no published topology is
//! remembered as `None` and not requested again. Failed fetches are not
//! cached, so a later search retries them.
//!
//! Concurrent requests for the same key share a single fetch.

use std::sync::Arc;

use moka::future::Cache as MokaCache;
use serde::Serialize;

use crate::data::{DataError, DataProvider};
use crate::domain::{
    DirectionId, RideTimeTable, RideTimes, RouteId, RouteInfo, StatsKey, StopId, WaitTimeTable,
};

/// Configuration for the cache.
#[derive(Debug, Clone, Default)]
pub struct CacheConfig {
    /// Maximum entries per table kind. `None` means unbounded.
    pub max_capacity: Option<u64>,
}

impl CacheConfig {
    pub fn with_max_capacity(mut self, n: u64) -> Self {
        self.max_capacity = Some(n);
        self
    }
}

/// Entry counts, for monitoring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub routes: u64,
    pub wait_tables: u64,
    pub ride_tables: u64,
}

fn build<K, V>(config: &CacheConfig) -> MokaCache<K, V>
where
    K: std::hash::Hash + Eq + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    let builder = MokaCache::builder();
    match config.max_capacity {
        Some(n) => builder.max_capacity(n).build(),
        None => builder.build(),
    }
}

/// Data provider with caching.
///
/// Wraps a `DataProvider` and memoizes route topology and statistics tables.
pub struct ScheduleCache<P> {
    provider: P,
    routes: MokaCache<RouteId, Option<Arc<RouteInfo>>>,
    wait_times: MokaCache<StatsKey, Option<Arc<WaitTimeTable>>>,
    ride_times: MokaCache<StatsKey, Option<Arc<RideTimeTable>>>,
}

impl<P: DataProvider> ScheduleCache<P> {
    /// Create a new cached provider.
    pub fn new(provider: P, config: &CacheConfig) -> Self {
        Self {
            provider,
            routes: build(config),
            wait_times: build(config),
            ride_times: build(config),
        }
    }

    /// Route topology, fetched at most once per route.
    pub async fn route(&self, route: &RouteId) -> Result<Option<Arc<RouteInfo>>, Arc<DataError>> {
        self.routes
            .try_get_with(route.clone(), async {
                Ok::<_, DataError>(self.provider.fetch_route(route).await?.map(Arc::new))
            })
            .await
    }

    /// The wait-time table for a statistics key.
    pub async fn wait_table(
        &self,
        key: &StatsKey,
    ) -> Result<Option<Arc<WaitTimeTable>>, Arc<DataError>> {
        self.wait_times
            .try_get_with(key.clone(), async {
                Ok::<_, DataError>(self.provider.fetch_wait_times(key).await?.map(Arc::new))
            })
            .await
    }

    /// The ride-time table for a statistics key.
    pub async fn ride_table(
        &self,
        key: &StatsKey,
    ) -> Result<Option<Arc<RideTimeTable>>, Arc<DataError>> {
        self.ride_times
            .try_get_with(key.clone(), async {
                Ok::<_, DataError>(self.provider.fetch_ride_times(key).await?.map(Arc::new))
            })
            .await
    }

    /// Expected wait in minutes at a stop. `None` if no statistic exists.
    pub async fn wait_time(
        &self,
        route: &RouteId,
        direction: &DirectionId,
        stop: &StopId,
        key: &StatsKey,
    ) -> Result<Option<f64>, Arc<DataError>> {
        Ok(self
            .wait_table(key)
            .await?
            .and_then(|t| t.get(route, direction, stop)))
    }

    /// Ride minutes from a stop to each later stop it has statistics for.
    pub async fn ride_times(
        &self,
        route: &RouteId,
        direction: &DirectionId,
        from: &StopId,
        key: &StatsKey,
    ) -> Result<Option<RideTimes>, Arc<DataError>> {
        Ok(self
            .ride_table(key)
            .await?
            .and_then(|t| t.from_stop(route, direction, from)))
    }

    /// Access the underlying provider for fetches that bypass the cache.
    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Approximate entry counts; moka updates them lazily.
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            routes: self.routes.entry_count(),
            wait_tables: self.wait_times.entry_count(),
            ride_tables: self.ride_times.entry_count(),
        }
    }
}
