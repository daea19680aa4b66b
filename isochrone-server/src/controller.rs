//! Run controller: accepts search requests and supersedes stale runs.
//!
//! The controller holds the id of the most recently accepted run in a watch
//! channel. Each run gets a [`RunToken`] subscribed to it and checks the token
//! before every step and every emitted event, so a newer request silently
//! stops the older run.
//!
//! Events for one run are delivered on that run's own channel, in order:
//! `Accepted`, then snapshots (ascending threshold) interleaved with advisory
//! errors. The channel closes when the run ends.

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::mpsc::{self, UnboundedReceiver};
use tokio::sync::{OnceCell, watch};
use tracing::{debug, info, warn};

use crate::cache::{CacheConfig, ScheduleCache};
use crate::data::{DataError, DataProvider};
use crate::domain::RunId;
use crate::render::ThresholdSnapshot;
use crate::search::{Engine, SearchConfig, SearchError, SearchRequest};
use crate::spatial::LocationTable;

/// Category of an advisory error event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ErrorKind {
    LocationsLoad,
    RouteLoad,
    WaitTimeLoad,
    RideTimeLoad,
}

/// Event emitted to the host.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    /// The request was accepted and a run started.
    Accepted { run_id: RunId },

    /// A threshold was crossed.
    Snapshot(ThresholdSnapshot),

    /// Something could not be loaded. The run continues unless the location
    /// table itself failed.
    Error {
        run_id: RunId,
        kind: ErrorKind,
        message: String,
    },
}

impl Event {
    /// Event name, matching the `type` tag.
    pub fn name(&self) -> &'static str {
        match self {
            Event::Accepted { .. } => "accepted",
            Event::Snapshot(_) => "snapshot",
            Event::Error { .. } => "error",
        }
    }

    pub fn run_id(&self) -> RunId {
        match self {
            Event::Accepted { run_id } | Event::Error { run_id, .. } => *run_id,
            Event::Snapshot(s) => s.run_id,
        }
    }
}

/// Cancellation token for one run.
#[derive(Debug, Clone)]
pub struct RunToken {
    run_id: RunId,
    latest: watch::Receiver<RunId>,
}

impl RunToken {
    pub fn new(run_id: RunId, latest: watch::Receiver<RunId>) -> Self {
        Self { run_id, latest }
    }

    /// A token that nothing can supersede.
    pub fn standalone(run_id: RunId) -> Self {
        let (_tx, latest) = watch::channel(run_id);
        Self { run_id, latest }
    }

    pub fn run_id(&self) -> RunId {
        self.run_id
    }

    /// Whether this run is still the latest one.
    pub fn is_current(&self) -> bool {
        *self.latest.borrow() == self.run_id
    }
}

/// Error rejecting a request before a run exists.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ControllerError {
    /// The request is malformed
    #[error(transparent)]
    Invalid(#[from] SearchError),

    /// A run with this id or a newer one was already accepted
    #[error("run {run_id} is not newer than run {latest}")]
    StaleRun { run_id: RunId, latest: RunId },
}

/// Owns the shared data and starts runs.
pub struct RunController<P> {
    cache: Arc<ScheduleCache<P>>,
    locations: Arc<OnceCell<Arc<LocationTable>>>,
    config: Arc<SearchConfig>,
    latest: watch::Sender<RunId>,
}

impl<P: DataProvider + 'static> RunController<P> {
    /// Create a new controller.
    pub fn new(provider: P, cache_config: &CacheConfig, config: SearchConfig) -> Self {
        let (latest, _) = watch::channel(RunId(0));
        Self {
            cache: Arc::new(ScheduleCache::new(provider, cache_config)),
            locations: Arc::new(OnceCell::new()),
            config: Arc::new(config),
            latest,
        }
    }

    /// The location table, loading it on first use.
    ///
    /// A failed load leaves the table unloaded; the next call retries.
    pub async fn locations(&self) -> Result<Arc<LocationTable>, DataError> {
        load_locations(&self.locations, &self.cache).await
    }

    /// Number of loaded locations, if the table is loaded.
    pub fn locations_loaded(&self) -> Option<usize> {
        self.locations.get().map(|t| t.len())
    }

    pub fn cache(&self) -> &ScheduleCache<P> {
        &self.cache
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Id of the most recently accepted run (0 before any).
    pub fn latest_run(&self) -> RunId {
        *self.latest.borrow()
    }

    /// Validate a request, supersede any older run and start this one.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn submit(&self, request: SearchRequest) -> Result<UnboundedReceiver<Event>, ControllerError> {
        request.validate()?;

        let run_id = request.run_id;
        let accepted = self.latest.send_if_modified(|latest| {
            if run_id > *latest {
                *latest = run_id;
                true
            } else {
                false
            }
        });
        if !accepted {
            return Err(ControllerError::StaleRun {
                run_id,
                latest: self.latest_run(),
            });
        }

        let token = RunToken::new(run_id, self.latest.subscribe());
        let (tx, rx) = mpsc::unbounded_channel();
        // The receiver is still held here, so this cannot fail.
        let _ = tx.send(Event::Accepted { run_id });
        info!(%run_id, lat = request.origin.lat(), lon = request.origin.lon(), "run accepted");

        let cache = Arc::clone(&self.cache);
        let locations = Arc::clone(&self.locations);
        let config = Arc::clone(&self.config);

        tokio::spawn(async move {
            let table = match load_locations(&locations, &cache).await {
                Ok(table) => table,
                Err(e) => {
                    warn!(%run_id, error = %e, "failed to load locations");
                    if token.is_current() {
                        let _ = tx.send(Event::Error {
                            run_id,
                            kind: ErrorKind::LocationsLoad,
                            message: e.to_string(),
                        });
                    }
                    return;
                }
            };

            let engine = Engine::new(&cache, &table, &config);
            let summary = engine.run(&request, &token, &tx).await;
            debug!(
                %run_id,
                status = ?summary.status,
                finalized = summary.finalized.len(),
                "run finished"
            );
        });

        Ok(rx)
    }
}

async fn load_locations<P: DataProvider>(
    cell: &OnceCell<Arc<LocationTable>>,
    cache: &ScheduleCache<P>,
) -> Result<Arc<LocationTable>, DataError> {
    cell.get_or_try_init(|| async {
        let locations = cache.provider().fetch_locations().await?;
        info!(count = locations.len(), "location table loaded");
        Ok::<_, DataError>(Arc::new(LocationTable::new(locations)))
    })
    .await
    .cloned()
}
