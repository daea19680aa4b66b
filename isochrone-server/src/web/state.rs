//! Application state for the web layer.

use std::sync::Arc;

use crate::controller::RunController;
use crate::data::DataBackend;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Run controller owning the location table and schedule cache
    pub controller: Arc<RunController<DataBackend>>,
}

impl AppState {
    /// Create a new app state.
    pub fn new(controller: RunController<DataBackend>) -> Self {
        Self {
            controller: Arc::new(controller),
        }
    }
}
