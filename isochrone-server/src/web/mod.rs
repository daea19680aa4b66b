//! Web layer for the isochrone server.
//!
//! Accepts search requests over HTTP and streams each run's events back as
//! Server-Sent Events.

mod dto;
mod routes;
mod state;

pub use dto::*;
pub use routes::{AppError, create_router};
pub use state::AppState;
