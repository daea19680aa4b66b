//! Reachability search.
//!
//! This module implements the label-setting expansion that answers:
//! "which locations can I reach from here, and how soon?"
//!
//! The search pops the least-time candidate from the frontier, finalizes its
//! location and expands it by walking or riding. Finalized locations feed the
//! band renderer, which emits one snapshot per requested threshold.

mod candidate;
mod config;
mod engine;
mod frontier;
mod request;
mod state;

pub use candidate::Candidate;
pub use config::SearchConfig;
pub use engine::{Engine, Finalized, RunStatus, RunSummary};
pub use frontier::FrontierQueue;
pub use request::{SearchError, SearchRequest};
pub use state::SearchState;
