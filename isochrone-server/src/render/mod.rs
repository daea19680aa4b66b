//! Isochrone band rendering.
//!
//! Turns finalized locations into walking circles and, as each requested
//! threshold is crossed, into the area newly reachable since the previous one.

mod band;
mod circle;

pub use band::{BandRenderer, HubCircle, ThresholdSnapshot};
pub use circle::circle;
