//! Domain error types.
//!
//! These errors represent validation failures in the domain layer. They are
//! distinct from data collaborator (I/O) errors.

/// Domain-level errors for validation and data consistency.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DomainError {
    /// An identifier was empty
    #[error("{0} id must not be empty")]
    EmptyId(&'static str),

    /// Latitude or longitude out of range, or not finite
    #[error("invalid coordinate: lat {lat}, lon {lon}")]
    InvalidCoordinate { lat: f64, lon: f64 },

    /// Time bucket is not `HH:MM-HH:MM` with start before end
    #[error("invalid time bucket {0:?}: expected HH:MM-HH:MM")]
    InvalidTimeBucket(String),

    /// Unknown statistic selector
    #[error("unknown statistic {0:?}: expected median, mean, p10 or p90")]
    UnknownStat(String),

    /// Date is not `YYYY-MM-DD`
    #[error("invalid date {0:?}: expected YYYY-MM-DD")]
    InvalidDate(String),
}
