//! Identifier types.
//!
//! Locations, routes, directions and stops are identified by opaque strings
//! coming from the data collaborators. Wrapping each in its own newtype keeps
//! a stop id from being passed where a location id is expected.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::DomainError;

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident, $what:literal) => {
        $(#[$meta])*
        #[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Parse an identifier. Empty or whitespace-only input is rejected.
            pub fn parse(s: &str) -> Result<Self, DomainError> {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    return Err(DomainError::EmptyId($what));
                }
                Ok(Self(trimmed.to_string()))
            }

            /// Returns the identifier as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

string_id!(
    /// Identifier of a physical location in the master location list.
    LocationId,
    "location"
);
string_id!(
    /// Identifier of a transit route (e.g. `"14"`, `"N"`).
    RouteId,
    "route"
);
string_id!(
    /// Identifier of one direction of a route (e.g. `"0"`, `"inbound"`).
    DirectionId,
    "direction"
);
string_id!(
    /// Route-local stop identifier.
    StopId,
    "stop"
);

/// Reserved id of the synthetic location standing for the search origin.
const ORIGIN_ID: &str = "@origin";

impl LocationId {
    /// The id used for the initial point of every search.
    ///
    /// Data locations may not use it; conversion rejects them.
    pub fn origin() -> Self {
        Self(ORIGIN_ID.to_string())
    }

    /// Returns true if this is the synthetic origin id.
    pub fn is_origin(&self) -> bool {
        self.0 == ORIGIN_ID
    }
}

/// Host-chosen identifier of one search run.
///
/// Run ids must increase across requests from one host; a newer id
/// supersedes every older run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RunId(pub u64);

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
