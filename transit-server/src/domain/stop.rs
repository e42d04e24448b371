//! Stop types.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Error returned when parsing an invalid stop id.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid stop id: {reason}")]
pub struct InvalidStopId {
    reason: &'static str,
}

/// Stable integer identifier of a stop.
///
/// Stop ids come straight from the stop repository. Edges may reference
/// ids that have no stop record; those ids are still valid graph nodes.
///
/// # Examples
///
/// ```
/// use transit_server::domain::StopId;
///
/// let id: StopId = "42".parse().unwrap();
/// assert_eq!(id, StopId(42));
/// assert_eq!(id.to_string(), "42");
///
/// assert!("forty-two".parse::<StopId>().is_err());
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StopId(pub i64);

impl StopId {
    /// Returns the raw integer id.
    pub fn get(self) -> i64 {
        self.0
    }
}

impl FromStr for StopId {
    type Err = InvalidStopId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(InvalidStopId {
                reason: "must not be empty",
            });
        }
        trimmed.parse::<i64>().map(StopId).map_err(|_| InvalidStopId {
            reason: "must be an integer",
        })
    }
}

impl fmt::Debug for StopId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "StopId({})", self.0)
    }
}

impl fmt::Display for StopId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A physical boarding point.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Stop {
    /// Unique stop identifier
    pub id: StopId,
    /// Display name
    pub name: String,
    /// Latitude, when the repository has one
    pub lat: Option<f64>,
    /// Longitude, when the repository has one
    pub lng: Option<f64>,
}

impl Stop {
    /// Create a stop without coordinates.
    pub fn new(id: StopId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            lat: None,
            lng: None,
        }
    }

    /// Attach coordinates.
    pub fn with_position(mut self, lat: f64, lng: f64) -> Self {
        self.lat = Some(lat);
        self.lng = Some(lng);
        self
    }
}
