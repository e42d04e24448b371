//! Route identifier and catalogue types.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::StopId;

/// Error returned when constructing an invalid route id.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid route id: {reason}")]
pub struct InvalidRouteId {
    reason: &'static str,
}

/// Identifier of a physical bus line.
///
/// Many edges share one route id, and the search clones ids into every
/// label it creates, so the string is reference counted.
///
/// # Examples
///
/// ```
/// use transit_server::domain::RouteId;
///
/// let r = RouteId::new("500D").unwrap();
/// assert_eq!(r.as_str(), "500D");
///
/// // Surrounding whitespace is trimmed, blank ids are rejected
/// assert_eq!(RouteId::new(" 335E ").unwrap().as_str(), "335E");
/// assert!(RouteId::new("  ").is_err());
/// ```
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RouteId(Arc<str>);

impl RouteId {
    /// Create a route id, trimming surrounding whitespace.
    pub fn new(s: impl AsRef<str>) -> Result<Self, InvalidRouteId> {
        let trimmed = s.as_ref().trim();
        if trimmed.is_empty() {
            return Err(InvalidRouteId {
                reason: "route id cannot be empty",
            });
        }
        Ok(RouteId(Arc::from(trimmed)))
    }

    /// Returns the route id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for RouteId {
    type Error = InvalidRouteId;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        RouteId::new(value)
    }
}

impl From<RouteId> for String {
    fn from(value: RouteId) -> Self {
        value.0.to_string()
    }
}

impl fmt::Debug for RouteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RouteId({})", self.as_str())
    }
}

impl fmt::Display for RouteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Catalogue entry for a route, used for display names.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouteInfo {
    pub id: RouteId,
    pub name: String,
    /// Stops the route serves, in running order.
    pub stops: Vec<StopId>,
    pub total_distance: Option<f64>,
}

impl RouteInfo {
    /// Create a route entry with no stop list.
    pub fn new(id: RouteId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            stops: Vec::new(),
            total_distance: None,
        }
    }
}
