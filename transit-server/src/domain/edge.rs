//! Directed stop-to-stop connections.

use serde::Serialize;

use super::{RouteId, StopId};

/// Cost used in place of a missing, non-positive or non-finite distance.
pub const DEFAULT_DISTANCE: f64 = 1.0;

/// Normalise a raw distance so it is always a usable positive cost.
///
/// ```
/// use transit_server::domain::normalize_distance;
///
/// assert_eq!(normalize_distance(Some(2.5)), 2.5);
/// assert_eq!(normalize_distance(Some(0.0)), 1.0);
/// assert_eq!(normalize_distance(Some(-4.0)), 1.0);
/// assert_eq!(normalize_distance(None), 1.0);
/// ```
pub fn normalize_distance(raw: Option<f64>) -> f64 {
    match raw {
        Some(d) if d > 0.0 && d.is_finite() => d,
        _ => DEFAULT_DISTANCE,
    }
}

/// A single route travelling directly from one stop to another.
///
/// Edges are directed. The distance is normalised at construction, so
/// every `Edge` has a strictly positive, finite cost.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Edge {
    pub from: StopId,
    pub to: StopId,
    pub route: RouteId,
    distance: f64,
}

impl Edge {
    /// Create an edge from a possibly missing raw distance.
    pub fn new(from: StopId, to: StopId, route: RouteId, distance: Option<f64>) -> Self {
        Self {
            from,
            to,
            route,
            distance: normalize_distance(distance),
        }
    }

    /// The normalised distance of this edge.
    pub fn distance(&self) -> f64 {
        self.distance
    }

    /// Returns true if the edge starts or ends at `stop`.
    pub fn touches(&self, stop: StopId) -> bool {
        self.from == stop || self.to == stop
    }
}
