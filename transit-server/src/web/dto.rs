//! Data transfer objects for web requests and responses.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{Edge, RouteId, RouteInfo, Stop};
use crate::network::NetworkSnapshot;
use crate::planner::LookupResults;

/// Query string for route planning.
///
/// Ids are optional strings so missing or malformed values get a proper
/// `INVALID_STOP` body rather than an extractor rejection.
#[derive(Debug, Deserialize)]
pub struct RouteQuery {
    pub from: Option<String>,
    pub to: Option<String>,
}

/// Query string for stop search.
#[derive(Debug, Deserialize)]
pub struct StopSearchQuery {
    /// Name fragment. Missing means no matches.
    pub q: Option<String>,

    /// Maximum number of results (clamped server-side)
    pub limit: Option<usize>,
}

/// A stop in search results.
#[derive(Debug, Serialize)]
pub struct StopResult {
    pub stop_id: i64,
    pub stop_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lat: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lng: Option<f64>,
}

impl From<Stop> for StopResult {
    fn from(stop: Stop) -> Self {
        Self {
            stop_id: stop.id.get(),
            stop_name: stop.name,
            lat: stop.lat,
            lng: stop.lng,
        }
    }
}

/// Query string for the network lookup.
#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    /// `stops`, `edges` or `route`; defaults to `stops`
    #[serde(rename = "type")]
    pub kind: Option<String>,

    pub query: Option<String>,
}

/// An edge in lookup results.
#[derive(Debug, Serialize)]
pub struct EdgeResult {
    pub from_stop: i64,
    pub to_stop: i64,
    pub route_id: RouteId,
    pub distance: f64,
}

impl From<Edge> for EdgeResult {
    fn from(edge: Edge) -> Self {
        Self {
            from_stop: edge.from.get(),
            to_stop: edge.to.get(),
            distance: edge.distance(),
            route_id: edge.route,
        }
    }
}

/// A route in lookup results.
#[derive(Debug, Serialize)]
pub struct RouteResult {
    pub route_id: RouteId,
    pub route_name: String,
    pub stops: Vec<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_distance: Option<f64>,
}

impl From<RouteInfo> for RouteResult {
    fn from(route: RouteInfo) -> Self {
        Self {
            route_id: route.id,
            route_name: route.name,
            stops: route.stops.into_iter().map(|s| s.get()).collect(),
            total_distance: route.total_distance,
        }
    }
}

/// One record of a network lookup, serialised without a tag.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum SearchResult {
    Stop(StopResult),
    Edge(EdgeResult),
    Route(RouteResult),
}

impl SearchResult {
    pub fn from_lookup(results: LookupResults) -> Vec<Self> {
        match results {
            LookupResults::Stops(stops) => stops
                .into_iter()
                .map(|s| SearchResult::Stop(s.into()))
                .collect(),
            LookupResults::Edges(edges) => edges
                .into_iter()
                .map(|e| SearchResult::Edge(e.into()))
                .collect(),
            LookupResults::Routes(routes) => routes
                .into_iter()
                .map(|r| SearchResult::Route(r.into()))
                .collect(),
        }
    }
}

/// Response for stop search.
#[derive(Debug, Serialize)]
pub struct StopSearchResponse {
    pub stops: Vec<StopResult>,
}

/// Summary of the snapshot currently in use.
#[derive(Debug, Serialize)]
pub struct NetworkStatusResponse {
    pub version: u64,
    pub loaded_at: DateTime<Utc>,
    pub stops: usize,
    pub edges: usize,
    pub routes: usize,
    /// Stops mentioned by at least one edge
    pub graph_nodes: usize,
    /// Edges pointing at stops the stop table does not know
    pub dangling_edges: usize,
    /// Plans held in the cache
    pub cached_plans: u64,
    /// Source the snapshot was loaded from
    pub source: String,
}

impl NetworkStatusResponse {
    pub fn new(snapshot: &NetworkSnapshot, source: String, cached_plans: u64) -> Self {
        Self {
            version: snapshot.version(),
            loaded_at: snapshot.loaded_at(),
            stops: snapshot.stop_count(),
            edges: snapshot.edge_count(),
            routes: snapshot.route_count(),
            graph_nodes: snapshot.graph().node_count(),
            dangling_edges: snapshot.dangling_edges(),
            cached_plans,
            source,
        }
    }
}

/// Error response.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,

    /// Machine-readable code, e.g. `NO_ROUTE`
    pub code: &'static str,
}
