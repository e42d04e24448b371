//! Immutable network snapshots and the store that swaps them.
//!
//! A snapshot is built completely from one fetch before anyone can see it.
//! Queries clone the current `Arc` and keep using it for their whole
//! lifetime, so a refresh never exposes a half-built graph and never blocks
//! on in-flight queries.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::domain::{Edge, RouteId, RouteInfo, Stop, StopId};
use crate::planner::Graph;

use super::error::SourceError;
use super::records::NetworkData;
use super::source::NetworkSource;

/// A consistent view of stops, routes and the edge graph.
#[derive(Debug, Clone)]
pub struct NetworkSnapshot {
    version: u64,
    loaded_at: DateTime<Utc>,
    stops: BTreeMap<StopId, Stop>,
    routes: BTreeMap<RouteId, RouteInfo>,
    graph: Graph,
    edges: Vec<Edge>,
    /// Edges whose endpoints have no stop record.
    dangling_edges: usize,
}

impl NetworkSnapshot {
    /// Build a snapshot from fetched data.
    ///
    /// Duplicate stop ids keep the first record. Edges that reference
    /// unknown stops are kept and routed through by id.
    pub fn build(data: NetworkData, version: u64) -> Self {
        let mut stops = BTreeMap::new();
        let mut duplicate_stops = 0usize;
        for stop in data.stops {
            if stops.contains_key(&stop.id) {
                duplicate_stops += 1;
                continue;
            }
            stops.insert(stop.id, stop);
        }

        let dangling_edges = data
            .edges
            .iter()
            .filter(|e| !stops.contains_key(&e.from) || !stops.contains_key(&e.to))
            .count();

        let mut routes = BTreeMap::new();
        for route in data.routes {
            routes.entry(route.id.clone()).or_insert(route);
        }

        let graph = Graph::build(&data.edges);

        if duplicate_stops > 0 {
            warn!(version, duplicate_stops, "ignored duplicate stop records");
        }
        if dangling_edges > 0 {
            warn!(
                version,
                dangling_edges, "edges reference stops missing from the stop table"
            );
        }

        Self {
            version,
            loaded_at: Utc::now(),
            stops,
            routes,
            graph,
            edges: data.edges,
            dangling_edges,
        }
    }

    /// A snapshot with no data, version 0.
    pub fn empty() -> Self {
        Self::build(NetworkData::default(), 0)
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn loaded_at(&self) -> DateTime<Utc> {
        self.loaded_at
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    /// Every edge in the order the source declared it.
    pub fn all_edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Name of a stop, if the stop table has it.
    pub fn resolve_stop_name(&self, id: StopId) -> Option<&str> {
        self.stops.get(&id).map(|s| s.name.as_str())
    }

    pub fn route(&self, id: &RouteId) -> Option<&RouteInfo> {
        self.routes.get(id)
    }

    pub fn stop_count(&self) -> usize {
        self.stops.len()
    }

    pub fn route_count(&self) -> usize {
        self.routes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn dangling_edges(&self) -> usize {
        self.dangling_edges
    }

    /// Case-insensitive substring search over stop names, in id order.
    pub fn search_stops(&self, query: &str, limit: usize) -> Vec<&Stop> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return Vec::new();
        }

        self.stops
            .values()
            .filter(|s| s.name.to_lowercase().contains(&needle))
            .take(limit)
            .collect()
    }

    /// Edges with `query` as the stop id at either end or as the route id,
    /// in declared order.
    ///
    /// Numeric terms are tried as both, so `335` finds edges touching stop
    /// 335 and edges on route `335`.
    pub fn search_edges(&self, query: &str, limit: usize) -> Vec<&Edge> {
        let query = query.trim();
        let stop = query.parse::<StopId>().ok();

        self.edges
            .iter()
            .filter(|e| stop.is_some_and(|s| e.touches(s)) || e.route.as_str() == query)
            .take(limit)
            .collect()
    }

    /// Routes whose name contains `query` (case-insensitive), whose id
    /// equals it, or that serve the stop it names. In route id order.
    pub fn search_routes(&self, query: &str, limit: usize) -> Vec<&RouteInfo> {
        let query = query.trim();
        if query.is_empty() {
            return Vec::new();
        }
        let needle = query.to_lowercase();
        let stop = query.parse::<StopId>().ok();

        self.routes
            .values()
            .filter(|r| {
                r.name.to_lowercase().contains(&needle)
                    || r.id.as_str() == query
                    || stop.is_some_and(|s| r.stops.contains(&s))
            })
            .take(limit)
            .collect()
    }
}

/// Holds the current snapshot and rebuilds it from a source on demand.
pub struct SnapshotStore<S> {
    current: RwLock<Arc<NetworkSnapshot>>,
    source: S,
    next_version: AtomicU64,
}

impl<S: NetworkSource> SnapshotStore<S> {
    /// Create a store by fetching the first snapshot.
    ///
    /// This will fail if the source is unavailable.
    pub async fn load(source: S) -> Result<Self, SourceError> {
        let data = source.fetch().await?;
        let snapshot = NetworkSnapshot::build(data, 1);
        info!(
            source = %source.describe(),
            stops = snapshot.stop_count(),
            edges = snapshot.edge_count(),
            nodes = snapshot.graph().node_count(),
            routes = snapshot.route_count(),
            "loaded network snapshot"
        );

        Ok(Self {
            current: RwLock::new(Arc::new(snapshot)),
            source,
            next_version: AtomicU64::new(2),
        })
    }

    /// Create a store holding an empty snapshot.
    pub fn empty(source: S) -> Self {
        Self {
            current: RwLock::new(Arc::new(NetworkSnapshot::empty())),
            source,
            next_version: AtomicU64::new(1),
        }
    }

    /// The snapshot queries should use right now.
    pub async fn current(&self) -> Arc<NetworkSnapshot> {
        self.current.read().await.clone()
    }

    /// Fetch and build a new snapshot, then swap it in.
    ///
    /// Versions are taken when a refresh starts, so a slow fetch that began
    /// before a faster one never replaces the newer data. On failure the
    /// existing snapshot stays in place and the error is returned. Returns
    /// the snapshot that is current afterwards.
    pub async fn refresh(&self) -> Result<Arc<NetworkSnapshot>, SourceError> {
        let version = self.next_version.fetch_add(1, Ordering::SeqCst);
        let data = self.source.fetch().await?;
        let fresh = Arc::new(NetworkSnapshot::build(data, version));

        let mut guard = self.current.write().await;
        if fresh.version > guard.version {
            *guard = fresh;
        } else {
            debug!(version, current = guard.version, "discarding stale refresh");
        }
        let current = guard.clone();
        drop(guard);

        info!(
            version = current.version(),
            stops = current.stop_count(),
            edges = current.edge_count(),
            "network snapshot refreshed"
        );
        Ok(current)
    }

    pub fn source(&self) -> &S {
        &self.source
    }
}
