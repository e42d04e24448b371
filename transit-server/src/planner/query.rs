//! Route queries against a network snapshot.
//!
//! This is what callers go through: it validates the
//! endpoints, runs the search and renders stop ids as names.

use std::str::FromStr;

use serde::Serialize;
use tracing::debug;

use crate::domain::{Edge, Path, RouteId, RouteInfo, Stop, StopId};
use crate::network::NetworkSnapshot;

use super::config::PlannerConfig;
use super::search::{ShortestPath, shortest_path};

/// Error from a route query.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PlanError {
    /// Endpoint is not in the stop table
    #[error("unknown stop: {0}")]
    InvalidStop(StopId),

    /// Origin and destination are the same stop
    #[error("origin and destination are the same stop: {0}")]
    SameStop(StopId),

    /// Both stops exist but the network does not connect them
    #[error("no route from {from} to {to}")]
    NoRoute { from: StopId, to: StopId },
}

impl PlanError {
    /// Stable machine-readable code.
    pub fn code(&self) -> &'static str {
        match self {
            PlanError::InvalidStop(_) => "INVALID_STOP",
            PlanError::SameStop(_) => "SAME_STOP",
            PlanError::NoRoute { .. } => "NO_ROUTE",
        }
    }

    /// True for errors caused by the request rather than the network.
    pub fn is_usage(&self) -> bool {
        matches!(self, PlanError::InvalidStop(_) | PlanError::SameStop(_))
    }
}

/// Kind of record a network lookup searches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupKind {
    /// Stops by name
    Stops,
    /// Edges by endpoint stop id or route id
    Edges,
    /// Routes by name, id or a stop they serve
    Routes,
}

/// Lookup type that is not one of `stops`, `edges` or `route`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown lookup type: {0:?}")]
pub struct UnknownLookupKind(pub String);

impl FromStr for LookupKind {
    type Err = UnknownLookupKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "stops" => Ok(LookupKind::Stops),
            "edges" => Ok(LookupKind::Edges),
            "route" | "routes" => Ok(LookupKind::Routes),
            _ => Err(UnknownLookupKind(s.to_string())),
        }
    }
}

/// Records matched by a lookup, in snapshot order.
#[derive(Debug, Clone, PartialEq)]
pub enum LookupResults {
    Stops(Vec<Stop>),
    Edges(Vec<Edge>),
    Routes(Vec<RouteInfo>),
}

impl LookupResults {
    pub fn len(&self) -> usize {
        match self {
            LookupResults::Stops(stops) => stops.len(),
            LookupResults::Edges(edges) => edges.len(),
            LookupResults::Routes(routes) => routes.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A stop on a planned route.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlannedStop {
    pub stop_id: StopId,
    /// Stop name, or the raw id when the stop table has no entry.
    pub stop_name: String,
    /// Route used to arrive. `None` at the origin.
    pub route_id: Option<RouteId>,
}

/// A leg of a planned route, with display names filled in.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlannedLeg {
    pub route_id: RouteId,
    pub route_name: String,
    pub from: String,
    pub to: String,
    pub stop_count: usize,
    pub distance: f64,
}

/// Answer to a successful route query.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlannedRoute {
    pub path: Vec<PlannedStop>,
    /// Search cost: distances plus transfer penalties.
    pub total_distance: f64,
    /// Distance actually travelled, without penalties.
    pub distance: f64,
    pub transfers: usize,
    pub legs: Vec<PlannedLeg>,
    /// Version of the snapshot the route was planned on.
    pub network_version: u64,
}

/// Route planner bound to one snapshot.
pub struct RoutePlanner<'a> {
    snapshot: &'a NetworkSnapshot,
    config: &'a PlannerConfig,
}

impl<'a> RoutePlanner<'a> {
    pub fn new(snapshot: &'a NetworkSnapshot, config: &'a PlannerConfig) -> Self {
        Self { snapshot, config }
    }

    /// Plan the cheapest route between two stops.
    pub fn plan(&self, from: StopId, to: StopId) -> Result<PlannedRoute, PlanError> {
        for stop in [from, to] {
            if self.snapshot.resolve_stop_name(stop).is_none() {
                return Err(PlanError::InvalidStop(stop));
            }
        }

        if from == to && self.config.require_distinct_endpoints {
            return Err(PlanError::SameStop(from));
        }

        let graph = self.snapshot.graph();
        if from != to && !(graph.contains(from) && graph.contains(to)) {
            debug!(%from, %to, "endpoint not served by any edge");
            return Err(PlanError::NoRoute { from, to });
        }

        let result = shortest_path(graph, from, to, self.config.transfer_penalty);

        match result {
            ShortestPath::Found(path) => {
                debug!(
                    %from,
                    %to,
                    cost = path.total_distance(),
                    stops = path.steps().len(),
                    "planned route"
                );
                Ok(self.render(&path))
            }
            ShortestPath::NotFound => {
                debug!(%from, %to, "no route");
                Err(PlanError::NoRoute { from, to })
            }
        }
    }

    /// Stops whose name contains `query`, at most `limit` of them.
    pub fn search_stops(&self, query: &str, limit: Option<usize>) -> Vec<&'a Stop> {
        self.snapshot
            .search_stops(query, self.config.search_limit(limit))
    }

    /// Look up stops, edges or routes matching `query`.
    ///
    /// Returns at most `lookup_limit` records, none for a blank query.
    pub fn lookup(&self, kind: LookupKind, query: &str) -> LookupResults {
        let limit = self.config.lookup_limit;
        match kind {
            LookupKind::Stops => {
                let stops = self.snapshot.search_stops(query, limit);
                LookupResults::Stops(stops.into_iter().cloned().collect())
            }
            LookupKind::Edges => {
                let edges = self.snapshot.search_edges(query, limit);
                LookupResults::Edges(edges.into_iter().cloned().collect())
            }
            LookupKind::Routes => {
                let routes = self.snapshot.search_routes(query, limit);
                LookupResults::Routes(routes.into_iter().cloned().collect())
            }
        }
    }

    fn stop_name(&self, id: StopId) -> String {
        self.snapshot
            .resolve_stop_name(id)
            .map(str::to_string)
            .unwrap_or_else(|| id.to_string())
    }

    fn route_name(&self, id: &RouteId) -> String {
        self.snapshot
            .route(id)
            .map(|r| r.name.clone())
            .unwrap_or_else(|| id.to_string())
    }

    fn render(&self, path: &Path) -> PlannedRoute {
        let stops = path
            .steps()
            .iter()
            .map(|step| PlannedStop {
                stop_id: step.stop,
                stop_name: self.stop_name(step.stop),
                route_id: step.route.clone(),
            })
            .collect();

        let legs = path
            .legs()
            .into_iter()
            .map(|leg| PlannedLeg {
                route_name: self.route_name(&leg.route),
                from: self.stop_name(leg.from),
                to: self.stop_name(leg.to),
                route_id: leg.route,
                stop_count: leg.stop_count,
                distance: leg.distance,
            })
            .collect();

        PlannedRoute {
            path: stops,
            total_distance: path.total_distance(),
            distance: path.travel_distance(),
            transfers: path.transfers(),
            legs,
            network_version: self.snapshot.version(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Edge, RouteInfo};
    use crate::network::NetworkData;
    use crate::planner::TransferPenalty;

    fn route(s: &str) -> RouteId {
        RouteId::new(s).unwrap()
    }

    fn edge(from: i64, to: i64, r: &str, distance: f64) -> Edge {
        Edge::new(StopId(from), StopId(to), route(r), Some(distance))
    }

    fn snapshot(edges: Vec<Edge>) -> NetworkSnapshot {
        NetworkSnapshot::build(
            NetworkData {
                stops: vec![
                    Stop::new(StopId(1), "Majestic"),
                    Stop::new(StopId(2), "Corporation"),
                    Stop::new(StopId(3), "Shanthinagar"),
                    Stop::new(StopId(4), "Lalbagh"),
                ],
                edges,
                routes: vec![RouteInfo::new(route("R1"), "Ring Road")],
            },
            7,
        )
    }

    fn names(planned: &PlannedRoute) -> Vec<&str> {
        planned.path.iter().map(|s| s.stop_name.as_str()).collect()
    }

    #[test]
    fn plans_named_route() {
        let snap = snapshot(vec![
            edge(1, 2, "R1", 3.0),
            edge(2, 3, "R1", 2.0),
            edge(1, 3, "R2", 6.0),
        ]);
        let config = PlannerConfig::default();
        let planned = RoutePlanner::new(&snap, &config)
            .plan(StopId(1), StopId(3))
            .unwrap();

        assert_eq!(
            names(&planned),
            vec!["Majestic", "Corporation", "Shanthinagar"]
        );
        assert_eq!(planned.path[0].route_id, None);
        assert_eq!(planned.path[2].route_id, Some(route("R1")));
        assert_eq!(planned.total_distance, 5.0);
        assert_eq!(planned.distance, 5.0);
        assert_eq!(planned.transfers, 0);
        assert_eq!(planned.network_version, 7);

        assert_eq!(planned.legs.len(), 1);
        assert_eq!(planned.legs[0].route_name, "Ring Road");
        assert_eq!(planned.legs[0].from, "Majestic");
        assert_eq!(planned.legs[0].to, "Shanthinagar");
        assert_eq!(planned.legs[0].stop_count, 2);
    }

    #[test]
    fn transfer_shows_in_legs_and_cost() {
        let snap = snapshot(vec![edge(1, 2, "R1", 3.0), edge(2, 4, "R2", 2.0)]);
        let config = PlannerConfig::default();
        let planned = RoutePlanner::new(&snap, &config)
            .plan(StopId(1), StopId(4))
            .unwrap();

        assert_eq!(planned.transfers, 1);
        assert_eq!(planned.total_distance, 10.0);
        assert_eq!(planned.distance, 5.0);
        assert_eq!(planned.legs.len(), 2);
        // No catalogue entry for R2: the id is the name.
        assert_eq!(planned.legs[1].route_name, "R2");
        assert_eq!(planned.legs[1].from, "Corporation");
    }

    #[test]
    fn unknown_endpoint_is_invalid_stop() {
        let snap = snapshot(vec![edge(1, 99, "R1", 1.0)]);
        let config = PlannerConfig::default();
        let planner = RoutePlanner::new(&snap, &config);

        assert_eq!(
            planner.plan(StopId(99), StopId(1)),
            Err(PlanError::InvalidStop(StopId(99)))
        );
        assert_eq!(
            planner.plan(StopId(1), StopId(99)),
            Err(PlanError::InvalidStop(StopId(99)))
        );
    }

    #[test]
    fn disconnected_is_no_route() {
        let snap = snapshot(vec![edge(1, 2, "R1", 1.0)]);
        let config = PlannerConfig::default();

        assert_eq!(
            RoutePlanner::new(&snap, &config).plan(StopId(1), StopId(4)),
            Err(PlanError::NoRoute {
                from: StopId(1),
                to: StopId(4)
            })
        );
    }

    #[test]
    fn origin_without_edges_is_no_route() {
        // Shanthinagar is a known stop that no edge mentions.
        let snap = snapshot(vec![edge(1, 2, "R1", 1.0)]);
        let config = PlannerConfig::default();
        let planner = RoutePlanner::new(&snap, &config);

        assert_eq!(
            planner.plan(StopId(3), StopId(2)),
            Err(PlanError::NoRoute {
                from: StopId(3),
                to: StopId(2)
            })
        );
        // A stop that is only ever a destination still counts as served.
        assert!(planner.plan(StopId(1), StopId(2)).is_ok());
    }

    #[test]
    fn same_stop_rejected_when_distinct_required() {
        let snap = snapshot(vec![]);
        let config = PlannerConfig::default();

        assert_eq!(
            RoutePlanner::new(&snap, &config).plan(StopId(2), StopId(2)),
            Err(PlanError::SameStop(StopId(2)))
        );
    }

    #[test]
    fn same_stop_allowed_when_configured() {
        let snap = snapshot(vec![]);
        let config = PlannerConfig::new(TransferPenalty::default(), false);

        let planned = RoutePlanner::new(&snap, &config)
            .plan(StopId(2), StopId(2))
            .unwrap();
        assert_eq!(names(&planned), vec!["Corporation"]);
        assert_eq!(planned.total_distance, 0.0);
        assert!(planned.legs.is_empty());
    }

    #[test]
    fn unnamed_intermediate_stop_uses_raw_id() {
        let snap = snapshot(vec![edge(1, 500, "R1", 1.0), edge(500, 4, "R1", 1.0)]);
        let config = PlannerConfig::default();

        let planned = RoutePlanner::new(&snap, &config)
            .plan(StopId(1), StopId(4))
            .unwrap();
        assert_eq!(names(&planned), vec!["Majestic", "500", "Lalbagh"]);
    }

    #[test]
    fn zero_penalty_config_prefers_distance() {
        let snap = snapshot(vec![
            edge(1, 2, "R1", 3.0),
            edge(2, 3, "R2", 2.0),
            edge(1, 3, "R2", 6.0),
        ]);
        let config = PlannerConfig::new(TransferPenalty::ZERO, true);

        let planned = RoutePlanner::new(&snap, &config)
            .plan(StopId(1), StopId(3))
            .unwrap();
        assert_eq!(planned.total_distance, 5.0);
        assert_eq!(planned.transfers, 1);
    }

    #[test]
    fn search_stops_applies_limit() {
        let snap = snapshot(vec![]);
        let config = PlannerConfig::default();
        let planner = RoutePlanner::new(&snap, &config);

        assert_eq!(planner.search_stops("a", None).len(), 4);
        assert_eq!(planner.search_stops("a", Some(2)).len(), 2);
        assert_eq!(planner.search_stops("lal", None)[0].id, StopId(4));
    }

    #[test]
    fn lookup_kind_parses_case_insensitively() {
        assert_eq!("stops".parse(), Ok(LookupKind::Stops));
        assert_eq!(" EDGES ".parse(), Ok(LookupKind::Edges));
        assert_eq!("Route".parse(), Ok(LookupKind::Routes));
        assert_eq!("routes".parse(), Ok(LookupKind::Routes));
        assert_eq!(
            "trips".parse::<LookupKind>(),
            Err(UnknownLookupKind("trips".to_string()))
        );
    }

    #[test]
    fn lookup_is_capped_at_lookup_limit() {
        let edges = (1..=20).map(|i| edge(1, i + 1, "R1", 1.0)).collect();
        let snap = snapshot(edges);
        let config = PlannerConfig {
            lookup_limit: 3,
            ..PlannerConfig::default()
        };
        let planner = RoutePlanner::new(&snap, &config);

        let LookupResults::Edges(found) = planner.lookup(LookupKind::Edges, "R1") else {
            panic!("expected edges");
        };
        assert_eq!(found.len(), 3);
        assert_eq!(found[0].to, StopId(2));

        let stops = planner.lookup(LookupKind::Stops, "a");
        assert_eq!(stops.len(), 3);
        assert!(planner.lookup(LookupKind::Routes, "").is_empty());
    }

    #[test]
    fn lookup_routes_by_name() {
        let snap = snapshot(vec![]);
        let config = PlannerConfig::default();
        let planner = RoutePlanner::new(&snap, &config);

        assert_eq!(
            planner.lookup(LookupKind::Routes, "ring"),
            LookupResults::Routes(vec![RouteInfo::new(route("R1"), "Ring Road")])
        );
    }

    #[test]
    fn error_codes() {
        assert_eq!(PlanError::InvalidStop(StopId(1)).code(), "INVALID_STOP");
        assert_eq!(PlanError::SameStop(StopId(1)).code(), "SAME_STOP");
        assert_eq!(
            PlanError::NoRoute {
                from: StopId(1),
                to: StopId(2)
            }
            .code(),
            "NO_ROUTE"
        );
        assert_eq!(
            PlanError::NoRoute {
                from: StopId(1),
                to: StopId(2)
            }
            .to_string(),
            "no route from 1 to 2"
        );
    }
}
