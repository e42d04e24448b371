//! Transfer-aware route planning.
//!
//! This module turns the stop network's flat edge list into a graph and
//! answers "cheapest way from stop A to stop B" queries. Changing routes
//! mid-journey costs a configurable transfer penalty on top of the edge
//! distances, so the search prefers staying on one bus when the detour is
//! small.

mod config;
mod graph;
mod query;
mod reconstruct;
mod search;


pub use config::{InvalidTransferPenalty, PlannerConfig, TransferPenalty};
pub use graph::{Connection, Graph};
pub use query::{
    LookupKind, LookupResults, PlanError, PlannedLeg, PlannedRoute, PlannedStop, RoutePlanner,
    UnknownLookupKind,
};
pub use search::{SearchTree, ShortestPath, edge_cost, search, shortest_path};
