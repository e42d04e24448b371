//! Transfer-aware shortest path search.
//!
//! Dijkstra over the stop graph where leaving a stop on a different route
//! from the one used to arrive costs an extra transfer penalty:
//!
//! ```text
//! cost(u, e) = e.distance + (penalty if route_into(u) is set and != e.route)
//! ```
//!
//! Because the cost out of a stop depends on the arrival route, labels are
//! kept per (stop, arrival route) rather than per stop. A cheaper arrival on
//! the "wrong" route cannot hide a slightly dearer one that avoids a later
//! transfer. All costs stay non-negative, so a label popped from the queue
//! with its current distance is final.

use std::cmp::{Ordering, Reverse};
use std::collections::{BinaryHeap, HashMap};

use tracing::trace;

use crate::domain::{Path, RouteId, StopId};

use super::config::TransferPenalty;
use super::graph::{Connection, Graph};

/// Index of a label in the search arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(super) struct LabelId(pub(super) usize);

/// Best known way of reaching `stop` having arrived on `route`.
#[derive(Debug, Clone)]
pub(super) struct Label {
    pub(super) stop: StopId,
    pub(super) route: Option<RouteId>,
    pub(super) dist: f64,
    pub(super) prev: Option<LabelId>,
    /// Distance of the edge used to arrive, without penalty.
    pub(super) edge_distance: f64,
}

/// Priority queue entry. Ordered by cost, then by push order so that equal
/// costs are popped first-in first-out.
#[derive(Debug, Clone, Copy)]
struct Queued {
    cost: f64,
    seq: u64,
    label: LabelId,
}

impl PartialEq for Queued {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Queued {}

impl PartialOrd for Queued {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Queued {
    fn cmp(&self, other: &Self) -> Ordering {
        self.cost
            .total_cmp(&other.cost)
            .then_with(|| self.seq.cmp(&other.seq))
    }
}

/// Labels settled by a search that reached its goal.
///
/// This is the only value the path reconstructor accepts, so a path can
/// never be rebuilt from a search that failed.
#[derive(Debug, Clone)]
pub struct SearchTree {
    pub(super) labels: Vec<Label>,
    pub(super) goal: LabelId,
}

impl SearchTree {
    /// Cost of the best path to the goal.
    pub fn total_distance(&self) -> f64 {
        self.labels[self.goal.0].dist
    }
}

/// Outcome of a shortest path query.
#[derive(Debug, Clone, PartialEq)]
pub enum ShortestPath {
    Found(Path),
    NotFound,
}

impl ShortestPath {
    /// Returns the path if one was found.
    pub fn found(&self) -> Option<&Path> {
        match self {
            ShortestPath::Found(path) => Some(path),
            ShortestPath::NotFound => None,
        }
    }

    pub fn is_found(&self) -> bool {
        matches!(self, ShortestPath::Found(_))
    }
}

/// Cost of taking `edge` after arriving on `arrived_on`.
///
/// The origin has no arrival route, so the first edge never pays a penalty.
pub fn edge_cost(
    arrived_on: Option<&RouteId>,
    edge: &Connection,
    penalty: TransferPenalty,
) -> f64 {
    match arrived_on {
        Some(route) if route != &edge.route => edge.distance + penalty.get(),
        _ => edge.distance,
    }
}

/// Find the cheapest path from `start` to `goal`.
///
/// `start == goal` yields the single-stop path with cost 0 without searching.
pub fn shortest_path(
    graph: &Graph,
    start: StopId,
    goal: StopId,
    penalty: TransferPenalty,
) -> ShortestPath {
    if start == goal {
        return ShortestPath::Found(Path::trivial(start));
    }

    match search(graph, start, goal, penalty) {
        Some(tree) => ShortestPath::Found(tree.reconstruct()),
        None => ShortestPath::NotFound,
    }
}

/// Run the label-setting search, returning the settled tree if `goal` was
/// reached.
pub fn search(
    graph: &Graph,
    start: StopId,
    goal: StopId,
    penalty: TransferPenalty,
) -> Option<SearchTree> {
    let mut labels: Vec<Label> = vec![Label {
        stop: start,
        route: None,
        dist: 0.0,
        prev: None,
        edge_distance: 0.0,
    }];
    let mut index: HashMap<(StopId, Option<RouteId>), LabelId> = HashMap::new();
    index.insert((start, None), LabelId(0));

    let mut queue = BinaryHeap::new();
    let mut seq: u64 = 0;
    queue.push(Reverse(Queued {
        cost: 0.0,
        seq,
        label: LabelId(0),
    }));

    while let Some(Reverse(Queued { cost, label: u, .. })) = queue.pop() {
        // Skip stale entries.
        if cost > labels[u.0].dist {
            continue;
        }

        let stop = labels[u.0].stop;
        if stop == goal {
            trace!(labels = labels.len(), cost, "reached {goal} from {start}");
            return Some(SearchTree { labels, goal: u });
        }

        let arrived_on = labels[u.0].route.clone();
        for edge in graph.outgoing(stop) {
            let alt = cost + edge_cost(arrived_on.as_ref(), edge, penalty);
            let key = (edge.to, Some(edge.route.clone()));

            let target = match index.get(&key) {
                Some(&existing) => {
                    if alt >= labels[existing.0].dist {
                        continue;
                    }
                    let label = &mut labels[existing.0];
                    label.dist = alt;
                    label.prev = Some(u);
                    label.edge_distance = edge.distance;
                    existing
                }
                None => {
                    let id = LabelId(labels.len());
                    labels.push(Label {
                        stop: edge.to,
                        route: Some(edge.route.clone()),
                        dist: alt,
                        prev: Some(u),
                        edge_distance: edge.distance,
                    });
                    index.insert(key, id);
                    id
                }
            };

            seq += 1;
            queue.push(Reverse(Queued {
                cost: alt,
                seq,
                label: target,
            }));
        }
    }

    trace!(labels = labels.len(), "no path from {start} to {goal}");
    None
}
