//! Adjacency structure built from a flat edge list.

use std::collections::{HashMap, HashSet};

use crate::domain::{Edge, RouteId, StopId};

/// An outgoing connection from a stop.
#[derive(Debug, Clone, PartialEq)]
pub struct Connection {
    pub to: StopId,
    pub route: RouteId,
    /// Normalised distance, always > 0.
    pub distance: f64,
}

/// Directed stop graph.
///
/// Keys are exactly the stops that have at least one outgoing edge. Each
/// bucket keeps the input order of its edges, which is the order the search
/// relaxes them in. Stops that only appear as a destination have no key and
/// are treated as having no outgoing edges.
#[derive(Debug, Clone, Default)]
pub struct Graph {
    adjacency: HashMap<StopId, Vec<Connection>>,
    /// Every stop mentioned by any edge.
    nodes: HashSet<StopId>,
    edge_count: usize,
}

impl Graph {
    /// Build a graph from edges. Duplicates are kept as separate connections.
    pub fn build<'a>(edges: impl IntoIterator<Item = &'a Edge>) -> Self {
        let mut graph = Graph::default();

        for edge in edges {
            graph
                .adjacency
                .entry(edge.from)
                .or_default()
                .push(Connection {
                    to: edge.to,
                    route: edge.route.clone(),
                    distance: edge.distance(),
                });
            graph.nodes.insert(edge.from);
            graph.nodes.insert(edge.to);
            graph.edge_count += 1;
        }

        graph
    }

    /// Outgoing connections of a stop, in declaration order.
    pub fn outgoing(&self, stop: StopId) -> &[Connection] {
        self.adjacency.get(&stop).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Returns true if the stop has an adjacency entry.
    pub fn has_outgoing(&self, stop: StopId) -> bool {
        self.adjacency.contains_key(&stop)
    }

    /// Returns true if any edge starts or ends at this stop.
    pub fn contains(&self, stop: StopId) -> bool {
        self.nodes.contains(&stop)
    }

    /// Number of stops mentioned by any edge.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edge_count
    }

    pub fn is_empty(&self) -> bool {
        self.edge_count == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn edge(from: i64, to: i64, route: &str, distance: f64) -> Edge {
        let route = RouteId::new(route).unwrap();
        Edge::new(StopId(from), StopId(to), route, Some(distance))
    }

    #[test]
    fn groups_by_source_preserving_order() {
        let edges = vec![
            edge(1, 2, "R1", 3.0),
            edge(2, 3, "R1", 2.0),
            edge(1, 3, "R2", 6.0),
            edge(1, 4, "R3", 1.0),
        ];
        let graph = Graph::build(&edges);

        let from_one: Vec<_> = graph.outgoing(StopId(1)).iter().map(|c| c.to).collect();
        assert_eq!(from_one, vec![StopId(2), StopId(3), StopId(4)]);
        assert_eq!(graph.outgoing(StopId(2)).len(), 1);
        assert_eq!(graph.edge_count(), 4);
    }

    #[test]
    fn keys_are_exactly_the_sources() {
        let edges = vec![edge(1, 2, "R1", 1.0), edge(2, 3, "R1", 1.0)];
        let graph = Graph::build(&edges);

        assert!(graph.has_outgoing(StopId(1)));
        assert!(graph.has_outgoing(StopId(2)));
        assert!(!graph.has_outgoing(StopId(3)));
    }

    #[test]
    fn sinks_have_no_outgoing_edges() {
        let edges = vec![edge(1, 2, "R1", 1.0)];
        let graph = Graph::build(&edges);

        assert!(!graph.has_outgoing(StopId(2)));
        assert!(graph.outgoing(StopId(2)).is_empty());
        assert!(graph.contains(StopId(2)));
        assert!(!graph.contains(StopId(99)));
        assert_eq!(graph.node_count(), 2);
    }

    #[test]
    fn zero_distance_is_normalised() {
        let edges = vec![edge(1, 2, "R1", 0.0)];
        let graph = Graph::build(&edges);

        assert_eq!(graph.outgoing(StopId(1))[0].distance, 1.0);
    }

    #[test]
    fn duplicates_are_kept() {
        let edges = vec![edge(1, 2, "R1", 1.0), edge(1, 2, "R1", 1.0)];
        let graph = Graph::build(&edges);

        assert_eq!(graph.outgoing(StopId(1)).len(), 2);
    }

    #[test]
    fn edges_are_not_mirrored() {
        let edges = vec![edge(1, 2, "R1", 1.0)];
        let graph = Graph::build(&edges);

        assert!(graph.outgoing(StopId(2)).iter().all(|c| c.to != StopId(1)));
    }

    #[test]
    fn empty_input() {
        let graph = Graph::build(&[]);
        assert!(graph.is_empty());
        assert_eq!(graph.node_count(), 0);
    }
}
