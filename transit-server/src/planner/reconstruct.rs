//! Path reconstruction from a settled search tree.

use crate::domain::{Path, PathStep};

use super::search::SearchTree;

impl SearchTree {
    /// Walk predecessor links back from the goal and return the path in
    /// travel order.
    ///
    /// Each step carries the route used to arrive at it; the origin carries
    /// none. The tree is only read.
    pub fn reconstruct(&self) -> Path {
        let mut steps = Vec::new();
        let mut cursor = Some(self.goal);

        while let Some(id) = cursor {
            let label = &self.labels[id.0];
            steps.push(match &label.route {
                Some(route) => PathStep::via(label.stop, route.clone(), label.edge_distance),
                None => PathStep::origin(label.stop),
            });
            cursor = label.prev;
        }

        steps.reverse();
        Path::from_trusted(steps, self.total_distance())
    }
}

#[cfg(test)]
mod tests {
    use crate::domain::{Edge, RouteId, StopId};
    use crate::planner::TransferPenalty;
    use crate::planner::graph::Graph;
    use crate::planner::search::search;

    fn edge(from: i64, to: i64, r: &str, distance: f64) -> Edge {
        let route = RouteId::new(r).unwrap();
        Edge::new(StopId(from), StopId(to), route, Some(distance))
    }

    #[test]
    fn rebuilds_in_travel_order_with_arrival_routes() {
        let graph = Graph::build(&[
            edge(10, 20, "A", 1.5),
            edge(20, 30, "B", 2.5),
            edge(30, 40, "B", 1.0),
        ]);
        let penalty = TransferPenalty::new(2.0).unwrap();
        let tree = search(&graph, StopId(10), StopId(40), penalty).unwrap();

        let path = tree.reconstruct();
        let steps = path.steps();

        assert_eq!(steps.len(), 4);
        assert_eq!(steps[0].stop, StopId(10));
        assert_eq!(steps[0].route, None);
        assert_eq!(steps[0].distance, 0.0);
        assert_eq!(steps[1].route.as_ref().map(RouteId::as_str), Some("A"));
        assert_eq!(steps[2].route.as_ref().map(RouteId::as_str), Some("B"));
        assert_eq!(steps[2].distance, 2.5);
        assert_eq!(steps[3].stop, StopId(40));
        assert_eq!(path.total_distance(), 7.0);
        assert_eq!(path.travel_distance(), 5.0);
    }

    #[test]
    fn reconstruction_is_repeatable() {
        let graph = Graph::build(&[edge(1, 2, "A", 1.0), edge(2, 3, "A", 1.0)]);
        let tree = search(&graph, StopId(1), StopId(3), TransferPenalty::ZERO).unwrap();

        assert_eq!(tree.reconstruct(), tree.reconstruct());
    }
}
