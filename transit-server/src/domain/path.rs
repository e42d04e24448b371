//! Route-annotated paths through the stop network.
//!
//! A `Path` is the planner's answer to a query: the ordered stops from
//! origin to destination, each tagged with the route used to arrive there.
//! The origin has no arrival route. `Leg`s group consecutive steps that
//! stay on one route, which is how a traveller sees the journey.

use serde::Serialize;

use super::{DomainError, RouteId, StopId};

/// One stop on a path, with the route and edge distance used to reach it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PathStep {
    pub stop: StopId,
    /// Route used to arrive. `None` only for the origin.
    pub route: Option<RouteId>,
    /// Normalised distance of the edge used to arrive (0 at the origin).
    pub distance: f64,
}

impl PathStep {
    /// The first step of every path.
    pub fn origin(stop: StopId) -> Self {
        Self {
            stop,
            route: None,
            distance: 0.0,
        }
    }

    /// A step reached over an edge of `route`.
    pub fn via(stop: StopId, route: RouteId, distance: f64) -> Self {
        Self {
            stop,
            route: Some(route),
            distance,
        }
    }
}

/// A contiguous stretch of a path served by a single route.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Leg {
    pub route: RouteId,
    pub from: StopId,
    pub to: StopId,
    /// Number of edges ridden on this leg.
    pub stop_count: usize,
    pub distance: f64,
}

/// A validated origin-to-destination path.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Path {
    steps: Vec<PathStep>,
    total_distance: f64,
}

impl Path {
    /// Create a path from its steps and search cost.
    ///
    /// The first step must have no route and every later step must have one.
    pub fn new(steps: Vec<PathStep>, total_distance: f64) -> Result<Self, DomainError> {
        let (first, rest) = steps.split_first().ok_or(DomainError::EmptyPath)?;

        if first.route.is_some() {
            return Err(DomainError::InvalidPath("origin must not have a route"));
        }
        if rest.iter().any(|s| s.route.is_none()) {
            return Err(DomainError::InvalidPath(
                "every stop after the origin needs an arrival route",
            ));
        }

        Ok(Self {
            steps,
            total_distance,
        })
    }

    /// Create a path from steps already known to satisfy the invariants.
    pub(crate) fn from_trusted(steps: Vec<PathStep>, total_distance: f64) -> Self {
        debug_assert!(Self::new(steps.clone(), total_distance).is_ok());
        Self {
            steps,
            total_distance,
        }
    }

    /// The single-stop path used when origin and destination coincide.
    pub fn trivial(stop: StopId) -> Self {
        Self {
            steps: vec![PathStep::origin(stop)],
            total_distance: 0.0,
        }
    }

    pub fn steps(&self) -> &[PathStep] {
        &self.steps
    }

    /// Stop ids in travel order.
    pub fn stops(&self) -> impl Iterator<Item = StopId> + '_ {
        self.steps.iter().map(|s| s.stop)
    }

    pub fn origin(&self) -> StopId {
        self.steps[0].stop
    }

    pub fn destination(&self) -> StopId {
        self.steps[self.steps.len() - 1].stop
    }

    /// Search cost: edge distances plus transfer penalties.
    pub fn total_distance(&self) -> f64 {
        self.total_distance
    }

    /// Sum of edge distances, without transfer penalties.
    pub fn travel_distance(&self) -> f64 {
        self.steps.iter().map(|s| s.distance).sum()
    }

    /// Number of edges on the path.
    pub fn edge_count(&self) -> usize {
        self.steps.len() - 1
    }

    /// Returns true if the path has no edges.
    pub fn is_trivial(&self) -> bool {
        self.steps.len() == 1
    }

    /// Number of times the arrival route changes between consecutive edges.
    pub fn transfers(&self) -> usize {
        self.legs().len().saturating_sub(1)
    }

    /// Group consecutive same-route steps into legs.
    pub fn legs(&self) -> Vec<Leg> {
        let mut legs: Vec<Leg> = Vec::new();
        let mut previous = self.steps[0].stop;

        for step in &self.steps[1..] {
            let Some(route) = &step.route else {
                continue;
            };

            match legs.last_mut() {
                Some(leg) if &leg.route == route => {
                    leg.to = step.stop;
                    leg.stop_count += 1;
                    leg.distance += step.distance;
                }
                _ => legs.push(Leg {
                    route: route.clone(),
                    from: previous,
                    to: step.stop,
                    stop_count: 1,
                    distance: step.distance,
                }),
            }
            previous = step.stop;
        }

        legs
    }
}
