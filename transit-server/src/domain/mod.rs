//! Domain types for the transit route planner.
//!
//! This module contains the core domain model types that represent
//! validated network data. Types enforce their invariants at construction
//! time, so code that receives them can trust their validity.

mod edge;
mod error;
mod path;
mod route;
mod stop;

pub use edge::{DEFAULT_DISTANCE, Edge, normalize_distance};
pub use error::DomainError;
pub use path::{Leg, Path, PathStep};
pub use route::{InvalidRouteId, RouteId, RouteInfo};
pub use stop::{InvalidStopId, Stop, StopId};
