//! Web layer for the route planner.
//!
//! Thin JSON endpoints over the cached planner and stop search.

mod dto;
mod routes;
mod state;

pub use dto::*;
pub use routes::{AppError, create_router};
pub use state::AppState;
