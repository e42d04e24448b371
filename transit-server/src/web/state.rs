//! Application state for the web layer.

use std::sync::Arc;

use crate::cache::CachedRoutePlanner;
use crate::network::Source;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Cached planner over the refreshable network snapshot
    pub planner: Arc<CachedRoutePlanner<Source>>,
}

impl AppState {
    /// Create a new app state.
    pub fn new(planner: CachedRoutePlanner<Source>) -> Self {
        Self {
            planner: Arc::new(planner),
        }
    }
}
