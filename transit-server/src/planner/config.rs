//! Planner configuration.

use std::fmt;

/// Default extra cost charged for changing routes mid-journey.
pub const DEFAULT_TRANSFER_PENALTY: f64 = 5.0;

/// Error returned when constructing an invalid transfer penalty.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("invalid transfer penalty {value}: must be a finite number >= 0")]
pub struct InvalidTransferPenalty {
    value: f64,
}

/// Additive cost applied whenever consecutive edges use different routes.
///
/// Always finite and non-negative, which keeps every edge cost
/// non-negative and the search's settled labels final.
///
/// # Examples
///
/// ```
/// use transit_server::planner::TransferPenalty;
///
/// assert_eq!(TransferPenalty::new(5.0).unwrap().get(), 5.0);
/// assert!(TransferPenalty::new(-1.0).is_err());
/// assert!(TransferPenalty::new(f64::NAN).is_err());
/// ```
#[derive(Clone, Copy, PartialEq, PartialOrd)]
pub struct TransferPenalty(f64);

impl TransferPenalty {
    /// No penalty: plain shortest-distance routing.
    pub const ZERO: TransferPenalty = TransferPenalty(0.0);

    pub fn new(value: f64) -> Result<Self, InvalidTransferPenalty> {
        if value.is_finite() && value >= 0.0 {
            // Normalise -0.0 so Display and equality behave.
            Ok(TransferPenalty(value + 0.0))
        } else {
            Err(InvalidTransferPenalty { value })
        }
    }

    pub fn get(self) -> f64 {
        self.0
    }
}

impl Default for TransferPenalty {
    fn default() -> Self {
        TransferPenalty(DEFAULT_TRANSFER_PENALTY)
    }
}

impl fmt::Debug for TransferPenalty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TransferPenalty({})", self.0)
    }
}

impl fmt::Display for TransferPenalty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Configuration parameters for route planning.
#[derive(Debug, Clone)]
pub struct PlannerConfig {
    /// Cost added for each change of route.
    pub transfer_penalty: TransferPenalty,

    /// Reject queries whose origin and destination are the same stop.
    /// The booking flow needs distinct endpoints; the bare engine does not.
    pub require_distinct_endpoints: bool,

    /// Number of stop search results returned when no limit is given.
    pub default_search_limit: usize,

    /// Upper bound on stop search results.
    pub max_search_limit: usize,

    /// Number of results returned by network lookups.
    pub lookup_limit: usize,
}

impl PlannerConfig {
    /// Create a new configuration with the given parameters.
    pub fn new(transfer_penalty: TransferPenalty, require_distinct_endpoints: bool) -> Self {
        Self {
            transfer_penalty,
            require_distinct_endpoints,
            ..Self::default()
        }
    }

    /// Clamp a requested stop search limit to the configured bounds.
    ///
    /// Always at least 1, even if `max_search_limit` is 0.
    pub fn search_limit(&self, requested: Option<usize>) -> usize {
        requested
            .unwrap_or(self.default_search_limit)
            .min(self.max_search_limit)
            .max(1)
    }
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            transfer_penalty: TransferPenalty::default(),
            require_distinct_endpoints: true,
            default_search_limit: 20,
            max_search_limit: 50,
            lookup_limit: 10,
        }
    }
}
