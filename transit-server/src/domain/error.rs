//! Domain error types.
//!
//! These errors represent validation failures in the domain layer.
//! They are distinct from data source and query errors.

/// Domain-level errors for validation and data consistency.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DomainError {
    /// Path has no steps
    #[error("path must contain at least one stop")]
    EmptyPath,

    /// Route annotations on a path are inconsistent
    #[error("invalid path: {0}")]
    InvalidPath(&'static str),
}
