//! Stop network data: repository sources and immutable snapshots.
//!
//! Sources fetch stops, edges and routes from the stop repository. The
//! snapshot store turns each fetch into a complete `NetworkSnapshot` and
//! swaps it in atomically.

mod error;
mod records;
mod snapshot;
mod source;

pub use error::SourceError;
pub use records::{EdgeRecord, NetworkData, RawRouteId, RouteRecord, StopRecord};
pub use snapshot::{NetworkSnapshot, SnapshotStore};
pub use source::{HttpSource, HttpSourceConfig, JsonFileSource, NetworkSource, Source};
