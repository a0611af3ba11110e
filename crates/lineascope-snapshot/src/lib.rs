//! Lineascope Snapshot Model
//!
//! Typed representation of one manifest snapshot: nodes, columns, and
//! dependency declarations, already resolved from whatever tool-specific
//! format produced them. The engine never parses tool output itself.

pub mod record;
pub mod snapshot;

pub use record::{ColumnRecord, NodeRecord};
pub use snapshot::{NodeId, Snapshot, SnapshotError, SnapshotMetadata};
