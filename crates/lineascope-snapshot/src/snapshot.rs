//! Snapshot container and validation

use crate::record::NodeRecord;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// Node identifier (unique within a snapshot)
pub type NodeId = String;

/// One full description of a transformation project at a point in time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Metadata about the snapshot, opaque to the engine
    #[serde(default)]
    pub metadata: SnapshotMetadata,

    /// All nodes keyed by id
    pub nodes: HashMap<NodeId, NodeRecord>,

    /// Direct dependencies: node id -> ids of its parents
    #[serde(default)]
    pub parent_map: HashMap<NodeId, Vec<NodeId>>,
}

impl Snapshot {
    /// Empty snapshot
    pub fn new() -> Self {
        Self {
            metadata: SnapshotMetadata::default(),
            nodes: HashMap::new(),
            parent_map: HashMap::new(),
        }
    }

    /// Load a snapshot from a JSON file
    pub fn from_file(path: &Path) -> Result<Self, SnapshotError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| SnapshotError::IoError(path.display().to_string(), e.to_string()))?;

        Self::from_json(&contents)
    }

    /// Parse a snapshot from a JSON string
    pub fn from_json(json: &str) -> Result<Self, SnapshotError> {
        serde_json::from_str(json).map_err(|e| SnapshotError::ParseError(e.to_string()))
    }

    /// Get a node by id
    pub fn get_node(&self, id: &str) -> Option<&NodeRecord> {
        self.nodes.get(id)
    }

    /// Check that every id referenced in `parent_map` exists in `nodes`.
    ///
    /// With `stub_unresolved_refs` the check passes for missing parent
    /// ids (the builder materializes stub nodes for them downstream);
    /// a parent-map key naming a missing child is always an error.
    pub fn validate(&self, stub_unresolved_refs: bool) -> Result<(), SnapshotError> {
        for (child, parents) in &self.parent_map {
            if !self.nodes.contains_key(child) {
                return Err(SnapshotError::DanglingParentReference {
                    referrer: child.clone(),
                    missing: child.clone(),
                });
            }

            if stub_unresolved_refs {
                continue;
            }

            for parent in parents {
                if !self.nodes.contains_key(parent) {
                    return Err(SnapshotError::DanglingParentReference {
                        referrer: child.clone(),
                        missing: parent.clone(),
                    });
                }
            }
        }

        Ok(())
    }
}

impl Default for Snapshot {
    fn default() -> Self {
        Self::new()
    }
}

/// Snapshot metadata, carried through for display only
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SnapshotMetadata {
    /// Version of the tool that generated the snapshot
    #[serde(default)]
    pub tool_version: Option<String>,

    /// Generation timestamp, as emitted by the tool
    #[serde(default)]
    pub generated_at: Option<String>,

    /// Invocation id of the generating run
    #[serde(default)]
    pub invocation_id: Option<String>,

    /// Project identifier
    #[serde(default)]
    pub project_id: Option<String>,
}

/// Snapshot errors
#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    #[error("Failed to read snapshot file {0}: {1}")]
    IoError(String, String),

    #[error("Failed to parse snapshot JSON: {0}")]
    ParseError(String),

    #[error("parent_map entry for '{referrer}' references '{missing}' which is not in nodes")]
    DanglingParentReference { referrer: String, missing: String },
}
