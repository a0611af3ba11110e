//! Graph builder: merges a base and a current snapshot
//!
//! Produces the merged [`LineageGraph`] in one pass: union of nodes
//! tagged with provenance, union of edges from both parent maps, and
//! the modified set. Node change classification runs eagerly here.

use crate::classify::classify_node;
use crate::graph::{edge_id, EdgeId, LineageEdge, LineageGraph, MergedNode};
use lineascope_core::{ChangeStatus, Config, Provenance};
use lineascope_snapshot::{NodeId, NodeRecord, Snapshot, SnapshotError};
use std::collections::{HashMap, HashSet};

/// Build the merged lineage graph from two snapshots.
///
/// Both inputs are re-validated here: a dangling parent reference is
/// fatal to the build (no partial graph is returned) unless the config
/// turns unresolved references into stub nodes.
pub fn build(
    base: &Snapshot,
    current: &Snapshot,
    config: &Config,
) -> Result<LineageGraph, BuildError> {
    validate_side(base, "base", config)?;
    validate_side(current, "current", config)?;

    let base_nodes = effective_nodes(base, config);
    let current_nodes = effective_nodes(current, config);

    let all_ids: HashSet<&NodeId> = base_nodes.keys().chain(current_nodes.keys()).collect();

    let mut nodes: HashMap<NodeId, MergedNode> = HashMap::with_capacity(all_ids.len());
    let mut modified_set: HashSet<NodeId> = HashSet::new();

    for id in all_ids {
        let base_record = base_nodes.get(id);
        let current_record = current_nodes.get(id);

        // Presence on at least one side is guaranteed by the union
        let Some((provenance, change_status)) =
            classify_node(base_record, current_record, config)
        else {
            continue;
        };

        if change_status == ChangeStatus::Modified {
            modified_set.insert(id.clone());
        }

        nodes.insert(
            id.clone(),
            MergedNode {
                id: id.clone(),
                provenance,
                change_status,
                base: base_record.cloned(),
                current: current_record.cloned(),
            },
        );
    }

    let base_edges = side_edges(base, &base_nodes);
    let current_edges = side_edges(current, &current_nodes);

    let mut edges: HashMap<EdgeId, LineageEdge> = HashMap::new();
    for (id, (source, target)) in base_edges.iter().chain(current_edges.iter()) {
        let provenance = Provenance::from_presence(
            base_edges.contains_key(id),
            current_edges.contains_key(id),
        )
        .unwrap_or(Provenance::Both);

        edges.entry(id.clone()).or_insert_with(|| LineageEdge {
            source: source.clone(),
            target: target.clone(),
            provenance,
        });
    }

    tracing::debug!(
        nodes = nodes.len(),
        edges = edges.len(),
        modified = modified_set.len(),
        "merged lineage graph built"
    );

    Ok(LineageGraph::from_parts(nodes, edges, modified_set))
}

fn validate_side(
    snapshot: &Snapshot,
    side: &'static str,
    config: &Config,
) -> Result<(), BuildError> {
    snapshot
        .validate(config.stub_unresolved_refs)
        .map_err(|e| match e {
            SnapshotError::DanglingParentReference { referrer, missing } => {
                BuildError::DanglingParentReference {
                    side,
                    referrer,
                    missing,
                }
            }
            other => BuildError::InvalidSnapshot {
                side,
                message: other.to_string(),
            },
        })
}

/// A snapshot's node map, with stub records materialized for parent ids
/// the snapshot references but does not define (when configured).
fn effective_nodes(snapshot: &Snapshot, config: &Config) -> HashMap<NodeId, NodeRecord> {
    let mut nodes = snapshot.nodes.clone();

    if config.stub_unresolved_refs {
        for parents in snapshot.parent_map.values() {
            for parent in parents {
                nodes
                    .entry(parent.clone())
                    .or_insert_with(|| NodeRecord::stub(parent));
            }
        }
    }

    nodes
}

/// Directed edges declared by one snapshot, keyed by edge id.
/// Edges whose endpoints are not both known on that side are dropped.
fn side_edges(
    snapshot: &Snapshot,
    side_nodes: &HashMap<NodeId, NodeRecord>,
) -> HashMap<EdgeId, (NodeId, NodeId)> {
    let mut edges = HashMap::new();

    for (child, parents) in &snapshot.parent_map {
        if !side_nodes.contains_key(child) {
            continue;
        }
        for parent in parents {
            if side_nodes.contains_key(parent) {
                edges.insert(edge_id(parent, child), (parent.clone(), child.clone()));
            }
        }
    }

    edges
}

/// Graph build errors
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("dangling parent reference in {side} snapshot: '{referrer}' depends on '{missing}' which is not in nodes")]
    DanglingParentReference {
        side: &'static str,
        referrer: String,
        missing: String,
    },

    #[error("invalid {side} snapshot: {message}")]
    InvalidSnapshot { side: &'static str, message: String },
}
