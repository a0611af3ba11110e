//! Merged lineage graph and traversal queries
//!
//! The graph is an immutable value object: built once from two
//! snapshots, never mutated, safe to share across threads. All
//! cross-references are by id lookup through the graph's own maps.

use lineascope_core::{ChangeStatus, Provenance};
use lineascope_snapshot::{NodeId, NodeRecord};
use serde::Serialize;
use std::collections::{HashMap, HashSet, VecDeque};

/// Edge identifier: `"{parent}->{child}"`
pub type EdgeId = String;

/// Build the canonical edge id for a parent/child pair
pub fn edge_id(parent: &str, child: &str) -> EdgeId {
    format!("{parent}->{child}")
}

/// One node of the merged graph, carrying the record from each side
#[derive(Debug, Clone, Serialize)]
pub struct MergedNode {
    /// Node id, shared with both snapshots
    pub id: NodeId,

    /// Which snapshot(s) the node came from
    pub provenance: Provenance,

    /// Always-definite change classification
    pub change_status: ChangeStatus,

    /// Record from the base snapshot, if present there
    pub base: Option<NodeRecord>,

    /// Record from the current snapshot, if present there
    pub current: Option<NodeRecord>,
}

impl MergedNode {
    /// The preferred record for display and structural queries:
    /// current when present, base otherwise.
    pub fn record(&self) -> Option<&NodeRecord> {
        self.current.as_ref().or(self.base.as_ref())
    }
}

/// One directed dependency edge (source = parent, target = child)
#[derive(Debug, Clone, Serialize)]
pub struct LineageEdge {
    /// Parent node id
    pub source: NodeId,

    /// Child node id
    pub target: NodeId,

    /// Which snapshot(s) declared this edge
    pub provenance: Provenance,
}

/// Node-visit budget for a traversal
#[derive(Debug, Clone, Copy)]
pub struct TraversalBudget {
    /// Maximum number of nodes the walk may visit
    pub max_visits: usize,
}

/// Result of a budgeted traversal: possibly partial, never an error
#[derive(Debug, Clone)]
pub struct Traversal {
    /// Visited node ids, excluding the seed(s)
    pub nodes: HashSet<NodeId>,

    /// True when the budget ran out before the walk completed
    pub budget_exceeded: bool,

    /// True when the walked slice of the graph contains a cycle. The
    /// walk still terminates and the result includes the cycle's
    /// members, but lineage over this slice is unreliable.
    pub cycle_detected: bool,
}

enum Direction {
    Upstream,
    Downstream,
}

/// The merged, change-annotated lineage graph
#[derive(Debug, Clone, Serialize)]
pub struct LineageGraph {
    /// Merged nodes keyed by id
    pub nodes: HashMap<NodeId, MergedNode>,

    /// Merged edges keyed by `"{parent}->{child}"`
    pub edges: HashMap<EdgeId, LineageEdge>,

    /// Ids present in both snapshots whose content differs
    pub modified_set: HashSet<NodeId>,

    /// Adjacency derived from `edges`: node -> its parents
    #[serde(skip)]
    parents: HashMap<NodeId, Vec<NodeId>>,

    /// Adjacency derived from `edges`: node -> its children
    #[serde(skip)]
    children: HashMap<NodeId, Vec<NodeId>>,
}

impl LineageGraph {
    /// Assemble a graph from merged parts, deriving adjacency.
    ///
    /// Edges whose endpoints are not both in `nodes` are dropped here;
    /// the graph never carries a dangling edge.
    pub(crate) fn from_parts(
        nodes: HashMap<NodeId, MergedNode>,
        edges: HashMap<EdgeId, LineageEdge>,
        modified_set: HashSet<NodeId>,
    ) -> Self {
        let mut parents: HashMap<NodeId, Vec<NodeId>> = HashMap::new();
        let mut children: HashMap<NodeId, Vec<NodeId>> = HashMap::new();

        let edges: HashMap<EdgeId, LineageEdge> = edges
            .into_iter()
            .filter(|(_, e)| nodes.contains_key(&e.source) && nodes.contains_key(&e.target))
            .collect();

        for edge in edges.values() {
            parents
                .entry(edge.target.clone())
                .or_default()
                .push(edge.source.clone());
            children
                .entry(edge.source.clone())
                .or_default()
                .push(edge.target.clone());
        }

        // Deterministic neighbor order regardless of edge-map iteration
        for list in parents.values_mut() {
            list.sort();
        }
        for list in children.values_mut() {
            list.sort();
        }

        Self {
            nodes,
            edges,
            modified_set,
            parents,
            children,
        }
    }

    /// Get a merged node by id
    pub fn get_node(&self, id: &str) -> Option<&MergedNode> {
        self.nodes.get(id)
    }

    /// Immediate parents (dependencies) of a node
    pub fn parents(&self, id: &str) -> &[NodeId] {
        self.parents.get(id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Immediate children (dependents) of a node
    pub fn children(&self, id: &str) -> &[NodeId] {
        self.children.get(id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Immediate parents of a node as declared on one side of the pair.
    /// `Both` edges count for either side.
    pub fn parents_on(&self, id: &str, side: Provenance) -> Vec<&NodeId> {
        self.parents(id)
            .iter()
            .filter(|parent| {
                self.edges
                    .get(&edge_id(parent, id))
                    .map(|e| e.provenance == Provenance::Both || e.provenance == side)
                    .unwrap_or(false)
            })
            .collect()
    }

    /// All node ids reachable by following edges backward from `id`,
    /// excluding `id` itself. Cycle-safe via the visited set; use
    /// [`ancestors_bounded`](Self::ancestors_bounded) when the caller
    /// needs the cycle flag.
    pub fn ancestors(&self, id: &str) -> HashSet<NodeId> {
        self.walk([id], Direction::Upstream, None).nodes
    }

    /// All node ids reachable by following edges forward from `id`,
    /// excluding `id` itself.
    pub fn descendants(&self, id: &str) -> HashSet<NodeId> {
        self.walk([id], Direction::Downstream, None).nodes
    }

    /// Budgeted variant of [`ancestors`](Self::ancestors); returns the
    /// partial result with `budget_exceeded` set instead of failing,
    /// and flags any cycle met in the walked slice.
    pub fn ancestors_bounded(&self, id: &str, budget: TraversalBudget) -> Traversal {
        self.walk([id], Direction::Upstream, Some(budget))
    }

    /// Budgeted variant of [`descendants`](Self::descendants)
    pub fn descendants_bounded(&self, id: &str, budget: TraversalBudget) -> Traversal {
        self.walk([id], Direction::Downstream, Some(budget))
    }

    /// Everything affected by a change-set: the union of descendants of
    /// every modified id, plus the modified ids themselves.
    ///
    /// Implemented as one multi-seed BFS with a shared visited set, so
    /// overlapping downstream cones are walked once.
    pub fn impacted_by(&self, modified: &HashSet<NodeId>) -> HashSet<NodeId> {
        let seeds: Vec<&str> = modified.iter().map(String::as_str).collect();
        let mut impacted = self.walk(seeds, Direction::Downstream, None).nodes;
        impacted.extend(modified.iter().cloned());
        impacted
    }

    /// Budgeted variant of [`impacted_by`](Self::impacted_by); the
    /// modified ids themselves are always included, even when the
    /// budget truncated the downstream walk.
    pub fn impacted_by_bounded(
        &self,
        modified: &HashSet<NodeId>,
        budget: TraversalBudget,
    ) -> Traversal {
        let seeds: Vec<&str> = modified.iter().map(String::as_str).collect();
        let mut traversal = self.walk(seeds, Direction::Downstream, Some(budget));
        traversal.nodes.extend(modified.iter().cloned());
        traversal
    }

    /// The induced subgraph relevant to this diff: modified nodes, their
    /// downstream impact, and the direct parents of modified nodes.
    pub fn changed_subgraph(&self) -> LineageGraph {
        let mut keep = self.impacted_by(&self.modified_set);
        for id in &self.modified_set {
            keep.extend(self.parents(id).iter().cloned());
        }

        let nodes: HashMap<NodeId, MergedNode> = self
            .nodes
            .iter()
            .filter(|(id, _)| keep.contains(*id))
            .map(|(id, node)| (id.clone(), node.clone()))
            .collect();

        let edges: HashMap<EdgeId, LineageEdge> = self
            .edges
            .iter()
            .filter(|(_, e)| keep.contains(&e.source) && keep.contains(&e.target))
            .map(|(id, e)| (id.clone(), e.clone()))
            .collect();

        let modified_set = self
            .modified_set
            .iter()
            .filter(|id| keep.contains(*id))
            .cloned()
            .collect();

        LineageGraph::from_parts(nodes, edges, modified_set)
    }

    fn walk<'a>(
        &self,
        seeds: impl IntoIterator<Item = &'a str>,
        direction: Direction,
        budget: Option<TraversalBudget>,
    ) -> Traversal {
        let adjacency = match direction {
            Direction::Upstream => &self.parents,
            Direction::Downstream => &self.children,
        };

        let mut visited: HashSet<NodeId> = HashSet::new();
        let mut queue: VecDeque<NodeId> = VecDeque::new();
        let seeds: HashSet<&str> = seeds.into_iter().collect();

        for seed in &seeds {
            if let Some(neighbors) = adjacency.get(*seed) {
                for neighbor in neighbors {
                    queue.push_back(neighbor.clone());
                }
            }
        }

        let mut budget_exceeded = false;

        while let Some(current) = queue.pop_front() {
            if visited.contains(&current) || seeds.contains(current.as_str()) {
                continue;
            }

            if let Some(limit) = budget {
                if visited.len() >= limit.max_visits {
                    budget_exceeded = true;
                    tracing::warn!(
                        visited = visited.len(),
                        max_visits = limit.max_visits,
                        "traversal budget exhausted, returning partial result"
                    );
                    break;
                }
            }

            visited.insert(current.clone());

            if let Some(neighbors) = adjacency.get(&current) {
                for neighbor in neighbors {
                    if !visited.contains(neighbor) {
                        queue.push_back(neighbor.clone());
                    }
                }
            }
        }

        let mut scope: HashSet<&str> = visited.iter().map(String::as_str).collect();
        scope.extend(seeds.iter().copied());
        let cycle_detected = scope_has_cycle(adjacency, &scope);
        if cycle_detected {
            tracing::warn!("cycle detected in node-level dependency data");
        }

        Traversal {
            nodes: visited,
            budget_exceeded,
            cycle_detected,
        }
    }
}

/// Iterative three-color DFS over the slice of `adjacency` induced by
/// `scope`; true when that slice contains a cycle.
fn scope_has_cycle(adjacency: &HashMap<NodeId, Vec<NodeId>>, scope: &HashSet<&str>) -> bool {
    const WHITE: u8 = 0;
    const GRAY: u8 = 1;
    const BLACK: u8 = 2;

    fn scoped_neighbors<'a>(
        adjacency: &'a HashMap<NodeId, Vec<NodeId>>,
        scope: &HashSet<&str>,
        id: &str,
    ) -> Vec<&'a str> {
        adjacency
            .get(id)
            .map(|neighbors| {
                neighbors
                    .iter()
                    .map(String::as_str)
                    .filter(|n| scope.contains(n))
                    .collect()
            })
            .unwrap_or_default()
    }

    let mut color: HashMap<&str, u8> = scope.iter().map(|id| (*id, WHITE)).collect();
    let mut starts: Vec<&str> = scope.iter().copied().collect();
    starts.sort_unstable();

    for start in starts {
        if color.get(start) != Some(&WHITE) {
            continue;
        }

        let mut stack: Vec<(&str, Vec<&str>, usize)> = Vec::new();
        color.insert(start, GRAY);
        stack.push((start, scoped_neighbors(adjacency, scope, start), 0));

        while let Some((node, neighbors, index)) = stack.pop() {
            if index < neighbors.len() {
                let next = neighbors[index];
                stack.push((node, neighbors.clone(), index + 1));

                match color.get(next).copied() {
                    Some(GRAY) => return true,
                    Some(WHITE) => {
                        color.insert(next, GRAY);
                        stack.push((next, scoped_neighbors(adjacency, scope, next), 0));
                    }
                    _ => {}
                }
            } else {
                color.insert(node, BLACK);
            }
        }
    }

    false
}
