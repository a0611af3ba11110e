//! Column-level lineage (CLL) sub-builder
//!
//! Builds a second, finer-grained graph scoped to one selected column:
//! nodes are (table, column) pairs, edges are column-to-column data
//! flow. Parents are derived from each column's transformation kind,
//! never stored redundantly in the snapshot.

use crate::classify::classify_column;
use crate::expr::column_refs;
use crate::graph::LineageGraph;
use lineascope_core::{ChangeStatus, LineageFlag, Provenance, ResourceKind, TransformationKind};
use lineascope_snapshot::{ColumnRecord, NodeId, NodeRecord};
use serde::Serialize;
use std::collections::{BTreeSet, HashMap, HashSet, VecDeque};

/// Composite column id: `"{table_id}_{COLUMN_NAME}"`
pub type ColumnId = String;

/// Build the canonical composite id for a (table, column) pair
pub fn column_id(table_id: &str, column: &str) -> ColumnId {
    format!("{}_{}", table_id, column.to_uppercase())
}

/// One column node of the CLL graph
#[derive(Debug, Clone, Serialize)]
pub struct CllNode {
    /// Composite column id
    pub id: ColumnId,

    /// Owning table's node id
    pub table_id: NodeId,

    /// Column name
    pub name: String,

    /// Declared data type, if any
    pub declared_type: Option<String>,

    /// How this column's value is derived from its parents
    pub transformation: TransformationKind,

    /// Change classification across the snapshot pair
    pub change_status: ChangeStatus,
}

/// Column-level lineage graph, scoped to one selected column
#[derive(Debug, Clone, Serialize)]
pub struct ColumnLineageGraph {
    /// Composite id of the selected column
    pub selected: ColumnId,

    /// Column nodes keyed by composite id
    pub nodes: HashMap<ColumnId, CllNode>,

    /// Column id -> columns it is computed from
    pub parent_map: HashMap<ColumnId, BTreeSet<ColumnId>>,

    /// Column id -> columns computed from it
    pub child_map: HashMap<ColumnId, BTreeSet<ColumnId>>,

    /// Precision-loss conditions encountered during construction
    pub flags: Vec<LineageFlag>,
}

/// CLL construction errors
#[derive(Debug, thiserror::Error)]
pub enum CllError {
    #[error("column '{column}' not found on node '{table_id}' in either snapshot")]
    SelectionNotFound { table_id: String, column: String },
}

/// Which side of the snapshot pair a resolution runs against
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum View {
    Base,
    Current,
    Merged,
}

/// Outcome of deriving one column's parents
struct Resolution {
    kind: TransformationKind,
    /// Parent (table id, column name) pairs
    parents: BTreeSet<(NodeId, String)>,
    /// True when the parents were widened to a whole-table dependency
    unresolved: bool,
}

impl ColumnLineageGraph {
    /// Build column-level lineage seeded from `(table_id, column_name)`,
    /// walking both directions with iterative BFS.
    ///
    /// A cycle in the resulting parent graph is flagged, not an error:
    /// the visited sets bound the walk, and the consumer is told the
    /// lineage for this selection is unreliable.
    pub fn build(
        graph: &LineageGraph,
        table_id: &str,
        column_name: &str,
    ) -> Result<Self, CllError> {
        let seed_name = canonical_column_name(graph, table_id, column_name).ok_or_else(|| {
            CllError::SelectionNotFound {
                table_id: table_id.to_string(),
                column: column_name.to_string(),
            }
        })?;

        let mut cll = Self {
            selected: column_id(table_id, &seed_name),
            nodes: HashMap::new(),
            parent_map: HashMap::new(),
            child_map: HashMap::new(),
            flags: Vec::new(),
        };

        cll.walk_ancestors(graph, table_id, &seed_name);
        cll.walk_descendants(graph, table_id, &seed_name);

        if let Some(at) = cll.find_cycle() {
            tracing::warn!(column = %at, "cycle detected in column-level parent graph");
            cll.flags.push(LineageFlag::CycleDetected { at });
        }

        tracing::debug!(
            selected = %cll.selected,
            nodes = cll.nodes.len(),
            flags = cll.flags.len(),
            "column lineage built"
        );

        Ok(cll)
    }

    /// All column ids upstream of `id` in this scoped graph
    pub fn ancestors(&self, id: &str) -> HashSet<ColumnId> {
        self.walk_scoped(id, &self.parent_map)
    }

    /// All column ids downstream of `id` in this scoped graph
    pub fn descendants(&self, id: &str) -> HashSet<ColumnId> {
        self.walk_scoped(id, &self.child_map)
    }

    fn walk_scoped(
        &self,
        id: &str,
        adjacency: &HashMap<ColumnId, BTreeSet<ColumnId>>,
    ) -> HashSet<ColumnId> {
        let mut visited: HashSet<ColumnId> = HashSet::new();
        let mut queue: VecDeque<ColumnId> = adjacency
            .get(id)
            .map(|set| set.iter().cloned().collect())
            .unwrap_or_default();

        while let Some(current) = queue.pop_front() {
            if current == id || !visited.insert(current.clone()) {
                continue;
            }
            if let Some(next) = adjacency.get(&current) {
                for neighbor in next {
                    if !visited.contains(neighbor) {
                        queue.push_back(neighbor.clone());
                    }
                }
            }
        }

        visited
    }

    /// BFS upward from the seed, materializing each visited column and
    /// its parent edges.
    fn walk_ancestors(&mut self, graph: &LineageGraph, table_id: &str, column: &str) {
        let mut queue: VecDeque<(NodeId, String)> =
            VecDeque::from([(table_id.to_string(), column.to_string())]);
        let mut visited: HashSet<ColumnId> = HashSet::new();

        while let Some((table, name)) = queue.pop_front() {
            let id = column_id(&table, &name);
            if !visited.insert(id.clone()) {
                continue;
            }

            let Some(resolution) = self.materialize(graph, &table, &name) else {
                continue;
            };

            for (parent_table, parent_name) in &resolution.parents {
                let parent_id = column_id(parent_table, parent_name);
                self.parent_map
                    .entry(id.clone())
                    .or_default()
                    .insert(parent_id.clone());
                self.child_map
                    .entry(parent_id.clone())
                    .or_default()
                    .insert(id.clone());

                if !visited.contains(&parent_id) {
                    queue.push_back((parent_table.clone(), parent_name.clone()));
                }
            }
        }
    }

    /// BFS downward from the seed: a column of a downstream table is a
    /// child when its own derived parent set contains the current column.
    fn walk_descendants(&mut self, graph: &LineageGraph, table_id: &str, column: &str) {
        let mut queue: VecDeque<(NodeId, String)> =
            VecDeque::from([(table_id.to_string(), column.to_string())]);
        let mut visited: HashSet<ColumnId> = HashSet::new();

        while let Some((table, name)) = queue.pop_front() {
            let id = column_id(&table, &name);
            if !visited.insert(id.clone()) {
                continue;
            }

            for child_table in graph.children(&table) {
                let Some(child_record) = graph.get_node(child_table).and_then(|n| n.record())
                else {
                    continue;
                };

                let mut child_columns: Vec<&ColumnRecord> = child_record.columns.values().collect();
                child_columns.sort_by(|a, b| a.name.cmp(&b.name));

                for child_column in child_columns {
                    let resolution =
                        resolve_parents(graph, child_table, child_record, child_column, View::Merged);

                    let feeds_child = resolution
                        .parents
                        .iter()
                        .any(|(t, c)| column_id(t, c) == id);
                    if !feeds_child {
                        continue;
                    }

                    let child_id = column_id(child_table, &child_column.name);
                    if self.materialize(graph, child_table, &child_column.name).is_some() {
                        self.parent_map
                            .entry(child_id.clone())
                            .or_default()
                            .insert(id.clone());
                        self.child_map
                            .entry(id.clone())
                            .or_default()
                            .insert(child_id.clone());

                        if !visited.contains(&child_id) {
                            queue.push_back((child_table.clone(), child_column.name.clone()));
                        }
                    }
                }
            }
        }
    }

    /// Create the CLL node for a column on first visit, classifying it
    /// against both snapshot sides. Returns the merged resolution, or
    /// `None` when the column exists on neither side.
    fn materialize(
        &mut self,
        graph: &LineageGraph,
        table: &str,
        name: &str,
    ) -> Option<Resolution> {
        let node = graph.get_node(table)?;
        let record = node.record()?;
        let column = find_column(record, name)?;

        let resolution = resolve_parents(graph, table, record, column, View::Merged);
        let id = column_id(table, name);

        if self.nodes.contains_key(&id) {
            return Some(resolution);
        }

        let base_column = node.base.as_ref().and_then(|r| find_column(r, name));
        let current_column = node.current.as_ref().and_then(|r| find_column(r, name));

        let base_parents = side_parent_ids(graph, table, node.base.as_ref(), base_column, View::Base);
        let current_parents =
            side_parent_ids(graph, table, node.current.as_ref(), current_column, View::Current);

        let change_status = classify_column(base_column, current_column, &base_parents, &current_parents)
            .unwrap_or(ChangeStatus::Unchanged);

        if resolution.unresolved {
            self.flags
                .push(LineageFlag::UnresolvableDerivedExpression { column: id.clone() });
        }

        self.nodes.insert(
            id.clone(),
            CllNode {
                id,
                table_id: table.to_string(),
                name: column.name.clone(),
                declared_type: column.declared_type.clone(),
                transformation: resolution.kind,
                change_status,
            },
        );

        Some(resolution)
    }

    /// Iterative three-color DFS over the scoped parent map; returns a
    /// column on a cycle, if any.
    fn find_cycle(&self) -> Option<ColumnId> {
        const WHITE: u8 = 0;
        const GRAY: u8 = 1;
        const BLACK: u8 = 2;

        let mut color: HashMap<&ColumnId, u8> =
            self.nodes.keys().map(|id| (id, WHITE)).collect();

        let mut starts: Vec<&ColumnId> = self.nodes.keys().collect();
        starts.sort();

        for start in starts {
            if color.get(start) != Some(&WHITE) {
                continue;
            }

            let mut stack: Vec<(&ColumnId, Vec<&ColumnId>, usize)> = Vec::new();
            color.insert(start, GRAY);
            stack.push((start, self.sorted_parents(start), 0));

            while let Some((node, parents, index)) = stack.pop() {
                if index < parents.len() {
                    let parent = parents[index];
                    stack.push((node, parents.clone(), index + 1));

                    match color.get(parent).copied() {
                        Some(GRAY) => return Some(parent.clone()),
                        Some(WHITE) => {
                            color.insert(parent, GRAY);
                            stack.push((parent, self.sorted_parents(parent), 0));
                        }
                        _ => {}
                    }
                } else {
                    color.insert(node, BLACK);
                }
            }
        }

        None
    }

    fn sorted_parents(&self, id: &ColumnId) -> Vec<&ColumnId> {
        self.parent_map
            .get(id)
            .map(|set| set.iter().collect())
            .unwrap_or_default()
    }
}

/// The canonical name of a column on a merged node, looked up
/// case-insensitively across both snapshot sides
fn canonical_column_name(graph: &LineageGraph, table_id: &str, column: &str) -> Option<String> {
    let node = graph.get_node(table_id)?;

    node.current
        .as_ref()
        .and_then(|r| find_column(r, column))
        .or_else(|| node.base.as_ref().and_then(|r| find_column(r, column)))
        .map(|c| c.name.clone())
}

fn find_column<'a>(record: &'a NodeRecord, name: &str) -> Option<&'a ColumnRecord> {
    record.columns.get(name).or_else(|| {
        record
            .columns
            .values()
            .find(|c| c.name.eq_ignore_ascii_case(name))
    })
}

/// A column's resolved parent set on one snapshot side, as composite ids
fn side_parent_ids(
    graph: &LineageGraph,
    table: &str,
    record: Option<&NodeRecord>,
    column: Option<&ColumnRecord>,
    view: View,
) -> BTreeSet<ColumnId> {
    match (record, column) {
        (Some(record), Some(column)) => resolve_parents(graph, table, record, column, view)
            .parents
            .iter()
            .map(|(t, c)| column_id(t, c))
            .collect(),
        _ => BTreeSet::new(),
    }
}

/// Derive a column's transformation kind and parent columns.
///
/// - source tables (and tables with no upstream at all) yield `source`
///   columns with no parents
/// - an explicit `source_column` mapping yields `renamed`
/// - a defining expression yields `derived`, with parents statically
///   extracted from the expression
/// - otherwise the column is a `passthrough` of a same-named upstream
///   column
///
/// Whenever the specific parents cannot be determined, the column falls
/// back to depending on every column of each direct upstream table.
fn resolve_parents(
    graph: &LineageGraph,
    table: &str,
    record: &NodeRecord,
    column: &ColumnRecord,
    view: View,
) -> Resolution {
    let upstreams = upstream_tables(graph, table, view);

    if record.resource_kind == ResourceKind::Source || upstreams.is_empty() {
        return Resolution {
            kind: TransformationKind::Source,
            parents: BTreeSet::new(),
            unresolved: false,
        };
    }

    if let Some(mapped) = &column.source_column {
        let parents = columns_named(graph, &upstreams, mapped, view);
        return widen_if_empty(graph, &upstreams, view, TransformationKind::Renamed, parents);
    }

    if let Some(expression) = &column.expression {
        let parents = match column_refs(expression) {
            Some(refs) => {
                let mut parents = BTreeSet::new();
                for reference in refs {
                    match &reference.table {
                        Some(qualifier) => {
                            for upstream in &upstreams {
                                if table_matches(graph, upstream, qualifier, view) {
                                    if let Some(name) =
                                        upstream_column(graph, upstream, &reference.column, view)
                                    {
                                        parents.insert((upstream.clone(), name));
                                    }
                                }
                            }
                        }
                        None => {
                            for upstream in &upstreams {
                                if let Some(name) =
                                    upstream_column(graph, upstream, &reference.column, view)
                                {
                                    parents.insert((upstream.clone(), name));
                                }
                            }
                        }
                    }
                }
                parents
            }
            None => BTreeSet::new(),
        };

        return widen_if_empty(graph, &upstreams, view, TransformationKind::Derived, parents);
    }

    let parents = columns_named(graph, &upstreams, &column.name, view);
    widen_if_empty(graph, &upstreams, view, TransformationKind::Passthrough, parents)
}

/// Replace an empty parent set with a whole-table dependency on every
/// direct upstream table, marking the resolution unresolved
fn widen_if_empty(
    graph: &LineageGraph,
    upstreams: &[NodeId],
    view: View,
    kind: TransformationKind,
    parents: BTreeSet<(NodeId, String)>,
) -> Resolution {
    if !parents.is_empty() {
        return Resolution {
            kind,
            parents,
            unresolved: false,
        };
    }

    let mut widened = BTreeSet::new();
    for upstream in upstreams {
        if let Some(record) = record_for(graph, upstream, view) {
            for column in record.columns.values() {
                widened.insert((upstream.clone(), column.name.clone()));
            }
        }
    }

    Resolution {
        kind,
        parents: widened,
        unresolved: true,
    }
}

/// Upstream tables of a node, restricted to one side of the pair
fn upstream_tables(graph: &LineageGraph, table: &str, view: View) -> Vec<NodeId> {
    match view {
        View::Merged => graph.parents(table).to_vec(),
        View::Base => graph
            .parents_on(table, Provenance::Base)
            .into_iter()
            .cloned()
            .collect(),
        View::Current => graph
            .parents_on(table, Provenance::Current)
            .into_iter()
            .cloned()
            .collect(),
    }
}

fn record_for<'a>(graph: &'a LineageGraph, table: &str, view: View) -> Option<&'a NodeRecord> {
    let node = graph.get_node(table)?;
    match view {
        View::Merged => node.record(),
        View::Base => node.base.as_ref(),
        View::Current => node.current.as_ref(),
    }
}

/// (upstream table, column name) pairs for every upstream table that
/// declares a column with the given name
fn columns_named(
    graph: &LineageGraph,
    upstreams: &[NodeId],
    name: &str,
    view: View,
) -> BTreeSet<(NodeId, String)> {
    let mut parents = BTreeSet::new();
    for upstream in upstreams {
        if let Some(found) = upstream_column(graph, upstream, name, view) {
            parents.insert((upstream.clone(), found));
        }
    }
    parents
}

fn upstream_column(
    graph: &LineageGraph,
    upstream: &str,
    name: &str,
    view: View,
) -> Option<String> {
    record_for(graph, upstream, view)
        .and_then(|record| find_column(record, name))
        .map(|column| column.name.clone())
}

/// Does `qualifier` (a table name or alias from an expression) refer to
/// this upstream node?
fn table_matches(graph: &LineageGraph, upstream: &str, qualifier: &str, view: View) -> bool {
    if upstream.eq_ignore_ascii_case(qualifier) {
        return true;
    }
    record_for(graph, upstream, view)
        .map(|record| record.name.eq_ignore_ascii_case(qualifier))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::build;
    use lineascope_core::Config;
    use lineascope_snapshot::Snapshot;

    struct TestColumn {
        name: &'static str,
        declared_type: Option<&'static str>,
        expression: Option<&'static str>,
        source_column: Option<&'static str>,
    }

    fn col(name: &'static str, declared_type: Option<&'static str>) -> TestColumn {
        TestColumn {
            name,
            declared_type,
            expression: None,
            source_column: None,
        }
    }

    fn derived(name: &'static str, expression: &'static str) -> TestColumn {
        TestColumn {
            name,
            declared_type: None,
            expression: Some(expression),
            source_column: None,
        }
    }

    fn renamed(name: &'static str, source_column: &'static str) -> TestColumn {
        TestColumn {
            name,
            declared_type: None,
            expression: None,
            source_column: Some(source_column),
        }
    }

    fn create_test_snapshot(
        tables: Vec<(&str, ResourceKind, Vec<TestColumn>, Vec<&str>)>,
    ) -> Snapshot {
        let mut snapshot = Snapshot::new();

        for (id, kind, columns, parents) in tables {
            let mut record = NodeRecord::stub(id);
            record.name = id.rsplit('.').next().unwrap_or(id).to_string();
            record.resource_kind = kind;

            for column in columns {
                record.columns.insert(
                    column.name.to_string(),
                    ColumnRecord {
                        name: column.name.to_string(),
                        declared_type: column.declared_type.map(String::from),
                        expression: column.expression.map(String::from),
                        source_column: column.source_column.map(String::from),
                    },
                );
            }

            snapshot.nodes.insert(id.to_string(), record);
            if !parents.is_empty() {
                snapshot.parent_map.insert(
                    id.to_string(),
                    parents.into_iter().map(String::from).collect(),
                );
            }
        }

        snapshot
    }

    /// raw.orders (source) -> stg.orders (passthrough/derived) -> mart.revenue
    fn create_pipeline() -> Snapshot {
        create_test_snapshot(vec![
            (
                "source.demo.raw.orders",
                ResourceKind::Source,
                vec![col("id", Some("int")), col("amount", Some("numeric"))],
                vec![],
            ),
            (
                "model.demo.orders",
                ResourceKind::Model,
                vec![
                    col("id", Some("int")),
                    col("amount", Some("numeric")),
                    derived("total", "amount * 100"),
                ],
                vec!["source.demo.raw.orders"],
            ),
            (
                "model.demo.revenue",
                ResourceKind::Model,
                vec![derived("revenue", "sum(total)")],
                vec!["model.demo.orders"],
            ),
        ])
    }

    #[test]
    fn passthrough_lineage_reaches_source_columns() {
        let snapshot = create_pipeline();
        let graph = build(&snapshot, &snapshot, &Config::default()).unwrap();

        let cll = ColumnLineageGraph::build(&graph, "model.demo.orders", "amount").unwrap();

        let source_col = column_id("source.demo.raw.orders", "amount");
        let ancestors = cll.ancestors(&cll.selected);
        assert!(ancestors.contains(&source_col));

        assert_eq!(
            cll.nodes[&source_col].transformation,
            TransformationKind::Source
        );
        assert_eq!(
            cll.nodes[&cll.selected].transformation,
            TransformationKind::Passthrough
        );

        // Source columns have no parents
        assert!(cll.parent_map.get(&source_col).is_none());
    }

    #[test]
    fn derived_lineage_follows_expression_references() {
        let snapshot = create_pipeline();
        let graph = build(&snapshot, &snapshot, &Config::default()).unwrap();

        let cll = ColumnLineageGraph::build(&graph, "model.demo.orders", "total").unwrap();

        let selected = cll.selected.clone();
        assert_eq!(cll.nodes[&selected].transformation, TransformationKind::Derived);

        let parents = &cll.parent_map[&selected];
        assert_eq!(parents.len(), 1);
        assert!(parents.contains(&column_id("source.demo.raw.orders", "amount")));
        assert!(cll.flags.is_empty());
    }

    #[test]
    fn descendants_cross_tables() {
        let snapshot = create_pipeline();
        let graph = build(&snapshot, &snapshot, &Config::default()).unwrap();

        let cll =
            ColumnLineageGraph::build(&graph, "source.demo.raw.orders", "amount").unwrap();

        let descendants = cll.descendants(&cll.selected);
        assert!(descendants.contains(&column_id("model.demo.orders", "amount")));
        assert!(descendants.contains(&column_id("model.demo.orders", "total")));
        assert!(descendants.contains(&column_id("model.demo.revenue", "revenue")));
    }

    #[test]
    fn renamed_column_follows_explicit_mapping() {
        let snapshot = create_test_snapshot(vec![
            (
                "source.demo.raw.users",
                ResourceKind::Source,
                vec![col("user_key", Some("int"))],
                vec![],
            ),
            (
                "model.demo.users",
                ResourceKind::Model,
                vec![renamed("user_id", "user_key")],
                vec!["source.demo.raw.users"],
            ),
        ]);
        let graph = build(&snapshot, &snapshot, &Config::default()).unwrap();

        let cll = ColumnLineageGraph::build(&graph, "model.demo.users", "user_id").unwrap();

        assert_eq!(
            cll.nodes[&cll.selected].transformation,
            TransformationKind::Renamed
        );
        assert!(cll.parent_map[&cll.selected]
            .contains(&column_id("source.demo.raw.users", "user_key")));
    }

    #[test]
    fn unresolvable_expression_widens_to_whole_table() {
        let snapshot = create_test_snapshot(vec![
            (
                "source.demo.raw.orders",
                ResourceKind::Source,
                vec![col("id", Some("int")), col("amount", Some("numeric"))],
                vec![],
            ),
            (
                "model.demo.orders",
                ResourceKind::Model,
                // Jinja leaks into the expression; not parseable SQL
                vec![derived("total", "{{ var('rate') }} * amount")],
                vec!["source.demo.raw.orders"],
            ),
        ]);
        let graph = build(&snapshot, &snapshot, &Config::default()).unwrap();

        let cll = ColumnLineageGraph::build(&graph, "model.demo.orders", "total").unwrap();

        let selected = cll.selected.clone();
        assert!(cll
            .flags
            .iter()
            .any(|f| matches!(f, LineageFlag::UnresolvableDerivedExpression { column } if *column == selected)));

        // Whole-table fallback: every upstream column is a parent, so
        // ancestors still reach the source-kind columns
        let ancestors = cll.ancestors(&selected);
        assert!(ancestors.contains(&column_id("source.demo.raw.orders", "id")));
        assert!(ancestors.contains(&column_id("source.demo.raw.orders", "amount")));
        assert_eq!(
            cll.nodes[&column_id("source.demo.raw.orders", "id")].transformation,
            TransformationKind::Source
        );
    }

    #[test]
    fn cycle_is_flagged_not_hung() {
        let snapshot = create_test_snapshot(vec![
            (
                "model.demo.a",
                ResourceKind::Model,
                vec![derived("col1", "b.col2")],
                vec!["model.demo.b"],
            ),
            (
                "model.demo.b",
                ResourceKind::Model,
                vec![derived("col2", "a.col1")],
                vec!["model.demo.a"],
            ),
        ]);
        let graph = build(&snapshot, &snapshot, &Config::default()).unwrap();

        let cll = ColumnLineageGraph::build(&graph, "model.demo.a", "col1").unwrap();

        assert!(cll
            .flags
            .iter()
            .any(|f| matches!(f, LineageFlag::CycleDetected { .. })));

        // Both columns are present and the walk terminated
        assert!(cll.nodes.contains_key(&column_id("model.demo.a", "col1")));
        assert!(cll.nodes.contains_key(&column_id("model.demo.b", "col2")));
    }

    #[test]
    fn column_change_status_is_classified() {
        let base = create_test_snapshot(vec![(
            "model.demo.orders",
            ResourceKind::Model,
            vec![col("amount", Some("numeric"))],
            vec![],
        )]);
        let current = create_test_snapshot(vec![(
            "model.demo.orders",
            ResourceKind::Model,
            vec![col("amount", Some("bigint")), col("fresh", Some("int"))],
            vec![],
        )]);
        let graph = build(&base, &current, &Config::default()).unwrap();

        let cll = ColumnLineageGraph::build(&graph, "model.demo.orders", "amount").unwrap();
        assert_eq!(
            cll.nodes[&cll.selected].change_status,
            ChangeStatus::Modified
        );

        let cll = ColumnLineageGraph::build(&graph, "model.demo.orders", "fresh").unwrap();
        assert_eq!(cll.nodes[&cll.selected].change_status, ChangeStatus::Added);
    }

    #[test]
    fn unknown_selection_is_an_error() {
        let snapshot = create_pipeline();
        let graph = build(&snapshot, &snapshot, &Config::default()).unwrap();

        let err = ColumnLineageGraph::build(&graph, "model.demo.orders", "nope").unwrap_err();
        match err {
            CllError::SelectionNotFound { table_id, column } => {
                assert_eq!(table_id, "model.demo.orders");
                assert_eq!(column, "nope");
            }
        }

        assert!(ColumnLineageGraph::build(&graph, "model.demo.ghost", "id").is_err());
    }
}
