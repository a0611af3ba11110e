//! Lineascope engine - lineage diff core
//!
//! This crate implements the merged lineage graph and its queries:
//! - Graph builder (two-snapshot merge with change classification)
//! - Change classifier (node- and column-level)
//! - Column-level lineage sub-builder
//! - Traversal and impact queries

pub mod builder;
pub mod classify;
pub mod cll;
pub mod expr;
pub mod graph;

pub use builder::{build, BuildError};
pub use cll::{column_id, CllError, CllNode, ColumnLineageGraph};
pub use graph::{
    edge_id, LineageEdge, LineageGraph, MergedNode, Traversal, TraversalBudget,
};
