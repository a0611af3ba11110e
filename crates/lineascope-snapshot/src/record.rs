//! Node and column records

use lineascope_core::{ContentHash, ResourceKind};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One node in a snapshot (model, source, metric, semantic model)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeRecord {
    /// Unique identifier, stable across snapshots for the same logical
    /// entity (e.g. "model.my_project.orders")
    pub id: String,

    /// Display name (e.g. "orders")
    pub name: String,

    /// Resource kind
    #[serde(default)]
    pub resource_kind: ResourceKind,

    /// Owning package
    #[serde(default)]
    pub package_name: String,

    /// Raw definition text, used only for content-based change detection
    #[serde(default)]
    pub raw_definition: Option<String>,

    /// Precomputed content hash; preferred over hashing raw_definition
    /// when its method matches the configured one
    #[serde(default)]
    pub content_hash: Option<ContentHash>,

    /// Column definitions keyed by column name
    #[serde(default)]
    pub columns: HashMap<String, ColumnRecord>,
}

impl NodeRecord {
    /// Stub record for an unresolved external reference
    pub fn stub(id: &str) -> Self {
        Self {
            id: id.to_string(),
            name: id.to_string(),
            resource_kind: ResourceKind::Unknown,
            package_name: String::new(),
            raw_definition: None,
            content_hash: None,
            columns: HashMap::new(),
        }
    }

    /// Structural projection used for content comparison when neither a
    /// trusted hash nor a raw definition is available: resource kind,
    /// package, and sorted (column name, declared type) pairs.
    pub fn structural_projection(&self) -> (ResourceKind, &str, Vec<(&str, Option<&str>)>) {
        let mut columns: Vec<(&str, Option<&str>)> = self
            .columns
            .values()
            .map(|c| (c.name.as_str(), c.declared_type.as_deref()))
            .collect();
        columns.sort();

        (self.resource_kind, self.package_name.as_str(), columns)
    }

    /// The record's content hash, if produced by the given method
    pub fn trusted_hash(&self, method: &str) -> Option<&str> {
        self.content_hash
            .as_ref()
            .filter(|h| h.method == method)
            .map(|h| h.digest.as_str())
    }
}

/// One column definition within a node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnRecord {
    /// Column name
    pub name: String,

    /// Declared data type, if any
    #[serde(default)]
    pub declared_type: Option<String>,

    /// Defining SQL expression for a derived column
    #[serde(default)]
    pub expression: Option<String>,

    /// Explicit upstream column mapping for a renamed column
    #[serde(default)]
    pub source_column: Option<String>,
}

impl ColumnRecord {
    /// Plain column with only a name and optional type
    pub fn new(name: &str, declared_type: Option<&str>) -> Self {
        Self {
            name: name.to_string(),
            declared_type: declared_type.map(String::from),
            expression: None,
            source_column: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn structural_projection_sorts_columns() {
        let mut record = NodeRecord::stub("model.test.orders");
        record.columns.insert(
            "total".to_string(),
            ColumnRecord::new("total", Some("numeric")),
        );
        record
            .columns
            .insert("id".to_string(), ColumnRecord::new("id", Some("int")));

        let (_, _, columns) = record.structural_projection();
        assert_eq!(columns, vec![("id", Some("int")), ("total", Some("numeric"))]);
    }

    #[test]
    fn trusted_hash_checks_method() {
        let mut record = NodeRecord::stub("model.test.a");
        record.content_hash = Some(ContentHash {
            method: "md5".to_string(),
            digest: "abc".to_string(),
        });

        assert_eq!(record.trusted_hash("md5"), Some("abc"));
        assert_eq!(record.trusted_hash("sha256"), None);
    }
}
