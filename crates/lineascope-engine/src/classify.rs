//! Change classification for nodes and columns
//!
//! Node classification runs eagerly during the graph build, so every
//! merged node carries a definite status. Column classification runs
//! lazily, only while column-level lineage is constructed.

use lineascope_core::{digest_sha256, ChangeStatus, Config, Provenance};
use lineascope_snapshot::{ColumnRecord, NodeRecord};
use std::collections::BTreeSet;

/// Classify a node from its presence and content on each side.
/// Returns `None` only when the node is present on neither side.
pub fn classify_node(
    base: Option<&NodeRecord>,
    current: Option<&NodeRecord>,
    config: &Config,
) -> Option<(Provenance, ChangeStatus)> {
    match (base, current) {
        (Some(base), Some(current)) => {
            let status = if records_equal(base, current, config) {
                ChangeStatus::Unchanged
            } else {
                ChangeStatus::Modified
            };
            Some((Provenance::Both, status))
        }
        (Some(_), None) => Some((Provenance::Base, ChangeStatus::Removed)),
        (None, Some(_)) => Some((Provenance::Current, ChangeStatus::Added)),
        (None, None) => None,
    }
}

/// Content equality between two records of the same id.
///
/// Comparison precedence:
/// 1. both carry a hash produced by the configured method: compare digests
/// 2. both carry a raw definition: compare byte-for-byte
/// 3. one carries a trusted sha256 hash, the other a raw definition, and
///    the configured method is sha256: digest the raw side and compare
/// 4. otherwise: compare the structural projection
pub fn records_equal(base: &NodeRecord, current: &NodeRecord, config: &Config) -> bool {
    let method = config.hash_method.as_str();

    match (base.trusted_hash(method), current.trusted_hash(method)) {
        (Some(base_hash), Some(current_hash)) => return base_hash == current_hash,
        (Some(hash), None) if method == "sha256" => {
            if let Some(raw) = &current.raw_definition {
                return hash == digest_sha256(raw);
            }
        }
        (None, Some(hash)) if method == "sha256" => {
            if let Some(raw) = &base.raw_definition {
                return hash == digest_sha256(raw);
            }
        }
        _ => {}
    }

    if let (Some(base_raw), Some(current_raw)) = (&base.raw_definition, &current.raw_definition) {
        return base_raw == current_raw;
    }

    base.structural_projection() == current.structural_projection()
}

/// Classify a column from its presence, declared type, and resolved
/// upstream dependency set on each side.
/// Returns `None` only when the column is present on neither side.
pub fn classify_column(
    base: Option<&ColumnRecord>,
    current: Option<&ColumnRecord>,
    base_parents: &BTreeSet<String>,
    current_parents: &BTreeSet<String>,
) -> Option<ChangeStatus> {
    match (base, current) {
        (Some(base), Some(current)) => {
            let unchanged =
                base.declared_type == current.declared_type && base_parents == current_parents;
            Some(if unchanged {
                ChangeStatus::Unchanged
            } else {
                ChangeStatus::Modified
            })
        }
        (Some(_), None) => Some(ChangeStatus::Removed),
        (None, Some(_)) => Some(ChangeStatus::Added),
        (None, None) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lineascope_core::ContentHash;

    fn record_with_raw(id: &str, raw: &str) -> NodeRecord {
        let mut record = NodeRecord::stub(id);
        record.raw_definition = Some(raw.to_string());
        record
    }

    #[test]
    fn identical_raw_definitions_are_unchanged() {
        let base = record_with_raw("model.test.a", "select 1");
        let current = record_with_raw("model.test.a", "select 1");

        let (provenance, status) =
            classify_node(Some(&base), Some(&current), &Config::default()).unwrap();
        assert_eq!(provenance, Provenance::Both);
        assert_eq!(status, ChangeStatus::Unchanged);
    }

    #[test]
    fn differing_raw_definitions_are_modified() {
        let base = record_with_raw("model.test.a", "select 1");
        let current = record_with_raw("model.test.a", "select 2");

        let (_, status) = classify_node(Some(&base), Some(&current), &Config::default()).unwrap();
        assert_eq!(status, ChangeStatus::Modified);
    }

    #[test]
    fn presence_based_classification() {
        let record = record_with_raw("model.test.a", "select 1");

        let (provenance, status) =
            classify_node(Some(&record), None, &Config::default()).unwrap();
        assert_eq!(provenance, Provenance::Base);
        assert_eq!(status, ChangeStatus::Removed);

        let (provenance, status) =
            classify_node(None, Some(&record), &Config::default()).unwrap();
        assert_eq!(provenance, Provenance::Current);
        assert_eq!(status, ChangeStatus::Added);

        assert!(classify_node(None, None, &Config::default()).is_none());
    }

    #[test]
    fn trusted_hash_wins_over_raw_definition() {
        // Hashes agree even though the raw text differs (e.g. only
        // whitespace was reformatted and the tool hashed normalized SQL)
        let mut base = record_with_raw("model.test.a", "select 1");
        let mut current = record_with_raw("model.test.a", "select  1");
        base.content_hash = Some(ContentHash {
            method: "sha256".to_string(),
            digest: "same".to_string(),
        });
        current.content_hash = Some(ContentHash {
            method: "sha256".to_string(),
            digest: "same".to_string(),
        });

        assert!(records_equal(&base, &current, &Config::default()));
    }

    #[test]
    fn untrusted_hash_method_falls_back_to_raw() {
        let mut base = record_with_raw("model.test.a", "select 1");
        let mut current = record_with_raw("model.test.a", "select 1");
        base.content_hash = Some(ContentHash {
            method: "md5".to_string(),
            digest: "aaa".to_string(),
        });
        current.content_hash = Some(ContentHash {
            method: "md5".to_string(),
            digest: "bbb".to_string(),
        });

        // md5 digests differ but are not trusted under sha256 config;
        // identical raw definitions decide
        assert!(records_equal(&base, &current, &Config::default()));
    }

    #[test]
    fn mixed_hash_and_raw_bridges_via_sha256() {
        let raw = "select * from users";
        let mut base = NodeRecord::stub("model.test.a");
        base.content_hash = Some(ContentHash::sha256_of(raw));
        let current = record_with_raw("model.test.a", raw);

        assert!(records_equal(&base, &current, &Config::default()));
    }

    #[test]
    fn structural_projection_comparison_when_contentless() {
        let mut base = NodeRecord::stub("model.test.a");
        let mut current = NodeRecord::stub("model.test.a");
        base.columns
            .insert("id".to_string(), ColumnRecord::new("id", Some("int")));
        current
            .columns
            .insert("id".to_string(), ColumnRecord::new("id", Some("text")));

        assert!(!records_equal(&base, &current, &Config::default()));

        current
            .columns
            .insert("id".to_string(), ColumnRecord::new("id", Some("int")));
        assert!(records_equal(&base, &current, &Config::default()));
    }

    #[test]
    fn column_classification() {
        let base_col = ColumnRecord::new("total", Some("numeric"));
        let current_col = ColumnRecord::new("total", Some("numeric"));
        let parents: BTreeSet<String> = BTreeSet::from(["orders_AMOUNT".to_string()]);

        assert_eq!(
            classify_column(Some(&base_col), Some(&current_col), &parents, &parents),
            Some(ChangeStatus::Unchanged)
        );

        let widened = ColumnRecord::new("total", Some("bigint"));
        assert_eq!(
            classify_column(Some(&base_col), Some(&widened), &parents, &parents),
            Some(ChangeStatus::Modified)
        );

        let other_parents: BTreeSet<String> = BTreeSet::from(["orders_PRICE".to_string()]);
        assert_eq!(
            classify_column(Some(&base_col), Some(&current_col), &parents, &other_parents),
            Some(ChangeStatus::Modified)
        );

        assert_eq!(
            classify_column(Some(&base_col), None, &parents, &BTreeSet::new()),
            Some(ChangeStatus::Removed)
        );
        assert_eq!(
            classify_column(None, Some(&current_col), &BTreeSet::new(), &parents),
            Some(ChangeStatus::Added)
        );
    }
}
