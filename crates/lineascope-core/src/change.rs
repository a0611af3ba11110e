//! Change taxonomy and lineage flags
//!
//! IMPORTANT: these names are serialized into reports consumed by
//! external renderers. Do NOT rename variants - only add new ones.

use serde::{Deserialize, Serialize};

/// Four-way change classification for a node or column across the
/// base/current snapshot pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeStatus {
    /// Present only in the current snapshot
    Added,

    /// Present only in the base snapshot
    Removed,

    /// Present in both snapshots with differing content
    Modified,

    /// Present in both snapshots with identical content
    Unchanged,
}

impl ChangeStatus {
    /// Stable string identifier
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Added => "added",
            Self::Removed => "removed",
            Self::Modified => "modified",
            Self::Unchanged => "unchanged",
        }
    }
}

impl std::fmt::Display for ChangeStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Which snapshot(s) a merged node or edge came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provenance {
    /// Only the base snapshot
    Base,

    /// Only the current snapshot
    Current,

    /// Both snapshots, identically keyed
    Both,
}

impl Provenance {
    /// Derive provenance from presence on each side
    pub fn from_presence(in_base: bool, in_current: bool) -> Option<Self> {
        match (in_base, in_current) {
            (true, true) => Some(Self::Both),
            (true, false) => Some(Self::Base),
            (false, true) => Some(Self::Current),
            (false, false) => None,
        }
    }
}

impl std::fmt::Display for Provenance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Base => write!(f, "base"),
            Self::Current => write!(f, "current"),
            Self::Both => write!(f, "both"),
        }
    }
}

/// Resource kind of a snapshot node
///
/// Closed variant set with an explicit `Unknown` fallback for forward
/// compatibility; engine logic is identical across kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    /// A transformation model
    Model,

    /// A raw source table
    Source,

    /// A metric definition
    Metric,

    /// A semantic model
    SemanticModel,

    /// Unrecognized kind (also used for stub nodes)
    #[serde(other)]
    Unknown,
}

impl Default for ResourceKind {
    fn default() -> Self {
        Self::Unknown
    }
}

impl std::fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Model => write!(f, "model"),
            Self::Source => write!(f, "source"),
            Self::Metric => write!(f, "metric"),
            Self::SemanticModel => write!(f, "semantic_model"),
            Self::Unknown => write!(f, "unknown"),
        }
    }
}

/// How a column's value is derived from its parents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransformationKind {
    /// Originates in a source table; has no parents
    Source,

    /// Copied from an explicitly mapped upstream column
    Renamed,

    /// Copied unchanged from a same-named upstream column
    Passthrough,

    /// Computed by an expression over upstream columns
    Derived,
}

impl std::fmt::Display for TransformationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Source => write!(f, "source"),
            Self::Renamed => write!(f, "renamed"),
            Self::Passthrough => write!(f, "passthrough"),
            Self::Derived => write!(f, "derived"),
        }
    }
}

/// Recoverable precision-loss conditions attached to query results
///
/// These degrade a specific answer without failing the operation;
/// consumers surface them as warnings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "flag", rename_all = "snake_case")]
pub enum LineageFlag {
    /// The column-level parent graph contains a cycle; lineage for this
    /// selection is unreliable
    CycleDetected {
        /// Composite column id where the cycle was observed
        at: String,
    },

    /// A derived column's expression could not be statically resolved;
    /// its parents were widened to a whole-table dependency
    UnresolvableDerivedExpression {
        /// Composite column id of the affected column
        column: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provenance_from_presence() {
        assert_eq!(Provenance::from_presence(true, true), Some(Provenance::Both));
        assert_eq!(Provenance::from_presence(true, false), Some(Provenance::Base));
        assert_eq!(Provenance::from_presence(false, true), Some(Provenance::Current));
        assert_eq!(Provenance::from_presence(false, false), None);
    }

    #[test]
    fn resource_kind_unknown_fallback() {
        let kind: ResourceKind = serde_json::from_str("\"exposure\"").unwrap();
        assert_eq!(kind, ResourceKind::Unknown);

        let kind: ResourceKind = serde_json::from_str("\"semantic_model\"").unwrap();
        assert_eq!(kind, ResourceKind::SemanticModel);
    }

    #[test]
    fn change_status_serialization() {
        let json = serde_json::to_string(&ChangeStatus::Modified).unwrap();
        assert_eq!(json, "\"modified\"");
        assert_eq!(ChangeStatus::Added.as_str(), "added");
    }
}
