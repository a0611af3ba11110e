//! Build configuration (lineascope.toml)

use serde::{Deserialize, Serialize};

/// Engine configuration passed at build time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Which content-hash method to trust when comparing node records.
    /// Records whose hash was produced by a different method fall back
    /// to raw-definition comparison.
    #[serde(default = "default_hash_method")]
    pub hash_method: String,

    /// Whether dangling parent references become stub nodes with
    /// `resource_kind = unknown` instead of failing the build
    #[serde(default)]
    pub stub_unresolved_refs: bool,

    /// Default node-visit budget for traversals; `None` means unbounded
    #[serde(default)]
    pub traversal_budget: Option<usize>,
}

fn default_hash_method() -> String {
    "sha256".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            hash_method: default_hash_method(),
            stub_unresolved_refs: false,
            traversal_budget: None,
        }
    }
}

impl Config {
    /// Load config from a TOML file
    pub fn from_file(path: &std::path::Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::IoError(path.display().to_string(), e.to_string()))?;

        Self::from_toml(&contents)
    }

    /// Load config from a TOML string
    pub fn from_toml(toml: &str) -> Result<Self, ConfigError> {
        toml::from_str(toml).map_err(|e| ConfigError::ParseError(e.to_string()))
    }
}

/// Config error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {0}: {1}")]
    IoError(String, String),

    #[error("Failed to parse config TOML: {0}")]
    ParseError(String),
}
