//! Content hashing for change detection

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// A named content hash carried by a node record
///
/// The `method` names the algorithm that produced the digest; a build
/// only trusts hashes whose method matches the configured one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentHash {
    /// Hash algorithm name (e.g. "sha256")
    pub method: String,

    /// Hex-encoded digest
    pub digest: String,
}

impl ContentHash {
    /// Hash a raw definition with sha256
    pub fn sha256_of(definition: &str) -> Self {
        Self {
            method: "sha256".to_string(),
            digest: digest_sha256(definition),
        }
    }
}

/// Hex-encoded sha256 digest of a string
pub fn digest_sha256(text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    hex::encode(hasher.finalize())
}
