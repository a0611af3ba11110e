//! Lineascope Core
//!
//! Stable domain vocabulary shared by every Lineascope crate.
//! Change-status and flag names are part of the public API - never
//! rename them, only add new variants.

pub mod change;
pub mod config;
pub mod hash;

pub use change::{ChangeStatus, LineageFlag, Provenance, ResourceKind, TransformationKind};
pub use config::{Config, ConfigError};
pub use hash::{digest_sha256, ContentHash};
