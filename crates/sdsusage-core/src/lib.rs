//! Core types for sdsusage.
//!
//! This crate provides the data structures shared by the scanner, the
//! aggregation engine and the CLI: observations and identity keys, per-root
//! distributions, the Project → Ident → Version usage tree, sort options,
//! scan configuration and the final usage report.

mod config;
mod distribution;
mod error;
mod identity;
mod node;
mod report;
mod sort;

pub use config::{
    DEFAULT_DATA_PREFIX, DEFAULT_FILE_SUFFIX, DEFAULT_ROOTS, ScanConfig, ScanConfigBuilder, unique_roots,
};
pub use distribution::{Distribution, DistributionEntry, percentage};
pub use error::{ScanError, ScanWarning, WarningKind};
pub use identity::{IdentityKey, Observation};
pub use node::{IdentNode, ProjectNode, VersionNode};
pub use report::{ScanOutcome, ScanStats, ScanSummary, UsageReport};
pub use sort::{SortKey, SortOrder, SortSpec};
