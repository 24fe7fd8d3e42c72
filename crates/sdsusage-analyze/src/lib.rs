//! Aggregation engine for sdsusage.
//!
//! Turns a flat set of `(root, project, version, ident, size)` observations
//! into a Project → Ident → Version tree where every node carries its total
//! size and a per-root breakdown with percentages.
//!
//! The pipeline has two stages:
//!
//! 1. [`Collector`] sums sizes per identity, per root, and per
//!    (identity, root) pair
//! 2. [`HierarchyBuilder`] assembles the tree from those sums, zero-filling
//!    every known root at every node
//!
//! [`UsageAnalyzer`] runs both and applies the requested project ordering:
//!
//! ```rust
//! use sdsusage_analyze::UsageAnalyzer;
//! use sdsusage_core::{IdentityKey, Observation};
//!
//! let observations = vec![
//!     Observation::new("/data/DDAM1", IdentityKey::new("P", "v1", "id1"), 100),
//!     Observation::new("/data/DDAM2", IdentityKey::new("P", "v1", "id1"), 300),
//! ];
//!
//! let report = UsageAnalyzer::new(["/data/DDAM1", "/data/DDAM2"]).analyze(&observations);
//!
//! assert_eq!(report.total_size, 400);
//! assert_eq!(report.projects[0].distribution.entries()[1].percentage, 75.0);
//! ```

mod analyzer;
mod collector;
mod hierarchy;
mod sort;

pub use analyzer::UsageAnalyzer;
pub use collector::{Collected, Collector, collect};
pub use hierarchy::HierarchyBuilder;
pub use sort::sort_projects;

// Re-export core types
pub use sdsusage_core::{
    Distribution, DistributionEntry, IdentNode, IdentityKey, Observation, ProjectNode, SortKey,
    SortOrder, SortSpec, UsageReport, VersionNode,
};
