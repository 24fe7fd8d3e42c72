//! Usage tree node types.

use std::path::PathBuf;

use compact_str::CompactString;
use serde::{Deserialize, Serialize};

use crate::distribution::Distribution;
use crate::identity::IdentityKey;

/// Leaf node: one version of one ident of one project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VersionNode {
    /// Full identity of this version.
    pub identity: IdentityKey,
    /// Bytes attributed to this identity across all roots.
    pub total_size: u64,
    /// Per-root breakdown of `total_size`.
    pub distribution: Distribution,
}

impl VersionNode {
    /// Version name.
    pub fn name(&self) -> &str {
        &self.identity.version
    }
}

/// An ident within a project, grouping all its versions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IdentNode {
    /// Ident name.
    pub name: CompactString,
    /// Sum of the versions' totals.
    pub total_size: u64,
    /// Per-root breakdown of `total_size`.
    pub distribution: Distribution,
    /// Versions, sorted by size descending.
    pub versions: Vec<VersionNode>,
}

impl IdentNode {
    /// Create an empty ident with a zero entry for every root.
    pub fn new(name: impl Into<CompactString>, roots: &[PathBuf]) -> Self {
        Self {
            name: name.into(),
            total_size: 0,
            distribution: Distribution::zeroed(roots),
            versions: Vec::new(),
        }
    }

    /// Add `size` bytes from the root at `root_index` to this ident's totals.
    pub fn accrue(&mut self, root_index: usize, size: u64) {
        if self.distribution.add(root_index, size) {
            self.total_size += size;
        }
    }

    /// Look up a version by name.
    pub fn version(&self, name: &str) -> Option<&VersionNode> {
        self.versions.iter().find(|v| v.name() == name)
    }

    pub fn version_count(&self) -> usize {
        self.versions.len()
    }

    /// Sort versions by size in descending order.
    pub fn sort_versions_by_size(&mut self) {
        self.versions.sort_by(|a, b| b.total_size.cmp(&a.total_size));
    }
}

/// A project, grouping all its idents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectNode {
    /// Project name.
    pub name: CompactString,
    /// Sum of the idents' totals.
    pub total_size: u64,
    /// Per-root breakdown of `total_size`.
    pub distribution: Distribution,
    /// Idents in the order they were first seen.
    pub idents: Vec<IdentNode>,
}

impl ProjectNode {
    /// Create an empty project with a zero entry for every root.
    pub fn new(name: impl Into<CompactString>, roots: &[PathBuf]) -> Self {
        Self {
            name: name.into(),
            total_size: 0,
            distribution: Distribution::zeroed(roots),
            idents: Vec::new(),
        }
    }

    /// Add `size` bytes from the root at `root_index` to this project's totals.
    pub fn accrue(&mut self, root_index: usize, size: u64) {
        if self.distribution.add(root_index, size) {
            self.total_size += size;
        }
    }

    /// Look up an ident by name.
    pub fn ident(&self, name: &str) -> Option<&IdentNode> {
        self.idents.iter().find(|i| i.name == name)
    }

    pub fn ident_count(&self) -> usize {
        self.idents.len()
    }

    /// Number of versions across all idents.
    pub fn version_count(&self) -> usize {
        self.idents.iter().map(IdentNode::version_count).sum()
    }
}
