//! Per-root size distributions.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Share of `part` in `total`, in percent. Zero when `total` is zero.
pub fn percentage(part: u64, total: u64) -> f64 {
    if total > 0 {
        part as f64 / total as f64 * 100.0
    } else {
        0.0
    }
}

/// Size contributed by one root to a node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistributionEntry {
    /// Root the bytes are stored under.
    pub root: PathBuf,
    /// Bytes stored under this root.
    pub size: u64,
    /// `size` as a percentage of the owning node's total.
    pub percentage: f64,
}

/// Ordered breakdown of a node's size by root.
///
/// Always holds exactly one entry per known root, in configured order,
/// whether or not the root contributed anything.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Distribution {
    entries: Vec<DistributionEntry>,
}

impl Distribution {
    /// Create a distribution with a zero entry for every root.
    pub fn zeroed(roots: &[PathBuf]) -> Self {
        Self {
            entries: roots
                .iter()
                .map(|root| DistributionEntry {
                    root: root.clone(),
                    size: 0,
                    percentage: 0.0,
                })
                .collect(),
        }
    }

    /// Create a distribution from per-root sizes, with percentages of `total`.
    pub fn from_sizes(roots: &[PathBuf], total: u64, size_of: impl Fn(&Path) -> u64) -> Self {
        Self {
            entries: roots
                .iter()
                .map(|root| {
                    let size = size_of(root);
                    DistributionEntry {
                        root: root.clone(),
                        size,
                        percentage: percentage(size, total),
                    }
                })
                .collect(),
        }
    }

    /// Add `size` bytes to the entry at `index`.
    ///
    /// Returns `false` (and changes nothing) if there is no such entry.
    pub fn add(&mut self, index: usize, size: u64) -> bool {
        match self.entries.get_mut(index) {
            Some(entry) => {
                entry.size += size;
                true
            }
            None => false,
        }
    }

    /// Recompute every entry's percentage against `total`.
    pub fn recompute_percentages(&mut self, total: u64) {
        for entry in &mut self.entries {
            entry.percentage = percentage(entry.size, total);
        }
    }

    /// Sum of all entry sizes.
    pub fn total_size(&self) -> u64 {
        self.entries.iter().map(|e| e.size).sum()
    }

    /// Sum of all entry percentages.
    pub fn percentage_sum(&self) -> f64 {
        self.entries.iter().map(|e| e.percentage).sum()
    }

    /// Look up the entry for a root.
    pub fn get(&self, root: &Path) -> Option<&DistributionEntry> {
        self.entries.iter().find(|e| e.root == root)
    }

    /// All entries in root order.
    pub fn entries(&self) -> &[DistributionEntry] {
        &self.entries
    }

    pub fn iter(&self) -> std::slice::Iter<'_, DistributionEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<'a> IntoIterator for &'a Distribution {
    type Item = &'a DistributionEntry;
    type IntoIter = std::slice::Iter<'a, DistributionEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
