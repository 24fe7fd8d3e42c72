//! Reduction of raw observations into per-identity and per-root totals.

use std::path::{Path, PathBuf};

use indexmap::IndexMap;

use sdsusage_core::{Distribution, IdentityKey, Observation, unique_roots};

/// Folds observations into three flat size maps.
///
/// Pure summation: the result does not depend on the order observations are
/// recorded in, nor on how they were split between collectors that are later
/// merged. Identities keep first-seen order so the same input sequence always
/// yields the same tree.
#[derive(Debug, Clone)]
pub struct Collector {
    roots: Vec<PathBuf>,
    size_by_identity: IndexMap<IdentityKey, u64>,
    size_by_root: IndexMap<PathBuf, u64>,
    size_by_identity_and_root: IndexMap<IdentityKey, IndexMap<PathBuf, u64>>,
    observation_count: u64,
}

impl Collector {
    /// Create an empty collector for the given known roots.
    pub fn new(roots: &[PathBuf]) -> Self {
        Self {
            roots: unique_roots(roots),
            size_by_identity: IndexMap::new(),
            size_by_root: IndexMap::new(),
            size_by_identity_and_root: IndexMap::new(),
            observation_count: 0,
        }
    }

    /// Record a single observation.
    pub fn record(&mut self, observation: &Observation) {
        self.add(&observation.identity, &observation.root, observation.size);
        self.observation_count += 1;
    }

    fn add(&mut self, identity: &IdentityKey, root: &Path, size: u64) {
        *self.size_by_identity.entry(identity.clone()).or_insert(0) += size;
        *self.size_by_root.entry(root.to_path_buf()).or_insert(0) += size;
        *self
            .size_by_identity_and_root
            .entry(identity.clone())
            .or_default()
            .entry(root.to_path_buf())
            .or_insert(0) += size;
    }

    /// Record every observation of an iterator.
    pub fn extend<'a>(&mut self, observations: impl IntoIterator<Item = &'a Observation>) {
        for observation in observations {
            self.record(observation);
        }
    }

    /// Merge another partial reduction into this one.
    pub fn merge(&mut self, other: Collector) {
        for (identity, by_root) in other.size_by_identity_and_root {
            for (root, size) in by_root {
                self.add(&identity, &root, size);
            }
        }
        self.observation_count += other.observation_count;
    }

    /// Number of observations recorded so far.
    pub fn observation_count(&self) -> u64 {
        self.observation_count
    }

    /// Finish collecting.
    pub fn finish(self) -> Collected {
        tracing::debug!(
            observations = self.observation_count,
            identities = self.size_by_identity.len(),
            roots = self.size_by_root.len(),
            "collected observations"
        );

        Collected {
            roots: self.roots,
            size_by_identity: self.size_by_identity,
            size_by_root: self.size_by_root,
            size_by_identity_and_root: self.size_by_identity_and_root,
            observation_count: self.observation_count,
        }
    }
}

/// Reduce a sequence of observations in one go.
pub fn collect<'a>(
    roots: &[PathBuf],
    observations: impl IntoIterator<Item = &'a Observation>,
) -> Collected {
    let mut collector = Collector::new(roots);
    collector.extend(observations);
    collector.finish()
}

/// Read-only result of a [`Collector`].
#[derive(Debug, Clone)]
pub struct Collected {
    roots: Vec<PathBuf>,
    size_by_identity: IndexMap<IdentityKey, u64>,
    size_by_root: IndexMap<PathBuf, u64>,
    size_by_identity_and_root: IndexMap<IdentityKey, IndexMap<PathBuf, u64>>,
    observation_count: u64,
}

impl Collected {
    /// Known roots, in configured order.
    pub fn roots(&self) -> &[PathBuf] {
        &self.roots
    }

    /// Total bytes per identity, over all roots, in first-seen order.
    pub fn size_by_identity(&self) -> &IndexMap<IdentityKey, u64> {
        &self.size_by_identity
    }

    /// Total bytes per root, over all identities.
    pub fn size_by_root(&self) -> &IndexMap<PathBuf, u64> {
        &self.size_by_root
    }

    /// Bytes of `identity` stored under `root`; zero if none were observed.
    pub fn size_in_root(&self, identity: &IdentityKey, root: &Path) -> u64 {
        self.size_by_identity_and_root
            .get(identity)
            .and_then(|by_root| by_root.get(root))
            .copied()
            .unwrap_or(0)
    }

    /// Every observed `((identity, root), size)` pair.
    pub fn size_by_identity_and_root(&self) -> impl Iterator<Item = ((&IdentityKey, &Path), u64)> {
        self.size_by_identity_and_root.iter().flat_map(|(identity, by_root)| {
            by_root
                .iter()
                .map(move |(root, size)| ((identity, root.as_path()), *size))
        })
    }

    /// Bytes over all roots.
    pub fn total_size(&self) -> u64 {
        self.size_by_root.values().sum()
    }

    /// Per-root share of the grand total, one entry per known root.
    pub fn root_distribution(&self) -> Distribution {
        let total = self.total_size();
        Distribution::from_sizes(&self.roots, total, |root| {
            self.size_by_root.get(root).copied().unwrap_or(0)
        })
    }

    /// Number of observations reduced.
    pub fn observation_count(&self) -> u64 {
        self.observation_count
    }

    /// Check if nothing was observed.
    pub fn is_empty(&self) -> bool {
        self.size_by_identity.is_empty()
    }
}
