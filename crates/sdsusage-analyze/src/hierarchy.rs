//! Project → Ident → Version tree construction.
//!
//! Built in three passes:
//!
//! 1. **Skeleton** - create every project and ident with a zero entry for
//!    each known root.
//! 2. **Fill** - create each version with its per-root sizes and
//!    percentages, accruing the same sizes into its ident and project.
//! 3. **Percentages** - recompute project and ident percentages once all
//!    sizes have been accrued.
//!
//! Parent percentages depend on the parent's final total, so pass 3 cannot
//! be folded into pass 2.

use std::path::{Path, PathBuf};

use compact_str::CompactString;
use indexmap::IndexMap;

use sdsusage_core::{Distribution, IdentNode, IdentityKey, ProjectNode, VersionNode, unique_roots};

use crate::collector::Collected;

/// A project under construction, with idents keyed by name.
struct ProjectEntry {
    node: ProjectNode,
    idents: IndexMap<CompactString, IdentNode>,
}

impl ProjectEntry {
    fn new(name: &CompactString, roots: &[PathBuf]) -> Self {
        Self {
            node: ProjectNode::new(name.clone(), roots),
            idents: IndexMap::new(),
        }
    }

    fn into_node(self) -> ProjectNode {
        let mut node = self.node;
        node.idents = self
            .idents
            .into_values()
            .map(|mut ident| {
                ident.sort_versions_by_size();
                ident
            })
            .collect();
        node
    }
}

/// Get the project named `name`, inserting a zero-initialized one if absent.
fn project_mut<'a>(
    projects: &'a mut IndexMap<CompactString, ProjectEntry>,
    name: &CompactString,
    roots: &[PathBuf],
) -> &'a mut ProjectEntry {
    projects
        .entry(name.clone())
        .or_insert_with(|| ProjectEntry::new(name, roots))
}

/// Get the ident named `name`, inserting a zero-initialized one if absent.
fn ident_mut<'a>(
    idents: &'a mut IndexMap<CompactString, IdentNode>,
    name: &CompactString,
    roots: &[PathBuf],
) -> &'a mut IdentNode {
    idents
        .entry(name.clone())
        .or_insert_with(|| IdentNode::new(name.clone(), roots))
}

/// Builds the usage tree from collected totals.
#[derive(Debug, Clone)]
pub struct HierarchyBuilder {
    roots: Vec<PathBuf>,
}

impl HierarchyBuilder {
    /// Create a builder for the given known roots.
    pub fn new(roots: &[PathBuf]) -> Self {
        Self {
            roots: unique_roots(roots),
        }
    }

    /// Build the tree from a collector's output.
    ///
    /// Projects and idents come out in first-seen order; versions are sorted
    /// by size, largest first.
    pub fn build(&self, collected: &Collected) -> Vec<ProjectNode> {
        self.build_from(collected.size_by_identity(), |identity, root| {
            collected.size_in_root(identity, root)
        })
    }

    /// Build the tree from per-identity totals and a per-(identity, root) lookup.
    ///
    /// `size_in_root` must return 0 for pairs that were never observed.
    pub fn build_from(
        &self,
        size_by_identity: &IndexMap<IdentityKey, u64>,
        size_in_root: impl Fn(&IdentityKey, &Path) -> u64,
    ) -> Vec<ProjectNode> {
        let mut projects = self.skeleton(size_by_identity);
        self.fill(&mut projects, size_by_identity, size_in_root);
        Self::recompute_percentages(&mut projects);

        let projects: Vec<ProjectNode> = projects.into_values().map(ProjectEntry::into_node).collect();

        tracing::debug!(
            projects = projects.len(),
            identities = size_by_identity.len(),
            "built usage hierarchy"
        );

        projects
    }

    fn skeleton(
        &self,
        size_by_identity: &IndexMap<IdentityKey, u64>,
    ) -> IndexMap<CompactString, ProjectEntry> {
        let mut projects = IndexMap::new();
        for identity in size_by_identity.keys() {
            let entry = project_mut(&mut projects, &identity.project, &self.roots);
            ident_mut(&mut entry.idents, &identity.ident, &self.roots);
        }
        projects
    }

    fn fill(
        &self,
        projects: &mut IndexMap<CompactString, ProjectEntry>,
        size_by_identity: &IndexMap<IdentityKey, u64>,
        size_in_root: impl Fn(&IdentityKey, &Path) -> u64,
    ) {
        for (identity, &total) in size_by_identity {
            let ProjectEntry { node: project, idents } =
                project_mut(projects, &identity.project, &self.roots);
            let ident = ident_mut(idents, &identity.ident, &self.roots);

            let distribution = Distribution::from_sizes(&self.roots, total, |root| {
                size_in_root(identity, root)
            });

            for (index, root_entry) in distribution.iter().enumerate() {
                ident.accrue(index, root_entry.size);
                project.accrue(index, root_entry.size);
            }

            ident.versions.push(VersionNode {
                identity: identity.clone(),
                total_size: total,
                distribution,
            });
        }
    }

    fn recompute_percentages(projects: &mut IndexMap<CompactString, ProjectEntry>) {
        for entry in projects.values_mut() {
            let total = entry.node.total_size;
            entry.node.distribution.recompute_percentages(total);

            for ident in entry.idents.values_mut() {
                let total = ident.total_size;
                ident.distribution.recompute_percentages(total);
            }
        }
    }
}
