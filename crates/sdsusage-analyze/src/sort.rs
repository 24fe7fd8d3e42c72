//! Ordering of the top-level project list.

use std::cmp::Ordering;

use sdsusage_core::{ProjectNode, SortKey, SortSpec};

/// Sort projects in place according to `spec`.
///
/// Name ordering ignores case. The sort is stable in both directions:
/// projects that compare equal keep their relative order.
pub fn sort_projects(projects: &mut [ProjectNode], spec: SortSpec) {
    let directed = |ordering: Ordering| {
        if spec.order.is_descending() {
            ordering.reverse()
        } else {
            ordering
        }
    };

    match spec.key {
        SortKey::TotalSize => {
            projects.sort_by(|a, b| directed(a.total_size.cmp(&b.total_size)));
        }
        SortKey::Name => {
            projects.sort_by(|a, b| directed(a.name.to_lowercase().cmp(&b.name.to_lowercase())));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sdsusage_core::SortOrder;
    use std::path::PathBuf;

    fn project(name: &str, size: u64) -> ProjectNode {
        let mut node = ProjectNode::new(name, &[PathBuf::from("/r1")]);
        node.accrue(0, size);
        node
    }

    fn names(projects: &[ProjectNode]) -> Vec<&str> {
        projects.iter().map(|p| p.name.as_str()).collect()
    }

    #[test]
    fn test_sort_by_size_descending() {
        let mut projects = vec![project("A", 300), project("B", 100), project("C", 200)];
        sort_projects(&mut projects, SortSpec::default());
        assert_eq!(names(&projects), vec!["A", "C", "B"]);
    }

    #[test]
    fn test_sort_by_size_ascending() {
        let mut projects = vec![project("A", 300), project("B", 100), project("C", 200)];
        sort_projects(&mut projects, SortSpec::new(SortKey::TotalSize, SortOrder::Asc));
        assert_eq!(names(&projects), vec!["B", "C", "A"]);
    }

    #[test]
    fn test_sort_by_name_is_case_insensitive() {
        let mut projects = vec![project("beta", 1), project("Alpha", 2), project("gamma", 3)];
        sort_projects(&mut projects, SortSpec::new(SortKey::Name, SortOrder::Asc));
        assert_eq!(names(&projects), vec!["Alpha", "beta", "gamma"]);

        sort_projects(&mut projects, SortSpec::new(SortKey::Name, SortOrder::Desc));
        assert_eq!(names(&projects), vec!["gamma", "beta", "Alpha"]);
    }

    #[test]
    fn test_ties_keep_original_order() {
        let mut projects = vec![project("x", 5), project("y", 5), project("z", 9)];
        sort_projects(&mut projects, SortSpec::default());
        assert_eq!(names(&projects), vec!["z", "x", "y"]);

        let mut projects = vec![project("x", 5), project("y", 5), project("z", 1)];
        sort_projects(&mut projects, SortSpec::new(SortKey::TotalSize, SortOrder::Asc));
        assert_eq!(names(&projects), vec!["z", "x", "y"]);
    }
}
