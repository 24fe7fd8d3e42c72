//! End-to-end aggregation: observations in, sorted usage report out.

use std::path::PathBuf;

use chrono::Utc;
use itertools::Itertools;

use sdsusage_core::{Observation, ScanOutcome, ScanSummary, SortSpec, UsageReport, unique_roots};

use crate::collector::collect;
use crate::hierarchy::HierarchyBuilder;
use crate::sort::sort_projects;

/// Runs the collector, the hierarchy builder and the project sort.
///
/// Holds no state between runs; the same input always yields the same tree.
#[derive(Debug, Clone)]
pub struct UsageAnalyzer {
    roots: Vec<PathBuf>,
    sort: SortSpec,
}

impl UsageAnalyzer {
    /// Create an analyzer for the given known roots, sorting by size descending.
    ///
    /// Repeated roots are dropped; the first occurrence keeps its position.
    pub fn new<P: Into<PathBuf>>(roots: impl IntoIterator<Item = P>) -> Self {
        Self {
            roots: unique_roots(roots),
            sort: SortSpec::default(),
        }
    }

    /// Use a different project ordering.
    pub fn with_sort(mut self, sort: SortSpec) -> Self {
        self.sort = sort;
        self
    }

    /// Known roots, in configured order.
    pub fn roots(&self) -> &[PathBuf] {
        &self.roots
    }

    /// Aggregate a set of observations.
    pub fn analyze<'a>(&self, observations: impl IntoIterator<Item = &'a Observation>) -> UsageReport {
        self.build_report(observations, None)
    }

    /// Aggregate the observations of a scan and attach its summary.
    ///
    /// The report always uses the analyzer's roots. A scan over other roots
    /// is logged, and its bytes from unknown roots reach no distribution.
    pub fn analyze_scan(&self, outcome: ScanOutcome) -> UsageReport {
        let (scanned_roots, observations, summary) = outcome.into_parts();
        if unique_roots(&scanned_roots) != self.roots {
            tracing::warn!(
                scanned = %scanned_roots.iter().map(|r| r.display()).join(", "),
                known = %self.roots.iter().map(|r| r.display()).join(", "),
                "scan roots differ from analyzer roots"
            );
        }
        self.build_report(&observations, Some(summary))
    }

    fn build_report<'a>(
        &self,
        observations: impl IntoIterator<Item = &'a Observation>,
        scan: Option<ScanSummary>,
    ) -> UsageReport {
        let collected = collect(&self.roots, observations);
        let mut projects = HierarchyBuilder::new(&self.roots).build(&collected);
        sort_projects(&mut projects, self.sort);

        tracing::info!(
            projects = projects.len(),
            total_size = collected.total_size(),
            sort_by = %self.sort.key,
            order = %self.sort.order,
            "aggregated usage"
        );

        UsageReport {
            roots: self.roots.clone(),
            projects,
            root_distribution: collected.root_distribution(),
            total_size: collected.total_size(),
            sort: self.sort,
            generated_at: Utc::now(),
            scan,
        }
    }
}
