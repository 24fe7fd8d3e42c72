//! Scan outcome and usage report containers.

use std::path::PathBuf;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::distribution::Distribution;
use crate::error::ScanWarning;
use crate::identity::Observation;
use crate::node::ProjectNode;
use crate::sort::SortSpec;

/// Summary statistics for a scan.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScanStats {
    /// Data files counted.
    pub files_matched: u64,
    /// Bytes in counted data files.
    pub bytes_matched: u64,
    /// Files seen but not counted (wrong suffix or outside an identity directory).
    pub files_ignored: u64,
    /// Directories visited.
    pub dirs_scanned: u64,
    /// Roots that were walked.
    pub roots_scanned: u64,
    /// Roots skipped because they do not exist.
    pub roots_missing: u64,
    /// Largest data file (path, size).
    pub largest_file: Option<(PathBuf, u64)>,
}

impl ScanStats {
    /// Create new empty stats.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a counted data file.
    pub fn record_file(&mut self, path: PathBuf, size: u64) {
        self.files_matched += 1;
        self.bytes_matched += size;

        if self.largest_file.as_ref().is_none_or(|(_, s)| size > *s) {
            self.largest_file = Some((path, size));
        }
    }

    /// Record a file that was not counted.
    pub fn record_ignored(&mut self) {
        self.files_ignored += 1;
    }

    /// Record a directory.
    pub fn record_dir(&mut self) {
        self.dirs_scanned += 1;
    }

    /// Record a root, walked or missing.
    pub fn record_root(&mut self, present: bool) {
        if present {
            self.roots_scanned += 1;
        } else {
            self.roots_missing += 1;
        }
    }
}

/// Everything a scan of the known roots produced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanOutcome {
    /// Known roots, in configured order.
    pub roots: Vec<PathBuf>,
    /// One observation per counted data file.
    pub observations: Vec<Observation>,
    /// Summary statistics.
    pub stats: ScanStats,
    /// Warnings encountered during scan.
    pub warnings: Vec<ScanWarning>,
    /// Duration of the scan.
    pub duration: Duration,
}

impl ScanOutcome {
    /// Split into the observations and a summary of the scan.
    pub fn into_parts(self) -> (Vec<PathBuf>, Vec<Observation>, ScanSummary) {
        let summary = ScanSummary {
            stats: self.stats,
            warnings: self.warnings,
            duration: self.duration,
        };
        (self.roots, self.observations, summary)
    }
}

/// Scan details attached to a report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanSummary {
    pub stats: ScanStats,
    pub warnings: Vec<ScanWarning>,
    pub duration: Duration,
}

/// Aggregated usage, ready for presentation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UsageReport {
    /// Known roots, in configured order.
    pub roots: Vec<PathBuf>,

    /// Projects, ordered by `sort`.
    pub projects: Vec<ProjectNode>,

    /// Bytes per root over all projects.
    pub root_distribution: Distribution,

    /// Bytes over all roots.
    pub total_size: u64,

    /// Ordering applied to `projects`.
    pub sort: SortSpec,

    /// When this report was built.
    pub generated_at: DateTime<Utc>,

    /// Scan details, when the report was built from a scan.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scan: Option<ScanSummary>,
}

impl UsageReport {
    /// Look up a project by name.
    pub fn project(&self, name: &str) -> Option<&ProjectNode> {
        self.projects.iter().find(|p| p.name == name)
    }

    pub fn project_count(&self) -> usize {
        self.projects.len()
    }

    /// Number of idents across all projects.
    pub fn ident_count(&self) -> usize {
        self.projects.iter().map(ProjectNode::ident_count).sum()
    }

    /// Number of versions across all projects.
    pub fn version_count(&self) -> usize {
        self.projects.iter().map(ProjectNode::version_count).sum()
    }

    /// Check if there were any warnings during scanning.
    pub fn has_warnings(&self) -> bool {
        self.scan.as_ref().is_some_and(|s| !s.warnings.is_empty())
    }
}
