//! Scan configuration types.

use std::path::{Path, PathBuf};

use derive_builder::Builder;
use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::error::ScanError;

/// Roots scanned when none are configured.
pub const DEFAULT_ROOTS: &[&str] = &["/data/DDAM1", "/data/DDAM2"];

/// Directory components, relative to a root, under which identities live.
pub const DEFAULT_DATA_PREFIX: &[&str] = &["SDS", "data"];

/// File name suffix of counted data files.
pub const DEFAULT_FILE_SUFFIX: &str = "_sdfa";

/// Configuration for scanning operations.
#[derive(Debug, Clone, PartialEq, Builder, Serialize, Deserialize)]
#[builder(setter(into), build_fn(validate = "Self::validate"))]
pub struct ScanConfig {
    /// Known roots, in report order.
    #[serde(default = "default_roots")]
    pub roots: Vec<PathBuf>,

    /// Path components between a root and the project directories.
    #[builder(default = "default_data_prefix()")]
    #[serde(default = "default_data_prefix")]
    pub data_prefix: Vec<String>,

    /// Only files whose name ends with this suffix are counted.
    #[builder(default = "default_file_suffix()")]
    #[serde(default = "default_file_suffix")]
    pub file_suffix: String,

    /// Follow symbolic links.
    #[builder(default = "false")]
    #[serde(default)]
    pub follow_symlinks: bool,

    /// Number of threads for walking a root (0 = auto-detect).
    #[builder(default = "0")]
    #[serde(default)]
    pub threads: usize,

    /// Include hidden files and directories (starting with .).
    #[builder(default = "true")]
    #[serde(default = "default_true")]
    pub include_hidden: bool,
}

fn default_true() -> bool {
    true
}

fn default_roots() -> Vec<PathBuf> {
    DEFAULT_ROOTS.iter().map(PathBuf::from).collect()
}

fn default_data_prefix() -> Vec<String> {
    DEFAULT_DATA_PREFIX.iter().map(|s| s.to_string()).collect()
}

fn default_file_suffix() -> String {
    DEFAULT_FILE_SUFFIX.to_string()
}

/// Collect roots in order, dropping repeats (`/a` and `/a/` are the same root).
pub fn unique_roots<P: Into<PathBuf>>(roots: impl IntoIterator<Item = P>) -> Vec<PathBuf> {
    roots.into_iter().map(Into::into).unique().collect()
}

fn check(roots: &[PathBuf], file_suffix: &str) -> Result<(), String> {
    if roots.is_empty() {
        return Err("At least one root is required".to_string());
    }
    if roots.iter().any(|r| r.as_os_str().is_empty()) {
        return Err("Root path cannot be empty".to_string());
    }
    if let Some(duplicate) = roots.iter().duplicates().next() {
        return Err(format!("Duplicate root: {}", duplicate.display()));
    }
    if file_suffix.is_empty() {
        return Err("File suffix cannot be empty".to_string());
    }
    Ok(())
}

impl ScanConfigBuilder {
    fn validate(&self) -> Result<(), String> {
        let Some(ref roots) = self.roots else {
            return Err("Roots are required".to_string());
        };
        let suffix = self.file_suffix.as_deref().unwrap_or(DEFAULT_FILE_SUFFIX);
        check(roots, suffix)
    }
}

impl ScanConfig {
    /// Create a new scan config builder.
    pub fn builder() -> ScanConfigBuilder {
        ScanConfigBuilder::default()
    }

    /// Create a simple config for scanning the given roots.
    pub fn new<P: Into<PathBuf>>(roots: impl IntoIterator<Item = P>) -> Self {
        Self {
            roots: roots.into_iter().map(Into::into).collect(),
            data_prefix: default_data_prefix(),
            file_suffix: default_file_suffix(),
            follow_symlinks: false,
            threads: 0,
            include_hidden: true,
        }
    }

    /// Validate a config that did not come through the builder (e.g. deserialized).
    pub fn validate(&self) -> Result<(), ScanError> {
        check(&self.roots, &self.file_suffix).map_err(|message| ScanError::InvalidConfig { message })
    }

    /// Directory under `root` where project directories live.
    pub fn data_dir(&self, root: &Path) -> PathBuf {
        self.data_prefix.iter().fold(root.to_path_buf(), |dir, part| dir.join(part))
    }

    /// Check if a file name matches the data file suffix.
    pub fn matches_file(&self, name: &str) -> bool {
        name.ends_with(&self.file_suffix)
    }
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self::new(DEFAULT_ROOTS.iter().copied())
    }
}
