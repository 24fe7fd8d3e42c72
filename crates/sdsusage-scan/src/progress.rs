//! Scan progress reporting.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

/// Progress information during a scan.
#[derive(Debug, Clone)]
pub struct ScanProgress {
    /// Number of data files counted so far.
    pub files_matched: u64,
    /// Bytes in data files counted so far.
    pub bytes_matched: u64,
    /// Number of directories visited so far.
    pub dirs_scanned: u64,
    /// Root currently being walked.
    pub current_root: PathBuf,
    /// Last path counted.
    pub current_path: PathBuf,
    /// Number of warnings encountered.
    pub warnings_count: u64,
    /// Time elapsed since scan started.
    pub elapsed: Duration,
}

impl ScanProgress {
    /// Create initial progress state.
    pub fn new() -> Self {
        Self {
            files_matched: 0,
            bytes_matched: 0,
            dirs_scanned: 0,
            current_root: PathBuf::new(),
            current_path: PathBuf::new(),
            warnings_count: 0,
            elapsed: Duration::ZERO,
        }
    }

    /// Calculate scan rate in files per second.
    pub fn files_per_second(&self) -> f64 {
        if self.elapsed.as_secs_f64() > 0.0 {
            self.files_matched as f64 / self.elapsed.as_secs_f64()
        } else {
            0.0
        }
    }

    /// Calculate scan rate in bytes per second.
    pub fn bytes_per_second(&self) -> f64 {
        if self.elapsed.as_secs_f64() > 0.0 {
            self.bytes_matched as f64 / self.elapsed.as_secs_f64()
        } else {
            0.0
        }
    }
}

impl Default for ScanProgress {
    fn default() -> Self {
        Self::new()
    }
}

/// Internal progress tracker with timing.
#[derive(Debug)]
pub(crate) struct ProgressTracker {
    start_time: Instant,
    progress: ScanProgress,
}

impl ProgressTracker {
    pub fn new() -> Self {
        Self {
            start_time: Instant::now(),
            progress: ScanProgress::new(),
        }
    }

    pub fn start_root(&mut self, root: &Path) {
        self.progress.current_root = root.to_path_buf();
    }

    /// Record a counted file. Returns `true` every `every` files.
    pub fn record_file(&mut self, path: &Path, size: u64, every: u64) -> bool {
        self.progress.files_matched += 1;
        self.progress.bytes_matched += size;
        if self.progress.files_matched % every == 0 {
            self.progress.current_path = path.to_path_buf();
            return true;
        }
        false
    }

    pub fn record_dir(&mut self) {
        self.progress.dirs_scanned += 1;
    }

    pub fn record_warning(&mut self) {
        self.progress.warnings_count += 1;
    }

    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }

    pub fn snapshot(&self) -> ScanProgress {
        ScanProgress {
            elapsed: self.start_time.elapsed(),
            ..self.progress.clone()
        }
    }
}
