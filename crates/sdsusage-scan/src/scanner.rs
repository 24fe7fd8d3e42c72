//! JWalk-based scanner over the known roots.

use std::path::Path;

use jwalk::{Parallelism, WalkDir};
use tokio::sync::broadcast;

use sdsusage_core::{Observation, ScanConfig, ScanError, ScanOutcome, ScanStats, ScanWarning, WarningKind};

use crate::classify::classify;
use crate::progress::{ProgressTracker, ScanProgress};

/// Files counted between progress updates.
const PROGRESS_EVERY: u64 = 1000;

/// Scanner that walks each known root's data directory with jwalk.
///
/// Roots are walked one after another, in configured order. A missing root
/// is reported as a warning and contributes nothing.
pub struct JwalkScanner {
    progress_tx: broadcast::Sender<ScanProgress>,
}

/// Mutable state shared by the per-root walks of one scan.
struct ScanState {
    observations: Vec<Observation>,
    stats: ScanStats,
    warnings: Vec<ScanWarning>,
    tracker: ProgressTracker,
}

impl ScanState {
    fn warn(&mut self, warning: ScanWarning) {
        tracing::warn!(path = %warning.path.display(), "{}", warning.message);
        self.tracker.record_warning();
        self.warnings.push(warning);
    }
}

impl JwalkScanner {
    /// Create a new scanner.
    pub fn new() -> Self {
        let (progress_tx, _) = broadcast::channel(100);
        Self { progress_tx }
    }

    /// Subscribe to scan progress updates.
    pub fn subscribe(&self) -> broadcast::Receiver<ScanProgress> {
        self.progress_tx.subscribe()
    }

    /// Scan every configured root and return one observation per data file.
    pub fn scan(&self, config: &ScanConfig) -> Result<ScanOutcome, ScanError> {
        config.validate()?;

        let mut state = ScanState {
            observations: Vec::new(),
            stats: ScanStats::new(),
            warnings: Vec::new(),
            tracker: ProgressTracker::new(),
        };

        for root in &config.roots {
            if !root.is_dir() {
                state.stats.record_root(false);
                state.warn(ScanWarning::root_missing(root));
                continue;
            }

            state.stats.record_root(true);
            state.tracker.start_root(root);
            self.scan_root(config, root, &mut state);
        }

        let _ = self.progress_tx.send(state.tracker.snapshot());

        tracing::info!(
            roots = state.stats.roots_scanned,
            missing = state.stats.roots_missing,
            files = state.stats.files_matched,
            bytes = state.stats.bytes_matched,
            warnings = state.warnings.len(),
            "scan finished"
        );

        Ok(ScanOutcome {
            roots: config.roots.clone(),
            observations: state.observations,
            stats: state.stats,
            warnings: state.warnings,
            duration: state.tracker.elapsed(),
        })
    }

    /// Walk the data directory of a single root.
    fn scan_root(&self, config: &ScanConfig, root: &Path, state: &mut ScanState) {
        let data_dir = config.data_dir(root);
        if !data_dir.is_dir() {
            tracing::debug!(root = %root.display(), "root has no data directory");
            return;
        }

        let parallelism = match config.threads {
            0 => Parallelism::RayonDefaultPool {
                busy_timeout: std::time::Duration::from_millis(100),
            },
            n => Parallelism::RayonNewPool(n),
        };

        let walker = WalkDir::new(&data_dir)
            .parallelism(parallelism)
            .skip_hidden(!config.include_hidden)
            .follow_links(config.follow_symlinks)
            .sort(true);

        for entry_result in walker {
            let entry = match entry_result {
                Ok(e) => e,
                Err(err) => {
                    let path = err.path().map(|p| p.to_path_buf()).unwrap_or_default();
                    let warning = match err.io_error() {
                        Some(io) => ScanWarning::read_error(path, io),
                        None => ScanWarning::new(path, err.to_string(), WarningKind::ReadError),
                    };
                    state.warn(warning);
                    continue;
                }
            };

            let file_type = entry.file_type();
            if file_type.is_dir() {
                state.stats.record_dir();
                state.tracker.record_dir();
                continue;
            }
            if !file_type.is_file() && !file_type.is_symlink() {
                continue;
            }

            let file_name = entry.file_name().to_string_lossy().to_string();
            if !config.matches_file(&file_name) {
                state.stats.record_ignored();
                continue;
            }

            let path = entry.path();
            let identity = path
                .parent()
                .and_then(|dir| dir.strip_prefix(root).ok())
                .and_then(|relative| classify(relative, &config.data_prefix));
            let Some(identity) = identity else {
                state.stats.record_ignored();
                continue;
            };

            // Linked data files count with the size of their target
            let metadata = if file_type.is_symlink() {
                std::fs::metadata(&path).map_err(|err| ScanWarning::metadata(&path, &err))
            } else {
                entry.metadata().map_err(|err| match err.io_error() {
                    Some(io) => ScanWarning::metadata(&path, io),
                    None => ScanWarning::new(&path, err.to_string(), WarningKind::MetadataError),
                })
            };
            let metadata = match metadata {
                Ok(m) => m,
                Err(warning) => {
                    state.warn(warning);
                    continue;
                }
            };
            if !metadata.is_file() {
                state.stats.record_ignored();
                continue;
            }

            let size = metadata.len();
            state.observations.push(Observation::new(root, identity, size));
            if state.tracker.record_file(&path, size, PROGRESS_EVERY) {
                let _ = self.progress_tx.send(state.tracker.snapshot());
            }
            state.stats.record_file(path, size);
        }
    }
}

impl Default for JwalkScanner {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn write(root: &Path, relative: &str, bytes: usize) {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, vec![b'x'; bytes]).unwrap();
    }

    fn create_test_roots() -> (TempDir, PathBuf, PathBuf) {
        let temp = TempDir::new().unwrap();
        let root1 = temp.path().join("DDAM1");
        let root2 = temp.path().join("DDAM2");

        write(&root1, "SDS/data/P/v1/id1/a_sdfa", 100);
        write(&root2, "SDS/data/P/v1/id1/b_sdfa", 300);
        write(&root1, "SDS/data/P/v2/id1/empty_sdfa", 0);
        write(&root1, "SDS/data/P/v1/id1/nested/deeper_sdfa", 7);
        // Not counted: wrong suffix, too shallow, outside the data prefix
        write(&root1, "SDS/data/P/v1/id1/readme.txt", 50);
        write(&root1, "SDS/data/P/v1/shallow_sdfa", 50);
        write(&root2, "SDS/other/P/v1/id1/x_sdfa", 50);

        (temp, root1, root2)
    }

    fn size_of(outcome: &ScanOutcome, root: &Path, version: &str) -> u64 {
        outcome
            .observations
            .iter()
            .filter(|o| o.root == root && o.identity.version == version)
            .map(|o| o.size)
            .sum()
    }

    #[test]
    fn test_scan_counts_only_data_files() {
        let (_temp, root1, root2) = create_test_roots();
        let config = ScanConfig::new([root1.clone(), root2.clone()]);

        let outcome = JwalkScanner::new().scan(&config).unwrap();

        assert_eq!(outcome.stats.files_matched, 4);
        assert_eq!(outcome.stats.bytes_matched, 407);
        assert_eq!(outcome.stats.files_ignored, 2);
        assert_eq!(outcome.stats.roots_scanned, 2);
        assert_eq!(size_of(&outcome, &root1, "v1"), 107);
        assert_eq!(size_of(&outcome, &root2, "v1"), 300);
        assert_eq!(size_of(&outcome, &root1, "v2"), 0);
        assert!(outcome.warnings.is_empty());
    }

    #[test]
    fn test_missing_root_is_a_warning() {
        let (temp, root1, _root2) = create_test_roots();
        let missing = temp.path().join("DDAM9");
        let config = ScanConfig::new([missing.clone(), root1]);

        let outcome = JwalkScanner::new().scan(&config).unwrap();

        assert_eq!(outcome.stats.roots_missing, 1);
        assert_eq!(outcome.stats.roots_scanned, 1);
        assert_eq!(outcome.warnings.len(), 1);
        assert_eq!(outcome.warnings[0].kind, WarningKind::RootMissing);
        assert_eq!(outcome.warnings[0].path, missing);
        assert!(outcome.observations.iter().all(|o| o.root != missing));
    }

    #[test]
    fn test_root_without_data_dir_contributes_nothing() {
        let temp = TempDir::new().unwrap();
        let config = ScanConfig::new([temp.path()]);

        let outcome = JwalkScanner::new().scan(&config).unwrap();

        assert!(outcome.observations.is_empty());
        assert_eq!(outcome.stats.roots_scanned, 1);
        assert!(outcome.warnings.is_empty());
    }

    #[test]
    fn test_custom_suffix() {
        let (_temp, root1, _root2) = create_test_roots();
        let config = ScanConfig::builder()
            .roots(vec![root1])
            .file_suffix(".txt")
            .build()
            .unwrap();

        let outcome = JwalkScanner::new().scan(&config).unwrap();
        assert_eq!(outcome.stats.files_matched, 1);
        assert_eq!(outcome.stats.bytes_matched, 50);
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let config = ScanConfig::new(Vec::<PathBuf>::new());
        let result = JwalkScanner::new().scan(&config);
        assert!(matches!(result, Err(ScanError::InvalidConfig { .. })));
    }

    #[test]
    fn test_parallel_walk_matches_default() {
        let (_temp, root1, root2) = create_test_roots();
        let config = ScanConfig::builder()
            .roots(vec![root1.clone(), root2.clone()])
            .threads(2usize)
            .build()
            .unwrap();

        let outcome = JwalkScanner::new().scan(&config).unwrap();
        assert_eq!(outcome.stats.files_matched, 4);
        assert_eq!(outcome.stats.bytes_matched, 407);
        assert_eq!(size_of(&outcome, &root1, "v1"), 107);
        assert_eq!(size_of(&outcome, &root2, "v1"), 300);
    }

    #[cfg(unix)]
    #[test]
    fn test_linked_data_file_counts_target_size() {
        let temp = TempDir::new().unwrap();
        let root = temp.path().join("DDAM1");
        write(temp.path(), "store/blob", 500);
        fs::create_dir_all(root.join("SDS/data/P/v1/id1")).unwrap();
        std::os::unix::fs::symlink(
            temp.path().join("store/blob"),
            root.join("SDS/data/P/v1/id1/link_sdfa"),
        )
        .unwrap();

        let outcome = JwalkScanner::new().scan(&ScanConfig::new([&root])).unwrap();

        assert_eq!(outcome.stats.files_matched, 1);
        assert_eq!(outcome.stats.bytes_matched, 500);
        assert_eq!(outcome.observations[0].identity.ident, "id1");
        assert!(outcome.warnings.is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn test_broken_link_is_a_warning() {
        let temp = TempDir::new().unwrap();
        let root = temp.path().join("DDAM1");
        write(&root, "SDS/data/P/v1/id1/a_sdfa", 10);
        std::os::unix::fs::symlink(
            temp.path().join("gone"),
            root.join("SDS/data/P/v1/id1/dangling_sdfa"),
        )
        .unwrap();

        let outcome = JwalkScanner::new().scan(&ScanConfig::new([&root])).unwrap();

        assert_eq!(outcome.stats.files_matched, 1);
        assert_eq!(outcome.stats.bytes_matched, 10);
        assert_eq!(outcome.warnings.len(), 1);
        assert_eq!(outcome.warnings[0].kind, WarningKind::MetadataError);
        assert!(outcome.warnings[0].path.ends_with("dangling_sdfa"));
    }

    #[cfg(unix)]
    #[test]
    fn test_follow_symlinks_descends_linked_directories() {
        let temp = TempDir::new().unwrap();
        let root = temp.path().join("DDAM1");
        write(temp.path(), "elsewhere/x_sdfa", 40);
        write(&root, "SDS/data/P/v1/id1/a_sdfa", 10);
        std::os::unix::fs::symlink(
            temp.path().join("elsewhere"),
            root.join("SDS/data/P/v1/linked"),
        )
        .unwrap();

        let plain = JwalkScanner::new().scan(&ScanConfig::new([&root])).unwrap();
        assert_eq!(plain.stats.files_matched, 1);
        assert_eq!(plain.stats.bytes_matched, 10);

        let config = ScanConfig::builder()
            .roots(vec![root.clone()])
            .follow_symlinks(true)
            .build()
            .unwrap();
        let followed = JwalkScanner::new().scan(&config).unwrap();
        assert_eq!(followed.stats.files_matched, 2);
        assert_eq!(followed.stats.bytes_matched, 50);
        assert!(
            followed
                .observations
                .iter()
                .any(|o| o.identity.ident == "linked" && o.size == 40)
        );
    }

    #[test]
    fn test_progress_is_published() {
        let (_temp, root1, root2) = create_test_roots();
        let config = ScanConfig::new([root1, root2]);

        let scanner = JwalkScanner::new();
        let mut rx = scanner.subscribe();
        scanner.scan(&config).unwrap();

        let last = rx.try_recv().unwrap();
        assert_eq!(last.files_matched, 4);
        assert_eq!(last.bytes_matched, 407);
    }
}
