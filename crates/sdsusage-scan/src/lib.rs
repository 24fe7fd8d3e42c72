//! Data file scanner for sdsusage.
//!
//! Walks `<root>/SDS/data/<project>/<version>/<ident>/...` under every known
//! root with jwalk and turns each matching data file (name ending in
//! `_sdfa` by default) into an [`Observation`].
//!
//! Unreadable entries and missing roots never fail the scan; they are
//! recorded as [`ScanWarning`]s and simply contribute no bytes.
//!
//! # Example
//!
//! ```rust,no_run
//! use sdsusage_scan::{JwalkScanner, ScanConfig};
//!
//! let config = ScanConfig::new(["/data/DDAM1", "/data/DDAM2"]);
//! let outcome = JwalkScanner::new().scan(&config).unwrap();
//!
//! println!("{} data files, {} bytes", outcome.stats.files_matched, outcome.stats.bytes_matched);
//! ```
//!
//! # Progress Monitoring
//!
//! ```rust,no_run
//! use sdsusage_scan::{JwalkScanner, ScanConfig};
//!
//! let scanner = JwalkScanner::new();
//! let mut progress_rx = scanner.subscribe();
//!
//! std::thread::spawn(move || {
//!     while let Ok(progress) = progress_rx.blocking_recv() {
//!         eprintln!("{} files", progress.files_matched);
//!     }
//! });
//!
//! let outcome = scanner.scan(&ScanConfig::default());
//! ```

mod classify;
mod progress;
mod scanner;

pub use classify::classify;
pub use progress::ScanProgress;
pub use scanner::JwalkScanner;

// Re-export core types for convenience
pub use sdsusage_core::{
    IdentityKey, Observation, ScanConfig, ScanError, ScanOutcome, ScanStats, ScanWarning,
    WarningKind,
};
