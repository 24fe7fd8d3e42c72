//! sdsusage - storage usage of SDS data files across data roots.
//!
//! Usage:
//!   sdsusage                     Text report for the configured roots
//!   sdsusage report [--depth N]  Text report
//!   sdsusage export [-o FILE]    Export the report to JSON
//!   sdsusage roots               Per-root totals only
//!   sdsusage --help              Show help

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use clap::{ArgAction, Parser, Subcommand};
use color_eyre::eyre::{Context, Result};
use itertools::Itertools;
use tracing_subscriber::EnvFilter;

use sdsusage_analyze::{Distribution, SortKey, SortOrder, SortSpec, UsageAnalyzer, UsageReport};
use sdsusage_scan::{JwalkScanner, ScanConfig, ScanProgress};
use tokio::sync::broadcast::{self, error::RecvError};

#[derive(Parser)]
#[command(
    name = "sdsusage",
    version,
    about = "Storage usage of SDS data files per project, ident and version",
    long_about = "sdsusage scans every data root for `_sdfa` files under \
                  SDS/data/<project>/<version>/<ident>/ and reports how many bytes \
                  each project, ident and version holds, and how they are spread \
                  across the roots."
)]
struct Cli {
    /// Data root to scan (repeatable, in report order; defaults to /data/DDAM1 and /data/DDAM2)
    #[arg(short, long = "root", value_name = "PATH", global = true)]
    roots: Vec<PathBuf>,

    /// JSON scan configuration file
    #[arg(short, long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    /// Sort projects by `total_size` or `name`
    #[arg(long, default_value = "total_size", global = true)]
    sort: SortKey,

    /// Sort direction, `asc` or `desc`
    #[arg(long, default_value = "desc", global = true)]
    order: SortOrder,

    /// Count files whose name ends with this suffix
    #[arg(long, value_name = "SUFFIX", global = true)]
    suffix: Option<String>,

    /// Follow symbolic links while walking
    #[arg(long, global = true, overrides_with = "no_follow_symlinks")]
    follow_symlinks: bool,

    /// Do not follow symbolic links, even if the config file enables it
    #[arg(long, global = true, overrides_with = "follow_symlinks")]
    no_follow_symlinks: bool,

    /// Threads per root walk (0 = auto)
    #[arg(long, global = true)]
    threads: Option<usize>,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Show the usage tree
    Report {
        /// Levels to display: 1 projects, 2 idents, 3 versions
        #[arg(short, long, default_value = "3", value_parser = clap::value_parser!(u8).range(1..=3))]
        depth: u8,

        /// Number of projects to show
        #[arg(short = 'n', long)]
        top: Option<usize>,
    },

    /// Export the report to JSON
    Export {
        /// Output file (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show per-root totals only
    Roots,
}

fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = load_config(&cli)?;
    let sort = SortSpec::new(cli.sort, cli.order);

    match cli.command {
        Some(Command::Report { depth, top }) => run_report(&config, sort, depth, top)?,
        Some(Command::Export { output }) => run_export(&config, sort, output)?,
        Some(Command::Roots) => run_roots(&config, sort)?,
        None => run_report(&config, sort, 3, None)?,
    }

    Ok(())
}

/// Install the stderr log subscriber. `RUST_LOG` overrides `-v`.
fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)))
        .with_writer(std::io::stderr)
        .init();
}

/// Build the scan configuration: config file (or defaults), then CLI overrides.
fn load_config(cli: &Cli) -> Result<ScanConfig> {
    let mut config = match &cli.config {
        Some(path) => read_config(path)?,
        None => ScanConfig::default(),
    };

    if !cli.roots.is_empty() {
        config.roots = cli.roots.clone();
    }
    if let Some(suffix) = &cli.suffix {
        config.file_suffix = suffix.clone();
    }
    if cli.follow_symlinks {
        config.follow_symlinks = true;
    }
    if cli.no_follow_symlinks {
        config.follow_symlinks = false;
    }
    if let Some(threads) = cli.threads {
        config.threads = threads;
    }

    config.validate()?;
    Ok(config)
}

fn read_config(path: &Path) -> Result<ScanConfig> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("Invalid config {}", path.display()))
}

/// Scan all roots and aggregate the result.
fn build_report(config: &ScanConfig, sort: SortSpec) -> Result<UsageReport> {
    eprintln!(
        "Scanning {}...",
        config.roots.iter().map(|r| r.display()).join(", ")
    );

    let scanner = JwalkScanner::new();
    let progress_rx = scanner.subscribe();
    let progress = std::thread::spawn(move || log_progress(progress_rx));

    let outcome = scanner.scan(config).context("Scan failed");
    drop(scanner);
    let _ = progress.join();
    let outcome = outcome?;

    Ok(UsageAnalyzer::new(config.roots.iter().cloned())
        .with_sort(sort)
        .analyze_scan(outcome))
}

/// Log progress snapshots until the scanner is dropped. Returns how many were logged.
fn log_progress(mut progress_rx: broadcast::Receiver<ScanProgress>) -> u64 {
    let mut logged = 0;
    loop {
        let progress = match progress_rx.blocking_recv() {
            Ok(progress) => progress,
            Err(RecvError::Lagged(skipped)) => {
                tracing::debug!(skipped, "progress updates dropped");
                continue;
            }
            Err(RecvError::Closed) => return logged,
        };
        tracing::info!(
            root = %progress.current_root.display(),
            files = progress.files_matched,
            bytes = progress.bytes_matched,
            files_per_sec = %format!("{:.0}", progress.files_per_second()),
            rate = %format!("{}/s", format_size(progress.bytes_per_second() as u64)),
            "scan progress"
        );
        logged += 1;
    }
}

/// Print the usage tree.
fn run_report(config: &ScanConfig, sort: SortSpec, depth: u8, top: Option<usize>) -> Result<()> {
    let report = build_report(config, sort)?;
    write_report(&mut std::io::stdout().lock(), &report, depth, top)?;
    Ok(())
}

/// Export the report as pretty JSON.
fn run_export(config: &ScanConfig, sort: SortSpec, output: Option<PathBuf>) -> Result<()> {
    let report = build_report(config, sort)?;
    let json = serde_json::to_string_pretty(&report)?;

    match output {
        Some(output_path) => {
            std::fs::write(&output_path, json)
                .with_context(|| format!("Failed to write {}", output_path.display()))?;
            eprintln!("Exported to {}", output_path.display());
        }
        None => {
            println!("{}", json);
        }
    }

    Ok(())
}

/// Print per-root totals.
fn run_roots(config: &ScanConfig, sort: SortSpec) -> Result<()> {
    let report = build_report(config, sort)?;
    let mut out = std::io::stdout().lock();
    write_header(&mut out, &report)?;
    write_roots(&mut out, &report.root_distribution)?;
    write_warnings(&mut out, &report)?;
    Ok(())
}

fn write_report(out: &mut impl Write, report: &UsageReport, depth: u8, top: Option<usize>) -> io::Result<()> {
    write_header(out, report)?;
    write_roots(out, &report.root_distribution)?;
    writeln!(out)?;

    if report.projects.is_empty() {
        writeln!(out, " No data files found.")?;
        return write_warnings(out, report);
    }

    let labels: Vec<String> = report.roots.iter().map(|r| root_label(r)).collect();
    writeln!(
        out,
        " {:<44} {:>11} {}",
        "NAME",
        "SIZE",
        labels.iter().map(|l| format!("{:>8}", truncate(l, 8))).join(" ")
    )?;

    let shown = top.unwrap_or(report.projects.len());
    for project in report.projects.iter().take(shown) {
        write_row(out, 0, depth > 1, &project.name, project.total_size, &project.distribution)?;
        if depth < 2 {
            continue;
        }
        for ident in &project.idents {
            write_row(out, 1, depth > 2, &ident.name, ident.total_size, &ident.distribution)?;
            if depth < 3 {
                continue;
            }
            for version in &ident.versions {
                write_row(out, 2, false, version.name(), version.total_size, &version.distribution)?;
            }
        }
    }

    let remaining = report.projects.len().saturating_sub(shown);
    if remaining > 0 {
        writeln!(out, " ... and {} more", remaining)?;
    }

    write_warnings(out, report)
}

fn write_header(out: &mut impl Write, report: &UsageReport) -> io::Result<()> {
    writeln!(out)?;
    writeln!(out, "{}", "─".repeat(72))?;
    writeln!(
        out,
        " Total: {} across {} root(s)",
        format_size(report.total_size),
        report.roots.len()
    )?;
    writeln!(
        out,
        " {} projects, {} idents, {} versions",
        report.project_count(),
        report.ident_count(),
        report.version_count()
    )?;
    if let Some(scan) = &report.scan {
        writeln!(
            out,
            " {} data files scanned in {:.2}s",
            scan.stats.files_matched,
            scan.duration.as_secs_f64()
        )?;
    }
    writeln!(out, "{}", "─".repeat(72))?;
    writeln!(out)
}

fn write_roots(out: &mut impl Write, distribution: &Distribution) -> io::Result<()> {
    writeln!(out, " Roots:")?;
    for entry in distribution {
        writeln!(
            out,
            "   {:<30} {:>11} {:>6.1}% {}",
            truncate(&entry.root.display().to_string(), 30),
            format_size(entry.size),
            entry.percentage,
            make_bar(entry.percentage / 100.0, 20)
        )?;
    }
    Ok(())
}

fn write_row(
    out: &mut impl Write,
    level: usize,
    expanded: bool,
    name: &str,
    size: u64,
    distribution: &Distribution,
) -> io::Result<()> {
    let indent = "  ".repeat(level);
    let marker = if expanded { "▼ " } else { "  " };
    let width = 44usize.saturating_sub(indent.chars().count() + 2);

    writeln!(
        out,
        " {}{}{:<width$} {:>11} {}",
        indent,
        marker,
        truncate(name, width),
        format_size(size),
        distribution
            .iter()
            .map(|e| format!("{:>7.1}%", e.percentage))
            .join(" "),
        width = width
    )
}

fn write_warnings(out: &mut impl Write, report: &UsageReport) -> io::Result<()> {
    let Some(scan) = &report.scan else {
        return Ok(());
    };
    if scan.warnings.is_empty() {
        return Ok(());
    }

    writeln!(out)?;
    writeln!(out, "{} warning(s) during scan", scan.warnings.len())?;
    for warning in &scan.warnings {
        writeln!(out, "   {}", warning.message)?;
    }
    Ok(())
}

/// Short column label for a root: its last path component.
fn root_label(root: &Path) -> String {
    root.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| root.display().to_string())
}

/// Create a simple ASCII bar.
fn make_bar(ratio: f64, width: usize) -> String {
    let filled = ((ratio * width as f64).round() as usize).min(width);
    let empty = width.saturating_sub(filled);
    format!("[{}{}]", "█".repeat(filled), "░".repeat(empty))
}

/// Format size in human-readable form.
fn format_size(bytes: u64) -> String {
    humansize::format_size(bytes, humansize::BINARY)
}

/// Truncate a string to at most `max_len` characters.
fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(1)).collect();
        format!("{kept}…")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sdsusage_scan::{IdentityKey, Observation, ScanOutcome, ScanStats, ScanWarning};
    use std::time::Duration;

    #[test]
    fn test_make_bar() {
        assert_eq!(make_bar(0.0, 4), "[░░░░]");
        assert_eq!(make_bar(0.5, 4), "[██░░]");
        assert_eq!(make_bar(1.0, 4), "[████]");
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("apollo", 10), "apollo");
        assert_eq!(truncate("apollo-mission", 6), "apoll…");
    }

    #[test]
    fn test_root_label() {
        assert_eq!(root_label(Path::new("/data/DDAM1")), "DDAM1");
        assert_eq!(root_label(Path::new("/")), "/");
    }

    #[test]
    fn test_cli_overrides_config() {
        let cli = Cli::parse_from([
            "sdsusage",
            "--root",
            "/a",
            "--root",
            "/b",
            "--suffix",
            ".dat",
            "--sort",
            "name",
            "--order",
            "asc",
        ]);
        let config = load_config(&cli).unwrap();

        assert_eq!(config.roots, vec![PathBuf::from("/a"), PathBuf::from("/b")]);
        assert_eq!(config.file_suffix, ".dat");
        assert_eq!(cli.sort, SortKey::Name);
        assert_eq!(cli.order, SortOrder::Asc);
    }

    #[test]
    fn test_config_file_is_read() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("sdsusage.json");
        std::fs::write(&path, r#"{"roots": ["/x"], "threads": 2}"#).unwrap();

        let cli = Cli::parse_from(["sdsusage", "--config", path.to_str().unwrap(), "roots"]);
        let config = load_config(&cli).unwrap();

        assert_eq!(config.roots, vec![PathBuf::from("/x")]);
        assert_eq!(config.threads, 2);
        assert!(matches!(cli.command, Some(Command::Roots)));
    }

    #[test]
    fn test_no_follow_symlinks_overrides_config_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("sdsusage.json");
        std::fs::write(&path, r#"{"roots": ["/x"], "follow_symlinks": true}"#).unwrap();
        let config_arg = path.to_str().unwrap();

        let from_file = load_config(&Cli::parse_from(["sdsusage", "-c", config_arg])).unwrap();
        assert!(from_file.follow_symlinks);

        let cli = Cli::parse_from(["sdsusage", "-c", config_arg, "--no-follow-symlinks"]);
        assert!(!load_config(&cli).unwrap().follow_symlinks);

        // Last flag wins
        let cli = Cli::parse_from([
            "sdsusage",
            "--no-follow-symlinks",
            "--follow-symlinks",
        ]);
        assert!(load_config(&cli).unwrap().follow_symlinks);
    }

    #[test]
    fn test_duplicate_roots_are_rejected() {
        let cli = Cli::parse_from(["sdsusage", "--root", "/a", "--root", "/a/"]);
        assert!(load_config(&cli).is_err());
    }

    fn render(report: &UsageReport, depth: u8, top: Option<usize>) -> String {
        let mut out = Vec::new();
        write_report(&mut out, report, depth, top).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_empty_report_still_lists_warnings() {
        let outcome = ScanOutcome {
            roots: vec![PathBuf::from("/data/DDAM1")],
            observations: Vec::new(),
            stats: ScanStats::default(),
            warnings: vec![ScanWarning::root_missing("/data/DDAM1")],
            duration: Duration::ZERO,
        };
        let report = UsageAnalyzer::new(["/data/DDAM1"]).analyze_scan(outcome);

        let text = render(&report, 3, None);
        assert!(text.contains("No data files found."));
        assert!(text.contains("1 warning(s) during scan"));
        assert!(text.contains("Root not found or not a directory: /data/DDAM1"));
    }

    #[test]
    fn test_report_lists_tree_down_to_depth() {
        let observations = vec![
            Observation::new("/r/DDAM1", IdentityKey::new("apollo", "v1", "cam01"), 300),
            Observation::new("/r/DDAM2", IdentityKey::new("apollo", "v2", "cam01"), 100),
            Observation::new("/r/DDAM2", IdentityKey::new("zephyr", "v1", "cam02"), 50),
        ];
        let report = UsageAnalyzer::new(["/r/DDAM1", "/r/DDAM2"]).analyze(&observations);

        let full = render(&report, 3, None);
        assert!(full.contains("DDAM1"));
        assert!(full.contains("apollo"));
        assert!(full.contains("cam01"));
        assert!(full.contains("v2"));
        assert!(full.contains("75.0%"));
        assert!(!full.contains("warning(s)"));

        let projects_only = render(&report, 1, Some(1));
        assert!(projects_only.contains("apollo"));
        assert!(!projects_only.contains("cam01"));
        assert!(!projects_only.contains("zephyr"));
        assert!(projects_only.contains("... and 1 more"));
    }

    #[test]
    fn test_progress_logging_survives_lag() {
        let (tx, rx) = broadcast::channel(2);
        for files_matched in 1..=5 {
            tx.send(ScanProgress {
                files_matched,
                ..ScanProgress::new()
            })
            .unwrap();
        }
        drop(tx);

        // The three oldest snapshots are overwritten; the last two still arrive
        assert_eq!(log_progress(rx), 2);
    }
}
