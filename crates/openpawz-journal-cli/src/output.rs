//! Human-readable rendering for journal results.
//!
//! With `--json` every command prints its result struct instead.

use openpawz_journal::{FileSystemDiff, HistoryItem, ReplayResult, VerifyReport, VersionDiff};
use serde::Serialize;

pub fn print_json<T: Serialize>(value: &T) -> Result<(), serde_json::Error> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub fn print_history(items: &[HistoryItem]) {
    if items.is_empty() {
        println!("Journal is empty.");
        return;
    }
    for item in items {
        println!(
            "{:>5}  {}  {:<13} {}",
            item.version,
            item.timestamp.format("%Y-%m-%d %H:%M:%S"),
            item.kind,
            item.paths.join(" → ")
        );
    }
}

pub fn print_version_diff(diff: &VersionDiff) {
    println!("v{} ({}) {}", diff.version, diff.entry_kind, diff.path);
    println!(
        "+{} -{} ={}",
        diff.stats.added, diff.stats.removed, diff.stats.unchanged
    );
    for line in &diff.lines {
        println!("{}", line);
    }
}

pub fn print_snapshot(version: usize, replay: &ReplayResult) {
    println!("Memory at version {} ({} files):", version, replay.fs.len());
    for file in replay.fs.files() {
        println!("  {}\t{}", file.content.len(), file.path);
    }
    print_anomalies(&replay.errors, &replay.warnings);
}

pub fn print_verify(report: &VerifyReport) {
    if report.is_consistent() {
        println!("Memory matches journal version {}.", report.journal_version);
    } else {
        println!(
            "Memory differs from journal version {} ({} path(s)):",
            report.journal_version,
            report.diff.total()
        );
        print_fs_diff(&report.diff);
    }
    print_anomalies(&report.replay_errors, &report.replay_warnings);
}

/// `added` = only in live memory, `removed` = only in the journal replay.
pub fn print_fs_diff(diff: &FileSystemDiff) {
    for path in &diff.added {
        println!("  not in journal:      {}", path);
    }
    for path in &diff.removed {
        println!("  missing from memory: {}", path);
    }
    for path in &diff.modified {
        println!("  content differs:     {}", path);
    }
}

fn print_anomalies(errors: &[String], warnings: &[String]) {
    for e in errors {
        eprintln!("replay error: {}", e);
    }
    for w in warnings {
        eprintln!("replay warning: {}", w);
    }
}
