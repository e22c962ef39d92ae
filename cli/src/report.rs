#![deny(missing_docs)]

//! # Reporting
//!
//! Per-target results of a run, printed as text or JSON.

use serde::Serialize;
use std::fmt::Write as _;
use std::path::PathBuf;

/// What happened to one target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    /// Marker inserted (or would be, under `--dry-run`).
    Marked,
    /// Marker already present; nothing to do.
    AlreadyMarked,
    /// Declaration absent from the file (or from every discovered file).
    NotFound,
    /// The target could not be processed (bad kind, unreadable file, ...).
    Failed,
}

/// Result for one configured target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItemReport {
    /// Declaration name.
    pub name: String,
    /// Declaration kind as configured.
    pub kind: String,
    /// File the target was applied to, once known.
    pub file: Option<PathBuf>,
    /// Outcome.
    pub status: Status,
    /// 1-based line of the declaration header in the file as finally written.
    pub line: Option<usize>,
    /// Error description for `Failed`.
    pub detail: Option<String>,
}

/// Proposed change for one file under `--dry-run`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileDiff {
    /// File that would be rewritten.
    pub file: PathBuf,
    /// Unified diff of the change.
    pub diff: String,
}

/// Totals per status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Summary {
    /// Targets marked.
    pub marked: usize,
    /// Targets already marked.
    pub already_marked: usize,
    /// Targets not found.
    pub not_found: usize,
    /// Targets that failed.
    pub failed: usize,
}

/// Everything a run produced.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunReport {
    /// One entry per target, in configuration order.
    pub items: Vec<ItemReport>,
    /// Diffs of files that would change (dry runs only).
    pub diffs: Vec<FileDiff>,
    /// Files actually rewritten.
    pub written: Vec<PathBuf>,
}

impl RunReport {
    /// Counts items by status.
    pub fn summary(&self) -> Summary {
        let mut summary = Summary::default();
        for item in &self.items {
            match item.status {
                Status::Marked => summary.marked += 1,
                Status::AlreadyMarked => summary.already_marked += 1,
                Status::NotFound => summary.not_found += 1,
                Status::Failed => summary.failed += 1,
            }
        }
        summary
    }

    /// Whether the run should exit non-zero.
    ///
    /// Failures always count; missing declarations only when `strict`.
    pub fn is_failure(&self, strict: bool) -> bool {
        let summary = self.summary();
        summary.failed > 0 || (strict && summary.not_found > 0)
    }

    /// Human-readable report.
    pub fn to_text(&self) -> String {
        let mut out = String::new();

        for diff in &self.diffs {
            let _ = writeln!(out, "--- {}", diff.file.display());
            out.push_str(&diff.diff);
            out.push('\n');
        }

        for item in &self.items {
            let (symbol, label) = match item.status {
                Status::Marked => ("✓", "marked"),
                Status::AlreadyMarked => ("=", "already marked"),
                Status::NotFound => ("✗", "not found"),
                Status::Failed => ("!", "failed"),
            };
            let _ = write!(out, "{} {:<15} {} {}", symbol, label, item.kind, item.name);
            if let Some(file) = &item.file {
                let _ = write!(out, "  {}", file.display());
                if let Some(line) = item.line {
                    let _ = write!(out, ":{}", line);
                }
            }
            if let Some(detail) = &item.detail {
                let _ = write!(out, "  ({})", detail);
            }
            out.push('\n');
        }

        let s = self.summary();
        let _ = writeln!(
            out,
            "\n{} marked, {} already marked, {} not found, {} failed",
            s.marked, s.already_marked, s.not_found, s.failed
        );
        out
    }

    /// Machine-readable report.
    pub fn to_json(&self) -> serde_json::Result<String> {
        let value = serde_json::json!({
            "items": self.items,
            "diffs": self.diffs,
            "written": self.written,
            "summary": self.summary(),
        });
        serde_json::to_string_pretty(&value)
    }
}
