#![deny(missing_docs)]

//! # Mark Command
//!
//! Applies every configured target to its file:
//!
//! 1. **Resolve**: parse each target and find its file (explicit path under
//!    `root`, or discovery by walking `root`).
//! 2. **Group**: targets sharing a file are applied in order to one in-memory
//!    copy, so each file is read and written at most once.
//! 3. **Persist**: a file is rewritten only if a marker was inserted, and
//!    never under `--dry-run`.

use crate::config::{DeprecationConfig, TargetEntry};
use crate::diff::unified_diff;
use crate::error::CliResult;
use crate::report::{FileDiff, ItemReport, RunReport, Status};
use deprecator_core::{
    locate, patch_with, AppError, DeclarationTarget, MatchResult, PatchOptions, SourceBuffer,
};
use indexmap::IndexMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// Arguments for the mark command.
#[derive(clap::Args, Debug, Clone)]
pub struct MarkArgs {
    /// Path to the deprecation list (YAML, or JSON with a `.json` extension).
    #[clap(long, short, default_value = "deprecations.yaml")]
    pub config: PathBuf,

    /// Overrides the `root` directory of the configuration.
    #[clap(long)]
    pub root: Option<PathBuf>,

    #[clap(flatten)]
    pub run: RunArgs,
}

/// Arguments for marking a single declaration without a configuration file.
#[derive(clap::Args, Debug, Clone)]
pub struct InsertArgs {
    /// File containing the declaration.
    #[clap(long)]
    pub file: PathBuf,

    /// Declaration kind (`interface` or `class`).
    #[clap(long)]
    pub kind: String,

    /// Declaration name.
    #[clap(long)]
    pub name: String,

    /// Deprecation message.
    #[clap(long)]
    pub message: Option<String>,

    /// Emit `true` as the error flag (usages become compile errors).
    #[clap(long)]
    pub error: bool,

    /// Attribute to insert.
    #[clap(long, default_value = deprecator_core::DEFAULT_ATTRIBUTE)]
    pub attribute: String,

    #[clap(flatten)]
    pub run: RunArgs,
}

/// Options shared by every command that patches files.
#[derive(clap::Args, Debug, Clone, Default)]
pub struct RunArgs {
    /// Show the changes as a diff instead of writing files.
    #[clap(long)]
    pub dry_run: bool,

    /// Exit non-zero when any declaration is not found.
    #[clap(long)]
    pub strict: bool,

    /// Report format.
    #[clap(long, value_enum, default_value_t = Format::Text)]
    pub format: Format,
}

/// Output format of the report.
#[derive(clap::ValueEnum, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Format {
    /// Aligned lines plus a summary.
    #[default]
    Text,
    /// Pretty-printed JSON.
    Json,
}

/// A fully resolved batch: where to look and what to mark.
#[derive(Debug, Clone)]
pub struct Plan {
    /// Base directory for relative paths and discovery.
    pub root: PathBuf,
    /// Extensions considered during discovery.
    pub extensions: Vec<String>,
    /// Patcher tuning.
    pub options: PatchOptions,
    /// Targets in order.
    pub targets: Vec<TargetEntry>,
}

impl Plan {
    /// Builds a plan from a loaded configuration.
    pub fn from_config(config: DeprecationConfig, root_override: Option<PathBuf>) -> Self {
        let mut options = PatchOptions::default();
        if let Some(lookback) = config.lookback {
            options.lookback = lookback;
        }
        Self {
            root: root_override
                .or(config.root)
                .unwrap_or_else(|| PathBuf::from(".")),
            extensions: config.extensions,
            options,
            targets: config.targets,
        }
    }
}

impl InsertArgs {
    /// A single-target plan rooted at the current directory.
    pub fn to_plan(&self) -> Plan {
        Plan {
            root: PathBuf::from("."),
            extensions: vec!["cs".to_string()],
            options: PatchOptions::default(),
            targets: vec![TargetEntry {
                file: Some(self.file.clone()),
                kind: self.kind.clone(),
                name: self.name.clone(),
                message: self.message.clone(),
                error: self.error.then_some(true),
                attribute: self.attribute.clone(),
            }],
        }
    }
}

/// Executes the mark command: loads the configuration and runs it.
pub fn execute(args: &MarkArgs) -> CliResult<RunReport> {
    info!("Loading deprecation list from {:?}", args.config);
    let config = DeprecationConfig::load(&args.config)?;
    let plan = Plan::from_config(config, args.root.clone());
    Ok(run(&plan, args.run.dry_run))
}

/// Applies `plan`. Individual failures are reported, never propagated, so one
/// bad target or unreadable file does not stop the rest of the batch.
pub fn run(plan: &Plan, dry_run: bool) -> RunReport {
    let mut report = RunReport::default();
    let mut by_file: IndexMap<PathBuf, Vec<(usize, DeclarationTarget)>> = IndexMap::new();

    // 1. Resolve
    for entry in &plan.targets {
        let index = report.items.len();
        report.items.push(ItemReport {
            name: entry.name.clone(),
            kind: entry.kind.clone(),
            file: None,
            status: Status::NotFound,
            line: None,
            detail: None,
        });

        let target = match entry.to_target() {
            Ok(target) => target,
            Err(e) => {
                warn!("Skipping {}: {}", entry.name, e);
                fail(&mut report.items[index], e.to_string());
                continue;
            }
        };

        let path = match &entry.file {
            Some(file) => Some(plan.root.join(file)),
            None => discover(plan, &target),
        };

        match path {
            Some(path) => {
                report.items[index].file = Some(path.clone());
                by_file.entry(path).or_default().push((index, target));
            }
            None => debug!("{} not found under {:?}", entry.name, plan.root),
        }
    }

    // 2. Group & 3. Persist
    for (path, targets) in by_file {
        process_file(&path, &targets, plan, dry_run, &mut report);
    }

    report
}

fn process_file(
    path: &Path,
    targets: &[(usize, DeclarationTarget)],
    plan: &Plan,
    dry_run: bool,
    report: &mut RunReport,
) {
    let original = match read_source(path) {
        Ok(text) => text,
        Err(e) => {
            warn!("Cannot read {:?}: {}", path, e);
            for (index, _) in targets {
                fail(&mut report.items[*index], e.to_string());
            }
            return;
        }
    };

    let mut content = original.clone();
    let mut marked = Vec::new();

    for (index, target) in targets {
        let patched = patch_with(&content, target, &plan.options);
        let item = &mut report.items[*index];
        match patched.outcome {
            MatchResult::NotFound => item.status = Status::NotFound,
            MatchResult::AlreadyMarked { .. } => item.status = Status::AlreadyMarked,
            MatchResult::FoundAt { .. } => {
                item.status = Status::Marked;
                marked.push(*index);
            }
        }
        content = patched.content;
    }

    // Lines are taken from the final text, after every insertion in this file.
    let buffer = SourceBuffer::parse(&content);
    for (index, target) in targets {
        let item = &mut report.items[*index];
        if item.status == Status::NotFound {
            continue;
        }
        item.line = match locate(&buffer, target, &plan.options) {
            MatchResult::AlreadyMarked { line } | MatchResult::FoundAt { line, .. } => {
                Some(line + 1)
            }
            MatchResult::NotFound => None,
        };
    }

    if content == original {
        return;
    }

    if dry_run {
        report.diffs.push(FileDiff {
            file: path.to_path_buf(),
            diff: unified_diff(&original, &content),
        });
        return;
    }

    match fs::write(path, &content) {
        Ok(()) => {
            info!("Updated {:?} ({} marker(s))", path, marked.len());
            report.written.push(path.to_path_buf());
        }
        Err(e) => {
            warn!("Failed to write {:?}: {}", path, e);
            for index in marked {
                fail(&mut report.items[index], format!("write failed: {}", e));
            }
        }
    }
}

/// Reads a file as UTF-8, distinguishing undecodable content from I/O errors.
fn read_source(path: &Path) -> CliResult<String> {
    let bytes = fs::read(path)?;
    let text = String::from_utf8(bytes).map_err(|e| AppError::Decode(e.utf8_error()))?;
    Ok(text)
}

/// First file under `root` (sorted walk) where the declaration exists.
fn discover(plan: &Plan, target: &DeclarationTarget) -> Option<PathBuf> {
    let walker = WalkDir::new(&plan.root)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter(|e| {
            e.path()
                .extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| plan.extensions.iter().any(|x| x == ext))
        });

    for entry in walker {
        let Ok(text) = read_source(entry.path()) else {
            continue;
        };
        let buffer = SourceBuffer::parse(&text);
        if locate(&buffer, target, &plan.options) != MatchResult::NotFound {
            debug!("Discovered {} in {:?}", target.name(), entry.path());
            return Some(entry.into_path());
        }
    }

    None
}

fn fail(item: &mut ItemReport, detail: String) {
    item.status = Status::Failed;
    item.detail = Some(detail);
}
