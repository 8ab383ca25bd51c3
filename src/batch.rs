//! Batch coordination: resolve, confirm and transfer a list of files.
//!
//! Two confirmation modes are supported:
//! - per file: each file is resolved, confirmed and transferred in turn
//! - together: every file is resolved into a [`TransferPlan`] first, the plan
//!   is confirmed once, then all transfers run
//!
//! Per-file failures (unresolved date, occupied destination, I/O error) are
//! logged and collected in the [`BatchReport`]; they never stop the run.

use crate::config::RunConfig;
use crate::conflict::{ConflictAction, ConflictResolver};
use crate::file_transfer::{TransferExecutor, TransferMode};
use crate::output::OutputFormatter;
use crate::path_resolver::{PathResolver, ResolvedBy};
use crate::prompt::Confirm;
use indicatif::ProgressBar;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};

/// Fatal errors that abort a batch.
#[derive(Debug, thiserror::Error)]
pub enum BatchError {
    #[error("could not read confirmation: {0}")]
    Prompt(#[from] io::Error),
}

/// A file scheduled for transfer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedTransfer {
    pub source: PathBuf,
    /// Final absolute destination after conflict resolution.
    pub destination: PathBuf,
    pub action: ConflictAction,
    pub resolved_by: ResolvedBy,
}

/// Sources mapped to final destinations, in scan order.
///
/// Each source appears at most once, and each destination is claimed by at
/// most one source.
#[derive(Debug, Clone, Default)]
pub struct TransferPlan {
    entries: Vec<PlannedTransfer>,
    sources: HashSet<PathBuf>,
    destinations: HashSet<PathBuf>,
}

impl TransferPlan {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an entry; returns false if its source or destination is already planned.
    pub fn push(&mut self, entry: PlannedTransfer) -> bool {
        if self.sources.contains(&entry.source) || self.destinations.contains(&entry.destination) {
            return false;
        }
        self.sources.insert(entry.source.clone());
        self.destinations.insert(entry.destination.clone());
        self.entries.push(entry);
        true
    }

    /// Destinations already claimed by planned entries.
    pub fn destinations(&self) -> &HashSet<PathBuf> {
        &self.destinations
    }

    pub fn entries(&self) -> &[PlannedTransfer] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn into_entries(self) -> Vec<PlannedTransfer> {
        self.entries
    }
}

/// Why a file was left out of the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    /// No strategy could date the file.
    Unresolved,
    /// The destination is occupied and policy says skip.
    ConflictSkip,
    /// Copy, move or directory creation failed.
    Transfer,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FailureKind::Unresolved => "unresolved",
            FailureKind::ConflictSkip => "skipped (exists)",
            FailureKind::Transfer => "failed",
        };
        f.write_str(name)
    }
}

/// A per-file failure with its reason.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileFailure {
    pub path: PathBuf,
    pub kind: FailureKind,
    pub reason: String,
}

/// Outcome of a batch run.
#[derive(Debug, Clone)]
pub struct BatchReport {
    pub mode: TransferMode,
    pub dry_run: bool,
    /// Files that were copied or moved.
    pub transferred: Vec<PlannedTransfer>,
    /// Files that would have been transferred (dry run only).
    pub planned: Vec<PlannedTransfer>,
    /// Files the user declined to transfer.
    pub declined: usize,
    /// Files already at their resolved destination.
    pub in_place: usize,
    pub failures: Vec<FileFailure>,
}

impl BatchReport {
    fn new(config: &RunConfig) -> Self {
        Self {
            mode: config.mode,
            dry_run: config.dry_run,
            transferred: Vec::new(),
            planned: Vec::new(),
            declined: 0,
            in_place: 0,
            failures: Vec::new(),
        }
    }

    /// Number of files that failed for any reason.
    pub fn failed_count(&self) -> usize {
        self.failures.len()
    }

    /// True when no file failed.
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    /// Number of failures of the given kind.
    pub fn failures_of(&self, kind: FailureKind) -> usize {
        self.failures.iter().filter(|f| f.kind == kind).count()
    }

    /// Per-outcome counts for the summary table.
    pub fn outcome_counts(&self) -> HashMap<String, usize> {
        let mut counts: HashMap<String, usize> = HashMap::new();

        for entry in &self.transferred {
            let label = match entry.action {
                ConflictAction::Rename => format!("{} (renamed)", self.mode.past_tense()),
                ConflictAction::Overwrite => format!("{} (overwrote)", self.mode.past_tense()),
                _ => self.mode.past_tense().to_string(),
            };
            *counts.entry(label).or_insert(0) += 1;
        }
        if !self.planned.is_empty() {
            counts.insert(format!("would {}", self.mode), self.planned.len());
        }
        if self.declined > 0 {
            counts.insert("declined".to_string(), self.declined);
        }
        if self.in_place > 0 {
            counts.insert("already in place".to_string(), self.in_place);
        }
        for failure in &self.failures {
            *counts.entry(failure.kind.to_string()).or_insert(0) += 1;
        }

        counts
    }

    /// Total number of files the run looked at.
    pub fn total(&self) -> usize {
        self.transferred.len()
            + self.planned.len()
            + self.declined
            + self.in_place
            + self.failures.len()
    }
}

/// Drives resolution, conflict handling, confirmation and transfer.
pub struct BatchCoordinator<'a> {
    config: &'a RunConfig,
    resolver: &'a PathResolver,
    conflicts: ConflictResolver,
    confirm: &'a mut dyn Confirm,
    show_progress: bool,
}

impl<'a> BatchCoordinator<'a> {
    pub fn new(
        config: &'a RunConfig,
        resolver: &'a PathResolver,
        confirm: &'a mut dyn Confirm,
    ) -> Self {
        Self {
            config,
            resolver,
            conflicts: ConflictResolver::new(config.conflict_policy()),
            confirm,
            show_progress: false,
        }
    }

    /// Shows a progress bar while a confirmed plan executes.
    pub fn with_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    /// Processes `files` in order and reports what happened to each.
    ///
    /// Only a failure to read a confirmation aborts the run.
    pub fn run(&mut self, files: &[PathBuf]) -> Result<BatchReport, BatchError> {
        let mut report = BatchReport::new(self.config);

        if self.config.together {
            self.run_together(files, &mut report)?;
        } else {
            self.run_per_file(files, &mut report)?;
        }

        if !report.is_success() {
            warn!(failed = report.failed_count(), "some files were not organized");
        }
        info!("done");
        Ok(report)
    }

    fn run_per_file(&mut self, files: &[PathBuf], report: &mut BatchReport) -> Result<(), BatchError> {
        let mut claimed: HashSet<PathBuf> = HashSet::new();

        for file in files {
            let Some(entry) = self.plan_file(file, &claimed, report) else {
                continue;
            };

            if self.config.dry_run {
                self.log_planned(&entry);
                claimed.insert(entry.destination.clone());
                report.planned.push(entry);
                continue;
            }

            let question = format!(
                "Are you sure you want to {} {} to {}?",
                self.config.mode,
                entry.source.display(),
                entry.destination.display()
            );
            if !self.confirm.confirm(&question)? {
                info!(source = %entry.source.display(), "declined");
                report.declined += 1;
                continue;
            }

            claimed.insert(entry.destination.clone());
            self.execute(entry, report, None);
        }

        Ok(())
    }

    fn run_together(&mut self, files: &[PathBuf], report: &mut BatchReport) -> Result<(), BatchError> {
        let mut plan = TransferPlan::new();
        for file in files {
            if let Some(entry) = self.plan_file(file, plan.destinations(), report) {
                let source = entry.source.clone();
                if !plan.push(entry) {
                    warn!(source = %source.display(), "already planned in this run");
                    report.failures.push(FileFailure {
                        path: source,
                        kind: FailureKind::ConflictSkip,
                        reason: "source or destination already planned".to_string(),
                    });
                }
            }
        }

        if plan.is_empty() {
            info!("nothing to transfer");
            return Ok(());
        }

        if self.config.dry_run {
            for entry in plan.entries() {
                self.log_planned(entry);
            }
            report.planned = plan.into_entries();
            return Ok(());
        }

        let question = format!(
            "Are you sure you want to {} all {} files?",
            self.config.mode,
            plan.len()
        );
        if !self.confirm.confirm(&question)? {
            info!(files = plan.len(), "plan declined");
            report.declined += plan.len();
            return Ok(());
        }

        let progress = if self.show_progress {
            OutputFormatter::create_progress_bar(plan.len() as u64)
        } else {
            ProgressBar::hidden()
        };
        for entry in plan.into_entries() {
            self.execute(entry, report, Some(&progress));
            progress.inc(1);
        }
        progress.finish_and_clear();

        Ok(())
    }

    /// Resolves one file to a final destination.
    ///
    /// Returns `None` (after recording why in `report`) when the file is left
    /// out of the run.
    fn plan_file(
        &self,
        file: &Path,
        claimed: &HashSet<PathBuf>,
        report: &mut BatchReport,
    ) -> Option<PlannedTransfer> {
        let resolved = match self.resolver.resolve(file) {
            Ok(resolved) => resolved,
            Err(e) => {
                error!(source = %file.display(), "error generating destination: {}", e);
                report.failures.push(FileFailure {
                    path: file.to_path_buf(),
                    kind: FailureKind::Unresolved,
                    reason: e.to_string(),
                });
                return None;
            }
        };

        let candidate = self.config.destination.join(resolved.relative_path());
        if is_same_file(file, &candidate) {
            info!(source = %file.display(), "already in place");
            report.in_place += 1;
            return None;
        }

        let resolution = self.conflicts.resolve(&candidate, claimed);
        if resolution.action == ConflictAction::Skip {
            error!(
                source = %file.display(),
                destination = %candidate.display(),
                "destination exists, skipping"
            );
            report.failures.push(FileFailure {
                path: file.to_path_buf(),
                kind: FailureKind::ConflictSkip,
                reason: format!("destination {} exists", candidate.display()),
            });
            return None;
        }

        if resolution.action != ConflictAction::Proceed {
            info!(
                destination = %candidate.display(),
                action = %resolution.action,
                final_destination = %resolution.path.display(),
                "destination exists"
            );
        }

        Some(PlannedTransfer {
            source: file.to_path_buf(),
            destination: resolution.path,
            action: resolution.action,
            resolved_by: resolved.resolved_by,
        })
    }

    fn log_planned(&self, entry: &PlannedTransfer) {
        info!(
            "[dry run] would {} {} to {} ({}, by {})",
            self.config.mode,
            entry.source.display(),
            entry.destination.display(),
            entry.action,
            entry.resolved_by
        );
    }

    fn execute(&self, entry: PlannedTransfer, report: &mut BatchReport, progress: Option<&ProgressBar>) {
        let mode = self.config.mode;
        let log = |f: &dyn Fn()| match progress {
            Some(pb) => pb.suspend(f),
            None => f(),
        };

        log(&|| {
            info!(
                "{} is being {} to {}",
                entry.source.display(),
                mode.past_tense(),
                entry.destination.display()
            )
        });

        match TransferExecutor::transfer(&entry.source, &entry.destination, mode) {
            Ok(()) => report.transferred.push(entry),
            Err(e) => {
                log(&|| error!(source = %entry.source.display(), "error processing file: {}", e));
                report.failures.push(FileFailure {
                    path: entry.source.clone(),
                    kind: FailureKind::Transfer,
                    reason: e.to_string(),
                });
            }
        }
    }
}

/// True when both paths exist and refer to the same file.
fn is_same_file(a: &Path, b: &Path) -> bool {
    match (fs::canonicalize(a), fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}
