//! Command-line interface module for mediasort.
//!
//! This module handles all CLI-related functionality including:
//! - Command parsing
//! - Configuration loading and validation
//! - Organization orchestration
//! - Extension listing

use crate::batch::{BatchCoordinator, BatchReport};
use crate::config::{OrganizerConfig, RunConfig};
use crate::file_category::ExtensionTable;
use crate::file_transfer::TransferMode;
use crate::output::OutputFormatter;
use crate::path_resolver::PathResolver;
use crate::prompt::{AutoConfirm, Confirm, LinePrompt};
use crate::scan::{list_extensions, scan_media};
use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tracing::{debug, info};

#[derive(Debug, Parser)]
#[command(name = "mediasort", version)]
#[command(about = "Organize photos into <alias>/<year>/<month> folders", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Log debug output (overridden by MEDIASORT_LOG)
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Copy or move images into dated folders under the destination
    Organize(OrganizeArgs),
    /// List the distinct file extensions found under a directory
    Exts(ExtsArgs),
}

#[derive(Debug, Args)]
pub struct OrganizeArgs {
    /// Directory to scan for media files
    #[arg(short, long)]
    pub source: PathBuf,

    /// Root directory of the organized tree
    #[arg(short, long = "dest")]
    pub destination: PathBuf,

    /// Copy or move files
    #[arg(short, long, value_enum)]
    pub mode: TransferMode,

    /// Show what would happen without touching any file
    #[arg(long, alias = "dry")]
    pub dry_run: bool,

    /// Rename instead of skipping when the destination exists
    #[arg(long)]
    pub no_skip: bool,

    /// Overwrite existing destination files
    #[arg(short, long)]
    pub overwrite: bool,

    /// Answer yes to every confirmation
    #[arg(short, long)]
    pub yes: bool,

    /// Plan all files first and confirm once
    #[arg(short, long)]
    pub together: bool,

    /// Path to a TOML file with device aliases and timestamp patterns
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

impl OrganizeArgs {
    pub fn to_run_config(&self) -> RunConfig {
        RunConfig {
            source: self.source.clone(),
            destination: self.destination.clone(),
            mode: self.mode,
            dry_run: self.dry_run,
            no_skip: self.no_skip,
            overwrite: self.overwrite,
            yes: self.yes,
            together: self.together,
        }
    }
}

#[derive(Debug, Args)]
pub struct ExtsArgs {
    /// Directory to inspect
    pub dir: PathBuf,

    /// Print the listing as JSON
    #[arg(long)]
    pub json: bool,
}

/// Process-level result of a command that completed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitStatus {
    /// Every file was handled.
    Success,
    /// At least one file could not be organized.
    FilesFailed,
}

/// Runs a parsed command.
///
/// Configuration problems are returned as errors before any file is touched.
/// Per-file problems are reported through [`ExitStatus::FilesFailed`].
pub fn run_cli(command: Command) -> anyhow::Result<ExitStatus> {
    match command {
        Command::Organize(args) => {
            let report = organize(&args)?;
            Ok(if report.is_success() {
                ExitStatus::Success
            } else {
                ExitStatus::FilesFailed
            })
        }
        Command::Exts(args) => {
            print_extensions(&args)?;
            Ok(ExitStatus::Success)
        }
    }
}

/// Organizes the source directory described by `args`, prompting on stdin
/// unless `--yes` was given.
pub fn organize(args: &OrganizeArgs) -> anyhow::Result<BatchReport> {
    let config = args.to_run_config();
    config.validate()?;

    let settings = OrganizerConfig::load(args.config.as_deref())
        .context("Error loading configuration")?
        .compile()
        .context("Error compiling configuration")?;
    debug!(aliases = settings.aliases.len(), "configuration loaded");

    let resolver = PathResolver::new(settings.aliases, settings.timestamps);
    let mut confirm: Box<dyn Confirm> = if config.yes {
        Box::new(AutoConfirm)
    } else {
        Box::new(LinePrompt::stdio())
    };

    let report = organize_with(
        &config,
        &resolver,
        &ExtensionTable::default(),
        confirm.as_mut(),
        true,
    )?;
    print_report(&report);
    Ok(report)
}

/// Scans `config.source` and runs a batch over the images found.
///
/// Video and audio files are collected but not organized.
pub fn organize_with(
    config: &RunConfig,
    resolver: &PathResolver,
    table: &ExtensionTable,
    confirm: &mut dyn Confirm,
    show_progress: bool,
) -> anyhow::Result<BatchReport> {
    info!(
        source = %config.source.display(),
        destination = %config.destination.display(),
        mode = %config.mode,
        dry_run = config.dry_run,
        "organizing"
    );

    let scan = scan_media(&config.source, table)
        .with_context(|| format!("Error scanning {}", config.source.display()))?;
    info!(
        images = scan.images.len(),
        videos = scan.videos.len(),
        audio = scan.audio.len(),
        "media files found"
    );
    if !scan.videos.is_empty() || !scan.audio.is_empty() {
        debug!("video and audio files are left in place");
    }

    let report = BatchCoordinator::new(config, resolver, confirm)
        .with_progress(show_progress)
        .run(&scan.images)?;
    Ok(report)
}

fn print_report(report: &BatchReport) {
    OutputFormatter::summary_table(&report.outcome_counts(), report.total());

    if report.dry_run {
        OutputFormatter::dry_run_notice("No files were modified.");
    }

    if report.is_success() {
        OutputFormatter::success("All files handled.");
        return;
    }

    OutputFormatter::warning(&format!(
        "{} file(s) could not be organized:",
        report.failed_count()
    ));
    for failure in &report.failures {
        OutputFormatter::error(&format!(
            "{} [{}]: {}",
            failure.path.display(),
            failure.kind,
            failure.reason
        ));
    }
}

fn print_extensions(args: &ExtsArgs) -> anyhow::Result<()> {
    let summaries = list_extensions(&args.dir, &ExtensionTable::default())
        .with_context(|| format!("Error scanning {}", args.dir.display()))?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&summaries)?);
        return Ok(());
    }

    OutputFormatter::header(&format!("Extensions under {}", args.dir.display()));
    if summaries.is_empty() {
        OutputFormatter::plain("No files found.");
        return Ok(());
    }

    for (extension, summary) in &summaries {
        let name = if extension.is_empty() {
            "(none)"
        } else {
            extension.as_str()
        };
        let category = summary.category.map(|c| c.label()).unwrap_or("-");
        let mime = summary.mime_type.as_deref().unwrap_or("unknown");
        OutputFormatter::plain(&format!(
            "{:<8} {:>6}  {:<6} {}",
            name, summary.count, category, mime
        ));
    }

    Ok(())
}
