//! Terminal output formatting.
//!
//! User-facing results (summaries, listings) go to stdout through this module;
//! diagnostics go through `tracing` on stderr.

use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use std::collections::HashMap;

/// Styled CLI output helpers.
pub struct OutputFormatter;

impl OutputFormatter {
    /// Prints a success message in green with a checkmark.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use mediasort::output::OutputFormatter;
    /// OutputFormatter::success("All files organized");
    /// ```
    pub fn success(message: &str) {
        println!("{} {}", "✓".green(), message);
    }

    /// Prints an error message in red with an X mark.
    pub fn error(message: &str) {
        eprintln!("{} {}", "✗".red(), message);
    }

    /// Prints a warning message in yellow with a warning symbol.
    pub fn warning(message: &str) {
        println!("{} {}", "⚠".yellow(), message);
    }

    /// Prints a regular message without styling.
    pub fn plain(message: &str) {
        println!("{}", message);
    }

    /// Prints a section header.
    pub fn header(header: &str) {
        println!("\n{}", header.bold());
    }

    /// Creates a progress bar for executing a confirmed plan.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use mediasort::output::OutputFormatter;
    /// let pb = OutputFormatter::create_progress_bar(100);
    /// pb.inc(1);
    /// pb.finish_and_clear();
    /// ```
    pub fn create_progress_bar(total: u64) -> ProgressBar {
        let pb = ProgressBar::new(total);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.cyan} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                .expect("Invalid progress bar template")
                .progress_chars("█▓░"),
        );
        pb
    }

    /// Prints a summary table of file counts per outcome.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use mediasort::output::OutputFormatter;
    /// use std::collections::HashMap;
    ///
    /// let mut counts = HashMap::new();
    /// counts.insert("copied".to_string(), 15);
    /// counts.insert("unresolved".to_string(), 2);
    /// OutputFormatter::summary_table(&counts, 17);
    /// ```
    pub fn summary_table(outcome_counts: &HashMap<String, usize>, total_files: usize) {
        Self::header("SUMMARY");

        let mut outcomes: Vec<_> = outcome_counts.iter().collect();
        outcomes.sort_by_key(|&(name, _)| name);

        let max_outcome_len = outcomes
            .iter()
            .map(|(name, _)| name.len())
            .max()
            .unwrap_or(0)
            .max(7);

        println!(
            "{:<width$} | {}",
            "Outcome".bold(),
            "Files".bold(),
            width = max_outcome_len
        );
        println!("{}", "-".repeat(max_outcome_len + 10));

        for (outcome, count) in &outcomes {
            println!(
                "{:<width$} | {}",
                outcome,
                count.to_string().green(),
                width = max_outcome_len
            );
        }

        println!("{}", "-".repeat(max_outcome_len + 10));
        println!(
            "{:<width$} | {} {}",
            "Total".bold(),
            total_files.to_string().green().bold(),
            if total_files == 1 { "file" } else { "files" },
            width = max_outcome_len
        );
    }

    /// Prints a dry-run notice message.
    pub fn dry_run_notice(message: &str) {
        println!("{}", format!("[DRY RUN] {}", message).yellow());
    }
}
