//! Output formatting for the command-line harness.
//!
//! Errors go to stderr in red, everything else to stdout. Status lines are printed
//! exactly as git prints them (`XY path`) so the output stays scriptable.

use crate::core::{git_status::EntryStatus, state::Freshness, summary::StatusSummary};
use colored::*;
use std::path::Path;

/// Formats and prints an error message
///
/// # Format
/// ```text
/// ✕ Error: <message>
/// ```
pub fn print_error(message: &str) {
    eprintln!("{} {}", "✕ Error:".red(), message);
}

/// Formats and prints a success message
pub fn print_success(message: &str) {
    println!("{} {}", "✓".green(), message);
}

pub fn print_info(message: &str) {
    println!("{}", message.bright_black());
}

/// `index +A ~M -R | worktree +A ~M -R`
pub fn format_summary(summary: &StatusSummary) -> String {
    format!(
        "index +{} ~{} -{} | worktree +{} ~{} -{}",
        summary.index.added,
        summary.index.modified,
        summary.index.removed,
        summary.working_tree.added,
        summary.working_tree.modified,
        summary.working_tree.removed,
    )
}

pub fn format_entry(status: &EntryStatus, path: &Path) -> String {
    format!("{status} {}", path.display())
}

pub fn format_freshness(freshness: &Freshness) -> Option<String> {
    match freshness {
        Freshness::Current => None,
        Freshness::Unavailable { reason } => Some(format!("status unavailable: {reason}")),
    }
}
