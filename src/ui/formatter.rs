//! Pure formatting functions for UI output.
//!
//! This module contains all display/formatting logic separated from user interaction.
//! `format_*` functions build strings and are testable; `display_*` print them.

use console::style;

use crate::api::Operation;
use crate::boundary::BoundaryWarning;
use crate::release::ReleaseOutcome;

/// Format and print an error message in red.
pub fn display_error(message: &str) {
    eprintln!("{} {}", style("ERROR:").red().bold(), message);
}

/// Format and print a success message with green checkmark.
pub fn display_success(message: &str) {
    println!("{} {}", style("✓").green(), message);
}

/// Format and print a status message with yellow arrow.
pub fn display_status(message: &str) {
    println!("{} {}", style("→").yellow(), message);
}

/// Display a boundary warning to the user.
pub fn display_boundary_warning(warning: &BoundaryWarning) {
    eprintln!("{} {}", style("⚠ WARNING:").yellow(), warning);
}

/// One-line summary of an operation's state
pub fn format_operation(operation: &Operation) -> String {
    match (&operation.error, operation.done) {
        (Some(status), _) => format!("{}: failed ({})", operation.name, status.message),
        (None, true) => format!("{}: done", operation.name),
        (None, false) => format!("{}: running", operation.name),
    }
}

pub fn display_operation(operation: &Operation) {
    println!("{}", format_operation(operation));
}

/// Summary lines for a finished (or submitted) release
pub fn format_release_outcome(outcome: &ReleaseOutcome) -> Vec<String> {
    let mut lines = vec![format!("Released version {} as {}", outcome.version, outcome.tag)];
    for hash in &outcome.commit_hashes {
        lines.push(format!("  commit {}", hash));
    }
    if outcome.completed {
        lines.push(format!("Operation {} completed", outcome.operation.name));
    } else {
        lines.push(format!(
            "Operation {} submitted; run `alis operation wait {}` to follow it",
            outcome.operation.name, outcome.operation.name
        ));
    }
    lines
}

pub fn display_release_outcome(outcome: &ReleaseOutcome) {
    for warning in &outcome.warnings {
        display_boundary_warning(warning);
    }

    let lines = format_release_outcome(outcome);
    if let Some((headline, rest)) = lines.split_first() {
        display_success(headline);
        for line in rest {
            println!("{}", style(line).dim());
        }
    }
}
