//! Formatting functions for UI output.
//!
//! Errors and warnings go to stderr, progress and results to stdout.
//! Styling is dropped automatically when the stream is not a terminal.

use console::style;

use crate::backup::OperationRecord;

/// Format and print an error message in red.
pub fn display_error(message: &str) {
    eprintln!("{} {}", style("ERROR:").red(), message);
}

/// Format and print a warning with a yellow marker.
pub fn display_warning(message: &str) {
    eprintln!("{} {}", style("⚠ WARNING:").yellow(), message);
}

/// Format and print a success message with green checkmark.
pub fn display_success(message: &str) {
    println!("{} {}", style("✓").green(), message);
}

/// Format and print a status message with yellow arrow.
pub fn display_status(message: &str) {
    println!("{} {}", style("→").yellow(), message);
}

/// Renders one history entry as a multi-line block.
///
/// # Arguments
/// * `record` - The operation to describe
///
/// # Returns
/// Lines for the id, time, version, updated files and any git side effects,
/// without trailing newline.
pub fn format_operation_summary(record: &OperationRecord) -> String {
    let mut lines = vec![
        format!("ID: {}", record.operation_id),
        format!(
            "  Time: {}",
            record.timestamp.format("%Y-%m-%d %H:%M:%S UTC")
        ),
        format!("  Version: {}", record.version),
        format!("  Files: {}", record.files_updated.len()),
    ];

    for path in &record.files_updated {
        lines.push(format!("    - {}", path.display()));
    }

    if record.git_tag {
        let tag = record.git_tag_name.as_deref().unwrap_or(&record.version);
        lines.push(format!("  Git tag: {}", tag));
    }
    if record.git_commit {
        let commit = record.git_commit_hash.as_deref().unwrap_or("unknown");
        lines.push(format!("  Git commit: {}", commit));
    }

    lines.join("\n")
}

/// Display recent operations, newest first.
///
/// # Arguments
/// * `records` - Operations to show, already ordered newest first
pub fn display_operation_history(records: &[OperationRecord]) {
    if records.is_empty() {
        display_status("No operations found in history");
        return;
    }

    println!(
        "\n{}",
        style(format!("Recent operations (showing last {}):", records.len())).bold()
    );
    for record in records {
        println!("\n{}", format_operation_summary(record));
    }
}
