//! Reversal of a recorded version bump.
//!
//! Undo is best effort and not transactional: files are restored first, then
//! git changes are reversed. A git failure fails the undo but leaves the
//! restored files in place.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use crate::backup::{BackupManager, OperationRecord};
use crate::git::Repository;
use crate::ui;

/// Copies every backup back over its original.
///
/// Stops at the first missing backup or failed copy; files restored before
/// that point stay restored.
///
/// # Returns
/// `true` if every entry was restored (trivially for an empty map).
pub fn restore_files_from_backups(backups: &BTreeMap<PathBuf, PathBuf>) -> bool {
    for (original, backup) in backups {
        if !backup.is_file() {
            ui::display_error(&format!(
                "Backup file not found: {} (for {})",
                backup.display(),
                original.display()
            ));
            return false;
        }

        if let Err(e) = fs::copy(backup, original) {
            ui::display_error(&format!("Failed to restore {}: {}", original.display(), e));
            return false;
        }
        ui::display_success(&format!("Restored {}", original.display()));
    }

    true
}

fn modified_time(path: &Path) -> std::io::Result<SystemTime> {
    fs::metadata(path)?.modified()
}

/// Collects warnings about data an undo of `record` could lose.
pub fn validate_undo_safety(record: &OperationRecord) -> Vec<String> {
    let mut warnings = Vec::new();

    for (original, backup) in &record.backups {
        if !backup.exists() {
            warnings.push(format!(
                "Backup file not found for {}: {}",
                original.display(),
                backup.display()
            ));
            continue;
        }
        if !original.exists() {
            continue;
        }

        match (modified_time(original), modified_time(backup)) {
            (Ok(current), Ok(backed_up)) if current > backed_up => warnings.push(format!(
                "{} has been modified since its backup was taken; restoring will overwrite it",
                original.display()
            )),
            (Ok(_), Ok(_)) => {}
            (Err(e), _) | (_, Err(e)) => warnings.push(format!(
                "Could not compare modification times for {}: {}",
                original.display(),
                e
            )),
        }
    }

    warnings
}

/// Deletes the recorded tag and resets the recorded commit.
///
/// Safety checks that fail (tag already gone, HEAD moved on, state unreadable)
/// are reported and the step is skipped. Only a failed delete or reset
/// returns `false`. Without a repository there is nothing to undo.
pub fn undo_git_operations(record: &OperationRecord, repo: Option<&dyn Repository>) -> bool {
    if !record.has_git_changes() {
        return true;
    }

    let Some(repo) = repo else {
        ui::display_status("Not inside a git repository, skipping git undo");
        return true;
    };

    if record.git_tag {
        let tag = record.git_tag_name.as_deref().unwrap_or(&record.version);
        match repo.tag_exists(tag) {
            Ok(true) => match repo.delete_tag(tag) {
                Ok(()) => ui::display_success(&format!("Deleted git tag {}", tag)),
                Err(e) => {
                    ui::display_error(&format!("Failed to delete git tag {}: {}", tag, e));
                    return false;
                }
            },
            Ok(false) => ui::display_warning(&format!(
                "Git tag {} not found, skipping tag removal",
                tag
            )),
            Err(e) => ui::display_warning(&format!(
                "Could not check git tag {}: {}, skipping tag removal",
                tag, e
            )),
        }
    }

    if record.git_commit {
        match record.git_commit_hash.as_deref() {
            Some(recorded) => match repo.head_commit_hash() {
                Ok(head) if head == recorded => match repo.reset_soft_to_parent() {
                    Ok(()) => ui::display_success(&format!("Reset commit {}", recorded)),
                    Err(e) => {
                        ui::display_error(&format!("Failed to reset commit {}: {}", recorded, e));
                        return false;
                    }
                },
                Ok(head) => ui::display_warning(&format!(
                    "HEAD ({}) no longer matches the recorded commit ({}), skipping commit reset",
                    head, recorded
                )),
                Err(e) => ui::display_warning(&format!(
                    "Could not read HEAD: {}, skipping commit reset",
                    e
                )),
            },
            None => ui::display_warning("No commit hash recorded, skipping commit reset"),
        }
    }

    true
}

/// Undoes operations recorded by a [BackupManager].
pub struct UndoEngine<'a> {
    manager: &'a BackupManager,
    repo: Option<&'a dyn Repository>,
}

impl<'a> UndoEngine<'a> {
    /// # Arguments
    /// * `manager` - Source of operation history
    /// * `repo` - Repository the operations were tagged/committed in, if any
    pub fn new(manager: &'a BackupManager, repo: Option<&'a dyn Repository>) -> Self {
        UndoEngine { manager, repo }
    }

    /// Restores the files of `record`, then reverses its git changes.
    ///
    /// History is not modified.
    pub fn undo_operation(&self, record: &OperationRecord) -> bool {
        ui::display_status(&format!(
            "Undoing operation {} (version {})",
            record.operation_id, record.version
        ));

        for warning in validate_undo_safety(record) {
            ui::display_warning(&warning);
        }

        if !restore_files_from_backups(&record.backups) {
            ui::display_error(&format!(
                "Failed to restore files for operation {}",
                record.operation_id
            ));
            return false;
        }

        if !undo_git_operations(record, self.repo) {
            ui::display_error(&format!(
                "Files were restored but git changes of operation {} could not be undone",
                record.operation_id
            ));
            return false;
        }

        ui::display_success(&format!(
            "Successfully undid operation {}",
            record.operation_id
        ));
        true
    }

    pub fn undo_last_operation(&self) -> bool {
        match self.manager.latest_operation() {
            Some(record) => self.undo_operation(&record),
            None => {
                ui::display_error("No operations found in history to undo");
                false
            }
        }
    }

    pub fn undo_operation_by_id(&self, operation_id: &str) -> bool {
        match self.manager.find_operation(operation_id) {
            Some(record) => self.undo_operation(&record),
            None => {
                ui::display_error(&format!(
                    "Operation '{}' not found in history",
                    operation_id
                ));
                false
            }
        }
    }

    /// Prints up to `limit` recent operations, newest first.
    pub fn list_undo_history(&self, limit: usize) {
        ui::display_operation_history(&self.manager.recent_operations(limit));
    }
}
