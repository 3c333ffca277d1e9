//! File backups and operation history.
//!
//! Every bump snapshots its target files into a backup directory and appends
//! an [OperationRecord] to a JSON history file. None of this is allowed to
//! fail a bump: problems are reported and the affected backup or record is
//! skipped.

use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use crate::config::{Config, FileConfig, DEFAULT_BACKUP_DIR, DEFAULT_HISTORY_FILE};
use crate::error::Result;
use crate::ui;

/// Number of records kept in the history file; older ones are dropped.
pub const MAX_HISTORY_ENTRIES: usize = 50;

const TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S_%6f";

/// Everything needed to reverse one version bump.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperationRecord {
    pub operation_id: String,
    pub timestamp: DateTime<Utc>,
    pub version: String,

    #[serde(default)]
    pub files_updated: Vec<PathBuf>,

    /// Original path to backup path.
    #[serde(default)]
    pub backups: BTreeMap<PathBuf, PathBuf>,

    #[serde(default)]
    pub git_tag: bool,

    #[serde(default)]
    pub git_commit: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub git_commit_hash: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub git_tag_name: Option<String>,
}

impl OperationRecord {
    pub fn new(
        operation_id: impl Into<String>,
        timestamp: DateTime<Utc>,
        version: impl Into<String>,
    ) -> Self {
        OperationRecord {
            operation_id: operation_id.into(),
            timestamp,
            version: version.into(),
            files_updated: Vec::new(),
            backups: BTreeMap::new(),
            git_tag: false,
            git_commit: false,
            git_commit_hash: None,
            git_tag_name: None,
        }
    }

    pub fn with_files_updated(mut self, files_updated: Vec<PathBuf>) -> Self {
        self.files_updated = files_updated;
        self
    }

    pub fn with_backups(mut self, backups: BTreeMap<PathBuf, PathBuf>) -> Self {
        self.backups = backups;
        self
    }

    /// Marks the record as having created `tag_name`.
    pub fn with_git_tag(mut self, tag_name: impl Into<String>) -> Self {
        self.git_tag = true;
        self.git_tag_name = Some(tag_name.into());
        self
    }

    /// Marks the record as having created the commit `hash`.
    pub fn with_git_commit(mut self, hash: impl Into<String>) -> Self {
        self.git_commit = true;
        self.git_commit_hash = Some(hash.into());
        self
    }

    pub fn has_git_changes(&self) -> bool {
        self.git_tag || self.git_commit
    }
}

/// Returns a new, sortable operation id such as `op_20241207_153000_123456`.
pub fn generate_operation_id() -> String {
    format!("op_{}", Local::now().format(TIMESTAMP_FORMAT))
}

/// Owns the backup directory and the history file of one project.
#[derive(Debug, Clone)]
pub struct BackupManager {
    backup_dir: PathBuf,
    history_file: PathBuf,
}

impl BackupManager {
    pub fn new(backup_dir: impl Into<PathBuf>, history_file: impl Into<PathBuf>) -> Self {
        BackupManager {
            backup_dir: backup_dir.into(),
            history_file: history_file.into(),
        }
    }

    /// Manager using the default locations under `project_root`.
    pub fn for_project(project_root: &Path) -> Self {
        BackupManager::new(
            project_root.join(DEFAULT_BACKUP_DIR),
            project_root.join(DEFAULT_HISTORY_FILE),
        )
    }

    /// Manager using the configured locations, resolved against `project_root`.
    pub fn from_config(config: &Config, project_root: &Path) -> Self {
        BackupManager::new(
            config.backup_dir(project_root),
            config.history_file(project_root),
        )
    }

    pub fn backup_dir(&self) -> &Path {
        &self.backup_dir
    }

    pub fn history_file(&self) -> &Path {
        &self.history_file
    }

    /// Copies `path` into the backup directory.
    ///
    /// # Returns
    /// * `Some(PathBuf)` - Location of the copy
    /// * `None` - The source is missing or the copy failed (reported)
    pub fn create_backup(&self, path: &Path) -> Option<PathBuf> {
        if !path.is_file() {
            ui::display_warning(&format!(
                "Cannot back up {}: file not found",
                path.display()
            ));
            return None;
        }

        match self.copy_to_backup_dir(path) {
            Ok(backup_path) => Some(backup_path),
            Err(e) => {
                ui::display_error(&format!("Failed to back up {}: {}", path.display(), e));
                None
            }
        }
    }

    fn copy_to_backup_dir(&self, path: &Path) -> Result<PathBuf> {
        fs::create_dir_all(&self.backup_dir)?;

        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "file".to_string());
        let stamp = Local::now().format(TIMESTAMP_FORMAT).to_string();

        let mut backup_path = self.backup_dir.join(format!("{}_{}", stamp, file_name));
        let mut counter = 1;
        while backup_path.exists() {
            backup_path = self
                .backup_dir
                .join(format!("{}_{}_{}", stamp, counter, file_name));
            counter += 1;
        }

        fs::copy(path, &backup_path)?;
        Ok(backup_path)
    }

    /// Appends a record to the history, keeping only the newest [MAX_HISTORY_ENTRIES].
    ///
    /// Failures are reported, never returned.
    pub fn store_operation_history(&self, record: OperationRecord) {
        let mut history = self.operation_history();
        history.push(record);
        if history.len() > MAX_HISTORY_ENTRIES {
            let overflow = history.len() - MAX_HISTORY_ENTRIES;
            history.drain(..overflow);
        }

        if let Err(e) = self.persist_history(&history) {
            ui::display_error(&format!(
                "Failed to store operation history in {}: {}",
                self.history_file.display(),
                e
            ));
        }
    }

    fn persist_history(&self, history: &[OperationRecord]) -> Result<()> {
        if let Some(parent) = self.history_file.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(history)?;
        fs::write(&self.history_file, content)?;
        Ok(())
    }

    /// All stored records, oldest first.
    ///
    /// A missing history file is an empty history; an unreadable or corrupt
    /// one is reported and also treated as empty.
    pub fn operation_history(&self) -> Vec<OperationRecord> {
        if !self.history_file.exists() {
            return Vec::new();
        }

        let content = match fs::read_to_string(&self.history_file) {
            Ok(content) => content,
            Err(e) => {
                ui::display_warning(&format!(
                    "Cannot read operation history {}: {}",
                    self.history_file.display(),
                    e
                ));
                return Vec::new();
            }
        };

        match serde_json::from_str(&content) {
            Ok(history) => history,
            Err(e) => {
                ui::display_warning(&format!(
                    "Ignoring corrupt operation history {}: {}",
                    self.history_file.display(),
                    e
                ));
                Vec::new()
            }
        }
    }

    /// Most recently stored record.
    pub fn latest_operation(&self) -> Option<OperationRecord> {
        self.operation_history().pop()
    }

    pub fn find_operation(&self, operation_id: &str) -> Option<OperationRecord> {
        self.operation_history()
            .into_iter()
            .find(|record| record.operation_id == operation_id)
    }

    /// Up to `limit` records, newest first.
    pub fn recent_operations(&self, limit: usize) -> Vec<OperationRecord> {
        self.operation_history()
            .into_iter()
            .rev()
            .take(limit)
            .collect()
    }

    /// Deletes backup files last modified more than `max_age_days` ago.
    ///
    /// Directories and the history file are never touched. Files that cannot
    /// be inspected or removed are skipped; if the directory cannot be listed
    /// nothing is removed.
    ///
    /// # Returns
    /// Number of files removed.
    pub fn cleanup_old_backups(&self, max_age_days: u32) -> usize {
        let max_age = Duration::from_secs(u64::from(max_age_days) * 24 * 60 * 60);
        let Some(cutoff) = SystemTime::now().checked_sub(max_age) else {
            return 0;
        };

        let Ok(entries) = fs::read_dir(&self.backup_dir) else {
            return 0;
        };

        let history_name = self.history_file.file_name();
        let mut removed = 0;

        for entry in entries.flatten() {
            let path = entry.path();
            if !path.is_file() || path.file_name() == history_name {
                continue;
            }

            let Ok(modified) = entry.metadata().and_then(|m| m.modified()) else {
                continue;
            };

            if modified < cutoff && fs::remove_file(&path).is_ok() {
                removed += 1;
            }
        }

        removed
    }
}

/// Backs up every configured file that exists.
///
/// # Returns
/// Original path to backup path, for the files that were copied.
pub fn backup_files_before_update(
    manager: &BackupManager,
    file_configs: &[FileConfig],
) -> BTreeMap<PathBuf, PathBuf> {
    let mut backups = BTreeMap::new();

    for file_config in file_configs {
        if backups.contains_key(&file_config.path) {
            continue;
        }
        if let Some(backup_path) = manager.create_backup(&file_config.path) {
            backups.insert(file_config.path.clone(), backup_path);
        }
    }

    backups
}
