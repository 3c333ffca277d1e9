//! The version bump workflow: compute, back up, write, tag, record.

use chrono::Utc;
use std::path::{Path, PathBuf};

use crate::backup::{
    backup_files_before_update, generate_operation_id, BackupManager, OperationRecord,
};
use crate::config::Config;
use crate::error::Result;
use crate::git::Repository;
use crate::handlers::{update_version_in_files, VersionStore};
use crate::ui;
use crate::version::{clock, resolver};

/// Pre-release marker appended to the computed version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Prerelease {
    Beta,
    Rc,
    Release,
    Custom(String),
}

impl Prerelease {
    /// Suffix including the leading dot, e.g. `.beta`.
    pub fn suffix(&self) -> String {
        match self {
            Prerelease::Beta => ".beta".to_string(),
            Prerelease::Rc => ".rc".to_string(),
            Prerelease::Release => ".release".to_string(),
            Prerelease::Custom(label) => format!(".{}", label),
        }
    }
}

/// Per-invocation overrides; `None` falls back to the configuration.
#[derive(Debug, Clone, Default)]
pub struct BumpOptions {
    /// Continue the same-day build counter of the first configured file.
    pub build: bool,
    pub prerelease: Option<Prerelease>,
    pub timezone: Option<String>,
    pub git_tag: Option<bool>,
    pub auto_commit: Option<bool>,
}

/// Result of a completed bump.
#[derive(Debug, Clone)]
pub struct BumpOutcome {
    pub version: String,
    pub files_updated: Vec<PathBuf>,
    pub record: OperationRecord,
}

/// Git side effects that actually happened.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GitOutcome {
    pub commit_hash: Option<String>,
    pub tag_name: Option<String>,
}

/// Optionally commits the updated files, then tags HEAD with `version`.
///
/// Failures are reported; the returned outcome only names what succeeded.
pub fn create_git_tag(
    repo: &dyn Repository,
    version: &str,
    files_updated: &[PathBuf],
    auto_commit: bool,
) -> GitOutcome {
    let mut outcome = GitOutcome::default();

    if auto_commit {
        if files_updated.is_empty() {
            ui::display_warning("No files were updated, skipping commit");
        } else {
            let message = format!("Bump version to {}", version);
            match repo.commit_paths(files_updated, &message) {
                Ok(hash) => {
                    ui::display_success(&format!("Committed changes: {}", message));
                    outcome.commit_hash = Some(hash);
                }
                Err(e) => ui::display_error(&format!("Failed to commit version bump: {}", e)),
            }
        }
    }

    match repo.create_tag(version) {
        Ok(()) => {
            ui::display_success(&format!("Created git tag {}", version));
            outcome.tag_name = Some(version.to_string());
        }
        Err(e) => ui::display_error(&format!("Failed to create git tag {}: {}", version, e)),
    }

    outcome
}

/// Runs one version bump.
///
/// # Arguments
/// * `config` - Loaded configuration
/// * `project_root` - Directory relative file paths resolve against
/// * `options` - Command-line overrides
/// * `store` - Version reader/writer for the configured files
/// * `manager` - Backup and history storage
/// * `repo` - Repository for tagging, `None` outside a repository
///
/// # Returns
/// * `Ok(Some(BumpOutcome))` - The bump ran (individual file failures are reported, not returned)
/// * `Ok(None)` - No files are configured
/// * `Err` - The version could not be computed (bad template or date format)
pub fn run_bump<S: VersionStore + ?Sized>(
    config: &Config,
    project_root: &Path,
    options: &BumpOptions,
    store: &S,
    manager: &BackupManager,
    repo: Option<&dyn Repository>,
) -> Result<Option<BumpOutcome>> {
    let file_configs = config.resolved_file_configs(project_root);
    if file_configs.is_empty() {
        ui::display_status("No files specified in the configuration.");
        return Ok(None);
    }

    let timezone = options.timezone.as_deref().unwrap_or(&config.timezone);
    let git_tag = options.git_tag.unwrap_or(config.git_tag);
    let auto_commit = options.auto_commit.unwrap_or(config.auto_commit);

    let mut version = if options.build {
        resolver::get_build_version(
            store,
            &file_configs[0],
            &config.version_format,
            timezone,
            &config.date_format,
        )?
    } else {
        clock::current_date(timezone, &config.date_format)?
    };

    if let Some(prerelease) = &options.prerelease {
        version.push_str(&prerelease.suffix());
    }

    let backups = backup_files_before_update(manager, &file_configs);
    let files_updated = update_version_in_files(store, &version, &file_configs);

    let mut record = OperationRecord::new(generate_operation_id(), Utc::now(), version.clone())
        .with_files_updated(files_updated.clone())
        .with_backups(backups);

    if git_tag {
        match repo {
            Some(repo) => {
                let outcome = create_git_tag(repo, &version, &files_updated, auto_commit);
                if let Some(hash) = outcome.commit_hash {
                    record = record.with_git_commit(hash);
                }
                if let Some(tag) = outcome.tag_name {
                    record = record.with_git_tag(tag);
                }
            }
            None => ui::display_warning("Not inside a git repository, skipping git tag"),
        }
    }

    manager.store_operation_history(record.clone());

    let removed = manager.cleanup_old_backups(config.backup_retention_days);
    if removed > 0 {
        ui::display_status(&format!("Removed {} old backup file(s)", removed));
    }

    Ok(Some(BumpOutcome {
        version,
        files_updated,
        record,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FileConfig;
    use crate::git::MockRepository;
    use crate::handlers::{FileType, HandlerRegistry};
    use std::fs;
    use tempfile::TempDir;

    fn project(version: &str) -> (TempDir, Config) {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("version.py"),
            format!("__version__ = \"{}\"\n", version),
        )
        .unwrap();

        let config = Config {
            timezone: "UTC".to_string(),
            file_configs: vec![FileConfig::new("version.py", FileType::Python, "__version__")],
            ..Config::default()
        };
        (dir, config)
    }

    fn today() -> String {
        clock::current_date("UTC", "%Y.%m.%d").unwrap()
    }

    #[test]
    fn test_prerelease_suffixes() {
        assert_eq!(Prerelease::Beta.suffix(), ".beta");
        assert_eq!(Prerelease::Rc.suffix(), ".rc");
        assert_eq!(Prerelease::Release.suffix(), ".release");
        assert_eq!(Prerelease::Custom("nightly".to_string()).suffix(), ".nightly");
    }

    #[test]
    fn test_no_files_configured() {
        let dir = TempDir::new().unwrap();
        let manager = BackupManager::for_project(dir.path());
        let outcome = run_bump(
            &Config::default(),
            dir.path(),
            &BumpOptions::default(),
            &HandlerRegistry,
            &manager,
            None,
        )
        .unwrap();
        assert!(outcome.is_none());
        assert!(manager.operation_history().is_empty());
    }

    #[test]
    fn test_build_bump_writes_backs_up_and_records() {
        let (dir, config) = project("2020.01.01-005");
        let manager = BackupManager::for_project(dir.path());
        let options = BumpOptions {
            build: true,
            prerelease: Some(Prerelease::Beta),
            ..BumpOptions::default()
        };

        let outcome = run_bump(&config, dir.path(), &options, &HandlerRegistry, &manager, None)
            .unwrap()
            .unwrap();

        let expected = format!("{}-001.beta", today());
        assert_eq!(outcome.version, expected);
        assert_eq!(outcome.files_updated, vec![dir.path().join("version.py")]);
        assert_eq!(
            fs::read_to_string(dir.path().join("version.py")).unwrap(),
            format!("__version__ = \"{}\"\n", expected)
        );

        let latest = manager.latest_operation().unwrap();
        assert_eq!(latest, outcome.record);
        assert!(!latest.git_tag);
        let backup = latest.backups.get(&dir.path().join("version.py")).unwrap();
        assert_eq!(
            fs::read_to_string(backup).unwrap(),
            "__version__ = \"2020.01.01-005\"\n"
        );
    }

    #[test]
    fn test_same_day_build_increments() {
        let today = clock::current_date("UTC", "%Y-%m-%d").unwrap();
        let (dir, mut config) = project(&format!("{}-007", today));
        config.date_format = "%Y-%m-%d".to_string();
        let manager = BackupManager::for_project(dir.path());
        let options = BumpOptions {
            build: true,
            ..BumpOptions::default()
        };

        let outcome = run_bump(&config, dir.path(), &options, &HandlerRegistry, &manager, None)
            .unwrap()
            .unwrap();
        assert_eq!(outcome.version, format!("{}-008", today));
    }

    #[test]
    fn test_dotted_date_without_legacy_shape_resets() {
        // A dotted date with a hyphen template matches neither parse path.
        let (dir, config) = project(&format!("{}-007", today()));
        let manager = BackupManager::for_project(dir.path());
        let options = BumpOptions {
            build: true,
            ..BumpOptions::default()
        };

        let outcome = run_bump(&config, dir.path(), &options, &HandlerRegistry, &manager, None)
            .unwrap()
            .unwrap();
        assert_eq!(outcome.version, format!("{}-001", today()));
    }

    #[test]
    fn test_same_quarter_build_increments_dotted_template() {
        let quarter = clock::current_date("UTC", "%y.Q%q").unwrap();
        let (dir, mut config) = project(&format!("{}.004", quarter));
        config.version_format = "{current_date}.{build_count:03}".to_string();
        config.date_format = "%y.Q%q".to_string();
        let manager = BackupManager::for_project(dir.path());
        let options = BumpOptions {
            build: true,
            ..BumpOptions::default()
        };

        let outcome = run_bump(&config, dir.path(), &options, &HandlerRegistry, &manager, None)
            .unwrap()
            .unwrap();
        assert_eq!(outcome.version, format!("{}.005", quarter));
    }

    #[test]
    fn test_date_bump_with_git_commit_and_tag() {
        let (dir, config) = project("old");
        let manager = BackupManager::for_project(dir.path());
        let repo = MockRepository::new();
        repo.add_commit("base");
        let options = BumpOptions {
            git_tag: Some(true),
            auto_commit: Some(true),
            ..BumpOptions::default()
        };

        let outcome = run_bump(&config, dir.path(), &options, &HandlerRegistry, &manager, Some(&repo))
            .unwrap()
            .unwrap();

        assert_eq!(outcome.version, today());
        assert!(repo.has_tag(&today()));
        assert_eq!(outcome.record.git_tag_name.as_deref(), Some(today().as_str()));
        assert_eq!(outcome.record.git_commit_hash, repo.head());
        assert_eq!(
            repo.calls()[0],
            format!("commit 1 file(s): Bump version to {}", today())
        );
    }

    #[test]
    fn test_failed_tag_is_not_recorded() {
        let (dir, config) = project("old");
        let manager = BackupManager::for_project(dir.path());
        let repo = MockRepository::new();
        let options = BumpOptions {
            git_tag: Some(true),
            ..BumpOptions::default()
        };

        let outcome = run_bump(&config, dir.path(), &options, &HandlerRegistry, &manager, Some(&repo))
            .unwrap()
            .unwrap();
        assert!(!outcome.record.git_tag);
        assert!(!outcome.record.git_commit);
    }

    #[test]
    fn test_git_tag_outside_repository() {
        let (dir, mut config) = project("old");
        config.git_tag = true;
        let manager = BackupManager::for_project(dir.path());

        let outcome = run_bump(
            &config,
            dir.path(),
            &BumpOptions::default(),
            &HandlerRegistry,
            &manager,
            None,
        )
        .unwrap()
        .unwrap();
        assert!(!outcome.record.has_git_changes());
    }

    #[test]
    fn test_invalid_version_format_is_fatal() {
        let (dir, mut config) = project("old");
        config.version_format = "{current_date}-{build}".to_string();
        let manager = BackupManager::for_project(dir.path());
        let options = BumpOptions {
            build: true,
            ..BumpOptions::default()
        };

        assert!(run_bump(&config, dir.path(), &options, &HandlerRegistry, &manager, None).is_err());
        assert!(manager.operation_history().is_empty());
        assert_eq!(
            fs::read_to_string(dir.path().join("version.py")).unwrap(),
            "__version__ = \"old\"\n"
        );
    }
}
