use anyhow::{Context, Result};
use clap::error::ErrorKind;
use clap::{CommandFactory, Parser};
use std::path::PathBuf;

use bumpcalver::backup::BackupManager;
use bumpcalver::bump::{self, BumpOptions, Prerelease};
use bumpcalver::config;
use bumpcalver::git::{Git2Repository, Repository};
use bumpcalver::handlers::HandlerRegistry;
use bumpcalver::ui;
use bumpcalver::undo::UndoEngine;

#[derive(clap::Parser)]
#[command(
    name = "bumpcalver",
    version,
    about = "Bump calendar versions in project files, with backup and undo"
)]
struct Args {
    #[arg(long, help = "Add .beta to the version")]
    beta: bool,

    #[arg(long, help = "Add .rc to the version")]
    rc: bool,

    #[arg(long, help = "Add .release to the version")]
    release: bool,

    #[arg(long, value_name = "LABEL", help = "Add .<LABEL> to the version")]
    custom: Option<String>,

    #[arg(long, help = "Use build count versioning")]
    build: bool,

    #[arg(long, value_name = "TZ", help = "Timezone for date calculations")]
    timezone: Option<String>,

    #[arg(long, overrides_with = "no_git_tag", help = "Create a git tag with the new version")]
    git_tag: bool,

    #[arg(long, overrides_with = "git_tag", help = "Do not create a git tag")]
    no_git_tag: bool,

    #[arg(
        long,
        overrides_with = "no_auto_commit",
        help = "Commit updated files before tagging"
    )]
    auto_commit: bool,

    #[arg(long, overrides_with = "auto_commit", help = "Do not commit updated files")]
    no_auto_commit: bool,

    #[arg(short, long, value_name = "PATH", help = "Custom configuration file path")]
    config: Option<PathBuf>,

    #[arg(long, help = "Undo the last version bump")]
    undo: bool,

    #[arg(long, value_name = "ID", help = "Undo the operation with this ID")]
    undo_id: Option<String>,

    #[arg(long, help = "List recent operations that can be undone")]
    list_history: bool,

    #[arg(
        long,
        value_name = "N",
        default_value_t = 10,
        help = "Number of operations shown by --list-history"
    )]
    history_limit: usize,
}

impl Args {
    fn prerelease(&self) -> Option<Prerelease> {
        if self.beta {
            Some(Prerelease::Beta)
        } else if self.rc {
            Some(Prerelease::Rc)
        } else if self.release {
            Some(Prerelease::Release)
        } else {
            self.custom.clone().map(Prerelease::Custom)
        }
    }

    fn prerelease_count(&self) -> usize {
        [self.beta, self.rc, self.release, self.custom.is_some()]
            .iter()
            .filter(|set| **set)
            .count()
    }

    fn undo_requested(&self) -> bool {
        self.undo || self.undo_id.is_some() || self.list_history
    }

    fn bump_requested(&self) -> bool {
        self.prerelease_count() > 0
            || self.build
            || self.timezone.is_some()
            || self.git_tag
            || self.no_git_tag
            || self.auto_commit
            || self.no_auto_commit
    }

    fn bump_options(&self) -> BumpOptions {
        BumpOptions {
            build: self.build,
            prerelease: self.prerelease(),
            timezone: self.timezone.clone(),
            git_tag: flag_pair(self.git_tag, self.no_git_tag),
            auto_commit: flag_pair(self.auto_commit, self.no_auto_commit),
        }
    }
}

/// `--x` / `--no-x` to an optional override.
fn flag_pair(enabled: bool, disabled: bool) -> Option<bool> {
    match (enabled, disabled) {
        (true, _) => Some(true),
        (_, true) => Some(false),
        _ => None,
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    if args.prerelease_count() > 1 {
        Args::command()
            .error(
                ErrorKind::ArgumentConflict,
                "Only one of --beta, --rc, --release, or --custom can be set at a time.",
            )
            .exit();
    }

    if args.undo_requested() && args.bump_requested() {
        Args::command()
            .error(
                ErrorKind::ArgumentConflict,
                "Undo options (--undo, --undo-id, --list-history) cannot be used with version bump options",
            )
            .exit();
    }

    let project_root = std::env::current_dir().context("Failed to determine working directory")?;

    let config = match config::load_config(args.config.as_deref(), &project_root) {
        Ok(cfg) => cfg,
        Err(e) => {
            ui::display_error(&format!("Error loading config: {}", e));
            std::process::exit(1);
        }
    };

    let manager = BackupManager::from_config(&config, &project_root);
    let git_repo = Git2Repository::discover(&project_root);
    let repo = git_repo.as_ref().map(|r| r as &dyn Repository);

    if args.undo_requested() {
        let engine = UndoEngine::new(&manager, repo);

        if args.list_history {
            engine.list_undo_history(args.history_limit);
            return Ok(());
        }

        let undone = match &args.undo_id {
            Some(operation_id) if !args.undo => engine.undo_operation_by_id(operation_id),
            _ => engine.undo_last_operation(),
        };
        if !undone {
            std::process::exit(1);
        }
        return Ok(());
    }

    match bump::run_bump(
        &config,
        &project_root,
        &args.bump_options(),
        &HandlerRegistry,
        &manager,
        repo,
    ) {
        Ok(Some(outcome)) => {
            println!("Updated version to {} in specified files.", outcome.version);
            ui::display_status(&format!(
                "Operation ID: {} (use --undo-id to revert)",
                outcome.record.operation_id
            ));
        }
        Ok(None) => {}
        Err(e) => {
            ui::display_error(&format!("Error generating version: {}", e));
            std::process::exit(1);
        }
    }

    Ok(())
}
