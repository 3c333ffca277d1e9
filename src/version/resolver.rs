//! Next-build-version computation from the version already in a file.

use super::clock;
use super::parser::{parse_version, ParseOutcome};
use super::template::render_version;
use crate::config::FileConfig;
use crate::error::Result;
use crate::handlers::VersionStore;
use crate::ui;

/// What was found in the target file before bumping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PriorVersion {
    /// No version could be read; a new series starts.
    Missing,
    /// The version carries today's date; the counter continues.
    SameDate { build_count: u32 },
    /// The version carries another date; the counter restarts.
    DifferentDate,
    /// A version was read but could not be parsed; the counter restarts.
    Unparsable,
}

impl PriorVersion {
    /// Build count to use for the next version.
    pub fn next_build_count(&self) -> u32 {
        match self {
            PriorVersion::SameDate { build_count } => build_count.saturating_add(1),
            PriorVersion::Missing | PriorVersion::DifferentDate | PriorVersion::Unparsable => 1,
        }
    }
}

/// Computes the next build version for a file, using today's date in `timezone`.
///
/// Read failures are reported and start a new series; only template or
/// date-format errors are returned as `Err`.
pub fn get_build_version<S: VersionStore + ?Sized>(
    store: &S,
    file_config: &FileConfig,
    version_format: &str,
    timezone: &str,
    date_format: &str,
) -> Result<String> {
    let current_date = clock::current_date(timezone, date_format)?;
    build_version_for_date(store, file_config, version_format, date_format, &current_date)
}

/// Computes the next build version for a file against an explicit current date.
pub fn build_version_for_date<S: VersionStore + ?Sized>(
    store: &S,
    file_config: &FileConfig,
    version_format: &str,
    date_format: &str,
    current_date: &str,
) -> Result<String> {
    let prior = classify_prior_version(store, file_config, version_format, date_format, current_date);
    render_version(version_format, current_date, prior.next_build_count())
}

/// Reads the existing version through the store and places it in the bump state machine.
pub fn classify_prior_version<S: VersionStore + ?Sized>(
    store: &S,
    file_config: &FileConfig,
    version_format: &str,
    date_format: &str,
    current_date: &str,
) -> PriorVersion {
    let path = file_config.path.display();

    let version = match store.read_version(file_config) {
        Ok(Some(version)) => version,
        Ok(None) => {
            ui::display_warning(&format!(
                "File '{}': Could not read version. Starting new versioning with format '{}'.",
                path, version_format
            ));
            return PriorVersion::Missing;
        }
        Err(e) => {
            ui::display_warning(&format!(
                "File '{}': Error reading version - {}. Starting new versioning with format '{}'.",
                path, e, version_format
            ));
            return PriorVersion::Missing;
        }
    };

    match parse_version(&version, Some(version_format), Some(date_format)) {
        ParseOutcome::Parsed(parsed) if parsed.date == current_date => PriorVersion::SameDate {
            build_count: parsed.build_count,
        },
        ParseOutcome::Parsed(_) => PriorVersion::DifferentDate,
        ParseOutcome::Unparsable => {
            ui::display_warning(&format!(
                "File '{}': Version '{}' does not match expected format. Expected format: '{}' with date format: '{}'.",
                path, version, version_format, date_format
            ));
            PriorVersion::Unparsable
        }
    }
}
