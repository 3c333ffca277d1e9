//! File handler registry
//!
//! Each supported file format knows how to read the current version from a
//! named variable and how to write a new one back. Formats are a closed set
//! ([FileType]); dispatch is a `match` on the tag rather than a trait object
//! per format.
//!
//! Handlers are quiet: `Ok(None)` / `Ok(false)` mean the variable was not
//! found, `Err` means the file could not be read, parsed or written. The
//! callers decide what to report.

pub mod assignment;
pub mod document;
pub mod keyvalue;
pub mod setup_cfg;
pub mod xml;

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::config::FileConfig;
use crate::error::{BumpCalverError, Result};
use crate::ui;
use crate::version::formatter::format_version;

/// Version standard applied when a file entry does not name one.
pub const DEFAULT_STANDARD: &str = "default";

/// Supported file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FileType {
    #[serde(rename = "python")]
    Python,
    #[serde(rename = "toml")]
    Toml,
    #[serde(rename = "yaml", alias = "yml")]
    Yaml,
    #[serde(rename = "json")]
    Json,
    #[serde(rename = "xml")]
    Xml,
    #[serde(rename = "dockerfile")]
    Dockerfile,
    #[serde(rename = "makefile")]
    Makefile,
    #[serde(rename = "properties")]
    Properties,
    #[serde(rename = "env")]
    Env,
    #[serde(rename = "setup.cfg")]
    SetupCfg,
}

impl FileType {
    pub const ALL: [FileType; 10] = [
        FileType::Python,
        FileType::Toml,
        FileType::Yaml,
        FileType::Json,
        FileType::Xml,
        FileType::Dockerfile,
        FileType::Makefile,
        FileType::Properties,
        FileType::Env,
        FileType::SetupCfg,
    ];

    /// Configuration tag for this file type.
    pub fn as_str(&self) -> &'static str {
        match self {
            FileType::Python => "python",
            FileType::Toml => "toml",
            FileType::Yaml => "yaml",
            FileType::Json => "json",
            FileType::Xml => "xml",
            FileType::Dockerfile => "dockerfile",
            FileType::Makefile => "makefile",
            FileType::Properties => "properties",
            FileType::Env => "env",
            FileType::SetupCfg => "setup.cfg",
        }
    }

    /// Reads the version stored under `variable`.
    ///
    /// # Arguments
    /// * `path` - File to read
    /// * `variable` - Variable name, dotted key path or element path depending on the format
    /// * `directive` - `ARG` or `ENV`; only used by Dockerfiles
    ///
    /// # Returns
    /// * `Ok(Some(String))` - The stored version
    /// * `Ok(None)` - The variable is not present
    /// * `Err` - The file could not be read or parsed
    pub fn read(&self, path: &Path, variable: &str, directive: Option<&str>) -> Result<Option<String>> {
        match self {
            FileType::Python => assignment::read_python(path, variable),
            FileType::Dockerfile => assignment::read_dockerfile(path, variable, directive),
            FileType::Makefile => assignment::read_makefile(path, variable),
            FileType::Toml => document::read_toml(path, variable),
            FileType::Yaml => document::read_yaml(path, variable),
            FileType::Json => document::read_json(path, variable),
            FileType::Xml => xml::read_xml(path, variable),
            FileType::Properties => keyvalue::read_properties(path, variable),
            FileType::Env => keyvalue::read_env(path, variable),
            FileType::SetupCfg => setup_cfg::read_setup_cfg(path, variable),
        }
    }

    /// Writes `new_version` under `variable`, leaving the rest of the file intact
    /// where the format allows it.
    ///
    /// # Returns
    /// * `Ok(true)` - The file was rewritten
    /// * `Ok(false)` - The variable is not present and the format does not create it
    /// * `Err` - The file could not be read, parsed or written
    pub fn update(
        &self,
        path: &Path,
        variable: &str,
        new_version: &str,
        directive: Option<&str>,
    ) -> Result<bool> {
        match self {
            FileType::Python => assignment::update_python(path, variable, new_version),
            FileType::Dockerfile => {
                assignment::update_dockerfile(path, variable, new_version, directive)
            }
            FileType::Makefile => assignment::update_makefile(path, variable, new_version),
            FileType::Toml => document::update_toml(path, variable, new_version),
            FileType::Yaml => document::update_yaml(path, variable, new_version),
            FileType::Json => document::update_json(path, variable, new_version),
            FileType::Xml => xml::update_xml(path, variable, new_version),
            FileType::Properties => keyvalue::update_properties(path, variable, new_version),
            FileType::Env => keyvalue::update_env(path, variable, new_version),
            FileType::SetupCfg => setup_cfg::update_setup_cfg(path, variable, new_version),
        }
    }
}

impl fmt::Display for FileType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FileType {
    type Err = BumpCalverError;

    fn from_str(s: &str) -> Result<Self> {
        if s == "yml" {
            return Ok(FileType::Yaml);
        }
        FileType::ALL
            .iter()
            .find(|file_type| file_type.as_str() == s)
            .copied()
            .ok_or_else(|| BumpCalverError::config(format!("Unsupported file type: {}", s)))
    }
}

/// Read/write access to the version stored in a configured file.
///
/// The resolver and the bump workflow depend on this trait rather than on
/// the filesystem so they can be exercised against an in-memory store.
pub trait VersionStore {
    /// Reads the current version for a file entry.
    fn read_version(&self, file_config: &FileConfig) -> Result<Option<String>>;

    /// Writes a new version for a file entry, applying its version standard.
    fn update_version(&self, file_config: &FileConfig, new_version: &str) -> Result<bool>;
}

/// Filesystem-backed [VersionStore] dispatching on [FileType].
#[derive(Debug, Default, Clone, Copy)]
pub struct HandlerRegistry;

impl HandlerRegistry {
    pub fn new() -> Self {
        HandlerRegistry
    }
}

impl VersionStore for HandlerRegistry {
    fn read_version(&self, file_config: &FileConfig) -> Result<Option<String>> {
        file_config.file_type.read(
            &file_config.path,
            &file_config.variable,
            file_config.directive.as_deref(),
        )
    }

    fn update_version(&self, file_config: &FileConfig, new_version: &str) -> Result<bool> {
        let standard = file_config
            .version_standard
            .as_deref()
            .unwrap_or(DEFAULT_STANDARD);
        let formatted = format_version(new_version, standard);

        file_config.file_type.update(
            &file_config.path,
            &file_config.variable,
            &formatted,
            file_config.directive.as_deref(),
        )
    }
}

/// Writes `new_version` into every configured file.
///
/// Each failure is reported and skipped; the remaining files are still updated.
///
/// # Returns
/// Paths of the files that were actually rewritten, in configuration order.
pub fn update_version_in_files<S: VersionStore + ?Sized>(
    store: &S,
    new_version: &str,
    file_configs: &[FileConfig],
) -> Vec<PathBuf> {
    let mut files_updated = Vec::new();

    for file_config in file_configs {
        let path = &file_config.path;
        match store.update_version(file_config, new_version) {
            Ok(true) => {
                ui::display_success(&format!("Updated {}", path.display()));
                files_updated.push(path.clone());
            }
            Ok(false) => ui::display_warning(&format!(
                "Variable '{}' not found in {}",
                file_config.variable,
                path.display()
            )),
            Err(e) => ui::display_error(&format!("Error updating {}: {}", path.display(), e)),
        }
    }

    files_updated
}

pub(crate) fn build_regex(pattern: &str) -> Result<Regex> {
    Regex::new(pattern)
        .map_err(|e| BumpCalverError::handler(format!("Invalid search pattern: {}", e)))
}

pub(crate) fn read_text(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|e| {
        BumpCalverError::handler(format!("Cannot read {}: {}", path.display(), e))
    })
}

pub(crate) fn write_text(path: &Path, content: &str) -> Result<()> {
    std::fs::write(path, content).map_err(|e| {
        BumpCalverError::handler(format!("Cannot write {}: {}", path.display(), e))
    })
}
