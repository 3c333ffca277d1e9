use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{BumpCalverError, Result};
use crate::handlers::FileType;

/// Name of the standalone configuration file.
pub const CONFIG_FILE_NAME: &str = "bumpcalver.toml";

/// Name of the Python project file carrying a `[tool.bumpcalver]` table.
pub const PYPROJECT_FILE_NAME: &str = "pyproject.toml";

/// Default directory for file backups, relative to the project root.
pub const DEFAULT_BACKUP_DIR: &str = ".bumpcalver/backups";

/// Default operation history file, relative to the project root.
pub const DEFAULT_HISTORY_FILE: &str = ".bumpcalver/bumpcalver-history.json";

fn default_version_format() -> String {
    "{current_date}-{build_count:03}".to_string()
}

fn default_date_format() -> String {
    "%Y.%m.%d".to_string()
}

fn default_timezone() -> String {
    "America/New_York".to_string()
}

fn default_backup_retention_days() -> u32 {
    30
}

/// One file whose version is managed.
///
/// `variable` is interpreted per file type: an assignment name, a dotted key
/// path, a slash-separated element path or a `section.key` pair.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct FileConfig {
    pub path: PathBuf,

    pub file_type: FileType,

    #[serde(default)]
    pub variable: String,

    /// `ARG` or `ENV` for Dockerfiles.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub directive: Option<String>,

    /// `python` applies PEP 440 normalization before writing.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version_standard: Option<String>,
}

impl FileConfig {
    pub fn new(path: impl Into<PathBuf>, file_type: FileType, variable: impl Into<String>) -> Self {
        FileConfig {
            path: path.into(),
            file_type,
            variable: variable.into(),
            directive: None,
            version_standard: None,
        }
    }

    pub fn with_directive(mut self, directive: impl Into<String>) -> Self {
        self.directive = Some(directive.into());
        self
    }

    pub fn with_version_standard(mut self, standard: impl Into<String>) -> Self {
        self.version_standard = Some(standard.into());
        self
    }

    /// Returns a copy whose path is absolute, resolved against `project_root`.
    ///
    /// Python entries given as a dotted module path (`src.pkg.version`) are
    /// converted to a file path first.
    pub fn resolved(&self, project_root: &Path) -> FileConfig {
        let raw = self.path.to_string_lossy();
        let path = PathBuf::from(parse_dot_path(&raw, self.file_type));
        let path = if path.is_absolute() {
            path
        } else {
            project_root.join(path)
        };

        FileConfig {
            path,
            ..self.clone()
        }
    }
}

/// Converts a Python dotted module path into a file path.
///
/// Paths that already contain a separator, absolute paths, non-Python entries
/// and names ending in `.py` are returned unchanged.
///
/// # Example
/// ```
/// use bumpcalver::config::parse_dot_path;
/// use bumpcalver::handlers::FileType;
///
/// assert_eq!(parse_dot_path("src.pkg.version", FileType::Python), "src/pkg/version.py");
/// assert_eq!(parse_dot_path("pyproject.toml", FileType::Toml), "pyproject.toml");
/// ```
pub fn parse_dot_path(dot_path: &str, file_type: FileType) -> String {
    if dot_path.contains('/') || dot_path.contains('\\') || Path::new(dot_path).is_absolute() {
        return dot_path.to_string();
    }
    if file_type == FileType::Python && !dot_path.ends_with(".py") {
        let joined = dot_path.replace('.', std::path::MAIN_SEPARATOR_STR);
        return format!("{}.py", joined);
    }
    dot_path.to_string()
}

/// Complete bumpcalver configuration.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Config {
    #[serde(default = "default_version_format")]
    pub version_format: String,

    #[serde(default = "default_date_format")]
    pub date_format: String,

    #[serde(default = "default_timezone")]
    pub timezone: String,

    #[serde(default)]
    pub git_tag: bool,

    #[serde(default)]
    pub auto_commit: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backup_dir: Option<PathBuf>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub history_file: Option<PathBuf>,

    #[serde(default = "default_backup_retention_days")]
    pub backup_retention_days: u32,

    #[serde(default, rename = "file")]
    pub file_configs: Vec<FileConfig>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            version_format: default_version_format(),
            date_format: default_date_format(),
            timezone: default_timezone(),
            git_tag: false,
            auto_commit: false,
            backup_dir: None,
            history_file: None,
            backup_retention_days: default_backup_retention_days(),
            file_configs: Vec::new(),
        }
    }
}

impl Config {
    /// File entries with paths resolved against `project_root`.
    pub fn resolved_file_configs(&self, project_root: &Path) -> Vec<FileConfig> {
        self.file_configs
            .iter()
            .map(|file_config| file_config.resolved(project_root))
            .collect()
    }

    /// Backup directory, resolved against `project_root`.
    pub fn backup_dir(&self, project_root: &Path) -> PathBuf {
        resolve_or_default(project_root, self.backup_dir.as_deref(), DEFAULT_BACKUP_DIR)
    }

    /// History file, resolved against `project_root`.
    pub fn history_file(&self, project_root: &Path) -> PathBuf {
        resolve_or_default(project_root, self.history_file.as_deref(), DEFAULT_HISTORY_FILE)
    }
}

fn resolve_or_default(project_root: &Path, configured: Option<&Path>, default: &str) -> PathBuf {
    match configured {
        Some(path) if path.is_absolute() => path.to_path_buf(),
        Some(path) => project_root.join(path),
        None => project_root.join(default),
    }
}

#[derive(Debug, Deserialize)]
struct PyProject {
    #[serde(default)]
    tool: Option<PyProjectTool>,
}

#[derive(Debug, Deserialize)]
struct PyProjectTool {
    bumpcalver: Option<Config>,
}

fn read_config_file(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|e| {
        BumpCalverError::config(format!("Cannot read {}: {}", path.display(), e))
    })
}

fn parse_bumpcalver_toml(path: &Path) -> Result<Config> {
    let content = read_config_file(path)?;
    toml::from_str(&content)
        .map_err(|e| BumpCalverError::config(format!("Invalid {}: {}", path.display(), e)))
}

/// Returns the `[tool.bumpcalver]` table of a pyproject file, if present.
fn parse_pyproject(path: &Path) -> Result<Option<Config>> {
    let content = read_config_file(path)?;
    let pyproject: PyProject = toml::from_str(&content)
        .map_err(|e| BumpCalverError::config(format!("Invalid {}: {}", path.display(), e)))?;
    Ok(pyproject.tool.and_then(|tool| tool.bumpcalver))
}

fn is_pyproject(path: &Path) -> bool {
    path.file_name()
        .map(|name| name == PYPROJECT_FILE_NAME)
        .unwrap_or(false)
}

/// Loads configuration from file or returns defaults.
///
/// Attempts to load configuration in the following order:
/// 1. Custom path provided as parameter (a `pyproject.toml` is read from `[tool.bumpcalver]`)
/// 2. `bumpcalver.toml` in the project root
/// 3. `[tool.bumpcalver]` in the project root's `pyproject.toml`
/// 4. `bumpcalver.toml` in the user config directory
/// 5. Default configuration if no file found
///
/// # Arguments
/// * `config_path` - Optional path to custom configuration file
/// * `project_root` - Directory searched for project-level files
///
/// # Returns
/// * `Ok(Config)` - Loaded or default configuration
/// * `Err` - If a file exists but cannot be read or parsed, or names an unknown file type
pub fn load_config(config_path: Option<&Path>, project_root: &Path) -> Result<Config> {
    if let Some(path) = config_path {
        if is_pyproject(path) {
            return Ok(parse_pyproject(path)?.unwrap_or_default());
        }
        return parse_bumpcalver_toml(path);
    }

    let standalone = project_root.join(CONFIG_FILE_NAME);
    if standalone.exists() {
        return parse_bumpcalver_toml(&standalone);
    }

    let pyproject = project_root.join(PYPROJECT_FILE_NAME);
    if pyproject.exists() {
        if let Some(config) = parse_pyproject(&pyproject)? {
            return Ok(config);
        }
    }

    if let Some(config_dir) = dirs::config_dir() {
        let user_config = config_dir.join(CONFIG_FILE_NAME);
        if user_config.exists() {
            return parse_bumpcalver_toml(&user_config);
        }
    }

    Ok(Config::default())
}
