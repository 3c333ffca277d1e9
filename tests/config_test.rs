// tests/config_test.rs
use bumpcalver::config::{load_config, Config, FileConfig};
use bumpcalver::handlers::FileType;
use serial_test::serial;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

const STANDALONE: &str = r#"
version_format = "{current_date}.{build_count:02}"
timezone = "UTC"
git_tag = true

[[file]]
path = "version.py"
file_type = "python"
variable = "__version__"
"#;

const PYPROJECT: &str = r#"
[project]
name = "demo"

[tool.bumpcalver]
date_format = "%y.%m"
auto_commit = true

[[tool.bumpcalver.file]]
path = "package.json"
file_type = "json"
variable = "version"
"#;

#[test]
fn test_standalone_file_wins_over_pyproject() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("bumpcalver.toml"), STANDALONE).unwrap();
    fs::write(dir.path().join("pyproject.toml"), PYPROJECT).unwrap();

    let config = load_config(None, dir.path()).unwrap();
    assert_eq!(config.version_format, "{current_date}.{build_count:02}");
    assert_eq!(config.timezone, "UTC");
    assert!(config.git_tag);
    assert_eq!(
        config.file_configs,
        vec![FileConfig::new("version.py", FileType::Python, "__version__")]
    );
}

#[test]
fn test_pyproject_tool_table() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("pyproject.toml"), PYPROJECT).unwrap();

    let config = load_config(None, dir.path()).unwrap();
    assert_eq!(config.date_format, "%y.%m");
    assert!(config.auto_commit);
    assert_eq!(config.file_configs[0].file_type, FileType::Json);
    // Unset keys keep their defaults
    assert_eq!(config.version_format, Config::default().version_format);
}

#[test]
fn test_explicit_path() {
    let dir = TempDir::new().unwrap();
    let custom = dir.path().join("release.toml");
    fs::write(&custom, STANDALONE).unwrap();
    fs::write(dir.path().join("pyproject.toml"), PYPROJECT).unwrap();

    let config = load_config(Some(&custom), dir.path()).unwrap();
    assert!(config.git_tag);

    let pyproject = dir.path().join("pyproject.toml");
    let config = load_config(Some(&pyproject), dir.path()).unwrap();
    assert!(config.auto_commit);
}

#[test]
fn test_explicit_missing_path_is_an_error() {
    let dir = TempDir::new().unwrap();
    let result = load_config(Some(&dir.path().join("nope.toml")), dir.path());
    assert!(result.is_err());
}

#[test]
fn test_invalid_file_type_is_an_error() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("bumpcalver.toml"),
        "[[file]]\npath = \"a\"\nfile_type = \"ini\"\nvariable = \"v\"\n",
    )
    .unwrap();

    let err = load_config(None, dir.path()).unwrap_err();
    assert!(err.to_string().starts_with("Configuration error"));
}

#[test]
fn test_resolved_paths_and_storage_locations() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("bumpcalver.toml"),
        "history_file = \"history.json\"\n\n[[file]]\npath = \"app/version.py\"\nfile_type = \"python\"\nvariable = \"__version__\"\n",
    )
    .unwrap();

    let config = load_config(None, dir.path()).unwrap();
    let files = config.resolved_file_configs(dir.path());
    assert_eq!(files[0].path, dir.path().join("app/version.py"));
    assert_eq!(config.history_file(dir.path()), dir.path().join("history.json"));
    assert_eq!(
        config.backup_dir(dir.path()),
        dir.path().join(".bumpcalver/backups")
    );
}

#[test]
#[serial]
fn test_loads_from_working_directory() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("bumpcalver.toml"), STANDALONE).unwrap();

    let previous = std::env::current_dir().unwrap();
    std::env::set_current_dir(dir.path()).unwrap();
    let root: PathBuf = std::env::current_dir().unwrap();
    let result = load_config(None, &root);
    std::env::set_current_dir(previous).unwrap();

    assert_eq!(result.unwrap().timezone, "UTC");
}
