//! `key=value` files: Java-style properties and dotenv files.

use std::path::Path;

use super::{read_text, write_text};
use crate::error::Result;

/// Splits a non-comment `key=value` line into its trimmed key and raw value.
fn split_entry(line: &str) -> Option<(&str, &str)> {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return None;
    }
    trimmed
        .split_once('=')
        .map(|(key, value)| (key.trim(), value))
}

fn strip_quotes(value: &str) -> &str {
    value.trim_matches(|c: char| c == '"' || c == '\'')
}

/// Returns the quote character wrapping `value`, if it is quoted on both ends.
fn quote_of(value: &str) -> Option<char> {
    let first = value.chars().next()?;
    let quoted = (first == '"' || first == '\'') && value.len() > 1 && value.ends_with(first);
    quoted.then_some(first)
}

/// Replaces the value after the first `=` on `line`, keeping the key, the
/// spacing around the separator and the line ending.
pub(crate) fn rewrite_value(line: &str, separator: usize, new_value: &str) -> String {
    let (body, ending) = match line.strip_suffix("\r\n") {
        Some(body) => (body, "\r\n"),
        None => match line.strip_suffix('\n') {
            Some(body) => (body, "\n"),
            None => (line, ""),
        },
    };

    let after = &body[separator + 1..];
    let padding = &after[..after.len() - after.trim_start().len()];

    format!("{}{}{}{}", &body[..=separator], padding, new_value, ending)
}

fn find_value(content: &str, variable: &str) -> Option<String> {
    content
        .lines()
        .filter_map(split_entry)
        .find(|(key, _)| *key == variable)
        .map(|(_, value)| value.trim().to_string())
}

/// Rewrites the first entry for `variable`. `render` receives the old value.
fn update_entry(
    path: &Path,
    variable: &str,
    render: impl Fn(&str) -> String,
) -> Result<bool> {
    let content = read_text(path)?;
    let mut updated = false;
    let mut output = String::with_capacity(content.len());

    for line in content.split_inclusive('\n') {
        if !updated {
            if let Some((key, value)) = split_entry(line) {
                if key == variable {
                    if let Some(separator) = line.find('=') {
                        output.push_str(&rewrite_value(line, separator, &render(value.trim())));
                        updated = true;
                        continue;
                    }
                }
            }
        }
        output.push_str(line);
    }

    if updated {
        write_text(path, &output)?;
    }
    Ok(updated)
}

pub fn read_properties(path: &Path, variable: &str) -> Result<Option<String>> {
    let content = read_text(path)?;
    Ok(find_value(&content, variable))
}

pub fn update_properties(path: &Path, variable: &str, new_version: &str) -> Result<bool> {
    update_entry(path, variable, |_| new_version.to_string())
}

/// Reads a dotenv entry, stripping surrounding quotes.
pub fn read_env(path: &Path, variable: &str) -> Result<Option<String>> {
    let content = read_text(path)?;
    Ok(find_value(&content, variable).map(|value| strip_quotes(&value).to_string()))
}

/// Updates a dotenv entry, keeping the quote style of the existing value.
pub fn update_env(path: &Path, variable: &str, new_version: &str) -> Result<bool> {
    update_entry(path, variable, |old| match quote_of(old) {
        Some(quote) => format!("{}{}{}", quote, new_version, quote),
        None => new_version.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_properties_read_skips_comments() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("app.properties");
        fs::write(&path, "# version=old\napp.name = demo\nversion = 2024.01.01\n").unwrap();

        assert_eq!(
            read_properties(&path, "version").unwrap(),
            Some("2024.01.01".to_string())
        );
        assert_eq!(read_properties(&path, "missing").unwrap(), None);
    }

    #[test]
    fn test_properties_update_keeps_spacing() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("app.properties");
        fs::write(&path, "# header\nversion = 2024.01.01\nother=1").unwrap();

        assert!(update_properties(&path, "version", "2024.12.07").unwrap());
        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "# header\nversion = 2024.12.07\nother=1"
        );
        assert!(!update_properties(&path, "missing", "x").unwrap());
    }

    #[test]
    fn test_env_strips_and_keeps_quotes() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(".env");
        fs::write(&path, "APP_NAME=demo\nVERSION=\"2024.01.01\"\nBUILD='3'\n").unwrap();

        assert_eq!(read_env(&path, "VERSION").unwrap(), Some("2024.01.01".to_string()));
        assert_eq!(read_env(&path, "BUILD").unwrap(), Some("3".to_string()));

        assert!(update_env(&path, "VERSION", "2024.12.07").unwrap());
        assert!(update_env(&path, "APP_NAME", "other").unwrap());
        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "APP_NAME=other\nVERSION=\"2024.12.07\"\nBUILD='3'\n"
        );
    }

    #[test]
    fn test_only_first_entry_is_updated() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(".env");
        fs::write(&path, "VERSION=1\r\nVERSION=2\r\n").unwrap();

        assert!(update_env(&path, "VERSION", "3").unwrap());
        assert_eq!(fs::read_to_string(&path).unwrap(), "VERSION=3\r\nVERSION=2\r\n");
    }

    #[test]
    fn test_rewrite_value() {
        assert_eq!(rewrite_value("  key =  old\n", 6, "new"), "  key =  new\n");
        assert_eq!(rewrite_value("key=old", 3, "new"), "key=new");
    }
}
