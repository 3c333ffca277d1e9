//! Line-oriented `NAME = value` formats: Python modules, Dockerfiles and Makefiles.
//!
//! A trailing `\r` is kept out of captured values and written back, so CRLF
//! files keep their line endings.

use regex::Captures;
use std::path::Path;

use super::{build_regex, read_text, write_text};
use crate::error::{BumpCalverError, Result};

/// Reads a quoted `VAR = "x"` (or `'x'`) assignment from a Python file.
pub fn read_python(path: &Path, variable: &str) -> Result<Option<String>> {
    let content = read_text(path)?;
    let re = build_regex(&format!(
        r#"(?m)^[ \t]*{}[ \t]*=[ \t]*["'](.+?)["'][ \t\r]*$"#,
        regex::escape(variable)
    ))?;

    Ok(re
        .captures(&content)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string()))
}

/// Rewrites every quoted assignment to `variable`, keeping the original quote style.
pub fn update_python(path: &Path, variable: &str, new_version: &str) -> Result<bool> {
    let content = read_text(path)?;
    let re = build_regex(&format!(
        r#"(?m)^([ \t]*{}[ \t]*=[ \t]*)(["'])(.+?)(["'])([ \t\r]*)$"#,
        regex::escape(variable)
    ))?;

    if !re.is_match(&content) {
        return Ok(false);
    }

    let updated = re.replace_all(&content, |caps: &Captures| {
        format!(
            "{}{}{}{}{}",
            &caps[1], &caps[2], new_version, &caps[4], &caps[5]
        )
    });
    write_text(path, &updated)?;
    Ok(true)
}

/// Normalizes and validates a Dockerfile directive.
fn docker_directive(path: &Path, variable: &str, directive: Option<&str>) -> Result<&'static str> {
    match directive.map(|d| d.trim().to_ascii_uppercase()).as_deref() {
        Some("ARG") => Ok("ARG"),
        Some("ENV") => Ok("ENV"),
        _ => Err(BumpCalverError::handler(format!(
            "Invalid or missing directive for variable '{}' in {}.",
            variable,
            path.display()
        ))),
    }
}

/// Reads `ARG VAR=value` or `ENV VAR=value` from a Dockerfile.
pub fn read_dockerfile(path: &Path, variable: &str, directive: Option<&str>) -> Result<Option<String>> {
    let directive = docker_directive(path, variable, directive)?;
    let content = read_text(path)?;
    let re = build_regex(&format!(
        r"(?m)^[ \t]*{}[ \t]+{}[ \t]*=[ \t]*(.+?)[ \t\r]*$",
        directive,
        regex::escape(variable)
    ))?;

    Ok(re
        .captures(&content)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string()))
}

pub fn update_dockerfile(
    path: &Path,
    variable: &str,
    new_version: &str,
    directive: Option<&str>,
) -> Result<bool> {
    let directive = docker_directive(path, variable, directive)?;
    let content = read_text(path)?;
    let re = build_regex(&format!(
        r"(?m)^([ \t]*{}[ \t]+{}[ \t]*=[ \t]*)(.+?)[ \t]*(\r?)$",
        directive,
        regex::escape(variable)
    ))?;

    if !re.is_match(&content) {
        return Ok(false);
    }

    let updated = re.replace_all(&content, |caps: &Captures| {
        format!("{}{}{}", &caps[1], new_version, &caps[3])
    });
    write_text(path, &updated)?;
    Ok(true)
}

/// Reads `VAR = value` or `VAR := value` from a Makefile.
pub fn read_makefile(path: &Path, variable: &str) -> Result<Option<String>> {
    let content = read_text(path)?;
    let re = build_regex(&format!(
        r"(?m)^{}[ \t]*:?=[ \t]*(.*?)[ \t\r]*$",
        regex::escape(variable)
    ))?;

    Ok(re
        .captures(&content)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .filter(|value| !value.is_empty()))
}

pub fn update_makefile(path: &Path, variable: &str, new_version: &str) -> Result<bool> {
    let content = read_text(path)?;
    let re = build_regex(&format!(
        r"(?m)^({}[ \t]*:?=[ \t]*)(.*?)(\r?)$",
        regex::escape(variable)
    ))?;

    if !re.is_match(&content) {
        return Ok(false);
    }

    let updated = re.replace_all(&content, |caps: &Captures| {
        format!("{}{}{}", &caps[1], new_version, &caps[3])
    });
    write_text(path, &updated)?;
    Ok(true)
}
