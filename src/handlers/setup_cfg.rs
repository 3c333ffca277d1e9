//! INI-style `setup.cfg` files.
//!
//! Edits are line based so comments and unrelated sections survive an update.
//! A variable is either `section.key` or a bare key looked up across all
//! sections in file order.

use std::path::Path;

use super::keyvalue::rewrite_value;
use super::{read_text, write_text};
use crate::error::Result;

/// Section that receives a bare key that does not exist yet.
const FALLBACK_SECTION: &str = "metadata";

fn section_header(line: &str) -> Option<&str> {
    let trimmed = line.trim();
    trimmed
        .strip_prefix('[')
        .and_then(|rest| rest.strip_suffix(']'))
        .map(str::trim)
}

/// Returns the key and the byte index of its `=` or `:` separator.
fn option_entry(line: &str) -> Option<(&str, usize)> {
    let trimmed = line.trim_start();
    if trimmed.is_empty() || trimmed.starts_with('#') || trimmed.starts_with(';') {
        return None;
    }
    // Continuation lines of multi-line values are indented.
    if line.starts_with(' ') || line.starts_with('\t') {
        return None;
    }
    let separator = line.find(|c: char| c == '=' || c == ':')?;
    Some((line[..separator].trim(), separator))
}

fn split_variable(variable: &str) -> (Option<&str>, &str) {
    match variable.split_once('.') {
        Some((section, key)) => (Some(section), key),
        None => (None, variable),
    }
}

/// Finds the line holding `key`, optionally restricted to one section.
fn locate(lines: &[&str], section: Option<&str>, key: &str) -> Option<(usize, usize)> {
    let mut current: Option<&str> = None;

    for (index, line) in lines.iter().enumerate() {
        if let Some(name) = section_header(line) {
            current = Some(name);
            continue;
        }
        let in_scope = match section {
            Some(wanted) => current == Some(wanted),
            None => current.is_some(),
        };
        if !in_scope {
            continue;
        }
        if let Some((found, separator)) = option_entry(line) {
            if found.eq_ignore_ascii_case(key) {
                return Some((index, separator));
            }
        }
    }

    None
}

/// Index just after the last non-blank line of `section`, if the section exists.
fn section_insert_point(lines: &[&str], section: &str) -> Option<usize> {
    let header = lines
        .iter()
        .position(|line| section_header(line) == Some(section))?;

    let mut insert_at = header + 1;
    for (index, line) in lines.iter().enumerate().skip(header + 1) {
        if section_header(line).is_some() {
            break;
        }
        if !line.trim().is_empty() {
            insert_at = index + 1;
        }
    }
    Some(insert_at)
}

pub fn read_setup_cfg(path: &Path, variable: &str) -> Result<Option<String>> {
    let content = read_text(path)?;
    let lines: Vec<&str> = content.lines().collect();
    let (section, key) = split_variable(variable);

    Ok(locate(&lines, section, key).map(|(index, separator)| {
        lines[index][separator + 1..].trim().to_string()
    }))
}

/// Sets the option, appending the section or key when missing.
///
/// Always returns `Ok(true)` unless the file cannot be read or written.
pub fn update_setup_cfg(path: &Path, variable: &str, new_version: &str) -> Result<bool> {
    let content = read_text(path)?;
    let lines: Vec<&str> = content.split_inclusive('\n').collect();
    let (section, key) = split_variable(variable);
    let mut output: Vec<String> = lines.iter().map(|line| line.to_string()).collect();
    let newline = if content.contains("\r\n") { "\r\n" } else { "\n" };

    if let Some((index, separator)) = locate(&lines, section, key) {
        output[index] = rewrite_value(lines[index], separator, new_version);
    } else {
        let target = section.unwrap_or(FALLBACK_SECTION);
        let entry = format!("{} = {}{}", key, new_version, newline);

        if let Some(last) = output.last_mut() {
            if !last.ends_with('\n') {
                last.push_str(newline);
            }
        }

        match section_insert_point(&lines, target) {
            Some(insert_at) => output.insert(insert_at, entry),
            None => {
                if !output.is_empty() {
                    output.push(newline.to_string());
                }
                output.push(format!("[{}]{}", target, newline));
                output.push(entry);
            }
        }
    }

    write_text(path, &output.concat())?;
    Ok(true)
}
