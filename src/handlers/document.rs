//! Structured documents addressed by a dotted key path: TOML, YAML and JSON.
//!
//! Updates re-serialize the whole document. Key order is preserved, comments
//! and custom formatting are not.

use serde_json::Value as JsonValue;
use serde_yaml::Value as YamlValue;
use std::path::Path;

use super::{read_text, write_text};
use crate::error::{BumpCalverError, Result};

fn key_path(variable: &str) -> Vec<&str> {
    variable.split('.').collect()
}

fn parse_error(path: &Path, e: impl std::fmt::Display) -> BumpCalverError {
    BumpCalverError::handler(format!("Cannot parse {}: {}", path.display(), e))
}

fn serialize_error(path: &Path, e: impl std::fmt::Display) -> BumpCalverError {
    BumpCalverError::handler(format!("Cannot serialize {}: {}", path.display(), e))
}

fn load_toml(path: &Path) -> Result<toml::Table> {
    let content = read_text(path)?;
    toml::from_str::<toml::Table>(&content).map_err(|e| parse_error(path, e))
}

fn toml_scalar(value: &toml::Value) -> Option<String> {
    match value {
        toml::Value::String(s) => Some(s.clone()),
        toml::Value::Integer(i) => Some(i.to_string()),
        toml::Value::Float(f) => Some(f.to_string()),
        _ => None,
    }
}

/// Reads a dotted key such as `project.version` or `tool.poetry.version`.
pub fn read_toml(path: &Path, variable: &str) -> Result<Option<String>> {
    let table = load_toml(path)?;
    let keys = key_path(variable);

    let Some((last, parents)) = keys.split_last() else {
        return Ok(None);
    };

    let mut current = &table;
    for key in parents {
        match current.get(*key).and_then(|v| v.as_table()) {
            Some(next) => current = next,
            None => return Ok(None),
        }
    }

    Ok(current.get(*last).and_then(toml_scalar))
}

/// Replaces an existing dotted key; a missing key is not created.
pub fn update_toml(path: &Path, variable: &str, new_version: &str) -> Result<bool> {
    let mut table = load_toml(path)?;
    let keys = key_path(variable);

    let Some((last, parents)) = keys.split_last() else {
        return Ok(false);
    };

    let mut current = &mut table;
    for key in parents {
        match current.get_mut(*key).and_then(|v| v.as_table_mut()) {
            Some(next) => current = next,
            None => return Ok(false),
        }
    }

    match current.get_mut(*last) {
        Some(slot) => *slot = toml::Value::String(new_version.to_string()),
        None => return Ok(false),
    }

    let rendered = toml::to_string(&table).map_err(|e| serialize_error(path, e))?;
    write_text(path, &rendered)?;
    Ok(true)
}

fn load_yaml(path: &Path) -> Result<YamlValue> {
    let content = read_text(path)?;
    serde_yaml::from_str(&content).map_err(|e| parse_error(path, e))
}

fn yaml_scalar(value: &YamlValue) -> Option<String> {
    match value {
        YamlValue::String(s) => Some(s.clone()),
        YamlValue::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Returns the child slot for `key`, turning a null node into a mapping and
/// inserting the key when absent. Non-mapping nodes yield `None`.
fn yaml_child<'a>(node: &'a mut YamlValue, key: &str) -> Option<&'a mut YamlValue> {
    if node.is_null() {
        *node = YamlValue::Mapping(serde_yaml::Mapping::new());
    }
    let mapping = node.as_mapping_mut()?;
    Some(
        mapping
            .entry(YamlValue::String(key.to_string()))
            .or_insert(YamlValue::Null),
    )
}

pub fn read_yaml(path: &Path, variable: &str) -> Result<Option<String>> {
    let data = load_yaml(path)?;

    let mut current = &data;
    for key in key_path(variable) {
        match current.get(key) {
            Some(next) => current = next,
            None => return Ok(None),
        }
    }

    Ok(yaml_scalar(current))
}

/// Sets a dotted key, creating intermediate mappings as needed.
pub fn update_yaml(path: &Path, variable: &str, new_version: &str) -> Result<bool> {
    let mut data = load_yaml(path)?;

    let mut current = &mut data;
    for key in key_path(variable) {
        current = match yaml_child(current, key) {
            Some(next) => next,
            None => return Ok(false),
        };
    }
    *current = YamlValue::String(new_version.to_string());

    let rendered = serde_yaml::to_string(&data).map_err(|e| serialize_error(path, e))?;
    write_text(path, &rendered)?;
    Ok(true)
}

fn load_json(path: &Path) -> Result<JsonValue> {
    let content = read_text(path)?;
    serde_json::from_str(&content).map_err(|e| parse_error(path, e))
}

pub fn read_json(path: &Path, variable: &str) -> Result<Option<String>> {
    let data = load_json(path)?;

    let mut current = &data;
    for key in key_path(variable) {
        match current.get(key) {
            Some(next) => current = next,
            None => return Ok(None),
        }
    }

    Ok(match current {
        JsonValue::String(s) => Some(s.clone()),
        JsonValue::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

/// Replaces an existing dotted key and writes the document back with two-space indentation.
pub fn update_json(path: &Path, variable: &str, new_version: &str) -> Result<bool> {
    let mut data = load_json(path)?;

    let mut current = &mut data;
    for key in key_path(variable) {
        match current.get_mut(key) {
            Some(next) => current = next,
            None => return Ok(false),
        }
    }
    *current = JsonValue::String(new_version.to_string());

    let mut rendered = serde_json::to_string_pretty(&data).map_err(|e| serialize_error(path, e))?;
    rendered.push('\n');
    write_text(path, &rendered)?;
    Ok(true)
}
