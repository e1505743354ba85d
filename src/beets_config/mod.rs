//! The beets YAML config document and `beet version` output.

use serde_json::{Map, Value};

use crate::library::{BridgeError, BridgeResult};

/// Parses a beets config document. Empty or null documents are an empty object.
pub fn parse_document(text: &str) -> BridgeResult<Value> {
    if text.trim().is_empty() {
        return Ok(Value::Object(Map::new()));
    }
    let value: Value =
        serde_yaml::from_str(text).map_err(|e| BridgeError::InvalidConfig(e.to_string()))?;
    match value {
        Value::Null => Ok(Value::Object(Map::new())),
        Value::Object(_) => Ok(value),
        other => Err(BridgeError::InvalidConfig(format!(
            "top level of the config must be a mapping, found {}",
            json_type_name(&other)
        ))),
    }
}

pub fn render_document(document: &Value) -> BridgeResult<String> {
    serde_yaml::to_string(document).map_err(|e| BridgeError::InvalidConfig(e.to_string()))
}

/// Merges `patch` into `base`: objects merge key by key, anything else replaces.
pub fn deep_merge(base: &mut Value, patch: Value) {
    match (base, patch) {
        (Value::Object(base), Value::Object(patch)) => {
            for (key, value) in patch {
                match base.get_mut(&key) {
                    Some(existing) => deep_merge(existing, value),
                    None => {
                        base.insert(key, value);
                    }
                }
            }
        }
        (base, patch) => *base = patch,
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct VersionInfo {
    pub version: Option<String>,
    pub python_version: Option<String>,
    pub plugins: Vec<String>,
}

/// Parses the output of `beet version`:
///
/// ```text
/// beets version 1.6.0
/// Python version 3.11.2
/// plugins: fetchart, lastgenre
/// ```
pub fn parse_version_output(stdout: &str) -> VersionInfo {
    let mut info = VersionInfo::default();
    for line in stdout.lines().map(str::trim) {
        if let Some(version) = line.strip_prefix("beets version ") {
            info.version = Some(version.trim().to_string());
        } else if let Some(version) = line.strip_prefix("Python version ") {
            info.python_version = Some(version.trim().to_string());
        } else if let Some(plugins) = line.strip_prefix("plugins:") {
            info.plugins = plugins
                .split(',')
                .map(str::trim)
                .filter(|p| !p.is_empty())
                .map(str::to_string)
                .collect();
        }
    }
    info
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "a mapping",
    }
}
