//! Plugin manifest validation.

use regex::Regex;
use serde_json::Value;
use std::path::Path;
use std::sync::LazyLock;

use crate::error::ManifestIssue;
use crate::naming::is_theme_package;
use crate::runtime::Runtime;
use crate::value;

/// Manifest `type` values accepted for plugins and themes alike.
pub const PLUGIN_TYPES: [&str; 2] = ["quickapps-plugin", "cakephp-plugin"];

static PACKAGE_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(.+)/(.+)$").expect("package name pattern is valid"));

/// Manifest given either already decoded or as a path to a JSON file.
#[derive(Debug, Clone, Copy)]
pub enum ManifestSource<'a> {
    Value(&'a Value),
    Path(&'a Path),
}

impl<'a> From<&'a Value> for ManifestSource<'a> {
    fn from(value: &'a Value) -> Self {
        ManifestSource::Value(value)
    }
}

impl<'a> From<&'a Path> for ManifestSource<'a> {
    fn from(path: &'a Path) -> Self {
        ManifestSource::Path(path)
    }
}

/// Validate a manifest and report every problem found.
///
/// Rules, all evaluated:
/// - must decode to a non-empty JSON object
/// - `type` must be present and one of [`PLUGIN_TYPES`]
/// - `name` must be present and follow `author/package`
/// - a theme (`name` ending in `theme`) must declare `extra.regions`
pub fn validate_json(runtime: &dyn Runtime, source: ManifestSource<'_>) -> Vec<ManifestIssue> {
    let decoded = match source {
        ManifestSource::Value(value) => Some(value.clone()),
        ManifestSource::Path(path) => decode_file(runtime, path),
    };

    let json = match decoded {
        Some(Value::Object(map)) if !map.is_empty() => Value::Object(map),
        _ => return vec![ManifestIssue::Corrupt],
    };

    let mut issues = Vec::new();

    match json.get("type") {
        None | Some(Value::Null) => issues.push(ManifestIssue::MissingField("type".into())),
        Some(Value::String(kind)) if PLUGIN_TYPES.contains(&kind.as_str()) => {}
        Some(other) => issues.push(ManifestIssue::InvalidField {
            field: "type".into(),
            value: display(other),
            expected: PLUGIN_TYPES.join(" or "),
        }),
    }

    match json.get("name") {
        None | Some(Value::Null) => issues.push(ManifestIssue::MissingField("name".into())),
        Some(Value::String(name)) if PACKAGE_NAME.is_match(name) => {
            if is_theme_package(name) && value::lookup(&json, "extra.regions").is_none() {
                issues.push(ManifestIssue::MissingField("extra.regions".into()));
            }
        }
        Some(other) => issues.push(ManifestIssue::InvalidField {
            field: "name".into(),
            value: display(other),
            expected: "{author-name}/{package-name}".into(),
        }),
    }

    issues
}

fn decode_file(runtime: &dyn Runtime, path: &Path) -> Option<Value> {
    if !runtime.exists(path) || runtime.is_dir(path) {
        return None;
    }
    let content = runtime.read_to_string(path).ok()?;
    serde_json::from_str(&content).ok()
}

fn display(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
