use log::debug;
use serde::Deserialize;
use serde_json::Value;
use std::path::PathBuf;
use std::sync::Arc;

use super::InstalledPackagesIndex;
use crate::runtime::Runtime;

#[derive(Debug, Deserialize)]
struct InstalledRecord {
    name: String,
    #[serde(default)]
    version: Option<String>,
}

/// Composer's `installed.json`.
///
/// Both the 1.x layout (a bare array of records) and the 2.x layout
/// (`{"packages": [...]}`) are understood. Lookups never fail: an absent or
/// unreadable index simply has no entries.
pub struct JsonInstalledIndex {
    runtime: Arc<dyn Runtime>,
    path: Option<PathBuf>,
}

impl JsonInstalledIndex {
    pub fn new(runtime: Arc<dyn Runtime>, path: Option<PathBuf>) -> Self {
        Self { runtime, path }
    }

    fn records(&self) -> Vec<InstalledRecord> {
        let Some(path) = &self.path else {
            return Vec::new();
        };
        if !self.runtime.exists(path) {
            return Vec::new();
        }

        let parsed = self
            .runtime
            .read_to_string(path)
            .and_then(|content| Ok(serde_json::from_str::<Value>(&content)?));
        let json = match parsed {
            Ok(json) => json,
            Err(e) => {
                debug!("Ignoring unreadable installed index {:?}: {}", path, e);
                return Vec::new();
            }
        };

        let list = match json {
            Value::Array(items) => items,
            Value::Object(mut map) => match map.remove("packages") {
                Some(Value::Array(items)) => items,
                _ => Vec::new(),
            },
            _ => Vec::new(),
        };

        list.into_iter()
            .filter_map(|item| serde_json::from_value(item).ok())
            .collect()
    }
}

impl InstalledPackagesIndex for JsonInstalledIndex {
    #[tracing::instrument(skip(self))]
    fn lookup(&self, name: &str) -> Option<String> {
        let wanted = name.to_lowercase();
        self.records()
            .into_iter()
            .filter(|record| record.version.is_some())
            .find(|record| record.name.to_lowercase() == wanted)
            .and_then(|record| record.version)
    }
}
