use log::debug;
use serde_json::{Map, Value};
use std::path::PathBuf;
use std::sync::Arc;

use super::SettingsStore;
use crate::error::PackageError;
use crate::runtime::Runtime;

/// Settings file keyed by plugin name: `{"Blog": {"per_page": 10}}`.
///
/// The file is read on every call; callers memoize.
pub struct JsonSettingsStore {
    runtime: Arc<dyn Runtime>,
    path: Option<PathBuf>,
}

impl JsonSettingsStore {
    pub fn new(runtime: Arc<dyn Runtime>, path: Option<PathBuf>) -> Self {
        Self { runtime, path }
    }
}

impl SettingsStore for JsonSettingsStore {
    #[tracing::instrument(skip(self))]
    fn get(&self, plugin: &str) -> Result<Map<String, Value>, PackageError> {
        let Some(path) = &self.path else {
            return Ok(Map::new());
        };
        if !self.runtime.exists(path) {
            debug!("No settings file at {:?}", path);
            return Ok(Map::new());
        }

        let content = self
            .runtime
            .read_to_string(path)
            .map_err(PackageError::store_unavailable)?;
        let all: Value = serde_json::from_str(&content)
            .map_err(|e| PackageError::StoreUnavailable(format!("{:?}: {}", path, e)))?;

        match all.get(plugin) {
            Some(Value::Object(settings)) => Ok(settings.clone()),
            _ => Ok(Map::new()),
        }
    }
}
