use anyhow::{Context, Result};
use log::{debug, warn};
use serde_json::Value;
use std::path::Path;

use super::{Registration, RegistrationSource, truthy};
use crate::runtime::{Runtime, resolve_relative_path};

/// Registration snapshot written by the CMS.
///
/// Accepts either `{"plugins": {"Name": {...}}}` or the bare
/// `{"Name": {...}}` object. Entry order in the file is discovery order.
#[derive(Debug, Default)]
pub struct JsonRegistrationSource {
    plugins: Vec<Registration>,
}

impl JsonRegistrationSource {
    pub fn new(plugins: Vec<Registration>) -> Self {
        Self { plugins }
    }

    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }

    /// Load the snapshot at `path`. A missing snapshot means nothing is registered.
    #[tracing::instrument(skip(runtime))]
    pub fn load(runtime: &dyn Runtime, path: &Path) -> Result<Self> {
        if !runtime.exists(path) {
            debug!("No registration snapshot at {:?}", path);
            return Ok(Self::default());
        }

        let content = runtime.read_to_string(path)?;
        let snapshot: Value = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse registration snapshot {:?}", path))?;
        let base_dir = path.parent().unwrap_or(Path::new(""));

        Ok(Self::from_snapshot(&snapshot, base_dir))
    }

    fn from_snapshot(snapshot: &Value, base_dir: &Path) -> Self {
        let entries = match snapshot.get("plugins") {
            Some(Value::Object(plugins)) => plugins,
            _ => match snapshot {
                Value::Object(plugins) => plugins,
                _ => return Self::default(),
            },
        };

        let mut plugins = Vec::with_capacity(entries.len());
        for (key, entry) in entries {
            // Empty entries are not registrations
            if !truthy(entry) {
                continue;
            }

            match serde_json::from_value::<Registration>(entry.clone()) {
                Ok(mut registration) => {
                    if registration.name.is_empty() {
                        registration.name = key.clone();
                    }
                    if !registration.path.as_os_str().is_empty() {
                        registration.path = resolve_relative_path(base_dir, &registration.path);
                    }
                    plugins.push(registration);
                }
                Err(e) => warn!("Skipping malformed registration for {}: {}", key, e),
            }
        }

        Self { plugins }
    }
}

impl RegistrationSource for JsonRegistrationSource {
    fn get(&self, name: &str) -> Option<Registration> {
        self.plugins.iter().find(|p| p.name == name).cloned()
    }

    fn all(&self) -> Vec<Registration> {
        self.plugins.clone()
    }
}
