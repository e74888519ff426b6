use anyhow::{Context, Result};
use serde_json::Value;
use std::path::Path;

use crate::runtime::Runtime;

/// Manifest file name at a plugin's root.
pub const MANIFEST_FILE: &str = "composer.json";

/// Decodes manifest files through the [`Runtime`].
pub struct ManifestReader<'a> {
    runtime: &'a dyn Runtime,
}

impl<'a> ManifestReader<'a> {
    pub fn new(runtime: &'a dyn Runtime) -> Self {
        Self { runtime }
    }

    #[tracing::instrument(skip(self))]
    pub fn read(&self, path: &Path) -> Result<Value> {
        let content = self.runtime.read_to_string(path)?;
        serde_json::from_str(&content).with_context(|| format!("Invalid JSON in {:?}", path))
    }

    /// The manifest at a plugin root, if one exists and decodes.
    pub fn read_plugin(&self, plugin_root: &Path) -> Result<Option<Value>> {
        let path = plugin_root.join(MANIFEST_FILE);
        if !self.runtime.exists(&path) {
            return Ok(None);
        }
        self.read(&path).map(Some)
    }
}
