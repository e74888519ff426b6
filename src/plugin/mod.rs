//! Plugin discovery and the registry facade.

mod manifest;
mod registry;

pub use manifest::{ManifestSource, PLUGIN_TYPES, validate_json};
pub use registry::{PluginRegistry, ScanResult};
