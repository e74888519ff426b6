//! Collaborator stores consumed by the package layer.
//!
//! Each store is a trait so the package and registry logic can be tested
//! against mocks; the JSON-file implementations in the submodules read the
//! files written by the CMS.

mod installed;
mod manifest;
mod permissions;
mod registration;
mod settings;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value, json};
use std::path::PathBuf;

use crate::error::PackageError;

pub use installed::JsonInstalledIndex;
pub use manifest::{MANIFEST_FILE, ManifestReader};
pub use permissions::{Aco, AclTree, JsonPermissionStore, Permission};
pub use registration::JsonRegistrationSource;
pub use settings::JsonSettingsStore;

/// Registration metadata the CMS keeps for an installed plugin.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Registration {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub package: Option<String>,
    #[serde(default)]
    pub human_name: Option<String>,
    #[serde(rename = "isTheme", default, deserialize_with = "flag")]
    pub is_theme: bool,
    #[serde(rename = "isCore", default, deserialize_with = "flag")]
    pub is_core: bool,
    #[serde(rename = "hasHelp", default, deserialize_with = "flag")]
    pub has_help: bool,
    #[serde(rename = "hasSettings", default, deserialize_with = "flag")]
    pub has_settings: bool,
    #[serde(default, deserialize_with = "flag")]
    pub status: bool,
    #[serde(rename = "eventListeners", default)]
    pub event_listeners: Vec<Value>,
    #[serde(default)]
    pub path: PathBuf,
}

impl Registration {
    /// Base section of a plugin's `info()` mapping.
    pub fn to_info(&self) -> Map<String, Value> {
        let info = json!({
            "name": self.name,
            "human_name": self.human_name.clone().unwrap_or_else(|| self.name.clone()),
            "package": self.package,
            "isTheme": self.is_theme,
            "isCore": self.is_core,
            "hasHelp": self.has_help,
            "hasSettings": self.has_settings,
            "eventListeners": self.event_listeners,
            "status": self.status,
            "path": self.path.to_string_lossy(),
        });

        match info {
            Value::Object(map) => map,
            _ => Map::new(),
        }
    }
}

/// Snapshot writers store flags as booleans, integers or strings.
fn flag<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    Ok(truthy(&Value::deserialize(deserializer)?))
}

pub(crate) fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty() && s != "0",
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}

/// A single permission grant: a role allowed to reach one ACL node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PermissionGrant {
    pub role: String,
    pub aco_id: u64,
}

/// Source of plugin registration metadata.
#[cfg_attr(test, mockall::automock)]
pub trait RegistrationSource: Send + Sync {
    /// Registration for a plugin by its normalized name, if it is registered.
    fn get(&self, name: &str) -> Option<Registration>;

    /// Every registered plugin in discovery order.
    fn all(&self) -> Vec<Registration>;
}

/// Persisted per-plugin settings.
#[cfg_attr(test, mockall::automock)]
pub trait SettingsStore: Send + Sync {
    /// Settings for a plugin; an empty mapping when it has none.
    fn get(&self, plugin: &str) -> Result<Map<String, Value>, PackageError>;
}

/// Access control list store.
#[cfg_attr(test, mockall::automock)]
pub trait PermissionStore: Send + Sync {
    /// Every grant scoped to the plugin's controllers.
    fn grants_for(&self, plugin: &str) -> Result<Vec<PermissionGrant>, PackageError>;

    /// Aliases of the ACL nodes from the root down to `aco_id`.
    fn aco_path(&self, aco_id: u64) -> Result<Vec<String>, PackageError>;
}

/// Aggregated index of packages installed by the dependency manager.
#[cfg_attr(test, mockall::automock)]
pub trait InstalledPackagesIndex: Send + Sync {
    /// Version of the first record whose name matches, case-insensitively.
    fn lookup(&self, name: &str) -> Option<String>;
}
