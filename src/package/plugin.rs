use log::{debug, warn};
use regex::Regex;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, LazyLock, OnceLock};

use crate::naming::plugin_name;
use crate::runtime::path::file_name_str;
use crate::services::Services;
use crate::store::Registration;
use crate::value;

/// Version used for a registered plugin no source could version.
pub const DEFAULT_VERSION: &str = "dev-master";

/// Role identifier -> permission paths (`Plugin/Controller/action`).
pub type PermissionTree = BTreeMap<String, Vec<String>>;

/// Loose version files: `VERSION.txt`, `version.md`, ...
static VERSION_FILE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"version?(\.\w+)").expect("version file pattern is valid"));

/// An installable plugin or theme.
///
/// Metadata is pulled lazily from the manifest, the plugin directory and the
/// external stores. Every section is computed at most once per instance.
pub struct PluginPackage {
    package_name: String,
    name: String,
    path: PathBuf,
    registration: Option<Registration>,
    services: Arc<Services>,

    version: OnceLock<String>,
    composer: OnceLock<Value>,
    composer_info: OnceLock<Value>,
    settings: OnceLock<Map<String, Value>>,
    permissions: OnceLock<PermissionTree>,
}

impl PluginPackage {
    /// A plugin the CMS has registered.
    pub fn registered(
        package_name: impl Into<String>,
        registration: Registration,
        services: Arc<Services>,
    ) -> Self {
        let package_name = package_name.into();
        let name = if registration.name.is_empty() {
            plugin_name(&package_name)
        } else {
            registration.name.clone()
        };
        let path = registration.path.clone();
        Self::build(package_name, name, path, Some(registration), services)
    }

    /// A plugin directory found on disk that the CMS has not registered.
    pub fn discovered(
        package_name: impl Into<String>,
        path: PathBuf,
        services: Arc<Services>,
    ) -> Self {
        let package_name = package_name.into();
        let name = plugin_name(&package_name);
        Self::build(package_name, name, path, None, services)
    }

    fn build(
        package_name: String,
        name: String,
        path: PathBuf,
        registration: Option<Registration>,
        services: Arc<Services>,
    ) -> Self {
        Self {
            name,
            package_name,
            path,
            registration,
            services,
            version: OnceLock::new(),
            composer: OnceLock::new(),
            composer_info: OnceLock::new(),
            settings: OnceLock::new(),
            permissions: OnceLock::new(),
        }
    }

    /// Raw package name as given, e.g. `acme/blog` or `Blog`.
    pub fn package_name(&self) -> &str {
        &self.package_name
    }

    /// Normalized CamelCase name, e.g. `Blog`.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn human_name(&self) -> &str {
        self.registration
            .as_ref()
            .and_then(|r| r.human_name.as_deref())
            .unwrap_or(&self.name)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn registration(&self) -> Option<&Registration> {
        self.registration.as_ref()
    }

    pub fn is_registered(&self) -> bool {
        self.services.is_registered(&self.name)
    }

    pub fn is_theme(&self) -> bool {
        self.registration.as_ref().is_some_and(|r| r.is_theme)
    }

    pub fn is_core(&self) -> bool {
        self.registration.as_ref().is_some_and(|r| r.is_core)
    }

    pub fn has_help(&self) -> bool {
        self.registration.as_ref().is_some_and(|r| r.has_help)
    }

    pub fn has_settings(&self) -> bool {
        self.registration.as_ref().is_some_and(|r| r.has_settings)
    }

    /// Whether the plugin is enabled.
    pub fn status(&self) -> bool {
        self.registration.as_ref().is_some_and(|r| r.status)
    }

    /// Raw manifest contents, or an empty mapping when there is none.
    pub fn composer(&self) -> &Value {
        self.composer.get_or_init(|| {
            match self.services.manifests().read_plugin(&self.path) {
                Ok(Some(manifest @ Value::Object(_))) => manifest,
                Ok(Some(_)) => {
                    warn!("Manifest of {} is not a JSON object", self.name);
                    Value::Object(Map::new())
                }
                Ok(None) => Value::Object(Map::new()),
                Err(e) => {
                    warn!("Failed to read manifest of {}: {:#}", self.name, e);
                    Value::Object(Map::new())
                }
            }
        })
    }

    /// Manifest as exposed by `info()`: themes always carry `extra.regions`
    /// and `extra.admin`.
    fn composer_info(&self) -> &Value {
        self.composer_info.get_or_init(|| {
            let mut composer = self.composer().clone();
            if self.is_theme() {
                inject_theme_defaults(&mut composer);
            }
            composer
        })
    }

    /// Declared dependencies (`require`): dependency name -> constraint.
    pub fn dependencies(&self) -> Vec<(String, String)> {
        match self.composer().get("require") {
            Some(Value::Object(require)) => require
                .iter()
                .map(|(name, constraint)| {
                    let constraint = match constraint {
                        Value::String(s) => s.clone(),
                        other => other.to_string(),
                    };
                    (name.clone(), constraint)
                })
                .collect(),
            _ => Vec::new(),
        }
    }

    /// Persisted settings, read once from the settings store.
    ///
    /// An unreachable store or a missing record both yield an empty mapping.
    pub fn settings(&self) -> &Map<String, Value> {
        self.settings
            .get_or_init(|| match self.services.settings.get(&self.name) {
                Ok(settings) => settings,
                Err(e) => {
                    warn!("Settings for {} unavailable: {}", self.name, e);
                    Map::new()
                }
            })
    }

    /// A single setting, `None` when absent.
    pub fn setting(&self, key: &str) -> Option<&Value> {
        self.settings().get(key)
    }

    /// Inject settings before they are first read.
    ///
    /// Returns `false` and leaves the memoized settings untouched if they
    /// were already loaded or injected.
    pub fn set_settings(&self, settings: Map<String, Value>) -> bool {
        self.settings.set(settings).is_ok()
    }

    /// Permission tree of this plugin, grouped by role.
    pub fn permissions(&self) -> &PermissionTree {
        self.permissions.get_or_init(|| self.resolve_permissions())
    }

    /// The permission tree if it has been computed, `None` if not yet.
    pub fn cached_permissions(&self) -> Option<&PermissionTree> {
        self.permissions.get()
    }

    fn resolve_permissions(&self) -> PermissionTree {
        let store = &self.services.permissions;
        let grants = match store.grants_for(&self.name) {
            Ok(grants) => grants,
            Err(e) => {
                warn!("Permissions for {} unavailable: {}", self.name, e);
                return PermissionTree::new();
            }
        };

        let mut tree = PermissionTree::new();
        for grant in grants {
            match store.aco_path(grant.aco_id) {
                Ok(aliases) => tree.entry(grant.role).or_default().push(aliases.join("/")),
                Err(e) => warn!(
                    "Skipping permission of {} on node {}: {}",
                    grant.role, grant.aco_id, e
                ),
            }
        }
        tree
    }

    /// Plugin information, or one value of it by dotted path.
    ///
    /// The base keys come from the registration. The `composer`, `settings`
    /// and `permissions` sections are pulled in when `key` is `None` or
    /// mentions the section, and stay included once loaded. Missing paths
    /// yield `None`.
    pub fn info(&self, key: Option<&str>) -> Option<Value> {
        let parts: Vec<&str> = key.map(|k| k.split('.').collect()).unwrap_or_default();
        let wants = |section: &str| key.is_none() || parts.contains(&section);

        let mut info = match &self.registration {
            Some(registration) => registration.to_info(),
            None => {
                let mut info = Map::new();
                info.insert("name".into(), Value::String(self.name.clone()));
                info.insert(
                    "path".into(),
                    Value::String(self.path.to_string_lossy().into_owned()),
                );
                info
            }
        };

        if wants("composer") || self.composer_info.get().is_some() {
            info.entry("composer")
                .or_insert_with(|| self.composer_info().clone());
        }
        if wants("settings") || self.settings.get().is_some() {
            info.entry("settings")
                .or_insert_with(|| Value::Object(self.settings().clone()));
        }
        if wants("permissions") || self.permissions.get().is_some() {
            info.entry("permissions")
                .or_insert_with(|| permissions_value(self.permissions()));
        }

        let info = Value::Object(info);
        match key {
            None => Some(info),
            Some(key) => value::lookup(&info, key).cloned(),
        }
    }

    /// Resolved version, computed on first call.
    pub fn version(&self) -> String {
        self.version.get_or_init(|| self.resolve_version()).clone()
    }

    fn resolve_version(&self) -> String {
        if !self.is_registered() {
            debug!("{} is not registered, no version", self.name);
            return String::new();
        }

        if let Some(version) = self.composer().get("version").and_then(Value::as_str)
            && !version.is_empty()
        {
            debug!("{} version {} from manifest", self.name, version);
            return version.to_string();
        }

        if let Some(version) = self.version_from_file() {
            debug!("{} version {} from version file", self.name, version);
            return version;
        }

        if let Some(version) = self.services.installed.lookup(&self.package_name) {
            debug!("{} version {} from installed index", self.name, version);
            return version;
        }

        DEFAULT_VERSION.to_string()
    }

    /// Last non-empty line of a `version.*` file at the plugin root.
    fn version_from_file(&self) -> Option<String> {
        let runtime = &self.services.runtime;
        let mut entries = runtime.read_dir(&self.path).ok()?;
        entries.sort();

        for entry in entries {
            let Some(file_name) = file_name_str(&entry) else {
                continue;
            };
            if !VERSION_FILE.is_match(&file_name.to_lowercase()) || runtime.is_dir(&entry) {
                continue;
            }

            match runtime.read_to_string(&entry) {
                Ok(content) => {
                    let last = content
                        .lines()
                        .map(str::trim)
                        .rfind(|line| !line.is_empty());
                    if let Some(version) = last {
                        return Some(version.to_string());
                    }
                }
                Err(e) => debug!("Cannot read version file {:?}: {}", entry, e),
            }
        }

        None
    }
}

impl std::fmt::Debug for PluginPackage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PluginPackage")
            .field("package_name", &self.package_name)
            .field("name", &self.name)
            .field("path", &self.path)
            .field("version", &self.version.get())
            .finish()
    }
}

fn inject_theme_defaults(composer: &mut Value) {
    let Value::Object(manifest) = composer else {
        return;
    };
    let extra = manifest
        .entry("extra")
        .or_insert_with(|| Value::Object(Map::new()));
    if !extra.is_object() {
        *extra = Value::Object(Map::new());
    }
    if let Value::Object(extra) = extra {
        set_if_absent(extra, "admin", Value::Bool(false));
        set_if_absent(extra, "regions", Value::Array(Vec::new()));
    }
}

/// A `null` value counts as absent.
fn set_if_absent(map: &mut Map<String, Value>, key: &str, default: Value) {
    let slot = map.entry(key).or_insert(Value::Null);
    if slot.is_null() {
        *slot = default;
    }
}

fn permissions_value(tree: &PermissionTree) -> Value {
    Value::Object(
        tree.iter()
            .map(|(role, paths)| {
                let paths = paths.iter().cloned().map(Value::String).collect();
                (role.clone(), Value::Array(paths))
            })
            .collect(),
    )
}
