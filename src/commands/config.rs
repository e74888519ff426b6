use anyhow::{Context, Result};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::{
    host::{ConfiguredHost, PlatformConfig},
    plugin::PluginRegistry,
    runtime::{Runtime, resolve_relative_path},
    services::Services,
    store::{JsonInstalledIndex, JsonPermissionStore, JsonRegistrationSource, JsonSettingsStore},
};

/// Environment variable naming the configuration file.
pub const CONFIG_ENV: &str = "QAPKG_CONFIG";

/// Configuration file name inside the user config directory.
const USER_CONFIG: &str = "qapkg/config.json";

/// Configuration file name looked up in the working directory.
const LOCAL_CONFIG: &str = "qapkg.json";

/// Default snapshot file name next to the configuration file.
const SNAPSHOT_FILE: &str = "snapshot.json";

/// One CMS installation as described by `qapkg.json`.
///
/// After [`Config::load`] every path is absolute and normalized.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub plugin_paths: Vec<PathBuf>,
    pub snapshot: Option<PathBuf>,
    pub settings: Option<PathBuf>,
    pub permissions: Option<PathBuf>,
    pub installed: Option<PathBuf>,
    pub platform: PlatformConfig,
}

impl Config {
    /// Pick the configuration file: explicit flag, then `QAPKG_CONFIG`, then
    /// the user config directory, then `./qapkg.json`.
    #[tracing::instrument(skip(runtime))]
    pub fn locate(runtime: &dyn Runtime, flag: Option<PathBuf>) -> Result<PathBuf> {
        let cwd = runtime.current_dir()?;

        if let Some(path) = flag {
            debug!("Using config from --config: {:?}", path);
            return Ok(resolve_relative_path(&cwd, &path));
        }

        if let Ok(path) = runtime.env_var(CONFIG_ENV)
            && !path.is_empty()
        {
            debug!("Using config from {}: {}", CONFIG_ENV, path);
            return Ok(resolve_relative_path(&cwd, Path::new(&path)));
        }

        if let Some(dir) = runtime.config_dir() {
            let path = dir.join(USER_CONFIG);
            if runtime.exists(&path) {
                debug!("Using user config {:?}", path);
                return Ok(path);
            }
        }

        Ok(cwd.join(LOCAL_CONFIG))
    }

    /// Read the configuration at `path` and resolve its paths against the
    /// file's directory.
    #[tracing::instrument(skip(runtime))]
    pub fn load(runtime: &dyn Runtime, path: &Path) -> Result<Self> {
        if !runtime.exists(path) {
            anyhow::bail!("Config file {} not found", path.display());
        }

        let content = runtime
            .read_to_string(path)
            .with_context(|| format!("Failed to read config {:?}", path))?;
        let config: Config = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config {:?}", path))?;
        let base_dir = path.parent().unwrap_or(Path::new(""));

        Ok(config.resolved(base_dir))
    }

    fn resolved(self, base_dir: &Path) -> Self {
        let resolve = |p: PathBuf| resolve_relative_path(base_dir, &p);
        Self {
            plugin_paths: self.plugin_paths.into_iter().map(resolve).collect(),
            snapshot: Some(
                self.snapshot
                    .map(resolve)
                    .unwrap_or_else(|| resolve(PathBuf::from(SNAPSHOT_FILE))),
            ),
            settings: self.settings.map(resolve),
            permissions: self.permissions.map(resolve),
            installed: self.installed.map(resolve),
            platform: self.platform,
        }
    }

    /// Wire the JSON-file stores described by this configuration.
    pub fn build_services(&self, runtime: Arc<dyn Runtime>) -> Result<Arc<Services>> {
        let registrations = match &self.snapshot {
            Some(path) => JsonRegistrationSource::load(runtime.as_ref(), path)?,
            None => JsonRegistrationSource::default(),
        };
        info!("{} registered plugin(s)", registrations.len());

        Ok(Arc::new(Services {
            host: Arc::new(ConfiguredHost::new(self.platform.clone())),
            registrations: Arc::new(registrations),
            settings: Arc::new(JsonSettingsStore::new(runtime.clone(), self.settings.clone())),
            permissions: Arc::new(JsonPermissionStore::new(
                runtime.clone(),
                self.permissions.clone(),
            )),
            installed: Arc::new(JsonInstalledIndex::new(runtime.clone(), self.installed.clone())),
            runtime,
        }))
    }

    pub fn registry(&self, runtime: Arc<dyn Runtime>) -> Result<PluginRegistry> {
        let services = self.build_services(runtime)?;
        Ok(PluginRegistry::new(services, self.plugin_paths.clone()))
    }
}
