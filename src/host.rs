//! Host runtime introspection.
//!
//! Library packages (`php`, `ext-intl`, `lib-icu`) are versioned by the
//! interpreter hosting the CMS, not by files. The [`HostEnvironment`] trait
//! is the seam to that interpreter; [`ConfiguredHost`] answers from the
//! `platform` section of the configuration.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Identifier of the host runtime when none is configured.
pub const DEFAULT_RUNTIME: &str = "php";

#[cfg_attr(test, mockall::automock)]
pub trait HostEnvironment: Send + Sync {
    /// Bare identifier of the host runtime, e.g. `php`.
    fn runtime_name(&self) -> String;

    /// Version string of the host runtime itself.
    fn runtime_version(&self) -> String;

    /// Version reported by a loaded module, if the module exposes one.
    fn module_version(&self, module: &str) -> Option<String>;

    /// Whether a module is loaded, regardless of version support.
    fn module_loaded(&self, module: &str) -> bool;
}

/// Platform description as written in the configuration file.
///
/// A module mapped to `null` is loaded but has no version API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlatformConfig {
    #[serde(default = "default_runtime")]
    pub runtime: String,
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub modules: BTreeMap<String, Option<String>>,
}

fn default_runtime() -> String {
    DEFAULT_RUNTIME.to_string()
}

impl Default for PlatformConfig {
    fn default() -> Self {
        Self {
            runtime: default_runtime(),
            version: String::new(),
            modules: BTreeMap::new(),
        }
    }
}

/// [`HostEnvironment`] backed by a static [`PlatformConfig`].
pub struct ConfiguredHost {
    platform: PlatformConfig,
}

impl ConfiguredHost {
    pub fn new(platform: PlatformConfig) -> Self {
        let modules = platform
            .modules
            .into_iter()
            .map(|(name, version)| (name.to_lowercase(), version))
            .collect();
        Self {
            platform: PlatformConfig {
                runtime: platform.runtime.to_lowercase(),
                version: platform.version,
                modules,
            },
        }
    }
}

impl HostEnvironment for ConfiguredHost {
    fn runtime_name(&self) -> String {
        self.platform.runtime.clone()
    }

    fn runtime_version(&self) -> String {
        self.platform.version.clone()
    }

    fn module_version(&self, module: &str) -> Option<String> {
        self.platform
            .modules
            .get(&module.to_lowercase())
            .cloned()
            .flatten()
            .filter(|v| !v.is_empty())
    }

    fn module_loaded(&self, module: &str) -> bool {
        self.platform.modules.contains_key(&module.to_lowercase())
    }
}
