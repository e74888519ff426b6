use log::debug;
use std::sync::{Arc, OnceLock};

use crate::host::HostEnvironment;

/// Version reported for a module that is loaded but has no version API.
///
/// It ranks above any real version so that "present" satisfies any
/// practical constraint.
pub const SENTINEL_VERSION: &str = "99999";

/// A dependency provided by the host runtime (`php`, `ext-intl`, `lib-icu`).
pub struct LibraryPackage {
    package_name: String,
    host: Arc<dyn HostEnvironment>,
    version: OnceLock<String>,
}

impl LibraryPackage {
    pub fn new(package_name: impl Into<String>, host: Arc<dyn HostEnvironment>) -> Self {
        Self {
            package_name: package_name.into(),
            host,
            version: OnceLock::new(),
        }
    }

    pub fn package_name(&self) -> &str {
        &self.package_name
    }

    /// Module identifier the host knows this library by.
    ///
    /// `lib-icu` is provided by `intl`; `ext-` prefixes are dropped.
    pub fn module_name(&self) -> String {
        let lib = self.package_name.to_lowercase();
        if lib == "lib-icu" {
            return "intl".to_string();
        }
        match lib.strip_prefix("ext-") {
            Some(module) => module.to_string(),
            None => lib,
        }
    }

    /// Resolved version, computed on first call. Empty when the host lacks it.
    pub fn version(&self) -> String {
        self.version.get_or_init(|| self.resolve_version()).clone()
    }

    fn resolve_version(&self) -> String {
        let module = self.module_name();

        let version = if module == self.host.runtime_name().to_lowercase() {
            self.host.runtime_version()
        } else if let Some(version) = self.host.module_version(&module) {
            version
        } else if self.host.module_loaded(&module) {
            SENTINEL_VERSION.to_string()
        } else {
            String::new()
        };

        debug!("Library {} resolved to version {:?}", self.package_name, version);
        version
    }
}
