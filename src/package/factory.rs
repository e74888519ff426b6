//! Classification of package names into library or plugin packages.

use log::debug;

use super::{LibraryPackage, Package, PluginPackage};
use crate::error::PackageError;
use crate::naming::plugin_name;
use crate::plugin::PluginRegistry;

/// Decides which [`Package`] variant a name denotes.
///
/// The factory performs no caching; the registry memoizes what it builds.
pub struct PackageFactory<'a> {
    registry: &'a PluginRegistry,
}

impl<'a> PackageFactory<'a> {
    pub fn new(registry: &'a PluginRegistry) -> Self {
        Self { registry }
    }

    /// Whether `name` denotes a host-provided library.
    pub fn is_library(&self, name: &str) -> bool {
        let lower = name.to_lowercase();
        let runtime = self.registry.services().host.runtime_name().to_lowercase();
        lower.starts_with("ext-") || lower.starts_with("lib-") || lower == runtime
    }

    /// Build the package for `package_name`.
    ///
    /// Library markers (`ext-`, `lib-`, the bare runtime name) yield a
    /// [`LibraryPackage`]. A registered plugin, or a plugin directory found by
    /// scanning, yields a [`PluginPackage`]. Anything else is
    /// [`PackageError::PackageNotResolvable`].
    #[tracing::instrument(skip(self))]
    pub fn create(&self, package_name: &str) -> Result<Package, PackageError> {
        let services = self.registry.services();

        if self.is_library(package_name) {
            debug!("{} is a library package", package_name);
            return Ok(Package::Library(LibraryPackage::new(
                package_name,
                services.host.clone(),
            )));
        }

        // Exact registration key first, then the normalized spelling
        let name = plugin_name(package_name);
        let registration = services
            .registrations
            .get(package_name)
            .or_else(|| services.registrations.get(&name));
        if let Some(registration) = registration {
            let name = registration.name.clone();
            let package_name =
                registered_package_name(package_name, registration.package.as_deref(), &name);
            debug!("{} is registered plugin {}", package_name, name);
            return Ok(Package::Plugin(PluginPackage::registered(
                package_name,
                registration,
                services.clone(),
            )));
        }

        let discovered = self.registry.scan(false)?;
        if let Some(path) = discovered.get(&name) {
            debug!("{} found on disk at {:?}", package_name, path);
            return Ok(Package::Plugin(PluginPackage::discovered(
                package_name,
                path.clone(),
                services.clone(),
            )));
        }

        Err(PackageError::PackageNotResolvable(package_name.to_string()))
    }
}

/// Prefer the full `author/package` name so installed-index lookups can
/// match, as long as it still normalizes to the registered name.
fn registered_package_name(requested: &str, declared: Option<&str>, name: &str) -> String {
    if requested.contains('/') {
        return requested.to_string();
    }
    match declared {
        Some(declared) if plugin_name(declared) == name => declared.to_string(),
        _ => requested.to_string(),
    }
}
