//! Package abstraction
//!
//! A package is an installable unit tracked by the CMS: either a plugin
//! (themes included) or a library provided by the host runtime. Both expose
//! a name and a lazily resolved, cached version.

mod factory;
mod library;
mod plugin;

pub use factory::PackageFactory;
pub use library::{LibraryPackage, SENTINEL_VERSION};
pub use plugin::{DEFAULT_VERSION, PermissionTree, PluginPackage};

use crate::naming::bare_name;

pub enum Package {
    Library(LibraryPackage),
    Plugin(PluginPackage),
}

impl Package {
    /// Name as given to the factory.
    pub fn package_name(&self) -> &str {
        match self {
            Package::Library(lib) => lib.package_name(),
            Package::Plugin(plugin) => plugin.package_name(),
        }
    }

    /// Short name: the last segment of `author/package`, normalized for plugins.
    pub fn name(&self) -> String {
        match self {
            Package::Library(lib) => bare_name(lib.package_name()).to_string(),
            Package::Plugin(plugin) => plugin.name().to_string(),
        }
    }

    /// Resolved version; an empty string means unresolved.
    pub fn version(&self) -> String {
        match self {
            Package::Library(lib) => lib.version(),
            Package::Plugin(plugin) => plugin.version(),
        }
    }

    pub fn as_plugin(&self) -> Option<&PluginPackage> {
        match self {
            Package::Plugin(plugin) => Some(plugin),
            Package::Library(_) => None,
        }
    }

    pub fn into_plugin(self) -> Option<PluginPackage> {
        match self {
            Package::Plugin(plugin) => Some(plugin),
            Package::Library(_) => None,
        }
    }
}

impl std::fmt::Debug for Package {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Package::Library(lib) => f.debug_tuple("Library").field(&lib.package_name()).finish(),
            Package::Plugin(plugin) => f.debug_tuple("Plugin").field(plugin).finish(),
        }
    }
}
