use anyhow::Result;
use std::io::Write;

use crate::plugin::PluginRegistry;

/// Print the resolved version of a library or plugin package
#[tracing::instrument(skip(registry, out))]
pub fn version(registry: &PluginRegistry, package_name: &str, out: &mut dyn Write) -> Result<()> {
    let package = registry.factory().create(package_name)?;
    let version = package.version();
    let version = if version.is_empty() { "(unknown)" } else { &version };
    writeln!(out, "{} {}", package.package_name(), version)?;
    Ok(())
}
