use anyhow::Result;
use std::io::Write;

use crate::plugin::PluginRegistry;

/// List all registered plugins with their version and state
#[tracing::instrument(skip(registry, out))]
pub fn list(registry: &PluginRegistry, out: &mut dyn Write) -> Result<()> {
    let plugins = registry.all()?;
    if plugins.is_empty() {
        writeln!(out, "No plugins registered.")?;
        return Ok(());
    }

    for plugin in plugins.iter() {
        let version = plugin.version();
        let version = if version.is_empty() { "(unknown)" } else { &version };
        let state = if plugin.status() { "enabled" } else { "disabled" };
        writeln!(out, "{} {} {}", plugin.name(), version, state)?;
    }
    Ok(())
}
