use anyhow::Result;
use std::io::Write;

use crate::plugin::PluginRegistry;

/// List the enabled plugins that depend on `plugin`
#[tracing::instrument(skip(registry, out))]
pub fn dependents(registry: &PluginRegistry, plugin: &str, out: &mut dyn Write) -> Result<()> {
    let dependents = registry.check_reverse_dependency(plugin)?;
    if dependents.is_empty() {
        writeln!(out, "No enabled plugin depends on {}.", plugin)?;
        return Ok(());
    }

    for name in dependents {
        writeln!(out, "{}", name)?;
    }
    Ok(())
}
