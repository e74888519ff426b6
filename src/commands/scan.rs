use anyhow::Result;
use log::debug;
use std::io::Write;

use crate::plugin::PluginRegistry;

/// Print every plugin directory found under the plugin roots
#[tracing::instrument(skip(registry, out))]
pub fn scan(registry: &PluginRegistry, ignore_themes: bool, out: &mut dyn Write) -> Result<()> {
    let found = registry.scan(ignore_themes)?;
    if found.is_empty() {
        writeln!(out, "No plugin directories found.")?;
        return Ok(());
    }

    debug!("Found {} plugin director(ies)", found.len());
    for (name, path) in found.iter() {
        writeln!(out, "{}\t{}", name, path.display())?;
    }
    Ok(())
}
