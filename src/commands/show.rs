use anyhow::Result;
use log::debug;
use std::io::Write;

use crate::plugin::PluginRegistry;

/// Show a plugin's info mapping, or the single value at `key`
#[tracing::instrument(skip(registry, out))]
pub fn show(
    registry: &PluginRegistry,
    plugin: &str,
    key: Option<&str>,
    out: &mut dyn Write,
) -> Result<()> {
    let package = registry.get(plugin)?;
    debug!("Showing {:?}", package);

    let Some(info) = package.info(key) else {
        anyhow::bail!("Plugin {} has no \"{}\"", package.name(), key.unwrap_or_default());
    };

    writeln!(out, "{}", serde_json::to_string_pretty(&info)?)?;
    Ok(())
}
