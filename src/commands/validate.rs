use anyhow::Result;
use std::io::Write;
use std::path::Path;

use crate::plugin::PluginRegistry;

/// Validate a plugin manifest file, failing when any problem is found
#[tracing::instrument(skip(registry, out))]
pub fn validate(registry: &PluginRegistry, path: &Path, out: &mut dyn Write) -> Result<()> {
    let issues = registry.validate_json(path);
    if issues.is_empty() {
        writeln!(out, "{}: valid", path.display())?;
        return Ok(());
    }

    for issue in &issues {
        writeln!(out, "{}: {}", path.display(), issue)?;
    }
    anyhow::bail!("{} has {} problem(s)", path.display(), issues.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::fixture::{output, registry};
    use std::fs;

    #[test]
    fn test_validate_valid_manifest() {
        let (dir, registry) = registry();
        let path = dir.path().join("plugins/Blog/composer.json");
        let mut out = Vec::new();
        validate(&registry, &path, &mut out).unwrap();
        assert!(output(out).ends_with(": valid\n"));
    }

    #[test]
    fn test_validate_theme_without_regions() {
        let (dir, registry) = registry();
        let path = dir.path().join("plugins/DarkGreenTheme/composer.json");
        let mut out = Vec::new();
        let err = validate(&registry, &path, &mut out).unwrap_err();

        assert!(err.to_string().contains("1 problem(s)"));
        assert!(output(out).contains("Missing field: \"extra.regions\""));
    }

    #[test]
    fn test_validate_reports_every_problem() {
        let (dir, registry) = registry();
        let path = dir.path().join("bad.json");
        fs::write(&path, r#"{"type": "library"}"#).unwrap();

        let mut out = Vec::new();
        assert!(validate(&registry, &path, &mut out).is_err());
        let out = output(out);
        assert!(out.contains("Invalid field: \"type\" (library)"));
        assert!(out.contains("Missing field: \"name\""));
    }

    #[test]
    fn test_validate_corrupt_file() {
        let (dir, registry) = registry();
        let path = dir.path().join("corrupt.json");
        fs::write(&path, "{not json").unwrap();

        let mut out = Vec::new();
        assert!(validate(&registry, &path, &mut out).is_err());
        assert!(output(out).contains("Corrupt JSON information."));
    }
}
