//! Package name normalization.
//!
//! Plugins are identified on disk and in the registration snapshot by a
//! camelized name (`BlueSkyTheme`), while manifests use the
//! `author/package` form (`acme/blue-sky-theme`). These helpers convert
//! between the two.

/// Directory-name suffix that marks a plugin as a theme.
pub const THEME_SUFFIX: &str = "Theme";

/// The last `/`-separated segment of a package name, or the whole name.
///
/// `acme/blog` -> `blog`, `ext-intl` -> `ext-intl`.
pub fn bare_name(package_name: &str) -> &str {
    match package_name.rfind('/') {
        Some(pos) => &package_name[pos + 1..],
        None => package_name,
    }
}

/// Convert a dashed or underscored identifier to CamelCase.
///
/// Only the first letter of each word is touched, so an already camelized
/// name is returned unchanged: `blue-sky_theme` -> `BlueSkyTheme`,
/// `BlueSky` -> `BlueSky`.
pub fn camelize(name: &str) -> String {
    name.split(|c: char| c == '-' || c == '_' || c.is_whitespace())
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect()
}

/// Split a package name into camelized `(author, package)` parts.
///
/// A bare name has an empty author: `blog` -> `("", "Blog")`.
pub fn split_package(name: &str) -> (String, String) {
    match name.split_once('/') {
        Some((author, package)) => (camelize(author), camelize(package)),
        None => (String::new(), camelize(name)),
    }
}

/// Normalized plugin name for any accepted spelling of it.
///
/// `acme/blog`, `blog` and `Blog` all yield `Blog`.
pub fn plugin_name(name: &str) -> String {
    camelize(bare_name(name))
}

/// Whether a discovered directory name denotes a theme.
pub fn is_theme_dir(name: &str) -> bool {
    name.ends_with(THEME_SUFFIX)
}

/// Whether a manifest package name denotes a theme (case-insensitive).
pub fn is_theme_package(name: &str) -> bool {
    name.to_lowercase().ends_with("theme")
}
