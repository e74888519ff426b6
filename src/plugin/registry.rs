//! Plugin registry: discovery, lookup and relationship queries.

use log::{debug, warn};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::manifest::{ManifestSource, validate_json};
use crate::cache::MemoCache;
use crate::error::{ManifestIssue, PackageError};
use crate::naming::{is_theme_dir, plugin_name, split_package};
use crate::package::{PackageFactory, PluginPackage};
use crate::runtime::normalize_path;
use crate::runtime::path::file_name_str;
use crate::services::Services;

/// Plugin directory name -> absolute path, in discovery order.
///
/// Roots are visited in configuration order and each root's directories in
/// sorted order. A name seen again under a later root keeps its first
/// position and takes the later path.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScanResult {
    dirs: Vec<(String, PathBuf)>,
}

impl ScanResult {
    pub fn new() -> Self {
        Self::default()
    }

    fn insert(&mut self, name: String, path: PathBuf) {
        match self.dirs.iter_mut().find(|(known, _)| *known == name) {
            Some(entry) => entry.1 = path,
            None => self.dirs.push((name, path)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&PathBuf> {
        self.dirs
            .iter()
            .find(|(known, _)| known == name)
            .map(|(_, path)| path)
    }

    pub fn contains_key(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.dirs.iter().map(|(name, _)| name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Path)> {
        self.dirs
            .iter()
            .map(|(name, path)| (name.as_str(), path.as_path()))
    }

    pub fn len(&self) -> usize {
        self.dirs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dirs.is_empty()
    }
}

/// Entry point for locating and querying plugins of one installation.
///
/// Answers are memoized per call signature for the lifetime of the
/// registry, or until [`PluginRegistry::clear_cache`].
pub struct PluginRegistry {
    services: Arc<Services>,
    plugin_paths: Vec<PathBuf>,
    scans: MemoCache<Arc<ScanResult>>,
    plugins: MemoCache<Arc<PluginPackage>>,
    collections: MemoCache<Arc<Vec<Arc<PluginPackage>>>>,
}

impl PluginRegistry {
    pub fn new(services: Arc<Services>, plugin_paths: Vec<PathBuf>) -> Self {
        Self {
            services,
            plugin_paths,
            scans: MemoCache::new(),
            plugins: MemoCache::new(),
            collections: MemoCache::new(),
        }
    }

    pub fn services(&self) -> &Arc<Services> {
        &self.services
    }

    pub fn plugin_paths(&self) -> &[PathBuf] {
        &self.plugin_paths
    }

    pub fn factory(&self) -> PackageFactory<'_> {
        PackageFactory::new(self)
    }

    /// Forget every memoized scan and lookup.
    pub fn clear_cache(&self) {
        self.scans.clear();
        self.plugins.clear();
        self.collections.clear();
    }

    /// Plugin directories under the configured plugin roots.
    ///
    /// See [`ScanResult`] for ordering. With `ignore_themes`, directories
    /// ending in `Theme` are left out.
    #[tracing::instrument(skip(self))]
    pub fn scan(&self, ignore_themes: bool) -> Result<Arc<ScanResult>, PackageError> {
        let key = format!("scan({})", ignore_themes);
        self.scans
            .get_or_try_insert_with(&key, || self.scan_dirs(ignore_themes).map(Arc::new))
    }

    fn scan_dirs(&self, ignore_themes: bool) -> Result<ScanResult, PackageError> {
        let runtime = &self.services.runtime;
        let mut found = ScanResult::new();

        for root in &self.plugin_paths {
            if !runtime.exists(root) {
                debug!("Plugin root {:?} does not exist", root);
                continue;
            }

            let mut dirs: Vec<PathBuf> = runtime
                .read_dir(root)?
                .into_iter()
                .filter(|entry| runtime.is_dir(entry))
                .collect();
            dirs.sort();

            for dir in dirs {
                let Some(name) = file_name_str(&dir) else {
                    continue;
                };
                if ignore_themes && is_theme_dir(name) {
                    continue;
                }
                found.insert(name.to_string(), normalize_path(&dir));
            }
        }

        debug!("Discovered {} plugin director(ies)", found.len());
        Ok(found)
    }

    /// Whether the CMS has registered `name`, enabled or not.
    pub fn exists(&self, name: &str) -> bool {
        self.services.is_registered(name) || self.services.is_registered(&plugin_name(name))
    }

    /// A registered plugin by name.
    #[tracing::instrument(skip(self))]
    pub fn get(&self, name: &str) -> Result<Arc<PluginPackage>, PackageError> {
        let key = format!("get({})", name);
        self.plugins.get_or_try_insert_with(&key, || {
            if !self.exists(name) {
                return Err(PackageError::PluginNotFound(name.to_string()));
            }

            match self.factory().create(name) {
                Ok(package) => package
                    .into_plugin()
                    .filter(PluginPackage::is_registered)
                    .map(Arc::new)
                    .ok_or_else(|| PackageError::PluginNotFound(name.to_string())),
                Err(PackageError::PackageNotResolvable(_)) => {
                    Err(PackageError::PluginNotFound(name.to_string()))
                }
                Err(e) => Err(e),
            }
        })
    }

    /// Every registered plugin in discovery order; libraries are excluded.
    #[tracing::instrument(skip(self))]
    pub fn all(&self) -> Result<Arc<Vec<Arc<PluginPackage>>>, PackageError> {
        self.collections.get_or_try_insert_with("get()", || {
            let mut plugins = Vec::new();
            for registration in self.services.registrations.all() {
                match self.get(&registration.name) {
                    Ok(plugin) => plugins.push(plugin),
                    Err(PackageError::PluginNotFound(name)) => {
                        debug!("Registration {} is not a plugin package", name)
                    }
                    Err(e) => return Err(e),
                }
            }
            Ok(Arc::new(plugins))
        })
    }

    /// Every problem with a manifest, empty when it is valid.
    pub fn validate_json<'a>(&self, source: impl Into<ManifestSource<'a>>) -> Vec<ManifestIssue> {
        validate_json(self.services.runtime.as_ref(), source.into())
    }

    pub fn is_valid_json<'a>(&self, source: impl Into<ManifestSource<'a>>) -> bool {
        self.validate_json(source).is_empty()
    }

    /// Human names of enabled plugins that declare a dependency on `plugin`.
    ///
    /// An empty result means `plugin` can be disabled or removed without
    /// breaking an active dependent. The target must be registered; it is
    /// matched case-insensitively.
    #[tracing::instrument(skip(self))]
    pub fn check_reverse_dependency(&self, plugin: &str) -> Result<Vec<String>, PackageError> {
        let (_, target) = split_package(plugin);
        let target = target.to_lowercase();

        let known = self.exists(plugin)
            || self
                .services
                .registrations
                .all()
                .iter()
                .any(|registration| registration.name.to_lowercase() == target);
        if !known {
            return Err(PackageError::PluginNotFound(plugin.to_string()));
        }

        let mut dependents = Vec::new();

        for candidate in self.all()?.iter() {
            if !candidate.status() || candidate.name().to_lowercase() == target {
                continue;
            }

            let depends = candidate
                .dependencies()
                .iter()
                .any(|(dependency, _)| split_package(dependency).1.to_lowercase() == target);
            if depends {
                dependents.push(candidate.human_name().to_string());
            }
        }

        if !dependents.is_empty() {
            warn!("{} is required by: {}", plugin, dependents.join(", "));
        }
        Ok(dependents)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{MockServices, registration};
    use mockall::predicate::eq;
    use serde_json::json;
    use std::path::Path;

    fn with_plugin_root(mocks: &mut MockServices, root: &str, dirs: &'static [&'static str]) {
        let root = PathBuf::from(root);
        mocks
            .runtime
            .expect_exists()
            .with(eq(root.clone()))
            .returning(|_| true);
        mocks
            .runtime
            .expect_read_dir()
            .with(eq(root))
            .returning(move |p| {
                // Unsorted on purpose, plus a stray file
                let mut entries: Vec<PathBuf> = dirs.iter().rev().map(|d| p.join(d)).collect();
                entries.push(p.join("README.md"));
                Ok(entries)
            });
    }

    fn dirs_are_dirs(mocks: &mut MockServices) {
        mocks
            .runtime
            .expect_is_dir()
            .returning(|p| !p.ends_with("README.md"));
    }

    #[test]
    fn test_scan_lists_sorted_subdirectories() {
        let mut mocks = MockServices::new();
        with_plugin_root(&mut mocks, "/srv/plugins", &["Blog", "DarkGreenTheme", "Comments"]);
        dirs_are_dirs(&mut mocks);
        let registry = mocks.registry(vec![PathBuf::from("/srv/plugins")]);

        let all = registry.scan(false).unwrap();
        let names: Vec<&str> = all.keys().collect();
        assert_eq!(names, vec!["Blog", "Comments", "DarkGreenTheme"]);
        assert_eq!(all.get("Blog"), Some(&PathBuf::from("/srv/plugins/Blog")));
    }

    #[test]
    fn test_scan_ignore_themes_is_subset() {
        let mut mocks = MockServices::new();
        with_plugin_root(&mut mocks, "/srv/plugins", &["Blog", "DarkGreenTheme"]);
        dirs_are_dirs(&mut mocks);
        let registry = mocks.registry(vec![PathBuf::from("/srv/plugins")]);

        let without_themes = registry.scan(true).unwrap();
        let with_themes = registry.scan(false).unwrap();

        assert!(!without_themes.contains_key("DarkGreenTheme"));
        assert!(with_themes.contains_key("DarkGreenTheme"));
        assert!(without_themes.keys().all(|k| with_themes.contains_key(k)));
    }

    #[test]
    fn test_scan_is_memoized_per_flag() {
        let mut mocks = MockServices::new();
        let root = PathBuf::from("/srv/plugins");
        mocks
            .runtime
            .expect_exists()
            .with(eq(root.clone()))
            .times(2)
            .returning(|_| true);
        mocks
            .runtime
            .expect_read_dir()
            .with(eq(root.clone()))
            .times(2)
            .returning(|p| Ok(vec![p.join("Blog")]));
        mocks.runtime.expect_is_dir().returning(|_| true);
        let registry = mocks.registry(vec![root]);

        for _ in 0..3 {
            registry.scan(true).unwrap();
            registry.scan(false).unwrap();
        }
    }

    #[test_log::test]
    fn test_scan_skips_missing_roots_and_later_root_wins() {
        let mut mocks = MockServices::new();
        mocks
            .runtime
            .expect_exists()
            .with(eq(PathBuf::from("/missing")))
            .returning(|_| false);
        with_plugin_root(&mut mocks, "/srv/plugins", &["Blog"]);
        with_plugin_root(&mut mocks, "/srv/vendor-plugins", &["Blog"]);
        dirs_are_dirs(&mut mocks);
        let registry = mocks.registry(vec![
            PathBuf::from("/missing"),
            PathBuf::from("/srv/plugins"),
            PathBuf::from("/srv/vendor-plugins"),
        ]);

        let found = registry.scan(false).unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(
            found.get("Blog"),
            Some(&PathBuf::from("/srv/vendor-plugins/Blog"))
        );
    }

    #[test]
    fn test_scan_keeps_root_order() {
        let mut mocks = MockServices::new();
        with_plugin_root(&mut mocks, "/a", &["Zeta"]);
        with_plugin_root(&mut mocks, "/b", &["Alpha", "Zeta"]);
        dirs_are_dirs(&mut mocks);
        let registry = mocks.registry(vec![PathBuf::from("/a"), PathBuf::from("/b")]);

        let found = registry.scan(false).unwrap();
        let names: Vec<&str> = found.keys().collect();
        assert_eq!(names, vec!["Zeta", "Alpha"]);
        assert_eq!(found.get("Zeta"), Some(&PathBuf::from("/b/Zeta")));
    }

    #[test]
    fn test_exists_and_get() {
        let mut mocks = MockServices::new();
        mocks.host.expect_runtime_name().returning(|| "php".into());
        mocks.register(registration("Blog", "/srv/plugins/Blog"));
        mocks.register(registration("Comments", "/srv/plugins/Comments"));
        let registry = mocks.registry(vec![]);

        for name in ["Blog", "Comments"] {
            assert!(registry.exists(name));
            assert_eq!(registry.get(name).unwrap().name(), name);
        }
        assert!(registry.exists("acme/blog"));

        assert!(!registry.exists("Shop"));
        assert!(matches!(
            registry.get("Shop"),
            Err(PackageError::PluginNotFound(name)) if name == "Shop"
        ));
    }

    #[test]
    fn test_get_plugin_registered_under_raw_key() {
        let mut mocks = MockServices::new();
        mocks.host.expect_runtime_name().returning(|| "php".into());
        mocks.register(registration("blog-extras", "/srv/plugins/blog-extras"));
        let registry = mocks.registry(vec![]);

        assert!(registry.exists("blog-extras"));
        assert_eq!(registry.get("blog-extras").unwrap().name(), "blog-extras");

        let names: Vec<String> = registry
            .all()
            .unwrap()
            .iter()
            .map(|p| p.name().to_string())
            .collect();
        assert_eq!(names, vec!["blog-extras"]);
    }

    #[test]
    fn test_get_is_memoized() {
        let mut mocks = MockServices::new();
        mocks.host.expect_runtime_name().returning(|| "php".into());
        mocks.register(registration("Blog", "/srv/plugins/Blog"));
        let registry = mocks.registry(vec![]);

        let first = registry.get("Blog").unwrap();
        let second = registry.get("Blog").unwrap();
        assert!(Arc::ptr_eq(&first, &second));

        // A different call signature is a different cache entry
        let other = registry.get("acme/blog").unwrap();
        assert!(!Arc::ptr_eq(&first, &other));

        registry.clear_cache();
        let fresh = registry.get("Blog").unwrap();
        assert!(!Arc::ptr_eq(&first, &fresh));
    }

    #[test]
    fn test_all_in_discovery_order() {
        let mut mocks = MockServices::new();
        mocks.host.expect_runtime_name().returning(|| "php".into());
        mocks.register(registration("Shop", "/srv/plugins/Shop"));
        mocks.register(registration("Blog", "/srv/plugins/Blog"));
        mocks.register(registration("ext-intl", "/dev/null"));
        let registry = mocks.registry(vec![]);

        let names: Vec<String> = registry
            .all()
            .unwrap()
            .iter()
            .map(|p| p.name().to_string())
            .collect();
        assert_eq!(names, vec!["Shop", "Blog"]);

        // Collection members are the memoized single lookups
        let all = registry.all().unwrap();
        assert!(Arc::ptr_eq(&all[1], &registry.get("Blog").unwrap()));
    }

    fn dependency_fixture() -> PluginRegistry {
        let mut mocks = MockServices::new();
        mocks.host.expect_runtime_name().returning(|| "php".into());

        let mut comments = registration("Comments", "/srv/plugins/Comments");
        comments.status = true;
        let mut shop = registration("Shop", "/srv/plugins/Shop");
        shop.status = true;
        let mut legacy = registration("Legacy", "/srv/plugins/Legacy");
        legacy.status = false;
        let mut blog = registration("Blog", "/srv/plugins/Blog");
        blog.status = true;

        mocks.register(blog);
        mocks.register(comments);
        mocks.register(shop);
        mocks.register(legacy);

        mocks.manifest(
            "/srv/plugins/Comments",
            r#"{"name": "acme/comments", "require": {"acme/blog": "^1.0", "php": ">=8.1"}}"#,
        );
        mocks.manifest(
            "/srv/plugins/Shop",
            r#"{"name": "acme/shop", "require": {"acme/payments": "*"}}"#,
        );
        mocks.manifest(
            "/srv/plugins/Legacy",
            r#"{"name": "acme/legacy", "require": {"acme/blog": "*"}}"#,
        );
        mocks.manifest(
            "/srv/plugins/Blog",
            r#"{"name": "acme/blog", "require": {"acme/blog": "*"}}"#,
        );

        mocks.registry(vec![])
    }

    #[test_log::test]
    fn test_check_reverse_dependency() {
        let registry = dependency_fixture();
        assert_eq!(registry.check_reverse_dependency("blog").unwrap(), vec!["Comments"]);
    }

    #[test]
    fn test_check_reverse_dependency_case_insensitive() {
        let registry = dependency_fixture();
        assert_eq!(registry.check_reverse_dependency("BLOG").unwrap(), vec!["Comments"]);
        assert_eq!(
            registry.check_reverse_dependency("acme/blog").unwrap(),
            vec!["Comments"]
        );
    }

    #[test]
    fn test_check_reverse_dependency_none() {
        let registry = dependency_fixture();
        assert!(registry.check_reverse_dependency("shop").unwrap().is_empty());
    }

    #[test]
    fn test_check_reverse_dependency_unknown_target() {
        let registry = dependency_fixture();
        assert!(matches!(
            registry.check_reverse_dependency("unknown"),
            Err(PackageError::PluginNotFound(name)) if name == "unknown"
        ));
        assert!(matches!(
            registry.check_reverse_dependency("acme/blgo"),
            Err(PackageError::PluginNotFound(_))
        ));
    }

    #[test]
    fn test_check_reverse_dependency_uses_human_name() {
        let mut mocks = MockServices::new();
        mocks.host.expect_runtime_name().returning(|| "php".into());
        let mut comments = registration("Comments", "/srv/plugins/Comments");
        comments.status = true;
        comments.human_name = Some("Threaded Comments".into());
        mocks.register(comments);
        mocks.register(registration("Blog", "/srv/plugins/Blog"));
        mocks.manifest(
            "/srv/plugins/Comments",
            r#"{"name": "acme/comments", "require": {"acme/blog": "^1.0"}}"#,
        );
        let registry = mocks.registry(vec![]);

        assert_eq!(
            registry.check_reverse_dependency("Blog").unwrap(),
            vec!["Threaded Comments"]
        );
    }

    #[test]
    fn test_validate_json_through_registry() {
        let registry = MockServices::new().registry(vec![]);

        let theme = json!({"type": "quickapps-plugin", "name": "acme/my-theme"});
        let issues = registry.validate_json(&theme);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].to_string(), "Missing field: \"extra.regions\"");
        assert!(!registry.is_valid_json(&theme));

        let plugin = json!({"type": "quickapps-plugin", "name": "acme/my-plugin"});
        assert!(registry.validate_json(&plugin).is_empty());
        assert!(registry.is_valid_json(&plugin));
    }

    #[test]
    fn test_validate_json_path_through_registry() {
        let mut mocks = MockServices::new();
        mocks.runtime.expect_exists().returning(|_| false);
        let registry = mocks.registry(vec![]);

        assert!(!registry.is_valid_json(Path::new("/nope/composer.json")));
    }
}
