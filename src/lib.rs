pub mod cache;
pub mod commands;
pub mod error;
pub mod host;
pub mod naming;
pub mod package;
pub mod plugin;
pub mod runtime;
pub mod services;
pub mod store;
pub mod value;

/// Mock collaborators for package and registry tests.
#[cfg(test)]
pub mod test_utils {
    use mockall::predicate::eq;
    use std::path::{Path, PathBuf};
    use std::sync::Arc;

    use crate::host::MockHostEnvironment;
    use crate::plugin::PluginRegistry;
    use crate::runtime::MockRuntime;
    use crate::services::Services;
    use crate::store::{
        MANIFEST_FILE, MockInstalledPackagesIndex, MockPermissionStore, MockRegistrationSource,
        MockSettingsStore, Registration,
    };

    /// A disabled, non-theme registration rooted at `path`.
    pub fn registration(name: &str, path: &str) -> Registration {
        Registration {
            name: name.to_string(),
            path: PathBuf::from(path),
            ..Default::default()
        }
    }

    /// One mock per collaborator. Registrations are plain data; every
    /// other field is set up with expectations before [`MockServices::build`].
    pub struct MockServices {
        pub runtime: MockRuntime,
        pub host: MockHostEnvironment,
        pub registrations: Vec<Registration>,
        pub settings: MockSettingsStore,
        pub permissions: MockPermissionStore,
        pub installed: MockInstalledPackagesIndex,
    }

    impl MockServices {
        pub fn new() -> Self {
            Self {
                runtime: MockRuntime::new(),
                host: MockHostEnvironment::new(),
                registrations: Vec::new(),
                settings: MockSettingsStore::new(),
                permissions: MockPermissionStore::new(),
                installed: MockInstalledPackagesIndex::new(),
            }
        }

        pub fn register(&mut self, registration: Registration) {
            self.registrations.push(registration);
        }

        /// `composer.json` with `content` at a plugin root.
        pub fn manifest(&mut self, root: &str, content: &str) {
            let path = Path::new(root).join(MANIFEST_FILE);
            let content = content.to_string();
            self.runtime
                .expect_exists()
                .with(eq(path.clone()))
                .returning(|_| true);
            self.runtime
                .expect_read_to_string()
                .with(eq(path))
                .returning(move |_| Ok(content.clone()));
        }

        /// A plugin root without `composer.json`.
        pub fn no_manifest(&mut self, root: &str) {
            self.runtime
                .expect_exists()
                .with(eq(Path::new(root).join(MANIFEST_FILE)))
                .returning(|_| false);
        }

        /// Regular files directly under `root`.
        pub fn files(&mut self, root: &str, files: &[(&str, &str)]) {
            let root = PathBuf::from(root);
            let paths: Vec<PathBuf> = files.iter().map(|(name, _)| root.join(name)).collect();

            let listing = paths.clone();
            self.runtime
                .expect_read_dir()
                .with(eq(root))
                .returning(move |_| Ok(listing.clone()));

            for (path, (_, content)) in paths.into_iter().zip(files) {
                let content = content.to_string();
                self.runtime
                    .expect_is_dir()
                    .with(eq(path.clone()))
                    .returning(|_| false);
                self.runtime
                    .expect_read_to_string()
                    .with(eq(path))
                    .returning(move |_| Ok(content.clone()));
            }
        }

        pub fn build(self) -> Arc<Services> {
            let mut registrations = MockRegistrationSource::new();
            let by_name = self.registrations.clone();
            registrations
                .expect_get()
                .returning(move |name| by_name.iter().find(|r| r.name == name).cloned());
            let all = self.registrations;
            registrations.expect_all().returning(move || all.clone());

            Arc::new(Services {
                runtime: Arc::new(self.runtime),
                host: Arc::new(self.host),
                registrations: Arc::new(registrations),
                settings: Arc::new(self.settings),
                permissions: Arc::new(self.permissions),
                installed: Arc::new(self.installed),
            })
        }

        pub fn registry(self, plugin_paths: Vec<PathBuf>) -> PluginRegistry {
            PluginRegistry::new(self.build(), plugin_paths)
        }
    }

    impl Default for MockServices {
        fn default() -> Self {
            Self::new()
        }
    }
}
