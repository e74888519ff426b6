//! Collaborators shared by every package object created for one installation.

use std::sync::Arc;

use crate::host::HostEnvironment;
use crate::runtime::Runtime;
use crate::store::{
    InstalledPackagesIndex, ManifestReader, PermissionStore, RegistrationSource, SettingsStore,
};

pub struct Services {
    pub runtime: Arc<dyn Runtime>,
    pub host: Arc<dyn HostEnvironment>,
    pub registrations: Arc<dyn RegistrationSource>,
    pub settings: Arc<dyn SettingsStore>,
    pub permissions: Arc<dyn PermissionStore>,
    pub installed: Arc<dyn InstalledPackagesIndex>,
}

impl Services {
    pub fn manifests(&self) -> ManifestReader<'_> {
        ManifestReader::new(self.runtime.as_ref())
    }

    /// Whether the CMS has a non-empty registration for `name`, enabled or not.
    pub fn is_registered(&self, name: &str) -> bool {
        self.registrations.get(name).is_some()
    }
}
