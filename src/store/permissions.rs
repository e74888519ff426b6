use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use std::sync::Arc;

use super::{PermissionGrant, PermissionStore};
use crate::cache::MemoCache;
use crate::error::PackageError;
use crate::runtime::Runtime;

/// One node of the access control tree: plugin, controller or action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Aco {
    pub id: u64,
    #[serde(default)]
    pub parent_id: Option<u64>,
    pub alias: String,
    #[serde(default)]
    pub plugin: Option<String>,
}

/// A role's grant on one ACL node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Permission {
    pub aco_id: u64,
    pub role: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AclTree {
    #[serde(default)]
    pub acos: Vec<Aco>,
    #[serde(default)]
    pub permissions: Vec<Permission>,
}

impl AclTree {
    fn index(&self) -> HashMap<u64, &Aco> {
        self.acos.iter().map(|aco| (aco.id, aco)).collect()
    }

    /// Every grant whose node belongs to `plugin`, in file order.
    pub fn grants_for(&self, plugin: &str) -> Vec<PermissionGrant> {
        let index = self.index();
        self.permissions
            .iter()
            .filter(|permission| match index.get(&permission.aco_id) {
                Some(aco) => aco.plugin.as_deref() == Some(plugin),
                None => {
                    warn!(
                        "Permission for role {} points at unknown node {}",
                        permission.role, permission.aco_id
                    );
                    false
                }
            })
            .map(|permission| PermissionGrant {
                role: permission.role.clone(),
                aco_id: permission.aco_id,
            })
            .collect()
    }

    /// Walk from `aco_id` up to the root and return the aliases root-first.
    pub fn path_for(&self, aco_id: u64) -> Result<Vec<String>, PackageError> {
        let index = self.index();
        let mut aliases = Vec::new();
        let mut seen = HashSet::new();
        let mut current = Some(aco_id);

        while let Some(id) = current {
            if !seen.insert(id) {
                return Err(PackageError::StoreUnavailable(format!(
                    "cycle in ACL tree at node {}",
                    id
                )));
            }
            let aco = index.get(&id).ok_or_else(|| {
                PackageError::StoreUnavailable(format!("ACL node {} does not exist", id))
            })?;
            aliases.push(aco.alias.clone());
            current = aco.parent_id;
        }

        aliases.reverse();
        Ok(aliases)
    }
}

/// ACL tree stored as JSON: `{"acos": [...], "permissions": [...]}`.
///
/// The file is parsed at most once per store; a failed load is retried on
/// the next call.
pub struct JsonPermissionStore {
    runtime: Arc<dyn Runtime>,
    path: Option<PathBuf>,
    tree: MemoCache<Arc<AclTree>>,
}

impl JsonPermissionStore {
    pub fn new(runtime: Arc<dyn Runtime>, path: Option<PathBuf>) -> Self {
        Self {
            runtime,
            path,
            tree: MemoCache::new(),
        }
    }

    fn tree(&self) -> Result<Arc<AclTree>, PackageError> {
        self.tree
            .get_or_try_insert_with("acl", || self.load().map(Arc::new))
    }

    fn load(&self) -> Result<AclTree, PackageError> {
        let Some(path) = &self.path else {
            return Ok(AclTree::default());
        };
        if !self.runtime.exists(path) {
            debug!("No permission file at {:?}", path);
            return Ok(AclTree::default());
        }

        let content = self
            .runtime
            .read_to_string(path)
            .map_err(PackageError::store_unavailable)?;
        serde_json::from_str(&content)
            .map_err(|e| PackageError::StoreUnavailable(format!("{:?}: {}", path, e)))
    }
}

impl PermissionStore for JsonPermissionStore {
    #[tracing::instrument(skip(self))]
    fn grants_for(&self, plugin: &str) -> Result<Vec<PermissionGrant>, PackageError> {
        Ok(self.tree()?.grants_for(plugin))
    }

    #[tracing::instrument(skip(self))]
    fn aco_path(&self, aco_id: u64) -> Result<Vec<String>, PackageError> {
        self.tree()?.path_for(aco_id)
    }
}
