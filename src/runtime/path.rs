//! Path utility functions for normalization and resolution.

use std::path::{Component, Path, PathBuf};

/// Normalize a path by processing `.` and `..` components lexically.
/// This does not access the filesystem and does not follow symlinks.
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut result = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {
                // Skip `.` components
            }
            Component::ParentDir => {
                // Pop the last component if possible
                if !result.pop() {
                    result.push(component);
                }
            }
            _ => {
                result.push(component);
            }
        }
    }
    result
}

/// Resolve a possibly relative path against a base directory.
///
/// Configuration and snapshot files store paths relative to their own
/// location. For example, if base_dir is `/srv/cms/config` and relative_path
/// is `../plugins`, this returns `/srv/cms/plugins`.
pub fn resolve_relative_path(base_dir: &Path, relative_path: &Path) -> PathBuf {
    if relative_path.is_absolute() {
        normalize_path(relative_path)
    } else {
        normalize_path(&base_dir.join(relative_path))
    }
}

/// The final component of a path as UTF-8, if there is one.
pub fn file_name_str(path: &Path) -> Option<&str> {
    path.file_name().and_then(|n| n.to_str())
}
