//! Runtime abstraction for system operations.
//!
//! This module provides a trait-based abstraction over the filesystem and
//! process environment, so that plugin discovery, manifest reading and the
//! JSON-backed stores can be exercised against a mock in tests.
//!
//! # Structure
//!
//! - `path` - Path utility functions (normalize, resolve relative paths)
//! - `env` - Environment variables and well-known directories
//! - `fs` - File system operations (read, directory listing)

mod env;
mod fs;
pub mod path;

use anyhow::Result;
use std::env as std_env;
use std::path::{Path, PathBuf};

pub use path::{normalize_path, resolve_relative_path};

#[cfg_attr(test, mockall::automock)]
pub trait Runtime: Send + Sync {
    // Environment
    fn env_var(&self, key: &str) -> Result<String, std_env::VarError>;

    // File System
    fn read_to_string(&self, path: &Path) -> Result<String>;
    fn exists(&self, path: &Path) -> bool;
    fn is_dir(&self, path: &Path) -> bool;

    /// List the immediate entries of a directory (non-recursive).
    /// Order is whatever the platform returns; callers sort when they need to.
    fn read_dir(&self, path: &Path) -> Result<Vec<PathBuf>>;

    // Directories
    fn config_dir(&self) -> Option<PathBuf>;
    fn current_dir(&self) -> Result<PathBuf>;
}

pub struct RealRuntime;

impl Runtime for RealRuntime {
    fn env_var(&self, key: &str) -> Result<String, std_env::VarError> {
        self.env_var_impl(key)
    }

    fn read_to_string(&self, path: &Path) -> Result<String> {
        self.read_to_string_impl(path)
    }

    fn exists(&self, path: &Path) -> bool {
        self.exists_impl(path)
    }

    fn is_dir(&self, path: &Path) -> bool {
        self.is_dir_impl(path)
    }

    fn read_dir(&self, path: &Path) -> Result<Vec<PathBuf>> {
        self.read_dir_impl(path)
    }

    fn config_dir(&self) -> Option<PathBuf> {
        self.config_dir_impl()
    }

    fn current_dir(&self) -> Result<PathBuf> {
        self.current_dir_impl()
    }
}
