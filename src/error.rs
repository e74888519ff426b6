//! Error types for package resolution.

use thiserror::Error;

/// Errors surfaced by the registry and the package factory.
///
/// Version resolution never produces one of these; it degrades to an empty
/// or default version string instead.
#[derive(Error, Debug)]
pub enum PackageError {
    /// The factory could not classify the name as a library or a plugin.
    #[error("Package \"{0}\" could not be resolved")]
    PackageNotResolvable(String),

    /// Lookup of a registered plugin by name failed.
    #[error("Plugin \"{0}\" was not found")]
    PluginNotFound(String),

    /// A settings or permission collaborator could not be reached.
    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// A single problem found while validating a plugin manifest.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ManifestIssue {
    #[error("Corrupt JSON information.")]
    Corrupt,

    #[error("Missing field: \"{0}\"")]
    MissingField(String),

    #[error("Invalid field: \"{field}\" ({value}). It should be: {expected}")]
    InvalidField {
        field: String,
        value: String,
        expected: String,
    },
}

impl PackageError {
    pub fn store_unavailable(err: impl std::fmt::Display) -> Self {
        PackageError::StoreUnavailable(err.to_string())
    }
}
