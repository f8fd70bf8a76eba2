//! Submodule-based package management.
//!
//! Third-party firmware libraries are tracked as git submodules of a hidden
//! repository at `<project>/.pkg`, recorded in a JSON manifest (`pkglist`),
//! and linked into their consuming locations with symlinks. Every manifest
//! mutation and submodule change is its own commit, so the repository history
//! is an audit log of installs, removals and updates.

pub mod install;
pub mod link;
pub mod manifest;
pub mod repo;
pub mod spec;

use std::path::PathBuf;

use thiserror::Error;

pub use install::{InstallOutcome, PackageManager, RemoveOutcome};
pub use manifest::ManifestEntry;
pub use spec::Package;

/// Fatal package-manager errors.
///
/// Per-package conditions ("already installed", "not installed", a failed
/// fetch) are not errors; they are reported through [`InstallOutcome`] and
/// [`RemoveOutcome`] and never abort the rest of a batch.
#[derive(Debug, Error)]
pub enum PackageError {
    /// A dependency string matched neither accepted grammar. Fatal to the
    /// whole batch; nothing is attempted.
    #[error("bad package format: {0}")]
    MalformedSpec(String),

    /// The version-control backend could not retrieve a package.
    #[error("could not fetch submodule from {origin}")]
    Fetch {
        origin: String,
        #[source]
        source: git2::Error,
    },

    /// The package list exists but cannot be parsed. No further operation
    /// can trust the manifest, so this is fatal.
    #[error("package list at {path} is corrupt")]
    ManifestCorrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The package list could not be read or written.
    #[error("could not access package list at {path}")]
    ManifestIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
