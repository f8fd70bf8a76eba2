//! Symbolic links from project locations into the canonical store.
//!
//! Many project paths may link to the same store directory; links are shared
//! by reference and owned by the manifest entry, not by each other.

use std::path::Path;

use anyhow::{Context, Result};

use crate::util::fs as sfs;

/// Link a project location to a canonical store directory.
///
/// Parent directories are created as needed. A link that already exists and
/// points at `store_path` is success; anything else occupying the location is
/// an error.
pub fn link(store_path: &Path, link_path: &Path) -> Result<()> {
    if let Some(parent) = link_path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create directory: {}", parent.display()))?;
    }

    match sfs::symlink(store_path, link_path) {
        Ok(()) => Ok(()),
        Err(err) => {
            if let Ok(target) = std::fs::read_link(link_path) {
                if target == store_path {
                    return Ok(());
                }
            }
            Err(err).with_context(|| {
                format!(
                    "could not link package into {}",
                    link_path.display()
                )
            })
        }
    }
}

/// Remove the link at a project location.
///
/// Fails if nothing is linked there.
pub fn unlink(link_path: &Path) -> Result<()> {
    std::fs::read_link(link_path)
        .with_context(|| format!("nothing is linked at {}", link_path.display()))?;
    std::fs::remove_file(link_path)
        .with_context(|| format!("could not remove link at {}", link_path.display()))
}
