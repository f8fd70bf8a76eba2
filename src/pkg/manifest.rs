//! The persisted package list.
//!
//! `pkglist` is a JSON array of entries, one per installed package `name`,
//! each carrying every project-relative path currently linking to it. The
//! file is read in full, mutated in memory, and overwritten; batching and
//! commits are the installer's responsibility.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::pkg::{Package, PackageError};

/// File name of the package list inside the package repository.
pub const MANIFEST_FILE: &str = "pkglist";

/// One installed package and its consuming paths.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestEntry {
    pub name: String,
    pub url: String,
    #[serde(default)]
    pub branch: String,
    #[serde(default)]
    pub version: String,
    pub paths: Vec<String>,
}

impl ManifestEntry {
    /// Build the entry recording a package's first install.
    pub fn from_package(package: &Package) -> Self {
        ManifestEntry {
            name: package.name.clone(),
            url: package.url.clone(),
            branch: package.branch.clone().unwrap_or_default(),
            version: package.version.clone().unwrap_or_default(),
            paths: vec![package.path.clone()],
        }
    }
}

/// Read the package list.
///
/// A missing file means no packages are installed yet and yields an empty
/// list. An unreadable or unparseable file is fatal: nothing downstream can
/// trust a corrupt manifest.
pub fn read(pkg_root: &Path) -> Result<Vec<ManifestEntry>, PackageError> {
    let path = pkg_root.join(MANIFEST_FILE);
    let contents = match std::fs::read_to_string(&path) {
        Ok(contents) => contents,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(err) => return Err(PackageError::ManifestIo { path, source: err }),
    };
    serde_json::from_str(&contents).map_err(|source| PackageError::ManifestCorrupt { path, source })
}

/// Overwrite the package list.
pub fn write(pkg_root: &Path, entries: &[ManifestEntry]) -> Result<(), PackageError> {
    let path = pkg_root.join(MANIFEST_FILE);
    let contents =
        serde_json::to_string(entries).expect("manifest entries always serialize");
    std::fs::write(&path, contents).map_err(|source| PackageError::ManifestIo { path, source })
}

/// Merge freshly installed packages into the entry list.
///
/// Returns the names of new entries and of entries that gained a path, for
/// the commit message. Packages whose `(name, path)` is already recorded are
/// left alone, so duplicates within a batch are harmless.
pub fn apply_installs(
    entries: &mut Vec<ManifestEntry>,
    packages: &[&Package],
) -> (Vec<String>, Vec<String>) {
    let mut new = Vec::new();
    let mut changed = Vec::new();

    for package in packages {
        match entries.iter_mut().find(|e| e.name == package.name) {
            Some(entry) => {
                if !entry.paths.contains(&package.path) {
                    entry.paths.push(package.path.clone());
                    changed.push(package.name.clone());
                }
            }
            None => {
                entries.push(ManifestEntry::from_package(package));
                new.push(package.name.clone());
            }
        }
    }

    (new, changed)
}

/// Remove uninstalled packages from the entry list.
///
/// Returns the names of entries deleted outright and of entries that merely
/// lost a path.
pub fn apply_removals(
    entries: &mut Vec<ManifestEntry>,
    packages: &[&Package],
) -> (Vec<String>, Vec<String>) {
    let mut uninstalled = Vec::new();
    let mut unlinked = Vec::new();

    for package in packages {
        let Some(pos) = entries.iter().position(|e| e.name == package.name) else {
            debug_assert!(false, "removal of unknown package {}", package.name);
            continue;
        };
        entries[pos].paths.retain(|p| p != &package.path);
        if entries[pos].paths.is_empty() {
            entries.remove(pos);
            uninstalled.push(package.name.clone());
        } else {
            unlinked.push(package.name.clone());
        }
    }

    (uninstalled, unlinked)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn package(spec: &str) -> Package {
        crate::pkg::spec::parse(spec).unwrap()
    }

    #[test]
    fn test_read_missing_is_empty() {
        let tmp = TempDir::new().unwrap();
        assert_eq!(read(tmp.path()).unwrap(), Vec::new());
    }

    #[test]
    fn test_read_corrupt_is_fatal() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(tmp.path().join(MANIFEST_FILE), "[{not json").unwrap();

        let err = read(tmp.path()).unwrap_err();
        assert!(matches!(err, PackageError::ManifestCorrupt { .. }));
    }

    #[test]
    fn test_write_read_round_trip() {
        let tmp = TempDir::new().unwrap();
        let entries = vec![ManifestEntry::from_package(&package("acme/blink@v2"))];

        write(tmp.path(), &entries).unwrap();
        assert_eq!(read(tmp.path()).unwrap(), entries);
    }

    #[test]
    fn test_apply_installs_new_and_changed() {
        let mut entries = Vec::new();
        let first = package("acme/blink");
        let (new, changed) = apply_installs(&mut entries, &[&first]);
        assert_eq!(new, vec!["blink"]);
        assert!(changed.is_empty());

        let second = package("acme/blink at vendor/blink");
        let (new, changed) = apply_installs(&mut entries, &[&second]);
        assert!(new.is_empty());
        assert_eq!(changed, vec!["blink"]);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].paths, vec!["lib/blink", "vendor/blink"]);
    }

    #[test]
    fn test_apply_installs_duplicate_is_harmless() {
        let mut entries = Vec::new();
        let pkg = package("acme/blink");
        let (new, changed) = apply_installs(&mut entries, &[&pkg, &pkg]);
        assert_eq!(new, vec!["blink"]);
        assert!(changed.is_empty());
        assert_eq!(entries[0].paths, vec!["lib/blink"]);
    }

    #[test]
    fn test_apply_removals() {
        let mut entries = Vec::new();
        let first = package("acme/blink");
        let second = package("acme/blink at vendor/blink");
        apply_installs(&mut entries, &[&first, &second]);

        let (uninstalled, unlinked) = apply_removals(&mut entries, &[&second]);
        assert!(uninstalled.is_empty());
        assert_eq!(unlinked, vec!["blink"]);
        assert_eq!(entries[0].paths, vec!["lib/blink"]);

        let (uninstalled, unlinked) = apply_removals(&mut entries, &[&first]);
        assert_eq!(uninstalled, vec!["blink"]);
        assert!(unlinked.is_empty());
        assert!(entries.is_empty());
    }
}
