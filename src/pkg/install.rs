//! Install, uninstall and update orchestration.
//!
//! Batches are processed strictly in caller order. Per-package side effects
//! (submodule add, link, per-package commit) happen immediately; the manifest
//! is rewritten and committed exactly once per batch, covering every package
//! that succeeded. A package that fails mid-install has its partial state
//! rolled back without disturbing its siblings.

use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::pkg::manifest::{self, ManifestEntry, MANIFEST_FILE};
use crate::pkg::repo::PkgRepo;
use crate::pkg::{link, spec, Package};
use crate::util::context::PKG_DIR_NAME;
use crate::util::fs as sfs;
use crate::util::shell::{Shell, Status};

/// Terminal state of one package in an install batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstallOutcome {
    /// Fetched, linked and committed.
    Installed,
    /// A new path was linked to an already-installed package.
    Relinked,
    /// The `(name, path)` pair was already recorded; nothing was touched.
    AlreadyInstalled,
    /// The package failed and its partial state was rolled back.
    Failed(String),
}

impl InstallOutcome {
    /// Whether this outcome participates in the batch manifest write.
    pub fn changes_manifest(&self) -> bool {
        matches!(self, InstallOutcome::Installed | InstallOutcome::Relinked)
    }
}

/// Terminal state of one package in an uninstall batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoveOutcome {
    /// The last consuming path was removed along with the canonical store.
    Removed,
    /// One of several consuming paths was unlinked; the store survives.
    Unlinked,
    /// The package is not in the manifest.
    NotInstalled,
    /// No link exists at the requested path; the manifest was left alone.
    LinkMissing,
    /// The removal failed partway.
    Failed(String),
}

impl RemoveOutcome {
    /// Whether this outcome participates in the batch manifest write.
    pub fn changes_manifest(&self) -> bool {
        matches!(self, RemoveOutcome::Removed | RemoveOutcome::Unlinked)
    }
}

/// The package manager for one project root.
pub struct PackageManager<'a> {
    project_root: PathBuf,
    pkg_root: PathBuf,
    repo: PkgRepo,
    shell: &'a Shell,
}

impl<'a> PackageManager<'a> {
    /// Open (or initialize) the package repository under a project root.
    pub fn open(project_root: &Path, shell: &'a Shell) -> Result<Self> {
        let project_root = sfs::normalize_path(project_root);
        let pkg_root = project_root.join(PKG_DIR_NAME);
        let repo = PkgRepo::open_or_init(&pkg_root)?;

        Ok(PackageManager {
            project_root,
            pkg_root,
            repo,
            shell,
        })
    }

    /// Install a batch of spec strings.
    ///
    /// Parsing is all-or-nothing: a malformed spec aborts before anything is
    /// touched. Installation is per-item.
    pub fn install_many(&self, specs: &[String]) -> Result<Vec<(Package, InstallOutcome)>> {
        let packages = spec::parse_many(specs)?;
        self.install_packages(packages)
    }

    /// Install already-parsed packages, in the given order.
    pub fn install_packages(
        &self,
        packages: Vec<Package>,
    ) -> Result<Vec<(Package, InstallOutcome)>> {
        // The in-memory view tracks earlier installs in this batch so a
        // duplicate name later in the batch takes the already-installed
        // branch instead of refetching.
        let mut view = manifest::read(&self.pkg_root)?;
        let mut results = Vec::with_capacity(packages.len());

        let mut progress = self.shell.progress(packages.len() as u64, "installing");
        for package in packages {
            let outcome = self.install_one(&mut view, &package);
            progress.inc(1);
            results.push((package, outcome));
        }
        progress.finish();

        let succeeded: Vec<&Package> = results
            .iter()
            .filter(|(_, o)| o.changes_manifest())
            .map(|(p, _)| p)
            .collect();
        if !succeeded.is_empty() {
            self.commit_installs(&succeeded)?;
        }

        Ok(results)
    }

    fn install_one(&self, view: &mut Vec<ManifestEntry>, package: &Package) -> InstallOutcome {
        let store = self.pkg_root.join(&package.name);
        let target = self.project_root.join(&package.path);

        if let Some(entry) = view.iter_mut().find(|e| e.name == package.name) {
            if entry.paths.contains(&package.path) {
                self.shell
                    .status(Status::Skipped, format!("{} already installed", package.name));
                return InstallOutcome::AlreadyInstalled;
            }
            // Multi-link: the canonical store already exists, wire up the
            // new location only.
            return match link::link(&store, &target) {
                Ok(()) => {
                    entry.paths.push(package.path.clone());
                    self.shell.status(
                        Status::Linked,
                        format!("{} into {}", package.name, package.path),
                    );
                    InstallOutcome::Relinked
                }
                Err(err) => {
                    self.shell.error(format!("{:#}", err));
                    InstallOutcome::Failed(format!("{:#}", err))
                }
            };
        }

        self.shell.status(Status::Fetching, package.origin());
        if let Err(err) = self.repo.add_submodule(package) {
            self.shell.error(format!("{:#}", anyhow::Error::from(err)));
            self.rollback_failed_fetch(package);
            return InstallOutcome::Failed(format!("could not fetch {}", package.origin()));
        }

        if let Err(err) = link::link(&store, &target) {
            self.shell.error(format!("{:#}", err));
            self.rollback_failed_fetch(package);
            return InstallOutcome::Failed(format!("{:#}", err));
        }

        if let Err(err) = self.repo.commit_paths(
            &[".gitmodules", &package.name],
            &format!("Installed {}", package.name),
        ) {
            self.shell.error(format!("{:#}", err));
            let _ = link::unlink(&target);
            self.rollback_failed_fetch(package);
            return InstallOutcome::Failed(format!("{:#}", err));
        }

        view.push(ManifestEntry::from_package(package));
        self.shell.status(Status::Installed, &package.name);
        InstallOutcome::Installed
    }

    /// Named rollback step: best-effort disposal of a package's partial
    /// submodule state. Failures are logged and never escalate; the batch
    /// carries on with the remaining packages either way.
    fn rollback_failed_fetch(&self, package: &Package) {
        if let Err(err) = self.repo.discard_partial_submodule(&package.name) {
            tracing::warn!(
                "rollback: could not discard partial state of {}: {:#}",
                package.name,
                err
            );
        }
    }

    /// Uninstall a batch of spec strings.
    pub fn remove_many(&self, specs: &[String]) -> Result<Vec<(Package, RemoveOutcome)>> {
        let packages = spec::parse_many(specs)?;
        self.remove_packages(packages)
    }

    /// Uninstall already-parsed packages, in the given order.
    pub fn remove_packages(
        &self,
        packages: Vec<Package>,
    ) -> Result<Vec<(Package, RemoveOutcome)>> {
        let mut view = manifest::read(&self.pkg_root)?;
        let mut results = Vec::with_capacity(packages.len());

        for package in packages {
            let outcome = self.remove_one(&mut view, &package);
            results.push((package, outcome));
        }

        let succeeded: Vec<&Package> = results
            .iter()
            .filter(|(_, o)| o.changes_manifest())
            .map(|(p, _)| p)
            .collect();
        if !succeeded.is_empty() {
            self.commit_removals(&succeeded)?;
        }

        Ok(results)
    }

    fn remove_one(&self, view: &mut Vec<ManifestEntry>, package: &Package) -> RemoveOutcome {
        let Some(pos) = view.iter().position(|e| e.name == package.name) else {
            self.shell
                .status(Status::Skipped, format!("{} is not installed", package.name));
            return RemoveOutcome::NotInstalled;
        };

        let target = self.project_root.join(&package.path);
        if link::unlink(&target).is_err() {
            self.shell.error(format!(
                "{} is not linked at {}",
                package.name, package.path
            ));
            return RemoveOutcome::LinkMissing;
        }

        if view[pos].paths.len() > 1 {
            view[pos].paths.retain(|p| p != &package.path);
            self.shell.status(
                Status::Unlinked,
                format!("{} from {}", package.name, package.path),
            );
            return RemoveOutcome::Unlinked;
        }

        // Last consuming path: the canonical store goes too, even with
        // local changes.
        if let Err(err) = self.repo.remove_submodule(&package.name, true) {
            self.shell.error(format!(
                "failed to uninstall {}: {:#}",
                package.name, err
            ));
            return RemoveOutcome::Failed(format!("{:#}", err));
        }
        if let Err(err) = self
            .repo
            .commit_paths(&[".gitmodules"], &format!("Uninstalled {}", package.name))
        {
            self.shell.error(format!(
                "failed to uninstall {}: {:#}",
                package.name, err
            ));
            return RemoveOutcome::Failed(format!("{:#}", err));
        }

        view.remove(pos);
        self.shell.status(Status::Removed, &package.name);
        RemoveOutcome::Removed
    }

    /// Fast-forward every installed submodule, committing per submodule only
    /// when something actually moved. The manifest is never touched.
    pub fn update_all(&self) -> Result<usize> {
        let names = self.repo.submodule_names()?;
        let mut updated = 0;

        for name in names {
            self.shell.status(Status::Fetching, &name);
            if let Err(err) = self.repo.update_submodule(&name) {
                self.shell
                    .error(format!("could not update {}: {:#}", name, err));
                continue;
            }
            if self
                .repo
                .commit_paths(&[&name], &format!("Updated {}", name))?
            {
                self.shell.status(Status::Updated, &name);
                updated += 1;
            }
        }

        Ok(updated)
    }

    /// The single end-of-batch manifest read-modify-write-commit cycle for
    /// installs.
    fn commit_installs(&self, packages: &[&Package]) -> Result<()> {
        let mut entries = manifest::read(&self.pkg_root)?;
        let (new, changed) = manifest::apply_installs(&mut entries, packages);
        manifest::write(&self.pkg_root, &entries)?;

        let mut message = String::from("Updated package list\n\n");
        if !new.is_empty() {
            message.push_str(&format!("New: {}\n", new.join(", ")));
        }
        if !changed.is_empty() {
            message.push_str(&format!("Changed: {}\n", changed.join(", ")));
        }
        self.repo.commit_paths(&[MANIFEST_FILE], &message)?;
        Ok(())
    }

    /// The single end-of-batch manifest cycle for removals.
    fn commit_removals(&self, packages: &[&Package]) -> Result<()> {
        let mut entries = manifest::read(&self.pkg_root)?;
        let (uninstalled, unlinked) = manifest::apply_removals(&mut entries, packages);
        manifest::write(&self.pkg_root, &entries)?;

        let mut message = String::from("Updated package list\n\n");
        if !uninstalled.is_empty() {
            message.push_str(&format!("Uninstalled: {}\n", uninstalled.join(", ")));
        }
        if !unlinked.is_empty() {
            message.push_str(&format!("Changed: {}\n", unlinked.join(", ")));
        }
        self.repo.commit_paths(&[MANIFEST_FILE], &message)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use git2::{Repository, Signature};
    use tempfile::TempDir;

    /// Create a local upstream repository with one committed header file.
    fn upstream(dir: &Path, name: &str) -> String {
        let root = dir.join(name);
        std::fs::create_dir_all(&root).unwrap();
        let repo = Repository::init(&root).unwrap();
        std::fs::write(root.join("library.h"), "#pragma once\n").unwrap();
        commit_all(&repo, "initial import");
        root.to_string_lossy().into_owned()
    }

    fn commit_all(repo: &Repository, message: &str) -> git2::Oid {
        let mut index = repo.index().unwrap();
        index
            .add_all(["*"], git2::IndexAddOption::DEFAULT, None)
            .unwrap();
        index.write().unwrap();
        let tree_id = index.write_tree().unwrap();
        let tree = repo.find_tree(tree_id).unwrap();
        let sig = Signature::now("upstream", "upstream@localhost").unwrap();
        let parent = repo.head().ok().map(|h| h.peel_to_commit().unwrap());
        let parents: Vec<&git2::Commit<'_>> = parent.iter().collect();
        repo.commit(Some("HEAD"), &sig, &sig, message, &tree, &parents)
            .unwrap()
    }

    fn project() -> (TempDir, PathBuf) {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path().join("project");
        std::fs::create_dir_all(root.join("lib")).unwrap();
        (tmp, root)
    }

    fn local_package(url: &str, name: &str, path: Option<&str>) -> Package {
        Package::new(name, url, None, None, path.map(|p| p.to_string()))
    }

    fn manifest_bytes(pkg_root: &Path) -> Vec<u8> {
        std::fs::read(pkg_root.join(MANIFEST_FILE)).unwrap_or_default()
    }

    fn commit_messages(pkg_root: &Path) -> Vec<String> {
        let repo = Repository::open(pkg_root).unwrap();
        let mut walk = repo.revwalk().unwrap();
        walk.push_head().unwrap();
        walk.map(|oid| {
            repo.find_commit(oid.unwrap())
                .unwrap()
                .message()
                .unwrap()
                .to_string()
        })
        .collect()
    }

    #[test]
    fn test_install_links_and_commits() {
        let (tmp, root) = project();
        let url = upstream(tmp.path(), "blink");
        let shell = Shell::quiet();
        let pm = PackageManager::open(&root, &shell).unwrap();

        let results = pm
            .install_packages(vec![local_package(&url, "blink", None)])
            .unwrap();
        assert_eq!(results[0].1, InstallOutcome::Installed);

        let store = root.join(".pkg/blink");
        assert!(store.join("library.h").exists());
        let linked = std::fs::read_link(root.join("lib/blink")).unwrap();
        assert_eq!(sfs::normalize_path(&linked), sfs::normalize_path(&store));

        let entries = manifest::read(&root.join(".pkg")).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].name, "blink");
        assert_eq!(entries[0].paths, vec!["lib/blink"]);

        let messages = commit_messages(&root.join(".pkg"));
        assert!(messages[0].starts_with("Updated package list"));
        assert!(messages.iter().any(|m| m == "Installed blink"));
    }

    #[test]
    fn test_install_twice_is_idempotent() {
        let (tmp, root) = project();
        let url = upstream(tmp.path(), "blink");
        let shell = Shell::quiet();
        let pm = PackageManager::open(&root, &shell).unwrap();

        pm.install_packages(vec![local_package(&url, "blink", None)])
            .unwrap();
        let before = manifest_bytes(&root.join(".pkg"));
        let commits_before = commit_messages(&root.join(".pkg")).len();

        let results = pm
            .install_packages(vec![local_package(&url, "blink", None)])
            .unwrap();
        assert_eq!(results[0].1, InstallOutcome::AlreadyInstalled);

        assert_eq!(manifest_bytes(&root.join(".pkg")), before);
        assert_eq!(commit_messages(&root.join(".pkg")).len(), commits_before);
        // Still exactly one link and one store.
        assert!(root.join("lib/blink").is_symlink());
        assert!(root.join(".pkg/blink").is_dir());
    }

    #[test]
    fn test_two_paths_share_one_store() {
        let (tmp, root) = project();
        let url = upstream(tmp.path(), "blink");
        let shell = Shell::quiet();
        let pm = PackageManager::open(&root, &shell).unwrap();

        let results = pm
            .install_packages(vec![
                local_package(&url, "blink", None),
                local_package(&url, "blink", Some("vendor/blink")),
            ])
            .unwrap();
        assert_eq!(results[0].1, InstallOutcome::Installed);
        assert_eq!(results[1].1, InstallOutcome::Relinked);

        let entries = manifest::read(&root.join(".pkg")).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].paths, vec!["lib/blink", "vendor/blink"]);

        assert!(root.join("lib/blink").is_symlink());
        assert!(root.join("vendor/blink").is_symlink());
        // One canonical store, fetched once.
        let messages = commit_messages(&root.join(".pkg"));
        assert_eq!(
            messages.iter().filter(|m| *m == "Installed blink").count(),
            1
        );
    }

    #[test]
    fn test_batch_makes_single_manifest_commit() {
        let (tmp, root) = project();
        let url_a = upstream(tmp.path(), "blink");
        let url_b = upstream(tmp.path(), "servo");
        let shell = Shell::quiet();
        let pm = PackageManager::open(&root, &shell).unwrap();

        pm.install_packages(vec![
            local_package(&url_a, "blink", None),
            local_package(&url_b, "servo", None),
        ])
        .unwrap();

        let messages = commit_messages(&root.join(".pkg"));
        let manifest_commits: Vec<&String> = messages
            .iter()
            .filter(|m| m.starts_with("Updated package list"))
            .collect();
        assert_eq!(manifest_commits.len(), 1);
        assert!(manifest_commits[0].contains("New: blink, servo"));
    }

    #[test]
    fn test_failed_fetch_rolls_back_cleanly() {
        let (tmp, root) = project();
        let shell = Shell::quiet();
        let pm = PackageManager::open(&root, &shell).unwrap();

        let before = manifest_bytes(&root.join(".pkg"));
        let commits_before = commit_messages(&root.join(".pkg")).len();

        let missing = tmp.path().join("no-such-repo").to_string_lossy().into_owned();
        let results = pm
            .install_packages(vec![local_package(&missing, "ghost", None)])
            .unwrap();
        assert!(matches!(results[0].1, InstallOutcome::Failed(_)));

        // Manifest and history byte-identical to the pre-call state.
        assert_eq!(manifest_bytes(&root.join(".pkg")), before);
        assert_eq!(commit_messages(&root.join(".pkg")).len(), commits_before);
        // No partial submodule state survives.
        assert!(!root.join(".pkg/ghost").exists());
        assert!(!root.join("lib/ghost").exists());
        let repo = PkgRepo::open_or_init(&root.join(".pkg")).unwrap();
        assert!(!repo.is_dirty().unwrap());
        assert!(repo.submodule_names().unwrap().is_empty());
    }

    #[test]
    fn test_failed_fetch_does_not_abort_siblings() {
        let (tmp, root) = project();
        let url = upstream(tmp.path(), "servo");
        let shell = Shell::quiet();
        let pm = PackageManager::open(&root, &shell).unwrap();

        let missing = tmp.path().join("no-such-repo").to_string_lossy().into_owned();
        let results = pm
            .install_packages(vec![
                local_package(&missing, "ghost", None),
                local_package(&url, "servo", None),
            ])
            .unwrap();

        assert!(matches!(results[0].1, InstallOutcome::Failed(_)));
        assert_eq!(results[1].1, InstallOutcome::Installed);

        let entries = manifest::read(&root.join(".pkg")).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].name, "servo");
    }

    #[test]
    fn test_remove_one_of_two_paths_keeps_store() {
        let (tmp, root) = project();
        let url = upstream(tmp.path(), "blink");
        let shell = Shell::quiet();
        let pm = PackageManager::open(&root, &shell).unwrap();

        pm.install_packages(vec![
            local_package(&url, "blink", None),
            local_package(&url, "blink", Some("vendor/blink")),
        ])
        .unwrap();

        let results = pm
            .remove_packages(vec![local_package(&url, "blink", Some("vendor/blink"))])
            .unwrap();
        assert_eq!(results[0].1, RemoveOutcome::Unlinked);

        assert!(!root.join("vendor/blink").exists());
        assert!(root.join("lib/blink").is_symlink());
        assert!(root.join(".pkg/blink").is_dir());

        let entries = manifest::read(&root.join(".pkg")).unwrap();
        assert_eq!(entries[0].paths, vec!["lib/blink"]);
    }

    #[test]
    fn test_remove_last_path_removes_store() {
        let (tmp, root) = project();
        let url = upstream(tmp.path(), "blink");
        let shell = Shell::quiet();
        let pm = PackageManager::open(&root, &shell).unwrap();

        pm.install_packages(vec![local_package(&url, "blink", None)])
            .unwrap();
        let results = pm
            .remove_packages(vec![local_package(&url, "blink", None)])
            .unwrap();
        assert_eq!(results[0].1, RemoveOutcome::Removed);

        assert!(!root.join("lib/blink").exists());
        assert!(!root.join(".pkg/blink").exists());
        assert!(manifest::read(&root.join(".pkg")).unwrap().is_empty());

        let repo = PkgRepo::open_or_init(&root.join(".pkg")).unwrap();
        assert!(repo.submodule_names().unwrap().is_empty());
        let messages = commit_messages(&root.join(".pkg"));
        assert!(messages.iter().any(|m| m == "Uninstalled blink"));
    }

    #[test]
    fn test_remove_not_installed() {
        let (tmp, root) = project();
        let url = upstream(tmp.path(), "blink");
        let shell = Shell::quiet();
        let pm = PackageManager::open(&root, &shell).unwrap();

        let results = pm
            .remove_packages(vec![local_package(&url, "blink", None)])
            .unwrap();
        assert_eq!(results[0].1, RemoveOutcome::NotInstalled);
    }

    #[test]
    fn test_remove_with_missing_link_leaves_manifest() {
        let (tmp, root) = project();
        let url = upstream(tmp.path(), "blink");
        let shell = Shell::quiet();
        let pm = PackageManager::open(&root, &shell).unwrap();

        pm.install_packages(vec![local_package(&url, "blink", None)])
            .unwrap();
        std::fs::remove_file(root.join("lib/blink")).unwrap();
        let before = manifest_bytes(&root.join(".pkg"));

        let results = pm
            .remove_packages(vec![local_package(&url, "blink", None)])
            .unwrap();
        assert_eq!(results[0].1, RemoveOutcome::LinkMissing);
        assert_eq!(manifest_bytes(&root.join(".pkg")), before);
        assert!(root.join(".pkg/blink").is_dir());
    }

    #[test]
    fn test_install_version_checks_out_tag() {
        let (tmp, root) = project();
        let url = upstream(tmp.path(), "blink");

        // Tag the current tip, then move upstream ahead.
        let up = Repository::open(&url).unwrap();
        let tagged = up.head().unwrap().peel_to_commit().unwrap().id();
        let sig = Signature::now("upstream", "upstream@localhost").unwrap();
        up.tag(
            "v1",
            &up.find_object(tagged, None).unwrap(),
            &sig,
            "v1",
            false,
        )
        .unwrap();
        std::fs::write(Path::new(&url).join("extra.h"), "#pragma once\n").unwrap();
        commit_all(&up, "later work");

        let shell = Shell::quiet();
        let pm = PackageManager::open(&root, &shell).unwrap();
        let package = Package::new("blink", &url, None, Some("v1".to_string()), None);
        assert_eq!(package.name, "blink-v1");

        let results = pm.install_packages(vec![package]).unwrap();
        assert_eq!(results[0].1, InstallOutcome::Installed);

        let store = Repository::open(root.join(".pkg/blink-v1")).unwrap();
        let head = store.head().unwrap().peel_to_commit().unwrap();
        assert_eq!(head.id(), tagged);
        assert!(!root.join(".pkg/blink-v1/extra.h").exists());
    }

    #[test]
    fn test_update_all_with_no_packages_is_noop() {
        let (_tmp, root) = project();
        let shell = Shell::quiet();
        let pm = PackageManager::open(&root, &shell).unwrap();

        let before = commit_messages(&root.join(".pkg")).len();
        assert_eq!(pm.update_all().unwrap(), 0);
        assert_eq!(commit_messages(&root.join(".pkg")).len(), before);
    }

    #[test]
    fn test_update_all_fast_forwards() {
        let (tmp, root) = project();
        let url = upstream(tmp.path(), "blink");
        let shell = Shell::quiet();
        let pm = PackageManager::open(&root, &shell).unwrap();

        pm.install_packages(vec![local_package(&url, "blink", None)])
            .unwrap();

        // Move upstream ahead, then update.
        let up = Repository::open(&url).unwrap();
        std::fs::write(Path::new(&url).join("extra.h"), "#pragma once\n").unwrap();
        commit_all(&up, "later work");

        assert_eq!(pm.update_all().unwrap(), 1);
        assert!(root.join(".pkg/blink/extra.h").exists());
        let messages = commit_messages(&root.join(".pkg"));
        assert!(messages.iter().any(|m| m == "Updated blink"));

        // A second update has nothing to do and commits nothing.
        let count = messages.len();
        assert_eq!(pm.update_all().unwrap(), 0);
        assert_eq!(commit_messages(&root.join(".pkg")).len(), count);
    }
}
