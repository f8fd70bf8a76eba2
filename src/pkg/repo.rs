//! The hidden package repository.
//!
//! A plain git repository at `<project>/.pkg` backs the manifest: every
//! installed package is a submodule named by its manifest `name`, and every
//! mutation is committed, giving crash consistency and an audit history for
//! free. All git access goes through this wrapper.

use std::path::{Path, PathBuf};

use anyhow::{anyhow, bail, Context, Result};
use git2::build::CheckoutBuilder;
use git2::{Commit, Repository, Signature, StatusOptions};

use crate::pkg::manifest::MANIFEST_FILE;
use crate::pkg::{Package, PackageError};

/// Wrapper around the package repository.
pub struct PkgRepo {
    repo: Repository,
    root: PathBuf,
}

impl PkgRepo {
    /// Open the package repository, initializing it on first use.
    ///
    /// Initialization commits an empty manifest as the first change, so a
    /// freshly created repository is already in a coherent state. Idempotent.
    pub fn open_or_init(root: &Path) -> Result<Self> {
        std::fs::create_dir_all(root)
            .with_context(|| format!("failed to create directory: {}", root.display()))?;

        let repo = match Repository::open(root) {
            Ok(repo) => repo,
            Err(_) => Self::init(root)?,
        };

        Ok(PkgRepo {
            repo,
            root: root.to_path_buf(),
        })
    }

    fn init(root: &Path) -> Result<Repository> {
        tracing::info!("initializing package repository at {}", root.display());
        let repo = Repository::init(root)?;

        std::fs::write(root.join(MANIFEST_FILE), "[]")
            .with_context(|| "failed to write empty package list")?;

        {
            let mut index = repo.index()?;
            index.add_path(Path::new(MANIFEST_FILE))?;
            index.write()?;
            let tree_id = index.write_tree()?;
            let tree = repo.find_tree(tree_id)?;
            let sig = signature(&repo)?;
            repo.commit(Some("HEAD"), &sig, &sig, "Initialized repository", &tree, &[])?;
        }

        Ok(repo)
    }

    /// The repository root (`<project>/.pkg`).
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Add and clone the submodule for a package.
    ///
    /// After the clone, the tracked branch and then the requested version are
    /// checked out when given. The working tree is left dirty; the caller
    /// commits (or rolls back) the result.
    pub fn add_submodule(&self, package: &Package) -> Result<(), PackageError> {
        self.add_submodule_inner(package)
            .map_err(|source| PackageError::Fetch {
                origin: package.origin(),
                source,
            })
    }

    fn add_submodule_inner(&self, package: &Package) -> Result<(), git2::Error> {
        let mut sm = self
            .repo
            .submodule(&package.url, Path::new(&package.name), true)?;
        if let Some(branch) = package.branch.as_deref() {
            // `submodule_set_branch` needs `&mut Repository`; it only writes the
            // on-disk `.gitmodules`/config, so a second handle to the same repo
            // is equivalent and keeps this method's `&self` signature.
            let mut repo = Repository::open(self.repo.path())?;
            repo.submodule_set_branch(&package.name, branch)?;
        }

        let sub = sm.clone(None)?;
        if let Some(branch) = package.branch.as_deref() {
            checkout_detached(&sub, &format!("refs/remotes/origin/{}", branch))?;
        }
        if let Some(version) = package.version.as_deref() {
            checkout_detached(&sub, version)?;
        }

        sm.add_finalize()
    }

    /// Remove a submodule: drop its gitlink from the index, deregister it
    /// from `.gitmodules` and the repository config, and delete its working
    /// tree and module directory.
    ///
    /// Without `force`, a submodule with local changes is refused.
    pub fn remove_submodule(&self, name: &str, force: bool) -> Result<()> {
        let worktree = self.root.join(name);

        if !force {
            if let Ok(sub) = Repository::open(&worktree) {
                let mut opts = StatusOptions::new();
                opts.include_untracked(true);
                if !sub.statuses(Some(&mut opts))?.is_empty() {
                    bail!("submodule {} has local changes", name);
                }
            }
        }

        let mut index = self.repo.index()?;
        let _ = index.remove_all([name], None);
        index.write()?;

        let gitmodules = self.root.join(".gitmodules");
        if gitmodules.exists() {
            if let Ok(mut cfg) = git2::Config::open(&gitmodules) {
                strip_submodule_config(&mut cfg, name);
            }
        }
        if let Ok(mut cfg) = self.repo.config() {
            strip_submodule_config(&mut cfg, name);
        }

        if worktree.exists() {
            std::fs::remove_dir_all(&worktree)
                .with_context(|| format!("failed to remove {}", worktree.display()))?;
        }
        let module_dir = self.repo.path().join("modules").join(name);
        if module_dir.exists() {
            std::fs::remove_dir_all(&module_dir)
                .with_context(|| format!("failed to remove {}", module_dir.display()))?;
        }

        Ok(())
    }

    /// Fetch a submodule's origin and fast-forward its working tree to the
    /// tracked ref (the configured branch, or the remote default).
    ///
    /// The moved gitlink is staged; the caller decides whether to commit.
    pub fn update_submodule(&self, name: &str) -> Result<()> {
        let sm = self.repo.find_submodule(name)?;
        let sub = sm
            .open()
            .with_context(|| format!("failed to open submodule {}", name))?;

        let mut remote = sub.find_remote("origin")?;
        remote
            .fetch(&[] as &[&str], None, None)
            .with_context(|| format!("failed to fetch submodule {}", name))?;

        let candidates: Vec<String> = match sm.branch() {
            Some(branch) => vec![format!("refs/remotes/origin/{}", branch)],
            None => vec![
                "refs/remotes/origin/HEAD".to_string(),
                "FETCH_HEAD".to_string(),
            ],
        };
        let tip = candidates
            .iter()
            .find_map(|r| sub.revparse_single(r).ok())
            .ok_or_else(|| anyhow!("could not resolve updated tip for submodule {}", name))?
            .peel(git2::ObjectType::Commit)?;

        let mut checkout = CheckoutBuilder::new();
        checkout.force();
        sub.checkout_tree(&tip, Some(&mut checkout))?;
        sub.set_head_detached(tip.id())?;

        let mut index = self.repo.index()?;
        index.add_path(Path::new(name))?;
        index.write()?;

        Ok(())
    }

    /// Names of all registered submodules.
    pub fn submodule_names(&self) -> Result<Vec<String>> {
        Ok(self
            .repo
            .submodules()?
            .iter()
            .filter_map(|s| s.name().map(|n| n.to_string()))
            .collect())
    }

    /// Whether the working tree or index differs from HEAD, ignoring
    /// untracked files.
    pub fn is_dirty(&self) -> Result<bool> {
        let mut opts = StatusOptions::new();
        opts.include_untracked(false);
        Ok(!self.repo.statuses(Some(&mut opts))?.is_empty())
    }

    /// Stage exactly the named paths and commit, unless the resulting tree
    /// is identical to HEAD. Returns whether a commit was created.
    pub fn commit_paths(&self, paths: &[&str], message: &str) -> Result<bool> {
        let mut index = self.repo.index()?;
        for p in paths {
            let path = Path::new(p);
            if self.root.join(path).exists() {
                index.add_path(path)?;
            } else {
                let _ = index.remove_all([*p], None);
            }
        }
        index.write()?;

        let tree_id = index.write_tree()?;
        let head = self.repo.head().ok().and_then(|h| h.peel_to_commit().ok());
        if let Some(parent) = &head {
            if parent.tree_id() == tree_id {
                return Ok(false);
            }
        }

        let tree = self.repo.find_tree(tree_id)?;
        let sig = signature(&self.repo)?;
        let parents: Vec<&Commit<'_>> = head.iter().collect();
        self.repo
            .commit(Some("HEAD"), &sig, &sig, message, &tree, &parents)?;
        Ok(true)
    }

    /// Roll back the side effects of a partially completed submodule add:
    /// deregister the submodule, restore `.gitmodules` and the index to
    /// HEAD, and sweep untracked leftovers.
    ///
    /// Callers treat this as best effort and log failures rather than
    /// escalating them.
    pub fn discard_partial_submodule(&self, name: &str) -> Result<()> {
        self.remove_submodule(name, true)?;

        if let Ok(head) = self.repo.head() {
            if let Ok(obj) = head.peel(git2::ObjectType::Commit) {
                let _ = self.repo.reset_default(Some(&obj), [".gitmodules", name]);
            }
        }
        // Restore a tracked .gitmodules to its committed content, or drop it
        // entirely when this was the first install.
        let mut checkout = CheckoutBuilder::new();
        checkout.force().remove_untracked(true).path(".gitmodules");
        let _ = self.repo.checkout_head(Some(&mut checkout));

        self.clean_untracked()
    }

    /// Delete untracked files and directories left behind by a failed fetch.
    /// Used exclusively during rollback.
    pub fn clean_untracked(&self) -> Result<()> {
        let mut opts = StatusOptions::new();
        opts.include_untracked(true).recurse_untracked_dirs(false);
        let statuses = self.repo.statuses(Some(&mut opts))?;

        for entry in statuses.iter() {
            if !entry.status().contains(git2::Status::WT_NEW) {
                continue;
            }
            let Some(p) = entry.path() else { continue };
            let full = self.root.join(p.trim_end_matches('/'));
            tracing::debug!("cleaning untracked {}", full.display());
            let _ = if full.is_dir() {
                std::fs::remove_dir_all(&full)
            } else {
                std::fs::remove_file(&full)
            };
        }

        Ok(())
    }
}

/// Check out a revision, leaving HEAD detached at its commit.
fn checkout_detached(repo: &Repository, refname: &str) -> Result<(), git2::Error> {
    // Peel through annotated tags to the commit itself.
    let commit = repo.revparse_single(refname)?.peel(git2::ObjectType::Commit)?;
    let mut checkout = CheckoutBuilder::new();
    checkout.force();
    repo.checkout_tree(&commit, Some(&mut checkout))?;
    repo.set_head_detached(commit.id())
}

/// Commit signature from config, with a fallback for bare environments.
fn signature(repo: &Repository) -> Result<Signature<'static>, git2::Error> {
    repo.signature()
        .or_else(|_| Signature::now("solder", "solder@localhost"))
}

fn strip_submodule_config(cfg: &mut git2::Config, name: &str) {
    for key in ["path", "url", "branch"] {
        let _ = cfg.remove(&format!("submodule.{}.{}", name, key));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_open_or_init_commits_empty_manifest() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path().join(".pkg");

        let repo = PkgRepo::open_or_init(&root).unwrap();
        assert!(root.join(MANIFEST_FILE).exists());
        assert!(!repo.is_dirty().unwrap());

        let git = Repository::open(&root).unwrap();
        let head = git.head().unwrap().peel_to_commit().unwrap();
        assert_eq!(head.message().unwrap(), "Initialized repository");
    }

    #[test]
    fn test_open_or_init_is_idempotent() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path().join(".pkg");

        PkgRepo::open_or_init(&root).unwrap();
        std::fs::write(root.join(MANIFEST_FILE), "[{\"keep\":true}]").unwrap();
        PkgRepo::open_or_init(&root).unwrap();

        // Reopening neither reinitializes nor touches the manifest.
        assert_eq!(
            std::fs::read_to_string(root.join(MANIFEST_FILE)).unwrap(),
            "[{\"keep\":true}]"
        );
    }

    #[test]
    fn test_commit_paths_skips_noop() {
        let tmp = TempDir::new().unwrap();
        let repo = PkgRepo::open_or_init(&tmp.path().join(".pkg")).unwrap();

        // Identical tree: no commit created.
        assert!(!repo.commit_paths(&[MANIFEST_FILE], "nothing").unwrap());

        std::fs::write(repo.root().join(MANIFEST_FILE), "[1]").unwrap();
        assert!(repo.commit_paths(&[MANIFEST_FILE], "changed").unwrap());
        assert!(!repo.is_dirty().unwrap());
    }

    #[test]
    fn test_commit_paths_stages_only_named_paths() {
        let tmp = TempDir::new().unwrap();
        let repo = PkgRepo::open_or_init(&tmp.path().join(".pkg")).unwrap();

        std::fs::write(repo.root().join(MANIFEST_FILE), "[2]").unwrap();
        std::fs::write(repo.root().join("stray"), "x").unwrap();
        repo.commit_paths(&[MANIFEST_FILE], "manifest only").unwrap();

        // The stray file is still untracked, not swept into the commit.
        let git = Repository::open(repo.root()).unwrap();
        let head_tree = git.head().unwrap().peel_to_tree().unwrap();
        assert!(head_tree.get_name("stray").is_none());
    }

    #[test]
    fn test_clean_untracked() {
        let tmp = TempDir::new().unwrap();
        let repo = PkgRepo::open_or_init(&tmp.path().join(".pkg")).unwrap();

        std::fs::write(repo.root().join("leftover"), "x").unwrap();
        std::fs::create_dir(repo.root().join("partial")).unwrap();
        std::fs::write(repo.root().join("partial/file"), "y").unwrap();

        repo.clean_untracked().unwrap();
        assert!(!repo.root().join("leftover").exists());
        assert!(!repo.root().join("partial").exists());
        // Tracked files survive.
        assert!(repo.root().join(MANIFEST_FILE).exists());
    }
}
