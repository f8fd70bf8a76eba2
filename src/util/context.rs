//! Global context and project layout for Solder operations.
//!
//! [`GlobalContext`] locates tool-wide data (the Solder home directory and
//! the Cosa toolchain inside it). [`ProjectLayout`] names every path inside a
//! single firmware project; nothing else in the crate hard-codes a path.

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use anyhow::{bail, Context, Result};
use directories::BaseDirs;

/// Name of the user-facing configuration file at the project root.
pub const USER_CONFIG_FILE: &str = "config.json";

/// Name of the directory holding generated build files.
pub const BUILD_DIR_NAME: &str = "solder";

/// Name of the hidden package repository directory.
pub const PKG_DIR_NAME: &str = ".pkg";

static HOME_DIR: LazyLock<Option<PathBuf>> =
    LazyLock::new(|| BaseDirs::new().map(|b| b.home_dir().join(".solder")));

/// Global context containing tool-wide paths and flags.
#[derive(Debug, Clone)]
pub struct GlobalContext {
    /// Current working directory
    cwd: PathBuf,

    /// Home directory for global Solder data (~/.solder/)
    home: PathBuf,
}

impl GlobalContext {
    /// Create a new GlobalContext with defaults.
    pub fn new() -> Result<Self> {
        let cwd = std::env::current_dir().context("failed to get current directory")?;

        let home = HOME_DIR
            .as_ref()
            .cloned()
            .unwrap_or_else(|| PathBuf::from(".solder"));

        Ok(GlobalContext { cwd, home })
    }

    /// Create a GlobalContext with a specific working directory.
    pub fn with_cwd(cwd: PathBuf) -> Result<Self> {
        let mut ctx = Self::new()?;
        ctx.cwd = cwd;
        Ok(ctx)
    }

    /// Get the current working directory.
    pub fn cwd(&self) -> &Path {
        &self.cwd
    }

    /// Get the Solder home directory (~/.solder/).
    pub fn home(&self) -> &Path {
        &self.home
    }

    /// Get the Cosa toolchain directory (~/.solder/toolchain/cosa).
    pub fn toolchain_dir(&self) -> PathBuf {
        self.home.join("toolchain").join("cosa")
    }

    /// Get the platform definitions file of the installed toolchain.
    pub fn platform_file(&self) -> PathBuf {
        self.toolchain_dir().join("platform.txt")
    }

    /// Resolve a project root from an optional `--path` flag.
    pub fn project_root(&self, path: Option<&Path>) -> PathBuf {
        match path {
            Some(p) if p.is_absolute() => p.to_path_buf(),
            Some(p) => self.cwd.join(p),
            None => self.cwd.clone(),
        }
    }
}

/// Paths inside a single Solder project.
#[derive(Debug, Clone)]
pub struct ProjectLayout {
    root: PathBuf,
}

impl ProjectLayout {
    /// Create a layout rooted at the given project directory.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        ProjectLayout { root: root.into() }
    }

    /// The project root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// `src/` - user sources.
    pub fn src_dir(&self) -> PathBuf {
        self.root.join("src")
    }

    /// `lib/` - project libraries, including linked packages.
    pub fn lib_dir(&self) -> PathBuf {
        self.root.join("lib")
    }

    /// `solder/` - generated build files (do not modify).
    pub fn solder_dir(&self) -> PathBuf {
        self.root.join(BUILD_DIR_NAME)
    }

    /// `solder/bin/` - the cmake/make build tree.
    pub fn build_dir(&self) -> PathBuf {
        self.solder_dir().join("bin")
    }

    /// `solder/CMakeLists.txt` - the generated build file.
    pub fn cmake_file(&self) -> PathBuf {
        self.solder_dir().join("CMakeLists.txt")
    }

    /// `solder/internal-config.json` - derived build configuration.
    pub fn internal_config(&self) -> PathBuf {
        self.solder_dir().join("internal-config.json")
    }

    /// `config.json` - the user configuration.
    pub fn user_config(&self) -> PathBuf {
        self.root.join(USER_CONFIG_FILE)
    }

    /// `.pkg/` - the hidden package repository.
    pub fn pkg_dir(&self) -> PathBuf {
        self.root.join(PKG_DIR_NAME)
    }

    /// `solder/bin/.board` - stamp recording which board the build tree
    /// was configured for.
    pub fn board_stamp(&self) -> PathBuf {
        self.build_dir().join(".board")
    }

    /// Check that the root exists and is a directory.
    pub fn verify_root(&self) -> Result<()> {
        if !self.root.is_dir() {
            bail!(
                "project path does not exist or is not a directory: {}",
                self.root.display()
            );
        }
        Ok(())
    }

    /// Check that this looks like a Solder project (scaffolded build tree).
    pub fn verify_project(&self) -> Result<()> {
        self.verify_root()?;
        if !self.build_dir().is_dir() {
            bail!(
                "not a Solder project: {} (missing {}/bin, run `solder new` or `solder update`)",
                self.root.display(),
                BUILD_DIR_NAME
            );
        }
        Ok(())
    }
}
