//! Implementation of `solder build`: cmake configure + make, with a full
//! rebuild whenever the configured board changes.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};

use crate::core::config::UserConfig;
use crate::util::context::ProjectLayout;
use crate::util::fs as sfs;
use crate::util::process::{self, ProcessBuilder};
use crate::util::shell::{Shell, Status};

/// Options for a build.
#[derive(Debug, Clone, Default)]
pub struct BuildOptions {
    /// CMake generator; picked from the make flavor when not given.
    pub generator: Option<String>,

    /// Path to the cmake binary.
    pub cmake: Option<PathBuf>,

    /// Path to the make binary.
    pub make: Option<PathBuf>,
}

/// Build the project in `solder/bin`.
pub fn build(layout: &ProjectLayout, opts: &BuildOptions, shell: &Shell) -> Result<()> {
    layout.verify_project()?;

    let cmake = opts
        .cmake
        .clone()
        .or_else(process::find_cmake)
        .context("cmake does not exist, please install it or make sure it is in your PATH")?;
    let make = opts
        .make
        .clone()
        .or_else(process::find_make)
        .context("make does not exist, please install it or make sure it is in your PATH")?;
    let generator = opts
        .generator
        .clone()
        .unwrap_or_else(|| process::generator_for(&make).to_string());

    let user = UserConfig::load(layout)?;
    if user.board.is_empty() {
        bail!("no board configured for this project; run `solder update --board <board>`");
    }

    // A different board than the build tree was configured for forces a
    // clean configure.
    if board_changed(layout, &user.board) {
        shell.status(Status::Cleaning, "board changed, full rebuild triggered");
        sfs::remove_dir_contents(&layout.build_dir())?;
    }

    shell.status(
        Status::Building,
        format!("{} with {}", user.board, generator),
    );

    let status = ProcessBuilder::new(&cmake)
        .arg("-G")
        .arg(&generator)
        .arg("..")
        .cwd(layout.build_dir())
        .status()?;
    if !status.success() {
        bail!("cmake exited with error code {:?}", status.code());
    }

    let status = ProcessBuilder::new(&make).cwd(layout.build_dir()).status()?;
    if !status.success() {
        bail!("make exited with error code {:?}", status.code());
    }

    sfs::write_string(&layout.board_stamp(), &user.board)?;
    shell.status(Status::Finished, "project successfully built");
    Ok(())
}

/// Whether the build tree was configured for a different board.
fn board_changed(layout: &ProjectLayout, board: &str) -> bool {
    match std::fs::read_to_string(layout.board_stamp()) {
        Ok(stamp) => stamp.trim() != board,
        Err(_) => false,
    }
}
