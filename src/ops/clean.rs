//! Implementation of `solder clean`: wipe the build tree.

use anyhow::Result;

use crate::util::context::ProjectLayout;
use crate::util::fs as sfs;
use crate::util::shell::{Shell, Status};

/// Delete everything inside `solder/bin`, keeping the directory itself.
pub fn clean(layout: &ProjectLayout, shell: &Shell) -> Result<()> {
    layout.verify_project()?;

    shell.status(
        Status::Cleaning,
        sfs::relative_path(layout.root(), &layout.build_dir()).display(),
    );
    sfs::remove_dir_contents(&layout.build_dir())?;
    shell.status(Status::Finished, "build files removed");
    Ok(())
}
