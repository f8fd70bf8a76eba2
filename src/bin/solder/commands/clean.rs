//! `solder clean` command

use anyhow::Result;

use crate::cli::CleanArgs;
use solder::ops::clean::clean;
use solder::util::context::{GlobalContext, ProjectLayout};
use solder::util::shell::Shell;

pub fn execute(args: CleanArgs, shell: &Shell) -> Result<()> {
    let ctx = GlobalContext::new()?;
    let layout = ProjectLayout::new(ctx.project_root(args.path.as_deref()));

    clean(&layout, shell)
}
