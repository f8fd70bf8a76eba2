//! `solder new` command

use anyhow::Result;

use crate::cli::NewArgs;
use solder::core::board::BoardRegistry;
use solder::core::settings::Settings;
use solder::ops::scaffold::{create_project, ScaffoldOptions};
use solder::util::context::{GlobalContext, ProjectLayout};
use solder::util::fs::ensure_dir;
use solder::util::shell::Shell;

pub fn execute(args: NewArgs, shell: &Shell) -> Result<()> {
    let ctx = GlobalContext::new()?;
    let root = ctx.project_root(args.path.as_deref());
    ensure_dir(&root)?;
    let layout = ProjectLayout::new(root);

    let opts = ScaffoldOptions {
        board: Some(args.board),
        ide: args.ide,
    };

    create_project(
        &layout,
        &ctx,
        &opts,
        &BoardRegistry::builtin(),
        &Settings::default(),
        shell,
    )
}
