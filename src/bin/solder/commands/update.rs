//! `solder update` command

use anyhow::Result;

use crate::cli::UpdateArgs;
use solder::core::board::BoardRegistry;
use solder::core::settings::Settings;
use solder::ops::scaffold::{update_project, ScaffoldOptions};
use solder::util::context::{GlobalContext, ProjectLayout};
use solder::util::shell::Shell;

pub fn execute(args: UpdateArgs, shell: &Shell) -> Result<()> {
    let ctx = GlobalContext::new()?;
    let layout = ProjectLayout::new(ctx.project_root(args.path.as_deref()));

    let opts = ScaffoldOptions {
        board: args.board,
        ide: args.ide,
    };

    update_project(
        &layout,
        &ctx,
        &opts,
        &BoardRegistry::builtin(),
        &Settings::default(),
        shell,
    )
}
