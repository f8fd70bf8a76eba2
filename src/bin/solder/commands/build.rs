//! `solder build` command

use anyhow::Result;

use crate::cli::BuildArgs;
use solder::ops::build::{build, BuildOptions};
use solder::util::context::{GlobalContext, ProjectLayout};
use solder::util::shell::Shell;

pub fn execute(args: BuildArgs, shell: &Shell) -> Result<()> {
    let ctx = GlobalContext::new()?;
    let layout = ProjectLayout::new(ctx.project_root(args.path.as_deref()));

    let opts = BuildOptions {
        generator: args.generator,
        cmake: args.cmake,
        make: args.make,
    };

    build(&layout, &opts, shell)
}
