//! `solder upload` command

use anyhow::Result;

use crate::cli::UploadArgs;
use solder::core::board::BoardRegistry;
use solder::core::settings::Settings;
use solder::ops::upload::{upload, UploadOptions};
use solder::util::context::{GlobalContext, ProjectLayout};
use solder::util::shell::Shell;

pub fn execute(args: UploadArgs, shell: &Shell) -> Result<()> {
    let ctx = GlobalContext::new()?;
    let layout = ProjectLayout::new(ctx.project_root(args.path.as_deref()));

    let opts = UploadOptions { port: args.port };

    upload(
        &layout,
        &ctx,
        &opts,
        &BoardRegistry::builtin(),
        &Settings::default(),
        shell,
    )
}
