//! `solder package` command

use anyhow::Result;

use crate::cli::{PackageArgs, PackageCommands, PackageSpecArgs};
use solder::pkg::{InstallOutcome, PackageManager, RemoveOutcome};
use solder::util::context::{GlobalContext, ProjectLayout};
use solder::util::shell::{Shell, Status};

pub fn execute(args: PackageArgs, shell: &Shell) -> Result<()> {
    let ctx = GlobalContext::new()?;

    match args.command {
        PackageCommands::Install(args) => install(&ctx, args, shell),
        PackageCommands::Remove(args) => remove(&ctx, args, shell),
        PackageCommands::Update(args) => {
            let layout = ProjectLayout::new(ctx.project_root(args.path.as_deref()));
            layout.verify_root()?;
            let pm = PackageManager::open(layout.root(), shell)?;
            let updated = pm.update_all()?;
            if updated == 0 {
                shell.note("all packages are up to date");
            }
            Ok(())
        }
    }
}

fn install(ctx: &GlobalContext, args: PackageSpecArgs, shell: &Shell) -> Result<()> {
    let layout = ProjectLayout::new(ctx.project_root(args.path.as_deref()));
    layout.verify_root()?;
    let pm = PackageManager::open(layout.root(), shell)?;

    let results = pm.install_many(&split_specs(&args.specs))?;

    let installed = results
        .iter()
        .filter(|(_, o)| matches!(o, InstallOutcome::Installed | InstallOutcome::Relinked))
        .count();
    let failed = results
        .iter()
        .filter(|(_, o)| matches!(o, InstallOutcome::Failed(_)))
        .count();

    shell.status(
        Status::Finished,
        format!("{} installed, {} failed", installed, failed),
    );
    Ok(())
}

fn remove(ctx: &GlobalContext, args: PackageSpecArgs, shell: &Shell) -> Result<()> {
    let layout = ProjectLayout::new(ctx.project_root(args.path.as_deref()));
    layout.verify_root()?;
    let pm = PackageManager::open(layout.root(), shell)?;

    let results = pm.remove_many(&split_specs(&args.specs))?;

    let removed = results
        .iter()
        .filter(|(_, o)| matches!(o, RemoveOutcome::Removed | RemoveOutcome::Unlinked))
        .count();
    let failed = results.len() - removed;

    shell.status(
        Status::Finished,
        format!("{} removed, {} failed", removed, failed),
    );
    Ok(())
}

/// Spec arguments may arrive as separate words or as one `", "`-separated
/// string; normalize to one spec per element.
fn split_specs(specs: &[String]) -> Vec<String> {
    specs
        .join(", ")
        .split(", ")
        .map(str::to_string)
        .filter(|s| !s.is_empty())
        .collect()
}
