//! `solder boards` command

use anyhow::Result;

use solder::core::board::BoardRegistry;
use solder::util::shell::Shell;

pub fn execute(shell: &Shell) -> Result<()> {
    let registry = BoardRegistry::builtin();

    shell.note("boards compatible with this project:");
    for (key, props) in registry.iter() {
        println!("{:15} --->\t{}", key, props.name);
    }

    Ok(())
}
