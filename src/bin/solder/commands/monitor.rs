//! `solder monitor` command

use anyhow::Result;

use crate::cli::MonitorArgs;
use solder::core::settings::Settings;
use solder::ops::monitor::monitor;
use solder::util::shell::Shell;

pub fn execute(args: MonitorArgs, shell: &Shell) -> Result<()> {
    monitor(args.port, args.baud, &Settings::default(), shell)
}
