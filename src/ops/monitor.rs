//! A minimal serial monitor: pump incoming bytes to stdout until the user
//! interrupts.

use std::io::{self, Read, Write};
use std::time::Duration;

use anyhow::{Context, Result};

use crate::core::settings::Settings;
use crate::util::serial;
use crate::util::shell::{Shell, Status};

/// Open a serial monitor on the given (or auto-detected) port.
pub fn monitor(
    port: Option<String>,
    baud: Option<u32>,
    settings: &Settings,
    shell: &Shell,
) -> Result<()> {
    let port = match port {
        Some(port) => port,
        None => serial::autodetect(shell)?,
    };
    let baud = baud.unwrap_or(settings.default_baud);

    shell.status(
        Status::Info,
        format!("serial monitor on {} @ {} (Ctrl-C to exit)", port, baud),
    );

    let mut connection = serialport::new(&port, baud)
        .timeout(Duration::from_millis(200))
        .open()
        .with_context(|| format!("could not open serial port {}", port))?;

    let mut stdout = io::stdout();
    let mut buf = [0u8; 512];
    loop {
        match connection.read(&mut buf) {
            Ok(0) => {}
            Ok(n) => {
                stdout.write_all(&buf[..n])?;
                stdout.flush()?;
            }
            Err(err) if err.kind() == io::ErrorKind::TimedOut => {}
            Err(err) if err.kind() == io::ErrorKind::Interrupted => {}
            Err(err) => {
                return Err(err).with_context(|| format!("serial connection to {} lost", port))
            }
        }
    }
}
