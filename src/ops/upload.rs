//! Implementation of `solder upload`: pick a port, refresh the build for it,
//! and drive the generated `upload` target.

use anyhow::{bail, Context, Result};

use crate::core::board::BoardRegistry;
use crate::core::config::{self, UserConfig};
use crate::core::settings::Settings;
use crate::ops::build::{self, BuildOptions};
use crate::templates::cmake;
use crate::util::context::{GlobalContext, ProjectLayout};
use crate::util::process::{self, ProcessBuilder};
use crate::util::serial;
use crate::util::shell::{Shell, Status};

/// Options for an upload.
#[derive(Debug, Clone, Default)]
pub struct UploadOptions {
    /// Upload port; config value or auto-detection when not given.
    pub port: Option<String>,
}

/// Upload the firmware to the selected port.
pub fn upload(
    layout: &ProjectLayout,
    ctx: &GlobalContext,
    opts: &UploadOptions,
    registry: &BoardRegistry,
    settings: &Settings,
    shell: &Shell,
) -> Result<()> {
    layout.verify_project()?;
    if !layout.build_dir().join("Makefile").exists() {
        bail!("no Makefile in the build tree, build the project first");
    }

    let user = UserConfig::load(layout)?;
    let port = choose_port(&user, opts.port.as_deref(), shell)?;

    // Regenerate the build files against the chosen port and rebuild
    // quietly so the upload target is current. The user config itself is
    // not touched.
    let mut for_build = user.clone();
    for_build.port = port.clone();
    let internal = config::fill_internal_config(layout, ctx, &for_build, registry, settings)?;
    cmake::write(layout, &internal)?;
    build::build(layout, &BuildOptions::default(), &Shell::quiet())?;

    shell.status(Status::Uploading, &port);
    let make = process::find_make()
        .context("make does not exist, please install it or make sure it is in your PATH")?;
    let status = ProcessBuilder::new(&make)
        .arg("upload")
        .cwd(layout.build_dir())
        .status()?;
    if !status.success() {
        bail!("upload failed, make exited with error code {:?}", status.code());
    }

    shell.status(Status::Uploaded, format!("firmware flashed via {}", port));
    Ok(())
}

/// Port precedence: explicit flag, then a validated config value, then
/// auto-detection.
fn choose_port(user: &UserConfig, flag: Option<&str>, shell: &Shell) -> Result<String> {
    if let Some(port) = flag {
        shell.note(format!("using the port provided: {}", port));
        return Ok(port.to_string());
    }

    let configured = user.port.trim();
    if !configured.is_empty() && !configured.eq_ignore_ascii_case("none") {
        if !serial::device_names()?.iter().any(|d| d == configured) {
            bail!(
                "configured port {} does not have a valid device connected to it",
                configured
            );
        }
        shell.note(format!("using the port from config.json: {}", configured));
        return Ok(configured.to_string());
    }

    serial::autodetect(shell)
}
