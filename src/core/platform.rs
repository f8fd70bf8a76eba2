//! Compiler-flag extraction from toolchain `platform.txt` files.
//!
//! The Cosa toolchain describes its compiler invocations in the Arduino
//! `platform.txt` format. Only the flag lines are consumed here; they may
//! reference board properties with `{{build.mcu}}`-style placeholders.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::Result;

use crate::core::board::BoardProperties;
use crate::core::settings::Settings;
use crate::templates;
use crate::util::fs as sfs;

/// C compiler flags for a board, filled from the platform definitions.
pub fn c_flags(
    props: &BoardProperties,
    platform_path: &Path,
    settings: &Settings,
) -> Result<String> {
    flags(props, platform_path, "c", settings)
}

/// C++ compiler flags for a board, filled from the platform definitions.
pub fn cxx_flags(
    props: &BoardProperties,
    platform_path: &Path,
    settings: &Settings,
) -> Result<String> {
    flags(props, platform_path, "cpp", settings)
}

fn flags(
    props: &BoardProperties,
    platform_path: &Path,
    identifier: &str,
    settings: &Settings,
) -> Result<String> {
    if !platform_path.exists() {
        // No toolchain installed: fall back to the flags every AVR build
        // needs so that scaffolding still produces a usable tree.
        tracing::warn!(
            "platform definitions not found at {}, using baseline AVR flags",
            platform_path.display()
        );
        return Ok(format!("-mmcu={} -DF_CPU={}", props.mcu, props.f_cpu));
    }

    let contents = sfs::read_to_string(platform_path)?;
    let raw = raw_flags(&contents, identifier, settings.include_extra_flags);

    let mut data = BTreeMap::new();
    data.insert("build.mcu", props.mcu.clone());
    data.insert("build.f_cpu", props.f_cpu.clone());
    data.insert("runtime.ide.version", settings.arduino_version.clone());

    Ok(templates::fill(&raw, &data).trim().to_string())
}

/// Gather the raw flag string for one compiler identifier.
fn raw_flags(contents: &str, identifier: &str, include_extra: bool) -> String {
    let flags_key = format!("compiler.{}.flags=", identifier);
    let extra_key = format!("compiler.{}.extra_flags=", identifier);
    let mut raw = String::new();

    for line in contents.lines() {
        if let Some(value) = line.strip_prefix(&flags_key) {
            raw.push_str(value.trim());
        } else if include_extra {
            if let Some(value) = line.strip_prefix(&extra_key) {
                raw.push(' ');
                raw.push_str(value.trim());
            }
        }
    }

    raw
}
