//! Generation of the project build file (`solder/CMakeLists.txt`).
//!
//! The build file is regenerated from the internal config on every create,
//! update and upload: a cross-compiling AVR toolchain header, one static (or
//! header-only) library per directory under `lib/` - linked packages appear
//! here through their symlinks - and the firmware target with its hex
//! conversion and `upload` target.

use std::path::Path;

use anyhow::Result;

use crate::core::config::InternalConfig;
use crate::util::context::ProjectLayout;
use crate::util::fs as sfs;

const SRC_EXTENSIONS: &[&str] = &["cpp", "c", "cc"];

/// Generate and write the build file.
pub fn write(layout: &ProjectLayout, config: &InternalConfig) -> Result<()> {
    let contents = generate(layout, config)?;
    sfs::write_string(&layout.cmake_file(), &contents)
}

/// Generate the build file contents.
pub fn generate(layout: &ProjectLayout, config: &InternalConfig) -> Result<String> {
    let mut out = String::new();

    out.push_str("# Generated by solder - do not edit.\n");
    out.push_str(&format!(
        "cmake_minimum_required(VERSION {})\n\n",
        config.cmake_version
    ));

    // Cross toolchain must be configured before project().
    out.push_str("set(CMAKE_SYSTEM_NAME Generic)\n");
    out.push_str("set(CMAKE_SYSTEM_PROCESSOR avr)\n");
    out.push_str("set(CMAKE_C_COMPILER avr-gcc)\n");
    out.push_str("set(CMAKE_CXX_COMPILER avr-g++)\n");
    out.push_str("set(CMAKE_TRY_COMPILE_TARGET_TYPE STATIC_LIBRARY)\n\n");

    out.push_str(&format!("project({} C CXX)\n\n", config.project_name));

    out.push_str(&format!("set(CMAKE_C_FLAGS \"{}\")\n", config.cmake_c_flags));
    out.push_str(&format!(
        "set(CMAKE_CXX_FLAGS \"{}\")\n",
        config.cmake_cxx_flags
    ));
    out.push_str(&format!(
        "set(CMAKE_CXX_STANDARD {})\n\n",
        config.cmake_cxx_standard
    ));

    out.push_str(&definitions_block(&config.custom_definitions));
    out.push('\n');

    let libraries = library_blocks(layout)?;
    out.push_str(&libraries.text);
    out.push('\n');

    out.push_str(&firmware_block(layout, config, &libraries.names));

    Ok(out)
}

/// `add_definitions` lines for the user's extra build flags.
fn definitions_block(custom_definitions: &str) -> String {
    let definitions: Vec<&str> = custom_definitions.split_whitespace().collect();
    if definitions.is_empty() {
        return "# no user definitions\n".to_string();
    }

    let mut out = String::new();
    for definition in definitions {
        out.push_str(&format!("add_definitions({})\n", definition));
    }
    out
}

struct LibraryBlocks {
    text: String,
    names: Vec<String>,
}

/// One library target per directory under `lib/`.
///
/// A directory with a `src/` subdirectory builds from there; a directory
/// with no sources at all becomes a header-only interface target.
fn library_blocks(layout: &ProjectLayout) -> Result<LibraryBlocks> {
    let lib_dir = layout.lib_dir();
    if !lib_dir.is_dir() {
        return Ok(LibraryBlocks {
            text: "# no libraries to include at the moment\n".to_string(),
            names: Vec::new(),
        });
    }

    let mut text = String::new();
    let mut names = Vec::new();

    for lib in sfs::dirs_in(&lib_dir)? {
        let Some(name) = lib.file_name().map(|n| n.to_string_lossy().into_owned()) else {
            continue;
        };

        let src_root = if lib.join("src").is_dir() {
            lib.join("src")
        } else {
            lib.clone()
        };
        let sources = sfs::files_with_extensions(&src_root, SRC_EXTENSIONS);

        if sources.is_empty() {
            text.push_str(&format!("add_library({} INTERFACE)\n", name));
            text.push_str(&format!(
                "target_include_directories({} INTERFACE {})\n\n",
                name,
                quote(&src_root)
            ));
        } else {
            text.push_str(&format!(
                "add_library({} STATIC {})\n",
                name,
                quote_join(&sources)
            ));
            text.push_str(&format!(
                "target_include_directories({} PUBLIC {})\n\n",
                name,
                quote(&src_root)
            ));
        }
        names.push(name);
    }

    if names.is_empty() {
        text = "# no libraries to include at the moment\n".to_string();
    }

    Ok(LibraryBlocks { text, names })
}

/// The firmware executable, its hex conversion, and the `upload` target.
fn firmware_block(layout: &ProjectLayout, config: &InternalConfig, libs: &[String]) -> String {
    let name = &config.project_name;
    let sources = sfs::files_with_extensions(&layout.src_dir(), SRC_EXTENSIONS);

    let mut out = String::new();
    out.push_str(&format!(
        "add_executable({}.elf {})\n",
        name,
        quote_join(&sources)
    ));
    out.push_str(&format!(
        "target_include_directories({}.elf PRIVATE {})\n",
        name,
        quote(&layout.src_dir())
    ));
    if !libs.is_empty() {
        out.push_str(&format!(
            "target_link_libraries({}.elf {})\n",
            name,
            libs.join(" ")
        ));
    }
    out.push_str(&format!(
        "add_custom_command(TARGET {name}.elf POST_BUILD\n    \
         COMMAND avr-objcopy -O ihex -R .eeprom {name}.elf {name}.hex)\n",
        name = name
    ));

    let port = if config.port.is_empty() {
        "/dev/ttyACM0"
    } else {
        &config.port
    };
    out.push_str(&format!(
        "add_custom_target(upload\n    \
         COMMAND avrdude -p {mcu} -c arduino -P {port} -U flash:w:{name}.hex\n    \
         DEPENDS {name}.elf)\n",
        mcu = config.mcu,
        port = port,
        name = name
    ));

    out
}

fn quote(path: &Path) -> String {
    format!("\"{}\"", path.display())
}

/// Join paths, each surrounded by quotes, for CMake.
fn quote_join(paths: &[std::path::PathBuf]) -> String {
    paths
        .iter()
        .map(|p| quote(p))
        .collect::<Vec<_>>()
        .join(" ")
}
