//! Implementation of `solder new` and `solder update`.
//!
//! `new` lays out a fresh project tree; `update` refreshes the generated
//! files of an existing one without clobbering user sources or `config.json`.

use std::collections::BTreeMap;

use anyhow::{bail, Context, Result};

use crate::core::board::BoardRegistry;
use crate::core::config::{self, InternalConfig, UserConfig};
use crate::core::settings::Settings;
use crate::templates::{self, assets, cmake};
use crate::util::context::{GlobalContext, ProjectLayout};
use crate::util::fs as sfs;
use crate::util::shell::{Shell, Status};

/// Options for scaffolding operations.
#[derive(Debug, Clone, Default)]
pub struct ScaffoldOptions {
    /// Board to configure; required for `new`, optional for `update`.
    pub board: Option<String>,

    /// IDE integration (`clion` is the only recognized value).
    pub ide: Option<String>,
}

/// Create a Solder project from scratch.
pub fn create_project(
    layout: &ProjectLayout,
    ctx: &GlobalContext,
    opts: &ScaffoldOptions,
    registry: &BoardRegistry,
    settings: &Settings,
    shell: &Shell,
) -> Result<()> {
    layout.verify_root()?;

    let board = opts
        .board
        .as_deref()
        .context("a board is needed to create a project; pass --board")?;
    registry.require(board)?;

    // Never clobber an existing project.
    if layout.src_dir().exists() || layout.lib_dir().exists() {
        bail!(
            "there is already a src and/or lib folder in {}; use `solder update` instead",
            layout.root().display()
        );
    }

    create_folders(layout, true)?;

    sfs::write_string(&layout.user_config(), assets::USER_CONFIG)?;
    sfs::write_string(&layout.src_dir().join("main.cpp"), assets::MAIN_CPP)?;

    let user = config::fill_user_config(layout, Some(board), None, opts.ide.as_deref(), settings)?;
    let internal = config::fill_internal_config(layout, ctx, &user, registry, settings)?;
    cmake::write(layout, &internal)?;

    write_ide_files(layout, &user, &internal, true)?;

    shell.status(Status::Created, layout.root().display());
    shell.note("src    ->  all source files go here");
    shell.note("lib    ->  all libraries go here");
    shell.note("solder ->  generated build files (do not modify)");
    Ok(())
}

/// Update an existing Solder project in place.
pub fn update_project(
    layout: &ProjectLayout,
    ctx: &GlobalContext,
    opts: &ScaffoldOptions,
    registry: &BoardRegistry,
    settings: &Settings,
    shell: &Shell,
) -> Result<()> {
    layout.verify_root()?;

    create_folders(layout, false)?;

    // Recopy only what is missing; config.json belongs to the user.
    if !layout.user_config().exists() {
        sfs::write_string(&layout.user_config(), assets::USER_CONFIG)?;
    }

    let user = config::fill_user_config(
        layout,
        opts.board.as_deref(),
        None,
        opts.ide.as_deref(),
        settings,
    )?;
    if user.board.is_empty() {
        bail!("no board configured for this project; pass --board");
    }

    let internal = config::fill_internal_config(layout, ctx, &user, registry, settings)?;
    cmake::write(layout, &internal)?;

    write_ide_files(layout, &user, &internal, false)?;

    shell.status(Status::Updated, layout.root().display());
    Ok(())
}

/// Create the project folders; `fresh` wipes whatever was there.
fn create_folders(layout: &ProjectLayout, fresh: bool) -> Result<()> {
    let dirs = [
        layout.src_dir(),
        layout.lib_dir(),
        layout.solder_dir(),
        layout.build_dir(),
    ];
    for dir in dirs {
        if fresh {
            sfs::recreate_dir(&dir)?;
        } else {
            sfs::ensure_dir(&dir)?;
        }
    }
    Ok(())
}

/// Write `.gitignore` and the CLion integration files.
fn write_ide_files(
    layout: &ProjectLayout,
    user: &UserConfig,
    internal: &InternalConfig,
    fresh: bool,
) -> Result<()> {
    let gitignore = layout.root().join(".gitignore");
    let root_cmake = layout.root().join("CMakeLists.txt");
    let private_cmake = layout.root().join("CMakeListsPrivate.txt");

    if user.ide == "clion" {
        let mut data = BTreeMap::new();
        data.insert("cmake-version", internal.cmake_version.clone());
        data.insert("project-name", internal.project_name.clone());
        data.insert("solder-home", internal.solder_home.clone());
        data.insert("board", internal.board.clone());
        data.insert("current-path", internal.current_path.clone());

        // The private file is regenerated every time; the root file and
        // .gitignore only when missing (or on a fresh create).
        sfs::write_string(
            &private_cmake,
            &templates::fill(assets::CLION_CMAKE_PRIVATE, &data),
        )?;
        if fresh || !root_cmake.exists() {
            sfs::write_string(&root_cmake, &templates::fill(assets::CLION_CMAKE, &data))?;
        }
        if fresh || !gitignore.exists() {
            sfs::write_string(&gitignore, assets::GITIGNORE_CLION)?;
        }
    } else if fresh || !gitignore.exists() {
        sfs::write_string(&gitignore, assets::GITIGNORE_GENERAL)?;
    }

    Ok(())
}
