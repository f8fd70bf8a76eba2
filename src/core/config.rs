//! Project configuration files.
//!
//! Two JSON files drive a project: `config.json` at the root is owned by the
//! user (board, port, IDE, extra flags), and `solder/internal-config.json` is
//! derived from it plus the board registry and platform definitions. Both are
//! filled with a read-modify-write cycle so user edits survive updates.

use serde::{Deserialize, Serialize};

use crate::core::board::BoardRegistry;
use crate::core::platform;
use crate::core::settings::Settings;
use crate::util::context::{GlobalContext, ProjectLayout};
use crate::util::fs as sfs;

use anyhow::{Context, Result};

/// The user-owned `config.json`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct UserConfig {
    pub board: String,
    pub port: String,
    pub ide: String,
    pub framework: String,
    pub build_flags: String,
    pub module_flags: String,
    pub cosa_libraries: String,
}

/// The derived `solder/internal-config.json` consumed by build-file
/// generation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct InternalConfig {
    pub project_name: String,
    pub board: String,
    pub mcu: String,
    pub port: String,
    pub ide: String,
    pub solder_home: String,
    pub current_path: String,
    pub cmake_version: String,
    pub cmake_c_flags: String,
    pub cmake_cxx_flags: String,
    pub cmake_cxx_standard: String,
    pub custom_definitions: String,
    pub module_definitions: String,
    pub cosa_libraries: String,
}

impl UserConfig {
    /// Read a user config.
    pub fn load(layout: &ProjectLayout) -> Result<Self> {
        let path = layout.user_config();
        let contents = sfs::read_to_string(&path).with_context(|| {
            "project user configuration does not exist, recreate or update the project"
        })?;
        serde_json::from_str(&contents)
            .with_context(|| format!("failed to parse {}", path.display()))
    }

    /// Write a user config.
    pub fn save(&self, layout: &ProjectLayout) -> Result<()> {
        let contents = serde_json::to_string_pretty(self)?;
        sfs::write_string(&layout.user_config(), &contents)
    }
}

impl InternalConfig {
    /// Read an internal config.
    pub fn load(layout: &ProjectLayout) -> Result<Self> {
        let path = layout.internal_config();
        let contents = sfs::read_to_string(&path)?;
        serde_json::from_str(&contents)
            .with_context(|| format!("failed to parse {}", path.display()))
    }

    /// Write an internal config.
    pub fn save(&self, layout: &ProjectLayout) -> Result<()> {
        let contents = serde_json::to_string_pretty(self)?;
        sfs::write_string(&layout.internal_config(), &contents)
    }
}

/// Apply command-line overrides to the user config and persist it.
///
/// `None` flags keep whatever the file already holds, so `solder update`
/// without `--board` leaves the configured board alone.
pub fn fill_user_config(
    layout: &ProjectLayout,
    board: Option<&str>,
    port: Option<&str>,
    ide: Option<&str>,
    settings: &Settings,
) -> Result<UserConfig> {
    let mut config = UserConfig::load(layout)?;

    if let Some(board) = board {
        config.board = board.to_string();
    }
    if let Some(port) = port {
        config.port = port.to_string();
    }
    if let Some(ide) = ide {
        config.ide = ide.to_string();
    }
    config.framework = settings.framework.clone();

    config.save(layout)?;
    Ok(config)
}

/// Derive and persist the internal config from the user config, board
/// registry and platform definitions.
pub fn fill_internal_config(
    layout: &ProjectLayout,
    ctx: &GlobalContext,
    user: &UserConfig,
    registry: &BoardRegistry,
    settings: &Settings,
) -> Result<InternalConfig> {
    let props = registry.require(&user.board)?;
    let platform_path = ctx.platform_file();

    let project_name = layout
        .root()
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "firmware".to_string());

    let config = InternalConfig {
        project_name,
        board: user.board.clone(),
        mcu: props.mcu.clone(),
        port: user.port.clone(),
        ide: user.ide.clone(),
        solder_home: ctx.home().to_string_lossy().into_owned(),
        current_path: layout.root().to_string_lossy().into_owned(),
        cmake_version: settings.cmake_version.clone(),
        cmake_c_flags: platform::c_flags(props, &platform_path, settings)?,
        cmake_cxx_flags: platform::cxx_flags(props, &platform_path, settings)?,
        cmake_cxx_standard: settings.cxx_standard.clone(),
        custom_definitions: user.build_flags.clone(),
        module_definitions: user.module_flags.clone(),
        cosa_libraries: user.cosa_libraries.clone(),
    };

    config.save(layout)?;
    Ok(config)
}
