//! The board registry.
//!
//! Boards are keyed by a short identifier (`uno`, `mega2560`, ...) and carry
//! the properties the build needs: display name, MCU, clock frequency and the
//! preprocessor id. The registry ships embedded in the binary; it can also be
//! regenerated from an upstream `boards.txt` file.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::LazyLock;

use anyhow::{bail, Context, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::util::fs as sfs;

/// Properties of one supported board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardProperties {
    /// Human-readable board name.
    pub name: String,

    /// Target MCU (e.g. `atmega328p`).
    pub mcu: String,

    /// CPU frequency (e.g. `16000000L`).
    pub f_cpu: String,

    /// Board identifier define (e.g. `AVR_UNO`).
    pub id: String,
}

/// All known boards, keyed by identifier.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BoardRegistry {
    boards: BTreeMap<String, BoardProperties>,
}

static BOARDS_TXT_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?P<board>[\w\-]+)\.(?P<key>[\w.]+)=(?P<value>.*)$").unwrap());

impl BoardRegistry {
    /// The registry embedded in the binary.
    pub fn builtin() -> Self {
        serde_json::from_str(include_str!("boards.json"))
            .expect("embedded board registry is valid")
    }

    /// Load a registry from a JSON file.
    pub fn from_json(path: &Path) -> Result<Self> {
        let contents = sfs::read_to_string(path)?;
        serde_json::from_str(&contents)
            .with_context(|| format!("failed to parse board registry: {}", path.display()))
    }

    /// Convert an upstream `boards.txt` file into a registry.
    ///
    /// Only the properties the build needs are kept: `name`, `build.mcu`,
    /// `build.f_cpu` and `build.board`.
    pub fn from_boards_txt(path: &Path) -> Result<Self> {
        let contents = sfs::read_to_string(path)?;
        let mut partial: BTreeMap<String, BTreeMap<String, String>> = BTreeMap::new();

        for line in contents.lines() {
            let Some(caps) = BOARDS_TXT_LINE.captures(line.trim()) else {
                continue;
            };
            let board = caps["board"].to_string();
            let key = caps["key"].rsplit('.').next().unwrap_or_default();
            if let "name" | "mcu" | "f_cpu" | "board" = key {
                partial
                    .entry(board)
                    .or_default()
                    .insert(key.to_string(), caps["value"].trim().to_string());
            }
        }

        let mut boards = BTreeMap::new();
        for (board, props) in partial {
            let complete = ["name", "mcu", "f_cpu", "board"]
                .iter()
                .all(|k| props.contains_key(*k));
            if !complete {
                tracing::debug!("skipping incomplete board entry {}", board);
                continue;
            }
            boards.insert(
                board,
                BoardProperties {
                    name: props["name"].clone(),
                    mcu: props["mcu"].clone(),
                    f_cpu: props["f_cpu"].clone(),
                    id: props["board"].clone(),
                },
            );
        }

        Ok(BoardRegistry { boards })
    }

    /// Write the registry as JSON.
    pub fn to_json(&self, path: &Path) -> Result<()> {
        let contents = serde_json::to_string_pretty(&self)?;
        sfs::write_string(path, &contents)
    }

    /// Look up a board by identifier.
    pub fn get(&self, board: &str) -> Option<&BoardProperties> {
        self.boards.get(board)
    }

    /// Look up a board, failing with guidance when unknown.
    pub fn require(&self, board: &str) -> Result<&BoardProperties> {
        match self.get(board) {
            Some(props) => Ok(props),
            None => bail!(
                "unknown board `{}`; run `solder boards` to see the supported boards",
                board
            ),
        }
    }

    /// Board identifiers, sorted.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.boards.keys().map(|k| k.as_str())
    }

    /// Identifier/properties pairs, sorted by identifier.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &BoardProperties)> {
        self.boards.iter().map(|(k, v)| (k.as_str(), v))
    }
}
