#![allow(clippy::module_name_repetitions)]

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::columns::HeaderNames;
use crate::error::ConfigError;
use crate::options::{DEFAULT_HIGHLIGHT_COLOR, DEFAULT_WRAP_WIDTH};

/// File name looked up in the working directory.
pub const PROJECT_CONFIG_FILE: &str = "ticketgraph.toml";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub render: RenderConfig,
    #[serde(default)]
    pub keys: KeysConfig,
    #[serde(default)]
    pub columns: HeaderNames,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderConfig {
    #[serde(default)]
    pub hide_summary: bool,
    #[serde(default = "default_true")]
    pub hide_orphans: bool,
    #[serde(default = "default_highlight_color")]
    pub highlight_color: String,
    #[serde(default = "default_wrap_width")]
    pub wrap_width: u32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            hide_summary: false,
            hide_orphans: default_true(),
            highlight_color: default_highlight_color(),
            wrap_width: default_wrap_width(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct KeysConfig {
    #[serde(default)]
    pub hide: Vec<String>,
    #[serde(default)]
    pub show: Vec<String>,
    #[serde(default)]
    pub highlight: Vec<String>,
}

/// Read and parse one config file.
///
/// # Errors
///
/// Returns [`ConfigError::Read`] if the file can't be read and
/// [`ConfigError::Parse`] if it isn't valid TOML for [`Config`].
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    toml::from_str::<Config>(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Find and load the config for a run.
///
/// An explicit path must load. Otherwise `ticketgraph.toml` in `working_dir`
/// is used if present, then `ticketgraph/config.toml` in the user config
/// directory, then built-in defaults. Returns the path that was loaded, if any.
///
/// # Errors
///
/// Propagates [`load_config`] failures for whichever file was selected.
pub fn resolve_config(
    explicit: Option<&Path>,
    working_dir: &Path,
) -> Result<(Config, Option<PathBuf>), ConfigError> {
    if let Some(path) = explicit {
        return Ok((load_config(path)?, Some(path.to_path_buf())));
    }

    let candidates = [
        Some(working_dir.join(PROJECT_CONFIG_FILE)),
        dirs::config_dir().map(|dir| dir.join("ticketgraph/config.toml")),
    ];

    for path in candidates.into_iter().flatten() {
        if path.is_file() {
            tracing::debug!(path = %path.display(), "loading config");
            return Ok((load_config(&path)?, Some(path)));
        }
    }

    Ok((Config::default(), None))
}

const fn default_true() -> bool {
    true
}

fn default_highlight_color() -> String {
    DEFAULT_HIGHLIGHT_COLOR.to_string()
}

const fn default_wrap_width() -> u32 {
    DEFAULT_WRAP_WIDTH
}
