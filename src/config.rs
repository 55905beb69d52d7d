use std::{
    path::{Path, PathBuf},
    time::Duration,
};

use directories::ProjectDirs;
use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::{load_record_from_file, write_json_atomic, Result, ShelfError, ShortcutKeys};

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("", "", "shelfmark")
}

fn default_data_dir() -> PathBuf {
    project_dirs()
        .map(|dirs| dirs.data_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from(".shelfmark"))
}

fn default_export_dir() -> PathBuf {
    default_data_dir().join("exports")
}

fn default_search_debounce_ms() -> u64 {
    300
}

fn default_search_limit() -> usize {
    20
}

/// Application configuration settings.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Config {
    /// Directory where links and folders are stored
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Default directory for exported settings files
    #[serde(default = "default_export_dir")]
    pub export_dir: PathBuf,

    /// Quiet interval before an interactive search runs
    #[serde(default = "default_search_debounce_ms")]
    pub search_debounce_ms: u64,

    /// Maximum number of search results shown (0 shows all)
    #[serde(default = "default_search_limit")]
    pub search_limit: usize,

    /// Shortcut that opens the search popup
    #[serde(default)]
    pub search_shortcut: ShortcutKeys,

    /// Overrides the Chrome profile bookmarks file used by `import --chrome`
    #[serde(default)]
    pub chrome_bookmarks_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            export_dir: default_export_dir(),
            search_debounce_ms: default_search_debounce_ms(),
            search_limit: default_search_limit(),
            search_shortcut: ShortcutKeys::default(),
            chrome_bookmarks_file: None,
        }
    }
}

impl Config {
    /// Where the configuration file lives when `--config` is not given.
    pub fn default_path() -> PathBuf {
        project_dirs()
            .map(|dirs| dirs.config_dir().join("config.json"))
            .unwrap_or_else(|| PathBuf::from(".shelfmark").join("config.json"))
    }

    /// Reads the config at `path`, falling back to defaults when it does not exist.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let config: Config = load_record_from_file(path).map_err(|e| ShelfError::ConfigError {
            message: format!("failed to read {}: {}", path.display(), e),
        })?;
        info!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        write_json_atomic(path, self)?;
        info!("Saved configuration to {}", path.display());
        Ok(())
    }

    pub fn search_debounce(&self) -> Duration {
        Duration::from_millis(self.search_debounce_ms)
    }

    /// Applies a `key=value` assignment from the command line.
    pub fn set(&mut self, assignment: &str) -> Result<()> {
        let (key, value) = assignment
            .split_once('=')
            .map(|(k, v)| (k.trim(), v.trim()))
            .ok_or_else(|| ShelfError::ConfigError {
                message: format!("expected key=value, got '{}'", assignment),
            })?;

        let invalid = |e: &dyn std::fmt::Display| ShelfError::ConfigError {
            message: format!("invalid value for {}: {}", key, e),
        };

        match key {
            "data_dir" => self.data_dir = PathBuf::from(value),
            "export_dir" => self.export_dir = PathBuf::from(value),
            "search_debounce_ms" => {
                self.search_debounce_ms = value.parse().map_err(|e| invalid(&e))?
            }
            "search_limit" => self.search_limit = value.parse().map_err(|e| invalid(&e))?,
            "search_shortcut" => {
                let parsed: ShortcutKeys = value.parse()?;
                self.search_shortcut = ShortcutKeys::record(&parsed.to_event())?;
            }
            "chrome_bookmarks_file" => {
                self.chrome_bookmarks_file = if value.is_empty() {
                    None
                } else {
                    Some(PathBuf::from(value))
                }
            }
            _ => {
                return Err(ShelfError::ConfigError {
                    message: format!("unknown setting: {}", key),
                })
            }
        }

        debug!("Config setting {} updated", key);
        Ok(())
    }
}
