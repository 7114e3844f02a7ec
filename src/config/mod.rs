//! Configuration management for Kitabak.
//!
//! Configuration is read from `~/.config/kitabak/config.toml` at startup.
//! If the file doesn't exist, a default configuration with comments is created.

pub mod colors;
pub mod keybindings;

pub use colors::ColorConfig;
pub use keybindings::KeybindingConfig;

use serde::Deserialize;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::domain::{DEFAULT_GOAL_MINUTES, MAX_GOAL_MINUTES};

/// Main configuration struct.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub reading: ReadingConfig,
    pub colors: ColorConfig,
    pub keybindings: KeybindingConfig,
}

/// Reading session defaults.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ReadingConfig {
    /// User id for stats when no other sign-in is available
    pub user: String,
    /// Goal given to new users, in minutes
    pub default_goal_minutes: u32,
    /// SQLite database path (default: data dir)
    pub database: Option<PathBuf>,
    /// TUI redraw interval in milliseconds
    pub tick_rate_ms: u64,
    /// Open the book in the system viewer when a session starts
    pub open_book: bool,
}

impl Default for ReadingConfig {
    fn default() -> Self {
        Self {
            user: "local".to_string(),
            default_goal_minutes: DEFAULT_GOAL_MINUTES,
            database: None,
            tick_rate_ms: 250,
            open_book: true,
        }
    }
}

impl ReadingConfig {
    pub fn tick_rate(&self) -> Duration {
        Duration::from_millis(self.tick_rate_ms)
    }
}

impl Config {
    /// Load configuration from the default path.
    ///
    /// If the config file doesn't exist, creates a default one with comments.
    /// If the config file exists but is invalid, returns an error.
    /// Missing fields in the config file will use default values.
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::default_config_path()?;
        Self::load_from(&config_path)
    }

    pub fn load_from(config_path: &Path) -> Result<Self, ConfigError> {
        if !config_path.exists() {
            Self::create_default_config(config_path)?;
            return Ok(Self::default());
        }

        let content = fs::read_to_string(config_path).map_err(|e| ConfigError::Io {
            path: config_path.to_path_buf(),
            source: e,
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: config_path.to_path_buf(),
            source: e,
        })?;
        config.validate()?;

        Ok(config)
    }

    /// Get the default config file path: `~/.config/kitabak/config.toml`
    pub fn default_config_path() -> Result<PathBuf, ConfigError> {
        let config_dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        Ok(config_dir.join("kitabak").join("config.toml"))
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let goal = self.reading.default_goal_minutes;
        if goal == 0 || goal > MAX_GOAL_MINUTES {
            return Err(ConfigError::Invalid(format!(
                "reading.default_goal_minutes must be between 1 and {}, got {}",
                MAX_GOAL_MINUTES, goal
            )));
        }
        if self.reading.user.trim().is_empty() {
            return Err(ConfigError::Invalid("reading.user must not be empty".into()));
        }
        if self.reading.tick_rate_ms == 0 {
            return Err(ConfigError::Invalid(
                "reading.tick_rate_ms must be greater than zero".into(),
            ));
        }
        Ok(())
    }

    /// Create a default config file with comments.
    fn create_default_config(path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| ConfigError::Io {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        let mut file = fs::File::create(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        file.write_all(Self::default_config_content().as_bytes())
            .map_err(|e| ConfigError::Io {
                path: path.to_path_buf(),
                source: e,
            })?;

        Ok(())
    }

    /// Generate the default config file content with comments.
    fn default_config_content() -> String {
        r##"# Kitabak Configuration

[reading]
# Whose reading stats are tracked
user = "local"

# Daily goal for new users, in minutes
default_goal_minutes = 5

# SQLite database location (default: <data dir>/kitabak/kitabak.db)
# database = "/path/to/kitabak.db"

# Redraw interval of the reading screen in milliseconds
tick_rate_ms = 250

# Open the book in the system viewer when a reading session starts
open_book = true

# Colors can be named (Cyan, DarkGray, LightGreen, ...) or hex ("#RRGGBB", "#RGB")
[colors]
border = "Cyan"
gauge = "Green"
gauge_complete = "LightGreen"
paused = "Yellow"
status_fg = "White"
status_bg = "DarkGray"

# Keys: single characters, Enter, Esc, Space, Tab, F1-F12, with Ctrl+/Shift+/Alt+
[keybindings]
quit = ["q", "Ctrl+c"]
set_goal = ["g"]
open_book = ["o"]
toggle_pause = ["p", "Space"]
refresh = ["r"]
"##
        .to_string()
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Could not determine config directory")]
    NoConfigDir,

    #[error("Failed to read/write config file at {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}
