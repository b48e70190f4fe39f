//! Configuration management for Tapstreak

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::difficulty::{Difficulty, WindowCurve};
use crate::error::{ConfigError, Result};
use crate::types::MAX_BOARD_SIZE;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub board: BoardConfig,
    pub difficulty: Difficulty,
    pub storage: StorageConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoardConfig {
    /// Side length of the square board, in board units
    pub size: u32,

    /// Seconds counted down before each run
    pub countdown_length: u32,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            size: 100,
            countdown_length: 3,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub path: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: "~/.local/share/tapstreak/highscore.json".to_string(),
        }
    }
}

impl StorageConfig {
    /// The store path with `~` expanded
    pub fn resolved_path(&self) -> PathBuf {
        PathBuf::from(shellexpand::tilde(&self.path).to_string())
    }
}

impl Config {
    /// Load configuration from the default location
    ///
    /// A missing file yields the defaults; an unreadable or invalid file is
    /// an error.
    pub fn load() -> Result<Self> {
        let config_path = resolve_config_path()?;
        if !config_path.exists() {
            debug!(path = %config_path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }
        Self::load_from_path(&config_path)
    }

    /// Load configuration from a specific path
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::ReadError)?;
        let config: Config = toml::from_str(&content).map_err(ConfigError::ParseError)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values that would make the game unplayable
    pub fn validate(&self) -> Result<()> {
        if self.board.size == 0 || self.board.size > MAX_BOARD_SIZE {
            return Err(ConfigError::Invalid("board.size".to_string()).into());
        }
        if self.board.countdown_length == 0 {
            return Err(ConfigError::Invalid("board.countdown_length".to_string()).into());
        }

        let size = &self.difficulty.size;
        for (key, divisor) in [
            ("difficulty.size.divisor", size.divisor),
            ("difficulty.size.floor_divisor", size.floor_divisor),
            ("difficulty.size.streak_divisor", size.streak_divisor),
        ] {
            if divisor == 0 {
                return Err(ConfigError::Invalid(key.to_string()).into());
            }
        }

        validate_window("difficulty.delay", &self.difficulty.delay)?;
        validate_window("difficulty.duration", &self.difficulty.duration)?;

        Ok(())
    }
}

fn validate_window(key: &str, window: &WindowCurve) -> Result<()> {
    if window.floor_ms == 0 {
        return Err(ConfigError::Invalid(format!("{}.floor_ms", key)).into());
    }
    if window.start_ms < window.floor_ms {
        return Err(ConfigError::Invalid(format!("{}.start_ms", key)).into());
    }
    Ok(())
}

/// Resolve the configuration file path under the XDG config directory
pub fn resolve_config_path() -> Result<PathBuf> {
    if let Ok(path) = std::env::var("TAPSTREAK_CONFIG") {
        return Ok(PathBuf::from(shellexpand::tilde(&path).to_string()));
    }

    let config_dir = dirs::config_dir()
        .ok_or_else(|| ConfigError::MissingField("config directory".to_string()))?;

    Ok(config_dir.join("tapstreak").join("config.toml"))
}
