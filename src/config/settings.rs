//! Application settings and configuration management

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Application settings
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Settings {
    /// ALSA device to use for audio playback
    #[serde(default = "default_alsa_device")]
    pub alsa_device: String,
    /// Directory sound sources are resolved against
    #[serde(default = "default_assets_dir")]
    pub assets_dir: PathBuf,
    /// Progress file (toggles and badges); the default location when unset
    #[serde(default)]
    pub progress_file: Option<PathBuf>,
    /// Sound played when hovering a button
    #[serde(default = "default_hover_sound")]
    pub hover_sound: String,
    /// Sound played when clicking a button
    #[serde(default = "default_click_sound")]
    pub click_sound: String,
}

fn default_alsa_device() -> String {
    "default".to_string()
}

fn default_assets_dir() -> PathBuf {
    PathBuf::from("assets")
}

fn default_hover_sound() -> String {
    "buttons.mp3".to_string()
}

fn default_click_sound() -> String {
    "button-click.mp3".to_string()
}

/// Error types for configuration operations
#[derive(Debug)]
pub enum ConfigError {
    IoError(io::Error),
    ParseError(String),
    ValidationError(String),
}

impl From<io::Error> for ConfigError {
    fn from(err: io::Error) -> Self {
        ConfigError::IoError(err)
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(err: serde_json::Error) -> Self {
        ConfigError::ParseError(err.to_string())
    }
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::IoError(e) => write!(f, "I/O error: {}", e),
            ConfigError::ParseError(s) => write!(f, "Parse error: {}", s),
            ConfigError::ValidationError(s) => write!(f, "Validation error: {}", s),
        }
    }
}

impl Error for ConfigError {}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            alsa_device: default_alsa_device(),
            assets_dir: default_assets_dir(),
            progress_file: None,
            hover_sound: default_hover_sound(),
            click_sound: default_click_sound(),
        }
    }
}

impl Settings {
    /// Load settings from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)?;
        let settings: Settings = serde_json::from_str(&content)?;
        Ok(settings)
    }

    /// Save settings to a file
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let content = serde_json::to_string_pretty(&self)?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        fs::write(path, content)?;
        Ok(())
    }

    /// Get the default config file path
    pub fn default_path() -> PathBuf {
        let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
        home.join(".config").join("reflectobot").join("config.json")
    }

    /// Progress file to open: the configured one or the default location.
    pub fn progress_path(&self) -> PathBuf {
        self.progress_file
            .clone()
            .unwrap_or_else(crate::progress::ProgressStore::default_path)
    }

    /// Validate settings
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.alsa_device.trim().is_empty() {
            return Err(ConfigError::ValidationError("ALSA device cannot be empty".to_string()));
        }

        if self.assets_dir.as_os_str().is_empty() {
            return Err(ConfigError::ValidationError("Assets directory cannot be empty".to_string()));
        }

        if self.hover_sound.trim().is_empty() || self.click_sound.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "Hover and click sounds must be set".to_string(),
            ));
        }

        Ok(())
    }
}
