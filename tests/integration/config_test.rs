//! Integration tests for configuration management
//!
//! These tests verify that the configuration system works correctly
//! across module boundaries.

use reflectobot::config::Settings;
use reflectobot::progress::{ProgressStore, ProgressUpdate};
use std::error::Error;
use std::path::PathBuf;
use tempfile::tempdir;

#[cfg(test)]
mod config_integration_tests {
    use super::*;

    /// Test complete configuration workflow
    #[test]
    fn test_config_lifecycle() -> Result<(), Box<dyn Error>> {
        let dir = tempdir()?;
        let config_path = dir.path().join("config.json");

        let mut settings = Settings::default();
        settings.alsa_device = "test-audio-device".to_string();
        settings.assets_dir = dir.path().join("audio");
        settings.hover_sound = "hover-soft.mp3".to_string();

        settings.validate()?;
        settings.save(&config_path)?;

        let loaded_settings = Settings::load(&config_path)?;
        assert_eq!(loaded_settings.alsa_device, "test-audio-device");
        assert_eq!(loaded_settings.assets_dir, dir.path().join("audio"));
        assert_eq!(loaded_settings.hover_sound, "hover-soft.mp3");
        assert_eq!(loaded_settings.click_sound, "button-click.mp3");

        let mut updated_settings = loaded_settings;
        updated_settings.alsa_device = "hw:2,0".to_string();
        updated_settings.save(&config_path)?;

        let reloaded_settings = Settings::load(&config_path)?;
        assert_eq!(reloaded_settings.alsa_device, "hw:2,0");

        Ok(())
    }

    /// Test invalid configuration handling
    #[test]
    fn test_invalid_config_validation() {
        let invalid_settings = Settings {
            alsa_device: "".to_string(),
            ..Settings::default()
        };

        let result = invalid_settings.validate();
        assert!(result.is_err());
        if let Err(e) = result {
            assert!(e.to_string().contains("ALSA device cannot be empty"));
        }

        let no_hover = Settings {
            hover_sound: " ".to_string(),
            ..Settings::default()
        };
        assert!(no_hover.validate().is_err());
    }

    /// The configured progress file is where toggles end up.
    #[test]
    fn test_progress_file_from_config() -> Result<(), Box<dyn Error>> {
        let dir = tempdir()?;
        let progress_file: PathBuf = dir.path().join("state").join("progress.json");
        let settings = Settings {
            progress_file: Some(progress_file.clone()),
            ..Settings::default()
        };

        let store = ProgressStore::open(settings.progress_path())?;
        store.update(ProgressUpdate {
            sounds_enabled: Some(false),
            ..ProgressUpdate::default()
        })?;

        assert!(progress_file.exists());
        let reopened = ProgressStore::open(settings.progress_path())?;
        assert!(!reopened.load().sounds_enabled);
        Ok(())
    }
}
