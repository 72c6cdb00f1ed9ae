//! User gestures mapped onto the coordinator and the progress store

use crate::config::Settings;
use crate::coordinator::AudioCoordinator;
use crate::progress::{ProgressError, ProgressStore, ProgressUpdate};
use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, info};

const LOG_TARGET: &str = "reflectobot::ui::gestures";

/// What a button press does: the sound it makes and the setting it changes.
#[derive(Clone)]
pub struct Gestures {
    coordinator: AudioCoordinator,
    progress: Arc<ProgressStore>,
    hover_sound: String,
    click_sound: String,
}

impl Gestures {
    pub fn new(coordinator: AudioCoordinator, progress: Arc<ProgressStore>, settings: &Settings) -> Self {
        Self {
            coordinator,
            progress,
            hover_sound: settings.hover_sound.clone(),
            click_sound: settings.click_sound.clone(),
        }
    }

    pub fn coordinator(&self) -> &AudioCoordinator {
        &self.coordinator
    }

    pub fn progress(&self) -> &ProgressStore {
        &self.progress
    }

    /// Pointer entered a button.
    pub fn hover(&self) {
        self.coordinator.play_hover(self.hover_sound.clone());
    }

    /// Button pressed.
    pub fn click(&self) {
        self.coordinator.play_click(self.click_sound.clone());
    }

    /// Clicks while sounds are on, then flips the voices toggle.
    pub async fn toggle_voices(&self) -> Result<bool, ProgressError> {
        let current = self.progress.load();
        self.click_if_enabled(current.sounds_enabled);

        let enabled = !current.voices_enabled;
        self.progress.update(ProgressUpdate {
            voices_enabled: Some(enabled),
            ..ProgressUpdate::default()
        })?;
        info!(target: LOG_TARGET, "Voices {}.", if enabled { "enabled" } else { "disabled" });
        Ok(enabled)
    }

    /// Clicks while sounds are on, flips the sounds toggle, and clicks again
    /// when sounds were just turned on.
    pub async fn toggle_sounds(&self) -> Result<bool, ProgressError> {
        let current = self.progress.load();
        self.click_if_enabled(current.sounds_enabled);

        let enabled = !current.sounds_enabled;
        self.progress.update(ProgressUpdate {
            sounds_enabled: Some(enabled),
            ..ProgressUpdate::default()
        })?;
        info!(target: LOG_TARGET, "Sounds {}.", if enabled { "enabled" } else { "disabled" });

        self.click_if_enabled(enabled);
        Ok(enabled)
    }

    fn click_if_enabled(&self, sounds_enabled: bool) {
        if sounds_enabled {
            self.click();
        }
    }

    /// Resolves once nothing is playing, or once the coordinator is gone.
    pub async fn wait_until_idle(&self) {
        let mut events = self.coordinator.subscribe();
        loop {
            match self.coordinator.state().await {
                Some(state) if !state.is_idle() => {}
                _ => return,
            }
            match events.recv().await {
                Ok(event) => debug!(target: LOG_TARGET, "Waiting for idle, saw {:?}", event),
                Err(RecvError::Lagged(skipped)) => {
                    debug!(target: LOG_TARGET, "Skipped {} coordinator events.", skipped);
                }
                Err(RecvError::Closed) => return,
            }
        }
    }
}
