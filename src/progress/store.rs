//! Persisted progress: sound toggles, badges, current challenge

use crate::coordinator::{SettingsSnapshot, SettingsSource};
use crate::progress::badges::{is_known_badge, ALL_BADGES};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::error::Error;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::{debug, info, instrument, warn};

const LOG_TARGET: &str = "reflectobot::progress";

/// Everything the app remembers between sessions.
///
/// Keys are camelCase so session files saved by the web client load unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Progress {
    #[serde(default = "default_true")]
    pub voices_enabled: bool,
    #[serde(default = "default_true")]
    pub sounds_enabled: bool,
    #[serde(default)]
    pub badges: BTreeMap<String, bool>,
    #[serde(default)]
    pub badge_count: usize,
    #[serde(default)]
    pub current_challenge: Option<String>,
    #[serde(default)]
    pub last_updated: u64,
}

fn default_true() -> bool {
    true
}

impl Default for Progress {
    fn default() -> Self {
        Progress {
            voices_enabled: true,
            sounds_enabled: true,
            badges: BTreeMap::new(),
            badge_count: 0,
            current_challenge: None,
            last_updated: 0,
        }
    }
}

impl Progress {
    pub fn is_earned(&self, badge_id: &str) -> bool {
        self.badges.get(badge_id).copied().unwrap_or(false)
    }

    fn recount(&mut self) {
        self.badge_count = self.badges.values().filter(|earned| **earned).count();
    }

    fn touch(&mut self) {
        self.last_updated = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);
    }
}

/// Partial update merged by [`ProgressStore::update`]; `None` leaves a field alone.
#[derive(Debug, Clone, Default)]
pub struct ProgressUpdate {
    pub voices_enabled: Option<bool>,
    pub sounds_enabled: Option<bool>,
    pub current_challenge: Option<String>,
}

/// Error types for progress operations
#[derive(Debug)]
pub enum ProgressError {
    IoError(io::Error),
    ParseError(String),
    UnknownBadge(String),
}

impl From<io::Error> for ProgressError {
    fn from(err: io::Error) -> Self {
        ProgressError::IoError(err)
    }
}

impl From<serde_json::Error> for ProgressError {
    fn from(err: serde_json::Error) -> Self {
        ProgressError::ParseError(err.to_string())
    }
}

impl std::fmt::Display for ProgressError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProgressError::IoError(e) => write!(f, "I/O error: {}", e),
            ProgressError::ParseError(s) => write!(f, "Parse error: {}", s),
            ProgressError::UnknownBadge(id) => write!(f, "Unknown badge: {}", id),
        }
    }
}

impl Error for ProgressError {}

/// Write-through store backed by one JSON file.
pub struct ProgressStore {
    path: PathBuf,
    state: Mutex<Progress>,
}

impl ProgressStore {
    /// Opens the store at `path`, starting from defaults when the file is absent.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, ProgressError> {
        let path = path.into();
        let progress = if path.exists() {
            let content = fs::read_to_string(&path)?;
            let mut progress: Progress = serde_json::from_str(&content)?;
            progress.recount();
            progress
        } else {
            debug!(target: LOG_TARGET, "No progress file at {}, using defaults.", path.display());
            Progress::default()
        };
        Ok(Self {
            path,
            state: Mutex::new(progress),
        })
    }

    /// Default progress file location.
    pub fn default_path() -> PathBuf {
        let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
        home.join(".config").join("reflectobot").join("progress.json")
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn state(&self) -> MutexGuard<'_, Progress> {
        // A panic mid-update leaves plain data behind; keep serving it.
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Returns a copy of the current progress.
    pub fn load(&self) -> Progress {
        self.state().clone()
    }

    /// Merges `update` and persists.
    #[instrument(skip(self))]
    pub fn update(&self, update: ProgressUpdate) -> Result<Progress, ProgressError> {
        if let Some(challenge) = update.current_challenge.as_deref() {
            if !is_known_badge(challenge) {
                return Err(ProgressError::UnknownBadge(challenge.to_string()));
            }
        }
        let mut state = self.state();
        if let Some(voices) = update.voices_enabled {
            state.voices_enabled = voices;
        }
        if let Some(sounds) = update.sounds_enabled {
            state.sounds_enabled = sounds;
        }
        if let Some(challenge) = update.current_challenge {
            state.current_challenge = Some(challenge);
        }
        state.recount();
        state.touch();
        self.persist(&state)?;
        Ok(state.clone())
    }

    /// Marks a badge earned.
    pub fn award_badge(&self, badge_id: &str) -> Result<Progress, ProgressError> {
        if !is_known_badge(badge_id) {
            return Err(ProgressError::UnknownBadge(badge_id.to_string()));
        }
        let mut state = self.state();
        state.badges.insert(badge_id.to_string(), true);
        state.recount();
        state.touch();
        self.persist(&state)?;
        info!(target: LOG_TARGET, "Badge '{}' earned ({} of {}).", badge_id, state.badge_count, ALL_BADGES.len());
        Ok(state.clone())
    }

    /// Clears one earned badge. `Ok(false)` when it was not earned.
    pub fn reset_badge(&self, badge_id: &str) -> Result<bool, ProgressError> {
        if !is_known_badge(badge_id) {
            warn!(target: LOG_TARGET, "Reset requested for unknown badge '{}'.", badge_id);
            return Err(ProgressError::UnknownBadge(badge_id.to_string()));
        }
        let mut state = self.state();
        if !state.is_earned(badge_id) {
            return Ok(false);
        }
        state.badges.remove(badge_id);
        state.recount();
        state.touch();
        self.persist(&state)?;
        info!(target: LOG_TARGET, "Badge '{}' reset.", badge_id);
        Ok(true)
    }

    /// Jumps straight to the challenge that awards `badge_id`.
    pub fn skip_to_challenge(&self, badge_id: &str) -> Result<Progress, ProgressError> {
        self.update(ProgressUpdate {
            current_challenge: Some(badge_id.to_string()),
            ..ProgressUpdate::default()
        })
    }

    /// Writes the current progress as a session file.
    pub fn export_to(&self, path: &Path) -> Result<(), ProgressError> {
        let state = self.state();
        let content = serde_json::to_string_pretty(&*state)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, content)?;
        info!(target: LOG_TARGET, "Session exported to {}.", path.display());
        Ok(())
    }

    /// Replaces the current progress with a session file.
    /// Nothing changes if the file fails to parse or names an unknown badge.
    pub fn import_from(&self, path: &Path) -> Result<Progress, ProgressError> {
        let content = fs::read_to_string(path)?;
        let mut imported: Progress = serde_json::from_str(&content)?;
        if let Some(unknown) = imported.badges.keys().find(|id| !is_known_badge(id)) {
            return Err(ProgressError::UnknownBadge(unknown.clone()));
        }
        if let Some(challenge) = imported.current_challenge.as_deref() {
            if !is_known_badge(challenge) {
                return Err(ProgressError::UnknownBadge(challenge.to_string()));
            }
        }
        imported.recount();

        let mut state = self.state();
        *state = imported;
        state.touch();
        self.persist(&state)?;
        info!(target: LOG_TARGET, "Session imported from {}.", path.display());
        Ok(state.clone())
    }

    /// Deletes the progress file and starts over.
    pub fn erase(&self) -> Result<(), ProgressError> {
        let mut state = self.state();
        if self.path.exists() {
            fs::remove_file(&self.path)?;
        }
        *state = Progress::default();
        info!(target: LOG_TARGET, "All progress erased.");
        Ok(())
    }

    fn persist(&self, progress: &Progress) -> Result<(), ProgressError> {
        let content = serde_json::to_string_pretty(progress)?;
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, content)?;
        Ok(())
    }
}

impl SettingsSource for ProgressStore {
    fn snapshot(&self) -> SettingsSnapshot {
        let state = self.state();
        SettingsSnapshot {
            voices_enabled: state.voices_enabled,
            sounds_enabled: state.sounds_enabled,
        }
    }
}
