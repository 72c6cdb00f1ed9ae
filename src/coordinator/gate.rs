/// The two user toggles every playback request is gated on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SettingsSnapshot {
    pub voices_enabled: bool,
    pub sounds_enabled: bool,
}

impl Default for SettingsSnapshot {
    fn default() -> Self {
        Self {
            voices_enabled: true,
            sounds_enabled: true,
        }
    }
}

/// Synchronous accessor for the current toggles.
///
/// Called at the start of every playback request; the coordinator never caches the result.
pub trait SettingsSource: Send + Sync {
    fn snapshot(&self) -> SettingsSnapshot;
}

impl<F> SettingsSource for F
where
    F: Fn() -> SettingsSnapshot + Send + Sync,
{
    fn snapshot(&self) -> SettingsSnapshot {
        self()
    }
}
