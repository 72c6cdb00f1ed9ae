//! The seam between the coordinator and whatever actually makes noise.

use crate::audio::error::AudioError;
use std::fmt;
use tokio::sync::oneshot;

/// How a single sound resource ended: `Ok` on natural end of stream,
/// `Err` when it could not start or failed mid-playback.
pub type PlaybackOutcome = Result<(), AudioError>;

/// Identifier the coordinator assigns to every resource it creates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SoundId(pub u64);

impl fmt::Display for SoundId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Which gesture a sound belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SoundKind {
    /// Robot speech or greeting (primary slot).
    Speech,
    /// Button/badge hover (hover slot).
    Hover,
    /// Button click (untracked).
    Click,
    /// Robot name (untracked, voices toggle).
    Name,
}

impl fmt::Display for SoundKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            SoundKind::Speech => "speech",
            SoundKind::Hover => "hover",
            SoundKind::Click => "click",
            SoundKind::Name => "name",
        };
        f.write_str(label)
    }
}

/// Everything a backend needs to create and start one resource.
#[derive(Debug, Clone, PartialEq)]
pub struct SoundRequest {
    pub id: SoundId,
    pub kind: SoundKind,
    pub src: String,
    /// Linear gain in `0.0..=1.0`.
    pub volume: f32,
}

/// Stops a running resource: pause, rewind, release.
pub trait SoundControl: Send {
    fn halt(&mut self);
}

/// A started resource: its control plus the channel its outcome arrives on.
pub struct SoundHandle {
    control: Box<dyn SoundControl>,
    completion: oneshot::Receiver<PlaybackOutcome>,
}

impl SoundHandle {
    pub fn new(control: Box<dyn SoundControl>, completion: oneshot::Receiver<PlaybackOutcome>) -> Self {
        Self { control, completion }
    }

    /// Halts the resource. Its completion is discarded.
    pub fn halt(mut self) {
        self.control.halt();
    }

    /// Waits for the outcome. A dropped sender counts as a failure.
    pub async fn completion(&mut self) -> PlaybackOutcome {
        match (&mut self.completion).await {
            Ok(outcome) => outcome,
            Err(_) => Err(AudioError::Interrupted),
        }
    }
}

impl fmt::Debug for SoundHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SoundHandle").finish_non_exhaustive()
    }
}

/// Creates and starts sound resources.
///
/// `start` must not block and never fails synchronously: a resource that
/// cannot be opened reports `Err` through its completion channel instead.
pub trait PlaybackBackend: Send + Sync {
    fn start(&self, request: SoundRequest) -> SoundHandle;
}
