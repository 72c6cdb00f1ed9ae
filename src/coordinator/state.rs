use crate::audio::{SoundId, SoundKind};
use crate::coordinator::gate::SettingsSnapshot;
use std::fmt;
use tokio::sync::oneshot;

/// Receives `true` when robot speech starts and `false` when it ends.
pub type SpeakingCallback = Box<dyn FnMut(bool) + Send + 'static>;
/// Receives every pose the robot should show.
pub type PoseCallback = Box<dyn FnMut(&str) + Send + 'static>;

/// Callbacks and poses attached to one speech request (or one stop request).
#[derive(Default)]
pub struct SpeechOptions {
    pub on_speaking_change: Option<SpeakingCallback>,
    pub on_pose_change: Option<PoseCallback>,
    /// Poses cycled while speaking. Ignored by stop requests.
    pub pose_sequence: Vec<String>,
    pub idle_pose: Option<String>,
}

impl SpeechOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_speaking_change(mut self, callback: impl FnMut(bool) + Send + 'static) -> Self {
        self.on_speaking_change = Some(Box::new(callback));
        self
    }

    pub fn on_pose_change(mut self, callback: impl FnMut(&str) + Send + 'static) -> Self {
        self.on_pose_change = Some(Box::new(callback));
        self
    }

    pub fn poses<I, S>(mut self, poses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.pose_sequence = poses.into_iter().map(Into::into).collect();
        self
    }

    pub fn idle_pose(mut self, pose: impl Into<String>) -> Self {
        self.idle_pose = Some(pose.into());
        self
    }
}

impl fmt::Debug for SpeechOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpeechOptions")
            .field("on_speaking_change", &self.on_speaking_change.is_some())
            .field("on_pose_change", &self.on_pose_change.is_some())
            .field("pose_sequence", &self.pose_sequence)
            .field("idle_pose", &self.idle_pose)
            .finish()
    }
}

/// Untracked one-shot sounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransientKind {
    /// Gated on sounds; never preempts anything.
    Click,
    /// Gated on voices; stops the hover sound first.
    Name,
}

impl From<TransientKind> for SoundKind {
    fn from(kind: TransientKind) -> Self {
        match kind {
            TransientKind::Click => SoundKind::Click,
            TransientKind::Name => SoundKind::Name,
        }
    }
}

/// Commands that can be sent to the coordinator task.
///
/// Play commands carry the toggles as they were when the request was made.
#[derive(Debug)]
pub enum CoordinatorCommand {
    PlayPrimary {
        src: String,
        options: SpeechOptions,
        settings: SettingsSnapshot,
    },
    StopPrimary {
        options: SpeechOptions,
    },
    PlayHover {
        src: String,
        settings: SettingsSnapshot,
    },
    StopHover,
    PlayTransient {
        src: String,
        kind: TransientKind,
        settings: SettingsSnapshot,
    },
    GetState(oneshot::Sender<CoordinatorState>),
    Shutdown,
}

/// Point-in-time view of the coordinator.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CoordinatorState {
    /// Source of the active speech, if any.
    pub primary: Option<String>,
    /// Source of the active hover sound, if any.
    pub hover: Option<String>,
    pub animating: bool,
    pub pose_index: Option<usize>,
    /// Click/name sounds still playing.
    pub transients: usize,
}

impl CoordinatorState {
    pub fn is_idle(&self) -> bool {
        self.primary.is_none() && self.hover.is_none() && self.transients == 0
    }
}

/// Updates broadcast by the coordinator task.
#[derive(Debug, Clone, PartialEq)]
pub enum CoordinatorEvent {
    Started { id: SoundId, kind: SoundKind, src: String },
    Finished { id: SoundId, kind: SoundKind, src: String },
    Failed { id: SoundId, kind: SoundKind, src: String, reason: String },
    Halted { id: SoundId, kind: SoundKind, src: String },
    /// A request was dropped because its toggle is off.
    Suppressed { kind: SoundKind, src: String },
    PoseChanged { pose: String },
}
