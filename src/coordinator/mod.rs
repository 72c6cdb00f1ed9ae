//! Audio coordinator: exclusive speech and hover slots, untracked click/name
//! sounds, and the pose animation that runs while the robot speaks.
//!
//! All slot and timer state lives in one task; the presentation layer talks to
//! it through the cloneable [`AudioCoordinator`] handle.

use crate::audio::{PlaybackBackend, SoundId, SoundKind, SoundRequest};
use std::fmt;
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, instrument, trace, warn};

mod animation;
mod command_handler;
mod gate;
mod run_loop;
mod slot;
mod state;

pub use animation::POSE_INTERVAL;
pub use gate::{SettingsSnapshot, SettingsSource};
pub use state::{
    CoordinatorCommand, CoordinatorEvent, CoordinatorState, PoseCallback, SpeakingCallback, SpeechOptions,
    TransientKind,
};

use animation::PoseAnimation;
use slot::{ActiveSound, PlaybackSlot};

const COORDINATOR_LOG_TARGET: &str = "reflectobot::coordinator";

/// Volume for robot speech.
pub const PRIMARY_VOLUME: f32 = 1.0;
/// Volume for hover, click and name sounds.
pub const REDUCED_VOLUME: f32 = 0.7;
/// Default capacity of the event broadcast channel.
pub const DEFAULT_EVENT_CAPACITY: usize = 64;

/// Callbacks and animation belonging to the sound in the primary slot.
struct SpeechSession {
    on_speaking_change: Option<SpeakingCallback>,
    on_pose_change: Option<PoseCallback>,
    idle_pose: Option<String>,
    animation: Option<PoseAnimation>,
}

/// Owns every playback slot. Run it with [`Coordinator::run`] on its own task.
pub struct Coordinator {
    backend: Arc<dyn PlaybackBackend>,

    command_rx: mpsc::UnboundedReceiver<CoordinatorCommand>,
    event_tx: broadcast::Sender<CoordinatorEvent>,

    primary: PlaybackSlot,
    // Present iff `primary` is occupied.
    speech: Option<SpeechSession>,
    hover: PlaybackSlot,
    transient_sounds: Vec<ActiveSound>,
    next_sound_id: u64,
}

impl Coordinator {
    /// Creates the coordinator and the handle used to drive it.
    pub fn new(
        backend: Arc<dyn PlaybackBackend>,
        settings: Arc<dyn SettingsSource>,
        event_capacity: usize,
    ) -> (Self, AudioCoordinator) {
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let (event_tx, _) = broadcast::channel(event_capacity);

        let coordinator = Coordinator {
            backend,
            command_rx,
            event_tx: event_tx.clone(),
            primary: PlaybackSlot::default(),
            speech: None,
            hover: PlaybackSlot::default(),
            transient_sounds: Vec::new(),
            next_sound_id: 1,
        };
        let handle = AudioCoordinator {
            command_tx,
            event_tx,
            settings,
        };
        (coordinator, handle)
    }

    /// Processes commands and playback events until shutdown or until every handle is dropped.
    #[instrument(skip(self))]
    pub async fn run(mut self) {
        run_loop::run_coordinator_loop(&mut self).await;
    }

    fn broadcast(&self, event: CoordinatorEvent) {
        trace!(target: COORDINATOR_LOG_TARGET, "Broadcasting event: {:?}", event);
        if self.event_tx.send(event).is_err() {
            trace!(target: COORDINATOR_LOG_TARGET, "No active listeners for coordinator event.");
        }
    }

    /// Creates and starts a new resource. Callers empty the target slot first.
    fn start_sound(&mut self, kind: SoundKind, src: String, volume: f32) -> ActiveSound {
        let id = SoundId(self.next_sound_id);
        self.next_sound_id += 1;

        debug!(target: COORDINATOR_LOG_TARGET, %id, %kind, "Starting '{}' at volume {:.2}", src, volume);
        let handle = self.backend.start(SoundRequest {
            id,
            kind,
            src: src.clone(),
            volume,
        });
        self.broadcast(CoordinatorEvent::Started {
            id,
            kind,
            src: src.clone(),
        });
        ActiveSound::new(id, kind, src, handle)
    }

    fn snapshot_state(&self) -> CoordinatorState {
        let animation = self.speech.as_ref().and_then(|s| s.animation.as_ref());
        CoordinatorState {
            primary: self.primary.src().map(str::to_string),
            hover: self.hover.src().map(str::to_string),
            animating: animation.is_some(),
            pose_index: animation.map(PoseAnimation::index),
            transients: self.transient_sounds.len(),
        }
    }
}

/// Cloneable handle to a running [`Coordinator`].
///
/// Every operation is a non-blocking send; the coordinator applies them in order.
/// Play requests read the toggles here, when the gesture happens.
#[derive(Clone)]
pub struct AudioCoordinator {
    command_tx: mpsc::UnboundedSender<CoordinatorCommand>,
    event_tx: broadcast::Sender<CoordinatorEvent>,
    settings: Arc<dyn SettingsSource>,
}

impl fmt::Debug for AudioCoordinator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AudioCoordinator")
            .field("closed", &self.command_tx.is_closed())
            .field("settings", &self.settings.snapshot())
            .finish()
    }
}

impl AudioCoordinator {
    /// Creates a coordinator and spawns it on the current Tokio runtime.
    pub fn spawn(
        backend: Arc<dyn PlaybackBackend>,
        settings: Arc<dyn SettingsSource>,
    ) -> (Self, JoinHandle<()>) {
        let (coordinator, handle) = Coordinator::new(backend, settings, DEFAULT_EVENT_CAPACITY);
        let task = tokio::spawn(coordinator.run());
        (handle, task)
    }

    fn send(&self, command: CoordinatorCommand) {
        if let Err(e) = self.command_tx.send(command) {
            warn!(target: COORDINATOR_LOG_TARGET, "Coordinator is gone, dropping command: {:?}", e.0);
        }
    }

    /// Plays robot speech, preempting hover and any previous speech. No-op while voices are off.
    pub fn play_primary(&self, src: impl Into<String>, options: SpeechOptions) {
        self.send(CoordinatorCommand::PlayPrimary {
            src: src.into(),
            options,
            settings: self.settings.snapshot(),
        });
    }

    /// Stops speech and its animation. Safe to call when nothing is playing.
    pub fn stop_primary(&self, options: SpeechOptions) {
        self.send(CoordinatorCommand::StopPrimary { options });
    }

    /// Plays a hover sound, replacing the previous one. No-op while sounds are off.
    pub fn play_hover(&self, src: impl Into<String>) {
        self.send(CoordinatorCommand::PlayHover {
            src: src.into(),
            settings: self.settings.snapshot(),
        });
    }

    pub fn stop_hover(&self) {
        self.send(CoordinatorCommand::StopHover);
    }

    /// Plays an untracked click or name sound.
    pub fn play_transient(&self, src: impl Into<String>, kind: TransientKind) {
        self.send(CoordinatorCommand::PlayTransient {
            src: src.into(),
            kind,
            settings: self.settings.snapshot(),
        });
    }

    pub fn play_click(&self, src: impl Into<String>) {
        self.play_transient(src, TransientKind::Click);
    }

    pub fn play_name(&self, src: impl Into<String>) {
        self.play_transient(src, TransientKind::Name);
    }

    /// Returns the coordinator's state after every previously sent command has
    /// been applied, or `None` once it has shut down.
    pub async fn state(&self) -> Option<CoordinatorState> {
        let (tx, rx) = oneshot::channel();
        self.command_tx.send(CoordinatorCommand::GetState(tx)).ok()?;
        rx.await.ok()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<CoordinatorEvent> {
        self.event_tx.subscribe()
    }

    /// Halts every sound and stops the coordinator task.
    pub fn shutdown(&self) {
        self.send(CoordinatorCommand::Shutdown);
    }
}
