use super::{
    Coordinator, CoordinatorEvent, PoseAnimation, PoseCallback, SettingsSnapshot, SpeechOptions, SpeechSession,
    TransientKind, COORDINATOR_LOG_TARGET, PRIMARY_VOLUME, REDUCED_VOLUME,
};
use crate::audio::{PlaybackOutcome, SoundId, SoundKind};
use tracing::{debug, info, instrument, warn};

/// Emits the completion event for a sound and logs failures. Never escalates.
fn report_outcome(coordinator: &Coordinator, sound: (SoundId, SoundKind, String), outcome: PlaybackOutcome) {
    let (id, kind, src) = sound;
    match outcome {
        Ok(()) => {
            debug!(target: COORDINATOR_LOG_TARGET, %id, %kind, "Finished '{}'", src);
            coordinator.broadcast(CoordinatorEvent::Finished { id, kind, src });
        }
        Err(e) => {
            warn!(target: COORDINATOR_LOG_TARGET, %id, %kind, "Failed to play {} audio '{}': {}", kind, src, e);
            coordinator.broadcast(CoordinatorEvent::Failed {
                id,
                kind,
                src,
                reason: e.to_string(),
            });
        }
    }
}

/// Halts the hover slot occupant, if any.
fn halt_hover(coordinator: &mut Coordinator) {
    if let Some((id, kind, src)) = coordinator.hover.halt() {
        debug!(target: COORDINATOR_LOG_TARGET, %id, "Hover sound '{}' halted.", src);
        coordinator.broadcast(CoordinatorEvent::Halted { id, kind, src });
    }
}

/// Halts the primary occupant and discards its session without invoking its
/// callbacks; the animation timer goes with it.
fn halt_primary(coordinator: &mut Coordinator) {
    coordinator.speech = None;
    if let Some((id, kind, src)) = coordinator.primary.halt() {
        debug!(target: COORDINATOR_LOG_TARGET, %id, "Speech '{}' halted.", src);
        coordinator.broadcast(CoordinatorEvent::Halted { id, kind, src });
    }
}

fn apply_pose(coordinator: &Coordinator, on_pose_change: &mut Option<PoseCallback>, pose: &str) {
    if let Some(callback) = on_pose_change.as_mut() {
        callback(pose);
        coordinator.broadcast(CoordinatorEvent::PoseChanged { pose: pose.to_string() });
    }
}

#[instrument(skip(coordinator, options))]
pub fn handle_play_primary(
    coordinator: &mut Coordinator,
    src: String,
    options: SpeechOptions,
    settings: SettingsSnapshot,
) {
    if !settings.voices_enabled {
        debug!(target: COORDINATOR_LOG_TARGET, "Voices disabled, not playing '{}'.", src);
        coordinator.broadcast(CoordinatorEvent::Suppressed { kind: SoundKind::Speech, src });
        return;
    }

    halt_hover(coordinator);
    halt_primary(coordinator);

    let sound = coordinator.start_sound(SoundKind::Speech, src, PRIMARY_VOLUME);
    info!(target: COORDINATOR_LOG_TARGET, id = %sound.id, "Robot speaking: '{}'", sound.src);
    coordinator.primary.occupy(sound);

    let SpeechOptions {
        mut on_speaking_change,
        mut on_pose_change,
        pose_sequence,
        idle_pose,
    } = options;

    if let Some(callback) = on_speaking_change.as_mut() {
        callback(true);
    }

    let animation = if on_pose_change.is_some() {
        PoseAnimation::start(pose_sequence)
    } else {
        None
    };
    if let Some(animation) = animation.as_ref() {
        debug!(target: COORDINATOR_LOG_TARGET, "Starting pose animation at '{}'.", animation.current());
        apply_pose(coordinator, &mut on_pose_change, animation.current());
    }

    coordinator.speech = Some(SpeechSession {
        on_speaking_change,
        on_pose_change,
        idle_pose,
        animation,
    });
}

#[instrument(skip(coordinator, options))]
pub fn handle_stop_primary(coordinator: &mut Coordinator, options: SpeechOptions) {
    halt_primary(coordinator);

    let SpeechOptions {
        mut on_speaking_change,
        mut on_pose_change,
        idle_pose,
        ..
    } = options;

    if let Some(idle) = idle_pose.as_deref() {
        apply_pose(coordinator, &mut on_pose_change, idle);
    }
    if let Some(callback) = on_speaking_change.as_mut() {
        callback(false);
    }
}

/// Natural end or failure of the primary sound.
#[instrument(skip(coordinator, outcome))]
pub fn handle_primary_finished(coordinator: &mut Coordinator, outcome: PlaybackOutcome) {
    let Some(sound) = coordinator.primary.release() else {
        return;
    };
    report_outcome(coordinator, (sound.id, sound.kind, sound.src.clone()), outcome);
    drop(sound);

    if let Some(session) = coordinator.speech.take() {
        let SpeechSession {
            mut on_speaking_change,
            mut on_pose_change,
            idle_pose,
            animation,
        } = session;

        if let Some(callback) = on_speaking_change.as_mut() {
            callback(false);
        }
        drop(animation);
        if let Some(idle) = idle_pose.as_deref() {
            apply_pose(coordinator, &mut on_pose_change, idle);
        }
    }
}

/// One animation tick while speaking.
pub fn handle_pose_tick(coordinator: &mut Coordinator, pose: String) {
    let Some(mut session) = coordinator.speech.take() else {
        return;
    };
    apply_pose(coordinator, &mut session.on_pose_change, &pose);
    coordinator.speech = Some(session);
}

#[instrument(skip(coordinator))]
pub fn handle_play_hover(coordinator: &mut Coordinator, src: String, settings: SettingsSnapshot) {
    if !settings.sounds_enabled {
        debug!(target: COORDINATOR_LOG_TARGET, "Sounds disabled, not playing hover '{}'.", src);
        coordinator.broadcast(CoordinatorEvent::Suppressed { kind: SoundKind::Hover, src });
        return;
    }

    halt_hover(coordinator);
    let sound = coordinator.start_sound(SoundKind::Hover, src, REDUCED_VOLUME);
    coordinator.hover.occupy(sound);
}

pub fn handle_stop_hover(coordinator: &mut Coordinator) {
    halt_hover(coordinator);
}

pub fn handle_hover_finished(coordinator: &mut Coordinator, outcome: PlaybackOutcome) {
    if let Some(sound) = coordinator.hover.release() {
        report_outcome(coordinator, (sound.id, sound.kind, sound.src.clone()), outcome);
    }
}

#[instrument(skip(coordinator))]
pub fn handle_play_transient(
    coordinator: &mut Coordinator,
    src: String,
    kind: TransientKind,
    settings: SettingsSnapshot,
) {
    let enabled = match kind {
        TransientKind::Click => settings.sounds_enabled,
        TransientKind::Name => settings.voices_enabled,
    };
    if !enabled {
        debug!(target: COORDINATOR_LOG_TARGET, "{:?} sound disabled, not playing '{}'.", kind, src);
        coordinator.broadcast(CoordinatorEvent::Suppressed { kind: kind.into(), src });
        return;
    }

    if kind == TransientKind::Name {
        halt_hover(coordinator);
    }
    let sound = coordinator.start_sound(kind.into(), src, REDUCED_VOLUME);
    coordinator.transient_sounds.push(sound);
    debug!(
        target: COORDINATOR_LOG_TARGET,
        "{} click/name sound(s) in flight.",
        coordinator.transient_sounds.len()
    );
}

/// Releases the transient at `index` once its outcome is in.
pub fn handle_transient_finished(coordinator: &mut Coordinator, index: usize, outcome: PlaybackOutcome) {
    if index >= coordinator.transient_sounds.len() {
        return;
    }
    let sound = coordinator.transient_sounds.swap_remove(index);
    report_outcome(coordinator, (sound.id, sound.kind, sound.src.clone()), outcome);
}

/// Halts everything the coordinator still owns.
pub fn halt_all(coordinator: &mut Coordinator) {
    halt_primary(coordinator);
    halt_hover(coordinator);
    for sound in std::mem::take(&mut coordinator.transient_sounds) {
        let (id, kind, src) = sound.halt();
        coordinator.broadcast(CoordinatorEvent::Halted { id, kind, src });
    }
}
