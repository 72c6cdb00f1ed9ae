use super::{command_handler, slot::ActiveSound, Coordinator, CoordinatorCommand, SpeechSession, COORDINATOR_LOG_TARGET};
use crate::audio::PlaybackOutcome;
use futures::future::select_all;
use tracing::{info, trace};

/// Waits for the next animation tick; never resolves without an animation.
async fn next_pose(speech: &mut Option<SpeechSession>) -> String {
    match speech.as_mut().and_then(|session| session.animation.as_mut()) {
        Some(animation) => animation.next_pose().await,
        None => std::future::pending().await,
    }
}

/// Waits for any click/name sound to end; never resolves while there are none.
async fn next_transient(sounds: &mut [ActiveSound]) -> (usize, PlaybackOutcome) {
    if sounds.is_empty() {
        return std::future::pending().await;
    }
    let (outcome, index, _) = select_all(sounds.iter_mut().map(|sound| Box::pin(sound.completion()))).await;
    (index, outcome)
}

/// Runs the coordinator's event loop.
///
/// Playback completions and animation ticks take priority over new commands,
/// so a state query always observes events that were already delivered.
pub async fn run_coordinator_loop(coordinator: &mut Coordinator) {
    info!(target: COORDINATOR_LOG_TARGET, "Coordinator run loop started.");

    loop {
        let animating = coordinator
            .speech
            .as_ref()
            .is_some_and(|session| session.animation.is_some());

        tokio::select! {
            biased;

            outcome = coordinator.primary.completion(), if coordinator.primary.is_occupied() => {
                command_handler::handle_primary_finished(coordinator, outcome);
            }

            outcome = coordinator.hover.completion(), if coordinator.hover.is_occupied() => {
                command_handler::handle_hover_finished(coordinator, outcome);
            }

            (index, outcome) = next_transient(&mut coordinator.transient_sounds), if !coordinator.transient_sounds.is_empty() => {
                command_handler::handle_transient_finished(coordinator, index, outcome);
            }

            pose = next_pose(&mut coordinator.speech), if animating => {
                trace!(target: COORDINATOR_LOG_TARGET, "Pose tick: {}", pose);
                command_handler::handle_pose_tick(coordinator, pose);
            }

            command = coordinator.command_rx.recv() => {
                let Some(command) = command else {
                    info!(target: COORDINATOR_LOG_TARGET, "All coordinator handles dropped. Exiting run loop.");
                    break;
                };
                trace!(target: COORDINATOR_LOG_TARGET, "Received command: {:?}", command);
                match command {
                    CoordinatorCommand::PlayPrimary { src, options, settings } => {
                        command_handler::handle_play_primary(coordinator, src, options, settings)
                    }
                    CoordinatorCommand::StopPrimary { options } => command_handler::handle_stop_primary(coordinator, options),
                    CoordinatorCommand::PlayHover { src, settings } => command_handler::handle_play_hover(coordinator, src, settings),
                    CoordinatorCommand::StopHover => command_handler::handle_stop_hover(coordinator),
                    CoordinatorCommand::PlayTransient { src, kind, settings } => {
                        command_handler::handle_play_transient(coordinator, src, kind, settings)
                    }
                    CoordinatorCommand::GetState(responder) => {
                        let _ = responder.send(coordinator.snapshot_state());
                    }
                    CoordinatorCommand::Shutdown => {
                        info!(target: COORDINATOR_LOG_TARGET, "Shutdown command received. Exiting run loop.");
                        break;
                    }
                }
            }
        }
    }

    command_handler::halt_all(coordinator);
    info!(target: COORDINATOR_LOG_TARGET, "Coordinator stopped.");
}
