//! Integration tests for the audio coordinator
//!
//! These drive the coordinator through its public handle with the progress
//! store as the settings source.

use crate::test_utils::TimedBackend;
use reflectobot::audio::{AlsaBackend, SoundKind};
use reflectobot::config::Settings;
use reflectobot::coordinator::{AudioCoordinator, CoordinatorEvent, SpeechOptions};
use reflectobot::progress::{ProgressStore, ProgressUpdate};
use reflectobot::ui::Gestures;
use std::error::Error;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::tempdir;
use tokio::sync::broadcast;

#[cfg(test)]
mod coordinator_integration_tests {
    use super::*;

    async fn wait_for_end(
        events: &mut broadcast::Receiver<CoordinatorEvent>,
        kind: SoundKind,
    ) -> Result<CoordinatorEvent, Box<dyn Error>> {
        loop {
            let event = events.recv().await?;
            let ended = matches!(
                &event,
                CoordinatorEvent::Finished { kind: k, .. } | CoordinatorEvent::Failed { kind: k, .. } if *k == kind
            );
            if ended {
                return Ok(event);
            }
        }
    }

    fn recording_options(log: &Arc<Mutex<Vec<String>>>) -> SpeechOptions {
        let speaking = log.clone();
        let poses = log.clone();
        SpeechOptions::new()
            .on_speaking_change(move |s| speaking.lock().unwrap().push(format!("speaking:{}", s)))
            .on_pose_change(move |p| poses.lock().unwrap().push(p.to_string()))
    }

    #[tokio::test(start_paused = true)]
    async fn test_greeting_animates_until_it_ends() -> Result<(), Box<dyn Error>> {
        let dir = tempdir()?;
        let store = Arc::new(ProgressStore::open(dir.path().join("progress.json"))?);
        let backend = Arc::new(
            TimedBackend::new(Duration::from_millis(300)).with_length("greeting.mp3", Duration::from_millis(1200)),
        );
        let (coordinator, _task) = AudioCoordinator::spawn(backend.clone(), store);
        let mut events = coordinator.subscribe();
        let log = Arc::new(Mutex::new(Vec::new()));

        coordinator.play_primary(
            "greeting.mp3",
            recording_options(&log).poses(["talk-1", "talk-2"]).idle_pose("idle"),
        );
        wait_for_end(&mut events, SoundKind::Speech).await?;

        let after = coordinator.state().await.unwrap();
        assert!(after.is_idle());
        assert!(!after.animating);
        assert_eq!(
            *log.lock().unwrap(),
            vec!["speaking:true", "talk-1", "talk-2", "talk-1", "speaking:false", "idle"]
        );
        Ok(())
    }

    #[tokio::test(start_paused = true)]
    async fn test_store_toggles_gate_requests() -> Result<(), Box<dyn Error>> {
        let dir = tempdir()?;
        let store = Arc::new(ProgressStore::open(dir.path().join("progress.json"))?);
        let backend = Arc::new(TimedBackend::new(Duration::from_secs(1)));
        let (coordinator, _task) = AudioCoordinator::spawn(backend.clone(), store.clone());

        store.update(ProgressUpdate {
            voices_enabled: Some(false),
            ..ProgressUpdate::default()
        })?;
        coordinator.play_primary("greeting.mp3", SpeechOptions::new());
        coordinator.play_name("robot-name.mp3");
        coordinator.play_click("button-click.mp3");
        let state = coordinator.state().await.unwrap();

        assert!(state.primary.is_none());
        assert_eq!(state.transients, 1);
        let kinds: Vec<SoundKind> = backend.started().iter().map(|r| r.kind).collect();
        assert_eq!(kinds, vec![SoundKind::Click]);
        Ok(())
    }

    #[tokio::test(start_paused = true)]
    async fn test_greeting_cuts_off_hover() -> Result<(), Box<dyn Error>> {
        let dir = tempdir()?;
        let store = Arc::new(ProgressStore::open(dir.path().join("progress.json"))?);
        let backend = Arc::new(TimedBackend::new(Duration::from_secs(2)));
        let (coordinator, _task) = AudioCoordinator::spawn(backend.clone(), store);

        coordinator.play_hover("buttons.mp3");
        coordinator.play_primary("greeting.mp3", SpeechOptions::new());
        let state = coordinator.state().await.unwrap();

        let started = backend.started();
        let hover = &started[0];
        assert_eq!(hover.kind, SoundKind::Hover);
        assert_eq!(backend.halted(), vec![hover.id]);
        assert!(state.hover.is_none());
        assert_eq!(state.primary.as_deref(), Some("greeting.mp3"));
        Ok(())
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_greeting_restores_idle() -> Result<(), Box<dyn Error>> {
        let dir = tempdir()?;
        let store = Arc::new(ProgressStore::open(dir.path().join("progress.json"))?);
        let backend = Arc::new(TimedBackend::new(Duration::from_secs(1)));
        let (coordinator, _task) = AudioCoordinator::spawn(backend, store);
        let mut events = coordinator.subscribe();
        let log = Arc::new(Mutex::new(Vec::new()));

        coordinator.play_primary("missing-greeting.mp3", recording_options(&log).poses(["a"]).idle_pose("rest"));
        let end = wait_for_end(&mut events, SoundKind::Speech).await?;

        assert!(matches!(end, CoordinatorEvent::Failed { .. }));
        assert_eq!(*log.lock().unwrap(), vec!["speaking:true", "a", "speaking:false", "rest"]);
        assert!(coordinator.state().await.unwrap().is_idle());
        Ok(())
    }

    #[tokio::test(start_paused = true)]
    async fn test_gestures_wait_until_idle() -> Result<(), Box<dyn Error>> {
        let dir = tempdir()?;
        let store = Arc::new(ProgressStore::open(dir.path().join("progress.json"))?);
        let backend = Arc::new(TimedBackend::new(Duration::from_millis(400)));
        let (coordinator, _task) = AudioCoordinator::spawn(backend.clone(), store.clone());
        let gestures = Gestures::new(coordinator.clone(), store, &Settings::default());

        gestures.hover();
        gestures.click();
        gestures.click();
        gestures.wait_until_idle().await;

        assert!(coordinator.state().await.unwrap().is_idle());
        assert_eq!(backend.started().len(), 3);
        assert!(backend.halted().is_empty());
        Ok(())
    }

    /// Unreadable files end as failures instead of errors at the call site.
    #[tokio::test]
    async fn test_alsa_backend_reports_missing_file() -> Result<(), Box<dyn Error>> {
        let dir = tempdir()?;
        let store = Arc::new(ProgressStore::open(dir.path().join("progress.json"))?);
        let backend = Arc::new(AlsaBackend::new("default", dir.path()));
        let (coordinator, task) = AudioCoordinator::spawn(backend, store);
        let mut events = coordinator.subscribe();

        coordinator.play_click("no-such-click.mp3");
        let end = tokio::time::timeout(Duration::from_secs(5), wait_for_end(&mut events, SoundKind::Click)).await??;

        match end {
            CoordinatorEvent::Failed { src, reason, .. } => {
                assert_eq!(src, "no-such-click.mp3");
                assert!(reason.contains("I/O error"));
            }
            other => panic!("expected failure, got {:?}", other),
        }

        coordinator.shutdown();
        task.await?;
        Ok(())
    }
}
