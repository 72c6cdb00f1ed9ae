//! Tests for progress persistence

#[cfg(test)]
mod tests {
    use super::super::*;
    use crate::coordinator::SettingsSource;
    use tempfile::tempdir;

    #[test]
    fn test_defaults_when_file_missing() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let store = ProgressStore::open(dir.path().join("progress.json"))?;
        let progress = store.load();
        assert!(progress.voices_enabled);
        assert!(progress.sounds_enabled);
        assert_eq!(progress.badge_count, 0);
        assert!(!store.path().exists());
        Ok(())
    }

    #[test]
    fn test_toggles_persist_across_reopen() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let path = dir.path().join("progress.json");
        let store = ProgressStore::open(&path)?;
        store.update(ProgressUpdate {
            voices_enabled: Some(false),
            ..ProgressUpdate::default()
        })?;

        let reopened = ProgressStore::open(&path)?;
        let snapshot = reopened.snapshot();
        assert!(!snapshot.voices_enabled);
        assert!(snapshot.sounds_enabled);
        Ok(())
    }

    #[test]
    fn test_snapshot_reflects_latest_update() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let store = ProgressStore::open(dir.path().join("progress.json"))?;
        assert!(store.snapshot().sounds_enabled);
        store.update(ProgressUpdate {
            sounds_enabled: Some(false),
            ..ProgressUpdate::default()
        })?;
        assert!(!store.snapshot().sounds_enabled);
        Ok(())
    }

    #[test]
    fn test_award_and_reset_badge() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let store = ProgressStore::open(dir.path().join("progress.json"))?;
        store.award_badge("brave_voice")?;
        let progress = store.award_badge("kind_heart")?;
        assert_eq!(progress.badge_count, 2);

        assert!(store.reset_badge("brave_voice")?);
        assert!(!store.reset_badge("brave_voice")?);
        assert_eq!(store.load().badge_count, 1);

        assert!(matches!(store.reset_badge("not_a_badge"), Err(ProgressError::UnknownBadge(_))));
        Ok(())
    }

    #[test]
    fn test_skip_to_challenge_rejects_unknown() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let store = ProgressStore::open(dir.path().join("progress.json"))?;
        let progress = store.skip_to_challenge("deep_thinker")?;
        assert_eq!(progress.current_challenge.as_deref(), Some("deep_thinker"));
        assert!(store.skip_to_challenge("nope").is_err());
        assert_eq!(store.load().current_challenge.as_deref(), Some("deep_thinker"));
        Ok(())
    }

    #[test]
    fn test_export_then_import_restores_state() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let store = ProgressStore::open(dir.path().join("progress.json"))?;
        store.award_badge("super_star")?;
        store.update(ProgressUpdate {
            sounds_enabled: Some(false),
            ..ProgressUpdate::default()
        })?;
        let session = dir.path().join("sessions").join("saved.json");
        store.export_to(&session)?;

        store.erase()?;
        assert_eq!(store.load().badge_count, 0);

        let imported = store.import_from(&session)?;
        assert!(imported.is_earned("super_star"));
        assert!(!imported.sounds_enabled);
        assert_eq!(imported.badge_count, 1);
        Ok(())
    }

    #[test]
    fn test_import_accepts_web_client_keys() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let session = dir.path().join("session.json");
        std::fs::write(
            &session,
            r#"{"voicesEnabled": false, "soundsEnabled": true, "badges": {"calm_creator": true, "mood_mapper": false}}"#,
        )?;
        let store = ProgressStore::open(dir.path().join("progress.json"))?;
        let progress = store.import_from(&session)?;
        assert!(!progress.voices_enabled);
        assert_eq!(progress.badge_count, 1);
        Ok(())
    }

    #[test]
    fn test_import_rejects_unknown_badge_and_keeps_state() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let session = dir.path().join("session.json");
        std::fs::write(&session, r#"{"badges": {"made_up": true}}"#)?;
        let store = ProgressStore::open(dir.path().join("progress.json"))?;
        store.award_badge("resilient")?;

        assert!(matches!(store.import_from(&session), Err(ProgressError::UnknownBadge(_))));
        assert!(store.load().is_earned("resilient"));
        Ok(())
    }

    #[test]
    fn test_import_rejects_malformed_file() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let session = dir.path().join("session.json");
        std::fs::write(&session, "not json")?;
        let store = ProgressStore::open(dir.path().join("progress.json"))?;
        assert!(matches!(store.import_from(&session), Err(ProgressError::ParseError(_))));
        Ok(())
    }

    #[test]
    fn test_erase_removes_file() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let store = ProgressStore::open(dir.path().join("progress.json"))?;
        store.award_badge("great_job")?;
        assert!(store.path().exists());
        store.erase()?;
        assert!(!store.path().exists());
        assert_eq!(store.load(), Progress::default());
        Ok(())
    }

    #[test]
    fn test_badge_catalog() {
        assert_eq!(ALL_BADGES.len(), 18);
        assert_eq!(find_badge("what_if_explorer").map(|b| b.name), Some("What If Explorer"));
        assert!(!is_known_badge("brave-voice"));
    }
}
