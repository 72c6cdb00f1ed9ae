//! Integration tests for session files and badge progress

use crate::test_utils::write_progress;
use reflectobot::progress::{Progress, ProgressError, ProgressStore, ALL_BADGES};
use reflectobot::ui::format_badges;
use std::error::Error;
use tempfile::tempdir;

#[cfg(test)]
mod progress_integration_tests {
    use super::*;

    /// A session saved on one device loads on another.
    #[test]
    fn test_session_moves_between_stores() -> Result<(), Box<dyn Error>> {
        let dir = tempdir()?;
        let first = ProgressStore::open(dir.path().join("first.json"))?;
        first.award_badge("calm_creator")?;
        first.award_badge("mood_mapper")?;
        first.skip_to_challenge("bounce_back")?;

        let session = dir.path().join("exports").join("session.json");
        first.export_to(&session)?;

        let second = ProgressStore::open(dir.path().join("second.json"))?;
        let loaded = second.import_from(&session)?;
        assert_eq!(loaded.badge_count, 2);
        assert_eq!(loaded.current_challenge.as_deref(), Some("bounce_back"));

        let reopened = ProgressStore::open(dir.path().join("second.json"))?;
        assert_eq!(reopened.load().badges, first.load().badges);
        assert!(format_badges(&reopened.load()).starts_with("2 of 18 Collected!"));
        Ok(())
    }

    #[test]
    fn test_import_rejects_tampered_session() -> Result<(), Box<dyn Error>> {
        let dir = tempdir()?;
        let store = ProgressStore::open(dir.path().join("progress.json"))?;
        store.award_badge("super_star")?;

        let mut tampered = Progress::default();
        tampered.badges.insert("gold_medal".to_string(), true);
        let session = dir.path().join("session.json");
        write_progress(&session, &tampered)?;

        assert!(matches!(store.import_from(&session), Err(ProgressError::UnknownBadge(id)) if id == "gold_medal"));
        assert!(store.load().is_earned("super_star"));
        Ok(())
    }

    #[test]
    fn test_every_badge_can_be_earned_and_reset() -> Result<(), Box<dyn Error>> {
        let dir = tempdir()?;
        let store = ProgressStore::open(dir.path().join("progress.json"))?;

        for badge in ALL_BADGES.iter() {
            store.award_badge(badge.id)?;
        }
        assert_eq!(store.load().badge_count, ALL_BADGES.len());

        assert!(store.reset_badge("resilient")?);
        assert!(!store.reset_badge("resilient")?);
        assert_eq!(store.load().badge_count, ALL_BADGES.len() - 1);

        store.erase()?;
        assert_eq!(store.load(), Progress::default());
        Ok(())
    }
}
