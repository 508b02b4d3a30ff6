//! Local player profile
//!
//! The only thing kept between sessions: who is playing, their photo and
//! their scores. Persisted to LocalStorage.

use serde::{Deserialize, Serialize};

use crate::platform::storage;

/// The local profile record
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerProfile {
    pub name: String,
    /// Data URI or URL of the uploaded photo
    pub photo_url: Option<String>,
    pub best_score: u64,
    pub games_played: u32,
    pub last_score: Option<u64>,
}

impl PlayerProfile {
    /// LocalStorage key
    const STORAGE_KEY: &'static str = "chanda_profile";

    pub fn new(name: impl Into<String>, photo_url: Option<String>) -> Self {
        Self {
            name: name.into(),
            photo_url,
            ..Default::default()
        }
    }

    /// Has the player entered both a name and a photo?
    pub fn is_complete(&self) -> bool {
        !self.name.trim().is_empty() && self.photo_url.as_deref().is_some_and(|p| !p.is_empty())
    }

    /// Record a finished game. Returns true when it set a new best.
    pub fn record_score(&mut self, score: u64) -> bool {
        self.games_played = self.games_played.saturating_add(1);
        self.last_score = Some(score);
        if score > self.best_score {
            self.best_score = score;
            true
        } else {
            false
        }
    }

    /// Load the profile from LocalStorage
    pub fn load() -> Self {
        match storage::load_json::<Self>(Self::STORAGE_KEY) {
            Some(profile) => {
                log::info!(
                    "Loaded profile ({} games, best {})",
                    profile.games_played,
                    profile.best_score
                );
                profile
            }
            None => {
                log::info!("No profile found, starting fresh");
                Self::default()
            }
        }
    }

    pub fn save(&self) {
        if storage::save_json(Self::STORAGE_KEY, self) {
            log::info!("Profile saved");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_score_tracks_best() {
        let mut profile = PlayerProfile::new("Rahim", None);
        assert!(!profile.record_score(0));
        assert!(profile.record_score(5));
        assert!(!profile.record_score(3));
        assert!(profile.record_score(9));
        assert_eq!(profile.best_score, 9);
        assert_eq!(profile.games_played, 4);
        assert_eq!(profile.last_score, Some(9));
    }

    #[test]
    fn test_completeness() {
        assert!(!PlayerProfile::default().is_complete());
        assert!(!PlayerProfile::new("  ", Some("data:image/png;base64,AA".into())).is_complete());
        assert!(!PlayerProfile::new("Rahim", Some(String::new())).is_complete());
        assert!(PlayerProfile::new("Rahim", Some("data:image/png;base64,AA".into())).is_complete());
    }

    #[test]
    fn test_old_records_still_load() {
        let profile: PlayerProfile =
            serde_json::from_str(r#"{"name":"Rahim","best_score":3}"#).unwrap();
        assert_eq!(profile.best_score, 3);
        assert_eq!(profile.games_played, 0);
        assert_eq!(profile.photo_url, None);
    }
}
