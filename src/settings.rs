//! Player settings and preferences
//!
//! Persisted separately from the profile in LocalStorage.

use serde::{Deserialize, Serialize};

use crate::audio::mixed_volume;
use crate::platform::storage;
use crate::renderer::RenderOptions;
use crate::sim::Variant;

/// Player settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Game mounted at startup
    pub variant: Variant,

    // === Audio ===
    /// Master volume (0.0 - 1.0)
    pub master_volume: f32,
    /// Sound effects volume (0.0 - 1.0)
    pub sfx_volume: f32,
    pub muted: bool,

    // === Visuals ===
    /// Scrolling background layer
    pub parallax: bool,
    /// Live score while playing
    pub show_score: bool,
    /// Draw the live score with Bengali digits
    pub bengali_numerals: bool,

    // === Accessibility ===
    /// Reduced motion (no scrolling background)
    pub reduced_motion: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            variant: Variant::PipeFlyer,

            master_volume: 0.8,
            sfx_volume: 1.0,
            muted: false,

            parallax: true,
            show_score: true,
            bengali_numerals: true,

            reduced_motion: false,
        }
    }
}

impl Settings {
    /// LocalStorage key
    const STORAGE_KEY: &'static str = "chanda_settings";

    /// Effective parallax (respects reduced_motion)
    pub fn effective_parallax(&self) -> bool {
        self.parallax && !self.reduced_motion
    }

    /// Volume actually applied to sound effects
    pub fn effective_volume(&self) -> f32 {
        mixed_volume(self.master_volume, self.sfx_volume, self.muted)
    }

    pub fn render_options(&self) -> RenderOptions {
        RenderOptions {
            show_score: self.show_score,
            parallax: self.effective_parallax(),
            bengali_numerals: self.bengali_numerals,
        }
    }

    /// Load settings from LocalStorage, falling back to defaults
    pub fn load() -> Self {
        match storage::load_json(Self::STORAGE_KEY) {
            Some(settings) => {
                log::info!("Loaded settings from LocalStorage");
                settings
            }
            None => {
                log::info!("Using default settings");
                Self::default()
            }
        }
    }

    pub fn save(&self) {
        if storage::save_json(Self::STORAGE_KEY, self) {
            log::info!("Settings saved");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reduced_motion_disables_parallax() {
        let mut settings = Settings::default();
        assert!(settings.effective_parallax());
        settings.reduced_motion = true;
        assert!(!settings.effective_parallax());
        assert!(!settings.render_options().parallax);
    }

    #[test]
    fn test_muted_volume() {
        let mut settings = Settings::default();
        assert!((settings.effective_volume() - 0.8).abs() < 1e-6);
        settings.muted = true;
        assert_eq!(settings.effective_volume(), 0.0);
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let settings: Settings =
            serde_json::from_str(r#"{"variant":"Floaty","muted":true}"#).unwrap();
        assert_eq!(settings.variant, Variant::Floaty);
        assert!(settings.muted);
        assert!(settings.show_score);
        assert!(settings.bengali_numerals);
        assert!(settings.render_options().bengali_numerals);
    }

    #[test]
    fn test_native_load_is_default() {
        assert_eq!(Settings::load(), Settings::default());
    }
}
