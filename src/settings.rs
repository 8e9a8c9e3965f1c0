//! Game settings
//!
//! Persisted separately from progress, as one JSON value under its own key.

use serde::{Deserialize, Serialize};

use crate::consts::{PLAY_HEIGHT, PLAY_WIDTH, TARGET_SIZE};
use crate::storage::Storage;

/// Play area and RNG configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Play area width in layout units
    pub play_width: f32,
    /// Play area height in layout units
    pub play_height: f32,
    /// Side of the square target footprint
    pub target_size: f32,
    /// Fixed seed for target placement (None = fresh entropy each session)
    pub seed: Option<u64>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            play_width: PLAY_WIDTH,
            play_height: PLAY_HEIGHT,
            target_size: TARGET_SIZE,
            seed: None,
        }
    }
}

impl Settings {
    /// Storage key
    const STORAGE_KEY: &'static str = "fire_rush_settings";

    /// Replace non-finite or negative dimensions with zero/defaults
    pub fn sanitized(mut self) -> Self {
        let fix = |v: f32, fallback: f32| if v.is_finite() { v.max(0.0) } else { fallback };
        self.play_width = fix(self.play_width, PLAY_WIDTH);
        self.play_height = fix(self.play_height, PLAY_HEIGHT);
        self.target_size = fix(self.target_size, TARGET_SIZE);
        self
    }

    pub fn from_json(json: &str) -> Option<Self> {
        serde_json::from_str::<Settings>(json)
            .ok()
            .map(Settings::sanitized)
    }

    /// Load settings, falling back to defaults on any failure
    pub fn load(storage: &dyn Storage) -> Self {
        match storage.get_item(Self::STORAGE_KEY) {
            Ok(Some(json)) => {
                if let Some(settings) = Self::from_json(&json) {
                    log::info!("Loaded settings from storage");
                    return settings;
                }
                log::warn!("Stored settings unreadable, using defaults");
            }
            Ok(None) => {}
            Err(e) => log::warn!("Settings read failed: {e}"),
        }

        log::info!("Using default settings");
        Self::default()
    }

    /// Save settings (errors are logged and dropped)
    pub fn save(&self, storage: &mut dyn Storage) {
        match serde_json::to_string(self) {
            Ok(json) => match storage.set_item(Self::STORAGE_KEY, &json) {
                Ok(()) => log::info!("Settings saved"),
                Err(e) => log::warn!("Settings save failed: {e}"),
            },
            Err(e) => log::warn!("Settings encode failed: {e}"),
        }
    }
}
