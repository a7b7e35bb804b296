//! User preferences and gameplay tunables
//!
//! Persisted separately from progress under `cyberspaceSettings`.

use serde::{Deserialize, Serialize};

use crate::persistence::{self, PersistError};
use crate::platform::{KeyValueStore, keys};
use crate::sim::{MISMATCH_DELAY_MS, reaction};

/// Settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Settings {
    // === Mini-games ===
    /// Delay before a revealed memory pair resolves (ms)
    pub mismatch_delay_ms: f64,
    /// Shortest wait before the reaction target appears (ms)
    pub reaction_min_delay_ms: u32,
    /// Longest wait before the reaction target appears (ms)
    pub reaction_max_delay_ms: u32,

    // === Effects ===
    /// How long notification toasts stay on screen (ms)
    pub toast_duration_ms: f64,
    /// How long the matrix rain overlay runs (ms)
    pub matrix_duration_ms: f64,

    // === Audio ===
    pub sound: bool,
    /// Master volume (0.0 - 1.0)
    pub master_volume: f32,

    // === Accessibility ===
    /// Reduced motion (skip overlays and confetti)
    pub reduced_motion: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            mismatch_delay_ms: MISMATCH_DELAY_MS,
            reaction_min_delay_ms: reaction::MIN_DELAY_MS,
            reaction_max_delay_ms: reaction::MAX_DELAY_MS,

            toast_duration_ms: 3000.0,
            matrix_duration_ms: 5000.0,

            sound: true,
            master_volume: 0.8,

            reduced_motion: false,
        }
    }
}

impl Settings {
    /// Clamp values edited by hand in storage back into a usable range
    pub fn sanitized(mut self) -> Self {
        let defaults = Self::default();
        if !self.mismatch_delay_ms.is_finite() || self.mismatch_delay_ms < 0.0 {
            self.mismatch_delay_ms = defaults.mismatch_delay_ms;
        }
        if self.reaction_min_delay_ms > self.reaction_max_delay_ms {
            std::mem::swap(
                &mut self.reaction_min_delay_ms,
                &mut self.reaction_max_delay_ms,
            );
        }
        if !self.toast_duration_ms.is_finite() || self.toast_duration_ms <= 0.0 {
            self.toast_duration_ms = defaults.toast_duration_ms;
        }
        if !self.matrix_duration_ms.is_finite() || self.matrix_duration_ms <= 0.0 {
            self.matrix_duration_ms = defaults.matrix_duration_ms;
        }
        self.master_volume = if self.master_volume.is_finite() {
            self.master_volume.clamp(0.0, 1.0)
        } else {
            defaults.master_volume
        };
        self
    }

    /// Whether cosmetic overlays should run (respects reduced_motion)
    pub fn effective_overlays(&self) -> bool {
        !self.reduced_motion
    }

    /// Effective volume (0 when sound is off)
    pub fn effective_volume(&self) -> f32 {
        if self.sound { self.master_volume } else { 0.0 }
    }

    /// Load settings, falling back to defaults
    pub fn load(store: &impl KeyValueStore) -> Self {
        persistence::load_or_default::<Self>(store, keys::SETTINGS).sanitized()
    }

    pub fn save(&self, store: &mut impl KeyValueStore) -> Result<(), PersistError> {
        persistence::save(store, keys::SETTINGS, self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::MemoryStore;

    #[test]
    fn test_partial_record_keeps_defaults() {
        let mut store = MemoryStore::new();
        store
            .set(keys::SETTINGS, r#"{"version":1,"data":{"sound":false}}"#)
            .unwrap();

        let settings = Settings::load(&store);
        assert!(!settings.sound);
        assert_eq!(settings.mismatch_delay_ms, MISMATCH_DELAY_MS);
        assert_eq!(settings.effective_volume(), 0.0);
    }

    #[test]
    fn test_sanitized_fixes_bad_values() {
        let settings = Settings {
            mismatch_delay_ms: -5.0,
            reaction_min_delay_ms: 4000,
            reaction_max_delay_ms: 500,
            master_volume: 3.0,
            toast_duration_ms: f64::NAN,
            ..Default::default()
        }
        .sanitized();

        assert_eq!(settings.mismatch_delay_ms, MISMATCH_DELAY_MS);
        assert_eq!(settings.reaction_min_delay_ms, 500);
        assert_eq!(settings.reaction_max_delay_ms, 4000);
        assert_eq!(settings.master_volume, 1.0);
        assert_eq!(settings.toast_duration_ms, 3000.0);
    }

    #[test]
    fn test_save_roundtrip() {
        let mut store = MemoryStore::new();
        let settings = Settings {
            reduced_motion: true,
            ..Default::default()
        };
        settings.save(&mut store).unwrap();
        let loaded = Settings::load(&store);
        assert_eq!(loaded, settings);
        assert!(!loaded.effective_overlays());
    }
}
