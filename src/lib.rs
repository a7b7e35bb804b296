//! Cyberspace Hub - Games Verse catalog and CyberSpace mini-games
//!
//! Core modules:
//! - `sim`: Deterministic mini-game engines (memory match, reaction test)
//! - `session`: The single owning controller for a CyberSpace page
//! - `progress`: Achievements, personal bests, lifetime counters
//! - `secrets`: Typed-in secret codes
//! - `catalog`: Games Verse catalog data, markup, theme, host bridge
//! - `platform`: Browser/native platform abstraction (clock, storage)
//! - `persistence`: Versioned records with corruption recovery

#[cfg(target_arch = "wasm32")]
pub mod audio;
pub mod catalog;
pub mod notify;
pub mod persistence;
pub mod platform;
pub mod progress;
pub mod secrets;
pub mod session;
pub mod settings;
pub mod sim;

pub use progress::{AchievementKind, ActivityLevel, BestScores};
pub use session::{Session, SessionEffect};
pub use settings::Settings;

/// Page configuration constants
pub mod consts {
    /// Delay between matrix rain column spawns (ms)
    pub const MATRIX_SPAWN_INTERVAL_MS: f64 = 80.0;
    /// Characters used by the matrix rain overlay
    pub const MATRIX_GLYPHS: &str = "アイウエオカキクケコサシスセソ0123456789";
    /// Confetti pieces spawned by the party code
    pub const PARTY_CONFETTI: usize = 60;
}
