//! Player progression persisted to LocalStorage
//!
//! - `achievements`: append-only unlock ledger and activity level
//! - `best`: personal bests for the mini-games
//! - `stats`: lifetime counters

pub mod achievements;
pub mod best;
pub mod stats;

pub use achievements::{Achievement, AchievementKind, AchievementLedger, ActivityLevel};
pub use best::BestScores;
pub use stats::Stats;
