//! Achievement ledger
//!
//! Append-only list of `{name, date}` records. Unlocking a name that is
//! already present is a no-op. Names outside [`AchievementKind`] (e.g. from
//! older builds) are kept as-is.

use serde::{Deserialize, Deserializer, Serialize};

/// Every achievement this build can award
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AchievementKind {
    FirstVisit,
    FirstReaction,
    /// Reaction under [`SPEED_DEMON_MS`]
    SpeedDemon,
    ReactionRecord,
    MemoryFirstWin,
    /// Memory round cleared within [`MEMORY_MASTER_ATTEMPTS`]
    MemoryMaster,
    MemoryRecord,
    SecretHunter,
    MatrixWalker,
    /// [`DEDICATED_VISITS`] visits
    Dedicated,
}

pub const SPEED_DEMON_MS: u32 = 250;
pub const MEMORY_MASTER_ATTEMPTS: u32 = 12;
pub const DEDICATED_VISITS: u32 = 5;

impl AchievementKind {
    pub const ALL: [AchievementKind; 10] = [
        AchievementKind::FirstVisit,
        AchievementKind::FirstReaction,
        AchievementKind::SpeedDemon,
        AchievementKind::ReactionRecord,
        AchievementKind::MemoryFirstWin,
        AchievementKind::MemoryMaster,
        AchievementKind::MemoryRecord,
        AchievementKind::SecretHunter,
        AchievementKind::MatrixWalker,
        AchievementKind::Dedicated,
    ];

    /// Stable ledger key
    pub fn name(&self) -> &'static str {
        match self {
            AchievementKind::FirstVisit => "first_visit",
            AchievementKind::FirstReaction => "first_reaction",
            AchievementKind::SpeedDemon => "speed_demon",
            AchievementKind::ReactionRecord => "reaction_record",
            AchievementKind::MemoryFirstWin => "memory_first_win",
            AchievementKind::MemoryMaster => "memory_master",
            AchievementKind::MemoryRecord => "memory_record",
            AchievementKind::SecretHunter => "secret_hunter",
            AchievementKind::MatrixWalker => "matrix_walker",
            AchievementKind::Dedicated => "dedicated",
        }
    }

    /// Text shown in the unlock notification
    pub fn title(&self) -> &'static str {
        match self {
            AchievementKind::FirstVisit => "Welcome to CyberSpace",
            AchievementKind::FirstReaction => "First Reflex",
            AchievementKind::SpeedDemon => "Speed Demon",
            AchievementKind::ReactionRecord => "New Reaction Record",
            AchievementKind::MemoryFirstWin => "Total Recall",
            AchievementKind::MemoryMaster => "Memory Master",
            AchievementKind::MemoryRecord => "New Memory Record",
            AchievementKind::SecretHunter => "Secret Hunter",
            AchievementKind::MatrixWalker => "Follow the White Rabbit",
            AchievementKind::Dedicated => "Regular",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.name() == name)
    }
}

/// Coarse label derived from the number of unlocked achievements
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ActivityLevel {
    Novice,
    Experienced,
    Pro,
    Legend,
}

impl ActivityLevel {
    pub fn from_count(count: usize) -> Self {
        match count {
            0..=2 => ActivityLevel::Novice,
            3..=4 => ActivityLevel::Experienced,
            5..=7 => ActivityLevel::Pro,
            _ => ActivityLevel::Legend,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityLevel::Novice => "Novice",
            ActivityLevel::Experienced => "Experienced",
            ActivityLevel::Pro => "Pro",
            ActivityLevel::Legend => "Legend",
        }
    }
}

/// A single unlocked achievement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Achievement {
    pub name: String,
    /// Unix timestamp (ms) of the unlock; 0 when unknown
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub date: f64,
}

/// Older builds stored dates as display strings; keep the record, drop the date.
fn lenient_timestamp<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(value.as_f64().unwrap_or(0.0))
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AchievementLedger {
    entries: Vec<Achievement>,
}

impl AchievementLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `name` unless already held; returns true when newly unlocked
    pub fn unlock(&mut self, name: &str, now: f64) -> bool {
        if self.contains(name) {
            return false;
        }
        self.entries.push(Achievement {
            name: name.to_string(),
            date: now,
        });
        true
    }

    pub fn unlock_kind(&mut self, kind: AchievementKind, now: f64) -> bool {
        self.unlock(kind.name(), now)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|a| a.name == name)
    }

    pub fn has(&self, kind: AchievementKind) -> bool {
        self.contains(kind.name())
    }

    pub fn entries(&self) -> &[Achievement] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn activity_level(&self) -> ActivityLevel {
        ActivityLevel::from_count(self.len())
    }

    /// Drop duplicate names left by older builds, keeping the first unlock
    pub fn dedup(&mut self) {
        let mut seen = std::collections::HashSet::new();
        self.entries.retain(|a| seen.insert(a.name.clone()));
    }
}
