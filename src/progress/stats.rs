//! Cumulative usage counters (`cyberspaceStats`)

use serde::{Deserialize, Serialize};

/// Lifetime counters. Missing fields read as zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Stats {
    pub visits: u32,
    /// Unix timestamp (ms) of the first recorded visit
    pub first_visit_ms: f64,
    pub reaction_tests: u32,
    pub memory_rounds_started: u32,
    pub memory_rounds_won: u32,
    pub cards_flipped: u32,
    pub secrets_found: u32,
    pub achievements_unlocked: u32,
}

impl Stats {
    /// Count a session start
    pub fn record_visit(&mut self, now: f64) {
        if self.visits == 0 || self.first_visit_ms <= 0.0 {
            self.first_visit_ms = now;
        }
        self.visits = self.visits.saturating_add(1);
    }

    /// Days since the first visit, rounded down
    pub fn days_active(&self, now: f64) -> u32 {
        if self.first_visit_ms <= 0.0 {
            return 0;
        }
        ((now - self.first_visit_ms).max(0.0) / 86_400_000.0).floor() as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence;

    #[test]
    fn test_missing_fields_default() {
        let stats: Stats = persistence::decode("cyberspaceStats", r#"{"visits": 3}"#).unwrap();
        assert_eq!(stats.visits, 3);
        assert_eq!(stats.memory_rounds_won, 0);
    }

    #[test]
    fn test_record_visit() {
        let mut stats = Stats::default();
        stats.record_visit(1_000.0);
        stats.record_visit(5_000.0);
        assert_eq!(stats.visits, 2);
        assert_eq!(stats.first_visit_ms, 1_000.0);
        assert_eq!(stats.days_active(1_000.0 + 3.5 * 86_400_000.0), 3);
    }
}
