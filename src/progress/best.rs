//! Personal bests
//!
//! Lower is better for both records. Persisted as plain numeric strings so
//! existing browser data keeps working; `"0"` means unset.

use crate::platform::{KeyValueStore, StorageError, keys};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BestScores {
    /// Fastest reaction time (ms)
    pub best_reaction_ms: Option<u32>,
    /// Fewest attempts to clear a memory round
    pub memory_best_attempts: Option<u32>,
}

/// Replace `best` when `candidate` beats it. Zero is never a valid record.
fn improve(best: &mut Option<u32>, candidate: u32) -> bool {
    if candidate == 0 {
        return false;
    }
    match *best {
        Some(current) if candidate >= current => false,
        _ => {
            *best = Some(candidate);
            true
        }
    }
}

fn parse_record(key: &str, raw: Option<String>) -> Option<u32> {
    let raw = raw?;
    match raw.trim().parse::<f64>() {
        Ok(v) if v.is_finite() && v >= 1.0 => Some(v.round().min(u32::MAX as f64) as u32),
        Ok(_) => None,
        Err(_) => {
            log::warn!("Ignoring unreadable `{}` value {:?}", key, raw);
            None
        }
    }
}

impl BestScores {
    /// Record a reaction time; returns true on a new best
    pub fn record_reaction(&mut self, ms: u32) -> bool {
        improve(&mut self.best_reaction_ms, ms)
    }

    /// Record a finished memory round; returns true on a new best
    pub fn record_memory_attempts(&mut self, attempts: u32) -> bool {
        improve(&mut self.memory_best_attempts, attempts)
    }

    /// Load both records, treating unreadable values as unset
    pub fn load(store: &impl KeyValueStore) -> Self {
        let read = |key: &str| match store.get(key) {
            Ok(raw) => parse_record(key, raw),
            Err(e) => {
                log::warn!("{}", e);
                None
            }
        };
        Self {
            best_reaction_ms: read(keys::BEST_REACTION_TIME),
            memory_best_attempts: read(keys::MEMORY_BEST_SCORE),
        }
    }

    pub fn save(&self, store: &mut impl KeyValueStore) -> Result<(), StorageError> {
        for (key, value) in [
            (keys::BEST_REACTION_TIME, self.best_reaction_ms),
            (keys::MEMORY_BEST_SCORE, self.memory_best_attempts),
        ] {
            match value {
                Some(v) => store.set(key, &v.to_string())?,
                None => store.remove(key)?,
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::MemoryStore;
    use proptest::prelude::*;

    #[test]
    fn test_reaction_best_sequence() {
        let mut best = BestScores::default();
        assert!(best.record_reaction(450));
        assert_eq!(best.best_reaction_ms, Some(450));
        assert!(!best.record_reaction(600));
        assert_eq!(best.best_reaction_ms, Some(450));
        assert!(!best.record_reaction(450));
        assert!(best.record_reaction(300));
        assert_eq!(best.best_reaction_ms, Some(300));
    }

    #[test]
    fn test_memory_best_sequence() {
        let mut best = BestScores::default();
        assert!(best.record_memory_attempts(14));
        assert!(!best.record_memory_attempts(20));
        assert!(best.record_memory_attempts(9));
        assert_eq!(best.memory_best_attempts, Some(9));
    }

    #[test]
    fn test_load_legacy_values() {
        let mut store = MemoryStore::new();
        store.set(keys::BEST_REACTION_TIME, "0").unwrap();
        store.set(keys::MEMORY_BEST_SCORE, "12").unwrap();

        let best = BestScores::load(&store);
        assert_eq!(best.best_reaction_ms, None);
        assert_eq!(best.memory_best_attempts, Some(12));

        store.set(keys::MEMORY_BEST_SCORE, "garbage").unwrap();
        assert_eq!(BestScores::load(&store).memory_best_attempts, None);
    }

    #[test]
    fn test_save_and_reload() {
        let mut store = MemoryStore::new();
        let mut best = BestScores::default();
        best.record_reaction(287);
        best.save(&mut store).unwrap();

        assert_eq!(
            store.get(keys::BEST_REACTION_TIME).unwrap().as_deref(),
            Some("287")
        );
        assert!(!store.contains_key(keys::MEMORY_BEST_SCORE));
        assert_eq!(BestScores::load(&store), best);
    }

    proptest! {
        #[test]
        fn prop_best_never_increases(results in proptest::collection::vec(1u32..5000, 1..50)) {
            let mut best = BestScores::default();
            let mut previous: Option<u32> = None;
            for ms in &results {
                let improved = best.record_reaction(*ms);
                let current = best.best_reaction_ms.unwrap();
                if let Some(prev) = previous {
                    prop_assert!(current <= prev);
                    prop_assert_eq!(improved, *ms < prev);
                }
                previous = Some(current);
            }
            prop_assert_eq!(best.best_reaction_ms, results.iter().copied().min());
        }
    }
}
