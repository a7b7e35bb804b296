//! Reaction-time test
//!
//! `Idle -> Armed -> TargetVisible -> Recorded`. The target is hidden while
//! armed, so a click before it appears is ignored. Starting again while armed
//! re-arms with a new generation and the old reveal never fires.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::event::GameEvent;
use super::schedule::Scheduler;

/// Shortest random wait before the target appears
pub const MIN_DELAY_MS: u32 = 1000;
/// Longest random wait before the target appears
pub const MAX_DELAY_MS: u32 = 3000;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ReactionPhase {
    Idle,
    /// Waiting for the random delay to elapse
    Armed { fire_at: f64 },
    TargetVisible { shown_at: f64 },
    Recorded { ms: u32 },
}

#[derive(Debug, Clone)]
pub struct ReactionTimer {
    rng: Pcg32,
    phase: ReactionPhase,
    generation: u64,
    timers: Scheduler<()>,
    min_delay_ms: u32,
    max_delay_ms: u32,
}

impl ReactionTimer {
    pub fn new(seed: u64) -> Self {
        Self::with_delays(seed, MIN_DELAY_MS, MAX_DELAY_MS)
    }

    pub fn with_delays(seed: u64, min_delay_ms: u32, max_delay_ms: u32) -> Self {
        Self {
            rng: Pcg32::seed_from_u64(seed),
            phase: ReactionPhase::Idle,
            generation: 0,
            timers: Scheduler::new(),
            min_delay_ms: min_delay_ms.min(max_delay_ms),
            max_delay_ms: max_delay_ms.max(min_delay_ms),
        }
    }

    /// Change the random delay range used by the next `start`
    pub fn set_delays(&mut self, min_delay_ms: u32, max_delay_ms: u32) {
        self.min_delay_ms = min_delay_ms.min(max_delay_ms);
        self.max_delay_ms = max_delay_ms.max(min_delay_ms);
    }

    pub fn phase(&self) -> ReactionPhase {
        self.phase
    }

    pub fn is_target_visible(&self) -> bool {
        matches!(self.phase, ReactionPhase::TargetVisible { .. })
    }

    /// Arm the test; returns when the target will appear
    pub fn start(&mut self, now: f64) -> f64 {
        self.generation += 1;
        self.timers.clear();

        let delay = self.rng.random_range(self.min_delay_ms..=self.max_delay_ms);
        let fire_at = now + delay as f64;
        self.timers.schedule(fire_at, self.generation, ());
        self.phase = ReactionPhase::Armed { fire_at };

        log::debug!("Reaction test armed, target in {} ms", delay);
        fire_at
    }

    /// Reveal the target once its delay has elapsed
    pub fn tick(&mut self, now: f64) -> Vec<GameEvent> {
        let mut events = Vec::new();
        for () in self.timers.drain_due(now, self.generation) {
            if let ReactionPhase::Armed { .. } = self.phase {
                self.phase = ReactionPhase::TargetVisible { shown_at: now };
                events.push(GameEvent::TargetShown);
            }
        }
        events
    }

    /// Register a click on the target; `None` unless the target is showing
    pub fn click(&mut self, now: f64) -> Option<GameEvent> {
        let ReactionPhase::TargetVisible { shown_at } = self.phase else {
            return None;
        };

        let ms = (now - shown_at).max(0.0).round().min(u32::MAX as f64) as u32;
        self.phase = ReactionPhase::Recorded { ms };
        log::info!("Reaction recorded: {} ms", ms);
        Some(GameEvent::ReactionRecorded { ms })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_cycle() {
        let mut timer = ReactionTimer::new(1);
        assert_eq!(timer.phase(), ReactionPhase::Idle);

        let fire_at = timer.start(0.0);
        assert!((1000.0..=3000.0).contains(&fire_at));

        // Click while armed is ignored
        assert_eq!(timer.click(10.0), None);
        assert!(timer.tick(fire_at - 1.0).is_empty());

        assert_eq!(timer.tick(fire_at), vec![GameEvent::TargetShown]);
        assert!(timer.is_target_visible());

        assert_eq!(
            timer.click(fire_at + 321.4),
            Some(GameEvent::ReactionRecorded { ms: 321 })
        );
        assert_eq!(timer.phase(), ReactionPhase::Recorded { ms: 321 });
        assert_eq!(timer.click(fire_at + 500.0), None);
    }

    #[test]
    fn test_restart_while_armed_supersedes() {
        let mut timer = ReactionTimer::with_delays(9, 1000, 1000);
        timer.start(0.0);
        let second = timer.start(500.0);
        assert_eq!(second, 1500.0);

        // The first arming would have fired at 1000
        assert!(timer.tick(1200.0).is_empty());
        assert_eq!(timer.tick(1500.0), vec![GameEvent::TargetShown]);
    }

    #[test]
    fn test_delays_within_bounds() {
        let mut timer = ReactionTimer::new(77);
        for i in 0..200 {
            let now = i as f64 * 10_000.0;
            let delay = timer.start(now) - now;
            assert!((MIN_DELAY_MS as f64..=MAX_DELAY_MS as f64).contains(&delay));
        }
    }
}
