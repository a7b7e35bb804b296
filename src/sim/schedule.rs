//! Delayed events tagged with the generation that scheduled them
//!
//! A generation is bumped whenever the owning state is superseded (new memory
//! round, re-armed reaction test). Events from an older generation are
//! dropped instead of firing, so a stale timer can never touch new state.

/// A single pending event
#[derive(Debug, Clone, PartialEq)]
pub struct Scheduled<E> {
    /// Timestamp (ms) at or after which the event fires
    pub due_ms: f64,
    /// Generation that was current when the event was scheduled
    pub generation: u64,
    pub event: E,
}

/// Pending events, kept sorted by due time (stable for equal times)
#[derive(Debug, Clone)]
pub struct Scheduler<E> {
    queue: Vec<Scheduled<E>>,
}

impl<E> Default for Scheduler<E> {
    fn default() -> Self {
        Self { queue: Vec::new() }
    }
}

impl<E> Scheduler<E> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule `event` to fire at `due_ms`
    pub fn schedule(&mut self, due_ms: f64, generation: u64, event: E) {
        let pos = self.queue.partition_point(|s| s.due_ms <= due_ms);
        self.queue.insert(
            pos,
            Scheduled {
                due_ms,
                generation,
                event,
            },
        );
    }

    /// Remove and return every event due at `now_ms`, oldest first.
    /// Events from other generations are discarded.
    pub fn drain_due(&mut self, now_ms: f64, generation: u64) -> Vec<E> {
        let split = self.queue.partition_point(|s| s.due_ms <= now_ms);
        let mut fired = Vec::new();
        for scheduled in self.queue.drain(..split) {
            if scheduled.generation == generation {
                fired.push(scheduled.event);
            } else {
                log::debug!(
                    "Dropping stale event from generation {} (current {})",
                    scheduled.generation,
                    generation
                );
            }
        }
        fired
    }

    /// Drop everything not belonging to `generation`
    pub fn retain_generation(&mut self, generation: u64) {
        self.queue.retain(|s| s.generation == generation);
    }

    pub fn clear(&mut self) {
        self.queue.clear();
    }

    /// Due time of the earliest pending event
    pub fn next_due(&self) -> Option<f64> {
        self.queue.first().map(|s| s.due_ms)
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drain_in_due_order() {
        let mut sched = Scheduler::new();
        sched.schedule(300.0, 1, "c");
        sched.schedule(100.0, 1, "a");
        sched.schedule(200.0, 1, "b");

        assert_eq!(sched.next_due(), Some(100.0));
        assert_eq!(sched.drain_due(250.0, 1), vec!["a", "b"]);
        assert_eq!(sched.len(), 1);
        assert_eq!(sched.drain_due(300.0, 1), vec!["c"]);
        assert!(sched.is_empty());
    }

    #[test]
    fn test_stale_generation_never_fires() {
        let mut sched = Scheduler::new();
        sched.schedule(100.0, 1, "old");
        sched.schedule(100.0, 2, "new");

        assert_eq!(sched.drain_due(1000.0, 2), vec!["new"]);
        assert!(sched.is_empty());
    }

    #[test]
    fn test_retain_generation() {
        let mut sched = Scheduler::new();
        sched.schedule(100.0, 1, 1);
        sched.schedule(200.0, 2, 2);
        sched.retain_generation(2);
        assert_eq!(sched.len(), 1);
        assert_eq!(sched.next_due(), Some(200.0));
    }
}
