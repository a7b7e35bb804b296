//! CyberSpace session controller
//!
//! One `Session` is opened at page start and owns every piece of mutable
//! state: the mini-game engines, the achievement ledger, personal bests,
//! counters, toasts and the secret-code buffer. DOM handlers call into it
//! and render from its accessors and the returned [`SessionEffect`]s.
//! `close` flushes everything back to storage.

use crate::notify::{Notification, NotificationKind, NotificationQueue};
use crate::persistence;
use crate::platform::{KeyValueStore, keys};
use crate::progress::achievements::{DEDICATED_VISITS, MEMORY_MASTER_ATTEMPTS, SPEED_DEMON_MS};
use crate::progress::{AchievementKind, AchievementLedger, ActivityLevel, BestScores, Stats};
use crate::secrets::{SecretBuffer, SecretCode};
use crate::settings::Settings;
use crate::sim::{GameEvent, MemoryGame, ReactionTimer};

/// Something the presentation layer should react to
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEffect {
    /// Raw engine event (card flips, target shown, ...)
    Game(GameEvent),
    AchievementUnlocked(AchievementKind),
    NewReactionBest { ms: u32 },
    NewMemoryBest { attempts: u32 },
    /// Start the matrix rain overlay, running until the given timestamp
    MatrixRain { until: f64 },
    MatrixEnded,
    Party,
    /// All stored progress was wiped; re-render everything
    ProgressReset,
    /// A toast left [`Session::notifications`]
    NotificationExpired { id: u64 },
}

/// Derive the reaction timer's RNG stream from the session seed
fn reaction_seed(seed: u64) -> u64 {
    seed.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407)
}

pub struct Session<S: KeyValueStore> {
    store: S,
    seed: u64,
    settings: Settings,
    memory: MemoryGame,
    reaction: ReactionTimer,
    ledger: AchievementLedger,
    best: BestScores,
    stats: Stats,
    notifications: NotificationQueue,
    secrets: SecretBuffer,
    matrix_until: Option<f64>,
}

impl<S: KeyValueStore> Session<S> {
    /// Load every record independently and count a visit. A corrupt record
    /// only resets itself.
    pub fn open(store: S, seed: u64, now: f64) -> Self {
        let settings = Settings::load(&store);
        let mut ledger: AchievementLedger =
            persistence::load_or_default(&store, keys::ACHIEVEMENTS);
        ledger.dedup();
        let best = BestScores::load(&store);
        let stats: Stats = persistence::load_or_default(&store, keys::STATS);

        let mut session = Self {
            memory: MemoryGame::with_delay(seed, settings.mismatch_delay_ms),
            reaction: ReactionTimer::with_delays(
                reaction_seed(seed),
                settings.reaction_min_delay_ms,
                settings.reaction_max_delay_ms,
            ),
            store,
            seed,
            settings,
            ledger,
            best,
            stats,
            notifications: NotificationQueue::new(),
            secrets: SecretBuffer::new(),
            matrix_until: None,
        };
        // Opening unlocks reach the page through `notifications`
        session.begin(now);
        session
    }

    /// First steps of every session (also run after a reset)
    fn begin(&mut self, now: f64) -> Vec<SessionEffect> {
        self.stats.record_visit(now);
        log::info!(
            "CyberSpace session started (visit {}, {} achievements)",
            self.stats.visits,
            self.ledger.len()
        );
        let mut effects = Vec::new();
        self.unlock_into(AchievementKind::FirstVisit, now, &mut effects);
        if self.stats.visits >= DEDICATED_VISITS {
            self.unlock_into(AchievementKind::Dedicated, now, &mut effects);
        }
        self.persist_stats();
        effects
    }

    /// Write every record now (page hide / unload)
    pub fn flush(&mut self) {
        self.persist_all();
    }

    /// Flush all records and hand the store back
    pub fn close(mut self) -> S {
        self.persist_all();
        log::info!("CyberSpace session closed");
        self.store
    }

    // === Accessors ===

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn memory(&self) -> &MemoryGame {
        &self.memory
    }

    pub fn reaction(&self) -> &ReactionTimer {
        &self.reaction
    }

    pub fn achievements(&self) -> &AchievementLedger {
        &self.ledger
    }

    pub fn activity_level(&self) -> ActivityLevel {
        self.ledger.activity_level()
    }

    pub fn best_scores(&self) -> BestScores {
        self.best
    }

    pub fn stats(&self) -> &Stats {
        &self.stats
    }

    pub fn notifications(&self) -> &[Notification] {
        self.notifications.active()
    }

    pub fn matrix_active(&self) -> bool {
        self.matrix_until.is_some()
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Replace settings; engine delays apply to the next pair/test
    pub fn set_settings(&mut self, settings: Settings) {
        self.settings = settings.sanitized();
        self.memory.set_resolve_delay(self.settings.mismatch_delay_ms);
        self.reaction.set_delays(
            self.settings.reaction_min_delay_ms,
            self.settings.reaction_max_delay_ms,
        );
        if let Err(e) = self.settings.save(&mut self.store) {
            log::warn!("Failed to save settings: {}", e);
        }
    }

    // === Achievements ===

    /// Unlock an achievement; `None` if it was already held
    pub fn unlock(&mut self, kind: AchievementKind, now: f64) -> Option<SessionEffect> {
        if !self.ledger.unlock_kind(kind, now) {
            return None;
        }
        log::info!("Achievement unlocked: {}", kind.name());
        self.stats.achievements_unlocked = self.stats.achievements_unlocked.saturating_add(1);
        self.notify(
            NotificationKind::Achievement,
            format!("Achievement unlocked: {}", kind.title()),
            now,
        );
        self.persist_ledger();
        self.persist_stats();
        Some(SessionEffect::AchievementUnlocked(kind))
    }

    fn unlock_into(&mut self, kind: AchievementKind, now: f64, effects: &mut Vec<SessionEffect>) {
        effects.extend(self.unlock(kind, now));
    }

    fn notify(&mut self, kind: NotificationKind, message: String, now: f64) {
        let duration = self.settings.toast_duration_ms;
        self.notifications.push(kind, message, now, duration);
    }

    // === Memory game ===

    pub fn start_memory_round(&mut self, now: f64) {
        self.memory.start_round(now);
        self.stats.memory_rounds_started = self.stats.memory_rounds_started.saturating_add(1);
        self.persist_stats();
    }

    pub fn flip_card(&mut self, index: usize, now: f64) -> Vec<SessionEffect> {
        let mut effects = Vec::new();
        for event in self.memory.flip(index, now) {
            match event {
                GameEvent::CardRevealed { .. } => {
                    self.stats.cards_flipped = self.stats.cards_flipped.saturating_add(1);
                }
                GameEvent::RoundWon { attempts } => {
                    effects.push(SessionEffect::Game(event));
                    self.on_memory_won(attempts, now, &mut effects);
                    continue;
                }
                _ => {}
            }
            effects.push(SessionEffect::Game(event));
        }
        effects
    }

    fn on_memory_won(&mut self, attempts: u32, now: f64, effects: &mut Vec<SessionEffect>) {
        self.stats.memory_rounds_won = self.stats.memory_rounds_won.saturating_add(1);
        self.persist_stats();

        self.unlock_into(AchievementKind::MemoryFirstWin, now, effects);
        if attempts <= MEMORY_MASTER_ATTEMPTS {
            self.unlock_into(AchievementKind::MemoryMaster, now, effects);
        }
        if self.best.record_memory_attempts(attempts) {
            self.persist_best();
            effects.push(SessionEffect::NewMemoryBest { attempts });
            self.unlock_into(AchievementKind::MemoryRecord, now, effects);
        }
    }

    // === Reaction test ===

    /// Arm the reaction test; returns when the target appears
    pub fn start_reaction(&mut self, now: f64) -> f64 {
        self.stats.reaction_tests = self.stats.reaction_tests.saturating_add(1);
        self.persist_stats();
        self.reaction.start(now)
    }

    pub fn click_reaction(&mut self, now: f64) -> Vec<SessionEffect> {
        let Some(event) = self.reaction.click(now) else {
            return Vec::new();
        };
        let mut effects = vec![SessionEffect::Game(event.clone())];
        if let GameEvent::ReactionRecorded { ms } = event {
            self.unlock_into(AchievementKind::FirstReaction, now, &mut effects);
            if ms < SPEED_DEMON_MS {
                self.unlock_into(AchievementKind::SpeedDemon, now, &mut effects);
            }
            if self.best.record_reaction(ms) {
                self.persist_best();
                effects.push(SessionEffect::NewReactionBest { ms });
                self.unlock_into(AchievementKind::ReactionRecord, now, &mut effects);
            }
        }
        effects
    }

    // === Secret codes ===

    /// Feed a keystroke to the secret-code buffer
    pub fn key_pressed(&mut self, key: char, now: f64) -> Vec<SessionEffect> {
        match self.secrets.push(key) {
            Some(code) => self.apply_secret(code, now),
            None => Vec::new(),
        }
    }

    pub fn apply_secret(&mut self, code: SecretCode, now: f64) -> Vec<SessionEffect> {
        log::info!("Secret code: {}", code);
        let mut effects = Vec::new();

        match code {
            SecretCode::Reset => return self.reset(now),
            SecretCode::GodMode => {
                self.secret_found(code, now);
                for kind in AchievementKind::ALL {
                    self.unlock_into(kind, now, &mut effects);
                }
            }
            SecretCode::Matrix => {
                self.secret_found(code, now);
                if self.settings.effective_overlays() {
                    let until = now + self.settings.matrix_duration_ms;
                    self.matrix_until = Some(until);
                    effects.push(SessionEffect::MatrixRain { until });
                }
                self.unlock_into(AchievementKind::MatrixWalker, now, &mut effects);
            }
            SecretCode::Party => {
                self.secret_found(code, now);
                if self.settings.effective_overlays() {
                    effects.push(SessionEffect::Party);
                }
            }
        }

        self.unlock_into(AchievementKind::SecretHunter, now, &mut effects);
        effects
    }

    fn secret_found(&mut self, code: SecretCode, now: f64) {
        self.stats.secrets_found = self.stats.secrets_found.saturating_add(1);
        self.persist_stats();
        self.notify(
            NotificationKind::Info,
            format!("Secret code activated: {}", code),
            now,
        );
    }

    /// Wipe every stored key and start over as a first-time visitor.
    /// A running matrix overlay is stopped.
    pub fn reset(&mut self, now: f64) -> Vec<SessionEffect> {
        let mut effects = Vec::new();
        if self.matrix_until.take().is_some() {
            effects.push(SessionEffect::MatrixEnded);
        }
        if let Err(e) = self.store.remove_all(keys::ALL) {
            log::warn!("Reset incomplete: {}", e);
        }
        self.seed = self.seed.wrapping_add(1);
        self.settings = Settings::default();
        self.memory = MemoryGame::with_delay(self.seed, self.settings.mismatch_delay_ms);
        self.reaction = ReactionTimer::with_delays(
            reaction_seed(self.seed),
            self.settings.reaction_min_delay_ms,
            self.settings.reaction_max_delay_ms,
        );
        self.ledger = AchievementLedger::new();
        self.best = BestScores::default();
        self.stats = Stats::default();
        self.notifications.clear();
        self.secrets.clear();
        log::info!("All progress reset");
        effects.push(SessionEffect::ProgressReset);
        effects.extend(self.begin(now));
        effects
    }

    // === Timers ===

    /// Advance scheduled events, overlays and toasts to `now`
    pub fn tick(&mut self, now: f64) -> Vec<SessionEffect> {
        let mut effects: Vec<SessionEffect> = self
            .memory
            .tick(now)
            .into_iter()
            .chain(self.reaction.tick(now))
            .map(SessionEffect::Game)
            .collect();

        if self.matrix_until.is_some_and(|until| now >= until) {
            self.matrix_until = None;
            effects.push(SessionEffect::MatrixEnded);
        }

        effects.extend(
            self.notifications
                .expire(now)
                .into_iter()
                .map(|n| SessionEffect::NotificationExpired { id: n.id }),
        );
        effects
    }

    // === Persistence ===

    fn persist_ledger(&mut self) {
        if let Err(e) = persistence::save(&mut self.store, keys::ACHIEVEMENTS, &self.ledger) {
            log::warn!("Failed to save achievements: {}", e);
        }
    }

    fn persist_stats(&mut self) {
        if let Err(e) = persistence::save(&mut self.store, keys::STATS, &self.stats) {
            log::warn!("Failed to save stats: {}", e);
        }
    }

    fn persist_best(&mut self) {
        if let Err(e) = self.best.save(&mut self.store) {
            log::warn!("Failed to save best scores: {}", e);
        }
    }

    fn persist_all(&mut self) {
        self.persist_ledger();
        self.persist_stats();
        self.persist_best();
        if let Err(e) = self.settings.save(&mut self.store) {
            log::warn!("Failed to save settings: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::MemoryStore;
    use crate::sim::{CARD_COUNT, CardState, MemoryRound};

    fn open(store: MemoryStore) -> Session<MemoryStore> {
        Session::open(store, 1234, 1_000.0)
    }

    fn partner(round: &MemoryRound, index: usize) -> usize {
        let symbol = round.cards[index].symbol;
        round
            .cards
            .iter()
            .position(|c| c.index != index && c.symbol == symbol)
            .unwrap()
    }

    /// Play a round, making `misses` deliberate mismatches first
    fn play_round(
        session: &mut Session<MemoryStore>,
        misses: u32,
        mut now: f64,
    ) -> Vec<SessionEffect> {
        session.start_memory_round(now);
        let mut effects = Vec::new();

        for _ in 0..misses {
            let round = session.memory().round().unwrap();
            let a = 0;
            let b = round
                .cards
                .iter()
                .position(|c| c.symbol != round.cards[a].symbol)
                .unwrap();
            effects.extend(session.flip_card(a, now));
            effects.extend(session.flip_card(b, now));
            now += 1_000.0;
            effects.extend(session.tick(now));
        }

        for index in 0..CARD_COUNT {
            let round = session.memory().round().unwrap();
            if round.cards[index].state != CardState::FaceDown {
                continue;
            }
            let other = partner(round, index);
            effects.extend(session.flip_card(index, now));
            effects.extend(session.flip_card(other, now));
            now += 1_000.0;
            effects.extend(session.tick(now));
        }
        effects
    }

    #[test]
    fn test_first_run_defaults() {
        let session = open(MemoryStore::new());
        assert_eq!(session.stats().visits, 1);
        assert!(session.achievements().has(AchievementKind::FirstVisit));
        assert_eq!(session.achievements().len(), 1);
        assert_eq!(session.best_scores(), BestScores::default());
        assert_eq!(session.activity_level(), ActivityLevel::Novice);
        assert_eq!(session.notifications().len(), 1);
    }

    #[test]
    fn test_state_survives_reopen() {
        let mut session = open(MemoryStore::new());
        play_round(&mut session, 0, 2_000.0);
        let store = session.close();

        let session = Session::open(store, 99, 50_000.0);
        assert_eq!(session.stats().visits, 2);
        assert_eq!(session.stats().memory_rounds_won, 1);
        assert_eq!(session.best_scores().memory_best_attempts, Some(8));
        assert!(session.achievements().has(AchievementKind::MemoryMaster));
    }

    #[test]
    fn test_memory_win_updates_best_only_when_better() {
        let mut session = open(MemoryStore::new());

        let effects = play_round(&mut session, 3, 2_000.0);
        let wins = effects
            .iter()
            .filter(|e| matches!(e, SessionEffect::Game(GameEvent::RoundWon { .. })))
            .count();
        assert_eq!(wins, 1);
        assert!(effects.contains(&SessionEffect::NewMemoryBest { attempts: 11 }));
        assert!(effects.contains(&SessionEffect::AchievementUnlocked(
            AchievementKind::MemoryRecord
        )));

        // Worse round keeps the record
        let effects = play_round(&mut session, 6, 100_000.0);
        assert!(!effects.iter().any(|e| matches!(e, SessionEffect::NewMemoryBest { .. })));
        assert_eq!(session.best_scores().memory_best_attempts, Some(11));
        assert_eq!(
            session.store().get(keys::MEMORY_BEST_SCORE).unwrap().as_deref(),
            Some("11")
        );

        // Better round improves it
        let effects = play_round(&mut session, 0, 200_000.0);
        assert!(effects.contains(&SessionEffect::NewMemoryBest { attempts: 8 }));
        assert_eq!(session.stats().memory_rounds_won, 3);
    }

    #[test]
    fn test_reaction_best_progression() {
        fn record(session: &mut Session<MemoryStore>, start: f64, ms: f64) -> Vec<SessionEffect> {
            let fire_at = session.start_reaction(start);
            session.tick(fire_at);
            session.click_reaction(fire_at + ms)
        }

        let mut session = open(MemoryStore::new());

        let effects = record(&mut session, 0.0, 450.0);
        assert!(effects.contains(&SessionEffect::NewReactionBest { ms: 450 }));
        assert!(effects.contains(&SessionEffect::AchievementUnlocked(
            AchievementKind::FirstReaction
        )));

        let effects = record(&mut session, 10_000.0, 600.0);
        assert!(!effects.iter().any(|e| matches!(e, SessionEffect::NewReactionBest { .. })));
        assert_eq!(session.best_scores().best_reaction_ms, Some(450));

        let effects = record(&mut session, 20_000.0, 200.0);
        assert!(effects.contains(&SessionEffect::NewReactionBest { ms: 200 }));
        assert!(effects.contains(&SessionEffect::AchievementUnlocked(AchievementKind::SpeedDemon)));
        assert_eq!(session.best_scores().best_reaction_ms, Some(200));
        assert_eq!(session.stats().reaction_tests, 3);
    }

    #[test]
    fn test_click_before_target_ignored() {
        let mut session = open(MemoryStore::new());
        session.start_reaction(0.0);
        assert!(session.click_reaction(10.0).is_empty());
        assert_eq!(session.best_scores().best_reaction_ms, None);
    }

    #[test]
    fn test_godmode_unlocks_everything() {
        let mut session = open(MemoryStore::new());
        let effects: Vec<_> = "godmode"
            .chars()
            .flat_map(|c| session.key_pressed(c, 5_000.0))
            .collect();

        assert!(!effects.is_empty());
        for kind in AchievementKind::ALL {
            assert!(session.achievements().has(kind), "{:?}", kind);
        }
        assert_eq!(session.achievements().len(), AchievementKind::ALL.len());
        assert_eq!(session.activity_level(), ActivityLevel::Legend);

        // Idempotent
        session.apply_secret(SecretCode::GodMode, 6_000.0);
        assert_eq!(session.achievements().len(), AchievementKind::ALL.len());

        let stored: AchievementLedger =
            persistence::load(session.store(), keys::ACHIEVEMENTS).unwrap().unwrap();
        assert_eq!(stored.len(), AchievementKind::ALL.len());
    }

    #[test]
    fn test_reset_returns_to_first_run() {
        let mut store = MemoryStore::new();
        store.set(keys::THEME, "dark").unwrap();
        store.set(keys::ANNOUNCEMENT_CLOSED, "true").unwrap();

        let mut session = open(store);
        session.set_settings(Settings {
            master_volume: 0.3,
            ..Default::default()
        });
        session.apply_secret(SecretCode::GodMode, 2_000.0);
        play_round(&mut session, 0, 3_000.0);
        let fire_at = session.start_reaction(40_000.0);
        session.tick(fire_at);
        session.click_reaction(fire_at + 300.0);
        assert!(session.store().contains_key(keys::BEST_REACTION_TIME));
        assert!(session.store().contains_key(keys::SETTINGS));

        let effects = session.apply_secret(SecretCode::Reset, 50_000.0);
        assert_eq!(
            effects,
            vec![
                SessionEffect::ProgressReset,
                SessionEffect::AchievementUnlocked(AchievementKind::FirstVisit),
            ]
        );

        assert_eq!(session.stats().visits, 1);
        assert_eq!(session.achievements().len(), 1);
        assert_eq!(session.best_scores(), BestScores::default());
        assert_eq!(*session.settings(), Settings::default());
        assert!(session.memory().round().is_none());

        let store = session.store();
        assert!(!store.contains_key(keys::THEME));
        assert!(!store.contains_key(keys::ANNOUNCEMENT_CLOSED));
        assert!(!store.contains_key(keys::MEMORY_BEST_SCORE));
        assert!(!store.contains_key(keys::BEST_REACTION_TIME));
        assert!(!store.contains_key(keys::SETTINGS));
    }

    #[test]
    fn test_reset_stops_matrix_overlay() {
        let mut session = open(MemoryStore::new());
        session.apply_secret(SecretCode::Matrix, 0.0);
        assert!(session.matrix_active());

        let effects = session.apply_secret(SecretCode::Reset, 100.0);
        assert_eq!(effects.first(), Some(&SessionEffect::MatrixEnded));
        assert!(effects.contains(&SessionEffect::ProgressReset));
        assert!(!session.matrix_active());

        // Already ended; the old deadline emits nothing
        for now in [1_000.0, 5_000.0, 60_000.0] {
            assert!(!session.tick(now).contains(&SessionEffect::MatrixEnded));
        }
    }

    #[test]
    fn test_matrix_overlay_expires() {
        let mut session = open(MemoryStore::new());
        let effects = session.apply_secret(SecretCode::Matrix, 0.0);
        assert!(effects.contains(&SessionEffect::MatrixRain { until: 5_000.0 }));
        assert!(session.matrix_active());

        assert!(!session.tick(4_999.0).contains(&SessionEffect::MatrixEnded));
        assert!(session.tick(5_000.0).contains(&SessionEffect::MatrixEnded));
        assert!(!session.matrix_active());
    }

    #[test]
    fn test_reduced_motion_skips_overlays() {
        let mut session = open(MemoryStore::new());
        session.set_settings(Settings {
            reduced_motion: true,
            ..Default::default()
        });
        let effects = session.apply_secret(SecretCode::Matrix, 0.0);
        assert!(!effects.iter().any(|e| matches!(e, SessionEffect::MatrixRain { .. })));
        assert!(session.achievements().has(AchievementKind::MatrixWalker));
    }

    #[test]
    fn test_corrupt_record_isolated() {
        let mut store = MemoryStore::new();
        store.set(keys::ACHIEVEMENTS, "[{broken").unwrap();
        store.set(keys::STATS, r#"{"version":1,"data":{"visits":4}}"#).unwrap();
        store.set(keys::BEST_REACTION_TIME, "321").unwrap();

        let session = open(store);
        assert_eq!(session.stats().visits, 5);
        assert_eq!(session.best_scores().best_reaction_ms, Some(321));
        assert!(session.achievements().has(AchievementKind::FirstVisit));
        assert!(session.achievements().has(AchievementKind::Dedicated));
    }

    #[test]
    fn test_toasts_expire_through_tick() {
        let mut session = open(MemoryStore::new());
        let id = session.notifications()[0].id;
        let effects = session.tick(1_000.0 + 3_000.0);
        assert!(effects.contains(&SessionEffect::NotificationExpired { id }));
        assert!(session.notifications().is_empty());
    }
}
