//! Memory match engine
//!
//! Card lifecycle: `FaceDown -> FaceUp -> Matched` (terminal) or back to
//! `FaceDown` once a mismatch resolves. At most two cards are pending
//! (face up, unconfirmed). The pending slot stays full until the resolve
//! event fires, so a third flip is blocked for the whole delay even after a
//! successful match.

use rand::SeedableRng;
use rand::seq::SliceRandom;
use rand_pcg::Pcg32;

use super::event::GameEvent;
use super::schedule::Scheduler;

/// Distinct symbols per round
pub const SYMBOL_KINDS: usize = 8;
/// Cards per round (every symbol twice)
pub const CARD_COUNT: usize = SYMBOL_KINDS * 2;
/// Delay before a revealed pair is resolved
pub const MISMATCH_DELAY_MS: f64 = 1000.0;

/// Card faces
pub const SYMBOLS: [char; SYMBOL_KINDS] = ['🚀', '🎮', '💎', '⚡', '🌟', '🔥', '🎯', '🌈'];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardState {
    FaceDown,
    /// Revealed but not yet confirmed as part of a pair
    FaceUp,
    Matched,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MemoryCard {
    pub index: usize,
    pub symbol: char,
    pub state: CardState,
}

impl MemoryCard {
    pub fn is_face_up(&self) -> bool {
        self.state != CardState::FaceDown
    }
}

/// One dealt board
#[derive(Debug, Clone)]
pub struct MemoryRound {
    /// Generation tag for scheduled events
    pub round_id: u64,
    pub cards: Vec<MemoryCard>,
    /// Indices of revealed, unconfirmed cards (0..=2)
    pub pending: Vec<usize>,
    pub attempts: u32,
    pub matched_pairs: u32,
    pub won: bool,
    pub started_at: f64,
}

impl MemoryRound {
    /// True while two cards wait for their resolve event
    pub fn is_locked(&self) -> bool {
        self.pending.len() >= 2
    }

    /// Whether `flip(index)` would do anything
    pub fn can_flip(&self, index: usize) -> bool {
        !self.won
            && !self.is_locked()
            && self
                .cards
                .get(index)
                .is_some_and(|c| c.state == CardState::FaceDown)
    }
}

/// Scheduled follow-up for a revealed pair
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Resolve {
    Matched,
    Mismatched { first: usize, second: usize },
}

/// Memory game: deals rounds and applies flips
#[derive(Debug, Clone)]
pub struct MemoryGame {
    rng: Pcg32,
    round: Option<MemoryRound>,
    next_round_id: u64,
    timers: Scheduler<Resolve>,
    resolve_delay_ms: f64,
}

impl MemoryGame {
    pub fn new(seed: u64) -> Self {
        Self::with_delay(seed, MISMATCH_DELAY_MS)
    }

    pub fn with_delay(seed: u64, resolve_delay_ms: f64) -> Self {
        Self {
            rng: Pcg32::seed_from_u64(seed),
            round: None,
            next_round_id: 1,
            timers: Scheduler::new(),
            resolve_delay_ms: resolve_delay_ms.max(0.0),
        }
    }

    /// Deal a fresh board. Any pending resolve from the previous round is dropped.
    pub fn start_round(&mut self, now: f64) -> &MemoryRound {
        let round_id = self.next_round_id;
        self.next_round_id += 1;

        let mut symbols: Vec<char> = SYMBOLS.iter().flat_map(|&s| [s, s]).collect();
        symbols.shuffle(&mut self.rng);

        let cards = symbols
            .into_iter()
            .enumerate()
            .map(|(index, symbol)| MemoryCard {
                index,
                symbol,
                state: CardState::FaceDown,
            })
            .collect();

        self.timers.retain_generation(round_id);
        log::debug!("Memory round {} dealt", round_id);

        self.round.insert(MemoryRound {
            round_id,
            cards,
            pending: Vec::with_capacity(2),
            attempts: 0,
            matched_pairs: 0,
            won: false,
            started_at: now,
        })
    }

    pub fn round(&self) -> Option<&MemoryRound> {
        self.round.as_ref()
    }

    pub fn attempts(&self) -> u32 {
        self.round.as_ref().map_or(0, |r| r.attempts)
    }

    pub fn matched_pairs(&self) -> u32 {
        self.round.as_ref().map_or(0, |r| r.matched_pairs)
    }

    pub fn is_won(&self) -> bool {
        self.round.as_ref().is_some_and(|r| r.won)
    }

    /// Reveal a card. Invalid or blocked flips return no events.
    pub fn flip(&mut self, index: usize, now: f64) -> Vec<GameEvent> {
        let Some(round) = self.round.as_mut() else {
            return Vec::new();
        };
        if !round.can_flip(index) {
            return Vec::new();
        }

        let card = &mut round.cards[index];
        card.state = CardState::FaceUp;
        round.pending.push(index);

        let mut events = vec![GameEvent::CardRevealed {
            index,
            symbol: card.symbol,
        }];

        if round.pending.len() < 2 {
            return events;
        }

        round.attempts += 1;
        let (first, second) = (round.pending[0], round.pending[1]);

        let resolve = if round.cards[first].symbol == round.cards[second].symbol {
            round.cards[first].state = CardState::Matched;
            round.cards[second].state = CardState::Matched;
            round.matched_pairs += 1;
            events.push(GameEvent::PairMatched { first, second });

            if round.matched_pairs as usize == SYMBOL_KINDS && !round.won {
                round.won = true;
                log::info!(
                    "Memory round {} won in {} attempts",
                    round.round_id,
                    round.attempts
                );
                events.push(GameEvent::RoundWon {
                    attempts: round.attempts,
                });
            }
            Resolve::Matched
        } else {
            events.push(GameEvent::PairMismatched { first, second });
            Resolve::Mismatched { first, second }
        };

        self.timers
            .schedule(now + self.resolve_delay_ms, round.round_id, resolve);

        events
    }

    /// Fire due resolve events
    pub fn tick(&mut self, now: f64) -> Vec<GameEvent> {
        let Some(round) = self.round.as_mut() else {
            self.timers.clear();
            return Vec::new();
        };

        let mut events = Vec::new();
        for resolve in self.timers.drain_due(now, round.round_id) {
            match resolve {
                Resolve::Mismatched { first, second } => {
                    for idx in [first, second] {
                        if round.cards[idx].state == CardState::FaceUp {
                            round.cards[idx].state = CardState::FaceDown;
                        }
                    }
                    events.push(GameEvent::PairReverted { first, second });
                }
                Resolve::Matched => {}
            }
            round.pending.clear();
            events.push(GameEvent::FlipsUnlocked);
        }
        events
    }

    /// Change the resolve delay for pairs revealed from now on
    pub fn set_resolve_delay(&mut self, resolve_delay_ms: f64) {
        self.resolve_delay_ms = resolve_delay_ms.max(0.0);
    }

    /// Timestamp of the next pending resolve, if any
    pub fn next_due(&self) -> Option<f64> {
        self.timers.next_due()
    }
}
