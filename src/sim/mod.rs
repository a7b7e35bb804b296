//! Deterministic mini-game engines
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Time is passed in as millisecond timestamps, never read from a clock
//! - Seeded RNG only
//! - Delayed effects are scheduled events tagged with a generation
//! - No DOM, storage or platform dependencies

pub mod event;
pub mod memory;
pub mod reaction;
pub mod schedule;

pub use event::GameEvent;
pub use memory::{
    CARD_COUNT, CardState, MISMATCH_DELAY_MS, MemoryCard, MemoryGame, MemoryRound, SYMBOL_KINDS,
    SYMBOLS,
};
pub use reaction::{ReactionPhase, ReactionTimer};
pub use schedule::{Scheduled, Scheduler};
