//! Events emitted by the mini-game engines.
//! The session and presentation layer consume these for progression, sound
//! and DOM updates.

#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    /// A memory card was turned face up
    CardRevealed { index: usize, symbol: char },
    /// Two revealed cards share a symbol and are now settled
    PairMatched { first: usize, second: usize },
    /// Two revealed cards differ; they revert after the mismatch delay
    PairMismatched { first: usize, second: usize },
    /// A mismatched pair turned back face down
    PairReverted { first: usize, second: usize },
    /// The pending slot cleared; the board accepts flips again
    FlipsUnlocked,
    /// All pairs found
    RoundWon { attempts: u32 },
    /// The reaction target appeared
    TargetShown,
    /// The reaction target was clicked
    ReactionRecorded { ms: u32 },
}
