//! Games Verse catalog
//!
//! - `data`: static games and news
//! - `render`: HTML for the game and news lists
//! - `theme`: light/dark theme and announcement banner state
//! - `host`: messenger bridge and browser fallbacks

pub mod data;
pub mod host;
pub mod render;
pub mod theme;

pub use data::{APP_BUILD, APP_VERSION, GAMES, GameCard, NewsItem};
pub use host::{HostBridge, LaunchRoute, ShareRoute, UserProfile};
pub use theme::Theme;

/// Run one startup step, logging its failure instead of aborting the rest.
/// Returns whether the step succeeded.
pub fn setup_step<E: std::fmt::Display>(name: &str, step: impl FnOnce() -> Result<(), E>) -> bool {
    match step() {
        Ok(()) => true,
        Err(e) => {
            log::error!("Setup step `{}` failed: {}", name, e);
            false
        }
    }
}
