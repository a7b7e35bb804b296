//! Platform abstraction layer
//!
//! Handles browser/native differences for:
//! - Time (wall clock in milliseconds)
//! - Storage (LocalStorage on web, in-memory map natively and in tests)

pub mod storage;
pub mod time;

pub use storage::{KeyValueStore, MemoryStore, StorageError, keys};
#[cfg(target_arch = "wasm32")]
pub use storage::LocalStore;
pub use time::now_ms;
