//! Save/load persistence over a [`KeyValueStore`](crate::platform::KeyValueStore)
//!
//! Features:
//! - Versioned JSON envelope (`{"version": 1, "data": ...}`)
//! - Legacy bare-JSON records are still readable
//! - Corruption detection with fallback to defaults

pub mod envelope;

pub use envelope::{
    Envelope, FORMAT_VERSION, PersistError, decode, encode, load, load_or_default, save,
};
