//! Versioned record envelope

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::platform::{KeyValueStore, StorageError};

/// Current on-disk format version
pub const FORMAT_VERSION: u32 = 1;

/// Wrapper written around every JSON record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub version: u32,
    pub data: T,
}

impl<T> Envelope<T> {
    pub fn new(data: T) -> Self {
        Self {
            version: FORMAT_VERSION,
            data,
        }
    }
}

#[derive(Debug, Error)]
pub enum PersistError {
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error("record `{key}` is corrupt: {source}")]
    Corrupt {
        key: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("record `{key}` has unsupported version {version}")]
    UnsupportedVersion { key: String, version: u64 },
    #[error("failed to encode `{key}`: {source}")]
    Encode {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Decode a stored record, accepting both the envelope and the legacy bare shape
pub fn decode<T: DeserializeOwned>(key: &str, json: &str) -> Result<T, PersistError> {
    let corrupt = |source| PersistError::Corrupt {
        key: key.to_string(),
        source,
    };

    let value: Value = serde_json::from_str(json).map_err(corrupt)?;

    let payload = match value {
        Value::Object(mut map) if map.contains_key("version") && map.contains_key("data") => {
            let version = map.get("version").and_then(Value::as_u64).unwrap_or(0);
            if version == 0 || version > FORMAT_VERSION as u64 {
                return Err(PersistError::UnsupportedVersion {
                    key: key.to_string(),
                    version,
                });
            }
            map.remove("data").unwrap_or(Value::Null)
        }
        legacy => legacy,
    };

    serde_json::from_value(payload).map_err(corrupt)
}

/// Encode a record inside the current envelope
pub fn encode<T: Serialize>(key: &str, value: &T) -> Result<String, PersistError> {
    serde_json::to_string(&Envelope::new(value)).map_err(|source| PersistError::Encode {
        key: key.to_string(),
        source,
    })
}

/// Load a record; `Ok(None)` when the key is absent
pub fn load<T: DeserializeOwned>(
    store: &impl KeyValueStore,
    key: &str,
) -> Result<Option<T>, PersistError> {
    match store.get(key)? {
        Some(json) => decode(key, &json).map(Some),
        None => Ok(None),
    }
}

/// Load a record, falling back to `T::default()` when absent or unreadable
pub fn load_or_default<T: DeserializeOwned + Default>(store: &impl KeyValueStore, key: &str) -> T {
    match load(store, key) {
        Ok(Some(value)) => {
            log::info!("Loaded `{}`", key);
            value
        }
        Ok(None) => T::default(),
        Err(e) => {
            log::warn!("{}; using defaults", e);
            T::default()
        }
    }
}

/// Save a record inside the current envelope
pub fn save<T: Serialize>(
    store: &mut impl KeyValueStore,
    key: &str,
    value: &T,
) -> Result<(), PersistError> {
    let json = encode(key, value)?;
    store.set(key, &json)?;
    log::debug!("Saved `{}`", key);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::MemoryStore;

    #[derive(Debug, Default, PartialEq, Serialize, Deserialize)]
    #[serde(default)]
    struct Counters {
        visits: u32,
        wins: u32,
    }

    #[test]
    fn test_save_writes_envelope() {
        let mut store = MemoryStore::new();
        save(&mut store, "counters", &Counters { visits: 2, wins: 1 }).unwrap();

        let raw = store.get("counters").unwrap().unwrap();
        let value: Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value["version"], FORMAT_VERSION);
        assert_eq!(value["data"]["visits"], 2);

        let loaded: Option<Counters> = load(&store, "counters").unwrap();
        assert_eq!(loaded, Some(Counters { visits: 2, wins: 1 }));
    }

    #[test]
    fn test_legacy_bare_record_is_readable() {
        let decoded: Counters = decode("counters", r#"{"visits": 7}"#).unwrap();
        assert_eq!(decoded, Counters { visits: 7, wins: 0 });
    }

    #[test]
    fn test_future_version_rejected() {
        let result: Result<Counters, _> = decode("counters", r#"{"version": 99, "data": {}}"#);
        assert!(matches!(
            result,
            Err(PersistError::UnsupportedVersion { version: 99, .. })
        ));
    }

    #[test]
    fn test_corrupt_record_falls_back_to_default() {
        let mut store = MemoryStore::new();
        store.set("counters", "{not json").unwrap();

        assert!(matches!(
            load::<Counters>(&store, "counters"),
            Err(PersistError::Corrupt { .. })
        ));
        let counters: Counters = load_or_default(&store, "counters");
        assert_eq!(counters, Counters::default());
    }
}
