//! Light/dark theme and the dismissible announcement banner

use crate::platform::{KeyValueStore, StorageError, keys};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "light" => Some(Theme::Light),
            "dark" => Some(Theme::Dark),
            _ => None,
        }
    }

    pub fn toggled(&self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }

    /// Icon and caption for the toggle button (offers the other theme)
    pub fn button_label(&self) -> (&'static str, &'static str) {
        match self {
            Theme::Dark => ("☀️", "Светлая тема"),
            Theme::Light => ("🌙", "Темная тема"),
        }
    }

    /// Saved theme, light when unset or unrecognised
    pub fn load(store: &impl KeyValueStore) -> Self {
        match store.get(keys::THEME) {
            Ok(Some(value)) => Self::from_str(&value).unwrap_or_default(),
            Ok(None) => Self::default(),
            Err(e) => {
                log::warn!("{}", e);
                Self::default()
            }
        }
    }

    pub fn save(&self, store: &mut impl KeyValueStore) -> Result<(), StorageError> {
        store.set(keys::THEME, self.as_str())
    }

    /// Flip and persist; returns the new theme
    pub fn toggle(store: &mut impl KeyValueStore) -> Result<Self, StorageError> {
        let next = Self::load(&*store).toggled();
        next.save(store)?;
        log::info!("Theme switched to {}", next.as_str());
        Ok(next)
    }
}

/// Whether the announcement banner was dismissed
pub fn announcement_closed(store: &impl KeyValueStore) -> bool {
    matches!(store.get(keys::ANNOUNCEMENT_CLOSED), Ok(Some(v)) if v == "true")
}

pub fn close_announcement(store: &mut impl KeyValueStore) -> Result<(), StorageError> {
    store.set(keys::ANNOUNCEMENT_CLOSED, "true")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::MemoryStore;

    #[test]
    fn test_theme_toggle_persists() {
        let mut store = MemoryStore::new();
        assert_eq!(Theme::load(&store), Theme::Light);

        assert_eq!(Theme::toggle(&mut store).unwrap(), Theme::Dark);
        assert_eq!(store.get(keys::THEME).unwrap().as_deref(), Some("dark"));
        assert_eq!(Theme::toggle(&mut store).unwrap(), Theme::Light);
    }

    #[test]
    fn test_unknown_theme_falls_back() {
        let mut store = MemoryStore::new();
        store.set(keys::THEME, "sepia").unwrap();
        assert_eq!(Theme::load(&store), Theme::Light);
    }

    #[test]
    fn test_button_label_offers_other_theme() {
        assert_eq!(Theme::Dark.button_label().1, "Светлая тема");
        assert_eq!(Theme::Light.button_label().1, "Темная тема");
    }

    #[test]
    fn test_announcement() {
        let mut store = MemoryStore::new();
        assert!(!announcement_closed(&store));
        close_announcement(&mut store).unwrap();
        assert!(announcement_closed(&store));
    }
}
