use crate::storage::{KeyValueStore, StorageError, THEME_KEY};
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
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

    pub fn from_str(value: &str) -> Option<Self> {
        match value {
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

    pub fn is_dark(&self) -> bool {
        matches!(self, Theme::Dark)
    }
}

/// Reads the persisted theme, falling back when it is absent or unreadable.
pub fn load_theme<S: KeyValueStore + ?Sized>(storage: &S, fallback: Theme) -> Theme {
    match storage.get(THEME_KEY) {
        Ok(Some(raw)) => Theme::from_str(&raw).unwrap_or(fallback),
        Ok(None) => fallback,
        Err(err) => {
            tracing::warn!(error = %err, "could not read theme");
            fallback
        }
    }
}

pub fn save_theme<S: KeyValueStore + ?Sized>(
    storage: &mut S,
    theme: Theme,
) -> Result<(), StorageError> {
    storage.set(THEME_KEY, theme.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;

    #[test]
    fn load_uses_fallback_when_missing_or_unknown() {
        let mut storage = MemoryStorage::new();
        assert_eq!(load_theme(&storage, Theme::Dark), Theme::Dark);

        storage.set(THEME_KEY, "sepia").expect("set");
        assert_eq!(load_theme(&storage, Theme::Light), Theme::Light);
    }

    #[test]
    fn toggle_and_save_roundtrip() {
        let mut storage = MemoryStorage::new();
        let theme = load_theme(&storage, Theme::Light).toggled();
        save_theme(&mut storage, theme).expect("save");

        assert_eq!(storage.get(THEME_KEY).expect("get").as_deref(), Some("dark"));
        assert_eq!(load_theme(&storage, Theme::Light), Theme::Dark);
        assert!(theme.is_dark());
    }
}
