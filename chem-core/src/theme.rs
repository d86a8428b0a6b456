//! Theme preference: resolved once at startup, persisted on every toggle.
//!
//! Precedence is explicit stored preference, then the system color scheme,
//! then light.

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};

/// Key the theme preference is stored under.
pub const THEME_KEY: &str = "theme";

/// Visual theme.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    /// Light background, dark text.
    #[default]
    Light,
    /// Dark background, light text.
    Dark,
}

impl Theme {
    /// The other theme.
    #[must_use]
    pub fn toggled(self) -> Self {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::Light,
        }
    }

    /// Stored string form.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Theme {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "light" => Ok(Self::Light),
            "dark" => Ok(Self::Dark),
            other => Err(CoreError::InvalidValue(format!("unknown theme '{other}'"))),
        }
    }
}

/// Small key-value store for user preferences.
pub trait PreferenceStore: Send {
    /// Read a value.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing storage cannot be read.
    fn get(&self, key: &str) -> CoreResult<Option<String>>;

    /// Write a value.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing storage cannot be written.
    fn set(&mut self, key: &str, value: &str) -> CoreResult<()>;
}

/// In-memory store, used when nothing should touch disk.
#[derive(Debug, Clone, Default)]
pub struct MemoryPreferenceStore {
    values: BTreeMap<String, String>,
}

impl PreferenceStore for MemoryPreferenceStore {
    fn get(&self, key: &str) -> CoreResult<Option<String>> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> CoreResult<()> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// JSON object on disk, one entry per key.
#[derive(Debug, Clone)]
pub struct FilePreferenceStore {
    path: PathBuf,
}

impl FilePreferenceStore {
    /// Use the given file. It is created on first write.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Backing file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> CoreResult<BTreeMap<String, String>> {
        match std::fs::read_to_string(&self.path) {
            Ok(raw) if raw.trim().is_empty() => Ok(BTreeMap::new()),
            Ok(raw) => Ok(serde_json::from_str(&raw)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(e.into()),
        }
    }
}

impl PreferenceStore for FilePreferenceStore {
    fn get(&self, key: &str) -> CoreResult<Option<String>> {
        Ok(self.load()?.remove(key))
    }

    fn set(&mut self, key: &str, value: &str) -> CoreResult<()> {
        let mut values = self.load().unwrap_or_else(|e| {
            tracing::warn!("Discarding unreadable preferences at {:?}: {}", self.path, e);
            BTreeMap::new()
        });
        values.insert(key.to_string(), value.to_string());

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(&self.path, serde_json::to_string_pretty(&values)?)?;
        Ok(())
    }
}

/// Process-wide theme state with a single read/toggle interface.
pub struct ThemeManager {
    store: Box<dyn PreferenceStore>,
    current: Theme,
}

impl ThemeManager {
    /// Resolve the starting theme from the store and the system preference.
    ///
    /// An unreadable or unrecognised stored value is ignored.
    #[must_use]
    pub fn initialise(store: Box<dyn PreferenceStore>, system: Option<Theme>) -> Self {
        let stored = match store.get(THEME_KEY) {
            Ok(Some(raw)) => match raw.parse::<Theme>() {
                Ok(theme) => Some(theme),
                Err(e) => {
                    tracing::warn!("Ignoring stored theme: {}", e);
                    None
                }
            },
            Ok(None) => None,
            Err(e) => {
                tracing::warn!("Could not read theme preference: {}", e);
                None
            }
        };

        let current = stored.or(system).unwrap_or_default();
        tracing::debug!(
            "Theme resolved to {} (stored: {:?}, system: {:?})",
            current,
            stored,
            system
        );
        Self { store, current }
    }

    /// Active theme.
    #[must_use]
    pub fn current(&self) -> Theme {
        self.current
    }

    /// Switch theme and persist the choice.
    ///
    /// # Errors
    ///
    /// Returns an error if the preference cannot be written. The in-memory
    /// theme is still switched.
    pub fn toggle(&mut self) -> CoreResult<Theme> {
        self.current = self.current.toggled();
        self.store.set(THEME_KEY, self.current.as_str())?;
        Ok(self.current)
    }
}

impl fmt::Debug for ThemeManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ThemeManager")
            .field("current", &self.current)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_with(theme: Option<&str>) -> Box<dyn PreferenceStore> {
        let mut store = MemoryPreferenceStore::default();
        if let Some(value) = theme {
            store.set(THEME_KEY, value).expect("set");
        }
        Box::new(store)
    }

    #[test]
    fn test_precedence() {
        let stored = ThemeManager::initialise(store_with(Some("dark")), Some(Theme::Light));
        assert_eq!(stored.current(), Theme::Dark);

        let system = ThemeManager::initialise(store_with(None), Some(Theme::Dark));
        assert_eq!(system.current(), Theme::Dark);

        let fallback = ThemeManager::initialise(store_with(None), None);
        assert_eq!(fallback.current(), Theme::Light);
    }

    #[test]
    fn test_garbage_stored_value_falls_through() {
        let manager = ThemeManager::initialise(store_with(Some("sepia")), Some(Theme::Dark));
        assert_eq!(manager.current(), Theme::Dark);
    }

    #[test]
    fn test_toggle_persists_to_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("nested").join("prefs.json");

        let mut manager = ThemeManager::initialise(Box::new(FilePreferenceStore::new(&path)), None);
        assert_eq!(manager.toggle().expect("toggle"), Theme::Dark);

        let store = FilePreferenceStore::new(&path);
        assert_eq!(store.get(THEME_KEY).expect("get").as_deref(), Some("dark"));

        let reloaded = ThemeManager::initialise(Box::new(store), Some(Theme::Light));
        assert_eq!(reloaded.current(), Theme::Dark);
    }

    #[test]
    fn test_file_store_keeps_other_keys() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("prefs.json");
        let mut store = FilePreferenceStore::new(&path);
        store.set("level", "board").expect("set");
        store.set(THEME_KEY, "light").expect("set");
        assert_eq!(store.get("level").expect("get").as_deref(), Some("board"));
    }
}
