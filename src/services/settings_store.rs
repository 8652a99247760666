// mediafocus settings persistence
// Loads and saves the user's preferences. The coordinator reads them once at
// startup and writes them on every settings update.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::platform;
use crate::types::errors::SettingsError;
use crate::types::settings::{ExtensionSettings, StoredSettings};

/// Persistence collaborator for user preferences.
pub trait SettingsStore: Send + Sync {
    fn load(&self) -> Result<StoredSettings, SettingsError>;
    fn save(&self, settings: &ExtensionSettings) -> Result<(), SettingsError>;
}

/// Settings store that persists preferences as JSON on disk.
pub struct JsonSettingsStore {
    path: PathBuf,
}

impl JsonSettingsStore {
    /// Creates a new JsonSettingsStore.
    ///
    /// If `path_override` is `Some`, uses that path for the settings file.
    /// Otherwise, uses the platform-specific config directory with `settings.json`.
    pub fn new(path_override: Option<PathBuf>) -> Self {
        let path = path_override.unwrap_or_else(|| platform::get_config_dir().join("settings.json"));
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SettingsStore for JsonSettingsStore {
    /// A missing file is not an error: it yields empty settings so the
    /// defaults apply. A malformed file is.
    fn load(&self) -> Result<StoredSettings, SettingsError> {
        if !self.path.exists() {
            return Ok(StoredSettings::default());
        }
        let content = fs::read_to_string(&self.path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Creates parent directories if they don't exist.
    fn save(&self, settings: &ExtensionSettings) -> Result<(), SettingsError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(&StoredSettings::from(*settings))?;
        fs::write(&self.path, json)?;
        Ok(())
    }
}

/// In-memory store, for tests and hosts that keep preferences elsewhere.
#[derive(Default)]
pub struct MemorySettingsStore {
    stored: Mutex<StoredSettings>,
    saves: Mutex<usize>,
}

impl MemorySettingsStore {
    pub fn new(stored: StoredSettings) -> Self {
        Self {
            stored: Mutex::new(stored),
            saves: Mutex::new(0),
        }
    }

    pub fn stored(&self) -> StoredSettings {
        self.stored.lock().map(|s| *s).unwrap_or_default()
    }

    /// Number of successful `save` calls.
    pub fn save_count(&self) -> usize {
        self.saves.lock().map(|n| *n).unwrap_or_default()
    }
}

impl SettingsStore for MemorySettingsStore {
    fn load(&self) -> Result<StoredSettings, SettingsError> {
        Ok(self.stored())
    }

    fn save(&self, settings: &ExtensionSettings) -> Result<(), SettingsError> {
        if let Ok(mut stored) = self.stored.lock() {
            *stored = StoredSettings::from(*settings);
        }
        if let Ok(mut saves) = self.saves.lock() {
            *saves += 1;
        }
        Ok(())
    }
}
