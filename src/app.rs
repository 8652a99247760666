//! App core for mediafocus.
//!
//! Builds the coordinator from configuration and the host's collaborators,
//! and owns its startup/shutdown lifecycle.

use std::path::PathBuf;
use std::sync::Arc;

use tracing::info;

use crate::bridge::{Clock, SystemClock, TabDirectory, TabMessenger};
use crate::managers::coordinator::Coordinator;
use crate::services::settings_store::{JsonSettingsStore, SettingsStore};
use crate::types::config::MediaFocusConfig;
use crate::types::errors::ConfigError;

/// Where the app reads its files from. `None` means the platform default.
#[derive(Debug, Clone, Default)]
pub struct AppPaths {
    pub config: Option<PathBuf>,
    pub settings: Option<PathBuf>,
}

impl AppPaths {
    /// Reads `MEDIAFOCUS_CONFIG` and `MEDIAFOCUS_SETTINGS` overrides.
    pub fn from_env() -> Self {
        Self {
            config: std::env::var_os("MEDIAFOCUS_CONFIG").map(PathBuf::from),
            settings: std::env::var_os("MEDIAFOCUS_SETTINGS").map(PathBuf::from),
        }
    }
}

pub struct App {
    pub config: MediaFocusConfig,
    pub coordinator: Arc<Coordinator>,
}

impl App {
    pub fn new<H>(config: MediaFocusConfig, host: Arc<H>, store: Arc<dyn SettingsStore>) -> Result<Self, ConfigError>
    where
        H: TabDirectory + TabMessenger + 'static,
    {
        Self::with_clock(config, host, store, Arc::new(SystemClock))
    }

    pub fn with_clock<H>(
        config: MediaFocusConfig,
        host: Arc<H>,
        store: Arc<dyn SettingsStore>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, ConfigError>
    where
        H: TabDirectory + TabMessenger + 'static,
    {
        let group = config.group.compile()?;
        let directory: Arc<dyn TabDirectory> = host.clone();
        let messenger: Arc<dyn TabMessenger> = host;
        let coordinator = Arc::new(Coordinator::new(group, directory, messenger, store, clock));
        Ok(Self { config, coordinator })
    }

    /// Loads config and settings from `paths` and builds the app on `host`.
    pub fn load<H>(paths: &AppPaths, host: Arc<H>) -> Result<Self, ConfigError>
    where
        H: TabDirectory + TabMessenger + 'static,
    {
        let config_path = paths.config.clone().unwrap_or_else(MediaFocusConfig::default_path);
        let config = MediaFocusConfig::load(&config_path)?;
        let store = Arc::new(JsonSettingsStore::new(paths.settings.clone()));
        info!(config = %config_path.display(), settings = %store.path().display(), "loading mediafocus");
        Self::new(config, host, store)
    }

    /// Startup sequence: load the persisted policy and adopt open tabs.
    pub async fn startup(&self) {
        self.coordinator.start().await;
    }

    /// Shutdown sequence: drop all tracking state.
    pub fn shutdown(&self) {
        self.coordinator.reset();
        info!("mediafocus stopped");
    }
}
