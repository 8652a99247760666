//! Integration-level tests for settings persistence.
//!
//! The coordinator reads the persisted policy once at startup and writes it
//! on every update; these tests exercise that contract through the store.

use std::sync::Arc;

use mediafocus::bridge::simulated::{SimulatedBrowser, SimulatedClock};
use mediafocus::managers::coordinator::Coordinator;
use mediafocus::services::settings_store::{JsonSettingsStore, SettingsStore};
use mediafocus::types::config::MediaFocusConfig;
use mediafocus::types::settings::{ExtensionSettings, StoredSettings};
use tempfile::TempDir;

/// Helper: a store backed by a temp directory that lives as long as the
/// caller holds the `TempDir` handle.
fn store_in_temp(dir: &TempDir) -> JsonSettingsStore {
    JsonSettingsStore::new(Some(dir.path().join("settings.json")))
}

fn coordinator_with(store: Arc<dyn SettingsStore>) -> Coordinator {
    let browser = SimulatedBrowser::new(MediaFocusConfig::default()).unwrap();
    Coordinator::new(
        browser.group_domain().clone(),
        browser.clone(),
        browser,
        store,
        Arc::new(SimulatedClock::new(0)),
    )
}

#[test]
fn test_load_without_file_returns_empty_settings() {
    let dir = TempDir::new().unwrap();
    let store = store_in_temp(&dir);
    assert_eq!(store.load().unwrap(), StoredSettings::default());
}

#[test]
fn test_saved_value_visible_to_new_store() {
    let dir = TempDir::new().unwrap();
    store_in_temp(&dir)
        .save(&ExtensionSettings { auto_resume: false })
        .unwrap();

    let reloaded = store_in_temp(&dir).load().unwrap();
    assert_eq!(reloaded.auto_resume, Some(false));
}

#[test]
fn test_file_uses_camel_case_key() {
    let dir = TempDir::new().unwrap();
    let store = store_in_temp(&dir);
    store.save(&ExtensionSettings { auto_resume: true }).unwrap();
    let raw = std::fs::read_to_string(store.path()).unwrap();
    assert!(raw.contains("\"autoResume\": true"), "unexpected file contents: {raw}");
}

#[tokio::test]
async fn test_coordinator_reads_persisted_policy_on_start() {
    let dir = TempDir::new().unwrap();
    store_in_temp(&dir)
        .save(&ExtensionSettings { auto_resume: false })
        .unwrap();

    let coordinator = coordinator_with(Arc::new(store_in_temp(&dir)));
    assert!(coordinator.auto_resume(), "default applies before start");
    coordinator.start().await;
    assert!(!coordinator.auto_resume());
}

#[tokio::test]
async fn test_coordinator_falls_back_to_default_on_corrupt_file() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("settings.json"), "not json at all").unwrap();

    let coordinator = coordinator_with(Arc::new(store_in_temp(&dir)));
    coordinator.start().await;
    assert!(coordinator.auto_resume());
}

#[test]
fn test_update_settings_writes_through() {
    let dir = TempDir::new().unwrap();
    let coordinator = coordinator_with(Arc::new(store_in_temp(&dir)));

    coordinator.update_settings(ExtensionSettings { auto_resume: false });

    assert!(!coordinator.auto_resume());
    assert_eq!(store_in_temp(&dir).load().unwrap().auto_resume, Some(false));
}

#[test]
fn test_failed_save_keeps_in_memory_value() {
    let dir = TempDir::new().unwrap();
    // A directory where the file should be makes every write fail.
    let blocked = dir.path().join("settings.json");
    std::fs::create_dir_all(&blocked).unwrap();
    let coordinator = coordinator_with(Arc::new(JsonSettingsStore::new(Some(blocked))));

    coordinator.update_settings(ExtensionSettings { auto_resume: false });
    assert!(!coordinator.auto_resume());
}
