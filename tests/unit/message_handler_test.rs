use std::sync::Arc;

use mediafocus::bridge::simulated::{SimulatedBrowser, SimulatedClock};
use mediafocus::managers::coordinator::Coordinator;
use mediafocus::message_handler::{dispatch_event, handle_runtime_message, handle_tab_command};
use mediafocus::services::settings_store::MemorySettingsStore;
use mediafocus::types::config::MediaFocusConfig;
use mediafocus::types::errors::DispatchError;
use mediafocus::types::media::MediaKind;
use mediafocus::types::message::BrowserEvent;
use mediafocus::types::tab::{TabId, WindowId};
use serde_json::json;

fn setup() -> (Arc<SimulatedBrowser>, Arc<Coordinator>) {
    let browser = SimulatedBrowser::new(MediaFocusConfig::default()).unwrap();
    let coordinator = Arc::new(Coordinator::new(
        browser.group_domain().clone(),
        browser.clone(),
        browser.clone(),
        Arc::new(MemorySettingsStore::default()),
        Arc::new(SimulatedClock::new(0)),
    ));
    browser.attach(&coordinator);
    (browser, coordinator)
}

fn event(value: serde_json::Value) -> BrowserEvent {
    serde_json::from_value(value).unwrap()
}

// ─── Runtime messages ───

#[test]
fn test_media_paused_then_should_resume() {
    let (_browser, coordinator) = setup();
    let sender = Some(TabId(3));

    let reply = handle_runtime_message(&coordinator, sender, &json!({"action": "mediaPaused", "tabId": "x1"})).unwrap();
    assert_eq!(reply, None);

    let reply = handle_runtime_message(&coordinator, sender, &json!({"action": "shouldResumeMedia"})).unwrap();
    assert_eq!(reply, Some(json!({"shouldResume": true})));
}

#[test]
fn test_update_settings_from_ui() {
    let (_browser, coordinator) = setup();
    let reply = handle_runtime_message(&coordinator, None, &json!({"action": "updateSettings", "autoResume": false})).unwrap();
    assert_eq!(reply, None);

    let reply = handle_runtime_message(&coordinator, None, &json!({"action": "getSettings"})).unwrap();
    assert_eq!(reply, Some(json!({"autoResume": false})));
}

#[test]
fn test_update_settings_requires_flag() {
    let (_browser, coordinator) = setup();
    let result = handle_runtime_message(&coordinator, None, &json!({"action": "updateSettings"}));
    assert!(matches!(result, Err(DispatchError::MalformedMessage(_))));
}

#[test]
fn test_should_resume_without_sender_is_rejected() {
    let (_browser, coordinator) = setup();
    let result = handle_runtime_message(&coordinator, None, &json!({"action": "shouldResumeMedia"}));
    assert!(matches!(result, Err(DispatchError::MissingSender(_))));
}

// ─── Tab commands ───

#[test]
fn test_tab_command_json_round() {
    let (browser, _coordinator) = setup();
    let tab = browser.open_tab(WindowId(1), "https://example.com/");
    let page = browser.page(tab).unwrap();
    let agent = browser.agent(tab).unwrap();
    let video = page.add_media(MediaKind::Video);
    page.user_play(video);

    let reply = handle_tab_command(&agent, &json!({"action": "pauseMedia"})).unwrap();
    assert_eq!(reply, json!({"mediaPaused": true}));
    assert!(!page.is_playing(video));

    let reply = handle_tab_command(&agent, &json!({"action": "resumeMedia"})).unwrap();
    assert_eq!(reply, json!({"mediaResumed": true}));
    assert!(page.is_playing(video));
}

#[test]
fn test_group_broadcast_has_no_reply_body() {
    let (browser, _coordinator) = setup();
    let tab = browser.open_tab(WindowId(1), "https://www.youtube.com/watch?v=1");
    let agent = browser.agent(tab).unwrap();

    let reply = handle_tab_command(&agent, &json!({"action": "youtubeTabActivated", "tabId": 42})).unwrap();
    assert_eq!(reply, serde_json::Value::Null);
}

#[test]
fn test_unknown_tab_command_is_malformed() {
    let (browser, _coordinator) = setup();
    let tab = browser.open_tab(WindowId(1), "https://example.com/");
    let agent = browser.agent(tab).unwrap();
    assert!(handle_tab_command(&agent, &json!({"action": "rewind"})).is_err());
}

// ─── Browser events ───

#[tokio::test]
async fn test_events_drive_coordinator() {
    let (browser, coordinator) = setup();
    let t1 = browser.open_tab(WindowId(1), "https://example.com/");
    let t2 = browser.open_tab(WindowId(1), "https://www.youtube.com/watch?v=1");
    coordinator.start().await;

    dispatch_event(&coordinator, event(json!({"kind": "tabActivated", "tabId": t2.0}))).await;
    assert_eq!(coordinator.active_tab(), Some(t2));

    dispatch_event(&coordinator, event(json!({"kind": "tabUpdated", "tabId": t2.0, "status": "complete", "url": "https://example.org/"}))).await;
    assert!(coordinator.group_members().is_empty());

    dispatch_event(&coordinator, event(json!({"kind": "tabRemoved", "tabId": t2.0}))).await;
    assert_eq!(coordinator.active_tab(), None);

    dispatch_event(&coordinator, event(json!({"kind": "windowFocusChanged", "windowId": 1}))).await;
    assert_eq!(coordinator.active_tab(), Some(t1));
}

#[tokio::test]
async fn test_focus_lost_event_pauses_active_tab() {
    let (browser, coordinator) = setup();
    let t1 = browser.open_tab(WindowId(1), "https://example.com/");
    let page = browser.page(t1).unwrap();
    let audio = page.add_media(MediaKind::Audio);
    page.user_play(audio);
    coordinator.start().await;

    dispatch_event(&coordinator, event(json!({"kind": "windowFocusChanged", "windowId": -1}))).await;

    assert!(!page.is_playing(audio));
    assert!(coordinator.paused_record(t1).is_some());
}
