//! End-to-end behavior: real tab agents and the coordinator wired together
//! through the in-process browser.

use std::sync::Arc;

use mediafocus::bridge::simulated::{SimulatedBrowser, SimulatedClock};
use mediafocus::managers::coordinator::Coordinator;
use mediafocus::services::settings_store::MemorySettingsStore;
use mediafocus::types::config::MediaFocusConfig;
use mediafocus::types::media::MediaKind;
use mediafocus::types::message::{RuntimeMessage, RuntimeReply, SettingsReply, TabCommand};
use mediafocus::types::settings::StoredSettings;
use mediafocus::types::tab::{Visibility, WindowId};

const W1: WindowId = WindowId(1);
const W2: WindowId = WindowId(2);

fn setup(auto_resume: bool) -> (Arc<SimulatedBrowser>, Arc<Coordinator>) {
    let browser = SimulatedBrowser::new(MediaFocusConfig::default()).unwrap();
    let store = MemorySettingsStore::new(StoredSettings {
        auto_resume: Some(auto_resume),
    });
    let coordinator = Arc::new(Coordinator::new(
        browser.group_domain().clone(),
        browser.clone(),
        browser.clone(),
        Arc::new(store),
        Arc::new(SimulatedClock::new(10_000)),
    ));
    browser.attach(&coordinator);
    (browser, coordinator)
}

// ─── Focus-driven pause and resume ───

#[tokio::test]
async fn test_switching_tabs_pauses_and_auto_resumes() {
    let (browser, coordinator) = setup(true);
    let t1 = browser.open_tab(W1, "https://example.com/");
    let page1 = browser.page(t1).unwrap();
    let audio = page1.add_media(MediaKind::Audio);
    page1.user_play(audio);
    coordinator.start().await;

    let t2 = browser.open_tab(W1, "https://news.example/");
    browser.switch_to(t2).await;

    assert_eq!(browser.commands_for(t1), vec![TabCommand::PauseMedia]);
    assert_eq!(coordinator.paused_record(t1).unwrap().paused_at_millis, 10_000);
    assert_eq!(browser.commands_for(t2), vec![TabCommand::ResumeMedia]);
    assert!(!page1.is_playing(audio));
}

#[tokio::test]
async fn test_returning_tab_resumes_then_policy_applies() {
    let (browser, coordinator) = setup(true);
    let t1 = browser.open_tab(W1, "https://example.com/");
    let page1 = browser.page(t1).unwrap();
    let audio = page1.add_media(MediaKind::Audio);
    page1.user_play(audio);
    let t2 = browser.open_tab(W1, "https://news.example/");
    coordinator.start().await;

    browser.switch_to(t2).await;
    browser.switch_to(t1).await;

    assert!(page1.is_playing(audio));
    assert!(coordinator.paused_record(t1).is_none());

    browser.send_from_ui(RuntimeMessage::UpdateSettings { auto_resume: false });
    page1.user_pause(audio);
    browser.focus_window(None).await;
    assert!(coordinator.paused_tabs().is_empty());

    browser.clear_command_log();
    browser.focus_window(Some(W1)).await;

    assert!(browser.commands_for(t1).is_empty());
    assert!(!page1.is_playing(audio));
}

#[tokio::test]
async fn test_system_paused_tab_resumes_even_with_policy_off() {
    let (browser, coordinator) = setup(false);
    let t1 = browser.open_tab(W1, "https://example.com/");
    let page1 = browser.page(t1).unwrap();
    let video = page1.add_media(MediaKind::Video);
    page1.user_play(video);
    coordinator.start().await;

    browser.focus_window(None).await;
    assert!(!page1.is_playing(video));
    browser.focus_window(Some(W1)).await;

    assert!(page1.is_playing(video));
}

#[tokio::test]
async fn test_pausing_idle_tab_twice_records_nothing() {
    let (browser, coordinator) = setup(false);
    let t1 = browser.open_tab(W1, "https://example.com/");
    browser.page(t1).unwrap().add_media(MediaKind::Video);
    coordinator.start().await;

    browser.focus_window(None).await;
    browser.focus_window(None).await;

    assert_eq!(
        browser.commands_for(t1),
        vec![TabCommand::PauseMedia, TabCommand::PauseMedia]
    );
    assert!(coordinator.paused_tabs().is_empty());
}

#[tokio::test]
async fn test_focus_moves_between_windows() {
    let (browser, coordinator) = setup(false);
    let t1 = browser.open_tab(W1, "https://example.com/");
    let t2 = browser.open_tab(W2, "https://news.example/");
    let page1 = browser.page(t1).unwrap();
    let audio = page1.add_media(MediaKind::Audio);
    page1.user_play(audio);
    coordinator.start().await;

    browser.focus_window(Some(W2)).await;
    assert_eq!(coordinator.active_tab(), Some(t2));
    assert!(!page1.is_playing(audio));

    browser.focus_window(Some(W1)).await;
    assert_eq!(coordinator.active_tab(), Some(t1));
    assert!(page1.is_playing(audio));
}

// ─── Page visibility ───

#[tokio::test]
async fn test_hidden_page_reports_and_visible_page_resumes() {
    let (browser, coordinator) = setup(false);
    let t1 = browser.open_tab(W1, "https://example.com/");
    let page1 = browser.page(t1).unwrap();
    let video = page1.add_media(MediaKind::Video);
    page1.user_play(video);
    coordinator.start().await;

    browser.set_visibility(t1, Visibility::Hidden).await;
    assert!(!page1.is_playing(video));
    assert!(coordinator.paused_record(t1).is_some());

    browser.set_visibility(t1, Visibility::Visible).await;
    assert!(page1.is_playing(video));
    assert!(coordinator.paused_record(t1).is_none());
}

#[tokio::test]
async fn test_user_paused_media_stays_paused_when_visible_again() {
    let (browser, coordinator) = setup(false);
    let t1 = browser.open_tab(W1, "https://example.com/");
    let page1 = browser.page(t1).unwrap();
    let video = page1.add_media(MediaKind::Video);
    page1.user_play(video);
    page1.user_pause(video);
    coordinator.start().await;

    browser.set_visibility(t1, Visibility::Hidden).await;
    browser.set_visibility(t1, Visibility::Visible).await;

    assert!(!page1.is_playing(video));
    assert!(coordinator.paused_tabs().is_empty());
}

// ─── Site players ───

#[tokio::test]
async fn test_external_player_round_trip() {
    let (browser, coordinator) = setup(false);
    let t1 = browser.open_tab(W1, "https://open.spotify.com/album/1");
    let page1 = browser.page(t1).unwrap();
    page1.install_external_player(&browser.config().adapters.external_player);
    page1.set_external_playing(true);
    let t2 = browser.open_tab(W1, "https://news.example/");
    coordinator.start().await;

    browser.switch_to(t2).await;
    assert!(!page1.external_playing());

    browser.switch_to(t1).await;
    assert!(page1.external_playing());
}

#[tokio::test]
async fn test_external_player_survives_focus_leaving_then_changing_window() {
    let (browser, coordinator) = setup(false);
    let s1 = browser.open_tab(W1, "https://open.spotify.com/album/1");
    let page1 = browser.page(s1).unwrap();
    page1.install_external_player(&browser.config().adapters.external_player);
    page1.set_external_playing(true);
    let o2 = browser.open_tab(W2, "https://news.example/");
    coordinator.start().await;

    browser.focus_window(None).await;
    assert!(!page1.external_playing());
    browser.focus_window(Some(W2)).await;

    assert_eq!(coordinator.active_tab(), Some(o2));
    assert_eq!(browser.commands_for(s1), vec![TabCommand::PauseMedia]);
    assert!(!browser.agent(s1).unwrap().remembered().is_empty());

    browser.focus_window(Some(W1)).await;

    assert_eq!(coordinator.active_tab(), Some(s1));
    assert!(page1.external_playing());
}

#[tokio::test]
async fn test_blocked_autoplay_falls_back_to_player_button() {
    let (browser, coordinator) = setup(false);
    let y1 = browser.open_tab(W1, "https://www.youtube.com/watch?v=1");
    let page = browser.page(y1).unwrap();
    let video = page.install_custom_player(&browser.config().adapters.custom_player);
    page.user_play(video);
    let other = browser.open_tab(W1, "https://news.example/");
    coordinator.start().await;

    browser.switch_to(other).await;
    page.set_autoplay_blocked(true);
    browser.switch_to(y1).await;

    assert!(page.is_playing(video));
    assert_eq!(page.clicks().len(), 1);
}

// ─── Group exclusivity ───

#[tokio::test]
async fn test_group_tabs_exclude_each_other() {
    let (browser, coordinator) = setup(true);
    let custom = browser.config().adapters.custom_player.clone();
    let y1 = browser.open_tab(W1, "https://www.youtube.com/watch?v=1");
    let y2 = browser.open_tab(W1, "https://www.youtube.com/watch?v=2");
    let page1 = browser.page(y1).unwrap();
    let page2 = browser.page(y2).unwrap();
    let v1 = page1.install_custom_player(&custom);
    let v2 = page2.install_custom_player(&custom);
    page1.user_play(v1);
    coordinator.start().await;
    assert_eq!(coordinator.group_members(), vec![y1, y2]);

    browser.switch_to(y2).await;
    assert!(browser
        .commands_for(y1)
        .contains(&TabCommand::GroupTabActivated { tab_id: y2 }));
    assert!(!page1.is_playing(v1));

    page2.user_play(v2);
    browser.switch_to(y1).await;

    assert!(browser
        .commands_for(y2)
        .contains(&TabCommand::GroupTabActivated { tab_id: y1 }));
    assert!(page1.is_playing(v1));
    assert!(!page2.is_playing(v2));
}

#[tokio::test]
async fn test_group_broadcast_reaches_background_window() {
    let (browser, coordinator) = setup(false);
    let y1 = browser.open_tab(W1, "https://www.youtube.com/watch?v=1");
    let x = browser.open_tab(W2, "https://news.example/");
    let y2 = browser.open_tab(W2, "https://music.youtube.com/");
    let page1 = browser.page(y1).unwrap();
    let v1 = page1.install_custom_player(&browser.config().adapters.custom_player);
    coordinator.start().await;
    browser.focus_window(Some(W2)).await;
    assert_eq!(coordinator.active_tab(), Some(x));

    page1.user_play(v1);
    browser.switch_to(y2).await;

    assert!(!page1.is_playing(v1));
    assert!(coordinator.paused_record(y1).is_none());
}

#[tokio::test]
async fn test_lost_removal_event_prunes_on_broadcast() {
    let (browser, coordinator) = setup(false);
    let y1 = browser.open_tab(W1, "https://www.youtube.com/watch?v=1");
    let y2 = browser.open_tab(W1, "https://www.youtube.com/watch?v=2");
    let x = browser.open_tab(W1, "https://news.example/");
    coordinator.start().await;

    browser.switch_to(x).await;
    assert!(browser.forget_tab(y2));
    assert_eq!(coordinator.group_members(), vec![y1, y2], "stale until proven dead");

    browser.switch_to(y1).await;

    assert_eq!(coordinator.group_members(), vec![y1]);
}

// ─── Tab lifecycle ───

#[tokio::test]
async fn test_unresponsive_tab_is_not_recorded() {
    let (browser, coordinator) = setup(false);
    let t1 = browser.open_tab(W1, "https://example.com/");
    let page1 = browser.page(t1).unwrap();
    let audio = page1.add_media(MediaKind::Audio);
    page1.user_play(audio);
    let t2 = browser.open_tab(W1, "https://news.example/");
    coordinator.start().await;
    browser.set_unresponsive(t1, true);

    browser.switch_to(t2).await;

    assert!(page1.is_playing(audio));
    assert!(coordinator.paused_tabs().is_empty());
    assert!(browser.commands_for(t1).is_empty());
}

#[tokio::test]
async fn test_closing_tab_drops_its_record() {
    let (browser, coordinator) = setup(false);
    let t1 = browser.open_tab(W1, "https://example.com/");
    let page1 = browser.page(t1).unwrap();
    let audio = page1.add_media(MediaKind::Audio);
    page1.user_play(audio);
    let t2 = browser.open_tab(W1, "https://news.example/");
    coordinator.start().await;

    browser.switch_to(t2).await;
    assert!(coordinator.paused_record(t1).is_some());
    browser.close_tab(t1);

    assert!(coordinator.paused_record(t1).is_none());
    assert!(browser.page(t1).is_none());
}

#[tokio::test]
async fn test_navigation_replaces_agent_and_membership() {
    let (browser, coordinator) = setup(false);
    let y1 = browser.open_tab(W1, "https://www.youtube.com/watch?v=1");
    coordinator.start().await;
    assert!(browser.agent(y1).unwrap().in_group());

    browser.navigate(y1, "https://example.com/");

    assert!(coordinator.group_members().is_empty());
    assert!(!browser.agent(y1).unwrap().in_group());

    browser.navigate(y1, "https://www.youtube.com/watch?v=2");
    assert_eq!(coordinator.group_members(), vec![y1]);
}

#[test]
fn test_settings_ui_round_trip() {
    let (browser, _coordinator) = setup(true);
    browser.send_from_ui(RuntimeMessage::UpdateSettings { auto_resume: false });
    assert_eq!(
        browser.send_from_ui(RuntimeMessage::GetSettings),
        Some(RuntimeReply::Settings(SettingsReply { auto_resume: false }))
    );
}
