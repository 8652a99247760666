//! mediafocus demo mode.
//!
//! Runs the coordination protocol against the in-process simulated browser
//! and prints what each tab ends up doing. Set `MEDIAFOCUS_LOG=debug` to see
//! every command and reply.

use std::sync::Arc;

use anyhow::Context;
use mediafocus::app::App;
use mediafocus::bridge::simulated::{SimulatedBrowser, SimulatedClock};
use mediafocus::services::settings_store::MemorySettingsStore;
use mediafocus::types::config::MediaFocusConfig;
use mediafocus::types::media::MediaKind;
use mediafocus::types::message::RuntimeMessage;
use mediafocus::types::settings::StoredSettings;
use mediafocus::types::tab::{TabId, WindowId};

fn section(name: &str) {
    println!("───────────────────────────────────────────────────────────────");
    println!("  {}", name);
    println!("───────────────────────────────────────────────────────────────");
}

fn build(auto_resume: bool) -> anyhow::Result<(Arc<SimulatedBrowser>, App)> {
    let browser = SimulatedBrowser::new(MediaFocusConfig::default())?;
    let store = Arc::new(MemorySettingsStore::new(StoredSettings {
        auto_resume: Some(auto_resume),
    }));
    let app = App::with_clock(
        MediaFocusConfig::default(),
        browser.clone(),
        store,
        Arc::new(SimulatedClock::new(1_000)),
    )?;
    browser.attach(&app.coordinator);
    Ok((browser, app))
}

fn report(browser: &SimulatedBrowser, app: &App, tabs: &[TabId]) {
    for tab in tabs {
        let playing = browser.page(*tab).map(|p| p.playing_count()).unwrap_or(0);
        let record = app.coordinator.paused_record(*tab);
        println!(
            "  tab {:>2}: {} playing, paused-by-us: {}",
            tab,
            playing,
            record.map(|r| format!("at {}ms", r.paused_at_millis)).unwrap_or_else(|| "no".into())
        );
    }
    println!();
}

async fn demo_tab_switching() -> anyhow::Result<()> {
    section("Background tab pause and resume");
    let (browser, app) = build(true)?;
    let window = WindowId(1);

    let t1 = browser.open_tab(window, "https://example.com/podcast");
    let t1_page = browser.page(t1).context("tab just opened")?;
    let audio = t1_page.add_media(MediaKind::Audio);
    app.startup().await;
    t1_page.user_play(audio);

    let t2 = browser.open_tab(window, "https://news.example.org/");
    println!("  switch to tab {}", t2);
    browser.switch_to(t2).await;
    report(&browser, &app, &[t1, t2]);

    println!("  switch back to tab {}", t1);
    browser.switch_to(t1).await;
    report(&browser, &app, &[t1, t2]);

    println!("  auto-resume off, browser loses and regains focus");
    browser.send_from_ui(RuntimeMessage::UpdateSettings { auto_resume: false });
    t1_page.user_pause(audio);
    browser.focus_window(None).await;
    browser.focus_window(Some(window)).await;
    report(&browser, &app, &[t1]);
    Ok(())
}

async fn demo_group_exclusivity() -> anyhow::Result<()> {
    section("Single-playback group (YouTube)");
    let (browser, app) = build(true)?;
    let window = WindowId(1);
    let config = browser.config().adapters.custom_player.clone();

    let a = browser.open_tab(window, "https://www.youtube.com/watch?v=a");
    let b = browser.open_tab(WindowId(2), "https://www.youtube.com/watch?v=b");
    let video_a = browser.page(a).context("tab a")?.install_custom_player(&config);
    let video_b = browser.page(b).context("tab b")?.install_custom_player(&config);
    app.startup().await;
    println!("  group members: {:?}", app.coordinator.group_members());

    browser.page(b).context("tab b")?.user_play(video_b);
    println!("  tab {} plays, then tab {} is activated", b, a);
    browser.page(a).context("tab a")?.user_play(video_a);
    browser.switch_to(a).await;
    report(&browser, &app, &[a, b]);

    println!("  tab {} is activated", b);
    browser.switch_to(b).await;
    report(&browser, &app, &[a, b]);
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let filter = std::env::var("MEDIAFOCUS_LOG")
        .or_else(|_| std::env::var("RUST_LOG"))
        .unwrap_or_else(|_| "warn".to_string());
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(filter))
        .init();

    println!();
    println!("  mediafocus v{} — Demo Mode", env!("CARGO_PKG_VERSION"));
    println!();

    demo_tab_switching().await?;
    demo_group_exclusivity().await?;

    println!("═══════════════════════════════════════════════════════════════");
    println!("  Demo finished.");
    println!("═══════════════════════════════════════════════════════════════");
    Ok(())
}
