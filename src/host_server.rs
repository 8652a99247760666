//! mediafocus host: the coordinator behind a stdio bridge.
//!
//! Protocol: one JSON object per line, see `mediafocus::bridge::stdio`.
//! Logs go to stderr since stdout carries the protocol.

use mediafocus::app::{App, AppPaths};
use mediafocus::bridge::stdio::{serve, StdioBridge};
use tokio::io::BufReader;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let filter = std::env::var("MEDIAFOCUS_LOG")
        .or_else(|_| std::env::var("RUST_LOG"))
        .unwrap_or_else(|_| "info".to_string());
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(filter))
        .with_writer(std::io::stderr)
        .init();

    let (bridge, outbound) = StdioBridge::new();
    let app = App::load(&AppPaths::from_env(), bridge.clone())?;

    let coordinator = app.coordinator.clone();
    let server = tokio::spawn(serve(
        BufReader::new(tokio::io::stdin()),
        tokio::io::stdout(),
        coordinator,
        bridge,
        outbound,
    ));

    // Startup queries go through the bridge, so the server must already be reading.
    app.startup().await;

    server.await??;
    app.shutdown();
    Ok(())
}
