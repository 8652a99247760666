//! mediafocus pauses media in background browser tabs and resumes it when
//! the tab regains focus.
//!
//! A single [`managers::coordinator::Coordinator`] tracks focus and issues
//! pause/resume commands; one [`managers::tab_agent::TabAgent`] per page
//! carries them out through a site adapter. This library crate exposes all
//! modules for use by the binaries and integration tests.

pub mod app;
pub mod bridge;
pub mod managers;
pub mod message_handler;
pub mod platform;
pub mod services;
pub mod types;
