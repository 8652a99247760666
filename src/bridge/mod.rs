//! Seams between the coordination core and whatever hosts it.
//!
//! The coordinator talks to the browser only through [`TabDirectory`] and
//! [`TabMessenger`]; a tab agent talks to the coordinator only through
//! [`CoordinatorLink`]. Two hosts are provided: an in-process
//! [`simulated`] browser and a newline-delimited JSON [`stdio`] bridge.

pub mod simulated;
pub mod stdio;

use std::time::{SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use crate::types::errors::ChannelError;
use crate::types::match_pattern::MatchPattern;
use crate::types::message::{RuntimeMessage, RuntimeReply, TabCommand, TabReply};
use crate::types::tab::{TabId, TabInfo, WindowId};

/// Read access to the browser's tabs. Treated as ground truth, never cached.
#[async_trait]
pub trait TabDirectory: Send + Sync {
    /// `None` if the tab does not exist (any more).
    async fn get_tab(&self, tab_id: TabId) -> Option<TabInfo>;
    /// Active tab of the window that currently has focus.
    async fn query_active_tab(&self) -> Option<TabInfo>;
    /// Active tab of a specific window.
    async fn active_tab_in_window(&self, window_id: WindowId) -> Option<TabInfo>;
    async fn query_tabs(&self, pattern: &MatchPattern) -> Vec<TabInfo>;
}

/// Delivers a command to one tab and waits for its reply.
///
/// Failure is routine: the tab may have closed or navigated away.
#[async_trait]
pub trait TabMessenger: Send + Sync {
    async fn send_command(&self, tab_id: TabId, command: TabCommand) -> Result<TabReply, ChannelError>;
}

/// A tab agent's channel to the coordinator.
#[async_trait]
pub trait CoordinatorLink: Send + Sync {
    /// Returns the coordinator's reply, if the message has one.
    async fn send(&self, message: RuntimeMessage) -> Result<Option<RuntimeReply>, ChannelError>;
}

/// Wall-clock source for paused-tab timestamps.
pub trait Clock: Send + Sync {
    fn now_millis(&self) -> i64;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> i64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as i64
    }
}
