use std::fmt;

use serde::{Deserialize, Serialize};

/// Browser-assigned tab handle.
///
/// Unique among currently open tabs only: the browser may hand the same value
/// to a new tab after the old one closes, so a stored `TabId` can refer to
/// nothing or to an unrelated tab.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TabId(pub i64);

impl fmt::Display for TabId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Browser-assigned window handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WindowId(pub i64);

impl WindowId {
    /// Sentinel the browser reports when no window has OS focus.
    pub const NONE: WindowId = WindowId(-1);
}

impl fmt::Display for WindowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Page load status as reported by tab update events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TabStatus {
    #[default]
    Loading,
    Complete,
}

/// What the tab directory knows about a tab.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TabInfo {
    pub id: TabId,
    pub window_id: WindowId,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub active: bool,
    #[serde(default)]
    pub status: TabStatus,
}

/// OS-level focus transition for the browser as a whole.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusChange {
    /// No browser window has focus any more.
    Lost,
    /// The given window gained focus.
    Gained(WindowId),
}

impl FocusChange {
    pub fn from_window(window_id: Option<WindowId>) -> Self {
        match window_id {
            None | Some(WindowId::NONE) => FocusChange::Lost,
            Some(id) => FocusChange::Gained(id),
        }
    }
}

/// Page visibility as seen by a tab agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Hidden,
    Visible,
}

/// Marks a tab whose media the coordinator itself paused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PausedTabRecord {
    pub tab_id: TabId,
    pub paused_at_millis: i64,
}
