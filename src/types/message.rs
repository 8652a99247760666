//! Wire messages exchanged between the coordinator, tab agents and the
//! settings UI.
//!
//! Every message is a JSON object carrying an `action` discriminator, the
//! same shape the extension runtime delivers.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::tab::{TabId, TabStatus, WindowId};

/// Commands the coordinator addresses to one tab.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum TabCommand {
    PauseMedia,
    ResumeMedia,
    /// Another tab of the single-playback group became active.
    #[serde(rename = "youtubeTabActivated", alias = "groupTabActivated")]
    GroupTabActivated {
        #[serde(rename = "tabId")]
        tab_id: TabId,
    },
}

/// Messages addressed to the coordinator, by tab agents or the settings UI.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum RuntimeMessage {
    /// The sending tab paused media on its own (page went hidden).
    ///
    /// `page_token` is whatever identifier the page chose to attach. It is
    /// informational only; the coordinator keys by the channel-supplied sender.
    MediaPaused {
        #[serde(rename = "tabId", default, skip_serializing_if = "Option::is_none")]
        page_token: Option<Value>,
    },
    ShouldResumeMedia,
    GetSettings,
    UpdateSettings {
        #[serde(rename = "autoResume")]
        auto_resume: bool,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PauseReply {
    pub media_paused: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResumeReply {
    pub media_resumed: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShouldResumeReply {
    pub should_resume: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsReply {
    pub auto_resume: bool,
}

/// What the coordinator answers to a [`RuntimeMessage`], when it answers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RuntimeReply {
    ShouldResume(ShouldResumeReply),
    Settings(SettingsReply),
}

/// What a tab answered to a [`TabCommand`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TabReply {
    Paused(PauseReply),
    Resumed(ResumeReply),
    /// Delivered, nothing to say (group broadcasts).
    Empty,
}

impl TabReply {
    /// True only for an explicit `{mediaPaused: true}` answer.
    pub fn media_paused(&self) -> bool {
        matches!(self, TabReply::Paused(PauseReply { media_paused: true }))
    }
}

/// Browser-side events the coordinator subscribes to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum BrowserEvent {
    TabActivated {
        #[serde(rename = "tabId")]
        tab_id: TabId,
    },
    /// `windowId` is null or -1 when no browser window has focus.
    WindowFocusChanged {
        #[serde(rename = "windowId", default)]
        window_id: Option<WindowId>,
    },
    TabUpdated {
        #[serde(rename = "tabId")]
        tab_id: TabId,
        #[serde(default)]
        status: Option<TabStatus>,
        #[serde(default)]
        url: Option<String>,
    },
    TabRemoved {
        #[serde(rename = "tabId")]
        tab_id: TabId,
    },
}
