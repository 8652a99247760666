use serde::{Deserialize, Serialize};

/// Page-scoped identifier of a native media element.
///
/// Never an owning reference: whoever holds one must look the element up
/// again before touching it, since navigation can detach it at any time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ElementId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Video,
    Audio,
}

/// Something a tab agent paused and may later resume.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MediaHandle {
    Element(ElementId),
    /// A third-party player whose media element is not exposed to the page.
    ExternalPlayer,
}

/// Point-in-time view of a native media element.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MediaSnapshot {
    pub id: ElementId,
    pub kind: MediaKind,
    pub paused: bool,
    pub ended: bool,
    pub current_time: f64,
}

impl MediaSnapshot {
    /// Actually producing output: not paused, not finished, and past the start.
    pub fn is_playing(&self) -> bool {
        !self.paused && !self.ended && self.current_time > 0.0
    }

    /// Paused partway through, i.e. something stopped it mid-playback.
    pub fn is_resumable(&self) -> bool {
        self.paused && !self.ended && self.current_time > 0.0
    }
}

/// Result of one pause attempt on a page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PauseOutcome {
    pub handles: Vec<MediaHandle>,
}

impl PauseOutcome {
    pub fn any_paused(&self) -> bool {
        !self.handles.is_empty()
    }

    pub(crate) fn remember(&mut self, handle: MediaHandle) {
        if !self.handles.contains(&handle) {
            self.handles.push(handle);
        }
    }
}

/// A play request the page refused, typically an autoplay policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaybackRejected(pub String);
