use tracing::debug;

use super::PageDom;
use crate::types::media::{ElementId, MediaHandle, MediaKind, PauseOutcome};

/// Plain `<video>`/`<audio>` elements.
#[derive(Debug, Clone)]
pub struct NativeMedia {
    selector: String,
}

/// How a resume request for one remembered element went.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResumeAttempt {
    Played,
    /// The element is no longer in the page.
    Detached,
    /// The page refused to play it, usually an autoplay policy.
    Rejected(MediaKind),
}

impl NativeMedia {
    pub fn new(selector: String) -> Self {
        Self { selector }
    }

    pub fn pause_playing(&self, page: &dyn PageDom, outcome: &mut PauseOutcome) {
        for media in page.media_elements(&self.selector) {
            if media.is_playing() {
                page.pause(media.id);
                outcome.remember(MediaHandle::Element(media.id));
            }
        }
    }

    pub fn resume_element(&self, page: &dyn PageDom, id: ElementId) -> ResumeAttempt {
        let Some(media) = page.media(id) else {
            return ResumeAttempt::Detached;
        };
        match page.play(id) {
            Ok(()) => ResumeAttempt::Played,
            Err(rejected) => {
                debug!(element = id.0, reason = %rejected.0, "auto-play was prevented");
                ResumeAttempt::Rejected(media.kind)
            }
        }
    }

    /// Plays every element that is paused partway through.
    pub fn resume_sweep(&self, page: &dyn PageDom) {
        for media in page.media_elements(&self.selector) {
            if media.is_resumable() {
                if let Err(rejected) = page.play(media.id) {
                    debug!(element = media.id.0, reason = %rejected.0, "auto-play was prevented for untracked media");
                }
            }
        }
    }
}
