use tracing::debug;

use super::PageDom;
use crate::types::config::CustomPlayerConfig;
use crate::types::media::{MediaHandle, MediaKind, PauseOutcome};

/// A site player that wraps a native video behind its own play button.
///
/// Clicking the button keeps the player's UI in sync; calling pause/play on
/// the video directly is the fallback.
#[derive(Debug, Clone)]
pub struct CustomPlayer {
    config: CustomPlayerConfig,
}

impl CustomPlayer {
    pub fn new(config: CustomPlayerConfig) -> Self {
        Self { config }
    }

    fn button_says(&self, page: &dyn PageDom, label: &str) -> bool {
        page.control_label(&self.config.button_selector).as_deref() == Some(label)
    }

    pub fn pause(&self, page: &dyn PageDom, outcome: &mut PauseOutcome) {
        if !page.exists(&self.config.container_selector) {
            return;
        }
        let Some(video) = page.select_media(&self.config.video_selector) else {
            return;
        };
        if video.paused {
            return;
        }
        outcome.remember(MediaHandle::Element(video.id));
        if self.button_says(page, &self.config.pause_label) {
            page.click(&self.config.button_selector);
        } else {
            page.pause(video.id);
        }
    }

    /// Resume path when nothing was remembered. Returns true if it handled
    /// the page, in which case no other strategy should run.
    pub fn resume_unremembered(&self, page: &dyn PageDom) -> bool {
        let Some(video) = page.select_media(&self.config.video_selector) else {
            return false;
        };
        if !page.exists(&self.config.container_selector) {
            return false;
        }
        if !(video.paused && video.current_time > 0.0) {
            return false;
        }
        if self.button_says(page, &self.config.play_label) {
            page.click(&self.config.button_selector);
            return true;
        }
        if let Err(rejected) = page.play(video.id) {
            debug!(reason = %rejected.0, "custom player auto-play was prevented");
        }
        true
    }

    /// A remembered video refused to play; try the player's own button.
    pub fn resume_after_rejection(&self, page: &dyn PageDom, kind: MediaKind) {
        if kind == MediaKind::Video && self.button_says(page, &self.config.play_label) {
            page.click(&self.config.button_selector);
        }
    }
}
