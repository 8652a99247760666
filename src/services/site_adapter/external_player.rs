use super::PageDom;
use crate::types::config::ExternalPlayerConfig;
use crate::types::media::{MediaHandle, PauseOutcome};

/// A web player whose audio lives outside the page; only its play/pause
/// control is reachable.
#[derive(Debug, Clone)]
pub struct ExternalPlayer {
    config: ExternalPlayerConfig,
}

impl ExternalPlayer {
    pub fn new(config: ExternalPlayerConfig) -> Self {
        Self { config }
    }

    pub fn pause(&self, page: &dyn PageDom, outcome: &mut PauseOutcome) {
        let label = page.control_label(&self.config.control_selector);
        if label.as_deref() == Some(self.config.pause_label.as_str())
            && page.click(&self.config.control_selector)
        {
            outcome.remember(MediaHandle::ExternalPlayer);
        }
    }

    pub fn resume(&self, page: &dyn PageDom) {
        let label = page.control_label(&self.config.control_selector);
        if label.as_deref() == Some(self.config.play_label.as_str()) {
            page.click(&self.config.control_selector);
        }
    }
}
