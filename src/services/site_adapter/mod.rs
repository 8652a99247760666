//! Page-side media control.
//!
//! [`PageDom`] is the opaque capability a page exposes (query media, click a
//! control, pause, play). [`SiteMediaAdapter`] turns "pause whatever is
//! playing" and "resume what you paused" into calls against it, combining a
//! generic strategy for native `<video>`/`<audio>` with site-specific ones
//! for players that need their own controls clicked.

mod custom_player;
mod external_player;
mod native;

use std::collections::HashSet;

use tracing::debug;

pub use custom_player::CustomPlayer;
pub use external_player::ExternalPlayer;
pub use native::{NativeMedia, ResumeAttempt};

use crate::types::config::AdapterConfig;
use crate::types::match_pattern::host_in_domain;
use crate::types::media::{ElementId, MediaHandle, MediaSnapshot, PauseOutcome, PlaybackRejected};

/// What a tab agent can do to its page.
pub trait PageDom: Send + Sync {
    fn hostname(&self) -> String;
    /// Every attached native media element matching `selector`.
    fn media_elements(&self, selector: &str) -> Vec<MediaSnapshot>;
    /// Current state of a media element, `None` once it is detached.
    fn media(&self, id: ElementId) -> Option<MediaSnapshot>;
    /// First media element matching `selector`.
    fn select_media(&self, selector: &str) -> Option<MediaSnapshot>;
    fn exists(&self, selector: &str) -> bool;
    /// The `aria-label` of the first element matching `selector`.
    fn control_label(&self, selector: &str) -> Option<String>;
    /// Clicks the first element matching `selector`; false if there is none.
    fn click(&self, selector: &str) -> bool;
    fn pause(&self, id: ElementId);
    fn play(&self, id: ElementId) -> Result<(), PlaybackRejected>;
}

/// The pause/resume strategies that apply to one page.
#[derive(Debug, Clone)]
pub struct SiteMediaAdapter {
    native: NativeMedia,
    custom_player: Option<CustomPlayer>,
    external_player: Option<ExternalPlayer>,
}

impl SiteMediaAdapter {
    /// Picks strategies by the page's hostname.
    pub fn for_host(hostname: &str, config: &AdapterConfig) -> Self {
        let custom_player = host_in_domain(hostname, &config.custom_player.host)
            .then(|| CustomPlayer::new(config.custom_player.clone()));
        let external_player = host_in_domain(hostname, &config.external_player.host)
            .then(|| ExternalPlayer::new(config.external_player.clone()));
        Self {
            native: NativeMedia::new(config.media_selector.clone()),
            custom_player,
            external_player,
        }
    }

    pub fn has_custom_player(&self) -> bool {
        self.custom_player.is_some()
    }

    pub fn has_external_player(&self) -> bool {
        self.external_player.is_some()
    }

    /// Pauses everything currently playing and reports what it paused.
    pub fn detect_and_pause(&self, page: &dyn PageDom) -> PauseOutcome {
        let mut outcome = PauseOutcome::default();
        self.native.pause_playing(page, &mut outcome);
        if let Some(custom) = &self.custom_player {
            custom.pause(page, &mut outcome);
        }
        if let Some(external) = &self.external_player {
            external.pause(page, &mut outcome);
        }
        outcome
    }

    /// Resumes what a previous [`detect_and_pause`](Self::detect_and_pause)
    /// remembered. With nothing remembered, resumes any media that looks
    /// like it was stopped mid-playback.
    pub fn resume(&self, page: &dyn PageDom, remembered: &HashSet<MediaHandle>) {
        if remembered.is_empty() {
            if let Some(custom) = &self.custom_player {
                if custom.resume_unremembered(page) {
                    return;
                }
            }
        }

        let mut handles: Vec<&MediaHandle> = remembered.iter().collect();
        handles.sort_by_key(|h| match h {
            MediaHandle::Element(id) => (0, id.0),
            MediaHandle::ExternalPlayer => (1, 0),
        });

        for handle in handles {
            match handle {
                MediaHandle::ExternalPlayer => match &self.external_player {
                    Some(external) => external.resume(page),
                    None => debug!("external player handle on a page without one"),
                },
                MediaHandle::Element(id) => {
                    if let ResumeAttempt::Rejected(kind) = self.native.resume_element(page, *id) {
                        if let Some(custom) = &self.custom_player {
                            custom.resume_after_rejection(page, kind);
                        }
                    }
                }
            }
        }

        if remembered.is_empty() {
            self.native.resume_sweep(page);
        }
    }
}
