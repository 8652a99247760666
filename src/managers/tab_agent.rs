//! Per-tab agent.
//!
//! Lives as long as one page load. Pauses media when the page is hidden or
//! when told to, remembers what it paused, and resumes that on request or
//! after asking the coordinator whether it should.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::debug;

use crate::bridge::CoordinatorLink;
use crate::services::site_adapter::{PageDom, SiteMediaAdapter};
use crate::types::config::{AdapterConfig, GroupDomain};
use crate::types::media::MediaHandle;
use crate::types::message::{PauseReply, ResumeReply, RuntimeMessage, RuntimeReply, TabCommand, TabReply};
use crate::types::tab::{TabId, Visibility};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgentState {
    Idle,
    Hidden,
    AwaitingResumeDecision,
}

#[derive(Debug)]
struct TabLocalState {
    state: AgentState,
    /// Media this agent paused in its most recent pause attempt.
    remembered: HashSet<MediaHandle>,
}

pub struct TabAgent {
    page: Arc<dyn PageDom>,
    link: Arc<dyn CoordinatorLink>,
    adapter: SiteMediaAdapter,
    in_group: bool,
    own_tab: Option<TabId>,
    local: Mutex<TabLocalState>,
}

impl TabAgent {
    pub fn new(
        page: Arc<dyn PageDom>,
        link: Arc<dyn CoordinatorLink>,
        group: &GroupDomain,
        adapters: &AdapterConfig,
    ) -> Self {
        let hostname = page.hostname();
        Self {
            adapter: SiteMediaAdapter::for_host(&hostname, adapters),
            in_group: group.matches_host(&hostname),
            page,
            link,
            own_tab: None,
            local: Mutex::new(TabLocalState {
                state: AgentState::Idle,
                remembered: HashSet::new(),
            }),
        }
    }

    /// Lets the agent ignore group broadcasts about its own activation.
    pub fn with_tab_id(mut self, tab_id: TabId) -> Self {
        self.own_tab = Some(tab_id);
        self
    }

    fn local(&self) -> MutexGuard<'_, TabLocalState> {
        self.local.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn state(&self) -> AgentState {
        self.local().state
    }

    pub fn in_group(&self) -> bool {
        self.in_group
    }

    pub fn remembered(&self) -> Vec<MediaHandle> {
        self.local().remembered.iter().copied().collect()
    }

    /// Pauses whatever plays and remembers it, forgetting any earlier pause.
    pub fn pause_media(&self) -> bool {
        let mut local = self.local();
        local.remembered.clear();
        let outcome = self.adapter.detect_and_pause(self.page.as_ref());
        let any_paused = outcome.any_paused();
        local.remembered.extend(outcome.handles);
        any_paused
    }

    pub fn resume_media(&self) {
        let mut local = self.local();
        self.adapter.resume(self.page.as_ref(), &local.remembered);
        local.remembered.clear();
    }

    pub fn handle_command(&self, command: TabCommand) -> TabReply {
        match command {
            TabCommand::PauseMedia => TabReply::Paused(PauseReply {
                media_paused: self.pause_media(),
            }),
            TabCommand::ResumeMedia => {
                self.resume_media();
                TabReply::Resumed(ResumeReply { media_resumed: true })
            }
            TabCommand::GroupTabActivated { tab_id } => {
                if self.in_group && self.own_tab != Some(tab_id) {
                    self.pause_media();
                }
                TabReply::Empty
            }
        }
    }

    pub async fn on_visibility_changed(&self, visibility: Visibility) {
        match visibility {
            Visibility::Hidden => {
                self.local().state = AgentState::Hidden;
                if self.pause_media() {
                    let message = RuntimeMessage::MediaPaused { page_token: None };
                    if let Err(e) = self.link.send(message).await {
                        debug!("could not report paused media: {e}");
                    }
                }
            }
            Visibility::Visible => {
                self.local().state = AgentState::AwaitingResumeDecision;
                let should_resume = match self.link.send(RuntimeMessage::ShouldResumeMedia).await {
                    Ok(Some(RuntimeReply::ShouldResume(reply))) => reply.should_resume,
                    Ok(_) => false,
                    Err(e) => {
                        debug!("could not ask whether to resume: {e}");
                        false
                    }
                };

                let mut local = self.local();
                // Hidden again while waiting: the newer transition wins.
                if local.state != AgentState::AwaitingResumeDecision {
                    return;
                }
                local.state = AgentState::Idle;
                drop(local);

                if should_resume {
                    self.resume_media();
                }
            }
        }
    }
}
