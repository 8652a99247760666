//! Process-wide coordinator.
//!
//! Tracks the focused tab, which tabs it paused itself, and which tabs
//! belong to the single-playback group, and turns browser focus events into
//! pause/resume commands for tab agents.
//!
//! Handlers are async and may interleave at every message send. State lives
//! behind a mutex that is only ever held between sends, so each mutation is
//! atomic but a multi-step handler is not: another event can run while a
//! reply is outstanding. Every step below tolerates that.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::{debug, info, warn};

use crate::bridge::{Clock, TabDirectory, TabMessenger};
use crate::managers::group_members::GroupMembers;
use crate::managers::paused_tabs::PausedTabs;
use crate::services::settings_store::SettingsStore;
use crate::types::config::GroupDomain;
use crate::types::errors::DispatchError;
use crate::types::message::{
    RuntimeMessage, RuntimeReply, SettingsReply, ShouldResumeReply, TabCommand,
};
use crate::types::settings::ExtensionSettings;
use crate::types::tab::{FocusChange, PausedTabRecord, TabId, TabStatus};

/// Everything the coordinator knows.
#[derive(Debug, Clone)]
pub struct CoordinatorState {
    pub active_tab: Option<TabId>,
    pub auto_resume: bool,
    pub paused: PausedTabs,
    pub group: GroupMembers,
}

impl Default for CoordinatorState {
    fn default() -> Self {
        Self {
            active_tab: None,
            auto_resume: ExtensionSettings::default().auto_resume,
            paused: PausedTabs::new(),
            group: GroupMembers::new(),
        }
    }
}

/// Why a tab was (or was not) sent `resumeMedia`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ResumeDecision {
    /// The coordinator paused it, so it always gets resumed.
    SystemPaused,
    /// No record, but the auto-resume policy is on.
    AutoResume,
    Skipped,
}

pub struct Coordinator {
    group_domain: GroupDomain,
    directory: Arc<dyn TabDirectory>,
    messenger: Arc<dyn TabMessenger>,
    store: Arc<dyn SettingsStore>,
    clock: Arc<dyn Clock>,
    state: Mutex<CoordinatorState>,
}

impl Coordinator {
    pub fn new(
        group_domain: GroupDomain,
        directory: Arc<dyn TabDirectory>,
        messenger: Arc<dyn TabMessenger>,
        store: Arc<dyn SettingsStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            group_domain,
            directory,
            messenger,
            store,
            clock,
            state: Mutex::new(CoordinatorState::default()),
        }
    }

    fn state(&self) -> MutexGuard<'_, CoordinatorState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Loads the persisted policy and adopts the browser's current tabs.
    pub async fn start(&self) {
        let settings = match self.store.load() {
            Ok(stored) => stored.resolve(),
            Err(e) => {
                warn!("failed to load settings, using defaults: {e}");
                ExtensionSettings::default()
            }
        };
        self.state().auto_resume = settings.auto_resume;

        if let Some(tab) = self.directory.query_active_tab().await {
            self.state().active_tab = Some(tab.id);
            if tab.url.as_deref().is_some_and(|url| self.group_domain.matches_url(url)) {
                self.state().group.register(tab.id);
            }
        }

        let group_tabs = self.directory.query_tabs(&self.group_domain.pattern).await;
        {
            let mut state = self.state();
            for tab in &group_tabs {
                state.group.register(tab.id);
            }
        }

        info!(
            auto_resume = settings.auto_resume,
            group_tabs = group_tabs.len(),
            group = %self.group_domain.name,
            "coordinator started"
        );
    }

    /// Clears all tracking state; the persisted policy is reloaded by the
    /// next [`start`](Self::start).
    pub fn reset(&self) {
        *self.state() = CoordinatorState::default();
    }

    // ─── Browser events ───

    pub async fn on_tab_activated(&self, tab_id: TabId) {
        let previous = self.state().active_tab.replace(tab_id);
        debug!(tab = %tab_id, previous = ?previous, "tab activated");

        if let Some(previous) = previous.filter(|p| *p != tab_id) {
            self.pause_tab(previous).await;
        }
        self.resume_tab(tab_id).await;

        if self.refresh_group_membership(tab_id).await {
            self.notify_group(tab_id).await;
        }
    }

    pub async fn on_window_focus_changed(&self, change: FocusChange) {
        match change {
            FocusChange::Lost => {
                let active = self.state().active_tab;
                debug!(active = ?active, "browser lost focus");
                if let Some(active) = active {
                    self.pause_tab(active).await;
                }
            }
            FocusChange::Gained(window_id) => {
                let focused = self.directory.active_tab_in_window(window_id).await.map(|t| t.id);
                let (previous, target) = {
                    let mut state = self.state();
                    let previous = state.active_tab;
                    let target = focused.or(previous);
                    state.active_tab = target;
                    (previous, target)
                };
                debug!(window = %window_id, target = ?target, "browser gained focus");
                let Some(target) = target else {
                    return;
                };

                if let Some(previous) = previous.filter(|p| *p != target) {
                    self.pause_tab(previous).await;
                }
                self.resume_tab(target).await;

                if self.refresh_group_membership(target).await {
                    self.notify_group(target).await;
                }
            }
        }
    }

    pub fn on_tab_updated(&self, tab_id: TabId, status: TabStatus, url: Option<&str>) {
        let Some(url) = url else {
            return;
        };
        let mut state = self.state();
        if self.group_domain.matches_url(url) {
            if status == TabStatus::Complete && state.group.register(tab_id) {
                debug!(tab = %tab_id, "registered group tab");
            }
        } else if state.group.prune(tab_id) {
            debug!(tab = %tab_id, "tab left the group domain");
        }
    }

    pub fn on_tab_removed(&self, tab_id: TabId) {
        let mut state = self.state();
        state.group.prune(tab_id);
        state.paused.take(tab_id);
        if state.active_tab == Some(tab_id) {
            state.active_tab = None;
        }
        debug!(tab = %tab_id, "tab removed");
    }

    // ─── Messages from tabs and the settings UI ───

    pub fn handle_message(
        &self,
        sender: Option<TabId>,
        message: RuntimeMessage,
    ) -> Result<Option<RuntimeReply>, DispatchError> {
        match message {
            RuntimeMessage::MediaPaused { page_token } => {
                let tab_id = sender.ok_or(DispatchError::MissingSender("mediaPaused"))?;
                debug!(tab = %tab_id, page_token = ?page_token, "tab reports media paused");
                self.mark_paused(tab_id);
                Ok(None)
            }
            RuntimeMessage::ShouldResumeMedia => {
                let tab_id = sender.ok_or(DispatchError::MissingSender("shouldResumeMedia"))?;
                let should_resume = self.should_resume(tab_id);
                Ok(Some(RuntimeReply::ShouldResume(ShouldResumeReply { should_resume })))
            }
            RuntimeMessage::GetSettings => Ok(Some(RuntimeReply::Settings(SettingsReply {
                auto_resume: self.auto_resume(),
            }))),
            RuntimeMessage::UpdateSettings { auto_resume } => {
                self.update_settings(ExtensionSettings { auto_resume });
                Ok(None)
            }
        }
    }

    /// Answers a tab that just became visible. Consumes the tab's record, so
    /// a repeated query falls back to the policy alone.
    pub fn should_resume(&self, tab_id: TabId) -> bool {
        let mut state = self.state();
        let had_record = state.paused.take(tab_id).is_some();
        let should_resume = had_record || state.auto_resume;
        debug!(tab = %tab_id, had_record, should_resume, "resume query");
        should_resume
    }

    pub fn settings(&self) -> ExtensionSettings {
        ExtensionSettings {
            auto_resume: self.auto_resume(),
        }
    }

    /// Applies new settings and persists them. A failed save keeps the
    /// in-memory value.
    pub fn update_settings(&self, settings: ExtensionSettings) {
        self.state().auto_resume = settings.auto_resume;
        if let Err(e) = self.store.save(&settings) {
            warn!("failed to persist settings: {e}");
        }
        info!(auto_resume = settings.auto_resume, "settings updated");
    }

    // ─── Snapshots ───

    pub fn active_tab(&self) -> Option<TabId> {
        self.state().active_tab
    }

    pub fn auto_resume(&self) -> bool {
        self.state().auto_resume
    }

    pub fn paused_record(&self, tab_id: TabId) -> Option<PausedTabRecord> {
        self.state().paused.get(tab_id).copied()
    }

    pub fn paused_tabs(&self) -> Vec<PausedTabRecord> {
        self.state().paused.records()
    }

    pub fn group_members(&self) -> Vec<TabId> {
        self.state().group.members()
    }

    pub fn group_domain(&self) -> &GroupDomain {
        &self.group_domain
    }

    pub fn snapshot(&self) -> CoordinatorState {
        self.state().clone()
    }

    // ─── Steps ───

    fn mark_paused(&self, tab_id: TabId) {
        let now = self.clock.now_millis();
        self.state().paused.mark(tab_id, now);
    }

    /// Sends `pauseMedia` and records the tab if it reports media paused.
    ///
    /// A tab that already holds a record is left alone: a second pause would
    /// make its agent forget what it paused.
    async fn pause_tab(&self, tab_id: TabId) -> bool {
        if self.state().paused.contains(tab_id) {
            debug!(tab = %tab_id, "already paused, keeping record");
            return true;
        }
        match self.messenger.send_command(tab_id, TabCommand::PauseMedia).await {
            Ok(reply) if reply.media_paused() => {
                // The tab may have closed while we waited; the record is then an
                // orphan, which is tolerated.
                self.mark_paused(tab_id);
                debug!(tab = %tab_id, "paused media");
                true
            }
            Ok(_) => {
                debug!(tab = %tab_id, "no media to pause");
                false
            }
            Err(e) => {
                debug!(tab = %tab_id, "pause not delivered: {e}");
                false
            }
        }
    }

    /// Resumes a tab this coordinator paused, or any tab when the policy allows.
    async fn resume_tab(&self, tab_id: TabId) {
        let decision = {
            let mut state = self.state();
            if state.paused.take(tab_id).is_some() {
                ResumeDecision::SystemPaused
            } else if state.auto_resume {
                ResumeDecision::AutoResume
            } else {
                ResumeDecision::Skipped
            }
        };
        if decision == ResumeDecision::Skipped {
            debug!(tab = %tab_id, "not paused by us and auto-resume is off");
            return;
        }

        match self.messenger.send_command(tab_id, TabCommand::ResumeMedia).await {
            Ok(_) => debug!(tab = %tab_id, ?decision, "resume sent"),
            Err(e) => debug!(tab = %tab_id, ?decision, "resume not delivered: {e}"),
        }
    }

    /// Re-checks the tab's URL against the group domain and updates the set.
    async fn refresh_group_membership(&self, tab_id: TabId) -> bool {
        let Some(tab) = self.directory.get_tab(tab_id).await else {
            return false;
        };
        let is_member = tab
            .url
            .as_deref()
            .is_some_and(|url| self.group_domain.matches_url(url));
        let mut state = self.state();
        if is_member {
            state.group.register(tab_id);
        } else {
            state.group.prune(tab_id);
        }
        is_member
    }

    /// Tells every other group tab to stop playing; prunes unreachable ones.
    async fn notify_group(&self, active: TabId) {
        let others = self.state().group.others(active);
        for tab_id in others {
            let command = TabCommand::GroupTabActivated { tab_id: active };
            if let Err(e) = self.messenger.send_command(tab_id, command).await {
                debug!(tab = %tab_id, "dropping unreachable group tab: {e}");
                self.state().group.prune(tab_id);
            }
        }
    }
}
