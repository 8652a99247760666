//! In-process browser used by the demo binary and the end-to-end tests.
//!
//! Pages hold native media elements and, depending on their host, a custom
//! or external player. Every tab gets a real [`TabAgent`]; the browser routes
//! coordinator commands to agents and agent messages back to the attached
//! [`Coordinator`]. Browser events are only delivered when a test or the
//! demo calls the corresponding method, so ordering is fully scripted.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use async_trait::async_trait;

use super::{Clock, CoordinatorLink, TabDirectory, TabMessenger};
use crate::managers::coordinator::Coordinator;
use crate::managers::tab_agent::TabAgent;
use crate::services::site_adapter::PageDom;
use crate::types::config::{CustomPlayerConfig, ExternalPlayerConfig, GroupDomain, MediaFocusConfig};
use crate::types::errors::{ChannelError, ConfigError};
use crate::types::match_pattern::{host_of, MatchPattern};
use crate::types::media::{ElementId, MediaKind, MediaSnapshot, PlaybackRejected};
use crate::types::message::{RuntimeMessage, RuntimeReply, TabCommand, TabReply};
use crate::types::tab::{FocusChange, TabId, TabInfo, TabStatus, Visibility, WindowId};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

// ─── Clock ───

/// Clock that only moves when told to.
#[derive(Debug, Default)]
pub struct SimulatedClock {
    now: AtomicI64,
}

impl SimulatedClock {
    pub fn new(start_millis: i64) -> Self {
        Self {
            now: AtomicI64::new(start_millis),
        }
    }

    pub fn advance(&self, millis: i64) {
        self.now.fetch_add(millis, Ordering::SeqCst);
    }
}

impl Clock for SimulatedClock {
    fn now_millis(&self) -> i64 {
        self.now.load(Ordering::SeqCst)
    }
}

// ─── Page ───

#[derive(Debug, Clone)]
struct SimMedia {
    kind: MediaKind,
    paused: bool,
    ended: bool,
    current_time: f64,
    attached: bool,
}

#[derive(Debug, Clone)]
struct SimCustomPlayer {
    config: CustomPlayerConfig,
    video: ElementId,
}

#[derive(Debug, Clone)]
struct SimExternalPlayer {
    config: ExternalPlayerConfig,
    playing: bool,
}

#[derive(Debug, Default)]
struct PageState {
    next_element: u64,
    media: BTreeMap<ElementId, SimMedia>,
    autoplay_blocked: bool,
    custom_player: Option<SimCustomPlayer>,
    external_player: Option<SimExternalPlayer>,
    clicks: Vec<String>,
}

impl PageState {
    fn snapshot(&self, id: ElementId) -> Option<MediaSnapshot> {
        self.media.get(&id).filter(|m| m.attached).map(|m| MediaSnapshot {
            id,
            kind: m.kind,
            paused: m.paused,
            ended: m.ended,
            current_time: m.current_time,
        })
    }

    fn kinds_for(selector: &str) -> Vec<MediaKind> {
        let mut kinds = Vec::new();
        for token in selector.split(',').map(str::trim) {
            if token.starts_with("video") {
                kinds.push(MediaKind::Video);
            } else if token.starts_with("audio") {
                kinds.push(MediaKind::Audio);
            }
        }
        kinds
    }
}

/// A page with scriptable media.
#[derive(Debug)]
pub struct SimulatedPage {
    hostname: String,
    state: Mutex<PageState>,
}

impl SimulatedPage {
    pub fn new(hostname: &str) -> Self {
        Self {
            hostname: hostname.to_string(),
            state: Mutex::new(PageState::default()),
        }
    }

    fn state(&self) -> MutexGuard<'_, PageState> {
        lock(&self.state)
    }

    /// Adds a paused, unstarted media element.
    pub fn add_media(&self, kind: MediaKind) -> ElementId {
        let mut state = self.state();
        state.next_element += 1;
        let id = ElementId(state.next_element);
        state.media.insert(
            id,
            SimMedia {
                kind,
                paused: true,
                ended: false,
                current_time: 0.0,
                attached: true,
            },
        );
        id
    }

    /// The user starts playback; some time elapses.
    pub fn user_play(&self, id: ElementId) {
        if let Some(media) = self.state().media.get_mut(&id) {
            media.paused = false;
            media.ended = false;
            media.current_time += 1.0;
        }
    }

    /// The user pauses playback.
    pub fn user_pause(&self, id: ElementId) {
        if let Some(media) = self.state().media.get_mut(&id) {
            media.paused = true;
        }
    }

    /// Time passes for every playing element.
    pub fn advance(&self, seconds: f64) {
        for media in self.state().media.values_mut() {
            if !media.paused && !media.ended {
                media.current_time += seconds;
            }
        }
    }

    pub fn finish(&self, id: ElementId) {
        if let Some(media) = self.state().media.get_mut(&id) {
            media.ended = true;
            media.paused = true;
        }
    }

    /// Removes the element from the document.
    pub fn detach(&self, id: ElementId) {
        if let Some(media) = self.state().media.get_mut(&id) {
            media.attached = false;
        }
    }

    /// Makes script-initiated `play()` calls fail like an autoplay policy would.
    pub fn set_autoplay_blocked(&self, blocked: bool) {
        self.state().autoplay_blocked = blocked;
    }

    pub fn is_playing(&self, id: ElementId) -> bool {
        self.state().snapshot(id).is_some_and(|m| !m.paused)
    }

    pub fn playing_count(&self) -> usize {
        let state = self.state();
        let native = state
            .media
            .values()
            .filter(|m| m.attached && !m.paused && !m.ended)
            .count();
        native + usize::from(state.external_player.as_ref().is_some_and(|p| p.playing))
    }

    /// Builds a custom player around a new main video and returns the video.
    pub fn install_custom_player(&self, config: &CustomPlayerConfig) -> ElementId {
        let video = self.add_media(MediaKind::Video);
        self.state().custom_player = Some(SimCustomPlayer {
            config: config.clone(),
            video,
        });
        video
    }

    pub fn install_external_player(&self, config: &ExternalPlayerConfig) {
        self.state().external_player = Some(SimExternalPlayer {
            config: config.clone(),
            playing: false,
        });
    }

    pub fn set_external_playing(&self, playing: bool) {
        if let Some(player) = self.state().external_player.as_mut() {
            player.playing = playing;
        }
    }

    pub fn external_playing(&self) -> bool {
        self.state().external_player.as_ref().is_some_and(|p| p.playing)
    }

    /// Selectors clicked so far, in order.
    pub fn clicks(&self) -> Vec<String> {
        self.state().clicks.clone()
    }
}

impl PageDom for SimulatedPage {
    fn hostname(&self) -> String {
        self.hostname.clone()
    }

    fn media_elements(&self, selector: &str) -> Vec<MediaSnapshot> {
        let state = self.state();
        let kinds = PageState::kinds_for(selector);
        state
            .media
            .keys()
            .filter_map(|id| state.snapshot(*id))
            .filter(|m| kinds.contains(&m.kind))
            .collect()
    }

    fn media(&self, id: ElementId) -> Option<MediaSnapshot> {
        self.state().snapshot(id)
    }

    fn select_media(&self, selector: &str) -> Option<MediaSnapshot> {
        let state = self.state();
        if let Some(player) = &state.custom_player {
            if player.config.video_selector == selector {
                return state.snapshot(player.video);
            }
        }
        let kinds = PageState::kinds_for(selector);
        state
            .media
            .keys()
            .filter_map(|id| state.snapshot(*id))
            .find(|m| kinds.contains(&m.kind))
    }

    fn exists(&self, selector: &str) -> bool {
        let state = self.state();
        let custom = state.custom_player.as_ref().is_some_and(|p| {
            p.config.container_selector == selector || p.config.button_selector == selector
        });
        let external = state
            .external_player
            .as_ref()
            .is_some_and(|p| p.config.control_selector == selector);
        custom || external
    }

    fn control_label(&self, selector: &str) -> Option<String> {
        let state = self.state();
        if let Some(player) = state.custom_player.as_ref() {
            if player.config.button_selector == selector {
                let playing = state.snapshot(player.video).is_some_and(|v| !v.paused);
                let label = if playing { &player.config.pause_label } else { &player.config.play_label };
                return Some(label.clone());
            }
        }
        if let Some(player) = state.external_player.as_ref() {
            if player.config.control_selector == selector {
                let label = if player.playing { &player.config.pause_label } else { &player.config.play_label };
                return Some(label.clone());
            }
        }
        None
    }

    fn click(&self, selector: &str) -> bool {
        let mut guard = self.state();
        let state = &mut *guard;
        let custom_video = state
            .custom_player
            .as_ref()
            .filter(|p| p.config.button_selector == selector)
            .map(|p| p.video);
        if let Some(video) = custom_video {
            if let Some(media) = state.media.get_mut(&video) {
                media.paused = !media.paused;
            }
            state.clicks.push(selector.to_string());
            return true;
        }
        if let Some(player) = state
            .external_player
            .as_mut()
            .filter(|p| p.config.control_selector == selector)
        {
            player.playing = !player.playing;
            state.clicks.push(selector.to_string());
            return true;
        }
        false
    }

    fn pause(&self, id: ElementId) {
        if let Some(media) = self.state().media.get_mut(&id) {
            media.paused = true;
        }
    }

    fn play(&self, id: ElementId) -> Result<(), PlaybackRejected> {
        let mut state = self.state();
        if state.autoplay_blocked {
            return Err(PlaybackRejected(
                "NotAllowedError: play() failed because the user didn't interact with the document first"
                    .to_string(),
            ));
        }
        if let Some(media) = state.media.get_mut(&id) {
            media.paused = false;
        }
        Ok(())
    }
}

// ─── Browser ───

struct SimTab {
    info: TabInfo,
    page: Arc<SimulatedPage>,
    agent: Arc<TabAgent>,
}

#[derive(Default)]
struct BrowserTable {
    next_tab: i64,
    tabs: BTreeMap<TabId, SimTab>,
    active_by_window: HashMap<WindowId, TabId>,
    focused_window: Option<WindowId>,
    unresponsive: HashSet<TabId>,
    command_log: Vec<(TabId, TabCommand)>,
}

pub struct SimulatedBrowser {
    config: MediaFocusConfig,
    group: GroupDomain,
    self_ref: Weak<SimulatedBrowser>,
    coordinator: Mutex<Weak<Coordinator>>,
    table: Mutex<BrowserTable>,
}

impl SimulatedBrowser {
    pub fn new(config: MediaFocusConfig) -> Result<Arc<Self>, ConfigError> {
        let group = config.group.compile()?;
        Ok(Arc::new_cyclic(|self_ref| Self {
            config,
            group,
            self_ref: self_ref.clone(),
            coordinator: Mutex::new(Weak::new()),
            table: Mutex::new(BrowserTable::default()),
        }))
    }

    pub fn config(&self) -> &MediaFocusConfig {
        &self.config
    }

    pub fn group_domain(&self) -> &GroupDomain {
        &self.group
    }

    /// Routes agent messages to `coordinator` from now on.
    pub fn attach(&self, coordinator: &Arc<Coordinator>) {
        *lock(&self.coordinator) = Arc::downgrade(coordinator);
    }

    fn coordinator(&self) -> Option<Arc<Coordinator>> {
        lock(&self.coordinator).upgrade()
    }

    fn table(&self) -> MutexGuard<'_, BrowserTable> {
        lock(&self.table)
    }

    fn build_page(&self, tab_id: TabId, url: &str) -> (Arc<SimulatedPage>, Arc<TabAgent>) {
        let page = Arc::new(SimulatedPage::new(host_of(url).unwrap_or_default()));
        let link = Arc::new(SimulatedLink {
            browser: self.self_ref.clone(),
            tab_id,
        });
        let agent = TabAgent::new(page.clone(), link, &self.group, &self.config.adapters).with_tab_id(tab_id);
        (page, Arc::new(agent))
    }

    /// Opens a background tab. It becomes the window's active tab only if the
    /// window had none.
    pub fn open_tab(&self, window_id: WindowId, url: &str) -> TabId {
        let tab_id = {
            let mut table = self.table();
            table.next_tab += 1;
            TabId(table.next_tab)
        };
        let (page, agent) = self.build_page(tab_id, url);
        let mut table = self.table();
        let active = !table.active_by_window.contains_key(&window_id);
        if active {
            table.active_by_window.insert(window_id, tab_id);
        }
        if table.focused_window.is_none() {
            table.focused_window = Some(window_id);
        }
        table.tabs.insert(
            tab_id,
            SimTab {
                info: TabInfo {
                    id: tab_id,
                    window_id,
                    url: Some(url.to_string()),
                    active,
                    status: TabStatus::Complete,
                },
                page,
                agent,
            },
        );
        tab_id
    }

    pub fn page(&self, tab_id: TabId) -> Option<Arc<SimulatedPage>> {
        self.table().tabs.get(&tab_id).map(|t| t.page.clone())
    }

    pub fn agent(&self, tab_id: TabId) -> Option<Arc<TabAgent>> {
        self.table().tabs.get(&tab_id).map(|t| t.agent.clone())
    }

    /// Keeps the tab open but makes every message to it fail.
    pub fn set_unresponsive(&self, tab_id: TabId, unresponsive: bool) {
        let mut table = self.table();
        if unresponsive {
            table.unresponsive.insert(tab_id);
        } else {
            table.unresponsive.remove(&tab_id);
        }
    }

    /// Commands delivered so far (undeliverable ones are not logged).
    pub fn command_log(&self) -> Vec<(TabId, TabCommand)> {
        self.table().command_log.clone()
    }

    pub fn clear_command_log(&self) {
        self.table().command_log.clear();
    }

    /// Commands delivered to one tab.
    pub fn commands_for(&self, tab_id: TabId) -> Vec<TabCommand> {
        self.table()
            .command_log
            .iter()
            .filter(|(id, _)| *id == tab_id)
            .map(|(_, cmd)| cmd.clone())
            .collect()
    }

    /// The user clicks a tab: it becomes active in its window and the
    /// window takes focus. Only the coordinator's activation event fires;
    /// page visibility is driven separately with [`set_visibility`](Self::set_visibility).
    pub async fn switch_to(&self, tab_id: TabId) {
        {
            let mut table = self.table();
            let Some(window_id) = table.tabs.get(&tab_id).map(|t| t.info.window_id) else {
                return;
            };
            if let Some(previous) = table.active_by_window.insert(window_id, tab_id) {
                if let Some(tab) = table.tabs.get_mut(&previous) {
                    tab.info.active = false;
                }
            }
            if let Some(tab) = table.tabs.get_mut(&tab_id) {
                tab.info.active = true;
            }
            table.focused_window = Some(window_id);
        }
        if let Some(coordinator) = self.coordinator() {
            coordinator.on_tab_activated(tab_id).await;
        }
    }

    /// OS focus moves to `window_id`, or away from the browser with `None`.
    pub async fn focus_window(&self, window_id: Option<WindowId>) {
        self.table().focused_window = window_id;
        if let Some(coordinator) = self.coordinator() {
            coordinator
                .on_window_focus_changed(FocusChange::from_window(window_id))
                .await;
        }
    }

    /// The page's visibility changes; only its agent is told.
    pub async fn set_visibility(&self, tab_id: TabId, visibility: Visibility) {
        if let Some(agent) = self.agent(tab_id) {
            agent.on_visibility_changed(visibility).await;
        }
    }

    /// Loads a new page in the tab, discarding the old page and its agent.
    pub fn navigate(&self, tab_id: TabId, url: &str) {
        let (page, agent) = self.build_page(tab_id, url);
        {
            let mut table = self.table();
            let Some(tab) = table.tabs.get_mut(&tab_id) else {
                return;
            };
            tab.page = page;
            tab.agent = agent;
            tab.info.url = Some(url.to_string());
            tab.info.status = TabStatus::Complete;
        }
        if let Some(coordinator) = self.coordinator() {
            coordinator.on_tab_updated(tab_id, TabStatus::Complete, Some(url));
        }
    }

    pub fn close_tab(&self, tab_id: TabId) {
        if self.forget_tab(tab_id) {
            if let Some(coordinator) = self.coordinator() {
                coordinator.on_tab_removed(tab_id);
            }
        }
    }

    /// Removes a tab without delivering the removal event, as when the
    /// event is lost. Returns false if there was no such tab.
    pub fn forget_tab(&self, tab_id: TabId) -> bool {
        let mut table = self.table();
        let Some(tab) = table.tabs.remove(&tab_id) else {
            return false;
        };
        let window_id = tab.info.window_id;
        if table.active_by_window.get(&window_id) == Some(&tab_id) {
            table.active_by_window.remove(&window_id);
        }
        table.unresponsive.remove(&tab_id);
        true
    }

    /// A message from the settings UI, which has no sender tab.
    pub fn send_from_ui(&self, message: RuntimeMessage) -> Option<RuntimeReply> {
        let coordinator = self.coordinator()?;
        coordinator.handle_message(None, message).ok().flatten()
    }
}

#[async_trait]
impl TabDirectory for SimulatedBrowser {
    async fn get_tab(&self, tab_id: TabId) -> Option<TabInfo> {
        self.table().tabs.get(&tab_id).map(|t| t.info.clone())
    }

    async fn query_active_tab(&self) -> Option<TabInfo> {
        let table = self.table();
        let window_id = table.focused_window?;
        let tab_id = table.active_by_window.get(&window_id)?;
        table.tabs.get(tab_id).map(|t| t.info.clone())
    }

    async fn active_tab_in_window(&self, window_id: WindowId) -> Option<TabInfo> {
        let table = self.table();
        let tab_id = table.active_by_window.get(&window_id)?;
        table.tabs.get(tab_id).map(|t| t.info.clone())
    }

    async fn query_tabs(&self, pattern: &MatchPattern) -> Vec<TabInfo> {
        self.table()
            .tabs
            .values()
            .filter(|t| t.info.url.as_deref().is_some_and(|url| pattern.matches(url)))
            .map(|t| t.info.clone())
            .collect()
    }
}

#[async_trait]
impl TabMessenger for SimulatedBrowser {
    async fn send_command(&self, tab_id: TabId, command: TabCommand) -> Result<TabReply, ChannelError> {
        // Delivery is a suspension point, as it is in a real browser.
        tokio::task::yield_now().await;
        let agent = {
            let mut table = self.table();
            if table.unresponsive.contains(&tab_id) {
                return Err(ChannelError::NoReceiver(tab_id));
            }
            let agent = table
                .tabs
                .get(&tab_id)
                .map(|t| t.agent.clone())
                .ok_or(ChannelError::TabClosed(tab_id))?;
            table.command_log.push((tab_id, command.clone()));
            agent
        };
        Ok(agent.handle_command(command))
    }
}

/// An agent's route back to the coordinator.
struct SimulatedLink {
    browser: Weak<SimulatedBrowser>,
    tab_id: TabId,
}

#[async_trait]
impl CoordinatorLink for SimulatedLink {
    async fn send(&self, message: RuntimeMessage) -> Result<Option<RuntimeReply>, ChannelError> {
        tokio::task::yield_now().await;
        let browser = self
            .browser
            .upgrade()
            .ok_or_else(|| ChannelError::Disconnected("browser shut down".to_string()))?;
        let coordinator = browser
            .coordinator()
            .ok_or_else(|| ChannelError::Disconnected("no coordinator attached".to_string()))?;
        coordinator
            .handle_message(Some(self.tab_id), message)
            .map_err(|e| ChannelError::Disconnected(e.to_string()))
    }
}
