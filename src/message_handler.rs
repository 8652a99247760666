//! JSON entry points for the message protocol.
//!
//! Hosts receive raw JSON from the extension runtime; these functions decode
//! it, call the coordinator or a tab agent, and encode the reply. They are
//! kept apart from the hosts so they can be unit-tested on their own.

use serde_json::Value;

use crate::managers::coordinator::Coordinator;
use crate::managers::tab_agent::TabAgent;
use crate::types::errors::DispatchError;
use crate::types::message::{BrowserEvent, RuntimeMessage, TabCommand};
use crate::types::tab::{FocusChange, TabId, TabStatus};

/// Handles a message addressed to the coordinator.
///
/// `sender` is the tab id supplied by the messaging layer, `None` for the
/// settings UI. Returns `Ok(None)` for messages without a reply.
pub fn handle_runtime_message(
    coordinator: &Coordinator,
    sender: Option<TabId>,
    message: &Value,
) -> Result<Option<Value>, DispatchError> {
    let message: RuntimeMessage = serde_json::from_value(message.clone())?;
    let reply = coordinator.handle_message(sender, message)?;
    Ok(reply.map(serde_json::to_value).transpose()?)
}

/// Handles a command addressed to one tab's agent.
pub fn handle_tab_command(agent: &TabAgent, command: &Value) -> Result<Value, DispatchError> {
    let command: TabCommand = serde_json::from_value(command.clone())?;
    Ok(serde_json::to_value(agent.handle_command(command))?)
}

/// Routes a browser event to the matching coordinator handler.
pub async fn dispatch_event(coordinator: &Coordinator, event: BrowserEvent) {
    match event {
        BrowserEvent::TabActivated { tab_id } => coordinator.on_tab_activated(tab_id).await,
        BrowserEvent::WindowFocusChanged { window_id } => {
            coordinator
                .on_window_focus_changed(FocusChange::from_window(window_id))
                .await
        }
        BrowserEvent::TabUpdated { tab_id, status, url } => {
            coordinator.on_tab_updated(tab_id, status.unwrap_or_default(), url.as_deref())
        }
        BrowserEvent::TabRemoved { tab_id } => coordinator.on_tab_removed(tab_id),
    }
}
