//! Newline-delimited JSON host protocol.
//!
//! The extension side forwards browser events and runtime messages to this
//! process over stdin and answers its requests; this process writes requests
//! and replies to stdout. One JSON object per line.
//!
//! Inbound:
//! `{"type":"event","event":{"kind":"tabActivated","tabId":3}}`
//! `{"type":"message","id":7,"sender":3,"message":{"action":"shouldResumeMedia"}}`
//! `{"type":"response","id":12,"ok":{"mediaPaused":true}}` or `{"type":"response","id":12,"error":"..."}`
//!
//! Outbound:
//! `{"type":"ready","version":"0.3.0"}`
//! `{"type":"request","id":12,"request":{"op":"sendMessage","tabId":3,"message":{"action":"pauseMedia"}}}`
//! `{"type":"reply","id":7,"result":{"shouldResume":true}}`

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, warn};

use super::{TabDirectory, TabMessenger};
use crate::managers::coordinator::Coordinator;
use crate::message_handler::{dispatch_event, handle_runtime_message};
use crate::types::errors::{BridgeError, ChannelError};
use crate::types::match_pattern::MatchPattern;
use crate::types::message::{BrowserEvent, TabCommand, TabReply};
use crate::types::tab::{TabId, TabInfo, WindowId};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum InboundFrame {
    Event {
        event: BrowserEvent,
    },
    Message {
        id: u64,
        #[serde(default)]
        sender: Option<TabId>,
        message: Value,
    },
    Response {
        id: u64,
        #[serde(default)]
        ok: Option<Value>,
        #[serde(default)]
        error: Option<String>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum OutboundFrame {
    Ready {
        version: String,
    },
    Request {
        id: u64,
        request: HostRequest,
    },
    Reply {
        id: u64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        result: Option<Value>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        error: Option<String>,
    },
}

/// Something this process asks the extension side to do.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "camelCase")]
pub enum HostRequest {
    SendMessage {
        #[serde(rename = "tabId")]
        tab_id: TabId,
        message: TabCommand,
    },
    GetTab {
        #[serde(rename = "tabId")]
        tab_id: TabId,
    },
    QueryActiveTab,
    ActiveTabInWindow {
        #[serde(rename = "windowId")]
        window_id: WindowId,
    },
    QueryTabs {
        url: String,
    },
}

type PendingReply = oneshot::Sender<Result<Value, String>>;

/// Request/response correlation over the stdio channel.
pub struct StdioBridge {
    outbound: mpsc::UnboundedSender<OutboundFrame>,
    pending: Mutex<HashMap<u64, PendingReply>>,
    next_id: AtomicU64,
}

impl StdioBridge {
    /// Returns the bridge and the stream of frames to write to stdout.
    pub fn new() -> (Arc<Self>, mpsc::UnboundedReceiver<OutboundFrame>) {
        let (outbound, rx) = mpsc::unbounded_channel();
        let bridge = Arc::new(Self {
            outbound,
            pending: Mutex::new(HashMap::new()),
            next_id: AtomicU64::new(1),
        });
        (bridge, rx)
    }

    fn pending(&self) -> MutexGuard<'_, HashMap<u64, PendingReply>> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn pending_count(&self) -> usize {
        self.pending().len()
    }

    /// Sends a request and waits for the matching response frame.
    pub async fn request(&self, request: HostRequest) -> Result<Value, String> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let (tx, rx) = oneshot::channel();
        self.pending().insert(id, tx);
        if self.outbound.send(OutboundFrame::Request { id, request }).is_err() {
            self.pending().remove(&id);
            return Err("bridge output closed".to_string());
        }
        rx.await.unwrap_or_else(|_| Err("bridge closed before responding".to_string()))
    }

    /// Delivers a response frame. Returns false for an unknown id.
    pub fn complete(&self, id: u64, result: Result<Value, String>) -> bool {
        match self.pending().remove(&id) {
            Some(tx) => {
                let _ = tx.send(result);
                true
            }
            None => false,
        }
    }

    /// Fails every outstanding request, e.g. when stdin closes.
    pub fn fail_pending(&self) {
        self.pending().clear();
    }

    pub fn send_frame(&self, frame: OutboundFrame) {
        if self.outbound.send(frame).is_err() {
            debug!("dropping frame, bridge output closed");
        }
    }
}

/// Maps the extension runtime's error strings onto channel errors.
fn classify_send_error(tab_id: TabId, error: String) -> ChannelError {
    if error.contains("Receiving end does not exist") {
        ChannelError::NoReceiver(tab_id)
    } else if error.contains("No tab with id") {
        ChannelError::TabClosed(tab_id)
    } else {
        ChannelError::Disconnected(error)
    }
}

#[async_trait]
impl TabMessenger for StdioBridge {
    async fn send_command(&self, tab_id: TabId, command: TabCommand) -> Result<TabReply, ChannelError> {
        let value = self
            .request(HostRequest::SendMessage { tab_id, message: command })
            .await
            .map_err(|e| classify_send_error(tab_id, e))?;
        serde_json::from_value(value).map_err(|e| ChannelError::MalformedReply(e.to_string()))
    }
}

fn decode_tab(value: Result<Value, String>) -> Option<TabInfo> {
    match value {
        Ok(value) => serde_json::from_value::<Option<TabInfo>>(value).ok().flatten(),
        Err(e) => {
            debug!("tab lookup failed: {e}");
            None
        }
    }
}

#[async_trait]
impl TabDirectory for StdioBridge {
    async fn get_tab(&self, tab_id: TabId) -> Option<TabInfo> {
        decode_tab(self.request(HostRequest::GetTab { tab_id }).await)
    }

    async fn query_active_tab(&self) -> Option<TabInfo> {
        decode_tab(self.request(HostRequest::QueryActiveTab).await)
    }

    async fn active_tab_in_window(&self, window_id: WindowId) -> Option<TabInfo> {
        decode_tab(self.request(HostRequest::ActiveTabInWindow { window_id }).await)
    }

    async fn query_tabs(&self, pattern: &MatchPattern) -> Vec<TabInfo> {
        let url = pattern.as_str().to_string();
        match self.request(HostRequest::QueryTabs { url }).await {
            Ok(value) => serde_json::from_value(value).unwrap_or_default(),
            Err(e) => {
                debug!("tab query failed: {e}");
                Vec::new()
            }
        }
    }
}

async fn write_frame<W>(writer: &mut W, frame: &OutboundFrame) -> Result<(), BridgeError>
where
    W: AsyncWrite + Unpin,
{
    let mut line = serde_json::to_string(frame)?;
    line.push('\n');
    writer.write_all(line.as_bytes()).await?;
    writer.flush().await?;
    Ok(())
}

/// Writes frames until `shutdown` fires, then drains whatever is queued.
async fn write_frames<W>(
    mut writer: W,
    mut rx: mpsc::UnboundedReceiver<OutboundFrame>,
    mut shutdown: oneshot::Receiver<()>,
) -> Result<(), BridgeError>
where
    W: AsyncWrite + Unpin,
{
    loop {
        tokio::select! {
            frame = rx.recv() => match frame {
                Some(frame) => write_frame(&mut writer, &frame).await?,
                None => break,
            },
            _ = &mut shutdown => {
                while let Ok(frame) = rx.try_recv() {
                    write_frame(&mut writer, &frame).await?;
                }
                break;
            }
        }
    }
    writer.flush().await?;
    Ok(())
}

/// Runs the protocol until `reader` reaches end of input.
///
/// Events run as independent tasks so a handler awaiting a tab's reply never
/// blocks the reader that will deliver that reply.
pub async fn serve<R, W>(
    reader: R,
    writer: W,
    coordinator: Arc<Coordinator>,
    bridge: Arc<StdioBridge>,
    outbound: mpsc::UnboundedReceiver<OutboundFrame>,
) -> Result<(), BridgeError>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin + Send + 'static,
{
    let (stop_writer, writer_stopped) = oneshot::channel();
    let writer_task = tokio::spawn(write_frames(writer, outbound, writer_stopped));

    bridge.send_frame(OutboundFrame::Ready {
        version: env!("CARGO_PKG_VERSION").to_string(),
    });

    let mut lines = reader.lines();
    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        let frame: InboundFrame = match serde_json::from_str(&line) {
            Ok(frame) => frame,
            Err(e) => {
                warn!("ignoring unparseable frame: {e}");
                continue;
            }
        };

        match frame {
            InboundFrame::Event { event } => {
                let coordinator = Arc::clone(&coordinator);
                tokio::spawn(async move {
                    dispatch_event(&coordinator, event).await;
                });
            }
            InboundFrame::Message { id, sender, message } => {
                let frame = match handle_runtime_message(&coordinator, sender, &message) {
                    Ok(result) => OutboundFrame::Reply { id, result, error: None },
                    Err(e) => OutboundFrame::Reply {
                        id,
                        result: None,
                        error: Some(e.to_string()),
                    },
                };
                bridge.send_frame(frame);
            }
            InboundFrame::Response { id, ok, error } => {
                let result = match error {
                    Some(error) => Err(error),
                    None => Ok(ok.unwrap_or(Value::Null)),
                };
                if !bridge.complete(id, result) {
                    debug!(id, "response for unknown request");
                }
            }
        }
    }

    info!("input closed, shutting down bridge");
    bridge.fail_pending();
    let _ = stop_writer.send(());
    writer_task
        .await
        .map_err(|e| BridgeError::Protocol(format!("writer task failed: {e}")))?
}
