//! Relay client

use std::time::Duration;

use arstage_ipc::{ClientRole, SharedState, SyncMessage};
use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio_tungstenite::{connect_async, tungstenite::Message};
use tracing::{debug, info, warn};

use crate::SyncError;

/// What the client reports back to the host.
#[derive(Debug, Clone, PartialEq)]
pub enum SyncEvent {
    Connected,
    Disconnected,
    /// Full snapshot from another client
    State(SharedState),
}

/// Host side of a running client: queue outbound snapshots, drain inbound events.
pub struct SyncHandle {
    outbound: mpsc::UnboundedSender<SharedState>,
    inbound: mpsc::UnboundedReceiver<SyncEvent>,
}

impl SyncHandle {
    /// Queue a snapshot for the relay
    pub fn send(&self, state: SharedState) -> Result<(), SyncError> {
        self.outbound.send(state).map_err(|_| SyncError::ChannelClosed)
    }

    /// Next pending event without blocking
    pub fn try_recv(&mut self) -> Option<SyncEvent> {
        self.inbound.try_recv().ok()
    }

    pub async fn recv(&mut self) -> Option<SyncEvent> {
        self.inbound.recv().await
    }
}

/// WebSocket client that keeps a connection to the relay alive.
///
/// The connection is retried after `reconnect_delay` whenever it drops; the
/// host keeps working locally in the meantime.
pub struct SyncClient {
    server_url: String,
    role: ClientRole,
    reconnect_delay: Duration,
}

impl SyncClient {
    pub fn new(server_url: impl Into<String>, role: ClientRole) -> Self {
        Self {
            server_url: server_url.into(),
            role,
            reconnect_delay: Duration::from_secs(2),
        }
    }

    pub fn with_reconnect_delay(mut self, delay: Duration) -> Self {
        self.reconnect_delay = delay;
        self
    }

    /// Run on the current tokio runtime
    pub fn start(self) -> SyncHandle {
        let (handle, outbound_rx, inbound_tx) = channels();
        tokio::spawn(self.run(outbound_rx, inbound_tx));
        handle
    }

    /// Run on a dedicated thread with its own runtime, for hosts without one
    pub fn spawn_thread(self) -> Result<SyncHandle, SyncError> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .enable_all()
            .build()
            .map_err(|e| SyncError::Runtime(e.to_string()))?;
        let (handle, outbound_rx, inbound_tx) = channels();
        std::thread::Builder::new()
            .name("arstage-sync".to_string())
            .spawn(move || runtime.block_on(self.run(outbound_rx, inbound_tx)))
            .map_err(|e| SyncError::Runtime(e.to_string()))?;
        Ok(handle)
    }

    async fn run(
        self,
        mut outbound_rx: mpsc::UnboundedReceiver<SharedState>,
        inbound_tx: mpsc::UnboundedSender<SyncEvent>,
    ) {
        loop {
            match self.session(&mut outbound_rx, &inbound_tx).await {
                Ok(()) => {
                    debug!("Sync host went away, stopping client");
                    return;
                }
                Err(SyncError::ChannelClosed) => return,
                Err(e) => {
                    warn!("Sync connection to {} lost: {}", self.server_url, e);
                    if inbound_tx.send(SyncEvent::Disconnected).is_err() {
                        return;
                    }
                }
            }
            tokio::time::sleep(self.reconnect_delay).await;
        }
    }

    /// One connection lifetime. `Ok` means the host dropped its handle.
    async fn session(
        &self,
        outbound_rx: &mut mpsc::UnboundedReceiver<SharedState>,
        inbound_tx: &mpsc::UnboundedSender<SyncEvent>,
    ) -> Result<(), SyncError> {
        let (ws_stream, _) = connect_async(&self.server_url).await?;
        let (mut write, mut read) = ws_stream.split();

        let hello = SyncMessage::Hello { role: self.role }.to_json()?;
        write.send(Message::Text(hello.into())).await?;
        info!("Connected to sync relay at {}", self.server_url);
        inbound_tx
            .send(SyncEvent::Connected)
            .map_err(|_| SyncError::ChannelClosed)?;

        loop {
            tokio::select! {
                msg = read.next() => match msg {
                    Some(Ok(Message::Text(text))) => match SyncMessage::from_json(&text) {
                        Ok(SyncMessage::AppState(state)) => inbound_tx
                            .send(SyncEvent::State(state))
                            .map_err(|_| SyncError::ChannelClosed)?,
                        Ok(SyncMessage::Hello { .. }) => {}
                        Err(e) => warn!("Ignoring malformed sync frame: {}", e),
                    },
                    Some(Ok(Message::Close(_))) | None => {
                        return Err(SyncError::Connection("closed by relay".into()));
                    }
                    Some(Err(e)) => return Err(e.into()),
                    Some(Ok(_)) => {}
                },
                state = outbound_rx.recv() => {
                    let Some(state) = state else {
                        let _ = write.send(Message::Close(None)).await;
                        return Ok(());
                    };
                    let json = SyncMessage::AppState(state).to_json()?;
                    write.send(Message::Text(json.into())).await?;
                }
            }
        }
    }
}

fn channels() -> (
    SyncHandle,
    mpsc::UnboundedReceiver<SharedState>,
    mpsc::UnboundedSender<SyncEvent>,
) {
    let (outbound, outbound_rx) = mpsc::unbounded_channel();
    let (inbound_tx, inbound) = mpsc::unbounded_channel();
    (SyncHandle { outbound, inbound }, outbound_rx, inbound_tx)
}
