//! Snapshot relay
//!
//! Accepts WebSocket clients, remembers the latest snapshot, sends it to each
//! newly connected client and forwards every inbound snapshot to all others.

use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use arstage_ipc::SyncMessage;
use futures_util::{SinkExt, StreamExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{RwLock, broadcast};
use tokio_tungstenite::{accept_async, tungstenite::Message};
use tracing::{debug, info, warn};

use crate::SyncError;

const BROADCAST_CAPACITY: usize = 64;

struct Hub {
    latest: RwLock<Option<String>>,
    /// (sender client id, encoded frame)
    frames: broadcast::Sender<(u64, String)>,
    next_client: AtomicU64,
}

pub struct Relay {
    listener: TcpListener,
    hub: Arc<Hub>,
}

impl Relay {
    pub async fn bind(addr: &str) -> Result<Self, SyncError> {
        let listener = TcpListener::bind(addr).await?;
        let (frames, _) = broadcast::channel(BROADCAST_CAPACITY);
        Ok(Self {
            listener,
            hub: Arc::new(Hub {
                latest: RwLock::new(None),
                frames,
                next_client: AtomicU64::new(1),
            }),
        })
    }

    pub fn local_addr(&self) -> Result<SocketAddr, SyncError> {
        Ok(self.listener.local_addr()?)
    }

    /// Accept clients until the listener fails
    pub async fn run(self) -> Result<(), SyncError> {
        info!("Sync relay listening on {}", self.local_addr()?);
        loop {
            let (stream, peer) = self.listener.accept().await?;
            let id = self.hub.next_client.fetch_add(1, Ordering::Relaxed);
            // Subscribe before the handshake so a client never misses a frame
            // sent after its connect returns
            let frames = self.hub.frames.subscribe();
            let hub = self.hub.clone();
            tokio::spawn(async move {
                if let Err(e) = handle_client(stream, id, hub, frames).await {
                    warn!("Client {} ({}) dropped: {}", id, peer, e);
                }
                debug!("Client {} ({}) disconnected", id, peer);
            });
        }
    }
}

async fn handle_client(
    stream: TcpStream,
    id: u64,
    hub: Arc<Hub>,
    mut frames: broadcast::Receiver<(u64, String)>,
) -> Result<(), SyncError> {
    let ws_stream = accept_async(stream).await?;
    let (mut write, mut read) = ws_stream.split();

    let latest = hub.latest.read().await.clone();
    if let Some(latest) = latest {
        write.send(Message::Text(latest.into())).await?;
    }

    loop {
        tokio::select! {
            msg = read.next() => match msg {
                Some(Ok(Message::Text(text))) => match SyncMessage::from_json(&text) {
                    Ok(SyncMessage::Hello { role }) => info!("Client {} joined as {:?}", id, role),
                    Ok(SyncMessage::AppState(state)) => {
                        debug!("Client {} sent {} objects", id, state.objects.len());
                        let frame = text.to_string();
                        *hub.latest.write().await = Some(frame.clone());
                        // No receivers is fine; the snapshot is still kept
                        let _ = hub.frames.send((id, frame));
                    }
                    Err(e) => warn!("Client {} sent malformed frame: {}", id, e),
                },
                Some(Ok(Message::Close(_))) | None => return Ok(()),
                Some(Err(e)) => return Err(e.into()),
                Some(Ok(_)) => {}
            },
            frame = frames.recv() => match frame {
                Ok((from, text)) if from != id => write.send(Message::Text(text.into())).await?,
                Ok(_) => {}
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!("Client {} lagged, skipped {} snapshots", id, skipped);
                }
                Err(broadcast::error::RecvError::Closed) => return Ok(()),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{SyncClient, SyncEvent};
    use arstage_ipc::{ClientRole, ObjectState, SharedState};
    use std::time::Duration;
    use tokio::time::timeout;
    use tokio_tungstenite::connect_async;

    async fn start_relay() -> String {
        let relay = Relay::bind("127.0.0.1:0").await.unwrap();
        let addr = relay.local_addr().unwrap();
        tokio::spawn(relay.run());
        format!("ws://{}", addr)
    }

    fn state_with(id: &str) -> SharedState {
        SharedState {
            objects: vec![ObjectState {
                id: id.to_string(),
                asset_ref: "cube".to_string(),
                position: [0.0, 0.0, -1.0],
                rotation: [0.0; 3],
                scale: 1.0,
                color: None,
            }],
            ..Default::default()
        }
    }

    async fn next_state(
        read: &mut (impl futures_util::Stream<Item = Result<Message, tokio_tungstenite::tungstenite::Error>>
              + Unpin),
    ) -> SharedState {
        loop {
            let msg = timeout(Duration::from_secs(5), read.next())
                .await
                .expect("frame within timeout")
                .expect("stream open")
                .expect("valid frame");
            if let Message::Text(text) = msg {
                if let Ok(SyncMessage::AppState(state)) = SyncMessage::from_json(&text) {
                    return state;
                }
            }
        }
    }

    #[tokio::test]
    async fn test_relay_forwards_and_replays_latest() {
        let url = start_relay().await;

        let (a, _) = connect_async(&url).await.unwrap();
        let (b, _) = connect_async(&url).await.unwrap();
        let (mut a_write, _a_read) = a.split();
        let (_b_write, mut b_read) = b.split();

        let frame = SyncMessage::AppState(state_with("tree")).to_json().unwrap();
        a_write.send(Message::Text(frame.into())).await.unwrap();
        assert_eq!(next_state(&mut b_read).await.objects[0].id, "tree");

        // A late joiner receives the latest snapshot immediately
        let (c, _) = connect_async(&url).await.unwrap();
        let (_c_write, mut c_read) = c.split();
        assert_eq!(next_state(&mut c_read).await.objects[0].id, "tree");
    }

    #[tokio::test]
    async fn test_clients_mirror_through_relay() {
        let url = start_relay().await;
        let mut headset = SyncClient::new(url.clone(), ClientRole::Headset).start();
        let mut wizard = SyncClient::new(url, ClientRole::Wizard).start();

        for handle in [&mut headset, &mut wizard] {
            let event = timeout(Duration::from_secs(5), handle.recv()).await.unwrap();
            assert_eq!(event, Some(SyncEvent::Connected));
        }

        wizard.send(state_with("bench")).unwrap();
        let event = timeout(Duration::from_secs(5), headset.recv()).await.unwrap();
        match event {
            Some(SyncEvent::State(state)) => assert_eq!(state.objects[0].id, "bench"),
            other => panic!("expected state, got {:?}", other),
        }
    }
}
