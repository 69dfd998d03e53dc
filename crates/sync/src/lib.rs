//! Remote scene sync for arstage
//!
//! Clients exchange [`arstage_ipc::SyncMessage`] frames over WebSocket through
//! a relay. The relay keeps the latest full snapshot, hands it to each newly
//! connected client and forwards every inbound snapshot to the other clients.
//! There is no merge: the last snapshot written wins.

mod client;
mod relay;

pub use client::{SyncClient, SyncEvent, SyncHandle};
pub use relay::Relay;

use arstage_ipc::IpcError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SyncError {
    #[error("Connection failed: {0}")]
    Connection(String),

    #[error("Bind failed: {0}")]
    Bind(#[from] std::io::Error),

    #[error("Protocol error: {0}")]
    Protocol(#[from] IpcError),

    #[error("Runtime error: {0}")]
    Runtime(String),

    #[error("Sync channel closed")]
    ChannelClosed,
}

impl From<tokio_tungstenite::tungstenite::Error> for SyncError {
    fn from(e: tokio_tungstenite::tungstenite::Error) -> Self {
        SyncError::Connection(e.to_string())
    }
}
