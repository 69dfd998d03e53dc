//! Sync envelope exchanged over the relay.

use serde::{Deserialize, Serialize};

use crate::error::IpcError;
use crate::types::SharedState;

/// Who is on the other end of a sync connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClientRole {
    /// AR device running one of the interaction prototypes
    Headset,
    /// Remote control surface editing the shared scene
    Wizard,
}

/// Messages carried by the sync channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum SyncMessage {
    /// Client announces itself after connecting
    Hello { role: ClientRole },

    /// Full shared-state snapshot (last writer wins)
    AppState(SharedState),
}

impl SyncMessage {
    /// Encode as a JSON text frame
    pub fn to_json(&self) -> Result<String, IpcError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Decode a JSON text frame
    pub fn from_json(text: &str) -> Result<Self, IpcError> {
        if text.trim().is_empty() {
            return Err(IpcError::InvalidFormat("empty frame".into()));
        }
        Ok(serde_json::from_str(text)?)
    }
}
