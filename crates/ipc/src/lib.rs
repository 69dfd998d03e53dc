//! Boundary types for arstage
//!
//! Everything that crosses a process or UI boundary lives here: the interaction
//! mode exposed to the toolbar, whole-state snapshots mirrored to the wizard,
//! wizard edit commands and the sync envelope carried over the relay.

mod commands;
mod error;
mod messages;
mod types;

pub use commands::*;
pub use error::IpcError;
pub use messages::*;
pub use types::*;
