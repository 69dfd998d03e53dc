//! Type definitions for boundary messages.

mod assets;
mod scene;

pub use assets::*;
pub use scene::*;
