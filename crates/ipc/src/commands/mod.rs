//! Command types for boundary messages.

mod mode;

pub use mode::*;

use crate::types::ObjectPatchState;
use serde::{Deserialize, Serialize};

/// Scene edits issued by the remote wizard editor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum WizardCommand {
    AddObject {
        asset_ref: String,
        /// Optional world position (defaults to the origin placement sentinel)
        position: Option<[f32; 3]>,
    },
    DeleteObject {
        id: String,
    },
    UpdateObject {
        id: String,
        patch: ObjectPatchState,
    },
}
