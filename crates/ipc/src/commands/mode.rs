//! Manipulation mode exposed to the toolbar.

use serde::{Deserialize, Serialize};

/// Which manipulation a gesture performs on the selected object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InteractionMode {
    #[default]
    None,
    Translate,
    Rotate,
    Scale,
}

impl InteractionMode {
    /// Modes a toolbar can offer (excludes `None`)
    pub fn selectable() -> &'static [InteractionMode] {
        &[
            InteractionMode::Translate,
            InteractionMode::Rotate,
            InteractionMode::Scale,
        ]
    }

    /// Get display name
    pub fn display_name(&self) -> &'static str {
        match self {
            InteractionMode::None => "None",
            InteractionMode::Translate => "Move",
            InteractionMode::Rotate => "Rotate",
            InteractionMode::Scale => "Scale",
        }
    }

    /// Parse a toolbar label. Accepts `move` as an alias of `translate`.
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_ascii_lowercase().as_str() {
            "none" => Some(InteractionMode::None),
            "move" | "translate" => Some(InteractionMode::Translate),
            "rotate" => Some(InteractionMode::Rotate),
            "scale" => Some(InteractionMode::Scale),
            _ => None,
        }
    }
}

/// Commands from the mode/selection toolbar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ModeCommand {
    /// Switch the active mode (ignored by modeless prototypes)
    SetMode(InteractionMode),
    /// Drop the current selection
    Deselect,
}
