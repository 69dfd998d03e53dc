//! Selected object and active manipulation mode.

use arstage_ipc::InteractionMode;
use tracing::info;

/// Which object is selected and what a gesture does to it.
///
/// In modeful prototypes the mode only changes through [`Self::set_mode`].
/// In modeless prototypes selecting implies translate and `set_mode` is
/// rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionState {
    selected: Option<String>,
    mode: InteractionMode,
    modeful: bool,
}

impl SelectionState {
    pub fn new(modeful: bool) -> Self {
        Self {
            selected: None,
            mode: InteractionMode::None,
            modeful,
        }
    }

    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn mode(&self) -> InteractionMode {
        self.mode
    }

    pub fn is_modeful(&self) -> bool {
        self.modeful
    }

    pub fn is_selected(&self, id: &str) -> bool {
        self.selected.as_deref() == Some(id)
    }

    /// Select `id`, returning the previously selected id if it differed.
    pub fn select(&mut self, id: &str) -> Option<String> {
        if !self.modeful {
            self.mode = InteractionMode::Translate;
        }
        if self.is_selected(id) {
            return None;
        }
        info!("Selected {}", id);
        self.selected.replace(id.to_string())
    }

    /// Clear selection and mode. Returns whether anything was selected.
    pub fn deselect(&mut self) -> bool {
        self.mode = InteractionMode::None;
        match self.selected.take() {
            Some(id) => {
                info!("Deselected {}", id);
                true
            }
            None => false,
        }
    }

    /// Set the mode. Ignored (returns `false`) for modeless prototypes.
    pub fn set_mode(&mut self, mode: InteractionMode) -> bool {
        if !self.modeful {
            return false;
        }
        if self.mode != mode {
            info!("Mode: {}", mode.display_name());
        }
        self.mode = mode;
        true
    }
}
