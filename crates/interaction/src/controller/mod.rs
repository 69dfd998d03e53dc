//! Interaction controllers
//!
//! The four prototypes share one contract, dispatched through [`Controller`]:
//! - `on_select_start` on pointer down: select and capture a reference frame
//! - `on_update` on pointer move: map the gesture to a candidate transform
//! - `on_end` on pointer up: drop per-gesture state
//! - `on_frame` once per rendered frame (device-pose variants only)
//!
//! Controllers never write the store. They return a [`Candidate`] computed
//! from their reference frame and the session commits it after snapping.

mod device_modeful;
mod device_modeless;
mod touch_modeful;
mod touch_modeless;

pub use device_modeful::DeviceModeful;
pub use device_modeless::DeviceModeless;
pub use touch_modeful::TouchModeful;
pub use touch_modeless::TouchModeless;

use arstage_config::{InteractionConfig, ManipulationTuning};
use glam::{Vec2, Vec3};

use crate::gesture::InputEvent;
use crate::math::{CameraPose, yaw_flattened_axes};
use crate::reference::ReferenceFrame;
use crate::selection::SelectionState;
use crate::store::{ObjectPatch, SceneStore};

/// A proposed change to one object, not yet snapped or committed.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub id: String,
    pub patch: ObjectPatch,
}

impl Candidate {
    pub fn new(id: impl Into<String>, patch: ObjectPatch) -> Self {
        Self {
            id: id.into(),
            patch,
        }
    }
}

/// Everything a controller may read during one update.
///
/// The store is borrowed immutably, so a controller cannot observe its own
/// writes mid-computation.
pub struct ControllerContext<'a> {
    pub camera: &'a CameraPose,
    pub store: &'a SceneStore,
    pub selection: &'a mut SelectionState,
    pub tuning: &'a ManipulationTuning,
}

impl ControllerContext<'_> {
    /// Capture a reference frame for the selected object, if it still exists
    pub fn capture_selected(&self) -> Option<ReferenceFrame> {
        let id = self.selection.selected()?;
        let object = self.store.get(id)?;
        Some(ReferenceFrame::capture(self.camera, object, self.selection.mode()))
    }

    /// Select `id` if the store knows it. Returns whether it did.
    pub fn select_hit(&mut self, hit: Option<&str>) -> bool {
        match hit {
            Some(id) if self.store.contains(id) => {
                self.selection.select(id);
                true
            }
            _ => false,
        }
    }
}

/// Camera-relative ground-plane move for a total screen delta.
///
/// Uses the reference camera's yaw-flattened axes: +x drags along camera
/// right, -y (screen up) along camera forward. `None` when the axes are
/// degenerate.
pub(crate) fn touch_translate(
    frame: &ReferenceFrame,
    delta: Vec2,
    tuning: &ManipulationTuning,
) -> Option<Vec3> {
    let axes = yaw_flattened_axes(frame.camera.rotation, tuning.degenerate_epsilon)?;
    Some(
        frame.object_position
            + axes.right * (delta.x * tuning.move_factor)
            + axes.forward * (-delta.y * tuning.move_factor),
    )
}

/// The active interaction prototype.
#[derive(Debug, Clone)]
pub enum Controller {
    ModefulTouch(TouchModeful),
    ModelessTouch(TouchModeless),
    ModefulDevice(DeviceModeful),
    ModelessDevice(DeviceModeless),
}

impl Controller {
    /// Pick the variant matching a feature preset
    pub fn for_config(config: &InteractionConfig) -> Self {
        match (config.use_device_position, config.modeful) {
            (false, true) => Controller::ModefulTouch(TouchModeful::default()),
            (false, false) => Controller::ModelessTouch(TouchModeless::default()),
            (true, true) => Controller::ModefulDevice(DeviceModeful::default()),
            (true, false) => Controller::ModelessDevice(DeviceModeless::default()),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Controller::ModefulTouch(_) => "modeful touch",
            Controller::ModelessTouch(_) => "modeless touch",
            Controller::ModefulDevice(_) => "modeful device",
            Controller::ModelessDevice(_) => "modeless device",
        }
    }

    pub fn on_select_start(
        &mut self,
        ctx: &mut ControllerContext<'_>,
        event: &InputEvent,
    ) -> Option<Candidate> {
        match self {
            Controller::ModefulTouch(c) => c.on_select_start(ctx, event),
            Controller::ModelessTouch(c) => c.on_select_start(ctx, event),
            Controller::ModefulDevice(c) => c.on_select_start(ctx, event),
            Controller::ModelessDevice(c) => c.on_select_start(ctx, event),
        }
    }

    pub fn on_update(
        &mut self,
        ctx: &mut ControllerContext<'_>,
        event: &InputEvent,
    ) -> Option<Candidate> {
        match self {
            Controller::ModefulTouch(c) => c.on_update(ctx, event),
            Controller::ModelessTouch(c) => c.on_update(ctx, event),
            Controller::ModefulDevice(c) => c.on_update(ctx, event),
            Controller::ModelessDevice(c) => c.on_update(ctx, event),
        }
    }

    pub fn on_end(&mut self, ctx: &mut ControllerContext<'_>, event: &InputEvent) {
        match self {
            Controller::ModefulTouch(c) => c.on_end(ctx, event),
            Controller::ModelessTouch(c) => c.on_end(ctx, event),
            Controller::ModefulDevice(c) => c.on_end(ctx, event),
            Controller::ModelessDevice(c) => c.on_end(ctx, event),
        }
    }

    /// Per-frame update from the live camera pose
    pub fn on_frame(&mut self, ctx: &mut ControllerContext<'_>, _dt: f32) -> Option<Candidate> {
        match self {
            Controller::ModefulTouch(_) | Controller::ModelessTouch(_) => None,
            Controller::ModefulDevice(c) => c.on_frame(ctx),
            Controller::ModelessDevice(c) => c.on_frame(ctx),
        }
    }

    /// Discard every reference frame and gesture baseline
    pub fn cancel(&mut self) {
        match self {
            Controller::ModefulTouch(c) => c.cancel(),
            Controller::ModelessTouch(c) => c.cancel(),
            Controller::ModefulDevice(c) => c.cancel(),
            Controller::ModelessDevice(c) => c.cancel(),
        }
    }

    /// Whether a manipulation is in progress
    pub fn is_manipulating(&self) -> bool {
        match self {
            Controller::ModefulTouch(c) => c.is_manipulating(),
            Controller::ModelessTouch(c) => c.is_manipulating(),
            Controller::ModefulDevice(c) => c.is_manipulating(),
            Controller::ModelessDevice(c) => c.is_manipulating(),
        }
    }
}
