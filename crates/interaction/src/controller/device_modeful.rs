//! Modeful device-pose manipulation (HOMER-S style).
//!
//! While an object is selected it is driven by the live camera pose each
//! frame. Move pins the object at its camera-local offset, rotate applies the
//! camera's yaw change, and scale reads either a vertical screen drag or the
//! distance the device travelled.

use arstage_config::DeviceScaleSource;
use arstage_ipc::InteractionMode;
use glam::Vec2;
use tracing::debug;

use super::{Candidate, ControllerContext};
use crate::gesture::{GesturePhase, InputEvent};
use crate::math::{apply_local_offset, yaw_delta};
use crate::reference::ReferenceFrame;
use crate::store::ObjectPatch;

#[derive(Debug, Clone, PartialEq)]
struct ScaleDrag {
    object_id: String,
    pointer_id: u64,
    start: Vec2,
    scale: f32,
}

#[derive(Debug, Clone, Default)]
pub struct DeviceModeful {
    reference: Option<ReferenceFrame>,
    drag: Option<GesturePhase<ScaleDrag>>,
}

impl DeviceModeful {
    fn begin_drag(ctx: &ControllerContext<'_>, pointer_id: u64, start: Vec2) -> Option<ScaleDrag> {
        let id = ctx.selection.selected()?;
        let object = ctx.store.get(id)?;
        Some(ScaleDrag {
            object_id: id.to_string(),
            pointer_id,
            start,
            scale: object.scale,
        })
    }

    fn drags_scale(ctx: &ControllerContext<'_>) -> bool {
        ctx.selection.mode() == InteractionMode::Scale
            && ctx.tuning.device_scale_source == DeviceScaleSource::VerticalDrag
    }

    pub fn on_select_start(
        &mut self,
        ctx: &mut ControllerContext<'_>,
        event: &InputEvent,
    ) -> Option<Candidate> {
        let InputEvent::PointerDown {
            pointer_id,
            position,
            hit,
            ..
        } = event
        else {
            return None;
        };

        if !ctx.select_hit(hit.as_deref()) {
            ctx.selection.deselect();
            self.cancel();
            return None;
        }

        self.reference = ctx.capture_selected();
        self.drag = if Self::drags_scale(ctx) {
            match position {
                Some(start) => Self::begin_drag(ctx, *pointer_id, *start).map(GesturePhase::Tracking),
                None => Some(GesturePhase::AwaitingBaseline),
            }
        } else {
            None
        };
        None
    }

    /// Vertical drag scale; only active in scale mode
    pub fn on_update(
        &mut self,
        ctx: &mut ControllerContext<'_>,
        event: &InputEvent,
    ) -> Option<Candidate> {
        let InputEvent::PointerMove {
            pointer_id,
            position,
            ..
        } = event
        else {
            return None;
        };

        let drag = match self.drag.as_ref()? {
            GesturePhase::AwaitingBaseline => {
                self.drag = Self::begin_drag(ctx, *pointer_id, *position).map(GesturePhase::Tracking);
                return None;
            }
            GesturePhase::Tracking(drag) => drag,
        };
        if drag.pointer_id != *pointer_id {
            return None;
        }
        if !Self::drags_scale(ctx) || !ctx.selection.is_selected(&drag.object_id) {
            self.drag = None;
            return None;
        }

        let dy = position.y - drag.start.y;
        let scale = ctx.tuning.clamp_scale(drag.scale - dy * ctx.tuning.scale_factor);
        Some(Candidate::new(drag.object_id.clone(), ObjectPatch::scale(scale)))
    }

    pub fn on_end(&mut self, _ctx: &mut ControllerContext<'_>, _event: &InputEvent) {
        if self.drag.take().is_some() {
            // Scale changed under the frame; re-capture on the next tick
            self.reference = None;
        }
    }

    pub fn on_frame(&mut self, ctx: &mut ControllerContext<'_>) -> Option<Candidate> {
        let Some(selected) = ctx.selection.selected() else {
            self.cancel();
            return None;
        };
        if self.drag.is_some() {
            return None;
        }
        let mode = ctx.selection.mode();
        if mode == InteractionMode::None {
            self.reference = None;
            return None;
        }

        let frame = match &self.reference {
            Some(frame) if frame.matches(Some(selected), mode) => frame,
            _ => {
                debug!("device modeful: capturing reference for {}", selected);
                self.reference = ctx.capture_selected();
                return None;
            }
        };
        if !ctx.store.contains(selected) {
            return None;
        }

        let camera = ctx.camera;
        let tuning = ctx.tuning;
        let patch = match mode {
            InteractionMode::Translate => {
                ObjectPatch::position(apply_local_offset(camera, frame.local_offset))
            }
            InteractionMode::Rotate => ObjectPatch::rotation(
                frame.rotation_with_yaw(yaw_delta(frame.camera.rotation, camera.rotation)),
            ),
            InteractionMode::Scale => match tuning.device_scale_source {
                DeviceScaleSource::DeviceTranslation => {
                    let travel = (camera.position - frame.camera.position).length();
                    ObjectPatch::scale(tuning.clamp_scale(
                        frame.object_scale * (1.0 + travel * tuning.device_scale_factor),
                    ))
                }
                DeviceScaleSource::VerticalDrag => return None,
            },
            InteractionMode::None => return None,
        };
        Some(Candidate::new(frame.object_id.clone(), patch))
    }

    pub fn cancel(&mut self) {
        self.reference = None;
        self.drag = None;
    }

    pub fn is_manipulating(&self) -> bool {
        self.reference.is_some() || self.drag.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::test_support::*;
    use crate::math::CameraPose;
    use crate::store::DEFAULT_OBJECT_ID;
    use glam::Vec3;

    fn selected(mode: InteractionMode) -> (Rig, DeviceModeful) {
        let mut rig = Rig::new(true);
        rig.selection.set_mode(mode);
        let mut controller = DeviceModeful::default();
        controller.on_select_start(&mut rig.ctx(), &down(1, 0.0, 0.0, Some(DEFAULT_OBJECT_ID)));
        (rig, controller)
    }

    fn frame(rig: &mut Rig, controller: &mut DeviceModeful) {
        let c = controller.on_frame(&mut rig.ctx());
        rig.commit(c);
    }

    #[test]
    fn test_first_frame_does_not_jump() {
        let (mut rig, mut controller) = selected(InteractionMode::Translate);
        let before = rig.object(DEFAULT_OBJECT_ID);
        frame(&mut rig, &mut controller);
        assert!(approx_vec(rig.object(DEFAULT_OBJECT_ID).position, before.position));
    }

    #[test]
    fn test_object_pinned_to_device() {
        let (mut rig, mut controller) = selected(InteractionMode::Translate);
        rig.camera = CameraPose::from_yaw_pitch(Vec3::new(2.0, 0.0, 0.0), 0.0, 0.0);
        frame(&mut rig, &mut controller);
        assert!(approx_vec(rig.object(DEFAULT_OBJECT_ID).position, Vec3::new(2.0, 0.0, -1.0)));
    }

    #[test]
    fn test_rigid_offset_round_trip() {
        let (mut rig, mut controller) = selected(InteractionMode::Translate);
        let start = rig.object(DEFAULT_OBJECT_ID).position;
        let path = [
            CameraPose::from_yaw_pitch(Vec3::new(0.3, 0.1, 0.0), 0.4, 0.0),
            CameraPose::from_yaw_pitch(Vec3::new(-1.0, 0.5, 2.0), -1.2, 0.3),
            CameraPose::from_yaw_pitch(Vec3::new(4.0, -0.2, -3.0), 2.9, -0.6),
            CameraPose::default(),
        ];
        for pose in path {
            rig.camera = pose;
            frame(&mut rig, &mut controller);
        }
        assert!(approx_vec(rig.object(DEFAULT_OBJECT_ID).position, start));
    }

    #[test]
    fn test_rotate_applies_yaw_only() {
        let (mut rig, mut controller) = selected(InteractionMode::Rotate);
        let before = rig.object(DEFAULT_OBJECT_ID);
        rig.camera = CameraPose::from_yaw_pitch(Vec3::new(1.0, 0.0, 0.0), 0.5, 0.3);
        frame(&mut rig, &mut controller);
        let after = rig.object(DEFAULT_OBJECT_ID);
        assert!(approx(after.rotation.y, 0.5));
        assert!(approx(after.rotation.x, 0.0));
        assert_eq!(after.position, before.position);
        assert_eq!(after.scale, before.scale);
    }

    #[test]
    fn test_vertical_drag_scale() {
        let (mut rig, mut controller) = selected(InteractionMode::Scale);
        let c = controller.on_update(&mut rig.ctx(), &moved(1, 0.0, -200.0));
        rig.commit(c);
        assert!(approx(rig.object(DEFAULT_OBJECT_ID).scale, 1.2));

        // Device frames are suppressed while the drag is active
        rig.camera = CameraPose::from_yaw_pitch(Vec3::new(3.0, 0.0, 0.0), 0.0, 0.0);
        assert!(controller.on_frame(&mut rig.ctx()).is_none());

        let c = controller.on_update(&mut rig.ctx(), &moved(1, 0.0, 5000.0));
        rig.commit(c);
        assert!(approx(rig.object(DEFAULT_OBJECT_ID).scale, 0.05));
    }

    #[test]
    fn test_deferred_drag_baseline_skips_first_move() {
        let mut rig = Rig::new(true);
        rig.selection.set_mode(InteractionMode::Scale);
        let mut controller = DeviceModeful::default();
        let select = InputEvent::PointerDown {
            pointer_id: 1,
            position: None,
            hit: Some(DEFAULT_OBJECT_ID.to_string()),
            touches: vec![],
        };
        controller.on_select_start(&mut rig.ctx(), &select);
        assert!(controller.is_manipulating());

        // First move only records where the drag starts
        assert!(controller.on_update(&mut rig.ctx(), &moved(1, 0.0, 300.0)).is_none());
        assert!(approx(rig.object(DEFAULT_OBJECT_ID).scale, 1.0));

        let c = controller.on_update(&mut rig.ctx(), &moved(1, 0.0, 100.0));
        rig.commit(c);
        assert!(approx(rig.object(DEFAULT_OBJECT_ID).scale, 1.2));

        controller.on_end(&mut rig.ctx(), &up(1, 0.0, 100.0, vec![]));
        assert!(controller.on_update(&mut rig.ctx(), &moved(1, 0.0, 0.0)).is_none());
    }

    #[test]
    fn test_device_translation_scale() {
        let mut rig = Rig::new(true);
        rig.tuning.device_scale_source = DeviceScaleSource::DeviceTranslation;
        rig.selection.set_mode(InteractionMode::Scale);
        let mut controller = DeviceModeful::default();
        controller.on_select_start(&mut rig.ctx(), &down(1, 0.0, 0.0, Some(DEFAULT_OBJECT_ID)));
        rig.camera.position = Vec3::new(0.0, 0.0, 5.0);
        frame(&mut rig, &mut controller);
        assert!(approx(rig.object(DEFAULT_OBJECT_ID).scale, 1.5));
    }

    #[test]
    fn test_mode_switch_recaptures() {
        let (mut rig, mut controller) = selected(InteractionMode::Translate);
        rig.camera = CameraPose::from_yaw_pitch(Vec3::new(1.0, 0.0, 0.0), 0.0, 0.0);
        frame(&mut rig, &mut controller);
        let moved_to = rig.object(DEFAULT_OBJECT_ID);

        rig.selection.set_mode(InteractionMode::Rotate);
        frame(&mut rig, &mut controller);
        frame(&mut rig, &mut controller);
        // Camera has not turned since the rotate reference was taken
        assert_eq!(rig.object(DEFAULT_OBJECT_ID), moved_to);
    }

    #[test]
    fn test_empty_tap_deselects_and_stops_tracking() {
        let (mut rig, mut controller) = selected(InteractionMode::Translate);
        controller.on_select_start(&mut rig.ctx(), &down(2, 10.0, 10.0, None));
        assert_eq!(rig.selection.selected(), None);
        assert!(!controller.is_manipulating());

        let before = rig.object(DEFAULT_OBJECT_ID);
        rig.camera.position = Vec3::new(5.0, 0.0, 0.0);
        frame(&mut rig, &mut controller);
        assert_eq!(rig.object(DEFAULT_OBJECT_ID), before);
    }

    #[test]
    fn test_deleted_target_is_noop() {
        let (mut rig, mut controller) = selected(InteractionMode::Translate);
        rig.store.remove(DEFAULT_OBJECT_ID);
        rig.camera.position = Vec3::new(5.0, 0.0, 0.0);
        assert!(controller.on_frame(&mut rig.ctx()).is_none());
    }
}
