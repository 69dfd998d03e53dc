//! Modeless device-pose manipulation.
//!
//! Move and yaw follow the device every frame with no explicit mode. A frame
//! whose device travel is mostly vertical scales instead. A two-finger pinch
//! scales by distance ratio and suspends device tracking until it ends.

use glam::Vec3;
use tracing::debug;

use super::{Candidate, ControllerContext};
use crate::gesture::{DeviceMotion, GesturePhase, GestureSample, InputEvent};
use crate::math::{apply_local_offset, yaw_delta};
use crate::reference::ReferenceFrame;
use crate::store::ObjectPatch;

#[derive(Debug, Clone, PartialEq)]
struct PinchBaseline {
    object_id: String,
    start_distance: f32,
    scale: f32,
}

#[derive(Debug, Clone, Default)]
pub struct DeviceModeless {
    reference: Option<ReferenceFrame>,
    pinch: Option<GesturePhase<PinchBaseline>>,
}

impl DeviceModeless {
    fn begin_pinch(ctx: &ControllerContext<'_>, event: &InputEvent) -> GesturePhase<PinchBaseline> {
        let baseline = ctx.selection.selected().and_then(|id| {
            let object = ctx.store.get(id)?;
            match GestureSample::from_event(event, ctx.tuning.degenerate_epsilon)? {
                GestureSample::Pinch(p) => Some(PinchBaseline {
                    object_id: id.to_string(),
                    start_distance: p.distance,
                    scale: object.scale,
                }),
                GestureSample::Single { .. } => None,
            }
        });
        baseline.map_or(GesturePhase::AwaitingBaseline, GesturePhase::Tracking)
    }

    fn end_pinch(&mut self) {
        if self.pinch.take().is_some() {
            debug!("device modeless: pinch ended, re-capturing reference");
            self.reference = None;
        }
    }

    pub fn on_select_start(
        &mut self,
        ctx: &mut ControllerContext<'_>,
        event: &InputEvent,
    ) -> Option<Candidate> {
        let InputEvent::PointerDown { hit, touches, .. } = event else {
            return None;
        };

        if touches.len() >= 2 && ctx.selection.selected().is_some() {
            self.pinch = Some(Self::begin_pinch(ctx, event));
            return None;
        }

        if !ctx.select_hit(hit.as_deref()) {
            ctx.selection.deselect();
            self.cancel();
            return None;
        }
        self.pinch = None;
        self.reference = ctx.capture_selected();
        None
    }

    /// Two-finger pinch scale
    pub fn on_update(
        &mut self,
        ctx: &mut ControllerContext<'_>,
        event: &InputEvent,
    ) -> Option<Candidate> {
        if ctx.selection.selected().is_none() {
            self.cancel();
            return None;
        }
        if event.touches().len() < 2 {
            self.end_pinch();
            return None;
        }

        let baseline = match &self.pinch {
            Some(GesturePhase::Tracking(b)) if ctx.selection.is_selected(&b.object_id) => b,
            _ => {
                self.pinch = Some(Self::begin_pinch(ctx, event));
                return None;
            }
        };
        let GestureSample::Pinch(current) =
            GestureSample::from_event(event, ctx.tuning.degenerate_epsilon)?
        else {
            return None;
        };
        let scale = ctx
            .tuning
            .clamp_scale(baseline.scale * (current.distance / baseline.start_distance));
        Some(Candidate::new(baseline.object_id.clone(), ObjectPatch::scale(scale)))
    }

    pub fn on_end(&mut self, _ctx: &mut ControllerContext<'_>, event: &InputEvent) {
        if event.touches().len() < 2 {
            self.end_pinch();
        }
    }

    pub fn on_frame(&mut self, ctx: &mut ControllerContext<'_>) -> Option<Candidate> {
        let Some(selected) = ctx.selection.selected() else {
            self.cancel();
            return None;
        };
        if self.pinch.is_some() {
            return None;
        }

        let frame = match &self.reference {
            Some(frame) if frame.matches(Some(selected), ctx.selection.mode()) => frame,
            _ => {
                self.reference = ctx.capture_selected();
                return None;
            }
        };
        if !ctx.store.contains(selected) {
            return None;
        }

        let camera = ctx.camera;
        let tuning = ctx.tuning;
        let delta: Vec3 = camera.position - frame.camera.position;
        let patch = match DeviceMotion::classify(delta) {
            DeviceMotion::Scale => ObjectPatch::scale(
                tuning.clamp_scale(frame.object_scale * (1.0 + delta.y * tuning.device_scale_factor)),
            ),
            DeviceMotion::TranslateRotate => ObjectPatch {
                position: Some(apply_local_offset(camera, frame.local_offset)),
                rotation: Some(
                    frame.rotation_with_yaw(yaw_delta(frame.camera.rotation, camera.rotation)),
                ),
                ..Default::default()
            },
        };
        Some(Candidate::new(frame.object_id.clone(), patch))
    }

    pub fn cancel(&mut self) {
        self.reference = None;
        self.pinch = None;
    }

    pub fn is_manipulating(&self) -> bool {
        self.reference.is_some() || self.pinch.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::test_support::*;
    use crate::gesture::TouchPoint;
    use crate::math::CameraPose;
    use crate::store::DEFAULT_OBJECT_ID;
    use glam::Vec2;

    fn selected() -> (Rig, DeviceModeless) {
        let mut rig = Rig::new(false);
        let mut controller = DeviceModeless::default();
        controller.on_select_start(&mut rig.ctx(), &down(1, 0.0, 0.0, Some(DEFAULT_OBJECT_ID)));
        controller.on_end(&mut rig.ctx(), &up(1, 0.0, 0.0, vec![]));
        (rig, controller)
    }

    fn frame(rig: &mut Rig, controller: &mut DeviceModeless) {
        let c = controller.on_frame(&mut rig.ctx());
        rig.commit(c);
    }

    fn pinch_event(down: bool, distance: f32) -> InputEvent {
        let touches = vec![TouchPoint::new(1, 0.0, 0.0), TouchPoint::new(2, distance, 0.0)];
        if down {
            InputEvent::PointerDown {
                pointer_id: 2,
                position: Some(Vec2::new(distance, 0.0)),
                hit: None,
                touches,
            }
        } else {
            InputEvent::PointerMove {
                pointer_id: 2,
                position: Vec2::new(distance, 0.0),
                touches,
            }
        }
    }

    #[test]
    fn test_selection_survives_finger_lift() {
        let (rig, controller) = selected();
        assert_eq!(rig.selection.selected(), Some(DEFAULT_OBJECT_ID));
        assert!(controller.is_manipulating());
    }

    #[test]
    fn test_horizontal_motion_moves_and_turns() {
        let (mut rig, mut controller) = selected();
        rig.camera = CameraPose::from_yaw_pitch(Vec3::new(1.0, 0.0, 0.5), 0.3, 0.0);
        frame(&mut rig, &mut controller);
        let object = rig.object(DEFAULT_OBJECT_ID);
        let expected = apply_local_offset(&rig.camera, Vec3::new(0.0, 0.0, -1.0));
        assert!(approx_vec(object.position, expected));
        assert!(approx(object.rotation.y, 0.3));
        assert!(approx(object.scale, 1.0));
    }

    #[test]
    fn test_vertical_motion_scales() {
        let (mut rig, mut controller) = selected();
        let before = rig.object(DEFAULT_OBJECT_ID);
        rig.camera.position = Vec3::new(0.1, 2.0, 0.0);
        frame(&mut rig, &mut controller);
        let object = rig.object(DEFAULT_OBJECT_ID);
        assert!(approx(object.scale, 1.2));
        assert_eq!(object.position, before.position);

        rig.camera.position = Vec3::new(0.0, -50.0, 0.0);
        frame(&mut rig, &mut controller);
        assert!(approx(rig.object(DEFAULT_OBJECT_ID).scale, 0.05));
    }

    #[test]
    fn test_round_trip_returns_to_reference() {
        let (mut rig, mut controller) = selected();
        let start = rig.object(DEFAULT_OBJECT_ID);
        for pose in [
            CameraPose::from_yaw_pitch(Vec3::new(1.0, 0.2, 0.0), 0.8, 0.1),
            CameraPose::from_yaw_pitch(Vec3::new(-2.0, 0.1, 3.0), -0.4, -0.2),
            CameraPose::default(),
        ] {
            rig.camera = pose;
            frame(&mut rig, &mut controller);
        }
        let end = rig.object(DEFAULT_OBJECT_ID);
        assert!(approx_vec(end.position, start.position));
        assert!(approx(end.rotation.y, start.rotation.y));
    }

    #[test]
    fn test_pinch_scales_and_suspends_tracking() {
        let (mut rig, mut controller) = selected();
        controller.on_select_start(&mut rig.ctx(), &pinch_event(true, 100.0));
        let c = controller.on_update(&mut rig.ctx(), &pinch_event(false, 250.0));
        rig.commit(c);
        assert!(approx(rig.object(DEFAULT_OBJECT_ID).scale, 2.5));

        let position = rig.object(DEFAULT_OBJECT_ID).position;
        rig.camera.position = Vec3::new(3.0, 0.0, 0.0);
        assert!(controller.on_frame(&mut rig.ctx()).is_none());
        assert_eq!(rig.object(DEFAULT_OBJECT_ID).position, position);
    }

    #[test]
    fn test_pinch_end_recaptures_without_jump() {
        let (mut rig, mut controller) = selected();
        controller.on_select_start(&mut rig.ctx(), &pinch_event(true, 100.0));
        let c = controller.on_update(&mut rig.ctx(), &pinch_event(false, 150.0));
        rig.commit(c);
        rig.camera.position = Vec3::new(3.0, 0.0, 0.0);
        controller.on_end(&mut rig.ctx(), &up(2, 150.0, 0.0, vec![TouchPoint::new(1, 0.0, 0.0)]));

        let before = rig.object(DEFAULT_OBJECT_ID);
        frame(&mut rig, &mut controller);
        frame(&mut rig, &mut controller);
        let after = rig.object(DEFAULT_OBJECT_ID);
        assert!(approx_vec(after.position, before.position));
        assert!(approx(after.scale, 1.5));
    }

    #[test]
    fn test_empty_tap_deselects() {
        let (mut rig, mut controller) = selected();
        controller.on_select_start(&mut rig.ctx(), &down(3, 40.0, 40.0, None));
        assert_eq!(rig.selection.selected(), None);
        assert!(controller.on_frame(&mut rig.ctx()).is_none());
    }
}
