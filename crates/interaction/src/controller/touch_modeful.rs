//! Modeful touch: single-finger drags interpreted by the toolbar mode.

use arstage_ipc::InteractionMode;
use glam::Vec2;
use tracing::debug;

use super::{Candidate, ControllerContext, touch_translate};
use crate::gesture::{GesturePhase, InputEvent};
use crate::reference::ReferenceFrame;
use crate::store::ObjectPatch;

#[derive(Debug, Clone, PartialEq)]
struct DragBaseline {
    frame: ReferenceFrame,
    pointer_id: u64,
    start: Vec2,
}

/// Selection persists until a tap on empty space. Each drag is measured
/// from its start point, so the object follows the finger without drift.
#[derive(Debug, Clone, Default)]
pub struct TouchModeful {
    gesture: Option<GesturePhase<DragBaseline>>,
}

impl TouchModeful {
    fn baseline(ctx: &ControllerContext<'_>, pointer_id: u64, start: Vec2) -> Option<DragBaseline> {
        Some(DragBaseline {
            frame: ctx.capture_selected()?,
            pointer_id,
            start,
        })
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
            touches,
        } = event
        else {
            return None;
        };

        // Extra fingers during a drag are ignored
        if self.gesture.is_some() && touches.len() > 1 {
            return None;
        }

        if !ctx.select_hit(hit.as_deref()) {
            ctx.selection.deselect();
            self.gesture = None;
            return None;
        }

        self.gesture = match position {
            Some(start) => Self::baseline(ctx, *pointer_id, *start).map(GesturePhase::Tracking),
            None => Some(GesturePhase::AwaitingBaseline),
        };
        None
    }

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

        let Some(selected) = ctx.selection.selected() else {
            self.gesture = None;
            return None;
        };
        let mode = ctx.selection.mode();

        let baseline = match self.gesture.as_ref()? {
            GesturePhase::Tracking(b) if b.pointer_id == *pointer_id => b,
            GesturePhase::Tracking(_) => return None,
            GesturePhase::AwaitingBaseline => {
                self.gesture = Self::baseline(ctx, *pointer_id, *position).map(GesturePhase::Tracking);
                return None;
            }
        };

        if !baseline.frame.matches(Some(selected), mode) {
            debug!("touch modeful: mode or selection changed, re-capturing");
            self.gesture = Self::baseline(ctx, *pointer_id, *position).map(GesturePhase::Tracking);
            return None;
        }
        if !ctx.store.contains(selected) {
            return None;
        }

        let frame = &baseline.frame;
        let delta = *position - baseline.start;
        let tuning = ctx.tuning;
        let patch = match mode {
            InteractionMode::Translate => ObjectPatch::position(touch_translate(frame, delta, tuning)?),
            InteractionMode::Rotate => {
                ObjectPatch::rotation(frame.rotation_with_yaw(-delta.x * tuning.rotate_factor))
            }
            InteractionMode::Scale => ObjectPatch::scale(
                tuning.clamp_scale(frame.object_scale - delta.y * tuning.scale_factor),
            ),
            InteractionMode::None => return None,
        };
        Some(Candidate::new(frame.object_id.clone(), patch))
    }

    pub fn on_end(&mut self, _ctx: &mut ControllerContext<'_>, event: &InputEvent) {
        let ends_gesture = match &self.gesture {
            Some(GesturePhase::Tracking(b)) => b.pointer_id == event.pointer_id(),
            Some(GesturePhase::AwaitingBaseline) => true,
            None => false,
        };
        if ends_gesture {
            self.gesture = None;
        }
    }

    pub fn cancel(&mut self) {
        self.gesture = None;
    }

    pub fn is_manipulating(&self) -> bool {
        self.gesture.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::test_support::*;
    use crate::store::DEFAULT_OBJECT_ID;
    use glam::Vec3;

    fn rig(mode: InteractionMode) -> (Rig, TouchModeful) {
        let mut rig = Rig::new(true);
        let mut controller = TouchModeful::default();
        controller.on_select_start(&mut rig.ctx(), &down(1, 100.0, 100.0, Some(DEFAULT_OBJECT_ID)));
        rig.selection.set_mode(mode);
        (rig, controller)
    }

    #[test]
    fn test_move_along_camera_right() {
        let (mut rig, mut controller) = rig(InteractionMode::Translate);
        // The mode was set after pointer down, so the first move re-captures
        assert!(controller.on_update(&mut rig.ctx(), &moved(1, 110.0, 100.0)).is_none());
        let c = controller.on_update(&mut rig.ctx(), &moved(1, 120.0, 100.0));
        rig.commit(c);
        assert!(approx_vec(rig.object(DEFAULT_OBJECT_ID).position, Vec3::new(0.1, 0.0, -1.0)));
    }

    #[test]
    fn test_move_scenario_from_fresh_drag() {
        let mut rig = Rig::new(true);
        rig.selection.set_mode(InteractionMode::Translate);
        let mut controller = TouchModeful::default();
        controller.on_select_start(&mut rig.ctx(), &down(1, 0.0, 0.0, Some(DEFAULT_OBJECT_ID)));
        let c = controller.on_update(&mut rig.ctx(), &moved(1, 10.0, 0.0));
        rig.commit(c);
        let object = rig.object(DEFAULT_OBJECT_ID);
        assert!(approx(object.position.x, 0.1));
        assert!(approx(object.position.y, 0.0));
        assert!(approx(object.position.z, -1.0));
    }

    #[test]
    fn test_zero_delta_does_not_jump() {
        let mut rig = Rig::new(true);
        rig.selection.set_mode(InteractionMode::Translate);
        let before = rig.object(DEFAULT_OBJECT_ID);
        let mut controller = TouchModeful::default();
        controller.on_select_start(&mut rig.ctx(), &down(1, 50.0, 50.0, Some(DEFAULT_OBJECT_ID)));
        let c = controller.on_update(&mut rig.ctx(), &moved(1, 50.0, 50.0));
        rig.commit(c);
        assert_eq!(rig.object(DEFAULT_OBJECT_ID), before);
    }

    #[test]
    fn test_rotate_mode_isolated() {
        let mut rig = Rig::new(true);
        rig.selection.set_mode(InteractionMode::Rotate);
        let before = rig.object(DEFAULT_OBJECT_ID);
        let mut controller = TouchModeful::default();
        controller.on_select_start(&mut rig.ctx(), &down(1, 0.0, 0.0, Some(DEFAULT_OBJECT_ID)));
        let c = controller.on_update(&mut rig.ctx(), &moved(1, 40.0, -80.0));
        rig.commit(c);

        let after = rig.object(DEFAULT_OBJECT_ID);
        assert_eq!(after.position, before.position);
        assert_eq!(after.scale, before.scale);
        assert!(approx(after.rotation.y, -0.4));
    }

    #[test]
    fn test_scale_mode_isolated_and_floored() {
        let mut rig = Rig::new(true);
        rig.selection.set_mode(InteractionMode::Scale);
        let before = rig.object(DEFAULT_OBJECT_ID);
        let mut controller = TouchModeful::default();
        controller.on_select_start(&mut rig.ctx(), &down(1, 0.0, 0.0, Some(DEFAULT_OBJECT_ID)));

        let c = controller.on_update(&mut rig.ctx(), &moved(1, 30.0, -500.0));
        rig.commit(c);
        let after = rig.object(DEFAULT_OBJECT_ID);
        assert!(approx(after.scale, 1.5));
        assert_eq!(after.position, before.position);
        assert_eq!(after.rotation, before.rotation);

        let c = controller.on_update(&mut rig.ctx(), &moved(1, 30.0, 100_000.0));
        rig.commit(c);
        assert!(approx(rig.object(DEFAULT_OBJECT_ID).scale, 0.05));
    }

    #[test]
    fn test_mode_change_mid_drag_recaptures() {
        let mut rig = Rig::new(true);
        rig.selection.set_mode(InteractionMode::Translate);
        let mut controller = TouchModeful::default();
        controller.on_select_start(&mut rig.ctx(), &down(1, 0.0, 0.0, Some(DEFAULT_OBJECT_ID)));
        let c = controller.on_update(&mut rig.ctx(), &moved(1, 50.0, 0.0));
        rig.commit(c);
        let moved_to = rig.object(DEFAULT_OBJECT_ID);

        rig.selection.set_mode(InteractionMode::Scale);
        assert!(controller.on_update(&mut rig.ctx(), &moved(1, 60.0, 0.0)).is_none());
        let c = controller.on_update(&mut rig.ctx(), &moved(1, 90.0, 0.0));
        rig.commit(c);
        // Horizontal travel in scale mode changes nothing
        assert_eq!(rig.object(DEFAULT_OBJECT_ID), moved_to);
    }

    #[test]
    fn test_selection_persists_until_empty_tap() {
        let (mut rig, mut controller) = rig(InteractionMode::Translate);
        controller.on_end(&mut rig.ctx(), &up(1, 100.0, 100.0, vec![]));
        assert_eq!(rig.selection.selected(), Some(DEFAULT_OBJECT_ID));
        assert!(!controller.is_manipulating());

        controller.on_select_start(&mut rig.ctx(), &down(2, 5.0, 5.0, None));
        assert_eq!(rig.selection.selected(), None);
    }

    #[test]
    fn test_stray_update_after_deselect_is_noop() {
        let (mut rig, mut controller) = rig(InteractionMode::Translate);
        rig.selection.deselect();
        assert!(controller.on_update(&mut rig.ctx(), &moved(1, 300.0, 300.0)).is_none());
        assert!(!controller.is_manipulating());
    }

    #[test]
    fn test_deferred_baseline_skips_first_move() {
        let mut rig = Rig::new(true);
        rig.selection.set_mode(InteractionMode::Translate);
        let mut controller = TouchModeful::default();
        let select = InputEvent::PointerDown {
            pointer_id: 1,
            position: None,
            hit: Some(DEFAULT_OBJECT_ID.to_string()),
            touches: vec![],
        };
        controller.on_select_start(&mut rig.ctx(), &select);
        assert!(controller.on_update(&mut rig.ctx(), &moved(1, 200.0, 0.0)).is_none());
        let c = controller.on_update(&mut rig.ctx(), &moved(1, 210.0, 0.0));
        rig.commit(c);
        assert!(approx(rig.object(DEFAULT_OBJECT_ID).position.x, 0.1));
    }
}
