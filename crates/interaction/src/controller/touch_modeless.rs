//! Modeless touch: one finger moves, two fingers pinch and twist.
//!
//! The gesture is classified by finger count. Any change in finger count
//! starts a new baseline from the object's current transform so the switch
//! between move and pinch never jumps.

use arstage_config::TwoFingerPolicy;
use glam::Vec2;
use tracing::debug;

use super::{Candidate, ControllerContext, touch_translate};
use crate::gesture::{GesturePhase, GestureSample, InputEvent, PinchTwist};
use crate::math::wrap_angle;
use crate::reference::ReferenceFrame;
use crate::store::ObjectPatch;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PinchLock {
    Scale,
    Rotate,
}

#[derive(Debug, Clone, PartialEq)]
struct PinchTrack {
    start_distance: f32,
    last_angle: f32,
    /// Unwrapped twist since the baseline
    twist: f32,
    lock: Option<PinchLock>,
}

#[derive(Debug, Clone, PartialEq)]
enum Track {
    Single { pointer_id: u64, start: Vec2 },
    Pinch(PinchTrack),
}

#[derive(Debug, Clone, PartialEq)]
struct Baseline {
    frame: ReferenceFrame,
    fingers: usize,
    track: Track,
}

#[derive(Debug, Clone, Default)]
pub struct TouchModeless {
    gesture: Option<GesturePhase<Baseline>>,
}

impl TouchModeless {
    /// Capture a baseline from the event's fingers, or wait for the next move
    fn begin(ctx: &ControllerContext<'_>, event: &InputEvent) -> Option<GesturePhase<Baseline>> {
        let frame = ctx.capture_selected()?;
        let track = match GestureSample::from_event(event, ctx.tuning.degenerate_epsilon) {
            Some(GestureSample::Single {
                pointer_id,
                position,
            }) => Track::Single {
                pointer_id,
                start: position,
            },
            Some(GestureSample::Pinch(PinchTwist { distance, angle })) => Track::Pinch(PinchTrack {
                start_distance: distance,
                last_angle: angle,
                twist: 0.0,
                lock: None,
            }),
            None => return Some(GesturePhase::AwaitingBaseline),
        };
        Some(GesturePhase::Tracking(Baseline {
            frame,
            fingers: event.finger_count(),
            track,
        }))
    }

    pub fn on_select_start(
        &mut self,
        ctx: &mut ControllerContext<'_>,
        event: &InputEvent,
    ) -> Option<Candidate> {
        let InputEvent::PointerDown { hit, .. } = event else {
            return None;
        };

        // A finger landing during a gesture joins it, wherever it lands
        if self.gesture.is_some() && ctx.selection.selected().is_some() {
            debug!("touch modeless: finger added, re-baselining");
            self.gesture = Self::begin(ctx, event);
            return None;
        }

        if !ctx.select_hit(hit.as_deref()) {
            ctx.selection.deselect();
            self.gesture = None;
            return None;
        }
        self.gesture = Self::begin(ctx, event);
        None
    }

    pub fn on_update(
        &mut self,
        ctx: &mut ControllerContext<'_>,
        event: &InputEvent,
    ) -> Option<Candidate> {
        let Some(selected) = ctx.selection.selected() else {
            self.gesture = None;
            return None;
        };

        let needs_baseline = match self.gesture.as_ref()? {
            GesturePhase::AwaitingBaseline => true,
            GesturePhase::Tracking(b) => {
                b.fingers != event.finger_count()
                    || !b.frame.matches(Some(selected), ctx.selection.mode())
            }
        };
        if needs_baseline {
            self.gesture = Self::begin(ctx, event);
            return None;
        }
        if !ctx.store.contains(selected) {
            return None;
        }

        let Some(GesturePhase::Tracking(baseline)) = self.gesture.as_mut() else {
            return None;
        };
        let tuning = ctx.tuning;
        let sample = GestureSample::from_event(event, tuning.degenerate_epsilon)?;
        let frame = &baseline.frame;

        let patch = match (&mut baseline.track, sample) {
            (Track::Single { pointer_id, start }, sample) => {
                let position = sample.single_position(*pointer_id)?;
                ObjectPatch::position(touch_translate(frame, position - *start, tuning)?)
            }
            (Track::Pinch(pinch), GestureSample::Pinch(current)) => {
                pinch.twist += wrap_angle(current.angle - pinch.last_angle);
                pinch.last_angle = current.angle;

                let scale = tuning.clamp_scale(
                    frame.object_scale * (current.distance / pinch.start_distance),
                );
                let rotation = frame.rotation_with_yaw(pinch.twist);

                match tuning.two_finger_policy {
                    TwoFingerPolicy::Simultaneous => ObjectPatch {
                        scale: Some(scale),
                        rotation: Some(rotation),
                        ..Default::default()
                    },
                    TwoFingerPolicy::Dominant {
                        distance_threshold_px,
                        angle_threshold_rad,
                    } => {
                        if pinch.lock.is_none() {
                            if (current.distance - pinch.start_distance).abs()
                                > distance_threshold_px
                            {
                                pinch.lock = Some(PinchLock::Scale);
                            } else if pinch.twist.abs() > angle_threshold_rad {
                                pinch.lock = Some(PinchLock::Rotate);
                            }
                        }
                        match pinch.lock {
                            Some(PinchLock::Scale) => ObjectPatch::scale(scale),
                            Some(PinchLock::Rotate) => ObjectPatch::rotation(rotation),
                            None => return None,
                        }
                    }
                }
            }
            (Track::Pinch(_), GestureSample::Single { .. }) => return None,
        };
        Some(Candidate::new(frame.object_id.clone(), patch))
    }

    pub fn on_end(&mut self, ctx: &mut ControllerContext<'_>, event: &InputEvent) {
        if event.finger_count() == 0 {
            self.gesture = None;
            ctx.selection.deselect();
            return;
        }
        if self.gesture.is_some() {
            debug!("touch modeless: finger lifted, re-baselining");
            self.gesture = Self::begin(ctx, event);
        }
    }

    pub fn cancel(&mut self) {
        self.gesture = None;
    }

    pub fn is_manipulating(&self) -> bool {
        self.gesture.is_some()
    }
}
