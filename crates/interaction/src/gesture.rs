//! Input events and gesture sampling
//!
//! Raw pointer and multi-touch events are reduced to a [`GestureSample`]:
//! a single tracked position, a two-finger pinch/twist measurement, or
//! nothing when the input is degenerate.

use glam::{Vec2, Vec3};

/// One active touch point in screen pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TouchPoint {
    pub id: u64,
    pub position: Vec2,
}

impl TouchPoint {
    pub fn new(id: u64, x: f32, y: f32) -> Self {
        Self {
            id,
            position: Vec2::new(x, y),
        }
    }
}

/// Pointer input delivered to the interaction session.
///
/// `touches` is the document-level list of touch points still active after
/// the event. It is empty for mouse input.
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    PointerDown {
        pointer_id: u64,
        /// `None` when the event carries no screen position (XR select)
        position: Option<Vec2>,
        /// Stable id of the object under the pointer, if any
        hit: Option<String>,
        touches: Vec<TouchPoint>,
    },
    PointerMove {
        pointer_id: u64,
        position: Vec2,
        touches: Vec<TouchPoint>,
    },
    PointerUp {
        pointer_id: u64,
        position: Vec2,
        touches: Vec<TouchPoint>,
    },
}

impl InputEvent {
    pub fn pointer_id(&self) -> u64 {
        match self {
            InputEvent::PointerDown { pointer_id, .. }
            | InputEvent::PointerMove { pointer_id, .. }
            | InputEvent::PointerUp { pointer_id, .. } => *pointer_id,
        }
    }

    pub fn position(&self) -> Option<Vec2> {
        match self {
            InputEvent::PointerDown { position, .. } => *position,
            InputEvent::PointerMove { position, .. } | InputEvent::PointerUp { position, .. } => {
                Some(*position)
            }
        }
    }

    pub fn touches(&self) -> &[TouchPoint] {
        match self {
            InputEvent::PointerDown { touches, .. }
            | InputEvent::PointerMove { touches, .. }
            | InputEvent::PointerUp { touches, .. } => touches,
        }
    }

    /// Number of fingers (or the mouse) driving the gesture after this event
    pub fn finger_count(&self) -> usize {
        let touches = self.touches().len();
        match self {
            InputEvent::PointerUp { .. } => touches,
            _ if touches == 0 => usize::from(self.position().is_some()),
            _ => touches,
        }
    }
}

/// Distance and angle between two touch points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PinchTwist {
    pub distance: f32,
    /// `atan2(dy, dx)` of the segment between the touches
    pub angle: f32,
}

impl PinchTwist {
    /// Measure the pinch between `a` and `b`. Coincident points are degenerate.
    pub fn measure(a: Vec2, b: Vec2, epsilon: f32) -> Option<Self> {
        let d = b - a;
        let distance = d.length();
        if !distance.is_finite() || distance < epsilon {
            return None;
        }
        Some(Self {
            distance,
            angle: d.y.atan2(d.x),
        })
    }
}

/// Parameters extracted from one input event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GestureSample {
    /// One finger or the mouse
    Single { pointer_id: u64, position: Vec2 },
    /// The two lowest-id touches
    Pinch(PinchTwist),
}

impl GestureSample {
    /// Sample an event. Returns `None` for zero fingers or a degenerate pinch.
    pub fn from_event(event: &InputEvent, epsilon: f32) -> Option<Self> {
        let touches = event.touches();
        match touches.len() {
            0 => event.position().map(|position| GestureSample::Single {
                pointer_id: event.pointer_id(),
                position,
            }),
            1 => Some(GestureSample::Single {
                pointer_id: touches[0].id,
                position: touches[0].position,
            }),
            _ => {
                let mut sorted: Vec<&TouchPoint> = touches.iter().collect();
                sorted.sort_by_key(|t| t.id);
                PinchTwist::measure(sorted[0].position, sorted[1].position, epsilon)
                    .map(GestureSample::Pinch)
            }
        }
    }

    /// Position of `pointer_id` if this is a single-pointer sample for it
    pub fn single_position(&self, pointer_id: u64) -> Option<Vec2> {
        match self {
            GestureSample::Single {
                pointer_id: id,
                position,
            } if *id == pointer_id => Some(*position),
            _ => None,
        }
    }
}

/// Explicit two-state gesture lifecycle.
///
/// A gesture that starts without usable input waits for the first move to
/// capture its baseline; that move applies no delta.
#[derive(Debug, Clone, PartialEq)]
pub enum GesturePhase<B> {
    AwaitingBaseline,
    Tracking(B),
}

impl<B> GesturePhase<B> {
    pub fn is_tracking(&self) -> bool {
        matches!(self, GesturePhase::Tracking(_))
    }

    pub fn baseline(&self) -> Option<&B> {
        match self {
            GesturePhase::Tracking(b) => Some(b),
            GesturePhase::AwaitingBaseline => None,
        }
    }
}

/// Dominant-axis classification of a device translation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceMotion {
    /// Mostly vertical travel, read as scale
    Scale,
    /// Mostly horizontal travel, read as move + yaw
    TranslateRotate,
}

impl DeviceMotion {
    /// Vertical wins when `|dy| > hypot(dx, dz)`
    pub fn classify(delta: Vec3) -> Self {
        if delta.y.abs() > delta.x.hypot(delta.z) {
            DeviceMotion::Scale
        } else {
            DeviceMotion::TranslateRotate
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pinch_measure() {
        let p = PinchTwist::measure(Vec2::new(0.0, 0.0), Vec2::new(0.0, 100.0), 1e-4).unwrap();
        assert!((p.distance - 100.0).abs() < 1e-4);
        assert!((p.angle - std::f32::consts::FRAC_PI_2).abs() < 1e-4);
    }

    #[test]
    fn test_coincident_pinch_is_degenerate() {
        assert!(PinchTwist::measure(Vec2::splat(5.0), Vec2::splat(5.0), 1e-4).is_none());
    }

    #[test]
    fn test_sample_uses_lowest_ids() {
        let event = InputEvent::PointerMove {
            pointer_id: 9,
            position: Vec2::ZERO,
            touches: vec![
                TouchPoint::new(9, 500.0, 500.0),
                TouchPoint::new(2, 100.0, 0.0),
                TouchPoint::new(1, 0.0, 0.0),
            ],
        };
        match GestureSample::from_event(&event, 1e-4) {
            Some(GestureSample::Pinch(p)) => assert!((p.distance - 100.0).abs() < 1e-4),
            other => panic!("expected pinch, got {:?}", other),
        }
    }

    #[test]
    fn test_finger_count() {
        let mouse_down = InputEvent::PointerDown {
            pointer_id: 0,
            position: Some(Vec2::ZERO),
            hit: None,
            touches: vec![],
        };
        assert_eq!(mouse_down.finger_count(), 1);

        let xr_select = InputEvent::PointerDown {
            pointer_id: 0,
            position: None,
            hit: None,
            touches: vec![],
        };
        assert_eq!(xr_select.finger_count(), 0);
        assert!(GestureSample::from_event(&xr_select, 1e-4).is_none());

        let mouse_up = InputEvent::PointerUp {
            pointer_id: 0,
            position: Vec2::ZERO,
            touches: vec![],
        };
        assert_eq!(mouse_up.finger_count(), 0);
    }

    #[test]
    fn test_device_motion_classification() {
        assert_eq!(DeviceMotion::classify(Vec3::new(0.3, 0.4, 0.4)), DeviceMotion::TranslateRotate);
        assert_eq!(DeviceMotion::classify(Vec3::new(0.3, 0.6, 0.4)), DeviceMotion::Scale);
    }
}
