//! Reference frames captured at gesture or selection start.

use arstage_ipc::InteractionMode;
use glam::Vec3;

use crate::math::{CameraPose, camera_local_offset};
use crate::store::SceneObject;

/// Snapshot of camera and object pose at gesture start.
///
/// Every controller derives candidates from one of these plus the current
/// gesture sample, never from the live object, so updates cannot feed back
/// into themselves.
#[derive(Debug, Clone, PartialEq)]
pub struct ReferenceFrame {
    pub object_id: String,
    /// Mode active at capture time
    pub mode: InteractionMode,
    pub camera: CameraPose,
    pub object_position: Vec3,
    pub object_rotation: Vec3,
    pub object_scale: f32,
    /// Object position in the reference camera's local frame
    pub local_offset: Vec3,
}

impl ReferenceFrame {
    /// Capture from the current camera and object in one step
    pub fn capture(camera: &CameraPose, object: &SceneObject, mode: InteractionMode) -> Self {
        Self {
            object_id: object.id.clone(),
            mode,
            camera: *camera,
            object_position: object.position,
            object_rotation: object.rotation,
            object_scale: object.scale,
            local_offset: camera_local_offset(camera, object.position),
        }
    }

    /// Whether this frame still describes the current selection and mode
    pub fn matches(&self, selected: Option<&str>, mode: InteractionMode) -> bool {
        selected == Some(self.object_id.as_str()) && self.mode == mode
    }

    /// Reference rotation with its yaw offset by `delta`
    pub fn rotation_with_yaw(&self, delta: f32) -> Vec3 {
        Vec3::new(
            self.object_rotation.x,
            self.object_rotation.y + delta,
            self.object_rotation.z,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::apply_local_offset;

    #[test]
    fn test_capture_offset_reproduces_position() {
        let camera = CameraPose::from_yaw_pitch(Vec3::new(0.0, 1.6, 0.0), 0.4, -0.2);
        let object = SceneObject::new("a", "cube", Vec3::new(0.5, 0.0, -2.0));
        let frame = ReferenceFrame::capture(&camera, &object, InteractionMode::Translate);
        let back = apply_local_offset(&camera, frame.local_offset);
        assert!((back - object.position).length() < 1e-4);
    }

    #[test]
    fn test_matches_selection_and_mode() {
        let object = SceneObject::new("a", "cube", Vec3::ZERO);
        let frame = ReferenceFrame::capture(&CameraPose::default(), &object, InteractionMode::Rotate);
        assert!(frame.matches(Some("a"), InteractionMode::Rotate));
        assert!(!frame.matches(Some("a"), InteractionMode::Scale));
        assert!(!frame.matches(Some("b"), InteractionMode::Rotate));
        assert!(!frame.matches(None, InteractionMode::Rotate));
    }
}
