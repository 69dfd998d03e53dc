//! Shared pose math used by every controller.

use glam::{EulerRot, Quat, Vec3};
use std::f32::consts::{PI, TAU};

/// World pose of the viewing camera (the handheld device in AR).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraPose {
    pub position: Vec3,
    pub rotation: Quat,
}

impl Default for CameraPose {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
        }
    }
}

impl CameraPose {
    pub fn new(position: Vec3, rotation: Quat) -> Self {
        Self { position, rotation }
    }

    /// Camera looking down -Z from `position` after applying yaw then pitch
    pub fn from_yaw_pitch(position: Vec3, yaw: f32, pitch: f32) -> Self {
        Self {
            position,
            rotation: Quat::from_euler(EulerRot::YXZ, yaw, pitch, 0.0),
        }
    }

    /// Rotation as XYZ Euler angles, the convention scene objects use
    pub fn euler_xyz(&self) -> Vec3 {
        let (x, y, z) = self.rotation.to_euler(EulerRot::XYZ);
        Vec3::new(x, y, z)
    }

    pub fn forward(&self) -> Vec3 {
        self.rotation * Vec3::NEG_Z
    }
}

/// Express a world point in the camera's local frame.
///
/// `inverse(camera.rotation) * (point - camera.position)`
pub fn camera_local_offset(camera: &CameraPose, point: Vec3) -> Vec3 {
    camera.rotation.inverse() * (point - camera.position)
}

/// Re-apply a camera-local offset to a (possibly moved) camera.
pub fn apply_local_offset(camera: &CameraPose, offset: Vec3) -> Vec3 {
    camera.position + camera.rotation * offset
}

/// Horizontal movement axes derived from a camera orientation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GroundAxes {
    /// Camera forward with pitch removed
    pub forward: Vec3,
    /// `forward x world-up`
    pub right: Vec3,
}

/// Yaw-only flattening of the camera forward axis.
///
/// Zeroes the vertical component of the camera forward vector and
/// renormalizes, then crosses with world up for the right axis. When the
/// camera looks straight up or down the camera's up vector is flattened
/// instead. Returns `None` when both are degenerate.
pub fn yaw_flattened_axes(rotation: Quat, epsilon: f32) -> Option<GroundAxes> {
    let flatten = |v: Vec3| {
        let flat = Vec3::new(v.x, 0.0, v.z);
        (flat.length() > epsilon).then(|| flat.normalize())
    };

    let forward = flatten(rotation * Vec3::NEG_Z).or_else(|| flatten(rotation * Vec3::Y))?;
    let right = forward.cross(Vec3::Y);
    Some(GroundAxes { forward, right })
}

/// Yaw component of the orientation change from `reference` to `current`.
///
/// The delta quaternion `inverse(reference) * current` is decomposed in
/// YXZ order and only the Y angle is kept.
pub fn yaw_delta(reference: Quat, current: Quat) -> f32 {
    let delta = reference.inverse() * current;
    delta.to_euler(EulerRot::YXZ).0
}

/// Wrap an angle into (-PI, PI].
pub fn wrap_angle(angle: f32) -> f32 {
    if !angle.is_finite() {
        return 0.0;
    }
    let mut wrapped = angle.rem_euclid(TAU);
    if wrapped > PI {
        wrapped -= TAU;
    }
    wrapped
}
