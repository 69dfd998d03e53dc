//! Session resources shared by the driver systems
//!
//! The interaction core keeps its own glam types; values cross into Bevy
//! through plain arrays so the two never need to agree on a glam version.

use arstage_config::{InteractionConfig, ManipulationTuning};
use arstage_interaction::{CameraPose, InteractionSession, SceneObject};
use arstage_ipc::render_scale_for;
use bevy::prelude::*;

use crate::camera::MainCamera;

/// The interaction session driven by the render loop
#[derive(Resource)]
pub struct ActiveSession(pub InteractionSession);

impl ActiveSession {
    pub fn new(config: InteractionConfig, tuning: ManipulationTuning) -> Self {
        Self(InteractionSession::new(config, tuning))
    }
}

/// Pose of the main camera as the interaction core sees it
#[derive(Resource, Default, Clone, Copy)]
pub struct DevicePose(pub CameraPose);

/// Copy the main camera's world pose into [`DevicePose`]
pub(crate) fn update_device_pose(
    camera_query: Query<&GlobalTransform, With<MainCamera>>,
    mut pose: ResMut<DevicePose>,
) {
    let Ok(transform) = camera_query.single() else {
        return;
    };
    pose.0 = camera_pose_from_transform(transform);
}

pub fn camera_pose_from_transform(transform: &GlobalTransform) -> CameraPose {
    let (_, rotation, translation) = transform.to_scale_rotation_translation();
    CameraPose::new(
        glam::Vec3::from_array(translation.to_array()),
        glam::Quat::from_array(rotation.to_array()),
    )
}

pub fn to_core_vec2(v: Vec2) -> glam::Vec2 {
    glam::Vec2::from_array(v.to_array())
}

pub fn to_core_mat4(m: Mat4) -> glam::Mat4 {
    glam::Mat4::from_cols_array(&m.to_cols_array())
}

pub fn from_core_vec3(v: glam::Vec3) -> Vec3 {
    Vec3::from_array(v.to_array())
}

/// World transform of a scene object, including the asset's render scale
pub fn object_transform(object: &SceneObject) -> Transform {
    let rotation = from_core_vec3(object.rotation);
    let scale = object.scale * render_scale_for(&object.asset_ref);
    Transform {
        translation: from_core_vec3(object.position),
        rotation: Quat::from_euler(EulerRot::XYZ, rotation.x, rotation.y, rotation.z),
        scale: Vec3::splat(scale),
    }
}
