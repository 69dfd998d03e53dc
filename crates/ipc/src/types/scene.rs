//! Scene snapshot types mirrored between clients.

use serde::{Deserialize, Serialize};

/// Wire form of a placed scene object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectState {
    pub id: String,
    /// Opaque asset reference resolved by the rendering layer
    pub asset_ref: String,
    pub position: [f32; 3],
    /// Euler angles in radians (XYZ order)
    pub rotation: [f32; 3],
    /// Uniform scale
    pub scale: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

/// Pose of the AR user's device, mirrored to the wizard view.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct UserPose {
    pub position: [f32; 3],
    /// Euler angles in radians (XYZ order)
    pub rotation: [f32; 3],
}

/// The full shared application state.
///
/// Sync is whole-state only: every committed change ships one of these and a
/// receiver replaces its local copy wholesale.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SharedState {
    pub objects: Vec<ObjectState>,
    #[serde(default)]
    pub user_pose: UserPose,
}

impl SharedState {
    /// Find an object by id
    pub fn object(&self, id: &str) -> Option<&ObjectState> {
        self.objects.iter().find(|o| o.id == id)
    }
}

/// Partial update of an object's editable fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ObjectPatchState {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<[f32; 3]>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rotation: Option<[f32; 3]>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scale: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}
