//! Handheld device camera
//!
//! On desktop the main camera stands in for the AR device, so its pose is
//! what the device-pose controllers track.
//!
//! Controls:
//! - Right mouse drag: Look around
//! - Arrow keys: Walk forward/left/back/right
//! - Page Down/Page Up: Lower/raise the device

use bevy::input::mouse::{MouseButton, MouseMotion};
use bevy::prelude::*;

/// Marker component for the main camera
#[derive(Component)]
pub struct MainCamera;

/// First-person controller state for the simulated device
#[derive(Component)]
pub struct HandheldCamera {
    /// Heading around the Y axis in radians
    pub yaw: f32,
    /// Elevation in radians
    pub pitch: f32,
    /// Look sensitivity (radians per pixel)
    pub look_sensitivity: f32,
    /// Walking speed (units per second)
    pub move_speed: f32,
}

impl Default for HandheldCamera {
    fn default() -> Self {
        Self {
            yaw: 0.0,
            pitch: -0.2,
            look_sensitivity: 0.003,
            move_speed: 1.0,
        }
    }
}

impl HandheldCamera {
    pub fn rotation(&self) -> Quat {
        Quat::from_euler(EulerRot::YXZ, self.yaw, self.pitch, 0.0)
    }

    /// Walk direction on the ground for a local (right, up, back) input
    pub fn walk_direction(&self, input: Vec3) -> Vec3 {
        let heading = Quat::from_rotation_y(self.yaw);
        heading * Vec3::new(input.x, 0.0, input.z) + Vec3::Y * input.y
    }
}

/// Plugin for the handheld camera controls
pub struct CameraControllerPlugin;

impl Plugin for CameraControllerPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            Update,
            (camera_look_system, camera_walk_system, update_camera_transform).chain(),
        );
    }
}

/// Handle look (right mouse drag)
fn camera_look_system(
    mouse_button: Res<ButtonInput<MouseButton>>,
    mut motion_events: MessageReader<MouseMotion>,
    mut camera_query: Query<&mut HandheldCamera>,
) {
    if !mouse_button.pressed(MouseButton::Right) {
        motion_events.clear();
        return;
    }

    let mut delta = Vec2::ZERO;
    for event in motion_events.read() {
        delta += event.delta;
    }

    if delta == Vec2::ZERO {
        return;
    }

    for mut camera in camera_query.iter_mut() {
        camera.yaw -= delta.x * camera.look_sensitivity;
        camera.pitch -= delta.y * camera.look_sensitivity;
        // Just short of straight up/down
        camera.pitch = camera.pitch.clamp(-1.5, 1.5);
    }
}

/// Handle walking (arrow keys, Page Up/Down)
fn camera_walk_system(
    time: Res<Time>,
    key_input: Res<ButtonInput<KeyCode>>,
    mut camera_query: Query<(&HandheldCamera, &mut Transform)>,
) {
    let mut input = Vec3::ZERO;
    if key_input.pressed(KeyCode::ArrowUp) {
        input.z -= 1.0;
    }
    if key_input.pressed(KeyCode::ArrowDown) {
        input.z += 1.0;
    }
    if key_input.pressed(KeyCode::ArrowLeft) {
        input.x -= 1.0;
    }
    if key_input.pressed(KeyCode::ArrowRight) {
        input.x += 1.0;
    }
    if key_input.pressed(KeyCode::PageDown) {
        input.y -= 1.0;
    }
    if key_input.pressed(KeyCode::PageUp) {
        input.y += 1.0;
    }

    if input == Vec3::ZERO {
        return;
    }

    for (camera, mut transform) in camera_query.iter_mut() {
        let step = camera.walk_direction(input.normalize()) * camera.move_speed * time.delta_secs();
        transform.translation += step;
    }
}

/// Update camera rotation from look state
fn update_camera_transform(mut camera_query: Query<(&HandheldCamera, &mut Transform), With<MainCamera>>) {
    for (camera, mut transform) in camera_query.iter_mut() {
        transform.rotation = camera.rotation();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_walk_direction_follows_heading() {
        let camera = HandheldCamera {
            yaw: std::f32::consts::FRAC_PI_2,
            ..default()
        };
        // Facing -X after a quarter turn left, so "forward" walks along -X
        let step = camera.walk_direction(Vec3::new(0.0, 0.0, -1.0));
        assert!((step - Vec3::NEG_X).length() < 1e-5);
    }

    #[test]
    fn test_walk_ignores_pitch() {
        let camera = HandheldCamera {
            pitch: -1.0,
            ..default()
        };
        let step = camera.walk_direction(Vec3::new(0.0, 0.0, -1.0));
        assert!(step.y.abs() < 1e-6);
        assert!((step.length() - 1.0).abs() < 1e-5);
    }
}
