//! Plane detection and hit-test feeds
//!
//! An AR runtime would publish [`PlanesDetected`] and [`HitTestResult`]
//! messages. On desktop a simulated floor stands in: it is announced once at
//! startup and the view ray through the screen centre is hit-tested against it
//! every frame.

use arstage_interaction::DetectedPlane;
use bevy::ecs::message::Message;
use bevy::prelude::*;

use crate::camera::MainCamera;
use crate::picking::ray_floor_intersection;
use crate::session::{ActiveSession, from_core_vec3, to_core_mat4};

const PLANE_COLOR: Color = Color::srgb(0.2, 0.8, 0.9);
const RETICLE_COLOR: Color = Color::srgb(1.0, 1.0, 1.0);

/// Detected planes replace the previous set
#[derive(Message)]
pub struct PlanesDetected(pub Vec<DetectedPlane>);

/// Latest hit-test pose (`None` when nothing is under the reticle)
#[derive(Message)]
pub struct HitTestResult(pub Option<Mat4>);

/// Floor plane simulated on platforms without plane detection
#[derive(Resource, Clone, Copy)]
pub struct SimulatedFloor {
    pub height: f32,
    pub half_extent: f32,
}

impl Default for SimulatedFloor {
    fn default() -> Self {
        Self {
            height: -0.5,
            half_extent: 5.0,
        }
    }
}

/// Last simulated hit point, for drawing the reticle
#[derive(Resource, Default)]
struct Reticle(Option<Vec3>);

/// Plugin feeding planes and hit tests to the session
pub struct EnvironmentPlugin;

impl Plugin for EnvironmentPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<SimulatedFloor>()
            .init_resource::<Reticle>()
            .add_message::<PlanesDetected>()
            .add_message::<HitTestResult>()
            .add_systems(Startup, announce_simulated_floor)
            .add_systems(
                Update,
                (
                    simulate_hit_test.before(apply_environment_updates),
                    apply_environment_updates,
                )
                    .in_set(crate::SceneSet::Input),
            )
            .add_systems(Update, draw_environment.in_set(crate::SceneSet::Mirror));
    }
}

fn announce_simulated_floor(floor: Res<SimulatedFloor>, mut writer: MessageWriter<PlanesDetected>) {
    writer.write(PlanesDetected(vec![DetectedPlane::horizontal(
        "floor",
        floor.height,
        floor.half_extent,
    )]));
}

fn simulate_hit_test(
    camera_query: Query<&GlobalTransform, With<MainCamera>>,
    floor: Res<SimulatedFloor>,
    mut reticle: ResMut<Reticle>,
    mut writer: MessageWriter<HitTestResult>,
) {
    let Ok(camera_transform) = camera_query.single() else {
        return;
    };
    let hit = ray_floor_intersection(
        camera_transform.translation(),
        camera_transform.forward().into(),
        floor.height,
    )
    .filter(|p| p.x.abs() <= floor.half_extent && p.z.abs() <= floor.half_extent);

    reticle.0 = hit;
    writer.write(HitTestResult(hit.map(Mat4::from_translation)));
}

fn apply_environment_updates(
    mut planes: MessageReader<PlanesDetected>,
    mut hits: MessageReader<HitTestResult>,
    mut session: ResMut<ActiveSession>,
) {
    if let Some(latest) = planes.read().last() {
        info!("Tracking {} detected plane(s)", latest.0.len());
        session.0.update_planes(latest.0.clone());
    }
    if let Some(latest) = hits.read().last() {
        session.0.update_hit_test(latest.0.map(to_core_mat4));
    }
}

fn draw_environment(session: Res<ActiveSession>, reticle: Res<Reticle>, mut gizmos: Gizmos) {
    for plane in session.0.planes() {
        let mut outline: Vec<Vec3> = plane.world_polygon().map(from_core_vec3).collect();
        if let Some(first) = outline.first().copied() {
            outline.push(first);
        }
        gizmos.linestrip(outline, PLANE_COLOR);
    }

    if let Some(point) = reticle.0 {
        let isometry = Isometry3d::new(point, Quat::from_rotation_x(-std::f32::consts::FRAC_PI_2));
        gizmos.circle(isometry, 0.1, RETICLE_COLOR);
    }
}
