//! Bevy driver for the arstage interaction prototypes
//!
//! The render loop owns one [`InteractionSession`] as a resource and calls
//! into it directly: pointer input first, then the per-frame controller tick,
//! then the store is mirrored onto entities.
//!
//! [`InteractionSession`]: arstage_interaction::InteractionSession

use arstage_config::{ManipulationTuning, PrototypeKind, SyncSettings};
use bevy::core_pipeline::tonemapping::Tonemapping;
use bevy::prelude::*;

mod add_object;
mod camera;
mod environment;
mod input;
mod mode;
mod objects;
mod picking;
mod remote;
mod session;

pub use add_object::{AddObjectEvent, AddObjectPlugin, WizardCommandEvent};
pub use camera::{CameraControllerPlugin, HandheldCamera, MainCamera};
pub use environment::{EnvironmentPlugin, HitTestResult, PlanesDetected, SimulatedFloor};
pub use input::{MOUSE_POINTER_ID, PointerInputPlugin};
pub use mode::{ModeCommandEvent, ModePlugin};
pub use objects::{ObjectMirrorPlugin, Placed, PlaceholderShape};
pub use remote::{RemoteSyncPlugin, SyncBridge};
pub use session::{ActiveSession, DevicePose};

/// Frame phases, run in order within `Update`
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum SceneSet {
    /// Refresh the device pose from the camera
    Pose,
    /// Pointer input, hotkeys, edits and inbound feeds
    Input,
    /// Controller frame update
    Tick,
    /// Store to entity mirroring and outbound sync
    Mirror,
}

pub struct ScenePlugin {
    pub prototype: PrototypeKind,
    pub tuning: ManipulationTuning,
    pub sync: SyncSettings,
}

impl ScenePlugin {
    pub fn new(prototype: PrototypeKind) -> Self {
        Self {
            prototype,
            tuning: ManipulationTuning::default(),
            sync: SyncSettings::default(),
        }
    }

    pub fn with_sync(mut self, sync: SyncSettings) -> Self {
        self.sync = sync;
        self
    }
}

impl Plugin for ScenePlugin {
    fn build(&self, app: &mut App) {
        let config = self.prototype.config();
        info!("Prototype {} ({:?})", self.prototype.id(), config);

        app.insert_resource(self.prototype)
            .insert_resource(config)
            .insert_resource(self.tuning)
            .insert_resource(ActiveSession::new(config, self.tuning))
            .init_resource::<DevicePose>()
            .configure_sets(
                Update,
                (SceneSet::Pose, SceneSet::Input, SceneSet::Tick, SceneSet::Mirror).chain(),
            )
            .add_systems(Update, session::update_device_pose.in_set(SceneSet::Pose));

        app.add_plugins(CameraControllerPlugin);
        app.add_plugins(EnvironmentPlugin);
        app.add_plugins(PointerInputPlugin);
        app.add_plugins(ModePlugin);
        app.add_plugins(AddObjectPlugin);
        app.add_plugins(ObjectMirrorPlugin);
        app.add_plugins(RemoteSyncPlugin {
            settings: self.sync.clone(),
        });

        app.add_systems(Startup, setup_scene);
    }
}

/// Camera, light and the visible floor
fn setup_scene(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    floor: Res<SimulatedFloor>,
) {
    // The device starts at head height just behind the origin, facing -Z
    let handheld = HandheldCamera::default();
    commands.spawn((
        Camera3d::default(),
        Transform::from_xyz(0.0, 0.3, 1.0).with_rotation(handheld.rotation()),
        Tonemapping::Reinhard,
        MainCamera,
        handheld,
    ));

    commands.spawn((
        DirectionalLight {
            illuminance: 8_000.0,
            shadows_enabled: true,
            ..default()
        },
        Transform::from_xyz(2.0, 4.0, 3.0).looking_at(Vec3::ZERO, Vec3::Y),
    ));

    let size = floor.half_extent * 2.0;
    commands.spawn((
        Mesh3d(meshes.add(Plane3d::default().mesh().size(size, size))),
        MeshMaterial3d(materials.add(StandardMaterial {
            base_color: Color::srgb(0.3, 0.3, 0.3),
            perceptual_roughness: 0.8,
            ..default()
        })),
        Transform::from_xyz(0.0, floor.height, 0.0),
        Name::new("Floor"),
    ));
}
