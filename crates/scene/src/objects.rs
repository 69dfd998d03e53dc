//! Store to entity mirroring
//!
//! Every object in the session's store has one [`Placed`] entity. The
//! mirror only runs when the store revision moves, so idle frames are free.

use std::collections::HashMap;

use arstage_interaction::SceneObject;
use arstage_ipc::AssetKind;
use bevy::color::Srgba;
use bevy::prelude::*;

use crate::session::{ActiveSession, object_transform};

const SELECTION_COLOR: Color = Color::srgb(1.0, 0.85, 0.2);

/// Entity standing in for a store object
#[derive(Component)]
pub struct Placed {
    pub id: String,
    pub asset_ref: String,
    pub color: Option<String>,
    /// Bounding-sphere radius of the unscaled mesh, for picking
    pub bounding_radius: f32,
}

/// Simple geometry used until the catalog models are streamed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlaceholderShape {
    Cube,
    Tree,
    Bench,
    Lamp,
}

impl PlaceholderShape {
    pub fn for_asset(asset_ref: &str) -> Self {
        match AssetKind::from_asset_ref(asset_ref) {
            Some(AssetKind::Tree) => PlaceholderShape::Tree,
            Some(AssetKind::Bench) => PlaceholderShape::Bench,
            Some(AssetKind::Lamp) => PlaceholderShape::Lamp,
            None => PlaceholderShape::Cube,
        }
    }

    /// Shapes are sized so that the asset's render scale brings them to real-world size
    fn mesh(&self) -> Mesh {
        match self {
            PlaceholderShape::Cube => Cuboid::new(1.0, 1.0, 1.0).into(),
            PlaceholderShape::Tree => Cone::new(2.0, 8.0).into(),
            PlaceholderShape::Bench => Cuboid::new(1.5, 0.5, 0.5).into(),
            PlaceholderShape::Lamp => Cylinder::new(0.08, 2.5).into(),
        }
    }

    pub fn bounding_radius(&self) -> f32 {
        match self {
            PlaceholderShape::Cube => Vec3::splat(0.5).length(),
            PlaceholderShape::Tree => Vec2::new(2.0, 4.0).length(),
            PlaceholderShape::Bench => Vec3::new(0.75, 0.25, 0.25).length(),
            PlaceholderShape::Lamp => Vec2::new(0.08, 1.25).length(),
        }
    }

    fn default_color(&self) -> Color {
        match self {
            PlaceholderShape::Cube => Color::srgb(0.68, 0.85, 0.9),
            PlaceholderShape::Tree => Color::srgb(0.13, 0.45, 0.2),
            PlaceholderShape::Bench => Color::srgb(0.55, 0.35, 0.2),
            PlaceholderShape::Lamp => Color::srgb(0.3, 0.3, 0.32),
        }
    }
}

/// Parse an object color: `#rrggbb` hex or one of a few CSS names
pub fn parse_color(color: &str) -> Option<Color> {
    let color = color.trim();
    if color.starts_with('#') {
        return Srgba::hex(color).ok().map(Color::from);
    }
    let rgb = match color.to_ascii_lowercase().as_str() {
        "lightblue" => (0.68, 0.85, 0.9),
        "orange" => (1.0, 0.65, 0.0),
        "red" => (1.0, 0.0, 0.0),
        "green" => (0.0, 0.5, 0.0),
        "blue" => (0.0, 0.0, 1.0),
        "white" => (1.0, 1.0, 1.0),
        "gray" | "grey" => (0.5, 0.5, 0.5),
        "black" => (0.0, 0.0, 0.0),
        _ => return None,
    };
    Some(Color::srgb(rgb.0, rgb.1, rgb.2))
}

fn object_color(object: &SceneObject, shape: PlaceholderShape) -> Color {
    object
        .color
        .as_deref()
        .and_then(parse_color)
        .unwrap_or_else(|| shape.default_color())
}

/// Shared placeholder meshes, one per shape
#[derive(Resource)]
struct PlaceholderMeshes(HashMap<PlaceholderShape, Handle<Mesh>>);

impl FromWorld for PlaceholderMeshes {
    fn from_world(world: &mut World) -> Self {
        let mut meshes = world.resource_mut::<Assets<Mesh>>();
        let handles = [
            PlaceholderShape::Cube,
            PlaceholderShape::Tree,
            PlaceholderShape::Bench,
            PlaceholderShape::Lamp,
        ]
        .into_iter()
        .map(|shape| (shape, meshes.add(shape.mesh())))
        .collect();
        Self(handles)
    }
}

/// Store revision last mirrored into the world
#[derive(Resource, Default)]
struct MirroredRevision(Option<u64>);

/// Plugin keeping scene entities in step with the store
pub struct ObjectMirrorPlugin;

impl Plugin for ObjectMirrorPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<MirroredRevision>()
            .init_resource::<PlaceholderMeshes>()
            .add_systems(
                Update,
                (mirror_store, draw_selection.after(mirror_store)).in_set(crate::SceneSet::Mirror),
            );
    }
}

fn mirror_store(
    mut commands: Commands,
    session: Res<ActiveSession>,
    meshes: Res<PlaceholderMeshes>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    mut mirrored: ResMut<MirroredRevision>,
    mut placed_query: Query<(
        Entity,
        &mut Placed,
        &mut Transform,
        &MeshMaterial3d<StandardMaterial>,
    )>,
) {
    let store = session.0.store();
    if mirrored.0 == Some(store.revision()) {
        return;
    }
    mirrored.0 = Some(store.revision());

    let mut present = Vec::new();
    for (entity, mut placed, mut transform, material) in placed_query.iter_mut() {
        let Some(object) = store.get(&placed.id).filter(|o| o.asset_ref == placed.asset_ref) else {
            commands.entity(entity).despawn();
            continue;
        };

        *transform = object_transform(object);
        if placed.color != object.color {
            let shape = PlaceholderShape::for_asset(&object.asset_ref);
            if let Some(material) = materials.get_mut(&material.0) {
                material.base_color = object_color(object, shape);
            }
            placed.color = object.color.clone();
        }
        present.push(placed.id.clone());
    }

    for object in store.list() {
        if present.contains(&object.id) {
            continue;
        }
        let shape = PlaceholderShape::for_asset(&object.asset_ref);
        let Some(mesh) = meshes.0.get(&shape) else {
            continue;
        };
        commands.spawn((
            Mesh3d(mesh.clone()),
            MeshMaterial3d(materials.add(StandardMaterial {
                base_color: object_color(object, shape),
                perceptual_roughness: 0.6,
                ..default()
            })),
            object_transform(object),
            Placed {
                id: object.id.clone(),
                asset_ref: object.asset_ref.clone(),
                color: object.color.clone(),
                bounding_radius: shape.bounding_radius(),
            },
            Name::new(object.id.clone()),
        ));
        info!("Spawned {} ({:?})", object.id, shape);
    }
}

/// Outline the selected object
fn draw_selection(
    session: Res<ActiveSession>,
    placed_query: Query<(&Placed, &GlobalTransform)>,
    mut gizmos: Gizmos,
) {
    let Some(selected) = session.0.selected() else {
        return;
    };
    for (placed, transform) in placed_query.iter() {
        if placed.id != selected {
            continue;
        }
        let (scale, _, translation) = transform.to_scale_rotation_translation();
        let radius = placed.bounding_radius * scale.max_element();
        gizmos.sphere(Isometry3d::from_translation(translation), radius, SELECTION_COLOR);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_placeholder_shape_lookup() {
        assert_eq!(PlaceholderShape::for_asset("cube"), PlaceholderShape::Cube);
        assert_eq!(PlaceholderShape::for_asset(AssetKind::Tree.asset_ref()), PlaceholderShape::Tree);
        assert_eq!(PlaceholderShape::for_asset("https://example.com/unknown.gltf"), PlaceholderShape::Cube);
    }

    #[test]
    fn test_parse_color() {
        assert_eq!(parse_color("lightblue"), Some(Color::srgb(0.68, 0.85, 0.9)));
        assert_eq!(parse_color(" Orange "), Some(Color::srgb(1.0, 0.65, 0.0)));
        assert!(parse_color("#ff0000").is_some());
        assert!(parse_color("#zz0000").is_none());
        assert!(parse_color("chartreuse-ish").is_none());
    }

    #[test]
    fn test_object_color_falls_back_to_shape_default() {
        let object = SceneObject::new("a", "cube", glam::Vec3::ZERO).with_color("not-a-color");
        assert_eq!(
            object_color(&object, PlaceholderShape::Cube),
            PlaceholderShape::Cube.default_color()
        );
    }

    #[test]
    fn test_tree_radius_covers_rendered_height() {
        let render_scale = AssetKind::Tree.render_scale();
        // Half the cone height after render scale must fit in the pick sphere
        assert!(PlaceholderShape::Tree.bounding_radius() * render_scale >= 0.4);
    }
}
