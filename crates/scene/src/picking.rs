//! Ray tests for object picking and the simulated hit test.
//!
//! Placed objects are picked against bounding spheres; the desktop stand-in
//! for the AR hit test intersects the view ray with a horizontal floor.

use bevy::prelude::*;

/// Epsilon for floating point comparisons
const EPSILON: f32 = 1e-6;

/// Ray-sphere intersection test.
///
/// Returns the distance along the ray to the closest intersection in front
/// of the origin, or `None` if the ray misses.
pub fn ray_sphere_intersection(
    ray_origin: Vec3,
    ray_dir: Vec3,
    sphere_center: Vec3,
    sphere_radius: f32,
) -> Option<f32> {
    let oc = ray_origin - sphere_center;
    let a = ray_dir.dot(ray_dir);
    if a < EPSILON {
        return None;
    }
    let b = 2.0 * oc.dot(ray_dir);
    let c = oc.dot(oc) - sphere_radius * sphere_radius;
    let discriminant = b * b - 4.0 * a * c;

    if discriminant < 0.0 {
        return None;
    }

    let sqrt_d = discriminant.sqrt();
    let t1 = (-b - sqrt_d) / (2.0 * a);
    let t2 = (-b + sqrt_d) / (2.0 * a);

    if t1 > EPSILON {
        Some(t1)
    } else if t2 > EPSILON {
        Some(t2)
    } else {
        None
    }
}

/// Point where the ray crosses the horizontal plane `y = height`, if it does so in front of the origin
pub fn ray_floor_intersection(ray_origin: Vec3, ray_dir: Vec3, height: f32) -> Option<Vec3> {
    if ray_dir.y.abs() < EPSILON {
        return None;
    }
    let t = (height - ray_origin.y) / ray_dir.y;
    (t > EPSILON).then(|| ray_origin + ray_dir * t)
}

/// Pick target: object id, bounding-sphere centre and radius.
pub struct PickTarget<'a> {
    pub id: &'a str,
    pub center: Vec3,
    pub radius: f32,
}

/// Id of the closest target the ray passes through
pub fn pick_nearest<'a>(
    ray_origin: Vec3,
    ray_dir: Vec3,
    targets: impl IntoIterator<Item = PickTarget<'a>>,
) -> Option<&'a str> {
    targets
        .into_iter()
        .filter_map(|target| {
            ray_sphere_intersection(ray_origin, ray_dir, target.center, target.radius)
                .map(|t| (t, target.id))
        })
        .min_by(|a, b| a.0.total_cmp(&b.0))
        .map(|(_, id)| id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ray_sphere_hit_and_miss() {
        let hit = ray_sphere_intersection(Vec3::ZERO, Vec3::NEG_Z, Vec3::new(0.0, 0.0, -5.0), 1.0);
        assert!((hit.unwrap() - 4.0).abs() < 1e-5);

        let miss = ray_sphere_intersection(Vec3::ZERO, Vec3::NEG_Z, Vec3::new(3.0, 0.0, -5.0), 1.0);
        assert!(miss.is_none());
    }

    #[test]
    fn test_ray_sphere_behind_origin() {
        let hit = ray_sphere_intersection(Vec3::ZERO, Vec3::NEG_Z, Vec3::new(0.0, 0.0, 5.0), 1.0);
        assert!(hit.is_none());
    }

    #[test]
    fn test_ray_from_inside_sphere_hits_far_side() {
        let hit = ray_sphere_intersection(Vec3::ZERO, Vec3::X, Vec3::ZERO, 2.0);
        assert!((hit.unwrap() - 2.0).abs() < 1e-5);
    }

    #[test]
    fn test_pick_nearest_prefers_closest() {
        let targets = vec![
            PickTarget { id: "far", center: Vec3::new(0.0, 0.0, -10.0), radius: 1.0 },
            PickTarget { id: "near", center: Vec3::new(0.0, 0.0, -3.0), radius: 1.0 },
            PickTarget { id: "aside", center: Vec3::new(5.0, 0.0, -3.0), radius: 1.0 },
        ];
        assert_eq!(pick_nearest(Vec3::ZERO, Vec3::NEG_Z, targets), Some("near"));
    }

    #[test]
    fn test_pick_nearest_empty() {
        assert_eq!(pick_nearest(Vec3::ZERO, Vec3::NEG_Z, Vec::new()), None);
    }

    #[test]
    fn test_ray_floor_intersection() {
        let dir = Vec3::new(0.0, -1.0, -1.0).normalize();
        let point = ray_floor_intersection(Vec3::ZERO, dir, -1.0).unwrap();
        assert!((point - Vec3::new(0.0, -1.0, -1.0)).length() < 1e-5);

        // Looking up never reaches a floor below
        assert!(ray_floor_intersection(Vec3::ZERO, Vec3::Y, -1.0).is_none());
        // Parallel to the floor
        assert!(ray_floor_intersection(Vec3::ZERO, Vec3::NEG_Z, -1.0).is_none());
    }
}
