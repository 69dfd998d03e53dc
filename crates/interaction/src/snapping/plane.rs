//! Snapping to detected real-world planes.

use glam::{Mat4, Vec3};
use tracing::debug;

/// A real-world plane reported by the AR runtime.
#[derive(Debug, Clone, PartialEq)]
pub struct DetectedPlane {
    pub id: String,
    /// Boundary polygon in plane space
    pub polygon: Vec<Vec3>,
    /// Plane space to world
    pub pose: Mat4,
}

impl DetectedPlane {
    /// Square horizontal plane of half-extent `half` centred at the origin, lifted to `height`
    pub fn horizontal(id: impl Into<String>, height: f32, half: f32) -> Self {
        Self {
            id: id.into(),
            polygon: vec![
                Vec3::new(-half, 0.0, -half),
                Vec3::new(half, 0.0, -half),
                Vec3::new(half, 0.0, half),
                Vec3::new(-half, 0.0, half),
            ],
            pose: Mat4::from_translation(Vec3::new(0.0, height, 0.0)),
        }
    }

    /// Polygon vertices in world space
    pub fn world_polygon(&self) -> impl Iterator<Item = Vec3> + '_ {
        self.polygon.iter().map(|p| self.pose.transform_point3(*p))
    }

    /// Mean of the world-space polygon, or `None` for an empty polygon
    pub fn centroid(&self) -> Option<Vec3> {
        if self.polygon.is_empty() {
            return None;
        }
        let sum: Vec3 = self.world_polygon().sum();
        Some(sum / self.polygon.len() as f32)
    }

    /// Distance from `position` to the nearer of the closest vertex and the centroid
    pub fn distance_to(&self, position: Vec3) -> Option<f32> {
        let centroid = self.centroid()?;
        let nearest_vertex = self
            .world_polygon()
            .map(|p| p.distance(position))
            .fold(f32::INFINITY, f32::min);
        Some(nearest_vertex.min(centroid.distance(position)))
    }
}

/// Snaps candidate heights onto the closest detected plane.
#[derive(Debug, Clone)]
pub struct PlaneSnapper {
    planes: Vec<DetectedPlane>,
    threshold: f32,
}

impl PlaneSnapper {
    pub fn new(threshold: f32) -> Self {
        Self {
            planes: Vec::new(),
            threshold,
        }
    }

    /// Replace the live plane set
    pub fn update_planes(&mut self, planes: Vec<DetectedPlane>) {
        if planes.len() != self.planes.len() {
            debug!("Tracking {} planes", planes.len());
        }
        self.planes = planes;
    }

    pub fn planes(&self) -> &[DetectedPlane] {
        &self.planes
    }

    /// Closest plane strictly within the snap threshold
    pub fn find_closest(&self, position: Vec3) -> Option<&DetectedPlane> {
        self.planes
            .iter()
            .filter_map(|plane| Some((plane, plane.distance_to(position)?)))
            .filter(|(_, distance)| *distance < self.threshold)
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(plane, _)| plane)
    }

    /// Move `position` vertically onto the closest plane, if one is in range
    pub fn snap(&self, position: Vec3) -> Vec3 {
        match self.find_closest(position).and_then(DetectedPlane::centroid) {
            Some(centroid) => Vec3::new(position.x, centroid.y, position.z),
            None => position,
        }
    }
}
