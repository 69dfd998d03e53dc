//! Hit-test placement of freshly added objects.

use std::collections::HashSet;

use glam::{Mat4, Vec3};
use tracing::debug;

use crate::store::SceneObject;

/// Holds the latest hit-test result and which objects have been placed.
///
/// An object still at the origin sentinel that has never been moved takes the
/// hit position once. After that the service ignores it.
#[derive(Debug, Clone, Default)]
pub struct HitTestSnapper {
    last_hit: Option<Vec3>,
    placed: HashSet<String>,
}

impl HitTestSnapper {
    /// Record the most recent hit-test world matrix (`None` when nothing was hit)
    pub fn update_hit_test(&mut self, world: Option<Mat4>) {
        self.last_hit = world.map(|m| m.w_axis.truncate());
    }

    pub fn last_hit(&self) -> Option<Vec3> {
        self.last_hit
    }

    /// Returns whether `id` was newly marked
    pub fn mark_placed(&mut self, id: &str) -> bool {
        let fresh = self.placed.insert(id.to_string());
        if fresh {
            debug!("{} is placed, hit-test placement no longer applies", id);
        }
        fresh
    }

    pub fn is_placed(&self, id: &str) -> bool {
        self.placed.contains(id)
    }

    /// Hit position to place `object` at, if it is still unplaced
    pub fn placement(&self, object: &SceneObject) -> Option<Vec3> {
        if self.is_placed(&object.id) || !object.is_at_origin() {
            return None;
        }
        self.last_hit
    }

    /// Forget placement history for objects no longer in the scene
    pub fn retain(&mut self, keep: impl Fn(&str) -> bool) {
        self.placed.retain(|id| keep(id));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_hit_no_placement() {
        let snapper = HitTestSnapper::default();
        assert_eq!(snapper.placement(&SceneObject::new("a", "cube", Vec3::ZERO)), None);
    }

    #[test]
    fn test_places_origin_objects_once() {
        let mut snapper = HitTestSnapper::default();
        snapper.update_hit_test(Some(Mat4::from_translation(Vec3::new(0.5, -1.2, -2.0))));
        let object = SceneObject::new("a", "cube", Vec3::ZERO);
        assert_eq!(snapper.placement(&object), Some(Vec3::new(0.5, -1.2, -2.0)));
        assert!(snapper.mark_placed("a"));
        assert_eq!(snapper.placement(&object), None);
        assert!(!snapper.mark_placed("a"));
        assert!(snapper.is_placed("a"));
    }

    #[test]
    fn test_positioned_objects_are_left_alone() {
        let mut snapper = HitTestSnapper::default();
        snapper.update_hit_test(Some(Mat4::IDENTITY));
        let object = SceneObject::new("a", "cube", Vec3::new(0.0, 0.0, -1.0));
        assert_eq!(snapper.placement(&object), None);
    }
}
