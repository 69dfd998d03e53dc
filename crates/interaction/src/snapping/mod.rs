//! Snapping services
//!
//! Optional post-processing of candidates before they reach the store. Both
//! services only ever transform a candidate; with no planes or no hit-test
//! result they hand it back unchanged.

mod hit_test;
mod plane;

pub use hit_test::HitTestSnapper;
pub use plane::{DetectedPlane, PlaneSnapper};

use arstage_config::{InteractionConfig, ManipulationTuning};

use crate::controller::Candidate;
use crate::store::{ObjectPatch, SceneStore};

/// The snapping stage enabled for one prototype.
#[derive(Debug, Clone)]
pub struct Snapping {
    pub planes: PlaneSnapper,
    pub hit_test: HitTestSnapper,
    use_planes: bool,
    use_hit_test: bool,
}

impl Snapping {
    pub fn new(config: &InteractionConfig, tuning: &ManipulationTuning) -> Self {
        Self {
            planes: PlaneSnapper::new(tuning.plane_snap_threshold),
            hit_test: HitTestSnapper::default(),
            use_planes: config.use_plane_detection,
            use_hit_test: config.use_hit_test_snapping,
        }
    }

    /// Adjust a candidate's position before commit
    pub fn apply(&mut self, candidate: &mut Candidate) {
        let Some(position) = candidate.patch.position else {
            return;
        };
        // An explicit move claims the object; hit-test placement no longer applies
        self.hit_test.mark_placed(&candidate.id);
        if self.use_planes {
            candidate.patch.position = Some(self.planes.snap(position));
        }
    }

    /// Initial placements for objects still at the origin sentinel
    pub fn placements(&mut self, store: &SceneStore) -> Vec<Candidate> {
        if !self.use_hit_test {
            return Vec::new();
        }
        let mut placements = Vec::new();
        for object in store.list() {
            if let Some(position) = self.hit_test.placement(object) {
                self.hit_test.mark_placed(&object.id);
                placements.push(Candidate::new(object.id.clone(), ObjectPatch::position(position)));
            }
        }
        placements
    }
}
