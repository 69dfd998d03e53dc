//! Interaction session
//!
//! The single object a render loop drives. It owns the store, selection,
//! active controller, snapping services and remote mirror, and runs the
//! pipeline: input -> controller -> candidate -> snapping -> store -> mirror.

use arstage_config::{InteractionConfig, ManipulationTuning};
use arstage_ipc::{InteractionMode, SharedState, UserPose, WizardCommand};
use glam::{Mat4, Vec3};
use tracing::{debug, info};

use crate::controller::{Candidate, Controller, ControllerContext};
use crate::gesture::InputEvent;
use crate::math::CameraPose;
use crate::mirror::RemoteMirror;
use crate::selection::SelectionState;
use crate::snapping::{DetectedPlane, Snapping};
use crate::store::{ObjectPatch, SceneStore};

#[derive(Debug, Clone)]
pub struct InteractionSession {
    config: InteractionConfig,
    tuning: ManipulationTuning,
    store: SceneStore,
    selection: SelectionState,
    controller: Controller,
    snapping: Snapping,
    mirror: RemoteMirror,
}

impl InteractionSession {
    /// Session over the default single-cube scene
    pub fn new(config: InteractionConfig, tuning: ManipulationTuning) -> Self {
        Self::with_store(config, tuning, SceneStore::with_default_object())
    }

    pub fn with_store(config: InteractionConfig, tuning: ManipulationTuning, store: SceneStore) -> Self {
        let controller = Controller::for_config(&config);
        info!("Interaction session using {} controller", controller.name());
        Self {
            selection: SelectionState::new(config.modeful),
            snapping: Snapping::new(&config, &tuning),
            controller,
            config,
            tuning,
            store,
            mirror: RemoteMirror::new(),
        }
    }

    /// Route one input event through the controller. Returns whether the store changed.
    pub fn handle_input(&mut self, camera: &CameraPose, event: &InputEvent) -> bool {
        let mut ctx = ControllerContext {
            camera,
            store: &self.store,
            selection: &mut self.selection,
            tuning: &self.tuning,
        };
        let candidate = match event {
            InputEvent::PointerDown { .. } => self.controller.on_select_start(&mut ctx, event),
            InputEvent::PointerMove { .. } => self.controller.on_update(&mut ctx, event),
            InputEvent::PointerUp { .. } => {
                self.controller.on_end(&mut ctx, event);
                None
            }
        };
        let committed = candidate.is_some_and(|c| self.commit(c));
        self.refresh_latch();
        committed
    }

    /// Per-frame update: device-pose tracking and hit-test placement.
    pub fn tick(&mut self, camera: &CameraPose, dt: f32) -> bool {
        let mut ctx = ControllerContext {
            camera,
            store: &self.store,
            selection: &mut self.selection,
            tuning: &self.tuning,
        };
        let candidate = self.controller.on_frame(&mut ctx, dt);
        let mut committed = candidate.is_some_and(|c| self.commit(c));

        for placement in self.snapping.placements(&self.store) {
            debug!("Placing {} at hit-test result", placement.id);
            committed |= self.store.update(&placement.id, &placement.patch);
        }
        if committed {
            self.mirror.mark_dirty(&self.store);
        }
        self.refresh_latch();
        committed
    }

    fn commit(&mut self, mut candidate: Candidate) -> bool {
        self.snapping.apply(&mut candidate);
        if !self.store.update(&candidate.id, &candidate.patch) {
            return false;
        }
        self.mirror.mark_dirty(&self.store);
        true
    }

    fn refresh_latch(&mut self) {
        self.mirror
            .set_updates_disabled(self.controller.is_manipulating());
    }

    /// Toolbar mode switch. Ignored by modeless prototypes.
    pub fn set_mode(&mut self, mode: InteractionMode) -> bool {
        self.selection.set_mode(mode)
    }

    pub fn mode(&self) -> InteractionMode {
        self.selection.mode()
    }

    pub fn selected(&self) -> Option<&str> {
        self.selection.selected()
    }

    /// Explicit deselect from the toolbar
    pub fn deselect(&mut self) {
        self.selection.deselect();
        self.controller.cancel();
        self.refresh_latch();
    }

    /// Add an object with a generated id
    pub fn add_object(&mut self, asset_ref: &str, position: Option<Vec3>) -> String {
        let id = self.store.create(asset_ref, position);
        self.mirror.mark_dirty(&self.store);
        id
    }

    /// Delete an object, dropping the selection if it pointed there
    pub fn remove_object(&mut self, id: &str) -> bool {
        if self.selection.is_selected(id) {
            self.deselect();
        }
        if self.store.remove(id).is_none() {
            return false;
        }
        let store = &self.store;
        self.snapping.hit_test.retain(|id| store.contains(id));
        self.mirror.mark_dirty(&self.store);
        true
    }

    /// Apply a wizard edit. Returns whether the store changed.
    pub fn apply_wizard_command(&mut self, command: WizardCommand) -> bool {
        match command {
            WizardCommand::AddObject {
                asset_ref,
                position,
            } => {
                self.add_object(&asset_ref, position.map(Vec3::from_array));
                true
            }
            WizardCommand::DeleteObject { id } => self.remove_object(&id),
            WizardCommand::UpdateObject { id, patch } => {
                let patch = ObjectPatch::from(patch);
                if patch.position.is_some() {
                    self.snapping.hit_test.mark_placed(&id);
                }
                if !self.store.update(&id, &patch) {
                    return false;
                }
                self.mirror.mark_dirty(&self.store);
                true
            }
        }
    }

    pub fn update_planes(&mut self, planes: Vec<DetectedPlane>) {
        self.snapping.planes.update_planes(planes);
    }

    /// Planes currently offered for snapping
    pub fn planes(&self) -> &[DetectedPlane] {
        self.snapping.planes.planes()
    }

    pub fn update_hit_test(&mut self, world: Option<Mat4>) {
        self.snapping.hit_test.update_hit_test(world);
    }

    /// Apply an inbound full-state snapshot (last writer wins)
    pub fn apply_remote_state(&mut self, state: SharedState) -> bool {
        if !self.mirror.accept_inbound(state, &mut self.store) {
            return false;
        }
        let vanished = self
            .selection
            .selected()
            .is_some_and(|id| !self.store.contains(id));
        if vanished {
            debug!("Selected object vanished in remote snapshot");
            self.deselect();
        }
        true
    }

    /// Record the local device pose for the next broadcast
    pub fn publish_user_pose(&mut self, camera: &CameraPose) {
        let pose = UserPose {
            position: camera.position.to_array(),
            rotation: camera.euler_xyz().to_array(),
        };
        self.mirror.publish_user_pose(pose, &self.store);
    }

    /// Pending outbound snapshot, if a local change happened since the last take
    pub fn take_outbound(&mut self) -> Option<SharedState> {
        self.mirror.take_outbound()
    }

    /// Current full shared state
    pub fn shared_state(&self) -> SharedState {
        self.mirror.snapshot(&self.store)
    }

    pub fn store(&self) -> &SceneStore {
        &self.store
    }

    pub fn config(&self) -> &InteractionConfig {
        &self.config
    }

    pub fn tuning(&self) -> &ManipulationTuning {
        &self.tuning
    }

    pub fn mirror(&self) -> &RemoteMirror {
        &self.mirror
    }

    pub fn controller(&self) -> &Controller {
        &self.controller
    }

    pub fn is_manipulating(&self) -> bool {
        self.controller.is_manipulating()
    }
}
