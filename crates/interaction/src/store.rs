//! Scene object store
//!
//! A single owned arena of placed objects indexed by stable id. Every mutation
//! goes through [`SceneStore::update`], [`SceneStore::add`],
//! [`SceneStore::remove`] or [`SceneStore::replace_all`], and each one bumps the
//! store revision so render and sync layers can detect changes cheaply.

use arstage_ipc::{ObjectPatchState, ObjectState};
use std::collections::HashMap;

use glam::Vec3;
use tracing::{debug, info, warn};

/// Id of the object every session starts with
pub const DEFAULT_OBJECT_ID: &str = "cube-1";

/// Asset reference rendered as a plain cube
pub const CUBE_ASSET_REF: &str = "cube";

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("Object id already in use: {0}")]
    DuplicateId(String),
}

/// A placed virtual object.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneObject {
    pub id: String,
    pub asset_ref: String,
    pub position: Vec3,
    /// XYZ Euler angles in radians
    pub rotation: Vec3,
    /// Uniform scale
    pub scale: f32,
    pub color: Option<String>,
}

impl SceneObject {
    pub fn new(id: impl Into<String>, asset_ref: impl Into<String>, position: Vec3) -> Self {
        Self {
            id: id.into(),
            asset_ref: asset_ref.into(),
            position,
            rotation: Vec3::ZERO,
            scale: 1.0,
            color: None,
        }
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    /// Whether the object still sits at the origin placement sentinel
    pub fn is_at_origin(&self) -> bool {
        self.position == Vec3::ZERO
    }
}

impl From<&SceneObject> for ObjectState {
    fn from(object: &SceneObject) -> Self {
        ObjectState {
            id: object.id.clone(),
            asset_ref: object.asset_ref.clone(),
            position: object.position.to_array(),
            rotation: object.rotation.to_array(),
            scale: object.scale,
            color: object.color.clone(),
        }
    }
}

impl From<ObjectState> for SceneObject {
    fn from(state: ObjectState) -> Self {
        SceneObject {
            id: state.id,
            asset_ref: state.asset_ref,
            position: Vec3::from_array(state.position),
            rotation: Vec3::from_array(state.rotation),
            scale: state.scale,
            color: state.color,
        }
    }
}

/// Partial update of an object's editable fields.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObjectPatch {
    pub position: Option<Vec3>,
    pub rotation: Option<Vec3>,
    pub scale: Option<f32>,
    pub color: Option<String>,
}

impl ObjectPatch {
    pub fn position(position: Vec3) -> Self {
        Self {
            position: Some(position),
            ..Default::default()
        }
    }

    pub fn rotation(rotation: Vec3) -> Self {
        Self {
            rotation: Some(rotation),
            ..Default::default()
        }
    }

    pub fn scale(scale: f32) -> Self {
        Self {
            scale: Some(scale),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.position.is_none()
            && self.rotation.is_none()
            && self.scale.is_none()
            && self.color.is_none()
    }

    /// Write the present fields into `object`
    pub fn apply_to(&self, object: &mut SceneObject) {
        if let Some(position) = self.position {
            object.position = position;
        }
        if let Some(rotation) = self.rotation {
            object.rotation = rotation;
        }
        if let Some(scale) = self.scale {
            object.scale = scale;
        }
        if let Some(color) = &self.color {
            object.color = Some(color.clone());
        }
    }
}

impl From<ObjectPatchState> for ObjectPatch {
    fn from(state: ObjectPatchState) -> Self {
        ObjectPatch {
            position: state.position.map(Vec3::from_array),
            rotation: state.rotation.map(Vec3::from_array),
            scale: state.scale,
            color: state.color,
        }
    }
}

/// Ordered registry of placed objects.
#[derive(Debug, Clone, Default)]
pub struct SceneStore {
    objects: Vec<SceneObject>,
    next_id: u64,
    revision: u64,
}

impl SceneStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store holding the single light-blue cube a fresh session shows
    pub fn with_default_object() -> Self {
        let mut store = Self::new();
        store.objects.push(
            SceneObject::new(DEFAULT_OBJECT_ID, CUBE_ASSET_REF, Vec3::new(0.0, 0.0, -1.0))
                .with_color("lightblue"),
        );
        store
    }

    /// Insert an object. Ids must be unique.
    pub fn add(&mut self, object: SceneObject) -> Result<(), StoreError> {
        if self.contains(&object.id) {
            return Err(StoreError::DuplicateId(object.id));
        }
        info!("Added object {} ({})", object.id, object.asset_ref);
        self.objects.push(object);
        self.revision += 1;
        Ok(())
    }

    /// Create an object with a freshly generated `object_N` id.
    ///
    /// Objects added without a position start at the origin sentinel so
    /// hit-test placement can claim them.
    pub fn create(&mut self, asset_ref: &str, position: Option<Vec3>) -> String {
        let id = self.generate_id();
        let object = SceneObject::new(id.clone(), asset_ref, position.unwrap_or(Vec3::ZERO));
        info!("Added object {} ({})", id, asset_ref);
        self.objects.push(object);
        self.revision += 1;
        id
    }

    /// Apply a partial update. Returns whether `id` existed.
    pub fn update(&mut self, id: &str, patch: &ObjectPatch) -> bool {
        let Some(object) = self.objects.iter_mut().find(|o| o.id == id) else {
            debug!("update: no object {}, ignoring", id);
            return false;
        };
        patch.apply_to(object);
        self.revision += 1;
        true
    }

    pub fn remove(&mut self, id: &str) -> Option<SceneObject> {
        let index = self.objects.iter().position(|o| o.id == id)?;
        self.revision += 1;
        info!("Removed object {}", id);
        Some(self.objects.remove(index))
    }

    pub fn get(&self, id: &str) -> Option<&SceneObject> {
        self.objects.iter().find(|o| o.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    pub fn list(&self) -> &[SceneObject] {
        &self.objects
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Replace every object with an inbound snapshot (last writer wins).
    ///
    /// Ids stay unique: a repeated id keeps its first slot and takes the
    /// fields of its last occurrence.
    pub fn replace_all(&mut self, objects: Vec<SceneObject>) {
        debug!("replace_all: {} objects", objects.len());
        let mut slots: HashMap<String, usize> = HashMap::with_capacity(objects.len());
        let mut unique: Vec<SceneObject> = Vec::with_capacity(objects.len());
        for object in objects {
            match slots.get(&object.id) {
                Some(&slot) => {
                    warn!("Snapshot repeats object id {}, keeping the last copy", object.id);
                    unique[slot] = object;
                }
                None => {
                    slots.insert(object.id.clone(), unique.len());
                    unique.push(object);
                }
            }
        }
        self.objects = unique;
        self.revision += 1;
    }

    /// Monotonic change counter
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Wire form of every object, in store order
    pub fn to_states(&self) -> Vec<ObjectState> {
        self.objects.iter().map(ObjectState::from).collect()
    }

    fn generate_id(&mut self) -> String {
        loop {
            self.next_id += 1;
            let id = format!("object_{}", self.next_id);
            if !self.contains(&id) {
                return id;
            }
        }
    }
}
