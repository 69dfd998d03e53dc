//! arstage interaction core
//!
//! This crate turns raw pointer, multi-touch and device-pose streams into
//! transforms on a single selected scene object:
//! - [`gesture`] - input events and gesture sampling (drag, pinch, twist)
//! - [`reference`] - reference frames captured at gesture start
//! - [`controller`] - the four interaction prototypes behind one contract
//! - [`snapping`] - plane and hit-test post-processing of candidates
//! - [`store`] - the scene object registry
//! - [`selection`] - selected object and active mode
//! - [`mirror`] - outbound snapshots and the inbound update latch
//! - [`session`] - the façade a render loop drives

pub mod controller;
pub mod gesture;
pub mod math;
pub mod mirror;
pub mod reference;
pub mod selection;
pub mod session;
pub mod snapping;
pub mod store;

pub use controller::{Candidate, Controller};
pub use gesture::{InputEvent, TouchPoint};
pub use math::CameraPose;
pub use mirror::RemoteMirror;
pub use selection::SelectionState;
pub use session::InteractionSession;
pub use snapping::{DetectedPlane, HitTestSnapper, PlaneSnapper};
pub use store::{ObjectPatch, SceneObject, SceneStore, StoreError};
