//! Remote mirror
//!
//! Local commits queue a whole-state snapshot for the sync channel. Inbound
//! snapshots replace the local store wholesale unless a local manipulation
//! is in progress, in which case they are dropped.

use arstage_ipc::{SharedState, UserPose};
use tracing::{debug, info};

use crate::store::{SceneObject, SceneStore};

#[derive(Debug, Clone, Default)]
pub struct RemoteMirror {
    updates_disabled: bool,
    pending: Option<SharedState>,
    user_pose: UserPose,
    remote_user_pose: Option<UserPose>,
    dropped: u64,
}

impl RemoteMirror {
    pub fn new() -> Self {
        Self::default()
    }

    /// Latch inbound updates off while a local drag is active
    pub fn set_updates_disabled(&mut self, disabled: bool) {
        if disabled != self.updates_disabled {
            debug!("Remote updates {}", if disabled { "disabled" } else { "enabled" });
        }
        self.updates_disabled = disabled;
    }

    pub fn updates_disabled(&self) -> bool {
        self.updates_disabled
    }

    /// Full snapshot of `store` plus the local user pose
    pub fn snapshot(&self, store: &SceneStore) -> SharedState {
        SharedState {
            objects: store.to_states(),
            user_pose: self.user_pose,
        }
    }

    /// Queue a snapshot after a committed local change
    pub fn mark_dirty(&mut self, store: &SceneStore) {
        self.pending = Some(self.snapshot(store));
    }

    /// Record the local device pose and queue it for broadcast
    pub fn publish_user_pose(&mut self, pose: UserPose, store: &SceneStore) {
        self.user_pose = pose;
        self.mark_dirty(store);
    }

    pub fn user_pose(&self) -> UserPose {
        self.user_pose
    }

    /// Pose last reported by the remote side
    pub fn remote_user_pose(&self) -> Option<UserPose> {
        self.remote_user_pose
    }

    /// Take the pending outbound snapshot, if any
    pub fn take_outbound(&mut self) -> Option<SharedState> {
        self.pending.take()
    }

    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Number of inbound snapshots dropped by the latch
    pub fn dropped(&self) -> u64 {
        self.dropped
    }

    /// Apply an inbound snapshot. Returns whether it replaced the store.
    pub fn accept_inbound(&mut self, state: SharedState, store: &mut SceneStore) -> bool {
        if self.updates_disabled {
            self.dropped += 1;
            info!(
                "Dropped remote snapshot of {} objects during local edit",
                state.objects.len()
            );
            return false;
        }
        self.remote_user_pose = Some(state.user_pose);
        store.replace_all(state.objects.into_iter().map(SceneObject::from).collect());
        true
    }
}
