//! Remote sync plumbing
//!
//! The sync client runs on its own thread; this plugin drains its inbound
//! events into the session, ships committed snapshots, and publishes the
//! device pose on a timer.

use std::time::Duration;

use arstage_config::SyncSettings;
use arstage_ipc::ClientRole;
use arstage_sync::{SyncClient, SyncEvent, SyncHandle};
use bevy::prelude::*;

use crate::session::{ActiveSession, DevicePose};

/// Connection to the relay (non-send because it owns the channel receiver)
pub struct SyncBridge {
    handle: SyncHandle,
    connected: bool,
}

impl SyncBridge {
    pub fn is_connected(&self) -> bool {
        self.connected
    }
}

/// Repeating timer for user pose broadcasts
#[derive(Resource)]
struct PoseBroadcast(Timer);

/// Plugin connecting the session to the relay when a server URL is configured
pub struct RemoteSyncPlugin {
    pub settings: SyncSettings,
}

impl Plugin for RemoteSyncPlugin {
    fn build(&self, app: &mut App) {
        let interval = Duration::from_millis(self.settings.pose_broadcast_interval_ms);
        app.insert_resource(self.settings.clone())
            .insert_resource(PoseBroadcast(Timer::new(interval, TimerMode::Repeating)));

        let Some(url) = self.settings.server_url.as_deref() else {
            info!("No sync server configured, running standalone");
            return;
        };

        match SyncClient::new(url, ClientRole::Headset).spawn_thread() {
            Ok(handle) => {
                info!("Syncing with {}", url);
                app.insert_non_send_resource(SyncBridge {
                    handle,
                    connected: false,
                })
                .add_systems(Update, poll_remote.in_set(crate::SceneSet::Input))
                .add_systems(
                    Update,
                    (broadcast_pose, flush_outbound)
                        .chain()
                        .in_set(crate::SceneSet::Mirror),
                );
            }
            Err(e) => warn!("Failed to start sync client: {}", e),
        }
    }
}

/// Apply inbound snapshots to the session
fn poll_remote(mut bridge: NonSendMut<SyncBridge>, mut session: ResMut<ActiveSession>) {
    while let Some(event) = bridge.handle.try_recv() {
        match event {
            SyncEvent::Connected => {
                info!("Connected to sync relay");
                bridge.connected = true;
            }
            SyncEvent::Disconnected => {
                warn!("Lost sync relay connection");
                bridge.connected = false;
            }
            SyncEvent::State(state) => {
                session.0.apply_remote_state(state);
            }
        }
    }
}

/// Record the device pose every broadcast interval
fn broadcast_pose(
    time: Res<Time>,
    pose: Res<DevicePose>,
    bridge: NonSend<SyncBridge>,
    mut timer: ResMut<PoseBroadcast>,
    mut session: ResMut<ActiveSession>,
) {
    if !timer.0.tick(time.delta()).just_finished() || !bridge.is_connected() {
        return;
    }
    session.0.publish_user_pose(&pose.0);
}

/// Send the pending snapshot, if any
fn flush_outbound(bridge: NonSend<SyncBridge>, mut session: ResMut<ActiveSession>) {
    if !bridge.is_connected() {
        return;
    }
    let Some(state) = session.0.take_outbound() else {
        return;
    };
    if let Err(e) = bridge.handle.send(state) {
        warn!("Dropped outbound snapshot: {}", e);
    }
}
