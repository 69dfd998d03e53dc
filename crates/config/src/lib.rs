//! Shared configuration for arstage
//!
//! This crate is the single source of truth for which interaction prototype
//! runs, the numeric tuning every controller reads, and where the sync relay
//! lives. Everything here is chosen once at startup and never mutated.

use serde::{Deserialize, Serialize};

#[cfg(feature = "bevy")]
use bevy::prelude::Resource;

/// Default window width in logical pixels
pub const DEFAULT_WIDTH: u32 = 1280;

/// Default window height in logical pixels
pub const DEFAULT_HEIGHT: u32 = 720;

/// Screen-space move factor (world units per pixel)
pub const DEFAULT_MOVE_FACTOR: f32 = 0.01;

/// Screen-space rotate factor (radians per pixel)
pub const DEFAULT_ROTATE_FACTOR: f32 = 0.01;

/// Screen-space scale factor (scale units per pixel)
pub const DEFAULT_SCALE_FACTOR: f32 = 0.001;

/// Device-travel scale factor (scale units per world unit of device motion)
pub const DEFAULT_DEVICE_SCALE_FACTOR: f32 = 0.1;

/// Smallest scale any gesture may commit
pub const MIN_SCALE: f32 = 0.05;

/// Maximum distance at which a candidate position snaps to a detected plane
pub const PLANE_SNAP_THRESHOLD: f32 = 0.5;

/// Below this, pinch distances and flattened axes count as degenerate
pub const DEGENERATE_EPSILON: f32 = 1e-4;

/// Default relay bind address
pub const DEFAULT_RELAY_ADDR: &str = "127.0.0.1:9001";

/// Default interval between user-pose broadcasts
pub const DEFAULT_POSE_BROADCAST_INTERVAL_MS: u64 = 1000;

/// Errors raised while resolving configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Unknown prototype id: {0}")]
    UnknownPrototype(String),
}

/// Per-controller feature switches. Fixed at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "bevy", derive(Resource))]
pub struct InteractionConfig {
    /// Manipulation requires an explicit mode set from the toolbar
    pub modeful: bool,
    /// Drive the object from the device (camera) pose instead of touch deltas
    pub use_device_position: bool,
    /// Snap candidate positions onto detected real-world planes
    pub use_plane_detection: bool,
    /// Place un-placed objects at the latest hit-test result
    pub use_hit_test_snapping: bool,
}

/// How the modeless touch controller splits a two-finger gesture.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub enum TwoFingerPolicy {
    /// Pinch scales and twist rotates on every event
    #[default]
    Simultaneous,
    /// Whichever of pinch or twist first exceeds its threshold owns the gesture
    Dominant {
        distance_threshold_px: f32,
        angle_threshold_rad: f32,
    },
}

impl TwoFingerPolicy {
    /// The magnitude heuristic with its customary thresholds
    pub fn dominant() -> Self {
        TwoFingerPolicy::Dominant {
            distance_threshold_px: 10.0,
            angle_threshold_rad: 0.1,
        }
    }
}

/// Input that drives scale in the modeful device-pose prototype.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum DeviceScaleSource {
    /// Vertical drag on screen
    #[default]
    VerticalDrag,
    /// Distance the device travelled since selection
    DeviceTranslation,
}

/// Numeric constants shared by every controller.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "bevy", derive(Resource))]
pub struct ManipulationTuning {
    pub move_factor: f32,
    pub rotate_factor: f32,
    pub scale_factor: f32,
    pub device_scale_factor: f32,
    pub min_scale: f32,
    pub plane_snap_threshold: f32,
    pub degenerate_epsilon: f32,
    pub two_finger_policy: TwoFingerPolicy,
    pub device_scale_source: DeviceScaleSource,
}

impl Default for ManipulationTuning {
    fn default() -> Self {
        Self {
            move_factor: DEFAULT_MOVE_FACTOR,
            rotate_factor: DEFAULT_ROTATE_FACTOR,
            scale_factor: DEFAULT_SCALE_FACTOR,
            device_scale_factor: DEFAULT_DEVICE_SCALE_FACTOR,
            min_scale: MIN_SCALE,
            plane_snap_threshold: PLANE_SNAP_THRESHOLD,
            degenerate_epsilon: DEGENERATE_EPSILON,
            two_finger_policy: TwoFingerPolicy::default(),
            device_scale_source: DeviceScaleSource::default(),
        }
    }
}

impl ManipulationTuning {
    /// Clamp a scale to the configured floor
    pub fn clamp_scale(&self, scale: f32) -> f32 {
        scale.max(self.min_scale)
    }
}

/// The four interaction prototypes under comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "bevy", derive(Resource))]
pub enum PrototypeKind {
    ModefulTouch,
    #[default]
    ModelessTouch,
    ModefulDevice,
    ModelessDevice,
}

impl PrototypeKind {
    /// All prototypes, in menu order
    pub fn all() -> &'static [PrototypeKind] {
        &[
            PrototypeKind::ModefulTouch,
            PrototypeKind::ModelessTouch,
            PrototypeKind::ModefulDevice,
            PrototypeKind::ModelessDevice,
        ]
    }

    /// Route id used in URLs and the `ARSTAGE_PROTOTYPE` variable
    pub fn id(&self) -> &'static str {
        match self {
            PrototypeKind::ModefulTouch => "modeful-touch",
            PrototypeKind::ModelessTouch => "modeless-touch",
            PrototypeKind::ModefulDevice => "modeful-device",
            PrototypeKind::ModelessDevice => "modeless-device",
        }
    }

    /// Resolve a route id
    pub fn from_id(id: &str) -> Result<Self, ConfigError> {
        Self::all()
            .iter()
            .copied()
            .find(|p| p.id() == id)
            .ok_or_else(|| ConfigError::UnknownPrototype(id.to_string()))
    }

    /// Parse from environment variable ARSTAGE_PROTOTYPE
    pub fn from_env() -> Result<Self, ConfigError> {
        match std::env::var("ARSTAGE_PROTOTYPE") {
            Ok(id) => Self::from_id(id.trim()),
            Err(_) => Ok(Self::default()),
        }
    }

    /// Feature preset for this prototype
    pub fn config(&self) -> InteractionConfig {
        match self {
            PrototypeKind::ModefulTouch => InteractionConfig {
                modeful: true,
                use_device_position: false,
                use_plane_detection: false,
                use_hit_test_snapping: false,
            },
            PrototypeKind::ModelessTouch => InteractionConfig {
                modeful: false,
                use_device_position: false,
                use_plane_detection: true,
                use_hit_test_snapping: true,
            },
            PrototypeKind::ModefulDevice => InteractionConfig {
                modeful: true,
                use_device_position: true,
                use_plane_detection: true,
                use_hit_test_snapping: true,
            },
            PrototypeKind::ModelessDevice => InteractionConfig {
                modeful: false,
                use_device_position: true,
                use_plane_detection: true,
                use_hit_test_snapping: true,
            },
        }
    }
}

/// Remote sync settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "bevy", derive(Resource))]
pub struct SyncSettings {
    /// WebSocket URL of the relay (`None` runs local-only)
    pub server_url: Option<String>,
    /// Interval between user-pose broadcasts
    pub pose_broadcast_interval_ms: u64,
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self {
            server_url: None,
            pose_broadcast_interval_ms: DEFAULT_POSE_BROADCAST_INTERVAL_MS,
        }
    }
}

impl SyncSettings {
    /// Read ARSTAGE_SYNC_URL; an empty value means local-only
    pub fn from_env() -> Self {
        let server_url = std::env::var("ARSTAGE_SYNC_URL")
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());
        Self {
            server_url,
            ..Self::default()
        }
    }
}

/// Relay bind address from ARSTAGE_RELAY_ADDR
pub fn relay_addr_from_env() -> String {
    std::env::var("ARSTAGE_RELAY_ADDR").unwrap_or_else(|_| DEFAULT_RELAY_ADDR.to_string())
}
