//! Application configuration from the environment

use arstage_config::{ConfigError, PrototypeKind, SyncSettings};
use bevy::prelude::*;

/// Which prototype to run and where to sync
#[derive(Resource, Clone)]
pub struct AppConfig {
    pub prototype: PrototypeKind,
    pub sync: SyncSettings,
    /// Parse problems, logged after the log plugin is installed
    problems: Vec<String>,
}

impl AppConfig {
    /// Read ARSTAGE_PROTOTYPE and ARSTAGE_SYNC_URL, falling back to defaults
    pub fn from_env() -> Self {
        Self::from_parts(PrototypeKind::from_env(), SyncSettings::from_env())
    }

    fn from_parts(prototype: Result<PrototypeKind, ConfigError>, sync: SyncSettings) -> Self {
        let mut problems = Vec::new();
        let prototype = prototype.unwrap_or_else(|e| {
            problems.push(format!("{}, using {}", e, PrototypeKind::default().id()));
            PrototypeKind::default()
        });
        Self {
            prototype,
            sync,
            problems,
        }
    }

    /// Problems to report once the log subscriber is installed
    pub fn problems(&self) -> &[String] {
        &self.problems
    }

    pub fn window_title(&self) -> String {
        format!("arstage: {}", self.prototype.id())
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::from_env()
    }
}
