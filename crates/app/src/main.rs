//! arstage - AR object manipulation prototypes on Bevy

use bevy::prelude::*;
use bevy::window::WindowResolution;

mod config;

use arstage_config::{DEFAULT_HEIGHT, DEFAULT_WIDTH};
use arstage_scene::ScenePlugin;
use config::AppConfig;

fn main() {
    let config = AppConfig::default();

    let window_config = Window {
        title: config.window_title(),
        resolution: WindowResolution::new(DEFAULT_WIDTH, DEFAULT_HEIGHT),
        present_mode: bevy::window::PresentMode::AutoVsync,
        ..default()
    };

    let mut app = App::new();

    app.add_plugins(
        DefaultPlugins
            .set(WindowPlugin {
                primary_window: Some(window_config),
                ..default()
            })
            .set(bevy::log::LogPlugin {
                level: bevy::log::Level::INFO,
                ..default()
            }),
    );

    for problem in config.problems() {
        warn!("{}", problem);
    }
    info!("Starting arstage with the {} prototype", config.prototype.id());

    app.add_plugins(ScenePlugin::new(config.prototype).with_sync(config.sync.clone()))
        .insert_resource(config)
        .run();
}
