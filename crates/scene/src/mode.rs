//! Mode toolbar and hotkeys
//!
//! - G: Move
//! - R: Rotate
//! - S: Scale
//! - Escape: Deselect
//!
//! Modeless prototypes ignore mode changes; deselect works everywhere.

use arstage_ipc::{InteractionMode, ModeCommand};
use bevy::ecs::message::Message;
use bevy::prelude::*;

use crate::session::ActiveSession;

/// Toolbar command for the active session
#[derive(Message)]
pub struct ModeCommandEvent(pub ModeCommand);

/// Plugin for mode switching
pub struct ModePlugin;

impl Plugin for ModePlugin {
    fn build(&self, app: &mut App) {
        app.add_message::<ModeCommandEvent>().add_systems(
            Update,
            (handle_mode_hotkeys, apply_mode_commands)
                .chain()
                .in_set(crate::SceneSet::Input),
        );
    }
}

fn hotkey_command(key_input: &ButtonInput<KeyCode>) -> Option<ModeCommand> {
    if key_input.just_pressed(KeyCode::KeyG) {
        Some(ModeCommand::SetMode(InteractionMode::Translate))
    } else if key_input.just_pressed(KeyCode::KeyR) {
        Some(ModeCommand::SetMode(InteractionMode::Rotate))
    } else if key_input.just_pressed(KeyCode::KeyS) {
        Some(ModeCommand::SetMode(InteractionMode::Scale))
    } else if key_input.just_pressed(KeyCode::Escape) {
        Some(ModeCommand::Deselect)
    } else {
        None
    }
}

fn handle_mode_hotkeys(
    key_input: Res<ButtonInput<KeyCode>>,
    mut writer: MessageWriter<ModeCommandEvent>,
) {
    if let Some(command) = hotkey_command(&key_input) {
        writer.write(ModeCommandEvent(command));
    }
}

fn apply_mode_commands(
    mut commands: MessageReader<ModeCommandEvent>,
    mut session: ResMut<ActiveSession>,
) {
    for ModeCommandEvent(command) in commands.read() {
        match command {
            ModeCommand::SetMode(mode) => {
                if session.0.set_mode(*mode) {
                    info!("Mode: {}", mode.display_name());
                } else {
                    debug!("Mode {} not available in this prototype", mode.display_name());
                }
            }
            ModeCommand::Deselect => session.0.deselect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hotkeys_map_to_commands() {
        let mut input = ButtonInput::<KeyCode>::default();
        assert_eq!(hotkey_command(&input), None);

        input.press(KeyCode::KeyR);
        assert_eq!(
            hotkey_command(&input),
            Some(ModeCommand::SetMode(InteractionMode::Rotate))
        );

        input.clear();
        input.release_all();
        input.press(KeyCode::Escape);
        assert_eq!(hotkey_command(&input), Some(ModeCommand::Deselect));
    }
}
