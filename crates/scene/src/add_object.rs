//! Scene edits: adding and deleting objects
//!
//! Edits go through the session as wizard commands so they are broadcast the
//! same way remote edits are.
//!
//! Hotkeys:
//! - 1/2/3: Add a tree/bench/lamp (placed at the next hit-test point)
//! - Delete: Remove the selected object

use arstage_ipc::{AssetKind, WizardCommand};
use bevy::ecs::message::Message;
use bevy::prelude::*;

use crate::session::ActiveSession;

/// Message for adding a new object to the scene
#[derive(Message)]
pub struct AddObjectEvent {
    pub asset_ref: String,
    /// World position; `None` leaves it for hit-test placement
    pub position: Option<Vec3>,
}

impl AddObjectEvent {
    pub fn asset(kind: AssetKind) -> Self {
        Self {
            asset_ref: kind.asset_ref().to_string(),
            position: None,
        }
    }

    pub fn to_command(&self) -> WizardCommand {
        WizardCommand::AddObject {
            asset_ref: self.asset_ref.clone(),
            position: self.position.map(|p| p.to_array()),
        }
    }
}

/// Any wizard edit applied locally
#[derive(Message)]
pub struct WizardCommandEvent(pub WizardCommand);

/// Plugin for scene edits
pub struct AddObjectPlugin;

impl Plugin for AddObjectPlugin {
    fn build(&self, app: &mut App) {
        app.add_message::<AddObjectEvent>()
            .add_message::<WizardCommandEvent>()
            .add_systems(
                Update,
                (handle_edit_hotkeys, forward_add_object_events, apply_wizard_commands)
                    .chain()
                    .in_set(crate::SceneSet::Input),
            );
    }
}

fn handle_edit_hotkeys(
    key_input: Res<ButtonInput<KeyCode>>,
    session: Res<ActiveSession>,
    mut add_writer: MessageWriter<AddObjectEvent>,
    mut wizard_writer: MessageWriter<WizardCommandEvent>,
) {
    let asset = if key_input.just_pressed(KeyCode::Digit1) {
        Some(AssetKind::Tree)
    } else if key_input.just_pressed(KeyCode::Digit2) {
        Some(AssetKind::Bench)
    } else if key_input.just_pressed(KeyCode::Digit3) {
        Some(AssetKind::Lamp)
    } else {
        None
    };
    if let Some(asset) = asset {
        add_writer.write(AddObjectEvent::asset(asset));
    }

    if key_input.just_pressed(KeyCode::Delete)
        && let Some(id) = session.0.selected()
    {
        wizard_writer.write(WizardCommandEvent(WizardCommand::DeleteObject {
            id: id.to_string(),
        }));
    }
}

fn forward_add_object_events(
    mut events: MessageReader<AddObjectEvent>,
    mut writer: MessageWriter<WizardCommandEvent>,
) {
    for event in events.read() {
        writer.write(WizardCommandEvent(event.to_command()));
    }
}

fn apply_wizard_commands(
    mut events: MessageReader<WizardCommandEvent>,
    mut session: ResMut<ActiveSession>,
) {
    for WizardCommandEvent(command) in events.read() {
        let label = match command {
            WizardCommand::AddObject { .. } => "add",
            WizardCommand::DeleteObject { .. } => "delete",
            WizardCommand::UpdateObject { .. } => "update",
        };
        if session.0.apply_wizard_command(command.clone()) {
            info!("Applied {} edit ({} objects)", label, session.0.store().len());
        } else {
            warn!("Ignored {} edit for a missing object", label);
        }
    }
}
