//! Pointer and touch collection
//!
//! Mouse buttons and touches are turned into [`InputEvent`]s, picked against
//! the placed objects, and handed to the active session before the frame tick.

use arstage_interaction::{InputEvent, TouchPoint};
use bevy::input::touch::Touches;
use bevy::prelude::*;
use bevy::window::PrimaryWindow;

use crate::camera::MainCamera;
use crate::objects::Placed;
use crate::picking::{PickTarget, pick_nearest};
use crate::session::{ActiveSession, DevicePose, to_core_vec2};

/// Pointer id reported for the mouse; touch ids come from the platform
pub const MOUSE_POINTER_ID: u64 = u64::MAX;

/// Collect pointer input and run the per-frame controller tick
pub struct PointerInputPlugin;

impl Plugin for PointerInputPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            Update,
            (
                (collect_mouse_input, collect_touch_input).in_set(crate::SceneSet::Input),
                tick_session.in_set(crate::SceneSet::Tick),
            ),
        );
    }
}

/// Id of the nearest object under a screen position
fn pick_at(
    screen_pos: Vec2,
    camera_query: &Query<(&Camera, &GlobalTransform), With<MainCamera>>,
    objects: &Query<(&Placed, &GlobalTransform)>,
) -> Option<String> {
    let Ok((camera, camera_transform)) = camera_query.single() else {
        return None;
    };
    let Ok(ray) = camera.viewport_to_world(camera_transform, screen_pos) else {
        return None;
    };

    let targets = objects.iter().map(|(placed, transform)| {
        let (scale, _, translation) = transform.to_scale_rotation_translation();
        PickTarget {
            id: placed.id.as_str(),
            center: translation,
            radius: placed.bounding_radius * scale.max_element(),
        }
    });
    pick_nearest(ray.origin, ray.direction.into(), targets).map(str::to_string)
}

/// Left-button edges and cursor for one frame
#[derive(Debug, Clone, Copy, Default)]
struct MouseFrame {
    just_pressed: bool,
    just_released: bool,
    pressed: bool,
    /// `None` while the cursor is outside the window
    cursor: Option<Vec2>,
}

/// Turn one frame of mouse state into pointer events.
///
/// `last_cursor` is the last position sent while the button was held. A
/// release outside the window still ends the gesture, at that position.
fn mouse_events(
    frame: MouseFrame,
    last_cursor: &mut Option<Vec2>,
    pick: impl FnOnce(Vec2) -> Option<String>,
) -> Vec<InputEvent> {
    let mut events = Vec::new();

    if frame.just_pressed {
        events.push(InputEvent::PointerDown {
            pointer_id: MOUSE_POINTER_ID,
            position: frame.cursor.map(to_core_vec2),
            hit: frame.cursor.and_then(pick),
            touches: Vec::new(),
        });
        *last_cursor = frame.cursor;
    }

    if frame.just_released {
        let position = frame.cursor.or(*last_cursor).unwrap_or(Vec2::ZERO);
        events.push(InputEvent::PointerUp {
            pointer_id: MOUSE_POINTER_ID,
            position: to_core_vec2(position),
            touches: Vec::new(),
        });
        *last_cursor = None;
    } else if frame.pressed
        && !frame.just_pressed
        && let Some(cursor) = frame.cursor
        && *last_cursor != Some(cursor)
    {
        events.push(InputEvent::PointerMove {
            pointer_id: MOUSE_POINTER_ID,
            position: to_core_vec2(cursor),
            touches: Vec::new(),
        });
        *last_cursor = Some(cursor);
    }

    events
}

fn collect_mouse_input(
    mouse_button: Res<ButtonInput<MouseButton>>,
    window_query: Query<&Window, With<PrimaryWindow>>,
    camera_query: Query<(&Camera, &GlobalTransform), With<MainCamera>>,
    objects: Query<(&Placed, &GlobalTransform)>,
    pose: Res<DevicePose>,
    mut session: ResMut<ActiveSession>,
    mut last_cursor: Local<Option<Vec2>>,
) {
    let Ok(window) = window_query.single() else {
        return;
    };
    let frame = MouseFrame {
        just_pressed: mouse_button.just_pressed(MouseButton::Left),
        just_released: mouse_button.just_released(MouseButton::Left),
        pressed: mouse_button.pressed(MouseButton::Left),
        cursor: window.cursor_position(),
    };

    let events = mouse_events(frame, &mut *last_cursor, |pos| {
        pick_at(pos, &camera_query, &objects)
    });
    for event in &events {
        session.0.handle_input(&pose.0, event);
    }
}

fn collect_touch_input(
    touches: Res<Touches>,
    camera_query: Query<(&Camera, &GlobalTransform), With<MainCamera>>,
    objects: Query<(&Placed, &GlobalTransform)>,
    pose: Res<DevicePose>,
    mut session: ResMut<ActiveSession>,
) {
    let active: Vec<TouchPoint> = touches
        .iter()
        .map(|touch| {
            let pos = touch.position();
            TouchPoint::new(touch.id(), pos.x, pos.y)
        })
        .collect();

    for touch in touches.iter_just_pressed() {
        let hit = pick_at(touch.position(), &camera_query, &objects);
        let event = InputEvent::PointerDown {
            pointer_id: touch.id(),
            position: Some(to_core_vec2(touch.position())),
            hit,
            touches: active.clone(),
        };
        session.0.handle_input(&pose.0, &event);
    }

    for touch in touches.iter() {
        if touches.just_pressed(touch.id()) || touch.delta() == Vec2::ZERO {
            continue;
        }
        let event = InputEvent::PointerMove {
            pointer_id: touch.id(),
            position: to_core_vec2(touch.position()),
            touches: active.clone(),
        };
        session.0.handle_input(&pose.0, &event);
    }

    for touch in touches.iter_just_released() {
        let event = InputEvent::PointerUp {
            pointer_id: touch.id(),
            position: to_core_vec2(touch.position()),
            touches: active.clone(),
        };
        session.0.handle_input(&pose.0, &event);
    }
}

fn tick_session(time: Res<Time>, pose: Res<DevicePose>, mut session: ResMut<ActiveSession>) {
    session.0.tick(&pose.0, time.delta_secs());
}

#[cfg(test)]
mod tests {
    use super::*;

    fn held(cursor: Option<Vec2>) -> MouseFrame {
        MouseFrame {
            pressed: true,
            cursor,
            ..default()
        }
    }

    #[test]
    fn test_press_picks_under_cursor() {
        let mut last = None;
        let frame = MouseFrame {
            just_pressed: true,
            pressed: true,
            cursor: Some(Vec2::new(10.0, 20.0)),
            ..default()
        };
        let events = mouse_events(frame, &mut last, |_| Some("cube-1".to_string()));
        assert_eq!(events.len(), 1);
        let InputEvent::PointerDown { hit, position, .. } = &events[0] else {
            panic!("expected pointer down, got {:?}", events[0]);
        };
        assert_eq!(hit.as_deref(), Some("cube-1"));
        assert_eq!(*position, Some(glam::Vec2::new(10.0, 20.0)));
        assert_eq!(last, Some(Vec2::new(10.0, 20.0)));
    }

    #[test]
    fn test_drag_moves_only_when_cursor_changes() {
        let mut last = Some(Vec2::new(10.0, 20.0));
        assert!(mouse_events(held(Some(Vec2::new(10.0, 20.0))), &mut last, |_| None).is_empty());

        let events = mouse_events(held(Some(Vec2::new(15.0, 20.0))), &mut last, |_| None);
        assert!(matches!(events.as_slice(), [InputEvent::PointerMove { .. }]));
        assert_eq!(last, Some(Vec2::new(15.0, 20.0)));

        // Cursor left the window mid-drag: nothing to report yet
        assert!(mouse_events(held(None), &mut last, |_| None).is_empty());
    }

    #[test]
    fn test_release_outside_window_still_ends_gesture() {
        let mut last = Some(Vec2::new(15.0, 20.0));
        let frame = MouseFrame {
            just_released: true,
            cursor: None,
            ..default()
        };
        let events = mouse_events(frame, &mut last, |_| None);
        assert_eq!(
            events,
            vec![InputEvent::PointerUp {
                pointer_id: MOUSE_POINTER_ID,
                position: glam::Vec2::new(15.0, 20.0),
                touches: Vec::new(),
            }]
        );
        assert_eq!(last, None);
    }

    #[test]
    fn test_click_within_one_frame_sends_down_then_up() {
        let mut last = None;
        let frame = MouseFrame {
            just_pressed: true,
            just_released: true,
            cursor: Some(Vec2::new(5.0, 5.0)),
            ..default()
        };
        let events = mouse_events(frame, &mut last, |_| None);
        assert!(matches!(
            events.as_slice(),
            [InputEvent::PointerDown { .. }, InputEvent::PointerUp { .. }]
        ));
        assert_eq!(last, None);
    }
}
