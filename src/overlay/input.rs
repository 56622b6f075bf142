//! Bevy systems feeding pointer and keyboard input to the controller.

use bevy::prelude::*;
use bevy::window::{PrimaryWindow, WindowFocused};
use bevy_egui::EguiContexts;

use crate::canvas::CanvasView;
use crate::common::is_cursor_over_ui;
use crate::ui::DialogState;

use super::controller::{GestureEnd, InteractionController, Tool};
use super::document::{Documents, ImageDocument};

/// Last cursor position seen over the window, in client pixels
#[derive(Resource, Default)]
pub struct PointerTracker {
    pub last_client: Option<Vec2>,
}

/// Drive gestures from the primary mouse button.
///
/// Positions are mapped through a mapper rebuilt from this frame's canvas
/// rectangle; nothing about the rectangle is cached between events.
pub fn handle_pointer_input(
    mouse: Res<ButtonInput<MouseButton>>,
    window_query: Query<&Window, With<PrimaryWindow>>,
    view: Res<CanvasView>,
    mut contexts: EguiContexts,
    mut tracker: ResMut<PointerTracker>,
    mut documents: ResMut<Documents>,
    mut controller: ResMut<InteractionController>,
) {
    let Ok(window) = window_query.single() else {
        return;
    };
    if let Some(cursor) = window.cursor_position() {
        tracker.last_client = Some(cursor);
    }
    let (Some(client), Some(mapper), Some(doc)) =
        (tracker.last_client, view.mapper(), documents.active_mut())
    else {
        return;
    };
    let point = mapper.to_canvas(client);

    if mouse.just_pressed(MouseButton::Left)
        && !controller.is_gesture_active()
        && window.cursor_position().is_some()
        && !is_cursor_over_ui(&mut contexts)
    {
        controller.pointer_down(doc, point);
    }

    if !controller.is_gesture_active() {
        return;
    }
    if primary_released(&mouse) {
        match controller.pointer_up(doc, point) {
            GestureEnd::Committed(id) => debug!("Gesture committed {}", id),
            GestureEnd::Discarded => debug!("Draft discarded"),
            GestureEnd::Unchanged | GestureEnd::Cancelled => {}
        }
    } else {
        controller.pointer_move(doc, point);
    }
}

/// True once the primary button is up. Also true for a release that
/// happened while pointer input was blocked, so no gesture outlives it.
fn primary_released(mouse: &ButtonInput<MouseButton>) -> bool {
    !mouse.pressed(MouseButton::Left)
}

/// Keyboard shortcuts: undo/redo, delete, escape and tool keys
pub fn handle_overlay_shortcuts(
    keyboard: Res<ButtonInput<KeyCode>>,
    mut contexts: EguiContexts,
    mut documents: ResMut<Documents>,
    mut controller: ResMut<InteractionController>,
) {
    // Don't steal keys while typing in a text field
    if let Ok(ctx) = contexts.ctx_mut()
        && ctx.wants_keyboard_input()
    {
        return;
    }
    let Some(doc) = documents.active_mut() else {
        return;
    };

    let ctrl = keyboard.pressed(KeyCode::ControlLeft) || keyboard.pressed(KeyCode::ControlRight);
    let shift = keyboard.pressed(KeyCode::ShiftLeft) || keyboard.pressed(KeyCode::ShiftRight);

    // Ctrl+Y or Ctrl+Shift+Z = redo
    let redo_pressed = (ctrl && keyboard.just_pressed(KeyCode::KeyY))
        || (ctrl && shift && keyboard.just_pressed(KeyCode::KeyZ));

    if redo_pressed {
        controller.redo(doc);
        return;
    }
    if ctrl && keyboard.just_pressed(KeyCode::KeyZ) {
        controller.undo(doc);
        return;
    }
    if ctrl {
        return;
    }

    if keyboard.just_pressed(KeyCode::Escape) {
        if controller.is_gesture_active() {
            controller.cancel(doc);
        } else {
            controller.select(doc, None);
        }
        return;
    }

    if keyboard.any_just_pressed([KeyCode::Delete, KeyCode::Backspace]) {
        controller.delete_selected(doc);
        return;
    }

    if let Some(tool) = Tool::all()
        .iter()
        .find(|tool| keyboard.just_pressed(tool.shortcut()))
    {
        controller.arm_tool(doc, *tool);
    }
}

/// Abort the active gesture when the window loses focus
pub fn cancel_gesture_on_focus_loss(
    mut focus_events: MessageReader<WindowFocused>,
    mut documents: ResMut<Documents>,
    mut controller: ResMut<InteractionController>,
    mut tracker: ResMut<PointerTracker>,
) {
    let lost_focus = focus_events.read().any(|event| !event.focused);
    if !lost_focus {
        return;
    }
    tracker.last_client = None;
    if let Some(doc) = documents.active_mut()
        && controller.cancel(doc) == GestureEnd::Cancelled
    {
        info!("Gesture cancelled: window lost focus");
    }
}

/// Abort the active gesture as soon as a modal dialog blocks pointer input
pub fn cancel_gesture_on_modal(
    dialog_state: Res<DialogState>,
    mut documents: ResMut<Documents>,
    mut controller: ResMut<InteractionController>,
) {
    let Some(doc) = documents.active_mut() else {
        return;
    };
    if interrupt_gesture(&mut controller, doc, dialog_state.any_modal_open) {
        info!("Gesture cancelled: dialog opened");
    }
}

fn interrupt_gesture(
    controller: &mut InteractionController,
    doc: &mut ImageDocument,
    modal_open: bool,
) -> bool {
    modal_open && controller.cancel(doc) == GestureEnd::Cancelled
}

/// Set the window cursor from what a click would do at the pointer
pub fn update_pointer_cursor(
    mut commands: Commands,
    window_query: Query<(Entity, &Window), With<PrimaryWindow>>,
    view: Res<CanvasView>,
    documents: Res<Documents>,
    controller: Res<InteractionController>,
    mut contexts: EguiContexts,
) {
    let Ok((entity, window)) = window_query.single() else {
        return;
    };

    // Use default cursor over UI
    if !controller.is_gesture_active() && is_cursor_over_ui(&mut contexts) {
        commands
            .entity(entity)
            .insert(crate::common::default_cursor());
        return;
    }

    let hint = match (window.cursor_position(), view.mapper(), documents.active()) {
        (Some(cursor), Some(mapper), Some(doc)) => {
            controller.hover_hint(doc, mapper.to_canvas(cursor))
        }
        _ => Default::default(),
    };
    commands
        .entity(entity)
        .insert(crate::common::cursor_for_hint(hint));
}
