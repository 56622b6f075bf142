//! Common helpers shared by the overlay and UI modules.

use bevy::window::{CursorIcon, SystemCursorIcon};
use bevy_egui::EguiContexts;

use crate::overlay::PointerHint;

/// Get the appropriate cursor icon for what a click would do.
pub fn cursor_for_hint(hint: PointerHint) -> CursorIcon {
    let icon = match hint {
        PointerHint::None => SystemCursorIcon::Default,
        PointerHint::Move => SystemCursorIcon::Move,
        PointerHint::Moving => SystemCursorIcon::Grabbing,
        PointerHint::ResizeBox => SystemCursorIcon::NwseResize,
        PointerHint::MoveEndpoint => SystemCursorIcon::Grab,
        PointerHint::Draw => SystemCursorIcon::Crosshair,
        PointerHint::PlaceText => SystemCursorIcon::Text,
    };
    CursorIcon::System(icon)
}

pub fn default_cursor() -> CursorIcon {
    CursorIcon::System(SystemCursorIcon::Default)
}

/// Check if the cursor is over egui UI
pub fn is_cursor_over_ui(contexts: &mut EguiContexts) -> bool {
    contexts
        .ctx_mut()
        .map(|ctx| ctx.is_pointer_over_area())
        .unwrap_or(false)
}
