//! Vector annotation overlay: data model, geometry, store, history and the
//! gesture state machine, plus the Bevy systems that host them.
//!
//! ## Control flow
//!
//! pointer event → [`input`] maps the client position through a fresh
//! [`CoordinateMapper`] → [`InteractionController`] resolves the gesture,
//! hit-tests with [`geometry`] and mutates the active document's
//! [`AnnotationStore`], recording [`HistoryManager`] snapshots at gesture
//! boundaries → [`painting`] draws the store plus any draft every frame.
//!
//! ## Module Structure
//!
//! - [`annotation`] - Annotation records, variants and style defaults
//! - [`coords`] - Client to canonical coordinate conversion
//! - [`geometry`] - Hit testing and arrowhead geometry
//! - [`store`] - Ordered annotation list for one image
//! - [`history`] - Snapshot undo/redo
//! - [`controller`] - Gesture state machine
//! - [`document`] - Per-image documents
//! - [`render`] - Scene primitives in client space
//! - [`suggestions`] - Append-only merge of suggested annotations

pub mod annotation;
pub mod controller;
pub mod coords;
pub mod document;
pub mod geometry;
pub mod history;
mod input;
mod painting;
pub mod render;
pub mod store;
pub mod suggestions;

pub use annotation::{Annotation, AnnotationId, AnnotationKind, StyleDefaults};
pub use controller::{AnnotationEdit, GestureEnd, InteractionController, PointerHint, Tool};
pub use coords::{ClientRect, CoordinateMapper};
pub use document::{Documents, ImageDocument, ImageInfo};
pub use history::HistoryManager;
pub use store::AnnotationStore;

use bevy::prelude::*;
use bevy_egui::EguiPrimaryContextPass;

use crate::canvas::CanvasViewUpdated;
use crate::ui::no_dialog_open;

/// Overlay input systems (other plugins order against this)
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub struct OverlayInput;

pub struct OverlayPlugin;

impl Plugin for OverlayPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<InteractionController>()
            .init_resource::<Documents>()
            .init_resource::<input::PointerTracker>()
            .add_systems(
                Update,
                (
                    input::cancel_gesture_on_focus_loss,
                    input::cancel_gesture_on_modal,
                    (input::handle_overlay_shortcuts, input::handle_pointer_input)
                        .chain()
                        .run_if(no_dialog_open),
                    input::update_pointer_cursor,
                )
                    .chain()
                    .in_set(OverlayInput)
                    .after(CanvasViewUpdated),
            )
            .add_systems(EguiPrimaryContextPass, painting::paint_overlay);
    }
}
