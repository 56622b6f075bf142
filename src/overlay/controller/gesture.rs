//! Gesture sessions: one pointer-down → move → up interaction.

use bevy::prelude::*;

use crate::overlay::annotation::{Annotation, AnnotationId};
use crate::overlay::geometry::ArrowEndpoint;

/// An in-progress gesture and the data captured when it began
#[derive(Clone, Debug, PartialEq)]
pub enum Gesture {
    /// Render-only arrow draft; nothing is in the store yet
    DrawingArrow { start: Vec2, current: Vec2 },
    /// Render-only highlight draft spanning `start`..`current`
    DrawingHighlight { start: Vec2, current: Vec2 },
    /// `offset` is pointer minus annotation anchor at pointer-down
    Dragging { id: AnnotationId, offset: Vec2 },
    ResizingBox {
        id: AnnotationId,
        start_pointer: Vec2,
        start_size: Vec2,
    },
    ResizingEndpoint { id: AnnotationId, which: ArrowEndpoint },
}

/// Owns everything a gesture acquired at pointer-down.
///
/// The controller keeps at most one session and takes it out of its slot on
/// every exit path (release, cancel, tool switch, undo), so the pre-gesture
/// state is consumed exactly once.
#[derive(Clone, Debug)]
pub(crate) struct GestureSession {
    pub gesture: Gesture,
    /// List as it was before the gesture, for cancellation and no-op detection
    pub before: Option<Vec<Annotation>>,
}

impl GestureSession {
    pub fn drawing(gesture: Gesture) -> Self {
        Self {
            gesture,
            before: None,
        }
    }

    pub fn editing(gesture: Gesture, before: Vec<Annotation>) -> Self {
        Self {
            gesture,
            before: Some(before),
        }
    }
}

/// Uncommitted creation shown while the pointer is held
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Draft {
    Arrow { start: Vec2, end: Vec2 },
    /// Normalized box; may be below the minimum until committed
    Highlight { min: Vec2, size: Vec2 },
}

/// Normalized box spanned by two drag corners
pub fn drag_box(a: Vec2, b: Vec2) -> (Vec2, Vec2) {
    let min = a.min(b);
    (min, a.max(b) - min)
}

/// How a gesture ended
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GestureEnd {
    /// A new or modified annotation is in the store
    Committed(AnnotationId),
    /// A draft was dropped without touching the store (zero-length arrow)
    Discarded,
    /// No gesture was active, or it left the list exactly as it was
    Unchanged,
    /// The gesture was aborted and the pre-gesture list restored
    Cancelled,
}

/// What a pointer-down at a given point would do; drives the cursor
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum PointerHint {
    #[default]
    None,
    Move,
    Moving,
    ResizeBox,
    MoveEndpoint,
    Draw,
    PlaceText,
}
