//! Pointer-gesture state machine over an [`ImageDocument`].
//!
//! The controller turns canonical pointer positions into store mutations.
//! It holds the armed tool, the selection and at most one gesture session;
//! the annotation list and its history live in the document it is handed.
//!
//! ## Snapshot points
//!
//! - Text placement, arrow/highlight commit, delete, property edits: one
//!   snapshot immediately before the mutation.
//! - Drag and resize: one snapshot at pointer-down. Moves mutate the store
//!   without snapshots. A gesture that ends with the list unchanged, or is
//!   cancelled, withdraws its snapshot.
//!
//! ## Module Structure
//!
//! - [`gesture`] - Gesture sessions, drafts and gesture outcomes
//! - [`edits`] - Property edits applied through the controller

mod edits;
mod gesture;

#[cfg(test)]
mod tests;

use std::mem::Discriminant;

use bevy::prelude::*;

pub use edits::AnnotationEdit;
pub use gesture::{Draft, Gesture, GestureEnd, PointerHint, drag_box};
use gesture::GestureSession;

use crate::constants::{DEFAULT_HIGHLIGHT_HEIGHT, DEFAULT_HIGHLIGHT_WIDTH};

use super::annotation::{Annotation, AnnotationId, AnnotationKind, StyleDefaults};
use super::document::ImageDocument;
use super::geometry::{ArrowEndpoint, Handle, handle_at, topmost_hit};

/// Creation tool armed for the next pointer-down on empty canvas
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tool {
    /// Nothing armed; clicks select, drag and resize
    #[default]
    Select,
    Text,
    Arrow,
    Highlight,
}

impl Tool {
    pub fn display_name(&self) -> &'static str {
        match self {
            Tool::Select => "Select (V)",
            Tool::Text => "Text (T)",
            Tool::Arrow => "Arrow (A)",
            Tool::Highlight => "Highlight (H)",
        }
    }

    pub fn all() -> &'static [Tool] {
        &[Tool::Select, Tool::Text, Tool::Arrow, Tool::Highlight]
    }

    pub fn shortcut(&self) -> KeyCode {
        match self {
            Tool::Select => KeyCode::KeyV,
            Tool::Text => KeyCode::KeyT,
            Tool::Arrow => KeyCode::KeyA,
            Tool::Highlight => KeyCode::KeyH,
        }
    }

    pub fn is_creation_tool(&self) -> bool {
        !matches!(self, Tool::Select)
    }
}

/// Observable controller state
#[derive(Clone, Debug, PartialEq)]
pub enum ControllerState {
    Idle,
    ToolArmed(Tool),
    DrawingArrow {
        start: Vec2,
        current: Vec2,
    },
    DrawingHighlight {
        start: Vec2,
        current: Vec2,
    },
    DraggingAnnotation {
        id: AnnotationId,
        offset: Vec2,
    },
    ResizingBox {
        id: AnnotationId,
        start_pointer: Vec2,
        start_width: f32,
        start_height: f32,
    },
    ResizingArrowEndpoint {
        id: AnnotationId,
        which: ArrowEndpoint,
    },
}

#[derive(Resource, Default)]
pub struct InteractionController {
    tool: Tool,
    selection: Option<AnnotationId>,
    session: Option<GestureSession>,
    /// Annotation and property whose coalesced edit session is open
    editing: Option<(AnnotationId, Discriminant<AnnotationEdit>)>,
    /// Styling for new annotations
    pub style: StyleDefaults,
    /// Stay on the creation tool after a creation gesture
    pub keep_tool_armed: bool,
}

impl InteractionController {
    pub fn tool(&self) -> Tool {
        self.tool
    }

    pub fn selection(&self) -> Option<&str> {
        self.selection.as_deref()
    }

    pub fn is_gesture_active(&self) -> bool {
        self.session.is_some()
    }

    pub fn state(&self) -> ControllerState {
        let Some(session) = &self.session else {
            return if self.tool.is_creation_tool() {
                ControllerState::ToolArmed(self.tool)
            } else {
                ControllerState::Idle
            };
        };
        match session.gesture.clone() {
            Gesture::DrawingArrow { start, current } => {
                ControllerState::DrawingArrow { start, current }
            }
            Gesture::DrawingHighlight { start, current } => {
                ControllerState::DrawingHighlight { start, current }
            }
            Gesture::Dragging { id, offset } => ControllerState::DraggingAnnotation { id, offset },
            Gesture::ResizingBox {
                id,
                start_pointer,
                start_size,
            } => ControllerState::ResizingBox {
                id,
                start_pointer,
                start_width: start_size.x,
                start_height: start_size.y,
            },
            Gesture::ResizingEndpoint { id, which } => {
                ControllerState::ResizingArrowEndpoint { id, which }
            }
        }
    }

    /// The render-only draft of an in-progress creation
    pub fn draft(&self) -> Option<Draft> {
        match self.session.as_ref()?.gesture {
            Gesture::DrawingArrow { start, current } => Some(Draft::Arrow {
                start,
                end: current,
            }),
            Gesture::DrawingHighlight { start, current } => {
                let (min, size) = drag_box(start, current);
                Some(Draft::Highlight { min, size })
            }
            _ => None,
        }
    }

    /// Arm a creation tool (or disarm with `Tool::Select`). Switching tools
    /// mid-gesture cancels the gesture.
    pub fn arm_tool(&mut self, doc: &mut ImageDocument, tool: Tool) {
        if tool == self.tool {
            return;
        }
        self.cancel(doc);
        if tool.is_creation_tool() {
            self.selection = None;
        }
        self.tool = tool;
    }

    /// Select an annotation directly (e.g. from a list). Unknown ids clear
    /// the selection.
    pub fn select(&mut self, doc: &ImageDocument, id: Option<&str>) {
        self.end_edit();
        self.selection = id
            .filter(|id| doc.store.contains(id))
            .map(str::to_string);
    }

    /// Forget per-document state; call when another image becomes active
    pub fn reset(&mut self, doc: &mut ImageDocument) {
        self.cancel(doc);
        self.end_edit();
        self.selection = None;
    }

    /// Begin a gesture at canonical `point`.
    ///
    /// Returns the selected annotation afterwards. Ignored while another
    /// gesture is active.
    pub fn pointer_down(&mut self, doc: &mut ImageDocument, point: Vec2) -> Option<AnnotationId> {
        if self.session.is_some() {
            return self.selection.clone();
        }
        self.end_edit();

        // Handles of the selected annotation sit above every body
        if let Some(selected) = self.selected_annotation(doc)
            && let Some(handle) = handle_at(selected, point)
        {
            let id = selected.id.clone();
            let gesture = match handle {
                Handle::Resize => Gesture::ResizingBox {
                    id,
                    start_pointer: point,
                    start_size: selected.box_size().unwrap_or_default(),
                },
                Handle::Endpoint(which) => Gesture::ResizingEndpoint { id, which },
            };
            self.begin_editing_gesture(doc, gesture);
            return self.selection.clone();
        }

        if let Some(hit) = topmost_hit(doc.store.list(), point) {
            let id = hit.id.clone();
            let offset = point - hit.anchor();
            self.selection = Some(id.clone());
            self.begin_editing_gesture(doc, Gesture::Dragging { id, offset });
            return self.selection.clone();
        }

        match self.tool {
            Tool::Select => self.selection = None,
            Tool::Text => {
                let annotation = Annotation::new(self.style.text_label(point), doc.store.next_z_index());
                let id = self.commit_new(doc, annotation);
                self.selection = id;
                self.after_creation();
            }
            Tool::Arrow => {
                self.selection = None;
                self.session = Some(GestureSession::drawing(Gesture::DrawingArrow {
                    start: point,
                    current: point,
                }));
            }
            Tool::Highlight => {
                self.selection = None;
                self.session = Some(GestureSession::drawing(Gesture::DrawingHighlight {
                    start: point,
                    current: point,
                }));
            }
        }
        self.selection.clone()
    }

    /// Continue the active gesture at canonical `point`
    pub fn pointer_move(&mut self, doc: &mut ImageDocument, point: Vec2) {
        let Some(session) = self.session.as_mut() else {
            return;
        };

        let id = match &mut session.gesture {
            Gesture::DrawingArrow { current, .. } | Gesture::DrawingHighlight { current, .. } => {
                *current = point;
                return;
            }
            Gesture::Dragging { id, .. }
            | Gesture::ResizingBox { id, .. }
            | Gesture::ResizingEndpoint { id, .. } => id.clone(),
        };

        // Unknown ids (removed mid-gesture) are a no-op
        let Some(existing) = doc.store.get(&id) else {
            return;
        };
        let mut updated = existing.clone();
        match &session.gesture {
            Gesture::Dragging { offset, .. } => updated.set_anchor(point - *offset),
            Gesture::ResizingBox {
                start_pointer,
                start_size,
                ..
            } => updated.set_box_size(*start_size + (point - *start_pointer)),
            Gesture::ResizingEndpoint { which, .. } => {
                if let AnnotationKind::Arrow(arrow) = &mut updated.kind {
                    match which {
                        ArrowEndpoint::Start => arrow.set_start(point),
                        ArrowEndpoint::End => arrow.set_end(point),
                    }
                    // An endpoint dropped on the other one keeps its last position
                    if arrow.is_degenerate() {
                        return;
                    }
                }
            }
            Gesture::DrawingArrow { .. } | Gesture::DrawingHighlight { .. } => {}
        }

        if updated.kind != existing.kind {
            updated.touch();
            if doc.store.upsert(updated) {
                doc.mark_changed();
            }
        }
    }

    /// Finish the active gesture at canonical `point`
    pub fn pointer_up(&mut self, doc: &mut ImageDocument, point: Vec2) -> GestureEnd {
        self.pointer_move(doc, point);
        let Some(session) = self.session.take() else {
            return GestureEnd::Unchanged;
        };

        match session.gesture {
            Gesture::DrawingArrow { start, current } => {
                if start == current {
                    return GestureEnd::Discarded;
                }
                let annotation = Annotation::new(self.style.arrow(start, current), doc.store.next_z_index());
                self.finish_creation(doc, annotation)
            }
            Gesture::DrawingHighlight { start, current } => {
                let (min, size) = if start == current {
                    (
                        start,
                        Vec2::new(DEFAULT_HIGHLIGHT_WIDTH, DEFAULT_HIGHLIGHT_HEIGHT),
                    )
                } else {
                    drag_box(start, current)
                };
                let annotation = Annotation::new(self.style.highlight(min, size), doc.store.next_z_index());
                self.finish_creation(doc, annotation)
            }
            Gesture::Dragging { id, .. }
            | Gesture::ResizingBox { id, .. }
            | Gesture::ResizingEndpoint { id, .. } => {
                if session.before.as_deref() == Some(doc.store.list()) {
                    doc.history.discard_latest();
                    GestureEnd::Unchanged
                } else {
                    debug!("Gesture on {} committed", id);
                    GestureEnd::Committed(id)
                }
            }
        }
    }

    /// Abort the active gesture without committing anything.
    ///
    /// Drafts are dropped; edits made by a drag or resize are rolled back
    /// and the gesture-start snapshot withdrawn.
    pub fn cancel(&mut self, doc: &mut ImageDocument) -> GestureEnd {
        let Some(session) = self.session.take() else {
            return GestureEnd::Unchanged;
        };
        if let Some(before) = session.before {
            if before.as_slice() != doc.store.list() {
                doc.store.restore(before);
                doc.mark_changed();
            }
            doc.history.discard_latest();
        }
        debug!("Gesture cancelled");
        GestureEnd::Cancelled
    }

    /// Remove the selected annotation. No-op without a (live) selection.
    pub fn delete_selected(&mut self, doc: &mut ImageDocument) -> bool {
        self.cancel(doc);
        self.end_edit();
        let Some(id) = self.selection.take() else {
            return false;
        };
        if !doc.store.contains(&id) {
            return false;
        }
        doc.record_snapshot();
        doc.store.remove(&id);
        doc.mark_changed();
        info!("Deleted annotation {}", id);
        true
    }

    /// Apply a discrete property edit: one snapshot, then the change.
    ///
    /// Returns false (and records nothing) when the id is unknown, the edit
    /// does not fit the variant, or nothing would change.
    pub fn apply_edit(&mut self, doc: &mut ImageDocument, id: &str, edit: AnnotationEdit) -> bool {
        self.end_edit();
        self.commit_edit(doc, id, &edit)
    }

    /// Continue a coalesced edit (typing, slider drag). The first call for
    /// an annotation and property snapshots like [`Self::apply_edit`]; later
    /// calls for the same pair mutate without snapshots until
    /// [`Self::end_edit`]. Editing another property starts a new step.
    pub fn continue_edit(
        &mut self,
        doc: &mut ImageDocument,
        id: &str,
        edit: AnnotationEdit,
    ) -> bool {
        let key = (id.to_string(), std::mem::discriminant(&edit));
        if self.editing.as_ref() != Some(&key) {
            self.end_edit();
            if !self.commit_edit(doc, id, &edit) {
                return false;
            }
            self.editing = Some(key);
            return true;
        }
        let Some(updated) = self.edited(doc, id, &edit) else {
            return false;
        };
        doc.store.upsert(updated);
        doc.mark_changed();
        true
    }

    fn commit_edit(&self, doc: &mut ImageDocument, id: &str, edit: &AnnotationEdit) -> bool {
        let Some(updated) = self.edited(doc, id, edit) else {
            return false;
        };
        doc.record_snapshot();
        doc.store.upsert(updated);
        doc.mark_changed();
        true
    }

    /// Close the coalesced edit session, if any
    pub fn end_edit(&mut self) {
        self.editing = None;
    }

    pub fn undo(&mut self, doc: &mut ImageDocument) -> bool {
        self.cancel(doc);
        self.end_edit();
        let changed = doc.undo();
        self.drop_stale_selection(doc);
        changed
    }

    pub fn redo(&mut self, doc: &mut ImageDocument) -> bool {
        self.cancel(doc);
        self.end_edit();
        let changed = doc.redo();
        self.drop_stale_selection(doc);
        changed
    }

    /// What a pointer-down at `point` would do
    pub fn hover_hint(&self, doc: &ImageDocument, point: Vec2) -> PointerHint {
        if let Some(session) = &self.session {
            return match session.gesture {
                Gesture::Dragging { .. } => PointerHint::Moving,
                Gesture::ResizingBox { .. } => PointerHint::ResizeBox,
                Gesture::ResizingEndpoint { .. } => PointerHint::MoveEndpoint,
                Gesture::DrawingArrow { .. } | Gesture::DrawingHighlight { .. } => {
                    PointerHint::Draw
                }
            };
        }

        let handle = self
            .selected_annotation(doc)
            .and_then(|selected| handle_at(selected, point));
        match handle {
            Some(Handle::Resize) => return PointerHint::ResizeBox,
            Some(Handle::Endpoint(_)) => return PointerHint::MoveEndpoint,
            None => {}
        }
        if topmost_hit(doc.store.list(), point).is_some() {
            return PointerHint::Move;
        }
        match self.tool {
            Tool::Select => PointerHint::None,
            Tool::Text => PointerHint::PlaceText,
            Tool::Arrow | Tool::Highlight => PointerHint::Draw,
        }
    }

    fn selected_annotation<'a>(&self, doc: &'a ImageDocument) -> Option<&'a Annotation> {
        doc.store.get(self.selection.as_deref()?)
    }

    fn begin_editing_gesture(&mut self, doc: &mut ImageDocument, gesture: Gesture) {
        let before = doc.store.list().to_vec();
        doc.record_snapshot();
        self.session = Some(GestureSession::editing(gesture, before));
    }

    /// Snapshot then insert a brand-new annotation
    fn commit_new(&mut self, doc: &mut ImageDocument, annotation: Annotation) -> Option<AnnotationId> {
        let id = annotation.id.clone();
        let kind = annotation.type_name();
        doc.record_snapshot();
        if !doc.store.upsert(annotation) {
            doc.history.discard_latest();
            return None;
        }
        doc.mark_changed();
        info!("Created {} annotation {}", kind, id);
        Some(id)
    }

    fn finish_creation(&mut self, doc: &mut ImageDocument, annotation: Annotation) -> GestureEnd {
        let result = match self.commit_new(doc, annotation) {
            Some(id) => {
                self.selection = Some(id.clone());
                GestureEnd::Committed(id)
            }
            None => GestureEnd::Discarded,
        };
        self.after_creation();
        result
    }

    fn after_creation(&mut self) {
        if !self.keep_tool_armed {
            self.tool = Tool::Select;
        }
    }

    /// The edited copy of `id`, or `None` if the edit changes nothing
    fn edited(&self, doc: &ImageDocument, id: &str, edit: &AnnotationEdit) -> Option<Annotation> {
        if self.session.is_some() {
            return None;
        }
        let existing = doc.store.get(id)?;
        let mut updated = existing.clone();
        if !edit.apply(&mut updated) || !updated.sanitize() || updated.kind == existing.kind {
            return None;
        }
        updated.touch();
        Some(updated)
    }

    fn drop_stale_selection(&mut self, doc: &ImageDocument) {
        if let Some(id) = &self.selection
            && !doc.store.contains(id)
        {
            self.selection = None;
        }
    }
}
