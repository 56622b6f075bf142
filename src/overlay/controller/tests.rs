//! Unit tests for the interaction controller.

use std::path::PathBuf;

use bevy::prelude::*;

use super::*;
use crate::overlay::annotation::{ArrowDirection, LabelBackground};
use crate::overlay::coords::{ClientRect, client_to_canvas};
use crate::overlay::document::ImageInfo;

fn document() -> ImageDocument {
    ImageDocument::new(
        ImageInfo {
            id: "photo".to_string(),
            path: PathBuf::from("photo.png"),
            width: 800,
            height: 600,
        },
        20,
    )
}

fn armed(tool: Tool, doc: &mut ImageDocument) -> InteractionController {
    let mut controller = InteractionController::default();
    controller.arm_tool(doc, tool);
    controller
}

fn click(controller: &mut InteractionController, doc: &mut ImageDocument, point: Vec2) -> GestureEnd {
    controller.pointer_down(doc, point);
    controller.pointer_up(doc, point)
}

fn drag(
    controller: &mut InteractionController,
    doc: &mut ImageDocument,
    from: Vec2,
    to: Vec2,
) -> GestureEnd {
    controller.pointer_down(doc, from);
    controller.pointer_move(doc, from.lerp(to, 0.5));
    controller.pointer_move(doc, to);
    controller.pointer_up(doc, to)
}

#[test]
fn test_text_created_at_canonical_pointer() {
    let mut doc = document();
    let mut controller = armed(Tool::Text, &mut doc);

    let rect = ClientRect::new(Vec2::new(20.0, 10.0), Vec2::new(800.0, 600.0));
    let point = client_to_canvas(Vec2::new(100.0, 50.0), rect, None);
    let id = controller.pointer_down(&mut doc, point).unwrap();

    let annotation = doc.store.get(&id).unwrap();
    assert_eq!(annotation.type_name(), "text");
    assert_eq!(annotation.anchor(), Vec2::new(80.0, 40.0));
    assert_eq!(controller.selection(), Some(id.as_str()));
    assert_eq!(doc.history.undo_count(), 1);
    assert_eq!(controller.state(), ControllerState::Idle);
}

#[test]
fn test_arrow_drawn_by_drag_is_committed() {
    let mut doc = document();
    let mut controller = armed(Tool::Arrow, &mut doc);

    controller.pointer_down(&mut doc, Vec2::ZERO);
    controller.pointer_move(&mut doc, Vec2::new(60.0, 0.0));
    assert!(doc.store.is_empty());
    assert_eq!(
        controller.draft(),
        Some(Draft::Arrow {
            start: Vec2::ZERO,
            end: Vec2::new(60.0, 0.0)
        })
    );

    let end = controller.pointer_up(&mut doc, Vec2::new(100.0, 0.0));
    let GestureEnd::Committed(id) = end else {
        panic!("expected commit, got {end:?}");
    };
    let AnnotationKind::Arrow(arrow) = &doc.store.get(&id).unwrap().kind else {
        panic!("expected arrow");
    };
    assert_eq!(arrow.end(), Vec2::new(100.0, 0.0));
    assert_eq!(doc.history.undo_count(), 1);
    assert!(controller.draft().is_none());
    assert_eq!(controller.tool(), Tool::Select);
}

#[test]
fn test_degenerate_arrow_never_added() {
    let mut doc = document();
    let mut controller = armed(Tool::Arrow, &mut doc);

    let end = click(&mut controller, &mut doc, Vec2::new(5.0, 5.0));
    assert_eq!(end, GestureEnd::Discarded);
    assert!(doc.store.is_empty());
    assert!(!doc.history.can_undo());
}

#[test]
fn test_highlight_click_places_default_box() {
    let mut doc = document();
    let mut controller = armed(Tool::Highlight, &mut doc);

    let GestureEnd::Committed(id) = click(&mut controller, &mut doc, Vec2::new(10.0, 20.0)) else {
        panic!("expected commit");
    };
    let annotation = doc.store.get(&id).unwrap();
    assert_eq!(annotation.anchor(), Vec2::new(10.0, 20.0));
    assert_eq!(annotation.box_size(), Some(Vec2::new(100.0, 30.0)));
}

#[test]
fn test_highlight_drag_is_normalized() {
    let mut doc = document();
    let mut controller = armed(Tool::Highlight, &mut doc);

    let GestureEnd::Committed(id) = drag(
        &mut controller,
        &mut doc,
        Vec2::new(120.0, 90.0),
        Vec2::new(20.0, 40.0),
    ) else {
        panic!("expected commit");
    };
    let annotation = doc.store.get(&id).unwrap();
    assert_eq!(annotation.anchor(), Vec2::new(20.0, 40.0));
    assert_eq!(annotation.box_size(), Some(Vec2::new(100.0, 50.0)));
}

#[test]
fn test_resize_clamps_to_text_minimum() {
    let mut doc = document();
    let mut controller = armed(Tool::Text, &mut doc);
    let id = controller.pointer_down(&mut doc, Vec2::ZERO).unwrap();
    controller.pointer_up(&mut doc, Vec2::ZERO);

    // Default label is 180x48; grab the bottom-right handle
    controller.pointer_down(&mut doc, Vec2::new(170.0, 40.0));
    assert!(matches!(
        controller.state(),
        ControllerState::ResizingBox { .. }
    ));
    // Pointer delta of (-140, -38) would give 40x10
    controller.pointer_move(&mut doc, Vec2::new(30.0, 2.0));
    assert_eq!(
        doc.store.get(&id).unwrap().box_size(),
        Some(Vec2::new(60.0, 24.0))
    );

    let end = controller.pointer_up(&mut doc, Vec2::new(30.0, 2.0));
    assert_eq!(end, GestureEnd::Committed(id));
}

#[test]
fn test_drag_snapshots_once() {
    let mut doc = document();
    let mut controller = armed(Tool::Text, &mut doc);
    let id = controller.pointer_down(&mut doc, Vec2::new(80.0, 40.0)).unwrap();
    controller.pointer_up(&mut doc, Vec2::new(80.0, 40.0));
    assert_eq!(doc.history.undo_count(), 1);

    controller.pointer_down(&mut doc, Vec2::new(100.0, 50.0));
    assert_eq!(
        controller.state(),
        ControllerState::DraggingAnnotation {
            id: id.clone(),
            offset: Vec2::new(20.0, 10.0)
        }
    );
    for step in 1..=10 {
        controller.pointer_move(&mut doc, Vec2::new(100.0 + step as f32 * 10.0, 50.0));
    }
    controller.pointer_up(&mut doc, Vec2::new(200.0, 100.0));

    assert_eq!(doc.history.undo_count(), 2);
    assert_eq!(doc.store.get(&id).unwrap().anchor(), Vec2::new(180.0, 90.0));

    assert!(controller.undo(&mut doc));
    assert_eq!(doc.store.get(&id).unwrap().anchor(), Vec2::new(80.0, 40.0));
}

#[test]
fn test_click_without_move_leaves_history_alone() {
    let mut doc = document();
    let mut controller = armed(Tool::Text, &mut doc);
    controller.pointer_down(&mut doc, Vec2::new(80.0, 40.0));
    controller.pointer_up(&mut doc, Vec2::new(80.0, 40.0));

    let end = click(&mut controller, &mut doc, Vec2::new(100.0, 50.0));
    assert_eq!(end, GestureEnd::Unchanged);
    assert_eq!(doc.history.undo_count(), 1);
}

#[test]
fn test_cancel_restores_pre_gesture_list() {
    let mut doc = document();
    let mut controller = armed(Tool::Text, &mut doc);
    let id = controller.pointer_down(&mut doc, Vec2::new(80.0, 40.0)).unwrap();
    controller.pointer_up(&mut doc, Vec2::new(80.0, 40.0));
    let before = doc.store.clone();

    controller.pointer_down(&mut doc, Vec2::new(100.0, 50.0));
    controller.pointer_move(&mut doc, Vec2::new(300.0, 300.0));
    assert_ne!(doc.store, before);

    assert_eq!(controller.cancel(&mut doc), GestureEnd::Cancelled);
    assert_eq!(doc.store, before);
    assert_eq!(doc.history.undo_count(), 1);
    assert_eq!(controller.state(), ControllerState::Idle);
    assert_eq!(controller.selection(), Some(id.as_str()));

    // Releasing afterwards does nothing
    assert_eq!(
        controller.pointer_up(&mut doc, Vec2::new(300.0, 300.0)),
        GestureEnd::Unchanged
    );
}

#[test]
fn test_switching_tool_cancels_draft() {
    let mut doc = document();
    let mut controller = armed(Tool::Arrow, &mut doc);
    controller.pointer_down(&mut doc, Vec2::ZERO);
    controller.pointer_move(&mut doc, Vec2::new(50.0, 50.0));

    controller.arm_tool(&mut doc, Tool::Highlight);
    assert!(controller.draft().is_none());
    assert_eq!(controller.state(), ControllerState::ToolArmed(Tool::Highlight));
    assert!(doc.store.is_empty());
}

#[test]
fn test_keep_tool_armed() {
    let mut doc = document();
    let mut controller = armed(Tool::Text, &mut doc);
    controller.keep_tool_armed = true;

    click(&mut controller, &mut doc, Vec2::new(0.0, 0.0));
    click(&mut controller, &mut doc, Vec2::new(300.0, 300.0));
    assert_eq!(doc.store.len(), 2);
    assert_eq!(controller.tool(), Tool::Text);
}

#[test]
fn test_empty_click_clears_selection() {
    let mut doc = document();
    let mut controller = armed(Tool::Text, &mut doc);
    click(&mut controller, &mut doc, Vec2::ZERO);
    assert!(controller.selection().is_some());

    click(&mut controller, &mut doc, Vec2::new(500.0, 500.0));
    assert!(controller.selection().is_none());
    assert_eq!(doc.store.len(), 1);
}

#[test]
fn test_delete_twice_is_noop() {
    let mut doc = document();
    let mut controller = armed(Tool::Text, &mut doc);
    click(&mut controller, &mut doc, Vec2::ZERO);

    assert!(controller.delete_selected(&mut doc));
    assert!(doc.store.is_empty());
    assert!(controller.selection().is_none());
    let depth = doc.history.undo_count();

    assert!(!controller.delete_selected(&mut doc));
    assert_eq!(doc.history.undo_count(), depth);
}

#[test]
fn test_arrow_above_highlight_is_picked() {
    let mut doc = document();
    let mut controller = InteractionController::default();
    let style = StyleDefaults::default();

    doc.store.upsert(Annotation::new(
        style.highlight(Vec2::ZERO, Vec2::new(200.0, 200.0)),
        doc.store.next_z_index(),
    ));
    let arrow = Annotation::new(
        style.arrow(Vec2::new(20.0, 100.0), Vec2::new(180.0, 100.0)),
        doc.store.next_z_index(),
    );
    let arrow_id = arrow.id.clone();
    doc.store.upsert(arrow);

    let selected = controller.pointer_down(&mut doc, Vec2::new(100.0, 101.0));
    assert_eq!(selected, Some(arrow_id));
}

#[test]
fn test_pressing_on_annotation_with_tool_armed_drags_it() {
    let mut doc = document();
    let mut controller = armed(Tool::Highlight, &mut doc);
    drag(&mut controller, &mut doc, Vec2::ZERO, Vec2::new(200.0, 200.0));

    controller.arm_tool(&mut doc, Tool::Arrow);
    controller.pointer_down(&mut doc, Vec2::new(20.0, 100.0));
    assert!(matches!(
        controller.state(),
        ControllerState::DraggingAnnotation { .. }
    ));
    assert!(controller.draft().is_none());
}

#[test]
fn test_endpoint_drag_moves_one_end() {
    let mut doc = document();
    let mut controller = armed(Tool::Arrow, &mut doc);
    let GestureEnd::Committed(id) = drag(&mut controller, &mut doc, Vec2::ZERO, Vec2::new(100.0, 0.0))
    else {
        panic!("expected arrow");
    };

    controller.pointer_down(&mut doc, Vec2::new(100.0, 0.0));
    assert!(matches!(
        controller.state(),
        ControllerState::ResizingArrowEndpoint {
            which: ArrowEndpoint::End,
            ..
        }
    ));
    controller.pointer_up(&mut doc, Vec2::new(100.0, 80.0));

    let AnnotationKind::Arrow(arrow) = &doc.store.get(&id).unwrap().kind else {
        panic!("expected arrow");
    };
    assert_eq!(arrow.start(), Vec2::ZERO);
    assert_eq!(arrow.end(), Vec2::new(100.0, 80.0));
}

#[test]
fn test_endpoint_dropped_on_other_end_keeps_arrow() {
    let mut doc = document();
    let mut controller = armed(Tool::Arrow, &mut doc);
    let GestureEnd::Committed(id) = drag(&mut controller, &mut doc, Vec2::ZERO, Vec2::new(100.0, 0.0))
    else {
        panic!("expected arrow");
    };

    controller.pointer_down(&mut doc, Vec2::new(100.0, 0.0));
    let end = controller.pointer_up(&mut doc, Vec2::ZERO);

    assert_eq!(end, GestureEnd::Unchanged);
    let AnnotationKind::Arrow(arrow) = &doc.store.get(&id).unwrap().kind else {
        panic!("expected arrow");
    };
    assert_eq!(arrow.end(), Vec2::new(100.0, 0.0));
    assert!(!arrow.is_degenerate());
    assert_eq!(doc.history.undo_count(), 1);
}

#[test]
fn test_endpoint_passing_over_other_end_keeps_last_valid_position() {
    let mut doc = document();
    let mut controller = armed(Tool::Arrow, &mut doc);
    let GestureEnd::Committed(id) = drag(&mut controller, &mut doc, Vec2::ZERO, Vec2::new(100.0, 0.0))
    else {
        panic!("expected arrow");
    };

    controller.pointer_down(&mut doc, Vec2::new(100.0, 0.0));
    controller.pointer_move(&mut doc, Vec2::new(40.0, 0.0));
    let end = controller.pointer_up(&mut doc, Vec2::ZERO);

    assert_eq!(end, GestureEnd::Committed(id.clone()));
    let AnnotationKind::Arrow(arrow) = &doc.store.get(&id).unwrap().kind else {
        panic!("expected arrow");
    };
    assert_eq!(arrow.end(), Vec2::new(40.0, 0.0));
}

#[test]
fn test_coalesced_edit_snapshots_once() {
    let mut doc = document();
    let mut controller = armed(Tool::Text, &mut doc);
    let id = controller.pointer_down(&mut doc, Vec2::ZERO).unwrap();
    controller.pointer_up(&mut doc, Vec2::ZERO);

    for body in ["H", "He", "Hel", "Hell", "Hello"] {
        assert!(controller.continue_edit(&mut doc, &id, AnnotationEdit::Text(body.to_string())));
    }
    controller.end_edit();
    assert_eq!(doc.history.undo_count(), 2);

    controller.undo(&mut doc);
    let AnnotationKind::Text(text) = &doc.store.get(&id).unwrap().kind else {
        panic!("expected text");
    };
    assert_eq!(text.text, "Edit me");
}

#[test]
fn test_switching_property_starts_a_new_undo_step() {
    let mut doc = document();
    let mut controller = armed(Tool::Text, &mut doc);
    let id = controller.pointer_down(&mut doc, Vec2::ZERO).unwrap();
    controller.pointer_up(&mut doc, Vec2::ZERO);

    assert!(controller.continue_edit(&mut doc, &id, AnnotationEdit::Text("Hello".to_string())));
    assert!(controller.continue_edit(&mut doc, &id, AnnotationEdit::Color("#ff0000".to_string())));
    assert_eq!(doc.history.undo_count(), 3);

    controller.undo(&mut doc);
    let AnnotationKind::Text(text) = &doc.store.get(&id).unwrap().kind else {
        panic!("expected text");
    };
    assert_eq!(text.text, "Hello");
    assert_eq!(text.color, "#222222");
}

#[test]
fn test_discrete_edit_does_not_absorb_following_edit() {
    let mut doc = document();
    let mut controller = armed(Tool::Text, &mut doc);
    let id = controller.pointer_down(&mut doc, Vec2::ZERO).unwrap();
    controller.pointer_up(&mut doc, Vec2::ZERO);

    assert!(controller.apply_edit(&mut doc, &id, AnnotationEdit::Background(LabelBackground::Black)));
    assert!(controller.continue_edit(&mut doc, &id, AnnotationEdit::FontSize(24.0)));
    assert!(controller.continue_edit(&mut doc, &id, AnnotationEdit::FontSize(28.0)));
    assert_eq!(doc.history.undo_count(), 3);

    controller.undo(&mut doc);
    let AnnotationKind::Text(text) = &doc.store.get(&id).unwrap().kind else {
        panic!("expected text");
    };
    assert_eq!(text.background, LabelBackground::Black);
    assert_eq!(text.font_size, 16.0);
}

#[test]
fn test_edit_that_changes_nothing_records_nothing() {
    let mut doc = document();
    let mut controller = armed(Tool::Text, &mut doc);
    let id = controller.pointer_down(&mut doc, Vec2::ZERO).unwrap();
    controller.pointer_up(&mut doc, Vec2::ZERO);

    assert!(!controller.apply_edit(&mut doc, &id, AnnotationEdit::Text("Edit me".to_string())));
    assert!(!controller.apply_edit(&mut doc, "missing", AnnotationEdit::FontSize(20.0)));
    assert!(!controller.apply_edit(&mut doc, &id, AnnotationEdit::Thickness(4.0)));
    assert_eq!(doc.history.undo_count(), 1);
}

#[test]
fn test_direction_edit_keeps_start() {
    let mut doc = document();
    let mut controller = armed(Tool::Arrow, &mut doc);
    let GestureEnd::Committed(id) = drag(
        &mut controller,
        &mut doc,
        Vec2::new(50.0, 50.0),
        Vec2::new(80.0, 90.0),
    ) else {
        panic!("expected arrow");
    };

    assert!(controller.apply_edit(&mut doc, &id, AnnotationEdit::Direction(ArrowDirection::Left)));
    let AnnotationKind::Arrow(arrow) = &doc.store.get(&id).unwrap().kind else {
        panic!("expected arrow");
    };
    assert_eq!(arrow.start(), Vec2::new(50.0, 50.0));
    assert_eq!(arrow.end(), Vec2::new(0.0, 50.0));
    assert_eq!(doc.history.undo_count(), 2);
}

#[test]
fn test_undo_drops_stale_selection() {
    let mut doc = document();
    let mut controller = armed(Tool::Text, &mut doc);
    click(&mut controller, &mut doc, Vec2::ZERO);

    assert!(controller.undo(&mut doc));
    assert!(doc.store.is_empty());
    assert!(controller.selection().is_none());
    assert!(!controller.undo(&mut doc));
}

#[test]
fn test_undo_n_redo_n_through_gestures() {
    let mut doc = document();
    let mut controller = InteractionController::default();
    let mut states = vec![doc.store.clone()];

    controller.arm_tool(&mut doc, Tool::Text);
    click(&mut controller, &mut doc, Vec2::new(10.0, 10.0));
    states.push(doc.store.clone());

    controller.arm_tool(&mut doc, Tool::Arrow);
    drag(&mut controller, &mut doc, Vec2::new(300.0, 300.0), Vec2::new(400.0, 350.0));
    states.push(doc.store.clone());

    drag(&mut controller, &mut doc, Vec2::new(20.0, 20.0), Vec2::new(60.0, 80.0));
    states.push(doc.store.clone());

    click(&mut controller, &mut doc, Vec2::new(50.0, 70.0));
    controller.delete_selected(&mut doc);
    states.push(doc.store.clone());

    let depth = doc.history.undo_count();
    assert_eq!(depth, states.len() - 1);
    for n in 1..=depth {
        controller.undo(&mut doc);
        assert_eq!(doc.store, states[depth - n]);
    }
    for n in 1..=depth {
        controller.redo(&mut doc);
        assert_eq!(doc.store, states[n]);
    }
}

#[test]
fn test_hover_hints() {
    let mut doc = document();
    let mut controller = InteractionController::default();
    assert_eq!(controller.hover_hint(&doc, Vec2::ZERO), PointerHint::None);

    controller.arm_tool(&mut doc, Tool::Text);
    assert_eq!(controller.hover_hint(&doc, Vec2::ZERO), PointerHint::PlaceText);
    click(&mut controller, &mut doc, Vec2::ZERO);

    assert_eq!(controller.hover_hint(&doc, Vec2::new(10.0, 10.0)), PointerHint::Move);
    assert_eq!(
        controller.hover_hint(&doc, Vec2::new(170.0, 40.0)),
        PointerHint::ResizeBox
    );

    controller.pointer_down(&mut doc, Vec2::new(10.0, 10.0));
    assert_eq!(controller.hover_hint(&doc, Vec2::new(500.0, 500.0)), PointerHint::Moving);
}

#[test]
fn test_tool_display_names_contain_shortcuts() {
    for tool in Tool::all() {
        let name = tool.display_name();
        assert!(name.contains('('), "{name} should list its shortcut");
    }
    assert_eq!(Tool::default(), Tool::Select);
    assert!(!Tool::Select.is_creation_tool());
}
