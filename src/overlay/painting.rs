//! Paints the overlay scene with egui, behind every egui window.

use bevy::color::Srgba;
use bevy::prelude::*;
use bevy_egui::{EguiContexts, egui};

use crate::canvas::CanvasView;

use super::controller::InteractionController;
use super::document::Documents;
use super::render::{Primitive, SELECTION_COLOR, build_scene};

fn to_color32(color: Srgba) -> egui::Color32 {
    egui::Color32::from_rgba_unmultiplied(
        (color.red * 255.0) as u8,
        (color.green * 255.0) as u8,
        (color.blue * 255.0) as u8,
        (color.alpha * 255.0) as u8,
    )
}

fn to_pos(point: Vec2) -> egui::Pos2 {
    egui::pos2(point.x, point.y)
}

fn paint(painter: &egui::Painter, primitive: Primitive) {
    match primitive {
        Primitive::Fill { points, color } => {
            painter.add(egui::Shape::convex_polygon(
                points.into_iter().map(to_pos).collect(),
                to_color32(color),
                egui::Stroke::NONE,
            ));
        }
        Primitive::Outline {
            points,
            width,
            color,
        } => {
            painter.add(egui::Shape::closed_line(
                points.into_iter().map(to_pos).collect(),
                egui::Stroke::new(width, to_color32(color)),
            ));
        }
        Primitive::Segment {
            from,
            to,
            width,
            color,
        } => {
            painter.line_segment(
                [to_pos(from), to_pos(to)],
                egui::Stroke::new(width, to_color32(color)),
            );
        }
        Primitive::Label {
            min,
            size,
            text,
            font_size,
            color,
            background,
            border,
        } => {
            let rect = egui::Rect::from_min_size(to_pos(min), egui::vec2(size.x, size.y));
            painter.rect_filled(rect, 4.0, to_color32(background));
            painter.add(egui::Shape::closed_line(
                vec![
                    rect.left_top(),
                    rect.right_top(),
                    rect.right_bottom(),
                    rect.left_bottom(),
                ],
                egui::Stroke::new(1.0, to_color32(border)),
            ));
            let galley = painter.layout(
                text,
                egui::FontId::proportional(font_size.max(1.0)),
                to_color32(color),
                (rect.width() - 8.0).max(1.0),
            );
            painter
                .with_clip_rect(rect)
                .galley(rect.left_top() + egui::vec2(4.0, 4.0), galley, to_color32(color));
        }
        Primitive::Handle { center, radius } => {
            painter.circle_filled(to_pos(center), radius, egui::Color32::WHITE);
            painter.circle_stroke(
                to_pos(center),
                radius,
                egui::Stroke::new(2.0, to_color32(SELECTION_COLOR)),
            );
        }
    }
}

/// Render the active document's annotations, selection and draft
pub fn paint_overlay(
    mut contexts: EguiContexts,
    view: Res<CanvasView>,
    documents: Res<Documents>,
    controller: Res<InteractionController>,
) -> Result {
    let ctx = contexts.ctx_mut()?;
    let (Some(mapper), Some(doc)) = (view.mapper(), documents.active()) else {
        return Ok(());
    };

    let draft = controller.draft();
    let scene = build_scene(
        doc.annotations(),
        controller.selection(),
        draft.as_ref(),
        &controller.style,
        &mapper,
    );

    let painter = ctx.layer_painter(egui::LayerId::background());
    for primitive in scene {
        paint(&painter, primitive);
    }
    Ok(())
}
