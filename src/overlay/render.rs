//! Scene building: turns the annotation list, selection and draft into
//! flat paint primitives in client (screen) space.
//!
//! Primitives are emitted in paint order, so a painter that draws them
//! front to back reproduces the list's z-order. Nothing here touches egui;
//! the painting system only translates primitives.

use bevy::color::Srgba;
use bevy::prelude::*;

use crate::constants::{
    ARROW_HEAD_HALF_ANGLE, ARROW_HEAD_LENGTH, ELLIPSE_SEGMENTS, ENDPOINT_HANDLE_RADIUS,
};

use super::annotation::{Annotation, AnnotationKind, HighlightShape, LabelBackground, StyleDefaults};
use super::controller::Draft;
use super::coords::CoordinateMapper;
use super::geometry::{arrow_head, bounds, endpoint_handles, resize_handle_box};

/// Outline and handle color for the current selection
pub const SELECTION_COLOR: Srgba = Srgba::rgb(0.231, 0.510, 0.965);

#[derive(Clone, Debug, PartialEq)]
pub enum Primitive {
    /// Filled convex polygon
    Fill { points: Vec<Vec2>, color: Srgba },
    /// Closed polyline
    Outline {
        points: Vec<Vec2>,
        width: f32,
        color: Srgba,
    },
    Segment {
        from: Vec2,
        to: Vec2,
        width: f32,
        color: Srgba,
    },
    /// Text box with background and border
    Label {
        min: Vec2,
        size: Vec2,
        text: String,
        font_size: f32,
        color: Srgba,
        background: Srgba,
        border: Srgba,
    },
    Handle { center: Vec2, radius: f32 },
}

/// Parse a `#rrggbb` color, falling back when the string is malformed
pub fn parse_color(hex: &str, fallback: Srgba) -> Srgba {
    Srgba::hex(hex).unwrap_or(fallback)
}

fn rect_points(min: Vec2, size: Vec2) -> Vec<Vec2> {
    vec![
        min,
        Vec2::new(min.x + size.x, min.y),
        min + size,
        Vec2::new(min.x, min.y + size.y),
    ]
}

fn ellipse_points(min: Vec2, size: Vec2) -> Vec<Vec2> {
    let center = min + size / 2.0;
    let radii = size / 2.0;
    (0..ELLIPSE_SEGMENTS)
        .map(|i| {
            let t = i as f32 / ELLIPSE_SEGMENTS as f32 * std::f32::consts::TAU;
            center + Vec2::new(t.cos() * radii.x, t.sin() * radii.y)
        })
        .collect()
}

fn region_points(shape: HighlightShape, min: Vec2, size: Vec2) -> Vec<Vec2> {
    match shape {
        HighlightShape::Rect => rect_points(min, size),
        HighlightShape::Ellipse => ellipse_points(min, size),
    }
}

/// Shaft plus head; nothing for a zero-length arrow
fn arrow_primitives(
    start: Vec2,
    end: Vec2,
    thickness: f32,
    color: Srgba,
    mapper: &CoordinateMapper,
    out: &mut Vec<Primitive>,
) {
    let Some(head) = arrow_head(start, end, ARROW_HEAD_LENGTH, ARROW_HEAD_HALF_ANGLE) else {
        return;
    };
    out.push(Primitive::Segment {
        from: mapper.to_client(start),
        to: mapper.to_client(head.shaft_end),
        width: mapper.length_to_client(thickness),
        color,
    });
    out.push(Primitive::Fill {
        points: head.triangle().iter().map(|p| mapper.to_client(*p)).collect(),
        color,
    });
}

fn annotation_primitives(annotation: &Annotation, mapper: &CoordinateMapper, out: &mut Vec<Primitive>) {
    match &annotation.kind {
        AnnotationKind::Text(text) => {
            let (background, fallback_text) = match text.background {
                LabelBackground::White => (Srgba::WHITE, Srgba::BLACK),
                LabelBackground::Black => (Srgba::BLACK, Srgba::WHITE),
            };
            let min = Vec2::new(text.x, text.y);
            out.push(Primitive::Label {
                min: mapper.to_client(min),
                size: mapper.to_client(min + text.size()) - mapper.to_client(min),
                text: text.text.clone(),
                font_size: mapper.length_to_client(text.font_size),
                color: parse_color(&text.color, fallback_text),
                background,
                border: parse_color(&text.border_color, SELECTION_COLOR),
            });
        }
        AnnotationKind::Arrow(arrow) => arrow_primitives(
            arrow.start(),
            arrow.end(),
            arrow.thickness,
            parse_color(&arrow.color, SELECTION_COLOR),
            mapper,
            out,
        ),
        AnnotationKind::Highlight(region) => {
            let color = parse_color(&region.color, Srgba::rgb(1.0, 0.84, 0.0))
                .with_alpha(region.opacity.clamp(0.0, 1.0));
            let points = region_points(
                region.shape,
                Vec2::new(region.x, region.y),
                Vec2::new(region.width, region.height),
            );
            out.push(Primitive::Fill {
                points: points.iter().map(|p| mapper.to_client(*p)).collect(),
                color,
            });
        }
    }
}

fn selection_primitives(annotation: &Annotation, mapper: &CoordinateMapper, out: &mut Vec<Primitive>) {
    if let Some(handles) = endpoint_handles(annotation) {
        for (_, center) in handles {
            out.push(Primitive::Handle {
                center: mapper.to_client(center),
                radius: mapper.length_to_client(ENDPOINT_HANDLE_RADIUS),
            });
        }
        return;
    }

    let (min, max) = bounds(annotation);
    out.push(Primitive::Outline {
        points: rect_points(mapper.to_client(min), mapper.to_client(max) - mapper.to_client(min)),
        width: 1.5,
        color: SELECTION_COLOR,
    });
    if let Some((handle_min, handle_size)) = resize_handle_box(annotation) {
        let center = mapper.to_client(handle_min + handle_size / 2.0);
        out.push(Primitive::Handle {
            center,
            radius: mapper.length_to_client(handle_size.x / 2.0),
        });
    }
}

fn draft_primitives(draft: &Draft, style: &StyleDefaults, mapper: &CoordinateMapper, out: &mut Vec<Primitive>) {
    match *draft {
        Draft::Arrow { start, end } => arrow_primitives(
            start,
            end,
            style.arrow_thickness,
            parse_color(&style.arrow_color, SELECTION_COLOR),
            mapper,
            out,
        ),
        Draft::Highlight { min, size } => {
            if size == Vec2::ZERO {
                return;
            }
            let points: Vec<Vec2> = region_points(style.highlight_shape, min, size)
                .into_iter()
                .map(|p| mapper.to_client(p))
                .collect();
            let color = parse_color(&style.highlight_color, Srgba::rgb(1.0, 0.84, 0.0));
            out.push(Primitive::Fill {
                points: points.clone(),
                color: color.with_alpha(style.highlight_opacity.clamp(0.0, 1.0)),
            });
            out.push(Primitive::Outline {
                points,
                width: 1.0,
                color: SELECTION_COLOR,
            });
        }
    }
}

/// Everything to paint this frame, bottom to top
pub fn build_scene(
    annotations: &[Annotation],
    selection: Option<&str>,
    draft: Option<&Draft>,
    style: &StyleDefaults,
    mapper: &CoordinateMapper,
) -> Vec<Primitive> {
    let mut out = Vec::new();
    for annotation in annotations {
        annotation_primitives(annotation, mapper, &mut out);
    }
    if let Some(selected) = selection.and_then(|id| annotations.iter().find(|a| a.id == id)) {
        selection_primitives(selected, mapper, &mut out);
    }
    if let Some(draft) = draft {
        draft_primitives(draft, style, mapper, &mut out);
    }
    out
}
