//! Hit testing and arrow geometry in canonical space.

use bevy::prelude::*;

use crate::constants::{ARROW_HIT_STROKE, ENDPOINT_HANDLE_RADIUS, RESIZE_HANDLE_SIZE};

use super::annotation::{Annotation, AnnotationKind};

/// Which end of an arrow a handle controls
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ArrowEndpoint {
    Start,
    End,
}

/// Grab handles shown on the selected annotation
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Handle {
    /// Bottom-right corner of a text or highlight box
    Resize,
    Endpoint(ArrowEndpoint),
}

/// Distance from `point` to the segment `a`-`b`
pub fn distance_to_segment(point: Vec2, a: Vec2, b: Vec2) -> f32 {
    let segment = b - a;
    let length_sq = segment.length_squared();

    if length_sq < 0.0001 {
        // Segment is essentially a point
        return point.distance(a);
    }

    // Project point onto line, clamped to segment
    let t = ((point - a).dot(segment) / length_sq).clamp(0.0, 1.0);
    point.distance(a + segment * t)
}

/// Inclusive containment in the box `[min, min + size]`
pub fn point_in_box(point: Vec2, min: Vec2, size: Vec2) -> bool {
    let max = min + size;
    point.x >= min.x && point.x <= max.x && point.y >= min.y && point.y <= max.y
}

/// Hit tolerance around an arrow's centre line.
///
/// Half of an inflated stroke, so thin arrows stay easy to grab.
pub fn arrow_hit_tolerance(thickness: f32) -> f32 {
    (thickness + 4.0).max(ARROW_HIT_STROKE) / 2.0
}

/// True when `point` lies on the annotation's hit region
pub fn hit_test(annotation: &Annotation, point: Vec2) -> bool {
    match &annotation.kind {
        AnnotationKind::Text(text) => point_in_box(point, Vec2::new(text.x, text.y), text.size()),
        AnnotationKind::Highlight(region) => point_in_box(
            point,
            Vec2::new(region.x, region.y),
            Vec2::new(region.width, region.height),
        ),
        AnnotationKind::Arrow(arrow) => {
            distance_to_segment(point, arrow.start(), arrow.end())
                <= arrow_hit_tolerance(arrow.thickness)
        }
    }
}

/// The annotation painted on top at `point`.
///
/// Later entries paint over earlier ones, so the search runs back to front.
pub fn topmost_hit(annotations: &[Annotation], point: Vec2) -> Option<&Annotation> {
    annotations.iter().rev().find(|a| hit_test(a, point))
}

/// Axis-aligned bounds (min, max) of an annotation
pub fn bounds(annotation: &Annotation) -> (Vec2, Vec2) {
    match &annotation.kind {
        AnnotationKind::Arrow(arrow) => {
            let padding = Vec2::splat(arrow.thickness);
            (
                arrow.start().min(arrow.end()) - padding,
                arrow.start().max(arrow.end()) + padding,
            )
        }
        _ => {
            let min = annotation.anchor();
            let size = annotation.box_size().unwrap_or(Vec2::ZERO);
            (min, min + size)
        }
    }
}

/// Box of the resize handle (min, size), tucked inside the bottom-right corner
pub fn resize_handle_box(annotation: &Annotation) -> Option<(Vec2, Vec2)> {
    let size = annotation.box_size()?;
    let corner = annotation.anchor() + size;
    let min = corner - Vec2::splat(RESIZE_HANDLE_SIZE + 2.0);
    Some((min, Vec2::splat(RESIZE_HANDLE_SIZE)))
}

/// Centres of the two arrow endpoint handles
pub fn endpoint_handles(annotation: &Annotation) -> Option<[(ArrowEndpoint, Vec2); 2]> {
    match &annotation.kind {
        AnnotationKind::Arrow(arrow) => Some([
            (ArrowEndpoint::Start, arrow.start()),
            (ArrowEndpoint::End, arrow.end()),
        ]),
        _ => None,
    }
}

/// Which of the annotation's handles (if any) is under `point`
pub fn handle_at(annotation: &Annotation, point: Vec2) -> Option<Handle> {
    if let Some(handles) = endpoint_handles(annotation) {
        // End first: it sits on top of the arrowhead
        return handles
            .iter()
            .rev()
            .find(|(_, center)| point.distance(*center) <= ENDPOINT_HANDLE_RADIUS + 2.0)
            .map(|(which, _)| Handle::Endpoint(*which));
    }

    let (min, size) = resize_handle_box(annotation)?;
    // Slightly generous so the corner stays grabbable at low zoom
    point_in_box(point, min - Vec2::ONE, size + Vec2::splat(3.0)).then_some(Handle::Resize)
}

/// Triangle and shortened shaft for an arrow from `start` to `end`
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ArrowHead {
    /// Where the visible shaft stops so it does not overdraw the head
    pub shaft_end: Vec2,
    pub apex: Vec2,
    pub wings: [Vec2; 2],
}

impl ArrowHead {
    pub fn triangle(&self) -> [Vec2; 3] {
        [self.apex, self.wings[0], self.wings[1]]
    }
}

/// Arrowhead geometry with head length `length` and half-angle `half_angle`.
///
/// Returns `None` when start and end coincide: the direction is undefined.
pub fn arrow_head(start: Vec2, end: Vec2, length: f32, half_angle: f32) -> Option<ArrowHead> {
    if start == end {
        return None;
    }
    let angle = (end.y - start.y).atan2(end.x - start.x);
    let back = |theta: f32| end - length * Vec2::new(theta.cos(), theta.sin());

    Some(ArrowHead {
        shaft_end: back(angle),
        apex: end,
        wings: [back(angle - half_angle), back(angle + half_angle)],
    })
}
