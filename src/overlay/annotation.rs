//! Annotation records drawn over an image.
//!
//! Every record carries the common bookkeeping fields (id, timestamps, paint
//! rank) plus exactly one geometric variant. Coordinates are canonical image
//! pixels: origin at the image's top-left, y growing downward.
//!
//! Records serialize to the flat JSON shape exchanged with storage and
//! suggestion sources, e.g.
//! `{"id":"arrow_..","type":"arrow","createdAt":..,"startX":..,..}`.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_TEXT_HEIGHT, DEFAULT_TEXT_WIDTH, MIN_HIGHLIGHT_HEIGHT, MIN_HIGHLIGHT_WIDTH,
    MIN_TEXT_HEIGHT, MIN_TEXT_WIDTH,
};

pub type AnnotationId = String;

/// Range accepted for font sizes and arrow thickness
const MIN_FONT_SIZE: f32 = 6.0;
const MAX_FONT_SIZE: f32 = 200.0;
const MIN_THICKNESS: f32 = 0.5;
const MAX_THICKNESS: f32 = 64.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LabelBackground {
    #[default]
    White,
    Black,
}

impl LabelBackground {
    pub fn all() -> &'static [LabelBackground] {
        &[LabelBackground::White, LabelBackground::Black]
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            LabelBackground::White => "White",
            LabelBackground::Black => "Black",
        }
    }
}

/// Where the label sits relative to the thing it describes
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LabelAlign {
    Above,
    #[default]
    Below,
    Left,
    Right,
}

impl LabelAlign {
    pub fn all() -> &'static [LabelAlign] {
        &[
            LabelAlign::Above,
            LabelAlign::Below,
            LabelAlign::Left,
            LabelAlign::Right,
        ]
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            LabelAlign::Above => "Above",
            LabelAlign::Below => "Below",
            LabelAlign::Left => "Left",
            LabelAlign::Right => "Right",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HighlightShape {
    #[default]
    Rect,
    Ellipse,
}

impl HighlightShape {
    pub fn all() -> &'static [HighlightShape] {
        &[HighlightShape::Rect, HighlightShape::Ellipse]
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            HighlightShape::Rect => "Rectangle",
            HighlightShape::Ellipse => "Ellipse",
        }
    }
}

/// Cardinal direction an arrow can be snapped to
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArrowDirection {
    Up,
    Down,
    Left,
    Right,
}

impl ArrowDirection {
    pub fn all() -> &'static [ArrowDirection] {
        &[
            ArrowDirection::Up,
            ArrowDirection::Down,
            ArrowDirection::Left,
            ArrowDirection::Right,
        ]
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            ArrowDirection::Up => "Up",
            ArrowDirection::Down => "Down",
            ArrowDirection::Left => "Left",
            ArrowDirection::Right => "Right",
        }
    }

    /// Unit vector in canonical space (y grows downward)
    pub fn unit(&self) -> Vec2 {
        match self {
            ArrowDirection::Up => Vec2::new(0.0, -1.0),
            ArrowDirection::Down => Vec2::new(0.0, 1.0),
            ArrowDirection::Left => Vec2::new(-1.0, 0.0),
            ArrowDirection::Right => Vec2::new(1.0, 0.0),
        }
    }
}

fn default_border_color() -> String {
    "#3b82f6".to_string()
}

fn default_font_family() -> String {
    "Inter, sans-serif".to_string()
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextLabel {
    pub x: f32,
    pub y: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f32>,
    pub text: String,
    pub font_size: f32,
    #[serde(default = "default_font_family")]
    pub font_family: String,
    pub color: String,
    #[serde(default)]
    pub background: LabelBackground,
    #[serde(default)]
    pub align: LabelAlign,
    #[serde(default = "default_border_color")]
    pub border_color: String,
}

impl TextLabel {
    /// Effective box size; records without a size use the default label size
    pub fn size(&self) -> Vec2 {
        Vec2::new(
            self.width.unwrap_or(DEFAULT_TEXT_WIDTH).max(MIN_TEXT_WIDTH),
            self.height.unwrap_or(DEFAULT_TEXT_HEIGHT).max(MIN_TEXT_HEIGHT),
        )
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArrowShape {
    pub start_x: f32,
    pub start_y: f32,
    pub end_x: f32,
    pub end_y: f32,
    pub color: String,
    pub thickness: f32,
}

impl ArrowShape {
    pub fn start(&self) -> Vec2 {
        Vec2::new(self.start_x, self.start_y)
    }

    pub fn end(&self) -> Vec2 {
        Vec2::new(self.end_x, self.end_y)
    }

    pub fn set_start(&mut self, point: Vec2) {
        self.start_x = point.x;
        self.start_y = point.y;
    }

    pub fn set_end(&mut self, point: Vec2) {
        self.end_x = point.x;
        self.end_y = point.y;
    }

    pub fn is_degenerate(&self) -> bool {
        self.start() == self.end()
    }

    /// Keep the start point and length, point the end along `direction`.
    pub fn point_towards(&mut self, direction: ArrowDirection) {
        let length = self.start().distance(self.end());
        self.set_end(self.start() + direction.unit() * length);
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HighlightRegion {
    #[serde(default)]
    pub shape: HighlightShape,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub color: String,
    pub opacity: f32,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum AnnotationKind {
    Text(TextLabel),
    Arrow(ArrowShape),
    Highlight(HighlightRegion),
}

impl AnnotationKind {
    pub fn type_name(&self) -> &'static str {
        match self {
            AnnotationKind::Text(_) => "text",
            AnnotationKind::Arrow(_) => "arrow",
            AnnotationKind::Highlight(_) => "highlight",
        }
    }
}

/// Styling given to newly created annotations
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StyleDefaults {
    pub text_content: String,
    pub font_size: f32,
    pub font_family: String,
    pub text_color: String,
    pub background: LabelBackground,
    pub align: LabelAlign,
    pub border_color: String,
    pub arrow_color: String,
    pub arrow_thickness: f32,
    pub highlight_shape: HighlightShape,
    pub highlight_color: String,
    pub highlight_opacity: f32,
}

impl Default for StyleDefaults {
    fn default() -> Self {
        Self {
            text_content: "Edit me".to_string(),
            font_size: 16.0,
            font_family: default_font_family(),
            text_color: "#222222".to_string(),
            background: LabelBackground::White,
            align: LabelAlign::Below,
            border_color: default_border_color(),
            arrow_color: "#3b82f6".to_string(),
            arrow_thickness: 3.0,
            highlight_shape: HighlightShape::Rect,
            highlight_color: "#FFD600".to_string(),
            highlight_opacity: 0.35,
        }
    }
}

impl StyleDefaults {
    /// A default-size label anchored at `at`
    pub fn text_label(&self, at: Vec2) -> AnnotationKind {
        AnnotationKind::Text(TextLabel {
            x: at.x,
            y: at.y,
            width: Some(DEFAULT_TEXT_WIDTH),
            height: Some(DEFAULT_TEXT_HEIGHT),
            text: self.text_content.clone(),
            font_size: self.font_size,
            font_family: self.font_family.clone(),
            color: self.text_color.clone(),
            background: self.background,
            align: self.align,
            border_color: self.border_color.clone(),
        })
    }

    pub fn arrow(&self, start: Vec2, end: Vec2) -> AnnotationKind {
        AnnotationKind::Arrow(ArrowShape {
            start_x: start.x,
            start_y: start.y,
            end_x: end.x,
            end_y: end.y,
            color: self.arrow_color.clone(),
            thickness: self.arrow_thickness,
        })
    }

    pub fn highlight(&self, min: Vec2, size: Vec2) -> AnnotationKind {
        AnnotationKind::Highlight(HighlightRegion {
            shape: self.highlight_shape,
            x: min.x,
            y: min.y,
            width: size.x.max(MIN_HIGHLIGHT_WIDTH),
            height: size.y.max(MIN_HIGHLIGHT_HEIGHT),
            color: self.highlight_color.clone(),
            opacity: self.highlight_opacity,
        })
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Annotation {
    pub id: AnnotationId,
    pub created_at: i64,
    pub updated_at: i64,
    /// Paint-order rank; higher ranks paint on top
    #[serde(default)]
    pub z_index: i64,
    #[serde(flatten)]
    pub kind: AnnotationKind,
}

/// Current wall-clock time in Unix milliseconds
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Fresh unique id of the form `<type>_<uuid>`
pub fn fresh_id(type_name: &str) -> AnnotationId {
    format!("{}_{}", type_name, uuid::Uuid::new_v4().simple())
}

impl Annotation {
    /// Create a record with a fresh id and current timestamps
    pub fn new(kind: AnnotationKind, z_index: i64) -> Self {
        let now = now_millis();
        Self {
            id: fresh_id(kind.type_name()),
            created_at: now,
            updated_at: now,
            z_index,
            kind,
        }
    }

    pub fn type_name(&self) -> &'static str {
        self.kind.type_name()
    }

    /// The point a drag moves: top-left for boxes, start point for arrows
    pub fn anchor(&self) -> Vec2 {
        match &self.kind {
            AnnotationKind::Text(text) => Vec2::new(text.x, text.y),
            AnnotationKind::Arrow(arrow) => arrow.start(),
            AnnotationKind::Highlight(region) => Vec2::new(region.x, region.y),
        }
    }

    /// Move the anchor to `point`; arrows translate both endpoints together.
    pub fn set_anchor(&mut self, point: Vec2) {
        match &mut self.kind {
            AnnotationKind::Text(text) => {
                text.x = point.x;
                text.y = point.y;
            }
            AnnotationKind::Arrow(arrow) => {
                let delta = point - arrow.start();
                let end = arrow.end() + delta;
                arrow.set_start(point);
                arrow.set_end(end);
            }
            AnnotationKind::Highlight(region) => {
                region.x = point.x;
                region.y = point.y;
            }
        }
    }

    /// Box dimensions for text and highlights; arrows have none
    pub fn box_size(&self) -> Option<Vec2> {
        match &self.kind {
            AnnotationKind::Text(text) => Some(text.size()),
            AnnotationKind::Highlight(region) => Some(Vec2::new(region.width, region.height)),
            AnnotationKind::Arrow(_) => None,
        }
    }

    pub fn min_box_size(&self) -> Option<Vec2> {
        match &self.kind {
            AnnotationKind::Text(_) => Some(Vec2::new(MIN_TEXT_WIDTH, MIN_TEXT_HEIGHT)),
            AnnotationKind::Highlight(_) => {
                Some(Vec2::new(MIN_HIGHLIGHT_WIDTH, MIN_HIGHLIGHT_HEIGHT))
            }
            AnnotationKind::Arrow(_) => None,
        }
    }

    /// Set box dimensions, clamped to the variant's minimum. No-op for arrows.
    pub fn set_box_size(&mut self, size: Vec2) {
        let Some(min) = self.min_box_size() else {
            return;
        };
        let size = size.max(min);
        match &mut self.kind {
            AnnotationKind::Text(text) => {
                text.width = Some(size.x);
                text.height = Some(size.y);
            }
            AnnotationKind::Highlight(region) => {
                region.width = size.x;
                region.height = size.y;
            }
            AnnotationKind::Arrow(_) => {}
        }
    }

    pub fn touch(&mut self) {
        self.updated_at = now_millis();
    }

    /// True when every numeric field is finite
    pub fn is_finite(&self) -> bool {
        match &self.kind {
            AnnotationKind::Text(text) => {
                [text.x, text.y, text.font_size].iter().all(|v| v.is_finite())
                    && text.width.is_none_or(f32::is_finite)
                    && text.height.is_none_or(f32::is_finite)
            }
            AnnotationKind::Arrow(arrow) => [
                arrow.start_x,
                arrow.start_y,
                arrow.end_x,
                arrow.end_y,
                arrow.thickness,
            ]
            .iter()
            .all(|v| v.is_finite()),
            AnnotationKind::Highlight(region) => [
                region.x,
                region.y,
                region.width,
                region.height,
                region.opacity,
            ]
            .iter()
            .all(|v| v.is_finite()),
        }
    }

    /// Bring a record into the model's invariants.
    ///
    /// Returns false when the record cannot be repaired (non-finite numbers,
    /// zero-length arrows).
    pub fn sanitize(&mut self) -> bool {
        if !self.is_finite() {
            return false;
        }
        if let AnnotationKind::Arrow(arrow) = &self.kind
            && arrow.is_degenerate()
        {
            return false;
        }
        match &mut self.kind {
            AnnotationKind::Text(text) => {
                text.font_size = text.font_size.clamp(MIN_FONT_SIZE, MAX_FONT_SIZE);
                text.width = text.width.map(|w| w.max(MIN_TEXT_WIDTH));
                text.height = text.height.map(|h| h.max(MIN_TEXT_HEIGHT));
            }
            AnnotationKind::Arrow(arrow) => {
                arrow.thickness = arrow.thickness.clamp(MIN_THICKNESS, MAX_THICKNESS);
            }
            AnnotationKind::Highlight(region) => {
                region.width = region.width.max(MIN_HIGHLIGHT_WIDTH);
                region.height = region.height.max(MIN_HIGHLIGHT_HEIGHT);
                region.opacity = region.opacity.clamp(0.0, 1.0);
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn arrow(start: Vec2, end: Vec2) -> Annotation {
        Annotation::new(
            AnnotationKind::Arrow(ArrowShape {
                start_x: start.x,
                start_y: start.y,
                end_x: end.x,
                end_y: end.y,
                color: "#3b82f6".to_string(),
                thickness: 3.0,
            }),
            0,
        )
    }

    #[test]
    fn test_fresh_ids_are_unique_and_prefixed() {
        let a = fresh_id("text");
        let b = fresh_id("text");
        assert_ne!(a, b);
        assert!(a.starts_with("text_"));
    }

    #[test]
    fn test_json_layout_is_flat_and_camel_case() {
        let mut annotation = arrow(Vec2::new(1.0, 2.0), Vec2::new(3.0, 4.0));
        annotation.id = "arrow_1".to_string();
        let value = serde_json::to_value(&annotation).unwrap();

        assert_eq!(value["type"], "arrow");
        assert_eq!(value["id"], "arrow_1");
        assert_eq!(value["startX"], 1.0);
        assert_eq!(value["endY"], 4.0);
        assert!(value.get("createdAt").is_some());
        assert!(value.get("kind").is_none());
    }

    #[test]
    fn test_text_record_without_size_uses_defaults() {
        let json = r##"{
            "id": "text_1", "type": "text", "createdAt": 1, "updatedAt": 1,
            "x": 10, "y": 20, "text": "Hi", "fontSize": 16, "color": "#222222"
        }"##;
        let annotation: Annotation = serde_json::from_str(json).unwrap();

        assert_eq!(annotation.z_index, 0);
        assert_eq!(
            annotation.box_size(),
            Some(Vec2::new(DEFAULT_TEXT_WIDTH, DEFAULT_TEXT_HEIGHT))
        );
        let AnnotationKind::Text(text) = &annotation.kind else {
            panic!("expected text");
        };
        assert_eq!(text.background, LabelBackground::White);
        assert_eq!(text.align, LabelAlign::Below);
        assert_eq!(text.border_color, "#3b82f6");
    }

    #[test]
    fn test_moving_arrow_anchor_translates_both_ends() {
        let mut annotation = arrow(Vec2::new(10.0, 10.0), Vec2::new(30.0, 15.0));
        annotation.set_anchor(Vec2::new(20.0, 0.0));

        let AnnotationKind::Arrow(shape) = &annotation.kind else {
            panic!("expected arrow");
        };
        assert_eq!(shape.start(), Vec2::new(20.0, 0.0));
        assert_eq!(shape.end(), Vec2::new(40.0, 5.0));
    }

    #[test]
    fn test_set_box_size_clamps_to_minimum() {
        let mut annotation = Annotation::new(
            AnnotationKind::Highlight(HighlightRegion {
                shape: HighlightShape::Ellipse,
                x: 0.0,
                y: 0.0,
                width: 50.0,
                height: 50.0,
                color: "#FFD600".to_string(),
                opacity: 0.4,
            }),
            0,
        );
        annotation.set_box_size(Vec2::new(2.0, 100.0));
        assert_eq!(
            annotation.box_size(),
            Some(Vec2::new(MIN_HIGHLIGHT_WIDTH, 100.0))
        );
    }

    #[test]
    fn test_point_towards_keeps_length() {
        let mut shape = ArrowShape {
            start_x: 0.0,
            start_y: 0.0,
            end_x: 30.0,
            end_y: 40.0,
            color: "#000000".to_string(),
            thickness: 2.0,
        };
        shape.point_towards(ArrowDirection::Up);
        assert_eq!(shape.end(), Vec2::new(0.0, -50.0));
    }

    #[test]
    fn test_sanitize_rejects_non_finite() {
        let mut annotation = arrow(Vec2::new(f32::NAN, 0.0), Vec2::new(1.0, 1.0));
        assert!(!annotation.sanitize());
    }

    #[test]
    fn test_sanitize_rejects_zero_length_arrow() {
        let mut annotation = arrow(Vec2::new(5.0, 5.0), Vec2::new(5.0, 5.0));
        assert!(!annotation.sanitize());
    }

    #[test]
    fn test_sanitize_clamps_opacity_and_size() {
        let mut annotation = Annotation::new(
            AnnotationKind::Highlight(HighlightRegion {
                shape: HighlightShape::Rect,
                x: 0.0,
                y: 0.0,
                width: 1.0,
                height: 1.0,
                color: "#FFD600".to_string(),
                opacity: 3.0,
            }),
            0,
        );
        assert!(annotation.sanitize());
        let AnnotationKind::Highlight(region) = &annotation.kind else {
            panic!("expected highlight");
        };
        assert_eq!(region.opacity, 1.0);
        assert_eq!(region.width, MIN_HIGHLIGHT_WIDTH);
    }
}
