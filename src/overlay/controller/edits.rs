//! Property edits issued from the properties panel.

use bevy::prelude::*;

use crate::overlay::annotation::{
    Annotation, AnnotationKind, ArrowDirection, HighlightShape, LabelAlign, LabelBackground,
};

/// A single field change on one annotation
#[derive(Clone, Debug, PartialEq)]
pub enum AnnotationEdit {
    Text(String),
    FontSize(f32),
    FontFamily(String),
    /// Text color, arrow color or highlight fill, depending on the variant
    Color(String),
    Background(LabelBackground),
    Align(LabelAlign),
    BorderColor(String),
    Thickness(f32),
    Direction(ArrowDirection),
    Shape(HighlightShape),
    Opacity(f32),
    /// Move the anchor (top-left, or arrow start)
    Position(Vec2),
    /// Box size; clamped to the variant's minimum
    Size(Vec2),
}

impl AnnotationEdit {
    /// Apply to `annotation`. Returns false when the edit does not apply to
    /// this variant; the record is left untouched in that case.
    pub fn apply(&self, annotation: &mut Annotation) -> bool {
        match self {
            AnnotationEdit::Position(point) => {
                annotation.set_anchor(*point);
                return true;
            }
            AnnotationEdit::Size(size) => {
                if annotation.box_size().is_none() {
                    return false;
                }
                annotation.set_box_size(*size);
                return true;
            }
            _ => {}
        }

        match (self, &mut annotation.kind) {
            (AnnotationEdit::Color(color), AnnotationKind::Text(text)) => text.color = color.clone(),
            (AnnotationEdit::Color(color), AnnotationKind::Arrow(arrow)) => {
                arrow.color = color.clone()
            }
            (AnnotationEdit::Color(color), AnnotationKind::Highlight(region)) => {
                region.color = color.clone()
            }
            (AnnotationEdit::Text(body), AnnotationKind::Text(text)) => text.text = body.clone(),
            (AnnotationEdit::FontSize(size), AnnotationKind::Text(text)) => text.font_size = *size,
            (AnnotationEdit::FontFamily(family), AnnotationKind::Text(text)) => {
                text.font_family = family.clone()
            }
            (AnnotationEdit::Background(background), AnnotationKind::Text(text)) => {
                text.background = *background
            }
            (AnnotationEdit::Align(align), AnnotationKind::Text(text)) => text.align = *align,
            (AnnotationEdit::BorderColor(color), AnnotationKind::Text(text)) => {
                text.border_color = color.clone()
            }
            (AnnotationEdit::Thickness(thickness), AnnotationKind::Arrow(arrow)) => {
                arrow.thickness = *thickness
            }
            (AnnotationEdit::Direction(direction), AnnotationKind::Arrow(arrow)) => {
                arrow.point_towards(*direction)
            }
            (AnnotationEdit::Shape(shape), AnnotationKind::Highlight(region)) => {
                region.shape = *shape
            }
            (AnnotationEdit::Opacity(opacity), AnnotationKind::Highlight(region)) => {
                region.opacity = *opacity
            }
            _ => return false,
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::overlay::annotation::StyleDefaults;

    #[test]
    fn test_edit_mismatched_variant_is_rejected() {
        let style = StyleDefaults::default();
        let mut annotation = Annotation::new(style.text_label(Vec2::ZERO), 0);
        let before = annotation.clone();

        assert!(!AnnotationEdit::Thickness(5.0).apply(&mut annotation));
        assert!(!AnnotationEdit::Direction(ArrowDirection::Up).apply(&mut annotation));
        assert_eq!(annotation, before);
    }

    #[test]
    fn test_color_targets_each_variant() {
        let style = StyleDefaults::default();
        for kind in [
            style.text_label(Vec2::ZERO),
            style.arrow(Vec2::ZERO, Vec2::X * 10.0),
            style.highlight(Vec2::ZERO, Vec2::splat(20.0)),
        ] {
            let mut annotation = Annotation::new(kind, 0);
            assert!(AnnotationEdit::Color("#ff0000".to_string()).apply(&mut annotation));
            let color = match &annotation.kind {
                AnnotationKind::Text(t) => &t.color,
                AnnotationKind::Arrow(a) => &a.color,
                AnnotationKind::Highlight(h) => &h.color,
            };
            assert_eq!(color, "#ff0000");
        }
    }

    #[test]
    fn test_size_edit_is_rejected_for_arrows() {
        let style = StyleDefaults::default();
        let mut annotation = Annotation::new(style.arrow(Vec2::ZERO, Vec2::ONE), 0);
        assert!(!AnnotationEdit::Size(Vec2::splat(100.0)).apply(&mut annotation));
    }
}
