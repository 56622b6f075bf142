use bevy::color::Srgba;
use bevy::prelude::*;
use bevy_egui::{EguiContexts, egui};

use crate::overlay::annotation::{
    ArrowDirection, HighlightShape, LabelAlign, LabelBackground,
};
use crate::overlay::render::parse_color;
use crate::overlay::{Annotation, AnnotationEdit, AnnotationKind, Documents, InteractionController};

/// `#rrggbb` to egui's color-button triple; unparsable strings show black
pub fn hex_to_rgb(hex: &str) -> [u8; 3] {
    let color = parse_color(hex, Srgba::BLACK);
    [
        (color.red * 255.0).round() as u8,
        (color.green * 255.0).round() as u8,
        (color.blue * 255.0).round() as u8,
    ]
}

pub fn rgb_to_hex(rgb: [u8; 3]) -> String {
    format!("#{:02x}{:02x}{:02x}", rgb[0], rgb[1], rgb[2])
}

/// Color picker bound to a hex string. Returns true when the color changed.
pub fn color_button(ui: &mut egui::Ui, hex: &mut String) -> bool {
    let mut rgb = hex_to_rgb(hex);
    if ui.color_edit_button_srgb(&mut rgb).changed() {
        *hex = rgb_to_hex(rgb);
        return true;
    }
    false
}

/// How an edit enters history
enum EditKind {
    /// One snapshot per edit (pickers, buttons)
    Discrete,
    /// Coalesced with the previous edit on the same annotation (typing, drags)
    Continuous,
}

struct PendingEdits(Vec<(AnnotationEdit, EditKind)>);

impl PendingEdits {
    fn discrete(&mut self, edit: AnnotationEdit) {
        self.0.push((edit, EditKind::Discrete));
    }

    fn continuous(&mut self, edit: AnnotationEdit) {
        self.0.push((edit, EditKind::Continuous));
    }
}

/// Properties window for the selected annotation
pub fn properties_panel_ui(
    mut contexts: EguiContexts,
    mut controller: ResMut<InteractionController>,
    mut documents: ResMut<Documents>,
) -> Result {
    let Some(doc) = documents.active() else {
        return Ok(());
    };
    let count = doc.annotations().len();
    let selected = controller
        .selection()
        .and_then(|id| doc.store.get(id))
        .cloned();

    let mut edits = PendingEdits(Vec::new());
    let mut delete = false;
    let ctx = contexts.ctx_mut()?;

    egui::Window::new("Properties")
        .anchor(egui::Align2::RIGHT_BOTTOM, [-10.0, -10.0])
        .resizable(false)
        .show(ctx, |ui| {
            let Some(annotation) = &selected else {
                ui.label("No annotation selected");
                ui.label(egui::RichText::new(format!("{} on this image", count)).weak());
                return;
            };

            ui.label(format!("Type: {}", annotation.type_name()));
            ui.label(egui::RichText::new(&annotation.id).weak().small());
            ui.separator();

            position_controls(ui, annotation, &mut edits);
            ui.separator();

            match &annotation.kind {
                AnnotationKind::Text(_) => text_controls(ui, annotation, &mut edits),
                AnnotationKind::Arrow(_) => arrow_controls(ui, annotation, &mut edits),
                AnnotationKind::Highlight(_) => highlight_controls(ui, annotation, &mut edits),
            }

            ui.separator();
            if ui.button("Delete").clicked() {
                delete = true;
            }
        });

    let interacting = ctx.memory(|m| m.focused().is_some())
        || ctx.input(|i| i.pointer.any_down());

    let (Some(annotation), Some(doc)) = (selected, documents.active_mut()) else {
        return Ok(());
    };

    if delete {
        controller.delete_selected(doc);
        return Ok(());
    }

    let idle = edits.0.is_empty();
    for (edit, kind) in edits.0 {
        match kind {
            EditKind::Discrete => controller.apply_edit(doc, &annotation.id, edit),
            EditKind::Continuous => controller.continue_edit(doc, &annotation.id, edit),
        };
    }
    // Typing and drags hold focus or a button; once both are released the
    // next change starts a new undo step
    if idle && !interacting {
        controller.end_edit();
    }
    Ok(())
}

fn position_controls(ui: &mut egui::Ui, annotation: &Annotation, edits: &mut PendingEdits) {
    let mut anchor = annotation.anchor();
    let label = match annotation.kind {
        AnnotationKind::Arrow(_) => "Start",
        _ => "Position",
    };
    ui.horizontal(|ui| {
        ui.label(format!("{label}:"));
        let x = ui.add(egui::DragValue::new(&mut anchor.x).speed(1.0).prefix("x "));
        let y = ui.add(egui::DragValue::new(&mut anchor.y).speed(1.0).prefix("y "));
        if x.changed() || y.changed() {
            edits.continuous(AnnotationEdit::Position(anchor));
        }
    });

    if let Some(mut size) = annotation.box_size() {
        ui.horizontal(|ui| {
            ui.label("Size:");
            let w = ui.add(egui::DragValue::new(&mut size.x).speed(1.0).prefix("w "));
            let h = ui.add(egui::DragValue::new(&mut size.y).speed(1.0).prefix("h "));
            if w.changed() || h.changed() {
                edits.continuous(AnnotationEdit::Size(size));
            }
        });
    }
}

fn text_controls(ui: &mut egui::Ui, annotation: &Annotation, edits: &mut PendingEdits) {
    let AnnotationKind::Text(text) = &annotation.kind else {
        return;
    };

    let mut body = text.text.clone();
    ui.label("Text:");
    if ui
        .add(egui::TextEdit::multiline(&mut body).desired_rows(3))
        .changed()
    {
        edits.continuous(AnnotationEdit::Text(body));
    }

    let mut font_size = text.font_size;
    ui.horizontal(|ui| {
        ui.label("Font Size:");
        if ui
            .add(
                egui::DragValue::new(&mut font_size)
                    .range(8.0..=72.0)
                    .speed(1.0)
                    .suffix(" px"),
            )
            .changed()
        {
            edits.continuous(AnnotationEdit::FontSize(font_size));
        }
    });

    let mut family = text.font_family.clone();
    ui.horizontal(|ui| {
        ui.label("Font:");
        if ui.text_edit_singleline(&mut family).changed() {
            edits.continuous(AnnotationEdit::FontFamily(family));
        }
    });

    let mut color = text.color.clone();
    let mut border = text.border_color.clone();
    ui.horizontal(|ui| {
        ui.label("Color:");
        if color_button(ui, &mut color) {
            edits.continuous(AnnotationEdit::Color(color));
        }
        ui.label("Border:");
        if color_button(ui, &mut border) {
            edits.continuous(AnnotationEdit::BorderColor(border));
        }
    });

    ui.horizontal(|ui| {
        ui.label("Background:");
        egui::ComboBox::from_id_salt("text_background")
            .selected_text(text.background.display_name())
            .show_ui(ui, |ui| {
                for background in LabelBackground::all() {
                    if ui
                        .selectable_label(text.background == *background, background.display_name())
                        .clicked()
                    {
                        edits.discrete(AnnotationEdit::Background(*background));
                    }
                }
            });
    });

    ui.horizontal(|ui| {
        ui.label("Align:");
        egui::ComboBox::from_id_salt("text_align")
            .selected_text(text.align.display_name())
            .show_ui(ui, |ui| {
                for align in LabelAlign::all() {
                    if ui
                        .selectable_label(text.align == *align, align.display_name())
                        .clicked()
                    {
                        edits.discrete(AnnotationEdit::Align(*align));
                    }
                }
            });
    });
}

fn arrow_controls(ui: &mut egui::Ui, annotation: &Annotation, edits: &mut PendingEdits) {
    let AnnotationKind::Arrow(arrow) = &annotation.kind else {
        return;
    };

    let mut color = arrow.color.clone();
    let mut thickness = arrow.thickness;
    ui.horizontal(|ui| {
        ui.label("Color:");
        if color_button(ui, &mut color) {
            edits.continuous(AnnotationEdit::Color(color));
        }
        ui.label("Thickness:");
        if ui
            .add(
                egui::DragValue::new(&mut thickness)
                    .range(1.0..=20.0)
                    .speed(0.5)
                    .suffix(" px"),
            )
            .changed()
        {
            edits.continuous(AnnotationEdit::Thickness(thickness));
        }
    });

    ui.horizontal(|ui| {
        ui.label("Point:");
        for direction in ArrowDirection::all() {
            if ui.button(direction.display_name()).clicked() {
                edits.discrete(AnnotationEdit::Direction(*direction));
            }
        }
    });
}

fn highlight_controls(ui: &mut egui::Ui, annotation: &Annotation, edits: &mut PendingEdits) {
    let AnnotationKind::Highlight(region) = &annotation.kind else {
        return;
    };

    let mut color = region.color.clone();
    ui.horizontal(|ui| {
        ui.label("Color:");
        if color_button(ui, &mut color) {
            edits.continuous(AnnotationEdit::Color(color));
        }
    });

    let mut opacity = region.opacity;
    ui.horizontal(|ui| {
        ui.label("Opacity:");
        if ui
            .add(egui::Slider::new(&mut opacity, 0.0..=1.0).fixed_decimals(2))
            .changed()
        {
            edits.continuous(AnnotationEdit::Opacity(opacity));
        }
    });

    ui.horizontal(|ui| {
        ui.label("Shape:");
        egui::ComboBox::from_id_salt("highlight_shape")
            .selected_text(region.shape.display_name())
            .show_ui(ui, |ui| {
                for shape in HighlightShape::all() {
                    if ui
                        .selectable_label(region.shape == *shape, shape.display_name())
                        .clicked()
                    {
                        edits.discrete(AnnotationEdit::Shape(*shape));
                    }
                }
            });
    });
}
