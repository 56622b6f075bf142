use bevy::prelude::*;
use bevy_egui::{EguiContexts, egui};

use crate::config::{AppConfig, SaveConfigRequest};
use crate::overlay::annotation::{HighlightShape, LabelAlign, LabelBackground};
use crate::overlay::{Documents, InteractionController, StyleDefaults, Tool};
use crate::storage::SaveAnnotationsRequest;

use super::file_menu::FileMenuState;
use super::properties::color_button;
use super::settings_dialog::SettingsDialogState;

/// Main toolbar: file actions, tools and history
#[allow(clippy::too_many_arguments)]
pub fn toolbar_ui(
    mut contexts: EguiContexts,
    mut controller: ResMut<InteractionController>,
    mut documents: ResMut<Documents>,
    mut menu_state: ResMut<FileMenuState>,
    mut settings: ResMut<SettingsDialogState>,
    config: Res<AppConfig>,
    mut save_events: MessageWriter<SaveAnnotationsRequest>,
) -> Result {
    let mut armed: Option<Tool> = None;
    let mut undo = false;
    let mut redo = false;
    let mut delete = false;

    let (can_undo, can_redo, title) = match documents.active() {
        Some(doc) => (
            doc.history.can_undo(),
            doc.history.can_redo(),
            format!(
                "{}{} ({}×{})",
                doc.image.id,
                if doc.is_dirty() { " *" } else { "" },
                doc.image.width,
                doc.image.height
            ),
        ),
        None => (false, false, "No image open".to_string()),
    };
    let has_document = documents.active().is_some();

    egui::TopBottomPanel::top("main_toolbar")
        .frame(
            egui::Frame::side_top_panel(&contexts.ctx_mut()?.style())
                .inner_margin(egui::Margin::symmetric(12, 8)),
        )
        .show(contexts.ctx_mut()?, |ui| {
            ui.horizontal(|ui| {
                ui.spacing_mut().item_spacing.x = 4.0;

                if ui.button("Open Image...").clicked() {
                    menu_state.browse_for_image();
                }
                if ui
                    .add_enabled(has_document, egui::Button::new("Save"))
                    .on_hover_text(config.data.storage.display_name())
                    .clicked()
                {
                    save_events.write(SaveAnnotationsRequest);
                }
                if ui
                    .add_enabled(has_document, egui::Button::new("Import Suggestions..."))
                    .clicked()
                {
                    menu_state.browse_for_suggestions();
                }
                if ui.button("Settings").clicked() {
                    settings.open(&config);
                }

                ui.add_space(8.0);
                ui.separator();
                ui.add_space(8.0);

                // Tool buttons with keyboard shortcuts
                for tool in Tool::all() {
                    let selected = controller.tool() == *tool;
                    let button = egui::Button::new(
                        egui::RichText::new(tool.display_name()).size(14.0).strong(),
                    )
                    .min_size(egui::vec2(0.0, 28.0))
                    .selected(selected);

                    if ui.add_enabled(has_document, button).clicked() {
                        armed = Some(*tool);
                    }
                }

                ui.add_space(8.0);
                ui.separator();
                ui.add_space(8.0);

                if ui
                    .add_enabled(can_undo, egui::Button::new("Undo"))
                    .on_hover_text("Ctrl+Z")
                    .clicked()
                {
                    undo = true;
                }
                if ui
                    .add_enabled(can_redo, egui::Button::new("Redo"))
                    .on_hover_text("Ctrl+Y / Ctrl+Shift+Z")
                    .clicked()
                {
                    redo = true;
                }
                if ui
                    .add_enabled(controller.selection().is_some(), egui::Button::new("Delete"))
                    .on_hover_text("Delete / Backspace")
                    .clicked()
                {
                    delete = true;
                }

                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    ui.label(egui::RichText::new(title).weak());
                });
            });
        });

    let Some(doc) = documents.active_mut() else {
        return Ok(());
    };
    if let Some(tool) = armed {
        controller.arm_tool(doc, tool);
    }
    if undo {
        controller.undo(doc);
    }
    if redo {
        controller.redo(doc);
    }
    if delete {
        controller.delete_selected(doc);
    }
    Ok(())
}

/// Secondary toolbar with the style new annotations get from the armed tool
pub fn tool_settings_ui(
    mut contexts: EguiContexts,
    controller: Res<InteractionController>,
    mut config: ResMut<AppConfig>,
    mut save_events: MessageWriter<SaveConfigRequest>,
) -> Result {
    let tool = controller.tool();
    if !tool.is_creation_tool() {
        return Ok(());
    }

    // Edit a copy so the config only registers a change when something moved
    let mut style = config.data.style.clone();
    let mut commit = false;

    egui::TopBottomPanel::top("tool_settings")
        .frame(
            egui::Frame::side_top_panel(&contexts.ctx_mut()?.style())
                .inner_margin(egui::Margin::symmetric(12, 6))
                .fill(egui::Color32::from_rgb(45, 45, 48)),
        )
        .show(contexts.ctx_mut()?, |ui| {
            ui.horizontal(|ui| {
                ui.spacing_mut().item_spacing.x = 6.0;
                ui.label(
                    egui::RichText::new(format!("New {} style:", tool_noun(tool)))
                        .color(egui::Color32::LIGHT_GRAY),
                );
                ui.add_space(8.0);
                commit |= match tool {
                    Tool::Text => text_style_controls(ui, &mut style),
                    Tool::Arrow => arrow_style_controls(ui, &mut style),
                    Tool::Highlight => highlight_style_controls(ui, &mut style),
                    Tool::Select => false,
                };
            });
        });

    if style != config.data.style {
        config.data.style = style;
        config.dirty = true;
    }
    if commit && config.dirty {
        save_events.write(SaveConfigRequest);
    }
    Ok(())
}

fn tool_noun(tool: Tool) -> &'static str {
    match tool {
        Tool::Text => "text",
        Tool::Arrow => "arrow",
        Tool::Highlight => "highlight",
        Tool::Select => "annotation",
    }
}

/// True once an edit is finished (released, clicked or picked)
fn finished(response: &egui::Response) -> bool {
    response.drag_stopped() || response.lost_focus() || (response.changed() && !response.dragged())
}

fn text_style_controls(ui: &mut egui::Ui, style: &mut StyleDefaults) -> bool {
    let mut commit = false;

    ui.label("Text:");
    commit |= finished(&ui.add(egui::TextEdit::singleline(&mut style.text_content).desired_width(100.0)));

    ui.label("Size:");
    commit |= finished(&ui.add(
        egui::DragValue::new(&mut style.font_size)
            .range(8.0..=72.0)
            .speed(1.0)
            .suffix(" px"),
    ));

    ui.label("Color:");
    commit |= color_button(ui, &mut style.text_color);

    ui.label("Background:");
    egui::ComboBox::from_id_salt("style_background")
        .selected_text(style.background.display_name())
        .width(80.0)
        .show_ui(ui, |ui| {
            for background in LabelBackground::all() {
                if ui
                    .selectable_value(&mut style.background, *background, background.display_name())
                    .clicked()
                {
                    commit = true;
                }
            }
        });

    ui.label("Align:");
    egui::ComboBox::from_id_salt("style_align")
        .selected_text(style.align.display_name())
        .width(80.0)
        .show_ui(ui, |ui| {
            for align in LabelAlign::all() {
                if ui
                    .selectable_value(&mut style.align, *align, align.display_name())
                    .clicked()
                {
                    commit = true;
                }
            }
        });

    commit
}

fn arrow_style_controls(ui: &mut egui::Ui, style: &mut StyleDefaults) -> bool {
    let mut commit = false;

    ui.label("Color:");
    commit |= color_button(ui, &mut style.arrow_color);

    ui.label("Thickness:");
    commit |= finished(&ui.add(
        egui::DragValue::new(&mut style.arrow_thickness)
            .range(1.0..=20.0)
            .speed(0.5)
            .suffix(" px"),
    ));

    commit
}

fn highlight_style_controls(ui: &mut egui::Ui, style: &mut StyleDefaults) -> bool {
    let mut commit = false;

    ui.label("Color:");
    commit |= color_button(ui, &mut style.highlight_color);

    ui.label("Opacity:");
    commit |= finished(&ui.add(
        egui::Slider::new(&mut style.highlight_opacity, 0.0..=1.0).fixed_decimals(2),
    ));

    ui.label("Shape:");
    egui::ComboBox::from_id_salt("style_highlight_shape")
        .selected_text(style.highlight_shape.display_name())
        .width(80.0)
        .show_ui(ui, |ui| {
            for shape in HighlightShape::all() {
                if ui
                    .selectable_value(&mut style.highlight_shape, *shape, shape.display_name())
                    .clicked()
                {
                    commit = true;
                }
            }
        });

    commit
}
