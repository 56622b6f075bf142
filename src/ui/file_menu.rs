use bevy::prelude::*;
use bevy::tasks::Task;
use bevy::window::WindowCloseRequested;
use bevy_egui::{EguiContexts, egui};
use futures_lite::future;
use std::path::PathBuf;

use crate::canvas::{ImageLoadError, OpenImageRequest, pick_image_file};
use crate::config::{AppConfig, ConfigResetNotification, SaveConfigRequest};
use crate::overlay::Documents;
use crate::storage::{
    AnnotationLoadError, AnnotationSaveError, AsyncStorageOperation, ImportSuggestionsRequest,
    SuggestionImportError, pick_suggestions_file,
};

#[derive(Resource, Default)]
pub struct FileMenuState {
    /// Quit was requested with unsaved annotations
    pub show_close_confirmation: bool,
    pending_open: Option<Task<Option<PathBuf>>>,
    pending_import: Option<Task<Option<PathBuf>>>,
}

impl FileMenuState {
    pub fn browse_for_image(&mut self) {
        if self.pending_open.is_none() {
            self.pending_open = Some(pick_image_file());
        }
    }

    pub fn browse_for_suggestions(&mut self) {
        if self.pending_import.is_none() {
            self.pending_import = Some(pick_suggestions_file());
        }
    }

    pub fn any_file_dialog_pending(&self) -> bool {
        self.pending_open.is_some() || self.pending_import.is_some()
    }
}

/// Polls native file dialogs and forwards the chosen paths
pub fn poll_file_dialogs(
    mut menu_state: ResMut<FileMenuState>,
    mut open_events: MessageWriter<OpenImageRequest>,
    mut import_events: MessageWriter<ImportSuggestionsRequest>,
) {
    if let Some(ref mut task) = menu_state.pending_open
        && let Some(result) = future::block_on(future::poll_once(task))
    {
        menu_state.pending_open = None;
        if let Some(path) = result {
            open_events.write(OpenImageRequest { path });
        }
    }

    if let Some(ref mut task) = menu_state.pending_import
        && let Some(result) = future::block_on(future::poll_once(task))
    {
        menu_state.pending_import = None;
        if let Some(path) = result {
            import_events.write(ImportSuggestionsRequest { path });
        }
    }
}

/// Shows `slot` as an error window; OK clears it
fn error_window(ctx: &egui::Context, title: &str, slot: &mut Option<String>) {
    let Some(message) = slot.as_deref() else {
        return;
    };

    let mut dismissed = false;
    egui::Window::new(title)
        .collapsible(false)
        .resizable(true)
        .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
        .show(ctx, |ui| {
            egui::ScrollArea::vertical().max_height(200.0).show(ui, |ui| {
                ui.colored_label(egui::Color32::RED, message);
            });
            ui.add_space(8.0);
            if ui.button("OK").clicked() {
                dismissed = true;
            }
        });

    if dismissed {
        *slot = None;
    }
}

/// Renders one dialog per outstanding image, load, save or import error
pub fn error_dialogs_ui(
    mut contexts: EguiContexts,
    mut image_error: ResMut<ImageLoadError>,
    mut load_error: ResMut<AnnotationLoadError>,
    mut save_error: ResMut<AnnotationSaveError>,
    mut import_error: ResMut<SuggestionImportError>,
) -> Result {
    let ctx = contexts.ctx_mut()?;
    error_window(ctx, "Open Image Error", &mut image_error.message);
    error_window(ctx, "Load Error", &mut load_error.message);
    error_window(ctx, "Save Error", &mut save_error.message);
    error_window(ctx, "Import Error", &mut import_error.message);
    Ok(())
}

/// Blocking "working" window while repository I/O is in flight
pub fn async_operation_modal_ui(
    mut contexts: EguiContexts,
    async_op: Res<AsyncStorageOperation>,
) -> Result {
    if !async_op.is_busy() {
        return Ok(());
    }

    egui::Window::new("Please Wait")
        .collapsible(false)
        .resizable(false)
        .title_bar(false)
        .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
        .show(contexts.ctx_mut()?, |ui| {
            ui.horizontal(|ui| {
                ui.spinner();
                ui.label(
                    async_op
                        .operation_description
                        .as_deref()
                        .unwrap_or("Working..."),
                );
            });
        });

    Ok(())
}

/// Tells the user their config file could not be used
pub fn config_reset_notification_ui(
    mut contexts: EguiContexts,
    mut notification: ResMut<ConfigResetNotification>,
    mut config: ResMut<AppConfig>,
    mut save_events: MessageWriter<SaveConfigRequest>,
) -> Result {
    if !notification.show {
        return Ok(());
    }

    egui::Window::new("Settings Reset")
        .collapsible(false)
        .resizable(false)
        .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
        .show(contexts.ctx_mut()?, |ui| {
            ui.label("Your settings could not be loaded and were reset to defaults.");
            if let Some(ref reason) = notification.reason {
                ui.add_space(5.0);
                ui.label(egui::RichText::new(reason).weak());
            }
            ui.add_space(10.0);

            if ui.button("OK").clicked() {
                // Overwrite the unreadable file with the defaults
                config.dirty = true;
                save_events.write(SaveConfigRequest);
                notification.show = false;
                notification.reason = None;
            }
        });

    Ok(())
}

/// Intercepts the primary window's close button while edits are unsaved
pub fn handle_window_close(
    mut close_events: MessageReader<WindowCloseRequested>,
    documents: Res<Documents>,
    mut menu_state: ResMut<FileMenuState>,
    mut exit: MessageWriter<AppExit>,
) {
    for _event in close_events.read() {
        if documents.unsaved().is_empty() {
            exit.write(AppExit::Success);
        } else {
            menu_state.show_close_confirmation = true;
        }
    }
}

pub fn unsaved_changes_dialog_ui(
    mut contexts: EguiContexts,
    mut menu_state: ResMut<FileMenuState>,
    documents: Res<Documents>,
    mut exit: MessageWriter<AppExit>,
) -> Result {
    if !menu_state.show_close_confirmation {
        return Ok(());
    }

    egui::Window::new("Unsaved Annotations")
        .collapsible(false)
        .resizable(false)
        .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
        .show(contexts.ctx_mut()?, |ui| {
            ui.label("These images have annotations that were not saved:");
            ui.add_space(5.0);
            for doc in documents.unsaved() {
                ui.label(egui::RichText::new(format!("• {}", doc.image.id)).weak());
            }
            ui.add_space(10.0);

            ui.horizontal(|ui| {
                if ui.button("Quit Without Saving").clicked() {
                    warn!("Quitting with {} unsaved images", documents.unsaved().len());
                    exit.write(AppExit::Success);
                    menu_state.show_close_confirmation = false;
                }
                if ui.button("Cancel").clicked() {
                    menu_state.show_close_confirmation = false;
                }
            });
        });

    Ok(())
}
