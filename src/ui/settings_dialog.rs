use bevy::prelude::*;
use bevy_egui::{EguiContexts, egui};

use crate::config::{AppConfig, SaveConfigRequest, StorageBackend};
use crate::constants::DEFAULT_HISTORY_LIMIT;
use crate::overlay::StyleDefaults;

/// Backend choice as shown in the combo box
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
enum BackendChoice {
    #[default]
    File,
    Memory,
    Remote,
}

impl BackendChoice {
    fn all() -> &'static [BackendChoice] {
        &[BackendChoice::File, BackendChoice::Memory, BackendChoice::Remote]
    }

    fn display_name(&self) -> &'static str {
        match self {
            BackendChoice::File => StorageBackend::File.display_name(),
            BackendChoice::Memory => StorageBackend::Memory.display_name(),
            BackendChoice::Remote => "Remote service",
        }
    }
}

/// State for the settings dialog
#[derive(Resource, Default)]
pub struct SettingsDialogState {
    /// Whether the dialog is open
    pub is_open: bool,
    backend: BackendChoice,
    /// Edited remote base URL (kept while another backend is chosen)
    remote_url: String,
    keep_tool_armed: bool,
    history_limit: usize,
    reset_style: bool,
    /// Whether changes have been made
    has_changes: bool,
}

impl SettingsDialogState {
    /// Open the dialog with fields taken from the current config
    pub fn open(&mut self, config: &AppConfig) {
        self.load_from_config(config);
        self.is_open = true;
    }

    fn load_from_config(&mut self, config: &AppConfig) {
        let data = &config.data;
        let (backend, remote_url) = match &data.storage {
            StorageBackend::File => (BackendChoice::File, String::new()),
            StorageBackend::Memory => (BackendChoice::Memory, String::new()),
            StorageBackend::Remote { base_url } => (BackendChoice::Remote, base_url.clone()),
        };
        self.backend = backend;
        self.remote_url = remote_url;
        self.keep_tool_armed = data.keep_tool_armed;
        self.history_limit = data.history_limit;
        self.reset_style = false;
        self.has_changes = false;
    }

    /// The backend to store, or None when the remote URL is missing
    fn storage(&self) -> Option<StorageBackend> {
        match self.backend {
            BackendChoice::File => Some(StorageBackend::File),
            BackendChoice::Memory => Some(StorageBackend::Memory),
            BackendChoice::Remote => {
                let base_url = self.remote_url.trim();
                if base_url.is_empty() {
                    None
                } else {
                    Some(StorageBackend::Remote {
                        base_url: base_url.to_string(),
                    })
                }
            }
        }
    }
}

/// Renders the settings dialog
pub fn settings_dialog_ui(
    mut contexts: EguiContexts,
    mut dialog_state: ResMut<SettingsDialogState>,
    mut config: ResMut<AppConfig>,
    mut save_events: MessageWriter<SaveConfigRequest>,
) -> Result {
    if !dialog_state.is_open {
        return Ok(());
    }

    let mut should_close = false;
    let mut should_save = false;
    let storage = dialog_state.storage();

    egui::Window::new("Settings")
        .collapsible(false)
        .resizable(true)
        .min_width(400.0)
        .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
        .show(contexts.ctx_mut()?, |ui| {
            ui.heading("Application Settings");
            ui.add_space(12.0);

            // Storage section
            ui.group(|ui| {
                ui.label(egui::RichText::new("Annotation Storage").strong());
                ui.add_space(8.0);

                ui.horizontal(|ui| {
                    ui.label("Backend:");
                    egui::ComboBox::from_id_salt("storage_backend")
                        .selected_text(dialog_state.backend.display_name())
                        .show_ui(ui, |ui| {
                            for choice in BackendChoice::all() {
                                if ui
                                    .selectable_value(
                                        &mut dialog_state.backend,
                                        *choice,
                                        choice.display_name(),
                                    )
                                    .clicked()
                                {
                                    dialog_state.has_changes = true;
                                }
                            }
                        });
                });

                if dialog_state.backend == BackendChoice::Remote {
                    ui.horizontal(|ui| {
                        ui.label("Base URL:");
                        let response = ui.add(
                            egui::TextEdit::singleline(&mut dialog_state.remote_url)
                                .desired_width(280.0)
                                .hint_text("http://localhost:3000"),
                        );
                        if response.changed() {
                            dialog_state.has_changes = true;
                        }
                    });
                }

                ui.add_space(4.0);
                ui.label(
                    egui::RichText::new(match dialog_state.backend {
                        BackendChoice::File => format!(
                            "Saved as JSON in {}",
                            crate::paths::annotations_dir().display()
                        ),
                        BackendChoice::Memory => {
                            "Kept until the application exits.".to_string()
                        }
                        BackendChoice::Remote => {
                            "Read and written through /api/annotations.".to_string()
                        }
                    })
                    .weak()
                    .small(),
                );
            });

            ui.add_space(12.0);

            // Editing section
            ui.group(|ui| {
                ui.label(egui::RichText::new("Editing").strong());
                ui.add_space(8.0);

                if ui
                    .checkbox(
                        &mut dialog_state.keep_tool_armed,
                        "Keep tool selected after creating an annotation",
                    )
                    .changed()
                {
                    dialog_state.has_changes = true;
                }

                ui.horizontal(|ui| {
                    ui.label("Undo steps per image:");
                    if ui
                        .add(
                            egui::DragValue::new(&mut dialog_state.history_limit)
                                .range(1..=500)
                                .speed(1.0),
                        )
                        .changed()
                    {
                        dialog_state.has_changes = true;
                    }
                    ui.label(
                        egui::RichText::new(format!("default {}", DEFAULT_HISTORY_LIMIT)).weak(),
                    );
                });

                if ui
                    .checkbox(&mut dialog_state.reset_style, "Reset annotation styles to defaults")
                    .changed()
                {
                    dialog_state.has_changes = true;
                }
            });

            ui.add_space(16.0);

            // Action buttons
            ui.horizontal(|ui| {
                if ui
                    .add_enabled(
                        dialog_state.has_changes && storage.is_some(),
                        egui::Button::new("Save"),
                    )
                    .clicked()
                {
                    should_save = true;
                }

                if ui.button("Cancel").clicked() {
                    should_close = true;
                }

                if storage.is_none() {
                    ui.colored_label(egui::Color32::YELLOW, "Enter a base URL");
                }
            });
        });

    // Handle save
    if should_save && let Some(storage) = storage {
        config.data.storage = storage;
        config.data.keep_tool_armed = dialog_state.keep_tool_armed;
        config.data.history_limit = dialog_state.history_limit.max(1);
        if dialog_state.reset_style {
            config.data.style = StyleDefaults::default();
        }
        config.dirty = true;
        save_events.write(SaveConfigRequest);
        info!("Settings updated");
        should_close = true;
    }

    // Handle close
    if should_close {
        dialog_state.is_open = false;
        dialog_state.load_from_config(&config);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remote_backend_needs_url() {
        let mut state = SettingsDialogState {
            backend: BackendChoice::Remote,
            ..default()
        };
        assert_eq!(state.storage(), None);

        state.remote_url = "  http://localhost:3000 ".to_string();
        assert_eq!(
            state.storage(),
            Some(StorageBackend::Remote {
                base_url: "http://localhost:3000".to_string()
            })
        );
    }

    #[test]
    fn test_loads_fields_from_config() {
        let mut config = AppConfig::default();
        config.data.storage = StorageBackend::Remote {
            base_url: "http://example.test".to_string(),
        };
        config.data.keep_tool_armed = true;
        config.data.history_limit = 7;

        let mut state = SettingsDialogState::default();
        state.open(&config);

        assert!(state.is_open);
        assert_eq!(state.backend, BackendChoice::Remote);
        assert_eq!(state.remote_url, "http://example.test");
        assert!(state.keep_tool_armed);
        assert_eq!(state.history_limit, 7);
        assert!(!state.has_changes);
    }
}
