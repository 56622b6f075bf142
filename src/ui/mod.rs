mod file_menu;
mod properties;
mod settings_dialog;
mod toolbar;

use bevy::prelude::*;
use bevy_egui::EguiPrimaryContextPass;

use crate::canvas::ImageLoadError;
use crate::config::ConfigResetNotification;
use crate::storage::{
    AnnotationLoadError, AnnotationSaveError, AsyncStorageOperation, SuggestionImportError,
};

/// Resource that tracks whether any modal dialog is currently open.
/// Overlay input handlers check this to avoid processing input
/// when the user is interacting with a dialog.
#[derive(Resource, Default)]
pub struct DialogState {
    /// True when any modal dialog is open that should block overlay input
    pub any_modal_open: bool,
}

/// Run condition: returns true when no modal dialog is open.
///
/// Usage: `.run_if(no_dialog_open)`
pub fn no_dialog_open(dialog_state: Res<DialogState>) -> bool {
    !dialog_state.any_modal_open
}

/// System to aggregate all dialog open states into a single resource.
/// Runs in First schedule before input handlers.
#[allow(clippy::too_many_arguments)]
fn update_dialog_state(
    file_menu: Res<file_menu::FileMenuState>,
    settings: Res<settings_dialog::SettingsDialogState>,
    config_reset: Res<ConfigResetNotification>,
    image_error: Res<ImageLoadError>,
    load_error: Res<AnnotationLoadError>,
    save_error: Res<AnnotationSaveError>,
    import_error: Res<SuggestionImportError>,
    async_op: Res<AsyncStorageOperation>,
    mut dialog_state: ResMut<DialogState>,
) {
    dialog_state.any_modal_open = file_menu.show_close_confirmation
        || file_menu.any_file_dialog_pending()
        || settings.is_open
        || config_reset.show
        || image_error.message.is_some()
        || load_error.message.is_some()
        || save_error.message.is_some()
        || import_error.message.is_some()
        || async_op.is_busy();
}

pub struct UiPlugin;

impl Plugin for UiPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<DialogState>()
            .init_resource::<file_menu::FileMenuState>()
            .init_resource::<settings_dialog::SettingsDialogState>()
            .add_systems(
                EguiPrimaryContextPass,
                (
                    // Top panels first so the properties window sits below them
                    toolbar::toolbar_ui,
                    toolbar::tool_settings_ui,
                    properties::properties_panel_ui,
                )
                    .chain(),
            )
            .add_systems(
                EguiPrimaryContextPass,
                (
                    // Last: dialogs/overlays
                    file_menu::error_dialogs_ui,
                    file_menu::async_operation_modal_ui,
                    file_menu::config_reset_notification_ui,
                    file_menu::unsaved_changes_dialog_ui,
                    settings_dialog::settings_dialog_ui,
                )
                    .after(properties::properties_panel_ui),
            )
            .add_systems(
                Update,
                (file_menu::poll_file_dialogs, file_menu::handle_window_close),
            )
            // Update dialog state at the start of each frame
            .add_systems(First, update_dialog_state);
    }
}
