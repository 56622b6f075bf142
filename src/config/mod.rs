use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::constants::DEFAULT_HISTORY_LIMIT;
use crate::overlay::{Documents, InteractionController, StyleDefaults};

/// System set for config loading (other plugins can run after this)
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub struct ConfigLoaded;

/// Where annotation lists are kept
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StorageBackend {
    /// One JSON file per image in the data directory
    #[default]
    File,
    /// Process-lifetime store, cleared on restart
    Memory,
    /// Annotation service at `base_url`
    Remote { base_url: String },
}

impl StorageBackend {
    pub fn display_name(&self) -> &'static str {
        match self {
            StorageBackend::File => "Local files",
            StorageBackend::Memory => "In memory",
            StorageBackend::Remote { .. } => "Remote service",
        }
    }
}

fn default_history_limit() -> usize {
    DEFAULT_HISTORY_LIMIT
}

/// Application configuration persisted to disk
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfigData {
    /// Last opened image (reopened on startup when no path is given)
    #[serde(default)]
    pub last_image_path: Option<PathBuf>,

    #[serde(default)]
    pub storage: StorageBackend,

    /// Styling for new annotations
    #[serde(default)]
    pub style: StyleDefaults,

    /// Stay on a creation tool after placing an annotation
    #[serde(default)]
    pub keep_tool_armed: bool,

    /// Undo steps kept per image
    #[serde(default = "default_history_limit")]
    pub history_limit: usize,
}

impl Default for AppConfigData {
    fn default() -> Self {
        Self {
            last_image_path: None,
            storage: StorageBackend::default(),
            style: StyleDefaults::default(),
            keep_tool_armed: false,
            history_limit: DEFAULT_HISTORY_LIMIT,
        }
    }
}

/// Runtime configuration resource
#[derive(Resource)]
pub struct AppConfig {
    /// The persisted configuration data
    pub data: AppConfigData,
    /// Path to the config file
    pub config_path: PathBuf,
    /// Whether config needs to be saved (dirty flag)
    pub dirty: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data: AppConfigData::default(),
            config_path: get_config_path(),
            dirty: false,
        }
    }
}

/// Resource to notify user when config was reset to defaults
#[derive(Resource, Default)]
pub struct ConfigResetNotification {
    /// Whether to show the notification dialog
    pub show: bool,
    /// The reason for the reset (parse error, read error, etc.)
    pub reason: Option<String>,
}

/// Message to trigger config save
#[derive(Message)]
pub struct SaveConfigRequest;

/// Message to update the last image path in config
#[derive(Message)]
pub struct UpdateLastImagePathRequest {
    pub path: PathBuf,
}

/// Get the path to the config file (platform-appropriate location)
fn get_config_path() -> PathBuf {
    crate::paths::config_file()
}

/// Result of loading config from disk
struct LoadConfigResult {
    config: AppConfig,
    /// Error message if config was reset to defaults due to an error
    reset_reason: Option<String>,
}

/// Load configuration from disk
fn load_config() -> LoadConfigResult {
    let config_path = get_config_path();

    let (data, reset_reason) = if config_path.exists() {
        match std::fs::read_to_string(&config_path) {
            Ok(json) => match serde_json::from_str(&json) {
                Ok(data) => {
                    info!("Loaded config from {:?}", config_path);
                    (data, None)
                }
                Err(e) => {
                    warn!("Failed to parse config file: {}", e);
                    (
                        AppConfigData::default(),
                        Some(format!("Configuration file was corrupted: {}", e)),
                    )
                }
            },
            Err(e) => {
                warn!("Failed to read config file: {}", e);
                (
                    AppConfigData::default(),
                    Some(format!("Could not read configuration file: {}", e)),
                )
            }
        }
    } else {
        info!("No config file found, using defaults");
        (AppConfigData::default(), None)
    };

    LoadConfigResult {
        config: AppConfig {
            data,
            config_path,
            dirty: false,
        },
        reset_reason,
    }
}

/// Save configuration to disk
fn save_config(config: &AppConfig) {
    match serde_json::to_string_pretty(&config.data) {
        Ok(json) => {
            if let Err(e) = std::fs::write(&config.config_path, json) {
                error!("Failed to save config: {}", e);
            } else {
                info!("Config saved to {:?}", config.config_path);
            }
        }
        Err(e) => {
            error!("Failed to serialize config: {}", e);
        }
    }
}

/// Startup system to load config from disk into the existing resource
fn load_config_system(
    mut config: ResMut<AppConfig>,
    mut reset_notification: ResMut<ConfigResetNotification>,
) {
    let result = load_config();
    config.data = result.config.data;
    config.config_path = result.config.config_path;
    config.dirty = result.config.dirty;

    // Set notification if config was reset due to an error
    if let Some(reason) = result.reset_reason {
        reset_notification.show = true;
        reset_notification.reason = Some(reason);
    }
}

/// Push editing preferences from config into the overlay resources
fn apply_editing_preferences(
    config: Res<AppConfig>,
    mut controller: ResMut<InteractionController>,
    mut documents: ResMut<Documents>,
) {
    controller.style = config.data.style.clone();
    controller.keep_tool_armed = config.data.keep_tool_armed;
    documents.set_history_limit(config.data.history_limit);
}

/// System to save config when requested
fn save_config_system(
    mut events: MessageReader<SaveConfigRequest>,
    mut config: ResMut<AppConfig>,
) {
    for _ in events.read() {
        if config.dirty {
            save_config(&config);
            config.dirty = false;
        }
    }
}

/// System to update last image path
fn update_last_image_path_system(
    mut events: MessageReader<UpdateLastImagePathRequest>,
    mut config: ResMut<AppConfig>,
    mut save_events: MessageWriter<SaveConfigRequest>,
) {
    for event in events.read() {
        if config.data.last_image_path.as_ref() == Some(&event.path) {
            continue;
        }
        config.data.last_image_path = Some(event.path.clone());
        config.dirty = true;
        save_events.write(SaveConfigRequest);
    }
}

pub struct ConfigPlugin;

impl Plugin for ConfigPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<AppConfig>()
            .init_resource::<ConfigResetNotification>()
            .add_message::<SaveConfigRequest>()
            .add_message::<UpdateLastImagePathRequest>()
            .add_systems(
                Startup,
                (load_config_system, apply_editing_preferences)
                    .chain()
                    .in_set(ConfigLoaded),
            )
            .add_systems(
                Update,
                (
                    apply_editing_preferences.run_if(resource_changed::<AppConfig>),
                    save_config_system.run_if(on_message::<SaveConfigRequest>),
                    update_last_image_path_system.run_if(on_message::<UpdateLastImagePathRequest>),
                ),
            );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_config_data_default() {
        let data = AppConfigData::default();
        assert!(data.last_image_path.is_none());
        assert_eq!(data.storage, StorageBackend::File);
        assert_eq!(data.history_limit, 20);
        assert!(!data.keep_tool_armed);
        assert_eq!(data.style.font_size, 16.0);
    }

    #[test]
    fn test_app_config_data_serialization() {
        let data = AppConfigData {
            last_image_path: Some(PathBuf::from("/path/to/photo.png")),
            storage: StorageBackend::Remote {
                base_url: "http://localhost:3000".to_string(),
            },
            style: StyleDefaults::default(),
            keep_tool_armed: true,
            history_limit: 50,
        };

        let json = serde_json::to_string(&data).unwrap();
        let parsed: AppConfigData = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed.last_image_path, data.last_image_path);
        assert_eq!(parsed.storage, data.storage);
        assert_eq!(parsed.history_limit, 50);
        assert!(parsed.keep_tool_armed);
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let parsed: AppConfigData = serde_json::from_str("{}").unwrap();
        assert_eq!(parsed.history_limit, 20);
        assert_eq!(parsed.style, StyleDefaults::default());
        assert_eq!(parsed.storage, StorageBackend::File);
    }

    #[test]
    fn test_config_reset_notification_default() {
        let notification = ConfigResetNotification::default();
        assert!(!notification.show);
        assert!(notification.reason.is_none());
    }
}
