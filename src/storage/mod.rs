//! Annotation persistence for each image.
//!
//! Lists are read and written through an [`AnnotationRepository`] chosen by
//! the storage backend in config. All repository I/O runs on the
//! `IoTaskPool`; completion is polled each frame and failures land in
//! message resources for the UI. Local state is never touched on failure.
//!
//! ## Module Structure
//!
//! - [`repository`] - Repository trait and the file, memory and HTTP stores
//! - [`messages`] - Save, load and import requests
//! - [`resources`] - Error, busy and active-repository resources
//! - [`save`] / [`load`] / [`import`] - Systems that start and poll tasks

mod import;
mod load;
mod messages;
pub mod repository;
mod resources;
mod results;
mod save;


pub use import::pick_suggestions_file;
pub use messages::{ImportSuggestionsRequest, LoadAnnotationsRequest, SaveAnnotationsRequest};
pub use repository::{
    AnnotationRepository, HttpRepository, JsonFileRepository, MemoryRepository, RepositoryError,
};
pub use resources::{
    ActiveRepository, AnnotationLoadError, AnnotationSaveError, AsyncStorageOperation,
    SuggestionImportError,
};

use bevy::prelude::*;

use crate::config::{AppConfig, ConfigLoaded};

/// Rebuild the repository when the configured backend changes
fn sync_repository_with_config(config: Res<AppConfig>, mut active: ResMut<ActiveRepository>) {
    if active.backend == config.data.storage {
        return;
    }
    *active = ActiveRepository::new(config.data.storage.clone());
    info!("Annotation storage: {}", active.repository.describe());
}

pub struct StoragePlugin;

impl Plugin for StoragePlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<ActiveRepository>()
            .init_resource::<AsyncStorageOperation>()
            .init_resource::<AnnotationLoadError>()
            .init_resource::<AnnotationSaveError>()
            .init_resource::<SuggestionImportError>()
            .add_message::<SaveAnnotationsRequest>()
            .add_message::<LoadAnnotationsRequest>()
            .add_message::<ImportSuggestionsRequest>()
            .add_systems(Startup, sync_repository_with_config.after(ConfigLoaded))
            .add_systems(
                Update,
                (
                    sync_repository_with_config.run_if(resource_changed::<AppConfig>),
                    load::load_on_image_opened,
                    save::save_annotations_system.run_if(on_message::<SaveAnnotationsRequest>),
                    load::load_annotations_system.run_if(on_message::<LoadAnnotationsRequest>),
                    import::import_suggestions_system
                        .run_if(on_message::<ImportSuggestionsRequest>),
                    save::poll_save_tasks,
                    load::poll_load_tasks,
                    import::poll_import_tasks,
                )
                    .chain(),
            );
    }
}
