//! Annotation save system and task polling.

use bevy::prelude::*;
use bevy::tasks::IoTaskPool;
use futures_lite::future;

use crate::overlay::Documents;

use super::messages::SaveAnnotationsRequest;
use super::resources::{
    ActiveRepository, AnnotationSaveError, AsyncStorageOperation, SaveAnnotationsTask,
};
use super::results::SaveResult;

/// Starts an async save of the active image's list
pub fn save_annotations_system(
    mut commands: Commands,
    mut events: MessageReader<SaveAnnotationsRequest>,
    documents: Res<Documents>,
    repository: Res<ActiveRepository>,
    mut async_op: ResMut<AsyncStorageOperation>,
) {
    // Several requests in one frame save the same state
    if events.read().count() == 0 {
        return;
    }
    if async_op.is_saving {
        warn!("Save operation already in progress");
        return;
    }
    let Some(doc) = documents.active() else {
        warn!("Nothing to save: no image is open");
        return;
    };

    let image_id = doc.image.id.clone();
    let revision = doc.revision();
    let annotations = doc.annotations().to_vec();
    let repository = repository.repository.clone();

    async_op.is_saving = true;
    async_op.operation_description = Some(format!("Saving annotations for {}...", image_id));
    debug!(
        "Saving {} annotations for {} to {}",
        annotations.len(),
        image_id,
        repository.describe()
    );

    let task = IoTaskPool::get().spawn(async move {
        let error = repository
            .save(&image_id, &annotations)
            .err()
            .map(|e| format!("Failed to save annotations: {}", e));
        SaveResult {
            image_id,
            revision,
            error,
        }
    });

    commands.spawn(SaveAnnotationsTask(task));
}

/// Polls save tasks and handles completion
pub fn poll_save_tasks(
    mut commands: Commands,
    mut tasks: Query<(Entity, &mut SaveAnnotationsTask)>,
    mut async_op: ResMut<AsyncStorageOperation>,
    mut documents: ResMut<Documents>,
    mut save_error: ResMut<AnnotationSaveError>,
) {
    for (entity, mut task) in tasks.iter_mut() {
        let Some(result) = future::block_on(future::poll_once(&mut task.0)) else {
            continue;
        };
        async_op.is_saving = false;
        async_op.operation_description = None;

        match result.error {
            None => {
                info!("Annotations saved for {}", result.image_id);
                save_error.message = None;
                if let Some(doc) = documents.get_mut(&result.image_id) {
                    doc.mark_saved(result.revision);
                }
            }
            Some(error) => {
                error!("{}", error);
                save_error.message = Some(error);
            }
        }

        commands.entity(entity).despawn();
    }
}
