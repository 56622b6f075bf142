//! Annotation load system and task polling.

use bevy::prelude::*;
use bevy::tasks::IoTaskPool;
use futures_lite::future;

use crate::canvas::ImageOpened;
use crate::overlay::{Annotation, Documents, ImageDocument, InteractionController};

use super::messages::LoadAnnotationsRequest;
use super::resources::{
    ActiveRepository, AnnotationLoadError, AsyncStorageOperation, LoadAnnotationsTask,
};
use super::results::LoadResult;

/// Newly opened images pick up whatever the repository holds for them
pub fn load_on_image_opened(
    mut opened: MessageReader<ImageOpened>,
    mut requests: MessageWriter<LoadAnnotationsRequest>,
) {
    for event in opened.read().filter(|event| event.first_open) {
        requests.write(LoadAnnotationsRequest {
            image_id: event.image_id.clone(),
        });
    }
}

/// Starts an async load (repository I/O only)
pub fn load_annotations_system(
    mut commands: Commands,
    mut events: MessageReader<LoadAnnotationsRequest>,
    repository: Res<ActiveRepository>,
    mut async_op: ResMut<AsyncStorageOperation>,
) {
    for event in events.read() {
        let image_id = event.image_id.clone();
        let repository = repository.repository.clone();

        async_op.is_loading = true;
        async_op.operation_description = Some(format!("Loading annotations for {}...", image_id));

        let task = IoTaskPool::get().spawn(async move {
            match repository.load(&image_id) {
                Ok(annotations) => LoadResult {
                    image_id,
                    annotations: Some(annotations),
                    error: None,
                },
                Err(e) => LoadResult {
                    image_id,
                    annotations: None,
                    error: Some(format!("Failed to load annotations: {}", e)),
                },
            }
        });

        commands.spawn(LoadAnnotationsTask(task));
    }
}

/// Polls load tasks and swaps the loaded list into its document
pub fn poll_load_tasks(
    mut commands: Commands,
    mut tasks: Query<(Entity, &mut LoadAnnotationsTask)>,
    mut async_op: ResMut<AsyncStorageOperation>,
    mut documents: ResMut<Documents>,
    mut controller: ResMut<InteractionController>,
    mut load_error: ResMut<AnnotationLoadError>,
) {
    let mut pending = tasks.iter().count();
    for (entity, mut task) in tasks.iter_mut() {
        let Some(result) = future::block_on(future::poll_once(&mut task.0)) else {
            continue;
        };
        commands.entity(entity).despawn();
        pending -= 1;
        if pending == 0 {
            async_op.is_loading = false;
            async_op.operation_description = None;
        }

        if let Some(error) = result.error {
            error!("{}", error);
            load_error.message = Some(error);
            continue;
        }
        load_error.message = None;

        let Some(annotations) = result.annotations else {
            continue;
        };
        let is_active = documents.active_id() == Some(result.image_id.as_str());
        let Some(doc) = documents.get_mut(&result.image_id) else {
            warn!("Loaded annotations for {} but it is no longer open", result.image_id);
            continue;
        };

        if is_active {
            controller.reset(doc);
        }
        let count = annotations.len();
        apply_loaded(doc, annotations);
        info!("Loaded {} annotations for {}", count, result.image_id);
    }
}

/// Install a loaded list. A pristine document takes it as its starting
/// state; otherwise the replacement is one undoable step.
pub(super) fn apply_loaded(doc: &mut ImageDocument, annotations: Vec<Annotation>) {
    let pristine = doc.annotations().is_empty() && !doc.history.can_undo();
    if pristine {
        if annotations.is_empty() {
            return;
        }
        doc.store.replace_all(annotations);
        doc.mark_changed();
    } else {
        doc.replace_annotations(annotations);
    }
    doc.mark_saved(doc.revision());
}
