//! Importing suggested annotations from a JSON file.

use bevy::prelude::*;
use bevy::tasks::{AsyncComputeTaskPool, IoTaskPool, Task};
use futures_lite::future;
use std::path::PathBuf;

use crate::overlay::{Documents, InteractionController};
use crate::overlay::suggestions::{merge_suggestions, parse_suggestions};

use super::messages::ImportSuggestionsRequest;
use super::resources::{ImportSuggestionsTask, SuggestionImportError};
use super::results::ImportResult;

/// Spawn a native open dialog for a suggestions file
pub fn pick_suggestions_file() -> Task<Option<PathBuf>> {
    AsyncComputeTaskPool::get().spawn(async {
        rfd::AsyncFileDialog::new()
            .set_title("Import Suggestions")
            .add_filter("Annotation JSON", &["json"])
            .pick_file()
            .await
            .map(|h| h.path().to_path_buf())
    })
}

/// Starts reading a suggestions file for the active image
pub fn import_suggestions_system(
    mut commands: Commands,
    mut events: MessageReader<ImportSuggestionsRequest>,
    documents: Res<Documents>,
) {
    for event in events.read() {
        let Some(image_id) = documents.active_id().map(str::to_string) else {
            warn!("Cannot import suggestions: no image is open");
            continue;
        };
        let path = event.path.clone();

        let task = IoTaskPool::get().spawn(async move {
            let json = match std::fs::read_to_string(&path) {
                Ok(content) => content,
                Err(e) => {
                    return ImportResult {
                        image_id,
                        path,
                        records: None,
                        error: Some(format!("Failed to read file: {}", e)),
                    };
                }
            };
            match parse_suggestions(&json) {
                Ok(records) => ImportResult {
                    image_id,
                    path,
                    records: Some(records),
                    error: None,
                },
                Err(e) => ImportResult {
                    image_id,
                    path,
                    records: None,
                    error: Some(format!("Failed to parse suggestions: {}", e)),
                },
            }
        });

        commands.spawn(ImportSuggestionsTask(task));
    }
}

/// Polls import tasks and merges the suggestions into their image
pub fn poll_import_tasks(
    mut commands: Commands,
    mut tasks: Query<(Entity, &mut ImportSuggestionsTask)>,
    mut documents: ResMut<Documents>,
    mut controller: ResMut<InteractionController>,
    mut import_error: ResMut<SuggestionImportError>,
) {
    for (entity, mut task) in tasks.iter_mut() {
        let Some(result) = future::block_on(future::poll_once(&mut task.0)) else {
            continue;
        };
        commands.entity(entity).despawn();

        if let Some(error) = result.error {
            error!("{}", error);
            import_error.message = Some(error);
            continue;
        }
        import_error.message = None;

        let is_active = documents.active_id() == Some(result.image_id.as_str());
        let (Some(records), Some(doc)) = (result.records, documents.get_mut(&result.image_id))
        else {
            continue;
        };
        // A gesture rolled back later would drop the merged records
        if is_active {
            controller.cancel(doc);
        }
        let offered = records.len();
        let added = merge_suggestions(doc, records);
        info!(
            "Imported {} of {} suggestions from {:?} into {}",
            added.len(),
            offered,
            result.path,
            result.image_id
        );
    }
}
