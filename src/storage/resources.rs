//! Resource types for storage state tracking.

use std::sync::Arc;

use bevy::prelude::*;
use bevy::tasks::Task;

use crate::config::StorageBackend;

use super::repository::{AnnotationRepository, repository_for};
use super::results::{ImportResult, LoadResult, SaveResult};

#[derive(Resource, Default)]
pub struct AnnotationLoadError {
    pub message: Option<String>,
}

/// Resource tracking save errors for display to user.
#[derive(Resource, Default)]
pub struct AnnotationSaveError {
    pub message: Option<String>,
}

#[derive(Resource, Default)]
pub struct SuggestionImportError {
    pub message: Option<String>,
}

/// Resource tracking async storage I/O for the busy modal
#[derive(Resource, Default)]
pub struct AsyncStorageOperation {
    pub is_saving: bool,
    pub is_loading: bool,
    /// Description of the current operation
    pub operation_description: Option<String>,
}

impl AsyncStorageOperation {
    pub fn is_busy(&self) -> bool {
        self.is_saving || self.is_loading
    }
}

/// The repository annotation lists are read from and written to
#[derive(Resource)]
pub struct ActiveRepository {
    pub backend: StorageBackend,
    pub repository: Arc<dyn AnnotationRepository>,
}

impl ActiveRepository {
    pub fn new(backend: StorageBackend) -> Self {
        let repository = repository_for(&backend);
        Self {
            backend,
            repository,
        }
    }
}

impl Default for ActiveRepository {
    fn default() -> Self {
        Self::new(StorageBackend::default())
    }
}

#[derive(Component)]
pub struct SaveAnnotationsTask(pub Task<SaveResult>);

#[derive(Component)]
pub struct LoadAnnotationsTask(pub Task<LoadResult>);

#[derive(Component)]
pub struct ImportSuggestionsTask(pub Task<ImportResult>);
