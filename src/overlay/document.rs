//! Per-image annotation documents.

use std::collections::HashMap;
use std::path::PathBuf;

use bevy::prelude::*;

use super::annotation::Annotation;
use super::history::HistoryManager;
use super::store::AnnotationStore;

/// What the overlay needs to know about a background image
#[derive(Clone, Debug, PartialEq)]
pub struct ImageInfo {
    /// Stable key used by storage backends
    pub id: String,
    pub path: PathBuf,
    pub width: u32,
    pub height: u32,
}

impl ImageInfo {
    /// Intrinsic size in canonical units
    pub fn size(&self) -> Vec2 {
        Vec2::new(self.width as f32, self.height as f32)
    }

    /// Derive the storage key from a file path: the file stem, with
    /// anything outside `[A-Za-z0-9_-]` replaced by `_`, plus a short
    /// name-based uuid of the canonical path. Images sharing a stem in
    /// different folders get different keys; the same file always gets the
    /// same key.
    pub fn id_for_path(path: &std::path::Path) -> String {
        let canonical = std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
        let stem = canonical
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let stem: String = stem
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        let stem = if stem.is_empty() { "image".to_string() } else { stem };

        let digest = uuid::Uuid::new_v5(
            &uuid::Uuid::NAMESPACE_URL,
            canonical.to_string_lossy().as_bytes(),
        )
        .simple()
        .to_string();
        format!("{}_{}", stem, &digest[..8])
    }
}

/// One image and the annotation set it owns
#[derive(Clone, Debug)]
pub struct ImageDocument {
    pub image: ImageInfo,
    pub store: AnnotationStore,
    pub history: HistoryManager,
    revision: u64,
    saved_revision: u64,
}

impl ImageDocument {
    pub fn new(image: ImageInfo, history_limit: usize) -> Self {
        Self {
            image,
            store: AnnotationStore::new(),
            history: HistoryManager::new(history_limit),
            revision: 0,
            saved_revision: 0,
        }
    }

    pub fn annotations(&self) -> &[Annotation] {
        self.store.list()
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn mark_changed(&mut self) {
        self.revision += 1;
    }

    pub fn mark_saved(&mut self, revision: u64) {
        self.saved_revision = self.saved_revision.max(revision);
    }

    /// True when the list changed since the last successful save or load
    pub fn is_dirty(&self) -> bool {
        self.revision != self.saved_revision
    }

    pub fn record_snapshot(&mut self) {
        self.history.record_snapshot(&self.store);
    }

    pub fn undo(&mut self) -> bool {
        let changed = self.history.undo(&mut self.store);
        if changed {
            self.mark_changed();
        }
        changed
    }

    pub fn redo(&mut self) -> bool {
        let changed = self.history.redo(&mut self.store);
        if changed {
            self.mark_changed();
        }
        changed
    }

    /// Replace the whole list as one undoable step (used by loads)
    pub fn replace_annotations(&mut self, annotations: Vec<Annotation>) {
        self.record_snapshot();
        self.store.replace_all(annotations);
        self.mark_changed();
    }
}

/// All open images keyed by image id, plus which one is on screen
#[derive(Resource, Default)]
pub struct Documents {
    documents: HashMap<String, ImageDocument>,
    active: Option<String>,
}

impl Documents {
    /// Make `image` the active document, creating it if it is new
    pub fn open(&mut self, image: ImageInfo, history_limit: usize) -> &mut ImageDocument {
        let id = image.id.clone();
        self.active = Some(id.clone());
        self.documents
            .entry(id)
            .and_modify(|doc| doc.image = image.clone())
            .or_insert_with(|| ImageDocument::new(image, history_limit))
    }

    pub fn active_id(&self) -> Option<&str> {
        self.active.as_deref()
    }

    pub fn active(&self) -> Option<&ImageDocument> {
        self.documents.get(self.active.as_deref()?)
    }

    pub fn active_mut(&mut self) -> Option<&mut ImageDocument> {
        self.documents.get_mut(self.active.as_deref()?)
    }

    pub fn get(&self, id: &str) -> Option<&ImageDocument> {
        self.documents.get(id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut ImageDocument> {
        self.documents.get_mut(id)
    }

    /// Open images with changes the repository has not seen
    pub fn unsaved(&self) -> Vec<&ImageDocument> {
        let mut unsaved: Vec<&ImageDocument> =
            self.documents.values().filter(|doc| doc.is_dirty()).collect();
        unsaved.sort_by(|a, b| a.image.id.cmp(&b.image.id));
        unsaved
    }

    /// Apply a new history cap to every open document
    pub fn set_history_limit(&mut self, limit: usize) {
        for doc in self.documents.values_mut() {
            doc.history.set_limit(limit);
        }
    }
}
