//! Message types for annotation storage operations.

use bevy::prelude::*;
use std::path::PathBuf;

/// Save the active image's annotations to the configured repository
#[derive(Message)]
pub struct SaveAnnotationsRequest;

/// Replace an image's annotations with what the repository holds
#[derive(Message)]
pub struct LoadAnnotationsRequest {
    pub image_id: String,
}

/// Append suggested annotations from a JSON file to the active image
#[derive(Message)]
pub struct ImportSuggestionsRequest {
    pub path: PathBuf,
}
