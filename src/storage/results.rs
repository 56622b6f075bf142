//! Result types for async storage operations.

use std::path::PathBuf;

use crate::overlay::Annotation;
use crate::overlay::suggestions::AnnotationRecord;

/// Result of an async save
pub struct SaveResult {
    pub image_id: String,
    /// Document revision that was written
    pub revision: u64,
    pub error: Option<String>,
}

/// Result of an async load
pub struct LoadResult {
    pub image_id: String,
    pub annotations: Option<Vec<Annotation>>,
    pub error: Option<String>,
}

/// Result of reading a suggestions file
pub struct ImportResult {
    pub image_id: String,
    pub path: PathBuf,
    pub records: Option<Vec<AnnotationRecord>>,
    pub error: Option<String>,
}
