//! Keyed annotation stores: one list per image id.

use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};

use crate::config::StorageBackend;
use crate::overlay::Annotation;

/// Errors raised by an annotation repository
#[derive(Debug)]
pub enum RepositoryError {
    Io(std::io::Error),
    Parse(serde_json::Error),
    Http(String),
    Poisoned,
}

impl fmt::Display for RepositoryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RepositoryError::Io(e) => write!(f, "File error: {}", e),
            RepositoryError::Parse(e) => write!(f, "Invalid annotation data: {}", e),
            RepositoryError::Http(e) => write!(f, "Annotation service error: {}", e),
            RepositoryError::Poisoned => write!(f, "Annotation store is unavailable"),
        }
    }
}

impl std::error::Error for RepositoryError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RepositoryError::Io(e) => Some(e),
            RepositoryError::Parse(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for RepositoryError {
    fn from(e: std::io::Error) -> Self {
        RepositoryError::Io(e)
    }
}

impl From<serde_json::Error> for RepositoryError {
    fn from(e: serde_json::Error) -> Self {
        RepositoryError::Parse(e)
    }
}

/// Get/set store for annotation lists, keyed by image id.
///
/// An image with nothing stored loads as an empty list.
pub trait AnnotationRepository: Send + Sync {
    fn load(&self, image_id: &str) -> Result<Vec<Annotation>, RepositoryError>;
    fn save(&self, image_id: &str, annotations: &[Annotation]) -> Result<(), RepositoryError>;
    fn describe(&self) -> String;
}

/// Build the repository for a configured backend
pub fn repository_for(backend: &StorageBackend) -> Arc<dyn AnnotationRepository> {
    match backend {
        StorageBackend::File => Arc::new(JsonFileRepository::new(crate::paths::annotations_dir())),
        StorageBackend::Memory => Arc::new(MemoryRepository::default()),
        StorageBackend::Remote { base_url } => Arc::new(HttpRepository::new(base_url.clone())),
    }
}

/// One pretty-printed JSON array per image
pub struct JsonFileRepository {
    root: PathBuf,
}

impl JsonFileRepository {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    pub fn path_for(&self, image_id: &str) -> PathBuf {
        self.root.join(format!("{}.json", image_id))
    }
}

impl AnnotationRepository for JsonFileRepository {
    fn load(&self, image_id: &str) -> Result<Vec<Annotation>, RepositoryError> {
        let path = self.path_for(image_id);
        if !path.exists() {
            return Ok(Vec::new());
        }
        let json = std::fs::read_to_string(&path)?;
        Ok(serde_json::from_str(&json)?)
    }

    fn save(&self, image_id: &str, annotations: &[Annotation]) -> Result<(), RepositoryError> {
        std::fs::create_dir_all(&self.root)?;
        let json = serde_json::to_string_pretty(annotations)?;
        std::fs::write(self.path_for(image_id), json)?;
        Ok(())
    }

    fn describe(&self) -> String {
        format!("files in {}", self.root.display())
    }
}

/// Lives as long as the process
#[derive(Default)]
pub struct MemoryRepository {
    lists: Mutex<HashMap<String, Vec<Annotation>>>,
}

impl MemoryRepository {
    pub fn clear(&self) {
        if let Ok(mut lists) = self.lists.lock() {
            lists.clear();
        }
    }
}

impl AnnotationRepository for MemoryRepository {
    fn load(&self, image_id: &str) -> Result<Vec<Annotation>, RepositoryError> {
        let lists = self.lists.lock().map_err(|_| RepositoryError::Poisoned)?;
        Ok(lists.get(image_id).cloned().unwrap_or_default())
    }

    fn save(&self, image_id: &str, annotations: &[Annotation]) -> Result<(), RepositoryError> {
        let mut lists = self.lists.lock().map_err(|_| RepositoryError::Poisoned)?;
        lists.insert(image_id.to_string(), annotations.to_vec());
        Ok(())
    }

    fn describe(&self) -> String {
        "memory".to_string()
    }
}

#[derive(Deserialize)]
struct AnnotationsResponse {
    #[serde(default)]
    annotations: Vec<Annotation>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ImageAnnotations<'a> {
    image_id: &'a str,
    annotations: &'a [Annotation],
}

#[derive(Serialize)]
pub(super) struct SaveBody<'a> {
    annotations: [ImageAnnotations<'a>; 1],
}

impl<'a> SaveBody<'a> {
    pub(super) fn new(image_id: &'a str, annotations: &'a [Annotation]) -> Self {
        Self {
            annotations: [ImageAnnotations {
                image_id,
                annotations,
            }],
        }
    }
}

/// Remote annotation service speaking JSON over HTTP
pub struct HttpRepository {
    base_url: String,
}

impl HttpRepository {
    pub fn new(base_url: String) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/api/annotations", self.base_url)
    }
}

impl AnnotationRepository for HttpRepository {
    fn load(&self, image_id: &str) -> Result<Vec<Annotation>, RepositoryError> {
        let response = ureq::get(&self.endpoint())
            .set("User-Agent", "image-annotator")
            .query("imageId", image_id)
            .call();

        match response {
            Ok(resp) => {
                let body: AnnotationsResponse = resp
                    .into_json()
                    .map_err(|e| RepositoryError::Http(format!("Unreadable response: {}", e)))?;
                Ok(body.annotations)
            }
            Err(ureq::Error::Status(404, _)) => Ok(Vec::new()),
            Err(e) => Err(RepositoryError::Http(e.to_string())),
        }
    }

    fn save(&self, image_id: &str, annotations: &[Annotation]) -> Result<(), RepositoryError> {
        ureq::post(&self.endpoint())
            .set("User-Agent", "image-annotator")
            .send_json(SaveBody::new(image_id, annotations))
            .map_err(|e| RepositoryError::Http(e.to_string()))?;
        Ok(())
    }

    fn describe(&self) -> String {
        self.base_url.clone()
    }
}
