use super::annotation::Annotation;

/// Ordered annotation list for one image.
///
/// List order is paint order: later entries paint on top. The store knows
/// nothing about history; callers snapshot before mutating.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AnnotationStore {
    annotations: Vec<Annotation>,
}

impl AnnotationStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn list(&self) -> &[Annotation] {
        &self.annotations
    }

    pub fn get(&self, id: &str) -> Option<&Annotation> {
        self.annotations.iter().find(|a| a.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.annotations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.annotations.is_empty()
    }

    /// Replace the record with the same id, or append it.
    ///
    /// The record is sanitized first; returns false (and leaves the list
    /// untouched) when it holds non-finite numbers.
    pub fn upsert(&mut self, mut annotation: Annotation) -> bool {
        if !annotation.sanitize() {
            return false;
        }
        match self.annotations.iter_mut().find(|a| a.id == annotation.id) {
            Some(existing) => *existing = annotation,
            None => self.annotations.push(annotation),
        }
        true
    }

    /// Drop the record with `id`, returning it. Absent ids are a no-op.
    pub fn remove(&mut self, id: &str) -> Option<Annotation> {
        let index = self.annotations.iter().position(|a| a.id == id)?;
        Some(self.annotations.remove(index))
    }

    /// Swap in a whole list (history restore, load). Invalid records are
    /// skipped and duplicate ids keep their first occurrence.
    pub fn replace_all(&mut self, annotations: Vec<Annotation>) {
        self.annotations.clear();
        for annotation in annotations {
            if !self.contains(&annotation.id) {
                self.upsert(annotation);
            }
        }
    }

    /// Rank for a record that should paint above everything present
    pub fn next_z_index(&self) -> i64 {
        self.annotations
            .iter()
            .map(|a| a.z_index)
            .max()
            .map_or(0, |max| max + 1)
    }

    pub(crate) fn snapshot(&self) -> Vec<Annotation> {
        self.annotations.clone()
    }

    pub(crate) fn restore(&mut self, annotations: Vec<Annotation>) {
        self.annotations = annotations;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::overlay::annotation::{AnnotationKind, ArrowShape};

    fn arrow(id: &str, x: f32) -> Annotation {
        let mut annotation = Annotation::new(
            AnnotationKind::Arrow(ArrowShape {
                start_x: x,
                start_y: 0.0,
                end_x: x + 10.0,
                end_y: 0.0,
                color: "#3b82f6".to_string(),
                thickness: 3.0,
            }),
            0,
        );
        annotation.id = id.to_string();
        annotation
    }

    #[test]
    fn test_upsert_appends_then_replaces() {
        let mut store = AnnotationStore::new();
        assert!(store.upsert(arrow("a", 0.0)));
        assert!(store.upsert(arrow("b", 5.0)));
        assert!(store.upsert(arrow("a", 50.0)));

        assert_eq!(store.len(), 2);
        assert_eq!(store.list()[0].id, "a");
        assert_eq!(store.list()[0].anchor().x, 50.0);
        assert_eq!(store.list()[1].id, "b");
    }

    #[test]
    fn test_upsert_rejects_non_finite() {
        let mut store = AnnotationStore::new();
        assert!(!store.upsert(arrow("a", f32::INFINITY)));
        assert!(store.is_empty());
    }

    #[test]
    fn test_remove_missing_is_noop() {
        let mut store = AnnotationStore::new();
        store.upsert(arrow("a", 0.0));
        assert!(store.remove("missing").is_none());
        assert_eq!(store.len(), 1);
        assert!(store.remove("a").is_some());
        assert!(store.remove("a").is_none());
        assert!(store.is_empty());
    }

    #[test]
    fn test_replace_all_drops_duplicates() {
        let mut store = AnnotationStore::new();
        store.upsert(arrow("old", 0.0));
        store.replace_all(vec![arrow("x", 1.0), arrow("x", 2.0), arrow("y", 3.0)]);

        assert!(!store.contains("old"));
        assert_eq!(store.len(), 2);
        assert_eq!(store.get("x").map(|a| a.anchor().x), Some(1.0));
    }

    #[test]
    fn test_next_z_index_above_max() {
        let mut store = AnnotationStore::new();
        assert_eq!(store.next_z_index(), 0);
        let mut high = arrow("a", 0.0);
        high.z_index = 7;
        store.upsert(high);
        store.upsert(arrow("b", 0.0));
        assert_eq!(store.next_z_index(), 8);
    }
}
