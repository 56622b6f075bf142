//! Append-only merge of externally suggested annotations.

use std::collections::HashSet;

use serde::Deserialize;

use super::annotation::{Annotation, AnnotationId, AnnotationKind, fresh_id, now_millis};
use super::document::ImageDocument;

/// An annotation as supplied by an outside source; bookkeeping is optional
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnnotationRecord {
    #[serde(default)]
    pub id: Option<AnnotationId>,
    #[serde(default)]
    pub created_at: Option<i64>,
    #[serde(default)]
    pub updated_at: Option<i64>,
    #[serde(default)]
    pub z_index: Option<i64>,
    #[serde(flatten)]
    pub kind: AnnotationKind,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum SuggestionPayload {
    List(Vec<AnnotationRecord>),
    Wrapped { annotations: Vec<AnnotationRecord> },
}

/// Parse either a bare array of records or `{ "annotations": [...] }`
pub fn parse_suggestions(json: &str) -> serde_json::Result<Vec<AnnotationRecord>> {
    Ok(match serde_json::from_str(json)? {
        SuggestionPayload::List(records) => records,
        SuggestionPayload::Wrapped { annotations } => annotations,
    })
}

/// Append `records` after the current list, never replacing anything.
///
/// Missing or colliding ids get fresh ones, missing timestamps get now and
/// ranks continue above the current maximum. Records with non-finite
/// numbers or zero-length arrows are skipped. One snapshot is recorded when anything is added.
pub fn merge_suggestions(doc: &mut ImageDocument, records: Vec<AnnotationRecord>) -> Vec<AnnotationId> {
    let now = now_millis();
    let mut taken: HashSet<AnnotationId> = doc.store.list().iter().map(|a| a.id.clone()).collect();
    let mut next_z = doc.store.next_z_index();

    let mut accepted = Vec::new();
    for record in records {
        let id = match record.id {
            Some(id) if !id.is_empty() && !taken.contains(&id) => id,
            _ => fresh_id(record.kind.type_name()),
        };
        let created_at = record.created_at.unwrap_or(now);
        let mut annotation = Annotation {
            id,
            created_at,
            updated_at: record.updated_at.unwrap_or(created_at),
            z_index: next_z,
            kind: record.kind,
        };
        if !annotation.sanitize() {
            continue;
        }
        taken.insert(annotation.id.clone());
        next_z += 1;
        accepted.push(annotation);
    }

    if accepted.is_empty() {
        return Vec::new();
    }
    doc.record_snapshot();
    let ids: Vec<AnnotationId> = accepted.iter().map(|a| a.id.clone()).collect();
    for annotation in accepted {
        doc.store.upsert(annotation);
    }
    doc.mark_changed();
    ids
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use bevy::prelude::*;

    use super::*;
    use crate::overlay::annotation::StyleDefaults;
    use crate::overlay::document::ImageInfo;

    fn document() -> ImageDocument {
        ImageDocument::new(
            ImageInfo {
                id: "img".to_string(),
                path: PathBuf::from("img.png"),
                width: 100,
                height: 100,
            },
            20,
        )
    }

    #[test]
    fn test_parse_both_payload_shapes() {
        let bare = r##"[{"type":"arrow","startX":0,"startY":0,"endX":5,"endY":5,"color":"#000000","thickness":2}]"##;
        let wrapped = format!(r#"{{"annotations": {bare}}}"#);
        assert_eq!(parse_suggestions(bare).unwrap().len(), 1);
        assert_eq!(parse_suggestions(&wrapped).unwrap().len(), 1);
        assert!(parse_suggestions("{}").is_err());
    }

    #[test]
    fn test_merge_appends_and_assigns_ids() {
        let mut doc = document();
        let existing = Annotation::new(StyleDefaults::default().text_label(Vec2::ZERO), 4);
        let existing_id = existing.id.clone();
        doc.store.upsert(existing);

        let records = parse_suggestions(&format!(
            r##"[
                {{"type":"highlight","x":1,"y":2,"width":30,"height":20,"color":"#FFD600","opacity":0.4}},
                {{"id":"{existing_id}","type":"arrow","startX":0,"startY":0,"endX":5,"endY":5,"color":"#000000","thickness":2}},
                {{"id":"keep_me","type":"arrow","startX":0,"startY":0,"endX":9,"endY":9,"color":"#000000","thickness":2}}
            ]"##
        ))
        .unwrap();
        let ids = merge_suggestions(&mut doc, records);

        assert_eq!(ids.len(), 3);
        assert_eq!(doc.store.len(), 4);
        assert_eq!(doc.store.list()[0].id, existing_id);
        assert!(ids[0].starts_with("highlight_"));
        assert_ne!(ids[1], existing_id);
        assert_eq!(ids[2], "keep_me");
        let ranks: Vec<i64> = doc.store.list().iter().map(|a| a.z_index).collect();
        assert_eq!(ranks, vec![4, 5, 6, 7]);
        assert_eq!(doc.history.undo_count(), 1);
    }

    #[test]
    fn test_merge_drops_zero_length_arrows() {
        let mut doc = document();
        let records = parse_suggestions(
            r##"[
                {"type":"arrow","startX":7,"startY":7,"endX":7,"endY":7,"color":"#000000","thickness":2},
                {"type":"arrow","startX":0,"startY":0,"endX":20,"endY":0,"color":"#000000","thickness":2}
            ]"##,
        )
        .unwrap();
        let ids = merge_suggestions(&mut doc, records);

        assert_eq!(ids.len(), 1);
        assert_eq!(doc.store.len(), 1);
        assert_eq!(doc.store.list()[0].anchor(), Vec2::ZERO);
    }

    #[test]
    fn test_merge_of_nothing_records_nothing() {
        let mut doc = document();
        assert!(merge_suggestions(&mut doc, Vec::new()).is_empty());
        assert!(!doc.history.can_undo());
    }
}
