//! Unit tests for the history module.

use bevy::prelude::*;

use super::HistoryManager;
use crate::constants::DEFAULT_HISTORY_LIMIT;
use crate::overlay::annotation::{Annotation, AnnotationKind, ArrowShape};
use crate::overlay::store::AnnotationStore;

fn arrow_at(x: f32) -> Annotation {
    Annotation::new(
        AnnotationKind::Arrow(ArrowShape {
            start_x: x,
            start_y: 0.0,
            end_x: x + 20.0,
            end_y: 10.0,
            color: "#3b82f6".to_string(),
            thickness: 3.0,
        }),
        0,
    )
}

/// Record then mutate, the way every discrete action does
fn act(history: &mut HistoryManager, store: &mut AnnotationStore, step: usize) {
    history.record_snapshot(store);
    match step % 3 {
        0 => {
            store.upsert(arrow_at(step as f32 * 10.0));
        }
        1 => {
            if let Some(mut first) = store.list().first().cloned() {
                first.set_anchor(Vec2::new(step as f32, step as f32));
                store.upsert(first);
            }
        }
        _ => {
            if let Some(last) = store.list().last().map(|a| a.id.clone()) {
                store.remove(&last);
            }
        }
    }
}

#[test]
fn test_history_record_enables_undo() {
    let mut history = HistoryManager::default();
    let store = AnnotationStore::new();
    assert!(!history.can_undo());

    history.record_snapshot(&store);
    assert!(history.can_undo());
    assert_eq!(history.undo_count(), 1);
}

#[test]
fn test_undo_and_redo_on_empty_stacks_are_noops() {
    let mut history = HistoryManager::default();
    let mut store = AnnotationStore::new();
    store.upsert(arrow_at(0.0));
    let before = store.clone();

    assert!(!history.undo(&mut store));
    assert!(!history.redo(&mut store));
    assert_eq!(store, before);
}

#[test]
fn test_record_clears_redo() {
    let mut history = HistoryManager::default();
    let mut store = AnnotationStore::new();

    act(&mut history, &mut store, 0);
    act(&mut history, &mut store, 3);
    history.undo(&mut store);
    assert!(history.can_redo());

    act(&mut history, &mut store, 6);
    assert!(!history.can_redo());
}

#[test]
fn test_history_max_size() {
    let mut history = HistoryManager::default();
    let mut store = AnnotationStore::new();

    for step in 0..50 {
        act(&mut history, &mut store, step * 3);
    }

    assert_eq!(history.undo_count(), DEFAULT_HISTORY_LIMIT);
}

#[test]
fn test_undo_n_then_redo_n_restores_every_state() {
    let mut history = HistoryManager::default();
    let mut store = AnnotationStore::new();
    let mut states = vec![store.clone()];

    for step in 0..12 {
        act(&mut history, &mut store, step);
        states.push(store.clone());
    }

    let depth = history.undo_count();
    for n in 1..=depth {
        assert!(history.undo(&mut store));
        assert_eq!(store, states[states.len() - 1 - n]);
    }
    for n in (0..depth).rev() {
        assert!(history.redo(&mut store));
        assert_eq!(store, states[states.len() - 1 - n]);
    }
    assert!(!history.can_redo());
}

#[test]
fn test_discard_latest_restores_redo_stack() {
    let mut history = HistoryManager::default();
    let mut store = AnnotationStore::new();

    act(&mut history, &mut store, 0);
    act(&mut history, &mut store, 3);
    history.undo(&mut store);
    assert_eq!(history.redo_count(), 1);

    history.record_snapshot(&store);
    assert_eq!(history.redo_count(), 0);
    assert!(history.discard_latest());

    assert_eq!(history.undo_count(), 1);
    assert_eq!(history.redo_count(), 1);
    assert!(!history.discard_latest());
}

#[test]
fn test_discard_latest_puts_back_trimmed_snapshot() {
    let mut history = HistoryManager::new(2);
    let mut store = AnnotationStore::new();

    act(&mut history, &mut store, 0);
    act(&mut history, &mut store, 3);
    history.record_snapshot(&store);
    history.discard_latest();

    // The oldest snapshot (empty list) is still reachable
    history.undo(&mut store);
    history.undo(&mut store);
    assert!(store.is_empty());
}

#[test]
fn test_discard_after_undo_is_refused() {
    let mut history = HistoryManager::default();
    let mut store = AnnotationStore::new();

    act(&mut history, &mut store, 0);
    history.undo(&mut store);
    assert!(!history.discard_latest());
    assert_eq!(history.redo_count(), 1);
}

#[test]
fn test_set_limit_drops_oldest() {
    let mut history = HistoryManager::default();
    let mut store = AnnotationStore::new();
    for step in 0..5 {
        act(&mut history, &mut store, step * 3);
    }

    history.set_limit(2);
    assert_eq!(history.undo_count(), 2);
    history.set_limit(0);
    assert_eq!(history.limit(), 1);
}

#[test]
fn test_clear() {
    let mut history = HistoryManager::default();
    let mut store = AnnotationStore::new();
    act(&mut history, &mut store, 0);
    act(&mut history, &mut store, 3);
    history.undo(&mut store);

    history.clear();
    assert!(!history.can_undo());
    assert!(!history.can_redo());
}
