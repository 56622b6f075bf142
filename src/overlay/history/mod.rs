//! Snapshot-based undo/redo for one image's annotation list.
//!
//! Every discrete user action records a deep copy of the whole list *before*
//! it mutates the store. Undo swaps the current list for the top snapshot and
//! keeps the current one for redo.
//!
//! ## Usage
//!
//! - **Ctrl+Z**: Undo the last action
//! - **Ctrl+Y** or **Ctrl+Shift+Z**: Redo the last undone action
//!
//! Continuous gestures (drag, resize, typing) record once at their start. A
//! gesture that is cancelled or ends without changing anything withdraws its
//! snapshot again with [`HistoryManager::discard_latest`].

mod snapshot_history;

#[cfg(test)]
mod tests;

pub use snapshot_history::HistoryManager;
