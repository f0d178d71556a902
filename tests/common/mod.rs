//! Common test utilities for integration tests.

#![allow(dead_code)]

pub mod harness;

use slint_diagram_sync::{Key, RecordKind, SyncOutcome};
use std::cell::RefCell;
use std::rc::Rc;

/// Tracks what the editor reported back during a test.
#[derive(Default, Clone)]
pub struct CallbackTracker {
    /// Every selection notification the widget sent, in order
    pub selection_changed: Rc<RefCell<Vec<Option<(RecordKind, Key)>>>>,
    /// Outcome of every render
    pub renders: Rc<RefCell<Vec<SyncOutcome>>>,
}

impl CallbackTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear all recorded callbacks.
    pub fn clear(&self) {
        self.selection_changed.borrow_mut().clear();
        self.renders.borrow_mut().clear();
    }

    pub fn last_render(&self) -> Option<SyncOutcome> {
        self.renders.borrow().last().copied()
    }
}

/// Install a test-writer subscriber once so `RUST_LOG`-style output shows up
/// under `cargo test -- --nocapture`.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}
