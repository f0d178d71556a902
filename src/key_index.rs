//! Key → list position lookup.
//!
//! The index is derived state. It must be rebuilt after any insertion or
//! removal that shifts positions; in-place replacement of a record keeps
//! every position valid, so no rebuild is needed there.

use crate::records::{Key, Keyed};
use std::collections::HashMap;

/// Maps record keys to their current position in one record list.
#[derive(Clone, Debug, Default)]
pub struct KeyIndex {
    positions: HashMap<Key, usize>,
}

impl KeyIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build an index for `records` in one pass.
    pub fn from_records<R: Keyed>(records: &[R]) -> Self {
        let mut index = Self::new();
        index.rebuild(records);
        index
    }

    /// Clear and repopulate from `records`.
    pub fn rebuild<R: Keyed>(&mut self, records: &[R]) {
        self.positions.clear();
        self.positions.reserve(records.len());
        for (pos, record) in records.iter().enumerate() {
            self.positions.insert(record.key(), pos);
        }
    }

    /// Position of `key`, or `None` if it is not tracked.
    pub fn lookup(&self, key: Key) -> Option<usize> {
        self.positions.get(&key).copied()
    }

    /// Record that `key` now lives at `pos` (used when appending).
    pub fn insert(&mut self, key: Key, pos: usize) {
        self.positions.insert(key, pos);
    }

    pub fn contains(&self, key: Key) -> bool {
        self.positions.contains_key(&key)
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}
