//! In-memory key directory
//!
//! Maps each logical key to the newest record written for it.

use std::collections::HashMap;

use crate::codec::Value;

/// Where a record lives in the log
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexEntry {
    /// Byte position of the record's first byte (its checksum)
    pub offset: u64,
    /// Total record length, checksum included
    pub length: u32,
}

impl IndexEntry {
    /// Offset one past the record's last byte
    pub fn end(&self) -> u64 {
        self.offset + self.length as u64
    }
}

/// Last-writer-wins map from key to its newest record
///
/// Never persisted; rebuilt by the recovery scan on every open.
#[derive(Debug, Default)]
pub struct Index {
    entries: HashMap<Value, IndexEntry>,
    /// Records whose key was later rewritten (bytes still on disk)
    superseded: u64,
}

impl Index {
    pub fn new() -> Self {
        Self::default()
    }

    /// Point `key` at `entry`, returning the entry it replaced
    pub fn insert(&mut self, key: Value, entry: IndexEntry) -> Option<IndexEntry> {
        let previous = self.entries.insert(key, entry);
        if previous.is_some() {
            self.superseded += 1;
        }
        previous
    }

    pub fn get(&self, key: &Value) -> Option<IndexEntry> {
        self.entries.get(key).copied()
    }

    pub fn contains_key(&self, key: &Value) -> bool {
        self.entries.contains_key(key)
    }

    /// Number of live keys
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of records shadowed by a newer record for the same key
    pub fn superseded(&self) -> u64 {
        self.superseded
    }

    /// Keys in no particular order
    pub fn keys(&self) -> impl Iterator<Item = &Value> {
        self.entries.keys()
    }
}
