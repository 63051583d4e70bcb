//! String memoization.
//!
//! Repeated string values in a document can be encoded once with a
//! memoizable prefix (`utf8_mem`/`utf16_mem`) and referenced thereafter by a
//! single-byte `mem_ref`. The table is an explicit decoding context: one
//! table per document scan, passed by reference into every scanning call, so
//! independent decodes can never observe each other's entries.

use crate::binary::EMPTY_STRING;
use crate::bose::{BoseError, BoseResult};
use std::collections::HashMap;

const MEMO_SLOTS: usize = 1 << 8;

/// Fixed-capacity table of memoized string spans.
///
/// Each slot holds the full encoded bytes of a previously scanned memoizable
/// string; unwritten slots resolve to the canonical empty string. Once the
/// wrap-around index has visited all 256 slots the table freezes and further
/// registrations fail until [`reset`](MemoTable::reset).
pub struct MemoTable<'a> {
    slots: Vec<&'a [u8]>,
    index: u8,
    full: bool,
    seen: HashMap<usize, u8>,
}

impl<'a> MemoTable<'a> {
    #[inline]
    pub fn new() -> Self {
        MemoTable {
            slots: vec![EMPTY_STRING; MEMO_SLOTS],
            index: 0,
            full: false,
            seen: HashMap::new(),
        }
    }

    /// Registers the full encoded span of a memoizable string and returns its
    /// slot index. Registering a span that is already in the table is a no-op
    /// returning the existing index, so re-scanning a buffer never shifts
    /// slot assignments.
    pub fn register(&mut self, span: &'a [u8]) -> BoseResult<u8> {
        let key = span.as_ptr() as usize;
        if let Some(&index) = self.seen.get(&key) {
            return Ok(index);
        }
        if self.full {
            return Err(BoseError::MemoTableFull);
        }
        let index = self.index;
        self.slots[index as usize] = span;
        self.seen.insert(key, index);
        let (next, wrapped) = self.index.overflowing_add(1);
        self.index = next;
        if wrapped {
            self.full = true;
        }
        Ok(index)
    }

    /// Looks up the encoded string memoized at `index`. There is no failure
    /// path: the index domain is exactly the slot count, and unwritten slots
    /// hold the empty-string sentinel.
    #[inline]
    pub fn get(&self, index: u8) -> &'a [u8] {
        self.slots[index as usize]
    }

    /// Clears all slots back to the empty-string sentinel and unfreezes the
    /// table. Call between independent top-level values.
    pub fn reset(&mut self) {
        self.slots.clear();
        self.slots.resize(MEMO_SLOTS, EMPTY_STRING);
        self.index = 0;
        self.full = false;
        self.seen.clear();
    }

    #[inline]
    pub fn is_frozen(&self) -> bool {
        self.full
    }
}

impl<'a> Default for MemoTable<'a> {
    #[inline]
    fn default() -> Self {
        MemoTable::new()
    }
}
