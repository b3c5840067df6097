//! Insertion-ordered bookkeeping of live handles.
//!
//! Removals leave a tombstone in the order vector instead of shifting it, so
//! both insert and remove stay O(1) amortized while registration order is
//! preserved for teardown. Tombstones are trimmed from the tail eagerly and
//! compacted once they outnumber live entries.

use std::fmt;
use std::rc::Rc;

use rustc_hash::FxHashMap;

use crate::{HandleId, NativeWrapper};

/// Shared reference to a registered wrapper.
pub type WrapperRef = Rc<dyn NativeWrapper>;

/// Below this many slots compaction is never worth it.
const COMPACT_MIN_SLOTS: usize = 32;

#[derive(Default)]
pub(crate) struct Ledger {
    slots: Vec<Option<(HandleId, WrapperRef)>>,
    index: FxHashMap<HandleId, usize>,
}

impl Ledger {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            index: FxHashMap::with_capacity_and_hasher(capacity, Default::default()),
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.index.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub(crate) fn contains(&self, id: HandleId) -> bool {
        self.index.contains_key(&id)
    }

    /// Appends `wrapper` under `id` unless `id` is already present.
    ///
    /// Returns `false` for a duplicate; the existing entry keeps its position.
    pub(crate) fn insert(&mut self, id: HandleId, wrapper: WrapperRef) -> bool {
        if self.index.contains_key(&id) {
            return false;
        }
        self.index.insert(id, self.slots.len());
        self.slots.push(Some((id, wrapper)));
        true
    }

    pub(crate) fn remove(&mut self, id: HandleId) -> Option<WrapperRef> {
        let pos = self.index.remove(&id)?;
        let (_, wrapper) = self.slots[pos].take()?;
        self.trim_tail();
        self.maybe_compact();
        Some(wrapper)
    }

    /// Removes and returns the most recently registered live entry.
    pub(crate) fn pop_latest(&mut self) -> Option<(HandleId, WrapperRef)> {
        while let Some(slot) = self.slots.pop() {
            if let Some((id, wrapper)) = slot {
                self.index.remove(&id);
                return Some((id, wrapper));
            }
        }
        None
    }

    /// Live identities, oldest first.
    pub(crate) fn ids(&self) -> impl DoubleEndedIterator<Item = HandleId> + '_ {
        self.slots.iter().flatten().map(|(id, _)| *id)
    }

    /// Moves every entry of `later` behind the entries of `self`.
    ///
    /// Identities already present in `self` are skipped.
    pub(crate) fn append(&mut self, later: Ledger) {
        for (id, wrapper) in later.slots.into_iter().flatten() {
            self.insert(id, wrapper);
        }
    }

    fn trim_tail(&mut self) {
        while matches!(self.slots.last(), Some(None)) {
            self.slots.pop();
        }
    }

    fn maybe_compact(&mut self) {
        if self.slots.len() < COMPACT_MIN_SLOTS || self.slots.len() <= 2 * self.index.len() {
            return;
        }
        self.slots.retain(Option::is_some);
        for (pos, slot) in self.slots.iter().enumerate() {
            if let Some((id, _)) = slot {
                self.index.insert(*id, pos);
            }
        }
    }

    #[cfg(test)]
    fn slot_count(&self) -> usize {
        self.slots.len()
    }
}

impl fmt::Debug for Ledger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.ids()).finish()
    }
}
