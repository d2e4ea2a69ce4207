// Copyright 2026 the Timberline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use alloc::vec::Vec;
use core::hash::Hash;

use hashbrown::HashMap;
use smallvec::SmallVec;
use timberline_geo::{BoundingBox, Polygon, Region};

use crate::damage::StyleDamage;

/// One selected parcel.
#[derive(Clone, Debug, PartialEq)]
pub struct ParcelSelection<K> {
    /// Caller-chosen identifier.
    pub id: K,
    /// Boundary of the parcel.
    pub polygon: Polygon,
    /// Monotonic insertion number; larger means more recent.
    pub sequence: u64,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Mark {
    Highlighted,
    Restored,
}

/// An ordered set of selected parcels with undo.
///
/// Entries keep their insertion order; [`undo_last`](Self::undo_last) removes
/// the most recent one still present. Each id appears at most once, so
/// [`toggle`](Self::toggle) is its own inverse.
///
/// Mutations also record style transitions, which [`commit`](Self::commit)
/// hands back as a [`StyleDamage`] batch for the view to apply. The registry
/// itself is complete after every call; committing only drains the batch.
#[derive(Clone, Debug)]
pub struct SelectionRegistry<K> {
    entries: Vec<ParcelSelection<K>>,
    index: HashMap<K, u64>,
    next_sequence: u64,
    pending: SmallVec<[(K, Mark); 4]>,
}

impl<K: Hash + Eq + Clone> SelectionRegistry<K> {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            index: HashMap::new(),
            next_sequence: 0,
            pending: SmallVec::new(),
        }
    }

    /// Select `id` if absent, deselect it if present. Returns the new membership.
    pub fn toggle(&mut self, id: K, polygon: Polygon) -> bool {
        if let Some(sequence) = self.index.remove(&id) {
            self.remove_entry(sequence);
            self.mark(id, Mark::Restored);
            false
        } else {
            let sequence = self.next_sequence;
            self.next_sequence += 1;
            self.index.insert(id.clone(), sequence);
            self.entries.push(ParcelSelection {
                id: id.clone(),
                polygon,
                sequence,
            });
            self.mark(id, Mark::Highlighted);
            true
        }
    }

    /// Remove the most recently inserted entry. Returns its id, or `None` when
    /// the registry is empty.
    pub fn undo_last(&mut self) -> Option<K> {
        let last = self.entries.pop()?;
        self.index.remove(&last.id);
        self.mark(last.id.clone(), Mark::Restored);
        Some(last.id)
    }

    /// Remove every entry.
    pub fn clear(&mut self) {
        let entries = core::mem::take(&mut self.entries);
        self.index.clear();
        for entry in entries {
            self.mark(entry.id, Mark::Restored);
        }
    }

    /// Entries in insertion order.
    pub fn snapshot(&self) -> &[ParcelSelection<K>] {
        &self.entries
    }

    /// Whether `id` is selected.
    pub fn contains(&self, id: &K) -> bool {
        self.index.contains_key(id)
    }

    /// The entry for `id`, if selected.
    pub fn get(&self, id: &K) -> Option<&ParcelSelection<K>> {
        let sequence = *self.index.get(id)?;
        self.position(sequence).map(|i| &self.entries[i])
    }

    /// Number of selected entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing is selected.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Selected ids in insertion order.
    pub fn ids(&self) -> impl Iterator<Item = &K> + '_ {
        self.entries.iter().map(|e| &e.id)
    }

    /// Selected polygons in insertion order.
    pub fn polygons(&self) -> impl Iterator<Item = &Polygon> + '_ {
        self.entries.iter().map(|e| &e.polygon)
    }

    /// Union of the selected polygons' bounding boxes, or `None` when empty.
    pub fn bounding_box(&self) -> Option<BoundingBox> {
        self.polygons()
            .map(Region::bounding_box)
            .reduce(BoundingBox::union)
    }

    /// Drain the style transitions recorded since the previous commit.
    pub fn commit(&mut self) -> StyleDamage<K> {
        let mut damage = StyleDamage::default();
        for (id, mark) in self.pending.drain(..) {
            match mark {
                Mark::Highlighted => damage.highlighted.push(id),
                Mark::Restored => damage.restored.push(id),
            }
        }
        damage
    }

    fn mark(&mut self, id: K, mark: Mark) {
        if let Some(i) = self.pending.iter().position(|(k, _)| *k == id) {
            // A reversal within the batch leaves the view where it started.
            if self.pending[i].1 != mark {
                self.pending.remove(i);
            }
        } else {
            self.pending.push((id, mark));
        }
    }

    fn position(&self, sequence: u64) -> Option<usize> {
        self.entries
            .binary_search_by_key(&sequence, |e| e.sequence)
            .ok()
    }

    fn remove_entry(&mut self, sequence: u64) {
        if let Some(i) = self.position(sequence) {
            self.entries.remove(i);
        }
    }
}

impl<K: Hash + Eq + Clone> Default for SelectionRegistry<K> {
    fn default() -> Self {
        Self::new()
    }
}
