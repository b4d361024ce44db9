//! ProbeTable: fixed-capacity open addressing with linear probing and
//! tombstone deletion.
//!
//! Keys and values are stored as given. Instantiate `K`/`V` with borrowed
//! handles (`&'n str`, `ThreadId`, indices) to keep the table ownership
//! neutral; the borrow checker then enforces that keys outlive the table.

use crate::strategy::{HasherStrategy, KeyStrategy};
use core::hash::Hash;
use core::mem;
use thiserror::Error;

#[derive(Debug, Error, Clone, Copy, Eq, PartialEq)]
pub enum InsertError {
    #[error("key is already present in the table")]
    DuplicateKey,
    #[error("table is at capacity")]
    Full,
}

#[derive(Debug)]
enum SlotState<K, V> {
    Empty,
    Occupied { key: K, value: V },
    Tombstone,
}

#[derive(Debug)]
struct Slot<K, V> {
    state: SlotState<K, V>,
    // Bumped every time the slot becomes occupied so stale `SlotRef`s never
    // resolve to a later entry.
    generation: u32,
}

impl<K, V> Slot<K, V> {
    const fn empty() -> Self {
        Self {
            state: SlotState::Empty,
            generation: 0,
        }
    }
}

/// Reference to an occupied slot, valid until that entry is removed.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct SlotRef {
    index: usize,
    generation: u32,
}

impl SlotRef {
    pub(crate) fn index(&self) -> usize {
        self.index
    }

    pub fn key<'a, K, V, S>(&self, table: &'a ProbeTable<K, V, S>) -> Option<&'a K> {
        table.slot_entry(*self).map(|(k, _)| k)
    }

    pub fn value<'a, K, V, S>(&self, table: &'a ProbeTable<K, V, S>) -> Option<&'a V> {
        table.slot_entry(*self).map(|(_, v)| v)
    }

    pub fn value_mut<'a, K, V, S>(&self, table: &'a mut ProbeTable<K, V, S>) -> Option<&'a mut V> {
        table.slot_value_mut(*self)
    }
}

#[derive(Debug)]
pub struct ProbeTable<K, V, S = HasherStrategy> {
    slots: Box<[Slot<K, V>]>,
    len: usize,
    strategy: S,
}

impl<K, V> ProbeTable<K, V>
where
    K: Hash + Eq,
{
    pub fn new(capacity: usize) -> Self {
        Self::with_strategy(capacity, HasherStrategy::default())
    }
}

impl<K, V, S> ProbeTable<K, V, S> {
    /// Allocates `capacity` empty slots. Panics if `capacity` is zero.
    pub fn with_strategy(capacity: usize, strategy: S) -> Self {
        assert!(capacity > 0, "ProbeTable capacity must be non-zero");
        let slots = (0..capacity).map(|_| Slot::empty()).collect();
        Self {
            slots,
            len: 0,
            strategy,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn strategy(&self) -> &S {
        &self.strategy
    }

    /// Number of deleted slots still occupying space in probe chains.
    pub fn tombstones(&self) -> usize {
        self.slots
            .iter()
            .filter(|s| matches!(s.state, SlotState::Tombstone))
            .count()
    }

    /// Resets every slot to empty; capacity and strategy are kept.
    pub fn clear(&mut self) {
        for slot in self.slots.iter_mut() {
            slot.state = SlotState::Empty;
        }
        self.len = 0;
    }

    /// Clears the table and installs a new strategy.
    pub fn reinit(&mut self, strategy: S) {
        self.clear();
        self.strategy = strategy;
    }

    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            it: self.slots.iter().enumerate(),
        }
    }

    /// Removes the entry a `SlotRef` points at, leaving a tombstone.
    pub fn remove_slot(&mut self, slot: SlotRef) -> Option<(K, V)> {
        let s = self.slots.get_mut(slot.index)?;
        if s.generation != slot.generation || !matches!(s.state, SlotState::Occupied { .. }) {
            return None;
        }
        match mem::replace(&mut s.state, SlotState::Tombstone) {
            SlotState::Occupied { key, value } => {
                self.len -= 1;
                Some((key, value))
            }
            _ => unreachable!("slot state checked above"),
        }
    }

    fn slot_entry(&self, slot: SlotRef) -> Option<(&K, &V)> {
        let s = self.slots.get(slot.index)?;
        match &s.state {
            SlotState::Occupied { key, value } if s.generation == slot.generation => {
                Some((key, value))
            }
            _ => None,
        }
    }

    fn slot_value_mut(&mut self, slot: SlotRef) -> Option<&mut V> {
        let s = self.slots.get_mut(slot.index)?;
        match &mut s.state {
            SlotState::Occupied { value, .. } if s.generation == slot.generation => Some(value),
            _ => None,
        }
    }
}

impl<K, V, S> ProbeTable<K, V, S>
where
    S: KeyStrategy<K>,
{
    fn home(&self, key: &K) -> usize {
        (self.strategy.hash(key) % self.capacity() as u64) as usize
    }

    /// Inserts `key -> value`.
    ///
    /// Fails with `Full` before probing when `len() == capacity()`. Otherwise
    /// the probe runs to the first empty slot (or one full wrap) so a duplicate
    /// sitting past a tombstone is still detected; the entry then lands in the
    /// first tombstone seen, or in that empty slot.
    pub fn insert(&mut self, key: K, value: V) -> Result<SlotRef, InsertError> {
        if self.len >= self.capacity() {
            return Err(InsertError::Full);
        }
        let cap = self.capacity();
        let start = self.home(&key);
        let mut reusable = None;
        let mut vacant = None;
        for step in 0..cap {
            let pos = (start + step) % cap;
            match &self.slots[pos].state {
                SlotState::Occupied { key: k, .. } => {
                    if self.strategy.equal(k, &key) {
                        return Err(InsertError::DuplicateKey);
                    }
                }
                SlotState::Tombstone => {
                    reusable.get_or_insert(pos);
                }
                SlotState::Empty => {
                    vacant = Some(pos);
                    break;
                }
            }
        }
        let pos = reusable
            .or(vacant)
            .expect("len < capacity guarantees a free slot on the probe path");
        let slot = &mut self.slots[pos];
        let generation = slot.generation.wrapping_add(1);
        slot.generation = generation;
        slot.state = SlotState::Occupied { key, value };
        self.len += 1;
        Ok(SlotRef {
            index: pos,
            generation,
        })
    }

    /// Probes for `key`, stopping at the first empty slot. Never takes more
    /// than `capacity()` steps.
    pub fn find(&self, key: &K) -> Option<SlotRef> {
        let cap = self.capacity();
        let start = self.home(key);
        for step in 0..cap {
            let pos = (start + step) % cap;
            let slot = &self.slots[pos];
            match &slot.state {
                SlotState::Occupied { key: k, .. } => {
                    if self.strategy.equal(k, key) {
                        return Some(SlotRef {
                            index: pos,
                            generation: slot.generation,
                        });
                    }
                }
                SlotState::Tombstone => {}
                SlotState::Empty => return None,
            }
        }
        None
    }

    pub fn contains_key(&self, key: &K) -> bool {
        self.find(key).is_some()
    }

    pub fn get(&self, key: &K) -> Option<&V> {
        self.find(key).and_then(|s| s.value(self))
    }

    pub fn get_key_value(&self, key: &K) -> Option<(&K, &V)> {
        self.find(key).and_then(|s| self.slot_entry(s))
    }

    /// Deletes `key`, turning its slot into a tombstone. Never compacts.
    pub fn remove(&mut self, key: &K) -> Option<(K, V)> {
        let slot = self.find(key)?;
        self.remove_slot(slot)
    }
}

/// Iterator over occupied slots in slot order.
pub struct Iter<'a, K, V> {
    it: core::iter::Enumerate<core::slice::Iter<'a, Slot<K, V>>>,
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (SlotRef, &'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        for (index, slot) in self.it.by_ref() {
            if let SlotState::Occupied { key, value } = &slot.state {
                let r = SlotRef {
                    index,
                    generation: slot.generation,
                };
                return Some((r, key, value));
            }
        }
        None
    }
}
