//! KeySet: set adapter over `ProbeTable` with unit values.

use crate::probe_table::{InsertError, ProbeTable};
use crate::strategy::{HasherStrategy, KeyStrategy};
use core::hash::Hash;

#[derive(Debug)]
pub struct KeySet<K, S = HasherStrategy> {
    table: ProbeTable<K, (), S>,
}

impl<K> KeySet<K>
where
    K: Hash + Eq,
{
    pub fn new(capacity: usize) -> Self {
        Self::with_strategy(capacity, HasherStrategy::default())
    }
}

impl<K, S> KeySet<K, S> {
    pub fn with_strategy(capacity: usize, strategy: S) -> Self {
        Self {
            table: ProbeTable::with_strategy(capacity, strategy),
        }
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.table.capacity()
    }

    pub fn clear(&mut self) {
        self.table.clear();
    }

    pub fn reinit(&mut self, strategy: S) {
        self.table.reinit(strategy);
    }

    pub fn iter(&self) -> impl Iterator<Item = &K> {
        self.table.iter().map(|(_, k, _)| k)
    }
}

impl<K, S> KeySet<K, S>
where
    S: KeyStrategy<K>,
{
    /// Adds `el`; `DuplicateKey` means it was already a member.
    pub fn insert(&mut self, el: K) -> Result<(), InsertError> {
        self.table.insert(el, ()).map(|_| ())
    }

    pub fn contains(&self, el: &K) -> bool {
        self.table.contains_key(el)
    }

    pub fn remove(&mut self, el: &K) -> Option<K> {
        self.table.remove(el).map(|(k, ())| k)
    }
}
