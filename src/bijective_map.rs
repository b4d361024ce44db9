//! BijectiveMap: two `ProbeTable`s (left -> right, right -> left) kept in
//! lockstep.
//!
//! Invariant: for every `(a, b)` in `forward`, `inverse` holds `(b, a)`, and
//! `len` counts those pairs. Every public method leaves the tables in that
//! state on return; a failed `associate` rolls back whichever side succeeded.

use crate::probe_table::{InsertError, ProbeTable};
use crate::strategy::{HasherStrategy, KeyStrategy};
use core::hash::Hash;
use thiserror::Error;

#[derive(Debug, Error, Clone, Copy, Eq, PartialEq)]
pub enum AssociateError {
    /// One of the two components already belongs to a pair.
    #[error("a component is already associated")]
    Conflict,
    #[error("map is at capacity")]
    Full,
}

#[derive(Debug)]
pub struct BijectiveMap<A, B, SA = HasherStrategy, SB = HasherStrategy> {
    forward: ProbeTable<A, B, SA>,
    inverse: ProbeTable<B, A, SB>,
    len: usize,
}

impl<A, B> BijectiveMap<A, B>
where
    A: Hash + Eq,
    B: Hash + Eq,
{
    pub fn new(capacity: usize) -> Self {
        Self::with_strategies(capacity, HasherStrategy::default(), HasherStrategy::default())
    }
}

impl<A, B, SA, SB> BijectiveMap<A, B, SA, SB> {
    pub fn with_strategies(capacity: usize, left: SA, right: SB) -> Self {
        Self {
            forward: ProbeTable::with_strategy(capacity, left),
            inverse: ProbeTable::with_strategy(capacity, right),
            len: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn capacity(&self) -> usize {
        self.forward.capacity()
    }

    pub fn clear(&mut self) {
        self.forward.clear();
        self.inverse.clear();
        self.len = 0;
    }

    pub fn reinit(&mut self, left: SA, right: SB) {
        self.forward.reinit(left);
        self.inverse.reinit(right);
        self.len = 0;
    }

    pub fn iter(&self) -> impl Iterator<Item = (&A, &B)> {
        self.forward.iter().map(|(_, a, b)| (a, b))
    }
}

impl<A, B, SA, SB> BijectiveMap<A, B, SA, SB>
where
    A: Clone,
    B: Clone,
    SA: KeyStrategy<A>,
    SB: KeyStrategy<B>,
{
    /// Inserts `(a, b)` into both directions or into neither.
    ///
    /// Panics if `a` and `b` are both already bound, to different partners;
    /// callers must free at least one side first. Re-associating an existing
    /// pair is a plain `Conflict`.
    pub fn associate(&mut self, a: A, b: B) -> Result<(), AssociateError> {
        if self.len >= self.capacity() {
            return Err(AssociateError::Full);
        }
        if let (Some(bound_b), Some(bound_a)) = (self.forward.get(&a), self.inverse.get(&b)) {
            let same_pair = self.inverse.strategy().equal(bound_b, &b)
                && self.forward.strategy().equal(bound_a, &a);
            if !same_pair {
                tracing::error!("associate: both components belong to different pairs");
                panic!("BijectiveMap::associate: both components already belong to different pairs");
            }
            return Err(AssociateError::Conflict);
        }
        let fwd = self.forward.insert(a.clone(), b.clone());
        let inv = self.inverse.insert(b, a);
        match (fwd, inv) {
            (Ok(_), Ok(_)) => {
                self.len += 1;
                Ok(())
            }
            (Ok(slot), Err(InsertError::DuplicateKey)) => {
                self.forward.remove_slot(slot).expect("slot inserted above");
                Err(AssociateError::Conflict)
            }
            (Err(InsertError::DuplicateKey), Ok(slot)) => {
                self.inverse.remove_slot(slot).expect("slot inserted above");
                Err(AssociateError::Conflict)
            }
            (Err(InsertError::DuplicateKey), Err(InsertError::DuplicateKey)) => {
                unreachable!("both-sides-bound case handled before inserting")
            }
            (Err(InsertError::Full), _) | (_, Err(InsertError::Full)) => {
                unreachable!("both tables hold exactly `len` entries and len < capacity")
            }
        }
    }

    pub fn get_by_left(&self, a: &A) -> Option<&B> {
        self.forward.get(a)
    }

    pub fn get_by_right(&self, b: &B) -> Option<&A> {
        self.inverse.get(b)
    }

    pub fn contains_left(&self, a: &A) -> bool {
        self.forward.contains_key(a)
    }

    pub fn contains_right(&self, b: &B) -> bool {
        self.inverse.contains_key(b)
    }

    /// Removes the pair containing `a`, if any.
    pub fn remove_by_left(&mut self, a: &A) -> Option<(A, B)> {
        let b = self.forward.get(a)?.clone();
        self.inverse
            .remove(&b)
            .expect("inverse entry must exist for every forward entry");
        let (a_key, b_val) = self
            .forward
            .remove(a)
            .expect("forward entry found above");
        self.len -= 1;
        Some((a_key, b_val))
    }

    /// Removes the pair containing `b`, if any.
    pub fn remove_by_right(&mut self, b: &B) -> Option<(A, B)> {
        let a = self.inverse.get(b)?.clone();
        self.forward
            .remove(&a)
            .expect("forward entry must exist for every inverse entry");
        let (b_key, a_val) = self
            .inverse
            .remove(b)
            .expect("inverse entry found above");
        self.len -= 1;
        Some((a_val, b_key))
    }
}
