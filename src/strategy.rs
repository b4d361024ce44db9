//! Hashing/equality strategies for `ProbeTable`.
//!
//! A table is parameterized over a `KeyStrategy<K>` value supplied at
//! construction time. The strategy must be deterministic and consistent:
//! `equal(a, b)` implies `hash(a) == hash(b)`. Breaking that contract does not
//! cause memory unsafety, only lookups that miss.

use core::hash::{BuildHasher, Hash};
use hashbrown::hash_map::DefaultHashBuilder;

/// Capability pair `{hash, equal}` for one key type.
pub trait KeyStrategy<K: ?Sized> {
    fn hash(&self, key: &K) -> u64;
    fn equal(&self, a: &K, b: &K) -> bool;
}

/// Strategy backed by a `BuildHasher` and the key's own `Eq`.
#[derive(Clone, Debug, Default)]
pub struct HasherStrategy<S = DefaultHashBuilder> {
    hasher: S,
}

impl<S> HasherStrategy<S> {
    pub fn with_hasher(hasher: S) -> Self {
        Self { hasher }
    }
}

impl<K, S> KeyStrategy<K> for HasherStrategy<S>
where
    K: ?Sized + Hash + Eq,
    S: BuildHasher,
{
    #[inline]
    fn hash(&self, key: &K) -> u64 {
        self.hasher.hash_one(key)
    }

    #[inline]
    fn equal(&self, a: &K, b: &K) -> bool {
        a == b
    }
}

/// Case-sensitive DJB2 over the bytes of a string (`h = h * 33 + byte`,
/// seeded with 5381). Used for symbolic names.
#[derive(Copy, Clone, Debug, Default)]
pub struct Djb2;

impl Djb2 {
    pub const SEED: u64 = 5381;

    pub fn hash_str(s: &str) -> u64 {
        s.bytes().fold(Self::SEED, |h, b| {
            (h << 5).wrapping_add(h).wrapping_add(u64::from(b))
        })
    }
}

impl KeyStrategy<str> for Djb2 {
    #[inline]
    fn hash(&self, key: &str) -> u64 {
        Self::hash_str(key)
    }

    #[inline]
    fn equal(&self, a: &str, b: &str) -> bool {
        a == b
    }
}

impl<'a> KeyStrategy<&'a str> for Djb2 {
    #[inline]
    fn hash(&self, key: &&'a str) -> u64 {
        Self::hash_str(key)
    }

    #[inline]
    fn equal(&self, a: &&'a str, b: &&'a str) -> bool {
        a == b
    }
}

/// Strategy assembled from two closures or function pointers.
#[derive(Clone, Copy)]
pub struct FnStrategy<H, E> {
    hash: H,
    equal: E,
}

impl<H, E> FnStrategy<H, E> {
    pub fn new(hash: H, equal: E) -> Self {
        Self { hash, equal }
    }
}

impl<K, H, E> KeyStrategy<K> for FnStrategy<H, E>
where
    K: ?Sized,
    H: Fn(&K) -> u64,
    E: Fn(&K, &K) -> bool,
{
    #[inline]
    fn hash(&self, key: &K) -> u64 {
        (self.hash)(key)
    }

    #[inline]
    fn equal(&self, a: &K, b: &K) -> bool {
        (self.equal)(a, b)
    }
}

impl<H, E> core::fmt::Debug for FnStrategy<H, E> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("FnStrategy").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn djb2_matches_reference_values() {
        assert_eq!(Djb2::hash_str(""), 5381);
        // 5381 * 33 + 'a'
        assert_eq!(Djb2::hash_str("a"), 5381 * 33 + 97);
        assert_eq!(Djb2::hash_str("ab"), (5381 * 33 + 97) * 33 + 98);
    }

    #[test]
    fn djb2_is_case_sensitive() {
        assert_ne!(Djb2::hash_str("ready"), Djb2::hash_str("READY"));
        assert!(!KeyStrategy::<str>::equal(&Djb2, "ready", "READY"));
    }

    #[test]
    fn str_and_ref_str_agree() {
        let s: &str = "thread-1";
        assert_eq!(KeyStrategy::<str>::hash(&Djb2, s), KeyStrategy::<&str>::hash(&Djb2, &s));
    }

    #[test]
    fn hasher_strategy_consistent_with_eq() {
        let st: HasherStrategy = HasherStrategy::default();
        let a = String::from("x");
        let b = String::from("x");
        assert!(KeyStrategy::<String>::equal(&st, &a, &b));
        assert_eq!(KeyStrategy::<String>::hash(&st, &a), KeyStrategy::<String>::hash(&st, &b));
    }

    #[test]
    fn fn_strategy_dispatches_to_closures() {
        let st = FnStrategy::new(|k: &u32| u64::from(*k) % 3, |a: &u32, b: &u32| a == b);
        assert_eq!(st.hash(&7u32), 1);
        assert!(st.equal(&7u32, &7u32));
        assert!(!st.equal(&7u32, &4u32));
    }
}
