#![cfg(test)]

// Property tests for ProbeTable and BijectiveMap kept inside the crate so
// they can inspect slot-level state (`SlotRef::index`, tombstones).

use crate::bijective_map::{AssociateError, BijectiveMap};
use crate::probe_table::{InsertError, ProbeTable};
use crate::strategy::FnStrategy;
use proptest::prelude::*;
use std::collections::{BTreeSet, HashMap};

type Narrow = FnStrategy<fn(&u8) -> u64, fn(&u8, &u8) -> bool>;

// Few buckets so probe chains, wrap-around and tombstones are the norm.
fn narrow() -> Narrow {
    fn h(k: &u8) -> u64 {
        u64::from(*k % 3)
    }
    fn eq(a: &u8, b: &u8) -> bool {
        a == b
    }
    FnStrategy::new(h as fn(&u8) -> u64, eq as fn(&u8, &u8) -> bool)
}

#[derive(Clone, Debug)]
enum Op {
    Insert(u8, i32),
    Remove(u8),
    Find(u8),
    Clear,
}

fn arb_op() -> impl Strategy<Value = Op> {
    // Keys drawn from a pool slightly larger than the table.
    let key = 0u8..12;
    prop_oneof![
        4 => (key.clone(), any::<i32>()).prop_map(|(k, v)| Op::Insert(k, v)),
        3 => key.clone().prop_map(Op::Remove),
        2 => key.prop_map(Op::Find),
        1 => Just(Op::Clear),
    ]
}

// Property: state-machine equivalence against std::collections::HashMap.
// Invariants exercised across random operation sequences:
// - Insert returns Full exactly when len == capacity, DuplicateKey exactly
//   when the key is live, and otherwise succeeds.
// - `len()` equals inserts minus removes; no key is ever occupied twice.
// - Lookups see through tombstones; removed keys are never found.
proptest! {
    #![proptest_config(ProptestConfig { cases: 128, .. ProptestConfig::default() })]
    #[test]
    fn prop_probe_table_matches_model(cap in 1usize..=8, ops in proptest::collection::vec(arb_op(), 1..80)) {
        let mut sut: ProbeTable<u8, i32, Narrow> = ProbeTable::with_strategy(cap, narrow());
        let mut model: HashMap<u8, i32> = HashMap::new();

        for op in ops {
            match op {
                Op::Insert(k, v) => {
                    let res = sut.insert(k, v);
                    if model.len() >= cap {
                        prop_assert_eq!(res, Err(InsertError::Full));
                    } else if model.contains_key(&k) {
                        prop_assert_eq!(res, Err(InsertError::DuplicateKey));
                    } else {
                        let slot = res.expect("insert with room for a new key");
                        prop_assert_eq!(slot.value(&sut), Some(&v));
                        model.insert(k, v);
                    }
                }
                Op::Remove(k) => {
                    let got = sut.remove(&k);
                    prop_assert_eq!(got, model.remove(&k).map(|v| (k, v)));
                }
                Op::Find(k) => {
                    prop_assert_eq!(sut.get(&k), model.get(&k));
                }
                Op::Clear => {
                    sut.clear();
                    model.clear();
                    prop_assert_eq!(sut.tombstones(), 0);
                }
            }

            prop_assert_eq!(sut.len(), model.len());
            let live: Vec<u8> = sut.iter().map(|(_, k, _)| *k).collect();
            let unique: BTreeSet<u8> = live.iter().copied().collect();
            prop_assert_eq!(live.len(), unique.len(), "a key occupies two slots");
            prop_assert_eq!(unique, model.keys().copied().collect::<BTreeSet<_>>());
            prop_assert!(sut.len() + sut.tombstones() <= sut.capacity());
        }
    }
}

#[derive(Clone, Debug)]
enum MapOp {
    Associate(u8, u8),
    RemoveLeft(u8),
    RemoveRight(u8),
}

fn arb_map_op() -> impl Strategy<Value = MapOp> {
    prop_oneof![
        3 => (0u8..6, 0u8..6).prop_map(|(a, b)| MapOp::Associate(a, b)),
        1 => (0u8..6).prop_map(MapOp::RemoveLeft),
        1 => (0u8..6).prop_map(MapOp::RemoveRight),
    ]
}

// Property: BijectiveMap stays a bijection.
// - Associated implies both lookups resolve to each other.
// - Conflict and Full leave every lookup exactly as before the call.
// - Crossing pairs (both sides bound elsewhere) are skipped: they are a
//   documented usage error that panics.
proptest! {
    #![proptest_config(ProptestConfig { cases: 128, .. ProptestConfig::default() })]
    #[test]
    fn prop_bijection_is_atomic(cap in 1usize..=4, ops in proptest::collection::vec(arb_map_op(), 1..60)) {
        let mut sut: BijectiveMap<u8, u8, Narrow, Narrow> = BijectiveMap::with_strategies(cap, narrow(), narrow());
        let mut fwd: HashMap<u8, u8> = HashMap::new();
        let mut inv: HashMap<u8, u8> = HashMap::new();

        for op in ops {
            match op {
                MapOp::Associate(a, b) => {
                    let crossing = matches!((fwd.get(&a), inv.get(&b)), (Some(&x), Some(&y)) if x != b || y != a);
                    if crossing {
                        continue;
                    }
                    let res = sut.associate(a, b);
                    if fwd.len() >= cap {
                        prop_assert_eq!(res, Err(AssociateError::Full));
                    } else if fwd.contains_key(&a) || inv.contains_key(&b) {
                        prop_assert_eq!(res, Err(AssociateError::Conflict));
                    } else {
                        prop_assert_eq!(res, Ok(()));
                        fwd.insert(a, b);
                        inv.insert(b, a);
                    }
                }
                MapOp::RemoveLeft(a) => {
                    let expected = fwd.remove(&a).map(|b| {
                        inv.remove(&b);
                        (a, b)
                    });
                    prop_assert_eq!(sut.remove_by_left(&a), expected);
                }
                MapOp::RemoveRight(b) => {
                    let expected = inv.remove(&b).map(|a| {
                        fwd.remove(&a);
                        (a, b)
                    });
                    prop_assert_eq!(sut.remove_by_right(&b), expected);
                }
            }

            prop_assert_eq!(sut.len(), fwd.len());
            for k in 0u8..6 {
                prop_assert_eq!(sut.get_by_left(&k), fwd.get(&k));
                prop_assert_eq!(sut.get_by_right(&k), inv.get(&k));
            }
        }
    }
}
