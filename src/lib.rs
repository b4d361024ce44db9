//! quickfuzz: manual schedule steering for multithreaded tests.
//!
//! Threads register under symbolic names, wait for named signals and raise
//! them, so a test can script an interleaving ("worker waits for `ready`
//! before it prints").
//!
//! Internal Design:
//!
//! Layers
//! - `ProbeTable<K, V, S>`: fixed-capacity open addressing with linear
//!   probing and tombstone deletion; hashing and equality come from a
//!   `KeyStrategy` supplied at construction.
//! - `KeySet<K, S>`: the same table with unit values.
//! - `BijectiveMap<A, B, SA, SB>`: two tables kept in lockstep; `associate`
//!   inserts both directions or neither.
//! - `SignalRegistry`: the set of names signalled this epoch, plus the
//!   bounded polling loop used by `wait`.
//! - `Coordinator`: owns a name table and a signal registry behind a single
//!   `parking_lot::Mutex`, and implements the two-phase `prepare` ->
//!   `bind`/`release` registration.
//!
//! Constraints
//! - Capacity is fixed at construction; there is no resizing.
//! - Tables never own what keys refer to: names are `&'n str` borrowed from
//!   the caller, thread identities are `ThreadId` values.
//! - One coarse lock. It is never held while a waiting thread sleeps, so the
//!   thread that will raise a signal can always make progress.
//! - `wait` notices a signal within one poll interval; budgets are counted in
//!   polls times the interval, not wall-clock time.
//!
//! Failure policy
//! - Structural outcomes (duplicate key, full table, miss) are returned as
//!   `Result`/`Option` values.
//! - Usage errors (binding a name twice, exhausting the name table, zero
//!   capacity, taking the lock twice on one thread in debug builds) panic
//!   before shared state is touched. Harnesses that want the process to die
//!   instead can build with `panic = "abort"`.
//!
//! Example
//!
//! ```
//! use quickfuzz::{Coordinator, WaitOutcome};
//! use std::sync::Arc;
//!
//! let coord: Arc<Coordinator<'static>> = Arc::new(Coordinator::default());
//! let worker = coord
//!     .spawn_named("worker", |c| {
//!         assert!(c.is_current_thread_named("worker"));
//!         c.wait("go")
//!     })
//!     .unwrap();
//! coord.signal("go");
//! assert_eq!(worker.join().unwrap(), WaitOutcome::Signalled);
//! ```

pub mod bijective_map;
pub mod config;
mod coordinator;
pub mod key_set;
mod name_binding;
pub mod probe_table;
mod probe_table_proptest;
mod reentrancy;
pub mod signal_registry;
pub mod strategy;

// Public surface
pub use bijective_map::{AssociateError, BijectiveMap};
pub use config::{CoordinatorConfig, WaitBudget, DEFAULT_CAPACITY};
pub use coordinator::Coordinator;
pub use key_set::KeySet;
pub use name_binding::{NameTable, Prepared};
pub use probe_table::{InsertError, ProbeTable, SlotRef};
pub use signal_registry::{poll_until, SignalOutcome, SignalRegistry, WaitOutcome, POLL_INTERVAL};
pub use strategy::{Djb2, FnStrategy, HasherStrategy, KeyStrategy};
