//! Coordinator: the shared coordination context.
//!
//! One `Coordinator` owns the name table and the signal registry behind a
//! single coarse lock. Every read and write goes through that lock; the only
//! place a thread blocks without holding it is the sleep between two polls in
//! `wait`. Share it between threads with `Arc` (or a scoped borrow).

use crate::config::{CoordinatorConfig, WaitBudget};
use crate::name_binding::{new_name_table, NameTable, Prepared};
use crate::reentrancy::{DebugReentrancy, ReentrancyGuard};
use crate::signal_registry::{poll_until, SignalOutcome, SignalRegistry, WaitOutcome, POLL_INTERVAL};
use core::ops::{Deref, DerefMut};
use parking_lot::{Mutex, MutexGuard};
use std::io;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

#[derive(Debug)]
pub(crate) struct CoordState<'n> {
    pub(crate) names: NameTable<'n>,
    pub(crate) signals: SignalRegistry<'n>,
}

impl<'n> CoordState<'n> {
    fn new(capacity: usize) -> Self {
        Self {
            names: new_name_table(capacity),
            signals: SignalRegistry::new(capacity),
        }
    }
}

/// Locked view of the coordination state.
pub(crate) struct StateGuard<'c, 'n> {
    // Declared first so ownership is cleared before the mutex unlocks.
    _owner: ReentrancyGuard<'c>,
    state: MutexGuard<'c, CoordState<'n>>,
}

impl<'c, 'n> Deref for StateGuard<'c, 'n> {
    type Target = CoordState<'n>;

    fn deref(&self) -> &Self::Target {
        &self.state
    }
}

impl<'c, 'n> DerefMut for StateGuard<'c, 'n> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.state
    }
}

/// Shared context for steering the schedule of a multithreaded test.
///
/// Names (`'n`) are borrowed, never copied; with `Coordinator<'static>` they
/// are typically string literals.
#[derive(Debug)]
pub struct Coordinator<'n> {
    state: Mutex<CoordState<'n>>,
    config: CoordinatorConfig,
    reentrancy: DebugReentrancy,
}

impl<'n> Default for Coordinator<'n> {
    fn default() -> Self {
        Self::new(CoordinatorConfig::default())
    }
}

impl<'n> Coordinator<'n> {
    /// Panics if `config.capacity` is zero.
    pub fn new(config: CoordinatorConfig) -> Self {
        tracing::debug!(capacity = config.capacity, budget = ?config.wait_budget, "coordinator initialized");
        Self {
            state: Mutex::new(CoordState::new(config.capacity)),
            config,
            reentrancy: DebugReentrancy::new(),
        }
    }

    /// Resets every binding and signal and applies `config`.
    ///
    /// Takes `&mut self`: re-initialization must not race with any other use
    /// of the context.
    pub fn reinit(&mut self, config: CoordinatorConfig) {
        let state = self.state.get_mut();
        if config.capacity == self.config.capacity {
            state.names.clear();
            state.signals.reset();
        } else {
            *state = CoordState::new(config.capacity);
        }
        self.config = config;
        tracing::debug!(capacity = config.capacity, budget = ?config.wait_budget, "coordinator reinitialized");
    }

    pub fn config(&self) -> CoordinatorConfig {
        self.config
    }

    pub(crate) fn lock(&self) -> StateGuard<'_, 'n> {
        self.reentrancy.check();
        let state = self.state.lock();
        StateGuard {
            _owner: self.reentrancy.enter(),
            state,
        }
    }

    /// Takes the coordination lock ahead of spawning a thread.
    pub fn prepare(&self) -> Prepared<'_, 'n> {
        Prepared::new(self.lock())
    }

    /// Blocks until any registration in progress has been bound or released.
    ///
    /// A freshly spawned thread calls this first so its own name, if any, is
    /// in place before it runs.
    pub fn await_registration(&self) {
        drop(self.lock());
    }

    /// True if the calling thread is currently bound to `name`.
    pub fn is_current_thread_named(&self, name: &'n str) -> bool {
        let bound = self.lock().names.get_by_left(&name).copied();
        bound == Some(thread::current().id())
    }

    /// Runs `f` only on the thread bound to `name`.
    pub fn run_if_named<R>(&self, name: &'n str, f: impl FnOnce() -> R) -> Option<R> {
        if self.is_current_thread_named(name) {
            Some(f())
        } else {
            None
        }
    }

    /// Number of threads currently bound to a name.
    pub fn bound_names(&self) -> usize {
        self.lock().names.len()
    }

    /// Marks `name` as signalled for the rest of the epoch. Idempotent.
    pub fn signal(&self, name: &'n str) {
        let outcome = self.lock().signals.signal(name);
        match outcome {
            SignalOutcome::New => tracing::debug!(name, "signal"),
            SignalOutcome::AlreadySignalled => tracing::trace!(name, "signal repeated"),
            SignalOutcome::Dropped => {
                tracing::warn!(name, capacity = self.config.capacity, "signal registry full; signal dropped")
            }
        }
    }

    pub fn is_signalled(&self, name: &'n str) -> bool {
        self.lock().signals.is_signalled(name)
    }

    /// Waits for `name` with the configured budget.
    pub fn wait(&self, name: &'n str) -> WaitOutcome {
        self.wait_for(name, self.config.wait_budget)
    }

    /// Polls for `name` every `POLL_INTERVAL` until it is signalled or
    /// `budget` is spent. The lock is held only for each individual poll.
    pub fn wait_for(&self, name: &'n str, budget: WaitBudget) -> WaitOutcome {
        let outcome = poll_until(budget, POLL_INTERVAL, || {
            let hit = self.lock().signals.is_signalled(name);
            tracing::trace!(name, hit, "poll");
            hit
        });
        match outcome {
            WaitOutcome::Signalled => tracing::debug!(name, "wait satisfied"),
            WaitOutcome::TimedOut => tracing::warn!(name, budget = ?budget, "wait timed out"),
        }
        outcome
    }
}

impl Coordinator<'static> {
    /// Spawns a thread bound to `name`.
    ///
    /// The lock is held across the spawn, and the new thread waits for the
    /// registration before running `f`, so `f` always sees its own name.
    pub fn spawn_named<F, T>(self: &Arc<Self>, name: &'static str, f: F) -> io::Result<JoinHandle<T>>
    where
        F: FnOnce(Arc<Self>) -> T + Send + 'static,
        T: Send + 'static,
    {
        let prepared = self.prepare();
        let handle = match self.spawn_registered(thread::Builder::new().name(name.to_owned()), f) {
            Ok(h) => h,
            Err(e) => {
                prepared.abandon();
                return Err(e);
            }
        };
        prepared.bind(name, handle.thread().id());
        Ok(handle)
    }

    /// Spawns a thread with no symbolic name, dropping any stale binding
    /// its identity might carry.
    pub fn spawn_anonymous<F, T>(self: &Arc<Self>, f: F) -> io::Result<JoinHandle<T>>
    where
        F: FnOnce(Arc<Self>) -> T + Send + 'static,
        T: Send + 'static,
    {
        let prepared = self.prepare();
        let handle = match self.spawn_registered(thread::Builder::new(), f) {
            Ok(h) => h,
            Err(e) => {
                prepared.abandon();
                return Err(e);
            }
        };
        prepared.release(handle.thread().id());
        Ok(handle)
    }

    fn spawn_registered<F, T>(self: &Arc<Self>, builder: thread::Builder, f: F) -> io::Result<JoinHandle<T>>
    where
        F: FnOnce(Arc<Self>) -> T + Send + 'static,
        T: Send + 'static,
    {
        let ctx = Arc::clone(self);
        builder.spawn(move || {
            ctx.await_registration();
            f(ctx)
        })
    }
}
