//! NameBinding: two-phase registration of symbolic thread names.
//!
//! `Coordinator::prepare` takes the coordination lock and returns a
//! `Prepared` registration. The caller spawns the thread while holding it,
//! then consumes it with `bind` (name the thread) or `release` (leave it
//! anonymous). Either way the lock is released when the registration is
//! consumed, so a new thread that looks up its own name cannot observe the
//! gap between spawning and naming.

use crate::bijective_map::BijectiveMap;
use crate::coordinator::StateGuard;
use crate::strategy::{Djb2, HasherStrategy};
use std::thread::ThreadId;

/// Symbolic name <-> thread identity bijection.
pub type NameTable<'n> = BijectiveMap<&'n str, ThreadId, Djb2, HasherStrategy>;

pub(crate) fn new_name_table<'n>(capacity: usize) -> NameTable<'n> {
    BijectiveMap::with_strategies(capacity, Djb2, HasherStrategy::default())
}

/// Binds `name` to `thread`, replacing any stale name `thread` still carries.
///
/// Panics if `name` is already bound, or if the table cannot take the pair;
/// both are sizing or usage errors in the harness, not runtime conditions.
pub(crate) fn bind_name<'n>(names: &mut NameTable<'n>, name: &'n str, thread: ThreadId) {
    if let Some(owner) = names.get_by_left(&name) {
        tracing::error!(name, owner = ?owner, "name is already bound");
        panic!("thread name `{name}` is already bound to {owner:?}");
    }
    if let Some((stale, _)) = names.remove_by_right(&thread) {
        tracing::debug!(name = stale, thread = ?thread, "dropped stale thread name");
    }
    if let Err(e) = names.associate(name, thread) {
        tracing::error!(name, thread = ?thread, error = %e, "cannot bind thread name");
        panic!("cannot bind thread name `{name}`: {e}");
    }
}

/// Drops whatever name `thread` carries. Returns the dropped name.
pub(crate) fn unbind_thread<'n>(names: &mut NameTable<'n>, thread: ThreadId) -> Option<&'n str> {
    names.remove_by_right(&thread).map(|(name, _)| name)
}

/// A registration in progress. Holds the coordination lock until consumed.
///
/// Dropping it unconsumed releases the lock without touching any binding and
/// logs a warning.
#[must_use = "a Prepared registration holds the coordination lock until bound or released"]
pub struct Prepared<'c, 'n> {
    state: StateGuard<'c, 'n>,
    consumed: bool,
}

impl<'c, 'n> Prepared<'c, 'n> {
    pub(crate) fn new(state: StateGuard<'c, 'n>) -> Self {
        Self {
            state,
            consumed: false,
        }
    }

    /// Names `thread` as `name` and releases the lock.
    pub fn bind(mut self, name: &'n str, thread: ThreadId) {
        self.consumed = true;
        bind_name(&mut self.state.names, name, thread);
        tracing::debug!(name, thread = ?thread, "bound thread name");
    }

    /// Leaves `thread` anonymous, dropping any stale name, and releases the lock.
    pub fn release(mut self, thread: ThreadId) {
        self.consumed = true;
        if let Some(stale) = unbind_thread(&mut self.state.names, thread) {
            tracing::debug!(name = stale, thread = ?thread, "released stale thread name");
        }
    }

    /// Gives up the registration without a thread, e.g. after a failed spawn.
    pub fn abandon(mut self) {
        self.consumed = true;
        tracing::debug!("registration abandoned");
    }
}

impl<'c, 'n> Drop for Prepared<'c, 'n> {
    fn drop(&mut self) {
        if !self.consumed {
            tracing::warn!("Prepared registration dropped without bind or release");
        }
    }
}
