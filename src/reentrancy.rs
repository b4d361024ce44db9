//! Debug-only reentrancy guard for the coordination lock.
//!
//! The coordination lock is not reentrant: a thread holding a `Prepared`
//! registration that calls `signal` would deadlock on itself. In debug builds
//! the guard records which thread owns the lock and turns that self-deadlock
//! into a panic. In release builds this compiles to a zero-cost no-op.

#[cfg(not(debug_assertions))]
use core::marker::PhantomData;
#[cfg(debug_assertions)]
use core::sync::atomic::{AtomicUsize, Ordering};

/// Address of a thread-local byte: unique among live threads, never zero.
#[cfg(debug_assertions)]
fn thread_token() -> usize {
    thread_local! {
        static TOKEN: u8 = const { 0 };
    }
    TOKEN.with(|t| t as *const u8 as usize)
}

/// Per-lock owner tracker. Call `check` before blocking on the lock and
/// `enter` once it is held.
#[derive(Debug)]
pub struct DebugReentrancy {
    #[cfg(debug_assertions)]
    owner: AtomicUsize,
}

impl DebugReentrancy {
    pub const fn new() -> Self {
        Self {
            #[cfg(debug_assertions)]
            owner: AtomicUsize::new(0),
        }
    }

    /// Panics in debug builds if the calling thread already holds the lock.
    #[inline]
    pub fn check(&self) {
        #[cfg(debug_assertions)]
        {
            let owner = self.owner.load(Ordering::Acquire);
            if owner == thread_token() {
                tracing::error!("coordination lock re-entered by its owner");
                panic!("reentrancy detected: coordination lock already held by this thread");
            }
        }
    }

    /// Marks the calling thread as owner until the guard drops.
    #[inline]
    pub fn enter(&self) -> ReentrancyGuard<'_> {
        #[cfg(debug_assertions)]
        {
            self.owner.store(thread_token(), Ordering::Release);
            return ReentrancyGuard { owner: self };
        }

        #[cfg(not(debug_assertions))]
        {
            return ReentrancyGuard { _z: PhantomData };
        }
    }
}

impl Default for DebugReentrancy {
    fn default() -> Self {
        Self::new()
    }
}

/// RAII guard returned by `DebugReentrancy::enter`. Must be dropped before
/// the lock it describes is released.
pub struct ReentrancyGuard<'a> {
    #[cfg(debug_assertions)]
    owner: &'a DebugReentrancy,
    #[cfg(not(debug_assertions))]
    _z: PhantomData<&'a ()>,
}

impl<'a> Drop for ReentrancyGuard<'a> {
    fn drop(&mut self) {
        #[cfg(debug_assertions)]
        {
            let me = thread_token();
            let prev = self.owner.owner.swap(0, Ordering::Release);
            debug_assert_eq!(prev, me, "lock owner changed while held");
        }
    }
}
