//! SignalRegistry: the set of names signalled in the current epoch, and the
//! bounded polling loop that waits for one of them.
//!
//! Signals are monotone: once a name is in the registry it stays there until
//! `reset`. Waiting is plain polling at a fixed interval; the budget is
//! counted as `polls * interval`, not wall-clock time.

use crate::config::WaitBudget;
use crate::key_set::KeySet;
use crate::probe_table::InsertError;
use crate::strategy::Djb2;
use std::thread;
use std::time::Duration;

/// Sleep between two polls of a waiting thread.
pub const POLL_INTERVAL: Duration = Duration::from_micros(1000);

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum WaitOutcome {
    Signalled,
    TimedOut,
}

/// What a `signal` call did to the registry. Informational only.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum SignalOutcome {
    New,
    AlreadySignalled,
    /// The registry is full and the name was not recorded.
    Dropped,
}

#[derive(Debug)]
pub struct SignalRegistry<'n> {
    names: KeySet<&'n str, Djb2>,
}

impl<'n> SignalRegistry<'n> {
    pub fn new(capacity: usize) -> Self {
        Self {
            names: KeySet::with_strategy(capacity, Djb2),
        }
    }

    /// Starts a new epoch: forgets every signal.
    pub fn reset(&mut self) {
        self.names.reinit(Djb2);
    }

    pub fn signal(&mut self, name: &'n str) -> SignalOutcome {
        match self.names.insert(name) {
            Ok(()) => SignalOutcome::New,
            Err(InsertError::DuplicateKey) => SignalOutcome::AlreadySignalled,
            // A full table rejects before probing, even for known names.
            Err(InsertError::Full) if self.names.contains(&name) => {
                SignalOutcome::AlreadySignalled
            }
            Err(InsertError::Full) => SignalOutcome::Dropped,
        }
    }

    pub fn is_signalled(&self, name: &'n str) -> bool {
        self.names.contains(&name)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.names.capacity()
    }
}

/// Calls `probe` until it returns true or `budget` is spent.
///
/// The probe always runs at least once, so a condition that already holds is
/// seen even with a zero budget. Between probes the thread sleeps `interval`;
/// callers must not hold any lock the probe needs while this sleeps.
pub fn poll_until<F>(budget: WaitBudget, interval: Duration, mut probe: F) -> WaitOutcome
where
    F: FnMut() -> bool,
{
    let step = u64::try_from(interval.as_micros()).unwrap_or(u64::MAX);
    let mut polls: u64 = 0;
    loop {
        if probe() {
            return WaitOutcome::Signalled;
        }
        if budget.exhausted(polls.saturating_mul(step)) {
            return WaitOutcome::TimedOut;
        }
        thread::sleep(interval);
        polls += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::time::Instant;

    #[test]
    fn signal_is_idempotent() {
        let mut r = SignalRegistry::new(4);
        assert_eq!(r.signal("ready"), SignalOutcome::New);
        assert_eq!(r.signal("ready"), SignalOutcome::AlreadySignalled);
        assert_eq!(r.len(), 1);
        assert!(r.is_signalled("ready"));
        assert!(!r.is_signalled("go"));
    }

    #[test]
    fn full_registry_drops_new_names() {
        let mut r = SignalRegistry::new(1);
        assert_eq!(r.signal("a"), SignalOutcome::New);
        assert_eq!(r.signal("b"), SignalOutcome::Dropped);
        assert_eq!(r.signal("a"), SignalOutcome::AlreadySignalled);
        assert!(!r.is_signalled("b"));
    }

    #[test]
    fn reset_starts_new_epoch() {
        let mut r = SignalRegistry::new(4);
        r.signal("a");
        r.reset();
        assert!(r.is_empty());
        assert!(!r.is_signalled("a"));
    }

    #[test]
    fn poll_returns_immediately_when_condition_holds() {
        let calls = Cell::new(0);
        let start = Instant::now();
        let out = poll_until(WaitBudget::Micros(0), POLL_INTERVAL, || {
            calls.set(calls.get() + 1);
            true
        });
        assert_eq!(out, WaitOutcome::Signalled);
        assert_eq!(calls.get(), 1);
        assert!(start.elapsed() < POLL_INTERVAL);
    }

    #[test]
    fn zero_budget_probes_once() {
        let calls = Cell::new(0);
        let out = poll_until(WaitBudget::Micros(0), POLL_INTERVAL, || {
            calls.set(calls.get() + 1);
            false
        });
        assert_eq!(out, WaitOutcome::TimedOut);
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn probe_count_follows_budget() {
        // 2500us at 1000us steps: probes at 0, 1000, 2000, 3000.
        let calls = Cell::new(0);
        let out = poll_until(WaitBudget::Micros(2500), POLL_INTERVAL, || {
            calls.set(calls.get() + 1);
            false
        });
        assert_eq!(out, WaitOutcome::TimedOut);
        assert_eq!(calls.get(), 4);
    }

    #[test]
    fn timeout_takes_at_least_the_budget() {
        let budget = Duration::from_millis(5);
        let start = Instant::now();
        let out = poll_until(WaitBudget::from_duration(budget), POLL_INTERVAL, || false);
        assert_eq!(out, WaitOutcome::TimedOut);
        assert!(start.elapsed() >= budget);
    }

    #[test]
    fn condition_becoming_true_ends_the_wait() {
        let calls = Cell::new(0);
        let out = poll_until(WaitBudget::Infinite, Duration::from_micros(10), || {
            calls.set(calls.get() + 1);
            calls.get() == 3
        });
        assert_eq!(out, WaitOutcome::Signalled);
        assert_eq!(calls.get(), 3);
    }
}
