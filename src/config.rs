//! Coordinator configuration.

use std::time::Duration;

/// Default number of slots in every coordination table.
pub const DEFAULT_CAPACITY: usize = 1000;

/// How long `wait` keeps polling before giving up.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub enum WaitBudget {
    #[default]
    Infinite,
    Micros(u64),
}

impl WaitBudget {
    pub fn from_duration(d: Duration) -> Self {
        WaitBudget::Micros(u64::try_from(d.as_micros()).unwrap_or(u64::MAX))
    }

    pub fn as_duration(&self) -> Option<Duration> {
        match *self {
            WaitBudget::Infinite => None,
            WaitBudget::Micros(us) => Some(Duration::from_micros(us)),
        }
    }

    /// True once `spent_micros` of polling time covers the budget.
    #[inline]
    pub fn exhausted(&self, spent_micros: u64) -> bool {
        match *self {
            WaitBudget::Infinite => false,
            WaitBudget::Micros(budget) => spent_micros >= budget,
        }
    }
}

impl From<Duration> for WaitBudget {
    fn from(d: Duration) -> Self {
        WaitBudget::from_duration(d)
    }
}

/// Sizing and timing for a `Coordinator`.
///
/// `capacity` bounds both the number of named threads and the number of
/// distinct signal names per epoch.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct CoordinatorConfig {
    pub capacity: usize,
    pub wait_budget: WaitBudget,
}

impl CoordinatorConfig {
    pub fn new(capacity: usize, wait_budget: WaitBudget) -> Self {
        Self {
            capacity,
            wait_budget,
        }
    }

    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    pub fn with_wait_budget(mut self, wait_budget: impl Into<WaitBudget>) -> Self {
        self.wait_budget = wait_budget.into();
        self
    }
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY, WaitBudget::Infinite)
    }
}
