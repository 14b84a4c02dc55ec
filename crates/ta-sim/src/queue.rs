//! `ClockQueue`: pending driver clocks ordered by time.
//!
//! Clocks with equal timestamps pop in insertion order, which is what makes
//! replays deterministic.  `BTreeMap` gives O(log W) push and pop where W is
//! the number of distinct pending timestamps.

use std::collections::{BTreeMap, VecDeque};

use ordered_float::OrderedFloat;
use ta_core::{DriverId, Time};

#[derive(Clone, Debug, Default)]
pub struct ClockQueue {
    inner: BTreeMap<OrderedFloat<Time>, VecDeque<DriverId>>,
    /// Cached total for O(1) `len()`.
    total: usize,
}

impl ClockQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule `driver` to act at `time`.
    pub fn push(&mut self, time: Time, driver: DriverId) {
        self.inner.entry(OrderedFloat(time)).or_default().push_back(driver);
        self.total += 1;
    }

    /// The earliest clock without removing it.
    pub fn peek(&self) -> Option<(Time, DriverId)> {
        let (time, drivers) = self.inner.iter().next()?;
        drivers.front().map(|&d| (time.0, d))
    }

    /// Remove and return the earliest clock.
    pub fn pop(&mut self) -> Option<(Time, DriverId)> {
        let mut entry = self.inner.first_entry()?;
        let time = entry.key().0;
        let driver = entry.get_mut().pop_front();
        if entry.get().is_empty() {
            entry.remove();
        }
        if driver.is_some() {
            self.total -= 1;
        }
        driver.map(|d| (time, d))
    }

    /// Earliest pending timestamp.
    pub fn next_time(&self) -> Option<Time> {
        self.inner.keys().next().map(|t| t.0)
    }

    pub fn len(&self) -> usize {
        self.total
    }

    pub fn is_empty(&self) -> bool {
        self.total == 0
    }
}
