//! Cooperative wall-clock cancellation.
//!
//! Long-running loops call [`Budget::tick`] once per expansion.  The clock is
//! only read every `check_interval` ticks; once the limit is exceeded the
//! budget latches as exhausted and the caller winds down with
//! `Status::Timeout`.

use std::time::{Duration, Instant};

use crate::EngineConfig;

#[derive(Clone, Debug)]
pub struct Budget {
    limit:          Option<Duration>,
    start:          Instant,
    check_interval: u64,
    ops:            u64,
    exhausted:      bool,
}

impl Budget {
    /// `check_interval` of 0 is treated as 1 (check every tick).
    pub fn new(limit: Option<Duration>, check_interval: u64) -> Self {
        Self {
            limit,
            start: Instant::now(),
            check_interval: check_interval.max(1),
            ops: 0,
            exhausted: false,
        }
    }

    pub fn unlimited() -> Self {
        Self::new(None, u64::MAX)
    }

    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(config.time_budget, config.check_interval)
    }

    /// Count one unit of work.  Returns `true` once the budget is exhausted.
    pub fn tick(&mut self) -> bool {
        if self.exhausted {
            return true;
        }
        let Some(limit) = self.limit else {
            return false;
        };
        self.ops = self.ops.saturating_add(1);
        if self.ops % self.check_interval == 0 && self.start.elapsed() >= limit {
            log::debug!("budget of {limit:?} exhausted after {} ops", self.ops);
            self.exhausted = true;
        }
        self.exhausted
    }

    #[inline]
    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    #[inline]
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    #[inline]
    pub fn ops(&self) -> u64 {
        self.ops
    }
}

impl Default for Budget {
    fn default() -> Self {
        Self::unlimited()
    }
}
