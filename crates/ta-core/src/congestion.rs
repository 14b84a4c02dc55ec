//! Congestion functions: occupancy → travel time.
//!
//! Every edge carries one.  The common shapes are plain enum variants so they
//! can be inspected, printed and cloned cheaply; anything else goes through
//! [`Congestion::custom`].
//!
//! Occupancy is the number of *other* drivers already on the edge when a
//! driver enters it.  It is a `u32`, so a negative occupancy cannot be
//! expressed.  The returned travel time must be finite and non-negative;
//! [`Congestion::checked`] enforces that at every evaluation site that feeds
//! the simulator or a search.

use std::fmt;
use std::sync::Arc;

use crate::{CoreError, CoreResult, EdgeId, Time};

/// Signature of a user-supplied congestion function.
pub type CongestionFn = dyn Fn(u32) -> Time + Send + Sync;

/// Travel time on an edge as a function of its occupancy.
#[derive(Clone)]
pub enum Congestion {
    /// Occupancy-independent travel time.
    Constant(Time),

    /// `slope * occupancy + intercept`.
    Linear { slope: Time, intercept: Time },

    /// Bureau of Public Roads curve:
    /// `free_flow * (1 + alpha * (occupancy / capacity)^beta)`.
    Bpr {
        free_flow: Time,
        capacity:  f64,
        alpha:     f64,
        beta:      f64,
    },

    /// Arbitrary pure function.
    Custom(Arc<CongestionFn>),
}

impl Congestion {
    pub fn constant(t: Time) -> Self {
        Congestion::Constant(t)
    }

    pub fn linear(slope: Time, intercept: Time) -> Self {
        Congestion::Linear { slope, intercept }
    }

    /// BPR curve with the classic `alpha = 0.15`, `beta = 4` parameters.
    pub fn bpr(free_flow: Time, capacity: f64) -> Self {
        Congestion::Bpr { free_flow, capacity, alpha: 0.15, beta: 4.0 }
    }

    pub fn custom<F>(f: F) -> Self
    where
        F: Fn(u32) -> Time + Send + Sync + 'static,
    {
        Congestion::Custom(Arc::new(f))
    }

    /// Evaluate without validation.
    pub fn evaluate(&self, occupancy: u32) -> Time {
        let x = occupancy as f64;
        match self {
            Congestion::Constant(t) => *t,
            Congestion::Linear { slope, intercept } => slope * x + intercept,
            Congestion::Bpr { free_flow, capacity, alpha, beta } => {
                if *capacity <= 0.0 {
                    return *free_flow;
                }
                free_flow * (1.0 + alpha * (x / capacity).powf(*beta))
            }
            Congestion::Custom(f) => f(occupancy),
        }
    }

    /// Evaluate and reject negative or non-finite results.
    ///
    /// `edge` is only used for the error message.
    pub fn checked(&self, edge: EdgeId, occupancy: u32) -> CoreResult<Time> {
        let value = self.evaluate(occupancy);
        if value.is_finite() && value >= 0.0 {
            Ok(value)
        } else {
            Err(CoreError::InvalidTravelTime { edge, occupancy, value })
        }
    }

    /// Free-flow travel time, `f(0)`.
    #[inline]
    pub fn minimum_travel_time(&self) -> Time {
        self.evaluate(0)
    }
}

impl fmt::Debug for Congestion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Congestion::Constant(t) => write!(f, "Constant({t})"),
            Congestion::Linear { slope, intercept } => {
                write!(f, "Linear({slope}·x + {intercept})")
            }
            Congestion::Bpr { free_flow, capacity, alpha, beta } => {
                write!(f, "Bpr(t0={free_flow}, c={capacity}, a={alpha}, b={beta})")
            }
            Congestion::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}
