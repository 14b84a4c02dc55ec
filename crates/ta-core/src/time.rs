//! Simulation time model.
//!
//! # Design
//!
//! Simulated time is a plain `f64` count of abstract time units.  Congestion
//! functions may return fractional travel times, so event timestamps are
//! floating point.  Interval bounds, on the other hand, are integers: the
//! external solver indexes its decision variables by whole time steps.  The
//! helpers below convert a real-valued window into integer bounds that never
//! shrink it (lower bounds round down, upper bounds round up).

/// A point in simulated time, or a duration.
pub type Time = f64;

/// Round a lower bound outward to the integer grid.
#[inline]
pub fn floor_bound(t: Time) -> i64 {
    t.floor() as i64
}

/// Round an upper bound outward to the integer grid.
#[inline]
pub fn ceil_bound(t: Time) -> i64 {
    t.ceil() as i64
}

/// Round a lower bound inward (used for inner windows that must not grow).
#[inline]
pub fn ceil_inner(t: Time) -> i64 {
    t.ceil() as i64
}

/// Round an upper bound inward.
#[inline]
pub fn floor_inner(t: Time) -> i64 {
    t.floor() as i64
}
