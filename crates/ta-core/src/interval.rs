//! Integer time windows clipped to the planning horizon.
//!
//! An [`Interval`] always satisfies `0 ≤ lower ≤ upper ≤ horizon`; the only
//! way to obtain one from caller-supplied bounds is [`RawInterval::validate`],
//! which rejects malformed input eagerly instead of storing it.

use std::fmt;

use crate::{CoreError, CoreResult, Time};

/// A closed window `[lower, upper]` of whole time units.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Interval {
    lower: u64,
    upper: u64,
}

impl Interval {
    /// Build a window from bounds that are already known to be valid and
    /// inside the horizon.
    ///
    /// # Panics
    /// Panics if `lower > upper`.
    #[inline]
    pub fn new(lower: u64, upper: u64) -> Self {
        assert!(lower <= upper, "Interval::new: lower {lower} > upper {upper}");
        Self { lower, upper }
    }

    #[inline]
    pub fn lower(&self) -> u64 {
        self.lower
    }

    #[inline]
    pub fn upper(&self) -> u64 {
        self.upper
    }

    /// Number of time units spanned (`upper - lower`).
    #[inline]
    pub fn width(&self) -> u64 {
        self.upper - self.lower
    }

    /// `true` if `t` lies in the closed window.
    #[inline]
    pub fn contains(&self, t: Time) -> bool {
        self.lower as Time <= t && t <= self.upper as Time
    }

    /// Closed-window intersection test.
    #[inline]
    pub fn overlaps(&self, other: &Interval) -> bool {
        self.lower <= other.upper && other.lower <= self.upper
    }

    /// `true` if `self` lies entirely inside `other`.
    #[inline]
    pub fn is_within(&self, other: &Interval) -> bool {
        other.lower <= self.lower && self.upper <= other.upper
    }

    /// Ordering constraint between consecutive edges of one driver.
    ///
    /// `self` is the window on a predecessor edge, `next` the window on the
    /// edge that follows it.  Both bounds must be non-decreasing and the
    /// predecessor must overlap or precede its successor.
    #[inline]
    pub fn is_time_connected_to(&self, next: &Interval) -> bool {
        self.lower <= next.lower && self.upper <= next.upper && self.lower <= next.upper
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.lower, self.upper)
    }
}

// ── RawInterval ───────────────────────────────────────────────────────────────

/// Unvalidated bounds as supplied by a caller.
///
/// Accepts integer or floating-point pairs; [`validate`](Self::validate)
/// enforces integrality and ordering before clipping to `[0, horizon]`.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct RawInterval {
    pub lower: f64,
    pub upper: f64,
}

impl RawInterval {
    pub fn new(lower: f64, upper: f64) -> Self {
        Self { lower, upper }
    }

    /// Check the bounds and clip them into `[0, horizon]`.
    ///
    /// # Errors
    /// [`CoreError::InvalidInterval`] if a bound is not finite, not an
    /// integer, or `lower > upper`.
    pub fn validate(self, horizon: u64) -> CoreResult<Interval> {
        let Self { lower, upper } = self;
        let invalid = |reason| CoreError::InvalidInterval { lower, upper, reason };

        if !lower.is_finite() || !upper.is_finite() {
            return Err(invalid("bounds must be finite"));
        }
        if lower.fract() != 0.0 || upper.fract() != 0.0 {
            return Err(invalid("bounds must be integers"));
        }
        if lower > upper {
            return Err(invalid("lower bound exceeds upper bound"));
        }

        let h = horizon as f64;
        let lo = lower.clamp(0.0, h) as u64;
        let hi = upper.clamp(0.0, h) as u64;
        Ok(Interval::new(lo, hi))
    }
}

impl From<(i64, i64)> for RawInterval {
    fn from((lower, upper): (i64, i64)) -> Self {
        Self::new(lower as f64, upper as f64)
    }
}

impl From<(u64, u64)> for RawInterval {
    fn from((lower, upper): (u64, u64)) -> Self {
        Self::new(lower as f64, upper as f64)
    }
}

impl From<(f64, f64)> for RawInterval {
    fn from((lower, upper): (f64, f64)) -> Self {
        Self::new(lower, upper)
    }
}

impl From<Interval> for RawInterval {
    fn from(iv: Interval) -> Self {
        Self::new(iv.lower as f64, iv.upper as f64)
    }
}
