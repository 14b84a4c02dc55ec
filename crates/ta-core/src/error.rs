//! Core error type.
//!
//! Sub-crates define their own error enums and wrap `CoreError` as one
//! variant via `#[from]`, so `?` works across crate boundaries.

use thiserror::Error;

use crate::{DriverId, EdgeId};

/// The error type for `ta-core` and a common base for sub-crates.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A structural contract was violated while setting up an instance.
    #[error("configuration error: {0}")]
    Config(String),

    #[error("invalid interval [{lower}, {upper}]: {reason}")]
    InvalidInterval {
        lower:  f64,
        upper:  f64,
        reason: &'static str,
    },

    #[error("congestion function of {edge} returned {value} for occupancy {occupancy}")]
    InvalidTravelTime {
        edge:      EdgeId,
        occupancy: u32,
        value:     f64,
    },

    #[error("driver {0} not found")]
    DriverNotFound(DriverId),
}

/// Shorthand result type for `ta-core`.
pub type CoreResult<T> = Result<T, CoreError>;
