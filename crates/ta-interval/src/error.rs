//! Interval-subsystem error type.

use thiserror::Error;

use ta_core::{CoreError, DriverId, EdgeId};
use ta_graph::GraphError;

/// Errors produced by `ta-interval`.
#[derive(Debug, Error)]
pub enum IntervalError {
    #[error("invalid interval for {driver} on {edge}: {source}")]
    InvalidInterval {
        driver: DriverId,
        edge:   EdgeId,
        #[source]
        source: CoreError,
    },

    #[error("driver {0} is not part of the demand")]
    UnknownDriver(DriverId),

    #[error(transparent)]
    Graph(#[from] GraphError),

    #[error(transparent)]
    Core(#[from] CoreError),
}

pub type IntervalResult<T> = Result<T, IntervalError>;
