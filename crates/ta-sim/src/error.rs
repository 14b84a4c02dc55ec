use thiserror::Error;

use ta_core::{CoreError, DriverId, EdgeId, NodeId};
use ta_graph::GraphError;

#[derive(Debug, Error)]
pub enum SimError {
    #[error("{driver} is at {at} but was sent onto {edge}, which does not start there")]
    DiscontinuousPath {
        driver: DriverId,
        at:     NodeId,
        edge:   EdgeId,
    },

    #[error("route for {driver} is inconsistent with its progress: {reason}")]
    InconsistentPath { driver: DriverId, reason: String },

    #[error("{what} length {got} does not match driver count {expected}")]
    AssignmentMismatch {
        expected: usize,
        got:      usize,
        what:     &'static str,
    },

    #[error(transparent)]
    Graph(#[from] GraphError),

    #[error(transparent)]
    Core(#[from] CoreError),
}

pub type SimResult<T> = Result<T, SimError>;
