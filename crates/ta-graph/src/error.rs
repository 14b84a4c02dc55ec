//! Graph-subsystem error type.

use thiserror::Error;

use ta_core::{CoreError, EdgeId, NodeId};

/// Errors produced by `ta-graph`.
#[derive(Debug, Error)]
pub enum GraphError {
    #[error("node {0} not found in graph")]
    MissingNode(NodeId),

    #[error("edge {0} not found in graph")]
    MissingEdge(EdgeId),

    #[error("an edge from {from} to {to} already exists")]
    DuplicateEdge { from: NodeId, to: NodeId },

    #[error("distance {distance} of edge {from}→{to} must be finite and non-negative")]
    InvalidDistance { from: NodeId, to: NodeId, distance: f64 },

    #[error("no path from {from} to {to}")]
    NoPath { from: NodeId, to: NodeId },

    #[error("invalid path: {0}")]
    InvalidPath(String),

    #[error("weight of {edge} is {weight}; search weights must be finite and non-negative")]
    InvalidWeight { edge: EdgeId, weight: f64 },

    #[error(transparent)]
    Core(#[from] CoreError),
}

impl GraphError {
    /// `true` for the errors that signal a setup contract violation rather
    /// than a search outcome.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            GraphError::MissingNode(_)
                | GraphError::MissingEdge(_)
                | GraphError::DuplicateEdge { .. }
                | GraphError::InvalidDistance { .. }
        )
    }
}

pub type GraphResult<T> = Result<T, GraphError>;
