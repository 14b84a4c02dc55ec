use thiserror::Error;

use ta_graph::GraphError;
use ta_sim::SimError;

#[derive(Debug, Error)]
pub enum HeuristicError {
    #[error("simulation error: {0}")]
    Sim(#[from] SimError),

    #[error("routing error: {0}")]
    Graph(#[from] GraphError),
}

pub type HeuristicResult<T> = Result<T, HeuristicError>;
