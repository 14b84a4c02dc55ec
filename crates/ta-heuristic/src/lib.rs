//! `ta-heuristic` — building route assignments for a whole demand.
//!
//! # Crate layout
//!
//! | Module        | Contents                                                    |
//! |---------------|-------------------------------------------------------------|
//! | [`greedy`]    | `GreedyAssignmentHeuristic`, `GreedyResult`                 |
//! | [`backtrack`] | `BacktrackingSearch`, `SearchResult`, `SearchStats`         |
//! | [`error`]     | `HeuristicError`, `HeuristicResult<T>`                      |
//!
//! The greedy pass is fast and myopic; its value is an upper bound.  The
//! backtracking search starts from it and branches on each driver's
//! near-optimal free-flow paths inside the simulator, rolling back with
//! snapshots, until it has proven an optimum or its budget runs out.

pub mod backtrack;
pub mod error;
pub mod greedy;

#[cfg(test)]
mod tests;

pub use backtrack::{BacktrackingSearch, SearchResult, SearchStats};
pub use error::{HeuristicError, HeuristicResult};
pub use greedy::{GreedyAssignmentHeuristic, GreedyResult};
