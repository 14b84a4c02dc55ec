//! `ta-graph` — road graph, path search, and traffic history.
//!
//! # Crate layout
//!
//! | Module       | Contents                                                     |
//! |--------------|--------------------------------------------------------------|
//! | [`graph`]    | `Graph` (node/edge arenas), `EdgeAttrs`, `EdgeRecord`        |
//! | [`property`] | `EdgeMap<T>`, a dense per-edge property map                  |
//! | [`path`]     | `Path`, `Route`, `TimedRoute`                                |
//! | [`search`]   | `EdgeWeight`, `PathFinder`, `Router` trait, `TrafficRouter`  |
//! | [`traffic`]  | `TrafficHistory`: per-edge time → occupancy tables           |
//! | [`error`]    | `GraphError`, `GraphResult<T>`                               |
//!
//! # Ownership
//!
//! The graph owns every node and edge record.  Everything else (paths,
//! histories, property maps) refers to them by `NodeId`/`EdgeId` and borrows
//! the graph immutably while it works; a graph must not be mutated while a
//! search or simulation holds a reference to it, which the borrow checker
//! enforces.

pub mod error;
pub mod graph;
pub mod path;
pub mod property;
pub mod search;
pub mod traffic;

#[cfg(test)]
mod tests;

pub use error::{GraphError, GraphResult};
pub use graph::{EdgeAttrs, EdgeRecord, Graph, NodeRecord};
pub use path::{Path, Route, TimedRoute};
pub use property::EdgeMap;
pub use search::{
    Distance, EdgeWeight, Enumeration, Filtered, FreeFlow, HopCount, PathFinder, Router,
    TrafficRouter,
};
pub use traffic::TrafficHistory;
