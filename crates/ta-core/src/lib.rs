//! `ta-core` — foundational types for the route assignment engine.
//!
//! This crate is a dependency of every other `ta-*` crate.  It has no `ta-*`
//! dependencies and only small external ones (`rand`, `thiserror`, `log`,
//! plus optional `serde`).
//!
//! # What lives here
//!
//! | Module          | Contents                                              |
//! |-----------------|-------------------------------------------------------|
//! | [`ids`]         | `NodeId`, `EdgeId`, `DriverId`                        |
//! | [`geo`]         | `Point` (planar position, Euclidean distance)         |
//! | [`time`]        | `Time`, integer bound rounding helpers                |
//! | [`interval`]    | `Interval`, `RawInterval`                             |
//! | [`congestion`]  | `Congestion` (occupancy → travel time)                |
//! | [`driver`]      | `Driver`, `Demand`                                    |
//! | [`config`]      | `EngineConfig`, `Objective`                           |
//! | [`budget`]      | `Budget` (cooperative wall-clock cancellation)        |
//! | [`status`]      | `Status` (`Success`, `Timeout`, `Failed`, `NotRun`)   |
//! | [`rng`]         | `SimRng` (seeded, deterministic)                      |
//! | [`error`]       | `CoreError`, `CoreResult`                             |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to the public value types.  |

pub mod budget;
pub mod config;
pub mod congestion;
pub mod driver;
pub mod error;
pub mod geo;
pub mod ids;
pub mod interval;
pub mod rng;
pub mod status;
pub mod time;

#[cfg(test)]
mod tests;

// ── Re-exports ────────────────────────────────────────────────────────────────

pub use budget::Budget;
pub use config::{EngineConfig, Objective};
pub use congestion::Congestion;
pub use driver::{Demand, Driver};
pub use error::{CoreError, CoreResult};
pub use geo::Point;
pub use ids::{DriverId, EdgeId, NodeId};
pub use interval::{Interval, RawInterval};
pub use rng::SimRng;
pub use status::Status;
pub use time::Time;
