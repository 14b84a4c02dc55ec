//! `ta-interval` — time windows that bound where and when each driver can be.
//!
//! # Crate layout
//!
//! | Module       | Contents                                                       |
//! |--------------|----------------------------------------------------------------|
//! | [`store`]    | `DriverIntervalStore`, `EdgeStatus`                            |
//! | [`builder`]  | `IntervalBuilder` (free-flow bounds for a whole demand)        |
//! | [`conflict`] | `ConflictGraph` (drivers that may share an edge at one time)   |
//! | [`error`]    | `IntervalError`, `IntervalResult<T>`                           |
//!
//! # Intervals
//!
//! For a driver `d` and edge `e`:
//!
//! - the **safety interval** is an outer bound: outside it `d` is certainly
//!   not on `e`;
//! - the **presence interval** is an inner bound: inside it `d` is certainly
//!   on `e`.
//!
//! An edge marked unreachable for a driver carries neither and never will.
//!
//! # Feature flags
//!
//! | Flag       | Effect                                                      |
//! |------------|-------------------------------------------------------------|
//! | `parallel` | Build the conflict graph's reachable sets on a Rayon pool.  |

pub mod builder;
pub mod conflict;
pub mod error;
pub mod store;


pub use builder::IntervalBuilder;
pub use conflict::ConflictGraph;
pub use error::{IntervalError, IntervalResult};
pub use store::{DriverIntervalStore, EdgeStatus};
