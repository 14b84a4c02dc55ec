//! `ta-sim` — discrete-event replay of route assignments.
//!
//! # Event loop
//!
//! ```text
//! while a clock is pending and within the horizon and budget:
//!   ① Pop     : earliest (time, driver) clock; ties in insertion order.
//!   ② Decide  : RoutePolicy::next_edge (or the caller, via `advance`).
//!   ③ Apply   : leave the current edge, then either
//!                 exit        → log Exit(node)
//!                 enter edge  → travel = f(occupancy), log entry,
//!                               push clock at now + travel
//! ```
//!
//! # Crate layout
//!
//! | Module         | Contents                                                   |
//! |----------------|------------------------------------------------------------|
//! | [`sim`]        | `EventSimulator`, `Event`                                  |
//! | [`builder`]    | `SimBuilder`                                               |
//! | [`policy`]     | `RoutePolicy`, `FixedRoutes`, `FreeFlowRoutes`             |
//! | [`assignment`] | `Assignment`, `Batch`                                      |
//! | [`state`]      | `SimState`, `Snapshot`, `Step`                             |
//! | [`queue`]      | `ClockQueue`                                               |
//! | [`observer`]   | `SimObserver`, `NoopObserver`                              |
//! | [`error`]      | `SimError`, `SimResult<T>`                                 |
//!
//! # Quick-start
//!
//! ```rust,ignore
//! use ta_sim::{Assignment, SimBuilder};
//!
//! let mut sim = SimBuilder::fixed(&graph, &demand, &assignment)?.build()?;
//! let status = sim.simulate()?;
//! println!("{status}: {}", sim.value());
//! ```

pub mod assignment;
pub mod builder;
pub mod error;
pub mod observer;
pub mod policy;
pub mod queue;
pub mod sim;
pub mod state;


pub use assignment::{Assignment, Batch};
pub use builder::SimBuilder;
pub use error::{SimError, SimResult};
pub use observer::{NoopObserver, SimObserver};
pub use policy::{FixedRoutes, FreeFlowRoutes, RoutePolicy, StepContext};
pub use queue::ClockQueue;
pub use sim::{Event, EventSimulator};
pub use state::{SimState, Snapshot, Step};
