//! Simulation observer trait for tracing and data collection.

use ta_core::{DriverId, EdgeId, NodeId, Status, Time};

/// Callbacks invoked by the simulator as events are applied.
///
/// All methods have default no-op implementations so implementors only need
/// to override what they care about.
///
/// # Example: entry counter
///
/// ```rust,ignore
/// struct Entries(usize);
///
/// impl SimObserver for Entries {
///     fn on_entry(&mut self, _: DriverId, _: EdgeId, _: Time, _: Time) {
///         self.0 += 1;
///     }
/// }
/// ```
pub trait SimObserver {
    /// `driver` entered `edge` at `time` and will leave it after
    /// `travel_time`.
    fn on_entry(&mut self, _driver: DriverId, _edge: EdgeId, _time: Time, _travel_time: Time) {}

    /// `driver` left the network at `node`.
    fn on_exit(&mut self, _driver: DriverId, _node: NodeId, _time: Time) {}

    /// Called once when `simulate` stops.
    fn on_finish(&mut self, _status: Status) {}
}

/// A [`SimObserver`] that does nothing.
pub struct NoopObserver;

impl SimObserver for NoopObserver {}
