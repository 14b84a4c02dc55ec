//! Mutable simulation state and its snapshots.

use std::fmt;

use ta_core::{Demand, DriverId, EdgeId, NodeId, Status, Time};
use ta_graph::EdgeMap;

use crate::ClockQueue;

/// One entry of a driver's log.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Step {
    /// Entered the edge.
    Edge(EdgeId),
    /// Left the network at the node.  Always the last step.
    Exit(NodeId),
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Step::Edge(e) => write!(f, "{e}"),
            Step::Exit(n) => write!(f, "exit at {n}"),
        }
    }
}

/// Everything a run mutates.
///
/// Cloning is a deep copy; two clones never share anything mutable, so a
/// clone taken before a branch is unaffected by whatever the branch does.
#[derive(Clone, Debug)]
pub struct SimState {
    pub(crate) queue:      ClockQueue,
    /// Per driver, append-only.
    pub(crate) logs:       Vec<Vec<(Step, Time)>>,
    pub(crate) occupancy:  EdgeMap<u32>,
    /// Number of events applied so far.
    pub(crate) generation: u64,
    pub(crate) now:        Time,
    pub(crate) status:     Status,
}

impl SimState {
    /// Initial state: every driver's clock at its departure, in demand order.
    pub fn new(demand: &Demand) -> Self {
        let mut queue = ClockQueue::new();
        for (id, driver) in demand.iter() {
            queue.push(driver.departure, id);
        }
        Self {
            queue,
            logs: vec![Vec::new(); demand.len()],
            occupancy: EdgeMap::new(),
            generation: 0,
            now: 0.0,
            status: Status::NotRun,
        }
    }

    pub fn log(&self, driver: DriverId) -> Option<&[(Step, Time)]> {
        self.logs.get(driver.index()).map(Vec::as_slice)
    }

    /// The edge `driver` is currently on, if any.
    pub fn current_edge(&self, driver: DriverId) -> Option<EdgeId> {
        match self.logs.get(driver.index())?.last()? {
            (Step::Edge(e), _) => Some(*e),
            (Step::Exit(_), _) => None,
        }
    }

    /// Edges entered so far, in order.
    pub fn edges_taken(&self, driver: DriverId) -> Vec<EdgeId> {
        self.logs
            .get(driver.index())
            .map(|log| {
                log.iter()
                    .filter_map(|(step, _)| match step {
                        Step::Edge(e) => Some(*e),
                        Step::Exit(_) => None,
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn is_finished(&self, driver: DriverId) -> bool {
        matches!(
            self.logs.get(driver.index()).and_then(|l| l.last()),
            Some((Step::Exit(_), _))
        )
    }

    pub fn exit_time(&self, driver: DriverId) -> Option<Time> {
        match self.logs.get(driver.index())?.last()? {
            (Step::Exit(_), t) => Some(*t),
            _ => None,
        }
    }

    /// Current number of drivers on `edge`.
    pub fn occupancy(&self, edge: EdgeId) -> u32 {
        self.occupancy.get_or(edge, 0)
    }

    pub fn clocks(&self) -> &ClockQueue {
        &self.queue
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Time of the last applied event.
    pub fn now(&self) -> Time {
        self.now
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn driver_count(&self) -> usize {
        self.logs.len()
    }

    pub(crate) fn enter(&mut self, edge: EdgeId) {
        *self.occupancy.get_or_insert(edge, 0) += 1;
    }

    pub(crate) fn leave(&mut self, edge: EdgeId) {
        let count = self.occupancy.get_or_insert(edge, 0);
        debug_assert!(*count > 0, "leaving {edge} with zero occupancy");
        *count = count.saturating_sub(1);
    }
}

// ── Snapshot ──────────────────────────────────────────────────────────────────

/// Frozen copy of a [`SimState`], tagged with the generation it was taken at.
///
/// Only readable; hand it to `EventSimulator::restore` to roll back.
#[derive(Clone, Debug)]
pub struct Snapshot {
    state: SimState,
}

impl Snapshot {
    pub(crate) fn capture(state: &SimState) -> Self {
        Self { state: state.clone() }
    }

    pub(crate) fn state(&self) -> &SimState {
        &self.state
    }

    pub fn generation(&self) -> u64 {
        self.state.generation
    }

    pub fn now(&self) -> Time {
        self.state.now
    }
}
