//! Route policies: what a driver does when its clock fires.
//!
//! [`FixedRoutes`] replays a precomputed edge sequence per driver (the
//! edge-description mode).  Any other implementation decides on the fly
//! (search-driven mode); [`FreeFlowRoutes`] is the simplest such policy.

use ta_core::{Demand, Driver, DriverId, EdgeId, NodeId, Time};
use ta_graph::{FreeFlow, Graph, PathFinder};

use crate::{Assignment, SimError, SimResult, SimState};

/// Read-only view handed to a policy for one decision.
pub struct StepContext<'a> {
    pub graph:  &'a Graph,
    pub demand: &'a Demand,
    pub state:  &'a SimState,
    pub driver: &'a Driver,
    /// Node the driver is standing at.
    pub at:     NodeId,
    pub now:    Time,
}

/// Pluggable next-edge decision.
///
/// # Thread safety
///
/// Policies must be `Send + Sync` so a configured simulator can be moved to
/// and shared with worker threads.
pub trait RoutePolicy: Send + Sync {
    /// The edge `driver` enters next, or `None` to leave the network at
    /// `ctx.at`.
    fn next_edge(&self, driver: DriverId, ctx: &StepContext<'_>) -> SimResult<Option<EdgeId>>;
}

// ── FixedRoutes ───────────────────────────────────────────────────────────────

/// Edge-description mode: each driver follows its assigned edge sequence.
#[derive(Clone, Debug, Default)]
pub struct FixedRoutes {
    routes: Vec<Vec<EdgeId>>,
}

impl FixedRoutes {
    pub fn new(graph: &Graph, assignment: &Assignment) -> SimResult<Self> {
        Ok(Self { routes: assignment.edge_description(graph)? })
    }

    pub fn from_edges(routes: Vec<Vec<EdgeId>>) -> Self {
        Self { routes }
    }

    pub fn route(&self, driver: DriverId) -> Option<&[EdgeId]> {
        self.routes.get(driver.index()).map(Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Replace the route of `driver`.  `taken` is what it has already
    /// entered; the new route must begin with exactly those edges.
    pub(crate) fn set_route(&mut self, driver: DriverId, taken: &[EdgeId], edges: Vec<EdgeId>) -> SimResult<()> {
        if !edges.starts_with(taken) {
            return Err(SimError::InconsistentPath {
                driver,
                reason: format!("new route drops some of the {} edges already entered", taken.len()),
            });
        }
        let routes_len = self.routes.len();
        let slot = self.routes.get_mut(driver.index()).ok_or(SimError::AssignmentMismatch {
            expected: driver.index() + 1,
            got:      routes_len,
            what:     "fixed routes",
        })?;
        *slot = edges;
        Ok(())
    }
}

impl RoutePolicy for FixedRoutes {
    fn next_edge(&self, driver: DriverId, ctx: &StepContext<'_>) -> SimResult<Option<EdgeId>> {
        let route = self.route(driver).ok_or(SimError::AssignmentMismatch {
            expected: ctx.demand.len(),
            got:      self.routes.len(),
            what:     "fixed routes",
        })?;
        let taken = ctx.state.edges_taken(driver);
        if !route.starts_with(&taken) {
            return Err(SimError::InconsistentPath {
                driver,
                reason: "log diverges from the assigned edges".into(),
            });
        }
        Ok(route.get(taken.len()).copied())
    }
}

// ── FreeFlowRoutes ────────────────────────────────────────────────────────────

/// Search-driven mode: at every node take the first edge of a free-flow
/// shortest path to the destination.
#[derive(Copy, Clone, Debug, Default)]
pub struct FreeFlowRoutes;

impl RoutePolicy for FreeFlowRoutes {
    fn next_edge(&self, _driver: DriverId, ctx: &StepContext<'_>) -> SimResult<Option<EdgeId>> {
        if ctx.at == ctx.driver.end {
            return Ok(None);
        }
        let route = PathFinder::new(ctx.graph).shortest_path(ctx.at, ctx.driver.end, &FreeFlow)?;
        let nodes = route.path.nodes();
        Ok(ctx.graph.edge_between(nodes[0], nodes[1]))
    }
}
