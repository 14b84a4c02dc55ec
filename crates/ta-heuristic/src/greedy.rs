//! One-pass greedy assignment.

use ta_core::{Demand, EngineConfig, Status, Time};
use ta_graph::{Graph, PathFinder, Router, TimedRoute, TrafficHistory, TrafficRouter};
use ta_sim::{Assignment, SimBuilder};

use crate::HeuristicResult;

/// Outcome of a greedy pass.
#[derive(Clone, Debug)]
pub struct GreedyResult {
    /// One path per driver, indexed by `DriverId`.
    pub assignment: Assignment,
    /// The `(node, time)` trace each driver was routed with, indexed by
    /// `DriverId`.  Times are those the router predicted against the
    /// earlier drivers only.
    pub traces:     Vec<TimedRoute>,
    /// Objective of the assignment replayed through the simulator.
    pub value:      Time,
    /// Status of that replay.
    pub status:     Status,
}

/// Routes drivers one at a time in departure order, each against the traffic
/// of the drivers routed before it, then replays the result.
///
/// Later drivers never displace earlier ones, so the replayed value can be
/// worse than what the router predicted; it is an upper bound on the optimum.
pub struct GreedyAssignmentHeuristic<'a, R: Router = TrafficRouter> {
    graph:  &'a Graph,
    demand: &'a Demand,
    config: EngineConfig,
    router: R,
}

impl<'a> GreedyAssignmentHeuristic<'a, TrafficRouter> {
    /// Greedy pass with the time-dependent earliest-arrival router.
    pub fn new(graph: &'a Graph, demand: &'a Demand, config: &EngineConfig) -> Self {
        Self::with_router(graph, demand, config, TrafficRouter::default())
    }
}

impl<'a, R: Router> GreedyAssignmentHeuristic<'a, R> {
    pub fn with_router(graph: &'a Graph, demand: &'a Demand, config: &EngineConfig, router: R) -> Self {
        Self { graph, demand, config: config.clone(), router }
    }

    pub fn router(&self) -> &R {
        &self.router
    }

    /// Route every driver and replay the assignment.
    ///
    /// # Errors
    /// Any routing error, e.g. [`GraphError::NoPath`](ta_graph::GraphError::NoPath)
    /// for a driver whose destination is unreachable.
    pub fn run(&self) -> HeuristicResult<GreedyResult> {
        let finder = PathFinder::from_config(self.graph, &self.config);
        let mut history = TrafficHistory::new();
        let mut traces: Vec<Option<TimedRoute>> = vec![None; self.demand.len()];

        for id in self.demand.by_departure() {
            let route = self.router.route(&finder, &self.demand[id], &history)?;
            log::trace!("{id} routed on {} arriving at {}", route.path, route.arrival());
            history.record_route(self.graph, &route)?;
            traces[id.index()] = Some(route);
        }
        let traces: Vec<TimedRoute> = traces.into_iter().flatten().collect();

        let assignment: Assignment = traces.iter().map(|t| t.path.clone()).collect();
        let mut sim = SimBuilder::fixed(self.graph, self.demand, &assignment)?
            .config(self.config.clone())
            .build()?;
        let status = sim.simulate()?;
        let value = sim.value();
        log::debug!(
            "greedy assignment of {} drivers: {status}, value {value}",
            self.demand.len()
        );

        Ok(GreedyResult { assignment, traces, value, status })
    }
}
