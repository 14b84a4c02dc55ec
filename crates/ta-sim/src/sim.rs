//! The `EventSimulator` and its event loop.

use ta_core::{Budget, Demand, DriverId, EdgeId, EngineConfig, NodeId, Status, Time};
use ta_graph::{Graph, Path, TrafficHistory};

use crate::{
    FixedRoutes, NoopObserver, RoutePolicy, SimError, SimObserver, SimResult, SimState, Snapshot,
    Step, StepContext,
};

/// What one applied clock did.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Event {
    Entered {
        driver:      DriverId,
        edge:        EdgeId,
        time:        Time,
        /// Drivers already on the edge at entry.
        occupancy:   u32,
        travel_time: Time,
    },
    Exited {
        driver: DriverId,
        node:   NodeId,
        time:   Time,
    },
}

impl Event {
    pub fn driver(&self) -> DriverId {
        match self {
            Event::Entered { driver, .. } | Event::Exited { driver, .. } => *driver,
        }
    }

    pub fn time(&self) -> Time {
        match self {
            Event::Entered { time, .. } | Event::Exited { time, .. } => *time,
        }
    }
}

// ── EventSimulator ────────────────────────────────────────────────────────────

/// Single-threaded discrete-event replay of drivers over a congested graph.
///
/// Each pending clock is one driver standing at a node.  Applying it:
///
/// 1. the driver leaves the edge it was on (if any);
/// 2. it either exits the network, or enters the next edge with travel time
///    `f(occupancy)`, where occupancy counts the drivers already on that
///    edge, and schedules its next clock at `now + travel_time`.
///
/// The next edge comes from the [`RoutePolicy`] ([`next`](Self::next)) or
/// from the caller ([`advance`](Self::advance)).
///
/// Create via [`SimBuilder`](crate::SimBuilder).
pub struct EventSimulator<'a, P: RoutePolicy> {
    pub(crate) graph:  &'a Graph,
    pub(crate) demand: &'a Demand,
    pub(crate) config: EngineConfig,
    pub(crate) policy: P,
    pub(crate) state:  SimState,
}

impl<'a, P: RoutePolicy> EventSimulator<'a, P> {
    pub(crate) fn from_parts(graph: &'a Graph, demand: &'a Demand, config: EngineConfig, policy: P) -> Self {
        Self {
            graph,
            demand,
            config,
            policy,
            state: SimState::new(demand),
        }
    }

    // ── Accessors ─────────────────────────────────────────────────────────

    pub fn graph(&self) -> &'a Graph {
        self.graph
    }

    pub fn demand(&self) -> &'a Demand {
        self.demand
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn policy(&self) -> &P {
        &self.policy
    }

    pub fn state(&self) -> &SimState {
        &self.state
    }

    pub fn status(&self) -> Status {
        self.state.status
    }

    /// Time of the last applied event.
    pub fn now(&self) -> Time {
        self.state.now
    }

    // ── Stepping ──────────────────────────────────────────────────────────

    /// The next clock to fire, without applying it.
    pub fn peek(&self) -> Option<(Time, DriverId)> {
        self.state.queue.peek()
    }

    /// Node `driver` is currently standing at (or exited from).
    pub fn position(&self, driver: DriverId) -> SimResult<NodeId> {
        let d = self.demand.get(driver).ok_or(ta_core::CoreError::DriverNotFound(driver))?;
        match self.state.log(driver).and_then(|l| l.last()) {
            None => Ok(d.start),
            Some((Step::Exit(node), _)) => Ok(*node),
            Some((Step::Edge(edge), _)) => Ok(self.graph.target(*edge).ok_or(ta_graph::GraphError::MissingEdge(*edge))?),
        }
    }

    /// Edges the peeked driver could enter next.
    pub fn candidates(&self) -> SimResult<Vec<EdgeId>> {
        let Some((_, driver)) = self.peek() else {
            return Ok(Vec::new());
        };
        let at = self.position(driver)?;
        Ok(self.graph.out_edges(at).collect())
    }

    /// Apply the next clock with the edge chosen by the policy.
    /// Returns `None` once no clocks remain.
    pub fn next(&mut self) -> SimResult<Option<Event>> {
        self.next_with(&mut NoopObserver)
    }

    /// As [`next`](Self::next), reporting to `observer`.
    pub fn next_with<O: SimObserver>(&mut self, observer: &mut O) -> SimResult<Option<Event>> {
        let Some((now, driver)) = self.peek() else {
            return Ok(None);
        };
        let at = self.position(driver)?;
        let ctx = StepContext {
            graph:  self.graph,
            demand: self.demand,
            state:  &self.state,
            driver: &self.demand[driver],
            at,
            now,
        };
        let choice = self.policy.next_edge(driver, &ctx)?;
        self.apply(choice, observer).map(Some)
    }

    /// Apply the next clock with a caller-chosen edge; `None` exits the
    /// driver at its current node.  Lets an external search branch on
    /// choices while reusing the simulator's bookkeeping.
    pub fn advance(&mut self, choice: Option<EdgeId>) -> SimResult<Event> {
        self.apply(choice, &mut NoopObserver)
    }

    fn apply<O: SimObserver>(&mut self, choice: Option<EdgeId>, observer: &mut O) -> SimResult<Event> {
        let Some((now, driver)) = self.peek() else {
            return Err(SimError::InconsistentPath {
                driver: DriverId::INVALID,
                reason: "no pending clock to apply".into(),
            });
        };
        let at = self.position(driver)?;
        if let Some(edge) = choice {
            let source = self.graph.source(edge).ok_or(ta_graph::GraphError::MissingEdge(edge))?;
            if source != at {
                self.state.status = Status::Failed;
                return Err(SimError::DiscontinuousPath { driver, at, edge });
            }
        }

        self.state.queue.pop();
        self.state.now = now;
        self.state.generation += 1;
        if let Some(current) = self.state.current_edge(driver) {
            self.state.leave(current);
        }

        let event = match choice {
            None => {
                self.state.logs[driver.index()].push((Step::Exit(at), now));
                observer.on_exit(driver, at, now);
                log::trace!("{driver} exits at {at} at {now}");
                Event::Exited { driver, node: at, time: now }
            }
            Some(edge) => {
                let occupancy = self.state.occupancy(edge);
                let travel_time = match self.graph.travel_time(edge, occupancy) {
                    Ok(t) => t,
                    Err(e) => {
                        self.state.status = Status::Failed;
                        return Err(e.into());
                    }
                };
                self.state.enter(edge);
                self.state.logs[driver.index()].push((Step::Edge(edge), now));
                self.state.queue.push(now + travel_time, driver);
                observer.on_entry(driver, edge, now, travel_time);
                log::trace!("{driver} enters {edge} at {now} behind {occupancy}, travel {travel_time}");
                Event::Entered { driver, edge, time: now, occupancy, travel_time }
            }
        };
        Ok(event)
    }

    /// Run until every driver has exited, the next clock lies beyond the
    /// horizon, or the wall-clock budget runs out.
    pub fn simulate(&mut self) -> SimResult<Status> {
        self.simulate_with(&mut NoopObserver)
    }

    pub fn simulate_with<O: SimObserver>(&mut self, observer: &mut O) -> SimResult<Status> {
        let mut budget = Budget::from_config(&self.config);
        let horizon = self.config.horizon_time();

        let status = loop {
            let Some(next) = self.state.queue.next_time() else {
                break Status::Success;
            };
            if next > horizon {
                log::info!("simulation stopped at horizon {horizon}; next clock at {next}");
                break Status::Timeout;
            }
            if budget.tick() {
                log::warn!("simulation budget exhausted after {} events", self.state.generation);
                break Status::Timeout;
            }
            if let Err(e) = self.next_with(observer) {
                self.state.status = Status::Failed;
                observer.on_finish(Status::Failed);
                return Err(e);
            }
        };

        self.state.status = status;
        observer.on_finish(status);
        log::debug!(
            "simulation finished: {status} after {} events, value {}",
            self.state.generation,
            self.value()
        );
        Ok(status)
    }

    // ── Snapshots ─────────────────────────────────────────────────────────

    /// Deep copy of the current state, tagged with its generation.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot::capture(&self.state)
    }

    /// Replace the current state with `snapshot`'s.
    pub fn restore(&mut self, snapshot: &Snapshot) {
        self.state = snapshot.state().clone();
    }

    // ── Queries ───────────────────────────────────────────────────────────

    /// The driver's log: every edge entered with its entry time, then the
    /// exit node with the exit time once it has left.
    pub fn starting_times(&self, driver: DriverId) -> SimResult<&[(Step, Time)]> {
        self.state
            .log(driver)
            .ok_or_else(|| ta_core::CoreError::DriverNotFound(driver).into())
    }

    pub fn exit_time(&self, driver: DriverId) -> Option<Time> {
        self.state.exit_time(driver)
    }

    pub fn is_finished(&self, driver: DriverId) -> bool {
        self.state.is_finished(driver)
    }

    /// Drivers on `edge` at `t`, counting entries strictly before and exits
    /// strictly after `t`.  A driver still on the edge has no exit yet.
    pub fn get_traffic(&self, edge: EdgeId, t: Time) -> u32 {
        let mut count = 0;
        for log in &self.state.logs {
            for (i, (step, entry)) in log.iter().enumerate() {
                if *step != Step::Edge(edge) {
                    continue;
                }
                let exit = log.get(i + 1).map_or(Time::INFINITY, |(_, t)| *t);
                if *entry < t && t < exit {
                    count += 1;
                }
            }
        }
        count
    }

    /// Current occupancy of `edge`.
    pub fn occupancy(&self, edge: EdgeId) -> u32 {
        self.state.occupancy(edge)
    }

    /// Objective over the drivers that have exited.
    pub fn value(&self) -> Time {
        let finished = self
            .demand
            .iter()
            .filter_map(|(id, d)| self.state.exit_time(id).map(|exit| (d.departure, exit)));
        self.config.objective.reduce(finished)
    }

    /// Edges entered per driver, in order.
    pub fn get_edge_description(&self) -> Vec<Vec<EdgeId>> {
        self.demand.ids().map(|id| self.state.edges_taken(id)).collect()
    }

    /// Node path travelled so far per driver.
    pub fn get_path_description(&self) -> SimResult<Vec<Path>> {
        self.demand
            .iter()
            .map(|(id, d)| {
                let edges = self.state.edges_taken(id);
                if edges.is_empty() {
                    Ok(Path::trivial(d.start))
                } else {
                    Ok(Path::from_edges(self.graph, &edges)?)
                }
            })
            .collect()
    }

    /// Every edge traversal so far as presence records.  Drivers still on an
    /// edge are recorded as staying indefinitely.
    pub fn traffic_history(&self) -> TrafficHistory {
        let mut history = TrafficHistory::new();
        for log in &self.state.logs {
            for (i, (step, entry)) in log.iter().enumerate() {
                if let Step::Edge(edge) = step {
                    let exit = log.get(i + 1).map_or(Time::INFINITY, |(_, t)| *t);
                    history.record(*edge, *entry, exit);
                }
            }
        }
        history
    }
}

// ── Edge-description mode ─────────────────────────────────────────────────────

impl EventSimulator<'_, FixedRoutes> {
    /// Give `driver` a new path.  It must start with every edge the driver
    /// has already entered.
    pub fn reassign(&mut self, driver: DriverId, path: &Path) -> SimResult<()> {
        let d = self.demand.get(driver).ok_or(ta_core::CoreError::DriverNotFound(driver))?;
        if path.start() != d.start {
            return Err(SimError::InconsistentPath {
                driver,
                reason: format!("path {path} does not start at {}", d.start),
            });
        }
        let edges = path.edges(self.graph)?;
        let taken = self.state.edges_taken(driver);
        self.policy.set_route(driver, &taken, edges)
    }
}
