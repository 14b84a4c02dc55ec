//! Depth-first branch-and-bound over simulator decisions.
//!
//! Each search node is a simulator state whose next clock belongs to some
//! driver.  Its children are the edges that continue one of that driver's
//! candidate paths (the free-flow alternatives within `slack` of optimal),
//! plus exiting once a candidate path is complete.  A branch is explored by
//! `advance`, and siblings are reached by restoring the snapshot taken
//! before the first child.

use std::time::Duration;

use rustc_hash::FxHashMap;
use ta_core::{Budget, Demand, DriverId, EdgeId, EngineConfig, NodeId, Status, Time};
use ta_graph::{FreeFlow, Graph, PathFinder};
use ta_sim::{Assignment, EventSimulator, FixedRoutes, SimBuilder, Snapshot, Step};

use crate::{GreedyAssignmentHeuristic, HeuristicResult};

/// Counters reported by a search run.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct SearchStats {
    /// Search nodes expanded.
    pub explored:     u64,
    /// Nodes cut by the lower bound or the horizon.
    pub pruned:       u64,
    /// Complete assignments that beat the incumbent.
    pub improvements: u64,
}

/// Best assignment found.
#[derive(Clone, Debug)]
pub struct SearchResult {
    pub assignment: Assignment,
    pub value:      Time,
    /// `Success` if the search space was exhausted, `Timeout` if the budget
    /// ran out first.
    pub status:     Status,
    pub stats:      SearchStats,
}

/// One open branching point.
struct Frame {
    snapshot: Snapshot,
    choices:  Vec<Option<EdgeId>>,
    next:     usize,
}

/// Branch-and-bound improvement of the greedy assignment.
///
/// The lower bound charges each finished driver its exit time and each
/// other driver the earliest moment it could reach its destination at
/// free-flow speed.  It never overestimates as long as every congestion
/// function is non-decreasing in occupancy.
pub struct BacktrackingSearch<'a> {
    graph:          &'a Graph,
    demand:         &'a Demand,
    config:         EngineConfig,
    slack:          f64,
    time_budget:    Option<Duration>,
    check_interval: u64,
}

impl<'a> BacktrackingSearch<'a> {
    /// Search with zero slack, i.e. branching only between free-flow optimal
    /// paths, under the config's budget.
    pub fn new(graph: &'a Graph, demand: &'a Demand, config: &EngineConfig) -> Self {
        Self {
            graph,
            demand,
            config: config.clone(),
            slack: 0.0,
            time_budget: config.time_budget,
            check_interval: config.check_interval,
        }
    }

    /// Additive slack over each driver's free-flow optimum.
    pub fn slack(mut self, slack: f64) -> Self {
        self.slack = slack;
        self
    }

    /// Budget for the search itself.  The greedy seed and path enumeration
    /// still follow the config.
    pub fn with_budget(mut self, limit: Option<Duration>, check_interval: u64) -> Self {
        self.time_budget = limit;
        self.check_interval = check_interval;
        self
    }

    pub fn run(&self) -> HeuristicResult<SearchResult> {
        let greedy = GreedyAssignmentHeuristic::new(self.graph, self.demand, &self.config).run()?;
        let mut best = SearchResult {
            value:      if greedy.status.is_success() { greedy.value } else { Time::INFINITY },
            assignment: greedy.assignment,
            status:     Status::NotRun,
            stats:      SearchStats::default(),
        };

        let finder = PathFinder::from_config(self.graph, &self.config);
        let mut candidates: Vec<Vec<Vec<EdgeId>>> = Vec::with_capacity(self.demand.len());
        let mut to_end: FxHashMap<NodeId, Vec<Option<f64>>> = FxHashMap::default();
        for (id, driver) in self.demand.iter() {
            let found = finder.enumerate_paths(driver.start, driver.end, self.slack, &FreeFlow)?;
            if !found.is_complete() {
                log::warn!("{id}: only {} candidate paths before timeout", found.len());
            }
            let paths = found
                .paths()
                .map(|p| p.edges(self.graph))
                .collect::<Result<Vec<_>, _>>()?;
            candidates.push(paths);
            if !to_end.contains_key(&driver.end) {
                to_end.insert(driver.end, finder.distances_to(driver.end, &FreeFlow)?);
            }
        }

        let mut sim = SimBuilder::new(self.graph, self.demand, FixedRoutes::default())
            .config(self.config.clone())
            .build()?;
        let mut budget = Budget::new(self.time_budget, self.check_interval);
        let horizon = self.config.horizon_time();
        let mut stack: Vec<Frame> = Vec::new();
        let mut stats = SearchStats::default();
        let mut timed_out = false;

        'search: loop {
            if budget.tick() {
                timed_out = true;
                break;
            }
            stats.explored += 1;

            let dead_end = match sim.peek() {
                None => {
                    let value = sim.value();
                    if value < best.value {
                        log::debug!("backtracking improved {} → {value}", best.value);
                        best.value = value;
                        best.assignment = sim.get_path_description()?.into_iter().collect();
                        stats.improvements += 1;
                    }
                    true
                }
                Some((now, _)) if now > horizon => {
                    stats.pruned += 1;
                    true
                }
                Some(_) if self.lower_bound(&sim, &to_end) >= best.value => {
                    stats.pruned += 1;
                    true
                }
                Some((_, driver)) => {
                    let choices = next_moves(&sim, driver, &candidates[driver.index()]);
                    match choices.len() {
                        0 => true,
                        1 => {
                            sim.advance(choices[0])?;
                            false
                        }
                        _ => {
                            let first = choices[0];
                            stack.push(Frame { snapshot: sim.snapshot(), choices, next: 1 });
                            sim.advance(first)?;
                            false
                        }
                    }
                }
            };

            if dead_end {
                loop {
                    let Some(frame) = stack.last_mut() else {
                        break 'search;
                    };
                    if let Some(&choice) = frame.choices.get(frame.next) {
                        frame.next += 1;
                        sim.restore(&frame.snapshot);
                        sim.advance(choice)?;
                        break;
                    }
                    stack.pop();
                }
            }
        }

        best.status = if timed_out { Status::Timeout } else { Status::Success };
        best.stats = stats;
        log::info!(
            "backtracking search {}: value {} after {} nodes ({} pruned, {} improvements)",
            best.status,
            best.value,
            stats.explored,
            stats.pruned,
            stats.improvements
        );
        Ok(best)
    }

    /// Objective with every unfinished driver arriving as early as free-flow
    /// travel from its current position allows.
    fn lower_bound(
        &self,
        sim: &EventSimulator<'_, FixedRoutes>,
        to_end: &FxHashMap<NodeId, Vec<Option<f64>>>,
    ) -> Time {
        let now = sim.now();
        let mut bounds = Vec::with_capacity(self.demand.len());
        for (id, driver) in self.demand.iter() {
            let remaining = |node: NodeId| {
                to_end
                    .get(&driver.end)
                    .and_then(|d| d[node.index()])
                    .unwrap_or(Time::INFINITY)
            };
            let exit = match sim.state().log(id).and_then(|l| l.last()) {
                Some((Step::Exit(_), t)) => *t,
                Some((Step::Edge(edge), entry)) => {
                    let graph = self.graph;
                    let free = graph.minimum_travel_time(*edge).unwrap_or(0.0);
                    let head = graph.target(*edge).unwrap_or(driver.end);
                    (entry + free).max(now) + remaining(head)
                }
                None => driver.departure.max(now) + remaining(driver.start),
            };
            bounds.push((driver.departure, exit));
        }
        self.config.objective.reduce(bounds)
    }
}

/// Distinct next moves for `driver` that keep it on one of its candidate
/// paths, in candidate order.  `None` means exit.
fn next_moves(sim: &EventSimulator<'_, FixedRoutes>, driver: DriverId, paths: &[Vec<EdgeId>]) -> Vec<Option<EdgeId>> {
    let taken = sim.state().edges_taken(driver);
    let mut out = Vec::new();
    for path in paths {
        if !path.starts_with(&taken) {
            continue;
        }
        let choice = path.get(taken.len()).copied();
        if !out.contains(&choice) {
            out.push(choice);
        }
    }
    out
}
