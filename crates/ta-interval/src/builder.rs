//! Free-flow interval bounds for a whole demand.
//!
//! # Safety intervals
//!
//! For driver `d` and edge `e = (u, v)`, with `dist` the free-flow distance:
//!
//! ```text
//! lower = floor(departure + dist(start, u))     earliest entry
//! upper = ceil(horizon − dist(v, end))          latest exit
//! ```
//!
//! The edge is unreachable if `u` cannot be reached from the start, the end
//! cannot be reached from `v`, or `lower + f(0) > upper`.
//!
//! These raw bounds are not monotone along a walk: a detour edge leading away
//! from the destination has an earlier latest exit than the edge entering
//! it.  Reachability propagation needs each edge's window to be
//! time-connected to its successor's, so the bounds of every surviving pair
//! `(e, s)` meeting at a node other than the destination are widened to a
//! fixpoint:
//!
//! ```text
//! upper(s) = max(upper(s), upper(e))
//! lower(e) = min(lower(e), lower(s))
//! ```
//!
//! Both only widen a window, so each stays a valid outer bound.
//!
//! # Presence intervals
//!
//! Only derived along the forced chain leaving the start: while the current
//! node has exactly one possible outgoing edge, the driver must take it.  The
//! entry window `[earliest, latest]` grows by `f(0)` and by the worst case
//! `f(min(flow_limit, |demand| − 1))` per edge; the driver is certainly on the
//! edge during `[ceil(latest), floor(earliest + f(0))]` when that is
//! non-empty.

use ta_core::time::{ceil_bound, ceil_inner, floor_bound, floor_inner};
use ta_core::{Demand, DriverId, EngineConfig, NodeId, Time};
use ta_graph::{FreeFlow, Graph, PathFinder};

use crate::{DriverIntervalStore, IntervalResult};

pub struct IntervalBuilder<'a> {
    graph:  &'a Graph,
    demand: &'a Demand,
    config: &'a EngineConfig,
}

impl<'a> IntervalBuilder<'a> {
    pub fn new(graph: &'a Graph, demand: &'a Demand, config: &'a EngineConfig) -> Self {
        Self { graph, demand, config }
    }

    /// Build a store with safety bounds for every (driver, live edge) pair and
    /// presence bounds along forced chains.
    pub fn build(&self) -> IntervalResult<DriverIntervalStore<'a>> {
        let mut store = DriverIntervalStore::new(self.graph, self.demand, self.config);
        for (id, _) in self.demand.iter() {
            self.bound_driver(&mut store, id)?;
        }
        log::debug!(
            "interval store built for {} drivers over {} edges ({} entries)",
            self.demand.len(),
            self.graph.edge_count(),
            store.len()
        );
        Ok(store)
    }

    fn bound_driver(&self, store: &mut DriverIntervalStore<'a>, id: DriverId) -> IntervalResult<()> {
        let driver = self.demand[id];
        let graph = self.graph;
        let finder = PathFinder::new(graph);
        let from_start = finder.distances_from(driver.start, &FreeFlow)?;
        let to_end = finder.distances_to(driver.end, &FreeFlow)?;
        let horizon = self.config.horizon_time();

        let mut bounds: Vec<Option<(i64, i64)>> = vec![None; graph.edge_bound()];
        for edge in graph.edge_ids() {
            let record = &graph[edge];
            let (Some(before), Some(after)) = (from_start[record.source.index()], to_end[record.target.index()]) else {
                store.mark_unreachable(id, edge)?;
                continue;
            };
            let lower = floor_bound(driver.departure + before).max(0);
            let upper = ceil_bound(horizon - after);
            let min_time = graph.travel_time(edge, 0)?;
            if upper < lower || lower as Time + min_time > upper as Time {
                store.mark_unreachable(id, edge)?;
                continue;
            }
            bounds[edge.index()] = Some((lower, upper));
        }

        let passes = widen_along_walks(graph, driver.end, &mut bounds);
        log::trace!("{id}: safety bounds settled after {passes} passes");

        for edge in graph.edge_ids() {
            if let Some(window) = bounds[edge.index()] {
                store.set_safety_interval(id, edge, window)?;
            }
        }

        if !driver.is_trivial() {
            self.bound_forced_chain(store, id)?;
        }
        Ok(())
    }

    fn bound_forced_chain(&self, store: &mut DriverIntervalStore<'a>, id: DriverId) -> IntervalResult<()> {
        let driver = self.demand[id];
        let graph = self.graph;
        let worst_occupancy = u32::try_from(self.demand.len().saturating_sub(1)).unwrap_or(u32::MAX);

        let mut node = driver.start;
        let mut earliest = driver.departure;
        let mut latest = driver.departure;
        let mut visited = vec![false; graph.node_bound()];

        while node != driver.end && !visited[node.index()] {
            visited[node.index()] = true;
            let mut open = graph.out_edges(node).filter(|&e| !store.is_unreachable(id, e));
            let (Some(edge), None) = (open.next(), open.next()) else {
                break;
            };

            let fastest = graph.travel_time(edge, 0)?;
            let slowest = graph.travel_time(edge, worst_occupancy.min(graph[edge].flow_limit))?;
            let (lo, hi) = (ceil_inner(latest), floor_inner(earliest + fastest));
            if 0 <= lo && lo <= hi && hi as u64 <= self.config.horizon {
                store.set_presence_interval(id, edge, (lo, hi))?;
            }

            earliest += fastest;
            latest += slowest;
            node = graph[edge].target;
        }
        Ok(())
    }
}

/// Widen `bounds` until every pair of surviving edges meeting at a node other
/// than `end` is time-connected.  Returns the number of passes.
///
/// Uppers only rise to another edge's upper and lowers only fall to another
/// edge's lower, so the set of values is fixed and the loop terminates.
fn widen_along_walks(graph: &Graph, end: NodeId, bounds: &mut [Option<(i64, i64)>]) -> usize {
    let mut passes = 0;
    loop {
        passes += 1;
        let mut changed = false;
        for edge in graph.edge_ids() {
            let target = graph[edge].target;
            if target == end {
                continue;
            }
            for next in graph.out_edges(target) {
                let (Some((lower, upper)), Some((next_lower, next_upper))) =
                    (bounds[edge.index()], bounds[next.index()])
                else {
                    continue;
                };
                if next_upper < upper {
                    bounds[next.index()] = Some((next_lower, upper));
                    changed = true;
                }
                if next_lower < lower {
                    bounds[edge.index()] = Some((next_lower, upper));
                    changed = true;
                }
            }
        }
        if !changed {
            return passes;
        }
    }
}
