//! Path search: shortest paths, bounded enumeration, and traffic-aware
//! routing.
//!
//! # Pluggability
//!
//! Static searches are parameterised by an [`EdgeWeight`]: anything that
//! turns an edge into a non-negative cost, optionally hiding some edges via
//! `selectable`.  Closures `Fn(&Graph, EdgeId) -> f64` implement it directly.
//!
//! The assignment heuristics call routing through the [`Router`] trait, so a
//! caller can swap the default [`TrafficRouter`] for its own strategy without
//! touching them.
//!
//! # Determinism
//!
//! Searches keep predecessor links rather than whole node sequences.  When two
//! routes reach a node at the same cost, the predecessor whose route is
//! lexicographically smaller wins, so ties always resolve to the same path.

use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;
use std::collections::hash_map::Entry;
use std::time::Duration;

use ordered_float::OrderedFloat;
use rustc_hash::FxHashMap;
use ta_core::{Budget, Driver, EdgeId, EngineConfig, NodeId, Status, Time};

use crate::{Graph, GraphError, GraphResult, Path, Route, TimedRoute, TrafficHistory};

// ── Edge weights ──────────────────────────────────────────────────────────────

/// Cost of traversing an edge during a static search.
pub trait EdgeWeight {
    fn weight(&self, graph: &Graph, edge: EdgeId) -> f64;

    /// `false` hides the edge from the search.
    fn selectable(&self, _graph: &Graph, _edge: EdgeId) -> bool {
        true
    }
}

impl<F> EdgeWeight for F
where
    F: Fn(&Graph, EdgeId) -> f64,
{
    fn weight(&self, graph: &Graph, edge: EdgeId) -> f64 {
        self(graph, edge)
    }
}

/// Minimum travel time, `f(0)`.
#[derive(Copy, Clone, Debug, Default)]
pub struct FreeFlow;

impl EdgeWeight for FreeFlow {
    fn weight(&self, graph: &Graph, edge: EdgeId) -> f64 {
        graph[edge].congestion.minimum_travel_time()
    }
}

/// Edge length.
#[derive(Copy, Clone, Debug, Default)]
pub struct Distance;

impl EdgeWeight for Distance {
    fn weight(&self, graph: &Graph, edge: EdgeId) -> f64 {
        graph[edge].distance
    }
}

/// One per edge.
#[derive(Copy, Clone, Debug, Default)]
pub struct HopCount;

impl EdgeWeight for HopCount {
    fn weight(&self, _graph: &Graph, _edge: EdgeId) -> f64 {
        1.0
    }
}

/// Restrict another weight to the edges accepted by `predicate`.
#[derive(Clone, Debug)]
pub struct Filtered<W, P> {
    pub weight:    W,
    pub predicate: P,
}

impl<W, P> Filtered<W, P> {
    pub fn new(weight: W, predicate: P) -> Self {
        Self { weight, predicate }
    }
}

impl<W, P> EdgeWeight for Filtered<W, P>
where
    W: EdgeWeight,
    P: Fn(&Graph, EdgeId) -> bool,
{
    fn weight(&self, graph: &Graph, edge: EdgeId) -> f64 {
        self.weight.weight(graph, edge)
    }

    fn selectable(&self, graph: &Graph, edge: EdgeId) -> bool {
        (self.predicate)(graph, edge) && self.weight.selectable(graph, edge)
    }
}

#[inline]
pub(crate) fn checked_weight<W: EdgeWeight + ?Sized>(weight: &W, graph: &Graph, edge: EdgeId) -> GraphResult<f64> {
    let w = weight.weight(graph, edge);
    if w.is_finite() && w >= 0.0 {
        Ok(w)
    } else {
        Err(GraphError::InvalidWeight { edge, weight: w })
    }
}

// ── Enumeration ───────────────────────────────────────────────────────────────

/// Result of [`PathFinder::enumerate_paths`].
#[derive(Clone, Debug)]
pub struct Enumeration {
    /// Accepted routes sorted by (cost, node sequence).
    pub routes:  Vec<Route>,
    /// Optimal cost from start to end.
    pub optimum: f64,
    /// `Timeout` if the budget ran out; `routes` then holds what was found.
    pub status:  Status,
}

impl Enumeration {
    pub fn paths(&self) -> impl Iterator<Item = &Path> + '_ {
        self.routes.iter().map(|r| &r.path)
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    pub fn is_complete(&self) -> bool {
        self.status.is_success()
    }
}

// ── PathFinder ────────────────────────────────────────────────────────────────

/// Search front-end bound to one graph.
///
/// The graph is borrowed immutably for the finder's lifetime.  Enumeration
/// respects the wall-clock limit the finder was built with.
#[derive(Clone, Debug)]
pub struct PathFinder<'g> {
    graph:          &'g Graph,
    time_budget:    Option<Duration>,
    check_interval: u64,
}

impl<'g> PathFinder<'g> {
    /// Finder with no time limit.
    pub fn new(graph: &'g Graph) -> Self {
        Self { graph, time_budget: None, check_interval: 1 }
    }

    /// Finder using the budget settings of `config`.
    pub fn from_config(graph: &'g Graph, config: &EngineConfig) -> Self {
        Self {
            graph,
            time_budget:    config.time_budget,
            check_interval: config.check_interval,
        }
    }

    pub fn with_budget(mut self, limit: Option<Duration>, check_interval: u64) -> Self {
        self.time_budget = limit;
        self.check_interval = check_interval;
        self
    }

    pub fn graph(&self) -> &'g Graph {
        self.graph
    }

    fn budget(&self) -> Budget {
        Budget::new(self.time_budget, self.check_interval)
    }

    fn require_node(&self, node: NodeId) -> GraphResult<()> {
        if self.graph.contains_node(node) {
            Ok(())
        } else {
            Err(GraphError::MissingNode(node))
        }
    }

    // ── Static searches ───────────────────────────────────────────────────

    /// Minimum-weight path from `start` to `end`.
    ///
    /// # Errors
    /// [`GraphError::NoPath`] if `end` is unreachable through selectable
    /// edges; [`GraphError::InvalidWeight`] for a negative or non-finite
    /// weight.
    pub fn shortest_path<W>(&self, start: NodeId, end: NodeId, weight: &W) -> GraphResult<Route>
    where
        W: EdgeWeight + ?Sized,
    {
        self.require_node(start)?;
        self.require_node(end)?;
        if start == end {
            return Ok(Route { path: Path::trivial(start), cost: 0.0 });
        }

        let graph = self.graph;
        let n = graph.node_bound();
        let mut best    = vec![f64::INFINITY; n];
        let mut prev    = vec![None; n];
        let mut settled = vec![false; n];
        best[start.index()] = 0.0;

        let mut heap: BinaryHeap<Reverse<(OrderedFloat<f64>, NodeId)>> = BinaryHeap::new();
        heap.push(Reverse((OrderedFloat(0.0), start)));

        while let Some(Reverse((OrderedFloat(cost), node))) = heap.pop() {
            if settled[node.index()] || cost > best[node.index()] {
                continue;
            }
            settled[node.index()] = true;
            if node == end {
                log::trace!("shortest path {start}→{end} settled at cost {cost}");
                let path = Path::from_nodes_unchecked(trail(&prev, end));
                return Ok(Route { path, cost });
            }

            for edge in graph.out_edges(node) {
                if !weight.selectable(graph, edge) {
                    continue;
                }
                let next = graph[edge].target;
                if settled[next.index()] {
                    continue;
                }
                let new_cost = cost + checked_weight(weight, graph, edge)?;
                if new_cost < best[next.index()] {
                    best[next.index()] = new_cost;
                    prev[next.index()] = Some(node);
                    heap.push(Reverse((OrderedFloat(new_cost), next)));
                } else if new_cost == best[next.index()]
                    && prev[next.index()].is_some_and(|other| precedes(trail(&prev, node), trail(&prev, other), next))
                {
                    prev[next.index()] = Some(node);
                }
            }
        }

        Err(GraphError::NoPath { from: start, to: end })
    }

    /// Minimum weight from `source` to every node (`None` = unreachable).
    /// Indexed by `NodeId::index`.
    pub fn distances_from<W>(&self, source: NodeId, weight: &W) -> GraphResult<Vec<Option<f64>>>
    where
        W: EdgeWeight + ?Sized,
    {
        self.one_to_all(source, weight, Direction::Forward)
    }

    /// Minimum weight from every node to `target`.
    pub fn distances_to<W>(&self, target: NodeId, weight: &W) -> GraphResult<Vec<Option<f64>>>
    where
        W: EdgeWeight + ?Sized,
    {
        self.one_to_all(target, weight, Direction::Backward)
    }

    fn one_to_all<W>(&self, root: NodeId, weight: &W, dir: Direction) -> GraphResult<Vec<Option<f64>>>
    where
        W: EdgeWeight + ?Sized,
    {
        self.require_node(root)?;
        let graph = self.graph;
        let mut dist: Vec<Option<f64>> = vec![None; graph.node_bound()];
        dist[root.index()] = Some(0.0);

        let mut heap: BinaryHeap<Reverse<(OrderedFloat<f64>, NodeId)>> = BinaryHeap::new();
        heap.push(Reverse((OrderedFloat(0.0), root)));

        while let Some(Reverse((OrderedFloat(cost), node))) = heap.pop() {
            // Stale entry.
            if dist[node.index()].is_some_and(|d| cost > d) {
                continue;
            }
            let edges = match dir {
                Direction::Forward  => graph[node].out_edges(),
                Direction::Backward => graph[node].in_edges(),
            };
            for &edge in edges {
                if !weight.selectable(graph, edge) {
                    continue;
                }
                let next = match dir {
                    Direction::Forward  => graph[edge].target,
                    Direction::Backward => graph[edge].source,
                };
                let new_cost = cost + checked_weight(weight, graph, edge)?;
                if dist[next.index()].is_none_or(|d| new_cost < d) {
                    dist[next.index()] = Some(new_cost);
                    heap.push(Reverse((OrderedFloat(new_cost), next)));
                }
            }
        }
        Ok(dist)
    }

    /// Every simple path from `start` to `end` whose weight is at most the
    /// optimum plus `slack`.
    ///
    /// Runs under the finder's own time budget; see
    /// [`enumerate_paths_with_budget`](Self::enumerate_paths_with_budget).
    pub fn enumerate_paths<W>(
        &self,
        start:  NodeId,
        end:    NodeId,
        slack:  f64,
        weight: &W,
    ) -> GraphResult<Enumeration>
    where
        W: EdgeWeight + ?Sized,
    {
        let mut budget = self.budget();
        self.enumerate_paths_with_budget(start, end, slack, weight, &mut budget)
    }

    /// As [`enumerate_paths`](Self::enumerate_paths), ticking a caller-owned
    /// budget once per expansion.
    ///
    /// # Errors
    /// [`GraphError::NoPath`] if `end` is unreachable.
    pub fn enumerate_paths_with_budget<W>(
        &self,
        start:  NodeId,
        end:    NodeId,
        slack:  f64,
        weight: &W,
        budget: &mut Budget,
    ) -> GraphResult<Enumeration>
    where
        W: EdgeWeight + ?Sized,
    {
        self.require_node(start)?;
        let to_end = self.distances_to(end, weight)?;
        let Some(optimum) = to_end[start.index()] else {
            return Err(GraphError::NoPath { from: start, to: end });
        };

        let slack = if slack.is_nan() { 0.0 } else { slack.max(0.0) };
        let limit = optimum + slack;
        let walk = SimplePathWalk {
            graph: self.graph,
            weight,
            to_end: &to_end,
            end,
            bound: limit + 1e-9 * limit.abs().max(1.0),
        };
        let (mut routes, timed_out) = walk.run(start, budget)?;
        routes.sort_by(|a, b| {
            OrderedFloat(a.cost)
                .cmp(&OrderedFloat(b.cost))
                .then_with(|| a.path.cmp(&b.path))
        });

        let status = if timed_out { Status::Timeout } else { Status::Success };
        if timed_out {
            log::warn!(
                "path enumeration {start}→{end} timed out with {} routes found",
                routes.len()
            );
        } else {
            log::debug!(
                "enumerated {} routes {start}→{end} within {slack} of {optimum}",
                routes.len()
            );
        }
        Ok(Enumeration { routes, optimum, status })
    }

    // ── Traffic-aware searches ────────────────────────────────────────────

    /// Replay `path` from `departure`, charging each edge the travel time for
    /// the occupancy `history` reports at the moment of entry.
    pub fn evaluate_with_traffic(
        &self,
        path:      &Path,
        departure: Time,
        history:   &TrafficHistory,
    ) -> GraphResult<TimedRoute> {
        let mut times = Vec::with_capacity(path.len() + 1);
        let mut now = departure;
        times.push(now);
        for edge in path.edges(self.graph)? {
            now += self.graph.travel_time(edge, history.occupancy_at(edge, now))?;
            times.push(now);
        }
        Ok(TimedRoute { path: path.clone(), times })
    }

    /// Earliest-arrival path from `start` to `end` leaving at `departure`,
    /// with edge travel times read off `history`.
    ///
    /// With `slack = None` this is a time-dependent label-setting search over
    /// the whole graph.  Its states are `(node, arrival)` pairs, not nodes: a
    /// later arrival at a node may meet a cleared edge and finish sooner, so
    /// reaching a node first settles nothing.  States are popped in arrival
    /// order and the first destination state popped is optimal.  The result
    /// may revisit a node when a loop lets congestion ahead clear.  If the
    /// finder's budget runs out first, the search falls back to expanding
    /// each node once, at its earliest arrival.
    ///
    /// With `Some(s)` only the free-flow alternatives within `s` of the
    /// free-flow optimum are considered, each replayed through
    /// [`evaluate_with_traffic`](Self::evaluate_with_traffic).
    pub fn shortest_path_with_traffic(
        &self,
        start:     NodeId,
        end:       NodeId,
        departure: Time,
        history:   &TrafficHistory,
        slack:     Option<f64>,
    ) -> GraphResult<TimedRoute> {
        match slack {
            None => self.time_dependent_search(start, end, departure, history),
            Some(slack) => self.best_alternative(start, end, departure, history, slack),
        }
    }

    fn time_dependent_search(
        &self,
        start:     NodeId,
        end:       NodeId,
        departure: Time,
        history:   &TrafficHistory,
    ) -> GraphResult<TimedRoute> {
        self.require_node(start)?;
        self.require_node(end)?;
        if start == end {
            return Ok(TimedRoute { path: Path::trivial(start), times: vec![departure] });
        }

        if self.distances_to(end, &FreeFlow)?[start.index()].is_none() {
            return Err(GraphError::NoPath { from: start, to: end });
        }

        let graph = self.graph;
        let mut states = vec![State { node: start, arrival: departure, prev: None }];
        let mut index: FxHashMap<(NodeId, OrderedFloat<Time>), usize> = FxHashMap::default();
        index.insert((start, OrderedFloat(departure)), 0);
        let mut expanded = vec![false; graph.node_bound()];
        let mut heap: BinaryHeap<Reverse<(OrderedFloat<Time>, usize)>> = BinaryHeap::new();
        heap.push(Reverse((OrderedFloat(departure), 0)));

        let mut budget = self.budget();
        let mut settle_nodes = false;
        let mut reached: Option<usize> = None;

        while let Some(Reverse((OrderedFloat(now), id))) = heap.pop() {
            // States arriving together with the destination may still offer
            // it a lexicographically smaller predecessor.
            if reached.is_some_and(|goal| now > states[goal].arrival) {
                break;
            }
            let node = states[id].node;
            if node == end {
                reached.get_or_insert(id);
                continue;
            }
            if !settle_nodes && budget.tick() {
                log::warn!("traffic search {start}→{end} out of budget; settling nodes at first arrival");
                settle_nodes = true;
            }
            if settle_nodes && expanded[node.index()] {
                continue;
            }
            expanded[node.index()] = true;

            for edge in graph.out_edges(node) {
                let next = graph[edge].target;
                let arrival = now + graph.travel_time(edge, history.occupancy_at(edge, now))?;
                match index.entry((next, OrderedFloat(arrival))) {
                    Entry::Vacant(slot) => {
                        slot.insert(states.len());
                        heap.push(Reverse((OrderedFloat(arrival), states.len())));
                        states.push(State { node: next, arrival, prev: Some(id) });
                    }
                    Entry::Occupied(slot) => {
                        let other = *slot.get();
                        let chain = state_chain(&states, id);
                        if chain.contains(&other) {
                            continue;
                        }
                        let better = states[other].prev.is_some_and(|current| {
                            let incumbent = state_nodes(&states, &state_chain(&states, current));
                            precedes(state_nodes(&states, &chain), incumbent, next)
                        });
                        if better {
                            states[other].prev = Some(id);
                        }
                    }
                }
            }
        }

        let Some(goal) = reached else {
            return Err(GraphError::NoPath { from: start, to: end });
        };
        log::trace!(
            "traffic search {start}→{end} arrives at {} after {} states",
            states[goal].arrival,
            states.len()
        );
        let chain = state_chain(&states, goal);
        Ok(TimedRoute {
            path:  Path::from_nodes_unchecked(state_nodes(&states, &chain)),
            times: chain.iter().map(|&i| states[i].arrival).collect(),
        })
    }

    fn best_alternative(
        &self,
        start:     NodeId,
        end:       NodeId,
        departure: Time,
        history:   &TrafficHistory,
        slack:     f64,
    ) -> GraphResult<TimedRoute> {
        let alternatives = self.enumerate_paths(start, end, slack, &FreeFlow)?;
        let mut best: Option<TimedRoute> = None;
        for path in alternatives.paths() {
            let timed = self.evaluate_with_traffic(path, departure, history)?;
            let better = match &best {
                None => true,
                Some(b) => {
                    OrderedFloat(timed.arrival())
                        .cmp(&OrderedFloat(b.arrival()))
                        .then_with(|| timed.path.cmp(&b.path))
                        == Ordering::Less
                }
            };
            if better {
                best = Some(timed);
            }
        }
        best.ok_or(GraphError::NoPath { from: start, to: end })
    }
}

#[derive(Copy, Clone)]
enum Direction {
    Forward,
    Backward,
}

// ── Enumeration internals ─────────────────────────────────────────────────────

/// Depth-first walk over simple paths, pruned by `cost + to_end > bound`.
struct SimplePathWalk<'a, W: ?Sized> {
    graph:  &'a Graph,
    weight: &'a W,
    to_end: &'a [Option<f64>],
    end:    NodeId,
    bound:  f64,
}

/// A node on the current path and the index of its next out-edge to try.
struct Frame<'a> {
    node:   NodeId,
    cost:   f64,
    edges:  &'a [EdgeId],
    cursor: usize,
}

impl<'a, W: EdgeWeight + ?Sized> SimplePathWalk<'a, W> {
    fn frame(&self, node: NodeId, cost: f64) -> Frame<'a> {
        let edges = self.graph.node(node).map_or(&[][..], |n| n.out_edges());
        Frame { node, cost, edges, cursor: 0 }
    }

    /// Every accepted route, and whether the budget ran out first.
    fn run(&self, start: NodeId, budget: &mut Budget) -> GraphResult<(Vec<Route>, bool)> {
        let graph = self.graph;
        let mut routes = Vec::new();
        let mut on_path = vec![false; graph.node_bound()];
        on_path[start.index()] = true;

        if budget.tick() {
            return Ok((routes, true));
        }
        if start == self.end {
            routes.push(Route { path: Path::trivial(start), cost: 0.0 });
            return Ok((routes, false));
        }
        let mut stack = vec![self.frame(start, 0.0)];

        while let Some(top) = stack.last_mut() {
            let Some(&edge) = top.edges.get(top.cursor) else {
                on_path[top.node.index()] = false;
                stack.pop();
                continue;
            };
            top.cursor += 1;
            let cost = top.cost;

            if !self.weight.selectable(graph, edge) {
                continue;
            }
            let next = graph[edge].target;
            if on_path[next.index()] {
                continue;
            }
            let Some(rest) = self.to_end[next.index()] else {
                continue;
            };
            let new_cost = cost + checked_weight(self.weight, graph, edge)?;
            if new_cost + rest > self.bound {
                continue;
            }

            if budget.tick() {
                return Ok((routes, true));
            }
            if next == self.end {
                let mut nodes: Vec<NodeId> = stack.iter().map(|f| f.node).collect();
                nodes.push(next);
                routes.push(Route { path: Path::from_nodes_unchecked(nodes), cost: new_cost });
                continue;
            }
            on_path[next.index()] = true;
            stack.push(self.frame(next, new_cost));
        }
        Ok((routes, false))
    }
}

// ── Predecessor trails ────────────────────────────────────────────────────────

/// Node sequence from the search root to `node` along `prev`.
fn trail(prev: &[Option<NodeId>], node: NodeId) -> Vec<NodeId> {
    let mut nodes = vec![node];
    let mut at = node;
    while let Some(p) = prev[at.index()] {
        nodes.push(p);
        at = p;
    }
    nodes.reverse();
    nodes
}

/// `a` then `tail` sorts before `b` then `tail`.
fn precedes(mut a: Vec<NodeId>, mut b: Vec<NodeId>, tail: NodeId) -> bool {
    a.push(tail);
    b.push(tail);
    a < b
}

/// One `(node, arrival)` state of the time-dependent search.
struct State {
    node:    NodeId,
    arrival: Time,
    prev:    Option<usize>,
}

/// State indices from the root to `id`.
fn state_chain(states: &[State], id: usize) -> Vec<usize> {
    let mut chain = vec![id];
    let mut at = id;
    while let Some(p) = states[at].prev {
        chain.push(p);
        at = p;
    }
    chain.reverse();
    chain
}

fn state_nodes(states: &[State], chain: &[usize]) -> Vec<NodeId> {
    chain.iter().map(|&i| states[i].node).collect()
}

// ── Router trait ──────────────────────────────────────────────────────────────

/// Pluggable per-driver routing used by the assignment heuristics.
///
/// Implementations must be `Send + Sync` so one router can be shared by
/// searches running on different threads.
pub trait Router: Send + Sync {
    /// Route `driver` given the traffic already committed in `history`.
    fn route(
        &self,
        finder:  &PathFinder<'_>,
        driver:  &Driver,
        history: &TrafficHistory,
    ) -> GraphResult<TimedRoute>;
}

/// Earliest arrival against the recorded traffic.
///
/// `slack = None` searches the whole graph; `Some(s)` restricts the choice to
/// free-flow alternatives within `s` of the free-flow optimum.
#[derive(Copy, Clone, Debug, Default)]
pub struct TrafficRouter {
    pub slack: Option<f64>,
}

impl TrafficRouter {
    pub fn new(slack: Option<f64>) -> Self {
        Self { slack }
    }
}

impl Router for TrafficRouter {
    fn route(
        &self,
        finder:  &PathFinder<'_>,
        driver:  &Driver,
        history: &TrafficHistory,
    ) -> GraphResult<TimedRoute> {
        finder.shortest_path_with_traffic(
            driver.start,
            driver.end,
            driver.departure,
            history,
            self.slack,
        )
    }
}
