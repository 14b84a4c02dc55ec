//! `DriverIntervalStore`: per (driver, edge) interval state.
//!
//! # State machine
//!
//! ```text
//! Unknown ──set_*──▶ Reachable { safety?, presence? } ──mark_unreachable──▶ Unreachable
//!    └─────────────────────mark_unreachable─────────────────────────────────────┘
//! ```
//!
//! `Unreachable` is absorbing: it drops any stored interval, and later
//! `set_*` calls are accepted but change nothing.
//!
//! # Validation
//!
//! Bounds go through [`RawInterval::validate`]: they must be finite integers
//! with `lower <= upper`, and are then clipped into `[0, horizon]`.  Invalid
//! bounds are rejected before anything is stored.

use std::collections::{BTreeSet, VecDeque};

use rustc_hash::FxHashMap;
use ta_core::{Demand, Driver, DriverId, EdgeId, EngineConfig, Interval, RawInterval};
use ta_graph::{Graph, GraphError};

use crate::{ConflictGraph, IntervalError, IntervalResult};

/// Observable state of one (driver, edge) pair.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum EdgeStatus {
    Unknown,
    Reachable,
    Unreachable,
}

#[derive(Copy, Clone, Debug)]
enum Entry {
    Reachable {
        safety:   Option<Interval>,
        presence: Option<Interval>,
    },
    Unreachable,
}

#[derive(Copy, Clone)]
enum Kind {
    Safety,
    Presence,
}

/// Interval store for one (graph, demand) instance.
///
/// Borrows both for its lifetime; build it once per instance and query it as
/// often as needed.
#[derive(Clone, Debug)]
pub struct DriverIntervalStore<'a> {
    graph:   &'a Graph,
    demand:  &'a Demand,
    horizon: u64,
    entries: FxHashMap<(DriverId, EdgeId), Entry>,
}

impl<'a> DriverIntervalStore<'a> {
    pub fn new(graph: &'a Graph, demand: &'a Demand, config: &EngineConfig) -> Self {
        Self {
            graph,
            demand,
            horizon: config.horizon,
            entries: FxHashMap::default(),
        }
    }

    pub fn graph(&self) -> &'a Graph {
        self.graph
    }

    pub fn demand(&self) -> &'a Demand {
        self.demand
    }

    pub fn horizon(&self) -> u64 {
        self.horizon
    }

    /// The full window `[0, horizon]`.
    pub fn full_window(&self) -> Interval {
        Interval::new(0, self.horizon)
    }

    fn driver(&self, driver: DriverId) -> IntervalResult<&'a Driver> {
        self.demand.get(driver).ok_or(IntervalError::UnknownDriver(driver))
    }

    fn check_pair(&self, driver: DriverId, edge: EdgeId) -> IntervalResult<()> {
        self.driver(driver)?;
        if !self.graph.contains_edge(edge) {
            return Err(GraphError::MissingEdge(edge).into());
        }
        Ok(())
    }

    // ── Mutation ──────────────────────────────────────────────────────────

    /// Set the outer bound for `driver` on `edge`.
    ///
    /// # Errors
    /// [`IntervalError::InvalidInterval`] for malformed bounds,
    /// [`IntervalError::UnknownDriver`] / `Graph(MissingEdge)` for unknown
    /// keys.
    pub fn set_safety_interval(
        &mut self,
        driver:   DriverId,
        edge:     EdgeId,
        interval: impl Into<RawInterval>,
    ) -> IntervalResult<()> {
        self.set(driver, edge, interval.into(), Kind::Safety)
    }

    /// Set the inner bound for `driver` on `edge`.
    pub fn set_presence_interval(
        &mut self,
        driver:   DriverId,
        edge:     EdgeId,
        interval: impl Into<RawInterval>,
    ) -> IntervalResult<()> {
        self.set(driver, edge, interval.into(), Kind::Presence)
    }

    fn set(&mut self, driver: DriverId, edge: EdgeId, raw: RawInterval, kind: Kind) -> IntervalResult<()> {
        self.check_pair(driver, edge)?;
        let interval = raw
            .validate(self.horizon)
            .map_err(|source| IntervalError::InvalidInterval { driver, edge, source })?;

        let entry = self
            .entries
            .entry((driver, edge))
            .or_insert(Entry::Reachable { safety: None, presence: None });
        match entry {
            Entry::Unreachable => {
                log::debug!("ignoring interval {interval} for {driver} on unreachable {edge}");
            }
            Entry::Reachable { safety, presence } => match kind {
                Kind::Safety   => *safety = Some(interval),
                Kind::Presence => *presence = Some(interval),
            },
        }
        Ok(())
    }

    /// Exclude `edge` for `driver` permanently.
    pub fn mark_unreachable(&mut self, driver: DriverId, edge: EdgeId) -> IntervalResult<()> {
        self.check_pair(driver, edge)?;
        if self.entries.insert((driver, edge), Entry::Unreachable).is_none() {
            log::trace!("{edge} unreachable for {driver}");
        }
        Ok(())
    }

    // ── Queries ───────────────────────────────────────────────────────────

    pub fn status(&self, driver: DriverId, edge: EdgeId) -> EdgeStatus {
        match self.entries.get(&(driver, edge)) {
            None => EdgeStatus::Unknown,
            Some(Entry::Reachable { .. }) => EdgeStatus::Reachable,
            Some(Entry::Unreachable) => EdgeStatus::Unreachable,
        }
    }

    pub fn is_unreachable(&self, driver: DriverId, edge: EdgeId) -> bool {
        matches!(self.entries.get(&(driver, edge)), Some(Entry::Unreachable))
    }

    pub fn safety_interval(&self, driver: DriverId, edge: EdgeId) -> Option<Interval> {
        match self.entries.get(&(driver, edge)) {
            Some(Entry::Reachable { safety, .. }) => *safety,
            _ => None,
        }
    }

    pub fn presence_interval(&self, driver: DriverId, edge: EdgeId) -> Option<Interval> {
        match self.entries.get(&(driver, edge)) {
            Some(Entry::Reachable { presence, .. }) => *presence,
            _ => None,
        }
    }

    /// The stored safety interval, or `default` when none is stored.
    pub fn safety_interval_or(&self, driver: DriverId, edge: EdgeId, default: Interval) -> Interval {
        self.safety_interval(driver, edge).unwrap_or(default)
    }

    /// Number of (driver, edge) pairs with any state.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Every stored interval as `(driver, edge, safety, presence)`, sorted by
    /// driver then edge.
    pub fn intervals(&self) -> Vec<(DriverId, EdgeId, Option<Interval>, Option<Interval>)> {
        let mut out: Vec<_> = self
            .entries
            .iter()
            .filter_map(|(&(d, e), entry)| match entry {
                Entry::Reachable { safety, presence } => Some((d, e, *safety, *presence)),
                Entry::Unreachable => None,
            })
            .collect();
        out.sort_by_key(|&(d, e, _, _)| (d, e));
        out
    }

    // ── Reachability ──────────────────────────────────────────────────────

    /// Edges `driver` may use, found by breadth-first propagation from the
    /// outgoing edges of its start node.
    ///
    /// An edge is kept if it is not unreachable and its safety interval is
    /// time-connected to that of some kept edge entering its source.  A
    /// missing safety interval counts as the full window.  Propagation stops
    /// at the driver's destination.
    pub fn get_possible_edges_for_driver(&self, driver: DriverId) -> IntervalResult<BTreeSet<EdgeId>> {
        let d = self.driver(driver)?;
        let mut kept = BTreeSet::new();
        if d.is_trivial() {
            return Ok(kept);
        }

        let full = self.full_window();
        let mut queue: VecDeque<EdgeId> = VecDeque::new();
        for edge in self.graph.out_edges(d.start) {
            if !self.is_unreachable(driver, edge) && kept.insert(edge) {
                queue.push_back(edge);
            }
        }

        while let Some(edge) = queue.pop_front() {
            let target = self.graph[edge].target;
            if target == d.end {
                continue;
            }
            let window = self.safety_interval_or(driver, edge, full);
            for next in self.graph.out_edges(target) {
                if kept.contains(&next) || self.is_unreachable(driver, next) {
                    continue;
                }
                let next_window = self.safety_interval_or(driver, next, full);
                if window.is_time_connected_to(&next_window) {
                    kept.insert(next);
                    queue.push_back(next);
                }
            }
        }
        Ok(kept)
    }

    /// `true` if some edge is possible for both drivers and their safety
    /// intervals on it overlap.
    pub fn are_drivers_dependent(&self, a: DriverId, b: DriverId) -> IntervalResult<bool> {
        let ea = self.get_possible_edges_for_driver(a)?;
        let eb = self.get_possible_edges_for_driver(b)?;
        Ok(self.shares_window(a, &ea, b, &eb))
    }

    /// Overlap test on precomputed reachable sets.
    pub(crate) fn shares_window(
        &self,
        a:  DriverId,
        ea: &BTreeSet<EdgeId>,
        b:  DriverId,
        eb: &BTreeSet<EdgeId>,
    ) -> bool {
        let full = self.full_window();
        ea.intersection(eb).any(|&edge| {
            let wa = self.safety_interval_or(a, edge, full);
            let wb = self.safety_interval_or(b, edge, full);
            wa.overlaps(&wb)
        })
    }

    /// `(edge, safety window)` for every possible edge of `driver`: the
    /// decision variables an external solver has to create.
    pub fn decision_windows(&self, driver: DriverId) -> IntervalResult<Vec<(EdgeId, Interval)>> {
        let full = self.full_window();
        Ok(self
            .get_possible_edges_for_driver(driver)?
            .into_iter()
            .map(|edge| (edge, self.safety_interval_or(driver, edge, full)))
            .collect())
    }

    /// Components of the driver-conflict graph.
    pub fn conflict_graph(&self) -> IntervalResult<ConflictGraph> {
        ConflictGraph::build(self)
    }
}
