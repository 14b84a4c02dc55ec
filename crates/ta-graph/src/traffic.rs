//! Recorded edge presence, queryable as occupancy over time.
//!
//! A presence record `(edge, entry, exit)` says one driver was on `edge` from
//! `entry` until `exit`.  Occupancy at `t` counts the records with
//! `entry < t < exit`: a driver entering exactly at `t` does not see itself,
//! and one leaving exactly at `t` has already gone.

use std::collections::BTreeMap;

use ordered_float::OrderedFloat;
use ta_core::{EdgeId, Time};

use crate::{EdgeMap, Graph, GraphResult, TimedRoute};

type Counts = BTreeMap<OrderedFloat<Time>, u32>;

/// Per-edge time → count tables of entries and exits.
#[derive(Clone, Debug, Default)]
pub struct TrafficHistory {
    entries: EdgeMap<Counts>,
    exits:   EdgeMap<Counts>,
    records: usize,
}

impl TrafficHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one presence record.  Records with `exit <= entry` occupy the edge
    /// for no open instant and are ignored.
    pub fn record(&mut self, edge: EdgeId, entry: Time, exit: Time) {
        if exit <= entry {
            return;
        }
        *self
            .entries
            .get_or_insert(edge, Counts::new())
            .entry(OrderedFloat(entry))
            .or_insert(0) += 1;
        *self
            .exits
            .get_or_insert(edge, Counts::new())
            .entry(OrderedFloat(exit))
            .or_insert(0) += 1;
        self.records += 1;
    }

    /// Fold every edge traversal of a realised route into the history.
    pub fn record_route(&mut self, graph: &Graph, route: &TimedRoute) -> GraphResult<()> {
        for (edge, entry, exit) in route.edge_times(graph)? {
            self.record(edge, entry, exit);
        }
        Ok(())
    }

    /// Drivers on `edge` at `t`, excluding any that enter or leave at `t`.
    pub fn occupancy_at(&self, edge: EdgeId, t: Time) -> u32 {
        let entered: u32 = self
            .entries
            .get(edge)
            .map_or(0, |c| c.range(..OrderedFloat(t)).map(|(_, n)| n).sum());
        if entered == 0 {
            return 0;
        }
        let left: u32 = self
            .exits
            .get(edge)
            .map_or(0, |c| c.range(..=OrderedFloat(t)).map(|(_, n)| n).sum());
        entered.saturating_sub(left)
    }

    /// Highest occupancy `edge` ever reaches, and the first time it does.
    pub fn peak(&self, edge: EdgeId) -> Option<(Time, u32)> {
        let entries = self.entries.get(edge)?;
        entries
            .keys()
            .map(|t| {
                // Just after the entry instant.
                let probe = t.0 + f64::EPSILON * t.0.abs().max(1.0);
                (t.0, self.occupancy_at(edge, probe))
            })
            .fold(None, |best: Option<(Time, u32)>, (t, n)| match best {
                Some((_, m)) if m >= n => best,
                _ => Some((t, n)),
            })
    }

    /// Edges with at least one record, ascending.
    pub fn edges(&self) -> impl Iterator<Item = EdgeId> + '_ {
        self.entries.iter().map(|(e, _)| e)
    }

    /// Number of presence records.
    pub fn len(&self) -> usize {
        self.records
    }

    pub fn is_empty(&self) -> bool {
        self.records == 0
    }
}
