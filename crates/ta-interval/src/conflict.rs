//! Driver-conflict graph.
//!
//! Two drivers are adjacent when they are dependent: some edge is possible
//! for both and their safety windows on it overlap.  Independent components
//! can be handed to the external solver separately.

use std::collections::BTreeSet;

use rustc_hash::FxHashMap;
use ta_core::{DriverId, EdgeId};

use crate::{DriverIntervalStore, IntervalResult};

/// Conflict edges and connected components, both in ascending order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ConflictGraph {
    /// Dependent pairs `(a, b)` with `a < b`.
    pub edges:      Vec<(DriverId, DriverId)>,
    /// Each component sorted; components sorted by their first driver.
    pub components: Vec<Vec<DriverId>>,
}

impl ConflictGraph {
    pub(crate) fn build(store: &DriverIntervalStore<'_>) -> IntervalResult<ConflictGraph> {
        let ids: Vec<DriverId> = store.demand().ids().collect();
        let reachable = reachable_sets(store, &ids)?;

        // Only drivers sharing an edge can conflict; bucket by edge first.
        let mut by_edge: FxHashMap<EdgeId, Vec<usize>> = FxHashMap::default();
        for (i, edges) in reachable.iter().enumerate() {
            for &edge in edges {
                by_edge.entry(edge).or_default().push(i);
            }
        }

        let mut pairs: BTreeSet<(usize, usize)> = BTreeSet::new();
        for drivers in by_edge.values() {
            for (k, &i) in drivers.iter().enumerate() {
                for &j in &drivers[k + 1..] {
                    let key = (i.min(j), i.max(j));
                    if pairs.contains(&key) {
                        continue;
                    }
                    if store.shares_window(ids[i], &reachable[i], ids[j], &reachable[j]) {
                        pairs.insert(key);
                    }
                }
            }
        }

        let mut sets = DisjointSets::new(ids.len());
        for &(i, j) in &pairs {
            sets.union(i, j);
        }
        let mut groups: FxHashMap<usize, Vec<DriverId>> = FxHashMap::default();
        for (i, &id) in ids.iter().enumerate() {
            groups.entry(sets.find(i)).or_default().push(id);
        }
        let mut components: Vec<Vec<DriverId>> = groups.into_values().collect();
        for c in &mut components {
            c.sort_unstable();
        }
        components.sort_unstable_by_key(|c| c[0]);

        log::debug!(
            "conflict graph: {} drivers, {} dependent pairs, {} components",
            ids.len(),
            pairs.len(),
            components.len()
        );
        Ok(ConflictGraph {
            edges: pairs.into_iter().map(|(i, j)| (ids[i], ids[j])).collect(),
            components,
        })
    }

    /// The component containing `driver`.
    pub fn component_of(&self, driver: DriverId) -> Option<&[DriverId]> {
        self.components
            .iter()
            .find(|c| c.binary_search(&driver).is_ok())
            .map(Vec::as_slice)
    }
}

#[cfg(not(feature = "parallel"))]
fn reachable_sets(
    store: &DriverIntervalStore<'_>,
    ids:   &[DriverId],
) -> IntervalResult<Vec<BTreeSet<EdgeId>>> {
    ids.iter().map(|&d| store.get_possible_edges_for_driver(d)).collect()
}

#[cfg(feature = "parallel")]
fn reachable_sets(
    store: &DriverIntervalStore<'_>,
    ids:   &[DriverId],
) -> IntervalResult<Vec<BTreeSet<EdgeId>>> {
    use rayon::prelude::*;
    ids.par_iter().map(|&d| store.get_possible_edges_for_driver(d)).collect()
}

// ── Union-find ────────────────────────────────────────────────────────────────

struct DisjointSets {
    parent: Vec<usize>,
}

impl DisjointSets {
    fn new(n: usize) -> Self {
        Self { parent: (0..n).collect() }
    }

    fn find(&mut self, mut x: usize) -> usize {
        while self.parent[x] != x {
            self.parent[x] = self.parent[self.parent[x]];
            x = self.parent[x];
        }
        x
    }

    fn union(&mut self, a: usize, b: usize) {
        let (ra, rb) = (self.find(a), self.find(b));
        if ra != rb {
            // Smaller root wins so roots are stable across runs.
            let (lo, hi) = (ra.min(rb), ra.max(rb));
            self.parent[hi] = lo;
        }
    }
}
