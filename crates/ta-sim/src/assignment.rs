//! Route assignments: one path per driver.

use ta_core::{Demand, Driver, DriverId, EdgeId, Time};
use ta_graph::{Graph, Path};

use crate::{SimError, SimResult};

/// `count` identical drivers following `path` from `departure`.
#[derive(Clone, Debug, PartialEq)]
pub struct Batch {
    pub path:      Path,
    pub departure: Time,
    pub count:     usize,
}

impl Batch {
    pub fn new(path: Path, departure: Time, count: usize) -> Self {
        Self { path, departure, count }
    }
}

/// A path per driver, indexed by `DriverId`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Assignment {
    paths: Vec<Path>,
}

impl Assignment {
    pub fn new(paths: Vec<Path>) -> Self {
        Self { paths }
    }

    /// Expand batches into individual drivers and their paths, preserving
    /// batch order.
    pub fn from_batches<I>(batches: I) -> (Demand, Assignment)
    where
        I: IntoIterator<Item = Batch>,
    {
        let mut demand = Demand::new();
        let mut paths = Vec::new();
        for batch in batches {
            let driver = Driver::new(batch.path.start(), batch.path.end(), batch.departure);
            demand.push_many(driver, batch.count);
            paths.extend(std::iter::repeat_n(batch.path, batch.count));
        }
        (demand, Assignment { paths })
    }

    pub fn get(&self, driver: DriverId) -> Option<&Path> {
        self.paths.get(driver.index())
    }

    pub fn paths(&self) -> &[Path] {
        &self.paths
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// Edge sequence per driver.
    pub fn edge_description(&self, graph: &Graph) -> SimResult<Vec<Vec<EdgeId>>> {
        self.paths
            .iter()
            .map(|p| p.edges(graph).map_err(SimError::from))
            .collect()
    }

    /// Check one path per driver, each running from the driver's start to its
    /// end.
    pub fn check(&self, demand: &Demand) -> SimResult<()> {
        if self.paths.len() != demand.len() {
            return Err(SimError::AssignmentMismatch {
                expected: demand.len(),
                got:      self.paths.len(),
                what:     "assignment",
            });
        }
        for (id, driver) in demand.iter() {
            let path = &self.paths[id.index()];
            if path.start() != driver.start || path.end() != driver.end {
                return Err(SimError::InconsistentPath {
                    driver: id,
                    reason: format!("path {path} does not run from {} to {}", driver.start, driver.end),
                });
            }
        }
        Ok(())
    }
}

impl FromIterator<Path> for Assignment {
    fn from_iter<I: IntoIterator<Item = Path>>(iter: I) -> Self {
        Self { paths: iter.into_iter().collect() }
    }
}
