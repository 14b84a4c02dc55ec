//! Drivers and the demand multiset.

use std::ops::Index;

use crate::{DriverId, NodeId, SimRng, Time};

/// One unit of travel demand.
///
/// A value object: two drivers with the same start, end and departure
/// compare equal.  Identity inside a simulation comes from the [`DriverId`]
/// assigned by [`Demand`], which is why identical drivers may coexist.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Driver {
    pub start:     NodeId,
    pub end:       NodeId,
    pub departure: Time,
}

impl Driver {
    #[inline]
    pub fn new(start: NodeId, end: NodeId, departure: Time) -> Self {
        Self { start, end, departure }
    }

    /// `true` if the driver is already at its destination.
    #[inline]
    pub fn is_trivial(&self) -> bool {
        self.start == self.end
    }
}

impl std::fmt::Display for Driver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}→{}@{}", self.start.0, self.end.0, self.departure)
    }
}

// ── Demand ────────────────────────────────────────────────────────────────────

/// An ordered multiset of drivers, indexed by [`DriverId`].
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Demand {
    drivers: Vec<Driver>,
}

impl Demand {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_drivers(drivers: Vec<Driver>) -> Self {
        Self { drivers }
    }

    /// Append a driver and return its id (sequential from 0).
    pub fn push(&mut self, driver: Driver) -> DriverId {
        let id = DriverId(self.drivers.len() as u32);
        self.drivers.push(driver);
        id
    }

    /// Append `count` identical drivers.
    pub fn push_many(&mut self, driver: Driver, count: usize) -> Vec<DriverId> {
        (0..count).map(|_| self.push(driver)).collect()
    }

    pub fn get(&self, id: DriverId) -> Option<&Driver> {
        self.drivers.get(id.index())
    }

    pub fn len(&self) -> usize {
        self.drivers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.drivers.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = DriverId> + '_ {
        (0..self.drivers.len()).map(|i| DriverId(i as u32))
    }

    pub fn iter(&self) -> impl Iterator<Item = (DriverId, &Driver)> + '_ {
        self.drivers
            .iter()
            .enumerate()
            .map(|(i, d)| (DriverId(i as u32), d))
    }

    pub fn as_slice(&self) -> &[Driver] {
        &self.drivers
    }

    /// Number of drivers equal (by value) to `driver`.
    pub fn multiplicity(&self, driver: &Driver) -> usize {
        self.drivers.iter().filter(|d| *d == driver).count()
    }

    /// Driver ids ordered by departure time; ties keep insertion order.
    pub fn by_departure(&self) -> Vec<DriverId> {
        let mut ids: Vec<DriverId> = self.ids().collect();
        ids.sort_by(|a, b| {
            self[*a].departure.total_cmp(&self[*b].departure)
        });
        ids
    }

    /// A copy of this demand with one driver removed.  Remaining drivers are
    /// renumbered densely, preserving order.
    pub fn without(&self, id: DriverId) -> Demand {
        let drivers = self
            .iter()
            .filter(|(other, _)| *other != id)
            .map(|(_, d)| *d)
            .collect();
        Demand { drivers }
    }

    /// Random demand over `nodes` with integer departures in
    /// `[0, latest_departure]`.  Start and end are always distinct when at
    /// least two nodes are supplied.
    pub fn random(nodes: &[NodeId], count: usize, latest_departure: u64, rng: &mut SimRng) -> Demand {
        let mut demand = Demand::new();
        for _ in 0..count {
            let (start, end) = match rng.choose_pair(nodes) {
                Some(pair) => pair,
                None => match nodes.first() {
                    Some(&only) => (only, only),
                    None => return demand,
                },
            };
            let departure = rng.gen_range(0..=latest_departure) as Time;
            demand.push(Driver::new(start, end, departure));
        }
        demand
    }
}

impl Index<DriverId> for Demand {
    type Output = Driver;

    fn index(&self, id: DriverId) -> &Driver {
        &self.drivers[id.index()]
    }
}

impl FromIterator<Driver> for Demand {
    fn from_iter<I: IntoIterator<Item = Driver>>(iter: I) -> Self {
        Demand { drivers: iter.into_iter().collect() }
    }
}
