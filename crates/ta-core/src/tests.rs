//! Unit tests for ta-core primitives.

#[cfg(test)]
mod ids {
    use crate::{DriverId, EdgeId, NodeId};

    #[test]
    fn index_roundtrip() {
        let id = DriverId(42);
        assert_eq!(id.index(), 42);
        assert_eq!(DriverId::try_from(42usize).unwrap(), id);
    }

    #[test]
    fn invalid_sentinels_are_max() {
        assert_eq!(NodeId::INVALID.0, u32::MAX);
        assert_eq!(EdgeId::INVALID.0, u32::MAX);
        assert_eq!(DriverId::default(), DriverId::INVALID);
    }

    #[test]
    fn display() {
        assert_eq!(EdgeId(7).to_string(), "e7");
        assert_eq!(DriverId::INVALID.to_string(), "d?");
    }
}

#[cfg(test)]
mod geo {
    use crate::Point;

    #[test]
    fn pythagoras() {
        let a = Point::new(0.0, 0.0);
        let b = Point::new(3.0, 4.0);
        assert_eq!(a.distance(b), 5.0);
        assert_eq!(b.distance(a), 5.0);
    }
}

#[cfg(test)]
mod interval {
    use crate::{CoreError, Interval, RawInterval};

    #[test]
    fn clips_into_horizon() {
        let iv = RawInterval::from((-5i64, 120i64)).validate(100).unwrap();
        assert_eq!(iv, Interval::new(0, 100));
    }

    #[test]
    fn fully_outside_collapses_to_edge() {
        let iv = RawInterval::from((150i64, 200i64)).validate(100).unwrap();
        assert_eq!((iv.lower(), iv.upper()), (100, 100));
    }

    #[test]
    fn rejects_fractional_bounds() {
        let err = RawInterval::new(1.5, 3.0).validate(10).unwrap_err();
        assert!(matches!(err, CoreError::InvalidInterval { .. }));
    }

    #[test]
    fn rejects_inverted_bounds() {
        assert!(RawInterval::from((5i64, 4i64)).validate(10).is_err());
    }

    #[test]
    fn rejects_nan() {
        assert!(RawInterval::new(f64::NAN, 3.0).validate(10).is_err());
    }

    #[test]
    fn overlap_is_closed() {
        let a = Interval::new(0, 5);
        let b = Interval::new(5, 9);
        let c = Interval::new(6, 9);
        assert!(a.overlaps(&b));
        assert!(!a.overlaps(&c));
    }

    #[test]
    fn time_connection() {
        let pred = Interval::new(2, 8);
        assert!(pred.is_time_connected_to(&Interval::new(3, 9)));
        assert!(pred.is_time_connected_to(&Interval::new(2, 8)));
        // Successor starts earlier than its predecessor.
        assert!(!pred.is_time_connected_to(&Interval::new(1, 9)));
        // Successor ends earlier than its predecessor.
        assert!(!pred.is_time_connected_to(&Interval::new(3, 7)));
    }
}

#[cfg(test)]
mod congestion {
    use crate::{Congestion, CoreError, EdgeId};

    #[test]
    fn linear_shape() {
        let f = Congestion::linear(3.0, 3.0);
        assert_eq!(f.evaluate(0), 3.0);
        assert_eq!(f.evaluate(2), 9.0);
        assert_eq!(f.minimum_travel_time(), 3.0);
    }

    #[test]
    fn bpr_free_flow_at_zero() {
        let f = Congestion::bpr(10.0, 4.0);
        assert_eq!(f.evaluate(0), 10.0);
        assert!(f.evaluate(4) > 10.0);
    }

    #[test]
    fn custom_negative_is_rejected() {
        let f = Congestion::custom(|x| 1.0 - x as f64);
        assert_eq!(f.checked(EdgeId(0), 1).unwrap(), 0.0);
        let err = f.checked(EdgeId(0), 2).unwrap_err();
        assert!(matches!(err, CoreError::InvalidTravelTime { occupancy: 2, .. }));
    }
}

#[cfg(test)]
mod demand {
    use crate::{Demand, Driver, DriverId, NodeId, SimRng};

    fn d(start: u32, end: u32, dep: f64) -> Driver {
        Driver::new(NodeId(start), NodeId(end), dep)
    }

    #[test]
    fn identical_drivers_are_distinct_entries() {
        let mut demand = Demand::new();
        let ids = demand.push_many(d(2, 3, 1.0), 2);
        assert_eq!(ids, vec![DriverId(0), DriverId(1)]);
        assert_eq!(demand[ids[0]], demand[ids[1]]);
        assert_eq!(demand.multiplicity(&d(2, 3, 1.0)), 2);
    }

    #[test]
    fn by_departure_is_stable() {
        let demand: Demand = [d(0, 1, 2.0), d(0, 1, 1.0), d(1, 0, 1.0), d(0, 1, 0.0)]
            .into_iter()
            .collect();
        assert_eq!(
            demand.by_departure(),
            vec![DriverId(3), DriverId(1), DriverId(2), DriverId(0)]
        );
    }

    #[test]
    fn without_renumbers() {
        let demand: Demand = [d(0, 1, 0.0), d(1, 2, 1.0), d(2, 3, 2.0)].into_iter().collect();
        let rest = demand.without(DriverId(1));
        assert_eq!(rest.len(), 2);
        assert_eq!(rest[DriverId(1)], d(2, 3, 2.0));
    }

    #[test]
    fn random_is_reproducible() {
        let nodes: Vec<NodeId> = (0..5).map(NodeId).collect();
        let a = Demand::random(&nodes, 20, 10, &mut SimRng::new(7));
        let b = Demand::random(&nodes, 20, 10, &mut SimRng::new(7));
        assert_eq!(a, b);
        assert!(a.iter().all(|(_, drv)| drv.start != drv.end));
        assert!(a.iter().all(|(_, drv)| (0.0..=10.0).contains(&drv.departure)));
    }
}

#[cfg(test)]
mod objective {
    use crate::Objective;

    #[test]
    fn reductions() {
        let runs = [(0.0, 4.0), (1.0, 8.0), (2.0, 11.0)];
        assert_eq!(Objective::TotalExitTime.reduce(runs), 23.0);
        assert_eq!(Objective::TotalTravelTime.reduce(runs), 20.0);
        assert_eq!(Objective::Makespan.reduce(runs), 11.0);
    }
}

#[cfg(test)]
mod budget {
    use std::time::Duration;

    use crate::Budget;

    #[test]
    fn unlimited_never_exhausts() {
        let mut b = Budget::unlimited();
        for _ in 0..10_000 {
            assert!(!b.tick());
        }
    }

    #[test]
    fn zero_budget_exhausts_on_first_check() {
        let mut b = Budget::new(Some(Duration::ZERO), 1);
        assert!(b.tick());
        assert!(b.is_exhausted());
    }
}

#[cfg(test)]
mod status {
    use crate::Status;

    #[test]
    fn default_is_not_run() {
        assert_eq!(Status::default(), Status::NotRun);
        assert_eq!(Status::Timeout.to_string(), "TIMEOUT");
    }
}

#[cfg(test)]
mod rng {
    use crate::SimRng;

    #[test]
    fn pairs_are_distinct() {
        let mut rng = SimRng::new(3);
        let items = [10, 20, 30];
        for _ in 0..200 {
            let (a, b) = rng.choose_pair(&items).unwrap();
            assert_ne!(a, b);
        }
        assert_eq!(rng.choose_pair(&[1]), None);
        assert_eq!(rng.choose::<u8>(&[]), None);
    }

    #[test]
    fn instances_are_reproducible() {
        let draw = |rng: &mut SimRng| (0..8).map(|_| rng.gen_range(0..1000)).collect::<Vec<u32>>();
        assert_eq!(draw(&mut SimRng::instance(5, 2)), draw(&mut SimRng::instance(5, 2)));
        assert_ne!(draw(&mut SimRng::instance(5, 2)), draw(&mut SimRng::instance(5, 3)));
    }
}
