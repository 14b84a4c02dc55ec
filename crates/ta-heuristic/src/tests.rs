//! Integration tests for ta-heuristic.

use std::time::Duration;

use ta_core::{Congestion, Demand, Driver, DriverId, EngineConfig, NodeId, SimRng, Status};
use ta_graph::{FreeFlow, Graph, GraphError, Path, PathFinder, TrafficRouter};
use ta_sim::{Assignment, SimBuilder};

use crate::{BacktrackingSearch, GreedyAssignmentHeuristic, HeuristicError};

// ── Helpers ───────────────────────────────────────────────────────────────────

fn n(i: u32) -> NodeId {
    NodeId(i)
}

fn path(g: &Graph, nodes: &[u32]) -> Path {
    Path::new(g, nodes.iter().map(|&i| n(i)).collect()).unwrap()
}

/// `0→1 (3x+3)`, `0→2 (4)`, `1→3 (1)`, `2→3 (4)`, `3→1 (13)`.
fn scenario_c_graph() -> Graph {
    let mut g = Graph::default();
    g.add_nodes(4);
    g.add_edge(n(0), n(1), Congestion::linear(3.0, 3.0)).unwrap();
    g.add_edge(n(0), n(2), Congestion::constant(4.0)).unwrap();
    g.add_edge(n(1), n(3), Congestion::constant(1.0)).unwrap();
    g.add_edge(n(2), n(3), Congestion::constant(4.0)).unwrap();
    g.add_edge(n(3), n(1), Congestion::constant(13.0)).unwrap();
    g
}

fn scenario_c_demand() -> Demand {
    Demand::from_drivers(vec![
        Driver::new(n(0), n(3), 0.0),
        Driver::new(n(0), n(3), 1.0),
        Driver::new(n(0), n(1), 2.0),
    ])
}

/// Two congestible routes from 0 to 3.
fn diamond() -> Graph {
    let mut g = Graph::default();
    g.add_nodes(4);
    g.add_edge(n(0), n(1), Congestion::linear(2.0, 2.0)).unwrap();
    g.add_edge(n(1), n(3), Congestion::linear(1.0, 1.0)).unwrap();
    g.add_edge(n(0), n(2), Congestion::linear(1.0, 3.0)).unwrap();
    g.add_edge(n(2), n(3), Congestion::linear(1.0, 2.0)).unwrap();
    g
}

fn replay(g: &Graph, demand: &Demand, assignment: &Assignment) -> f64 {
    let mut sim = SimBuilder::fixed(g, demand, assignment).unwrap().build().unwrap();
    assert_eq!(sim.simulate().unwrap(), Status::Success);
    sim.value()
}

// ── Greedy ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod greedy {
    use super::*;

    #[test]
    fn scenario_c_paths_and_value() {
        let g = scenario_c_graph();
        let demand = scenario_c_demand();
        let result = GreedyAssignmentHeuristic::new(&g, &demand, &EngineConfig::default()).run().unwrap();
        assert_eq!(result.status, Status::Success);
        assert_eq!(
            result.assignment.paths(),
            &[path(&g, &[0, 1, 3]), path(&g, &[0, 1, 3]), path(&g, &[0, 1])]
        );
        let arrivals: Vec<f64> = result.traces.iter().map(|t| t.arrival()).collect();
        assert_eq!(arrivals, vec![4.0, 8.0, 11.0]);
        assert_eq!(result.value, 23.0);
    }

    #[test]
    fn bounded_alternatives_router_agrees() {
        let g = scenario_c_graph();
        let demand = scenario_c_demand();
        let config = EngineConfig::default();
        let router = TrafficRouter::new(Some(10.0));
        let result = GreedyAssignmentHeuristic::with_router(&g, &demand, &config, router).run().unwrap();
        assert_eq!(result.value, 23.0);
        assert_eq!(result.assignment.get(DriverId(2)), Some(&path(&g, &[0, 1])));
    }

    #[test]
    fn drivers_are_routed_in_departure_order() {
        let g = scenario_c_graph();
        let demand = Demand::from_drivers(vec![
            Driver::new(n(0), n(1), 2.0),
            Driver::new(n(0), n(3), 0.0),
            Driver::new(n(0), n(3), 1.0),
        ]);
        let result = GreedyAssignmentHeuristic::new(&g, &demand, &EngineConfig::default()).run().unwrap();
        assert_eq!(
            result.assignment.paths(),
            &[path(&g, &[0, 1]), path(&g, &[0, 1, 3]), path(&g, &[0, 1, 3])]
        );
        assert_eq!(result.traces[0].arrival(), 11.0);
        assert_eq!(result.value, 23.0);
    }

    #[test]
    fn trivial_driver_stays_put() {
        let g = scenario_c_graph();
        let demand = Demand::from_drivers(vec![Driver::new(n(2), n(2), 3.0)]);
        let result = GreedyAssignmentHeuristic::new(&g, &demand, &EngineConfig::default()).run().unwrap();
        assert_eq!(result.assignment.paths(), &[Path::trivial(n(2))]);
        assert_eq!(result.value, 3.0);
    }

    #[test]
    fn unreachable_destination_is_an_error() {
        let g = scenario_c_graph();
        let demand = Demand::from_drivers(vec![Driver::new(n(1), n(0), 0.0)]);
        let err = GreedyAssignmentHeuristic::new(&g, &demand, &EngineConfig::default()).run().unwrap_err();
        assert!(matches!(err, HeuristicError::Graph(GraphError::NoPath { .. })));
    }

    #[test]
    fn removing_a_driver_saves_at_least_its_solo_time() {
        let g = scenario_c_graph();
        let demand = scenario_c_demand();
        let result = GreedyAssignmentHeuristic::new(&g, &demand, &EngineConfig::default()).run().unwrap();
        let finder = PathFinder::new(&g);

        for (id, driver) in demand.iter() {
            let solo = finder.shortest_path(driver.start, driver.end, &FreeFlow).unwrap().cost;
            let rest = demand.without(id);
            let paths: Assignment = result
                .assignment
                .paths()
                .iter()
                .enumerate()
                .filter(|(i, _)| *i != id.index())
                .map(|(_, p)| p.clone())
                .collect();
            let value = replay(&g, &rest, &paths);
            assert!(value <= result.value - solo, "without {id}: {value}");
        }
    }
}

// ── Backtracking ──────────────────────────────────────────────────────────────

#[cfg(test)]
mod backtracking {
    use super::*;

    #[test]
    fn zero_slack_keeps_greedy() {
        let g = scenario_c_graph();
        let demand = scenario_c_demand();
        let result = BacktrackingSearch::new(&g, &demand, &EngineConfig::default()).run().unwrap();
        assert_eq!(result.status, Status::Success);
        assert_eq!(result.value, 23.0);
        assert_eq!(result.stats.improvements, 0);
    }

    #[test]
    fn slack_finds_the_detour() {
        let g = scenario_c_graph();
        let demand = scenario_c_demand();
        let result = BacktrackingSearch::new(&g, &demand, &EngineConfig::default())
            .slack(10.0)
            .run()
            .unwrap();
        assert_eq!(result.status, Status::Success);
        // The second driver detours via 2 so the third meets only one car on 0→1.
        assert_eq!(
            result.assignment.paths(),
            &[path(&g, &[0, 1, 3]), path(&g, &[0, 2, 3]), path(&g, &[0, 1])]
        );
        assert_eq!(result.value, 21.0);
        assert!(result.stats.improvements >= 1);
        assert!(result.stats.explored > 0);
        assert_eq!(replay(&g, &demand, &result.assignment), 21.0);
    }

    #[test]
    fn exhausted_budget_returns_greedy() {
        let g = scenario_c_graph();
        let demand = scenario_c_demand();
        let result = BacktrackingSearch::new(&g, &demand, &EngineConfig::default())
            .slack(10.0)
            .with_budget(Some(Duration::ZERO), 1)
            .run()
            .unwrap();
        assert_eq!(result.status, Status::Timeout);
        assert_eq!(result.value, 23.0);
        assert_eq!(result.stats.explored, 0);
        assert_eq!(result.assignment.len(), 3);
    }

    #[test]
    fn never_worse_than_greedy_on_random_demand() {
        let g = diamond();
        let config = EngineConfig::default();
        let mut rng = SimRng::new(11);
        for round in 0..5 {
            let mut demand = Demand::new();
            for _ in 0..5 {
                demand.push(Driver::new(n(0), n(3), rng.gen_range(0..4u32) as f64));
            }
            let greedy = GreedyAssignmentHeuristic::new(&g, &demand, &config).run().unwrap();
            let best = BacktrackingSearch::new(&g, &demand, &config).slack(100.0).run().unwrap();
            assert_eq!(best.status, Status::Success);
            assert!(best.value <= greedy.value, "round {round}: {} > {}", best.value, greedy.value);
            assert_eq!(replay(&g, &demand, &best.assignment), best.value);
        }
    }
}
