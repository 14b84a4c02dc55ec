//! Unit tests for ta-graph.

use ta_core::{Congestion, EdgeId, EngineConfig, NodeId, Point};

use crate::{EdgeAttrs, Graph};

// ── Helpers ───────────────────────────────────────────────────────────────────

fn n(i: u32) -> NodeId {
    NodeId(i)
}

/// Seven-node graph (ids 1..=7; id 0 is an isolated placeholder) with two
/// back edges that only matter for cycle handling.
fn scenario_a() -> Graph {
    let mut g = Graph::default();
    g.add_nodes(8);
    for (u, v) in [(1, 6), (6, 7), (1, 4), (4, 5), (5, 7), (1, 2), (2, 3), (3, 5), (7, 1), (5, 4)] {
        g.add_edge(n(u), n(v), EdgeAttrs::new()).unwrap();
    }
    g
}

/// `0→1 (3x+3)`, `0→2 (4)`, `1→3 (1)`, `2→3 (4)`, `3→1 (13)`.
fn scenario_c() -> Graph {
    let mut g = Graph::default();
    g.add_nodes(4);
    g.add_edge(n(0), n(1), Congestion::linear(3.0, 3.0)).unwrap();
    g.add_edge(n(0), n(2), Congestion::constant(4.0)).unwrap();
    g.add_edge(n(1), n(3), Congestion::constant(1.0)).unwrap();
    g.add_edge(n(2), n(3), Congestion::constant(4.0)).unwrap();
    g.add_edge(n(3), n(1), Congestion::constant(13.0)).unwrap();
    g
}

/// Diamond with unit weights; the `0→2` branch is added first.
fn diamond() -> Graph {
    let mut g = Graph::default();
    g.add_nodes(4);
    for (u, v) in [(0, 2), (2, 3), (0, 1), (1, 3)] {
        g.add_edge(n(u), n(v), EdgeAttrs::new()).unwrap();
    }
    g
}

// ── Graph ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod graph {
    use super::*;
    use crate::GraphError;

    #[test]
    fn distance_defaults_from_positions() {
        let mut g = Graph::default();
        let a = g.add_node(Some(Point::new(0.0, 0.0)));
        let b = g.add_node(Some(Point::new(3.0, 4.0)));
        let e = g.add_edge(a, b, EdgeAttrs::new()).unwrap();
        assert_eq!(g[e].distance, 5.0);
        assert_eq!(g.minimum_travel_time(e), Some(5.0));
        assert_eq!(g[e].lanes, 1);
    }

    #[test]
    fn distance_defaults_from_config_without_positions() {
        let config = EngineConfig { default_distance: 2.5, default_lanes: 3, ..EngineConfig::default() };
        let mut g = Graph::new(&config);
        let a = g.add_node(None);
        let b = g.add_node(Some(Point::new(1.0, 1.0)));
        let e = g.add_edge(a, b, EdgeAttrs::new()).unwrap();
        assert_eq!(g[e].distance, 2.5);
        assert_eq!(g[e].lanes, 3);
        assert_eq!(g.travel_time(e, 7).unwrap(), 2.5);
    }

    #[test]
    fn explicit_attributes_win() {
        let mut g = Graph::default();
        g.add_nodes(2);
        let e = g
            .add_edge(n(0), n(1), EdgeAttrs::new().distance(9.0).flow_limit(4).congestion(Congestion::linear(1.0, 2.0)))
            .unwrap();
        assert_eq!(g[e].distance, 9.0);
        assert_eq!(g[e].flow_limit, 4);
        assert_eq!(g.travel_time(e, 3).unwrap(), 5.0);
    }

    #[test]
    fn missing_node_is_a_configuration_error() {
        let mut g = Graph::default();
        g.add_nodes(1);
        let err = g.add_edge(n(0), n(5), EdgeAttrs::new()).unwrap_err();
        assert!(matches!(err, GraphError::MissingNode(id) if id == n(5)));
        assert!(err.is_configuration());
    }

    #[test]
    fn bad_distance_rejected() {
        let mut g = Graph::default();
        g.add_nodes(2);
        for distance in [-1.0, f64::NAN, f64::INFINITY] {
            let err = g.add_edge(n(0), n(1), EdgeAttrs::new().distance(distance)).unwrap_err();
            assert!(matches!(err, GraphError::InvalidDistance { .. }), "{distance}");
            assert!(err.is_configuration());
        }
        assert_eq!(g.edge_count(), 0);
        assert!(g.add_edge(n(0), n(1), EdgeAttrs::new().distance(0.0)).is_ok());
    }

    #[test]
    fn duplicate_edge_rejected() {
        let mut g = Graph::default();
        g.add_nodes(2);
        g.add_edge(n(0), n(1), EdgeAttrs::new()).unwrap();
        assert!(matches!(
            g.add_edge(n(0), n(1), EdgeAttrs::new()),
            Err(GraphError::DuplicateEdge { .. })
        ));
        // The reverse direction is a distinct edge.
        assert!(g.add_edge(n(1), n(0), EdgeAttrs::new()).is_ok());
    }

    #[test]
    fn absent_edge_queries_return_none() {
        let g = scenario_c();
        assert!(g.congestion(EdgeId(99)).is_none());
        assert!(g.minimum_travel_time(EdgeId(99)).is_none());
        assert!(g.edge_between(n(1), n(0)).is_none());
        assert!(matches!(g.travel_time(EdgeId(99), 0), Err(GraphError::MissingEdge(_))));
    }

    #[test]
    fn remove_node_drops_incident_edges_and_keeps_ids() {
        let mut g = scenario_c();
        let e13 = g.edge_between(n(1), n(3)).unwrap();
        let e23 = g.edge_between(n(2), n(3)).unwrap();
        g.remove_node(n(1)).unwrap();

        assert_eq!(g.node_count(), 3);
        assert_eq!(g.edge_count(), 2); // 0→2, 2→3
        assert!(!g.contains_edge(e13));
        assert!(g.contains_edge(e23));
        assert_eq!(g.edge_between(n(2), n(3)), Some(e23));
        assert_eq!(g.in_edges(n(3)).collect::<Vec<_>>(), vec![e23]);
        assert_eq!(g.node_ids().collect::<Vec<_>>(), vec![n(0), n(2), n(3)]);

        // New nodes never reuse a tombstoned id.
        assert_eq!(g.add_node(None), n(4));
    }

    #[test]
    fn remove_edge_updates_adjacency() {
        let mut g = diamond();
        let e = g.edge_between(n(0), n(1)).unwrap();
        let record = g.remove_edge(e).unwrap();
        assert_eq!((record.source, record.target), (n(0), n(1)));
        assert_eq!(g.out_degree(n(0)), 1);
        assert!(matches!(g.remove_edge(e), Err(GraphError::MissingEdge(_))));
    }

    #[test]
    fn negative_travel_time_is_fatal() {
        let mut g = Graph::default();
        g.add_nodes(2);
        let e = g.add_edge(n(0), n(1), Congestion::linear(-2.0, 1.0)).unwrap();
        assert_eq!(g.travel_time(e, 0).unwrap(), 1.0);
        assert!(matches!(
            g.travel_time(e, 1),
            Err(GraphError::Core(ta_core::CoreError::InvalidTravelTime { .. }))
        ));
    }
}

// ── EdgeMap ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod edge_map {
    use super::*;
    use crate::EdgeMap;

    #[test]
    fn get_or_does_not_create_entries() {
        let mut map: EdgeMap<u32> = EdgeMap::new();
        assert_eq!(map.get_or(EdgeId(3), 7), 7);
        assert!(map.is_empty());
        map.insert(EdgeId(3), 1);
        assert_eq!(map.get_or(EdgeId(3), 7), 1);
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn iter_is_in_edge_order() {
        let map: EdgeMap<&str> = [(EdgeId(5), "b"), (EdgeId(1), "a")].into_iter().collect();
        let items: Vec<_> = map.iter().collect();
        assert_eq!(items, vec![(EdgeId(1), &"a"), (EdgeId(5), &"b")]);
    }

    #[test]
    fn get_or_insert_then_mutate() {
        let mut map: EdgeMap<u32> = EdgeMap::with_capacity(2);
        *map.get_or_insert(EdgeId(0), 0) += 2;
        *map.get_or_insert(EdgeId(0), 0) += 3;
        assert_eq!(map.get(EdgeId(0)), Some(&5));
        assert_eq!(map.remove(EdgeId(0)), Some(5));
        assert!(map.is_empty());
    }
}

// ── Path ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod path {
    use super::*;
    use crate::{GraphError, HopCount, Path};

    #[test]
    fn validates_consecutive_edges() {
        let g = scenario_a();
        assert!(Path::new(&g, vec![n(1), n(6), n(7)]).is_ok());
        assert!(matches!(Path::new(&g, vec![n(1), n(7)]), Err(GraphError::InvalidPath(_))));
        assert!(matches!(Path::new(&g, vec![]), Err(GraphError::InvalidPath(_))));
    }

    #[test]
    fn trivial_path_has_no_edges() {
        let g = scenario_a();
        let p = Path::new(&g, vec![n(3)]).unwrap();
        assert!(p.is_trivial());
        assert_eq!(p.len(), 0);
        assert!(p.edges(&g).unwrap().is_empty());
        assert_eq!(p.start(), p.end());
    }

    #[test]
    fn edge_chain_round_trip() {
        let g = scenario_a();
        let p = Path::new(&g, vec![n(1), n(4), n(5), n(7)]).unwrap();
        let edges = p.edges(&g).unwrap();
        assert_eq!(Path::from_edges(&g, &edges).unwrap(), p);
        assert_eq!(p.weight(&g, &HopCount).unwrap(), 3.0);
        assert_eq!(p.to_string(), "(1, 4, 5, 7)");
    }

    #[test]
    fn broken_edge_chain_rejected() {
        let g = scenario_a();
        let e16 = g.edge_between(n(1), n(6)).unwrap();
        let e45 = g.edge_between(n(4), n(5)).unwrap();
        assert!(matches!(Path::from_edges(&g, &[e16, e45]), Err(GraphError::InvalidPath(_))));
    }

    #[test]
    fn weight_rejects_what_searches_reject() {
        let g = scenario_a();
        let p = Path::new(&g, vec![n(1), n(6), n(7)]).unwrap();
        let negative = |_: &Graph, _: EdgeId| -1.0;
        assert!(matches!(p.weight(&g, &negative), Err(GraphError::InvalidWeight { .. })));
        let unbounded = |_: &Graph, _: EdgeId| f64::INFINITY;
        assert!(matches!(p.weight(&g, &unbounded), Err(GraphError::InvalidWeight { .. })));
        assert_eq!(Path::trivial(n(1)).weight(&g, &negative).unwrap(), 0.0);
    }
}

// ── Static search ─────────────────────────────────────────────────────────────

#[cfg(test)]
mod search {
    use std::time::Duration;

    use ta_core::Status;

    use super::*;
    use crate::{Distance, Filtered, FreeFlow, GraphError, HopCount, PathFinder};

    #[test]
    fn shortest_path_breaks_ties_lexicographically() {
        let g = diamond();
        let route = PathFinder::new(&g).shortest_path(n(0), n(3), &HopCount).unwrap();
        assert_eq!(route.path.nodes(), &[n(0), n(1), n(3)]);
        assert_eq!(route.cost, 2.0);
    }

    #[test]
    fn tie_against_a_longer_prefix() {
        // 0→1→3 and 0→1→2→3 both cost 3; the second is lexicographically
        // smaller because 2 < 3 at the third position.
        let mut g = Graph::default();
        g.add_nodes(4);
        for (u, v, d) in [(0, 1, 1.0), (1, 3, 2.0), (1, 2, 1.0), (2, 3, 1.0)] {
            g.add_edge(n(u), n(v), EdgeAttrs::new().distance(d)).unwrap();
        }
        let route = PathFinder::new(&g).shortest_path(n(0), n(3), &Distance).unwrap();
        assert_eq!(route.path.nodes(), &[n(0), n(1), n(2), n(3)]);
        assert_eq!(route.cost, 3.0);
    }

    #[test]
    fn long_line_is_searched_without_recursion() {
        let len = 100_000;
        let mut g = Graph::default();
        g.add_nodes(len + 1);
        for i in 0..len as u32 {
            g.add_edge(n(i), n(i + 1), EdgeAttrs::new()).unwrap();
        }
        let finder = PathFinder::new(&g);
        let found = finder.enumerate_paths(n(0), n(len as u32), 0.0, &HopCount).unwrap();
        assert_eq!(found.status, Status::Success);
        assert_eq!(found.len(), 1);
        assert_eq!(found.routes[0].path.len(), len);
        assert_eq!(found.routes[0].cost, len as f64);
        let route = finder.shortest_path(n(0), n(len as u32), &HopCount).unwrap();
        assert_eq!(route.path, found.routes[0].path);
    }

    #[test]
    fn shortest_path_start_equals_end() {
        let g = diamond();
        let route = PathFinder::new(&g).shortest_path(n(2), n(2), &HopCount).unwrap();
        assert!(route.is_trivial());
        assert_eq!(route.cost, 0.0);
    }

    #[test]
    fn unreachable_end_is_no_path() {
        let g = diamond();
        let err = PathFinder::new(&g).shortest_path(n(3), n(0), &HopCount).unwrap_err();
        assert!(matches!(err, GraphError::NoPath { .. }));
    }

    #[test]
    fn selectable_predicate_hides_edges() {
        let g = diamond();
        let banned = g.edge_between(n(0), n(1)).unwrap();
        let weight = Filtered::new(HopCount, move |_: &Graph, e: EdgeId| e != banned);
        let route = PathFinder::new(&g).shortest_path(n(0), n(3), &weight).unwrap();
        assert_eq!(route.path.nodes(), &[n(0), n(2), n(3)]);
    }

    #[test]
    fn closure_weights() {
        let g = scenario_c();
        // Free flow prefers 0→1→3 (4 vs 8); distance-by-hand reverses that.
        let finder = PathFinder::new(&g);
        assert_eq!(finder.shortest_path(n(0), n(3), &FreeFlow).unwrap().cost, 4.0);
        let via_two = |g: &Graph, e: EdgeId| if g[e].source == n(0) && g[e].target == n(1) { 100.0 } else { 1.0 };
        let route = finder.shortest_path(n(0), n(3), &via_two).unwrap();
        assert_eq!(route.path.nodes(), &[n(0), n(2), n(3)]);
    }

    #[test]
    fn negative_weight_rejected() {
        let g = diamond();
        let negative = |_: &Graph, _: EdgeId| -1.0;
        let err = PathFinder::new(&g).shortest_path(n(0), n(3), &negative).unwrap_err();
        assert!(matches!(err, GraphError::InvalidWeight { .. }));
    }

    #[test]
    fn distances_in_both_directions() {
        let g = scenario_c();
        let finder = PathFinder::new(&g);
        let from0 = finder.distances_from(n(0), &FreeFlow).unwrap();
        assert_eq!(from0, vec![Some(0.0), Some(3.0), Some(4.0), Some(4.0)]);
        let to1 = finder.distances_to(n(1), &FreeFlow).unwrap();
        assert_eq!(to1, vec![Some(3.0), Some(0.0), Some(17.0), Some(13.0)]);
    }

    #[test]
    fn bounded_enumeration_scenario_a() {
        let g = scenario_a();
        let found = PathFinder::new(&g).enumerate_paths(n(1), n(7), 1.0, &HopCount).unwrap();
        assert_eq!(found.status, Status::Success);
        assert_eq!(found.optimum, 2.0);
        let paths: Vec<Vec<NodeId>> = found.paths().map(|p| p.nodes().to_vec()).collect();
        assert_eq!(paths, vec![vec![n(1), n(6), n(7)], vec![n(1), n(4), n(5), n(7)]]);
    }

    #[test]
    fn zero_slack_keeps_only_optima() {
        let g = diamond();
        let found = PathFinder::new(&g).enumerate_paths(n(0), n(3), 0.0, &HopCount).unwrap();
        let paths: Vec<String> = found.paths().map(ToString::to_string).collect();
        assert_eq!(paths, vec!["(0, 1, 3)", "(0, 2, 3)"]);
    }

    #[test]
    fn large_slack_lists_every_simple_path() {
        let g = scenario_a();
        let found = PathFinder::new(&g).enumerate_paths(n(1), n(7), 100.0, &HopCount).unwrap();
        // 1-6-7, 1-4-5-7, 1-2-3-5-7
        assert_eq!(found.len(), 3);
        assert_eq!(found.routes[2].cost, 4.0);
    }

    #[test]
    fn enumeration_times_out_on_exhausted_budget() {
        let g = scenario_a();
        let finder = PathFinder::new(&g).with_budget(Some(Duration::ZERO), 1);
        let found = finder.enumerate_paths(n(1), n(7), 10.0, &HopCount).unwrap();
        assert_eq!(found.status, Status::Timeout);
        assert!(!found.is_complete());
        assert!(found.is_empty());
    }

    #[test]
    fn enumeration_of_unreachable_end() {
        let g = scenario_a();
        let err = PathFinder::new(&g).enumerate_paths(n(1), n(0), 1.0, &HopCount).unwrap_err();
        assert!(matches!(err, GraphError::NoPath { .. }));
    }
}

// ── Traffic ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod traffic {
    use super::*;
    use crate::{Path, PathFinder, Router, TimedRoute, TrafficHistory, TrafficRouter};

    #[test]
    fn occupancy_is_strictly_inside_presence() {
        let mut h = TrafficHistory::new();
        let e = EdgeId(0);
        h.record(e, 1.0, 3.0);
        assert_eq!(h.occupancy_at(e, 1.0), 0);
        assert_eq!(h.occupancy_at(e, 2.0), 1);
        assert_eq!(h.occupancy_at(e, 3.0), 0);
        assert_eq!(h.occupancy_at(EdgeId(1), 2.0), 0);
    }

    #[test]
    fn zero_duration_records_ignored() {
        let mut h = TrafficHistory::new();
        h.record(EdgeId(0), 2.0, 2.0);
        assert!(h.is_empty());
    }

    #[test]
    fn scenario_b_counts() {
        // Presence on (2,3): two drivers from 1, one more entering at 2.
        let mut h = TrafficHistory::new();
        let e = EdgeId(1);
        h.record(e, 1.0, 3.0);
        h.record(e, 1.0, 4.0);
        h.record(e, 2.0, 6.0);
        assert_eq!(h.occupancy_at(e, 2.0), 2);
        assert_eq!(h.occupancy_at(e, 3.5), 2);
        assert_eq!(h.peak(e), Some((2.0, 3)));
    }

    #[test]
    fn time_dependent_search_scenario_c() {
        let g = scenario_c();
        let finder = PathFinder::new(&g);
        let mut history = TrafficHistory::new();

        let first = finder.shortest_path_with_traffic(n(0), n(3), 0.0, &history, None).unwrap();
        assert_eq!(first.path.nodes(), &[n(0), n(1), n(3)]);
        assert_eq!(first.times, vec![0.0, 3.0, 4.0]);
        history.record_route(&g, &first).unwrap();

        let second = finder.shortest_path_with_traffic(n(0), n(3), 1.0, &history, None).unwrap();
        assert_eq!(second.path.nodes(), &[n(0), n(1), n(3)]);
        assert_eq!(second.arrival(), 8.0);
        history.record_route(&g, &second).unwrap();

        let third = finder.shortest_path_with_traffic(n(0), n(1), 2.0, &history, None).unwrap();
        assert_eq!(third.path.nodes(), &[n(0), n(1)]);
        assert_eq!(third.arrival(), 11.0);
    }

    #[test]
    fn slack_mode_agrees_on_scenario_c() {
        let g = scenario_c();
        let finder = PathFinder::new(&g);
        let router = TrafficRouter::new(Some(10.0));
        let mut history = TrafficHistory::new();
        let mut arrivals = Vec::new();
        for driver in [
            ta_core::Driver::new(n(0), n(3), 0.0),
            ta_core::Driver::new(n(0), n(3), 1.0),
            ta_core::Driver::new(n(0), n(1), 2.0),
        ] {
            let timed = router.route(&finder, &driver, &history).unwrap();
            history.record_route(&g, &timed).unwrap();
            arrivals.push(timed.arrival());
        }
        assert_eq!(arrivals, vec![4.0, 8.0, 11.0]);
    }

    #[test]
    fn heavy_traffic_diverts() {
        let g = scenario_c();
        let e01 = g.edge_between(n(0), n(1)).unwrap();
        let mut history = TrafficHistory::new();
        for _ in 0..3 {
            history.record(e01, 0.0, 100.0);
        }
        let timed = PathFinder::new(&g)
            .shortest_path_with_traffic(n(0), n(3), 1.0, &history, None)
            .unwrap();
        assert_eq!(timed.path.nodes(), &[n(0), n(2), n(3)]);
        assert_eq!(timed.times, vec![1.0, 5.0, 9.0]);
    }

    /// `0→1 (1)`, `0→2 (1)`, `2→1 (1)`, `1→3 (3x+3)`, with one driver on
    /// `1→3` during `(0.5, 1.5)`.
    fn clearing_jam() -> (Graph, TrafficHistory) {
        let mut g = Graph::default();
        g.add_nodes(4);
        g.add_edge(n(0), n(1), Congestion::constant(1.0)).unwrap();
        g.add_edge(n(0), n(2), Congestion::constant(1.0)).unwrap();
        g.add_edge(n(2), n(1), Congestion::constant(1.0)).unwrap();
        let e13 = g.add_edge(n(1), n(3), Congestion::linear(3.0, 3.0)).unwrap();
        let mut history = TrafficHistory::new();
        history.record(e13, 0.5, 1.5);
        (g, history)
    }

    #[test]
    fn later_arrival_can_finish_sooner() {
        let (g, history) = clearing_jam();
        let finder = PathFinder::new(&g);
        let timed = finder.shortest_path_with_traffic(n(0), n(3), 0.0, &history, None).unwrap();
        // Reaching 1 at time 1 meets the jam (arrive 7); the detour reaches it
        // at 2, after the jam has cleared.
        assert_eq!(timed.path.nodes(), &[n(0), n(2), n(1), n(3)]);
        assert_eq!(timed.times, vec![0.0, 1.0, 2.0, 5.0]);

        let listed = finder.shortest_path_with_traffic(n(0), n(3), 0.0, &history, Some(10.0)).unwrap();
        assert_eq!(listed, timed);
    }

    #[test]
    fn exhausted_budget_settles_nodes_at_first_arrival() {
        let (g, history) = clearing_jam();
        let finder = PathFinder::new(&g).with_budget(Some(std::time::Duration::ZERO), 1);
        let timed = finder.shortest_path_with_traffic(n(0), n(3), 0.0, &history, None).unwrap();
        assert_eq!(timed.path.nodes(), &[n(0), n(1), n(3)]);
        assert_eq!(timed.arrival(), 7.0);
    }

    #[test]
    fn equal_arrivals_break_ties_lexicographically() {
        let g = diamond();
        let timed = PathFinder::new(&g)
            .shortest_path_with_traffic(n(0), n(3), 0.0, &TrafficHistory::new(), None)
            .unwrap();
        assert_eq!(timed.path.nodes(), &[n(0), n(1), n(3)]);
    }

    #[test]
    fn unreachable_traffic_route() {
        let g = scenario_c();
        let err = PathFinder::new(&g)
            .shortest_path_with_traffic(n(3), n(0), 0.0, &TrafficHistory::new(), None)
            .unwrap_err();
        assert!(matches!(err, crate::GraphError::NoPath { .. }));
    }

    #[test]
    fn evaluate_fixed_path() {
        let g = scenario_c();
        let path = Path::new(&g, vec![n(0), n(2), n(3), n(1)]).unwrap();
        let timed: TimedRoute = PathFinder::new(&g)
            .evaluate_with_traffic(&path, 0.0, &TrafficHistory::new())
            .unwrap();
        assert_eq!(timed.times, vec![0.0, 4.0, 8.0, 21.0]);
        let trace: Vec<_> = timed.trace().collect();
        assert_eq!(trace[3], (n(1), 21.0));
    }

    #[test]
    fn trivial_traffic_route() {
        let g = scenario_c();
        let timed = PathFinder::new(&g)
            .shortest_path_with_traffic(n(2), n(2), 5.0, &TrafficHistory::new(), None)
            .unwrap();
        assert!(timed.path.is_trivial());
        assert_eq!(timed.arrival(), 5.0);
    }
}
