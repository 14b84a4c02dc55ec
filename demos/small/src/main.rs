//! small — route assignment on a synthetic 4×4 grid.
//!
//! Builds a grid of two-way streets with BPR congestion, draws random
//! demand, prunes it with the interval builder, then compares the greedy
//! assignment against a time-budgeted backtracking search.
//!
//! Run with `RUST_LOG=info cargo run -p small` (or `debug` for search
//! progress).

use std::time::{Duration, Instant};

use anyhow::Result;

use ta_core::{Congestion, Demand, EngineConfig, NodeId, Point, SimRng};
use ta_graph::{EdgeAttrs, Graph};
use ta_heuristic::{BacktrackingSearch, GreedyAssignmentHeuristic};
use ta_interval::IntervalBuilder;
use ta_sim::SimBuilder;

// ── Constants ─────────────────────────────────────────────────────────────────

const SEED:             u64   = 42;
const GRID:             u32   = 4;
const DRIVERS:          usize = 14;
const LATEST_DEPARTURE: u64   = 6;
const SEARCH_SLACK:     f64   = 1.0;
const SEARCH_BUDGET:    Duration = Duration::from_secs(2);

// ── Network ───────────────────────────────────────────────────────────────────

/// `GRID × GRID` nodes one unit apart; every neighbour pair joined both ways.
/// Avenues (even rows) get two lanes.
fn build_grid(config: &EngineConfig) -> Result<Graph> {
    let mut graph = Graph::new(config);
    let mut ids = Vec::new();
    for row in 0..GRID {
        for col in 0..GRID {
            ids.push(graph.add_node(Some(Point::new(col as f64, row as f64))));
        }
    }
    let at = |row: u32, col: u32| ids[(row * GRID + col) as usize];

    for row in 0..GRID {
        for col in 0..GRID {
            let lanes = if row % 2 == 0 { 2 } else { 1 };
            let mut link = |a: NodeId, b: NodeId| -> Result<()> {
                for (s, t) in [(a, b), (b, a)] {
                    let attrs = EdgeAttrs::new()
                        .lanes(lanes)
                        .congestion(Congestion::bpr(1.0, 2.0 * lanes as f64))
                        .flow_limit(2 * lanes);
                    graph.add_edge(s, t, attrs)?;
                }
                Ok(())
            };
            if col + 1 < GRID {
                link(at(row, col), at(row, col + 1))?;
            }
            if row + 1 < GRID {
                link(at(row, col), at(row + 1, col))?;
            }
        }
    }
    Ok(graph)
}

// ── Main ──────────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    env_logger::init();

    let config = EngineConfig {
        horizon: 500,
        ..EngineConfig::default()
    };
    log::info!("config: {}", serde_json::to_string(&config)?);

    let graph = build_grid(&config)?;
    let nodes: Vec<NodeId> = graph.node_ids().collect();
    let mut rng = SimRng::new(SEED);
    let demand = Demand::random(&nodes, DRIVERS, LATEST_DEPARTURE, &mut rng);
    log::info!(
        "{} nodes, {} edges, {} drivers",
        graph.node_count(),
        graph.edge_count(),
        demand.len()
    );

    // ── Interval pruning ──────────────────────────────────────────────────
    let t = Instant::now();
    let store = IntervalBuilder::new(&graph, &demand, &config).build()?;
    let conflicts = store.conflict_graph()?;
    let mut reachable = 0;
    for id in demand.ids() {
        reachable += store.get_possible_edges_for_driver(id)?.len();
    }
    log::info!(
        "intervals: {} entries, {reachable} reachable driver-edge pairs of {}, \
         {} conflicts in {} components ({:.1?})",
        store.len(),
        demand.len() * graph.edge_count(),
        conflicts.edges.len(),
        conflicts.components.len(),
        t.elapsed()
    );

    // ── Greedy ────────────────────────────────────────────────────────────
    let t = Instant::now();
    let greedy = GreedyAssignmentHeuristic::new(&graph, &demand, &config).run()?;
    log::info!("greedy: {} value {} ({:.1?})", greedy.status, greedy.value, t.elapsed());

    // ── Backtracking ──────────────────────────────────────────────────────
    let t = Instant::now();
    let best = BacktrackingSearch::new(&graph, &demand, &config)
        .slack(SEARCH_SLACK)
        .with_budget(Some(SEARCH_BUDGET), 256)
        .run()?;
    log::info!(
        "search: {} value {} after {} nodes ({:.1?})",
        best.status,
        best.value,
        best.stats.explored,
        t.elapsed()
    );

    // ── Report ────────────────────────────────────────────────────────────
    let mut sim = SimBuilder::fixed(&graph, &demand, &best.assignment)?
        .config(config.clone())
        .build()?;
    sim.simulate()?;
    let history = sim.traffic_history();
    let mut peaks: Vec<_> = history
        .edges()
        .filter_map(|e| history.peak(e).map(|(time, count)| (count, time, e)))
        .collect();
    peaks.sort_by(|a, b| b.0.cmp(&a.0).then(a.2.cmp(&b.2)));

    println!("greedy value : {}", greedy.value);
    println!("best value   : {} ({})", best.value, best.status);
    for (id, driver) in demand.iter() {
        let path = &best.assignment.paths()[id.index()];
        let exit = sim.exit_time(id).unwrap_or(f64::NAN);
        println!("  {id}: {driver} via {path}, exits at {exit}");
    }
    println!("busiest edges:");
    for (count, time, edge) in peaks.iter().take(3) {
        let e = &graph[*edge];
        println!("  {} → {}: {count} drivers at {time}", e.source, e.target);
    }
    Ok(())
}
