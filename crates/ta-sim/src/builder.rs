//! Fluent builder for constructing an [`EventSimulator`].

use ta_core::{Demand, EngineConfig};
use ta_graph::Graph;

use crate::{Assignment, EventSimulator, FixedRoutes, RoutePolicy, SimError, SimResult};

/// Fluent builder for [`EventSimulator<P>`].
///
/// # Required inputs
///
/// - [`Graph`] and [`Demand`], borrowed for the simulator's lifetime
/// - `P: RoutePolicy`, how drivers pick their next edge
///
/// # Optional inputs (have defaults)
///
/// | Method         | Default                   |
/// |----------------|---------------------------|
/// | `.config(c)`   | `EngineConfig::default()` |
///
/// # Example
///
/// ```rust,ignore
/// let mut sim = SimBuilder::fixed(&graph, &demand, &assignment)?
///     .config(config)
///     .build()?;
/// let status = sim.simulate()?;
/// ```
pub struct SimBuilder<'a, P: RoutePolicy> {
    graph:  &'a Graph,
    demand: &'a Demand,
    config: Option<EngineConfig>,
    policy: P,
}

impl<'a, P: RoutePolicy> SimBuilder<'a, P> {
    pub fn new(graph: &'a Graph, demand: &'a Demand, policy: P) -> Self {
        Self { graph, demand, config: None, policy }
    }

    pub fn config(mut self, config: EngineConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Validate inputs and return a simulator with every driver's clock
    /// scheduled at its departure.
    pub fn build(self) -> SimResult<EventSimulator<'a, P>> {
        for (_, driver) in self.demand.iter() {
            for node in [driver.start, driver.end] {
                if !self.graph.contains_node(node) {
                    return Err(ta_graph::GraphError::MissingNode(node).into());
                }
            }
            if !driver.departure.is_finite() || driver.departure < 0.0 {
                return Err(SimError::Core(ta_core::CoreError::Config(format!(
                    "driver {driver} has departure {}",
                    driver.departure
                ))));
            }
        }
        let config = self.config.unwrap_or_default();
        Ok(EventSimulator::from_parts(self.graph, self.demand, config, self.policy))
    }
}

impl<'a> SimBuilder<'a, FixedRoutes> {
    /// Builder in edge-description mode, after checking that `assignment`
    /// has one path per driver from its start to its end.
    pub fn fixed(graph: &'a Graph, demand: &'a Demand, assignment: &Assignment) -> SimResult<Self> {
        assignment.check(demand)?;
        let policy = FixedRoutes::new(graph, assignment)?;
        Ok(Self::new(graph, demand, policy))
    }
}
