//! Road graph representation.
//!
//! # Data layout
//!
//! Nodes and edges live in two arenas indexed by `NodeId` / `EdgeId`.  A
//! removed entry leaves a `None` tombstone so identifiers handed out earlier
//! stay valid (and keep pointing at nothing) for the lifetime of the graph.
//! Each node keeps its outgoing and incoming edge lists in insertion order,
//! so forward and backward traversals are both a slice scan.
//!
//! Per-edge attributes are typed fields on [`EdgeRecord`]; values that only
//! some callers care about go in an [`EdgeMap`](crate::EdgeMap) keyed by the
//! same `EdgeId`.
//!
//! # Default filling
//!
//! [`EdgeAttrs`] fields left as `None` are filled when the edge is added:
//!
//! | Field        | Default                                                    |
//! |--------------|------------------------------------------------------------|
//! | `distance`   | Euclidean distance between endpoint positions, if both are set; else `EngineConfig::default_distance` |
//! | `lanes`      | `EngineConfig::default_lanes`                              |
//! | `flow_limit` | `EngineConfig::default_flow_limit`                         |
//! | `congestion` | `Congestion::Constant(distance)`                           |

use std::ops::Index;

use ta_core::{Congestion, EdgeId, EngineConfig, NodeId, Point, Time};

use crate::{GraphError, GraphResult};

// ── Records ───────────────────────────────────────────────────────────────────

/// A live node.
#[derive(Clone, Debug, Default)]
pub struct NodeRecord {
    pub position: Option<Point>,
    out_edges:    Vec<EdgeId>,
    in_edges:     Vec<EdgeId>,
}

impl NodeRecord {
    pub fn out_edges(&self) -> &[EdgeId] {
        &self.out_edges
    }

    pub fn in_edges(&self) -> &[EdgeId] {
        &self.in_edges
    }
}

/// A live directed edge with every attribute filled in.
#[derive(Clone, Debug)]
pub struct EdgeRecord {
    pub source:     NodeId,
    pub target:     NodeId,
    pub distance:   f64,
    pub lanes:      u32,
    pub congestion: Congestion,
    /// Occupancy threshold used by interval pruning as the worst case an
    /// edge is expected to carry.
    pub flow_limit: u32,
}

/// Optional attributes supplied when adding an edge.
#[derive(Clone, Debug, Default)]
pub struct EdgeAttrs {
    pub distance:   Option<f64>,
    pub lanes:      Option<u32>,
    pub congestion: Option<Congestion>,
    pub flow_limit: Option<u32>,
}

impl EdgeAttrs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn distance(mut self, distance: f64) -> Self {
        self.distance = Some(distance);
        self
    }

    pub fn lanes(mut self, lanes: u32) -> Self {
        self.lanes = Some(lanes);
        self
    }

    pub fn congestion(mut self, congestion: Congestion) -> Self {
        self.congestion = Some(congestion);
        self
    }

    pub fn flow_limit(mut self, flow_limit: u32) -> Self {
        self.flow_limit = Some(flow_limit);
        self
    }
}

impl From<Congestion> for EdgeAttrs {
    fn from(congestion: Congestion) -> Self {
        EdgeAttrs::new().congestion(congestion)
    }
}

// ── Graph ─────────────────────────────────────────────────────────────────────

/// Values used to fill missing edge attributes.
#[derive(Clone, Debug)]
struct EdgeDefaults {
    distance:   f64,
    lanes:      u32,
    flow_limit: u32,
}

impl From<&EngineConfig> for EdgeDefaults {
    fn from(config: &EngineConfig) -> Self {
        Self {
            distance:   config.default_distance,
            lanes:      config.default_lanes.max(1),
            flow_limit: config.default_flow_limit,
        }
    }
}

/// Directed road graph with congestion-dependent edge travel times.
#[derive(Clone, Debug)]
pub struct Graph {
    nodes:      Vec<Option<NodeRecord>>,
    edges:      Vec<Option<EdgeRecord>>,
    node_count: usize,
    edge_count: usize,
    defaults:   EdgeDefaults,
}

impl Graph {
    /// Empty graph filling missing attributes from `config`.
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            nodes:      Vec::new(),
            edges:      Vec::new(),
            node_count: 0,
            edge_count: 0,
            defaults:   EdgeDefaults::from(config),
        }
    }

    // ── Dimensions ────────────────────────────────────────────────────────

    /// Number of live nodes.
    pub fn node_count(&self) -> usize {
        self.node_count
    }

    /// Number of live edges.
    pub fn edge_count(&self) -> usize {
        self.edge_count
    }

    /// Arena length for nodes (live + removed); size dense per-node arrays
    /// with this.
    pub fn node_bound(&self) -> usize {
        self.nodes.len()
    }

    /// Arena length for edges (live + removed).
    pub fn edge_bound(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.node_count == 0
    }

    // ── Mutation ──────────────────────────────────────────────────────────

    /// Add a node and return its `NodeId` (sequential from 0).
    pub fn add_node(&mut self, position: Option<Point>) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(Some(NodeRecord { position, ..NodeRecord::default() }));
        self.node_count += 1;
        id
    }

    /// Add `n` nodes without positions.
    pub fn add_nodes(&mut self, n: usize) -> Vec<NodeId> {
        (0..n).map(|_| self.add_node(None)).collect()
    }

    /// Add a directed edge from `source` to `target`.
    ///
    /// # Errors
    /// - [`GraphError::MissingNode`] if either endpoint does not exist.
    /// - [`GraphError::DuplicateEdge`] if `source → target` already exists;
    ///   paths are node sequences, so parallel edges would be ambiguous.
    /// - [`GraphError::InvalidDistance`] if the distance, explicit or
    ///   derived, is negative or not finite.
    pub fn add_edge(
        &mut self,
        source: NodeId,
        target: NodeId,
        attrs:  impl Into<EdgeAttrs>,
    ) -> GraphResult<EdgeId> {
        let attrs = attrs.into();
        let from_pos = self.node(source).ok_or(GraphError::MissingNode(source))?.position;
        let to_pos   = self.node(target).ok_or(GraphError::MissingNode(target))?.position;
        if self.edge_between(source, target).is_some() {
            return Err(GraphError::DuplicateEdge { from: source, to: target });
        }

        let distance = attrs.distance.unwrap_or_else(|| match (from_pos, to_pos) {
            (Some(a), Some(b)) => a.distance(b),
            _ => self.defaults.distance,
        });
        if !(distance.is_finite() && distance >= 0.0) {
            return Err(GraphError::InvalidDistance { from: source, to: target, distance });
        }
        let record = EdgeRecord {
            source,
            target,
            distance,
            lanes:      attrs.lanes.unwrap_or(self.defaults.lanes).max(1),
            congestion: attrs.congestion.unwrap_or(Congestion::Constant(distance)),
            flow_limit: attrs.flow_limit.unwrap_or(self.defaults.flow_limit),
        };

        let id = EdgeId(self.edges.len() as u32);
        self.edges.push(Some(record));
        self.edge_count += 1;
        if let Some(node) = self.nodes[source.index()].as_mut() {
            node.out_edges.push(id);
        }
        if let Some(node) = self.nodes[target.index()].as_mut() {
            node.in_edges.push(id);
        }
        Ok(id)
    }

    /// Remove an edge and return its record.
    pub fn remove_edge(&mut self, edge: EdgeId) -> GraphResult<EdgeRecord> {
        let record = self
            .edges
            .get_mut(edge.index())
            .and_then(Option::take)
            .ok_or(GraphError::MissingEdge(edge))?;
        self.edge_count -= 1;
        if let Some(node) = self.nodes[record.source.index()].as_mut() {
            node.out_edges.retain(|&e| e != edge);
        }
        if let Some(node) = self.nodes[record.target.index()].as_mut() {
            node.in_edges.retain(|&e| e != edge);
        }
        Ok(record)
    }

    /// Remove a node together with every incident edge.
    pub fn remove_node(&mut self, node: NodeId) -> GraphResult<NodeRecord> {
        let record = self.node(node).ok_or(GraphError::MissingNode(node))?;
        let mut incident: Vec<EdgeId> = record.out_edges.clone();
        incident.extend_from_slice(&record.in_edges);
        incident.sort_unstable();
        incident.dedup();
        for edge in incident {
            self.remove_edge(edge)?;
        }
        let record = self.nodes[node.index()]
            .take()
            .ok_or(GraphError::MissingNode(node))?;
        self.node_count -= 1;
        Ok(record)
    }

    /// Replace the congestion function of an existing edge.
    pub fn set_congestion(&mut self, edge: EdgeId, congestion: Congestion) -> GraphResult<()> {
        let record = self
            .edges
            .get_mut(edge.index())
            .and_then(Option::as_mut)
            .ok_or(GraphError::MissingEdge(edge))?;
        record.congestion = congestion;
        Ok(())
    }

    // ── Lookup ────────────────────────────────────────────────────────────

    pub fn node(&self, node: NodeId) -> Option<&NodeRecord> {
        self.nodes.get(node.index()).and_then(Option::as_ref)
    }

    pub fn edge(&self, edge: EdgeId) -> Option<&EdgeRecord> {
        self.edges.get(edge.index()).and_then(Option::as_ref)
    }

    pub fn contains_node(&self, node: NodeId) -> bool {
        self.node(node).is_some()
    }

    pub fn contains_edge(&self, edge: EdgeId) -> bool {
        self.edge(edge).is_some()
    }

    /// Live node ids in ascending order.
    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes
            .iter()
            .enumerate()
            .filter(|(_, n)| n.is_some())
            .map(|(i, _)| NodeId(i as u32))
    }

    /// Live edge ids in ascending order.
    pub fn edge_ids(&self) -> impl Iterator<Item = EdgeId> + '_ {
        self.edges
            .iter()
            .enumerate()
            .filter(|(_, e)| e.is_some())
            .map(|(i, _)| EdgeId(i as u32))
    }

    /// Outgoing edges of `node`; empty for a missing node.
    pub fn out_edges(&self, node: NodeId) -> impl Iterator<Item = EdgeId> + '_ {
        self.node(node)
            .map(|n| n.out_edges.as_slice())
            .unwrap_or(&[])
            .iter()
            .copied()
    }

    /// Incoming edges of `node`; empty for a missing node.
    pub fn in_edges(&self, node: NodeId) -> impl Iterator<Item = EdgeId> + '_ {
        self.node(node)
            .map(|n| n.in_edges.as_slice())
            .unwrap_or(&[])
            .iter()
            .copied()
    }

    pub fn out_degree(&self, node: NodeId) -> usize {
        self.node(node).map_or(0, |n| n.out_edges.len())
    }

    /// The edge `from → to`, if any.
    pub fn edge_between(&self, from: NodeId, to: NodeId) -> Option<EdgeId> {
        self.out_edges(from).find(|&e| self[e].target == to)
    }

    pub fn source(&self, edge: EdgeId) -> Option<NodeId> {
        self.edge(edge).map(|e| e.source)
    }

    pub fn target(&self, edge: EdgeId) -> Option<NodeId> {
        self.edge(edge).map(|e| e.target)
    }

    /// The congestion function of `edge`, or `None` if it does not exist.
    pub fn congestion(&self, edge: EdgeId) -> Option<&Congestion> {
        self.edge(edge).map(|e| &e.congestion)
    }

    /// `congestion(edge)(0)`, or `None` if the edge does not exist.
    pub fn minimum_travel_time(&self, edge: EdgeId) -> Option<Time> {
        self.congestion(edge).map(Congestion::minimum_travel_time)
    }

    /// Travel time of `edge` for a driver entering with `occupancy` others
    /// already on it.
    ///
    /// # Errors
    /// [`GraphError::MissingEdge`] for an unknown edge; `GraphError::Core`
    /// wrapping `InvalidTravelTime` if the congestion function returns a
    /// negative or non-finite value.
    pub fn travel_time(&self, edge: EdgeId, occupancy: u32) -> GraphResult<Time> {
        let record = self.edge(edge).ok_or(GraphError::MissingEdge(edge))?;
        Ok(record.congestion.checked(edge, occupancy)?)
    }
}

impl Default for Graph {
    fn default() -> Self {
        Self::new(&EngineConfig::default())
    }
}

impl Index<EdgeId> for Graph {
    type Output = EdgeRecord;

    /// # Panics
    /// Panics if `edge` does not exist.  Use [`Graph::edge`] when existence
    /// has not been established.
    fn index(&self, edge: EdgeId) -> &EdgeRecord {
        match self.edge(edge) {
            Some(record) => record,
            None => panic!("{edge} not found in graph"),
        }
    }
}

impl Index<NodeId> for Graph {
    type Output = NodeRecord;

    /// # Panics
    /// Panics if `node` does not exist.
    fn index(&self, node: NodeId) -> &NodeRecord {
        match self.node(node) {
            Some(record) => record,
            None => panic!("{node} not found in graph"),
        }
    }
}
