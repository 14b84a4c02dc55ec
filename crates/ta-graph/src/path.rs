//! Node-sequence paths and the search results built on them.

use std::fmt;

use ta_core::{EdgeId, NodeId, Time};

use crate::search::{EdgeWeight, checked_weight};
use crate::{Graph, GraphError, GraphResult};

// ── Path ──────────────────────────────────────────────────────────────────────

/// A non-empty sequence of nodes in which every consecutive pair is joined by
/// an edge.  A single node is the trivial path.
///
/// Ordering is lexicographic on the node sequence; searches use it to break
/// cost ties deterministically.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Path {
    nodes: Vec<NodeId>,
}

impl Path {
    /// Validate `nodes` against `graph`.
    ///
    /// # Errors
    /// [`GraphError::InvalidPath`] for an empty sequence or a consecutive
    /// pair with no edge; [`GraphError::MissingNode`] for an unknown node.
    pub fn new(graph: &Graph, nodes: Vec<NodeId>) -> GraphResult<Path> {
        let Some(&first) = nodes.first() else {
            return Err(GraphError::InvalidPath("a path needs at least one node".into()));
        };
        if !graph.contains_node(first) {
            return Err(GraphError::MissingNode(first));
        }
        for pair in nodes.windows(2) {
            if graph.edge_between(pair[0], pair[1]).is_none() {
                return Err(GraphError::InvalidPath(format!(
                    "no edge from {} to {}",
                    pair[0], pair[1]
                )));
            }
        }
        Ok(Path { nodes })
    }

    /// The single-node path at `node`.
    pub fn trivial(node: NodeId) -> Path {
        Path { nodes: vec![node] }
    }

    /// Build from a non-empty chain of edges.
    pub fn from_edges(graph: &Graph, edges: &[EdgeId]) -> GraphResult<Path> {
        let Some(&first) = edges.first() else {
            return Err(GraphError::InvalidPath("an edge chain needs at least one edge".into()));
        };
        let start = graph.source(first).ok_or(GraphError::MissingEdge(first))?;
        let mut nodes = Vec::with_capacity(edges.len() + 1);
        nodes.push(start);
        for &edge in edges {
            let record = graph.edge(edge).ok_or(GraphError::MissingEdge(edge))?;
            if nodes.last() != Some(&record.source) {
                return Err(GraphError::InvalidPath(format!("{edge} does not continue the chain")));
            }
            nodes.push(record.target);
        }
        Ok(Path { nodes })
    }

    /// Caller guarantees `nodes` is non-empty and connected.
    pub(crate) fn from_nodes_unchecked(nodes: Vec<NodeId>) -> Path {
        debug_assert!(!nodes.is_empty());
        Path { nodes }
    }

    pub fn nodes(&self) -> &[NodeId] {
        &self.nodes
    }

    pub fn start(&self) -> NodeId {
        self.nodes[0]
    }

    pub fn end(&self) -> NodeId {
        self.nodes[self.nodes.len() - 1]
    }

    /// Number of edges.
    pub fn len(&self) -> usize {
        self.nodes.len() - 1
    }

    pub fn is_trivial(&self) -> bool {
        self.nodes.len() == 1
    }

    /// Edge ids along the path.
    pub fn edges(&self, graph: &Graph) -> GraphResult<Vec<EdgeId>> {
        self.nodes
            .windows(2)
            .map(|pair| {
                graph.edge_between(pair[0], pair[1]).ok_or_else(|| {
                    GraphError::InvalidPath(format!("no edge from {} to {}", pair[0], pair[1]))
                })
            })
            .collect()
    }

    /// Sum of `weight` over the path's edges.
    ///
    /// # Errors
    /// [`GraphError::InvalidWeight`] for a negative or non-finite edge
    /// weight, as in the searches.
    pub fn weight<W: EdgeWeight + ?Sized>(&self, graph: &Graph, weight: &W) -> GraphResult<f64> {
        let mut total = 0.0;
        for edge in self.edges(graph)? {
            total += checked_weight(weight, graph, edge)?;
        }
        Ok(total)
    }

    pub fn into_nodes(self) -> Vec<NodeId> {
        self.nodes
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("(")?;
        for (i, node) in self.nodes.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}", node.0)?;
        }
        f.write_str(")")
    }
}

// ── Route ─────────────────────────────────────────────────────────────────────

/// A path together with its total weight under the search's edge weight.
#[derive(Clone, Debug, PartialEq)]
pub struct Route {
    pub path: Path,
    pub cost: f64,
}

impl Route {
    pub fn is_trivial(&self) -> bool {
        self.path.is_trivial()
    }
}

// ── TimedRoute ────────────────────────────────────────────────────────────────

/// A path with the realised time at each of its nodes.
///
/// `times[i]` is the moment the driver reaches `path.nodes()[i]`, which is
/// also when it enters the `i`-th edge.  The last entry is the arrival time.
#[derive(Clone, Debug, PartialEq)]
pub struct TimedRoute {
    pub path:  Path,
    pub times: Vec<Time>,
}

impl TimedRoute {
    pub fn departure(&self) -> Time {
        self.times[0]
    }

    pub fn arrival(&self) -> Time {
        self.times[self.times.len() - 1]
    }

    /// `(node, time)` pairs from start to end.
    pub fn trace(&self) -> impl Iterator<Item = (NodeId, Time)> + '_ {
        self.path.nodes().iter().copied().zip(self.times.iter().copied())
    }

    /// `(edge, entry, exit)` for every traversed edge.
    pub fn edge_times(&self, graph: &Graph) -> GraphResult<Vec<(EdgeId, Time, Time)>> {
        let edges = self.path.edges(graph)?;
        Ok(edges
            .into_iter()
            .enumerate()
            .map(|(i, e)| (e, self.times[i], self.times[i + 1]))
            .collect())
    }
}
