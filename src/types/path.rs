use crate::formats::GraphForm;
use serde::{Deserialize, Serialize};
use std::hash::Hash;
use thiserror::Error;

/// Error types for Path operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PathError {
    #[error("Path is empty")]
    EmptyPath,

    #[error("Path nodes and edges count mismatch: {nodes} nodes, {edges} edges")]
    CountMismatch { nodes: usize, edges: usize },

    #[error("Path cost {0} is negative or not finite")]
    InvalidCost(f64),

    #[error("No edge between consecutive path nodes at position {0}")]
    MissingEdge(usize),
}

/// Path represents a shortest path result
///
/// A path is an alternating sequence of nodes and edges:
/// (v1) -[e1]-> (v2) -[e2]-> (v3) ... -[en]-> (vn+1)
///
/// Invariants:
/// - nodes.len() = edges.len() + 1
/// - cost is the sum of the weights of `edges`
///
/// "No path" is never an empty `Path`; path finders return `None` instead.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Path<V, E> {
    /// Nodes in the path
    pub nodes: Vec<V>,

    /// Edges in the path
    pub edges: Vec<E>,

    /// Total cost of the path
    pub cost: f64,
}

impl<V, E> Path<V, E> {
    /// Create a path consisting of a single node (no edges, zero cost)
    pub fn single(node: V) -> Self {
        Self {
            nodes: vec![node],
            edges: Vec::new(),
            cost: 0.0,
        }
    }

    /// Create a path from nodes, edges and cost
    ///
    /// # Errors
    /// Returns an error if the path is invalid (empty, wrong counts or bad cost)
    pub fn from_parts(nodes: Vec<V>, edges: Vec<E>, cost: f64) -> Result<Self, PathError> {
        let path = Self { nodes, edges, cost };
        path.validate()?;
        Ok(path)
    }

    /// Create a path whose nodes are a polyline through its edges
    ///
    /// Geo routes report every geometry point as a node, so each edge covers
    /// one or more consecutive node pairs. Such paths satisfy
    /// `nodes.len() >= edges.len() + 1` instead of the strict count invariant
    /// checked by `validate`.
    pub fn from_polyline(nodes: Vec<V>, edges: Vec<E>, cost: f64) -> Result<Self, PathError> {
        if nodes.is_empty() {
            return Err(PathError::EmptyPath);
        }
        if nodes.len() < edges.len() + 1 {
            return Err(PathError::CountMismatch {
                nodes: nodes.len(),
                edges: edges.len(),
            });
        }
        if !cost.is_finite() || cost < 0.0 {
            return Err(PathError::InvalidCost(cost));
        }
        Ok(Self { nodes, edges, cost })
    }

    /// Validate the path invariants
    pub fn validate(&self) -> Result<(), PathError> {
        if self.nodes.is_empty() {
            return Err(PathError::EmptyPath);
        }

        if self.nodes.len() != self.edges.len() + 1 {
            return Err(PathError::CountMismatch {
                nodes: self.nodes.len(),
                edges: self.edges.len(),
            });
        }

        if !self.cost.is_finite() || self.cost < 0.0 {
            return Err(PathError::InvalidCost(self.cost));
        }

        Ok(())
    }

    /// Get the start node of the path
    pub fn start(&self) -> Option<&V> {
        self.nodes.first()
    }

    /// Get the end node of the path
    pub fn end(&self) -> Option<&V> {
        self.nodes.last()
    }

    /// Get the length of the path (number of edges)
    pub fn len(&self) -> usize {
        self.edges.len()
    }

    /// Check if the path has no edges (source equals destination)
    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }
}

/// Build a full path from the node list returned by a search engine
///
/// For each pair of consecutive nodes the cheapest parallel edge is chosen.
/// Among parallel edges of equal weight the one inserted first wins.
///
/// # Errors
/// Returns `PathError::MissingEdge` if two consecutive nodes are not connected,
/// and `PathError::EmptyPath` for an empty node list.
pub fn path_from_node_list<V, K>(
    nodes: Vec<V>,
    graph: &GraphForm<V, K>,
) -> Result<Path<V, K>, PathError>
where
    V: Eq + Hash + Clone,
    K: Clone,
{
    let mut edges = Vec::with_capacity(nodes.len().saturating_sub(1));
    let mut cost = 0.0;

    for (pos, pair) in nodes.windows(2).enumerate() {
        let edge = graph
            .cheapest_edge(&pair[0], &pair[1])
            .ok_or(PathError::MissingEdge(pos))?;
        edges.push(edge.key.clone());
        cost += edge.weight;
    }

    Path::from_parts(nodes, edges, cost)
}
