/// Graph Form: a weighted directed multigraph with an admissible heuristic
///
/// Backed by a `petgraph` directed graph. Node and edge insertion order is
/// preserved, which the rest of the pipeline relies on for deterministic
/// tie-breaking between parallel edges.

use super::{FormatError, FormatResult};
use petgraph::graph::{DiGraph, EdgeIndex, NodeIndex};
use petgraph::visit::EdgeRef;
use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;

/// Heuristic `h(a, b)` returning a lower bound of the cost from `a` to `b`
pub type Heuristic<V> = Box<dyn Fn(&V, &V) -> f64>;

/// One edge of the multigraph
#[derive(Debug, Clone, PartialEq)]
pub struct MultiEdge<K> {
    /// Edge key, unique among the parallel edges of one (source, target) pair
    pub key: K,
    /// Non-negative, finite weight
    pub weight: f64,
}

/// Weighted directed multigraph plus heuristic
pub struct GraphForm<V, K> {
    graph: DiGraph<V, MultiEdge<K>>,
    indices: HashMap<V, NodeIndex>,
    /// `None` means the zero heuristic, which turns A* into Dijkstra
    heuristic: Option<Heuristic<V>>,
}

impl<V, K> GraphForm<V, K>
where
    V: Eq + Hash + Clone,
{
    /// Create an empty graph with the zero heuristic
    pub fn new() -> Self {
        Self {
            graph: DiGraph::new(),
            indices: HashMap::new(),
            heuristic: None,
        }
    }

    /// Build a graph from `(source, target, key, weight)` tuples
    pub fn from_edges<I>(edges: I) -> FormatResult<Self>
    where
        I: IntoIterator<Item = (V, V, K, f64)>,
        K: PartialEq + fmt::Debug,
        V: fmt::Debug,
    {
        let mut graph = Self::new();
        for (source, target, key, weight) in edges {
            graph.add_edge(source, target, key, weight)?;
        }
        Ok(graph)
    }

    /// Replace the heuristic
    pub fn with_heuristic(mut self, heuristic: impl Fn(&V, &V) -> f64 + 'static) -> Self {
        self.heuristic = Some(Box::new(heuristic));
        self
    }

    /// Replace the heuristic in place
    pub fn set_heuristic(&mut self, heuristic: impl Fn(&V, &V) -> f64 + 'static) {
        self.heuristic = Some(Box::new(heuristic));
    }

    /// Evaluate the heuristic between two nodes
    pub fn heuristic(&self, a: &V, b: &V) -> f64 {
        self.heuristic.as_ref().map_or(0.0, |h| h(a, b))
    }

    /// Add a node if it is not present yet and return its index
    pub fn add_node(&mut self, node: V) -> NodeIndex {
        if let Some(&index) = self.indices.get(&node) {
            return index;
        }
        let index = self.graph.add_node(node.clone());
        self.indices.insert(node, index);
        index
    }

    /// Add a directed edge, adding missing endpoints
    ///
    /// # Errors
    /// - `FormatError::InvalidWeight` for negative or non-finite weights
    /// - `FormatError::DuplicateEdgeKey` if `key` is already used between the same pair
    pub fn add_edge(&mut self, source: V, target: V, key: K, weight: f64) -> FormatResult<EdgeIndex>
    where
        K: PartialEq + fmt::Debug,
        V: fmt::Debug,
    {
        if !weight.is_finite() || weight < 0.0 {
            return Err(FormatError::InvalidWeight {
                edge: format!("{:?} -> {:?} [{:?}]", source, target, key),
                weight,
            });
        }

        let a = self.add_node(source);
        let b = self.add_node(target);

        if self.graph.edges_connecting(a, b).any(|e| e.weight().key == key) {
            return Err(FormatError::DuplicateEdgeKey(format!(
                "{:?} -> {:?} [{:?}]",
                self.graph[a], self.graph[b], key
            )));
        }

        Ok(self.graph.add_edge(a, b, MultiEdge { key, weight }))
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn contains_node(&self, node: &V) -> bool {
        self.indices.contains_key(node)
    }

    /// Index of a node in the underlying `petgraph` graph
    pub fn node_index(&self, node: &V) -> Option<NodeIndex> {
        self.indices.get(node).copied()
    }

    /// Node stored at a `petgraph` index
    pub fn node(&self, index: NodeIndex) -> Option<&V> {
        self.graph.node_weight(index)
    }

    /// All nodes in insertion order
    pub fn nodes(&self) -> impl Iterator<Item = &V> + '_ {
        self.graph.node_indices().map(move |index| &self.graph[index])
    }

    /// All edges in insertion order as `(source, target, edge)`
    pub fn edges(&self) -> impl Iterator<Item = (&V, &V, &MultiEdge<K>)> + '_ {
        self.graph
            .edge_references()
            .map(move |e| (&self.graph[e.source()], &self.graph[e.target()], e.weight()))
    }

    /// Parallel edges from `source` to `target` in insertion order
    pub fn parallel_edges(&self, source: &V, target: &V) -> Vec<&MultiEdge<K>> {
        let (Some(a), Some(b)) = (self.node_index(source), self.node_index(target)) else {
            return Vec::new();
        };

        // petgraph walks adjacency lists newest first
        let mut found: Vec<(EdgeIndex, &MultiEdge<K>)> = self
            .graph
            .edges_connecting(a, b)
            .map(|e| (e.id(), e.weight()))
            .collect();
        found.sort_by_key(|(id, _)| *id);
        found.into_iter().map(|(_, edge)| edge).collect()
    }

    /// Cheapest parallel edge from `source` to `target`
    ///
    /// Ties are broken by insertion order: the first inserted edge wins.
    pub fn cheapest_edge(&self, source: &V, target: &V) -> Option<&MultiEdge<K>> {
        let mut best: Option<&MultiEdge<K>> = None;
        for edge in self.parallel_edges(source, target) {
            if best.map_or(true, |b| edge.weight < b.weight) {
                best = Some(edge);
            }
        }
        best
    }

    /// Underlying `petgraph` graph
    pub fn graph(&self) -> &DiGraph<V, MultiEdge<K>> {
        &self.graph
    }
}

impl<V, K> Default for GraphForm<V, K>
where
    V: Eq + Hash + Clone,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<V, K> fmt::Debug for GraphForm<V, K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GraphForm")
            .field("nodes", &self.graph.node_count())
            .field("edges", &self.graph.edge_count())
            .field("heuristic", &self.heuristic.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_edge_creates_nodes_in_order() {
        let mut graph: GraphForm<&str, u32> = GraphForm::new();
        graph.add_edge("b", "a", 0, 1.0).unwrap();
        graph.add_edge("a", "c", 0, 2.0).unwrap();

        assert_eq!(graph.nodes().copied().collect::<Vec<_>>(), vec!["b", "a", "c"]);
        assert_eq!(graph.edge_count(), 2);
        assert!(graph.contains_node(&"c"));
        assert!(!graph.contains_node(&"d"));
    }

    #[test]
    fn test_rejects_invalid_weights() {
        let mut graph: GraphForm<u32, u32> = GraphForm::new();
        assert!(matches!(
            graph.add_edge(0, 1, 0, -1.0),
            Err(FormatError::InvalidWeight { .. })
        ));
        assert!(matches!(
            graph.add_edge(0, 1, 0, f64::NAN),
            Err(FormatError::InvalidWeight { .. })
        ));
        assert!(matches!(
            graph.add_edge(0, 1, 0, f64::INFINITY),
            Err(FormatError::InvalidWeight { .. })
        ));
    }

    #[test]
    fn test_duplicate_key_only_within_pair() {
        let mut graph: GraphForm<u32, &str> = GraphForm::new();
        graph.add_edge(0, 1, "k", 1.0).unwrap();
        graph.add_edge(1, 0, "k", 1.0).unwrap();
        graph.add_edge(0, 1, "k2", 1.0).unwrap();
        assert!(matches!(
            graph.add_edge(0, 1, "k", 3.0),
            Err(FormatError::DuplicateEdgeKey(_))
        ));
    }

    #[test]
    fn test_parallel_edges_in_insertion_order() {
        let graph = GraphForm::from_edges(vec![
            (0u32, 1u32, "first", 3.0),
            (0, 1, "second", 1.0),
            (0, 1, "third", 1.0),
        ])
        .unwrap();

        let keys: Vec<_> = graph.parallel_edges(&0, &1).iter().map(|e| e.key).collect();
        assert_eq!(keys, vec!["first", "second", "third"]);
        assert_eq!(graph.cheapest_edge(&0, &1).unwrap().key, "second");
        assert!(graph.cheapest_edge(&1, &0).is_none());
    }

    #[test]
    fn test_heuristic_defaults_to_zero() {
        let graph: GraphForm<u32, u32> = GraphForm::new();
        assert_eq!(graph.heuristic(&0, &1), 0.0);

        let graph: GraphForm<u32, u32> = GraphForm::new().with_heuristic(|a, b| (*b as f64) - (*a as f64));
        assert_eq!(graph.heuristic(&1, &4), 3.0);
    }
}
