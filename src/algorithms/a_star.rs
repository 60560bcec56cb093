/// A* adapter over the Graph Form

use super::{AlgorithmError, AlgorithmResult, PathFinder};
use crate::engine::{AStarEngine, SearchEngine};
use crate::formats::GraphForm;
use crate::types::{path_from_node_list, Path};
use std::fmt::Debug;
use std::hash::Hash;
use tracing::debug;

/// Runs a search engine directly on a Graph Form
///
/// The returned node list is turned into a path by picking the cheapest
/// parallel edge between consecutive nodes.
pub struct AStar<'a, V, K, S = AStarEngine> {
    graph: &'a GraphForm<V, K>,
    engine: S,
}

impl<'a, V, K> AStar<'a, V, K, AStarEngine> {
    pub fn new(graph: &'a GraphForm<V, K>) -> Self {
        Self {
            graph,
            engine: AStarEngine,
        }
    }
}

impl<'a, V, K, S> AStar<'a, V, K, S>
where
    S: SearchEngine,
{
    pub fn with_engine(graph: &'a GraphForm<V, K>, engine: S) -> Self {
        Self { graph, engine }
    }

    pub fn graph(&self) -> &'a GraphForm<V, K> {
        self.graph
    }
}

impl<'a, V, K, S> PathFinder for AStar<'a, V, K, S>
where
    V: Eq + Hash + Clone + Debug,
    K: Clone,
    S: SearchEngine,
{
    type Node = V;
    type Edge = K;

    fn find_shortest_path(&self, source: &V, destination: &V) -> AlgorithmResult<Option<Path<V, K>>> {
        for (role, node) in [("Source", source), ("Destination", destination)] {
            if !self.graph.contains_node(node) {
                return Err(AlgorithmError::InvalidParameters(format!(
                    "{} node {:?} not found",
                    role, node
                )));
            }
        }

        let Some(nodes) = self.engine.search(self.graph, source, destination) else {
            debug!(?source, ?destination, "No path");
            return Ok(None);
        };

        Ok(Some(path_from_node_list(nodes, self.graph)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn demo_graph() -> GraphForm<u32, &'static str> {
        GraphForm::from_edges(vec![
            (0, 1, "0 -> 1", 2.0),
            (1, 2, "1 -> 2", 9.0),
            (0, 3, "0 -> 3", 3.0),
            (3, 4, "3 -> 4", 1.0),
            (4, 2, "4 -> 2", 4.0),
            (7, 8, "7 -> 8", 1.0),
        ])
        .unwrap()
    }

    #[test]
    fn test_find_shortest_path() {
        let graph = demo_graph();
        let path = AStar::new(&graph).find_shortest_path(&0, &2).unwrap().unwrap();

        assert_eq!(path.nodes, vec![0, 3, 4, 2]);
        assert_eq!(path.edges, vec!["0 -> 3", "3 -> 4", "4 -> 2"]);
        assert_eq!(path.cost, 8.0);
        assert!(path.validate().is_ok());
    }

    #[test]
    fn test_no_path_is_none() {
        let graph = demo_graph();
        assert!(AStar::new(&graph).find_shortest_path(&0, &8).unwrap().is_none());
    }

    #[test]
    fn test_unknown_node_is_invalid() {
        let graph = demo_graph();
        let result = AStar::new(&graph).find_shortest_path(&0, &42);
        assert!(matches!(result, Err(AlgorithmError::InvalidParameters(_))));
    }

    #[test]
    fn test_same_node() {
        let graph = demo_graph();
        let path = AStar::new(&graph).find_shortest_path(&3, &3).unwrap().unwrap();
        assert_eq!(path, Path::single(3));
    }
}
