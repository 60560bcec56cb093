/// A* search over the Graph Form
///
/// Thin wrapper around `petgraph::algo::astar`. Parallel edges are relaxed
/// individually, so the cheapest one always determines the path cost.

use super::SearchEngine;
use crate::formats::GraphForm;
use petgraph::algo::astar;
use std::hash::Hash;
use tracing::debug;

/// Goal-directed search using the graph's heuristic
#[derive(Debug, Clone, Copy, Default)]
pub struct AStarEngine;

impl SearchEngine for AStarEngine {
    fn search<V, K>(&self, graph: &GraphForm<V, K>, source: &V, destination: &V) -> Option<Vec<V>>
    where
        V: Eq + Hash + Clone,
    {
        let start = graph.node_index(source)?;
        let goal = graph.node_index(destination)?;

        let (cost, indices) = astar(
            graph.graph(),
            start,
            |node| node == goal,
            |edge| edge.weight().weight,
            |node| graph.node(node).map_or(0.0, |v| graph.heuristic(v, destination)),
        )?;
        debug!(cost, hops = indices.len().saturating_sub(1), "A* search finished");

        indices.into_iter().map(|index| graph.node(index).cloned()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid() -> GraphForm<(i32, i32), u8> {
        let mut graph = GraphForm::new().with_heuristic(|a: &(i32, i32), b: &(i32, i32)| {
            ((a.0 - b.0).abs() + (a.1 - b.1).abs()) as f64
        });
        for x in 0..3 {
            for y in 0..3 {
                if x < 2 {
                    graph.add_edge((x, y), (x + 1, y), 0, 1.0).unwrap();
                }
                if y < 2 {
                    graph.add_edge((x, y), (x, y + 1), 0, 1.0).unwrap();
                }
            }
        }
        graph
    }

    #[test]
    fn test_search_on_grid() {
        let graph = grid();
        let nodes = AStarEngine.search(&graph, &(0, 0), &(2, 2)).unwrap();
        assert_eq!(nodes.len(), 5);
        assert_eq!(nodes.first(), Some(&(0, 0)));
        assert_eq!(nodes.last(), Some(&(2, 2)));
    }

    #[test]
    fn test_unreachable_and_unknown() {
        let graph = grid();
        // edges only point right and down
        assert!(AStarEngine.search(&graph, &(2, 2), &(0, 0)).is_none());
        assert!(AStarEngine.search(&graph, &(0, 0), &(9, 9)).is_none());
    }

    #[test]
    fn test_source_equals_destination() {
        let graph = grid();
        assert_eq!(AStarEngine.search(&graph, &(1, 1), &(1, 1)), Some(vec![(1, 1)]));
    }
}
