/// Multigraph simplification: quantize, collapse parallel edges, index nodes

use super::{ConversionError, ConversionResult, NodeIndexMap};
use crate::formats::{GraphForm, IndexedEdge, INF_WEIGHT};
use std::collections::HashMap;
use std::hash::Hash;

/// Simplified, indexed graph ready for hashing and building
#[derive(Debug)]
pub(crate) struct SimplifiedGraph<V> {
    pub index: NodeIndexMap<V>,
    /// Sorted by `(source, target, weight)`
    pub edges: Vec<IndexedEdge>,
}

/// Scale a weight to an integer: `round(weight * scaling_factor)`
///
/// # Errors
/// `ConversionError::WeightOutOfRange` if the result is NaN, negative or not
/// below `INF_WEIGHT`.
pub fn quantize(weight: f64, scaling_factor: u32) -> ConversionResult<u32> {
    let scaled = (weight * f64::from(scaling_factor)).round();
    if !scaled.is_finite() || scaled < 0.0 || scaled >= f64::from(INF_WEIGHT) {
        return Err(ConversionError::WeightOutOfRange {
            weight,
            scaling_factor,
        });
    }
    Ok(scaled as u32)
}

/// Index every node in graph insertion order, isolated nodes included, so
/// queries on them answer "no path" instead of failing the lookup.
pub(crate) fn simplify<V, K>(graph: &GraphForm<V, K>, scaling_factor: u32) -> ConversionResult<SimplifiedGraph<V>>
where
    V: Eq + Hash + Clone,
{
    let index = NodeIndexMap::from_nodes(graph.nodes().cloned());

    // (source, target) -> lightest quantized weight; strict `<` keeps the earlier edge on ties
    let mut lightest: HashMap<(usize, usize), u32> = HashMap::new();
    for (source, target, edge) in graph.edges() {
        let weight = quantize(edge.weight, scaling_factor)?;
        let (Some(s), Some(t)) = (index.index_of(source), index.index_of(target)) else {
            continue;
        };
        lightest
            .entry((s, t))
            .and_modify(|w| {
                if weight < *w {
                    *w = weight;
                }
            })
            .or_insert(weight);
    }

    let mut edges: Vec<IndexedEdge> = lightest
        .into_iter()
        .map(|((source, target), weight)| IndexedEdge::new(source, target, weight))
        .collect();
    edges.sort();

    Ok(SimplifiedGraph { index, edges })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quantize() {
        assert_eq!(quantize(1.5, 1_000_000).unwrap(), 1_500_000);
        assert_eq!(quantize(0.0000004, 1_000_000).unwrap(), 0);
        assert_eq!(quantize(0.0000006, 1_000_000).unwrap(), 1);
        assert_eq!(quantize(2147.483646, 1_000_000).unwrap(), 2_147_483_646);
    }

    #[test]
    fn test_quantize_out_of_range() {
        for weight in [-1.0, f64::NAN, f64::INFINITY, 2147.483647, 1e12] {
            assert!(
                matches!(quantize(weight, 1_000_000), Err(ConversionError::WeightOutOfRange { .. })),
                "{} should be rejected",
                weight
            );
        }
    }

    #[test]
    fn test_collapse_keeps_lightest_regardless_of_order() {
        for order in [[5.0, 2.0], [2.0, 5.0]] {
            let mut graph: GraphForm<&str, usize> = GraphForm::new();
            graph.add_edge("a", "b", 0, order[0]).unwrap();
            graph.add_edge("a", "b", 1, order[1]).unwrap();

            let simplified = simplify(&graph, 10).unwrap();
            assert_eq!(simplified.edges, vec![IndexedEdge::new(0, 1, 20)]);
        }
    }

    #[test]
    fn test_index_follows_insertion_order_with_isolated_nodes() {
        let mut graph: GraphForm<&str, ()> = GraphForm::new();
        graph.add_node("lonely");
        graph.add_edge("x", "y", (), 1.0).unwrap();
        graph.add_edge("y", "lonely", (), 2.0).unwrap();

        let simplified = simplify(&graph, 1).unwrap();
        assert_eq!(simplified.index.index_of(&"lonely"), Some(0));
        assert_eq!(simplified.index.index_of(&"x"), Some(1));
        assert_eq!(simplified.index.index_of(&"y"), Some(2));
        assert_eq!(
            simplified.edges,
            vec![IndexedEdge::new(1, 2, 1), IndexedEdge::new(2, 0, 2)]
        );
    }
}
