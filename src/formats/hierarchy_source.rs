/// Hierarchy-Source Form: the integer edge list a hierarchy engine consumes

use super::{FormatError, FormatResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Weight sentinel meaning "unreachable"; valid weights are strictly below it
pub const INF_WEIGHT: u32 = 2_147_483_647;

/// Directed edge between two dense node indices
///
/// Ordering is `(source, target, weight)`, which is the order the converter
/// emits edge lists in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct IndexedEdge {
    pub source: usize,
    pub target: usize,
    pub weight: u32,
}

impl IndexedEdge {
    pub fn new(source: usize, target: usize, weight: u32) -> Self {
        Self {
            source,
            target,
            weight,
        }
    }
}

/// Edge list, node count and the location of the prebuilt hierarchy
///
/// The position of an edge in `edge_list` is significant: hierarchy queries
/// report edges by position.
#[derive(Debug, Clone, PartialEq)]
pub struct HierarchySourceForm {
    artifact: PathBuf,
    edge_list: Vec<IndexedEdge>,
    number_of_nodes: usize,
}

impl HierarchySourceForm {
    /// Create a form after checking indices and weights
    ///
    /// # Errors
    /// - `FormatError::NodeOutOfRange` if an endpoint is `>= number_of_nodes`
    /// - `FormatError::WeightTooLarge` if a weight is `>= INF_WEIGHT`
    pub fn new(
        artifact: impl Into<PathBuf>,
        edge_list: Vec<IndexedEdge>,
        number_of_nodes: usize,
    ) -> FormatResult<Self> {
        for (position, edge) in edge_list.iter().enumerate() {
            for node in [edge.source, edge.target] {
                if node >= number_of_nodes {
                    return Err(FormatError::NodeOutOfRange {
                        position,
                        node,
                        number_of_nodes,
                    });
                }
            }
            if edge.weight >= INF_WEIGHT {
                return Err(FormatError::WeightTooLarge {
                    position,
                    weight: edge.weight,
                });
            }
        }

        Ok(Self {
            artifact: artifact.into(),
            edge_list,
            number_of_nodes,
        })
    }

    /// Path of the hierarchy artifact built from this edge list
    pub fn artifact(&self) -> &Path {
        &self.artifact
    }

    pub fn edge_list(&self) -> &[IndexedEdge] {
        &self.edge_list
    }

    pub fn number_of_nodes(&self) -> usize {
        self.number_of_nodes
    }

    /// Edge at a position reported by a hierarchy query
    pub fn edge(&self, position: usize) -> Option<&IndexedEdge> {
        self.edge_list.get(position)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_indexed_edge_ordering() {
        let mut edges = vec![
            IndexedEdge::new(1, 0, 5),
            IndexedEdge::new(0, 2, 1),
            IndexedEdge::new(0, 1, 9),
            IndexedEdge::new(0, 1, 3),
        ];
        edges.sort();
        assert_eq!(
            edges,
            vec![
                IndexedEdge::new(0, 1, 3),
                IndexedEdge::new(0, 1, 9),
                IndexedEdge::new(0, 2, 1),
                IndexedEdge::new(1, 0, 5),
            ]
        );
    }

    #[test]
    fn test_form_validation() {
        let ok = HierarchySourceForm::new("a.ch", vec![IndexedEdge::new(0, 1, 7)], 2).unwrap();
        assert_eq!(ok.number_of_nodes(), 2);
        assert_eq!(ok.edge(0), Some(&IndexedEdge::new(0, 1, 7)));
        assert_eq!(ok.edge(1), None);
        assert_eq!(ok.artifact(), Path::new("a.ch"));

        let out_of_range = HierarchySourceForm::new("a.ch", vec![IndexedEdge::new(0, 2, 1)], 2);
        assert_eq!(
            out_of_range.unwrap_err(),
            FormatError::NodeOutOfRange {
                position: 0,
                node: 2,
                number_of_nodes: 2
            }
        );

        let too_heavy = HierarchySourceForm::new("a.ch", vec![IndexedEdge::new(0, 1, INF_WEIGHT)], 2);
        assert!(matches!(too_heavy, Err(FormatError::WeightTooLarge { .. })));
    }
}
