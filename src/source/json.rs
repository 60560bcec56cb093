/// Generic JSON graph documents
///
/// ```json
/// {
///   "nodes": [{"id": "a", "position": {"x": 0.0, "y": 0.0}}, {"id": "b"}],
///   "edges": [{"source": "a", "target": "b", "weight": 2.5}],
///   "heuristic_divisor": 1.0
/// }
/// ```
///
/// Edges without a key get `"{source} -> {target}"`, suffixed with ` (n)`
/// when that key is already taken between the same pair.

use super::{SourceError, SourceResult};
use crate::formats::GraphForm;
use crate::types::Vda5050Position;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonNode {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<Vda5050Position>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonEdge {
    pub source: String,
    pub target: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    pub weight: f64,
}

fn default_divisor() -> f64 {
    1.0
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonGraphDocument {
    #[serde(default)]
    pub nodes: Vec<JsonNode>,
    pub edges: Vec<JsonEdge>,
    /// Euclidean distances between positions are divided by this value to
    /// obtain the heuristic, e.g. a maximum speed when weights are times
    #[serde(default = "default_divisor")]
    pub heuristic_divisor: f64,
}

impl JsonGraphDocument {
    pub fn from_file(path: &Path) -> SourceResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Build a Graph Form; listed nodes come first, in document order
    ///
    /// # Errors
    /// `SourceError::InvalidDocument` for duplicate node ids, edges that
    /// reference unlisted nodes (when a node list is given) or a non-positive divisor.
    pub fn into_graph_form(self) -> SourceResult<GraphForm<String, String>> {
        if !(self.heuristic_divisor.is_finite() && self.heuristic_divisor > 0.0) {
            return Err(SourceError::InvalidDocument(format!(
                "heuristic_divisor must be positive, got {}",
                self.heuristic_divisor
            )));
        }

        let mut graph = GraphForm::new();
        let mut positions: HashMap<String, Vda5050Position> = HashMap::new();
        for node in &self.nodes {
            if graph.contains_node(&node.id) {
                return Err(SourceError::InvalidDocument(format!("duplicate node id {}", node.id)));
            }
            graph.add_node(node.id.clone());
            if let Some(position) = &node.position {
                positions.insert(node.id.clone(), position.clone());
            }
        }

        let restrict_nodes = !self.nodes.is_empty();
        // explicit keys are reserved first so generated ones never collide with them
        let mut used_keys: HashSet<(String, String, String)> = self
            .edges
            .iter()
            .filter_map(|edge| {
                edge.key
                    .as_ref()
                    .map(|key| (edge.source.clone(), edge.target.clone(), key.clone()))
            })
            .collect();
        for edge in self.edges {
            if restrict_nodes {
                for endpoint in [&edge.source, &edge.target] {
                    if !graph.contains_node(endpoint) {
                        return Err(SourceError::InvalidDocument(format!(
                            "edge references unknown node {}",
                            endpoint
                        )));
                    }
                }
            }

            let key = match edge.key {
                Some(key) => key,
                None => {
                    let base = format!("{} -> {}", edge.source, edge.target);
                    let mut candidate = base.clone();
                    let mut n = 2;
                    while used_keys.contains(&(edge.source.clone(), edge.target.clone(), candidate.clone())) {
                        candidate = format!("{} ({})", base, n);
                        n += 1;
                    }
                    used_keys.insert((edge.source.clone(), edge.target.clone(), candidate.clone()));
                    candidate
                }
            };
            graph.add_edge(edge.source, edge.target, key, edge.weight)?;
        }

        if !positions.is_empty() {
            let divisor = self.heuristic_divisor;
            graph.set_heuristic(move |a: &String, b: &String| match (positions.get(a), positions.get(b)) {
                (Some(pa), Some(pb)) => Vda5050Position::euclidean_distance(pa, pb) / divisor,
                _ => 0.0,
            });
        }

        Ok(graph)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> SourceResult<GraphForm<String, String>> {
        serde_json::from_str::<JsonGraphDocument>(text)?.into_graph_form()
    }

    #[test]
    fn test_default_keys_are_deduplicated() {
        let graph = parse(
            r#"{"edges": [
                {"source": "a", "target": "b", "weight": 1.0},
                {"source": "a", "target": "b", "weight": 2.0},
                {"source": "a", "target": "b", "key": "express", "weight": 0.5}
            ]}"#,
        )
        .unwrap();

        let keys: Vec<_> = graph
            .parallel_edges(&"a".to_string(), &"b".to_string())
            .iter()
            .map(|e| e.key.clone())
            .collect();
        assert_eq!(keys, vec!["a -> b", "a -> b (2)", "express"]);
    }

    #[test]
    fn test_default_keys_skip_later_explicit_keys() {
        let graph = parse(
            r#"{"edges": [
                {"source": "a", "target": "b", "weight": 1.0},
                {"source": "a", "target": "b", "key": "a -> b", "weight": 2.0},
                {"source": "a", "target": "b", "weight": 3.0}
            ]}"#,
        )
        .unwrap();

        let keys: Vec<_> = graph
            .parallel_edges(&"a".to_string(), &"b".to_string())
            .iter()
            .map(|e| e.key.clone())
            .collect();
        assert_eq!(keys, vec!["a -> b (2)", "a -> b", "a -> b (3)"]);

        let clash = parse(
            r#"{"edges": [
                {"source": "a", "target": "b", "key": "k", "weight": 1.0},
                {"source": "a", "target": "b", "key": "k", "weight": 2.0}
            ]}"#,
        );
        assert!(clash.is_err());
    }

    #[test]
    fn test_positions_give_euclidean_heuristic() {
        let graph = parse(
            r#"{"nodes": [
                    {"id": "a", "position": {"x": 0.0, "y": 0.0}},
                    {"id": "b", "position": {"x": 3.0, "y": 4.0, "map_id": "hall"}},
                    {"id": "c"}
                ],
                "edges": [{"source": "a", "target": "b", "weight": 6.0}],
                "heuristic_divisor": 2.0}"#,
        )
        .unwrap();

        assert_eq!(graph.node_count(), 3);
        assert_eq!(graph.heuristic(&"a".to_string(), &"b".to_string()), 2.5);
        assert_eq!(graph.heuristic(&"a".to_string(), &"c".to_string()), 0.0);
    }

    #[test]
    fn test_invalid_documents() {
        let unknown = parse(r#"{"nodes": [{"id": "a"}], "edges": [{"source": "a", "target": "z", "weight": 1.0}]}"#);
        assert!(matches!(unknown, Err(SourceError::InvalidDocument(_))));

        let duplicate = parse(r#"{"nodes": [{"id": "a"}, {"id": "a"}], "edges": []}"#);
        assert!(matches!(duplicate, Err(SourceError::InvalidDocument(_))));

        let negative = parse(r#"{"edges": [{"source": "a", "target": "b", "weight": -1.0}]}"#);
        assert!(matches!(negative, Err(SourceError::Format(_))));

        assert!(matches!(parse("{"), Err(SourceError::Json(_))));
    }
}
