/// Coordinate routing over a prepared routing graph and its hierarchy
///
/// A routing graph file holds node coordinates with external (map) ids and
/// arcs carrying travel time, distance, geometry and way id. The hierarchy
/// file is a contraction hierarchy over the arcs weighted by travel time, so
/// hierarchy edge positions are arc indices.

use super::{
    ContractionHierarchy, ContractionHierarchyEngine, EngineError, EngineResult, GeoArc, GeoRouter,
    GeoRoutingEngine, HierarchyEngine, Route,
};
use crate::formats::{GeoHierarchyForm, IndexedEdge, INF_WEIGHT};
use crate::types::GeoCoords;
use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;
use tracing::{debug, info};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoNode {
    pub position: GeoCoords,
    pub external_id: u64,
}

/// Directed arc between two routing nodes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoRoutingArc {
    pub tail: usize,
    pub head: usize,
    pub travel_time_ms: u32,
    pub distance_m: f64,
    /// Points from tail to head, both endpoints included
    pub geometry: Vec<GeoCoords>,
    pub way_id: u64,
}

/// Routing graph as stored in a graph file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GeoRoutingGraph {
    pub nodes: Vec<GeoNode>,
    pub arcs: Vec<GeoRoutingArc>,
}

impl GeoRoutingGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node and return its index
    pub fn add_node(&mut self, position: GeoCoords, external_id: u64) -> usize {
        self.nodes.push(GeoNode {
            position,
            external_id,
        });
        self.nodes.len() - 1
    }

    /// Add a straight arc; distance is the haversine distance of the endpoints
    pub fn add_arc(&mut self, tail: usize, head: usize, travel_time_ms: u32, way_id: u64) -> EngineResult<usize> {
        let geometry = vec![self.position(tail)?, self.position(head)?];
        self.add_arc_with_geometry(tail, head, travel_time_ms, way_id, geometry)
    }

    /// Add an arc following `geometry`; endpoint positions are added when missing
    pub fn add_arc_with_geometry(
        &mut self,
        tail: usize,
        head: usize,
        travel_time_ms: u32,
        way_id: u64,
        mut geometry: Vec<GeoCoords>,
    ) -> EngineResult<usize> {
        let (start, end) = (self.position(tail)?, self.position(head)?);
        if geometry.first() != Some(&start) {
            geometry.insert(0, start);
        }
        if geometry.last() != Some(&end) || geometry.len() == 1 {
            geometry.push(end);
        }
        let distance_m = geometry.windows(2).map(|w| w[0].distance_to(&w[1])).sum();

        self.arcs.push(GeoRoutingArc {
            tail,
            head,
            travel_time_ms,
            distance_m,
            geometry,
            way_id,
        });
        Ok(self.arcs.len() - 1)
    }

    fn position(&self, node: usize) -> EngineResult<GeoCoords> {
        self.nodes
            .get(node)
            .map(|n| n.position)
            .ok_or(EngineError::NodeOutOfRange {
                node,
                number_of_nodes: self.nodes.len(),
            })
    }

    /// Closest node within `radius_m` meters of `point`
    pub fn nearest_node(&self, point: &GeoCoords, radius_m: f64) -> Option<usize> {
        self.nodes
            .iter()
            .enumerate()
            .map(|(index, node)| (index, node.position.distance_to(point)))
            .filter(|(_, distance)| *distance <= radius_m)
            .min_by_key(|(_, distance)| OrderedFloat(*distance))
            .map(|(index, _)| index)
    }

    /// Arcs as an integer edge list weighted by travel time
    pub fn edge_list(&self) -> Vec<IndexedEdge> {
        self.arcs
            .iter()
            .map(|arc| IndexedEdge::new(arc.tail, arc.head, arc.travel_time_ms))
            .collect()
    }

    pub fn store(&self, path: &Path) -> EngineResult<()> {
        let mut writer = BufWriter::new(File::create(path)?);
        bincode::serialize_into(&mut writer, self)?;
        writer.flush()?;
        Ok(())
    }

    pub fn load(path: &Path) -> EngineResult<Self> {
        let graph: Self = bincode::deserialize_from(BufReader::new(File::open(path)?))?;
        for (index, arc) in graph.arcs.iter().enumerate() {
            if arc.tail >= graph.nodes.len() || arc.head >= graph.nodes.len() {
                return Err(EngineError::InvalidArtifact {
                    path: path.to_path_buf(),
                    reason: format!("arc {} leaves the node range", index),
                });
            }
        }
        Ok(graph)
    }
}

/// Write a routing graph file and build its hierarchy file
///
/// # Errors
/// Returns `EngineError::BuildFailed` if an arc's travel time reaches `INF_WEIGHT`.
pub fn prepare_geo_artifacts(
    graph: &GeoRoutingGraph,
    graph_file: &Path,
    hierarchy_file: &Path,
) -> EngineResult<GeoHierarchyForm> {
    graph.store(graph_file)?;
    ContractionHierarchyEngine::new().build(graph.nodes.len(), &graph.edge_list(), hierarchy_file)?;
    info!(
        nodes = graph.nodes.len(),
        arcs = graph.arcs.len(),
        graph_file = %graph_file.display(),
        hierarchy_file = %hierarchy_file.display(),
        "Geo routing artifacts prepared"
    );
    Ok(GeoHierarchyForm::new(graph_file, hierarchy_file))
}

/// Geo routing engine backed by `ContractionHierarchyEngine`
#[derive(Debug, Clone, Copy, Default)]
pub struct CoordinateRoutingEngine {
    hierarchy: ContractionHierarchyEngine,
}

impl CoordinateRoutingEngine {
    pub fn new() -> Self {
        Self::default()
    }
}

impl GeoRoutingEngine for CoordinateRoutingEngine {
    type Router = CoordinateRouter;

    fn open(&self, graph_file: &Path, hierarchy_file: &Path, matching_radius_m: f64) -> EngineResult<Self::Router> {
        let graph = GeoRoutingGraph::load(graph_file)?;
        let hierarchy = self.hierarchy.load(hierarchy_file)?;
        if hierarchy.number_of_nodes() != graph.nodes.len() {
            return Err(EngineError::InvalidArtifact {
                path: hierarchy_file.to_path_buf(),
                reason: format!(
                    "hierarchy has {} nodes, graph file has {}",
                    hierarchy.number_of_nodes(),
                    graph.nodes.len()
                ),
            });
        }

        Ok(CoordinateRouter {
            engine: self.hierarchy,
            graph,
            hierarchy,
            matching_radius_m,
        })
    }
}

/// Router over one opened graph/hierarchy pair
#[derive(Debug)]
pub struct CoordinateRouter {
    engine: ContractionHierarchyEngine,
    graph: GeoRoutingGraph,
    hierarchy: ContractionHierarchy,
    matching_radius_m: f64,
}

impl CoordinateRouter {
    fn snap(&self, point: GeoCoords) -> EngineResult<usize> {
        self.graph
            .nearest_node(&point, self.matching_radius_m)
            .ok_or(EngineError::NoMatch {
                point,
                radius_m: self.matching_radius_m,
            })
    }
}

impl GeoRouter for CoordinateRouter {
    fn route(&self, origin: GeoCoords, destination: GeoCoords) -> EngineResult<Option<Route>> {
        let source = self.snap(origin)?;
        let target = self.snap(destination)?;
        debug!(%origin, %destination, source, target, "Snapped route endpoints");

        let answer = self.engine.query(&self.hierarchy, source, target)?;
        if answer.cost == u64::from(INF_WEIGHT) {
            return Ok(None);
        }

        let mut arcs = Vec::with_capacity(answer.edges.len());
        for position in answer.edges {
            let arc = self.graph.arcs.get(position).ok_or_else(|| EngineError::InvalidArtifact {
                path: Path::new("<hierarchy>").to_path_buf(),
                reason: format!("query returned unknown arc {}", position),
            })?;
            arcs.push(GeoArc {
                way_id: arc.way_id,
                start_node_id: self.graph.nodes[arc.tail].external_id,
                end_node_id: self.graph.nodes[arc.head].external_id,
                geometry: arc.geometry.clone(),
                distance: arc.distance_m,
                duration: f64::from(arc.travel_time_ms) / 1000.0,
            });
        }

        Ok(Some(Route {
            duration: answer.cost as f64 / 1000.0,
            distance: arcs.iter().map(|arc| arc.distance).sum(),
            arcs,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    /// Three nodes along a meridian, roughly 111 m apart, plus an island
    fn line_graph() -> GeoRoutingGraph {
        let mut graph = GeoRoutingGraph::new();
        let a = graph.add_node(GeoCoords::new(49.0, 8.4), 100);
        let b = graph.add_node(GeoCoords::new(49.001, 8.4), 101);
        let c = graph.add_node(GeoCoords::new(49.002, 8.4), 102);
        graph.add_node(GeoCoords::new(49.1, 8.4), 103);
        graph
            .add_arc_with_geometry(a, b, 10_000, 7, vec![GeoCoords::new(49.0005, 8.4001)])
            .unwrap();
        graph.add_arc(b, c, 12_000, 8).unwrap();
        graph
    }

    fn open(dir: &TempDir, graph: &GeoRoutingGraph, radius_m: f64) -> CoordinateRouter {
        let form = prepare_geo_artifacts(graph, &dir.path().join("g.bin"), &dir.path().join("g.ch")).unwrap();
        CoordinateRoutingEngine::new()
            .open(form.graph_file(), form.hierarchy_file(), radius_m)
            .unwrap()
    }

    #[test]
    fn test_geometry_includes_endpoints() {
        let graph = line_graph();
        assert_eq!(graph.arcs[0].geometry.len(), 3);
        assert_eq!(graph.arcs[1].geometry.len(), 2);
        assert!(graph.arcs[1].distance_m > 100.0 && graph.arcs[1].distance_m < 120.0);
    }

    #[test]
    fn test_route_through_two_arcs() {
        let dir = TempDir::new().unwrap();
        let graph = line_graph();
        let router = open(&dir, &graph, 100.0);

        let route = router
            .route(GeoCoords::new(49.00001, 8.4), GeoCoords::new(49.002, 8.40001))
            .unwrap()
            .unwrap();
        assert_eq!(route.arcs.len(), 2);
        assert_eq!(route.duration, 22.0);
        assert_eq!(route.arcs[0].way_id, 7);
        assert_eq!(route.arcs[0].start_node_id, 100);
        assert_eq!(route.arcs[1].end_node_id, 102);
        let expected = graph.arcs[0].distance_m + graph.arcs[1].distance_m;
        assert!((route.distance - expected).abs() < 1e-9);
    }

    #[test]
    fn test_unreachable_and_unmatched() {
        let dir = TempDir::new().unwrap();
        let router = open(&dir, &line_graph(), 100.0);

        let unreachable = router.route(GeoCoords::new(49.002, 8.4), GeoCoords::new(49.0, 8.4));
        assert!(unreachable.unwrap().is_none());

        let far = router.route(GeoCoords::new(48.0, 8.4), GeoCoords::new(49.0, 8.4));
        assert!(matches!(far, Err(EngineError::NoMatch { .. })));
    }

    #[test]
    fn test_open_rejects_mismatched_hierarchy() {
        let dir = TempDir::new().unwrap();
        let graph = line_graph();
        prepare_geo_artifacts(&graph, &dir.path().join("g.bin"), &dir.path().join("g.ch")).unwrap();

        let mut smaller = graph.clone();
        smaller.nodes.pop();
        smaller.store(&dir.path().join("g.bin")).unwrap();

        let result = CoordinateRoutingEngine::new().open(&dir.path().join("g.bin"), &dir.path().join("g.ch"), 100.0);
        assert!(matches!(result, Err(EngineError::InvalidArtifact { .. })));
    }
}
