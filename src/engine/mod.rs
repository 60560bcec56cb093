/// Path-search engines
///
/// The pipeline treats engines as black boxes behind three traits:
/// - SearchEngine: node-list search directly on a Graph Form
/// - HierarchyEngine: build/load/query of a hierarchy over an integer edge list
/// - GeoRoutingEngine: coordinate routing over a routing graph file plus hierarchy
///
/// One default implementation of each ships with the crate.

pub mod astar;
pub mod contraction;
pub mod geo;

pub use astar::AStarEngine;
pub use contraction::{ContractionHierarchy, ContractionHierarchyEngine};
pub use geo::{
    prepare_geo_artifacts, CoordinateRouter, CoordinateRoutingEngine, GeoNode, GeoRoutingArc,
    GeoRoutingGraph,
};

use crate::formats::{GraphForm, IndexedEdge};
use crate::types::GeoCoords;
use serde::{Deserialize, Serialize};
use std::hash::Hash;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Engine errors
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Artifact serialization error: {0}")]
    Serialization(#[from] bincode::Error),

    #[error("Invalid artifact {path:?}: {reason}")]
    InvalidArtifact { path: PathBuf, reason: String },

    #[error("Node {node} out of range, hierarchy has {number_of_nodes} nodes")]
    NodeOutOfRange { node: usize, number_of_nodes: usize },

    #[error("No node within {radius_m} m of {point}")]
    NoMatch { point: GeoCoords, radius_m: f64 },

    #[error("Hierarchy build failed: {0}")]
    BuildFailed(String),
}

pub type EngineResult<T> = Result<T, EngineError>;

/// Search directly on a Graph Form
pub trait SearchEngine {
    /// Node sequence of a shortest path, `None` if `destination` is unreachable
    fn search<V, K>(&self, graph: &GraphForm<V, K>, source: &V, destination: &V) -> Option<Vec<V>>
    where
        V: Eq + Hash + Clone;
}

/// Answer of a hierarchy query
///
/// `edges` are positions in the edge list the hierarchy was built from.
/// `cost == INF_WEIGHT` means the target is unreachable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HierarchyQuery {
    pub edges: Vec<usize>,
    pub cost: u64,
}

/// Build, load and query a hierarchy over an integer edge list
pub trait HierarchyEngine {
    /// Loaded hierarchy
    type Handle;

    /// Build a hierarchy and write it to `output`
    fn build(&self, number_of_nodes: usize, edges: &[IndexedEdge], output: &Path) -> EngineResult<()>;

    /// Load a hierarchy written by `build`
    fn load(&self, artifact: &Path) -> EngineResult<Self::Handle>;

    fn query(&self, handle: &Self::Handle, source: usize, target: usize) -> EngineResult<HierarchyQuery>;
}

/// One arc of a geo route: a run of geometry points without routing decisions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoArc {
    pub way_id: u64,
    pub start_node_id: u64,
    pub end_node_id: u64,
    pub geometry: Vec<GeoCoords>,
    /// Meters
    pub distance: f64,
    /// Seconds
    pub duration: f64,
}

/// Route computed by a geo router
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Route {
    pub arcs: Vec<GeoArc>,
    /// Seconds
    pub duration: f64,
    /// Meters
    pub distance: f64,
}

/// Open a geo router over a graph file and its hierarchy
pub trait GeoRoutingEngine {
    type Router: GeoRouter;

    fn open(&self, graph_file: &Path, hierarchy_file: &Path, matching_radius_m: f64) -> EngineResult<Self::Router>;
}

/// Route between coordinates
pub trait GeoRouter {
    /// Fastest route, `None` if unreachable
    ///
    /// # Errors
    /// `EngineError::NoMatch` if an endpoint has no node within the matching radius
    fn route(&self, origin: GeoCoords, destination: GeoCoords) -> EngineResult<Option<Route>>;
}
