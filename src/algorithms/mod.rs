/// Engine adapters
///
/// Each adapter pulls one canonical form, runs an engine on it and rebuilds
/// the result as a `Path` in the caller's identifier space:
/// - AStar: Graph Form + search engine
/// - HierarchyIndex: Hierarchy-Source Form + hierarchy engine
/// - GraphHierarchy: Graph Form converted on the fly, then HierarchyIndex
/// - GeoHierarchy: Geo-Hierarchy Form + geo routing engine

pub mod a_star;
pub mod geo_hierarchy;
pub mod graph_hierarchy;
pub mod hierarchy;

pub use a_star::AStar;
pub use geo_hierarchy::{GeoHierarchy, DEFAULT_MATCHING_RADIUS_M};
pub use graph_hierarchy::GraphHierarchy;
pub use hierarchy::HierarchyIndex;

use crate::conversion::ConversionError;
use crate::dispatch::Algorithm;
use crate::engine::EngineError;
use crate::source::{Capability, SourceError};
use crate::types::{Path, PathError};
use thiserror::Error;

/// Algorithm errors
#[derive(Error, Debug)]
pub enum AlgorithmError {
    #[error("Invalid parameters: {0}")]
    InvalidParameters(String),

    #[error("Algorithm {algorithm} is not supported by a source with capabilities {capabilities:?}")]
    Incompatible {
        algorithm: Algorithm,
        capabilities: Vec<Capability>,
    },

    #[error("No size threshold matches a graph with {node_count} nodes")]
    NoThresholdMatch { node_count: usize },

    #[error("Hierarchy reported cost {reported}, but its edges sum to {summed}")]
    InconsistentCost { reported: u64, summed: u64 },

    #[error("Hierarchy returned edge position {0} outside the edge list")]
    UnresolvedEdge(usize),

    #[error("Inconsistent path: {0}")]
    InconsistentPath(String),

    #[error(transparent)]
    Source(#[from] SourceError),

    #[error(transparent)]
    Conversion(#[from] ConversionError),

    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error(transparent)]
    Path(#[from] PathError),
}

pub type AlgorithmResult<T> = Result<T, AlgorithmError>;

/// Shortest path query over one prepared data source
pub trait PathFinder {
    type Node;
    type Edge;

    /// Shortest path from `source` to `destination`
    ///
    /// # Returns
    /// * `Ok(Some(path))` - Shortest path found
    /// * `Ok(None)` - Destination unreachable
    /// * `Err(AlgorithmError::InvalidParameters)` - Unknown endpoint
    fn find_shortest_path(
        &self,
        source: &Self::Node,
        destination: &Self::Node,
    ) -> AlgorithmResult<Option<Path<Self::Node, Self::Edge>>>;
}
