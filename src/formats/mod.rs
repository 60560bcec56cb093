/// Canonical graph formats
///
/// This module defines the three representations a data source may offer:
/// - GraphForm: weighted directed multigraph with a heuristic
/// - HierarchySourceForm: integer edge list plus a hierarchy artifact path
/// - GeoHierarchyForm: routing graph file plus hierarchy file

pub mod geo_hierarchy;
pub mod graph_form;
pub mod hierarchy_source;

pub use geo_hierarchy::GeoHierarchyForm;
pub use graph_form::{GraphForm, Heuristic, MultiEdge};
pub use hierarchy_source::{HierarchySourceForm, IndexedEdge, INF_WEIGHT};

use thiserror::Error;

/// Format errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FormatError {
    /// Edge weight is negative, NaN or infinite
    #[error("Invalid weight {weight} on edge {edge}")]
    InvalidWeight { edge: String, weight: f64 },

    /// Edge key used twice between the same ordered pair
    #[error("Duplicate edge key: {0}")]
    DuplicateEdgeKey(String),

    /// Edge endpoint outside `[0, number_of_nodes)`
    #[error("Edge {position} references node {node}, but there are only {number_of_nodes} nodes")]
    NodeOutOfRange {
        position: usize,
        node: usize,
        number_of_nodes: usize,
    },

    /// Integer weight reaches the infinity sentinel
    #[error("Edge {position} has weight {weight}, which is not below {}", INF_WEIGHT)]
    WeightTooLarge { position: usize, weight: u32 },
}

pub type FormatResult<T> = Result<T, FormatError>;
