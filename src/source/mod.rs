/// Data sources and their capabilities
///
/// A data source advertises which canonical forms it can produce. Each form
/// is produced at most once per source and then borrowed from a write-once
/// cell, so expensive loading or conversion is never repeated.

pub mod edge_list;
pub mod geo;
pub mod graph;
pub mod json;

pub use edge_list::EdgeListSource;
pub use geo::GeoArtifactSource;
pub use graph::GraphSource;
pub use json::{JsonEdge, JsonGraphDocument, JsonNode};

use crate::conversion::ConversionError;
use crate::engine::EngineError;
use crate::formats::{FormatError, GeoHierarchyForm, GraphForm, HierarchySourceForm};
use serde::Serialize;
use std::fmt;
use std::path::Path;
use thiserror::Error;

/// Data source errors
#[derive(Error, Debug)]
pub enum SourceError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid graph document: {0}")]
    InvalidDocument(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error(transparent)]
    Format(#[from] FormatError),

    #[error(transparent)]
    Conversion(#[from] ConversionError),

    #[error(transparent)]
    Engine(#[from] EngineError),
}

pub type SourceResult<T> = Result<T, SourceError>;

/// A canonical form a source can produce
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Capability {
    GeoHierarchy,
    HierarchySource,
    Graph,
}

impl Capability {
    /// Order in which capabilities are considered when selecting an engine
    pub const DECLARED_ORDER: [Capability; 3] = [
        Capability::GeoHierarchy,
        Capability::HierarchySource,
        Capability::Graph,
    ];
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Capability::GeoHierarchy => "geo-hierarchy",
            Capability::HierarchySource => "hierarchy-source",
            Capability::Graph => "graph",
        };
        f.write_str(name)
    }
}

/// Produces a Graph Form
pub trait GraphFormProvider<V, K> {
    fn graph_form(&self) -> SourceResult<&GraphForm<V, K>>;

    /// File the graph was loaded from, used to name cached artifacts
    fn origin_file(&self) -> Option<&Path> {
        None
    }
}

/// Produces a Hierarchy-Source Form
pub trait HierarchySourceProvider {
    fn hierarchy_source(&self) -> SourceResult<&HierarchySourceForm>;
}

/// Produces a Geo-Hierarchy Form
pub trait GeoHierarchyProvider {
    fn geo_hierarchy(&self) -> SourceResult<&GeoHierarchyForm>;
}

/// Graph data with optional capabilities
///
/// Implementors override the accessors for the forms they support; the
/// capability set is derived from them.
pub trait DataSource {
    /// Node identity exposed to callers
    type Node: 'static;
    /// Edge identity exposed to callers
    type EdgeKey: 'static;

    /// Number of nodes; cheap after the first call
    fn node_count(&self) -> SourceResult<usize>;

    fn graph_provider(&self) -> Option<&dyn GraphFormProvider<Self::Node, Self::EdgeKey>> {
        None
    }

    fn hierarchy_provider(&self) -> Option<&dyn HierarchySourceProvider> {
        None
    }

    fn geo_provider(&self) -> Option<&dyn GeoHierarchyProvider> {
        None
    }

    /// Supported capabilities in declared order
    fn capabilities(&self) -> Vec<Capability> {
        Capability::DECLARED_ORDER
            .into_iter()
            .filter(|capability| match capability {
                Capability::GeoHierarchy => self.geo_provider().is_some(),
                Capability::HierarchySource => self.hierarchy_provider().is_some(),
                Capability::Graph => self.graph_provider().is_some(),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Everything {
        graph: GraphForm<u32, ()>,
        hierarchy: HierarchySourceForm,
        geo: GeoHierarchyForm,
    }

    impl GraphFormProvider<u32, ()> for Everything {
        fn graph_form(&self) -> SourceResult<&GraphForm<u32, ()>> {
            Ok(&self.graph)
        }
    }

    impl HierarchySourceProvider for Everything {
        fn hierarchy_source(&self) -> SourceResult<&HierarchySourceForm> {
            Ok(&self.hierarchy)
        }
    }

    impl GeoHierarchyProvider for Everything {
        fn geo_hierarchy(&self) -> SourceResult<&GeoHierarchyForm> {
            Ok(&self.geo)
        }
    }

    impl DataSource for Everything {
        type Node = u32;
        type EdgeKey = ();

        fn node_count(&self) -> SourceResult<usize> {
            Ok(self.graph.node_count())
        }

        fn graph_provider(&self) -> Option<&dyn GraphFormProvider<u32, ()>> {
            Some(self)
        }

        fn hierarchy_provider(&self) -> Option<&dyn HierarchySourceProvider> {
            Some(self)
        }

        fn geo_provider(&self) -> Option<&dyn GeoHierarchyProvider> {
            Some(self)
        }
    }

    #[test]
    fn test_capabilities_in_declared_order() {
        let source = Everything {
            graph: GraphForm::new(),
            hierarchy: HierarchySourceForm::new("x.ch", vec![], 0).unwrap(),
            geo: GeoHierarchyForm::new("g.bin", "g.ch"),
        };
        assert_eq!(source.capabilities(), Capability::DECLARED_ORDER.to_vec());
    }

    #[test]
    fn test_capability_display() {
        assert_eq!(Capability::HierarchySource.to_string(), "hierarchy-source");
    }
}
