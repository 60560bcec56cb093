/// Generalized Path Finding
///
/// Shortest path dispatch over heterogeneous graph sources and routing
/// engines, with a cached conversion from weighted multigraphs to the integer
/// edge lists hierarchy engines consume.
///
/// # Architecture
///
/// ```text
/// ┌──────────────────────────────────────────────────┐
/// │           Generalized Path Finding               │
/// ├──────────────────────────────────────────────────┤
/// │  ┌────────────────────────────────┐              │
/// │  │   DataSource (capabilities)    │              │
/// │  └────────────┬───────────────────┘              │
/// │               ↓                                  │
/// │  ┌────────────────────────────────┐              │
/// │  │   Dispatcher (decision table)  │              │
/// │  └────────────┬───────────────────┘              │
/// │               ↓                                  │
/// │  ┌────────────────────────────────┐              │
/// │  │   Adapters + Converter (cache) │              │
/// │  └────────────┬───────────────────┘              │
/// │               ↓                                  │
/// │  ┌────────────────────────────────┐              │
/// │  │   Engines (A*, CH, geo router) │              │
/// │  └────────────────────────────────┘              │
/// └──────────────────────────────────────────────────┘
/// ```
///
/// # Modules
///
/// - `types`: Path and node position types
/// - `formats`: Graph Form, Hierarchy-Source Form, Geo-Hierarchy Form
/// - `source`: DataSource capability interface and shipped sources
/// - `conversion`: Graph Form to Hierarchy-Source Form with artifact cache
/// - `engine`: Search, hierarchy and geo routing engines
/// - `algorithms`: Engine adapters implementing `PathFinder`
/// - `dispatch`: Algorithm selection and adapter construction
/// - `config`: Options and logging setup

pub mod types;
pub mod formats;
pub mod source;
pub mod conversion;
pub mod engine;
pub mod algorithms;
pub mod dispatch;
pub mod config;

// Re-export commonly used types
pub use types::{path_from_node_list, GeoCoords, Path, PathError, Vda5050Position};

// Re-export format types
pub use formats::{FormatError, GeoHierarchyForm, GraphForm, HierarchySourceForm, IndexedEdge, INF_WEIGHT};

// Re-export source types
pub use source::{
    Capability, DataSource, EdgeListSource, GeoArtifactSource, GraphSource, SourceError, SourceResult,
};

// Re-export conversion types
pub use conversion::{
    convert_to_hierarchy_source, Conversion, ConversionError, ConversionOptions, ConversionResult, NodeIndexMap,
};

// Re-export engine types
pub use engine::{
    AStarEngine, ContractionHierarchyEngine, CoordinateRoutingEngine, EngineError, EngineResult, GeoArc,
    HierarchyEngine, Route, SearchEngine,
};

// Re-export algorithm types
pub use algorithms::{AStar, AlgorithmError, AlgorithmResult, GeoHierarchy, GraphHierarchy, HierarchyIndex, PathFinder};

// Re-export dispatch types
pub use dispatch::{create_path_finder, select, Algorithm, AnyPathFinder, EngineKind, SizeRule};

pub use config::{ConfigError, LoggingConfig, PathFinderOptions};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
