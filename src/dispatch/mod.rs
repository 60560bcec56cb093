/// Engine dispatcher
///
/// Maps a requested algorithm and the capabilities of a data source to the
/// engine adapter that will answer queries:
///
/// | Algorithm            | GeoHierarchy | HierarchySource | Graph          |
/// |----------------------|--------------|-----------------|----------------|
/// | AStar                | -            | -               | AStar          |
/// | ContractionHierarchy | GeoHierarchy | HierarchyIndex  | GraphHierarchy |
/// | Auto                 | GeoHierarchy | HierarchyIndex  | by size        |
///
/// Capabilities are tried in declared order; the first one the algorithm
/// accepts decides.

use crate::algorithms::{
    AStar, AlgorithmError, AlgorithmResult, GeoHierarchy, GraphHierarchy, HierarchyIndex, PathFinder,
};
use crate::config::PathFinderOptions;
use crate::source::DataSource;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fmt::Debug;
use std::hash::Hash;
use std::str::FromStr;
use tracing::info;

pub use crate::source::Capability;

/// Algorithm requested by the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Algorithm {
    #[serde(alias = "astar")]
    AStar,
    #[serde(alias = "ch")]
    ContractionHierarchy,
    Auto,
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Algorithm::AStar => "astar",
            Algorithm::ContractionHierarchy => "contraction_hierarchy",
            Algorithm::Auto => "auto",
        };
        f.write_str(name)
    }
}

impl FromStr for Algorithm {
    type Err = AlgorithmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('-', "_").as_str() {
            "astar" | "a_star" | "a*" => Ok(Algorithm::AStar),
            "ch" | "contraction_hierarchy" => Ok(Algorithm::ContractionHierarchy),
            "auto" => Ok(Algorithm::Auto),
            other => Err(AlgorithmError::InvalidParameters(format!("Unknown algorithm: {}", other))),
        }
    }
}

/// Adapter chosen by the dispatcher
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EngineKind {
    AStar,
    HierarchyIndex,
    GraphHierarchy,
    GeoHierarchy,
}

impl fmt::Display for EngineKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EngineKind::AStar => "a_star",
            EngineKind::HierarchyIndex => "hierarchy_index",
            EngineKind::GraphHierarchy => "graph_hierarchy",
            EngineKind::GeoHierarchy => "geo_hierarchy",
        };
        f.write_str(name)
    }
}

/// Entry of the decision table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Engine(EngineKind),
    /// Decide on the node count through a `SizeRule`
    BySize,
}

/// Decision for one algorithm/capability pair, `None` if unsupported
pub fn decide(algorithm: Algorithm, capability: Capability) -> Option<Decision> {
    use Algorithm as A;
    use Capability as C;

    match (algorithm, capability) {
        (A::AStar, C::Graph) => Some(Decision::Engine(EngineKind::AStar)),
        (A::AStar, _) => None,
        (A::ContractionHierarchy | A::Auto, C::GeoHierarchy) => Some(Decision::Engine(EngineKind::GeoHierarchy)),
        (A::ContractionHierarchy | A::Auto, C::HierarchySource) => {
            Some(Decision::Engine(EngineKind::HierarchyIndex))
        }
        (A::ContractionHierarchy, C::Graph) => Some(Decision::Engine(EngineKind::GraphHierarchy)),
        (A::Auto, C::Graph) => Some(Decision::BySize),
    }
}

/// Default thresholds for `Auto` on Graph sources
pub const DEFAULT_AUTO_THRESHOLDS: [(usize, EngineKind); 2] =
    [(0, EngineKind::AStar), (10_000, EngineKind::GraphHierarchy)];

/// Pick an engine by node count: the largest threshold not above the count wins
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SizeRule {
    pub thresholds: Vec<(usize, EngineKind)>,
}

impl SizeRule {
    pub fn new(thresholds: Vec<(usize, EngineKind)>) -> Self {
        Self { thresholds }
    }

    pub fn pick(&self, node_count: usize) -> AlgorithmResult<EngineKind> {
        self.thresholds
            .iter()
            .filter(|(threshold, _)| *threshold <= node_count)
            .max_by_key(|(threshold, _)| *threshold)
            .map(|(_, kind)| *kind)
            .ok_or(AlgorithmError::NoThresholdMatch { node_count })
    }
}

impl Default for SizeRule {
    fn default() -> Self {
        Self::new(DEFAULT_AUTO_THRESHOLDS.to_vec())
    }
}

/// Select the adapter for `algorithm` on `source`
///
/// # Errors
/// * `AlgorithmError::Incompatible` - no capability of the source is accepted
/// * `AlgorithmError::NoThresholdMatch` - size rule has no threshold below the node count
pub fn select<S>(source: &S, algorithm: Algorithm, rule: &SizeRule) -> AlgorithmResult<EngineKind>
where
    S: DataSource,
{
    let capabilities = source.capabilities();

    for &capability in &capabilities {
        let kind = match decide(algorithm, capability) {
            None => continue,
            Some(Decision::Engine(kind)) => kind,
            Some(Decision::BySize) => rule.pick(source.node_count()?)?,
        };
        info!(%algorithm, %capability, engine = %kind, "Selected path finder");
        return Ok(kind);
    }

    Err(AlgorithmError::Incompatible {
        algorithm,
        capabilities,
    })
}

/// Any adapter the dispatcher can build for a source
pub enum AnyPathFinder<'a, V, K> {
    AStar(AStar<'a, V, K>),
    GraphHierarchy(GraphHierarchy<'a, V, K>),
    HierarchyIndex(HierarchyIndex<'a>),
    GeoHierarchy(GeoHierarchy<'a>),
}

impl<'a, V, K> AnyPathFinder<'a, V, K>
where
    V: Eq + Hash + Clone + Debug,
    K: Clone,
{
    pub fn kind(&self) -> EngineKind {
        match self {
            AnyPathFinder::AStar(_) => EngineKind::AStar,
            AnyPathFinder::GraphHierarchy(_) => EngineKind::GraphHierarchy,
            AnyPathFinder::HierarchyIndex(_) => EngineKind::HierarchyIndex,
            AnyPathFinder::GeoHierarchy(_) => EngineKind::GeoHierarchy,
        }
    }

    /// Adapter speaking the source's own node and edge types
    pub fn as_graph_finder(&self) -> Option<&dyn PathFinder<Node = V, Edge = K>> {
        match self {
            AnyPathFinder::AStar(finder) => Some(finder),
            AnyPathFinder::GraphHierarchy(finder) => Some(finder),
            _ => None,
        }
    }

    pub fn as_hierarchy_index(&self) -> Option<&HierarchyIndex<'a>> {
        match self {
            AnyPathFinder::HierarchyIndex(finder) => Some(finder),
            _ => None,
        }
    }

    pub fn as_geo_hierarchy(&self) -> Option<&GeoHierarchy<'a>> {
        match self {
            AnyPathFinder::GeoHierarchy(finder) => Some(finder),
            _ => None,
        }
    }
}

impl<'a, V, K> fmt::Debug for AnyPathFinder<'a, V, K>
where
    V: Eq + Hash + Clone + Debug,
    K: Clone,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("AnyPathFinder").field(&self.kind()).finish()
    }
}

/// Select and construct the adapter for `algorithm` on `source`
///
/// Construction pulls the required form from the source and, for
/// `GraphHierarchy`, converts it (building or reusing the cached artifact).
pub fn create_path_finder<'a, S>(
    source: &'a S,
    algorithm: Algorithm,
    options: &PathFinderOptions,
) -> AlgorithmResult<AnyPathFinder<'a, S::Node, S::EdgeKey>>
where
    S: DataSource,
    S::Node: Eq + Hash + Clone + Debug,
    S::EdgeKey: Clone,
{
    let kind = select(source, algorithm, &options.size_rule())?;
    let missing = || AlgorithmError::Incompatible {
        algorithm,
        capabilities: source.capabilities(),
    };

    let finder = match kind {
        EngineKind::AStar => {
            let provider = source.graph_provider().ok_or_else(missing)?;
            AnyPathFinder::AStar(AStar::new(provider.graph_form()?))
        }
        EngineKind::GraphHierarchy => {
            let provider = source.graph_provider().ok_or_else(missing)?;
            let conversion = options.conversion_options(provider.origin_file());
            AnyPathFinder::GraphHierarchy(GraphHierarchy::new(provider.graph_form()?, &conversion)?)
        }
        EngineKind::HierarchyIndex => {
            let provider = source.hierarchy_provider().ok_or_else(missing)?;
            AnyPathFinder::HierarchyIndex(HierarchyIndex::new(provider.hierarchy_source()?)?)
        }
        EngineKind::GeoHierarchy => {
            let provider = source.geo_provider().ok_or_else(missing)?;
            AnyPathFinder::GeoHierarchy(
                GeoHierarchy::new(provider.geo_hierarchy()?)
                    .with_matching_radius(options.matching_radius_m)
                    .with_time_cost(options.return_time_cost),
            )
        }
    };

    Ok(finder)
}
