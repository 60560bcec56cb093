/// Graph Form to Hierarchy-Source Form conversion
///
/// Steps:
/// 1. Quantize edge weights to integers (`round(weight * scaling_factor)`)
/// 2. Collapse parallel edges, keeping the lightest
/// 3. Index nodes densely in graph insertion order
/// 4. Sort the edge list and hash it
/// 5. Reuse `{cache_dir}/{tag}.{hash}.ch` or build it through the engine

pub mod cache;
pub mod simplify;

pub use cache::{artifact_path, ensure_artifact, structural_hash};
pub use simplify::quantize;

use crate::engine::{EngineError, HierarchyEngine};
use crate::formats::{FormatError, GraphForm, HierarchySourceForm};
use std::collections::HashMap;
use std::hash::Hash;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, instrument};

/// Default factor applied to float weights before rounding
pub const DEFAULT_SCALING_FACTOR: u32 = 1_000_000;

/// Tag used for artifact file names when no origin is known
pub const DEFAULT_ORIGIN_TAG: &str = "graph";

/// Conversion errors
#[derive(Error, Debug)]
pub enum ConversionError {
    #[error("Scaling factor must be positive, got {0}")]
    InvalidScalingFactor(u32),

    #[error("Weight {weight} scaled by {scaling_factor} does not fit the integer weight range")]
    WeightOutOfRange { weight: f64, scaling_factor: u32 },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error(transparent)]
    Format(#[from] FormatError),
}

pub type ConversionResult<T> = Result<T, ConversionError>;

/// Conversion parameters
#[derive(Debug, Clone, PartialEq)]
pub struct ConversionOptions {
    pub scaling_factor: u32,
    /// Artifact file name prefix, `"graph"` if unset
    pub origin_tag: Option<String>,
    /// Artifact directory, the OS temp dir if unset
    pub cache_dir: Option<PathBuf>,
}

impl Default for ConversionOptions {
    fn default() -> Self {
        Self {
            scaling_factor: DEFAULT_SCALING_FACTOR,
            origin_tag: None,
            cache_dir: None,
        }
    }
}

impl ConversionOptions {
    /// Name artifacts after the file a graph was loaded from and keep them next to it
    pub fn for_origin_file(path: &Path) -> Self {
        let origin_tag = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned());
        let cache_dir = path
            .parent()
            .map(|parent| {
                if parent.as_os_str().is_empty() {
                    PathBuf::from(".")
                } else {
                    parent.to_path_buf()
                }
            });
        Self {
            origin_tag,
            cache_dir,
            ..Self::default()
        }
    }

    pub fn with_scaling_factor(mut self, scaling_factor: u32) -> Self {
        self.scaling_factor = scaling_factor;
        self
    }

    pub fn with_cache_dir(mut self, cache_dir: impl Into<PathBuf>) -> Self {
        self.cache_dir = Some(cache_dir.into());
        self
    }

    pub fn with_origin_tag(mut self, origin_tag: impl Into<String>) -> Self {
        self.origin_tag = Some(origin_tag.into());
        self
    }

    pub fn tag(&self) -> &str {
        self.origin_tag.as_deref().unwrap_or(DEFAULT_ORIGIN_TAG)
    }

    pub fn resolved_cache_dir(&self) -> PathBuf {
        self.cache_dir.clone().unwrap_or_else(std::env::temp_dir)
    }
}

/// Bijection between caller nodes and dense indices `0..n`
#[derive(Debug, Clone)]
pub struct NodeIndexMap<V> {
    forward: HashMap<V, usize>,
    inverse: Vec<V>,
}

impl<V> PartialEq for NodeIndexMap<V>
where
    V: Eq + Hash,
{
    fn eq(&self, other: &Self) -> bool {
        // the forward map is derived from the inverse
        self.inverse == other.inverse
    }
}

impl<V> NodeIndexMap<V>
where
    V: Eq + Hash + Clone,
{
    /// Index nodes in iteration order; repeated nodes keep their first index
    pub fn from_nodes(nodes: impl IntoIterator<Item = V>) -> Self {
        let mut forward = HashMap::new();
        let mut inverse = Vec::new();
        for node in nodes {
            if !forward.contains_key(&node) {
                forward.insert(node.clone(), inverse.len());
                inverse.push(node);
            }
        }
        Self { forward, inverse }
    }

    pub fn index_of(&self, node: &V) -> Option<usize> {
        self.forward.get(node).copied()
    }

    pub fn node(&self, index: usize) -> Option<&V> {
        self.inverse.get(index)
    }

    pub fn len(&self) -> usize {
        self.inverse.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inverse.is_empty()
    }

    /// Nodes ordered by index
    pub fn nodes(&self) -> &[V] {
        &self.inverse
    }
}

/// Result of a conversion: the form plus the node mapping used to build it
#[derive(Debug, Clone)]
pub struct Conversion<V> {
    pub form: HierarchySourceForm,
    pub index: NodeIndexMap<V>,
}

/// Convert a Graph Form, building the hierarchy artifact unless it is cached
///
/// # Arguments
/// * `graph` - Graph to convert
/// * `engine` - Engine used to build a missing artifact
/// * `options` - Scaling factor and cache location
///
/// # Errors
/// * `ConversionError::InvalidScalingFactor` - scaling factor is zero
/// * `ConversionError::WeightOutOfRange` - a quantized weight does not fit
/// * I/O and engine build errors are passed through
#[instrument(skip_all, fields(nodes = graph.node_count(), edges = graph.edge_count(), tag = options.tag()))]
pub fn convert_to_hierarchy_source<V, K, H>(
    graph: &GraphForm<V, K>,
    engine: &H,
    options: &ConversionOptions,
) -> ConversionResult<Conversion<V>>
where
    V: Eq + Hash + Clone,
    H: HierarchyEngine,
{
    if options.scaling_factor == 0 {
        return Err(ConversionError::InvalidScalingFactor(options.scaling_factor));
    }

    let simplified = simplify::simplify(graph, options.scaling_factor)?;
    let number_of_nodes = simplified.index.len();
    let hash = structural_hash(number_of_nodes, &simplified.edges);
    let artifact = artifact_path(&options.resolved_cache_dir(), options.tag(), &hash);
    debug!(
        hash = %hash,
        simplified_edges = simplified.edges.len(),
        "Graph simplified"
    );

    ensure_artifact(engine, number_of_nodes, &simplified.edges, &artifact)?;

    let form = HierarchySourceForm::new(artifact, simplified.edges, number_of_nodes)?;
    Ok(Conversion {
        form,
        index: simplified.index,
    })
}
