/// Hierarchy adapter over a Graph Form
///
/// Converts the graph once (reusing a cached artifact when possible), then
/// answers queries through `HierarchyIndex` and maps results back to the
/// caller's node identities and edge keys.

use super::{AlgorithmError, AlgorithmResult, HierarchyIndex, PathFinder};
use crate::conversion::{convert_to_hierarchy_source, quantize, ConversionOptions, NodeIndexMap};
use crate::engine::{ContractionHierarchyEngine, HierarchyEngine};
use crate::formats::GraphForm;
use crate::types::Path;
use std::fmt::Debug;
use std::hash::Hash;
use tracing::instrument;

pub struct GraphHierarchy<'a, V, K, H = ContractionHierarchyEngine>
where
    H: HierarchyEngine,
{
    graph: &'a GraphForm<V, K>,
    index: NodeIndexMap<V>,
    scaling_factor: u32,
    hierarchy: HierarchyIndex<'static, H>,
}

impl<'a, V, K> GraphHierarchy<'a, V, K, ContractionHierarchyEngine>
where
    V: Eq + Hash + Clone,
{
    pub fn new(graph: &'a GraphForm<V, K>, options: &ConversionOptions) -> AlgorithmResult<Self> {
        Self::with_engine(graph, ContractionHierarchyEngine::new(), options)
    }
}

impl<'a, V, K, H> GraphHierarchy<'a, V, K, H>
where
    V: Eq + Hash + Clone,
    H: HierarchyEngine,
{
    #[instrument(skip_all, fields(nodes = graph.node_count(), scaling_factor = options.scaling_factor))]
    pub fn with_engine(graph: &'a GraphForm<V, K>, engine: H, options: &ConversionOptions) -> AlgorithmResult<Self> {
        let conversion = convert_to_hierarchy_source(graph, &engine, options)?;
        let hierarchy = HierarchyIndex::owned(conversion.form, engine)?;
        Ok(Self {
            graph,
            index: conversion.index,
            scaling_factor: options.scaling_factor,
            hierarchy,
        })
    }

    /// Node mapping used for the hierarchy
    pub fn node_index(&self) -> &NodeIndexMap<V> {
        &self.index
    }

    pub fn hierarchy(&self) -> &HierarchyIndex<'static, H> {
        &self.hierarchy
    }

    fn index_of(&self, role: &str, node: &V) -> AlgorithmResult<usize>
    where
        V: Debug,
    {
        self.index.index_of(node).ok_or_else(|| {
            AlgorithmError::InvalidParameters(format!("{} node {:?} not found", role, node))
        })
    }

    /// First parallel edge in insertion order whose quantized weight is `weight`
    fn original_key(&self, source: &V, target: &V, weight: u32) -> AlgorithmResult<K>
    where
        V: Debug,
        K: Clone,
    {
        for edge in self.graph.parallel_edges(source, target) {
            if quantize(edge.weight, self.scaling_factor)? == weight {
                return Ok(edge.key.clone());
            }
        }
        Err(AlgorithmError::InconsistentPath(format!(
            "no edge {:?} -> {:?} with quantized weight {}",
            source, target, weight
        )))
    }
}

impl<'a, V, K, H> PathFinder for GraphHierarchy<'a, V, K, H>
where
    V: Eq + Hash + Clone + Debug,
    K: Clone,
    H: HierarchyEngine,
{
    type Node = V;
    type Edge = K;

    fn find_shortest_path(&self, source: &V, destination: &V) -> AlgorithmResult<Option<Path<V, K>>> {
        let s = self.index_of("Source", source)?;
        let t = self.index_of("Destination", destination)?;

        let Some(indexed) = self.hierarchy.find_shortest_path(&s, &t)? else {
            return Ok(None);
        };

        let nodes = indexed
            .nodes
            .iter()
            .map(|&i| {
                self.index.node(i).cloned().ok_or_else(|| {
                    AlgorithmError::InconsistentPath(format!("node index {} has no node", i))
                })
            })
            .collect::<AlgorithmResult<Vec<V>>>()?;

        let edges = nodes
            .windows(2)
            .zip(&indexed.edges)
            .map(|(pair, edge)| self.original_key(&pair[0], &pair[1], edge.weight))
            .collect::<AlgorithmResult<Vec<K>>>()?;

        let cost = indexed.cost / f64::from(self.scaling_factor);
        Ok(Some(Path::from_parts(nodes, edges, cost)?))
    }
}
