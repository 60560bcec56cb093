/// Hierarchy adapter over the Hierarchy-Source Form

use super::{AlgorithmError, AlgorithmResult, PathFinder};
use crate::engine::{ContractionHierarchyEngine, HierarchyEngine};
use crate::formats::{HierarchySourceForm, IndexedEdge, INF_WEIGHT};
use crate::types::Path;
use std::borrow::Cow;
use tracing::{debug, instrument};

/// Queries a prebuilt hierarchy; nodes are dense indices
///
/// The artifact is loaded once, when the adapter is created.
pub struct HierarchyIndex<'a, H = ContractionHierarchyEngine>
where
    H: HierarchyEngine,
{
    form: Cow<'a, HierarchySourceForm>,
    engine: H,
    handle: H::Handle,
}

impl<'a> HierarchyIndex<'a, ContractionHierarchyEngine> {
    pub fn new(form: &'a HierarchySourceForm) -> AlgorithmResult<Self> {
        Self::with_engine(form, ContractionHierarchyEngine::new())
    }
}

impl<'a, H> HierarchyIndex<'a, H>
where
    H: HierarchyEngine,
{
    /// Borrow a form and load its artifact with `engine`
    pub fn with_engine(form: &'a HierarchySourceForm, engine: H) -> AlgorithmResult<Self> {
        Self::load(Cow::Borrowed(form), engine)
    }

    #[instrument(skip_all, fields(artifact = %form.artifact().display(), nodes = form.number_of_nodes()))]
    fn load(form: Cow<'a, HierarchySourceForm>, engine: H) -> AlgorithmResult<Self> {
        let handle = engine.load(form.artifact())?;
        debug!("Hierarchy artifact loaded");
        Ok(Self { form, engine, handle })
    }

    pub fn form(&self) -> &HierarchySourceForm {
        &self.form
    }

    fn check_index(&self, role: &str, node: usize) -> AlgorithmResult<()> {
        if node >= self.form.number_of_nodes() {
            return Err(AlgorithmError::InvalidParameters(format!(
                "{} index {} is outside [0, {})",
                role,
                node,
                self.form.number_of_nodes()
            )));
        }
        Ok(())
    }
}

impl<H> HierarchyIndex<'static, H>
where
    H: HierarchyEngine,
{
    /// Take ownership of a form and load its artifact with `engine`
    pub fn owned(form: HierarchySourceForm, engine: H) -> AlgorithmResult<Self> {
        Self::load(Cow::Owned(form), engine)
    }
}

impl<'a, H> PathFinder for HierarchyIndex<'a, H>
where
    H: HierarchyEngine,
{
    type Node = usize;
    type Edge = IndexedEdge;

    fn find_shortest_path(
        &self,
        source: &usize,
        destination: &usize,
    ) -> AlgorithmResult<Option<Path<usize, IndexedEdge>>> {
        let (source, destination) = (*source, *destination);
        self.check_index("Source", source)?;
        self.check_index("Destination", destination)?;

        let answer = self.engine.query(&self.handle, source, destination)?;
        if answer.cost == u64::from(INF_WEIGHT) {
            debug!(source, destination, "No path");
            return Ok(None);
        }

        let edges = answer
            .edges
            .iter()
            .map(|&position| {
                self.form
                    .edge(position)
                    .copied()
                    .ok_or(AlgorithmError::UnresolvedEdge(position))
            })
            .collect::<AlgorithmResult<Vec<_>>>()?;

        let summed: u64 = edges.iter().map(|edge| u64::from(edge.weight)).sum();
        if summed != answer.cost {
            return Err(AlgorithmError::InconsistentCost {
                reported: answer.cost,
                summed,
            });
        }

        let mut nodes = Vec::with_capacity(edges.len() + 1);
        nodes.push(source);
        for edge in &edges {
            if nodes.last() != Some(&edge.source) {
                return Err(AlgorithmError::InconsistentPath(format!(
                    "edge {} -> {} does not continue at node {:?}",
                    edge.source,
                    edge.target,
                    nodes.last()
                )));
            }
            nodes.push(edge.target);
        }
        if nodes.last() != Some(&destination) {
            return Err(AlgorithmError::InconsistentPath(format!(
                "path ends at {:?} instead of {}",
                nodes.last(),
                destination
            )));
        }

        Ok(Some(Path::from_parts(nodes, edges, answer.cost as f64)?))
    }
}
