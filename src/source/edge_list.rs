/// Hierarchy-Source Form backed data source

use super::{Capability, DataSource, HierarchySourceProvider, SourceError, SourceResult};
use crate::conversion::{convert_to_hierarchy_source, ConversionOptions, NodeIndexMap};
use crate::engine::HierarchyEngine;
use crate::formats::{GraphForm, HierarchySourceForm, IndexedEdge};
use once_cell::unsync::OnceCell;
use std::fmt;
use std::hash::Hash;

type FormLoader = Box<dyn Fn() -> SourceResult<HierarchySourceForm>>;

/// Source offering the HierarchySource capability; nodes are dense indices
pub struct EdgeListSource {
    form: OnceCell<HierarchySourceForm>,
    loader: Option<FormLoader>,
}

impl EdgeListSource {
    pub fn new(form: HierarchySourceForm) -> Self {
        Self {
            form: OnceCell::from(form),
            loader: None,
        }
    }

    pub fn lazy(loader: impl Fn() -> SourceResult<HierarchySourceForm> + 'static) -> Self {
        Self {
            form: OnceCell::new(),
            loader: Some(Box::new(loader)),
        }
    }

    /// Convert a Graph Form, returning the source and the node mapping
    pub fn from_graph_form<V, K, H>(
        graph: &GraphForm<V, K>,
        engine: &H,
        options: &ConversionOptions,
    ) -> SourceResult<(Self, NodeIndexMap<V>)>
    where
        V: Eq + Hash + Clone,
        H: HierarchyEngine,
    {
        let conversion = convert_to_hierarchy_source(graph, engine, options)?;
        Ok((Self::new(conversion.form), conversion.index))
    }
}

impl HierarchySourceProvider for EdgeListSource {
    fn hierarchy_source(&self) -> SourceResult<&HierarchySourceForm> {
        self.form.get_or_try_init(|| match &self.loader {
            Some(loader) => loader(),
            None => Err(SourceError::Configuration("edge list source has no loader".to_string())),
        })
    }
}

impl DataSource for EdgeListSource {
    type Node = usize;
    type EdgeKey = IndexedEdge;

    fn node_count(&self) -> SourceResult<usize> {
        Ok(self.hierarchy_source()?.number_of_nodes())
    }

    fn hierarchy_provider(&self) -> Option<&dyn HierarchySourceProvider> {
        Some(self)
    }

    fn capabilities(&self) -> Vec<Capability> {
        vec![Capability::HierarchySource]
    }
}

impl fmt::Debug for EdgeListSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EdgeListSource")
            .field("form", &self.form.get())
            .finish()
    }
}
