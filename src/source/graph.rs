/// Graph Form backed data source

use super::{
    Capability, DataSource, GraphFormProvider, JsonGraphDocument, SourceError, SourceResult,
};
use crate::formats::GraphForm;
use once_cell::unsync::OnceCell;
use std::fmt;
use std::hash::Hash;
use std::path::{Path, PathBuf};
use tracing::info;

type GraphLoader<V, K> = Box<dyn Fn() -> SourceResult<GraphForm<V, K>>>;

/// Source offering the Graph capability
///
/// The graph is either given up front or produced by a loader on first use.
pub struct GraphSource<V, K> {
    graph: OnceCell<GraphForm<V, K>>,
    loader: Option<GraphLoader<V, K>>,
    origin_file: Option<PathBuf>,
}

impl<V, K> GraphSource<V, K>
where
    V: Eq + Hash + Clone,
{
    /// Wrap a ready graph
    pub fn new(graph: GraphForm<V, K>) -> Self {
        Self {
            graph: OnceCell::from(graph),
            loader: None,
            origin_file: None,
        }
    }

    /// Produce the graph with `loader` when it is first needed
    pub fn lazy(loader: impl Fn() -> SourceResult<GraphForm<V, K>> + 'static) -> Self {
        Self {
            graph: OnceCell::new(),
            loader: Some(Box::new(loader)),
            origin_file: None,
        }
    }

    /// Record the file the graph comes from
    pub fn with_origin_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.origin_file = Some(path.into());
        self
    }

    /// Whether the graph has been produced yet
    pub fn is_loaded(&self) -> bool {
        self.graph.get().is_some()
    }
}

impl GraphSource<String, String> {
    /// Lazily load a JSON graph document from `path`
    pub fn from_json_file(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let loader_path = path.clone();
        Self::lazy(move || {
            let graph = JsonGraphDocument::from_file(&loader_path)?.into_graph_form()?;
            info!(
                file = %loader_path.display(),
                nodes = graph.node_count(),
                edges = graph.edge_count(),
                "Loaded JSON graph"
            );
            Ok(graph)
        })
        .with_origin_file(path)
    }
}

impl<V, K> GraphFormProvider<V, K> for GraphSource<V, K>
where
    V: Eq + Hash + Clone,
{
    fn graph_form(&self) -> SourceResult<&GraphForm<V, K>> {
        self.graph.get_or_try_init(|| match &self.loader {
            Some(loader) => loader(),
            None => Err(SourceError::Configuration("graph source has no loader".to_string())),
        })
    }

    fn origin_file(&self) -> Option<&Path> {
        self.origin_file.as_deref()
    }
}

impl<V, K> DataSource for GraphSource<V, K>
where
    V: Eq + Hash + Clone + 'static,
    K: 'static,
{
    type Node = V;
    type EdgeKey = K;

    fn node_count(&self) -> SourceResult<usize> {
        Ok(self.graph_form()?.node_count())
    }

    fn graph_provider(&self) -> Option<&dyn GraphFormProvider<V, K>> {
        Some(self)
    }

    fn capabilities(&self) -> Vec<Capability> {
        vec![Capability::Graph]
    }
}

impl<V, K> fmt::Debug for GraphSource<V, K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GraphSource")
            .field("graph", &self.graph.get())
            .field("origin_file", &self.origin_file)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;
    use tempfile::TempDir;

    #[test]
    fn test_lazy_loader_runs_once() {
        let calls = Rc::new(Cell::new(0));
        let counter = Rc::clone(&calls);
        let source = GraphSource::lazy(move || {
            counter.set(counter.get() + 1);
            Ok(GraphForm::from_edges(vec![(1u32, 2u32, (), 1.0)])?)
        });

        assert!(!source.is_loaded());
        let first = source.graph_form().unwrap() as *const _;
        let second = source.graph_form().unwrap() as *const _;
        assert_eq!(first, second);
        assert_eq!(source.node_count().unwrap(), 2);
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn test_failed_load_is_retried() {
        let calls = Rc::new(Cell::new(0));
        let counter = Rc::clone(&calls);
        let source: GraphSource<u32, ()> = GraphSource::lazy(move || {
            counter.set(counter.get() + 1);
            Err(SourceError::Configuration("offline".to_string()))
        });

        assert!(source.graph_form().is_err());
        assert!(source.node_count().is_err());
        assert_eq!(calls.get(), 2);
    }

    #[test]
    fn test_from_json_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("hall.json");
        std::fs::write(
            &path,
            r#"{"edges": [{"source": "a", "target": "b", "weight": 1.0}]}"#,
        )
        .unwrap();

        let source = GraphSource::from_json_file(&path);
        assert_eq!(source.origin_file(), Some(path.as_path()));
        assert_eq!(source.capabilities(), vec![Capability::Graph]);
        assert_eq!(source.node_count().unwrap(), 2);
    }

    #[test]
    fn test_missing_json_file() {
        let source = GraphSource::from_json_file("/nonexistent/graph.json");
        assert!(matches!(source.node_count(), Err(SourceError::Io(_))));
    }
}
