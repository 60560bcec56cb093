/// Geo-Hierarchy Form backed data source

use super::{Capability, DataSource, GeoHierarchyProvider, SourceError, SourceResult};
use crate::engine::{GeoArc, GeoRoutingGraph};
use crate::formats::GeoHierarchyForm;
use crate::types::GeoCoords;
use once_cell::unsync::OnceCell;
use std::path::PathBuf;

/// Source over a prepared routing graph file and hierarchy file
///
/// The hierarchy is built on travel time. Requesting the form with
/// `time_cost` disabled is a configuration error.
#[derive(Debug)]
pub struct GeoArtifactSource {
    form: GeoHierarchyForm,
    time_cost: bool,
    node_count: OnceCell<usize>,
}

impl GeoArtifactSource {
    pub fn new(graph_file: impl Into<PathBuf>, hierarchy_file: impl Into<PathBuf>) -> Self {
        Self {
            form: GeoHierarchyForm::new(graph_file, hierarchy_file),
            time_cost: true,
            node_count: OnceCell::new(),
        }
    }

    pub fn from_form(form: GeoHierarchyForm) -> Self {
        Self {
            form,
            time_cost: true,
            node_count: OnceCell::new(),
        }
    }

    /// Whether the hierarchy optimizes travel time
    pub fn with_time_cost(mut self, time_cost: bool) -> Self {
        self.time_cost = time_cost;
        self
    }
}

impl GeoHierarchyProvider for GeoArtifactSource {
    fn geo_hierarchy(&self) -> SourceResult<&GeoHierarchyForm> {
        if !self.time_cost {
            return Err(SourceError::Configuration(
                "geo hierarchy data requires time_cost; distance-optimal hierarchies are not supported"
                    .to_string(),
            ));
        }
        Ok(&self.form)
    }
}

impl DataSource for GeoArtifactSource {
    type Node = GeoCoords;
    type EdgeKey = GeoArc;

    fn node_count(&self) -> SourceResult<usize> {
        self.node_count
            .get_or_try_init(|| Ok::<_, SourceError>(GeoRoutingGraph::load(self.form.graph_file())?.nodes.len()))
            .copied()
    }

    fn geo_provider(&self) -> Option<&dyn GeoHierarchyProvider> {
        Some(self)
    }

    fn capabilities(&self) -> Vec<Capability> {
        vec![Capability::GeoHierarchy]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_node_count_from_graph_file() {
        let dir = TempDir::new().unwrap();
        let graph_file = dir.path().join("g.bin");
        let mut graph = GeoRoutingGraph::new();
        graph.add_node(GeoCoords::new(1.0, 2.0), 1);
        graph.add_node(GeoCoords::new(1.0, 2.001), 2);
        graph.store(&graph_file).unwrap();

        let source = GeoArtifactSource::new(&graph_file, dir.path().join("g.ch"));
        assert_eq!(source.node_count().unwrap(), 2);
        assert_eq!(source.capabilities(), vec![Capability::GeoHierarchy]);
        assert!(source.geo_hierarchy().is_ok());
    }

    #[test]
    fn test_distance_cost_is_a_configuration_error() {
        let source = GeoArtifactSource::new("g.bin", "g.ch").with_time_cost(false);
        assert!(matches!(source.geo_hierarchy(), Err(SourceError::Configuration(_))));
    }
}
