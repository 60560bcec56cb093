/// Geo-Hierarchy Form: a routing graph file plus its prebuilt hierarchy

use std::path::{Path, PathBuf};

/// Files a geo routing engine opens; nodes are addressed by `GeoCoords`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeoHierarchyForm {
    pub graph_file: PathBuf,
    pub hierarchy_file: PathBuf,
}

impl GeoHierarchyForm {
    pub fn new(graph_file: impl Into<PathBuf>, hierarchy_file: impl Into<PathBuf>) -> Self {
        Self {
            graph_file: graph_file.into(),
            hierarchy_file: hierarchy_file.into(),
        }
    }

    pub fn graph_file(&self) -> &Path {
        &self.graph_file
    }

    pub fn hierarchy_file(&self) -> &Path {
        &self.hierarchy_file
    }
}
