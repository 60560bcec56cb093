/// Content-addressed hierarchy artifact cache
///
/// Artifacts live at `{cache_dir}/{tag}.{hash}.ch` where `hash` is the first
/// four bytes of a BLAKE3 digest over the simplified edge list, hex encoded.
/// Presence of the file is a cache hit; entries are never invalidated.

use super::ConversionResult;
use crate::engine::HierarchyEngine;
use crate::formats::IndexedEdge;
use blake3::Hasher;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

const HASH_DOMAIN: &[u8] = b"generalized-pathfinding:hierarchy-source:v1";

/// Structural hash of an indexed graph, 8 lowercase hex characters
///
/// Only the node count and the sorted edge list enter the hash, never node
/// identities, so relabelled but isomorphically indexed graphs share artifacts.
pub fn structural_hash(number_of_nodes: usize, edges: &[IndexedEdge]) -> String {
    let mut hasher = Hasher::new();
    hasher.update(HASH_DOMAIN);
    hasher.update(&(number_of_nodes as u64).to_le_bytes());
    hasher.update(&(edges.len() as u64).to_le_bytes());
    for edge in edges {
        hasher.update(&(edge.source as u64).to_le_bytes());
        hasher.update(&(edge.target as u64).to_le_bytes());
        hasher.update(&edge.weight.to_le_bytes());
    }
    hex::encode(&hasher.finalize().as_bytes()[..4])
}

/// Cache file location for a tag and structural hash
pub fn artifact_path(cache_dir: &Path, tag: &str, hash: &str) -> PathBuf {
    cache_dir.join(format!("{}.{}.ch", tag, hash))
}

/// Make sure a built artifact exists at `path`
///
/// Builds into a temporary file next to `path` and renames it into place, so
/// readers never observe a partial artifact. Returns `true` if a build ran.
pub fn ensure_artifact<H: HierarchyEngine>(
    engine: &H,
    number_of_nodes: usize,
    edges: &[IndexedEdge],
    path: &Path,
) -> ConversionResult<bool> {
    if path.exists() {
        info!(artifact = %path.display(), "Reusing cached hierarchy artifact");
        return Ok(false);
    }

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    fs::create_dir_all(&dir)?;

    let staging = tempfile::Builder::new()
        .prefix(".building-")
        .suffix(".ch")
        .tempfile_in(&dir)?;
    engine.build(number_of_nodes, edges, staging.path())?;
    staging.persist(path).map_err(|e| e.error)?;

    info!(
        artifact = %path.display(),
        nodes = number_of_nodes,
        edges = edges.len(),
        "Built hierarchy artifact"
    );
    Ok(true)
}
