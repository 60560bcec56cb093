/// Contraction hierarchy engine
///
/// Nodes are contracted one at a time in order of their edge difference.
/// Contracting `v` adds a shortcut `u -> w` for every pair of neighbours whose
/// shortest connection runs through `v`, unless a witness path avoiding `v`
/// is found. Queries run an upward Dijkstra from both ends and meet at the
/// highest-ranked node of the shortest path; shortcuts are unpacked back to
/// positions in the original edge list.
///
/// Artifacts are `bincode`-encoded `HierarchyArtifact` values.

use super::{EngineError, EngineResult, HierarchyEngine, HierarchyQuery};
use crate::formats::{IndexedEdge, INF_WEIGHT};
use pathfinding::directed::dijkstra::dijkstra_partial;
use serde::{Deserialize, Serialize};
use std::cmp::{Ordering, Reverse};
use std::collections::{BinaryHeap, HashMap, HashSet};
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;
use tracing::{debug, info};

/// Default number of nodes a witness search may settle
pub const DEFAULT_WITNESS_SETTLE_LIMIT: usize = 500;

/// How an arc expands into original edges
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
enum Unpack {
    /// Position in the input edge list
    Original(usize),
    /// Two lower arcs (by arc id) whose concatenation this arc replaces
    Shortcut(usize, usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
struct HierarchyArc {
    tail: usize,
    head: usize,
    weight: u64,
    unpack: Unpack,
}

/// On-disk representation of a hierarchy
#[derive(Debug, Serialize, Deserialize)]
struct HierarchyArtifact {
    number_of_nodes: usize,
    rank: Vec<usize>,
    arcs: Vec<HierarchyArc>,
}

/// A loaded hierarchy, ready for queries
#[derive(Debug)]
pub struct ContractionHierarchy {
    number_of_nodes: usize,
    arcs: Vec<HierarchyArc>,
    /// Arcs leading to a higher-ranked head, per tail
    upward: Vec<Vec<usize>>,
    /// Arcs coming from a higher-ranked tail, per head
    downward: Vec<Vec<usize>>,
}

impl ContractionHierarchy {
    pub fn number_of_nodes(&self) -> usize {
        self.number_of_nodes
    }

    /// Number of arcs including shortcuts
    pub fn arc_count(&self) -> usize {
        self.arcs.len()
    }

    fn from_artifact(artifact: HierarchyArtifact, path: &Path) -> EngineResult<Self> {
        let invalid = |reason: String| EngineError::InvalidArtifact {
            path: path.to_path_buf(),
            reason,
        };

        let HierarchyArtifact {
            number_of_nodes,
            rank,
            arcs,
        } = artifact;

        if rank.len() != number_of_nodes {
            return Err(invalid(format!(
                "{} ranks for {} nodes",
                rank.len(),
                number_of_nodes
            )));
        }
        let mut seen = vec![false; number_of_nodes];
        for &r in &rank {
            if r >= number_of_nodes || std::mem::replace(&mut seen[r], true) {
                return Err(invalid(format!("rank {} is not a permutation entry", r)));
            }
        }

        let mut upward = vec![Vec::new(); number_of_nodes];
        let mut downward = vec![Vec::new(); number_of_nodes];
        for (id, arc) in arcs.iter().enumerate() {
            if arc.tail >= number_of_nodes || arc.head >= number_of_nodes {
                return Err(invalid(format!("arc {} leaves the node range", id)));
            }
            if let Unpack::Shortcut(first, second) = arc.unpack {
                if first >= id || second >= id {
                    return Err(invalid(format!("shortcut {} refers forward", id)));
                }
            }
            match rank[arc.tail].cmp(&rank[arc.head]) {
                Ordering::Less => upward[arc.tail].push(id),
                Ordering::Greater => downward[arc.head].push(id),
                Ordering::Equal => {} // self loop
            }
        }

        Ok(Self {
            number_of_nodes,
            arcs,
            upward,
            downward,
        })
    }

    /// Exhaustive upward search; returns tentative distances and the arc used to reach each node
    fn upward_search(&self, start: usize, forward: bool) -> HashMap<usize, (u64, Option<usize>)> {
        let mut heap = BinaryHeap::new();
        let mut settled: HashMap<usize, (u64, Option<usize>)> = HashMap::new();
        let mut best: HashMap<usize, u64> = HashMap::new();

        heap.push(SearchNode {
            node: start,
            cost: 0,
            via: None,
        });
        best.insert(start, 0);

        while let Some(SearchNode { node, cost, via }) = heap.pop() {
            if settled.contains_key(&node) {
                continue;
            }
            settled.insert(node, (cost, via));

            let arcs = if forward {
                &self.upward[node]
            } else {
                &self.downward[node]
            };
            for &id in arcs {
                let arc = &self.arcs[id];
                let next = if forward { arc.head } else { arc.tail };
                let next_cost = cost + arc.weight;
                if best.get(&next).map_or(true, |&c| next_cost < c) {
                    best.insert(next, next_cost);
                    heap.push(SearchNode {
                        node: next,
                        cost: next_cost,
                        via: Some(id),
                    });
                }
            }
        }

        settled
    }

    /// Expand an arc into original edge positions, in travel order
    fn unpack_into(&self, arc: usize, out: &mut Vec<usize>) {
        let mut stack = vec![arc];
        while let Some(id) = stack.pop() {
            match self.arcs[id].unpack {
                Unpack::Original(position) => out.push(position),
                Unpack::Shortcut(first, second) => {
                    stack.push(second);
                    stack.push(first);
                }
            }
        }
    }
}

/// Priority queue entry
#[derive(Debug, Clone, Eq, PartialEq)]
struct SearchNode {
    node: usize,
    cost: u64,
    via: Option<usize>,
}

impl Ord for SearchNode {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse ordering for min-heap
        other.cost.cmp(&self.cost).then_with(|| self.node.cmp(&other.node))
    }
}

impl PartialOrd for SearchNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Shortcut candidate found while contracting a node
#[derive(Debug, Clone, Copy)]
struct Shortcut {
    tail: usize,
    head: usize,
    weight: u64,
    first: usize,
    second: usize,
}

/// Mutable state of the contraction process
struct Contractor {
    arcs: Vec<HierarchyArc>,
    outgoing: Vec<Vec<usize>>,
    incoming: Vec<Vec<usize>>,
    contracted: Vec<bool>,
    contracted_neighbours: Vec<usize>,
    settle_limit: usize,
}

impl Contractor {
    fn new(number_of_nodes: usize, edges: &[IndexedEdge], settle_limit: usize) -> Self {
        let mut outgoing = vec![Vec::new(); number_of_nodes];
        let mut incoming = vec![Vec::new(); number_of_nodes];
        let arcs: Vec<HierarchyArc> = edges
            .iter()
            .enumerate()
            .map(|(position, edge)| HierarchyArc {
                tail: edge.source,
                head: edge.target,
                weight: u64::from(edge.weight),
                unpack: Unpack::Original(position),
            })
            .collect();

        for (id, arc) in arcs.iter().enumerate() {
            if arc.tail != arc.head {
                outgoing[arc.tail].push(id);
                incoming[arc.head].push(id);
            }
        }

        Self {
            arcs,
            outgoing,
            incoming,
            contracted: vec![false; number_of_nodes],
            contracted_neighbours: vec![0; number_of_nodes],
            settle_limit,
        }
    }

    /// Cheapest live arc per neighbour; equal weights keep the lower arc id
    fn cheapest_arcs(&self, arcs: &[usize], neighbour: impl Fn(&HierarchyArc) -> usize) -> Vec<(usize, usize)> {
        let mut best: HashMap<usize, usize> = HashMap::new();
        let mut order = Vec::new();
        for &id in arcs {
            let n = neighbour(&self.arcs[id]);
            if self.contracted[n] {
                continue;
            }
            match best.get(&n) {
                Some(&current) if self.arcs[current].weight <= self.arcs[id].weight => {}
                Some(_) => {
                    best.insert(n, id);
                }
                None => {
                    best.insert(n, id);
                    order.push(n);
                }
            }
        }
        order.into_iter().map(|n| (n, best[&n])).collect()
    }

    /// Shortcuts required when contracting `node`
    fn shortcuts_for(&self, node: usize) -> Vec<Shortcut> {
        let into = self.cheapest_arcs(&self.incoming[node], |arc| arc.tail);
        let out_of = self.cheapest_arcs(&self.outgoing[node], |arc| arc.head);
        let mut shortcuts = Vec::new();
        if into.is_empty() || out_of.is_empty() {
            return shortcuts;
        }

        for &(tail, first) in &into {
            let targets: Vec<(usize, usize, u64)> = out_of
                .iter()
                .filter(|(head, _)| *head != tail)
                .map(|&(head, second)| (head, second, self.arcs[first].weight + self.arcs[second].weight))
                .collect();
            if targets.is_empty() {
                continue;
            }

            let witnesses = self.witness_search(tail, node, &targets);
            for (head, second, weight) in targets {
                let witnessed = witnesses.get(&head).map_or(false, |&cost| cost <= weight);
                if !witnessed {
                    shortcuts.push(Shortcut {
                        tail,
                        head,
                        weight,
                        first,
                        second,
                    });
                }
            }
        }

        shortcuts
    }

    /// Bounded Dijkstra from `start` that avoids `avoid` and contracted nodes
    ///
    /// Returned costs are lengths of real paths, so they are safe witnesses
    /// even when the search stopped before settling a node.
    fn witness_search(&self, start: usize, avoid: usize, targets: &[(usize, usize, u64)]) -> HashMap<usize, u64> {
        let mut remaining: HashSet<usize> = targets.iter().map(|(head, _, _)| *head).collect();
        let mut settled = 0usize;

        let (parents, _) = dijkstra_partial(
            &start,
            |&n: &usize| {
                self.outgoing[n]
                    .iter()
                    .map(|&id| &self.arcs[id])
                    .filter(|arc| arc.head != avoid && !self.contracted[arc.head])
                    .map(|arc| (arc.head, arc.weight))
                    .collect::<Vec<_>>()
            },
            |n: &usize| {
                settled += 1;
                remaining.remove(n);
                remaining.is_empty() || settled >= self.settle_limit
            },
        );

        parents.into_iter().map(|(n, (_, cost))| (n, cost)).collect()
    }

    fn edge_difference(&self, node: usize) -> i64 {
        let removed = self.incoming[node]
            .iter()
            .chain(&self.outgoing[node])
            .filter(|&&id| {
                let arc = &self.arcs[id];
                !self.contracted[arc.tail] && !self.contracted[arc.head]
            })
            .count();
        self.shortcuts_for(node).len() as i64 - removed as i64 + self.contracted_neighbours[node] as i64
    }

    fn contract(&mut self, node: usize) -> usize {
        let shortcuts = self.shortcuts_for(node);
        let added = shortcuts.len();

        for shortcut in shortcuts {
            let id = self.arcs.len();
            self.arcs.push(HierarchyArc {
                tail: shortcut.tail,
                head: shortcut.head,
                weight: shortcut.weight,
                unpack: Unpack::Shortcut(shortcut.first, shortcut.second),
            });
            self.outgoing[shortcut.tail].push(id);
            self.incoming[shortcut.head].push(id);
        }

        self.contracted[node] = true;
        let neighbours: HashSet<usize> = self.incoming[node]
            .iter()
            .map(|&id| self.arcs[id].tail)
            .chain(self.outgoing[node].iter().map(|&id| self.arcs[id].head))
            .filter(|&n| !self.contracted[n])
            .collect();
        for n in neighbours {
            self.contracted_neighbours[n] += 1;
        }

        added
    }

    /// Contract every node; returns the rank of each node
    fn run(&mut self) -> Vec<usize> {
        let number_of_nodes = self.contracted.len();
        let mut queue: BinaryHeap<Reverse<(i64, usize)>> = (0..number_of_nodes)
            .map(|node| Reverse((self.edge_difference(node), node)))
            .collect();
        let mut rank = vec![0; number_of_nodes];
        let mut next_rank = 0;

        while let Some(Reverse((priority, node))) = queue.pop() {
            if self.contracted[node] {
                continue;
            }

            // lazy update: re-evaluate and postpone if no longer minimal
            let current = self.edge_difference(node);
            if current > priority {
                if let Some(Reverse((top, _))) = queue.peek() {
                    if current > *top {
                        queue.push(Reverse((current, node)));
                        continue;
                    }
                }
            }

            self.contract(node);
            rank[node] = next_rank;
            next_rank += 1;
        }

        rank
    }
}

/// Contraction hierarchy engine with a bounded witness search
#[derive(Debug, Clone, Copy)]
pub struct ContractionHierarchyEngine {
    witness_settle_limit: usize,
}

impl ContractionHierarchyEngine {
    pub fn new() -> Self {
        Self {
            witness_settle_limit: DEFAULT_WITNESS_SETTLE_LIMIT,
        }
    }

    /// Limit the number of nodes settled per witness search
    ///
    /// Lower limits build faster but add more shortcuts.
    pub fn with_witness_settle_limit(mut self, limit: usize) -> Self {
        self.witness_settle_limit = limit.max(1);
        self
    }
}

impl Default for ContractionHierarchyEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl HierarchyEngine for ContractionHierarchyEngine {
    type Handle = ContractionHierarchy;

    fn build(&self, number_of_nodes: usize, edges: &[IndexedEdge], output: &Path) -> EngineResult<()> {
        for edge in edges {
            for node in [edge.source, edge.target] {
                if node >= number_of_nodes {
                    return Err(EngineError::NodeOutOfRange {
                        node,
                        number_of_nodes,
                    });
                }
            }
            if edge.weight >= INF_WEIGHT {
                return Err(EngineError::BuildFailed(format!(
                    "edge {} -> {} has weight {} >= {}",
                    edge.source, edge.target, edge.weight, INF_WEIGHT
                )));
            }
        }

        let mut contractor = Contractor::new(number_of_nodes, edges, self.witness_settle_limit);
        let rank = contractor.run();
        let artifact = HierarchyArtifact {
            number_of_nodes,
            rank,
            arcs: contractor.arcs,
        };
        info!(
            nodes = number_of_nodes,
            edges = edges.len(),
            shortcuts = artifact.arcs.len() - edges.len(),
            "Contraction hierarchy built"
        );

        let mut writer = BufWriter::new(File::create(output)?);
        bincode::serialize_into(&mut writer, &artifact)?;
        writer.flush()?;
        Ok(())
    }

    fn load(&self, artifact: &Path) -> EngineResult<Self::Handle> {
        let reader = BufReader::new(File::open(artifact)?);
        let decoded: HierarchyArtifact = bincode::deserialize_from(reader)?;
        ContractionHierarchy::from_artifact(decoded, artifact)
    }

    fn query(&self, handle: &Self::Handle, source: usize, target: usize) -> EngineResult<HierarchyQuery> {
        for node in [source, target] {
            if node >= handle.number_of_nodes {
                return Err(EngineError::NodeOutOfRange {
                    node,
                    number_of_nodes: handle.number_of_nodes,
                });
            }
        }

        if source == target {
            return Ok(HierarchyQuery {
                edges: Vec::new(),
                cost: 0,
            });
        }

        let forward = handle.upward_search(source, true);
        let backward = handle.upward_search(target, false);

        let meeting = forward
            .iter()
            .filter_map(|(node, (f, _))| backward.get(node).map(|(b, _)| (f + b, *node)))
            .min();

        let Some((cost, meet)) = meeting else {
            debug!(source, target, "Hierarchy query found no meeting node");
            return Ok(HierarchyQuery {
                edges: Vec::new(),
                cost: u64::from(INF_WEIGHT),
            });
        };

        // forward half: walk predecessors from the meeting node back to the source
        let mut up_arcs = Vec::new();
        let mut node = meet;
        while let Some(&(_, Some(arc))) = forward.get(&node) {
            up_arcs.push(arc);
            node = handle.arcs[arc].tail;
        }
        up_arcs.reverse();

        // backward half: arcs point from the meeting node towards the target
        let mut down_arcs = Vec::new();
        let mut node = meet;
        while let Some(&(_, Some(arc))) = backward.get(&node) {
            down_arcs.push(arc);
            node = handle.arcs[arc].head;
        }

        let mut edges = Vec::new();
        for arc in up_arcs.into_iter().chain(down_arcs) {
            handle.unpack_into(arc, &mut edges);
        }
        debug!(source, target, cost, meet, hops = edges.len(), "Hierarchy query answered");

        Ok(HierarchyQuery { edges, cost })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn build_and_load(number_of_nodes: usize, edges: &[IndexedEdge]) -> (TempDir, ContractionHierarchy) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("test.ch");
        let engine = ContractionHierarchyEngine::new();
        engine.build(number_of_nodes, edges, &path).unwrap();
        let handle = engine.load(&path).unwrap();
        (dir, handle)
    }

    fn edge_sum(edges: &[IndexedEdge], positions: &[usize]) -> u64 {
        positions.iter().map(|&p| u64::from(edges[p].weight)).sum()
    }

    fn assert_chain(edges: &[IndexedEdge], positions: &[usize], source: usize, target: usize) {
        let mut at = source;
        for &p in positions {
            assert_eq!(edges[p].source, at, "broken chain at edge {}", p);
            at = edges[p].target;
        }
        assert_eq!(at, target);
    }

    /// Plain Dijkstra over the edge list, used as reference
    fn reference_cost(number_of_nodes: usize, edges: &[IndexedEdge], source: usize, target: usize) -> Option<u64> {
        let mut dist = vec![u64::MAX; number_of_nodes];
        let mut heap = BinaryHeap::new();
        dist[source] = 0;
        heap.push(Reverse((0u64, source)));
        while let Some(Reverse((d, n))) = heap.pop() {
            if d > dist[n] {
                continue;
            }
            for e in edges.iter().filter(|e| e.source == n) {
                let nd = d + u64::from(e.weight);
                if nd < dist[e.target] {
                    dist[e.target] = nd;
                    heap.push(Reverse((nd, e.target)));
                }
            }
        }
        (dist[target] != u64::MAX).then_some(dist[target])
    }

    #[test]
    fn test_query_demo_graph() {
        // 0 -> 1 (2), 1 -> 2 (9), 2 -> 5 (5), 0 -> 3 (3), 3 -> 4 (1), 4 -> 2 (4)
        let edges = vec![
            IndexedEdge::new(0, 1, 2),
            IndexedEdge::new(0, 3, 3),
            IndexedEdge::new(1, 2, 9),
            IndexedEdge::new(2, 5, 5),
            IndexedEdge::new(3, 4, 1),
            IndexedEdge::new(4, 2, 4),
        ];
        let (_dir, handle) = build_and_load(6, &edges);
        let engine = ContractionHierarchyEngine::new();

        let result = engine.query(&handle, 0, 5).unwrap();
        assert_eq!(result.cost, 13);
        assert_eq!(result.edges, vec![1, 4, 5, 3]);

        let unreachable = engine.query(&handle, 5, 0).unwrap();
        assert_eq!(unreachable.cost, u64::from(INF_WEIGHT));
        assert!(unreachable.edges.is_empty());

        let same = engine.query(&handle, 3, 3).unwrap();
        assert_eq!(same, HierarchyQuery { edges: vec![], cost: 0 });
    }

    #[test]
    fn test_query_matches_reference_on_dense_graph() {
        let n = 12;
        let mut edges = Vec::new();
        for i in 0..n {
            for j in 0..n {
                if i != j && (i * 7 + j * 3) % 4 != 0 {
                    edges.push(IndexedEdge::new(i, j, ((i * 13 + j * 29) % 17 + 1) as u32));
                }
            }
        }
        edges.sort();
        let (_dir, handle) = build_and_load(n, &edges);
        let engine = ContractionHierarchyEngine::new();

        for s in 0..n {
            for t in 0..n {
                let result = engine.query(&handle, s, t).unwrap();
                match reference_cost(n, &edges, s, t) {
                    Some(cost) => {
                        assert_eq!(result.cost, cost, "{} -> {}", s, t);
                        assert_eq!(edge_sum(&edges, &result.edges), cost);
                        assert_chain(&edges, &result.edges, s, t);
                    }
                    None => assert_eq!(result.cost, u64::from(INF_WEIGHT)),
                }
            }
        }
    }

    #[test]
    fn test_parallel_edges_and_self_loops() {
        let edges = vec![
            IndexedEdge::new(0, 0, 1),
            IndexedEdge::new(0, 1, 8),
            IndexedEdge::new(0, 1, 3),
            IndexedEdge::new(1, 2, 1),
        ];
        let (_dir, handle) = build_and_load(3, &edges);
        let result = ContractionHierarchyEngine::new().query(&handle, 0, 2).unwrap();
        assert_eq!(result.cost, 4);
        assert_eq!(result.edges, vec![2, 3]);
    }

    #[test]
    fn test_isolated_nodes_and_range_checks() {
        let edges = vec![IndexedEdge::new(0, 1, 1)];
        let (_dir, handle) = build_and_load(4, &edges);
        let engine = ContractionHierarchyEngine::new();

        assert_eq!(engine.query(&handle, 0, 3).unwrap().cost, u64::from(INF_WEIGHT));
        assert!(matches!(
            engine.query(&handle, 0, 4),
            Err(EngineError::NodeOutOfRange { node: 4, .. })
        ));
    }

    #[test]
    fn test_build_rejects_bad_edges() {
        let dir = TempDir::new().unwrap();
        let engine = ContractionHierarchyEngine::new();
        let result = engine.build(2, &[IndexedEdge::new(0, 2, 1)], &dir.path().join("x.ch"));
        assert!(matches!(result, Err(EngineError::NodeOutOfRange { node: 2, .. })));
    }

    #[test]
    fn test_load_rejects_garbage() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("garbage.ch");
        std::fs::write(&path, b"not a hierarchy").unwrap();
        assert!(ContractionHierarchyEngine::new().load(&path).is_err());
        assert!(matches!(
            ContractionHierarchyEngine::new().load(&dir.path().join("missing.ch")),
            Err(EngineError::Io(_))
        ));
    }
}
