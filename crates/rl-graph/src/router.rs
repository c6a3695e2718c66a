//! Routing trait and default Dijkstra implementation.
//!
//! # Determinism
//!
//! The frontier is a binary heap keyed by `(tentative distance, NodeId)`.  Among
//! equally distant candidates the lowest `NodeId` (the node inserted first
//! during the build) is settled first, so identical inputs always produce
//! identical paths.
//!
//! # Path geometry
//!
//! Returned coordinates are the canonical positions of the traversed nodes.
//! Because vertices are merged on a grid, the path follows merged node
//! positions rather than the exact original centreline.

use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

use tracing::{debug, trace};

use rl_core::{Coord, EngineConfig, NodeId, Phase, ProgressEvent, ProgressObserver, Throttle};

use crate::network::{RoadGraph, Snap};
use crate::{EmptyReason, RouteError};

// ── PathResult ────────────────────────────────────────────────────────────────

/// The result of a routing query.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PathResult {
    /// Node positions from start to end.
    pub coords: Vec<Coord>,
    /// Traversed nodes, parallel to `coords`.
    pub nodes: Vec<NodeId>,
    /// Sum of edge weights along the path.
    pub distance: f64,
    /// Where the start point snapped to.
    pub start: Snap,
    /// Where the end point snapped to.
    pub end: Snap,
}

impl PathResult {
    /// Number of nodes traversed, endpoints included.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }
}

// ── Router trait ──────────────────────────────────────────────────────────────

/// Pluggable routing engine.
///
/// # Thread safety
///
/// Implementations must be `Send + Sync` so one router can serve an
/// off-thread worker.
pub trait Router: Send + Sync {
    /// Compute a path from `from` to `to`.
    fn route(
        &self,
        graph: &RoadGraph,
        from: NodeId,
        to: NodeId,
        observer: &mut dyn ProgressObserver,
    ) -> Result<PathResult, RouteError>;
}

// ── DijkstraRouter ────────────────────────────────────────────────────────────

/// Dijkstra's algorithm over the CSR road graph, with early exit at the
/// destination.
#[derive(Copy, Clone, Debug)]
pub struct DijkstraRouter {
    /// Emit progress every N settled nodes.
    pub progress_interval: usize,
}

impl DijkstraRouter {
    pub fn new(progress_interval: usize) -> Self {
        Self { progress_interval }
    }

    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(config.progress_interval)
    }
}

impl Default for DijkstraRouter {
    fn default() -> Self {
        Self::from_config(&EngineConfig::default())
    }
}

impl Router for DijkstraRouter {
    fn route(
        &self,
        graph: &RoadGraph,
        from: NodeId,
        to: NodeId,
        observer: &mut dyn ProgressObserver,
    ) -> Result<PathResult, RouteError> {
        dijkstra(graph, from, to, self.progress_interval, observer)
    }
}

// ── Coordinate-level entry point ──────────────────────────────────────────────

/// Snap `start` and `end` onto `graph` and find the shortest road path
/// between the snapped nodes.
///
/// # Errors
///
/// - [`RouteError::EmptyGraph`] if the graph has no nodes, no edges, or both
///   points snap to the same node.
/// - [`RouteError::Unreachable`] if the snapped nodes lie in different
///   components.
/// - [`RouteError::Cancelled`] if `observer` asks to stop.
pub fn shortest_path<O>(
    graph: &RoadGraph,
    start: Coord,
    end: Coord,
    config: &EngineConfig,
    observer: &mut O,
) -> Result<PathResult, RouteError>
where
    O: ProgressObserver,
{
    let empty = |reason| RouteError::EmptyGraph { reason };

    let start_snap = graph.nearest_node(start).map_err(|_| empty(EmptyReason::NoNodes))?;
    if graph.edge_count() == 0 {
        return Err(empty(EmptyReason::NoEdges));
    }
    let end_snap = graph.nearest_node(end).map_err(|_| empty(EmptyReason::NoNodes))?;
    if start_snap.node == end_snap.node {
        return Err(empty(EmptyReason::SameNode(start_snap.node)));
    }

    debug!(
        start = %start, start_node = %start_snap.node, start_snap = start_snap.distance,
        end = %end, end_node = %end_snap.node, end_snap = end_snap.distance,
        "snapped route endpoints"
    );

    let mut path = DijkstraRouter::from_config(config).route(
        graph,
        start_snap.node,
        end_snap.node,
        observer,
    )?;
    path.start = start_snap;
    path.end = end_snap;
    Ok(path)
}

// ── Dijkstra internals ────────────────────────────────────────────────────────

/// Heap key with a total order over `f64`.
#[derive(Copy, Clone, Debug, PartialEq)]
struct Cost(f64);

impl Eq for Cost {}

impl PartialOrd for Cost {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Cost {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

fn dijkstra(
    graph: &RoadGraph,
    from: NodeId,
    to: NodeId,
    progress_interval: usize,
    observer: &mut dyn ProgressObserver,
) -> Result<PathResult, RouteError> {
    for node in [from, to] {
        if !graph.contains(node) {
            return Err(RouteError::UnknownNode(node));
        }
    }
    if from == to {
        return Err(RouteError::EmptyGraph { reason: EmptyReason::SameNode(from) });
    }

    let n = graph.node_count();
    // dist[v] = best known distance to v.
    let mut dist    = vec![f64::INFINITY; n];
    // prev[v] = predecessor on the best known path; INVALID for unreached nodes.
    let mut prev    = vec![NodeId::INVALID; n];
    let mut settled = vec![false; n];
    let mut throttle = Throttle::new(n, progress_interval);

    dist[from.index()] = 0.0;

    // Min-heap: Reverse turns BinaryHeap (max) into a min-heap.  NodeId is
    // the secondary key for deterministic tie-breaking.
    let mut heap: BinaryHeap<Reverse<(Cost, NodeId)>> = BinaryHeap::new();
    heap.push(Reverse((Cost(0.0), from)));

    let mut reached = false;
    while let Some(Reverse((Cost(d), u))) = heap.pop() {
        // Skip stale heap entries.
        if settled[u.index()] {
            continue;
        }
        settled[u.index()] = true;

        if observer.is_cancelled() {
            debug!(settled = throttle.done(), "route search cancelled");
            return Err(RouteError::Cancelled);
        }
        if let Some(percent) = throttle.step() {
            trace!(percent, "search progress");
            observer.on_progress(&ProgressEvent { phase: Phase::Searching, percent });
        }

        if u == to {
            reached = true;
            break;
        }

        for (v, e) in graph.neighbors(u) {
            if settled[v.index()] {
                continue;
            }
            let candidate = d + graph.edge(e).weight;
            if candidate < dist[v.index()] {
                dist[v.index()] = candidate;
                prev[v.index()] = u;
                heap.push(Reverse((Cost(candidate), v)));
            }
        }
    }

    if !reached {
        return Err(RouteError::Unreachable { from, to });
    }

    let nodes = reconstruct(&prev, from, to).ok_or(RouteError::Unreachable { from, to })?;
    observer.on_progress(&ProgressEvent { phase: Phase::Searching, percent: 100.0 });

    Ok(PathResult {
        coords: nodes.iter().map(|&id| graph.node_pos(id)).collect(),
        distance: dist[to.index()],
        start: Snap { node: from, distance: 0.0 },
        end: Snap { node: to, distance: 0.0 },
        nodes,
    })
}

/// Walk predecessors back from `to`.  `None` if the chain does not end at
/// `from` within `prev.len()` steps.
fn reconstruct(prev: &[NodeId], from: NodeId, to: NodeId) -> Option<Vec<NodeId>> {
    let mut nodes = vec![to];
    let mut cur = to;
    while cur != from {
        let p = prev[cur.index()];
        if !p.is_valid() || nodes.len() > prev.len() {
            return None;
        }
        nodes.push(p);
        cur = p;
    }
    nodes.reverse();
    Some(nodes)
}
