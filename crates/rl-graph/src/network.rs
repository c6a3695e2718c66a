//! Road graph representation and builder.
//!
//! # Node merging
//!
//! Road features arrive as independent polylines.  Their vertices are keyed by
//! a quantized cell `(round(x / q), round(y / q))`; every vertex that falls
//! into the same cell becomes the same node.  This is what turns a bag of
//! disconnected features into a connected network: two roads that share an
//! endpoint (up to the grid precision) share a node.
//!
//! # Data layout
//!
//! Edges are undirected and stored once in `edges`.  Adjacency uses
//! **Compressed Sparse Row (CSR)** format: the neighbours of node `n` occupy
//!
//! ```text
//! adj_node[ adj_start[n] .. adj_start[n+1] ]
//! adj_edge[ adj_start[n] .. adj_start[n+1] ]
//! ```
//!
//! in edge insertion order, so the search visits neighbours deterministically.
//!
//! # Spatial index
//!
//! An R-tree (via `rstar`) maps a coordinate to the nearest node.  Used to
//! snap arbitrary query points onto the network.

use rstar::{PointDistance, RTree, RTreeObject, AABB};
use rustc_hash::{FxHashMap, FxHashSet};
use tracing::debug;

use rl_core::geo::distance;
use rl_core::{Coord, EdgeId, EngineConfig, NodeId, Phase, ProgressEvent, ProgressObserver, RoadFeature, Throttle};

use crate::{GraphError, GraphResult};

/// Quantized grid cell of a coordinate.
pub type CellKey = (i64, i64);

/// Map a coordinate to its grid cell.
///
/// Every coordinate inside one cell yields the same key.  Non-finite input
/// saturates rather than panicking.
#[inline]
pub fn quantize(c: Coord, precision: f64) -> CellKey {
    ((c.x / precision).round() as i64, (c.y / precision).round() as i64)
}

// ── R-tree node entry ─────────────────────────────────────────────────────────

#[derive(Clone)]
struct NodeEntry {
    point: [f64; 2],
    id:    NodeId,
}

impl RTreeObject for NodeEntry {
    type Envelope = AABB<[f64; 2]>;
    fn envelope(&self) -> Self::Envelope {
        AABB::from_point(self.point)
    }
}

impl PointDistance for NodeEntry {
    fn distance_2(&self, point: &[f64; 2]) -> f64 {
        let dx = self.point[0] - point[0];
        let dy = self.point[1] - point[1];
        dx * dx + dy * dy
    }
}

// ── Edge & snap ───────────────────────────────────────────────────────────────

/// One undirected road segment between two merged nodes.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GraphEdge {
    pub a: NodeId,
    pub b: NodeId,
    /// Euclidean length of the original (unquantized) segment.
    pub weight: f64,
    /// Original segment endpoints, kept for exact rendering.
    pub geometry: [Coord; 2],
}

impl GraphEdge {
    /// The endpoint that is not `n`.
    #[inline]
    pub fn other(&self, n: NodeId) -> NodeId {
        if self.a == n { self.b } else { self.a }
    }
}

/// Result of snapping a coordinate onto the graph.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Snap {
    pub node:     NodeId,
    pub distance: f64,
}

/// Counters collected while building.  Purely informational.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct BuildStats {
    pub features:          usize,
    /// Features with fewer than two coordinates.
    pub skipped_features:  usize,
    pub segments:          usize,
    /// Segments whose endpoints share a cell.
    pub zero_length:       usize,
    /// Segments whose node pair already had an edge.
    pub duplicate_edges:   usize,
}

// ── RoadGraph ─────────────────────────────────────────────────────────────────

/// Undirected weighted road graph plus a spatial index for node snapping.
///
/// Built once from a snapshot of eligible features and then only queried.
/// When the eligible road set changes, build a new graph; there is no
/// mutation API.
pub struct RoadGraph {
    /// Grid cell size the graph was built with.
    pub precision: f64,

    // ── Node data (indexed by NodeId) ─────────────────────────────────────
    /// Canonical coordinate of each node: the first original coordinate
    /// seen for its cell.
    pub node_pos: Vec<Coord>,
    /// Quantized cell of each node.
    pub node_key: Vec<CellKey>,

    // ── Edge data (indexed by EdgeId) ─────────────────────────────────────
    pub edges: Vec<GraphEdge>,

    // ── CSR adjacency ─────────────────────────────────────────────────────
    /// Length = `node_count + 1`.
    pub adj_start: Vec<u32>,
    pub adj_node:  Vec<NodeId>,
    pub adj_edge:  Vec<EdgeId>,

    pub stats: BuildStats,

    key_index:   FxHashMap<CellKey, NodeId>,
    spatial_idx: RTree<NodeEntry>,
}

impl RoadGraph {
    /// A graph with no nodes or edges.  Every query against it fails with an
    /// empty-graph error.
    pub fn empty(precision: f64) -> Self {
        RoadGraphBuilder::new(precision).build()
    }

    /// Build from `features` without progress reporting.
    pub fn from_features<'a, I>(features: I, precision: f64) -> Self
    where
        I: IntoIterator<Item = &'a RoadFeature>,
    {
        let mut b = RoadGraphBuilder::new(precision);
        for f in features {
            b.add_feature(f);
        }
        b.build()
    }

    // ── Graph dimensions ──────────────────────────────────────────────────

    pub fn node_count(&self) -> usize {
        self.node_pos.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.node_pos.is_empty()
    }

    // ── Lookup ────────────────────────────────────────────────────────────

    #[inline]
    pub fn node_pos(&self, node: NodeId) -> Coord {
        self.node_pos[node.index()]
    }

    #[inline]
    pub fn edge(&self, edge: EdgeId) -> &GraphEdge {
        &self.edges[edge.index()]
    }

    #[inline]
    pub fn contains(&self, node: NodeId) -> bool {
        node.index() < self.node_count()
    }

    /// The node whose cell contains `c`, if any.
    pub fn node_at(&self, c: Coord) -> Option<NodeId> {
        self.key_index.get(&quantize(c, self.precision)).copied()
    }

    // ── Graph traversal ───────────────────────────────────────────────────

    /// `(neighbour, edge)` pairs of `node`, in edge insertion order.
    #[inline]
    pub fn neighbors(&self, node: NodeId) -> impl Iterator<Item = (NodeId, EdgeId)> + '_ {
        let start = self.adj_start[node.index()] as usize;
        let end   = self.adj_start[node.index() + 1] as usize;
        self.adj_node[start..end]
            .iter()
            .copied()
            .zip(self.adj_edge[start..end].iter().copied())
    }

    #[inline]
    pub fn degree(&self, node: NodeId) -> usize {
        let start = self.adj_start[node.index()] as usize;
        let end   = self.adj_start[node.index() + 1] as usize;
        end - start
    }

    /// The edge joining `a` and `b`, in either direction.
    pub fn edge_between(&self, a: NodeId, b: NodeId) -> Option<EdgeId> {
        self.neighbors(a).find(|&(n, _)| n == b).map(|(_, e)| e)
    }

    /// Label every node with a connected-component index.
    ///
    /// Returns `(labels, component_count)`; components are numbered in order
    /// of their lowest `NodeId`.
    pub fn components(&self) -> (Vec<u32>, usize) {
        let n = self.node_count();
        let mut label = vec![u32::MAX; n];
        let mut count = 0u32;
        let mut stack = Vec::new();
        for root in 0..n {
            if label[root] != u32::MAX {
                continue;
            }
            label[root] = count;
            stack.push(NodeId(root as u32));
            while let Some(u) = stack.pop() {
                for (v, _) in self.neighbors(u) {
                    if label[v.index()] == u32::MAX {
                        label[v.index()] = count;
                        stack.push(v);
                    }
                }
            }
            count += 1;
        }
        (label, count as usize)
    }

    // ── Spatial queries ───────────────────────────────────────────────────

    /// The node closest to `point` and its distance.
    ///
    /// Fails with [`GraphError::EmptyGraph`] when the graph has no nodes.
    pub fn nearest_node(&self, point: Coord) -> GraphResult<Snap> {
        let entry = self
            .spatial_idx
            .nearest_neighbor(&point.to_array())
            .ok_or(GraphError::EmptyGraph)?;
        Ok(Snap {
            node:     entry.id,
            distance: distance(point, Coord::from(entry.point)),
        })
    }

    /// Up to `k` nearest nodes to `point`, sorted by ascending distance.
    pub fn k_nearest_nodes(&self, point: Coord, k: usize) -> Vec<Snap> {
        self.spatial_idx
            .nearest_neighbor_iter(&point.to_array())
            .take(k)
            .map(|e| Snap { node: e.id, distance: distance(point, Coord::from(e.point)) })
            .collect()
    }
}

// ── Build with progress ───────────────────────────────────────────────────────

/// Build a [`RoadGraph`] from `features`, reporting progress every
/// `config.progress_interval` features.
///
/// Short features and zero-length segments are skipped, never fatal.  The
/// only failures are an invalid `config` and cancellation by `observer`.
pub fn build_graph<'a, I, O>(
    features: I,
    config: &EngineConfig,
    observer: &mut O,
) -> GraphResult<RoadGraph>
where
    I: IntoIterator<Item = &'a RoadFeature>,
    I::IntoIter: ExactSizeIterator,
    O: ProgressObserver + ?Sized,
{
    config.validate()?;

    let features = features.into_iter();
    let mut throttle = Throttle::new(features.len(), config.progress_interval);
    let mut builder = RoadGraphBuilder::new(config.quantization);

    for feature in features {
        if observer.is_cancelled() {
            debug!(processed = throttle.done(), "graph build cancelled");
            return Err(GraphError::Cancelled);
        }
        builder.add_feature(feature);
        if let Some(percent) = throttle.step() {
            observer.on_progress(&ProgressEvent { phase: Phase::BuildingGraph, percent });
        }
    }

    Ok(builder.build())
}

// ── RoadGraphBuilder ──────────────────────────────────────────────────────────

/// Construct a [`RoadGraph`] feature by feature, then call
/// [`build`](Self::build).
///
/// # Example
///
/// ```
/// use rl_core::RoadFeature;
/// use rl_graph::RoadGraphBuilder;
///
/// let mut b = RoadGraphBuilder::new(0.1);
/// b.add_feature(&RoadFeature::from_points(0, &[[0.0, 0.0], [100.0, 0.0]]));
/// b.add_feature(&RoadFeature::from_points(1, &[[100.02, 0.01], [100.0, 80.0]]));
/// let g = b.build();
/// assert_eq!(g.node_count(), 3); // the shared corner merged
/// assert_eq!(g.edge_count(), 2);
/// ```
pub struct RoadGraphBuilder {
    precision: f64,
    nodes:     Vec<Coord>,
    keys:      Vec<CellKey>,
    key_index: FxHashMap<CellKey, NodeId>,
    edges:     Vec<GraphEdge>,
    /// Normalized `(min, max)` node pairs that already have an edge.
    edge_set:  FxHashSet<(NodeId, NodeId)>,
    stats:     BuildStats,
}

impl RoadGraphBuilder {
    pub fn new(precision: f64) -> Self {
        Self {
            precision,
            nodes:     Vec::new(),
            keys:      Vec::new(),
            key_index: FxHashMap::default(),
            edges:     Vec::new(),
            edge_set:  FxHashSet::default(),
            stats:     BuildStats::default(),
        }
    }

    /// Add every segment of `feature`.  Returns the number of new edges.
    pub fn add_feature(&mut self, feature: &RoadFeature) -> usize {
        self.stats.features += 1;
        if !feature.is_line() {
            self.stats.skipped_features += 1;
            debug!(feature = %feature.id, vertices = feature.coords.len(), "skipping feature with < 2 vertices");
            return 0;
        }

        let mut added = 0;
        for (start, end) in feature.segments() {
            if self.add_segment(start, end) {
                added += 1;
            }
        }
        added
    }

    /// Add one segment.  Returns `true` if a new edge was created.
    pub fn add_segment(&mut self, start: Coord, end: Coord) -> bool {
        self.stats.segments += 1;
        let a = self.node_for(start);
        let b = self.node_for(end);

        if a == b {
            self.stats.zero_length += 1;
            return false;
        }

        let pair = if a < b { (a, b) } else { (b, a) };
        if !self.edge_set.insert(pair) {
            self.stats.duplicate_edges += 1;
            return false;
        }

        self.edges.push(GraphEdge {
            a,
            b,
            weight: distance(start, end),
            geometry: [start, end],
        });
        true
    }

    fn node_for(&mut self, c: Coord) -> NodeId {
        let key = quantize(c, self.precision);
        if let Some(&id) = self.key_index.get(&key) {
            return id;
        }
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(c);
        self.keys.push(key);
        self.key_index.insert(key, id);
        id
    }

    pub fn node_count(&self) -> usize { self.nodes.len() }
    pub fn edge_count(&self) -> usize { self.edges.len() }

    /// Consume the builder and produce a [`RoadGraph`].
    ///
    /// Time complexity: O(N + E) for CSR construction + O(N log N) for the
    /// R-tree bulk load.
    pub fn build(self) -> RoadGraph {
        let node_count = self.nodes.len();

        // Degree count, then prefix sums for the CSR row pointer.
        let mut adj_start = vec![0u32; node_count + 1];
        for e in &self.edges {
            adj_start[e.a.index() + 1] += 1;
            adj_start[e.b.index() + 1] += 1;
        }
        for i in 1..=node_count {
            adj_start[i] += adj_start[i - 1];
        }

        // Fill in edge insertion order so neighbour order is deterministic.
        let slots = adj_start[node_count] as usize;
        let mut adj_node = vec![NodeId::INVALID; slots];
        let mut adj_edge = vec![EdgeId::INVALID; slots];
        let mut cursor: Vec<u32> = adj_start[..node_count].to_vec();
        for (i, e) in self.edges.iter().enumerate() {
            let id = EdgeId(i as u32);
            for (from, to) in [(e.a, e.b), (e.b, e.a)] {
                let slot = cursor[from.index()] as usize;
                adj_node[slot] = to;
                adj_edge[slot] = id;
                cursor[from.index()] += 1;
            }
        }

        let entries: Vec<NodeEntry> = self
            .nodes
            .iter()
            .enumerate()
            .map(|(i, c)| NodeEntry { point: c.to_array(), id: NodeId(i as u32) })
            .collect();
        let spatial_idx = RTree::bulk_load(entries);

        debug!(
            nodes = node_count,
            edges = self.edges.len(),
            skipped_features = self.stats.skipped_features,
            zero_length = self.stats.zero_length,
            duplicates = self.stats.duplicate_edges,
            "road graph built"
        );

        RoadGraph {
            precision: self.precision,
            node_pos: self.nodes,
            node_key: self.keys,
            edges: self.edges,
            adj_start,
            adj_node,
            adj_edge,
            stats: self.stats,
            key_index: self.key_index,
            spatial_idx,
        }
    }
}
