//! Spatial index over road segments.
//!
//! Every consecutive coordinate pair of every eligible feature becomes one
//! `rstar` line primitive tagged with its origin.  Distance from a point to
//! "the road network" is the distance to the nearest such segment.
//!
//! Zero-length segments go into a second tree of plain points, since
//! `rstar` cannot project onto a line whose ends coincide.  A feature made of
//! one repeated vertex is still a road at that vertex.

use rstar::primitives::{GeomWithData, Line};
use rstar::RTree;
use tracing::debug;

use rl_core::geo::{distance, distance_to_segment, interior_samples};
use rl_core::{ConformanceParams, Coord, EngineConfig, FeatureId, RoadFeature};

/// Where an indexed segment came from.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SegmentRef {
    pub feature: FeatureId,
    /// Position of the segment within its feature.
    pub index:   u32,
}

type IndexedSegment = GeomWithData<Line<[f64; 2]>, SegmentRef>;
type IndexedPoint = GeomWithData<[f64; 2], SegmentRef>;

/// Outcome of [`RoadIndex::check_point`].
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PointCheck {
    pub on_road:          bool,
    /// `None` when the index holds no segments.
    pub nearest_distance: Option<f64>,
}

/// R-tree of road segments.  Immutable once built; rebuild when the eligible
/// feature set changes.
pub struct RoadIndex {
    tree:              RTree<IndexedSegment>,
    /// Zero-length segments, keyed by their single point.
    points:            RTree<IndexedPoint>,
    progress_interval: usize,
}

impl RoadIndex {
    pub fn new<'a, I>(features: I) -> Self
    where
        I: IntoIterator<Item = &'a RoadFeature>,
    {
        let mut segments = Vec::new();
        let mut points = Vec::new();
        for feature in features {
            for (i, (a, b)) in feature.segments().enumerate() {
                let tag = SegmentRef { feature: feature.id, index: i as u32 };
                if a == b {
                    points.push(GeomWithData::new(a.to_array(), tag));
                } else {
                    segments.push(GeomWithData::new(Line::new(a.to_array(), b.to_array()), tag));
                }
            }
        }

        debug!(segments = segments.len(), degenerate = points.len(), "road segment index built");
        Self {
            tree:              RTree::bulk_load(segments),
            points:            RTree::bulk_load(points),
            progress_interval: EngineConfig::default().progress_interval,
        }
    }

    /// Report validation progress every `interval` candidate items
    /// (clamped to at least 1).
    pub fn with_progress_interval(mut self, interval: usize) -> Self {
        self.progress_interval = interval.max(1);
        self
    }

    pub fn progress_interval(&self) -> usize {
        self.progress_interval
    }

    /// Indexed segments, zero-length ones included.
    pub fn segment_count(&self) -> usize {
        self.tree.size() + self.points.size()
    }

    pub fn is_empty(&self) -> bool {
        self.segment_count() == 0
    }

    /// Zero-length segments, indexed as points.
    pub fn degenerate_count(&self) -> usize {
        self.points.size()
    }

    /// The road segment closest to `p` and its distance.
    pub fn nearest_segment(&self, p: Coord) -> Option<(SegmentRef, f64)> {
        let q = p.to_array();
        let line = self.tree.nearest_neighbor(&q).map(|seg| {
            let line = seg.geom();
            (seg.data, distance_to_segment(p, Coord::from(line.from), Coord::from(line.to)))
        });
        let point = self
            .points
            .nearest_neighbor(&q)
            .map(|pt| (pt.data, distance(p, Coord::from(*pt.geom()))));

        match (line, point) {
            (Some(l), Some(pt)) => Some(if pt.1 < l.1 { pt } else { l }),
            (l, pt) => l.or(pt),
        }
    }

    /// Minimum distance from `p` to any road segment.
    pub fn nearest_distance(&self, p: Coord) -> Option<f64> {
        self.nearest_segment(p).map(|(_, d)| d)
    }

    /// `true` if some road lies within `tolerance` of `p` (inclusive).
    #[inline]
    pub fn is_within(&self, p: Coord, tolerance: f64) -> bool {
        self.nearest_distance(p).is_some_and(|d| d <= tolerance)
    }

    /// Check a single point, e.g. a stop being placed.
    pub fn check_point(&self, p: Coord, tolerance: f64) -> PointCheck {
        let nearest_distance = self.nearest_distance(p);
        PointCheck {
            on_road: nearest_distance.is_some_and(|d| d <= tolerance),
            nearest_distance,
        }
    }

    /// Check one drawn segment: both endpoints and every interior sample must
    /// be within `params.tolerance` of a road.
    pub fn check_segment(&self, a: Coord, b: Coord, params: ConformanceParams) -> bool {
        self.is_within(a, params.tolerance)
            && self.is_within(b, params.tolerance)
            && self.interior_within(a, b, params)
    }

    /// Interior samples only; endpoints are the caller's business.
    pub(crate) fn interior_within(&self, a: Coord, b: Coord, params: ConformanceParams) -> bool {
        interior_samples(a, b, params.subdivisions).all(|s| self.is_within(s, params.tolerance))
    }
}
