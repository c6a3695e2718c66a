//! Road features and layer eligibility.
//!
//! A road dataset is a flat list of [`RoadFeature`]s.  Which of them count
//! for routing and conformance is decided by a [`LayerFilter`] that the
//! caller passes in explicitly; nothing downstream consults global state.

use crate::geo::Coord;
use crate::ids::FeatureId;

// ── RoadClass ─────────────────────────────────────────────────────────────────

/// Which map layer a road belongs to.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum RoadClass {
    /// Numbered national route.
    National,
    /// Departmental / local road.
    #[default]
    Departmental,
}

impl RoadClass {
    /// Classify by route number: national routes are numbered 1–99, anything
    /// else (including a missing number) is departmental.
    pub fn from_route_number(number: Option<i64>) -> Self {
        match number {
            Some(1..=99) => RoadClass::National,
            _ => RoadClass::Departmental,
        }
    }
}

// ── RoadFeature ───────────────────────────────────────────────────────────────

/// One contiguous road polyline.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RoadFeature {
    pub id:     FeatureId,
    pub class:  RoadClass,
    pub coords: Vec<Coord>,
}

impl RoadFeature {
    pub fn new(id: FeatureId, class: RoadClass, coords: Vec<Coord>) -> Self {
        Self { id, class, coords }
    }

    /// Build a departmental feature from raw `[x, y]` pairs.  Handy in tests
    /// and for callers that do not track road classes.
    pub fn from_points(id: u32, points: &[[f64; 2]]) -> Self {
        Self {
            id:     FeatureId(id),
            class:  RoadClass::Departmental,
            coords: points.iter().copied().map(Coord::from).collect(),
        }
    }

    pub fn with_class(mut self, class: RoadClass) -> Self {
        self.class = class;
        self
    }

    /// `true` if the feature has at least one segment.
    #[inline]
    pub fn is_line(&self) -> bool {
        self.coords.len() >= 2
    }

    /// Consecutive coordinate pairs.  Empty for features with < 2 vertices.
    pub fn segments(&self) -> impl Iterator<Item = (Coord, Coord)> + '_ {
        self.coords.windows(2).map(|w| (w[0], w[1]))
    }
}

// ── LayerFilter ───────────────────────────────────────────────────────────────

/// Which road layers are currently eligible.
///
/// Mirrors the operator's layer toggles.  Defaults to everything visible.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LayerFilter {
    pub national:     bool,
    pub departmental: bool,
}

impl LayerFilter {
    pub const ALL: LayerFilter = LayerFilter { national: true, departmental: true };
    pub const NONE: LayerFilter = LayerFilter { national: false, departmental: false };

    #[inline]
    pub fn allows(&self, class: RoadClass) -> bool {
        match class {
            RoadClass::National => self.national,
            RoadClass::Departmental => self.departmental,
        }
    }

    /// `true` if no layer is enabled; every query against such a selection
    /// sees an empty road set.
    #[inline]
    pub fn is_empty(&self) -> bool {
        !self.national && !self.departmental
    }
}

impl Default for LayerFilter {
    fn default() -> Self {
        Self::ALL
    }
}

/// The subset of `features` whose class is allowed by `filter`, in input
/// order.
pub fn eligible(features: &[RoadFeature], filter: LayerFilter) -> Vec<&RoadFeature> {
    features.iter().filter(|f| filter.allows(f.class)).collect()
}
