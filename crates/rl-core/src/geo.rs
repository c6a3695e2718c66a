//! Planar coordinate type and geometry primitives.
//!
//! Every input shares one projected reference frame (typically metres), so
//! all distances here are plain Euclidean.  Nothing in the engine reprojects.

use std::fmt;

/// A point in the working projection.
#[derive(Copy, Clone, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Coord {
    pub x: f64,
    pub y: f64,
}

impl Coord {
    #[inline]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    #[inline]
    pub fn to_array(self) -> [f64; 2] {
        [self.x, self.y]
    }
}

impl From<[f64; 2]> for Coord {
    #[inline]
    fn from([x, y]: [f64; 2]) -> Self {
        Self { x, y }
    }
}

impl From<(f64, f64)> for Coord {
    #[inline]
    fn from((x, y): (f64, f64)) -> Self {
        Self { x, y }
    }
}

impl From<Coord> for [f64; 2] {
    #[inline]
    fn from(c: Coord) -> Self {
        [c.x, c.y]
    }
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{:.2}, {:.2}]", self.x, self.y)
    }
}

// ── Primitives ────────────────────────────────────────────────────────────────

/// Euclidean distance.
#[inline]
pub fn distance(a: Coord, b: Coord) -> f64 {
    (b.x - a.x).hypot(b.y - a.y)
}

/// Project `p` onto the segment `[s1, s2]`.
///
/// The projection parameter is clamped to `[0, 1]`, so the result always lies
/// on the segment rather than on the infinite line.  A degenerate segment
/// (`s1 == s2`) returns `s1`.
pub fn closest_point_on_segment(p: Coord, s1: Coord, s2: Coord) -> Coord {
    let dx = s2.x - s1.x;
    let dy = s2.y - s1.y;
    let len_sq = dx * dx + dy * dy;
    if len_sq == 0.0 {
        return s1;
    }
    let t = (((p.x - s1.x) * dx + (p.y - s1.y) * dy) / len_sq).clamp(0.0, 1.0);
    Coord::new(s1.x + t * dx, s1.y + t * dy)
}

/// Distance from `p` to the nearest point of segment `[s1, s2]`.
#[inline]
pub fn distance_to_segment(p: Coord, s1: Coord, s2: Coord) -> f64 {
    distance(p, closest_point_on_segment(p, s1, s2))
}

/// Linear interpolation: `t = 0` gives `a`, `t = 1` gives `b`.
#[inline]
pub fn interpolate(a: Coord, b: Coord, t: f64) -> Coord {
    Coord::new(a.x + (b.x - a.x) * t, a.y + (b.y - a.y) * t)
}

/// The `subdivisions - 1` evenly spaced points strictly between `a` and `b`,
/// at ratios `j / subdivisions` for `j = 1 .. subdivisions`.
///
/// `subdivisions <= 1` yields nothing.
pub fn interior_samples(a: Coord, b: Coord, subdivisions: u32) -> impl Iterator<Item = Coord> {
    let n = subdivisions.max(1);
    (1..n).map(move |j| interpolate(a, b, j as f64 / n as f64))
}

/// Total length of a polyline.  Zero for fewer than two vertices.
pub fn polyline_length(coords: &[Coord]) -> f64 {
    coords.windows(2).map(|w| distance(w[0], w[1])).sum()
}
