//! Whole-line conformance validation.
//!
//! # Algorithm
//!
//! 1. Fewer than two candidate points, or no road segments at all, reject
//!    the line without flagging any index.
//! 2. Every candidate point farther than `tolerance` from the nearest road is
//!    flagged.
//! 3. If a point was flagged, every segment touching it is flagged and the
//!    interior sampling is skipped.  Otherwise each segment is sampled at
//!    `subdivisions - 1` interior points and flagged at its first sample off
//!    the road.
//!
//! The line is valid iff nothing was flagged.  Both modes share this
//! algorithm; only the [`ConformanceParams`] differ.

use tracing::{debug, trace};

use rl_core::{
    ConformanceMode, ConformanceParams, Coord, EngineConfig, NoopProgress, Phase, ProgressEvent,
    ProgressObserver, RoadFeature, Throttle,
};

use crate::{ConformError, ConformResult, RoadIndex};

/// Why a line was rejected without any flagged index.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Rejection {
    TooFewPoints,
    NoRoadData,
}

/// Verdict of a conformance check.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ValidationResult {
    pub is_valid:         bool,
    /// Indices of candidate points off the road, ascending.
    pub invalid_points:   Vec<usize>,
    /// Indices of candidate segments (`i` joins points `i` and `i + 1`), ascending.
    pub invalid_segments: Vec<usize>,
    pub rejection:        Option<Rejection>,
}

impl ValidationResult {
    pub fn valid() -> Self {
        Self { is_valid: true, ..Self::default() }
    }

    pub fn rejected(reason: Rejection) -> Self {
        Self { rejection: Some(reason), ..Self::default() }
    }

    fn flagged(invalid_points: Vec<usize>, invalid_segments: Vec<usize>) -> Self {
        Self {
            is_valid: invalid_points.is_empty() && invalid_segments.is_empty(),
            invalid_points,
            invalid_segments,
            rejection: None,
        }
    }
}

impl RoadIndex {
    /// Validate `candidate` against the indexed roads.
    pub fn validate(&self, candidate: &[Coord], params: ConformanceParams) -> ValidationResult {
        // NoopProgress never cancels.
        self.validate_observed(candidate, params, &mut NoopProgress)
            .unwrap_or_default()
    }

    /// Like [`validate`](Self::validate), reporting [`Phase::Validating`]
    /// progress every [`progress_interval`](Self::progress_interval)
    /// candidate points and segments, and polling `observer` for
    /// cancellation.
    pub fn validate_observed<O>(
        &self,
        candidate: &[Coord],
        params: ConformanceParams,
        observer: &mut O,
    ) -> ConformResult<ValidationResult>
    where
        O: ProgressObserver + ?Sized,
    {
        if candidate.len() < 2 {
            return Ok(ValidationResult::rejected(Rejection::TooFewPoints));
        }
        if self.is_empty() {
            return Ok(ValidationResult::rejected(Rejection::NoRoadData));
        }

        let interval = self.progress_interval();
        let segment_count = candidate.len() - 1;
        let mut throttle = Throttle::new(candidate.len() + segment_count, interval);

        let mut invalid_points = Vec::new();
        for (chunk, points) in candidate.chunks(interval).enumerate() {
            if observer.is_cancelled() {
                debug!(checked = chunk * interval, "line validation cancelled");
                return Err(ConformError::Cancelled);
            }
            let offset = chunk * interval;
            invalid_points.extend(
                self.points_off_road(points, params.tolerance).into_iter().map(|i| i + offset),
            );
            if let Some(percent) = throttle.step_by(points.len()) {
                trace!(percent, "validation progress");
                observer.on_progress(&ProgressEvent { phase: Phase::Validating, percent });
            }
        }

        if !invalid_points.is_empty() {
            let invalid_segments = segments_touching(&invalid_points, segment_count);
            debug!(
                points = invalid_points.len(),
                segments = invalid_segments.len(),
                "candidate points off road; interior sampling skipped"
            );
            observer.on_progress(&ProgressEvent { phase: Phase::Validating, percent: 100.0 });
            return Ok(ValidationResult::flagged(invalid_points, invalid_segments));
        }

        let mut invalid_segments = Vec::new();
        for (i, w) in candidate.windows(2).enumerate() {
            if observer.is_cancelled() {
                debug!(checked = i, "line validation cancelled");
                return Err(ConformError::Cancelled);
            }
            if !self.interior_within(w[0], w[1], params) {
                invalid_segments.push(i);
            }
            if let Some(percent) = throttle.step() {
                trace!(percent, "validation progress");
                observer.on_progress(&ProgressEvent { phase: Phase::Validating, percent });
            }
        }

        debug!(
            segments = segment_count,
            invalid = invalid_segments.len(),
            tolerance = params.tolerance,
            "line validated"
        );
        Ok(ValidationResult::flagged(Vec::new(), invalid_segments))
    }

    /// Indices into `points` of those farther than `tolerance` from any road.
    #[cfg(not(feature = "parallel"))]
    fn points_off_road(&self, points: &[Coord], tolerance: f64) -> Vec<usize> {
        points
            .iter()
            .enumerate()
            .filter(|&(_, &p)| !self.is_within(p, tolerance))
            .map(|(i, _)| i)
            .collect()
    }

    #[cfg(feature = "parallel")]
    fn points_off_road(&self, points: &[Coord], tolerance: f64) -> Vec<usize> {
        use rayon::prelude::*;

        points
            .par_iter()
            .enumerate()
            .filter(|&(_, &p)| !self.is_within(p, tolerance))
            .map(|(i, _)| i)
            .collect()
    }
}

/// Segments `i - 1` and `i` for every flagged point `i`, deduplicated and
/// ascending.
fn segments_touching(points: &[usize], segment_count: usize) -> Vec<usize> {
    let mut out: Vec<usize> = Vec::with_capacity(points.len() * 2);
    for &p in points {
        if p > 0 {
            out.push(p - 1);
        }
        if p < segment_count {
            out.push(p);
        }
    }
    // `points` is ascending, so `out` only needs adjacent dedup.
    out.dedup();
    out
}

/// Build a [`RoadIndex`] over `features` and validate `candidate` with the
/// parameters `config` holds for `mode`.
///
/// For repeated checks against the same roads, build the index once and
/// call [`RoadIndex::validate`] instead.
pub fn validate_conformance<'a, I>(
    features: I,
    candidate: &[Coord],
    mode: ConformanceMode,
    config: &EngineConfig,
) -> ValidationResult
where
    I: IntoIterator<Item = &'a RoadFeature>,
{
    RoadIndex::new(features)
        .with_progress_interval(config.progress_interval)
        .validate(candidate, config.params(mode))
}
