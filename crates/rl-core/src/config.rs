//! Engine configuration.
//!
//! The defaults are tuned for a projected metre grid and a national road
//! dataset.  They are configuration, not invariants: other datasets and
//! projections need re-tuning.

use crate::{CoreError, CoreResult};

// ── ConformanceMode ───────────────────────────────────────────────────────────

/// Strictness level of a conformance check.
///
/// Both modes run the same algorithm; they only pick different
/// [`ConformanceParams`] out of [`EngineConfig`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum ConformanceMode {
    /// Live feedback while a line is being drawn.  Looser and cheaper.
    Construction,
    /// Pre-commit acceptance.  Tighter tolerance, denser sampling.
    Final,
}

// ── ConformanceParams ─────────────────────────────────────────────────────────

/// Tolerance and sampling density for one conformance check.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ConformanceParams {
    /// Maximum allowed distance from a sampled point to the nearest road.
    pub tolerance: f64,

    /// Each candidate segment is cut into this many equal pieces; the
    /// `subdivisions - 1` interior cut points are checked.
    pub subdivisions: u32,
}

impl ConformanceParams {
    pub const fn new(tolerance: f64, subdivisions: u32) -> Self {
        Self { tolerance, subdivisions }
    }

    pub fn with_tolerance(self, tolerance: f64) -> Self {
        Self { tolerance, ..self }
    }

    fn validate(&self, what: &str) -> CoreResult<()> {
        if !self.tolerance.is_finite() || self.tolerance < 0.0 {
            return Err(CoreError::Config(format!(
                "{what}.tolerance must be a finite non-negative number, got {}",
                self.tolerance
            )));
        }
        if self.subdivisions == 0 {
            return Err(CoreError::Config(format!("{what}.subdivisions must be >= 1")));
        }
        Ok(())
    }
}

// ── EngineConfig ──────────────────────────────────────────────────────────────

/// Top-level engine configuration.
///
/// Typically loaded from a JSON file by the application and passed to every
/// engine entry point.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct EngineConfig {
    /// Grid cell size used to merge nearby road vertices into one node.
    /// Default: 0.1 (one decimal place in the working projection).
    pub quantization: f64,

    /// Tolerance for single-point checks such as stop placement.  Default: 20.
    pub point_tolerance: f64,

    /// Parameters for [`ConformanceMode::Construction`].  Default: 25 / 15.
    pub construction: ConformanceParams,

    /// Parameters for [`ConformanceMode::Final`].  Default: 20 / 20.
    pub final_check: ConformanceParams,

    /// Parameters for the incremental "can I add this segment" check used
    /// while drawing.  Default: 25 / 20.
    pub segment_check: ConformanceParams,

    /// Emit a progress event every N processed items (features, settled
    /// nodes, validated points).  Default: 256.
    pub progress_interval: usize,
}

impl EngineConfig {
    /// Parameters for the given conformance mode.
    #[inline]
    pub fn params(&self, mode: ConformanceMode) -> ConformanceParams {
        match mode {
            ConformanceMode::Construction => self.construction,
            ConformanceMode::Final => self.final_check,
        }
    }

    /// Reject values that would make the engine meaningless.
    pub fn validate(&self) -> CoreResult<()> {
        if !self.quantization.is_finite() || self.quantization <= 0.0 {
            return Err(CoreError::Config(format!(
                "quantization must be a finite positive number, got {}",
                self.quantization
            )));
        }
        if !self.point_tolerance.is_finite() || self.point_tolerance < 0.0 {
            return Err(CoreError::Config(format!(
                "point_tolerance must be a finite non-negative number, got {}",
                self.point_tolerance
            )));
        }
        self.construction.validate("construction")?;
        self.final_check.validate("final_check")?;
        self.segment_check.validate("segment_check")?;
        if self.progress_interval == 0 {
            return Err(CoreError::Config("progress_interval must be >= 1".into()));
        }
        Ok(())
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            quantization:      0.1,
            point_tolerance:   20.0,
            construction:      ConformanceParams::new(25.0, 15),
            final_check:       ConformanceParams::new(20.0, 20),
            segment_check:     ConformanceParams::new(25.0, 20),
            progress_interval: 256,
        }
    }
}
