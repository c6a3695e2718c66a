//! Progress reporting and cancellation.
//!
//! Long-running engine operations (graph build, path search, line
//! validation) take a `&mut impl ProgressObserver` and call it at throttled
//! intervals.  Observation never changes the result: the only influence an
//! observer has is to request cancellation, which makes the operation stop
//! with a `Cancelled` error instead of finishing.
//!
//! # Example: progress printer
//!
//! ```rust,ignore
//! struct Printer;
//!
//! impl ProgressObserver for Printer {
//!     fn on_progress(&mut self, event: &ProgressEvent) {
//!         println!("{}: {:.0}%", event.phase, event.percent);
//!     }
//! }
//! ```

use std::fmt;

/// Which engine operation is reporting.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Phase {
    BuildingGraph,
    Searching,
    Validating,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Phase::BuildingGraph => "building road graph",
            Phase::Searching => "searching shortest path",
            Phase::Validating => "validating line against roads",
        })
    }
}

/// One progress notification.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ProgressEvent {
    pub phase:   Phase,
    /// 0.0 ..= 100.0
    pub percent: f32,
}

impl fmt::Display for ProgressEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({:.0}%)", self.phase, self.percent)
    }
}

/// Callbacks invoked by long-running engine operations.
///
/// Both methods have no-op defaults so implementors only override what they
/// care about.
pub trait ProgressObserver {
    fn on_progress(&mut self, _event: &ProgressEvent) {}

    /// Polled between units of work.  Returning `true` aborts the operation.
    fn is_cancelled(&self) -> bool {
        false
    }
}

impl<O: ProgressObserver + ?Sized> ProgressObserver for &mut O {
    fn on_progress(&mut self, event: &ProgressEvent) {
        (**self).on_progress(event)
    }

    fn is_cancelled(&self) -> bool {
        (**self).is_cancelled()
    }
}

/// A [`ProgressObserver`] that ignores everything and never cancels.
#[derive(Copy, Clone, Debug, Default)]
pub struct NoopProgress;

impl ProgressObserver for NoopProgress {}

// ── Throttle ──────────────────────────────────────────────────────────────────

/// Decides when a loop over `total` items should emit progress: every
/// `interval` steps and on the final step.
#[derive(Clone, Debug)]
pub struct Throttle {
    interval: usize,
    total:    usize,
    done:     usize,
}

impl Throttle {
    pub fn new(total: usize, interval: usize) -> Self {
        Self { interval: interval.max(1), total, done: 0 }
    }

    /// Record one completed item.  Returns the new percentage if an event
    /// is due.
    #[inline]
    pub fn step(&mut self) -> Option<f32> {
        self.step_by(1)
    }

    /// Record `n` completed items at once.  An event is due if the batch
    /// crossed an interval boundary or reached the total.
    pub fn step_by(&mut self, n: usize) -> Option<f32> {
        let before = self.done / self.interval;
        self.done += n;
        if self.done / self.interval > before || (n > 0 && self.done == self.total) {
            Some(self.percent())
        } else {
            None
        }
    }

    pub fn percent(&self) -> f32 {
        if self.total == 0 {
            return 100.0;
        }
        (self.done as f32 / self.total as f32 * 100.0).min(100.0)
    }

    pub fn done(&self) -> usize {
        self.done
    }
}
