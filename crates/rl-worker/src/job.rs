//! Messages exchanged with the worker thread.

use std::fmt;

use rl_conform::{PointCheck, ValidationResult};
use rl_core::{ConformanceMode, Coord, LayerFilter, ProgressEvent, RoadFeature};
use rl_graph::{GraphError, PathResult, RouteError};

/// Monotonically increasing identifier of a submitted job.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RequestId(pub u64);

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Work the engine thread can do.
#[derive(Clone, Debug)]
pub enum Job {
    /// Replace the road graph and segment index with ones built from the
    /// features `filter` allows.
    LoadRoads {
        features: Vec<RoadFeature>,
        filter:   LayerFilter,
    },
    ShortestPath {
        start: Coord,
        end:   Coord,
    },
    Validate {
        candidate: Vec<Coord>,
        mode:      ConformanceMode,
    },
    CheckPoint {
        point: Coord,
    },
}

impl Job {
    /// Queries can be superseded by newer queries; road loads cannot.
    #[inline]
    pub fn is_query(&self) -> bool {
        !matches!(self, Job::LoadRoads { .. })
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Job::LoadRoads { .. } => "load_roads",
            Job::ShortestPath { .. } => "shortest_path",
            Job::Validate { .. } => "validate",
            Job::CheckPoint { .. } => "check_point",
        }
    }
}

/// The answer to one [`Job`].
#[derive(Debug)]
pub enum Outcome {
    Loaded {
        nodes:    usize,
        edges:    usize,
        segments: usize,
    },
    LoadFailed(GraphError),
    Path(PathResult),
    /// Route search finished without a path.  Never [`RouteError::Cancelled`];
    /// that is reported as [`Outcome::Cancelled`].
    NoPath(RouteError),
    Validation(ValidationResult),
    Point(PointCheck),
    /// Superseded by a newer query or by [`RouteWorker::cancel`](crate::RouteWorker::cancel).
    Cancelled,
}

impl Outcome {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Outcome::Cancelled)
    }
}

/// A progress event tagged with the job it belongs to.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WorkerProgress {
    pub id:    RequestId,
    pub event: ProgressEvent,
}
