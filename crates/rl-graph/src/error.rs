//! Graph-subsystem error types.

use std::fmt;

use thiserror::Error;

use rl_core::{CoreError, NodeId};

/// Errors produced while building or querying a [`RoadGraph`](crate::RoadGraph).
#[derive(Debug, Error)]
pub enum GraphError {
    #[error("road graph has no nodes; enable a road layer or load road data")]
    EmptyGraph,

    #[error("graph build cancelled")]
    Cancelled,

    #[error(transparent)]
    Config(#[from] CoreError),
}

pub type GraphResult<T> = Result<T, GraphError>;

// ── Routing failures ──────────────────────────────────────────────────────────

/// Why a route request saw no usable graph.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum EmptyReason {
    /// No eligible road data at all.
    NoNodes,
    /// Nodes exist but every segment was degenerate.
    NoEdges,
    /// Start and end snapped to the same node.
    SameNode(NodeId),
}

impl fmt::Display for EmptyReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EmptyReason::NoNodes => f.write_str("no road data is available"),
            EmptyReason::NoEdges => f.write_str("road data contains no usable segments"),
            EmptyReason::SameNode(n) => {
                write!(f, "start and end snap to the same road node {n}")
            }
        }
    }
}

/// Public failure taxonomy of a route request.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum FailureKind {
    EmptyGraph,
    Unreachable,
    Cancelled,
}

/// Errors produced by the shortest-path solver.
///
/// None of these are fatal.  `EmptyGraph` and `Unreachable` are kept apart
/// because the remedy differs: enable a road layer vs. pick closer points.
#[derive(Debug, Error, PartialEq)]
pub enum RouteError {
    #[error("no route possible: {reason}")]
    EmptyGraph { reason: EmptyReason },

    #[error("no road path connects {from} and {to}")]
    Unreachable { from: NodeId, to: NodeId },

    #[error("node {0} is not part of this graph")]
    UnknownNode(NodeId),

    #[error("route search cancelled")]
    Cancelled,
}

impl RouteError {
    pub fn kind(&self) -> FailureKind {
        match self {
            RouteError::EmptyGraph { .. } => FailureKind::EmptyGraph,
            RouteError::Unreachable { .. } | RouteError::UnknownNode(_) => FailureKind::Unreachable,
            RouteError::Cancelled => FailureKind::Cancelled,
        }
    }
}

// ── Import ────────────────────────────────────────────────────────────────────

/// Errors produced by the road data importers.
#[cfg(any(feature = "geojson", feature = "csv"))]
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("road import parse error: {0}")]
    Parse(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
