//! `rl-graph`: road graph construction, node snapping and shortest paths.
//!
//! # Crate layout
//!
//! | Module      | Contents                                                      |
//! |-------------|---------------------------------------------------------------|
//! | [`network`] | `RoadGraph` (CSR + R-tree), `RoadGraphBuilder`, `build_graph` |
//! | [`router`]  | `Router` trait, `PathResult`, `DijkstraRouter`, `shortest_path` |
//! | [`import`]  | GeoJSON / CSV road loaders (feature-gated)                    |
//! | [`error`]   | `GraphError`, `RouteError`, `FailureKind`                     |
//!
//! # Feature flags
//!
//! | Flag      | Effect                                                      |
//! |-----------|-------------------------------------------------------------|
//! | `geojson` | Enables GeoJSON road import via the `geojson` crate.        |
//! | `csv`     | Enables CSV vertex-table road import.                       |
//! | `serde`   | Derives `Serialize`/`Deserialize` on public types.          |

pub mod error;
pub mod network;
pub mod router;

#[cfg(any(feature = "geojson", feature = "csv"))]
pub mod import;


pub use error::{EmptyReason, FailureKind, GraphError, GraphResult, RouteError};
pub use network::{build_graph, quantize, BuildStats, CellKey, GraphEdge, RoadGraph, RoadGraphBuilder, Snap};
pub use router::{shortest_path, DijkstraRouter, PathResult, Router};

#[cfg(any(feature = "geojson", feature = "csv"))]
pub use error::ImportError;
