//! `rl-core`: foundational types for the `roadline` routing and conformance
//! engine.
//!
//! This crate is a dependency of every other `rl-*` crate.  It has no `rl-*`
//! dependencies and only `thiserror` (plus optional `serde`) from outside.
//!
//! # What lives here
//!
//! | Module     | Contents                                                   |
//! |------------|------------------------------------------------------------|
//! | [`ids`]    | `NodeId`, `EdgeId`, `FeatureId`                            |
//! | [`geo`]    | `Coord`, distance / projection / interpolation primitives  |
//! | [`road`]   | `RoadFeature`, `RoadClass`, `LayerFilter`, eligibility     |
//! | [`config`] | `EngineConfig`, `ConformanceParams`, `ConformanceMode`     |
//! | [`progress`] | `ProgressObserver`, `ProgressEvent`, `Phase`, `Throttle` |
//! | [`error`]  | `CoreError`, `CoreResult`                                  |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to all public types.        |

pub mod config;
pub mod error;
pub mod geo;
pub mod ids;
pub mod progress;
pub mod road;

#[cfg(test)]
mod tests;

// ── Re-exports ────────────────────────────────────────────────────────────────

pub use config::{ConformanceMode, ConformanceParams, EngineConfig};
pub use error::{CoreError, CoreResult};
pub use geo::Coord;
pub use ids::{EdgeId, FeatureId, NodeId};
pub use progress::{NoopProgress, Phase, ProgressEvent, ProgressObserver, Throttle};
pub use road::{LayerFilter, RoadClass, RoadFeature};
