//! `rl-conform`: checks that a drawn line follows the road network.
//!
//! A [`RoadIndex`] is built once from the eligible road features and reused
//! for every check while the user draws.  Three checks are offered:
//!
//! | Check                         | Used for                                  |
//! |-------------------------------|-------------------------------------------|
//! | [`RoadIndex::check_point`]    | placing a single stop                     |
//! | [`RoadIndex::check_segment`]  | each new segment while drawing            |
//! | [`RoadIndex::validate`]       | a whole line, in construction or final mode |
//!
//! # Crate layout
//!
//! | Module       | Contents                                                   |
//! |--------------|------------------------------------------------------------|
//! | [`index`]    | `RoadIndex` (segment R-tree), `PointCheck`, `SegmentRef`   |
//! | [`validate`] | `ValidationResult`, `Rejection`, `validate_conformance`    |
//! | [`error`]    | `ConformError`, `ConformResult<T>`                         |
//!
//! # Feature flags
//!
//! | Flag       | Effect                                                   |
//! |------------|----------------------------------------------------------|
//! | `parallel` | Runs the per-point distance pass on Rayon.               |
//! | `serde`    | Derives `Serialize`/`Deserialize` on public types.       |

pub mod error;
pub mod index;
pub mod validate;


pub use error::{ConformError, ConformResult};
pub use index::{PointCheck, RoadIndex, SegmentRef};
pub use validate::{validate_conformance, Rejection, ValidationResult};
