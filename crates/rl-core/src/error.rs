//! Core error type.
//!
//! Sub-crates define their own error enums for their failure modes; this one
//! only covers what `rl-core` itself can reject.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("configuration error: {0}")]
    Config(String),
}

/// Shorthand result type for `rl-core`.
pub type CoreResult<T> = Result<T, CoreError>;
