//! Worker error types.

use thiserror::Error;

use rl_core::CoreError;

#[derive(Debug, Error)]
pub enum WorkerError {
    #[error(transparent)]
    Config(#[from] CoreError),

    #[error("failed to spawn worker thread: {0}")]
    Spawn(#[source] std::io::Error),

    /// The worker thread is gone and the job will never be answered.
    #[error("route worker disconnected")]
    Disconnected,
}

pub type WorkerResult<T> = Result<T, WorkerError>;
