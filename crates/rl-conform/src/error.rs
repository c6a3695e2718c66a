use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConformError {
    #[error("line validation cancelled")]
    Cancelled,
}

pub type ConformResult<T> = Result<T, ConformError>;
