use lu_core::CoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DataError {
    #[error("geography validation failed: {0}")]
    Geography(String),

    #[error(transparent)]
    Core(#[from] CoreError),
}

pub type DataResult<T> = Result<T, DataError>;
