use thiserror::Error;

#[derive(Debug, Error)]
pub enum TravelError {
    #[error("skim matrix has {got} cells, expected {expected} (zones²)")]
    Dimension { expected: usize, got: usize },

    #[error("trip-length table parse error: {0}")]
    Parse(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type TravelResult<T> = Result<T, TravelError>;
