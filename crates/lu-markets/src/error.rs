//! Market-crate error type.

use thiserror::Error;

/// Errors raised while configuring market models.
///
/// Calibration problems are fatal at startup; once a model is constructed,
/// market failure during a year is expressed through `EventOutcome::Failed`,
/// never through this type.
#[derive(Error, Debug)]
pub enum MarketError {
    /// A calibration table is malformed or inconsistent.
    #[error("calibration error: {0}")]
    Calibration(String),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type MarketResult<T> = Result<T, MarketError>;
