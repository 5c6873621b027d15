//! Scheduler error type.

use lu_core::Year;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SimError {
    /// A run was started with no registered models.
    #[error("no models registered")]
    NoModels,

    /// The simulation period is inverted.
    #[error("invalid period: start {start} after end {end}")]
    InvalidPeriod { start: Year, end: Year },
}

pub type SimResult<T> = Result<T, SimError>;
