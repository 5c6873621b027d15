//! Framework error type.
//!
//! Sub-crates define their own error enums and either convert into
//! `CoreError` via `From` impls or wrap it as one variant.  Recoverable
//! market outcomes (a failed search, a skipped event) are *values*, never
//! errors — only registry corruption and bad configuration surface here.

use thiserror::Error;

use crate::{DwellingId, HouseholdId, JobId, PersonId, RegionId, ZoneId};

/// The top-level error type for `lu-core` and a common base for sub-crates.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("person {0} not found")]
    PersonNotFound(PersonId),

    #[error("household {0} not found")]
    HouseholdNotFound(HouseholdId),

    #[error("dwelling {0} not found")]
    DwellingNotFound(DwellingId),

    #[error("job {0} not found")]
    JobNotFound(JobId),

    #[error("zone {0} not found")]
    ZoneNotFound(ZoneId),

    #[error("region {0} not found")]
    RegionNotFound(RegionId),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Shorthand result type for all `lu-*` crates.
pub type CoreResult<T> = Result<T, CoreError>;
