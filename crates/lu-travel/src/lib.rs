//! `lu-travel` — the travel-time/accessibility oracle contract.
//!
//! The simulation core never computes paths.  Everything it knows about the
//! transport system arrives through the [`TravelOracle`] trait: a travel
//! time in minutes between two zones at a time of day, and a scalar
//! accessibility score per zone.  The adapter behind the trait may be a
//! precomputed skim matrix ([`SkimOracle`]) or a full traffic simulator —
//! the core tolerates answers that are piecewise-constant within a
//! time-of-day bucket.
//!
//! | Module     | Contents                                            |
//! |------------|-----------------------------------------------------|
//! | [`oracle`] | `TravelOracle` trait, `TravelMode`                  |
//! | [`skim`]   | `SkimOracle` — dense matrices per time bucket       |
//! | [`tlfd`]   | `CommutingTimeProbability` — trip-length utilities  |
//! | [`error`]  | `TravelError`, `TravelResult`                       |

pub mod error;
pub mod oracle;
pub mod skim;
pub mod tlfd;

#[cfg(test)]
mod tests;

// ── Re-exports ────────────────────────────────────────────────────────────────

pub use error::{TravelError, TravelResult};
pub use oracle::{TravelMode, TravelOracle};
pub use skim::SkimOracle;
pub use tlfd::CommutingTimeProbability;
