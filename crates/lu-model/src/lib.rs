//! `lu-model` — the annual event contract every market model obeys.
//!
//! # Three-phase year
//!
//! ```text
//! for model in models (fixed order):
//!   ① prepare_year — read-only over registries + oracle, produce candidate
//!                    events (may pre-commit scarce resources, e.g. land)
//! for model in models (fixed order):
//!   ② handle_event — apply that model's own candidates in production order,
//!                    mutating registries; each returns Accepted or Failed
//! for model in models (fixed order):
//!   ③ finish_year  — refresh derived aggregates for the next year
//! ```
//!
//! Models are trait objects behind [`AnnualModel`]; there is no inheritance
//! hierarchy.  A model never sees another model's events, and a failed
//! event never aborts the year — the scheduler counts and logs it.

pub mod event;
pub mod model;

#[cfg(test)]
mod tests;

// ── Re-exports ────────────────────────────────────────────────────────────────

pub use event::{EventOutcome, HouseholdSnapshot, MarketEvent};
pub use model::{AnnualModel, ModelContext};
