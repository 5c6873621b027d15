//! `lu-core` — foundational types for the `rust_lu` land-use microsimulation.
//!
//! This crate is a dependency of every other `lu-*` crate.  It intentionally
//! has no `lu-*` dependencies and minimal external ones (only `rand` and
//! `thiserror`, plus optional `serde`).
//!
//! # What lives here
//!
//! | Module    | Contents                                                  |
//! |-----------|-----------------------------------------------------------|
//! | [`ids`]   | `PersonId`, `HouseholdId`, `DwellingId`, `JobId`, `ZoneId`, `RegionId` |
//! | [`year`]  | `Year`, `SimulationPeriod`                                |
//! | [`rng`]   | `SimRng` (deterministic, with weighted selection)         |
//! | [`error`] | `CoreError`, `CoreResult`                                 |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                              |
//! |---------|-----------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to all public types. |

pub mod error;
pub mod ids;
pub mod rng;
pub mod year;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use error::{CoreError, CoreResult};
pub use ids::{DwellingId, HouseholdId, JobId, PersonId, RegionId, ZoneId};
pub use rng::SimRng;
pub use year::{SimulationPeriod, Year};
