//! `lu-markets` — the market models driven by the annual scheduler.
//!
//! | Module          | Provides                                             |
//! |-----------------|------------------------------------------------------|
//! | `calibration`   | Startup-validated demand/probability tables          |
//! | `jobs`          | Vacancy index rebuild, two-stage job search          |
//! | `construction`  | Vacancy-driven housing supply and pricing            |
//! | `demolition`    | Stock retirement by quality and age                  |
//! | `marriage`      | Candidacy draws and deferred-acceptance matching     |
//! | `matching`      | Stable matching over a dense utility matrix          |
//! | `car_ownership` | Snapshot-diff automobile transitions                 |
//!
//! Every model implements [`lu_model::AnnualModel`] and is registered with
//! the scheduler in `lu-sim`; nothing here owns the annual loop.

pub mod calibration;
pub mod car_ownership;
pub mod construction;
pub mod demolition;
pub mod error;
pub mod jobs;
pub mod marriage;
pub mod matching;

#[cfg(test)]
mod tests;

// ── Re-exports ────────────────────────────────────────────────────────────────

pub use calibration::{
    CarOwnershipTable, CarTransitionKey, ConstructionDemandCurve, DemandParams,
    MarriageProbabilityTable,
};
pub use car_ownership::CarOwnershipModel;
pub use construction::{ConstructionConfig, ConstructionModel};
pub use demolition::{DemolitionConfig, DemolitionModel};
pub use error::{MarketError, MarketResult};
pub use jobs::{JobMarket, JobMarketConfig};
pub use marriage::{MarriageConfig, MarriageMarket};
pub use matching::deferred_acceptance;
