//! `lu-data` — entity registries for the `rust_lu` microsimulation.
//!
//! This crate is the ownership root of all simulation state.  Every other
//! crate holds typed ids and borrows the registries through [`DataStore`];
//! there is no ambient/static global state anywhere in the workspace.
//!
//! | Module        | Contents                                                 |
//! |---------------|----------------------------------------------------------|
//! | [`geo`]       | `Zone`, `Region`, `Development`, validated `GeoData`     |
//! | [`household`] | `Person`, `Household`, `HouseholdType`, `HouseholdData`  |
//! | [`dwelling`]  | `Dwelling`, `DwellingType`, `RealEstateData`             |
//! | [`job`]       | `Job`, `JobType`, `JobData`                              |
//! | [`vacancy`]   | Bounded index-stable `VacancyIndex`, `RegionalVacancies` |
//! | [`store`]     | `DataStore` bundling the four registries                 |
//!
//! # Mutation discipline
//!
//! Registries are mutated only by the market model currently in its
//! apply phase; candidate-generation workers read them immutably.  The
//! borrow checker enforces this: `ModelContext` hands out `&mut DataStore`
//! only to the single model being driven by the scheduler.

pub mod dwelling;
pub mod error;
pub mod geo;
pub mod household;
pub mod job;
pub mod store;
pub mod vacancy;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use dwelling::{Dwelling, DwellingType, RealEstateData, MAX_QUALITY};
pub use error::{DataError, DataResult};
pub use geo::{CapacityKind, Development, GeoData, Region, Zone};
pub use household::{
    Gender, Household, HouseholdData, HouseholdType, Nationality, Occupation, Person, PersonRole,
};
pub use job::{Job, JobData, JobType};
pub use store::DataStore;
pub use vacancy::{RegionalVacancies, VacancyIndex};
