//! `lu-sim` — the annual simulation loop.
//!
//! The scheduler owns the registered [`AnnualModel`]s and the run's
//! deterministic RNG, and drives each year through the three phases
//! (prepare, apply, finish) in fixed registration order.  Observers hang
//! off year boundaries for output without coupling models to writers.
//!
//! ```no_run
//! use lu_core::SimulationPeriod;
//! use lu_sim::{AnnualScheduler, NoopObserver};
//! # fn run(mut data: lu_data::DataStore, oracle: &dyn lu_travel::TravelOracle,
//! #        models: Vec<Box<dyn lu_model::AnnualModel>>) -> lu_sim::SimResult<()> {
//! let period = SimulationPeriod::default();
//! let mut scheduler = AnnualScheduler::from_period(&period);
//! for model in models {
//!     scheduler.register(model);
//! }
//! let _summaries = scheduler.run(&period, &mut data, oracle, &mut NoopObserver)?;
//! # Ok(()) }
//! ```

pub mod error;
pub mod observer;
pub mod scheduler;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use error::{SimError, SimResult};
pub use observer::{NoopObserver, SimObserver};
pub use scheduler::{AnnualScheduler, ModelStats, YearSummary};

pub use lu_model::AnnualModel;
