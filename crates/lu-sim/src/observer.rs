//! Run observers — the hook for output writers and progress reporting.

use lu_core::Year;
use lu_data::DataStore;

use crate::scheduler::YearSummary;

/// Callbacks at year and run boundaries.
///
/// Observers see the registries read-only between phases; they are where
/// result writers and live dashboards attach without the models knowing.
pub trait SimObserver {
    fn on_year_start(&mut self, _year: Year, _data: &DataStore) {}

    fn on_year_end(&mut self, _summary: &YearSummary, _data: &DataStore) {}

    /// Called once after the final year.
    fn on_run_end(&mut self, _summaries: &[YearSummary], _data: &DataStore) {}
}

/// Observer that does nothing.
pub struct NoopObserver;

impl SimObserver for NoopObserver {}
