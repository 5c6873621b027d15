//! The `AnnualModel` trait — the main extension point for market models.

use lu_core::{SimRng, Year};
use lu_data::DataStore;
use lu_travel::TravelOracle;

use crate::{EventOutcome, MarketEvent};

/// Mutable simulation state handed to a model for one phase call.
///
/// The scheduler constructs a fresh context per phase, so a model can never
/// hold registry borrows across phases.  Registry mutation is legitimate in
/// `handle_event` and `finish_year`; `prepare_year` should only pre-commit
/// resources whose scarcity its own candidates contend for (the
/// construction market consumes zone capacity at planning time so
/// sequential draws cannot overbuild one zone).
pub struct ModelContext<'a> {
    pub data: &'a mut DataStore,
    pub oracle: &'a dyn TravelOracle,
    /// Shared deterministic RNG; all draws happen in fixed model order.
    pub rng: &'a mut SimRng,
}

impl<'a> ModelContext<'a> {
    pub fn new(
        data: &'a mut DataStore,
        oracle: &'a dyn TravelOracle,
        rng: &'a mut SimRng,
    ) -> Self {
        Self { data, oracle, rng }
    }
}

/// One market model driven through the three-phase annual contract.
///
/// Implementations live in `lu-markets`; the scheduler in `lu-sim` owns a
/// `Vec<Box<dyn AnnualModel>>` in a fixed registration order.  That order
/// encodes cross-model data dependencies (for instance, the construction
/// model's median-income refresh must precede consumers of median income in
/// the same year), so reordering models requires re-validating every such
/// dependency.
pub trait AnnualModel {
    /// Stable model name for logs and year summaries.
    fn name(&self) -> &'static str;

    /// Generate this year's candidate events.
    fn prepare_year(&mut self, year: Year, ctx: &mut ModelContext<'_>) -> Vec<MarketEvent>;

    /// Apply one of this model's own candidate events.
    ///
    /// The scheduler only routes a model its own events, in exactly the
    /// order `prepare_year` produced them.  A `Failed` outcome is counted
    /// and logged, never fatal.
    fn handle_event(&mut self, event: &MarketEvent, ctx: &mut ModelContext<'_>) -> EventOutcome;

    /// Refresh derived aggregates after all of this year's events applied.
    fn finish_year(&mut self, _year: Year, _ctx: &mut ModelContext<'_>) {}
}
