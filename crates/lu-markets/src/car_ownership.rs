//! The car-ownership transition model.
//!
//! Compares every household against its snapshot from the last year
//! boundary; a change in size, income, license holders, or residence
//! triggers a transition draw against the calibration table.  The first
//! year only establishes snapshots.

use rustc_hash::FxHashMap;

use lu_core::{DwellingId, HouseholdId, Year};
use lu_data::DataStore;
use lu_model::{AnnualModel, EventOutcome, HouseholdSnapshot, MarketEvent, ModelContext};

use crate::calibration::{CarOwnershipTable, CarTransitionKey};

/// Annual car-ownership model.
pub struct CarOwnershipModel {
    table: CarOwnershipTable,
    snapshots: FxHashMap<HouseholdId, (HouseholdSnapshot, DwellingId)>,
}

impl CarOwnershipModel {
    pub fn new(table: CarOwnershipTable) -> Self {
        Self { table, snapshots: FxHashMap::default() }
    }

    fn observe(data: &DataStore, household: HouseholdId) -> Option<(HouseholdSnapshot, DwellingId)> {
        let hh = data.households.household(household)?;
        let license_holders = hh
            .members
            .iter()
            .filter_map(|&m| data.households.person(m))
            .filter(|p| p.driver_license)
            .count();
        let snapshot = HouseholdSnapshot {
            size: hh.size(),
            income: data.households.household_income(household),
            license_holders,
            changed_residence: false,
        };
        Some((snapshot, hh.dwelling))
    }

    fn refresh_snapshots(&mut self, data: &DataStore) {
        self.snapshots.clear();
        for id in data.households.sorted_household_ids() {
            if let Some(observed) = Self::observe(data, id) {
                self.snapshots.insert(id, observed);
            }
        }
    }
}

impl AnnualModel for CarOwnershipModel {
    fn name(&self) -> &'static str {
        "car-ownership"
    }

    fn prepare_year(&mut self, _year: Year, ctx: &mut ModelContext<'_>) -> Vec<MarketEvent> {
        let data = &*ctx.data;
        if self.snapshots.is_empty() {
            // Baseline year: nothing to diff against yet.
            self.refresh_snapshots(data);
            return Vec::new();
        }

        let mut events = Vec::new();
        for id in data.households.sorted_household_ids() {
            let Some((current, dwelling)) = Self::observe(data, id) else { continue };
            let Some(&(previous, prev_dwelling)) = self.snapshots.get(&id) else {
                // Newly formed household; it enters the diff next year.
                continue;
            };
            let changed_residence = dwelling != prev_dwelling;
            if current.size == previous.size
                && current.income == previous.income
                && current.license_holders == previous.license_holders
                && !changed_residence
            {
                continue;
            }
            let mut previous = previous;
            previous.changed_residence = changed_residence;
            events.push(MarketEvent::CarOwnershipUpdate { household: id, previous });
        }
        events
    }

    fn handle_event(&mut self, event: &MarketEvent, ctx: &mut ModelContext<'_>) -> EventOutcome {
        let &MarketEvent::CarOwnershipUpdate { household, previous } = event else {
            return EventOutcome::Failed;
        };
        let data = &mut *ctx.data;
        let Some((current, _)) = Self::observe(data, household) else {
            return EventOutcome::Failed;
        };
        let Some(hh) = data.households.household(household) else {
            return EventOutcome::Failed;
        };
        let key = CarTransitionKey {
            prev_autos:        hh.autos,
            size_up:           current.size > previous.size,
            size_down:         current.size < previous.size,
            income_up:         current.income > previous.income,
            income_down:       current.income < previous.income,
            license_up:        current.license_holders > previous.license_holders,
            changed_residence: previous.changed_residence,
        };
        let probs = self.table.get(key);
        let Some(choice) = ctx.rng.select_weighted(&probs) else {
            return EventOutcome::Failed;
        };
        if let Some(hh) = data.households.household_mut(household) {
            hh.autos = match choice {
                0 => hh.autos.saturating_sub(1),
                1 => hh.autos,
                _ => (hh.autos + 1).min(CarOwnershipTable::MAX_AUTOS),
            };
        }
        EventOutcome::Accepted
    }

    fn finish_year(&mut self, _year: Year, ctx: &mut ModelContext<'_>) {
        // Re-baseline on the post-event state so next year diffs against
        // what this year actually produced.
        self.refresh_snapshots(ctx.data);
    }
}
