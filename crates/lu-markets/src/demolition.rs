//! The demolition model: aging, low-quality stock leaves the market.

use tracing::debug;

use lu_core::{DwellingId, Year};
use lu_data::MAX_QUALITY;
use lu_model::{AnnualModel, EventOutcome, MarketEvent, ModelContext};

// ── Configuration ─────────────────────────────────────────────────────────────

#[derive(Clone, Debug)]
pub struct DemolitionConfig {
    /// Base annual demolition probability of a top-quality dwelling.
    pub base_rate: f64,
    /// Probability multiplier per quality level below the maximum.
    pub quality_multiplier: f64,
    /// Age in years beyond which the old-stock multiplier applies.
    pub old_age_threshold: u32,
    /// Probability multiplier for stock older than the threshold.
    pub old_age_multiplier: f64,
}

impl Default for DemolitionConfig {
    fn default() -> Self {
        Self {
            base_rate:          0.0005,
            quality_multiplier: 2.0,
            old_age_threshold:  60,
            old_age_multiplier: 3.0,
        }
    }
}

// ── DemolitionModel ───────────────────────────────────────────────────────────

/// Annual demolition model.
pub struct DemolitionModel {
    config: DemolitionConfig,
}

impl DemolitionModel {
    pub fn new(config: DemolitionConfig) -> Self {
        Self { config }
    }

    /// Annual demolition probability of one dwelling.
    fn probability(&self, quality: u8, age: u32) -> f64 {
        let steps = MAX_QUALITY.saturating_sub(quality) as i32;
        let mut p = self.config.base_rate * self.config.quality_multiplier.powi(steps);
        if age > self.config.old_age_threshold {
            p *= self.config.old_age_multiplier;
        }
        p.min(1.0)
    }
}

impl AnnualModel for DemolitionModel {
    fn name(&self) -> &'static str {
        "demolition"
    }

    fn prepare_year(&mut self, year: Year, ctx: &mut ModelContext<'_>) -> Vec<MarketEvent> {
        let mut events = Vec::new();
        for id in ctx.data.real_estate.sorted_dwelling_ids() {
            let Some(dwelling) = ctx.data.real_estate.dwelling(id) else { continue };
            let age = year.since(dwelling.year_built).max(0) as u32;
            if ctx.rng.gen_bool(self.probability(dwelling.quality, age)) {
                events.push(MarketEvent::Demolition { dwelling: id });
            }
        }
        events
    }

    fn handle_event(&mut self, event: &MarketEvent, ctx: &mut ModelContext<'_>) -> EventOutcome {
        let &MarketEvent::Demolition { dwelling } = event else {
            return EventOutcome::Failed;
        };
        let data = &mut *ctx.data;
        let Some(dd) = data.real_estate.dwelling(dwelling) else {
            debug!(%dwelling, "demolition skipped: dwelling no longer exists");
            return EventOutcome::Failed;
        };
        let resident = dd.resident;
        let (zone, dwelling_type) = (dd.zone, dd.dwelling_type);

        // Displaced residents keep their household but lose their home; the
        // housing search re-places them.
        if resident.is_valid()
            && let Some(hh) = data.households.household_mut(resident)
        {
            hh.dwelling = DwellingId::INVALID;
        }
        data.real_estate.remove_dwelling(dwelling, &data.geo);
        if let Some(zone) = data.geo.zone_mut(zone) {
            zone.development.restore(dwelling_type);
        }
        EventOutcome::Accepted
    }
}
