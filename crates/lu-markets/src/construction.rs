//! The construction market: vacancy-driven demand, zone choice, pricing.
//!
//! # Planning pipeline (prepare phase)
//!
//! 1. Refresh regional median incomes and real-estate aggregates.
//! 2. For each dwelling type in descending price order, for each region:
//!    demand curve × existing stock, rounded half-up, gives planned units.
//! 3. Each unit draws a zone weighted by β × remaining capacity × location
//!    utility, restricted to zones where the type is permitted and fits.
//!    Capacity is consumed at planning time, so sequential draws within a
//!    year cannot overbuild one zone.
//! 4. Market-rate units price at the local average inflated by a growth
//!    factor; a configured share instead becomes price-restricted,
//!    anchored to the regional median income.
//!
//! Events carry the fully planned dwelling; applying one only materializes
//! it, computes its per-household-type choice utilities, and lists it
//! vacant.  Application therefore always succeeds.

use rustc_hash::FxHashSet;
use tracing::{debug, warn};

use lu_core::{HouseholdId, RegionId, SimRng, Year, ZoneId};
use lu_data::household::HouseholdType;
use lu_data::{DataStore, Dwelling, DwellingType, MAX_QUALITY};
use lu_model::{AnnualModel, EventOutcome, MarketEvent, ModelContext};
use lu_travel::TravelOracle;

use crate::calibration::ConstructionDemandCurve;

// ── Configuration ─────────────────────────────────────────────────────────────

#[derive(Clone, Debug)]
pub struct ConstructionConfig {
    /// Zone-choice sensitivity multiplier (β).
    pub beta_zone_choice: f64,
    /// Price growth factor applied to the local average for new market-rate
    /// units (new stock sells above the standing average).
    pub price_inflator: f64,
    /// Share of new units built price-restricted.
    pub affordable_share: f64,
    /// Restriction level of affordable units (fraction of the market
    /// anchor); recorded on the dwelling for the housing search.
    pub affordable_restriction: f64,
    /// Monthly housing budget as a share of monthly median income, anchoring
    /// restricted prices.
    pub housing_budget_share: f64,
    /// Draw a random micro-coordinate inside the zone for each new unit.
    pub use_micro_coordinates: bool,
}

impl Default for ConstructionConfig {
    fn default() -> Self {
        Self {
            beta_zone_choice:       1.0,
            price_inflator:         1.05,
            affordable_share:       0.0,
            affordable_restriction: 0.7,
            housing_budget_share:   0.3,
            use_micro_coordinates:  false,
        }
    }
}

// ── ConstructionModel ─────────────────────────────────────────────────────────

/// Annual construction model.
pub struct ConstructionModel {
    config: ConstructionConfig,
    demand: ConstructionDemandCurve,
    /// Zones whose missing price observations were already reported this
    /// year, so the fallback warning fires once per zone per year.
    reported_fallbacks: FxHashSet<ZoneId>,
}

impl ConstructionModel {
    pub fn new(config: ConstructionConfig, demand: ConstructionDemandCurve) -> Self {
        Self { config, demand, reported_fallbacks: FxHashSet::default() }
    }

    /// Developer attractiveness of a zone for one dwelling type.
    ///
    /// Increasing in both the achievable price and the zone's
    /// accessibility; the log keeps a price-free zone at utility zero
    /// rather than undefined.
    fn location_utility(avg_price: f64, accessibility: f64) -> f64 {
        (1.0 + avg_price.max(0.0)).ln() * (1.0 + accessibility.max(0.0))
    }

    /// Average price anchor for `dwelling_type` in `zone`, falling back to
    /// the regional then type-wide average.  Each fallback is reported once
    /// per zone per year.
    fn price_anchor(
        &mut self,
        data: &DataStore,
        dwelling_type: DwellingType,
        zone: ZoneId,
        region: RegionId,
    ) -> f64 {
        if let Some(price) = data.real_estate.avg_price_in_zone(dwelling_type, zone) {
            return price;
        }
        if self.reported_fallbacks.insert(zone) {
            debug!(%zone, %dwelling_type, "no price observations in zone, using regional average");
        }
        if let Some(price) = data.real_estate.avg_price_in_region(dwelling_type, region) {
            return price;
        }
        data.real_estate.avg_price_of_type(dwelling_type)
    }

    /// Plan the units of one type demanded in one region, consuming zone
    /// capacity as each unit commits to a zone.
    fn plan_units(
        &mut self,
        dwelling_type: DwellingType,
        region: RegionId,
        units: usize,
        year: Year,
        data: &mut DataStore,
        oracle: &dyn TravelOracle,
        rng: &mut SimRng,
        events: &mut Vec<MarketEvent>,
    ) {
        let Some(zones) = data.geo.region(region).map(|r| r.zones.clone()) else { return };

        for _ in 0..units {
            let weights: Vec<f64> = zones
                .iter()
                .map(|&zone_id| {
                    let Some(zone) = data.geo.zone(zone_id) else { return 0.0 };
                    if !zone.development.can_build(dwelling_type) {
                        return 0.0;
                    }
                    let anchor = self.price_anchor(data, dwelling_type, zone_id, region);
                    self.config.beta_zone_choice
                        * zone.development.remaining_capacity()
                        * Self::location_utility(anchor, oracle.accessibility(zone_id))
                })
                .collect();

            // No zone can take this type any more; the region's remaining
            // units lapse this year.
            let Some(choice) = rng.select_weighted(&weights) else { break };
            let zone_id = zones[choice];
            if let Some(zone) = data.geo.zone_mut(zone_id)
                && !zone.development.consume(dwelling_type)
            {
                warn!(%zone_id, %dwelling_type, "zone capacity vanished under a positive weight");
                continue;
            }

            let restricted = self.config.affordable_share > 0.0
                && rng.gen_bool(self.config.affordable_share);
            let (price, restriction) = if restricted {
                let monthly_median =
                    data.households.median_income(region) as f64 / 12.0;
                let price = self.config.affordable_restriction
                    * monthly_median
                    * self.config.housing_budget_share;
                (price.round() as i32, self.config.affordable_restriction as f32)
            } else {
                let anchor = self.price_anchor(data, dwelling_type, zone_id, region);
                ((self.config.price_inflator * anchor).round() as i32, 0.0)
            };

            let bedrooms = data
                .real_estate
                .avg_bedrooms(dwelling_type, region)
                .round()
                .max(1.0) as u32;

            let coordinate = self
                .config
                .use_micro_coordinates
                .then(|| (rng.gen_unit(), rng.gen_unit()));

            let dwelling = Dwelling {
                id: data.real_estate.next_dwelling_id(),
                zone: zone_id,
                resident: HouseholdId::INVALID,
                dwelling_type,
                quality: MAX_QUALITY,
                price,
                bedrooms,
                year_built: year,
                restriction,
                coordinate,
                utilities: Default::default(),
            };
            events.push(MarketEvent::Construction(Box::new(dwelling)));
        }
    }

    /// Choice utility of a dwelling for one household type: quality times a
    /// size fit times price affordability against the bracket's income.
    fn choice_utility(household_type: HouseholdType, dwelling: &Dwelling) -> f64 {
        // Bracket midpoints of the classification bounds.
        const BRACKET_MONTHLY_INCOME: [f64; 4] = [833.0, 2_500.0, 4_167.0, 6_667.0];
        let income = BRACKET_MONTHLY_INCOME[household_type.income_bracket as usize];
        let quality = dwelling.quality as f64 / MAX_QUALITY as f64;
        let size_gap =
            (dwelling.bedrooms as f64 - household_type.size_class as f64).abs();
        let burden = (dwelling.price as f64).max(0.0) / income;
        quality * (1.0 / (1.0 + size_gap)) * (1.0 / (1.0 + burden))
    }
}

impl AnnualModel for ConstructionModel {
    fn name(&self) -> &'static str {
        "construction"
    }

    fn prepare_year(&mut self, year: Year, ctx: &mut ModelContext<'_>) -> Vec<MarketEvent> {
        self.reported_fallbacks.clear();

        let data = &mut *ctx.data;
        data.households.update_median_income_by_region(&data.geo, &data.real_estate);
        data.real_estate.refresh_aggregates(&data.geo);

        let mut events = Vec::new();
        let types = data.real_estate.types_by_descending_price();
        let regions = data.geo.sorted_region_ids();
        for dwelling_type in types {
            for &region in &regions {
                let stock = data.real_estate.stock(dwelling_type, region);
                if stock == 0 {
                    continue;
                }
                let vacancy = data.real_estate.vacancy_rate(dwelling_type, region);
                let fraction = self.demand.demand(dwelling_type, vacancy);
                let units = (stock as f64 * fraction + 0.5) as usize;
                if units == 0 {
                    continue;
                }
                self.plan_units(
                    dwelling_type,
                    region,
                    units,
                    year,
                    data,
                    ctx.oracle,
                    ctx.rng,
                    &mut events,
                );
            }
        }
        events
    }

    fn handle_event(&mut self, event: &MarketEvent, ctx: &mut ModelContext<'_>) -> EventOutcome {
        let MarketEvent::Construction(planned) = event else {
            return EventOutcome::Failed;
        };
        let mut dwelling = (**planned).clone();
        for household_type in HouseholdType::all() {
            let utility = Self::choice_utility(household_type, &dwelling);
            dwelling.utilities.insert(household_type, utility);
        }
        let data = &mut *ctx.data;
        data.real_estate.add_dwelling(dwelling, &data.geo);
        EventOutcome::Accepted
    }

    fn finish_year(&mut self, year: Year, ctx: &mut ModelContext<'_>) {
        let overflow = ctx.data.real_estate.vacancies().total_overflow();
        if overflow > 0 {
            debug!(%year, overflow, "dwelling vacancy index overflow to date");
        }
    }
}
