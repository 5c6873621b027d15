//! The marriage market: candidacy draws, pairwise utilities, stable matching.
//!
//! # Asymmetric candidate caps
//!
//! Receiver-side candidates (females) are capped at the number of
//! proposer-side candidates (males) collected so far, in collection order.
//! This keeps the utility matrix near-square and bounds the matching cost;
//! late-id receivers simply wait for a later year.
//!
//! The matrix itself is deterministic given the candidate lists, so the
//! `parallel` feature can build its rows on a thread pool without touching
//! the shared RNG.

use tracing::debug;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use lu_core::{PersonId, Year, ZoneId};
use lu_data::household::{Gender, Nationality, PersonRole};
use lu_data::DataStore;
use lu_model::{AnnualModel, EventOutcome, MarketEvent, ModelContext};
use lu_travel::{TravelMode, TravelOracle};

use crate::calibration::MarriageProbabilityTable;
use crate::matching::deferred_acceptance;

// ── Configuration ─────────────────────────────────────────────────────────────

#[derive(Clone, Debug)]
pub struct MarriageConfig {
    /// Youngest age eligible for the marriage market.
    pub min_age: u32,
    /// Oldest eligible age (exclusive).
    pub max_age: u32,
    /// Study-area adjustment applied on top of the base probability table.
    pub scale: f64,
    /// Candidacy multiplier for persons living alone.
    pub single_household_bias: f64,
    /// Weight of the inverse travel-time term.
    pub travel_weight: f64,
    /// Weight of the inverse age-gap term.
    pub age_weight: f64,
    /// Weight of the inverse education-gap term.
    pub education_weight: f64,
    /// Utility bonus for sharing a nationality group.
    pub same_nationality_bonus: f64,
    /// Utility bonus across nationality groups.
    pub other_nationality_bonus: f64,
    /// Minute of day for the travel-time term.
    pub peak_hour_minute: u32,
}

impl Default for MarriageConfig {
    fn default() -> Self {
        Self {
            min_age:                 18,
            max_age:                 100,
            scale:                   1.0,
            single_household_bias:   2.0,
            travel_weight:           40.0,
            age_weight:              1.0,
            education_weight:        1.0,
            same_nationality_bonus:  1.0,
            other_nationality_bonus: 0.5,
            peak_hour_minute:        480,
        }
    }
}

// ── Candidates ────────────────────────────────────────────────────────────────

#[derive(Copy, Clone)]
struct Candidate {
    id: PersonId,
    age: u32,
    education: u8,
    nationality: Nationality,
    home: Option<ZoneId>,
}

// ── MarriageMarket ────────────────────────────────────────────────────────────

/// Annual marriage-market model.
pub struct MarriageMarket {
    config: MarriageConfig,
    table:  MarriageProbabilityTable,
}

impl MarriageMarket {
    pub fn new(config: MarriageConfig, table: MarriageProbabilityTable) -> Self {
        Self { config, table }
    }

    fn pair_utility(&self, oracle: &dyn TravelOracle, male: &Candidate, female: &Candidate) -> f64 {
        let travel = match (male.home, female.home) {
            (Some(from), Some(to)) => {
                let tt =
                    oracle.travel_time(from, to, self.config.peak_hour_minute, TravelMode::Car);
                if tt.is_finite() { self.config.travel_weight / tt.max(1.0) } else { 0.0 }
            }
            _ => 0.0,
        };
        // Couples average a one-year age offset; the gap is measured against
        // that rather than equality.
        let age_gap = (male.age as f64 - 1.0 - female.age as f64).abs();
        let edu_gap = (male.education as i32 - female.education as i32).abs() as f64;
        let nationality = if male.nationality == female.nationality {
            self.config.same_nationality_bonus
        } else {
            self.config.other_nationality_bonus
        };
        travel
            + self.config.age_weight / (1.0 + age_gap)
            + self.config.education_weight / (1.0 + edu_gap)
            + nationality
    }

    #[cfg(feature = "parallel")]
    fn build_matrix(
        &self,
        oracle: &dyn TravelOracle,
        proposers: &[Candidate],
        receivers: &[Candidate],
    ) -> Vec<f64> {
        proposers
            .par_iter()
            .flat_map_iter(|male| {
                receivers
                    .iter()
                    .map(|female| self.pair_utility(oracle, male, female))
                    .collect::<Vec<f64>>()
            })
            .collect()
    }

    #[cfg(not(feature = "parallel"))]
    fn build_matrix(
        &self,
        oracle: &dyn TravelOracle,
        proposers: &[Candidate],
        receivers: &[Candidate],
    ) -> Vec<f64> {
        let mut matrix = Vec::with_capacity(proposers.len() * receivers.len());
        for male in proposers {
            for female in receivers {
                matrix.push(self.pair_utility(oracle, male, female));
            }
        }
        matrix
    }

    fn candidate(&self, person: &lu_data::household::Person, data: &DataStore) -> Candidate {
        let home = data
            .households
            .household(person.household)
            .and_then(|hh| data.real_estate.dwelling(hh.dwelling))
            .map(|dd| dd.zone);
        Candidate {
            id: person.id,
            age: person.age,
            education: person.education,
            nationality: person.nationality,
            home,
        }
    }
}

impl AnnualModel for MarriageMarket {
    fn name(&self) -> &'static str {
        "marriage"
    }

    fn prepare_year(&mut self, _year: Year, ctx: &mut ModelContext<'_>) -> Vec<MarketEvent> {
        let data = &*ctx.data;
        let mut proposers: Vec<Candidate> = Vec::new();
        let mut receivers: Vec<Candidate> = Vec::new();

        for id in data.households.sorted_person_ids() {
            let Some(person) = data.households.person(id) else { continue };
            if person.role == PersonRole::Married
                || person.age < self.config.min_age
                || person.age >= self.config.max_age
            {
                continue;
            }
            let alone = data
                .households
                .household(person.household)
                .is_some_and(|hh| hh.size() == 1);
            let bias = if alone { self.config.single_household_bias } else { 1.0 };
            let p = self.config.scale * self.table.probability(person.gender, person.age) * bias;
            if !ctx.rng.gen_bool(p.min(1.0)) {
                continue;
            }
            match person.gender {
                Gender::Male => proposers.push(self.candidate(person, data)),
                Gender::Female => {
                    if receivers.len() < proposers.len() {
                        receivers.push(self.candidate(person, data));
                    }
                }
            }
        }
        if proposers.is_empty() || receivers.is_empty() {
            return Vec::new();
        }

        let matrix = self.build_matrix(ctx.oracle, &proposers, &receivers);
        deferred_acceptance(proposers.len(), receivers.len(), &matrix)
            .into_iter()
            .map(|(p, r)| MarketEvent::Marriage {
                proposer: proposers[p].id,
                partner:  receivers[r].id,
            })
            .collect()
    }

    fn handle_event(&mut self, event: &MarketEvent, ctx: &mut ModelContext<'_>) -> EventOutcome {
        let &MarketEvent::Marriage { proposer, partner } = event else {
            return EventOutcome::Failed;
        };
        let data = &mut *ctx.data;
        let (Some(a), Some(b)) = (data.households.person(proposer), data.households.person(partner))
        else {
            debug!(%proposer, %partner, "marriage skipped: a partner no longer exists");
            return EventOutcome::Failed;
        };
        if a.role == PersonRole::Married || b.role == PersonRole::Married {
            debug!(%proposer, %partner, "marriage skipped: a partner married elsewhere");
            return EventOutcome::Failed;
        }
        let target = a.household;
        let vacated_dwelling = data
            .households
            .household(b.household)
            .filter(|hh| hh.size() == 1)
            .map(|hh| hh.dwelling);

        if data.households.move_person(partner, target).is_some()
            && let Some(dwelling) = vacated_dwelling
            && dwelling.is_valid()
        {
            data.real_estate.vacate(dwelling, &data.geo);
        }
        for id in [proposer, partner] {
            if let Some(person) = data.households.person_mut(id) {
                person.role = PersonRole::Married;
            }
        }
        EventOutcome::Accepted
    }
}
