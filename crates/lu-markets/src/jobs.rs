//! The job market: vacancy identification, two-stage search, hire and quit.
//!
//! # Search stages
//!
//! A searcher with a home zone first weights every region with vacancies by
//! commute attractiveness × vacancy count, where attractiveness comes from
//! the empirical trip-length table.  When every region scores zero (all
//! commutes lie outside the surveyed domain), the search retries in a
//! "desperate" stage weighted by inverse travel time alone, which accepts
//! any reachable region.  A searcher without a home zone (in-migrant whose
//! household is not yet placed) weights regions purely by vacancy count.
//! Within the drawn region, the concrete job is a uniform sample from the
//! vacancy index.

use tracing::{debug, warn};

use lu_core::{JobId, PersonId, SimRng, Year, ZoneId};
use lu_data::household::Occupation;
use lu_data::{DataStore, GeoData, JobData};
use lu_model::{AnnualModel, EventOutcome, MarketEvent, ModelContext};
use lu_travel::{CommutingTimeProbability, TravelMode, TravelOracle};

// ── Configuration ─────────────────────────────────────────────────────────────

#[derive(Clone, Debug)]
pub struct JobMarketConfig {
    /// Fraction of wage income retained after a quit (severance and
    /// unemployment benefits).
    pub income_retention_on_quit: f64,
    /// Minute of day at which commute times are queried.
    pub peak_hour_minute: u32,
    /// Youngest age allowed to search.
    pub min_working_age: u32,
    /// Oldest age allowed to search.
    pub max_working_age: u32,
}

impl Default for JobMarketConfig {
    fn default() -> Self {
        Self {
            income_retention_on_quit: 0.6,
            peak_hour_minute:         480,
            min_working_age:          18,
            max_working_age:          64,
        }
    }
}

// ── JobMarket ─────────────────────────────────────────────────────────────────

/// Annual job-market model.
pub struct JobMarket {
    config: JobMarketConfig,
    tlfd:   CommutingTimeProbability,
}

impl JobMarket {
    pub fn new(config: JobMarketConfig, tlfd: CommutingTimeProbability) -> Self {
        Self { config, tlfd }
    }

    /// Rebuild the per-region job vacancy index from the registry.
    ///
    /// Scans jobs in ascending id order, so rebuilding from the same
    /// registry state always produces the same per-region counts.  Entries
    /// beyond a region's cap are dropped and counted; a single summary
    /// warning covers the whole scan.
    pub fn identify_vacancies(jobs: &mut JobData, geo: &GeoData) {
        let overflow_before = jobs.vacancies().total_overflow();
        jobs.vacancies_mut().clear();
        for id in jobs.sorted_job_ids() {
            let Some(job) = jobs.job(id) else { continue };
            if !job.is_vacant() {
                continue;
            }
            let zone = job.zone;
            if let Some(region) = geo.region_of(zone) {
                jobs.vacancies_mut().insert(region, id);
            } else {
                warn!(%id, %zone, "vacant job in unknown zone, not indexed");
            }
        }
        let dropped = jobs.vacancies().total_overflow() - overflow_before;
        if dropped > 0 {
            warn!(dropped, "job vacancy index full; searches see a bounded sample");
        }
    }

    /// Find a vacant job for a searcher living in `home` and remove it from
    /// the vacancy index.  `None` when no region holds a reachable vacancy.
    pub fn find_vacant_job(
        &self,
        home: Option<ZoneId>,
        data: &mut DataStore,
        oracle: &dyn TravelOracle,
        rng: &mut SimRng,
    ) -> Option<JobId> {
        let regions = data.geo.sorted_region_ids();
        let counts: Vec<usize> =
            regions.iter().map(|&r| data.jobs.vacancies().count(r)).collect();

        let weights = match home {
            Some(home) => {
                let minutes: Vec<f64> = regions
                    .iter()
                    .map(|&r| match data.geo.region(r) {
                        Some(region) => oracle.travel_time_to_region(
                            home,
                            region,
                            self.config.peak_hour_minute,
                            TravelMode::Car,
                        ),
                        None => f64::INFINITY,
                    })
                    .collect();

                let primary: Vec<f64> = minutes
                    .iter()
                    .zip(&counts)
                    .map(|(&tt, &count)| self.tlfd.utility_for_time(tt) * count as f64)
                    .collect();
                if primary.iter().any(|&w| w > 0.0) {
                    primary
                } else {
                    // Desperate stage: accept any region with a vacancy.  An
                    // unreachable region still gets a floor weight so a
                    // searcher stranded by the network can take a job and
                    // relocate through the housing market later.
                    minutes
                        .iter()
                        .zip(&counts)
                        .map(|(&tt, &count)| {
                            if count == 0 {
                                0.0
                            } else if tt.is_finite() {
                                1.0 / tt.max(1.0)
                            } else {
                                f64::MIN_POSITIVE
                            }
                        })
                        .collect()
                }
            }
            None => counts.iter().map(|&c| c as f64).collect(),
        };

        let region = regions[rng.select_weighted(&weights)?];
        data.jobs.vacancies_mut().take_sample(region, rng)
    }

    /// Place `person` into `job`, linking both directions.  The job leaves
    /// the vacancy index; a no-op when the search already removed it.
    pub fn hire(&self, person: PersonId, job: JobId, data: &mut DataStore) -> bool {
        if data.households.person(person).is_none() {
            warn!(%person, "cannot hire: person not found");
            return false;
        }
        let Some(jj) = data.jobs.job_mut(job) else {
            warn!(%job, "cannot hire: job not found");
            return false;
        };
        jj.worker = person;
        let zone = jj.zone;
        if let Some(region) = data.geo.region_of(zone) {
            data.jobs.vacancies_mut().remove(region, job);
        }
        let household = match data.households.person_mut(person) {
            Some(p) => {
                p.workplace = job;
                p.occupation = Occupation::Employed;
                p.household
            }
            None => return false,
        };
        data.households.refresh_household_type(household);
        true
    }

    /// `person` gives up their job and keeps a configured fraction of their
    /// wage income.  With `make_available` the slot re-enters the vacancy
    /// index; without it the caller is retiring the slot (death, firm
    /// closure) and other searchers must not see it.
    pub fn quit_job(&self, person: PersonId, make_available: bool, data: &mut DataStore) {
        let Some(p) = data.households.person(person) else {
            warn!(%person, "cannot quit job: person not found");
            return;
        };
        let job = p.workplace;
        let household = p.household;
        if let Some(jj) = data.jobs.job_mut(job) {
            jj.worker = PersonId::INVALID;
            let zone = jj.zone;
            if make_available && let Some(region) = data.geo.region_of(zone) {
                data.jobs.vacancies_mut().insert(region, job);
            }
        }
        if let Some(p) = data.households.person_mut(person) {
            p.workplace = JobId::INVALID;
            p.occupation = Occupation::Unemployed;
            p.income = (p.income as f64 * self.config.income_retention_on_quit) as i32;
        }
        data.households.refresh_household_type(household);
    }

    fn home_zone(&self, person: PersonId, data: &DataStore) -> Option<ZoneId> {
        let p = data.households.person(person)?;
        let hh = data.households.household(p.household)?;
        data.real_estate.dwelling(hh.dwelling).map(|dd| dd.zone)
    }
}

impl AnnualModel for JobMarket {
    fn name(&self) -> &'static str {
        "job-market"
    }

    fn prepare_year(&mut self, _year: Year, ctx: &mut ModelContext<'_>) -> Vec<MarketEvent> {
        Self::identify_vacancies(&mut ctx.data.jobs, &ctx.data.geo);

        let mut events = Vec::new();
        for id in ctx.data.households.sorted_person_ids() {
            let Some(person) = ctx.data.households.person(id) else { continue };
            if person.occupation != Occupation::Unemployed {
                continue;
            }
            if person.age < self.config.min_working_age
                || person.age > self.config.max_working_age
            {
                continue;
            }
            events.push(MarketEvent::JobSearch { person: id });
        }
        events
    }

    fn handle_event(&mut self, event: &MarketEvent, ctx: &mut ModelContext<'_>) -> EventOutcome {
        let &MarketEvent::JobSearch { person } = event else {
            return EventOutcome::Failed;
        };
        // The person may have left between prepare and apply (death,
        // out-migration handled by another model).
        if ctx.data.households.person(person).is_none() {
            debug!(%person, "job search skipped: person no longer exists");
            return EventOutcome::Failed;
        }
        let home = self.home_zone(person, ctx.data);
        match self.find_vacant_job(home, ctx.data, ctx.oracle, ctx.rng) {
            Some(job) if self.hire(person, job, ctx.data) => EventOutcome::Accepted,
            Some(_) => EventOutcome::Failed,
            None => {
                debug!(%person, "job search failed: no reachable vacancy");
                EventOutcome::Failed
            }
        }
    }

    fn finish_year(&mut self, _year: Year, ctx: &mut ModelContext<'_>) {
        ctx.data.jobs.calculate_job_density(&ctx.data.geo);
    }
}
