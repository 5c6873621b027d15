//! The annual scheduler: drives every model through the three-phase year.

use tracing::{debug, info};

use lu_core::{SimRng, SimulationPeriod, Year};
use lu_data::DataStore;
use lu_model::{AnnualModel, MarketEvent, ModelContext};
use lu_travel::TravelOracle;

use crate::error::{SimError, SimResult};
use crate::observer::SimObserver;

// ── Year summaries ────────────────────────────────────────────────────────────

/// Per-model event counts for one year.
#[derive(Clone, Debug)]
pub struct ModelStats {
    pub model: &'static str,
    pub produced: usize,
    pub accepted: usize,
    pub failed: usize,
}

/// What one simulated year did.
#[derive(Clone, Debug)]
pub struct YearSummary {
    pub year: Year,
    pub models: Vec<ModelStats>,
}

impl YearSummary {
    pub fn total_accepted(&self) -> usize {
        self.models.iter().map(|m| m.accepted).sum()
    }

    pub fn total_failed(&self) -> usize {
        self.models.iter().map(|m| m.failed).sum()
    }
}

// ── AnnualScheduler ───────────────────────────────────────────────────────────

/// Owns the registered models and the shared deterministic RNG.
///
/// Registration order is execution order in every phase, and it is part of
/// the reproducibility contract: the same models registered in the same
/// order with the same seed replay the same run.  A model only ever
/// receives its own events, in exactly the order its prepare phase
/// produced them.
pub struct AnnualScheduler {
    models: Vec<Box<dyn AnnualModel>>,
    rng: SimRng,
}

impl AnnualScheduler {
    pub fn new(seed: u64) -> Self {
        Self { models: Vec::new(), rng: SimRng::new(seed) }
    }

    pub fn from_period(period: &SimulationPeriod) -> Self {
        Self::new(period.seed)
    }

    /// Append a model; it runs after every previously registered model.
    pub fn register(&mut self, model: Box<dyn AnnualModel>) -> &mut Self {
        self.models.push(model);
        self
    }

    pub fn model_count(&self) -> usize {
        self.models.len()
    }

    /// Run one complete year: prepare all, apply all, finish all.
    ///
    /// Failed events are counted and logged, never fatal; the only errors
    /// here are configuration errors caught before any phase runs.
    pub fn run_year(
        &mut self,
        year: Year,
        data: &mut DataStore,
        oracle: &dyn TravelOracle,
    ) -> SimResult<YearSummary> {
        if self.models.is_empty() {
            return Err(SimError::NoModels);
        }

        let mut queues: Vec<Vec<MarketEvent>> = Vec::with_capacity(self.models.len());
        for model in &mut self.models {
            let mut ctx = ModelContext::new(data, oracle, &mut self.rng);
            let events = model.prepare_year(year, &mut ctx);
            debug!(%year, model = model.name(), produced = events.len(), "prepared");
            queues.push(events);
        }

        let mut stats = Vec::with_capacity(self.models.len());
        for (model, queue) in self.models.iter_mut().zip(&queues) {
            let mut accepted = 0usize;
            let mut failed = 0usize;
            for event in queue {
                let mut ctx = ModelContext::new(data, oracle, &mut self.rng);
                if model.handle_event(event, &mut ctx).is_accepted() {
                    accepted += 1;
                } else {
                    failed += 1;
                    debug!(%year, model = model.name(), kind = event.kind(), "event failed");
                }
            }
            stats.push(ModelStats {
                model: model.name(),
                produced: queue.len(),
                accepted,
                failed,
            });
        }

        for model in &mut self.models {
            let mut ctx = ModelContext::new(data, oracle, &mut self.rng);
            model.finish_year(year, &mut ctx);
        }

        let summary = YearSummary { year, models: stats };
        info!(
            %year,
            accepted = summary.total_accepted(),
            failed = summary.total_failed(),
            "year complete"
        );
        Ok(summary)
    }

    /// Run every year of `period`, notifying `observer` at year boundaries.
    pub fn run(
        &mut self,
        period: &SimulationPeriod,
        data: &mut DataStore,
        oracle: &dyn TravelOracle,
        observer: &mut dyn SimObserver,
    ) -> SimResult<Vec<YearSummary>> {
        if period.start_year > period.end_year {
            return Err(SimError::InvalidPeriod {
                start: period.start_year,
                end:   period.end_year,
            });
        }
        let mut summaries = Vec::with_capacity(period.len_years());
        for year in period.years() {
            observer.on_year_start(year, data);
            let summary = self.run_year(year, data, oracle)?;
            observer.on_year_end(&summary, data);
            summaries.push(summary);
        }
        observer.on_run_end(&summaries, data);
        Ok(summaries)
    }
}
