//! Jobs and the job registry.

use rustc_hash::FxHashMap;

use lu_core::{JobId, PersonId, ZoneId};

use crate::geo::GeoData;
use crate::vacancy::RegionalVacancies;

// ── JobType ───────────────────────────────────────────────────────────────────

/// Employment sector of a job.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum JobType {
    Agriculture,
    Manufacturing,
    Retail,
    Office,
    Services,
}

impl JobType {
    pub const ALL: [JobType; 5] = [
        JobType::Agriculture,
        JobType::Manufacturing,
        JobType::Retail,
        JobType::Office,
        JobType::Services,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            JobType::Agriculture   => "agriculture",
            JobType::Manufacturing => "manufacturing",
            JobType::Retail        => "retail",
            JobType::Office        => "office",
            JobType::Services      => "services",
        }
    }
}

impl std::fmt::Display for JobType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Job ───────────────────────────────────────────────────────────────────────

/// One job slot.
///
/// Invariant: vacant iff `worker == PersonId::INVALID`, symmetric with the
/// worker's `workplace` field (maintained by the job market's hire/quit
/// operations).
#[derive(Clone, Debug)]
pub struct Job {
    pub id: JobId,
    pub zone: ZoneId,
    pub job_type: JobType,
    pub worker: PersonId,
}

impl Job {
    #[inline]
    pub fn is_vacant(&self) -> bool {
        !self.worker.is_valid()
    }
}

// ── JobData ───────────────────────────────────────────────────────────────────

/// Job registry with per-region bounded vacancy index and zonal density.
pub struct JobData {
    jobs: FxHashMap<JobId, Job>,
    next_job_id: u32,
    vacancies: RegionalVacancies<JobId>,
    density_by_zone: FxHashMap<ZoneId, f64>,
}

impl JobData {
    pub fn new(vacancy_cap_per_region: usize) -> Self {
        Self {
            jobs: FxHashMap::default(),
            next_job_id: 0,
            vacancies: RegionalVacancies::new(vacancy_cap_per_region),
            density_by_zone: FxHashMap::default(),
        }
    }

    // ── Lookup ────────────────────────────────────────────────────────────

    #[inline]
    pub fn job(&self, id: JobId) -> Option<&Job> {
        self.jobs.get(&id)
    }

    #[inline]
    pub fn job_mut(&mut self, id: JobId) -> Option<&mut Job> {
        self.jobs.get_mut(&id)
    }

    pub fn job_count(&self) -> usize {
        self.jobs.len()
    }

    pub fn jobs(&self) -> impl Iterator<Item = &Job> {
        self.jobs.values()
    }

    /// Job ids in ascending order, for reproducible scans.
    pub fn sorted_job_ids(&self) -> Vec<JobId> {
        let mut ids: Vec<JobId> = self.jobs.keys().copied().collect();
        ids.sort();
        ids
    }

    /// Reserve the next unused job id.
    pub fn next_job_id(&mut self) -> JobId {
        let id = JobId(self.next_job_id);
        self.next_job_id += 1;
        id
    }

    /// Reserve `amount` consecutive job ids (parallel job creation reserves
    /// ids up front so workers never contend on the counter).
    pub fn next_job_ids(&mut self, amount: usize) -> Vec<JobId> {
        (0..amount).map(|_| self.next_job_id()).collect()
    }

    // ── Registry mutation ─────────────────────────────────────────────────

    /// Insert a job with a pre-reserved id.
    pub fn add_job(&mut self, job: Job) {
        self.next_job_id = self.next_job_id.max(job.id.0 + 1);
        self.jobs.insert(job.id, job);
    }

    /// Remove a job (economic decline), repairing the vacancy index.
    pub fn remove_job(&mut self, id: JobId, geo: &GeoData) -> Option<Job> {
        let job = self.jobs.remove(&id)?;
        if let Some(region) = geo.region_of(job.zone) {
            self.vacancies.remove(region, id);
        }
        Some(job)
    }

    pub fn vacancies(&self) -> &RegionalVacancies<JobId> {
        &self.vacancies
    }

    pub fn vacancies_mut(&mut self) -> &mut RegionalVacancies<JobId> {
        &mut self.vacancies
    }

    // ── Job density ───────────────────────────────────────────────────────

    /// Recompute jobs per square kilometre for every zone.
    pub fn calculate_job_density(&mut self, geo: &GeoData) {
        let mut counts: FxHashMap<ZoneId, usize> = FxHashMap::default();
        for job in self.jobs.values() {
            *counts.entry(job.zone).or_default() += 1;
        }
        self.density_by_zone = geo
            .zones()
            .map(|zone| {
                let count = counts.get(&zone.id).copied().unwrap_or(0);
                let density = if zone.area > 0.0 { count as f64 / zone.area } else { 0.0 };
                (zone.id, density)
            })
            .collect();
    }

    /// Job density of `zone` from the last refresh.
    pub fn job_density(&self, zone: ZoneId) -> f64 {
        self.density_by_zone.get(&zone).copied().unwrap_or(0.0)
    }
}
