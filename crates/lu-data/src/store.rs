//! The `DataStore` — all four registries behind one injected handle.

use crate::dwelling::RealEstateData;
use crate::geo::GeoData;
use crate::household::HouseholdData;
use crate::job::JobData;

/// Bundles the entity registries.
///
/// Built once by the application's population loader before year 1 and
/// passed by `&mut` to whichever model the scheduler is currently driving.
/// Holding the registries in one struct (rather than statics) keeps the
/// mutation discipline visible to the borrow checker.
pub struct DataStore {
    pub geo: GeoData,
    pub households: HouseholdData,
    pub real_estate: RealEstateData,
    pub jobs: JobData,
}

impl DataStore {
    pub fn new(
        geo: GeoData,
        households: HouseholdData,
        real_estate: RealEstateData,
        jobs: JobData,
    ) -> Self {
        Self { geo, households, real_estate, jobs }
    }

    /// Cross-registry consistency audit.  Returns one message per violated
    /// invariant; empty means consistent.  O(everything) — intended for
    /// tests and debug assertions, not the annual loop.
    pub fn audit(&self) -> Vec<String> {
        let mut findings = Vec::new();

        for person in self.households.persons() {
            match self.households.household(person.household) {
                None => findings.push(format!(
                    "{} references missing {}",
                    person.id, person.household
                )),
                Some(hh) if !hh.members.contains(&person.id) => findings.push(format!(
                    "{} not listed as member of {}",
                    person.id, hh.id
                )),
                _ => {}
            }
            let employed = person.occupation == crate::household::Occupation::Employed;
            if employed != person.workplace.is_valid() {
                findings.push(format!(
                    "{}: occupation/workplace mismatch ({:?} vs {})",
                    person.id, person.occupation, person.workplace
                ));
            }
            if employed
                && let Some(job) = self.jobs.job(person.workplace)
                && job.worker != person.id
            {
                findings.push(format!(
                    "{} claims {} but it is held by {}",
                    person.id, job.id, job.worker
                ));
            }
        }

        for hh in self.households.households() {
            if hh.dwelling.is_valid() {
                match self.real_estate.dwelling(hh.dwelling) {
                    None => findings.push(format!(
                        "{} references missing {}",
                        hh.id, hh.dwelling
                    )),
                    Some(dd) if dd.resident != hh.id => findings.push(format!(
                        "{} claims {} but its resident is {}",
                        hh.id, dd.id, dd.resident
                    )),
                    _ => {}
                }
            }
        }

        for dd in self.real_estate.dwellings() {
            if dd.resident.is_valid() && self.households.household(dd.resident).is_none() {
                findings.push(format!("{} resident {} missing", dd.id, dd.resident));
            }
            if self.geo.zone(dd.zone).is_none() {
                findings.push(format!("{} in missing {}", dd.id, dd.zone));
            }
        }

        for job in self.jobs.jobs() {
            if job.worker.is_valid() && self.households.person(job.worker).is_none() {
                findings.push(format!("{} worker {} missing", job.id, job.worker));
            }
            if self.geo.zone(job.zone).is_none() {
                findings.push(format!("{} in missing {}", job.id, job.zone));
            }
        }

        findings
    }
}
