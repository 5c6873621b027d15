//! Market candidate events — the units of work of one simulated year.

use lu_core::{DwellingId, HouseholdId, PersonId};
use lu_data::Dwelling;

/// State of a household at the last year boundary, diffed by the
/// car-ownership transition model.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct HouseholdSnapshot {
    pub size: usize,
    pub income: i32,
    pub license_holders: usize,
    /// Whether the household changed residence since the snapshot.
    pub changed_residence: bool,
}

/// A candidate event produced by a model's prepare phase.
///
/// Events are fully specified at production time: applying one never needs
/// another market decision (a construction event carries the complete
/// planned dwelling, price and zone already chosen).
#[derive(Clone, Debug)]
pub enum MarketEvent {
    /// An unemployed person searches the job market this year.
    JobSearch { person: PersonId },

    /// A fully planned dwelling is materialized into the registry.
    Construction(Box<Dwelling>),

    /// An aging/low-quality dwelling is removed.
    Demolition { dwelling: DwellingId },

    /// A matched couple marries; the partner joins the proposer's household.
    Marriage { proposer: PersonId, partner: PersonId },

    /// A household re-evaluates its automobile count after a change in
    /// composition, income, licenses, or residence.
    CarOwnershipUpdate {
        household: HouseholdId,
        previous: HouseholdSnapshot,
    },
}

impl MarketEvent {
    /// Short label for logs and summaries.
    pub fn kind(&self) -> &'static str {
        match self {
            MarketEvent::JobSearch { .. }          => "job-search",
            MarketEvent::Construction(_)           => "construction",
            MarketEvent::Demolition { .. }         => "demolition",
            MarketEvent::Marriage { .. }           => "marriage",
            MarketEvent::CarOwnershipUpdate { .. } => "car-ownership",
        }
    }
}

/// Result of applying one candidate event.
///
/// `Failed` covers both recoverable market failure (no vacancy reachable)
/// and skipped events referencing stale ids; neither aborts the year.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum EventOutcome {
    Accepted,
    Failed,
}

impl EventOutcome {
    #[inline]
    pub fn is_accepted(self) -> bool {
        self == EventOutcome::Accepted
    }
}
