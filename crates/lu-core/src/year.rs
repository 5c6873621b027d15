//! Simulated-time model.
//!
//! The simulation advances in whole calendar years; there is no finer clock.
//! `Year` is a thin `i32` newtype so year arithmetic stays exact and
//! type-checked, and `SimulationPeriod` describes one complete run.

use std::fmt;

// ── Year ─────────────────────────────────────────────────────────────────────

/// An absolute calendar year (e.g. 2011).
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Year(pub i32);

impl Year {
    /// The year `n` steps after `self`.
    #[inline]
    pub fn offset(self, n: i32) -> Year {
        Year(self.0 + n)
    }

    /// Years elapsed from `earlier` to `self` (may be negative).
    #[inline]
    pub fn since(self, earlier: Year) -> i32 {
        self.0 - earlier.0
    }
}

impl std::ops::Add<i32> for Year {
    type Output = Year;
    #[inline]
    fn add(self, rhs: i32) -> Year {
        Year(self.0 + rhs)
    }
}

impl fmt::Display for Year {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ── SimulationPeriod ──────────────────────────────────────────────────────────

/// Top-level run configuration.
///
/// Typically loaded from a properties file by the application crate and
/// passed to the scheduler.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SimulationPeriod {
    /// First simulated year (the base-year registries describe this year).
    pub start_year: Year,

    /// Last simulated year, inclusive.
    pub end_year: Year,

    /// Master RNG seed.  The same seed always produces identical results.
    pub seed: u64,
}

impl SimulationPeriod {
    /// Iterator over every simulated year, start through end inclusive.
    pub fn years(&self) -> impl Iterator<Item = Year> {
        (self.start_year.0..=self.end_year.0).map(Year)
    }

    /// Number of simulated years.
    #[inline]
    pub fn len_years(&self) -> usize {
        (self.end_year.0 - self.start_year.0 + 1).max(0) as usize
    }
}

impl Default for SimulationPeriod {
    fn default() -> Self {
        Self {
            start_year: Year(2011),
            end_year:   Year(2030),
            seed:       42,
        }
    }
}
