//! Commuting-time probability: the work trip-length-frequency distribution.
//!
//! An empirical lookup calibrated from household travel surveys, mapping an
//! integer commute minute to a behavioral utility weight.  Monotone
//! decreasing in practice, but nothing here assumes it — the table is used
//! as-is.  Outside the surveyed domain the weight is zero: commutes longer
//! than anyone reported are treated as not chosen.

use std::io::Read;
use std::path::Path;

use serde::Deserialize;

use crate::error::{TravelError, TravelResult};

// ── CSV record ────────────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct TlfdRecord {
    travel_time: u32,
    utility: f32,
}

// ── CommutingTimeProbability ──────────────────────────────────────────────────

/// Minute-indexed empirical commute utility table.
pub struct CommutingTimeProbability {
    utilities: Vec<f32>,
}

impl CommutingTimeProbability {
    /// Build from `(minute, utility)` pairs.  Minutes need not be contiguous
    /// or ordered; unmentioned minutes inside the domain get weight zero.
    pub fn from_pairs(pairs: &[(u32, f32)]) -> Self {
        let len = pairs.iter().map(|&(tt, _)| tt + 1).max().unwrap_or(0) as usize;
        let mut utilities = vec![0.0_f32; len];
        for &(tt, utility) in pairs {
            utilities[tt as usize] = utility;
        }
        Self { utilities }
    }

    /// Load from a CSV file with `travel_time,utility` columns in 1-minute
    /// increments.
    pub fn from_csv_path(path: &Path) -> TravelResult<Self> {
        let file = std::fs::File::open(path).map_err(TravelError::Io)?;
        Self::from_reader(file)
    }

    /// Like [`Self::from_csv_path`] but accepts any `Read` source — handy
    /// for tests (pass a `std::io::Cursor`).
    pub fn from_reader<R: Read>(reader: R) -> TravelResult<Self> {
        let mut csv_reader = csv::Reader::from_reader(reader);
        let mut pairs = Vec::new();
        for result in csv_reader.deserialize::<TlfdRecord>() {
            let row = result.map_err(|e| TravelError::Parse(e.to_string()))?;
            pairs.push((row.travel_time, row.utility));
        }
        if pairs.is_empty() {
            return Err(TravelError::Parse("trip-length table is empty".into()));
        }
        Ok(Self::from_pairs(&pairs))
    }

    /// Utility weight of an integer commute minute; zero outside the domain.
    #[inline]
    pub fn utility(&self, minutes: u32) -> f64 {
        self.utilities
            .get(minutes as usize)
            .copied()
            .unwrap_or(0.0) as f64
    }

    /// Weight for a fractional travel time, rounded to the nearest minute
    /// the way the job search quantizes oracle answers.
    #[inline]
    pub fn utility_for_time(&self, minutes: f64) -> f64 {
        if !minutes.is_finite() || minutes < 0.0 {
            return 0.0;
        }
        self.utility((minutes + 0.5) as u32)
    }

    /// Highest minute with a recorded weight, plus one.
    pub fn domain_len(&self) -> usize {
        self.utilities.len()
    }
}
