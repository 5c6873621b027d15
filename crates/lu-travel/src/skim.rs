//! Skim-matrix oracle: dense travel-time matrices per time-of-day bucket.
//!
//! The day is discretized into a small number of buckets (default 8 ×
//! 180 min) and one dense zone×zone matrix is held per (mode, bucket).
//! Queries inside a bucket all see the same matrix, which bounds the number
//! of expensive matrix builds the upstream transport model has to run.
//!
//! Zone ids are mapped to matrix rows through an id→index map validated at
//! construction — sparse zone numbering never turns into an out-of-bounds
//! index.

use rustc_hash::FxHashMap;

use lu_core::ZoneId;

use crate::error::{TravelError, TravelResult};
use crate::oracle::{TravelMode, TravelOracle};

const MINUTES_PER_DAY: u32 = 24 * 60;

/// A [`TravelOracle`] backed by precomputed skim matrices.
pub struct SkimOracle {
    zone_index: FxHashMap<ZoneId, usize>,
    zone_count: usize,
    buckets_per_day: u32,
    /// Row-major `zone_count²` minute matrices, keyed by (mode, bucket).
    /// A mode present only at bucket 0 serves as its all-day matrix.
    matrices: FxHashMap<(TravelMode, u32), Vec<f64>>,
    accessibility: FxHashMap<ZoneId, f64>,
}

impl SkimOracle {
    /// Create an oracle covering exactly `zones`, with the default 8
    /// time-of-day buckets.
    pub fn new(zones: &[ZoneId]) -> Self {
        let zone_index = zones.iter().copied().zip(0..).collect::<FxHashMap<_, _>>();
        Self {
            zone_count: zone_index.len(),
            zone_index,
            buckets_per_day: 8,
            matrices: FxHashMap::default(),
            accessibility: FxHashMap::default(),
        }
    }

    pub fn with_buckets(mut self, buckets_per_day: u32) -> Self {
        self.buckets_per_day = buckets_per_day.max(1);
        self
    }

    /// Install the minute matrix for `(mode, bucket)`.
    ///
    /// `matrix` is row-major over the zone order given at construction;
    /// use `f64::INFINITY` for unreachable pairs.
    pub fn set_matrix(
        &mut self,
        mode: TravelMode,
        bucket: u32,
        matrix: Vec<f64>,
    ) -> TravelResult<()> {
        let expected = self.zone_count * self.zone_count;
        if matrix.len() != expected {
            return Err(TravelError::Dimension { expected, got: matrix.len() });
        }
        self.matrices.insert((mode, bucket % self.buckets_per_day), matrix);
        Ok(())
    }

    /// Install one matrix valid for the whole day (stored at bucket 0, used
    /// as the fallback for every bucket without its own matrix).
    pub fn set_all_day_matrix(&mut self, mode: TravelMode, matrix: Vec<f64>) -> TravelResult<()> {
        self.set_matrix(mode, 0, matrix)
    }

    pub fn set_accessibility(&mut self, zone: ZoneId, score: f64) {
        self.accessibility.insert(zone, score);
    }

    #[inline]
    fn bucket_of(&self, minute_of_day: u32) -> u32 {
        let width = MINUTES_PER_DAY / self.buckets_per_day;
        (minute_of_day % MINUTES_PER_DAY) / width.max(1)
    }
}

impl TravelOracle for SkimOracle {
    fn travel_time(
        &self,
        origin: ZoneId,
        destination: ZoneId,
        minute_of_day: u32,
        mode: TravelMode,
    ) -> f64 {
        let (Some(&from), Some(&to)) =
            (self.zone_index.get(&origin), self.zone_index.get(&destination))
        else {
            return f64::INFINITY;
        };
        let bucket = self.bucket_of(minute_of_day);
        let matrix = self
            .matrices
            .get(&(mode, bucket))
            .or_else(|| self.matrices.get(&(mode, 0)));
        match matrix {
            Some(m) => m[from * self.zone_count + to],
            None => f64::INFINITY,
        }
    }

    fn accessibility(&self, zone: ZoneId) -> f64 {
        self.accessibility.get(&zone).copied().unwrap_or(0.0)
    }
}
