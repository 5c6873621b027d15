//! Deterministic simulation RNG.
//!
//! # Determinism strategy
//!
//! All probabilistic choices in the simulation — market candidacy draws,
//! weighted region/zone selection, vacancy sampling — go through `SimRng`,
//! seeded once from the run's master seed.  Because models run in a fixed
//! order within a year (and years are strictly sequential), the stream of
//! draws is reproducible run-to-run for a given seed.
//!
//! Parallel candidate generation never draws from the shared stream: workers
//! either need no randomness (utility matrices are deterministic) or receive
//! a `child` RNG derived with a stable offset.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

/// 64-bit fractional golden-ratio constant for seed mixing.
const MIXING_CONSTANT: u64 = 0x9e37_79b9_7f4a_7c15;

/// Deterministic simulation-level RNG.
///
/// Used only in single-threaded or explicitly synchronised contexts.  If you
/// need parallel randomness, give each worker its own `SimRng` via
/// [`SimRng::child`].
pub struct SimRng(SmallRng);

impl SimRng {
    pub fn new(seed: u64) -> Self {
        SimRng(SmallRng::seed_from_u64(seed))
    }

    /// Derive a child `SimRng` with a different seed offset — useful for
    /// seeding per-worker RNGs deterministically from the root seed.
    pub fn child(&mut self, offset: u64) -> SimRng {
        let child_seed: u64 = self.0.r#gen::<u64>() ^ offset.wrapping_mul(MIXING_CONSTANT);
        SimRng(SmallRng::seed_from_u64(child_seed))
    }

    /// Expose the inner `SmallRng` for use with `rand` distribution types.
    #[inline]
    pub fn inner(&mut self) -> &mut SmallRng {
        &mut self.0
    }

    /// Generate a value uniformly in `range`.
    #[inline]
    pub fn gen_range<T, R>(&mut self, range: R) -> T
    where
        T: rand::distributions::uniform::SampleUniform,
        R: rand::distributions::uniform::SampleRange<T>,
    {
        self.0.gen_range(range)
    }

    /// `true` with probability `p` (clamped to [0, 1]).
    #[inline]
    pub fn gen_bool(&mut self, p: f64) -> bool {
        self.0.gen_bool(p.clamp(0.0, 1.0))
    }

    /// Uniform draw in `[0, 1)`.
    #[inline]
    pub fn gen_unit(&mut self) -> f64 {
        self.0.r#gen::<f64>()
    }

    /// Shuffle a mutable slice in-place (Fisher-Yates).
    #[inline]
    pub fn shuffle<T>(&mut self, slice: &mut [T]) {
        use rand::seq::SliceRandom;
        slice.shuffle(&mut self.0);
    }

    /// Choose a random element from a slice.  `None` if the slice is empty.
    #[inline]
    pub fn choose<'a, T>(&mut self, slice: &'a [T]) -> Option<&'a T> {
        use rand::seq::SliceRandom;
        slice.choose(&mut self.0)
    }

    /// Weighted random selection: returns the index of the chosen weight.
    ///
    /// Non-finite and non-positive weights contribute nothing.  Returns
    /// `None` iff no weight is positive — every market model treats that as
    /// "no alternative available", not as an error.
    pub fn select_weighted(&mut self, weights: &[f64]) -> Option<usize> {
        let total: f64 = weights
            .iter()
            .filter(|w| w.is_finite() && **w > 0.0)
            .sum();
        if total <= 0.0 {
            return None;
        }
        let mut threshold = self.gen_range(0.0..total);
        let mut last_positive = None;
        for (i, &w) in weights.iter().enumerate() {
            if !w.is_finite() || w <= 0.0 {
                continue;
            }
            last_positive = Some(i);
            if threshold < w {
                return Some(i);
            }
            threshold -= w;
        }
        // Float rounding can exhaust the threshold a hair early; fall back to
        // the last positive-weight entry.
        last_positive
    }
}
