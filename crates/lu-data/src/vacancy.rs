//! Bounded per-region vacancy indices.
//!
//! # Why this exists
//!
//! Job and dwelling searches need "a random vacant entity in region R"
//! thousands of times per simulated year.  Scanning the full registry each
//! time would be O(total entities); the vacancy index bounds that to
//! O(stored vacancies per region) with a configurable memory cap.
//!
//! # Index stability
//!
//! The source implementation removed entries by swapping with the last
//! element and truncating, which moves an unrelated entry and invalidates
//! any iterator held across the removal.  `VacancyIndex` instead stores
//! entries in fixed slots with a free-list: removal blanks a slot in place
//! and pushes it onto the free-list, insertion pops the free-list.  No live
//! entry ever changes position, so concurrent read-only iteration during
//! parallel candidate generation stays valid.
//!
//! Overflowing the cap is counted, never an error: a full index only means
//! searches see a bounded sample of the true vacancy pool.

use rustc_hash::FxHashMap;

use lu_core::{RegionId, SimRng};

// ── VacancyIndex ──────────────────────────────────────────────────────────────

/// A bounded, index-stable set of ids with O(1) insert/remove and uniform
/// random sampling.
#[derive(Clone, Debug)]
pub struct VacancyIndex<I> {
    /// Fixed slots; `None` marks a free slot.
    slots: Vec<Option<I>>,
    /// Slot indices available for reuse, most recently freed last.
    free: Vec<u32>,
    /// id → slot, for O(1) removal by id.
    pos: FxHashMap<I, u32>,
    /// Maximum number of stored entries.
    cap: usize,
    /// Insertions rejected because the index was full.
    overflow: u64,
}

impl<I: Copy + Eq + std::hash::Hash> VacancyIndex<I> {
    pub fn new(cap: usize) -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            pos: FxHashMap::default(),
            cap,
            overflow: 0,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.pos.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.pos.is_empty()
    }

    #[inline]
    pub fn contains(&self, id: I) -> bool {
        self.pos.contains_key(&id)
    }

    /// Insertions rejected because the cap was reached.
    #[inline]
    pub fn overflow_count(&self) -> u64 {
        self.overflow
    }

    /// Insert `id`.  Returns `false` if it was already present or the index
    /// is at capacity (the latter bumps the overflow counter).
    pub fn insert(&mut self, id: I) -> bool {
        if self.pos.contains_key(&id) {
            return false;
        }
        if self.pos.len() >= self.cap {
            self.overflow += 1;
            return false;
        }
        let slot = match self.free.pop() {
            Some(slot) => {
                self.slots[slot as usize] = Some(id);
                slot
            }
            None => {
                self.slots.push(Some(id));
                (self.slots.len() - 1) as u32
            }
        };
        self.pos.insert(id, slot);
        true
    }

    /// Remove `id` in place.  Returns `false` if it was not present — callers
    /// treat that as a stale entry already repaired elsewhere, not an error.
    pub fn remove(&mut self, id: I) -> bool {
        match self.pos.remove(&id) {
            None => false,
            Some(slot) => {
                self.slots[slot as usize] = None;
                self.free.push(slot);
                true
            }
        }
    }

    /// Uniformly random live entry, or `None` if empty.
    ///
    /// Walks the slot array to the n-th live entry.  The walk is bounded by
    /// the cap, which the owning market configures; sampling stays exact and
    /// deterministic for a given rng state.
    pub fn sample(&self, rng: &mut SimRng) -> Option<I> {
        if self.pos.is_empty() {
            return None;
        }
        let nth = rng.gen_range(0..self.pos.len());
        self.slots
            .iter()
            .filter_map(|slot| slot.as_ref())
            .nth(nth)
            .copied()
    }

    /// Sample a random entry and remove it.
    pub fn take_sample(&mut self, rng: &mut SimRng) -> Option<I> {
        let id = self.sample(rng)?;
        self.remove(id);
        Some(id)
    }

    /// Iterate live entries in slot order.
    pub fn iter(&self) -> impl Iterator<Item = I> + '_ {
        self.slots.iter().filter_map(|slot| *slot)
    }

    pub fn clear(&mut self) {
        self.slots.clear();
        self.free.clear();
        self.pos.clear();
        // Overflow counter survives clears: it is a per-run diagnostic.
    }
}

// ── RegionalVacancies ─────────────────────────────────────────────────────────

/// One [`VacancyIndex`] per region, all sharing the same cap.
pub struct RegionalVacancies<I> {
    by_region: FxHashMap<RegionId, VacancyIndex<I>>,
    cap: usize,
}

impl<I: Copy + Eq + std::hash::Hash> RegionalVacancies<I> {
    pub fn new(cap_per_region: usize) -> Self {
        Self { by_region: FxHashMap::default(), cap: cap_per_region }
    }

    pub fn insert(&mut self, region: RegionId, id: I) -> bool {
        self.by_region
            .entry(region)
            .or_insert_with(|| VacancyIndex::new(self.cap))
            .insert(id)
    }

    pub fn remove(&mut self, region: RegionId, id: I) -> bool {
        match self.by_region.get_mut(&region) {
            Some(index) => index.remove(id),
            None => false,
        }
    }

    pub fn count(&self, region: RegionId) -> usize {
        self.by_region.get(&region).map_or(0, VacancyIndex::len)
    }

    pub fn contains(&self, region: RegionId, id: I) -> bool {
        self.by_region.get(&region).is_some_and(|ix| ix.contains(id))
    }

    /// Sample-and-remove a random vacancy in `region`.
    pub fn take_sample(&mut self, region: RegionId, rng: &mut SimRng) -> Option<I> {
        self.by_region.get_mut(&region)?.take_sample(rng)
    }

    /// Total insertions rejected across all regions.
    pub fn total_overflow(&self) -> u64 {
        self.by_region.values().map(VacancyIndex::overflow_count).sum()
    }

    /// Per-region counts in ascending region order — comparable across
    /// rebuilds (the idempotence contract of `identify_vacancies`).
    pub fn counts(&self) -> Vec<(RegionId, usize)> {
        let mut counts: Vec<(RegionId, usize)> = self
            .by_region
            .iter()
            .filter(|(_, ix)| !ix.is_empty())
            .map(|(&region, ix)| (region, ix.len()))
            .collect();
        counts.sort();
        counts
    }

    /// Drop all entries in all regions (overflow counters survive).
    pub fn clear(&mut self) {
        for index in self.by_region.values_mut() {
            index.clear();
        }
    }
}
