//! Persons, households, and the household registry.

use rustc_hash::FxHashMap;
use tracing::warn;

use lu_core::{DwellingId, HouseholdId, JobId, PersonId, RegionId};

use crate::dwelling::RealEstateData;
use crate::geo::GeoData;

// ── Person attributes ─────────────────────────────────────────────────────────

#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Gender {
    Male,
    Female,
}

#[derive(Copy, Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PersonRole {
    Single,
    Married,
    Child,
}

#[derive(Copy, Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Occupation {
    Employed,
    Unemployed,
    Student,
    Retired,
}

impl Occupation {
    /// `true` for persons who participate in the labor market.
    #[inline]
    pub fn is_economically_active(self) -> bool {
        matches!(self, Occupation::Employed | Occupation::Unemployed)
    }
}

/// Nationality group code from the synthetic population.  Only equality
/// matters to the models (the marriage utility awards a same-nationality
/// bonus).
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Nationality(pub u8);

// ── Person ────────────────────────────────────────────────────────────────────

/// One person of the synthetic population.
///
/// Invariants maintained by the registry operations:
/// - `workplace.is_valid()` iff `occupation == Employed`;
/// - `household` always names a live household that lists this person.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Person {
    pub id: PersonId,
    pub age: u32,
    pub gender: Gender,
    pub role: PersonRole,
    pub occupation: Occupation,
    /// Back-reference, non-owning; the household owns the membership list.
    pub household: HouseholdId,
    /// `JobId::INVALID` unless employed.
    pub workplace: JobId,
    /// Annual income.
    pub income: i32,
    /// Completed education level (0 = none … 4 = university).
    pub education: u8,
    pub nationality: Nationality,
    pub driver_license: bool,
}

// ── HouseholdType ─────────────────────────────────────────────────────────────

/// Classification key: income bracket × size class × worker count.
///
/// Dwelling choice-utilities and price tables are indexed by this key, so it
/// must be recomputed whenever a household's income or membership changes —
/// the registry mutation helpers below do that automatically.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HouseholdType {
    /// 0..NUM_INCOME_BRACKETS.
    pub income_bracket: u8,
    /// Household size capped at `MAX_SIZE_CLASS`.
    pub size_class: u8,
    /// Employed members capped at `MAX_WORKER_CLASS`.
    pub workers: u8,
}

impl HouseholdType {
    pub const NUM_INCOME_BRACKETS: u8 = 4;
    pub const MAX_SIZE_CLASS: u8 = 4;
    pub const MAX_WORKER_CLASS: u8 = 2;

    /// Annual-income upper bounds of brackets 0..n-1; the last bracket is
    /// unbounded.
    const INCOME_BOUNDS: [i32; 3] = [20_000, 40_000, 60_000];

    pub fn classify(total_income: i32, size: usize, workers: usize) -> Self {
        let income_bracket = Self::INCOME_BOUNDS
            .iter()
            .position(|&bound| total_income < bound)
            .unwrap_or(Self::INCOME_BOUNDS.len()) as u8;
        Self {
            income_bracket,
            size_class: (size.max(1) as u8).min(Self::MAX_SIZE_CLASS),
            workers:    (workers as u8).min(Self::MAX_WORKER_CLASS),
        }
    }

    /// Every possible household type, in a fixed order.  Used to produce the
    /// per-type choice-utility map of a newly constructed dwelling.
    pub fn all() -> Vec<HouseholdType> {
        let mut types = Vec::new();
        for income_bracket in 0..Self::NUM_INCOME_BRACKETS {
            for size_class in 1..=Self::MAX_SIZE_CLASS {
                for workers in 0..=Self::MAX_WORKER_CLASS {
                    types.push(HouseholdType { income_bracket, size_class, workers });
                }
            }
        }
        types
    }
}

// ── Household ─────────────────────────────────────────────────────────────────

#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Household {
    pub id: HouseholdId,
    /// Live members; `size == members.len()` always.
    pub members: Vec<PersonId>,
    pub autos: u8,
    /// `DwellingId::INVALID` while the household has no home.
    pub dwelling: DwellingId,
    pub household_type: HouseholdType,
}

impl Household {
    #[inline]
    pub fn size(&self) -> usize {
        self.members.len()
    }
}

// ── HouseholdData ─────────────────────────────────────────────────────────────

/// Registry of persons and households.
pub struct HouseholdData {
    persons: FxHashMap<PersonId, Person>,
    households: FxHashMap<HouseholdId, Household>,
    next_person_id: u32,
    next_household_id: u32,
    /// Median household income per region, refreshed on demand.  Consumed by
    /// the restricted-price rule of the construction market.
    median_income_by_region: FxHashMap<RegionId, i32>,
}

impl Default for HouseholdData {
    fn default() -> Self {
        Self::new()
    }
}

impl HouseholdData {
    pub fn new() -> Self {
        Self {
            persons: FxHashMap::default(),
            households: FxHashMap::default(),
            next_person_id: 0,
            next_household_id: 0,
            median_income_by_region: FxHashMap::default(),
        }
    }

    // ── Lookup ────────────────────────────────────────────────────────────

    #[inline]
    pub fn person(&self, id: PersonId) -> Option<&Person> {
        self.persons.get(&id)
    }

    #[inline]
    pub fn person_mut(&mut self, id: PersonId) -> Option<&mut Person> {
        self.persons.get_mut(&id)
    }

    #[inline]
    pub fn household(&self, id: HouseholdId) -> Option<&Household> {
        self.households.get(&id)
    }

    #[inline]
    pub fn household_mut(&mut self, id: HouseholdId) -> Option<&mut Household> {
        self.households.get_mut(&id)
    }

    pub fn person_count(&self) -> usize {
        self.persons.len()
    }

    pub fn household_count(&self) -> usize {
        self.households.len()
    }

    pub fn persons(&self) -> impl Iterator<Item = &Person> {
        self.persons.values()
    }

    pub fn households(&self) -> impl Iterator<Item = &Household> {
        self.households.values()
    }

    /// Person ids in ascending order — canonical iteration order for loops
    /// whose draw sequence must be reproducible.
    pub fn sorted_person_ids(&self) -> Vec<PersonId> {
        let mut ids: Vec<PersonId> = self.persons.keys().copied().collect();
        ids.sort();
        ids
    }

    /// Household ids in ascending order (see [`Self::sorted_person_ids`]).
    pub fn sorted_household_ids(&self) -> Vec<HouseholdId> {
        let mut ids: Vec<HouseholdId> = self.households.keys().copied().collect();
        ids.sort();
        ids
    }

    // ── Creation ──────────────────────────────────────────────────────────

    /// Register an empty household living in `dwelling` (may be `INVALID`).
    pub fn create_household(&mut self, dwelling: DwellingId) -> HouseholdId {
        let id = HouseholdId(self.next_household_id);
        self.next_household_id += 1;
        self.households.insert(
            id,
            Household {
                id,
                members: Vec::new(),
                autos: 0,
                dwelling,
                household_type: HouseholdType::classify(0, 1, 0),
            },
        );
        id
    }

    /// Register a person and add them to `household`.
    ///
    /// Returns `None` (registering nothing) if the household does not exist.
    pub fn create_person(
        &mut self,
        household: HouseholdId,
        mut person: Person,
    ) -> Option<PersonId> {
        if !self.households.contains_key(&household) {
            warn!(%household, "cannot create person: household not found");
            return None;
        }
        let id = PersonId(self.next_person_id);
        self.next_person_id += 1;
        person.id = id;
        person.household = household;
        self.persons.insert(id, person);
        self.households.get_mut(&household).map(|hh| hh.members.push(id));
        self.refresh_household_type(household);
        Some(id)
    }

    // ── Membership mutation ───────────────────────────────────────────────

    /// Move `person` from their current household into `target`, dissolving
    /// the vacated household if it becomes empty.
    ///
    /// Returns the id of a dissolved household, if any, so the caller can
    /// release its dwelling.
    pub fn move_person(
        &mut self,
        person: PersonId,
        target: HouseholdId,
    ) -> Option<HouseholdId> {
        let old = match self.persons.get(&person) {
            Some(p) => p.household,
            None => {
                warn!(%person, "cannot move person: not found");
                return None;
            }
        };
        if old == target || !self.households.contains_key(&target) {
            return None;
        }

        let mut dissolved = None;
        if let Some(hh) = self.households.get_mut(&old) {
            hh.members.retain(|&m| m != person);
            if hh.members.is_empty() {
                self.households.remove(&old);
                dissolved = Some(old);
            } else {
                self.refresh_household_type(old);
            }
        }
        if let Some(p) = self.persons.get_mut(&person) {
            p.household = target;
        }
        if let Some(hh) = self.households.get_mut(&target) {
            hh.members.push(person);
        }
        self.refresh_household_type(target);
        dissolved
    }

    /// Remove a person entirely (death, out-migration).  Dissolves the
    /// household if it empties; returns the dissolved household id, if any.
    pub fn remove_person(&mut self, person: PersonId) -> Option<HouseholdId> {
        let removed = self.persons.remove(&person)?;
        let hh_id = removed.household;
        let mut dissolved = None;
        if let Some(hh) = self.households.get_mut(&hh_id) {
            hh.members.retain(|&m| m != person);
            if hh.members.is_empty() {
                self.households.remove(&hh_id);
                dissolved = Some(hh_id);
            } else {
                self.refresh_household_type(hh_id);
            }
        }
        dissolved
    }

    /// Recompute the classification key from live members.  Called by every
    /// membership mutation; call it directly after changing a member's income
    /// or occupation.
    pub fn refresh_household_type(&mut self, household: HouseholdId) {
        let Some(hh) = self.households.get(&household) else { return };
        let mut income = 0i32;
        let mut workers = 0usize;
        for member in &hh.members {
            if let Some(person) = self.persons.get(member) {
                income = income.saturating_add(person.income);
                if person.occupation == Occupation::Employed {
                    workers += 1;
                }
            }
        }
        let size = hh.members.len();
        if let Some(hh) = self.households.get_mut(&household) {
            hh.household_type = HouseholdType::classify(income, size, workers);
        }
    }

    /// Total annual income of a household's live members.
    pub fn household_income(&self, household: HouseholdId) -> i32 {
        self.households.get(&household).map_or(0, |hh| {
            hh.members
                .iter()
                .filter_map(|m| self.persons.get(m))
                .map(|p| p.income)
                .fold(0i32, i32::saturating_add)
        })
    }

    // ── Regional income statistics ────────────────────────────────────────

    /// Recompute median household income per region.
    ///
    /// Must run before any consumer of [`Self::median_income`] in the same
    /// year — the scheduler's fixed model order encodes this dependency.
    /// Households without a dwelling are skipped.
    pub fn update_median_income_by_region(
        &mut self,
        geo: &GeoData,
        real_estate: &RealEstateData,
    ) {
        let mut incomes: FxHashMap<RegionId, Vec<i32>> = FxHashMap::default();
        for hh in self.households.values() {
            let Some(dwelling) = real_estate.dwelling(hh.dwelling) else { continue };
            let Some(region) = geo.region_of(dwelling.zone) else { continue };
            let income = hh
                .members
                .iter()
                .filter_map(|m| self.persons.get(m))
                .map(|p| p.income)
                .fold(0i32, i32::saturating_add);
            incomes.entry(region).or_default().push(income);
        }
        self.median_income_by_region.clear();
        for (region, mut values) in incomes {
            values.sort_unstable();
            let median = values[values.len() / 2];
            self.median_income_by_region.insert(region, median);
        }
    }

    /// Median household income of `region` from the last refresh; 0 if the
    /// region housed nobody.
    pub fn median_income(&self, region: RegionId) -> i32 {
        self.median_income_by_region.get(&region).copied().unwrap_or(0)
    }
}
