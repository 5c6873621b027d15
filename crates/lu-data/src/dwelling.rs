//! Dwellings and the real-estate registry.

use rustc_hash::FxHashMap;
use tracing::warn;

use lu_core::{DwellingId, HouseholdId, RegionId, Year, ZoneId};

use crate::geo::GeoData;
use crate::household::HouseholdType;
use crate::vacancy::RegionalVacancies;

// ── DwellingType ──────────────────────────────────────────────────────────────

/// Residential dwelling categories, ordered roughly by land consumption.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DwellingType {
    /// Single-family detached house.
    DetachedHouse,
    /// Single-family attached (town house).
    TownHouse,
    /// Apartment in a 2–4 unit building.
    SmallApartment,
    /// Apartment in a 5+ unit building.
    LargeApartment,
    /// Mobile home.
    MobileHome,
}

impl DwellingType {
    pub const COUNT: usize = 5;

    pub const ALL: [DwellingType; Self::COUNT] = [
        DwellingType::DetachedHouse,
        DwellingType::TownHouse,
        DwellingType::SmallApartment,
        DwellingType::LargeApartment,
        DwellingType::MobileHome,
    ];

    #[inline]
    pub fn ordinal(self) -> usize {
        self as usize
    }

    /// Land consumed by one new dwelling of this type, in the same unit as
    /// zone land-area capacity (hectares).
    pub fn area_per_dwelling(self) -> f64 {
        match self {
            DwellingType::DetachedHouse  => 0.10,
            DwellingType::TownHouse      => 0.04,
            DwellingType::SmallApartment => 0.02,
            DwellingType::LargeApartment => 0.01,
            DwellingType::MobileHome     => 0.04,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            DwellingType::DetachedHouse  => "detached",
            DwellingType::TownHouse      => "townhouse",
            DwellingType::SmallApartment => "small-apartment",
            DwellingType::LargeApartment => "large-apartment",
            DwellingType::MobileHome     => "mobile-home",
        }
    }
}

impl std::fmt::Display for DwellingType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Dwelling ──────────────────────────────────────────────────────────────────

/// Highest (best) dwelling quality level; new construction starts here.
pub const MAX_QUALITY: u8 = 4;

/// One dwelling unit.
///
/// Invariant: `resident.is_valid()` iff some household's `dwelling` field
/// names this dwelling (bidirectional consistency, maintained by
/// [`RealEstateData::occupy`] / [`RealEstateData::vacate`]).
#[derive(Clone, Debug)]
pub struct Dwelling {
    pub id: DwellingId,
    pub zone: ZoneId,
    /// `HouseholdId::INVALID` while vacant.
    pub resident: HouseholdId,
    pub dwelling_type: DwellingType,
    /// 1 (worst) ..= `MAX_QUALITY` (best).
    pub quality: u8,
    /// Monthly price.
    pub price: i32,
    pub bedrooms: u32,
    pub year_built: Year,
    /// Price-restriction level for below-market units (0.0 = market rate).
    pub restriction: f32,
    /// Randomized micro-coordinate within the zone, if the run uses them.
    pub coordinate: Option<(f64, f64)>,
    /// Choice-utility per household type, produced when the dwelling enters
    /// the market and consumed by the housing-search process.
    pub utilities: FxHashMap<HouseholdType, f64>,
}

// ── RealEstateData ────────────────────────────────────────────────────────────

/// Dwelling registry, per-region vacancy index, and market aggregates.
///
/// Aggregates are snapshots: [`RealEstateData::refresh_aggregates`] must run
/// before they are read in a given year (the construction model does this in
/// its prepare phase).
pub struct RealEstateData {
    dwellings: FxHashMap<DwellingId, Dwelling>,
    next_dwelling_id: u32,
    vacancies: RegionalVacancies<DwellingId>,

    // Aggregate snapshots, keyed by type × zone / type × region.
    avg_price_type_zone: FxHashMap<(DwellingType, ZoneId), f64>,
    avg_price_type_region: FxHashMap<(DwellingType, RegionId), f64>,
    avg_price_type: FxHashMap<DwellingType, f64>,
    avg_bedrooms_type_region: FxHashMap<(DwellingType, RegionId), f64>,
    avg_bedrooms_type: FxHashMap<DwellingType, f64>,
    vacancy_rate_type_region: FxHashMap<(DwellingType, RegionId), f64>,
    stock_type_region: FxHashMap<(DwellingType, RegionId), usize>,
}

impl RealEstateData {
    pub fn new(vacancy_cap_per_region: usize) -> Self {
        Self {
            dwellings: FxHashMap::default(),
            next_dwelling_id: 0,
            vacancies: RegionalVacancies::new(vacancy_cap_per_region),
            avg_price_type_zone: FxHashMap::default(),
            avg_price_type_region: FxHashMap::default(),
            avg_price_type: FxHashMap::default(),
            avg_bedrooms_type_region: FxHashMap::default(),
            avg_bedrooms_type: FxHashMap::default(),
            vacancy_rate_type_region: FxHashMap::default(),
            stock_type_region: FxHashMap::default(),
        }
    }

    // ── Lookup ────────────────────────────────────────────────────────────

    #[inline]
    pub fn dwelling(&self, id: DwellingId) -> Option<&Dwelling> {
        self.dwellings.get(&id)
    }

    #[inline]
    pub fn dwelling_mut(&mut self, id: DwellingId) -> Option<&mut Dwelling> {
        self.dwellings.get_mut(&id)
    }

    pub fn dwelling_count(&self) -> usize {
        self.dwellings.len()
    }

    pub fn dwellings(&self) -> impl Iterator<Item = &Dwelling> {
        self.dwellings.values()
    }

    /// Dwelling ids in ascending order, for reproducible iteration.
    pub fn sorted_dwelling_ids(&self) -> Vec<DwellingId> {
        let mut ids: Vec<DwellingId> = self.dwellings.keys().copied().collect();
        ids.sort();
        ids
    }

    /// Reserve the next unused dwelling id.
    pub fn next_dwelling_id(&mut self) -> DwellingId {
        let id = DwellingId(self.next_dwelling_id);
        self.next_dwelling_id += 1;
        id
    }

    // ── Registry mutation ─────────────────────────────────────────────────

    /// Insert a dwelling; vacant dwellings also enter the vacancy index.
    pub fn add_dwelling(&mut self, dwelling: Dwelling, geo: &GeoData) {
        self.next_dwelling_id = self.next_dwelling_id.max(dwelling.id.0 + 1);
        if !dwelling.resident.is_valid()
            && let Some(region) = geo.region_of(dwelling.zone)
        {
            self.vacancies.insert(region, dwelling.id);
        }
        self.dwellings.insert(dwelling.id, dwelling);
    }

    /// Remove a dwelling (demolition), repairing the vacancy index.
    pub fn remove_dwelling(&mut self, id: DwellingId, geo: &GeoData) -> Option<Dwelling> {
        let dwelling = self.dwellings.remove(&id)?;
        if let Some(region) = geo.region_of(dwelling.zone) {
            self.vacancies.remove(region, id);
        }
        Some(dwelling)
    }

    /// Mark `dwelling` occupied by `household` and drop it from the vacancy
    /// index.  The caller updates the household's `dwelling` field.
    pub fn occupy(&mut self, dwelling: DwellingId, household: HouseholdId, geo: &GeoData) {
        let Some(dd) = self.dwellings.get_mut(&dwelling) else {
            warn!(%dwelling, "cannot occupy: dwelling not found");
            return;
        };
        dd.resident = household;
        if let Some(region) = geo.region_of(dd.zone) {
            self.vacancies.remove(region, dwelling);
        }
    }

    /// Mark `dwelling` vacant and re-list it.  The caller updates the
    /// vacating household's `dwelling` field.
    pub fn vacate(&mut self, dwelling: DwellingId, geo: &GeoData) {
        let Some(dd) = self.dwellings.get_mut(&dwelling) else {
            warn!(%dwelling, "cannot vacate: dwelling not found");
            return;
        };
        dd.resident = HouseholdId::INVALID;
        if let Some(region) = geo.region_of(dd.zone) {
            self.vacancies.insert(region, dwelling);
        }
    }

    pub fn vacancies(&self) -> &RegionalVacancies<DwellingId> {
        &self.vacancies
    }

    pub fn vacancies_mut(&mut self) -> &mut RegionalVacancies<DwellingId> {
        &mut self.vacancies
    }

    // ── Aggregate snapshots ───────────────────────────────────────────────

    /// Recompute every price/size/vacancy aggregate from the registry.
    pub fn refresh_aggregates(&mut self, geo: &GeoData) {
        let mut price_zone: FxHashMap<(DwellingType, ZoneId), (f64, usize)> =
            FxHashMap::default();
        let mut price_region: FxHashMap<(DwellingType, RegionId), (f64, usize)> =
            FxHashMap::default();
        let mut price_type: FxHashMap<DwellingType, (f64, usize)> = FxHashMap::default();
        let mut bedrooms_region: FxHashMap<(DwellingType, RegionId), (f64, usize)> =
            FxHashMap::default();
        let mut bedrooms_type: FxHashMap<DwellingType, (f64, usize)> = FxHashMap::default();
        let mut stock: FxHashMap<(DwellingType, RegionId), usize> = FxHashMap::default();
        let mut vacant: FxHashMap<(DwellingType, RegionId), usize> = FxHashMap::default();

        for dd in self.dwellings.values() {
            let Some(region) = geo.region_of(dd.zone) else { continue };
            let dt = dd.dwelling_type;
            let price = dd.price as f64;
            let beds = dd.bedrooms as f64;

            let entry = price_zone.entry((dt, dd.zone)).or_insert((0.0, 0));
            entry.0 += price;
            entry.1 += 1;
            let entry = price_region.entry((dt, region)).or_insert((0.0, 0));
            entry.0 += price;
            entry.1 += 1;
            let entry = price_type.entry(dt).or_insert((0.0, 0));
            entry.0 += price;
            entry.1 += 1;
            let entry = bedrooms_region.entry((dt, region)).or_insert((0.0, 0));
            entry.0 += beds;
            entry.1 += 1;
            let entry = bedrooms_type.entry(dt).or_insert((0.0, 0));
            entry.0 += beds;
            entry.1 += 1;

            *stock.entry((dt, region)).or_default() += 1;
            if !dd.resident.is_valid() {
                *vacant.entry((dt, region)).or_default() += 1;
            }
        }

        let mean = |(sum, n): (f64, usize)| sum / n as f64;
        self.avg_price_type_zone = price_zone.into_iter().map(|(k, v)| (k, mean(v))).collect();
        self.avg_price_type_region =
            price_region.into_iter().map(|(k, v)| (k, mean(v))).collect();
        self.avg_price_type = price_type.into_iter().map(|(k, v)| (k, mean(v))).collect();
        self.avg_bedrooms_type_region =
            bedrooms_region.into_iter().map(|(k, v)| (k, mean(v))).collect();
        self.avg_bedrooms_type =
            bedrooms_type.into_iter().map(|(k, v)| (k, mean(v))).collect();

        self.vacancy_rate_type_region = stock
            .iter()
            .map(|(&key, &total)| {
                let rate = vacant.get(&key).copied().unwrap_or(0) as f64 / total as f64;
                (key, rate)
            })
            .collect();
        self.stock_type_region = stock;
    }

    /// Average price of `dwelling_type` in `zone`; `None` without
    /// observations (the caller falls back to the regional average and logs
    /// the substitution).
    pub fn avg_price_in_zone(&self, dwelling_type: DwellingType, zone: ZoneId) -> Option<f64> {
        self.avg_price_type_zone.get(&(dwelling_type, zone)).copied()
    }

    pub fn avg_price_in_region(
        &self,
        dwelling_type: DwellingType,
        region: RegionId,
    ) -> Option<f64> {
        self.avg_price_type_region.get(&(dwelling_type, region)).copied()
    }

    /// Study-area-wide average price of a type; 0 with no stock at all.
    pub fn avg_price_of_type(&self, dwelling_type: DwellingType) -> f64 {
        self.avg_price_type.get(&dwelling_type).copied().unwrap_or(0.0)
    }

    /// Average bedroom count of `dwelling_type` in `region`, falling back to
    /// the type-wide average where the region has no such stock.
    pub fn avg_bedrooms(&self, dwelling_type: DwellingType, region: RegionId) -> f64 {
        self.avg_bedrooms_type_region
            .get(&(dwelling_type, region))
            .or_else(|| self.avg_bedrooms_type.get(&dwelling_type))
            .copied()
            .unwrap_or(0.0)
    }

    /// Vacancy rate of `dwelling_type` in `region`; 0 with no stock.
    pub fn vacancy_rate(&self, dwelling_type: DwellingType, region: RegionId) -> f64 {
        self.vacancy_rate_type_region
            .get(&(dwelling_type, region))
            .copied()
            .unwrap_or(0.0)
    }

    /// Existing stock of `dwelling_type` in `region`.
    pub fn stock(&self, dwelling_type: DwellingType, region: RegionId) -> usize {
        self.stock_type_region
            .get(&(dwelling_type, region))
            .copied()
            .unwrap_or(0)
    }

    /// Dwelling types in descending order of current study-area average
    /// price.  More expensive types claim contested land first — a deliberate
    /// policy favoring higher-value development.
    pub fn types_by_descending_price(&self) -> Vec<DwellingType> {
        let mut types = DwellingType::ALL.to_vec();
        types.sort_by(|a, b| {
            self.avg_price_of_type(*b)
                .partial_cmp(&self.avg_price_of_type(*a))
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        types
    }
}
