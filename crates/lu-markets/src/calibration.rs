//! Calibration tables loaded once at startup.
//!
//! Each table validates itself on construction and returns
//! [`MarketError::Calibration`] on bad input — a model never starts a year
//! with a malformed table.  CSV loaders mirror the plain
//! column-per-attribute files the calibration pipeline produces.

use std::io::Read;
use std::path::Path;

use rustc_hash::FxHashMap;
use serde::Deserialize;

use lu_data::DwellingType;
use lu_data::household::Gender;

use crate::error::{MarketError, MarketResult};

// ── Construction demand ───────────────────────────────────────────────────────

/// Per-type parameters of the vacancy-driven construction demand curve.
#[derive(Copy, Clone, Debug)]
pub struct DemandParams {
    /// Vacancy rate at which demand reaches zero (the equilibrium or
    /// "structural" vacancy of a healthy market).
    pub structural_vacancy: f64,
    /// Annual stock-growth fraction demanded when the market is fully
    /// occupied (vacancy rate zero).
    pub max_growth: f64,
}

/// Maps the regional vacancy rate of a dwelling type to the fraction of
/// existing stock demanded as new construction this year.
///
/// The curve is linear, monotone decreasing, and clamped: demand saturates
/// at `max_growth` for vacancy zero and is exactly zero at or above the
/// structural vacancy rate.
pub struct ConstructionDemandCurve {
    params: FxHashMap<DwellingType, DemandParams>,
}

#[derive(Deserialize)]
struct DemandRecord {
    dwelling_type: String,
    structural_vacancy: f64,
    max_growth: f64,
}

impl ConstructionDemandCurve {
    pub fn new(params: &[(DwellingType, DemandParams)]) -> MarketResult<Self> {
        let mut map = FxHashMap::default();
        for &(dt, p) in params {
            if !(p.structural_vacancy > 0.0) || !p.structural_vacancy.is_finite() {
                return Err(MarketError::Calibration(format!(
                    "structural vacancy for {dt} must be positive, got {}",
                    p.structural_vacancy
                )));
            }
            if !(0.0..=1.0).contains(&p.max_growth) {
                return Err(MarketError::Calibration(format!(
                    "max growth for {dt} must be in [0, 1], got {}",
                    p.max_growth
                )));
            }
            if map.insert(dt, p).is_some() {
                return Err(MarketError::Calibration(format!("duplicate entry for {dt}")));
            }
        }
        for dt in DwellingType::ALL {
            if !map.contains_key(&dt) {
                return Err(MarketError::Calibration(format!("missing entry for {dt}")));
            }
        }
        Ok(Self { params: map })
    }

    /// The same curve for every dwelling type.
    pub fn uniform(params: DemandParams) -> MarketResult<Self> {
        let all: Vec<_> = DwellingType::ALL.iter().map(|&dt| (dt, params)).collect();
        Self::new(&all)
    }

    /// Load from a CSV file with `dwelling_type,structural_vacancy,max_growth`
    /// columns, one row per type.
    pub fn from_csv_path(path: &Path) -> MarketResult<Self> {
        Self::from_reader(std::fs::File::open(path)?)
    }

    pub fn from_reader<R: Read>(reader: R) -> MarketResult<Self> {
        let mut csv_reader = csv::Reader::from_reader(reader);
        let mut params = Vec::new();
        for result in csv_reader.deserialize::<DemandRecord>() {
            let row = result.map_err(|e| MarketError::Parse(e.to_string()))?;
            let dt = parse_dwelling_type(&row.dwelling_type)?;
            params.push((
                dt,
                DemandParams {
                    structural_vacancy: row.structural_vacancy,
                    max_growth:         row.max_growth,
                },
            ));
        }
        Self::new(&params)
    }

    /// Demanded stock-growth fraction at the given vacancy rate.
    pub fn demand(&self, dwelling_type: DwellingType, vacancy_rate: f64) -> f64 {
        // `new` guarantees every type has params.
        let Some(p) = self.params.get(&dwelling_type) else { return 0.0 };
        let v = vacancy_rate.clamp(0.0, 1.0);
        (p.max_growth * (1.0 - v / p.structural_vacancy)).max(0.0)
    }
}

fn parse_dwelling_type(s: &str) -> MarketResult<DwellingType> {
    DwellingType::ALL
        .iter()
        .copied()
        .find(|dt| dt.as_str() == s)
        .ok_or_else(|| MarketError::Parse(format!("unknown dwelling type '{s}'")))
}

// ── Marriage probability ──────────────────────────────────────────────────────

/// Annual base probability of entering the marriage market, by age and
/// gender.  Ages outside the table carry probability zero.
pub struct MarriageProbabilityTable {
    male:   Vec<f64>,
    female: Vec<f64>,
}

#[derive(Deserialize)]
struct MarriageRecord {
    age:    u32,
    male:   f64,
    female: f64,
}

impl MarriageProbabilityTable {
    /// Build from `(age, male probability, female probability)` rows.
    pub fn from_rows(rows: &[(u32, f64, f64)]) -> MarketResult<Self> {
        let len = rows.iter().map(|&(age, ..)| age + 1).max().unwrap_or(0) as usize;
        if len == 0 {
            return Err(MarketError::Calibration("marriage table is empty".into()));
        }
        let mut male = vec![0.0; len];
        let mut female = vec![0.0; len];
        for &(age, m, f) in rows {
            for p in [m, f] {
                if !(0.0..=1.0).contains(&p) {
                    return Err(MarketError::Calibration(format!(
                        "marriage probability at age {age} out of [0, 1]: {p}"
                    )));
                }
            }
            male[age as usize] = m;
            female[age as usize] = f;
        }
        Ok(Self { male, female })
    }

    /// Load from a CSV file with `age,male,female` columns.
    pub fn from_csv_path(path: &Path) -> MarketResult<Self> {
        Self::from_reader(std::fs::File::open(path)?)
    }

    pub fn from_reader<R: Read>(reader: R) -> MarketResult<Self> {
        let mut csv_reader = csv::Reader::from_reader(reader);
        let mut rows = Vec::new();
        for result in csv_reader.deserialize::<MarriageRecord>() {
            let row = result.map_err(|e| MarketError::Parse(e.to_string()))?;
            rows.push((row.age, row.male, row.female));
        }
        Self::from_rows(&rows)
    }

    /// Base probability for a person of the given gender and age.
    #[inline]
    pub fn probability(&self, gender: Gender, age: u32) -> f64 {
        let table = match gender {
            Gender::Male   => &self.male,
            Gender::Female => &self.female,
        };
        table.get(age as usize).copied().unwrap_or(0.0)
    }
}

// ── Car-ownership transitions ─────────────────────────────────────────────────

/// Discrete household changes that condition a car-ownership transition.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub struct CarTransitionKey {
    /// Previous automobile count, capped at [`CarOwnershipTable::MAX_AUTOS`].
    pub prev_autos: u8,
    pub size_up: bool,
    pub size_down: bool,
    pub income_up: bool,
    pub income_down: bool,
    pub license_up: bool,
    pub changed_residence: bool,
}

/// Probabilities of decreasing, keeping, and increasing the automobile
/// count, conditional on a [`CarTransitionKey`].  Keys never set explicitly
/// default to keeping the current count.
pub struct CarOwnershipTable {
    probabilities: FxHashMap<CarTransitionKey, [f64; 3]>,
}

#[derive(Deserialize)]
struct CarOwnershipRecord {
    prev_autos: u8,
    size_up: u8,
    size_down: u8,
    income_up: u8,
    income_down: u8,
    license_up: u8,
    changed_residence: u8,
    decrease: f64,
    keep: f64,
    increase: f64,
}

impl CarOwnershipTable {
    /// Automobile counts are modelled in `0..=MAX_AUTOS`.
    pub const MAX_AUTOS: u8 = 3;

    pub fn new() -> Self {
        Self { probabilities: FxHashMap::default() }
    }

    /// Register the outcome distribution for one key.
    pub fn set(&mut self, key: CarTransitionKey, probs: [f64; 3]) -> MarketResult<()> {
        let sum: f64 = probs.iter().sum();
        if probs.iter().any(|p| !p.is_finite() || *p < 0.0) || (sum - 1.0).abs() > 1e-6 {
            return Err(MarketError::Calibration(format!(
                "transition probabilities for {key:?} must be non-negative and sum to 1, got {probs:?}"
            )));
        }
        self.probabilities.insert(normalize_key(key), probs);
        Ok(())
    }

    /// Load from a CSV file with one row per key: the six change flags as
    /// 0/1 columns plus `decrease,keep,increase`.
    pub fn from_csv_path(path: &Path) -> MarketResult<Self> {
        Self::from_reader(std::fs::File::open(path)?)
    }

    pub fn from_reader<R: Read>(reader: R) -> MarketResult<Self> {
        let mut csv_reader = csv::Reader::from_reader(reader);
        let mut table = Self::new();
        for result in csv_reader.deserialize::<CarOwnershipRecord>() {
            let row = result.map_err(|e| MarketError::Parse(e.to_string()))?;
            let key = CarTransitionKey {
                prev_autos:        row.prev_autos,
                size_up:           row.size_up != 0,
                size_down:         row.size_down != 0,
                income_up:         row.income_up != 0,
                income_down:       row.income_down != 0,
                license_up:        row.license_up != 0,
                changed_residence: row.changed_residence != 0,
            };
            table.set(key, [row.decrease, row.keep, row.increase])?;
        }
        Ok(table)
    }

    /// Outcome distribution for `key`; `[0, 1, 0]` (keep) when unset.
    pub fn get(&self, key: CarTransitionKey) -> [f64; 3] {
        self.probabilities
            .get(&normalize_key(key))
            .copied()
            .unwrap_or([0.0, 1.0, 0.0])
    }
}

impl Default for CarOwnershipTable {
    fn default() -> Self {
        Self::new()
    }
}

fn normalize_key(mut key: CarTransitionKey) -> CarTransitionKey {
    key.prev_autos = key.prev_autos.min(CarOwnershipTable::MAX_AUTOS);
    key
}
