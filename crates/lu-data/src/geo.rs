//! Zone and region geography.
//!
//! # Design
//!
//! Zone numbering in real study areas is sparse (gaps, legacy renumbering),
//! so nothing in this crate ever indexes an array by a raw zone or region
//! ordinal.  `GeoData` validates the id space once at construction and all
//! later lookups go through id-keyed maps.
//!
//! The zone→region assignment is immutable after construction: regions
//! partition the zone set, and per-region vacancy bookkeeping relies on
//! that partition never shifting mid-run.

use rustc_hash::FxHashMap;

use lu_core::{RegionId, ZoneId};

use crate::dwelling::DwellingType;
use crate::error::{DataError, DataResult};

// ── Development ───────────────────────────────────────────────────────────────

/// How a zone's remaining construction capacity is measured.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CapacityKind {
    /// Remaining buildable land area; each new dwelling consumes its type's
    /// area requirement.
    LandArea,
    /// Remaining dwelling-unit slots; each new dwelling consumes one unit.
    DwellingUnits,
}

/// Remaining development capacity and zoning restrictions of one zone.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Development {
    pub capacity_kind: CapacityKind,

    /// Remaining capacity in the unit implied by `capacity_kind`.
    remaining: f64,

    /// Per-dwelling-type construction permission, indexed by type ordinal.
    allowed: [bool; DwellingType::COUNT],
}

impl Development {
    pub fn new(capacity_kind: CapacityKind, remaining: f64) -> Self {
        Self {
            capacity_kind,
            remaining: remaining.max(0.0),
            allowed: [true; DwellingType::COUNT],
        }
    }

    /// A zone where nothing may ever be built.
    pub fn sealed() -> Self {
        Self {
            capacity_kind: CapacityKind::DwellingUnits,
            remaining:     0.0,
            allowed:       [false; DwellingType::COUNT],
        }
    }

    pub fn forbid(mut self, dwelling_type: DwellingType) -> Self {
        self.allowed[dwelling_type.ordinal()] = false;
        self
    }

    #[inline]
    pub fn is_allowed(&self, dwelling_type: DwellingType) -> bool {
        self.allowed[dwelling_type.ordinal()]
    }

    #[inline]
    pub fn remaining_capacity(&self) -> f64 {
        self.remaining
    }

    /// Capacity one dwelling of `dwelling_type` would consume here.
    pub fn demand_of(&self, dwelling_type: DwellingType) -> f64 {
        match self.capacity_kind {
            CapacityKind::LandArea      => dwelling_type.area_per_dwelling(),
            CapacityKind::DwellingUnits => 1.0,
        }
    }

    /// `true` if one more dwelling of `dwelling_type` fits and is permitted.
    pub fn can_build(&self, dwelling_type: DwellingType) -> bool {
        self.is_allowed(dwelling_type) && self.remaining >= self.demand_of(dwelling_type)
    }

    /// Consume the capacity for one dwelling of `dwelling_type`.
    ///
    /// Returns `false` (and consumes nothing) if it does not fit — the
    /// construction model treats that zone as weight zero before drawing, so
    /// a `false` here indicates a bookkeeping bug upstream.
    pub fn consume(&mut self, dwelling_type: DwellingType) -> bool {
        let demand = self.demand_of(dwelling_type);
        if !self.is_allowed(dwelling_type) || self.remaining < demand {
            return false;
        }
        self.remaining -= demand;
        true
    }

    /// Return capacity after a demolition (only meaningful for
    /// `DwellingUnits` accounting; demolished land is not re-buildable).
    pub fn restore(&mut self, dwelling_type: DwellingType) {
        if self.capacity_kind == CapacityKind::DwellingUnits {
            let _ = dwelling_type;
            self.remaining += 1.0;
        }
    }
}

// ── Zone / Region ─────────────────────────────────────────────────────────────

/// A traffic-analysis zone.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Zone {
    pub id: ZoneId,

    /// Region this zone belongs to.  Immutable after `GeoData` construction.
    pub region: RegionId,

    /// Zone area in square kilometres (used for job density).
    pub area: f64,

    pub development: Development,
}

/// A group of zones.  Vacancy lists and market aggregates are kept at this
/// level.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Region {
    pub id: RegionId,
    pub zones: Vec<ZoneId>,
}

// ── GeoData ───────────────────────────────────────────────────────────────────

/// Validated zone/region geography.
///
/// Construction checks that every zone carries a valid region id and derives
/// the region→zones map from the zone set, so the two views can never drift
/// apart.
pub struct GeoData {
    zones:   FxHashMap<ZoneId, Zone>,
    regions: FxHashMap<RegionId, Region>,
}

impl GeoData {
    /// Build and validate geography from a list of zones.
    ///
    /// Regions are derived: a region exists iff at least one zone names it,
    /// which makes "regions partition the zone set" true by construction.
    pub fn from_zones(zones: Vec<Zone>) -> DataResult<Self> {
        let mut zone_map: FxHashMap<ZoneId, Zone> = FxHashMap::default();
        let mut regions: FxHashMap<RegionId, Region> = FxHashMap::default();

        for zone in zones {
            if !zone.id.is_valid() || !zone.region.is_valid() {
                return Err(DataError::Geography(format!(
                    "zone {} has invalid id or region {}",
                    zone.id, zone.region
                )));
            }
            regions
                .entry(zone.region)
                .or_insert_with(|| Region { id: zone.region, zones: Vec::new() })
                .zones
                .push(zone.id);
            if zone_map.insert(zone.id, zone).is_some() {
                return Err(DataError::Geography("duplicate zone id".into()));
            }
        }
        if zone_map.is_empty() {
            return Err(DataError::Geography("no zones defined".into()));
        }

        // Stable member order inside each region, for deterministic iteration.
        for region in regions.values_mut() {
            region.zones.sort();
        }

        Ok(Self { zones: zone_map, regions })
    }

    #[inline]
    pub fn zone(&self, id: ZoneId) -> Option<&Zone> {
        self.zones.get(&id)
    }

    #[inline]
    pub fn zone_mut(&mut self, id: ZoneId) -> Option<&mut Zone> {
        self.zones.get_mut(&id)
    }

    #[inline]
    pub fn region(&self, id: RegionId) -> Option<&Region> {
        self.regions.get(&id)
    }

    /// Region of a zone.  `None` if the zone does not exist.
    #[inline]
    pub fn region_of(&self, zone: ZoneId) -> Option<RegionId> {
        self.zones.get(&zone).map(|z| z.region)
    }

    pub fn zone_count(&self) -> usize {
        self.zones.len()
    }

    pub fn zones(&self) -> impl Iterator<Item = &Zone> {
        self.zones.values()
    }

    pub fn regions(&self) -> impl Iterator<Item = &Region> {
        self.regions.values()
    }

    /// Zone ids in ascending order — the canonical iteration order for any
    /// loop whose draw sequence must be reproducible.
    pub fn sorted_zone_ids(&self) -> Vec<ZoneId> {
        let mut ids: Vec<ZoneId> = self.zones.keys().copied().collect();
        ids.sort();
        ids
    }

    /// Region ids in ascending order (see [`Self::sorted_zone_ids`]).
    pub fn sorted_region_ids(&self) -> Vec<RegionId> {
        let mut ids: Vec<RegionId> = self.regions.keys().copied().collect();
        ids.sort();
        ids
    }
}
