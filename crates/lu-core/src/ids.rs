//! Strongly typed, zero-cost identifier wrappers.
//!
//! All IDs are `Copy + Ord + Hash` so they can be used as map keys and sorted
//! collection elements without ceremony.  The inner integer is `pub` so
//! loaders can construct ids directly from synthetic-population files.
//!
//! The source data encodes "no dwelling" / "no worker" / "no workplace" as
//! `-1`; here that becomes the `INVALID` sentinel, which `Default` also
//! returns so uninitialized ids are visibly invalid.

use std::fmt;

/// Generate a typed ID wrapper around a primitive integer.
macro_rules! typed_id {
    ($(#[$attr:meta])* $vis:vis struct $name:ident($inner:ty);) => {
        $(#[$attr])*
        #[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        $vis struct $name(pub $inner);

        impl $name {
            /// Sentinel meaning "no valid ID" — equivalent to `u32::MAX`.
            pub const INVALID: $name = $name(<$inner>::MAX);

            /// `true` unless this is the `INVALID` sentinel.
            #[inline(always)]
            pub fn is_valid(self) -> bool {
                self != Self::INVALID
            }

            /// Cast to `usize` for direct use as a `Vec` index.
            #[inline(always)]
            pub fn index(self) -> usize {
                self.0 as usize
            }
        }

        impl Default for $name {
            /// Returns the `INVALID` sentinel so uninitialized IDs are visibly invalid.
            #[inline(always)]
            fn default() -> Self {
                Self::INVALID
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }

        impl From<$name> for usize {
            #[inline(always)]
            fn from(id: $name) -> usize {
                id.0 as usize
            }
        }
    };
}

typed_id! {
    /// A person in the synthetic population.
    pub struct PersonId(u32);
}

typed_id! {
    /// A household (one or more persons sharing a dwelling).
    pub struct HouseholdId(u32);
}

typed_id! {
    /// A residential dwelling unit.
    pub struct DwellingId(u32);
}

typed_id! {
    /// A job slot, vacant or filled by exactly one person.
    pub struct JobId(u32);
}

typed_id! {
    /// A traffic-analysis zone.  Zone numbering in real study areas is
    /// sparse, so zones are always addressed through id-keyed maps, never
    /// by ordinal position.
    pub struct ZoneId(u32);
}

typed_id! {
    /// A region — a contiguous group of zones.  Regions partition the zone
    /// set; vacancy bookkeeping is aggregated at this level.
    pub struct RegionId(u32);
}
