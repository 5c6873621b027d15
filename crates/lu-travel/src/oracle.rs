//! The `TravelOracle` trait — the core's only window onto transport.

use lu_core::ZoneId;
use lu_data::Region;

// ── TravelMode ────────────────────────────────────────────────────────────────

/// Transport mode a travel-time query is asked for.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub enum TravelMode {
    Car,
    Transit,
    Walk,
    Bike,
}

impl TravelMode {
    pub fn as_str(self) -> &'static str {
        match self {
            TravelMode::Car     => "car",
            TravelMode::Transit => "transit",
            TravelMode::Walk    => "walk",
            TravelMode::Bike    => "bike",
        }
    }
}

impl std::fmt::Display for TravelMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── TravelOracle ──────────────────────────────────────────────────────────────

/// External travel-time and accessibility provider.
///
/// Implementations are queried synchronously at arbitrary points within a
/// simulated year; expensive backends should cache per origin and
/// time-of-day bucket (see [`SkimOracle`][crate::SkimOracle]).  Answers may
/// be piecewise-constant within a bucket — no caller assumes continuity in
/// the minute argument.
///
/// Unreachable pairs are reported as `f64::INFINITY`, never as an error:
/// "you cannot get there" is a modeling outcome the markets handle.
///
/// `Sync` is required so parallel candidate generation can query one oracle
/// from many workers; implementations are read-only during a year.
pub trait TravelOracle: Sync {
    /// Door-to-door travel time in minutes from `origin` to `destination`,
    /// departing at `minute_of_day` (0..1440) by `mode`.
    fn travel_time(
        &self,
        origin: ZoneId,
        destination: ZoneId,
        minute_of_day: u32,
        mode: TravelMode,
    ) -> f64;

    /// Accessibility score of a zone (ease of reaching opportunities).
    fn accessibility(&self, zone: ZoneId) -> f64;

    /// Shortest travel time from `origin` to any zone of `region`.
    ///
    /// `f64::INFINITY` when no zone of the region is reachable.
    fn travel_time_to_region(
        &self,
        origin: ZoneId,
        region: &Region,
        minute_of_day: u32,
        mode: TravelMode,
    ) -> f64 {
        region
            .zones
            .iter()
            .map(|&zone| self.travel_time(origin, zone, minute_of_day, mode))
            .fold(f64::INFINITY, f64::min)
    }
}
