//! Unit tests for lu-travel.

use lu_core::{RegionId, ZoneId};
use lu_data::Region;

use crate::{CommutingTimeProbability, SkimOracle, TravelMode, TravelOracle};

// ── Helpers ───────────────────────────────────────────────────────────────────

fn three_zone_oracle() -> SkimOracle {
    let zones = [ZoneId(1), ZoneId(2), ZoneId(3)];
    let mut oracle = SkimOracle::new(&zones);
    // Row-major minutes; zone 3 unreachable from zone 1.
    #[rustfmt::skip]
    let matrix = vec![
        0.0,  10.0, f64::INFINITY,
        10.0,  0.0, 25.0,
        f64::INFINITY, 25.0, 0.0,
    ];
    oracle.set_all_day_matrix(TravelMode::Car, matrix).unwrap();
    oracle
}

// ── SkimOracle ────────────────────────────────────────────────────────────────

#[cfg(test)]
mod skim {
    use super::*;

    #[test]
    fn lookup_and_unreachable() {
        let oracle = three_zone_oracle();
        assert_eq!(oracle.travel_time(ZoneId(1), ZoneId(2), 480, TravelMode::Car), 10.0);
        assert!(oracle
            .travel_time(ZoneId(1), ZoneId(3), 480, TravelMode::Car)
            .is_infinite());
    }

    #[test]
    fn unknown_zone_is_unreachable() {
        let oracle = three_zone_oracle();
        assert!(oracle
            .travel_time(ZoneId(99), ZoneId(1), 480, TravelMode::Car)
            .is_infinite());
    }

    #[test]
    fn missing_mode_is_unreachable() {
        let oracle = three_zone_oracle();
        assert!(oracle
            .travel_time(ZoneId(1), ZoneId(2), 480, TravelMode::Transit)
            .is_infinite());
    }

    #[test]
    fn piecewise_constant_within_bucket() {
        let zones = [ZoneId(1), ZoneId(2)];
        let mut oracle = SkimOracle::new(&zones).with_buckets(8);
        oracle
            .set_matrix(TravelMode::Car, 0, vec![0.0, 5.0, 5.0, 0.0])
            .unwrap();
        oracle
            .set_matrix(TravelMode::Car, 3, vec![0.0, 40.0, 40.0, 0.0])
            .unwrap();
        // Bucket width is 180 min: minutes 0..179 share bucket 0.
        assert_eq!(oracle.travel_time(ZoneId(1), ZoneId(2), 0, TravelMode::Car), 5.0);
        assert_eq!(oracle.travel_time(ZoneId(1), ZoneId(2), 179, TravelMode::Car), 5.0);
        // Bucket 3 covers minutes 540..719 (peak morning).
        assert_eq!(oracle.travel_time(ZoneId(1), ZoneId(2), 600, TravelMode::Car), 40.0);
        // Buckets without their own matrix fall back to bucket 0.
        assert_eq!(oracle.travel_time(ZoneId(1), ZoneId(2), 1200, TravelMode::Car), 5.0);
    }

    #[test]
    fn dimension_mismatch_rejected() {
        let mut oracle = SkimOracle::new(&[ZoneId(1), ZoneId(2)]);
        assert!(oracle.set_all_day_matrix(TravelMode::Car, vec![0.0; 3]).is_err());
    }

    #[test]
    fn region_travel_time_is_minimum_over_zones() {
        let oracle = three_zone_oracle();
        let region = Region { id: RegionId(10), zones: vec![ZoneId(2), ZoneId(3)] };
        let tt = oracle.travel_time_to_region(ZoneId(1), &region, 480, TravelMode::Car);
        assert_eq!(tt, 10.0, "zone 3 is unreachable, zone 2 takes 10 min");
    }

    #[test]
    fn accessibility_defaults_to_zero() {
        let mut oracle = three_zone_oracle();
        oracle.set_accessibility(ZoneId(1), 7.5);
        assert_eq!(oracle.accessibility(ZoneId(1)), 7.5);
        assert_eq!(oracle.accessibility(ZoneId(2)), 0.0);
    }
}

// ── CommutingTimeProbability ──────────────────────────────────────────────────

#[cfg(test)]
mod tlfd {
    use super::*;

    #[test]
    fn zero_outside_domain() {
        let table = CommutingTimeProbability::from_pairs(&[(1, 0.9), (2, 0.7), (3, 0.2)]);
        assert_eq!(table.utility(0), 0.0);
        assert_eq!(table.utility(2), 0.7f32 as f64);
        assert_eq!(table.utility(4), 0.0, "past the surveyed maximum");
        assert_eq!(table.utility(1000), 0.0);
    }

    #[test]
    fn fractional_times_round_to_nearest_minute() {
        let table = CommutingTimeProbability::from_pairs(&[(10, 0.5), (11, 0.4)]);
        assert_eq!(table.utility_for_time(10.4), 0.5f32 as f64);
        assert_eq!(table.utility_for_time(10.6), 0.4f32 as f64);
        assert_eq!(table.utility_for_time(f64::INFINITY), 0.0);
        assert_eq!(table.utility_for_time(-1.0), 0.0);
    }

    #[test]
    fn csv_roundtrip() {
        let csv = "travel_time,utility\n1,0.95\n2,0.80\n5,0.10\n";
        let table = CommutingTimeProbability::from_reader(std::io::Cursor::new(csv)).unwrap();
        assert_eq!(table.domain_len(), 6);
        assert_eq!(table.utility(5), 0.1f32 as f64);
        assert_eq!(table.utility(3), 0.0, "unmentioned minute inside domain");
    }

    #[test]
    fn empty_csv_rejected() {
        let csv = "travel_time,utility\n";
        assert!(CommutingTimeProbability::from_reader(std::io::Cursor::new(csv)).is_err());
    }
}
