//! Unit tests for the market models.

use std::io::Cursor;

use rustc_hash::FxHashMap;

use lu_core::{DwellingId, HouseholdId, JobId, PersonId, RegionId, SimRng, Year, ZoneId};
use lu_data::household::{Gender, Nationality, Occupation, Person, PersonRole};
use lu_data::job::{Job, JobType};
use lu_data::{
    CapacityKind, DataStore, Development, Dwelling, DwellingType, GeoData, HouseholdData, JobData,
    RealEstateData, Zone,
};
use lu_data::dwelling::MAX_QUALITY;
use lu_model::{AnnualModel, MarketEvent, ModelContext};
use lu_travel::{CommutingTimeProbability, TravelMode, TravelOracle};

use crate::calibration::{
    CarOwnershipTable, CarTransitionKey, ConstructionDemandCurve, DemandParams,
    MarriageProbabilityTable,
};
use crate::car_ownership::CarOwnershipModel;
use crate::construction::{ConstructionConfig, ConstructionModel};
use crate::demolition::{DemolitionConfig, DemolitionModel};
use crate::jobs::{JobMarket, JobMarketConfig};
use crate::marriage::{MarriageConfig, MarriageMarket};
use crate::matching::deferred_acceptance;

// ── Fixtures ──────────────────────────────────────────────────────────────────

/// Zones 1 and 2 in region 10, zone 7 alone in region 20, all with
/// dwelling-unit capacity accounting.
fn two_region_store(units: f64) -> DataStore {
    let zone = |id: u32, region: u32| Zone {
        id: ZoneId(id),
        region: RegionId(region),
        area: 1.0,
        development: Development::new(CapacityKind::DwellingUnits, units),
    };
    let geo = GeoData::from_zones(vec![zone(1, 10), zone(2, 10), zone(7, 20)])
        .unwrap();
    DataStore::new(geo, HouseholdData::new(), RealEstateData::new(64), JobData::new(64))
}

fn person(age: u32, gender: Gender, occupation: Occupation) -> Person {
    Person {
        id: PersonId::INVALID,
        age,
        gender,
        role: PersonRole::Single,
        occupation,
        household: HouseholdId::INVALID,
        workplace: JobId::INVALID,
        income: 30_000,
        education: 2,
        nationality: Nationality(0),
        driver_license: false,
    }
}

fn dwelling(id: u32, zone: u32, price: i32) -> Dwelling {
    Dwelling {
        id: DwellingId(id),
        zone: ZoneId(zone),
        resident: HouseholdId::INVALID,
        dwelling_type: DwellingType::TownHouse,
        quality: MAX_QUALITY,
        price,
        bedrooms: 3,
        year_built: Year(1990),
        restriction: 0.0,
        coordinate: None,
        utilities: FxHashMap::default(),
    }
}

/// Create a dwelling in `zone`, a household occupying it, and the given
/// members.  Returns the household and person ids.
fn settle(
    data: &mut DataStore,
    dwelling_id: u32,
    zone: u32,
    members: Vec<Person>,
) -> (HouseholdId, Vec<PersonId>) {
    let dd = dwelling(dwelling_id, zone, 500);
    let id = dd.id;
    data.real_estate.add_dwelling(dd, &data.geo);
    let hh = data.households.create_household(id);
    data.real_estate.occupy(id, hh, &data.geo);
    let persons = members
        .into_iter()
        .map(|p| data.households.create_person(hh, p).unwrap())
        .collect();
    (hh, persons)
}

fn add_vacant_jobs(data: &mut DataStore, zone: u32, count: usize) {
    for _ in 0..count {
        let id = data.jobs.next_job_id();
        data.jobs.add_job(Job {
            id,
            zone: ZoneId(zone),
            job_type: JobType::Services,
            worker: PersonId::INVALID,
        });
    }
}

/// Flat commute-utility table out to two hours.
fn flat_tlfd() -> CommutingTimeProbability {
    let pairs: Vec<(u32, f32)> = (0..=120).map(|m| (m, 1.0)).collect();
    CommutingTimeProbability::from_pairs(&pairs)
}

/// Oracle answering a fixed time for every pair unless overridden.
struct TestOracle {
    times: FxHashMap<(ZoneId, ZoneId), f64>,
    default_minutes: f64,
}

impl TestOracle {
    fn uniform(default_minutes: f64) -> Self {
        Self { times: FxHashMap::default(), default_minutes }
    }

    fn with(mut self, from: u32, to: u32, minutes: f64) -> Self {
        self.times.insert((ZoneId(from), ZoneId(to)), minutes);
        self
    }
}

impl TravelOracle for TestOracle {
    fn travel_time(&self, origin: ZoneId, destination: ZoneId, _: u32, _: TravelMode) -> f64 {
        self.times.get(&(origin, destination)).copied().unwrap_or(self.default_minutes)
    }

    fn accessibility(&self, _zone: ZoneId) -> f64 {
        1.0
    }
}

// ── Job market ────────────────────────────────────────────────────────────────

mod job_market {
    use super::*;

    #[test]
    fn search_hires_and_links_both_sides() {
        let mut data = two_region_store(10.0);
        add_vacant_jobs(&mut data, 1, 3);
        let (_, persons) =
            settle(&mut data, 0, 2, vec![person(30, Gender::Male, Occupation::Unemployed)]);
        let worker = persons[0];

        let mut market = JobMarket::new(JobMarketConfig::default(), flat_tlfd());
        let oracle = TestOracle::uniform(20.0);
        let mut rng = SimRng::new(7);
        let mut ctx = ModelContext::new(&mut data, &oracle, &mut rng);

        let events = market.prepare_year(Year(2015), &mut ctx);
        assert_eq!(events.len(), 1);
        assert_eq!(data.jobs.vacancies().count(RegionId(10)), 3);

        let mut ctx = ModelContext::new(&mut data, &oracle, &mut rng);
        assert!(market.handle_event(&events[0], &mut ctx).is_accepted());

        let p = data.households.person(worker).unwrap();
        assert_eq!(p.occupation, Occupation::Employed);
        assert!(p.workplace.is_valid());
        assert_eq!(data.jobs.job(p.workplace).unwrap().worker, worker);
        assert_eq!(data.jobs.vacancies().count(RegionId(10)), 2);
        assert!(data.audit().is_empty());
    }

    #[test]
    fn search_falls_back_when_commutes_exceed_survey() {
        let mut data = two_region_store(10.0);
        add_vacant_jobs(&mut data, 1, 2);
        JobMarket::identify_vacancies(&mut data.jobs, &data.geo);

        // Survey only reaches 10 minutes; every real commute takes 50.
        let tlfd = CommutingTimeProbability::from_pairs(&[(10, 1.0)]);
        let market = JobMarket::new(JobMarketConfig::default(), tlfd);
        let oracle = TestOracle::uniform(50.0);
        let mut rng = SimRng::new(1);

        let job = market.find_vacant_job(Some(ZoneId(2)), &mut data, &oracle, &mut rng);
        assert!(job.is_some());
    }

    #[test]
    fn search_progresses_with_unreachable_home() {
        let mut data = two_region_store(10.0);
        add_vacant_jobs(&mut data, 1, 2);
        JobMarket::identify_vacancies(&mut data.jobs, &data.geo);

        let market = JobMarket::new(JobMarketConfig::default(), flat_tlfd());
        let oracle = TestOracle::uniform(f64::INFINITY);
        let mut rng = SimRng::new(1);

        let job = market.find_vacant_job(Some(ZoneId(7)), &mut data, &oracle, &mut rng);
        assert!(job.is_some(), "vacancies exist, so a stranded searcher must still hire");
    }

    #[test]
    fn migrant_without_home_weighs_by_vacancy_count() {
        let mut data = two_region_store(10.0);
        add_vacant_jobs(&mut data, 1, 5);
        JobMarket::identify_vacancies(&mut data.jobs, &data.geo);

        let market = JobMarket::new(JobMarketConfig::default(), flat_tlfd());
        let oracle = TestOracle::uniform(20.0);
        let mut rng = SimRng::new(3);

        for _ in 0..3 {
            let job = market.find_vacant_job(None, &mut data, &oracle, &mut rng).unwrap();
            // Region 20 has no vacancies, so every draw lands in region 10.
            assert_eq!(data.jobs.job(job).unwrap().zone, ZoneId(1));
        }
    }

    #[test]
    fn vacancy_rebuild_is_idempotent() {
        let mut data = two_region_store(10.0);
        add_vacant_jobs(&mut data, 1, 4);
        add_vacant_jobs(&mut data, 7, 2);

        JobMarket::identify_vacancies(&mut data.jobs, &data.geo);
        let first = data.jobs.vacancies().counts();
        JobMarket::identify_vacancies(&mut data.jobs, &data.geo);
        assert_eq!(data.jobs.vacancies().counts(), first);
        assert_eq!(first, vec![(RegionId(10), 4), (RegionId(20), 2)]);
    }

    #[test]
    fn quit_relists_job_and_trims_income() {
        let mut data = two_region_store(10.0);
        add_vacant_jobs(&mut data, 1, 1);
        JobMarket::identify_vacancies(&mut data.jobs, &data.geo);
        let (_, persons) =
            settle(&mut data, 0, 1, vec![person(40, Gender::Female, Occupation::Unemployed)]);
        let worker = persons[0];

        let market = JobMarket::new(JobMarketConfig::default(), flat_tlfd());
        let oracle = TestOracle::uniform(10.0);
        let mut rng = SimRng::new(9);
        let job = market
            .find_vacant_job(Some(ZoneId(1)), &mut data, &oracle, &mut rng)
            .unwrap();
        assert!(market.hire(worker, job, &mut data));
        assert_eq!(data.jobs.vacancies().count(RegionId(10)), 0);

        market.quit_job(worker, true, &mut data);
        let p = data.households.person(worker).unwrap();
        assert_eq!(p.occupation, Occupation::Unemployed);
        assert!(!p.workplace.is_valid());
        assert_eq!(p.income, 18_000);
        assert!(data.jobs.job(job).unwrap().is_vacant());
        assert_eq!(data.jobs.vacancies().count(RegionId(10)), 1);
        assert!(data.audit().is_empty());
    }

    #[test]
    fn retiring_a_slot_keeps_it_off_the_market() {
        let mut data = two_region_store(10.0);
        add_vacant_jobs(&mut data, 1, 1);
        JobMarket::identify_vacancies(&mut data.jobs, &data.geo);
        let (_, persons) =
            settle(&mut data, 0, 1, vec![person(40, Gender::Male, Occupation::Unemployed)]);
        let worker = persons[0];

        let market = JobMarket::new(JobMarketConfig::default(), flat_tlfd());
        let oracle = TestOracle::uniform(10.0);
        let mut rng = SimRng::new(9);
        let job = market
            .find_vacant_job(Some(ZoneId(1)), &mut data, &oracle, &mut rng)
            .unwrap();
        assert!(market.hire(worker, job, &mut data));

        market.quit_job(worker, false, &mut data);
        assert!(data.jobs.job(job).unwrap().is_vacant());
        assert_eq!(data.jobs.vacancies().count(RegionId(10)), 0);
        assert!(
            market.find_vacant_job(Some(ZoneId(1)), &mut data, &oracle, &mut rng).is_none()
        );
    }

    #[test]
    fn direct_hire_delists_the_vacancy() {
        let mut data = two_region_store(10.0);
        add_vacant_jobs(&mut data, 1, 1);
        JobMarket::identify_vacancies(&mut data.jobs, &data.geo);
        let (_, persons) =
            settle(&mut data, 0, 1, vec![person(35, Gender::Female, Occupation::Unemployed)]);
        let job = data.jobs.sorted_job_ids()[0];

        // Hiring without going through the search must still delist the job,
        // or a later search could return an occupied id.
        let market = JobMarket::new(JobMarketConfig::default(), flat_tlfd());
        assert!(market.hire(persons[0], job, &mut data));
        assert_eq!(data.jobs.vacancies().count(RegionId(10)), 0);

        let oracle = TestOracle::uniform(10.0);
        let mut rng = SimRng::new(9);
        assert!(
            market.find_vacant_job(Some(ZoneId(1)), &mut data, &oracle, &mut rng).is_none()
        );
    }
}

// ── Construction ──────────────────────────────────────────────────────────────

mod construction {
    use super::*;

    fn occupied_stock(data: &mut DataStore, zone: u32, count: usize) {
        for i in 0..count {
            settle(
                data,
                100 + i as u32,
                zone,
                vec![person(35, Gender::Male, Occupation::Unemployed)],
            );
        }
    }

    #[test]
    fn demand_curve_is_clamped_and_decreasing() {
        let curve = ConstructionDemandCurve::uniform(DemandParams {
            structural_vacancy: 0.03,
            max_growth:         0.05,
        })
        .unwrap();
        let dt = DwellingType::TownHouse;
        assert!((curve.demand(dt, 0.0) - 0.05).abs() < 1e-12);
        assert!(curve.demand(dt, 0.01) > curve.demand(dt, 0.02));
        assert_eq!(curve.demand(dt, 0.03), 0.0);
        assert_eq!(curve.demand(dt, 0.5), 0.0);
    }

    #[test]
    fn invalid_demand_params_are_rejected() {
        let bad = ConstructionDemandCurve::uniform(DemandParams {
            structural_vacancy: 0.03,
            max_growth:         1.5,
        });
        assert!(bad.is_err());
        let bad = ConstructionDemandCurve::uniform(DemandParams {
            structural_vacancy: 0.0,
            max_growth:         0.05,
        });
        assert!(bad.is_err());
    }

    #[test]
    fn units_land_in_the_only_zone_with_capacity() {
        // Zone 1 can take one more unit; zone 2 is built out.
        let mut data = two_region_store(0.0);
        data.geo.zone_mut(ZoneId(1)).unwrap().development =
            Development::new(CapacityKind::DwellingUnits, 1.0);
        occupied_stock(&mut data, 2, 6);

        let curve = ConstructionDemandCurve::uniform(DemandParams {
            structural_vacancy: 0.1,
            max_growth:         0.2,
        })
        .unwrap();
        let mut model = ConstructionModel::new(ConstructionConfig::default(), curve);
        let oracle = TestOracle::uniform(15.0);
        let mut rng = SimRng::new(11);
        let mut ctx = ModelContext::new(&mut data, &oracle, &mut rng);

        let events = model.prepare_year(Year(2016), &mut ctx);
        assert_eq!(events.len(), 1);
        let MarketEvent::Construction(planned) = &events[0] else {
            panic!("expected a construction event");
        };
        assert_eq!(planned.zone, ZoneId(1));
        assert_eq!(planned.quality, MAX_QUALITY);
        assert_eq!(planned.year_built, Year(2016));
        // Capacity was consumed at planning time.
        let remaining =
            data.geo.zone(ZoneId(1)).unwrap().development.remaining_capacity();
        assert_eq!(remaining, 0.0);
    }

    #[test]
    fn applying_events_grows_stock_and_lists_vacancies() {
        let mut data = two_region_store(0.0);
        data.geo.zone_mut(ZoneId(1)).unwrap().development =
            Development::new(CapacityKind::DwellingUnits, 2.0);
        occupied_stock(&mut data, 2, 6);

        let curve = ConstructionDemandCurve::uniform(DemandParams {
            structural_vacancy: 0.1,
            max_growth:         1.0,
        })
        .unwrap();
        let mut model = ConstructionModel::new(ConstructionConfig::default(), curve);
        let oracle = TestOracle::uniform(15.0);
        let mut rng = SimRng::new(5);
        let mut ctx = ModelContext::new(&mut data, &oracle, &mut rng);

        // Demand asks for six units but only two fit anywhere.
        let events = model.prepare_year(Year(2016), &mut ctx);
        assert_eq!(events.len(), 2);

        let before = data.real_estate.dwelling_count();
        let vacant_before = data.real_estate.vacancies().count(RegionId(10));
        for event in &events {
            let mut ctx = ModelContext::new(&mut data, &oracle, &mut rng);
            assert!(model.handle_event(event, &mut ctx).is_accepted());
        }
        assert_eq!(data.real_estate.dwelling_count(), before + events.len());
        assert_eq!(
            data.real_estate.vacancies().count(RegionId(10)),
            vacant_before + events.len()
        );

        // Every new unit carries a utility for every household type.
        let expected_types = lu_data::HouseholdType::all().len();
        for id in data.real_estate.sorted_dwelling_ids() {
            let dd = data.real_estate.dwelling(id).unwrap();
            if dd.year_built == Year(2016) {
                assert_eq!(dd.utilities.len(), expected_types);
            }
        }
        assert!(data.audit().is_empty());
    }
}

// ── Demolition ────────────────────────────────────────────────────────────────

mod demolition {
    use super::*;

    #[test]
    fn certain_demolition_selects_every_dwelling() {
        let mut data = two_region_store(10.0);
        settle(&mut data, 0, 1, vec![person(50, Gender::Male, Occupation::Unemployed)]);
        settle(&mut data, 1, 2, vec![person(60, Gender::Female, Occupation::Retired)]);

        let config = DemolitionConfig { base_rate: 1.0, ..DemolitionConfig::default() };
        let mut model = DemolitionModel::new(config);
        let oracle = TestOracle::uniform(10.0);
        let mut rng = SimRng::new(2);
        let mut ctx = ModelContext::new(&mut data, &oracle, &mut rng);
        let events = model.prepare_year(Year(2020), &mut ctx);
        assert_eq!(events.len(), 2);
    }

    #[test]
    fn occupied_demolition_displaces_household() {
        let mut data = two_region_store(10.0);
        let (hh, _) =
            settle(&mut data, 0, 1, vec![person(50, Gender::Male, Occupation::Unemployed)]);
        let before = data.geo.zone(ZoneId(1)).unwrap().development.remaining_capacity();

        let mut model = DemolitionModel::new(DemolitionConfig::default());
        let oracle = TestOracle::uniform(10.0);
        let mut rng = SimRng::new(2);
        let mut ctx = ModelContext::new(&mut data, &oracle, &mut rng);
        let event = MarketEvent::Demolition { dwelling: DwellingId(0) };
        assert!(model.handle_event(&event, &mut ctx).is_accepted());

        assert!(data.real_estate.dwelling(DwellingId(0)).is_none());
        assert!(!data.households.household(hh).unwrap().dwelling.is_valid());
        let after = data.geo.zone(ZoneId(1)).unwrap().development.remaining_capacity();
        assert_eq!(after, before + 1.0);
        assert!(data.audit().is_empty());
    }

    #[test]
    fn stale_demolition_fails_quietly() {
        let mut data = two_region_store(10.0);
        let mut model = DemolitionModel::new(DemolitionConfig::default());
        let oracle = TestOracle::uniform(10.0);
        let mut rng = SimRng::new(2);
        let mut ctx = ModelContext::new(&mut data, &oracle, &mut rng);
        let event = MarketEvent::Demolition { dwelling: DwellingId(99) };
        assert!(!model.handle_event(&event, &mut ctx).is_accepted());
    }
}

// ── Matching ──────────────────────────────────────────────────────────────────

mod matching {
    use super::*;

    #[test]
    fn three_by_two_leaves_one_proposer_unmatched() {
        // Rows: proposers, columns: receivers.
        let utility = [
            10.0, 1.0, //
            8.0, 9.0, //
            7.0, 2.0,
        ];
        let matches = deferred_acceptance(3, 2, &utility);
        assert_eq!(matches, vec![(0, 0), (1, 1)]);
    }

    #[test]
    fn better_late_proposal_displaces_earlier_match() {
        let utility = [
            5.0, 0.0, //
            9.0, 1.0,
        ];
        // Proposer 1 values receiver 0 more and wins them; proposer 0 has no
        // acceptable alternative.
        let matches = deferred_acceptance(2, 2, &utility);
        assert_eq!(matches, vec![(1, 0)]);
    }

    #[test]
    fn non_positive_utilities_never_match() {
        let utility = [0.0, -1.0, 0.0, 0.0];
        assert!(deferred_acceptance(2, 2, &utility).is_empty());
        assert!(deferred_acceptance(0, 0, &[]).is_empty());
    }

    #[test]
    fn larger_market_is_stable_and_one_to_one() {
        let (n_proposers, n_receivers) = (6, 5);
        let utility: Vec<f64> = (0..n_proposers * n_receivers)
            .map(|i| {
                let (p, r) = (i / n_receivers, i % n_receivers);
                1.0 + ((p * 7 + r * 3) % 11) as f64
            })
            .collect();
        let matches = deferred_acceptance(n_proposers, n_receivers, &utility);

        let mut receiver_of = vec![None; n_proposers];
        let mut proposer_of = vec![None; n_receivers];
        for &(p, r) in &matches {
            assert!(receiver_of[p].is_none(), "proposer {p} matched twice");
            assert!(proposer_of[r].is_none(), "receiver {r} matched twice");
            receiver_of[p] = Some(r);
            proposer_of[r] = Some(p);
        }
        // Every utility is positive and proposers outnumber receivers, so
        // every receiver ends up matched.
        assert_eq!(matches.len(), n_receivers);

        // No blocking pair: no (p, r) where both strictly prefer each other
        // over their assigned partners.
        let u = |p: usize, r: usize| utility[p * n_receivers + r];
        for p in 0..n_proposers {
            for r in 0..n_receivers {
                let p_prefers = match receiver_of[p] {
                    Some(cur) => u(p, r) > u(p, cur),
                    None => u(p, r) > 0.0,
                };
                let r_prefers = match proposer_of[r] {
                    Some(cur) => u(p, r) > u(cur, r),
                    None => u(p, r) > 0.0,
                };
                assert!(!(p_prefers && r_prefers), "blocking pair ({p}, {r})");
            }
        }
    }
}

// ── Marriage market ───────────────────────────────────────────────────────────

mod marriage_market {
    use super::*;

    fn always_table() -> MarriageProbabilityTable {
        let rows: Vec<(u32, f64, f64)> = (18..60).map(|age| (age, 1.0, 1.0)).collect();
        MarriageProbabilityTable::from_rows(&rows).unwrap()
    }

    #[test]
    fn singles_marry_and_households_merge() {
        let mut data = two_region_store(10.0);
        let (his_hh, his) =
            settle(&mut data, 0, 1, vec![person(30, Gender::Male, Occupation::Unemployed)]);
        let (her_hh, hers) =
            settle(&mut data, 1, 2, vec![person(28, Gender::Female, Occupation::Unemployed)]);
        let her_dwelling = data.households.household(her_hh).unwrap().dwelling;

        let config = MarriageConfig { single_household_bias: 1.0, ..MarriageConfig::default() };
        let mut market = MarriageMarket::new(config, always_table());
        let oracle = TestOracle::uniform(12.0);
        let mut rng = SimRng::new(4);
        let mut ctx = ModelContext::new(&mut data, &oracle, &mut rng);

        let events = market.prepare_year(Year(2015), &mut ctx);
        assert_eq!(events.len(), 1);
        let &MarketEvent::Marriage { proposer, partner } = &events[0] else {
            panic!("expected a marriage event");
        };
        assert_eq!(proposer, his[0]);
        assert_eq!(partner, hers[0]);

        let vacant_before = data.real_estate.vacancies().count(RegionId(10));
        let mut ctx = ModelContext::new(&mut data, &oracle, &mut rng);
        assert!(market.handle_event(&events[0], &mut ctx).is_accepted());

        let household = data.households.household(his_hh).unwrap();
        assert_eq!(household.size(), 2);
        assert!(data.households.household(her_hh).is_none());
        for id in [proposer, partner] {
            assert_eq!(data.households.person(id).unwrap().role, PersonRole::Married);
        }
        // Her vacated home went back on the market.
        assert!(!data.real_estate.dwelling(her_dwelling).unwrap().resident.is_valid());
        assert_eq!(data.real_estate.vacancies().count(RegionId(10)), vacant_before + 1);
        assert!(data.audit().is_empty());
    }

    #[test]
    fn receivers_are_capped_by_proposer_count() {
        let mut data = two_region_store(10.0);
        settle(&mut data, 0, 1, vec![person(30, Gender::Male, Occupation::Unemployed)]);
        for i in 0..3 {
            settle(
                &mut data,
                1 + i,
                2,
                vec![person(28, Gender::Female, Occupation::Unemployed)],
            );
        }

        let config = MarriageConfig { single_household_bias: 1.0, ..MarriageConfig::default() };
        let mut market = MarriageMarket::new(config, always_table());
        let oracle = TestOracle::uniform(12.0);
        let mut rng = SimRng::new(4);
        let mut ctx = ModelContext::new(&mut data, &oracle, &mut rng);

        // One proposer means at most one receiver and one match.
        let events = market.prepare_year(Year(2015), &mut ctx);
        assert_eq!(events.len(), 1);
    }

    #[test]
    fn married_and_underage_persons_never_enter() {
        let mut data = two_region_store(10.0);
        let mut married = person(30, Gender::Male, Occupation::Unemployed);
        married.role = PersonRole::Married;
        settle(&mut data, 0, 1, vec![married]);
        settle(&mut data, 1, 2, vec![person(15, Gender::Female, Occupation::Student)]);

        let mut market = MarriageMarket::new(MarriageConfig::default(), always_table());
        let oracle = TestOracle::uniform(12.0);
        let mut rng = SimRng::new(4);
        let mut ctx = ModelContext::new(&mut data, &oracle, &mut rng);
        assert!(market.prepare_year(Year(2015), &mut ctx).is_empty());
    }
}

// ── Car ownership ─────────────────────────────────────────────────────────────

mod car_ownership {
    use super::*;

    #[test]
    fn first_year_only_takes_baselines() {
        let mut data = two_region_store(10.0);
        settle(&mut data, 0, 1, vec![person(40, Gender::Male, Occupation::Unemployed)]);

        let mut model = CarOwnershipModel::new(CarOwnershipTable::new());
        let oracle = TestOracle::uniform(10.0);
        let mut rng = SimRng::new(6);
        let mut ctx = ModelContext::new(&mut data, &oracle, &mut rng);
        assert!(model.prepare_year(Year(2015), &mut ctx).is_empty());
    }

    #[test]
    fn income_rise_can_add_a_car() {
        let mut data = two_region_store(10.0);
        let (hh, persons) =
            settle(&mut data, 0, 1, vec![person(40, Gender::Male, Occupation::Unemployed)]);

        let mut table = CarOwnershipTable::new();
        table
            .set(
                CarTransitionKey {
                    prev_autos: 0,
                    size_up: false,
                    size_down: false,
                    income_up: true,
                    income_down: false,
                    license_up: false,
                    changed_residence: false,
                },
                [0.0, 0.0, 1.0],
            )
            .unwrap();
        let mut model = CarOwnershipModel::new(table);
        let oracle = TestOracle::uniform(10.0);
        let mut rng = SimRng::new(6);

        let mut ctx = ModelContext::new(&mut data, &oracle, &mut rng);
        assert!(model.prepare_year(Year(2015), &mut ctx).is_empty());

        data.households.person_mut(persons[0]).unwrap().income = 50_000;
        let mut ctx = ModelContext::new(&mut data, &oracle, &mut rng);
        let events = model.prepare_year(Year(2016), &mut ctx);
        assert_eq!(events.len(), 1);

        let mut ctx = ModelContext::new(&mut data, &oracle, &mut rng);
        assert!(model.handle_event(&events[0], &mut ctx).is_accepted());
        assert_eq!(data.households.household(hh).unwrap().autos, 1);
    }

    #[test]
    fn auto_count_is_clamped_at_the_maximum() {
        let mut data = two_region_store(10.0);
        let (hh, persons) =
            settle(&mut data, 0, 1, vec![person(40, Gender::Male, Occupation::Unemployed)]);
        data.households.household_mut(hh).unwrap().autos = CarOwnershipTable::MAX_AUTOS;

        let mut table = CarOwnershipTable::new();
        table
            .set(
                CarTransitionKey {
                    prev_autos: CarOwnershipTable::MAX_AUTOS,
                    size_up: false,
                    size_down: false,
                    income_up: true,
                    income_down: false,
                    license_up: false,
                    changed_residence: false,
                },
                [0.0, 0.0, 1.0],
            )
            .unwrap();
        let mut model = CarOwnershipModel::new(table);
        let oracle = TestOracle::uniform(10.0);
        let mut rng = SimRng::new(6);

        let mut ctx = ModelContext::new(&mut data, &oracle, &mut rng);
        model.prepare_year(Year(2015), &mut ctx);
        data.households.person_mut(persons[0]).unwrap().income = 80_000;
        let mut ctx = ModelContext::new(&mut data, &oracle, &mut rng);
        let events = model.prepare_year(Year(2016), &mut ctx);
        let mut ctx = ModelContext::new(&mut data, &oracle, &mut rng);
        assert!(model.handle_event(&events[0], &mut ctx).is_accepted());
        assert_eq!(
            data.households.household(hh).unwrap().autos,
            CarOwnershipTable::MAX_AUTOS
        );
    }
}

// ── Calibration loaders ───────────────────────────────────────────────────────

mod calibration {
    use super::*;

    #[test]
    fn car_table_rejects_bad_distributions() {
        let mut table = CarOwnershipTable::new();
        let key = CarTransitionKey {
            prev_autos: 1,
            size_up: true,
            size_down: false,
            income_up: false,
            income_down: false,
            license_up: false,
            changed_residence: false,
        };
        assert!(table.set(key, [0.5, 0.2, 0.2]).is_err());
        assert!(table.set(key, [-0.1, 1.0, 0.1]).is_err());
        assert!(table.set(key, [0.1, 0.8, 0.1]).is_ok());
    }

    #[test]
    fn marriage_table_loads_from_csv() {
        let csv = "age,male,female\n25,0.04,0.06\n26,0.05,0.07\n";
        let table = MarriageProbabilityTable::from_reader(Cursor::new(csv)).unwrap();
        assert!((table.probability(Gender::Male, 25) - 0.04).abs() < 1e-12);
        assert!((table.probability(Gender::Female, 26) - 0.07).abs() < 1e-12);
        assert_eq!(table.probability(Gender::Male, 80), 0.0);
    }

    #[test]
    fn marriage_table_rejects_out_of_range_probabilities() {
        let csv = "age,male,female\n25,1.5,0.06\n";
        assert!(MarriageProbabilityTable::from_reader(Cursor::new(csv)).is_err());
    }

    #[test]
    fn demand_curve_loads_from_csv() {
        let csv = "dwelling_type,structural_vacancy,max_growth\n\
                   detached,0.03,0.05\n\
                   townhouse,0.03,0.05\n\
                   small-apartment,0.04,0.06\n\
                   large-apartment,0.04,0.06\n\
                   mobile-home,0.05,0.02\n";
        let curve = ConstructionDemandCurve::from_reader(Cursor::new(csv)).unwrap();
        assert!((curve.demand(DwellingType::MobileHome, 0.0) - 0.02).abs() < 1e-12);
    }

    #[test]
    fn demand_curve_requires_every_type() {
        let csv = "dwelling_type,structural_vacancy,max_growth\ndetached,0.03,0.05\n";
        assert!(ConstructionDemandCurve::from_reader(Cursor::new(csv)).is_err());
    }
}
