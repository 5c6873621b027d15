//! Unit tests for lu-model event types.

use lu_core::{DwellingId, PersonId};

use crate::{EventOutcome, MarketEvent};

#[test]
fn event_kinds() {
    let search = MarketEvent::JobSearch { person: PersonId(1) };
    assert_eq!(search.kind(), "job-search");
    let demolition = MarketEvent::Demolition { dwelling: DwellingId(3) };
    assert_eq!(demolition.kind(), "demolition");
    let marriage = MarketEvent::Marriage { proposer: PersonId(1), partner: PersonId(2) };
    assert_eq!(marriage.kind(), "marriage");
}

#[test]
fn outcome_accepted_flag() {
    assert!(EventOutcome::Accepted.is_accepted());
    assert!(!EventOutcome::Failed.is_accepted());
}
