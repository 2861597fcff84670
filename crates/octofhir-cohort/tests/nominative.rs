//! Nominative criteria detection and cleaning

mod common;

use common::*;
use octofhir_cohort::types::{CalendarDuration, CriteriaGroup, CriteriaType, DurationRange, SelectedCriterion};
use octofhir_cohort::{clean_nominative, is_nominative};
use pretty_assertions::assert_eq;

#[test]
fn test_sample_request_is_nominative() {
    // an 18 year age bound
    assert!(is_nominative(&sample_request().criteria));
}

#[test]
fn test_clean_sample_request() {
    let mut request = sample_request();
    request.criteria.push(ipp_list(5));
    request.groups[0].criteria_ids.push(5);

    let cleaned = clean_nominative(request.criteria, &mut request.groups);

    assert_eq!(cleaned.len(), 4);
    assert!(!is_nominative(&cleaned));
    assert_eq!(request.groups[0].criteria_ids, vec![1, -1]);

    let SelectedCriterion::Patient(c) = &cleaned[0] else { panic!("expected a patient") };
    assert_eq!(c.age, DurationRange::default());
    assert_eq!(c.genders.len(), 1);
}

#[test]
fn test_clean_patient_dates() {
    let mut criterion = SelectedCriterion::empty(CriteriaType::Patient, 1);
    if let SelectedCriterion::Patient(c) = &mut criterion {
        c.birthdates = sample_range();
        c.death_dates = sample_range();
        c.age = DurationRange::new(Some(CalendarDuration::new(0, 6, 0)), Some(CalendarDuration::new(1, 2, 3)));
    }
    assert!(is_nominative(std::slice::from_ref(&criterion)));

    let mut groups = vec![CriteriaGroup::root().with_children([1])];
    let cleaned = clean_nominative(vec![criterion], &mut groups);
    let SelectedCriterion::Patient(c) = &cleaned[0] else { panic!("expected a patient") };
    assert!(c.birthdates.is_empty());
    assert!(c.death_dates.is_empty());
    assert_eq!(
        c.age,
        DurationRange::new(Some(CalendarDuration::new(0, 6, 0)), Some(CalendarDuration::new(0, 2, 3)))
    );
    assert_eq!(groups[0].criteria_ids, vec![1]);
}

#[test]
fn test_forms_are_removed() {
    let criteria = vec![
        SelectedCriterion::empty(CriteriaType::Pregnancy, 1),
        SelectedCriterion::empty(CriteriaType::Claim, 2),
        SelectedCriterion::empty(CriteriaType::Hospit, 3),
    ];
    let mut groups = vec![CriteriaGroup::root().with_children([1, 2, 3])];
    let cleaned = clean_nominative(criteria, &mut groups);
    assert_eq!(cleaned.iter().map(SelectedCriterion::id).collect::<Vec<_>>(), vec![2]);
    assert_eq!(groups[0].criteria_ids, vec![2]);
}
