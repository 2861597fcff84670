//! Criteria a pseudonymised population cannot use
//!
//! Exact dates of birth and death, ages with a year component, patient
//! identifier lists and questionnaire forms identify patients. A request
//! holding any of them cannot run on a pseudonymised population until it is
//! cleaned.

use octofhir_cohort_types::{CalendarDuration, CriteriaGroup, DurationRange, SelectedCriterion};
use regex::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;
use tracing::debug;

/// `Y/M/D` with a non-zero year
static WITH_YEARS: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(r"^[^0/][^/]*/.*").ok());

fn has_years(duration: &CalendarDuration) -> bool {
    match WITH_YEARS.as_ref() {
        Some(pattern) => pattern.is_match(&duration.to_string()),
        None => duration.years > 0,
    }
}

fn range_has_years(range: &DurationRange) -> bool {
    range.start.iter().chain(range.end.iter()).any(has_years)
}

/// Whether a criterion can only run on a nominative population
fn is_nominative_criterion(criterion: &SelectedCriterion) -> bool {
    match criterion {
        SelectedCriterion::Patient(c) => {
            !c.birthdates.is_empty() || !c.death_dates.is_empty() || range_has_years(&c.age)
        }
        SelectedCriterion::Encounter(c) => range_has_years(&c.age),
        SelectedCriterion::IppList(_) | SelectedCriterion::Pregnancy(_) | SelectedCriterion::Hospit(_) => true,
        _ => false,
    }
}

pub fn is_nominative(criteria: &[SelectedCriterion]) -> bool {
    criteria.iter().any(is_nominative_criterion)
}

const fn is_removed(criterion: &SelectedCriterion) -> bool {
    matches!(
        criterion,
        SelectedCriterion::IppList(_) | SelectedCriterion::Pregnancy(_) | SelectedCriterion::Hospit(_)
    )
}

/// Drop the year component of an age range; a bound left at zero is removed
fn truncate_age(range: &mut DurationRange) {
    for bound in [&mut range.start, &mut range.end] {
        *bound = bound.map(|d| d.without_years()).filter(|d| !d.is_zero());
    }
}

/// Make a request usable on a pseudonymised population
///
/// Identifier lists and questionnaire criteria are removed (and unlinked
/// from their groups), patient dates are cleared and ages lose their years.
pub fn clean_nominative(criteria: Vec<SelectedCriterion>, groups: &mut [CriteriaGroup]) -> Vec<SelectedCriterion> {
    let (removed, kept): (Vec<_>, Vec<_>) = criteria.into_iter().partition(is_removed);
    let removed: HashSet<i64> = removed.iter().map(SelectedCriterion::id).collect();
    if !removed.is_empty() {
        debug!(removed = removed.len(), "removing nominative criteria");
        for group in groups.iter_mut() {
            group.criteria_ids.retain(|id| !removed.contains(id));
        }
    }

    kept.into_iter()
        .map(|mut criterion| {
            match &mut criterion {
                SelectedCriterion::Patient(c) => {
                    c.birthdates = Default::default();
                    c.death_dates = Default::default();
                    truncate_age(&mut c.age);
                }
                SelectedCriterion::Encounter(c) => truncate_age(&mut c.age),
                _ => {}
            }
            criterion
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use octofhir_cohort_types::{CriteriaType, DateRange};
    use pretty_assertions::assert_eq;

    fn patient_with_age(start: CalendarDuration) -> SelectedCriterion {
        let mut criterion = SelectedCriterion::empty(CriteriaType::Patient, 1);
        if let SelectedCriterion::Patient(c) = &mut criterion {
            c.age.start = Some(start);
        }
        criterion
    }

    #[test]
    fn test_age_with_years_is_nominative() {
        assert!(is_nominative(&[patient_with_age(CalendarDuration::new(18, 0, 0))]));
        assert!(!is_nominative(&[patient_with_age(CalendarDuration::new(0, 6, 0))]));
        assert!(!is_nominative(&[SelectedCriterion::empty(CriteriaType::Condition, 1)]));
    }

    #[test]
    fn test_birthdate_and_forms_are_nominative() {
        let mut criterion = SelectedCriterion::empty(CriteriaType::Patient, 1);
        if let SelectedCriterion::Patient(c) = &mut criterion {
            c.birthdates = DateRange::new(NaiveDate::from_ymd_opt(1990, 1, 1), None);
        }
        assert!(is_nominative(&[criterion]));
        assert!(is_nominative(&[SelectedCriterion::empty(CriteriaType::Hospit, 2)]));
    }

    #[test]
    fn test_clean_truncates_ages() {
        let mut encounter = SelectedCriterion::empty(CriteriaType::Encounter, 2);
        if let SelectedCriterion::Encounter(c) = &mut encounter {
            c.age = DurationRange::new(Some(CalendarDuration::new(2, 3, 0)), Some(CalendarDuration::new(5, 0, 0)));
        }
        let mut groups = vec![CriteriaGroup::root().with_children([2])];
        let cleaned = clean_nominative(vec![encounter], &mut groups);

        let SelectedCriterion::Encounter(c) = &cleaned[0] else { panic!("expected an encounter") };
        assert_eq!(c.age, DurationRange::new(Some(CalendarDuration::new(0, 3, 0)), None));
        assert!(!is_nominative(&cleaned));
    }
}
