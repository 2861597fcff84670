//! Biology result value: one `key=<prefix><value>` fragment, or a
//! `ge`/`le` pair for an interval

use crate::comparator::{build_comparator_filter, parse_numeric_filter};
use crate::error::{FilterError, FilterResult};
use octofhir_cohort_types::{Comparator, ObservationValue, ValueComparator};

/// Encode a value constraint
///
/// Only leaf codes with a lower bound carry one. A `Between` missing its
/// upper bound is written as a single `ge` bound and decodes back as
/// `GreaterOrEqual`.
pub fn build_value_filter(key: &str, value: &ObservationValue, is_leaf: bool) -> Option<String> {
    if !is_leaf {
        return None;
    }
    let min = value.min?;
    let filter = match (value.comparator.as_comparator(), value.max) {
        (Some(comparator), _) => format!("{}={}", key, build_comparator_filter(min, comparator)),
        (None, Some(max)) => format!(
            "{key}={}&{key}={}",
            build_comparator_filter(min, Comparator::GreaterOrEqual),
            build_comparator_filter(max, Comparator::LessOrEqual),
        ),
        (None, None) => format!("{}={}", key, build_comparator_filter(min, Comparator::GreaterOrEqual)),
    };
    Some(filter)
}

/// Decode every value fragment of a filter at once
///
/// Two fragments form an interval; none means no constraint.
pub fn parse_value_filter(values: &[&str]) -> FilterResult<Option<ObservationValue>> {
    match values {
        [] => Ok(None),
        [single] => {
            let bound = parse_numeric_filter(single)?;
            Ok(Some(ObservationValue {
                comparator: bound.comparator.into(),
                min: Some(bound.value),
                max: None,
            }))
        }
        [first, second] => {
            let a = parse_numeric_filter(first)?;
            let b = parse_numeric_filter(second)?;
            let (low, high) = match (a.comparator, b.comparator) {
                (Comparator::GreaterOrEqual, Comparator::LessOrEqual) => (a, b),
                (Comparator::LessOrEqual, Comparator::GreaterOrEqual) => (b, a),
                _ => return Err(FilterError::Comparator(format!("{}&{}", first, second))),
            };
            Ok(Some(ObservationValue {
                comparator: ValueComparator::Between,
                min: Some(low.value),
                max: Some(high.value),
            }))
        }
        _ => Err(FilterError::Comparator(values.join("&"))),
    }
}
