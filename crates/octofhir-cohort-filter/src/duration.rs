//! Ages and lengths transported as a single day or month count

use crate::comparator::split_prefix;
use crate::date::Direction;
use crate::error::{FilterError, FilterResult};
use octofhir_cohort_types::{CalendarDuration, Comparator, DurationRange};
use winnow::ascii::dec_uint;
use winnow::prelude::*;

/// Transport unit of a duration
///
/// Pseudonymised populations only expose month granularity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DurationUnit {
    Days,
    Months,
}

impl DurationUnit {
    pub const fn for_population(deidentified: bool) -> Self {
        if deidentified { Self::Months } else { Self::Days }
    }

    pub const fn encode(&self, duration: &CalendarDuration) -> u64 {
        match self {
            Self::Days => duration.to_days(),
            Self::Months => duration.to_months(),
        }
    }

    pub const fn decode(&self, count: u32) -> CalendarDuration {
        match self {
            Self::Days => CalendarDuration::from_days(count),
            Self::Months => CalendarDuration::from_months(count),
        }
    }
}

fn day_or_month_count(input: &mut &str) -> ModalResult<u32> {
    dec_uint.parse_next(input)
}

/// `key=<ge|le><count>`, or an empty string without a value
pub fn build_duration_filter(
    key: &str,
    value: Option<&CalendarDuration>,
    direction: Direction,
    unit: DurationUnit,
) -> String {
    match value {
        Some(value) => format!("{}={}{}", key, direction.prefix(), unit.encode(value)),
        None => String::new(),
    }
}

/// Both bounds of a range, joined by `&`
pub fn build_duration_range_filter(key: &str, range: &DurationRange, unit: DurationUnit) -> String {
    [
        build_duration_filter(key, range.start.as_ref(), Direction::Ge, unit),
        build_duration_filter(key, range.end.as_ref(), Direction::Le, unit),
    ]
    .into_iter()
    .filter(|f| !f.is_empty())
    .collect::<Vec<_>>()
    .join("&")
}

/// Decode a `ge`/`le` count back into a calendar duration
pub fn parse_duration_filter(value: &str, unit: DurationUnit) -> FilterResult<(Direction, CalendarDuration)> {
    let err = || FilterError::Duration(value.to_string());
    let (comparator, rest) = split_prefix(value).ok_or_else(err)?;
    let direction = match comparator {
        Comparator::GreaterOrEqual => Direction::Ge,
        Comparator::LessOrEqual => Direction::Le,
        _ => return Err(err()),
    };
    let count = day_or_month_count.parse(rest).map_err(|_| err())?;
    Ok((direction, unit.decode(count)))
}

/// Decode a bound into the matching side of `range`
pub fn apply_duration_bound(range: &mut DurationRange, value: &str, unit: DurationUnit) -> FilterResult<()> {
    let (direction, duration) = parse_duration_filter(value, unit)?;
    match direction {
        Direction::Ge => range.start = Some(duration),
        Direction::Le => range.end = Some(duration),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[test]
    fn test_unit_threads_through_both_directions() {
        let age = CalendarDuration::new(18, 6, 0);
        assert_eq!(
            build_duration_filter("start-age-visit", Some(&age), Direction::Ge, DurationUnit::Days),
            "start-age-visit=ge6750"
        );
        assert_eq!(
            build_duration_filter("start-age-visit-month", Some(&age), Direction::Ge, DurationUnit::Months),
            "start-age-visit-month=ge222"
        );
        assert_eq!(
            parse_duration_filter("ge222", DurationUnit::Months).unwrap(),
            (Direction::Ge, age)
        );
        assert_eq!(
            parse_duration_filter("ge6750", DurationUnit::Days).unwrap(),
            (Direction::Ge, age)
        );
    }

    #[test]
    fn test_months_drop_days() {
        let age = CalendarDuration::new(1, 2, 20);
        assert_eq!(DurationUnit::Months.encode(&age), 14);
        assert_eq!(DurationUnit::Months.decode(14), CalendarDuration::new(1, 2, 0));
    }

    #[test]
    fn test_build_duration_range_filter() {
        let range = DurationRange::new(None, Some(CalendarDuration::new(0, 0, 10)));
        assert_eq!(
            build_duration_range_filter("length", &range, DurationUnit::Days),
            "length=le10"
        );
        assert_eq!(build_duration_range_filter("length", &DurationRange::default(), DurationUnit::Days), "");
    }

    #[rstest]
    #[case("10")]
    #[case("gt10")]
    #[case("ge")]
    #[case("ge1.5")]
    fn test_parse_duration_rejects(#[case] input: &str) {
        assert_eq!(
            parse_duration_filter(input, DurationUnit::Days),
            Err(FilterError::Duration(input.to_string()))
        );
    }

    #[test]
    fn test_apply_duration_bound() {
        let mut range = DurationRange::default();
        apply_duration_bound(&mut range, "ge365", DurationUnit::Days).unwrap();
        apply_duration_bound(&mut range, "le730", DurationUnit::Days).unwrap();
        assert_eq!(
            range,
            DurationRange::new(Some(CalendarDuration::new(1, 0, 0)), Some(CalendarDuration::new(2, 0, 0)))
        );
    }
}
