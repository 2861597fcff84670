//! Comparator-prefixed numeric values (`ge3`, `lt0.5`)

use crate::error::{FilterError, FilterResult};
use octofhir_cohort_types::{Comparator, NumericFilter, Occurrence};
use rust_decimal::Decimal;
use std::str::FromStr;
use winnow::ascii::dec_uint;
use winnow::combinator::{alt, opt};
use winnow::prelude::*;
use winnow::token::{rest, take_while};

type Input<'a> = &'a str;

/// `<prefix><value>`, e.g. `ge3`
pub fn build_comparator_filter(value: impl std::fmt::Display, comparator: Comparator) -> String {
    format!("{}{}", comparator.prefix(), value)
}

fn known_prefix(input: &mut Input<'_>) -> ModalResult<Comparator> {
    alt((
        "le".value(Comparator::LessOrEqual),
        "lt".value(Comparator::Less),
        "eq".value(Comparator::Equal),
        "gt".value(Comparator::Greater),
        "ge".value(Comparator::GreaterOrEqual),
    ))
    .parse_next(input)
}

/// A recognised prefix, or any other two letters read as equality
fn comparator_prefix(input: &mut Input<'_>) -> ModalResult<Comparator> {
    let prefix = opt(alt((
        known_prefix,
        take_while(2, |c: char| c.is_ascii_alphabetic()).value(Comparator::Equal),
    )))
    .parse_next(input)?;
    Ok(prefix.unwrap_or(Comparator::Equal))
}

fn occurrence(input: &mut Input<'_>) -> ModalResult<Occurrence> {
    (comparator_prefix, dec_uint)
        .map(|(comparator, value)| Occurrence::new(value, comparator))
        .parse_next(input)
}

fn numeric(input: &mut Input<'_>) -> ModalResult<NumericFilter> {
    (comparator_prefix, rest.try_map(Decimal::from_str))
        .map(|(comparator, value)| NumericFilter { value, comparator })
        .parse_next(input)
}

/// Decode an occurrence count such as `ge3`
///
/// Unknown or missing prefixes decode as equality.
pub fn parse_occurrence(value: &str) -> FilterResult<Occurrence> {
    occurrence
        .parse(value)
        .map_err(|_| FilterError::Comparator(value.to_string()))
}

/// Decode a decimal threshold such as `le2.5`
pub fn parse_numeric_filter(value: &str) -> FilterResult<NumericFilter> {
    numeric
        .parse(value)
        .map_err(|_| FilterError::Comparator(value.to_string()))
}

/// Split a `ge`/`le`-style bound into its comparator and remainder
pub fn split_prefix(value: &str) -> Option<(Comparator, &str)> {
    let mut input = value;
    let comparator = known_prefix(&mut input).ok()?;
    Some((comparator, input))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use rust_decimal::dec;

    #[rstest]
    #[case("ge3", 3, Comparator::GreaterOrEqual)]
    #[case("lt0", 0, Comparator::Less)]
    #[case("le12", 12, Comparator::LessOrEqual)]
    #[case("gt1", 1, Comparator::Greater)]
    #[case("eq7", 7, Comparator::Equal)]
    #[case("xx5", 5, Comparator::Equal)]
    #[case("5", 5, Comparator::Equal)]
    fn test_parse_occurrence(#[case] input: &str, #[case] value: u32, #[case] comparator: Comparator) {
        assert_eq!(parse_occurrence(input).unwrap(), Occurrence::new(value, comparator));
    }

    #[rstest]
    #[case("")]
    #[case("ge")]
    #[case("ge3x")]
    #[case("g3")]
    #[case("ge-1")]
    fn test_parse_occurrence_rejects(#[case] input: &str) {
        assert_eq!(
            parse_occurrence(input),
            Err(FilterError::Comparator(input.to_string()))
        );
    }

    #[test]
    fn test_build_comparator_filter() {
        assert_eq!(build_comparator_filter(3, Comparator::GreaterOrEqual), "ge3");
        assert_eq!(build_comparator_filter(dec!(2.5), Comparator::Less), "lt2.5");
    }

    #[test]
    fn test_parse_numeric_filter() {
        assert_eq!(
            parse_numeric_filter("le2.5").unwrap(),
            NumericFilter::new(dec!(2.5), Comparator::LessOrEqual)
        );
        assert_eq!(
            parse_numeric_filter("40").unwrap(),
            NumericFilter::new(40, Comparator::Equal)
        );
        assert!(parse_numeric_filter("geabc").is_err());
    }

    #[test]
    fn test_split_prefix() {
        assert_eq!(split_prefix("ge2020-01-01"), Some((Comparator::GreaterOrEqual, "2020-01-01")));
        assert_eq!(split_prefix("2020-01-01"), None);
    }
}
