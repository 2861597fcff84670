//! Date bounds: `key=ge2020-01-01T00:00:00Z`, `key=le2020-12-31`

use crate::comparator::split_prefix;
use crate::error::{FilterError, FilterResult};
use chrono::NaiveDate;
use octofhir_cohort_types::{Comparator, DateRange};

const DATE_FORMAT: &str = "%Y-%m-%d";
const MIDNIGHT_UTC: &str = "T00:00:00Z";

/// Side of a range a bound closes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Ge,
    Le,
}

impl Direction {
    pub const fn prefix(&self) -> &'static str {
        match self {
            Self::Ge => "ge",
            Self::Le => "le",
        }
    }
}

/// `YYYY-MM-DDT00:00:00Z`
pub fn format_wire_date(date: NaiveDate) -> String {
    format!("{}{}", date.format(DATE_FORMAT), MIDNIGHT_UTC)
}

/// Date part of a `YYYY-MM-DD[T...]` value
pub fn parse_wire_date(value: &str) -> Option<NaiveDate> {
    let date = value.get(..10)?;
    let tail = &value[10..];
    if !tail.is_empty() && !tail.starts_with('T') {
        return None;
    }
    NaiveDate::parse_from_str(date, DATE_FORMAT).ok()
}

/// `key=<ge|le><date>`, or an empty string without a date
///
/// `with_time` appends the midnight UTC suffix used by resource date
/// parameters; questionnaire answers carry the bare date.
pub fn build_date_filter(key: &str, date: Option<NaiveDate>, direction: Direction, with_time: bool) -> String {
    match date {
        Some(date) if with_time => format!("{}={}{}", key, direction.prefix(), format_wire_date(date)),
        Some(date) => format!("{}={}{}", key, direction.prefix(), date.format(DATE_FORMAT)),
        None => String::new(),
    }
}

/// Both bounds of a range, joined by `&`
pub fn build_date_range_filter(key: &str, range: &DateRange, with_time: bool) -> String {
    [
        build_date_filter(key, range.start, Direction::Ge, with_time),
        build_date_filter(key, range.end, Direction::Le, with_time),
    ]
    .into_iter()
    .filter(|f| !f.is_empty())
    .collect::<Vec<_>>()
    .join("&")
}

/// Decode a `ge`/`le` date bound
pub fn parse_date_filter(value: &str) -> FilterResult<(Direction, NaiveDate)> {
    let err = || FilterError::Date(value.to_string());
    let (comparator, rest) = split_prefix(value).ok_or_else(err)?;
    let direction = match comparator {
        Comparator::GreaterOrEqual => Direction::Ge,
        Comparator::LessOrEqual => Direction::Le,
        _ => return Err(err()),
    };
    let date = parse_wire_date(rest).ok_or_else(err)?;
    Ok((direction, date))
}

/// Decode a bound into the matching side of `range`
pub fn apply_date_bound(range: &mut DateRange, value: &str) -> FilterResult<()> {
    let (direction, date) = parse_date_filter(value)?;
    match direction {
        Direction::Ge => range.start = Some(date),
        Direction::Le => range.end = Some(date),
    }
    Ok(())
}
