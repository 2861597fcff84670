//! Field value types shared by criteria and the filter codec

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Error raised when a textual value cannot be parsed
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseValueError {
    #[error("invalid comparator '{0}'")]
    Comparator(String),
    #[error("invalid duration '{0}', expected Y/M/D")]
    Duration(String),
}

/// A reference to an external vocabulary concept
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct LabelObject {
    pub id: String,
    #[serde(default)]
    pub label: String,
    /// Coding system, when it differs from the field's default system
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,
}

impl LabelObject {
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            system: None,
        }
    }

    /// A concept whose label is not known
    pub fn unlabelled(id: impl Into<String>) -> Self {
        Self::new(id, "")
    }

    pub fn with_system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }
}

/// Numeric comparison operator
///
/// Serialized with its symbol (`>=`), encoded in filter strings with its
/// two-letter prefix (`ge`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Comparator {
    #[serde(rename = "<=")]
    LessOrEqual,
    #[serde(rename = "<")]
    Less,
    #[serde(rename = "=")]
    Equal,
    #[serde(rename = ">")]
    Greater,
    #[default]
    #[serde(rename = ">=")]
    GreaterOrEqual,
}

impl Comparator {
    pub const ALL: [Comparator; 5] = [
        Self::LessOrEqual,
        Self::Less,
        Self::Equal,
        Self::Greater,
        Self::GreaterOrEqual,
    ];

    pub const fn symbol(&self) -> &'static str {
        match self {
            Self::LessOrEqual => "<=",
            Self::Less => "<",
            Self::Equal => "=",
            Self::Greater => ">",
            Self::GreaterOrEqual => ">=",
        }
    }

    /// Filter-string prefix (`le`, `lt`, `eq`, `gt`, `ge`)
    pub const fn prefix(&self) -> &'static str {
        match self {
            Self::LessOrEqual => "le",
            Self::Less => "lt",
            Self::Equal => "eq",
            Self::Greater => "gt",
            Self::GreaterOrEqual => "ge",
        }
    }

    pub fn from_prefix(prefix: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.prefix() == prefix)
    }
}

impl fmt::Display for Comparator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl FromStr for Comparator {
    type Err = ParseValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.symbol() == s)
            .ok_or_else(|| ParseValueError::Comparator(s.to_string()))
    }
}

/// Comparator for measured values, which also allows a closed interval
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ValueComparator {
    #[serde(rename = "<=")]
    LessOrEqual,
    #[serde(rename = "<")]
    Less,
    #[serde(rename = "=")]
    Equal,
    #[serde(rename = ">")]
    Greater,
    #[default]
    #[serde(rename = ">=")]
    GreaterOrEqual,
    #[serde(rename = "<x>")]
    Between,
}

impl ValueComparator {
    /// The single-bound comparator, `None` for [`ValueComparator::Between`]
    pub const fn as_comparator(&self) -> Option<Comparator> {
        match self {
            Self::LessOrEqual => Some(Comparator::LessOrEqual),
            Self::Less => Some(Comparator::Less),
            Self::Equal => Some(Comparator::Equal),
            Self::Greater => Some(Comparator::Greater),
            Self::GreaterOrEqual => Some(Comparator::GreaterOrEqual),
            Self::Between => None,
        }
    }
}

impl From<Comparator> for ValueComparator {
    fn from(c: Comparator) -> Self {
        match c {
            Comparator::LessOrEqual => Self::LessOrEqual,
            Comparator::Less => Self::Less,
            Comparator::Equal => Self::Equal,
            Comparator::Greater => Self::Greater,
            Comparator::GreaterOrEqual => Self::GreaterOrEqual,
        }
    }
}

/// Occurrence constraint (`>= 1` by default)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Occurrence {
    pub value: u32,
    pub comparator: Comparator,
}

impl Default for Occurrence {
    fn default() -> Self {
        Self {
            value: 1,
            comparator: Comparator::GreaterOrEqual,
        }
    }
}

impl Occurrence {
    pub const fn new(value: u32, comparator: Comparator) -> Self {
        Self { value, comparator }
    }
}

/// A decimal compared against a threshold
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NumericFilter {
    pub value: Decimal,
    pub comparator: Comparator,
}

impl NumericFilter {
    pub fn new(value: impl Into<Decimal>, comparator: Comparator) -> Self {
        Self {
            value: value.into(),
            comparator,
        }
    }
}

/// Measured value of a biology result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObservationValue {
    pub comparator: ValueComparator,
    pub min: Option<Decimal>,
    /// Upper bound, only meaningful with [`ValueComparator::Between`]
    pub max: Option<Decimal>,
}

/// Optional lower and upper bound
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Bounds<T> {
    pub start: Option<T>,
    pub end: Option<T>,
}

impl<T> Default for Bounds<T> {
    fn default() -> Self {
        Self {
            start: None,
            end: None,
        }
    }
}

impl<T> Bounds<T> {
    pub const fn new(start: Option<T>, end: Option<T>) -> Self {
        Self { start, end }
    }

    pub const fn is_empty(&self) -> bool {
        self.start.is_none() && self.end.is_none()
    }
}

pub type DateRange = Bounds<NaiveDate>;
pub type DurationRange = Bounds<CalendarDuration>;

/// A `years/months/days` duration as entered in age and length fields
///
/// Transported as a single number: days (365-day years, 30-day months) or,
/// for pseudonymised populations, whole months.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CalendarDuration {
    pub years: u32,
    pub months: u32,
    pub days: u32,
}

impl CalendarDuration {
    pub const fn new(years: u32, months: u32, days: u32) -> Self {
        Self {
            years,
            months,
            days,
        }
    }

    pub const fn to_days(&self) -> u64 {
        self.years as u64 * 365 + self.months as u64 * 30 + self.days as u64
    }

    /// Whole months; the day component is dropped
    pub const fn to_months(&self) -> u64 {
        self.years as u64 * 12 + self.months as u64
    }

    pub const fn from_days(days: u32) -> Self {
        Self::new(days / 365, (days % 365) / 30, (days % 365) % 30)
    }

    pub const fn from_months(months: u32) -> Self {
        Self::new(months / 12, months % 12, 0)
    }

    pub const fn is_zero(&self) -> bool {
        self.years == 0 && self.months == 0 && self.days == 0
    }

    /// Same duration with the year component cleared
    pub const fn without_years(&self) -> Self {
        Self::new(0, self.months, self.days)
    }
}

impl fmt::Display for CalendarDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.years, self.months, self.days)
    }
}

impl FromStr for CalendarDuration {
    type Err = ParseValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseValueError::Duration(s.to_string());
        let mut parts = s.split('/').map(|p| p.trim().parse::<u32>());
        match (parts.next(), parts.next(), parts.next(), parts.next()) {
            (Some(Ok(y)), Some(Ok(m)), Some(Ok(d)), None) => Ok(Self::new(y, m, d)),
            _ => Err(err()),
        }
    }
}

impl TryFrom<String> for CalendarDuration {
    type Error = ParseValueError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<CalendarDuration> for String {
    fn from(value: CalendarDuration) -> Self {
        value.to_string()
    }
}

/// Validation status of a clinical document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DocumentStatus {
    Validated,
    NotValidated,
}

impl DocumentStatus {
    /// Code used in filter strings
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Validated => "final",
            Self::NotValidated => "preliminary",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "final" => Some(Self::Validated),
            "preliminary" => Some(Self::NotValidated),
            _ => None,
        }
    }
}

/// Where a free-text document search applies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SearchBy {
    #[default]
    Text,
    Description,
}

/// How an imaging study must be linked to a document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AttachmentMethod {
    #[default]
    None,
    InferenceTemporel,
    AccessNumber,
}

impl AttachmentMethod {
    pub const fn code(&self) -> &'static str {
        match self {
            Self::None => "NONE",
            Self::InferenceTemporel => "INFERENCE_TEMPOREL",
            Self::AccessNumber => "ACCESS_NUMBER",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "NONE" => Some(Self::None),
            "INFERENCE_TEMPOREL" => Some(Self::InferenceTemporel),
            "ACCESS_NUMBER" => Some(Self::AccessNumber),
            _ => None,
        }
    }
}

/// Document attachment policy of an imaging criterion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentAttachment {
    pub method: AttachmentMethod,
    /// Maximum delay in days between the study and the document
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub days_of_delay: Option<u32>,
}
