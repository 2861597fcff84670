//! Filter decode errors

use octofhir_cohort_diagnostics::{
    COH0100, COH0101, COH0102, COH0103, COH0104, COH0105, Diagnostic, ErrorCode,
};
use thiserror::Error;

/// A fragment value that could not be decoded
///
/// Never fatal: the decoder flags the criterion and keeps going.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FilterError {
    #[error("unrecognised filter key '{0}'")]
    UnknownKey(String),

    #[error("malformed date bound '{0}'")]
    Date(String),

    #[error("malformed duration '{0}'")]
    Duration(String),

    #[error("malformed comparator value '{0}'")]
    Comparator(String),

    #[error("unknown document status '{0}'")]
    DocumentStatus(String),

    #[error("unknown document attachment method '{0}'")]
    Attachment(String),
}

impl FilterError {
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::UnknownKey(_) => COH0100,
            Self::Date(_) => COH0101,
            Self::Duration(_) => COH0102,
            Self::Comparator(_) => COH0103,
            Self::DocumentStatus(_) => COH0104,
            Self::Attachment(_) => COH0105,
        }
    }

    /// Warning diagnostic for the given fragment
    pub fn to_diagnostic(&self, fragment: &str) -> Diagnostic {
        Diagnostic::warning(self.code(), self.to_string()).with_fragment(fragment)
    }
}

pub type FilterResult<T> = std::result::Result<T, FilterError>;
