//! Cohort query diagnostics and error handling
//!
//! This crate provides the error handling infrastructure shared by the
//! cohort query crates: error codes, the fatal [`CohortError`] type and the
//! non-fatal [`Diagnostic`] findings collected while decoding filter strings.

mod error;
mod error_code;

pub use error::*;
pub use error_code::*;

/// Result type for cohort query operations
pub type Result<T> = std::result::Result<T, CohortError>;
