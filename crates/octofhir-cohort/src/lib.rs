//! Cohort query build/unbuild engine
//!
//! This crate translates between the editable state of a cohort query (a
//! flat list of selected criteria, a group tree and temporal constraints) and
//! the serialized document sent to the cohort backend:
//! - [`RequestBuilder`] serializes a [`CohortRequest`]
//! - [`RequestUnbuilder`] decodes a document back into an editable request
//! - [`RequestMerger`] splices a sub-query into an existing query
//! - [`nominative`] detects and strips criteria a pseudonymised population cannot use
//!
//! # Example
//!
//! ```ignore
//! use octofhir_cohort::{RequestBuilder, RequestUnbuilder};
//!
//! let json = RequestBuilder::new().build(&request)?;
//! let unbuilt = RequestUnbuilder::offline().unbuild(&json).await?;
//! ```

// Re-export all public APIs from internal crates
pub use octofhir_cohort_ast as ast;
pub use octofhir_cohort_diagnostics as diagnostics;
pub use octofhir_cohort_filter as filter;
pub use octofhir_cohort_model as model;
pub use octofhir_cohort_types as types;

pub mod build;
pub mod merger;
pub mod nominative;
pub mod request;
pub mod unbuild;

// Convenience re-exports
pub use build::{BuildOptions, RequestBuilder};
pub use merger::{JoinOptions, JoinedRequest, OffsetPolicy, RequestMerger, join_request};
pub use nominative::{clean_nominative, is_nominative};
pub use octofhir_cohort_diagnostics::{CohortError, Diagnostic, Result};
pub use octofhir_cohort_model::ResolverSet;
pub use request::{CohortRequest, UnbuiltRequest};
pub use unbuild::RequestUnbuilder;

// CLI module (only available with cli feature)
#[cfg(feature = "cli")]
pub mod cli;
