//! Cohort query domain model
//!
//! This crate defines the editable side of a cohort query:
//! - Selected criteria, one variant per clinical resource type
//! - Criteria groups (AND / OR / N-among-M) and temporal constraints
//! - Field value types shared by the filter codec (comparators, ranges, label objects)

pub mod criteria;
pub mod group;
pub mod questionnaire;
pub mod resource;
pub mod scope;
pub mod temporal;
pub mod value;

pub use criteria::*;
pub use group::*;
pub use questionnaire::*;
pub use resource::*;
pub use scope::*;
pub use temporal::*;
pub use value::*;
