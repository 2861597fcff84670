//! Filter-string codec for cohort query criteria
//!
//! A criterion's constraints travel as a FHIR-search-like string of
//! `key=value` fragments joined by `&`. This crate provides:
//! - Fragment splitting and assembly
//! - The resource-type to parameter-name table
//! - Per-field encoders and decoders (dates, durations, comparators,
//!   label lists, free text, organisational units, imaging attachments,
//!   biology values)
//! - Questionnaire form tables

pub mod attachment;
pub mod comparator;
pub mod date;
pub mod duration;
pub mod error;
pub mod fragment;
pub mod label;
pub mod observation;
pub mod params;
pub mod questionnaire;
pub mod search;
pub mod service;
pub mod systems;

pub use attachment::*;
pub use comparator::*;
pub use date::*;
pub use duration::*;
pub use error::*;
pub use fragment::*;
pub use label::*;
pub use observation::*;
pub use params::*;
pub use questionnaire::*;
pub use search::*;
pub use service::*;
pub use systems::*;
