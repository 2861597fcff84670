//! Serialized cohort query document
//!
//! This crate provides:
//! - The wire model of a query document (nested groups of criterion nodes)
//! - Tree helpers used when splicing documents together
//! - JSON serialization

pub mod model;
pub mod serialize;

pub use model::*;
pub use serialize::*;
