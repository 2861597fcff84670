//! Lookup collaborators for cohort query decoding
//!
//! This crate provides:
//! - Resolver traits for populations, organisational units, vocabularies
//!   and the biology hierarchy
//! - A pass-through resolver for offline use
//! - An in-memory catalog loadable from JSON

pub mod catalog;
pub mod provider;
pub mod resolver;

pub use catalog::*;
pub use provider::*;
pub use resolver::*;
