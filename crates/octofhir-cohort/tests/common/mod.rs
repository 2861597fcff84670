//! Common test utilities for cohort query testing
//!
//! This module provides shared testing infrastructure including:
//! - Mock resolvers with configurable failures
//! - Request fixtures covering every criterion kind

pub mod fixtures;
pub mod mocks;

pub use fixtures::*;
pub use mocks::*;
