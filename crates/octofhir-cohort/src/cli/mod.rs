//! CLI functionality for the cohort query tool
//!
//! This module contains all CLI-related functionality including:
//! - Building documents from editable requests
//! - Unbuilding documents
//! - Joining sub-queries
//! - Checking documents
//! - Output formatting

pub mod build;
pub mod check;
pub mod join;
pub mod output;
pub mod unbuild;

use anyhow::{Context, Result};
use octofhir_cohort_model::{InMemoryCatalog, ResolverSet};
use std::path::Path;
use std::sync::Arc;

/// Resolvers backed by a catalog file, or offline ones without it
pub fn load_resolvers(catalog: Option<&Path>) -> Result<ResolverSet> {
    let Some(path) = catalog else {
        return Ok(ResolverSet::default());
    };
    let catalog = InMemoryCatalog::from_file(path)
        .with_context(|| format!("Failed to load catalog: {}", path.display()))?;
    Ok(ResolverSet::uniform(Arc::new(catalog)))
}
