//! Mock resolvers for testing
//!
//! Provide failing and counting implementations of the resolver traits.

use async_trait::async_trait;
use octofhir_cohort::model::{
    BiologyHierarchy, OrganizationUnitResolver, PopulationResolver, ResolveError, VocabularyKind,
    VocabularyResolver,
};
use octofhir_cohort::types::{LabelObject, OrgUnitRef, PopulationRef};
use std::sync::atomic::{AtomicUsize, Ordering};

/// Resolver whose every lookup fails
#[derive(Debug, Default)]
pub struct FailingResolver {
    calls: AtomicUsize,
}

impl FailingResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of lookups attempted so far
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn fail<T>(&self, what: &str) -> Result<T, ResolveError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(ResolveError::Unavailable(format!("{} backend is down", what)))
    }
}

#[async_trait]
impl PopulationResolver for FailingResolver {
    async fn resolve_population(&self, _cohort_id: &str) -> Result<Option<PopulationRef>, ResolveError> {
        self.fail("population")
    }
}

#[async_trait]
impl OrganizationUnitResolver for FailingResolver {
    async fn resolve_unit(&self, _id: &str) -> Result<OrgUnitRef, ResolveError> {
        self.fail("unit")
    }
}

#[async_trait]
impl VocabularyResolver for FailingResolver {
    async fn reference_list(&self, _kind: VocabularyKind) -> Result<Vec<LabelObject>, ResolveError> {
        self.fail("vocabulary")
    }
}

#[async_trait]
impl BiologyHierarchy for FailingResolver {
    async fn children(&self, _code: &str) -> Result<Vec<LabelObject>, ResolveError> {
        self.fail("biology")
    }
}
