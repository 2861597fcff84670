//! Resolver bundle and pass-through resolver

use crate::provider::{
    BiologyHierarchy, OrganizationUnitResolver, PopulationResolver, ResolveError,
    VocabularyKind, VocabularyResolver,
};
use async_trait::async_trait;
use octofhir_cohort_types::{LabelObject, OrgUnitRef, PopulationRef};
use std::sync::Arc;

/// Resolver that performs no lookup
///
/// Populations and units are echoed back from their ids, vocabularies are
/// empty and every biology code is a leaf.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpResolver;

impl NoOpResolver {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl PopulationResolver for NoOpResolver {
    async fn resolve_population(&self, cohort_id: &str) -> Result<Option<PopulationRef>, ResolveError> {
        Ok(Some(PopulationRef::new(cohort_id, cohort_id)))
    }
}

#[async_trait]
impl OrganizationUnitResolver for NoOpResolver {
    async fn resolve_unit(&self, id: &str) -> Result<OrgUnitRef, ResolveError> {
        Ok(OrgUnitRef::unresolved(id))
    }
}

#[async_trait]
impl VocabularyResolver for NoOpResolver {
    async fn reference_list(&self, _kind: VocabularyKind) -> Result<Vec<LabelObject>, ResolveError> {
        Ok(vec![])
    }
}

#[async_trait]
impl BiologyHierarchy for NoOpResolver {
    async fn children(&self, _code: &str) -> Result<Vec<LabelObject>, ResolveError> {
        Ok(vec![])
    }
}

/// The collaborators an unbuild consults
#[derive(Clone)]
pub struct ResolverSet {
    pub population: Arc<dyn PopulationResolver>,
    pub units: Arc<dyn OrganizationUnitResolver>,
    pub vocabulary: Arc<dyn VocabularyResolver>,
    pub biology: Arc<dyn BiologyHierarchy>,
}

impl ResolverSet {
    /// Use one value for every collaborator
    pub fn uniform<R>(resolver: Arc<R>) -> Self
    where
        R: PopulationResolver + OrganizationUnitResolver + VocabularyResolver + BiologyHierarchy + 'static,
    {
        Self {
            population: resolver.clone(),
            units: resolver.clone(),
            vocabulary: resolver.clone(),
            biology: resolver,
        }
    }

    pub fn with_population(mut self, resolver: Arc<dyn PopulationResolver>) -> Self {
        self.population = resolver;
        self
    }

    pub fn with_units(mut self, resolver: Arc<dyn OrganizationUnitResolver>) -> Self {
        self.units = resolver;
        self
    }

    pub fn with_vocabulary(mut self, resolver: Arc<dyn VocabularyResolver>) -> Self {
        self.vocabulary = resolver;
        self
    }

    pub fn with_biology(mut self, resolver: Arc<dyn BiologyHierarchy>) -> Self {
        self.biology = resolver;
        self
    }
}

impl Default for ResolverSet {
    fn default() -> Self {
        Self::uniform(Arc::new(NoOpResolver))
    }
}

impl std::fmt::Debug for ResolverSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResolverSet").finish_non_exhaustive()
    }
}
