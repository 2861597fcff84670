//! Query document unbuilder
//!
//! Decodes a serialized document back into an editable [`CohortRequest`].
//! Populations, organisational units and vocabulary labels are looked up
//! through the [`ResolverSet`]; lookups of one document run concurrently and
//! their failures degrade into diagnostics. Only a malformed document or a
//! criterion whose kind cannot be determined aborts the unbuild.

mod criteria;
mod reid;
mod vocabulary;

pub use criteria::CriterionDecoder;
pub use reid::{FlatTree, Renumbered, renumber};
pub use vocabulary::VocabularyCache;

use crate::request::{CohortRequest, UnbuiltRequest};
use futures::future::join_all;
use octofhir_cohort_ast::{JsonSerializer, QueryDocument, RequestSerializer, SourcePopulation};
use octofhir_cohort_diagnostics::{COH0200, Diagnostic, Result};
use octofhir_cohort_model::ResolverSet;
use octofhir_cohort_types::PopulationRef;
use tracing::{debug, instrument, warn};

/// Decodes query documents
#[derive(Debug, Clone, Default)]
pub struct RequestUnbuilder {
    resolvers: ResolverSet,
}

impl RequestUnbuilder {
    pub fn new(resolvers: ResolverSet) -> Self {
        Self { resolvers }
    }

    /// Unbuilder that performs no lookup: ids are echoed and labels stay empty
    pub fn offline() -> Self {
        Self::default()
    }

    pub fn resolvers(&self) -> &ResolverSet {
        &self.resolvers
    }

    /// Decode a serialized document
    ///
    /// Blank input is an empty request.
    #[instrument(skip_all, fields(len = json.len()))]
    pub async fn unbuild(&self, json: &str) -> Result<UnbuiltRequest> {
        if json.trim().is_empty() {
            return Ok(UnbuiltRequest::default());
        }
        let document = JsonSerializer::new().deserialize(json)?;
        self.unbuild_document(document).await
    }

    pub async fn unbuild_document(&self, document: QueryDocument) -> Result<UnbuiltRequest> {
        let mut diagnostics = Vec::new();
        let population = self
            .resolve_population(&document.source_population, &mut diagnostics)
            .await;
        let mut request = CohortRequest {
            population: Some(population),
            provider_cohort_list: document.source_population.provider_cohort_list,
            ..Default::default()
        };

        let Some(root) = document.request else {
            debug!("document has no request tree");
            return Ok(UnbuiltRequest { request, diagnostics });
        };

        let tree = FlatTree::explore(root);
        let vocabulary = VocabularyCache::new(self.resolvers.vocabulary.clone());
        let decoder = CriterionDecoder::new(&self.resolvers, &vocabulary);

        let decoded = join_all(tree.criteria.iter().map(|node| decoder.decode(node))).await;
        let mut criteria = Vec::with_capacity(decoded.len());
        for result in decoded {
            let (criterion, found) = result?;
            criteria.push(criterion);
            diagnostics.extend(found);
        }
        diagnostics.extend(vocabulary.take_diagnostics());

        let renumbered = renumber(&tree.groups, criteria, tree.temporal_constraints);
        request.criteria = renumbered.criteria;
        request.groups = renumbered.groups;
        request.temporal_constraints = renumbered.temporal_constraints;

        debug!(
            criteria = request.criteria.len(),
            groups = request.groups.len(),
            diagnostics = diagnostics.len(),
            "unbuilt request"
        );
        Ok(UnbuiltRequest { request, diagnostics })
    }

    /// Resolve every population entry concurrently, in list order
    async fn resolve_population(
        &self,
        source: &SourcePopulation,
        diagnostics: &mut Vec<Diagnostic>,
    ) -> Vec<Option<PopulationRef>> {
        let lookups = source
            .caresite_cohort_list
            .iter()
            .map(|id| self.resolvers.population.resolve_population(id));
        let results = join_all(lookups).await;

        source
            .caresite_cohort_list
            .iter()
            .zip(results)
            .map(|(id, result)| match result {
                Ok(population) => population,
                Err(e) => {
                    warn!(cohort = %id, error = %e, "population lookup failed");
                    diagnostics.push(
                        Diagnostic::warning(COH0200, format!("population {} could not be resolved: {}", id, e))
                            .with_fragment(id.clone()),
                    );
                    None
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use octofhir_cohort_model::InMemoryCatalog;
    use octofhir_cohort_types::{CriteriaType, GroupKind, SelectedCriterion};
    use pretty_assertions::assert_eq;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_blank_input_is_empty_request() {
        let unbuilt = RequestUnbuilder::offline().unbuild("  \n").await.unwrap();
        assert_eq!(unbuilt, UnbuiltRequest::default());
    }

    #[tokio::test]
    async fn test_malformed_document_is_fatal() {
        let err = RequestUnbuilder::offline().unbuild("{\"version\":").await.unwrap_err();
        assert_eq!(err.code(), octofhir_cohort_diagnostics::COH0001);
    }

    #[tokio::test]
    async fn test_population_only() {
        let json = r#"{"version":"v1.4.4","_type":"request","sourcePopulation":{"caresiteCohortList":["10","11"],"providerCohortList":["7"]}}"#;
        let catalog = InMemoryCatalog::new();
        catalog.add_population(PopulationRef::new("1", "10"));
        let unbuilder = RequestUnbuilder::new(ResolverSet::uniform(Arc::new(catalog)));

        let unbuilt = unbuilder.unbuild(json).await.unwrap();
        assert_eq!(unbuilt.request.population, Some(vec![Some(PopulationRef::new("1", "10")), None]));
        assert_eq!(unbuilt.request.provider_cohort_list, Some(vec!["7".to_string()]));
        assert!(unbuilt.request.criteria.is_empty());
        assert!(unbuilt.request.groups.is_empty());
    }

    #[tokio::test]
    async fn test_tree_is_renumbered() {
        let json = r#"{
            "version": "v1.4.4",
            "_type": "request",
            "sourcePopulation": {"caresiteCohortList": ["10"]},
            "request": {
                "_type": "andGroup", "_id": 0, "isInclusive": true,
                "criteria": [
                    {"_type": "basicResource", "_id": 12, "name": "", "isInclusive": true,
                     "resourceType": "Patient", "filterFhir": "active=true&gender=f"},
                    {"_type": "orGroup", "_id": -7, "isInclusive": false, "criteria": [
                        {"_type": "basicResource", "_id": 40, "name": "Actes", "isInclusive": true,
                         "resourceType": "Procedure", "filterFhir": "subject.active=true&source=AREM"}
                    ]}
                ]
            }
        }"#;
        let unbuilt = RequestUnbuilder::offline().unbuild(json).await.unwrap();
        let request = unbuilt.request;

        assert_eq!(
            request.criteria.iter().map(SelectedCriterion::criteria_type).collect::<Vec<_>>(),
            vec![CriteriaType::Patient, CriteriaType::Procedure]
        );
        assert_eq!(request.criteria[1].id(), 2);
        assert_eq!(request.criteria[1].title(), "Actes");
        assert_eq!(request.groups[0].criteria_ids, vec![1, -1]);
        assert_eq!(request.groups[1].kind, GroupKind::OrGroup);
        assert!(!request.groups[1].is_inclusive);
        assert!(unbuilt.diagnostics.is_empty());
    }
}
