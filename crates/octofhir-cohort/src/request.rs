//! Editable state of a cohort query

use octofhir_cohort_diagnostics::Diagnostic;
use octofhir_cohort_types::{
    CriteriaGroup, PopulationRef, SelectedCriterion, TemporalConstraint, is_deidentified,
};
use serde::{Deserialize, Serialize};

/// The criteria, groups and temporal constraints of one query
///
/// Group `0` is the root; a request without it serializes with no tree.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CohortRequest {
    /// Source population, `None` until one is picked
    ///
    /// An entry that could not be resolved is kept as `None` so it can be
    /// picked again.
    #[serde(default)]
    pub population: Option<Vec<Option<PopulationRef>>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider_cohort_list: Option<Vec<String>>,
    #[serde(default)]
    pub criteria: Vec<SelectedCriterion>,
    #[serde(default)]
    pub groups: Vec<CriteriaGroup>,
    #[serde(default)]
    pub temporal_constraints: Vec<TemporalConstraint>,
}

impl CohortRequest {
    pub fn new(population: Vec<Option<PopulationRef>>) -> Self {
        Self {
            population: Some(population),
            ..Default::default()
        }
    }

    pub fn with_criterion(mut self, criterion: SelectedCriterion) -> Self {
        self.criteria.push(criterion);
        self
    }

    pub fn with_group(mut self, group: CriteriaGroup) -> Self {
        self.groups.push(group);
        self
    }

    pub fn with_constraint(mut self, constraint: TemporalConstraint) -> Self {
        self.temporal_constraints.push(constraint);
        self
    }

    /// Whether any member of the source population is pseudonymised
    pub fn is_deidentified(&self) -> bool {
        self.population.as_deref().is_some_and(is_deidentified)
    }

    pub fn criterion(&self, id: i64) -> Option<&SelectedCriterion> {
        self.criteria.iter().find(|c| c.id() == id)
    }

    pub fn group(&self, id: i64) -> Option<&CriteriaGroup> {
        self.groups.iter().find(|g| g.id == id)
    }
}

/// A decoded document, with the findings collected while decoding it
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnbuiltRequest {
    #[serde(flatten)]
    pub request: CohortRequest,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub diagnostics: Vec<Diagnostic>,
}

impl UnbuiltRequest {
    /// Whether some criterion could only be partially decoded
    pub fn has_incomplete_criteria(&self) -> bool {
        self.request.criteria.iter().any(SelectedCriterion::has_error)
    }

    pub fn into_request(self) -> CohortRequest {
        self.request
    }
}
