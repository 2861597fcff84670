//! Query document structures
//!
//! This module defines the serialized form exchanged with the cohort backend.
//! Field names and nesting must stay compatible with the backend schema.

use octofhir_cohort_diagnostics::{COH0301, CohortError, Result};
use octofhir_cohort_types::{Comparator, NAmongMOptions, TemporalConstraint};
use serde::{Deserialize, Serialize};

/// Schema version written by default
pub const DEFAULT_VERSION: &str = "v1.4.4";

// ============================================================================
// Document
// ============================================================================

/// Document kind marker (`_type` of the document)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DocumentType {
    #[default]
    #[serde(rename = "request")]
    Request,
}

/// A serialized cohort query
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryDocument {
    pub version: String,
    #[serde(rename = "_type")]
    pub document_type: DocumentType,
    pub source_population: SourcePopulation,
    /// Root group, absent when the query has no criteria
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request: Option<GroupNode>,
}

impl QueryDocument {
    pub fn new(version: impl Into<String>, source_population: SourcePopulation) -> Self {
        Self {
            version: version.into(),
            document_type: DocumentType::Request,
            source_population,
            request: None,
        }
    }

    pub fn with_request(mut self, request: GroupNode) -> Self {
        self.request = Some(request);
        self
    }
}

/// Populations the query is evaluated against
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourcePopulation {
    #[serde(default)]
    pub caresite_cohort_list: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider_cohort_list: Option<Vec<String>>,
}

// ============================================================================
// Tree nodes
// ============================================================================

/// Criterion node marker (`_type` of a leaf)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CriterionNodeType {
    #[default]
    #[serde(rename = "basicResource")]
    BasicResource,
}

/// Group node kind (`_type` of a group)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum GroupType {
    #[default]
    AndGroup,
    OrGroup,
    NAmongM,
}

/// A child of a group: either a leaf criterion or a nested group
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RequestNode {
    Criterion(CriterionNode),
    Group(GroupNode),
}

impl RequestNode {
    pub fn id(&self) -> i64 {
        match self {
            Self::Criterion(c) => c.id,
            Self::Group(g) => g.id,
        }
    }
}

/// A leaf criterion on one resource type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CriterionNode {
    #[serde(rename = "_type")]
    pub node_type: CriterionNodeType,
    #[serde(rename = "_id")]
    pub id: i64,
    #[serde(default)]
    pub name: String,
    pub is_inclusive: bool,
    pub resource_type: String,
    #[serde(default)]
    pub filter_fhir: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub occurrence: Option<OccurrenceNode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_range_list: Option<Vec<DateRangeNode>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub encounter_date_range: Option<DateRangeNode>,
}

impl CriterionNode {
    pub fn new(id: i64, resource_type: impl Into<String>, filter_fhir: impl Into<String>) -> Self {
        Self {
            node_type: CriterionNodeType::BasicResource,
            id,
            name: String::new(),
            is_inclusive: true,
            resource_type: resource_type.into(),
            filter_fhir: filter_fhir.into(),
            occurrence: None,
            date_range_list: None,
            encounter_date_range: None,
        }
    }
}

/// Occurrence constraint of a criterion node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OccurrenceNode {
    /// Written as `null` when the criterion has no occurrence count
    pub n: Option<u32>,
    pub operator: Comparator,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_delay_min: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_delay_max: Option<i64>,
}

/// Date window, bounds formatted `YYYY-MM-DDT00:00:00Z`
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DateRangeNode {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_preference: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_is_not_null: Option<bool>,
}

/// A boolean combinator over criteria and nested groups
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupNode {
    #[serde(rename = "_type")]
    pub group_type: GroupType,
    #[serde(rename = "_id")]
    pub id: i64,
    pub is_inclusive: bool,
    #[serde(default)]
    pub criteria: Vec<RequestNode>,
    /// Only carried by the root group
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temporal_constraints: Option<Vec<TemporalConstraint>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub n_among_m_options: Option<NAmongMOptions>,
}

impl GroupNode {
    pub fn new(id: i64, group_type: GroupType) -> Self {
        Self {
            group_type,
            id,
            is_inclusive: true,
            criteria: Vec::new(),
            temporal_constraints: None,
            n_among_m_options: None,
        }
    }

    /// Find a group by id, this group included
    pub fn find_group_mut(&mut self, id: i64) -> Option<&mut GroupNode> {
        if self.id == id {
            return Some(self);
        }
        self.criteria.iter_mut().find_map(|child| match child {
            RequestNode::Group(group) => group.find_group_mut(id),
            RequestNode::Criterion(_) => None,
        })
    }

    /// Largest criterion id in the subtree, 0 when there is none
    pub fn max_criterion_id(&self) -> i64 {
        self.criteria
            .iter()
            .map(|child| match child {
                RequestNode::Criterion(c) => c.id,
                RequestNode::Group(g) => g.max_criterion_id(),
            })
            .fold(0, i64::max)
    }

    /// Smallest group id in the subtree, this group included
    pub fn min_group_id(&self) -> i64 {
        self.criteria
            .iter()
            .filter_map(|child| match child {
                RequestNode::Group(g) => Some(g.min_group_id()),
                RequestNode::Criterion(_) => None,
            })
            .fold(self.id, i64::min)
    }

    /// Move the subtree out of another tree's id space
    ///
    /// Criterion ids grow by `offset`, group ids shrink by it. Fails with
    /// COH0301 when an id would leave the `i64` range.
    pub fn shift_ids(&mut self, offset: i64) -> Result<()> {
        self.id = self
            .id
            .checked_sub(offset)
            .ok_or_else(|| shift_overflow("group", self.id, offset))?;
        for child in &mut self.criteria {
            match child {
                RequestNode::Criterion(c) => {
                    c.id = c
                        .id
                        .checked_add(offset)
                        .ok_or_else(|| shift_overflow("criterion", c.id, offset))?;
                }
                RequestNode::Group(g) => g.shift_ids(offset)?,
            }
        }
        Ok(())
    }
}

fn shift_overflow(kind: &str, id: i64, offset: i64) -> CohortError {
    CohortError::merge(COH0301, format!("{} {} cannot be shifted by {}", kind, id, offset))
}
