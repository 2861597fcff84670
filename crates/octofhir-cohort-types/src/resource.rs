//! Resource and criterion kinds

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown resource type '{0}'")]
pub struct UnknownResourceType(pub String);

/// Resource type as written in a criterion node's `resourceType`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResourceType {
    Patient,
    Encounter,
    DocumentReference,
    Condition,
    Procedure,
    Claim,
    MedicationRequest,
    MedicationAdministration,
    Observation,
    ImagingStudy,
    #[serde(rename = "IPPList")]
    IppList,
    QuestionnaireResponse,
}

impl ResourceType {
    pub const ALL: [ResourceType; 12] = [
        Self::Patient,
        Self::Encounter,
        Self::DocumentReference,
        Self::Condition,
        Self::Procedure,
        Self::Claim,
        Self::MedicationRequest,
        Self::MedicationAdministration,
        Self::Observation,
        Self::ImagingStudy,
        Self::IppList,
        Self::QuestionnaireResponse,
    ];

    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Patient => "Patient",
            Self::Encounter => "Encounter",
            Self::DocumentReference => "DocumentReference",
            Self::Condition => "Condition",
            Self::Procedure => "Procedure",
            Self::Claim => "Claim",
            Self::MedicationRequest => "MedicationRequest",
            Self::MedicationAdministration => "MedicationAdministration",
            Self::Observation => "Observation",
            Self::ImagingStudy => "ImagingStudy",
            Self::IppList => "IPPList",
            Self::QuestionnaireResponse => "QuestionnaireResponse",
        }
    }
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResourceType {
    type Err = UnknownResourceType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|r| r.as_str() == s)
            .ok_or_else(|| UnknownResourceType(s.to_string()))
    }
}

/// Kind of a selected criterion
///
/// Several kinds can share a resource type: questionnaire-backed kinds are all
/// `QuestionnaireResponse` on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CriteriaType {
    Patient,
    Encounter,
    Documents,
    Condition,
    Procedure,
    Claim,
    MedicationRequest,
    MedicationAdministration,
    Observation,
    Imaging,
    IppList,
    Pregnancy,
    Hospit,
}

impl CriteriaType {
    pub const fn resource_type(&self) -> ResourceType {
        match self {
            Self::Patient => ResourceType::Patient,
            Self::Encounter => ResourceType::Encounter,
            Self::Documents => ResourceType::DocumentReference,
            Self::Condition => ResourceType::Condition,
            Self::Procedure => ResourceType::Procedure,
            Self::Claim => ResourceType::Claim,
            Self::MedicationRequest => ResourceType::MedicationRequest,
            Self::MedicationAdministration => ResourceType::MedicationAdministration,
            Self::Observation => ResourceType::Observation,
            Self::Imaging => ResourceType::ImagingStudy,
            Self::IppList => ResourceType::IppList,
            Self::Pregnancy | Self::Hospit => ResourceType::QuestionnaireResponse,
        }
    }

    /// Whether the criterion carries occurrence and encounter context
    pub const fn has_occurrence(&self) -> bool {
        !matches!(self, Self::Patient | Self::IppList)
    }
}
