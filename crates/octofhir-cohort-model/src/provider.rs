//! Resolver traits consumed by the query decoder

use async_trait::async_trait;
use octofhir_cohort_types::{LabelObject, OrgUnitRef, PopulationRef};
use std::fmt;

/// Resolves a `caresiteCohortList` entry into the population it designates
#[async_trait]
pub trait PopulationResolver: Send + Sync {
    /// `Ok(None)` when the population does not exist or is not visible
    async fn resolve_population(&self, cohort_id: &str) -> Result<Option<PopulationRef>, ResolveError>;
}

/// Resolves organisational-unit ids used by encounter-service filters
#[async_trait]
pub trait OrganizationUnitResolver: Send + Sync {
    async fn resolve_unit(&self, id: &str) -> Result<OrgUnitRef, ResolveError>;
}

/// Provides the reference list used to label decoded codes
#[async_trait]
pub trait VocabularyResolver: Send + Sync {
    async fn reference_list(&self, kind: VocabularyKind) -> Result<Vec<LabelObject>, ResolveError>;
}

/// Navigates the biology code hierarchy
#[async_trait]
pub trait BiologyHierarchy: Send + Sync {
    /// Direct children of a code
    async fn children(&self, code: &str) -> Result<Vec<LabelObject>, ResolveError>;

    /// Whether the code has at least one child
    async fn has_children(&self, code: &str) -> Result<bool, ResolveError> {
        Ok(!self.children(code).await?.is_empty())
    }
}

/// A vocabulary a decoded label list refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VocabularyKind {
    Gender,
    VitalStatus,
    AdmissionMode,
    EntryMode,
    ExitMode,
    CareType,
    StayType,
    EncounterReason,
    Destination,
    Provenance,
    Admission,
    EncounterStatus,
    DocumentType,
    ConditionCode,
    DiagnosticType,
    ProcedureCode,
    ClaimCode,
    MedicationCode,
    PrescriptionType,
    AdministrationRoute,
    BiologyCode,
    Modality,
    /// Answer options of a questionnaire field, by link id
    QuestionnaireAnswer(&'static str),
}

impl VocabularyKind {
    /// Key of the vocabulary in a catalog file
    pub fn key(&self) -> String {
        let name = match self {
            Self::Gender => "gender",
            Self::VitalStatus => "vitalStatus",
            Self::AdmissionMode => "admissionMode",
            Self::EntryMode => "entryMode",
            Self::ExitMode => "exitMode",
            Self::CareType => "careType",
            Self::StayType => "stayType",
            Self::EncounterReason => "encounterReason",
            Self::Destination => "destination",
            Self::Provenance => "provenance",
            Self::Admission => "admission",
            Self::EncounterStatus => "encounterStatus",
            Self::DocumentType => "documentType",
            Self::ConditionCode => "conditionCode",
            Self::DiagnosticType => "diagnosticType",
            Self::ProcedureCode => "procedureCode",
            Self::ClaimCode => "claimCode",
            Self::MedicationCode => "medicationCode",
            Self::PrescriptionType => "prescriptionType",
            Self::AdministrationRoute => "administrationRoute",
            Self::BiologyCode => "biologyCode",
            Self::Modality => "modality",
            Self::QuestionnaireAnswer(link_id) => return format!("questionnaire:{link_id}"),
        };
        name.to_string()
    }
}

impl fmt::Display for VocabularyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.key())
    }
}

/// Resolver error
#[derive(Debug, Clone, thiserror::Error)]
pub enum ResolveError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Service unavailable: {0}")]
    Unavailable(String),

    #[error("Internal error: {0}")]
    Internal(String),
}
