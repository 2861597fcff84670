//! Selected criteria
//!
//! A [`SelectedCriterion`] is one inclusion/exclusion rule on a clinical
//! resource type, as held in an editing session. Each variant owns a
//! per-resource payload; fields shared by all variants live in
//! [`CriterionHeader`], and the occurrence/encounter context shared by all
//! but patient and IPP-list criteria lives in [`AdvancedCriteria`].

use crate::{
    AnswerValue, CriteriaType, DateRange, DocumentAttachment, DocumentStatus, DurationRange,
    LabelObject, ObservationValue, Occurrence, OrgUnitRef, ResourceType, SearchBy,
};
use chrono::NaiveDate;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Fields common to every criterion
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CriterionHeader {
    pub id: i64,
    #[serde(default)]
    pub title: String,
    pub is_inclusive: bool,
    /// Set when part of the filter string could not be interpreted
    #[serde(default)]
    pub error: bool,
}

impl CriterionHeader {
    pub fn new(id: i64, title: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            is_inclusive: true,
            error: false,
        }
    }
}

/// Occurrence and encounter context of a criterion
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdvancedCriteria {
    #[serde(default)]
    pub occurrence: Option<Occurrence>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub occurrence_time_delay_min: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub occurrence_time_delay_max: Option<i64>,
    #[serde(default)]
    pub start_occurrence: Option<NaiveDate>,
    #[serde(default)]
    pub end_occurrence: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub date_preference: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_is_not_null: Option<bool>,
    #[serde(default)]
    pub encounter_start_date: Option<NaiveDate>,
    #[serde(default)]
    pub encounter_end_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub encounter_date_is_not_null: Option<bool>,
    #[serde(default)]
    pub encounter_service: Vec<OrgUnitRef>,
    #[serde(default)]
    pub encounter_status: Vec<LabelObject>,
}

impl AdvancedCriteria {
    pub fn has_occurrence_dates(&self) -> bool {
        self.start_occurrence.is_some() || self.end_occurrence.is_some()
    }

    pub fn has_encounter_dates(&self) -> bool {
        self.encounter_start_date.is_some() || self.encounter_end_date.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientCriterion {
    #[serde(flatten)]
    pub header: CriterionHeader,
    #[serde(default)]
    pub genders: Vec<LabelObject>,
    #[serde(default)]
    pub vital_status: Vec<LabelObject>,
    #[serde(default)]
    pub birthdates: DateRange,
    #[serde(default)]
    pub death_dates: DateRange,
    #[serde(default)]
    pub age: DurationRange,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EncounterCriterion {
    #[serde(flatten)]
    pub header: CriterionHeader,
    #[serde(flatten)]
    pub advanced: AdvancedCriteria,
    /// Length of stay
    #[serde(default)]
    pub duration: DurationRange,
    /// Age at the start (lower bound) and end (upper bound) of the visit
    #[serde(default)]
    pub age: DurationRange,
    #[serde(default)]
    pub admission_mode: Vec<LabelObject>,
    #[serde(default)]
    pub entry_mode: Vec<LabelObject>,
    #[serde(default)]
    pub exit_mode: Vec<LabelObject>,
    #[serde(default)]
    pub care_type: Vec<LabelObject>,
    #[serde(default)]
    pub stay_type: Vec<LabelObject>,
    #[serde(default)]
    pub reason: Vec<LabelObject>,
    #[serde(default)]
    pub destination: Vec<LabelObject>,
    #[serde(default)]
    pub provenance: Vec<LabelObject>,
    #[serde(default)]
    pub admission: Vec<LabelObject>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentsCriterion {
    #[serde(flatten)]
    pub header: CriterionHeader,
    #[serde(flatten)]
    pub advanced: AdvancedCriteria,
    #[serde(default)]
    pub search: String,
    #[serde(default)]
    pub search_by: SearchBy,
    #[serde(default)]
    pub doc_types: Vec<LabelObject>,
    #[serde(default)]
    pub doc_statuses: Vec<DocumentStatus>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConditionCriterion {
    #[serde(flatten)]
    pub header: CriterionHeader,
    #[serde(flatten)]
    pub advanced: AdvancedCriteria,
    #[serde(default)]
    pub code: Vec<LabelObject>,
    #[serde(default)]
    pub diagnostic_type: Vec<LabelObject>,
    #[serde(default)]
    pub source: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcedureCriterion {
    #[serde(flatten)]
    pub header: CriterionHeader,
    #[serde(flatten)]
    pub advanced: AdvancedCriteria,
    #[serde(default)]
    pub code: Vec<LabelObject>,
    #[serde(default)]
    pub source: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaimCriterion {
    #[serde(flatten)]
    pub header: CriterionHeader,
    #[serde(flatten)]
    pub advanced: AdvancedCriteria,
    #[serde(default)]
    pub code: Vec<LabelObject>,
}

/// Payload shared by medication requests and administrations
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MedicationCriterion {
    #[serde(flatten)]
    pub header: CriterionHeader,
    #[serde(flatten)]
    pub advanced: AdvancedCriteria,
    #[serde(default)]
    pub code: Vec<LabelObject>,
    /// Only meaningful for requests
    #[serde(default)]
    pub prescription_type: Vec<LabelObject>,
    /// Administration route
    #[serde(default)]
    pub administration: Vec<LabelObject>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObservationCriterion {
    #[serde(flatten)]
    pub header: CriterionHeader,
    #[serde(flatten)]
    pub advanced: AdvancedCriteria,
    #[serde(default)]
    pub code: Vec<LabelObject>,
    /// The single selected code has no children in the biology hierarchy
    #[serde(default)]
    pub is_leaf: bool,
    #[serde(default)]
    pub value: ObservationValue,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImagingCriterion {
    #[serde(flatten)]
    pub header: CriterionHeader,
    #[serde(flatten)]
    pub advanced: AdvancedCriteria,
    #[serde(default)]
    pub study_dates: DateRange,
    #[serde(default)]
    pub study_modalities: Vec<LabelObject>,
    #[serde(default)]
    pub study_description: String,
    #[serde(default)]
    pub study_procedure: String,
    #[serde(default)]
    pub number_of_series: Occurrence,
    #[serde(default)]
    pub number_of_instances: Occurrence,
    #[serde(default)]
    pub with_document: DocumentAttachment,
    #[serde(default)]
    pub study_uid: String,
    #[serde(default)]
    pub series_dates: DateRange,
    #[serde(default)]
    pub series_description: String,
    #[serde(default)]
    pub series_protocol: String,
    #[serde(default)]
    pub series_modalities: Vec<LabelObject>,
    #[serde(default)]
    pub series_uid: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IppListCriterion {
    #[serde(flatten)]
    pub header: CriterionHeader,
    /// Patient identifiers, comma or newline separated as entered
    #[serde(default)]
    pub search: String,
}

/// A criterion on the answers of a questionnaire form
///
/// Answers are keyed by the form field name; unanswered fields are absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionnaireCriterion {
    #[serde(flatten)]
    pub header: CriterionHeader,
    #[serde(flatten)]
    pub advanced: AdvancedCriteria,
    #[serde(default)]
    pub answers: IndexMap<String, AnswerValue>,
}

/// A criterion selected in an editing session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum SelectedCriterion {
    Patient(PatientCriterion),
    Encounter(EncounterCriterion),
    Documents(DocumentsCriterion),
    Condition(ConditionCriterion),
    Procedure(ProcedureCriterion),
    Claim(ClaimCriterion),
    MedicationRequest(MedicationCriterion),
    MedicationAdministration(MedicationCriterion),
    Observation(ObservationCriterion),
    Imaging(ImagingCriterion),
    IppList(IppListCriterion),
    Pregnancy(QuestionnaireCriterion),
    Hospit(QuestionnaireCriterion),
}

macro_rules! each_variant {
    ($value:expr, $c:ident => $body:expr) => {
        match $value {
            SelectedCriterion::Patient($c) => $body,
            SelectedCriterion::Encounter($c) => $body,
            SelectedCriterion::Documents($c) => $body,
            SelectedCriterion::Condition($c) => $body,
            SelectedCriterion::Procedure($c) => $body,
            SelectedCriterion::Claim($c) => $body,
            SelectedCriterion::MedicationRequest($c) => $body,
            SelectedCriterion::MedicationAdministration($c) => $body,
            SelectedCriterion::Observation($c) => $body,
            SelectedCriterion::Imaging($c) => $body,
            SelectedCriterion::IppList($c) => $body,
            SelectedCriterion::Pregnancy($c) => $body,
            SelectedCriterion::Hospit($c) => $body,
        }
    };
}

impl SelectedCriterion {
    /// An inclusive criterion of the given kind with every field unset
    pub fn empty(kind: CriteriaType, id: i64) -> Self {
        let header = CriterionHeader::new(id, default_title(kind));
        let advanced = AdvancedCriteria::default();
        match kind {
            CriteriaType::Patient => Self::Patient(PatientCriterion {
                header,
                genders: Vec::new(),
                vital_status: Vec::new(),
                birthdates: DateRange::default(),
                death_dates: DateRange::default(),
                age: DurationRange::default(),
            }),
            CriteriaType::Encounter => Self::Encounter(EncounterCriterion {
                header,
                advanced,
                duration: DurationRange::default(),
                age: DurationRange::default(),
                admission_mode: Vec::new(),
                entry_mode: Vec::new(),
                exit_mode: Vec::new(),
                care_type: Vec::new(),
                stay_type: Vec::new(),
                reason: Vec::new(),
                destination: Vec::new(),
                provenance: Vec::new(),
                admission: Vec::new(),
            }),
            CriteriaType::Documents => Self::Documents(DocumentsCriterion {
                header,
                advanced,
                search: String::new(),
                search_by: SearchBy::default(),
                doc_types: Vec::new(),
                doc_statuses: Vec::new(),
            }),
            CriteriaType::Condition => Self::Condition(ConditionCriterion {
                header,
                advanced,
                code: Vec::new(),
                diagnostic_type: Vec::new(),
                source: None,
            }),
            CriteriaType::Procedure => Self::Procedure(ProcedureCriterion {
                header,
                advanced,
                code: Vec::new(),
                source: None,
            }),
            CriteriaType::Claim => Self::Claim(ClaimCriterion {
                header,
                advanced,
                code: Vec::new(),
            }),
            CriteriaType::MedicationRequest | CriteriaType::MedicationAdministration => {
                let medication = MedicationCriterion {
                    header,
                    advanced,
                    code: Vec::new(),
                    prescription_type: Vec::new(),
                    administration: Vec::new(),
                };
                if kind == CriteriaType::MedicationRequest {
                    Self::MedicationRequest(medication)
                } else {
                    Self::MedicationAdministration(medication)
                }
            }
            CriteriaType::Observation => Self::Observation(ObservationCriterion {
                header,
                advanced,
                code: Vec::new(),
                is_leaf: false,
                value: ObservationValue::default(),
            }),
            CriteriaType::Imaging => Self::Imaging(ImagingCriterion {
                header,
                advanced,
                study_dates: DateRange::default(),
                study_modalities: Vec::new(),
                study_description: String::new(),
                study_procedure: String::new(),
                number_of_series: Occurrence::default(),
                number_of_instances: Occurrence::default(),
                with_document: DocumentAttachment::default(),
                study_uid: String::new(),
                series_dates: DateRange::default(),
                series_description: String::new(),
                series_protocol: String::new(),
                series_modalities: Vec::new(),
                series_uid: String::new(),
            }),
            CriteriaType::IppList => Self::IppList(IppListCriterion {
                header,
                search: String::new(),
            }),
            CriteriaType::Pregnancy | CriteriaType::Hospit => {
                let questionnaire = QuestionnaireCriterion {
                    header,
                    advanced,
                    answers: IndexMap::new(),
                };
                if kind == CriteriaType::Pregnancy {
                    Self::Pregnancy(questionnaire)
                } else {
                    Self::Hospit(questionnaire)
                }
            }
        }
    }

    pub fn header(&self) -> &CriterionHeader {
        each_variant!(self, c => &c.header)
    }

    pub fn header_mut(&mut self) -> &mut CriterionHeader {
        each_variant!(self, c => &mut c.header)
    }

    pub fn id(&self) -> i64 {
        self.header().id
    }

    pub fn title(&self) -> &str {
        &self.header().title
    }

    pub fn is_inclusive(&self) -> bool {
        self.header().is_inclusive
    }

    /// Whether decoding could not interpret part of the filter string
    pub fn has_error(&self) -> bool {
        self.header().error
    }

    pub const fn criteria_type(&self) -> CriteriaType {
        match self {
            Self::Patient(_) => CriteriaType::Patient,
            Self::Encounter(_) => CriteriaType::Encounter,
            Self::Documents(_) => CriteriaType::Documents,
            Self::Condition(_) => CriteriaType::Condition,
            Self::Procedure(_) => CriteriaType::Procedure,
            Self::Claim(_) => CriteriaType::Claim,
            Self::MedicationRequest(_) => CriteriaType::MedicationRequest,
            Self::MedicationAdministration(_) => CriteriaType::MedicationAdministration,
            Self::Observation(_) => CriteriaType::Observation,
            Self::Imaging(_) => CriteriaType::Imaging,
            Self::IppList(_) => CriteriaType::IppList,
            Self::Pregnancy(_) => CriteriaType::Pregnancy,
            Self::Hospit(_) => CriteriaType::Hospit,
        }
    }

    pub const fn resource_type(&self) -> ResourceType {
        self.criteria_type().resource_type()
    }

    /// Occurrence and encounter context, absent for patient and IPP-list criteria
    pub fn advanced(&self) -> Option<&AdvancedCriteria> {
        match self {
            Self::Patient(_) | Self::IppList(_) => None,
            Self::Encounter(c) => Some(&c.advanced),
            Self::Documents(c) => Some(&c.advanced),
            Self::Condition(c) => Some(&c.advanced),
            Self::Procedure(c) => Some(&c.advanced),
            Self::Claim(c) => Some(&c.advanced),
            Self::MedicationRequest(c) | Self::MedicationAdministration(c) => Some(&c.advanced),
            Self::Observation(c) => Some(&c.advanced),
            Self::Imaging(c) => Some(&c.advanced),
            Self::Pregnancy(c) | Self::Hospit(c) => Some(&c.advanced),
        }
    }

    pub fn advanced_mut(&mut self) -> Option<&mut AdvancedCriteria> {
        match self {
            Self::Patient(_) | Self::IppList(_) => None,
            Self::Encounter(c) => Some(&mut c.advanced),
            Self::Documents(c) => Some(&mut c.advanced),
            Self::Condition(c) => Some(&mut c.advanced),
            Self::Procedure(c) => Some(&mut c.advanced),
            Self::Claim(c) => Some(&mut c.advanced),
            Self::MedicationRequest(c) | Self::MedicationAdministration(c) => {
                Some(&mut c.advanced)
            }
            Self::Observation(c) => Some(&mut c.advanced),
            Self::Imaging(c) => Some(&mut c.advanced),
            Self::Pregnancy(c) | Self::Hospit(c) => Some(&mut c.advanced),
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.header_mut().title = title.into();
        self
    }

    pub fn excluding(mut self) -> Self {
        self.header_mut().is_inclusive = false;
        self
    }
}

/// Title given to a criterion that has none
pub const fn default_title(kind: CriteriaType) -> &'static str {
    match kind {
        CriteriaType::Patient => "Critère démographique",
        CriteriaType::Encounter => "Critère de prise en charge",
        CriteriaType::Documents => "Critère de document",
        CriteriaType::Condition => "Critère de diagnostic",
        CriteriaType::Procedure => "Critères d'actes CCAM",
        CriteriaType::Claim => "Critère de GHM",
        CriteriaType::MedicationRequest | CriteriaType::MedicationAdministration => {
            "Critère de médicament"
        }
        CriteriaType::Observation => "Critère de biologie",
        CriteriaType::Imaging => "Critère d'Imagerie",
        CriteriaType::IppList => "Critère de liste IPP",
        CriteriaType::Pregnancy => "Critère de Fiche de grossesse",
        CriteriaType::Hospit => "Critère de Fiche d'hospitalisation",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{CalendarDuration, Comparator};
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case(CriteriaType::Patient)]
    #[case(CriteriaType::Encounter)]
    #[case(CriteriaType::Documents)]
    #[case(CriteriaType::MedicationAdministration)]
    #[case(CriteriaType::Imaging)]
    #[case(CriteriaType::Hospit)]
    fn test_empty_criterion_kind(#[case] kind: CriteriaType) {
        let criterion = SelectedCriterion::empty(kind, 4);
        assert_eq!(criterion.criteria_type(), kind);
        assert_eq!(criterion.id(), 4);
        assert!(criterion.is_inclusive());
        assert!(!criterion.has_error());
        assert_eq!(criterion.advanced().is_some(), kind.has_occurrence());
    }

    #[test]
    fn test_imaging_counts_default_to_at_least_one() {
        let SelectedCriterion::Imaging(imaging) = SelectedCriterion::empty(CriteriaType::Imaging, 1)
        else {
            panic!("expected imaging criterion");
        };
        assert_eq!(imaging.number_of_series, Occurrence::new(1, Comparator::GreaterOrEqual));
        assert_eq!(imaging.number_of_instances.value, 1);
    }

    #[test]
    fn test_tagged_serialization() {
        let mut criterion = SelectedCriterion::empty(CriteriaType::Patient, 1);
        if let SelectedCriterion::Patient(p) = &mut criterion {
            p.age.start = Some(CalendarDuration::new(18, 0, 0));
        }

        let json = serde_json::to_value(&criterion).unwrap();
        assert_eq!(json["type"], "Patient");
        assert_eq!(json["id"], 1);
        assert_eq!(json["isInclusive"], true);
        assert_eq!(json["age"]["start"], "18/0/0");

        let back: SelectedCriterion = serde_json::from_value(json).unwrap();
        assert_eq!(back, criterion);
    }

    #[test]
    fn test_header_mutation() {
        let mut criterion = SelectedCriterion::empty(CriteriaType::Claim, 2)
            .with_title("GHM")
            .excluding();
        criterion.header_mut().id = 9;

        assert_eq!(criterion.id(), 9);
        assert_eq!(criterion.title(), "GHM");
        assert!(!criterion.is_inclusive());
        assert_eq!(criterion.resource_type(), ResourceType::Claim);
    }
}
