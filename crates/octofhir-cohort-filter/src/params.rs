//! Resource type to search-parameter name table
//!
//! Every encoder and decoder resolves wire keys through [`param_name`] and
//! [`param_for_key`]; no parameter name is written anywhere else.

use octofhir_cohort_types::ResourceType;

/// Abstract filter field, independent of the resource it applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterParam {
    // Shared encounter context
    Nda,
    Date,
    ExecutiveUnits,
    EncounterStatus,

    // Patient
    Gender,
    VitalStatus,
    Birthdate,
    DeathDate,
    AgeDay,
    AgeMonth,

    // Encounter
    Length,
    VisitStartAgeDay,
    VisitStartAgeMonth,
    VisitEndAgeDay,
    VisitEndAgeMonth,
    AdmissionMode,
    EntryMode,
    ExitMode,
    CareType,
    StayType,
    Reason,
    Destination,
    Provenance,
    Admission,

    // Documents
    Text,
    Title,
    DocStatus,
    DocType,

    // Coded resources
    Code,
    DiagnosticType,
    Source,

    // Medication
    AdministrationRoute,
    PrescriptionType,

    // Observation
    ObservationStatus,
    ObservationValue,

    // IPP list
    IppList,

    // Imaging
    StudyDate,
    StudyModalities,
    StudyDescription,
    StudyProcedure,
    NumberOfSeries,
    NumberOfInstances,
    WithDocument,
    StudyUid,
    SeriesDate,
    SeriesDescription,
    SeriesProtocol,
    SeriesModalities,
    SeriesUid,

    // Questionnaire response
    QuestionnaireName,
    QuestionnaireStatus,
}

impl FilterParam {
    pub const ALL: [FilterParam; 51] = [
        Self::Nda,
        Self::Date,
        Self::ExecutiveUnits,
        Self::EncounterStatus,
        Self::Gender,
        Self::VitalStatus,
        Self::Birthdate,
        Self::DeathDate,
        Self::AgeDay,
        Self::AgeMonth,
        Self::Length,
        Self::VisitStartAgeDay,
        Self::VisitStartAgeMonth,
        Self::VisitEndAgeDay,
        Self::VisitEndAgeMonth,
        Self::AdmissionMode,
        Self::EntryMode,
        Self::ExitMode,
        Self::CareType,
        Self::StayType,
        Self::Reason,
        Self::Destination,
        Self::Provenance,
        Self::Admission,
        Self::Text,
        Self::Title,
        Self::DocStatus,
        Self::DocType,
        Self::Code,
        Self::DiagnosticType,
        Self::Source,
        Self::AdministrationRoute,
        Self::PrescriptionType,
        Self::ObservationStatus,
        Self::ObservationValue,
        Self::IppList,
        Self::StudyDate,
        Self::StudyModalities,
        Self::StudyDescription,
        Self::StudyProcedure,
        Self::NumberOfSeries,
        Self::NumberOfInstances,
        Self::WithDocument,
        Self::StudyUid,
        Self::SeriesDate,
        Self::SeriesDescription,
        Self::SeriesProtocol,
        Self::SeriesModalities,
        Self::SeriesUid,
        Self::QuestionnaireName,
        Self::QuestionnaireStatus,
    ];
}

/// Wire name of a field for a resource type, `None` when the resource has no such field
pub fn param_name(resource: ResourceType, param: FilterParam) -> Option<&'static str> {
    use FilterParam as P;
    use ResourceType as R;

    let name = match (resource, param) {
        (R::Patient, P::Gender) => "gender",
        (R::Patient, P::VitalStatus) => "deceased",
        (R::Patient, P::Birthdate) => "birthdate",
        (R::Patient, P::DeathDate) => "death-date",
        (R::Patient, P::AgeDay) => "age-day",
        (R::Patient, P::AgeMonth) => "age-month",

        (R::Encounter, P::ExecutiveUnits) => "encounter-care-site",
        (R::Encounter, P::EncounterStatus) => "status",
        (R::Encounter, P::Length) => "length",
        (R::Encounter, P::VisitStartAgeDay) => "start-age-visit",
        (R::Encounter, P::VisitStartAgeMonth) => "start-age-visit-month",
        (R::Encounter, P::VisitEndAgeDay) => "end-age-visit",
        (R::Encounter, P::VisitEndAgeMonth) => "end-age-visit-month",
        (R::Encounter, P::AdmissionMode) => "reason-code",
        (R::Encounter, P::EntryMode) => "admission-mode",
        (R::Encounter, P::ExitMode) => "discharge-disposition-mode",
        (R::Encounter, P::CareType) => "class",
        (R::Encounter, P::StayType) => "stay",
        (R::Encounter, P::Reason) => "admission-destination-type",
        (R::Encounter, P::Destination) => "discharge-disposition",
        (R::Encounter, P::Provenance) => "admit-source",
        (R::Encounter, P::Admission) => "admission-type",

        (R::DocumentReference, P::Nda) => "encounter.identifier",
        (R::DocumentReference, P::Date) => "date",
        (R::DocumentReference, P::Text) => "_text",
        (R::DocumentReference, P::Title) => "description",
        (R::DocumentReference, P::DocStatus) => "docstatus",
        (R::DocumentReference, P::DocType) => "type",

        (R::Condition, P::Nda) => "encounter.identifier",
        (R::Condition, P::Date) => "recorded-date",
        (R::Condition, P::Code) => "code",
        (R::Condition, P::DiagnosticType) => "orbis-status",
        (R::Condition, P::Source) => "source",

        (R::Procedure, P::Nda) => "encounter.identifier",
        (R::Procedure, P::Date) => "date",
        (R::Procedure, P::Code) => "code",
        (R::Procedure, P::Source) => "source",

        (R::Claim, P::Nda) => "encounter.identifier",
        (R::Claim, P::Date) => "created",
        (R::Claim, P::Code) => "diagnosis",

        (R::MedicationRequest, P::Nda) => "encounter.identifier",
        (R::MedicationRequest, P::Date) => "validity-period-start",
        (R::MedicationRequest, P::Code) => "medication",
        (R::MedicationRequest, P::AdministrationRoute) => "dosage-instruction-route",
        (R::MedicationRequest, P::PrescriptionType) => "category",

        (R::MedicationAdministration, P::Nda) => "context.identifier",
        (R::MedicationAdministration, P::Date) => "effective-time",
        (R::MedicationAdministration, P::ExecutiveUnits) => "context.encounter-care-site",
        (R::MedicationAdministration, P::Code) => "medication",
        (R::MedicationAdministration, P::AdministrationRoute) => "dosage-route",

        (R::Observation, P::Nda) => "encounter.identifier",
        (R::Observation, P::Date) => "date",
        (R::Observation, P::Code) => "code",
        (R::Observation, P::ObservationStatus) => "status",
        (R::Observation, P::ObservationValue) => "value-quantity",

        (R::IppList, P::IppList) => "identifier.value",

        (R::ImagingStudy, P::Nda) => "encounter.identifier",
        (R::ImagingStudy, P::StudyDate) => "started",
        (R::ImagingStudy, P::StudyModalities) => "modality",
        (R::ImagingStudy, P::StudyDescription) => "description",
        (R::ImagingStudy, P::StudyProcedure) => "procedureCode",
        (R::ImagingStudy, P::NumberOfSeries) => "numberOfSeries",
        (R::ImagingStudy, P::NumberOfInstances) => "numberOfInstances",
        (R::ImagingStudy, P::WithDocument) => "with-document",
        (R::ImagingStudy, P::StudyUid) => "identifier",
        (R::ImagingStudy, P::SeriesDate) => "series-started",
        (R::ImagingStudy, P::SeriesDescription) => "series-description",
        (R::ImagingStudy, P::SeriesProtocol) => "series-protocol",
        (R::ImagingStudy, P::SeriesModalities) => "series-modality",
        (R::ImagingStudy, P::SeriesUid) => "series",

        (R::QuestionnaireResponse, P::QuestionnaireName) => "questionnaire.name",
        (R::QuestionnaireResponse, P::QuestionnaireStatus) => "status",

        // Encounter context of every resource linked to a visit
        (
            R::DocumentReference
            | R::Condition
            | R::Procedure
            | R::Claim
            | R::MedicationRequest
            | R::Observation
            | R::ImagingStudy
            | R::QuestionnaireResponse,
            P::ExecutiveUnits,
        ) => "encounter.encounter-care-site",
        (
            R::DocumentReference
            | R::Condition
            | R::Procedure
            | R::Claim
            | R::MedicationRequest
            | R::MedicationAdministration
            | R::Observation
            | R::ImagingStudy
            | R::QuestionnaireResponse,
            P::EncounterStatus,
        ) => "encounter.status",

        _ => return None,
    };
    Some(name)
}

/// Field a wire key designates for a resource type
pub fn param_for_key(resource: ResourceType, key: &str) -> Option<FilterParam> {
    FilterParam::ALL
        .into_iter()
        .find(|param| param_name(resource, *param) == Some(key))
}

/// Fragments every filter of a resource type starts with
pub const fn base_filter(resource: ResourceType) -> &'static str {
    match resource {
        ResourceType::Patient => "active=true",
        ResourceType::Claim | ResourceType::ImagingStudy => "patient.active=true",
        ResourceType::DocumentReference => "type:not=doc-impor&contenttype=text/plain&subject.active=true",
        ResourceType::Observation => "subject.active=true&status=Val",
        ResourceType::IppList => "",
        ResourceType::Encounter
        | ResourceType::Condition
        | ResourceType::Procedure
        | ResourceType::MedicationRequest
        | ResourceType::MedicationAdministration
        | ResourceType::QuestionnaireResponse => "subject.active=true",
    }
}

/// Whether a key belongs to the fixed fragments of a resource type
pub fn is_base_key(resource: ResourceType, key: &str) -> bool {
    base_filter(resource)
        .split('&')
        .filter_map(|f| f.split_once('='))
        .any(|(k, _)| k == key)
}
