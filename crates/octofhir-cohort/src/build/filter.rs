//! Per-resource `filterFhir` assembly
//!
//! Every wire key is looked up through [`param_name`]; a field the table does
//! not know for the resource type is silently left out.

use chrono::NaiveDate;
use octofhir_cohort_filter::{
    BIOLOGY_HIERARCHY_ITM_ANABIO, CLAIM_HIERARCHY, CONDITION_HIERARCHY, DOC_STATUS_CODE_SYSTEM,
    Direction, DurationUnit, FilterBuilder, FilterParam, IMAGING_STUDY_UID_URL, MEDICATION_ATC,
    PROCEDURE_HIERARCHY, base_filter, build_answer, build_comparator_filter, build_date_filter,
    build_date_range_filter, build_duration_filter, build_duration_range_filter, build_label_filter,
    build_service_filter, build_value_filter, build_with_document, encode_search, form_fields,
    param_name,
};
use octofhir_cohort_types::{
    CalendarDuration, ClaimCriterion, ConditionCriterion, DateRange, DocumentsCriterion,
    DurationRange, EncounterCriterion, FormName, ImagingCriterion, IppListCriterion, LabelObject,
    MedicationCriterion, ObservationCriterion, Occurrence, OrgUnitRef, PatientCriterion,
    ProcedureCriterion, QuestionnaireCriterion, ResourceType, SearchBy, SelectedCriterion,
};

const QUESTIONNAIRE_STATUSES: &str = "in-progress,completed";

/// Filter string of one criterion
pub fn filter_fhir(criterion: &SelectedCriterion, deidentified: bool) -> String {
    match criterion {
        SelectedCriterion::Patient(c) => patient_filter(c, deidentified),
        SelectedCriterion::Encounter(c) => encounter_filter(c, deidentified),
        SelectedCriterion::Documents(c) => documents_filter(c),
        SelectedCriterion::Condition(c) => condition_filter(c),
        SelectedCriterion::Procedure(c) => procedure_filter(c),
        SelectedCriterion::Claim(c) => claim_filter(c),
        SelectedCriterion::MedicationRequest(c) => medication_filter(c, ResourceType::MedicationRequest),
        SelectedCriterion::MedicationAdministration(c) => {
            medication_filter(c, ResourceType::MedicationAdministration)
        }
        SelectedCriterion::Observation(c) => observation_filter(c),
        SelectedCriterion::Imaging(c) => imaging_filter(c),
        SelectedCriterion::IppList(c) => ipp_filter(c),
        SelectedCriterion::Pregnancy(c) => questionnaire_filter(c, FormName::Pregnancy),
        SelectedCriterion::Hospit(c) => questionnaire_filter(c, FormName::Hospit),
    }
}

/// [`FilterBuilder`] bound to one resource type
struct FilterWriter {
    resource: ResourceType,
    builder: FilterBuilder,
}

impl FilterWriter {
    fn new(resource: ResourceType) -> Self {
        let mut builder = FilterBuilder::new();
        builder.push_raw(base_filter(resource));
        Self { resource, builder }
    }

    fn key(&self, param: FilterParam) -> Option<&'static str> {
        param_name(self.resource, param)
    }

    fn value(&mut self, param: FilterParam, value: Option<String>) -> &mut Self {
        if let Some(key) = self.key(param) {
            self.builder.push(key, value);
        }
        self
    }

    fn labels(&mut self, param: FilterParam, list: &[LabelObject], system: Option<&str>) -> &mut Self {
        self.value(param, build_label_filter(list, system, false))
    }

    fn search(&mut self, param: FilterParam, text: &str) -> &mut Self {
        self.value(param, encode_search(text))
    }

    fn date(&mut self, param: FilterParam, date: Option<NaiveDate>, direction: Direction) -> &mut Self {
        if let Some(key) = self.key(param) {
            self.builder.push_raw(build_date_filter(key, date, direction, true));
        }
        self
    }

    fn dates(&mut self, param: FilterParam, range: &DateRange) -> &mut Self {
        if let Some(key) = self.key(param) {
            self.builder.push_raw(build_date_range_filter(key, range, true));
        }
        self
    }

    fn duration(
        &mut self,
        param: FilterParam,
        value: Option<&CalendarDuration>,
        direction: Direction,
        unit: DurationUnit,
    ) -> &mut Self {
        if let Some(key) = self.key(param) {
            self.builder.push_raw(build_duration_filter(key, value, direction, unit));
        }
        self
    }

    fn durations(&mut self, param: FilterParam, range: &DurationRange, unit: DurationUnit) -> &mut Self {
        if let Some(key) = self.key(param) {
            self.builder.push_raw(build_duration_range_filter(key, range, unit));
        }
        self
    }

    fn count(&mut self, param: FilterParam, occurrence: &Occurrence) -> &mut Self {
        self.value(param, Some(build_comparator_filter(occurrence.value, occurrence.comparator)))
    }

    fn services(&mut self, units: &[OrgUnitRef]) -> &mut Self {
        self.value(FilterParam::ExecutiveUnits, build_service_filter(units))
    }

    fn encounter_status(&mut self, statuses: &[LabelObject]) -> &mut Self {
        self.labels(FilterParam::EncounterStatus, statuses, None)
    }

    fn raw(&mut self, fragment: Option<String>) -> &mut Self {
        if let Some(fragment) = fragment {
            self.builder.push_raw(fragment);
        }
        self
    }

    fn finish(self) -> String {
        self.builder.finish()
    }
}

fn patient_filter(c: &PatientCriterion, deidentified: bool) -> String {
    let mut w = FilterWriter::new(ResourceType::Patient);
    w.labels(FilterParam::Gender, &c.genders, None)
        .labels(FilterParam::VitalStatus, &c.vital_status, None)
        .date(FilterParam::Birthdate, c.birthdates.end, Direction::Le)
        .date(FilterParam::Birthdate, c.birthdates.start, Direction::Ge)
        .date(FilterParam::DeathDate, c.death_dates.start, Direction::Ge)
        .date(FilterParam::DeathDate, c.death_dates.end, Direction::Le);

    // a birthdate bound already pins the age
    if c.birthdates.is_empty() {
        let param = if deidentified { FilterParam::AgeMonth } else { FilterParam::AgeDay };
        w.durations(param, &c.age, DurationUnit::for_population(deidentified));
    }
    w.finish()
}

fn encounter_filter(c: &EncounterCriterion, deidentified: bool) -> String {
    let (start_age, end_age) = if deidentified {
        (FilterParam::VisitStartAgeMonth, FilterParam::VisitEndAgeMonth)
    } else {
        (FilterParam::VisitStartAgeDay, FilterParam::VisitEndAgeDay)
    };
    let unit = DurationUnit::for_population(deidentified);

    let mut w = FilterWriter::new(ResourceType::Encounter);
    w.labels(FilterParam::AdmissionMode, &c.admission_mode, None)
        .labels(FilterParam::EntryMode, &c.entry_mode, None)
        .labels(FilterParam::ExitMode, &c.exit_mode, None)
        .labels(FilterParam::CareType, &c.care_type, None)
        .labels(FilterParam::StayType, &c.stay_type, None)
        .labels(FilterParam::Destination, &c.destination, None)
        .labels(FilterParam::Provenance, &c.provenance, None)
        .labels(FilterParam::Admission, &c.admission, None)
        .labels(FilterParam::Reason, &c.reason, None)
        .services(&c.advanced.encounter_service)
        .encounter_status(&c.advanced.encounter_status)
        .durations(FilterParam::Length, &c.duration, DurationUnit::Days)
        .duration(start_age, c.age.start.as_ref(), Direction::Ge, unit)
        .duration(end_age, c.age.end.as_ref(), Direction::Le, unit);
    w.finish()
}

fn documents_filter(c: &DocumentsCriterion) -> String {
    let search_param = match c.search_by {
        SearchBy::Text => FilterParam::Text,
        SearchBy::Description => FilterParam::Title,
    };
    let statuses = (!c.doc_statuses.is_empty()).then(|| {
        c.doc_statuses
            .iter()
            .map(|status| format!("{}|{}", DOC_STATUS_CODE_SYSTEM, status.code()))
            .collect::<Vec<_>>()
            .join(",")
    });

    let mut w = FilterWriter::new(ResourceType::DocumentReference);
    w.services(&c.advanced.encounter_service)
        .search(search_param, &c.search)
        .value(FilterParam::DocStatus, statuses)
        .labels(FilterParam::DocType, &c.doc_types, None)
        .encounter_status(&c.advanced.encounter_status);
    w.finish()
}

fn condition_filter(c: &ConditionCriterion) -> String {
    let mut w = FilterWriter::new(ResourceType::Condition);
    w.labels(FilterParam::Code, &c.code, Some(CONDITION_HIERARCHY))
        .labels(FilterParam::DiagnosticType, &c.diagnostic_type, None)
        .value(FilterParam::Source, c.source.clone())
        .services(&c.advanced.encounter_service)
        .encounter_status(&c.advanced.encounter_status);
    w.finish()
}

fn procedure_filter(c: &ProcedureCriterion) -> String {
    let mut w = FilterWriter::new(ResourceType::Procedure);
    w.labels(FilterParam::Code, &c.code, Some(PROCEDURE_HIERARCHY))
        .services(&c.advanced.encounter_service)
        .encounter_status(&c.advanced.encounter_status)
        .value(FilterParam::Source, c.source.clone());
    w.finish()
}

fn claim_filter(c: &ClaimCriterion) -> String {
    let mut w = FilterWriter::new(ResourceType::Claim);
    w.labels(FilterParam::Code, &c.code, Some(CLAIM_HIERARCHY))
        .services(&c.advanced.encounter_service)
        .encounter_status(&c.advanced.encounter_status);
    w.finish()
}

fn medication_filter(c: &MedicationCriterion, resource: ResourceType) -> String {
    let mut w = FilterWriter::new(resource);
    w.labels(FilterParam::AdministrationRoute, &c.administration, None)
        .services(&c.advanced.encounter_service)
        .value(FilterParam::Code, build_label_filter(&c.code, Some(MEDICATION_ATC), true))
        .encounter_status(&c.advanced.encounter_status);
    if resource == ResourceType::MedicationRequest {
        w.labels(FilterParam::PrescriptionType, &c.prescription_type, None);
    }
    w.finish()
}

fn observation_filter(c: &ObservationCriterion) -> String {
    let mut w = FilterWriter::new(ResourceType::Observation);
    w.labels(FilterParam::Code, &c.code, Some(BIOLOGY_HIERARCHY_ITM_ANABIO))
        .services(&c.advanced.encounter_service)
        .encounter_status(&c.advanced.encounter_status);
    let value = w
        .key(FilterParam::ObservationValue)
        .and_then(|key| build_value_filter(key, &c.value, c.is_leaf));
    w.raw(value);
    w.finish()
}

fn ipp_filter(c: &IppListCriterion) -> String {
    let mut w = FilterWriter::new(ResourceType::IppList);
    w.value(FilterParam::IppList, Some(c.search.clone()));
    w.finish()
}

fn imaging_filter(c: &ImagingCriterion) -> String {
    let study_uid = (!c.study_uid.is_empty()).then(|| format!("{}|{}", IMAGING_STUDY_UID_URL, c.study_uid));

    let mut w = FilterWriter::new(ResourceType::ImagingStudy);
    w.dates(FilterParam::StudyDate, &c.study_dates)
        .dates(FilterParam::SeriesDate, &c.series_dates)
        .search(FilterParam::StudyDescription, &c.study_description)
        .search(FilterParam::StudyProcedure, &c.study_procedure)
        .search(FilterParam::SeriesDescription, &c.series_description)
        .search(FilterParam::SeriesProtocol, &c.series_protocol)
        .labels(FilterParam::StudyModalities, &c.study_modalities, None)
        .labels(FilterParam::SeriesModalities, &c.series_modalities, None)
        .services(&c.advanced.encounter_service)
        .count(FilterParam::NumberOfSeries, &c.number_of_series)
        .count(FilterParam::NumberOfInstances, &c.number_of_instances)
        .encounter_status(&c.advanced.encounter_status)
        .value(FilterParam::WithDocument, build_with_document(&c.with_document))
        .value(FilterParam::StudyUid, study_uid)
        .value(FilterParam::SeriesUid, Some(c.series_uid.clone()));
    w.finish()
}

fn questionnaire_filter(c: &QuestionnaireCriterion, form: FormName) -> String {
    let mut w = FilterWriter::new(ResourceType::QuestionnaireResponse);
    w.value(FilterParam::QuestionnaireName, Some(form.as_str().to_string()))
        .value(FilterParam::QuestionnaireStatus, Some(QUESTIONNAIRE_STATUSES.to_string()))
        .encounter_status(&c.advanced.encounter_status);
    for field in form_fields(form) {
        let answer = c.answers.get(field.name).and_then(|answer| build_answer(field, answer));
        w.raw(answer);
    }
    w.services(&c.advanced.encounter_service);
    w.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use octofhir_cohort_types::{
        AnswerValue, Comparator, CriteriaType, DocumentStatus, NumericFilter, ObservationValue,
        ValueComparator,
    };
    use pretty_assertions::assert_eq;
    use rust_decimal::Decimal;

    fn date(y: i32, m: u32, d: u32) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(y, m, d)
    }

    #[test]
    fn test_patient_birthdate_suppresses_age() {
        let mut criterion = SelectedCriterion::empty(CriteriaType::Patient, 1);
        if let SelectedCriterion::Patient(c) = &mut criterion {
            c.genders = vec![LabelObject::unlabelled("f")];
            c.age = DurationRange::new(Some(CalendarDuration::new(18, 0, 0)), None);
        }
        assert_eq!(filter_fhir(&criterion, false), "active=true&gender=f&age-day=ge6570");
        assert_eq!(filter_fhir(&criterion, true), "active=true&gender=f&age-month=ge216");

        if let SelectedCriterion::Patient(c) = &mut criterion {
            c.birthdates = DateRange::new(date(1950, 1, 1), date(1960, 12, 31));
        }
        assert_eq!(
            filter_fhir(&criterion, false),
            "active=true&gender=f&birthdate=le1960-12-31T00:00:00Z&birthdate=ge1950-01-01T00:00:00Z"
        );
    }

    #[test]
    fn test_encounter_ages_follow_population() {
        let mut criterion = SelectedCriterion::empty(CriteriaType::Encounter, 2);
        if let SelectedCriterion::Encounter(c) = &mut criterion {
            c.age = DurationRange::new(Some(CalendarDuration::new(1, 0, 0)), Some(CalendarDuration::new(2, 0, 0)));
            c.duration = DurationRange::new(Some(CalendarDuration::from_days(3)), None);
        }
        assert_eq!(
            filter_fhir(&criterion, false),
            "subject.active=true&length=ge3&start-age-visit=ge365&end-age-visit=le730"
        );
        assert_eq!(
            filter_fhir(&criterion, true),
            "subject.active=true&length=ge3&start-age-visit-month=ge12&end-age-visit-month=le24"
        );
    }

    #[test]
    fn test_documents_filter() {
        let mut criterion = SelectedCriterion::empty(CriteriaType::Documents, 3);
        if let SelectedCriterion::Documents(c) = &mut criterion {
            c.search = "insuffisance cardiaque".into();
            c.search_by = SearchBy::Description;
            c.doc_statuses = vec![DocumentStatus::Validated];
            c.doc_types = vec![LabelObject::unlabelled("crh")];
        }
        assert_eq!(
            filter_fhir(&criterion, false),
            "type:not=doc-impor&contenttype=text/plain&subject.active=true&description=insuffisance+cardiaque\
             &docstatus=http://hl7.org/fhir/CodeSystem/composition-status|final&type=crh"
        );
    }

    #[test]
    fn test_medication_systems_and_category() {
        let mut request = SelectedCriterion::empty(CriteriaType::MedicationRequest, 4);
        let mut administration = SelectedCriterion::empty(CriteriaType::MedicationAdministration, 5);
        for criterion in [&mut request, &mut administration] {
            if let SelectedCriterion::MedicationRequest(c) | SelectedCriterion::MedicationAdministration(c) = criterion {
                c.code = vec![
                    LabelObject::unlabelled("A01"),
                    LabelObject::unlabelled("X42").with_system("https://other"),
                ];
                c.prescription_type = vec![LabelObject::unlabelled("1")];
                c.advanced.encounter_service = vec![OrgUnitRef::unresolved("8312")];
            }
        }
        assert_eq!(
            filter_fhir(&request, false),
            "subject.active=true&encounter.encounter-care-site=8312\
             &medication=https://terminology.eds.aphp.fr/atc|A01,https://other|X42&category=1"
        );
        assert_eq!(
            filter_fhir(&administration, false),
            "subject.active=true&context.encounter-care-site=8312\
             &medication=https://terminology.eds.aphp.fr/atc|A01,https://other|X42"
        );
    }

    #[test]
    fn test_observation_value_needs_leaf() {
        let mut criterion = SelectedCriterion::empty(CriteriaType::Observation, 6);
        if let SelectedCriterion::Observation(c) = &mut criterion {
            c.code = vec![LabelObject::unlabelled("A0001")];
            c.value = ObservationValue {
                comparator: ValueComparator::GreaterOrEqual,
                min: Some(Decimal::new(55, 1)),
                max: None,
            };
        }
        let base = "subject.active=true&status=Val&code=https://terminology.eds.aphp.fr/aphp-itm-anabio|A0001";
        assert_eq!(filter_fhir(&criterion, false), base);

        if let SelectedCriterion::Observation(c) = &mut criterion {
            c.is_leaf = true;
        }
        assert_eq!(filter_fhir(&criterion, false), format!("{base}&value-quantity=ge5.5"));
    }

    #[test]
    fn test_imaging_counts_are_always_written() {
        let mut criterion = SelectedCriterion::empty(CriteriaType::Imaging, 7);
        if let SelectedCriterion::Imaging(c) = &mut criterion {
            c.study_uid = "1.2.3".into();
            c.number_of_instances = Occurrence::new(10, Comparator::Less);
        }
        assert_eq!(
            filter_fhir(&criterion, false),
            "patient.active=true&numberOfSeries=ge1&numberOfInstances=lt10&identifier=urn:dicom:uid|1.2.3"
        );
    }

    #[test]
    fn test_ipp_list_has_no_prefix() {
        let mut criterion = SelectedCriterion::empty(CriteriaType::IppList, 8);
        if let SelectedCriterion::IppList(c) = &mut criterion {
            c.search = "8000001,8000002".into();
        }
        assert_eq!(filter_fhir(&criterion, true), "identifier.value=8000001,8000002");
    }

    #[test]
    fn test_questionnaire_answers_follow_form_order() {
        let mut criterion = SelectedCriterion::empty(CriteriaType::Pregnancy, 9);
        if let SelectedCriterion::Pregnancy(c) = &mut criterion {
            c.answers.insert("foetus".into(), AnswerValue::Number(NumericFilter::new(2, Comparator::Equal)));
            c.answers.insert(
                "pregnancyStartDate".into(),
                AnswerValue::Date(NaiveDate::from_ymd_opt(2023, 1, 1).unwrap()),
            );
        }
        assert_eq!(
            filter_fhir(&criterion, false),
            "subject.active=true&questionnaire.name=APHPEDSQuestionnaireFicheGrossesse\
             &status=in-progress,completed&F_MATER_001=ge2023-01-01&F_MATER_003=eq2"
        );
    }
}
