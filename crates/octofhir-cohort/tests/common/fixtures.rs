//! Request fixtures
//!
//! Values are chosen to survive a build/unbuild cycle unchanged: labels are
//! left empty, durations are exact in days, units exist in the catalog.
//! Deidentified variants use durations exact in months.

use chrono::NaiveDate;
use octofhir_cohort::CohortRequest;
use octofhir_cohort::model::InMemoryCatalog;
use octofhir_cohort::types::{
    AnswerValue, AttachmentMethod, CalendarDuration, Comparator, ConstraintTarget, ConstraintType,
    CriteriaGroup, CriteriaType, DateRange, DocumentAttachment, DocumentStatus, DurationRange,
    GroupKind, LabelObject, NAmongMOptions, NumericFilter, ObservationValue, Occurrence, OrgUnitRef,
    PSEUDONYMISED_ACCESS, PopulationRef, SearchBy, SelectedCriterion, TemporalConstraint,
    ValueComparator,
};
use rust_decimal::Decimal;

pub fn date(y: i32, m: u32, d: u32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(y, m, d)
}

pub fn unit() -> OrgUnitRef {
    OrgUnitRef::new("8312", "Hôpital X")
}

/// Catalog knowing the fixture population and unit
pub fn catalog() -> InMemoryCatalog {
    let catalog = InMemoryCatalog::new();
    catalog.add_population(PopulationRef::new("1", "10"));
    catalog.add_population(PopulationRef::new("2", "20").with_access(PSEUDONYMISED_ACCESS));
    catalog.add_org_unit(unit());
    catalog
}

pub fn patient(id: i64) -> SelectedCriterion {
    let mut criterion = SelectedCriterion::empty(CriteriaType::Patient, id).with_title("Femmes adultes");
    if let SelectedCriterion::Patient(c) = &mut criterion {
        c.genders = vec![LabelObject::unlabelled("f")];
        c.age = DurationRange::new(Some(CalendarDuration::new(18, 0, 0)), None);
    }
    criterion
}

pub fn encounter(id: i64) -> SelectedCriterion {
    let mut criterion = SelectedCriterion::empty(CriteriaType::Encounter, id);
    if let SelectedCriterion::Encounter(c) = &mut criterion {
        c.care_type = vec![LabelObject::unlabelled("hospitalisés")];
        c.duration = DurationRange::new(Some(CalendarDuration::from_days(3)), None);
        c.advanced.encounter_service = vec![unit()];
    }
    criterion
}

pub fn condition(id: i64) -> SelectedCriterion {
    let mut criterion = SelectedCriterion::empty(CriteriaType::Condition, id).with_title("Diabète");
    if let SelectedCriterion::Condition(c) = &mut criterion {
        c.code = vec![LabelObject::unlabelled("E10"), LabelObject::unlabelled("E11")];
        c.diagnostic_type = vec![LabelObject::unlabelled("dp")];
        c.advanced.occurrence = Some(Occurrence::new(2, Comparator::GreaterOrEqual));
        c.advanced.start_occurrence = date(2020, 1, 1);
        c.advanced.end_occurrence = date(2020, 12, 31);
    }
    criterion
}

pub fn documents(id: i64) -> SelectedCriterion {
    let mut criterion = SelectedCriterion::empty(CriteriaType::Documents, id).excluding();
    if let SelectedCriterion::Documents(c) = &mut criterion {
        c.search = "insuffisance cardiaque".into();
        c.search_by = SearchBy::Text;
        c.doc_statuses = vec![DocumentStatus::Validated];
        c.doc_types = vec![LabelObject::unlabelled("crh")];
    }
    criterion
}

pub fn ipp_list(id: i64) -> SelectedCriterion {
    let mut criterion = SelectedCriterion::empty(CriteriaType::IppList, id);
    if let SelectedCriterion::IppList(c) = &mut criterion {
        c.search = "8000001,8000002".into();
    }
    criterion
}

/// Patient ages in whole years, exact in months and in days
pub fn patient_aged(id: i64) -> SelectedCriterion {
    let mut criterion = SelectedCriterion::empty(CriteriaType::Patient, id);
    if let SelectedCriterion::Patient(c) = &mut criterion {
        c.vital_status = vec![LabelObject::unlabelled("alive")];
        c.age = DurationRange::new(Some(CalendarDuration::new(18, 0, 0)), Some(CalendarDuration::new(65, 0, 0)));
    }
    criterion
}

/// Visit ages exact in months, length in days
pub fn encounter_aged(id: i64) -> SelectedCriterion {
    let mut criterion = SelectedCriterion::empty(CriteriaType::Encounter, id).with_title("Séjours pédiatriques");
    if let SelectedCriterion::Encounter(c) = &mut criterion {
        c.admission_mode = vec![LabelObject::unlabelled("urgence")];
        c.age = DurationRange::new(Some(CalendarDuration::new(1, 6, 0)), Some(CalendarDuration::new(2, 0, 0)));
        c.duration = DurationRange::new(Some(CalendarDuration::from_days(2)), Some(CalendarDuration::from_days(40)));
        c.advanced.encounter_start_date = date(2021, 3, 1);
        c.advanced.encounter_end_date = date(2021, 9, 30);
    }
    criterion
}

pub fn procedure(id: i64) -> SelectedCriterion {
    let mut criterion = SelectedCriterion::empty(CriteriaType::Procedure, id).with_title("Chirurgie");
    if let SelectedCriterion::Procedure(c) = &mut criterion {
        c.code = vec![LabelObject::unlabelled("HHFA016")];
        c.source = Some("AREM".into());
        c.advanced.encounter_service = vec![unit()];
        c.advanced.start_occurrence = date(2019, 6, 1);
    }
    criterion
}

pub fn claim(id: i64) -> SelectedCriterion {
    let mut criterion = SelectedCriterion::empty(CriteriaType::Claim, id);
    if let SelectedCriterion::Claim(c) = &mut criterion {
        c.code = vec![LabelObject::unlabelled("05M09"), LabelObject::unlabelled("05M10")];
        c.advanced.occurrence = Some(Occurrence::new(1, Comparator::Greater));
        c.advanced.encounter_status = vec![LabelObject::unlabelled("finished")];
    }
    criterion
}

pub fn medication_request(id: i64) -> SelectedCriterion {
    let mut criterion = SelectedCriterion::empty(CriteriaType::MedicationRequest, id);
    if let SelectedCriterion::MedicationRequest(c) = &mut criterion {
        c.code = vec![
            LabelObject::unlabelled("A10BA02"),
            LabelObject::unlabelled("X42").with_system("https://other"),
        ];
        c.prescription_type = vec![LabelObject::unlabelled("1")];
        c.administration = vec![LabelObject::unlabelled("26")];
        c.advanced.encounter_service = vec![unit()];
    }
    criterion
}

pub fn medication_administration(id: i64) -> SelectedCriterion {
    let mut criterion = SelectedCriterion::empty(CriteriaType::MedicationAdministration, id).excluding();
    if let SelectedCriterion::MedicationAdministration(c) = &mut criterion {
        c.code = vec![LabelObject::unlabelled("B01AC06")];
        c.administration = vec![LabelObject::unlabelled("20")];
        c.advanced.start_occurrence = date(2022, 1, 1);
        c.advanced.end_occurrence = date(2022, 6, 30);
    }
    criterion
}

/// Single leaf code compared with one threshold
pub fn observation_below(id: i64) -> SelectedCriterion {
    let mut criterion = SelectedCriterion::empty(CriteriaType::Observation, id).with_title("Hémoglobine basse");
    if let SelectedCriterion::Observation(c) = &mut criterion {
        c.code = vec![LabelObject::unlabelled("A0163")];
        c.is_leaf = true;
        c.value = ObservationValue {
            comparator: ValueComparator::Less,
            min: Some(Decimal::new(45, 1)),
            max: None,
        };
    }
    criterion
}

pub fn observation_between(id: i64) -> SelectedCriterion {
    let mut criterion = SelectedCriterion::empty(CriteriaType::Observation, id);
    if let SelectedCriterion::Observation(c) = &mut criterion {
        c.code = vec![LabelObject::unlabelled("A0163")];
        c.is_leaf = true;
        c.value = ObservationValue {
            comparator: ValueComparator::Between,
            min: Some(Decimal::new(1, 0)),
            max: Some(Decimal::new(3, 0)),
        };
        c.advanced.encounter_service = vec![unit()];
    }
    criterion
}

pub fn imaging(id: i64) -> SelectedCriterion {
    let mut criterion = SelectedCriterion::empty(CriteriaType::Imaging, id).with_title("IRM");
    if let SelectedCriterion::Imaging(c) = &mut criterion {
        c.study_dates = DateRange::new(date(2020, 1, 1), date(2020, 12, 31));
        c.study_modalities = vec![LabelObject::unlabelled("MR"), LabelObject::unlabelled("CT")];
        c.study_description = "IRM cerebrale".into();
        c.study_procedure = "angio".into();
        c.number_of_series = Occurrence::new(2, Comparator::Greater);
        c.number_of_instances = Occurrence::new(100, Comparator::LessOrEqual);
        c.with_document = DocumentAttachment {
            method: AttachmentMethod::InferenceTemporel,
            days_of_delay: Some(3),
        };
        c.study_uid = "1.2.250.1.59".into();
        c.series_dates = DateRange::new(date(2020, 2, 1), None);
        c.series_description = "T1 gado".into();
        c.series_protocol = "flair".into();
        c.series_modalities = vec![LabelObject::unlabelled("MR")];
        c.series_uid = "1.2.250.1.59.7".into();
        c.advanced.start_occurrence = date(2020, 1, 1);
    }
    criterion
}

pub fn pregnancy(id: i64) -> SelectedCriterion {
    let mut criterion = SelectedCriterion::empty(CriteriaType::Pregnancy, id);
    if let SelectedCriterion::Pregnancy(c) = &mut criterion {
        let answers = [
            ("pregnancyStartDate", AnswerValue::Date(NaiveDate::from_ymd_opt(2023, 1, 1).unwrap())),
            ("pregnancyEndDate", AnswerValue::Date(NaiveDate::from_ymd_opt(2023, 6, 30).unwrap())),
            ("pregnancyMode", AnswerValue::Labels(vec![LabelObject::unlabelled("spontanee")])),
            ("foetus", AnswerValue::Number(NumericFilter::new(2, Comparator::GreaterOrEqual))),
            ("maternalRisksPrecision", AnswerValue::Text("diabete gestationnel".into())),
        ];
        c.answers
            .extend(answers.into_iter().map(|(name, answer)| (name.to_string(), answer)));
        c.advanced.encounter_service = vec![unit()];
    }
    criterion
}

pub fn hospit(id: i64) -> SelectedCriterion {
    let mut criterion = SelectedCriterion::empty(CriteriaType::Hospit, id).with_title("Accouchement");
    if let SelectedCriterion::Hospit(c) = &mut criterion {
        let answers = [
            ("hospitReason", AnswerValue::Text("rupture poche".into())),
            ("childbirthMode", AnswerValue::Labels(vec![LabelObject::unlabelled("VB")])),
            ("birthDeliveryStartDate", AnswerValue::Date(NaiveDate::from_ymd_opt(2022, 5, 1).unwrap())),
            ("birthDeliveryEndDate", AnswerValue::Date(NaiveDate::from_ymd_opt(2022, 5, 31).unwrap())),
            ("birthDeliveryWeeks", AnswerValue::Number(NumericFilter::new(37, Comparator::Less))),
            ("apgar5", AnswerValue::Number(NumericFilter::new(7, Comparator::LessOrEqual))),
        ];
        c.answers
            .extend(answers.into_iter().map(|(name, answer)| (name.to_string(), answer)));
    }
    criterion
}

/// Request holding one criterion under the root group
///
/// The deidentified variant draws from the pseudonymised population.
pub fn single_criterion_request(criterion: SelectedCriterion, deidentified: bool) -> CohortRequest {
    let population = if deidentified {
        PopulationRef::new("2", "20").with_access(PSEUDONYMISED_ACCESS)
    } else {
        PopulationRef::new("1", "10")
    };
    let id = criterion.id();
    CohortRequest::new(vec![Some(population)])
        .with_criterion(criterion)
        .with_group(CriteriaGroup::root().with_children([id]))
}

/// Root `and` group holding a patient criterion and a nested `2 among` group
///
/// ```text
/// 0 (and): 1, -1
/// -1 (nAmongM >= 2): 2, 3, 4
/// ```
pub fn sample_request() -> CohortRequest {
    CohortRequest::new(vec![Some(PopulationRef::new("1", "10"))])
        .with_criterion(patient(1))
        .with_criterion(encounter(2))
        .with_criterion(condition(3))
        .with_criterion(documents(4))
        .with_group(CriteriaGroup::root().with_children([1, -1]))
        .with_group(
            CriteriaGroup::new(
                -1,
                GroupKind::NAmongM {
                    options: NAmongMOptions::new(2, Comparator::GreaterOrEqual),
                },
            )
            .with_children([2, 3, 4]),
        )
        .with_constraint(TemporalConstraint::new(
            [ConstraintTarget::Id(2), ConstraintTarget::Id(3)],
            ConstraintType::SameEncounter,
        ))
}

pub fn sample_range() -> DateRange {
    DateRange::new(date(1950, 1, 1), date(1960, 12, 31))
}
