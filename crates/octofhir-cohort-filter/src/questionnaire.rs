//! Questionnaire form tables
//!
//! Answers are filtered as `<linkId>=<value>`. A date question uses one link
//! id for both bounds, told apart by the `ge`/`le` prefix.
//!
//! The link ids below are placeholders following the `F_MATER_*` naming.
//! They are not the production form definitions and must be replaced by
//! the deployed questionnaires' link ids.

use crate::comparator::{build_comparator_filter, parse_numeric_filter};
use crate::date::{Direction, build_date_filter, parse_date_filter};
use crate::error::{FilterError, FilterResult};
use crate::fragment::FilterFragment;
use crate::label::{build_label_filter, decode_label_codes};
use crate::params::{FilterParam, param_name};
use crate::search::{decode_search, encode_search};
use octofhir_cohort_types::{AnswerValue, FormName, ResourceType};

/// Shape of the answer a field accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AnswerKind {
    Labels,
    Text,
    Number,
    StartDate,
    EndDate,
}

/// One queryable question of a form
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormField {
    /// Key of the answer in [`octofhir_cohort_types::QuestionnaireCriterion::answers`]
    pub name: &'static str,
    pub link_id: &'static str,
    pub kind: AnswerKind,
}

const fn field(name: &'static str, link_id: &'static str, kind: AnswerKind) -> FormField {
    FormField { name, link_id, kind }
}

use AnswerKind::{EndDate, Labels, Number, StartDate, Text};

pub const PREGNANCY_FIELDS: &[FormField] = &[
    field("pregnancyStartDate", "F_MATER_001", StartDate),
    field("pregnancyEndDate", "F_MATER_001", EndDate),
    field("pregnancyMode", "F_MATER_002", Labels),
    field("foetus", "F_MATER_003", Number),
    field("parity", "F_MATER_004", Number),
    field("maternalRisks", "F_MATER_005", Labels),
    field("maternalRisksPrecision", "F_MATER_006", Text),
    field("risksRelatedToObstetricHistory", "F_MATER_007", Labels),
    field("risksRelatedToObstetricHistoryPrecision", "F_MATER_008", Text),
    field("risksOrComplicationsOfPregnancy", "F_MATER_009", Labels),
    field("risksOrComplicationsOfPregnancyPrecision", "F_MATER_010", Text),
    field("corticotherapie", "F_MATER_011", Labels),
    field("prenatalDiagnosis", "F_MATER_012", Labels),
    field("ultrasoundMonitoring", "F_MATER_013", Labels),
];

pub const HOSPIT_FIELDS: &[FormField] = &[
    field("hospitReason", "F_MATER_101", Text),
    field("inUteroTransfer", "F_MATER_102", Labels),
    field("pregnancyMonitoring", "F_MATER_103", Labels),
    field("vme", "F_MATER_104", Labels),
    field("maturationCorticotherapie", "F_MATER_105", Labels),
    field("chirurgicalGesture", "F_MATER_106", Labels),
    field("childbirth", "F_MATER_107", Labels),
    field("hospitalChildBirthPlace", "F_MATER_108", Labels),
    field("otherHospitalChildBirthPlace", "F_MATER_109", Labels),
    field("homeChildBirthPlace", "F_MATER_110", Labels),
    field("childbirthMode", "F_MATER_111", Labels),
    field("maturationReason", "F_MATER_112", Labels),
    field("maturationModality", "F_MATER_113", Labels),
    field("imgIndication", "F_MATER_114", Labels),
    field("laborOrCesareanEntry", "F_MATER_115", Labels),
    field("pathologyDuringLabor", "F_MATER_116", Labels),
    field("obstetricalGestureDuringLabor", "F_MATER_117", Labels),
    field("analgesieType", "F_MATER_118", Labels),
    field("birthDeliveryStartDate", "F_MATER_119", StartDate),
    field("birthDeliveryEndDate", "F_MATER_119", EndDate),
    field("birthDeliveryWeeks", "F_MATER_120", Number),
    field("birthDeliveryDays", "F_MATER_121", Number),
    field("birthDeliveryWay", "F_MATER_122", Labels),
    field("instrumentType", "F_MATER_123", Labels),
    field("cSectionModality", "F_MATER_124", Labels),
    field("presentationAtDelivery", "F_MATER_125", Labels),
    field("birthMensurationsGrams", "F_MATER_126", Number),
    field("birthMensurationsPercentil", "F_MATER_127", Number),
    field("apgar1", "F_MATER_128", Number),
    field("apgar3", "F_MATER_129", Number),
    field("apgar5", "F_MATER_130", Number),
    field("apgar10", "F_MATER_131", Number),
    field("arterialPhCord", "F_MATER_132", Number),
    field("arterialCordLactates", "F_MATER_133", Number),
    field("birthStatus", "F_MATER_134", Labels),
    field("postpartumHemorrhage", "F_MATER_135", Labels),
    field("conditionPerineum", "F_MATER_136", Labels),
    field("exitPlaceType", "F_MATER_137", Labels),
    field("feedingType", "F_MATER_138", Labels),
    field("complication", "F_MATER_139", Labels),
    field("exitFeedingMode", "F_MATER_140", Labels),
    field("exitDiagnostic", "F_MATER_141", Labels),
];

/// Fields of a form, in filter order
pub const fn form_fields(form: FormName) -> &'static [FormField] {
    match form {
        FormName::Pregnancy => PREGNANCY_FIELDS,
        FormName::Hospit => HOSPIT_FIELDS,
    }
}

/// Value of the `questionnaire.name` fragment, if any
pub fn form_marker<'a>(fragments: &[FilterFragment<'a>]) -> Option<&'a str> {
    let key = param_name(ResourceType::QuestionnaireResponse, FilterParam::QuestionnaireName)?;
    fragments.iter().find(|f| f.key == key).map(|f| f.value)
}

/// Encode one answer as `<linkId>=<value>`
///
/// `None` for an empty answer or one whose shape does not fit the field.
pub fn build_answer(field: &FormField, answer: &AnswerValue) -> Option<String> {
    let value = match (field.kind, answer) {
        (AnswerKind::Labels, AnswerValue::Labels(labels)) => build_label_filter(labels, None, false)?,
        (AnswerKind::Text, AnswerValue::Text(text)) => encode_search(text)?,
        (AnswerKind::Number, AnswerValue::Number(number)) => {
            build_comparator_filter(number.value, number.comparator)
        }
        (AnswerKind::StartDate, AnswerValue::Date(date)) => {
            return Some(build_date_filter(field.link_id, Some(*date), Direction::Ge, false));
        }
        (AnswerKind::EndDate, AnswerValue::Date(date)) => {
            return Some(build_date_filter(field.link_id, Some(*date), Direction::Le, false));
        }
        _ => return None,
    };
    Some(format!("{}={}", field.link_id, value))
}

/// Decode one `<linkId>=<value>` fragment into the field it answers
///
/// Label answers come back unlabelled.
pub fn decode_answer(form: FormName, link_id: &str, value: &str) -> FilterResult<(&'static FormField, AnswerValue)> {
    let mut candidates = form_fields(form).iter().filter(|f| f.link_id == link_id).peekable();
    let first = candidates
        .peek()
        .copied()
        .ok_or_else(|| FilterError::UnknownKey(link_id.to_string()))?;

    match first.kind {
        AnswerKind::StartDate | AnswerKind::EndDate => {
            let (direction, date) = parse_date_filter(value)?;
            let wanted = match direction {
                Direction::Ge => AnswerKind::StartDate,
                Direction::Le => AnswerKind::EndDate,
            };
            let field = candidates
                .find(|f| f.kind == wanted)
                .ok_or_else(|| FilterError::Date(value.to_string()))?;
            Ok((field, AnswerValue::Date(date)))
        }
        AnswerKind::Labels => Ok((first, AnswerValue::Labels(decode_label_codes(value, None)))),
        AnswerKind::Text => Ok((first, AnswerValue::Text(decode_search(value)))),
        AnswerKind::Number => Ok((first, AnswerValue::Number(parse_numeric_filter(value)?))),
    }
}
