//! Per-resource criterion decoders
//!
//! Each decoder starts from an empty criterion of the right kind and routes
//! every fragment of `filterFhir` through the parameter table. A fragment that
//! cannot be placed flags the criterion and is reported; the other fields are
//! still decoded.

use super::vocabulary::VocabularyCache;
use chrono::NaiveDate;
use octofhir_cohort_ast::CriterionNode;
use octofhir_cohort_diagnostics::{COH0203, CohortError, Diagnostic, Result};
use octofhir_cohort_filter::{
    BIOLOGY_HIERARCHY_ITM_ANABIO, CLAIM_HIERARCHY, CONDITION_HIERARCHY, DurationUnit, FilterError,
    FilterFragment, FilterParam, FilterResult, MEDICATION_ATC, PROCEDURE_HIERARCHY,
    apply_date_bound, apply_duration_bound, decode_answer, decode_label_codes, decode_search,
    decode_services, form_marker, is_base_key, param_for_key, parse_document_attachment,
    parse_duration_filter, parse_occurrence, parse_value_filter, parse_wire_date, split_filter,
    with_reference_labels,
};
use octofhir_cohort_model::{ResolverSet, VocabularyKind};
use octofhir_cohort_types::{
    AdvancedCriteria, AnswerValue, ClaimCriterion, ConditionCriterion, CriteriaType, DateRange,
    DocumentStatus, DocumentsCriterion, EncounterCriterion, FormName, ImagingCriterion,
    IppListCriterion, LabelObject, MedicationCriterion, ObservationCriterion, Occurrence,
    OrgUnitRef, PatientCriterion, ProcedureCriterion, QuestionnaireCriterion, ResourceType,
    SearchBy, SelectedCriterion, default_title,
};
use tracing::{debug, warn};

use FilterParam as P;
use VocabularyKind as V;

/// Findings of one criterion
struct DecodeContext {
    criterion_id: i64,
    resource: ResourceType,
    error: bool,
    diagnostics: Vec<Diagnostic>,
}

impl DecodeContext {
    fn new(criterion_id: i64, resource: ResourceType) -> Self {
        Self {
            criterion_id,
            resource,
            error: false,
            diagnostics: Vec::new(),
        }
    }

    /// Parameter a fragment sets, `None` for fixed prefix keys and unknown keys
    fn param(&mut self, fragment: &FilterFragment<'_>) -> Option<FilterParam> {
        if is_base_key(self.resource, fragment.key) {
            return None;
        }
        let param = param_for_key(self.resource, fragment.key);
        if param.is_none() {
            self.unknown(fragment);
        }
        param
    }

    fn unknown(&mut self, fragment: &FilterFragment<'_>) {
        self.fail(&fragment.to_string(), FilterError::UnknownKey(fragment.key.to_string()));
    }

    fn fail(&mut self, fragment: &str, err: FilterError) {
        warn!(criterion = self.criterion_id, fragment, error = %err, "criterion may be incomplete");
        self.error = true;
        self.diagnostics
            .push(err.to_diagnostic(fragment).for_criterion(self.criterion_id));
    }

    fn check<T>(&mut self, fragment: &FilterFragment<'_>, result: FilterResult<T>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(err) => {
                self.fail(&fragment.to_string(), err);
                None
            }
        }
    }

    /// Record lookup findings; they never flag the criterion
    fn note(&mut self, diagnostics: Vec<Diagnostic>) {
        let id = self.criterion_id;
        self.diagnostics
            .extend(diagnostics.into_iter().map(|d| d.for_criterion(id)));
    }
}

/// Kind of the criterion a node holds
///
/// Questionnaire responses are told apart by their form marker.
fn criteria_kind(resource: ResourceType, fragments: &[FilterFragment<'_>]) -> Result<CriteriaType> {
    let kind = match resource {
        ResourceType::Patient => CriteriaType::Patient,
        ResourceType::Encounter => CriteriaType::Encounter,
        ResourceType::DocumentReference => CriteriaType::Documents,
        ResourceType::Condition => CriteriaType::Condition,
        ResourceType::Procedure => CriteriaType::Procedure,
        ResourceType::Claim => CriteriaType::Claim,
        ResourceType::MedicationRequest => CriteriaType::MedicationRequest,
        ResourceType::MedicationAdministration => CriteriaType::MedicationAdministration,
        ResourceType::Observation => CriteriaType::Observation,
        ResourceType::ImagingStudy => CriteriaType::Imaging,
        ResourceType::IppList => CriteriaType::IppList,
        ResourceType::QuestionnaireResponse => {
            let marker = form_marker(fragments);
            match marker.and_then(FormName::from_name) {
                Some(FormName::Pregnancy) => CriteriaType::Pregnancy,
                Some(FormName::Hospit) => CriteriaType::Hospit,
                None => return Err(CohortError::unknown_questionnaire(marker.map(str::to_string))),
            }
        }
    };
    Ok(kind)
}

/// Decodes criterion nodes against the resolvers of one unbuild
pub struct CriterionDecoder<'a> {
    resolvers: &'a ResolverSet,
    vocabulary: &'a VocabularyCache,
}

impl<'a> CriterionDecoder<'a> {
    pub fn new(resolvers: &'a ResolverSet, vocabulary: &'a VocabularyCache) -> Self {
        Self { resolvers, vocabulary }
    }

    /// Decode one node, keeping its document id
    ///
    /// Fails only when the node's kind cannot be determined.
    pub async fn decode(&self, node: &CriterionNode) -> Result<(SelectedCriterion, Vec<Diagnostic>)> {
        let resource: ResourceType = node
            .resource_type
            .parse()
            .map_err(|_| CohortError::unknown_resource_type(node.resource_type.as_str()))?;
        let fragments = split_filter(&node.filter_fhir);
        let kind = criteria_kind(resource, &fragments)?;

        let mut criterion = SelectedCriterion::empty(kind, node.id);
        let mut ctx = DecodeContext::new(node.id, resource);
        {
            let header = criterion.header_mut();
            header.is_inclusive = node.is_inclusive;
            header.title = if node.name.is_empty() {
                default_title(kind).to_string()
            } else {
                node.name.clone()
            };
        }
        if let Some(advanced) = criterion.advanced_mut() {
            node_context(advanced, node, &mut ctx);
        }

        match &mut criterion {
            SelectedCriterion::Patient(c) => self.patient(c, &fragments, &mut ctx).await,
            SelectedCriterion::Encounter(c) => self.encounter(c, &fragments, &mut ctx).await,
            SelectedCriterion::Documents(c) => self.documents(c, &fragments, &mut ctx).await,
            SelectedCriterion::Condition(c) => self.condition(c, &fragments, &mut ctx).await,
            SelectedCriterion::Procedure(c) => self.procedure(c, &fragments, &mut ctx).await,
            SelectedCriterion::Claim(c) => self.claim(c, &fragments, &mut ctx).await,
            SelectedCriterion::MedicationRequest(c) | SelectedCriterion::MedicationAdministration(c) => {
                self.medication(c, &fragments, &mut ctx).await
            }
            SelectedCriterion::Observation(c) => self.observation(c, &fragments, &mut ctx).await,
            SelectedCriterion::Imaging(c) => self.imaging(c, &fragments, &mut ctx).await,
            SelectedCriterion::IppList(c) => ipp_list(c, &fragments, &mut ctx),
            SelectedCriterion::Pregnancy(c) => {
                self.questionnaire(c, FormName::Pregnancy, &fragments, &mut ctx).await
            }
            SelectedCriterion::Hospit(c) => self.questionnaire(c, FormName::Hospit, &fragments, &mut ctx).await,
        }

        criterion.header_mut().error = ctx.error;
        debug!(criterion = node.id, kind = ?kind, error = ctx.error, "decoded criterion");
        Ok((criterion, ctx.diagnostics))
    }

    async fn labels(&self, value: &str, system: Option<&str>, kind: VocabularyKind) -> Vec<LabelObject> {
        let codes = decode_label_codes(value, system);
        let reference = self.vocabulary.get(kind).await;
        with_reference_labels(codes, &reference)
    }

    async fn services(&self, value: &str, ctx: &mut DecodeContext) -> Vec<OrgUnitRef> {
        let (units, diagnostics) = decode_services(value, self.resolvers.units.as_ref()).await;
        ctx.note(diagnostics);
        units
    }

    /// Encounter context shared by every resource linked to a visit
    ///
    /// Returns `false` when `param` is not a context parameter.
    async fn context(
        &self,
        advanced: &mut AdvancedCriteria,
        param: FilterParam,
        fragment: &FilterFragment<'_>,
        ctx: &mut DecodeContext,
    ) -> bool {
        match param {
            P::EncounterStatus => {
                advanced.encounter_status = self.labels(fragment.value, None, V::EncounterStatus).await;
            }
            P::ExecutiveUnits => advanced.encounter_service = self.services(fragment.value, ctx).await,
            P::Date => {
                let mut range = DateRange::new(advanced.start_occurrence, advanced.end_occurrence);
                if ctx.check(fragment, apply_date_bound(&mut range, fragment.value)).is_some() {
                    advanced.start_occurrence = range.start;
                    advanced.end_occurrence = range.end;
                }
            }
            _ => return false,
        }
        true
    }

    async fn patient(&self, c: &mut PatientCriterion, fragments: &[FilterFragment<'_>], ctx: &mut DecodeContext) {
        for fragment in fragments {
            let Some(param) = ctx.param(fragment) else { continue };
            let value = fragment.value;
            match param {
                P::Gender => c.genders = self.labels(value, None, V::Gender).await,
                P::VitalStatus => c.vital_status = self.labels(value, None, V::VitalStatus).await,
                P::Birthdate => {
                    ctx.check(fragment, apply_date_bound(&mut c.birthdates, value));
                }
                P::DeathDate => {
                    ctx.check(fragment, apply_date_bound(&mut c.death_dates, value));
                }
                P::AgeDay => {
                    ctx.check(fragment, apply_duration_bound(&mut c.age, value, DurationUnit::Days));
                }
                P::AgeMonth => {
                    ctx.check(fragment, apply_duration_bound(&mut c.age, value, DurationUnit::Months));
                }
                _ => ctx.unknown(fragment),
            }
        }
    }

    async fn encounter(&self, c: &mut EncounterCriterion, fragments: &[FilterFragment<'_>], ctx: &mut DecodeContext) {
        for fragment in fragments {
            let Some(param) = ctx.param(fragment) else { continue };
            let value = fragment.value;
            match param {
                P::AdmissionMode => c.admission_mode = self.labels(value, None, V::AdmissionMode).await,
                P::EntryMode => c.entry_mode = self.labels(value, None, V::EntryMode).await,
                P::ExitMode => c.exit_mode = self.labels(value, None, V::ExitMode).await,
                P::CareType => c.care_type = self.labels(value, None, V::CareType).await,
                P::StayType => c.stay_type = self.labels(value, None, V::StayType).await,
                P::Reason => c.reason = self.labels(value, None, V::EncounterReason).await,
                P::Destination => c.destination = self.labels(value, None, V::Destination).await,
                P::Provenance => c.provenance = self.labels(value, None, V::Provenance).await,
                P::Admission => c.admission = self.labels(value, None, V::Admission).await,
                P::Length => {
                    ctx.check(fragment, apply_duration_bound(&mut c.duration, value, DurationUnit::Days));
                }
                P::VisitStartAgeDay | P::VisitStartAgeMonth => {
                    let unit = visit_age_unit(param);
                    if let Some((_, age)) = ctx.check(fragment, parse_duration_filter(value, unit)) {
                        c.age.start = Some(age);
                    }
                }
                P::VisitEndAgeDay | P::VisitEndAgeMonth => {
                    let unit = visit_age_unit(param);
                    if let Some((_, age)) = ctx.check(fragment, parse_duration_filter(value, unit)) {
                        c.age.end = Some(age);
                    }
                }
                _ => {
                    if !self.context(&mut c.advanced, param, fragment, ctx).await {
                        ctx.unknown(fragment);
                    }
                }
            }
        }
    }

    async fn documents(&self, c: &mut DocumentsCriterion, fragments: &[FilterFragment<'_>], ctx: &mut DecodeContext) {
        for fragment in fragments {
            let Some(param) = ctx.param(fragment) else { continue };
            let value = fragment.value;
            match param {
                P::Text => {
                    c.search = decode_search(value);
                    c.search_by = SearchBy::Text;
                }
                P::Title => {
                    c.search = decode_search(value);
                    c.search_by = SearchBy::Description;
                }
                P::DocStatus => {
                    if let Some(statuses) = ctx.check(fragment, parse_doc_statuses(value)) {
                        c.doc_statuses = statuses;
                    }
                }
                P::DocType => c.doc_types = self.labels(value, None, V::DocumentType).await,
                _ => {
                    if !self.context(&mut c.advanced, param, fragment, ctx).await {
                        ctx.unknown(fragment);
                    }
                }
            }
        }
    }

    async fn condition(&self, c: &mut ConditionCriterion, fragments: &[FilterFragment<'_>], ctx: &mut DecodeContext) {
        for fragment in fragments {
            let Some(param) = ctx.param(fragment) else { continue };
            let value = fragment.value;
            match param {
                P::Code => c.code = self.labels(value, Some(CONDITION_HIERARCHY), V::ConditionCode).await,
                P::DiagnosticType => c.diagnostic_type = self.labels(value, None, V::DiagnosticType).await,
                P::Source => c.source = Some(value.to_string()),
                _ => {
                    if !self.context(&mut c.advanced, param, fragment, ctx).await {
                        ctx.unknown(fragment);
                    }
                }
            }
        }
    }

    async fn procedure(&self, c: &mut ProcedureCriterion, fragments: &[FilterFragment<'_>], ctx: &mut DecodeContext) {
        for fragment in fragments {
            let Some(param) = ctx.param(fragment) else { continue };
            let value = fragment.value;
            match param {
                P::Code => c.code = self.labels(value, Some(PROCEDURE_HIERARCHY), V::ProcedureCode).await,
                P::Source => c.source = Some(value.to_string()),
                _ => {
                    if !self.context(&mut c.advanced, param, fragment, ctx).await {
                        ctx.unknown(fragment);
                    }
                }
            }
        }
    }

    async fn claim(&self, c: &mut ClaimCriterion, fragments: &[FilterFragment<'_>], ctx: &mut DecodeContext) {
        for fragment in fragments {
            let Some(param) = ctx.param(fragment) else { continue };
            match param {
                P::Code => c.code = self.labels(fragment.value, Some(CLAIM_HIERARCHY), V::ClaimCode).await,
                _ => {
                    if !self.context(&mut c.advanced, param, fragment, ctx).await {
                        ctx.unknown(fragment);
                    }
                }
            }
        }
    }

    async fn medication(&self, c: &mut MedicationCriterion, fragments: &[FilterFragment<'_>], ctx: &mut DecodeContext) {
        for fragment in fragments {
            let Some(param) = ctx.param(fragment) else { continue };
            let value = fragment.value;
            match param {
                P::Code => c.code = self.labels(value, Some(MEDICATION_ATC), V::MedicationCode).await,
                P::AdministrationRoute => {
                    c.administration = self.labels(value, None, V::AdministrationRoute).await;
                }
                P::PrescriptionType => {
                    c.prescription_type = self.labels(value, None, V::PrescriptionType).await;
                }
                _ => {
                    if !self.context(&mut c.advanced, param, fragment, ctx).await {
                        ctx.unknown(fragment);
                    }
                }
            }
        }
    }

    async fn observation(&self, c: &mut ObservationCriterion, fragments: &[FilterFragment<'_>], ctx: &mut DecodeContext) {
        let mut values = Vec::new();
        for fragment in fragments {
            let Some(param) = ctx.param(fragment) else { continue };
            match param {
                P::Code => {
                    c.code = self.labels(fragment.value, Some(BIOLOGY_HIERARCHY_ITM_ANABIO), V::BiologyCode).await;
                }
                P::ObservationValue => values.push(fragment.value),
                _ => {
                    if !self.context(&mut c.advanced, param, fragment, ctx).await {
                        ctx.unknown(fragment);
                    }
                }
            }
        }

        match parse_value_filter(&values) {
            Ok(Some(value)) => c.value = value,
            Ok(None) => {}
            Err(err) => ctx.fail(&values.join("&"), err),
        }

        // a value constraint only applies to a single leaf code
        if let [code] = c.code.as_slice() {
            match self.resolvers.biology.has_children(&code.id).await {
                Ok(has_children) => c.is_leaf = !has_children,
                Err(e) => {
                    warn!(code = %code.id, error = %e, "biology hierarchy lookup failed");
                    ctx.note(vec![
                        Diagnostic::warning(COH0203, format!("children of {} could not be checked: {}", code.id, e))
                            .with_fragment(code.id.clone()),
                    ]);
                }
            }
        }
    }

    async fn imaging(&self, c: &mut ImagingCriterion, fragments: &[FilterFragment<'_>], ctx: &mut DecodeContext) {
        for fragment in fragments {
            let Some(param) = ctx.param(fragment) else { continue };
            let value = fragment.value;
            match param {
                P::StudyDate => {
                    ctx.check(fragment, apply_date_bound(&mut c.study_dates, value));
                }
                P::SeriesDate => {
                    ctx.check(fragment, apply_date_bound(&mut c.series_dates, value));
                }
                P::StudyModalities => {
                    c.study_modalities = self.labels(&strip_modality_prefixes(value), None, V::Modality).await;
                }
                P::SeriesModalities => {
                    c.series_modalities = self.labels(&strip_modality_prefixes(value), None, V::Modality).await;
                }
                P::StudyDescription => c.study_description = decode_search(value),
                P::StudyProcedure => c.study_procedure = decode_search(value),
                P::SeriesDescription => c.series_description = decode_search(value),
                P::SeriesProtocol => c.series_protocol = decode_search(value),
                P::NumberOfSeries => {
                    if let Some(count) = ctx.check(fragment, parse_occurrence(value)) {
                        c.number_of_series = count;
                    }
                }
                P::NumberOfInstances => {
                    if let Some(count) = ctx.check(fragment, parse_occurrence(value)) {
                        c.number_of_instances = count;
                    }
                }
                P::WithDocument => {
                    if let Some(attachment) = ctx.check(fragment, parse_document_attachment(value)) {
                        c.with_document = attachment;
                    }
                }
                P::StudyUid => {
                    c.study_uid = value.split_once('|').map_or(value, |(_, uid)| uid).to_string();
                }
                P::SeriesUid => c.series_uid = value.to_string(),
                _ => {
                    if !self.context(&mut c.advanced, param, fragment, ctx).await {
                        ctx.unknown(fragment);
                    }
                }
            }
        }
    }

    async fn questionnaire(
        &self,
        c: &mut QuestionnaireCriterion,
        form: FormName,
        fragments: &[FilterFragment<'_>],
        ctx: &mut DecodeContext,
    ) {
        for fragment in fragments {
            if is_base_key(ctx.resource, fragment.key) {
                continue;
            }
            match param_for_key(ctx.resource, fragment.key) {
                Some(P::QuestionnaireName | P::QuestionnaireStatus) => {}
                Some(param) => {
                    if !self.context(&mut c.advanced, param, fragment, ctx).await {
                        ctx.unknown(fragment);
                    }
                }
                None => match decode_answer(form, fragment.key, fragment.value) {
                    Ok((field, AnswerValue::Labels(codes))) => {
                        let reference = self.vocabulary.get(V::QuestionnaireAnswer(field.link_id)).await;
                        let labels = with_reference_labels(codes, &reference);
                        c.answers.insert(field.name.to_string(), AnswerValue::Labels(labels));
                    }
                    Ok((field, answer)) => {
                        c.answers.insert(field.name.to_string(), answer);
                    }
                    Err(err) => ctx.fail(&fragment.to_string(), err),
                },
            }
        }
    }
}

fn ipp_list(c: &mut IppListCriterion, fragments: &[FilterFragment<'_>], ctx: &mut DecodeContext) {
    for fragment in fragments {
        match ctx.param(fragment) {
            Some(P::IppList) => c.search = fragment.value.to_string(),
            Some(_) => ctx.unknown(fragment),
            None => {}
        }
    }
}

const fn visit_age_unit(param: FilterParam) -> DurationUnit {
    match param {
        P::VisitStartAgeMonth | P::VisitEndAgeMonth => DurationUnit::Months,
        _ => DurationUnit::Days,
    }
}

/// `system|final,system|preliminary`
fn parse_doc_statuses(value: &str) -> FilterResult<Vec<DocumentStatus>> {
    value
        .split(',')
        .filter(|code| !code.is_empty())
        .map(|code| {
            let status = code.rsplit('|').next().unwrap_or(code);
            DocumentStatus::from_code(status).ok_or_else(|| FilterError::DocumentStatus(code.to_string()))
        })
        .collect()
}

/// Modality codes may carry a leading `*|` from older clients
fn strip_modality_prefixes(value: &str) -> String {
    value
        .split(',')
        .map(|code| code.trim_start_matches(['*', '|']))
        .collect::<Vec<_>>()
        .join(",")
}

/// Occurrence and date context carried on the node itself
fn node_context(advanced: &mut AdvancedCriteria, node: &CriterionNode, ctx: &mut DecodeContext) {
    if let Some(occurrence) = &node.occurrence {
        advanced.occurrence = occurrence.n.map(|n| Occurrence::new(n, occurrence.operator));
        advanced.occurrence_time_delay_min = occurrence.time_delay_min;
        advanced.occurrence_time_delay_max = occurrence.time_delay_max;
    }
    if let Some(range) = node.date_range_list.as_ref().and_then(|list| list.first()) {
        advanced.start_occurrence = node_date(range.min_date.as_deref(), "minDate", ctx);
        advanced.end_occurrence = node_date(range.max_date.as_deref(), "maxDate", ctx);
        advanced.date_preference = range.date_preference.clone().unwrap_or_default();
        advanced.date_is_not_null = range.date_is_not_null;
    }
    if let Some(range) = &node.encounter_date_range {
        advanced.encounter_start_date = node_date(range.min_date.as_deref(), "minDate", ctx);
        advanced.encounter_end_date = node_date(range.max_date.as_deref(), "maxDate", ctx);
        advanced.encounter_date_is_not_null = range.date_is_not_null;
    }
}

fn node_date(value: Option<&str>, field: &str, ctx: &mut DecodeContext) -> Option<NaiveDate> {
    let value = value?;
    let date = parse_wire_date(value);
    if date.is_none() {
        ctx.fail(&format!("{}={}", field, value), FilterError::Date(value.to_string()));
    }
    date
}
