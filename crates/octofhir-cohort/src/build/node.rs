//! Criterion nodes

use super::filter::filter_fhir;
use octofhir_cohort_ast::{CriterionNode, DateRangeNode, OccurrenceNode};
use octofhir_cohort_filter::format_wire_date;
use octofhir_cohort_types::{AdvancedCriteria, SelectedCriterion};

/// Leaf node of one criterion
///
/// Patient and IPP-list criteria have no occurrence nor encounter context.
pub fn criterion_node(criterion: &SelectedCriterion, deidentified: bool) -> CriterionNode {
    let mut node = CriterionNode::new(
        criterion.id(),
        criterion.resource_type().as_str(),
        filter_fhir(criterion, deidentified),
    );
    node.name = criterion.title().to_string();
    node.is_inclusive = criterion.is_inclusive();

    if let Some(advanced) = criterion.advanced() {
        node.occurrence = Some(occurrence_node(advanced));
        if advanced.has_occurrence_dates() {
            node.date_range_list = Some(vec![DateRangeNode {
                min_date: advanced.start_occurrence.map(format_wire_date),
                max_date: advanced.end_occurrence.map(format_wire_date),
                date_preference: (!advanced.date_preference.is_empty())
                    .then(|| advanced.date_preference.clone()),
                date_is_not_null: advanced.date_is_not_null,
            }]);
        }
        if advanced.has_encounter_dates() {
            node.encounter_date_range = Some(DateRangeNode {
                min_date: advanced.encounter_start_date.map(format_wire_date),
                max_date: advanced.encounter_end_date.map(format_wire_date),
                date_preference: None,
                date_is_not_null: advanced.encounter_date_is_not_null,
            });
        }
    }
    node
}

fn occurrence_node(advanced: &AdvancedCriteria) -> OccurrenceNode {
    OccurrenceNode {
        n: advanced.occurrence.map(|o| o.value),
        operator: advanced.occurrence.map(|o| o.comparator).unwrap_or_default(),
        time_delay_min: advanced.occurrence_time_delay_min,
        time_delay_max: advanced.occurrence_time_delay_max,
    }
}
