//! Comma-separated code lists, optionally qualified as `system|code`

use octofhir_cohort_types::LabelObject;

/// Join codes with `,`, qualifying each with `system|` when a system is given
///
/// With `join_with_system_url`, a code carrying its own system keeps it
/// instead of the default one.
pub fn build_label_filter(list: &[LabelObject], system: Option<&str>, join_with_system_url: bool) -> Option<String> {
    if list.is_empty() {
        return None;
    }
    let codes = list
        .iter()
        .map(|item| {
            let system = match (&item.system, join_with_system_url) {
                (Some(own), true) => Some(own.as_str()),
                _ => system,
            };
            match system {
                Some(system) => format!("{}|{}", system, item.id),
                None => item.id.clone(),
            }
        })
        .collect::<Vec<_>>();
    Some(codes.join(","))
}

/// Split a code list, stripping system prefixes
///
/// A system is only kept on the result when it differs from `default_system`.
/// Labels are left empty; see [`with_reference_labels`].
pub fn decode_label_codes(value: &str, default_system: Option<&str>) -> Vec<LabelObject> {
    value
        .split(',')
        .filter(|code| !code.is_empty())
        .map(|code| match code.rsplit_once('|') {
            Some((system, id)) if Some(system) != default_system && !system.is_empty() => {
                LabelObject::unlabelled(id).with_system(system)
            }
            Some((_, id)) => LabelObject::unlabelled(id),
            None => LabelObject::unlabelled(code),
        })
        .collect()
}

/// Fill labels from a reference list; unknown codes keep an empty label
pub fn with_reference_labels(mut codes: Vec<LabelObject>, reference: &[LabelObject]) -> Vec<LabelObject> {
    for code in &mut codes {
        if let Some(known) = reference.iter().find(|r| r.id == code.id) {
            code.label.clone_from(&known.label);
        }
    }
    codes
}
