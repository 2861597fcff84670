//! Organisational-unit (care site) lists

use futures::future::join_all;
use octofhir_cohort_diagnostics::{COH0201, Diagnostic};
use octofhir_cohort_model::OrganizationUnitResolver;
use octofhir_cohort_types::OrgUnitRef;
use tracing::warn;

/// Unit ids joined by `,`
pub fn build_service_filter(units: &[OrgUnitRef]) -> Option<String> {
    if units.is_empty() {
        return None;
    }
    Some(units.iter().map(|u| u.id.as_str()).collect::<Vec<_>>().join(","))
}

/// Resolve every id of a unit list concurrently, in list order
///
/// A failed lookup keeps the raw id as the unit and yields a warning
/// diagnostic; it never aborts the other lookups.
pub async fn decode_services(
    value: &str,
    resolver: &dyn OrganizationUnitResolver,
) -> (Vec<OrgUnitRef>, Vec<Diagnostic>) {
    let ids: Vec<&str> = value.split(',').filter(|id| !id.is_empty()).collect();
    let lookups = ids.iter().map(|id| resolver.resolve_unit(id));
    let results = join_all(lookups).await;

    let mut diagnostics = Vec::new();
    let units = ids
        .iter()
        .zip(results)
        .map(|(id, result)| match result {
            Ok(unit) => unit,
            Err(e) => {
                warn!(unit = %id, error = %e, "organisational unit lookup failed");
                diagnostics.push(
                    Diagnostic::warning(COH0201, format!("organisational unit {} could not be resolved: {}", id, e))
                        .with_fragment(*id),
                );
                OrgUnitRef::unresolved(*id)
            }
        })
        .collect();
    (units, diagnostics)
}
