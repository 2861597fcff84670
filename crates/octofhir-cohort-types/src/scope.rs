//! Source population and organisational-unit references

use serde::{Deserialize, Serialize};

/// Access level granting pseudonymised data only
pub const PSEUDONYMISED_ACCESS: &str = "Pseudonymisé";

/// Placeholder population id used while a selection is still loading
pub const LOADING_POPULATION: &str = "loading";

/// A care-site cohort the query is evaluated against
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PopulationRef {
    /// Perimeter identifier
    pub id: String,
    /// Cohort identifier sent in `caresiteCohortList`
    pub cohort_id: Option<String>,
    #[serde(default)]
    pub name: String,
    /// Access level of the current user on this population
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access: Option<String>,
}

impl PopulationRef {
    pub fn new(id: impl Into<String>, cohort_id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            cohort_id: Some(cohort_id.into()),
            ..Default::default()
        }
    }

    pub fn with_access(mut self, access: impl Into<String>) -> Self {
        self.access = Some(access.into());
        self
    }

    pub fn is_pseudonymised(&self) -> bool {
        self.access.as_deref() == Some(PSEUDONYMISED_ACCESS)
    }
}

/// Whether any member of a selected population only grants pseudonymised access
///
/// Unresolved entries do not count.
pub fn is_deidentified(population: &[Option<PopulationRef>]) -> bool {
    population.iter().flatten().any(PopulationRef::is_pseudonymised)
}

/// An organisational unit (care site) selected in an encounter-service field
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrgUnitRef {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_value: Option<String>,
}

impl OrgUnitRef {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            source_value: None,
        }
    }

    /// Unit that could not be resolved: the raw id is also its name
    pub fn unresolved(id: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            name: id.clone(),
            id,
            source_value: None,
        }
    }

    pub fn with_source_value(mut self, source_value: impl Into<String>) -> Self {
        self.source_value = Some(source_value.into());
        self
    }

    /// Display label: `<source value> - <name>`, or the name alone
    pub fn label(&self) -> String {
        match &self.source_value {
            Some(source) => format!("{} - {}", source, self.name),
            None => self.name.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_deidentified_if_any_member_is_pseudonymised() {
        let nominative = PopulationRef::new("1", "10").with_access("Nominatif");
        let pseudo = PopulationRef::new("2", "20").with_access(PSEUDONYMISED_ACCESS);

        assert!(!is_deidentified(&[Some(nominative.clone()), None]));
        assert!(is_deidentified(&[Some(nominative), None, Some(pseudo)]));
        assert!(!is_deidentified(&[]));
    }

    #[test]
    fn test_org_unit_label() {
        let unit = OrgUnitRef::new("8312002244", "Hôpital X").with_source_value("APHP-X");
        assert_eq!(unit.label(), "APHP-X - Hôpital X");

        let raw = OrgUnitRef::unresolved("42");
        assert_eq!(raw.label(), "42");
        assert_eq!(raw.id, "42");
    }
}
