//! In-memory catalog implementing every resolver
//!
//! Backs the command line tool and tests. A catalog is loaded from a JSON
//! file of the form:
//!
//! ```json
//! {
//!   "populations": [{"id": "1", "cohortId": "10", "name": "APHP", "access": "Nominatif"}],
//!   "orgUnits": [{"id": "8312", "name": "Hôpital X", "sourceValue": "HX"}],
//!   "vocabularies": {"gender": [{"id": "f", "label": "Femme"}]},
//!   "biologyChildren": {"A0001": [{"id": "A0002", "label": "..."}]}
//! }
//! ```

use crate::provider::{
    BiologyHierarchy, OrganizationUnitResolver, PopulationResolver, ResolveError,
    VocabularyKind, VocabularyResolver,
};
use async_trait::async_trait;
use octofhir_cohort_types::{LabelObject, OrgUnitRef, PopulationRef};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogData {
    #[serde(default)]
    pub populations: Vec<PopulationRef>,
    #[serde(default)]
    pub org_units: Vec<OrgUnitRef>,
    #[serde(default)]
    pub vocabularies: HashMap<String, Vec<LabelObject>>,
    #[serde(default)]
    pub biology_children: HashMap<String, Vec<LabelObject>>,
}

/// Catalog shared between resolver handles
#[derive(Clone, Default)]
pub struct InMemoryCatalog {
    data: Arc<RwLock<CatalogData>>,
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_data(data: CatalogData) -> Self {
        Self {
            data: Arc::new(RwLock::new(data)),
        }
    }

    /// Load a catalog from a JSON string
    pub fn from_json(json: &str) -> Result<Self, ResolveError> {
        let data: CatalogData = serde_json::from_str(json)
            .map_err(|e| ResolveError::Internal(format!("invalid catalog: {}", e)))?;
        Ok(Self::from_data(data))
    }

    /// Load a catalog from a JSON file
    pub fn from_file(path: impl AsRef<std::path::Path>) -> Result<Self, ResolveError> {
        let json = std::fs::read_to_string(path).map_err(|e| ResolveError::Unavailable(e.to_string()))?;
        Self::from_json(&json)
    }

    pub fn add_population(&self, population: PopulationRef) {
        self.data.write().populations.push(population);
    }

    pub fn add_org_unit(&self, unit: OrgUnitRef) {
        self.data.write().org_units.push(unit);
    }

    pub fn add_vocabulary(&self, kind: VocabularyKind, entries: Vec<LabelObject>) {
        self.data.write().vocabularies.insert(kind.key(), entries);
    }

    pub fn add_biology_children(&self, code: impl Into<String>, children: Vec<LabelObject>) {
        self.data.write().biology_children.insert(code.into(), children);
    }
}

#[async_trait]
impl PopulationResolver for InMemoryCatalog {
    async fn resolve_population(&self, cohort_id: &str) -> Result<Option<PopulationRef>, ResolveError> {
        let data = self.data.read();
        Ok(data
            .populations
            .iter()
            .find(|p| p.cohort_id.as_deref() == Some(cohort_id))
            .cloned())
    }
}

#[async_trait]
impl OrganizationUnitResolver for InMemoryCatalog {
    async fn resolve_unit(&self, id: &str) -> Result<OrgUnitRef, ResolveError> {
        let data = self.data.read();
        data.org_units
            .iter()
            .find(|u| u.id == id)
            .cloned()
            .ok_or_else(|| ResolveError::NotFound(format!("organisational unit {}", id)))
    }
}

#[async_trait]
impl VocabularyResolver for InMemoryCatalog {
    async fn reference_list(&self, kind: VocabularyKind) -> Result<Vec<LabelObject>, ResolveError> {
        let data = self.data.read();
        Ok(data.vocabularies.get(&kind.key()).cloned().unwrap_or_default())
    }
}

#[async_trait]
impl BiologyHierarchy for InMemoryCatalog {
    async fn children(&self, code: &str) -> Result<Vec<LabelObject>, ResolveError> {
        let data = self.data.read();
        Ok(data.biology_children.get(code).cloned().unwrap_or_default())
    }
}
