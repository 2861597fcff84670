//! Reference lists shared by the criteria of one unbuild

use octofhir_cohort_diagnostics::{COH0202, Diagnostic};
use octofhir_cohort_model::{VocabularyKind, VocabularyResolver};
use octofhir_cohort_types::LabelObject;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::{debug, warn};

type Slot = Arc<OnceCell<Arc<Vec<LabelObject>>>>;

/// Fetches each reference list at most once per unbuild
///
/// A list that fails to load is cached as empty: its codes keep an empty
/// label and the failure is reported once. Concurrent requests for the
/// same kind wait on a single fetch.
pub struct VocabularyCache {
    resolver: Arc<dyn VocabularyResolver>,
    entries: Mutex<HashMap<VocabularyKind, Slot>>,
    diagnostics: Mutex<Vec<Diagnostic>>,
}

impl VocabularyCache {
    pub fn new(resolver: Arc<dyn VocabularyResolver>) -> Self {
        Self {
            resolver,
            entries: Mutex::new(HashMap::new()),
            diagnostics: Mutex::new(Vec::new()),
        }
    }

    pub async fn get(&self, kind: VocabularyKind) -> Arc<Vec<LabelObject>> {
        let slot = self.entries.lock().entry(kind).or_default().clone();
        slot.get_or_init(|| self.fetch(kind)).await.clone()
    }

    async fn fetch(&self, kind: VocabularyKind) -> Arc<Vec<LabelObject>> {
        match self.resolver.reference_list(kind).await {
            Ok(list) => {
                debug!(vocabulary = %kind, entries = list.len(), "loaded reference list");
                Arc::new(list)
            }
            Err(e) => {
                warn!(vocabulary = %kind, error = %e, "reference list lookup failed");
                self.diagnostics.lock().push(Diagnostic::warning(
                    COH0202,
                    format!("reference list '{}' could not be loaded: {}", kind, e),
                ));
                Arc::default()
            }
        }
    }

    /// Lookup failures recorded so far
    pub fn take_diagnostics(&self) -> Vec<Diagnostic> {
        std::mem::take(&mut *self.diagnostics.lock())
    }
}
