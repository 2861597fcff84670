//! Query document builder
//!
//! Walks the group tree from the root group, looking criteria and groups up
//! by id, and emits the serialized document. Building is pure: no lookups,
//! no I/O.

mod filter;
mod node;

pub use filter::filter_fhir;
pub use node::criterion_node;

use crate::request::CohortRequest;
use octofhir_cohort_ast::{
    CriterionNode, DEFAULT_VERSION, GroupNode, GroupType, JsonSerializer, QueryDocument, RequestNode,
    RequestSerializer, SourcePopulation,
};
use octofhir_cohort_diagnostics::Result;
use octofhir_cohort_types::{
    CriteriaGroup, CriteriaType, GroupKind, LOADING_POPULATION, PopulationRef, ROOT_GROUP_ID,
    SelectedCriterion, is_group_id,
};
use std::collections::HashMap;
use tracing::{debug, instrument, warn};

/// Builder configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildOptions {
    /// Schema version written in the document
    pub version: String,
    pub pretty: bool,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            version: DEFAULT_VERSION.to_string(),
            pretty: false,
        }
    }
}

/// Serializes a [`CohortRequest`] into a query document
#[derive(Debug, Clone, Default)]
pub struct RequestBuilder {
    options: BuildOptions,
}

impl RequestBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: BuildOptions) -> Self {
        Self { options }
    }

    pub fn pretty(mut self) -> Self {
        self.options.pretty = true;
        self
    }

    pub fn options(&self) -> &BuildOptions {
        &self.options
    }

    /// Build the document tree
    ///
    /// `None` until a source population has been picked. The deidentified
    /// flag is derived once from the population and applies to every filter.
    #[instrument(skip_all, fields(criteria = request.criteria.len(), groups = request.groups.len()))]
    pub fn build_document(&self, request: &CohortRequest) -> Option<QueryDocument> {
        let population = request.population.as_deref()?;
        let deidentified = request.is_deidentified();

        let source_population = SourcePopulation {
            caresite_cohort_list: caresite_cohort_list(population),
            provider_cohort_list: request.provider_cohort_list.clone(),
        };
        let document = QueryDocument::new(self.options.version.clone(), source_population);

        let mut tree = TreeBuilder::new(request, deidentified);
        match tree.root(request) {
            Some(root) => Some(document.with_request(root)),
            None => {
                debug!("no root group, document has no request tree");
                Some(document)
            }
        }
    }

    /// Build and serialize; an empty string when no population is set
    pub fn build(&self, request: &CohortRequest) -> Result<String> {
        let Some(document) = self.build_document(request) else {
            return Ok(String::new());
        };
        let serializer = JsonSerializer {
            pretty: self.options.pretty,
        };
        Ok(serializer.serialize(&document)?)
    }
}

fn caresite_cohort_list(population: &[Option<PopulationRef>]) -> Vec<String> {
    population
        .iter()
        .flatten()
        .filter_map(|p| p.cohort_id.as_deref())
        .filter(|id| !id.is_empty() && *id != LOADING_POPULATION)
        .map(str::to_string)
        .collect()
}

/// Id-indexed view of a request, walked once per build
struct TreeBuilder<'a> {
    criteria: HashMap<i64, &'a SelectedCriterion>,
    groups: HashMap<i64, &'a CriteriaGroup>,
    deidentified: bool,
    /// Groups on the way from the root to the node being built
    path: Vec<i64>,
}

impl<'a> TreeBuilder<'a> {
    fn new(request: &'a CohortRequest, deidentified: bool) -> Self {
        let mut criteria = HashMap::with_capacity(request.criteria.len());
        for criterion in &request.criteria {
            criteria.entry(criterion.id()).or_insert(criterion);
        }
        let mut groups = HashMap::with_capacity(request.groups.len());
        for group in &request.groups {
            groups.entry(group.id).or_insert(group);
        }
        Self {
            criteria,
            groups,
            deidentified,
            path: Vec::new(),
        }
    }

    fn root(&mut self, request: &CohortRequest) -> Option<GroupNode> {
        let root = *self.groups.get(&ROOT_GROUP_ID)?;
        let group_type = match root.kind {
            GroupKind::OrGroup => GroupType::OrGroup,
            GroupKind::AndGroup | GroupKind::NAmongM { .. } => GroupType::AndGroup,
        };

        let mut node = GroupNode::new(root.id, group_type);
        node.is_inclusive = root.is_inclusive;
        node.criteria = self.children(root);
        node.temporal_constraints = Some(
            request
                .temporal_constraints
                .iter()
                .filter(|c| !c.is_none())
                .cloned()
                .collect(),
        );
        Some(node)
    }

    fn children(&mut self, group: &CriteriaGroup) -> Vec<RequestNode> {
        self.path.push(group.id);
        let children = group.criteria_ids.iter().map(|id| self.child(*id)).collect();
        self.path.pop();
        children
    }

    fn child(&mut self, id: i64) -> RequestNode {
        if is_group_id(id) {
            RequestNode::Group(self.group_node(id))
        } else {
            RequestNode::Criterion(self.leaf(id))
        }
    }

    fn leaf(&self, id: i64) -> CriterionNode {
        match self.criteria.get(&id) {
            Some(criterion) => criterion_node(criterion, self.deidentified),
            None => {
                warn!(criterion = id, "referenced criterion not found, writing a placeholder");
                let placeholder = SelectedCriterion::empty(CriteriaType::Patient, id)
                    .with_title("")
                    .excluding();
                criterion_node(&placeholder, self.deidentified)
            }
        }
    }

    fn group_node(&mut self, id: i64) -> GroupNode {
        let group = match self.groups.get(&id) {
            Some(group) if !self.path.contains(&id) => *group,
            Some(_) => {
                warn!(group = id, "group contains itself, writing an empty group");
                return GroupNode::new(id, GroupType::AndGroup);
            }
            None => {
                warn!(group = id, "referenced group not found, writing an empty group");
                return GroupNode::new(id, GroupType::AndGroup);
            }
        };

        let group_type = match group.kind {
            GroupKind::AndGroup => GroupType::AndGroup,
            GroupKind::OrGroup => GroupType::OrGroup,
            GroupKind::NAmongM { .. } => GroupType::NAmongM,
        };
        let mut node = GroupNode::new(group.id, group_type);
        node.is_inclusive = group.is_inclusive;
        node.n_among_m_options = group.kind.n_among_m_options().copied();
        node.criteria = self.children(group);
        debug!(group = id, children = node.criteria.len(), "built group");
        node
    }
}
