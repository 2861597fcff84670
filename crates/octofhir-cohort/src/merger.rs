//! Sub-query splicing
//!
//! Joins the tree of one serialized query into a group of another. The
//! joined ids are moved out of the base query's id space, the result is
//! unbuilt (which renumbers everything) and built again.

use crate::build::{BuildOptions, RequestBuilder};
use crate::request::UnbuiltRequest;
use crate::unbuild::RequestUnbuilder;
use octofhir_cohort_ast::{GroupNode, GroupType, JsonSerializer, QueryDocument, RequestNode, RequestSerializer};
use octofhir_cohort_diagnostics::{COH0301, CohortError, Result};
use octofhir_cohort_model::ResolverSet;
use tracing::{debug, instrument, warn};

/// Offset applied by clients that always used a fixed one
pub const LEGACY_JOIN_OFFSET: i64 = 128;

/// How far the joined ids are moved
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OffsetPolicy {
    /// Just past the ids used by the base query
    #[default]
    Dynamic,
    /// A fixed offset; ids may collide when the base query is large
    Fixed(i64),
}

#[derive(Debug, Clone, Default)]
pub struct JoinOptions {
    pub offset: OffsetPolicy,
    pub build: BuildOptions,
}

/// Result of a join: the serialized document and its decoded form
#[derive(Debug, Clone, PartialEq)]
pub struct JoinedRequest {
    pub json: String,
    pub request: UnbuiltRequest,
}

/// Splices sub-queries into base queries
#[derive(Debug, Clone, Default)]
pub struct RequestMerger {
    unbuilder: RequestUnbuilder,
    options: JoinOptions,
}

impl RequestMerger {
    pub fn new(resolvers: ResolverSet) -> Self {
        Self {
            unbuilder: RequestUnbuilder::new(resolvers),
            options: JoinOptions::default(),
        }
    }

    pub fn with_options(mut self, options: JoinOptions) -> Self {
        self.options = options;
        self
    }

    /// Join the tree of `sub` under group `parent_id` of `base`
    ///
    /// The sub-query's children are wrapped in a new group (an `andGroup`
    /// when its root was one, an `orGroup` otherwise). Its population and
    /// temporal constraints are dropped; the base query keeps its own.
    #[instrument(skip_all, fields(parent_id = parent_id))]
    pub async fn join(&self, base: &str, sub: &str, parent_id: i64) -> Result<JoinedRequest> {
        let serializer = JsonSerializer::new();
        let mut base_document = serializer.deserialize(base)?;
        let sub_document = serializer.deserialize(sub)?;

        if let Some(sub_root) = sub_document.request {
            let base_root = base_document
                .request
                .as_mut()
                .ok_or_else(|| CohortError::parent_not_found(parent_id))?;
            let offset = self.offset(base_root)?;

            let mut wrapper = GroupNode::new(
                sub_root.id,
                match sub_root.group_type {
                    GroupType::AndGroup => GroupType::AndGroup,
                    GroupType::OrGroup | GroupType::NAmongM => GroupType::OrGroup,
                },
            );
            wrapper.criteria = sub_root.criteria;
            wrapper.shift_ids(offset)?;
            debug!(offset, wrapper = wrapper.id, "shifted sub-query ids");

            let parent = base_root
                .find_group_mut(parent_id)
                .ok_or_else(|| CohortError::parent_not_found(parent_id))?;
            parent.criteria.push(RequestNode::Group(wrapper));
        } else {
            debug!("sub-query has no request tree");
        }

        self.finish(base_document).await
    }

    /// Offset that moves every joined id clear of the base query
    fn offset(&self, base_root: &GroupNode) -> Result<i64> {
        let highest = base_root.max_criterion_id();
        let lowest = base_root.min_group_id();
        let needed = lowest
            .checked_abs()
            .map(|lowest| highest.max(lowest))
            .and_then(|used| used.checked_add(1))
            .ok_or_else(|| CohortError::merge(COH0301, "base query ids leave no room for the joined tree"))?;

        match self.options.offset {
            OffsetPolicy::Dynamic => Ok(needed),
            OffsetPolicy::Fixed(offset) => {
                if offset < needed {
                    warn!(offset, needed, "fixed join offset may collide with base query ids");
                }
                Ok(offset)
            }
        }
    }

    async fn finish(&self, document: QueryDocument) -> Result<JoinedRequest> {
        let request = self.unbuilder.unbuild_document(document).await?;
        let json = RequestBuilder::with_options(self.options.build.clone()).build(&request.request)?;
        Ok(JoinedRequest { json, request })
    }
}

/// Join `sub` under group `parent_id` of `base` with default options
pub async fn join_request(
    base: &str,
    sub: &str,
    parent_id: i64,
    resolvers: ResolverSet,
) -> Result<JoinedRequest> {
    RequestMerger::new(resolvers).join(base, sub, parent_id).await
}
