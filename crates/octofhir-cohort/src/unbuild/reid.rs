//! Tree flattening and id renumbering
//!
//! Document ids are whatever a previous build or merge left behind. After
//! decoding, criteria are numbered `1..=N` and groups `0, -1, -2, ...`, both
//! in traversal order, and every reference is rewritten to the new ids.

use octofhir_cohort_ast::{CriterionNode, GroupNode, GroupType, RequestNode};
use octofhir_cohort_types::{
    Comparator, CriteriaGroup, GroupKind, NAmongMOptions, SelectedCriterion, TemporalConstraint,
};
use std::collections::HashMap;

/// Position of a child in the flattened lists
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Child {
    Criterion(usize),
    Group(usize),
}

#[derive(Debug, Clone, PartialEq)]
pub struct FlatGroup {
    pub old_id: i64,
    pub group_type: GroupType,
    pub is_inclusive: bool,
    pub options: Option<NAmongMOptions>,
    pub children: Vec<Child>,
}

/// A request tree flattened in pre-order
///
/// Criteria are listed in the order they are met; a group comes before all
/// of its descendants, so the root is always group `0`.
#[derive(Debug, Clone, Default)]
pub struct FlatTree {
    pub criteria: Vec<CriterionNode>,
    pub groups: Vec<FlatGroup>,
    pub temporal_constraints: Vec<TemporalConstraint>,
}

impl FlatTree {
    pub fn explore(mut root: GroupNode) -> Self {
        let mut tree = Self {
            temporal_constraints: root.temporal_constraints.take().unwrap_or_default(),
            ..Default::default()
        };
        tree.visit(root);
        tree
    }

    fn visit(&mut self, group: GroupNode) -> usize {
        let index = self.groups.len();
        self.groups.push(FlatGroup {
            old_id: group.id,
            group_type: group.group_type,
            is_inclusive: group.is_inclusive,
            options: group.n_among_m_options,
            children: Vec::new(),
        });

        let mut children = Vec::with_capacity(group.criteria.len());
        for child in group.criteria {
            match child {
                RequestNode::Criterion(criterion) => {
                    children.push(Child::Criterion(self.criteria.len()));
                    self.criteria.push(criterion);
                }
                RequestNode::Group(nested) => children.push(Child::Group(self.visit(nested))),
            }
        }
        self.groups[index].children = children;
        index
    }
}

/// Renumbered state of a decoded tree
#[derive(Debug, Clone, PartialEq)]
pub struct Renumbered {
    pub criteria: Vec<SelectedCriterion>,
    pub groups: Vec<CriteriaGroup>,
    pub temporal_constraints: Vec<TemporalConstraint>,
}

const fn criterion_id(index: usize) -> i64 {
    index as i64 + 1
}

const fn group_id(index: usize) -> i64 {
    -(index as i64)
}

/// Give fresh ids to decoded criteria (in `groups` order) and rewrite references
///
/// When a document reuses an id, references to it resolve to its first
/// holder. Constraint targets that match nothing are kept as they are.
pub fn renumber(
    groups: &[FlatGroup],
    mut criteria: Vec<SelectedCriterion>,
    mut temporal_constraints: Vec<TemporalConstraint>,
) -> Renumbered {
    let mut criterion_ids = HashMap::with_capacity(criteria.len());
    for (index, criterion) in criteria.iter_mut().enumerate() {
        let header = criterion.header_mut();
        criterion_ids.entry(header.id).or_insert(criterion_id(index));
        header.id = criterion_id(index);
    }
    let mut group_ids = HashMap::with_capacity(groups.len());
    for (index, group) in groups.iter().enumerate() {
        group_ids.entry(group.old_id).or_insert(group_id(index));
    }

    for constraint in &mut temporal_constraints {
        constraint.remap_ids(|id| criterion_ids.get(&id).or_else(|| group_ids.get(&id)).copied());
    }

    let groups = groups
        .iter()
        .enumerate()
        .map(|(index, group)| {
            let kind = match group.group_type {
                GroupType::AndGroup => GroupKind::AndGroup,
                GroupType::OrGroup => GroupKind::OrGroup,
                GroupType::NAmongM => GroupKind::NAmongM {
                    options: group
                        .options
                        .unwrap_or(NAmongMOptions::new(1, Comparator::GreaterOrEqual)),
                },
            };
            let children = group.children.iter().map(|child| match child {
                Child::Criterion(i) => criterion_id(*i),
                Child::Group(i) => group_id(*i),
            });
            let mut renumbered = CriteriaGroup::new(group_id(index), kind).with_children(children);
            renumbered.is_inclusive = group.is_inclusive;
            renumbered
        })
        .collect();

    Renumbered {
        criteria,
        groups,
        temporal_constraints,
    }
}
