//! Criteria groups

use crate::Comparator;
use serde::{Deserialize, Serialize};

/// Id of the synthetic root group
pub const ROOT_GROUP_ID: i64 = 0;

/// Constraint of an N-among-M group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NAmongMOptions {
    pub n: u32,
    pub operator: Comparator,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_delay_min: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_delay_max: Option<i64>,
}

impl NAmongMOptions {
    pub const fn new(n: u32, operator: Comparator) -> Self {
        Self {
            n,
            operator,
            time_delay_min: None,
            time_delay_max: None,
        }
    }
}

/// Boolean combinator of a group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum GroupKind {
    #[default]
    AndGroup,
    OrGroup,
    NAmongM {
        options: NAmongMOptions,
    },
}

impl GroupKind {
    /// Name used in the `_type` field of a group node
    pub const fn wire_name(&self) -> &'static str {
        match self {
            Self::AndGroup => "andGroup",
            Self::OrGroup => "orGroup",
            Self::NAmongM { .. } => "nAmongM",
        }
    }

    pub const fn n_among_m_options(&self) -> Option<&NAmongMOptions> {
        match self {
            Self::NAmongM { options } => Some(options),
            _ => None,
        }
    }
}

/// A group of criteria and nested groups
///
/// Child ids follow the sign convention: criteria are `>= 1`, groups `<= 0`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CriteriaGroup {
    pub id: i64,
    #[serde(default)]
    pub title: String,
    #[serde(flatten)]
    pub kind: GroupKind,
    pub is_inclusive: bool,
    #[serde(default)]
    pub criteria_ids: Vec<i64>,
}

impl CriteriaGroup {
    pub fn new(id: i64, kind: GroupKind) -> Self {
        Self {
            id,
            title: default_group_title(id),
            kind,
            is_inclusive: true,
            criteria_ids: Vec::new(),
        }
    }

    pub fn root() -> Self {
        Self::new(ROOT_GROUP_ID, GroupKind::AndGroup)
    }

    pub fn with_children(mut self, ids: impl IntoIterator<Item = i64>) -> Self {
        self.criteria_ids = ids.into_iter().collect();
        self
    }

    pub fn excluding(mut self) -> Self {
        self.is_inclusive = false;
        self
    }

    pub const fn is_root(&self) -> bool {
        self.id == ROOT_GROUP_ID
    }
}

/// Whether a child id designates a group rather than a criterion
pub const fn is_group_id(id: i64) -> bool {
    id <= 0
}

fn default_group_title(id: i64) -> String {
    if id == ROOT_GROUP_ID {
        "Groupe de critères principal".to_string()
    } else {
        format!("Groupe de critères {}", id.unsigned_abs())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_group_kind_serialization() {
        let group = CriteriaGroup::new(
            -1,
            GroupKind::NAmongM {
                options: NAmongMOptions::new(2, Comparator::GreaterOrEqual),
            },
        )
        .with_children([1, 2, 3]);

        let json = serde_json::to_value(&group).unwrap();
        assert_eq!(json["type"], "nAmongM");
        assert_eq!(json["options"]["operator"], ">=");
        assert_eq!(json["criteriaIds"], serde_json::json!([1, 2, 3]));

        let back: CriteriaGroup = serde_json::from_value(json).unwrap();
        assert_eq!(back, group);
    }

    #[test]
    fn test_sign_convention() {
        assert!(is_group_id(0));
        assert!(is_group_id(-3));
        assert!(!is_group_id(1));
        assert!(CriteriaGroup::root().is_root());
    }
}
