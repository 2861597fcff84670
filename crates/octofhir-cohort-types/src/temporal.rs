//! Temporal constraints between criteria

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Kind of a temporal constraint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ConstraintType {
    /// Sentinel meaning "no constraint", never sent to the backend
    #[default]
    None,
    SameEncounter,
    DifferentEncounter,
    DirectChronologicalOrdering,
    SameEpisodeOfCare,
}

/// An entry of a constraint's `idList`
///
/// Usually a criterion id; some constraint kinds use a keyword such as `"All"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConstraintTarget {
    Id(i64),
    Keyword(String),
}

impl ConstraintTarget {
    pub const fn as_id(&self) -> Option<i64> {
        match self {
            Self::Id(id) => Some(*id),
            Self::Keyword(_) => None,
        }
    }
}

impl From<i64> for ConstraintTarget {
    fn from(id: i64) -> Self {
        Self::Id(id)
    }
}

impl From<String> for ConstraintTarget {
    fn from(keyword: String) -> Self {
        Self::Keyword(keyword)
    }
}

/// A cross-criterion ordering or proximity rule
///
/// Fields other than `idList` and `constraintType` are carried through unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemporalConstraint {
    pub id_list: Vec<ConstraintTarget>,
    pub constraint_type: ConstraintType,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl TemporalConstraint {
    pub fn new(id_list: impl IntoIterator<Item = ConstraintTarget>, constraint_type: ConstraintType) -> Self {
        Self {
            id_list: id_list.into_iter().collect(),
            constraint_type,
            extra: Map::new(),
        }
    }

    pub const fn is_none(&self) -> bool {
        matches!(self.constraint_type, ConstraintType::None)
    }

    /// Rewrite every numeric target; targets the mapping declines are kept
    pub fn remap_ids(&mut self, mut map: impl FnMut(i64) -> Option<i64>) {
        for target in &mut self.id_list {
            if let ConstraintTarget::Id(id) = target {
                if let Some(new_id) = map(*id) {
                    *id = new_id;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_unknown_fields_survive() {
        let raw = json!({
            "idList": [1, "All", 3],
            "constraintType": "directChronologicalOrdering",
            "timeRelationMinDuration": {"days": 2}
        });
        let constraint: TemporalConstraint = serde_json::from_value(raw.clone()).unwrap();

        assert_eq!(constraint.constraint_type, ConstraintType::DirectChronologicalOrdering);
        assert_eq!(constraint.id_list[1], ConstraintTarget::Keyword("All".into()));
        assert_eq!(serde_json::to_value(&constraint).unwrap(), raw);
    }

    #[test]
    fn test_remap_ids_keeps_unmapped() {
        let mut constraint = TemporalConstraint::new(
            [ConstraintTarget::Id(5), ConstraintTarget::Id(9), "All".to_string().into()],
            ConstraintType::SameEncounter,
        );
        constraint.remap_ids(|id| (id == 5).then_some(1));

        assert_eq!(
            constraint.id_list,
            vec![
                ConstraintTarget::Id(1),
                ConstraintTarget::Id(9),
                ConstraintTarget::Keyword("All".into())
            ]
        );
    }
}
