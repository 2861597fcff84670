//! Questionnaire-backed criteria

use crate::{LabelObject, NumericFilter};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A questionnaire form that can be queried as a criterion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FormName {
    #[serde(rename = "APHPEDSQuestionnaireFicheGrossesse")]
    Pregnancy,
    #[serde(rename = "APHPEDSQuestionnaireFicheHospit")]
    Hospit,
}

impl FormName {
    pub const ALL: [FormName; 2] = [Self::Pregnancy, Self::Hospit];

    /// Name matched by the `questionnaire.name` filter
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pregnancy => "APHPEDSQuestionnaireFicheGrossesse",
            Self::Hospit => "APHPEDSQuestionnaireFicheHospit",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.as_str() == name)
    }
}

impl fmt::Display for FormName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Value selected for one question of a form
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "camelCase")]
pub enum AnswerValue {
    Labels(Vec<LabelObject>),
    Text(String),
    Number(NumericFilter),
    Date(NaiveDate),
}

impl AnswerValue {
    /// Whether the answer constrains nothing and can be omitted
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Labels(labels) => labels.is_empty(),
            Self::Text(text) => text.is_empty(),
            Self::Number(_) | Self::Date(_) => false,
        }
    }
}
