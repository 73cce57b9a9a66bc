use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::spec::language::{Language, LocalizedText};

/// Supported input types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum QuestionKind {
    #[default]
    Text,
    Select,
    Radio,
    Multiselect,
}

impl QuestionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            QuestionKind::Text => "text",
            QuestionKind::Select => "select",
            QuestionKind::Radio => "radio",
            QuestionKind::Multiselect => "multiselect",
        }
    }

    /// Single-choice kinds store one option label.
    pub fn is_single_choice(&self) -> bool {
        matches!(self, QuestionKind::Select | QuestionKind::Radio)
    }

    pub fn has_options(&self) -> bool {
        !matches!(self, QuestionKind::Text)
    }
}

/// Definition of a single survey question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Question {
    /// `<Letter>-<NN>`, unique across the survey.
    pub id: String,
    /// Short name, also used as the flat export column.
    pub label: String,
    pub english: String,
    pub french: String,
    #[serde(rename = "type", default)]
    pub kind: QuestionKind,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<LocalizedText>,
}

impl Question {
    pub fn text(&self, language: Language) -> &str {
        match language {
            Language::English => &self.english,
            Language::French => &self.french,
        }
    }

    /// Option labels in the requested language, in declaration order.
    pub fn option_labels(&self, language: Language) -> Vec<&str> {
        self.options
            .iter()
            .map(|option| option.get(language))
            .collect()
    }
}
