use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::navigation::Position;
use crate::spec::category::Category;
use crate::spec::question::Question;
use crate::validate::validate;

/// Static survey configuration, loaded once and never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Survey {
    pub categories: Vec<Category>,
}

/// Errors raised while loading a survey configuration.
#[derive(Debug, Error)]
pub enum SurveyError {
    #[error("survey json parse error: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid survey configuration: {}", .0.join("; "))]
    Invalid(Vec<String>),
}

impl Survey {
    /// Parses and validates a survey document.
    pub fn from_json(raw: &str) -> Result<Self, SurveyError> {
        let survey: Survey = serde_json::from_str(raw)?;
        let result = validate(&survey);
        if !result.valid {
            return Err(SurveyError::Invalid(
                result.errors.into_iter().map(|error| error.message).collect(),
            ));
        }
        Ok(survey)
    }

    pub fn total_questions(&self) -> usize {
        self.categories.iter().map(Category::len).sum()
    }

    /// Question counts per section, in navigation order.
    pub fn section_sizes(&self) -> Vec<usize> {
        self.categories.iter().map(Category::len).collect()
    }

    pub fn questions(&self) -> impl Iterator<Item = &Question> {
        self.categories
            .iter()
            .flat_map(|category| category.questions.iter())
    }

    pub fn question(&self, id: &str) -> Option<&Question> {
        self.questions().find(|question| question.id == id)
    }

    pub fn category_at(&self, position: Position) -> Option<&Category> {
        self.categories.get(position.section)
    }

    pub fn question_at(&self, position: Position) -> Option<&Question> {
        self.category_at(position)
            .and_then(|category| category.questions.get(position.question))
    }
}
