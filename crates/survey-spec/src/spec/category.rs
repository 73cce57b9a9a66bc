use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::spec::language::LocalizedText;
use crate::spec::question::Question;

/// Named group of questions navigated as one section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Category {
    pub id: String,
    pub title: LocalizedText,
    pub questions: Vec<Question>,
}

impl Category {
    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }
}
