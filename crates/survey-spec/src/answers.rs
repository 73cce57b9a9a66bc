use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A single stored answer. `text` follows the specify-other encoding for choice questions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Answer {
    pub question_id: String,
    pub text: String,
}

impl Answer {
    pub fn new(question_id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            question_id: question_id.into(),
            text: text.into(),
        }
    }
}

/// In-progress answers for one respondent, at most one entry per question.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct AnswerStore {
    entries: Vec<Answer>,
}

impl AnswerStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a store by upserting each answer, so later duplicates win.
    pub fn from_answers(answers: impl IntoIterator<Item = Answer>) -> Self {
        let mut store = Self::new();
        for answer in answers {
            store.upsert(answer.question_id, answer.text);
        }
        store
    }

    pub fn upsert(&mut self, question_id: impl Into<String>, text: impl Into<String>) {
        let question_id = question_id.into();
        let text = text.into();
        match self
            .entries
            .iter_mut()
            .find(|entry| entry.question_id == question_id)
        {
            Some(entry) => entry.text = text,
            None => self.entries.push(Answer { question_id, text }),
        }
    }

    /// Stored text, or `""` when the question has no entry.
    pub fn get(&self, question_id: &str) -> &str {
        self.entries
            .iter()
            .find(|entry| entry.question_id == question_id)
            .map(|entry| entry.text.as_str())
            .unwrap_or("")
    }

    pub fn contains(&self, question_id: &str) -> bool {
        self.entries
            .iter()
            .any(|entry| entry.question_id == question_id)
    }

    pub fn to_list(&self) -> Vec<Answer> {
        self.entries.clone()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Answer> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
