use serde::Serialize;

use crate::answers::AnswerStore;
use crate::navigation::Position;
use crate::spec::survey::Survey;

/// Progress counters exposed to the presentation layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Progress {
    /// Answer store entries, blank answers included.
    pub answered: usize,
    pub total: usize,
}

impl Progress {
    pub fn new(answered: usize, total: usize) -> Self {
        Self { answered, total }
    }

    pub fn from_store(survey: &Survey, answers: &AnswerStore) -> Self {
        Self::new(answers.len(), survey.total_questions())
    }

    pub fn percent(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        self.answered as f64 / self.total as f64 * 100.0
    }

    /// Human counters for the current position ("section 2 of 4", "question 1 of 5").
    pub fn position_summary(survey: &Survey, position: Position) -> PositionSummary {
        PositionSummary {
            section_number: position.section + 1,
            section_count: survey.categories.len(),
            question_number: position.question + 1,
            questions_in_section: survey
                .categories
                .get(position.section)
                .map(|category| category.len())
                .unwrap_or(0),
        }
    }
}

/// One-based counters describing where the respondent is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PositionSummary {
    pub section_number: usize,
    pub section_count: usize,
    pub question_number: usize,
    pub questions_in_section: usize,
}
