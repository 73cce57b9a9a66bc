use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Location of the current question: section index and question index within it.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize, JsonSchema,
)]
pub struct Position {
    pub section: usize,
    pub question: usize,
}

impl Position {
    pub fn new(section: usize, question: usize) -> Self {
        Self { section, question }
    }
}

/// Result of advancing the navigator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Moved(Position),
    /// Already on the last question: the caller submits.
    Submit,
}

/// What to do when `next` is requested on an unanswered question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum NavigationPolicy {
    /// Refuse to advance until the answer is non-blank.
    #[default]
    Block,
    /// Store an empty answer and advance.
    AutoFill,
}

/// Section/question cursor over a fixed survey shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Navigator {
    sizes: Vec<usize>,
    position: Position,
}

impl Navigator {
    /// `sizes` lists the question count of each section. Empty sections are never entered.
    pub fn new(sizes: Vec<usize>) -> Self {
        Self {
            sizes,
            position: Position::default(),
        }
    }

    pub fn position(&self) -> Position {
        self.position
    }

    pub fn section_count(&self) -> usize {
        self.sizes.len()
    }

    pub fn section_len(&self, section: usize) -> usize {
        self.sizes.get(section).copied().unwrap_or(0)
    }

    fn following_section(&self, section: usize) -> Option<usize> {
        (section + 1..self.sizes.len()).find(|index| self.sizes[*index] > 0)
    }

    fn preceding_section(&self, section: usize) -> Option<usize> {
        (0..section).rev().find(|index| self.sizes[*index] > 0)
    }

    pub fn is_first(&self) -> bool {
        self.position.question == 0 && self.preceding_section(self.position.section).is_none()
    }

    pub fn is_last(&self) -> bool {
        self.position.question + 1 >= self.section_len(self.position.section)
            && self.following_section(self.position.section).is_none()
    }

    pub fn next(&mut self) -> Step {
        let Position { section, question } = self.position;
        if question + 1 < self.section_len(section) {
            self.position.question += 1;
        } else if let Some(following) = self.following_section(section) {
            self.position = Position::new(following, 0);
        } else {
            debug!(position = ?self.position, "navigator reached the end");
            return Step::Submit;
        }
        debug!(position = ?self.position, "navigator moved forward");
        Step::Moved(self.position)
    }

    /// Moves one question back. Returns `false` on the very first question.
    pub fn previous(&mut self) -> bool {
        let Position { section, question } = self.position;
        if question > 0 {
            self.position.question -= 1;
        } else if let Some(preceding) = self.preceding_section(section) {
            self.position = Position::new(preceding, self.section_len(preceding) - 1);
        } else {
            return false;
        }
        debug!(position = ?self.position, "navigator moved back");
        true
    }

    /// Jumps to `position` if it exists in this survey shape.
    pub fn jump_to(&mut self, position: Position) -> bool {
        if position.question < self.section_len(position.section) {
            self.position = position;
            true
        } else {
            false
        }
    }

    pub fn reset(&mut self) {
        self.position = Position::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_sections_are_skipped_both_ways() {
        let mut nav = Navigator::new(vec![1, 0, 1]);
        assert_eq!(nav.next(), Step::Moved(Position::new(2, 0)));
        assert!(nav.is_last());
        assert!(nav.previous());
        assert_eq!(nav.position(), Position::new(0, 0));
        assert!(nav.is_first());
    }
}
