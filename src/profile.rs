use crate::language::Language;
use crate::quiz::{AnswerSet, CategoryTag, QuizData, QuizOutcome};

/// Per-user state shared by the quiz and the assistant.
///
/// Lives only as long as the user's dialogue does; nothing is written to disk.
#[derive(Debug, Clone, Default)]
pub struct UserProfile {
    pub language: Language,
    pub answers: AnswerSet,
    pub last_category: Option<CategoryTag>,
}

impl UserProfile {
    pub fn new(language: Language, data: &QuizData) -> Self {
        Self {
            language,
            answers: data.empty_answers(),
            last_category: None,
        }
    }

    /// Clears the answers and forgets the last outcome.
    pub fn reset_quiz(&mut self, data: &QuizData) {
        self.answers = data.empty_answers();
        self.last_category = None;
    }

    /// Computes the outcome of the current answers and remembers its category.
    pub fn submit_quiz(&mut self, data: &QuizData) -> Option<QuizOutcome> {
        let outcome = data.compute_outcome(&self.answers);
        self.last_category = outcome.as_ref().map(|o| o.category.clone());
        outcome
    }

    pub fn last_outcome(&self, data: &QuizData) -> Option<QuizOutcome> {
        let category = self.last_category.clone()?;
        let record = data.result_for(&category)?.clone();
        Some(QuizOutcome { category, record })
    }
}
