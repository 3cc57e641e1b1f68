pub mod data;

use std::borrow::Cow;
use std::fmt;

use crate::language::{Language, Text};

/// Opaque label of one outcome class. The shipped dataset uses "a".."d",
/// but nothing here assumes a closed set.
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct CategoryTag(Cow<'static, str>);

impl CategoryTag {
    pub const fn from_static(tag: &'static str) -> Self {
        Self(Cow::Borrowed(tag))
    }

    pub fn new(tag: impl Into<String>) -> Self {
        Self(Cow::Owned(tag.into()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CategoryTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone)]
pub struct QuizOption {
    pub tag: CategoryTag,
    pub label: Text,
}

impl QuizOption {
    pub const fn new(tag: &'static str, en: &'static str, ar: &'static str) -> Self {
        Self {
            tag: CategoryTag::from_static(tag),
            label: Text::new(en, ar),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Question {
    pub text: Text,
    pub options: Vec<QuizOption>,
}

impl Question {
    pub fn new(text: Text, options: Vec<QuizOption>) -> Self {
        Self { text, options }
    }

    pub fn offers(&self, tag: &CategoryTag) -> bool {
        self.options.iter().any(|o| &o.tag == tag)
    }

    /// Finds the option whose label is `input` in either language.
    pub fn option_by_label(&self, input: &str) -> Option<&QuizOption> {
        self.options.iter().find(|o| o.label.matches(input))
    }
}

#[derive(Debug, Clone)]
pub struct ResultRecord {
    pub tag: CategoryTag,
    pub title: Text,
    pub description: Text,
    pub advice: Text,
}

/// One slot per question; `None` means unanswered.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct AnswerSet {
    slots: Vec<Option<CategoryTag>>,
}

impl AnswerSet {
    pub fn new(question_count: usize) -> Self {
        Self {
            slots: vec![None; question_count],
        }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&CategoryTag> {
        self.slots.get(index).and_then(|slot| slot.as_ref())
    }

    pub fn answered_count(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }

    pub fn first_unanswered(&self) -> Option<usize> {
        self.slots.iter().position(|slot| slot.is_none())
    }

    pub fn iter(&self) -> impl Iterator<Item = Option<&CategoryTag>> {
        self.slots.iter().map(|slot| slot.as_ref())
    }

    /// Marks every slot unanswered, keeping the length.
    pub fn clear(&mut self) {
        self.slots.iter_mut().for_each(|slot| *slot = None);
    }

    fn set(&mut self, index: usize, tag: CategoryTag) {
        let len = self.slots.len();
        match self.slots.get_mut(index) {
            Some(slot) => *slot = Some(tag),
            None => panic!("question index {} out of range (quiz has {} questions)", index, len),
        }
    }
}

impl FromIterator<Option<CategoryTag>> for AnswerSet {
    fn from_iter<I: IntoIterator<Item = Option<CategoryTag>>>(iter: I) -> Self {
        Self {
            slots: iter.into_iter().collect(),
        }
    }
}

/// The dominant category of an answer set together with its record.
#[derive(Debug, Clone)]
pub struct QuizOutcome {
    pub category: CategoryTag,
    pub record: ResultRecord,
}

impl QuizOutcome {
    /// The line a user shares after finishing the test.
    pub fn share_text(&self, language: Language) -> String {
        let title = self.record.title.pick(language);
        match language {
            Language::En => format!(
                "My Error 20 Self-Awareness Test Result: {}\n\nDownload the Error 20 app now!",
                title
            ),
            Language::Ar => format!(
                "نتيجة اختبار الوعي الذاتي من Error 20: {}\n\nحمّل تطبيق Error 20 الآن!",
                title
            ),
        }
    }
}

/// Returns the most frequent tag among the answered slots.
///
/// Ties go to the tag that was answered first: counts are kept in
/// first-seen order and only a strictly greater count replaces the leader.
pub fn dominant_category(answers: &AnswerSet) -> Option<CategoryTag> {
    let mut counts: Vec<(&CategoryTag, usize)> = Vec::new();
    for tag in answers.iter().flatten() {
        match counts.iter_mut().find(|(seen, _)| *seen == tag) {
            Some((_, count)) => *count += 1,
            None => counts.push((tag, 1)),
        }
    }

    let mut leader: Option<(&CategoryTag, usize)> = None;
    for (tag, count) in counts {
        if leader.map_or(true, |(_, max)| count > max) {
            leader = Some((tag, count));
        }
    }
    leader.map(|(tag, _)| tag.clone())
}

/// The fixed question bank and result table.
#[derive(Debug, Clone)]
pub struct QuizData {
    pub questions: Vec<Question>,
    pub results: Vec<ResultRecord>,
}

impl QuizData {
    pub fn new(questions: Vec<Question>, results: Vec<ResultRecord>) -> Self {
        Self { questions, results }
    }

    pub fn question_count(&self) -> usize {
        self.questions.len()
    }

    pub fn question(&self, index: usize) -> Option<&Question> {
        self.questions.get(index)
    }

    pub fn empty_answers(&self) -> AnswerSet {
        AnswerSet::new(self.questions.len())
    }

    pub fn result_for(&self, tag: &CategoryTag) -> Option<&ResultRecord> {
        self.results.iter().find(|r| &r.tag == tag)
    }

    /// Records `tag` as the answer to question `question_index`.
    ///
    /// Panics if the index is outside the question bank or the tag is not
    /// one of that question's options: both mean the caller and the
    /// dataset disagree.
    pub fn select_option(&self, answers: &mut AnswerSet, question_index: usize, tag: CategoryTag) {
        let question = self.questions.get(question_index).unwrap_or_else(|| {
            panic!(
                "question index {} out of range (quiz has {} questions)",
                question_index,
                self.questions.len()
            )
        });
        assert!(
            question.offers(&tag),
            "category '{}' is not an option of question {}",
            tag,
            question_index
        );
        answers.set(question_index, tag);
    }

    /// Tallies `answers` and resolves the winner to its result record.
    /// Returns `None` when nothing has been answered.
    pub fn compute_outcome(&self, answers: &AnswerSet) -> Option<QuizOutcome> {
        let category = dominant_category(answers)?;
        let record = self
            .result_for(&category)
            .unwrap_or_else(|| panic!("no result record for category '{}'", category))
            .clone();
        Some(QuizOutcome { category, record })
    }
}
