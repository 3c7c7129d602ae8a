use std::collections::HashMap;

use serde::Serialize;

use crate::model::ids::QuestionId;
use crate::model::question::Question;

//
// ─── ANSWER ────────────────────────────────────────────────────────────────────
//

/// A confirmed response to one question.
///
/// Correctness is derived when the answer is recorded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Answer {
    question_id: QuestionId,
    selected: usize,
    is_correct: bool,
}

impl Answer {
    #[must_use]
    pub fn for_question(question: &Question, selected: usize) -> Self {
        Self {
            question_id: question.id().clone(),
            selected,
            is_correct: question.is_correct(selected),
        }
    }

    #[must_use]
    pub fn question_id(&self) -> &QuestionId {
        &self.question_id
    }

    #[must_use]
    pub fn selected(&self) -> usize {
        self.selected
    }

    #[must_use]
    pub fn is_correct(&self) -> bool {
        self.is_correct
    }
}

//
// ─── ANSWER SET ────────────────────────────────────────────────────────────────
//

/// Responses keyed by question id; at most one per question.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnswerSet {
    answers: HashMap<QuestionId, Answer>,
}

impl AnswerSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the answer for its question. Returns the replaced answer.
    pub fn record(&mut self, answer: Answer) -> Option<Answer> {
        self.answers.insert(answer.question_id.clone(), answer)
    }

    #[must_use]
    pub fn get(&self, id: &QuestionId) -> Option<&Answer> {
        self.answers.get(id)
    }

    #[must_use]
    pub fn contains(&self, id: &QuestionId) -> bool {
        self.answers.contains_key(id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.answers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.answers.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Answer> {
        self.answers.values()
    }

    #[must_use]
    pub fn correct_count(&self) -> usize {
        self.answers.values().filter(|a| a.is_correct).count()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;

    fn question() -> Question {
        Question::new(7_i64, "Q", vec!["a".into(), "b".into(), "c".into()], 2, None).unwrap()
    }

    #[test]
    fn answer_derives_correctness() {
        let q = question();
        assert!(Answer::for_question(&q, 2).is_correct());
        assert!(!Answer::for_question(&q, 0).is_correct());
    }

    #[test]
    fn recording_twice_replaces() {
        let q = question();
        let mut set = AnswerSet::new();

        assert!(set.record(Answer::for_question(&q, 0)).is_none());
        let previous = set.record(Answer::for_question(&q, 2)).unwrap();

        assert_eq!(previous.selected(), 0);
        assert_eq!(set.len(), 1);
        let current = set.get(q.id()).unwrap();
        assert_eq!(current.selected(), 2);
        assert!(current.is_correct());
        assert_eq!(set.correct_count(), 1);
    }
}
