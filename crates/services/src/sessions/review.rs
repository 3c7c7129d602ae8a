use serde::Serialize;

use quiz_core::model::{Answer, AnswerSet, Question, QuestionList};

/// How an option is shown in review.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum OptionMark {
    /// The question's correct option.
    CorrectOption,
    /// The user's pick, and it was wrong.
    WrongSelected,
    Neutral,
}

/// Overall outcome of one question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ReviewStatus {
    Correct,
    Incorrect,
    Unanswered,
}

impl ReviewStatus {
    #[must_use]
    pub fn of(answer: Option<&Answer>) -> Self {
        match answer {
            None => ReviewStatus::Unanswered,
            Some(a) if a.is_correct() => ReviewStatus::Correct,
            Some(_) => ReviewStatus::Incorrect,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnnotatedOption {
    pub index: usize,
    pub text: String,
    pub mark: OptionMark,
}

/// One question as presented in review mode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReviewItem {
    pub index: usize,
    pub total: usize,
    pub question: Question,
    pub answer: Option<Answer>,
    pub status: ReviewStatus,
    pub options: Vec<AnnotatedOption>,
}

/// Tag each option of `question` against the user's `answer`.
#[must_use]
pub fn annotate(question: &Question, answer: Option<&Answer>) -> Vec<AnnotatedOption> {
    let wrong_pick = answer.filter(|a| !a.is_correct()).map(Answer::selected);
    question
        .options()
        .iter()
        .enumerate()
        .map(|(index, text)| {
            let mark = if index == question.correct() {
                OptionMark::CorrectOption
            } else if wrong_pick == Some(index) {
                OptionMark::WrongSelected
            } else {
                OptionMark::Neutral
            };
            AnnotatedOption {
                index,
                text: text.clone(),
                mark,
            }
        })
        .collect()
}

/// Status of every question in list order.
#[must_use]
pub fn review_statuses(questions: &QuestionList, answers: &AnswerSet) -> Vec<ReviewStatus> {
    questions
        .iter()
        .map(|q| ReviewStatus::of(answers.get(q.id())))
        .collect()
}

/// Cursor over a finished question list, independent of the live session's position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReviewNavigator {
    index: usize,
    len: usize,
}

impl ReviewNavigator {
    #[must_use]
    pub fn new(len: usize) -> Self {
        Self { index: 0, len }
    }

    #[must_use]
    pub fn index(&self) -> usize {
        self.index
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Move to `target`, clamped into `[0, len - 1]`.
    pub fn navigate(&mut self, target: usize) -> usize {
        self.index = target.min(self.len.saturating_sub(1));
        self.index
    }

    pub fn next(&mut self) -> usize {
        self.navigate(self.index.saturating_add(1))
    }

    pub fn previous(&mut self) -> usize {
        self.navigate(self.index.saturating_sub(1))
    }

    /// Build the review item at the current position.
    #[must_use]
    pub fn item(&self, questions: &QuestionList, answers: &AnswerSet) -> Option<ReviewItem> {
        let question = questions.get(self.index)?;
        let answer = answers.get(question.id());
        Some(ReviewItem {
            index: self.index,
            total: questions.len(),
            question: question.clone(),
            answer: answer.cloned(),
            status: ReviewStatus::of(answer),
            options: annotate(question, answer),
        })
    }
}
