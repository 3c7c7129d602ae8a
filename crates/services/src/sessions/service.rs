use chrono::{DateTime, Utc};
use std::fmt;

use quiz_core::model::{Answer, AnswerSet, Question, QuestionList, Results, SessionId};
use quiz_core::{SessionClock, score};

use super::progress::SessionProgress;
use crate::error::{SessionError, StateError};

//
// ─── CONFIRM OUTCOME ───────────────────────────────────────────────────────────
//

/// What happened after an answer was confirmed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmOutcome {
    /// Moved on to the question at `index`.
    Advanced { index: usize },
    /// The last question was answered; the run should finish.
    LastAnswered,
}

//
// ─── TEST SESSION ──────────────────────────────────────────────────────────────
//

/// In-memory run over a fixed question list.
///
/// Holds the current position, the transient (unconfirmed) selection, the
/// confirmed answers and the session clock. The list is never empty, so the
/// current index always points at a question.
pub struct TestSession {
    id: SessionId,
    questions: QuestionList,
    current: usize,
    selection: Option<usize>,
    answers: AnswerSet,
    clock: SessionClock,
}

impl TestSession {
    /// Start a run over `questions`.
    ///
    /// `started_at` should come from the services layer clock to keep time deterministic.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Empty` if the list has no questions.
    pub fn start(questions: QuestionList, started_at: DateTime<Utc>) -> Result<Self, SessionError> {
        if questions.is_empty() {
            return Err(SessionError::Empty);
        }

        Ok(Self {
            id: SessionId::generate(),
            questions,
            current: 0,
            selection: None,
            answers: AnswerSet::new(),
            clock: SessionClock::start(started_at),
        })
    }

    #[must_use]
    pub fn id(&self) -> SessionId {
        self.id
    }

    #[must_use]
    pub fn questions(&self) -> &QuestionList {
        &self.questions
    }

    #[must_use]
    pub fn answers(&self) -> &AnswerSet {
        &self.answers
    }

    #[must_use]
    pub fn clock(&self) -> &SessionClock {
        &self.clock
    }

    #[must_use]
    pub fn current_index(&self) -> usize {
        self.current
    }

    #[must_use]
    pub fn current_question(&self) -> &Question {
        &self.questions.as_slice()[self.current]
    }

    /// The option picked on the current question but not yet confirmed.
    #[must_use]
    pub fn selection(&self) -> Option<usize> {
        self.selection
    }

    /// Whether the current question already has a confirmed answer, in which
    /// case confirming again updates it.
    #[must_use]
    pub fn has_answered_current(&self) -> bool {
        self.answers.contains(self.current_question().id())
    }

    #[must_use]
    pub fn total_questions(&self) -> usize {
        self.questions.len()
    }

    #[must_use]
    pub fn answered_count(&self) -> usize {
        self.answers.len()
    }

    #[must_use]
    pub fn progress(&self) -> SessionProgress {
        SessionProgress::new(self.total_questions(), self.answered_count())
    }

    #[must_use]
    pub fn elapsed_secs(&self, now: DateTime<Utc>) -> u64 {
        self.clock.elapsed_secs(now)
    }

    /// Pick an option on the current question without recording it.
    ///
    /// # Errors
    ///
    /// Returns `StateError::OptionOutOfRange` if the question has no such option.
    pub fn select_option(&mut self, index: usize) -> Result<(), StateError> {
        let len = self.current_question().option_count();
        if index >= len {
            return Err(StateError::OptionOutOfRange { index, len });
        }
        self.selection = Some(index);
        Ok(())
    }

    /// Record the selected option for the current question and advance.
    ///
    /// Re-confirming a question replaces its earlier answer.
    ///
    /// # Errors
    ///
    /// Returns `StateError::NoSelection` if nothing is selected.
    pub fn confirm_answer(&mut self) -> Result<ConfirmOutcome, StateError> {
        let Some(selected) = self.selection else {
            return Err(StateError::NoSelection);
        };
        let answer = Answer::for_question(self.current_question(), selected);
        let correct = answer.is_correct();
        let question_id = answer.question_id().clone();
        let replaced = self.answers.record(answer).is_some();
        tracing::debug!(
            session = %self.id,
            question = %question_id,
            selected,
            correct,
            replaced,
            "answer recorded"
        );
        self.selection = None;

        if self.questions.is_last(self.current) {
            return Ok(ConfirmOutcome::LastAnswered);
        }
        self.current += 1;
        Ok(ConfirmOutcome::Advanced {
            index: self.current,
        })
    }

    /// Jump to `target`, clamped into range.
    ///
    /// The selection is restored from an existing answer, or cleared.
    pub fn navigate(&mut self, target: usize) -> usize {
        let Some(index) = self.questions.clamp_index(target) else {
            return self.current;
        };
        self.current = index;
        self.selection = self
            .questions
            .get(index)
            .and_then(|q| self.answers.get(q.id()))
            .map(Answer::selected);
        index
    }

    /// Stop the clock and score the run.
    ///
    /// # Errors
    ///
    /// Propagates `SessionError::Score`; unreachable for a started session.
    pub fn finish(mut self, ended_at: DateTime<Utc>) -> Result<CompletedSession, SessionError> {
        let results = score(&self.questions, &self.answers)?;
        self.clock.stop(ended_at);
        Ok(CompletedSession {
            id: self.id,
            questions: self.questions,
            answers: self.answers,
            clock: self.clock,
            results,
        })
    }
}

impl fmt::Debug for TestSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TestSession")
            .field("id", &self.id)
            .field("questions_len", &self.questions.len())
            .field("current", &self.current)
            .field("selection", &self.selection)
            .field("answers_len", &self.answers.len())
            .field("clock", &self.clock)
            .finish()
    }
}

//
// ─── COMPLETED SESSION ─────────────────────────────────────────────────────────
//

/// A finished run: questions, answers, stopped clock and score.
#[derive(Debug, Clone)]
pub struct CompletedSession {
    id: SessionId,
    questions: QuestionList,
    answers: AnswerSet,
    clock: SessionClock,
    results: Results,
}

impl CompletedSession {
    #[must_use]
    pub fn id(&self) -> SessionId {
        self.id
    }

    #[must_use]
    pub fn questions(&self) -> &QuestionList {
        &self.questions
    }

    #[must_use]
    pub fn answers(&self) -> &AnswerSet {
        &self.answers
    }

    #[must_use]
    pub fn clock(&self) -> &SessionClock {
        &self.clock
    }

    #[must_use]
    pub fn results(&self) -> Results {
        self.results
    }

    #[must_use]
    pub fn duration_secs(&self) -> u64 {
        self.clock.duration_secs().unwrap_or(0)
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
