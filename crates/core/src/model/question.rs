use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::ids::QuestionId;

/// Minimum number of options a multiple-choice question must offer.
pub const MIN_OPTIONS: usize = 2;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuestionError {
    #[error("question {id} needs at least 2 options, found {found}")]
    TooFewOptions { id: QuestionId, found: usize },

    #[error("question {id} marks option {correct} as correct but only has {len} options")]
    CorrectOutOfRange {
        id: QuestionId,
        correct: usize,
        len: usize,
    },
}

//
// ─── QUESTION TYPES ────────────────────────────────────────────────────────────
//

/// Unvalidated question as it appears in an uploaded document.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct QuestionDraft {
    pub id: QuestionId,
    pub question: String,
    pub options: Vec<String>,
    pub correct: usize,
    #[serde(default)]
    pub explanation: Option<String>,
}

impl QuestionDraft {
    /// Check option count and correct-index bounds.
    ///
    /// # Errors
    ///
    /// Returns `QuestionError::TooFewOptions` or `QuestionError::CorrectOutOfRange`.
    pub fn validate(self) -> Result<Question, QuestionError> {
        let len = self.options.len();
        if len < MIN_OPTIONS {
            return Err(QuestionError::TooFewOptions {
                id: self.id,
                found: len,
            });
        }
        if self.correct >= len {
            return Err(QuestionError::CorrectOutOfRange {
                id: self.id,
                correct: self.correct,
                len,
            });
        }

        Ok(Question {
            id: self.id,
            prompt: self.question,
            options: self.options,
            correct: self.correct,
            explanation: self
                .explanation
                .filter(|text| !text.trim().is_empty()),
        })
    }
}

/// A validated multiple-choice question. Immutable once loaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Question {
    id: QuestionId,
    prompt: String,
    options: Vec<String>,
    correct: usize,
    explanation: Option<String>,
}

impl Question {
    /// Build a question directly from its parts.
    ///
    /// # Errors
    ///
    /// Same as [`QuestionDraft::validate`].
    pub fn new(
        id: impl Into<QuestionId>,
        prompt: impl Into<String>,
        options: Vec<String>,
        correct: usize,
        explanation: Option<String>,
    ) -> Result<Self, QuestionError> {
        QuestionDraft {
            id: id.into(),
            question: prompt.into(),
            options,
            correct,
            explanation,
        }
        .validate()
    }

    #[must_use]
    pub fn id(&self) -> &QuestionId {
        &self.id
    }

    #[must_use]
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    #[must_use]
    pub fn options(&self) -> &[String] {
        &self.options
    }

    #[must_use]
    pub fn option_count(&self) -> usize {
        self.options.len()
    }

    /// Index of the correct option (0-based).
    #[must_use]
    pub fn correct(&self) -> usize {
        self.correct
    }

    #[must_use]
    pub fn explanation(&self) -> Option<&str> {
        self.explanation.as_deref()
    }

    #[must_use]
    pub fn is_valid_option(&self, index: usize) -> bool {
        index < self.options.len()
    }

    #[must_use]
    pub fn is_correct(&self, selected: usize) -> bool {
        selected == self.correct
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
