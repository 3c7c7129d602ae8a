use serde::{Deserialize, Serialize};
use thiserror::Error;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("starting at question {start_from} leaves nothing to ask from a bank of {bank_len}")]
    EmptyQuestionList { start_from: usize, bank_len: usize },
}

//
// ─── SESSION CONFIG ────────────────────────────────────────────────────────────
//

/// User-chosen parameters for deriving a question list from a bank.
///
/// `start_from` is 1-based. Defaults:
/// - 10 questions
/// - start from the first question
/// - keep the bank's order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionConfig {
    pub number_of_questions: usize,
    pub start_from: usize,
    pub randomize: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            number_of_questions: 10,
            start_from: 1,
            randomize: false,
        }
    }
}

impl SessionConfig {
    #[must_use]
    pub fn new(number_of_questions: usize, start_from: usize, randomize: bool) -> Self {
        Self {
            number_of_questions,
            start_from,
            randomize,
        }
    }

    /// Clamp count and offset into `[1, bank_len]`.
    ///
    /// A `bank_len` of zero only enforces the lower bound.
    #[must_use]
    pub fn clamped(self, bank_len: usize) -> Self {
        let bound = |n: usize| {
            if bank_len == 0 {
                n.max(1)
            } else {
                n.clamp(1, bank_len)
            }
        };
        Self {
            number_of_questions: bound(self.number_of_questions),
            start_from: bound(self.start_from),
            randomize: self.randomize,
        }
    }

    /// Apply a partial update, then clamp against `bank_len` if a bank is loaded.
    #[must_use]
    pub fn patched(self, patch: ConfigPatch, bank_len: Option<usize>) -> Self {
        let next = Self {
            number_of_questions: patch
                .number_of_questions
                .unwrap_or(self.number_of_questions),
            start_from: patch.start_from.unwrap_or(self.start_from),
            randomize: patch.randomize.unwrap_or(self.randomize),
        };
        next.clamped(bank_len.unwrap_or(0))
    }

    /// Number of questions a session would administer from a bank of `bank_len`.
    #[must_use]
    pub fn expected_len(&self, bank_len: usize) -> usize {
        let available = bank_len.saturating_sub(self.start_from.saturating_sub(1));
        self.number_of_questions.min(available)
    }
}

/// Partial config update; `None` keeps the current value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigPatch {
    pub number_of_questions: Option<usize>,
    pub start_from: Option<usize>,
    pub randomize: Option<bool>,
}

impl ConfigPatch {
    #[must_use]
    pub fn number_of_questions(value: usize) -> Self {
        Self {
            number_of_questions: Some(value),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn start_from(value: usize) -> Self {
        Self {
            start_from: Some(value),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn randomize(value: bool) -> Self {
        Self {
            randomize: Some(value),
            ..Self::default()
        }
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
