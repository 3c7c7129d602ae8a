//! Parse and validate uploaded question bank documents.
//!
//! Expected shape:
//!
//! ```json
//! {
//!   "title": "Rust basics",
//!   "description": "Ownership and borrowing",
//!   "questions": [
//!     { "id": 1, "question": "...", "options": ["a", "b"], "correct": 0, "explanation": "..." }
//!   ]
//! }
//! ```
//!
//! Loading is all-or-nothing: a bank is returned only after every question has
//! been validated, so callers can swap it in atomically.

use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

use crate::model::{BankError, QuestionBank, QuestionDraft, QuestionError};

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

/// Coarse classification for presenting a load failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadErrorKind {
    Parse,
    Schema,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum LoadError {
    #[error("document is not well-formed JSON: {0}")]
    Parse(String),

    #[error(transparent)]
    Schema(#[from] SchemaError),
}

impl LoadError {
    #[must_use]
    pub fn kind(&self) -> LoadErrorKind {
        match self {
            LoadError::Parse(_) => LoadErrorKind::Parse,
            LoadError::Schema(_) => LoadErrorKind::Schema,
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SchemaError {
    #[error("document root must be an object")]
    NotAnObject,

    #[error("document has no \"questions\" field")]
    MissingQuestions,

    #[error("\"questions\" must be an array")]
    QuestionsNotArray,

    #[error("\"{field}\" must be text")]
    NotText { field: &'static str },

    #[error("question #{position} is malformed: {reason}")]
    MalformedQuestion { position: usize, reason: String },

    #[error("question #{position}: {source}")]
    InvalidQuestion {
        position: usize,
        #[source]
        source: QuestionError,
    },

    #[error(transparent)]
    Bank(#[from] BankError),
}

//
// ─── LOADER ────────────────────────────────────────────────────────────────────
//

/// Parse `content` into a validated [`QuestionBank`].
///
/// Question positions in errors are 1-based, matching how the questions are
/// numbered on screen.
///
/// # Errors
///
/// Returns `LoadError::Parse` for malformed JSON and `LoadError::Schema` when
/// the document does not describe a usable bank.
pub fn parse_bank(content: &str) -> Result<QuestionBank, LoadError> {
    let document: Value =
        serde_json::from_str(content).map_err(|e| LoadError::Parse(e.to_string()))?;

    let Value::Object(mut root) = document else {
        return Err(SchemaError::NotAnObject.into());
    };

    let raw_questions = match root.remove("questions") {
        None => return Err(SchemaError::MissingQuestions.into()),
        Some(Value::Array(items)) => items,
        Some(_) => return Err(SchemaError::QuestionsNotArray.into()),
    };

    let title = text_field(root.remove("title"), "title")?;
    let description = text_field(root.remove("description"), "description")?;

    let mut questions = Vec::with_capacity(raw_questions.len());
    for (offset, raw) in raw_questions.into_iter().enumerate() {
        let position = offset + 1;
        let draft = QuestionDraft::deserialize(raw).map_err(|e| {
            SchemaError::MalformedQuestion {
                position,
                reason: e.to_string(),
            }
        })?;
        let question = draft
            .validate()
            .map_err(|source| SchemaError::InvalidQuestion { position, source })?;
        questions.push(question);
    }

    let bank = QuestionBank::new(title, description, questions).map_err(SchemaError::from)?;
    tracing::debug!(title = bank.title(), questions = bank.len(), "parsed question bank");
    Ok(bank)
}

fn text_field(value: Option<Value>, field: &'static str) -> Result<String, SchemaError> {
    match value {
        None | Some(Value::Null) => Ok(String::new()),
        Some(Value::String(text)) => Ok(text),
        Some(_) => Err(SchemaError::NotText { field }),
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::QuestionId;

    const VALID: &str = r#"{
        "title": "Rust basics",
        "description": "Ownership",
        "questions": [
            { "id": 1, "question": "Borrow?", "options": ["yes", "no"], "correct": 0 },
            { "id": "two", "question": "Move?", "options": ["a", "b", "c"], "correct": 2,
              "explanation": "Because." }
        ]
    }"#;

    #[test]
    fn parses_valid_document() {
        let bank = parse_bank(VALID).unwrap();
        assert_eq!(bank.title(), "Rust basics");
        assert_eq!(bank.description(), "Ownership");
        assert_eq!(bank.len(), 2);

        let second = &bank.questions()[1];
        assert_eq!(second.id(), &QuestionId::text("two"));
        assert_eq!(second.correct(), 2);
        assert_eq!(second.explanation(), Some("Because."));
    }

    #[test]
    fn title_and_description_are_optional() {
        let bank = parse_bank(
            r#"{ "questions": [ { "id": 1, "question": "Q", "options": ["a", "b"], "correct": 1 } ] }"#,
        )
        .unwrap();
        assert_eq!(bank.title(), "");
        assert_eq!(bank.description(), "");
    }

    #[test]
    fn rejects_malformed_json() {
        let err = parse_bank("{ not json").unwrap_err();
        assert_eq!(err.kind(), LoadErrorKind::Parse);
    }

    #[test]
    fn rejects_missing_questions() {
        let err = parse_bank(r#"{ "title": "t" }"#).unwrap_err();
        assert_eq!(err, LoadError::Schema(SchemaError::MissingQuestions));
        assert_eq!(err.kind(), LoadErrorKind::Schema);
    }

    #[test]
    fn rejects_questions_that_are_not_an_array() {
        let err = parse_bank(r#"{ "questions": { "id": 1 } }"#).unwrap_err();
        assert_eq!(err, LoadError::Schema(SchemaError::QuestionsNotArray));
    }

    #[test]
    fn rejects_non_object_root() {
        let err = parse_bank("[1, 2, 3]").unwrap_err();
        assert_eq!(err, LoadError::Schema(SchemaError::NotAnObject));
    }

    #[test]
    fn rejects_empty_question_array() {
        let err = parse_bank(r#"{ "questions": [] }"#).unwrap_err();
        assert_eq!(err, LoadError::Schema(SchemaError::Bank(BankError::Empty)));
    }

    #[test]
    fn reports_position_of_malformed_question() {
        let err = parse_bank(
            r#"{ "questions": [
                { "id": 1, "question": "Q", "options": ["a", "b"], "correct": 0 },
                { "id": 2, "question": "Q", "options": ["a", "b"] }
            ] }"#,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            LoadError::Schema(SchemaError::MalformedQuestion { position: 2, .. })
        ));
    }

    #[test]
    fn rejects_negative_correct_index() {
        let err = parse_bank(
            r#"{ "questions": [ { "id": 1, "question": "Q", "options": ["a", "b"], "correct": -1 } ] }"#,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            LoadError::Schema(SchemaError::MalformedQuestion { position: 1, .. })
        ));
    }

    #[test]
    fn rejects_out_of_range_correct_index() {
        let err = parse_bank(
            r#"{ "questions": [ { "id": 1, "question": "Q", "options": ["a", "b"], "correct": 2 } ] }"#,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            LoadError::Schema(SchemaError::InvalidQuestion {
                position: 1,
                source: QuestionError::CorrectOutOfRange { .. }
            })
        ));
    }

    #[test]
    fn rejects_duplicate_ids() {
        let err = parse_bank(
            r#"{ "questions": [
                { "id": 1, "question": "Q", "options": ["a", "b"], "correct": 0 },
                { "id": 1, "question": "Q", "options": ["a", "b"], "correct": 1 }
            ] }"#,
        )
        .unwrap_err();
        assert_eq!(
            err,
            LoadError::Schema(SchemaError::Bank(BankError::DuplicateId(QuestionId::number(1))))
        );
    }

    #[test]
    fn rejects_non_text_title() {
        let err = parse_bank(
            r#"{ "title": 5, "questions": [ { "id": 1, "question": "Q", "options": ["a", "b"], "correct": 0 } ] }"#,
        )
        .unwrap_err();
        assert_eq!(
            err,
            LoadError::Schema(SchemaError::NotText { field: "title" })
        );
    }
}
