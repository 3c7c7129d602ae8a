//! Shared error types for the services crate.

use std::path::PathBuf;

use thiserror::Error;

use quiz_core::model::ConfigError;
use quiz_core::{LoadError, ScoreError};

use crate::sessions::Screen;

/// Errors emitted while reading a question bank document.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SourceError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors emitted by session services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SessionError {
    #[error("no questions available for session")]
    Empty,
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Load(#[from] LoadError),
    #[error(transparent)]
    Score(#[from] ScoreError),
    #[error(transparent)]
    Source(#[from] SourceError),
}

/// Events that do not apply to the current state.
///
/// These are reported back to the caller and otherwise ignored; they never
/// change the machine.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum StateError {
    #[error("{event} is not available on the {screen} screen")]
    WrongScreen { event: &'static str, screen: Screen },
    #[error("no question bank loaded")]
    NoBank,
    #[error("no option selected")]
    NoSelection,
    #[error("option {index} is out of range for a question with {len} options")]
    OptionOutOfRange { index: usize, len: usize },
    #[error("review mode is not active")]
    NotReviewing,
}
