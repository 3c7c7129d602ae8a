use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::Serialize;

use quiz_core::model::QuestionBank;
use quiz_core::{LoadError, LoadErrorKind, parse_bank};

use crate::error::{SessionError, SourceError};

//
// ─── SOURCES ───────────────────────────────────────────────────────────────────
//

/// Somewhere a question bank document can be read from.
#[async_trait]
pub trait BankSource: Send + Sync {
    /// Human-readable name for logs.
    fn describe(&self) -> String;

    /// Read the whole document.
    ///
    /// # Errors
    ///
    /// Returns `SourceError` if the document cannot be read.
    async fn read_document(&self) -> Result<String, SourceError>;
}

/// Reads a document from the local filesystem.
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl BankSource for FileSource {
    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    async fn read_document(&self) -> Result<String, SourceError> {
        tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|source| SourceError::Read {
                path: self.path.clone(),
                source,
            })
    }
}

/// A document already held in memory, e.g. handed over by a file picker.
#[derive(Debug, Clone)]
pub struct InMemorySource {
    name: String,
    content: String,
}

impl InMemorySource {
    #[must_use]
    pub fn new(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
        }
    }
}

#[async_trait]
impl BankSource for InMemorySource {
    fn describe(&self) -> String {
        self.name.clone()
    }

    async fn read_document(&self) -> Result<String, SourceError> {
        Ok(self.content.clone())
    }
}

//
// ─── NOTICES ───────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum NoticeSeverity {
    Success,
    Error,
}

/// Toast-style message about a load attempt, for the UI to display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoadNotice {
    pub severity: NoticeSeverity,
    pub title: String,
    pub message: String,
}

impl LoadNotice {
    #[must_use]
    pub fn loaded(bank: &QuestionBank) -> Self {
        Self {
            severity: NoticeSeverity::Success,
            title: "Test loaded successfully!".to_owned(),
            message: format!("{} with {} questions", bank.title(), bank.len()),
        }
    }

    #[must_use]
    pub fn rejected(err: &LoadError) -> Self {
        let hint = match err.kind() {
            LoadErrorKind::Parse => "Please check your JSON file format",
            LoadErrorKind::Schema => "Please check the test structure",
        };
        Self {
            severity: NoticeSeverity::Error,
            title: "Error loading test".to_owned(),
            message: format!("{hint}: {err}"),
        }
    }

    /// Notice for any failure surfaced while uploading.
    #[must_use]
    pub fn from_error(err: &SessionError) -> Self {
        match err {
            SessionError::Load(load) => Self::rejected(load),
            other => Self {
                severity: NoticeSeverity::Error,
                title: "Error loading test".to_owned(),
                message: other.to_string(),
            },
        }
    }

    #[must_use]
    pub fn is_error(&self) -> bool {
        self.severity == NoticeSeverity::Error
    }
}

//
// ─── LOADING ───────────────────────────────────────────────────────────────────
//

/// Read and validate a bank from `source`.
///
/// # Errors
///
/// Returns `SessionError::Source` if reading fails and `SessionError::Load`
/// if the document is rejected.
pub async fn load_bank(source: &dyn BankSource) -> Result<QuestionBank, SessionError> {
    let content = source.read_document().await.inspect_err(|e| {
        tracing::warn!(source = %source.describe(), error = %e, "question bank unreadable");
    })?;
    let bank = parse_bank(&content).inspect_err(|e| {
        tracing::warn!(source = %source.describe(), error = %e, "question bank rejected");
    })?;
    tracing::info!(
        source = %source.describe(),
        title = bank.title(),
        questions = bank.len(),
        "question bank loaded"
    );
    Ok(bank)
}
