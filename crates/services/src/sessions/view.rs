use serde::Serialize;
use std::fmt;

use quiz_core::model::{Question, QuestionBank, Results, SessionConfig, SessionId};

use super::progress::SessionProgress;
use super::review::{ReviewItem, ReviewStatus};

/// Top-level screen of the quiz flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Screen {
    Welcome,
    Setup,
    Test,
    Results,
}

impl fmt::Display for Screen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Screen::Welcome => "welcome",
            Screen::Setup => "setup",
            Screen::Test => "test",
            Screen::Results => "results",
        };
        f.write_str(name)
    }
}

/// Presentation-agnostic snapshot of the machine.
///
/// Not formatted output: times are in seconds and indices are 0-based. The
/// UI decides how to render them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "screen", rename_all = "lowercase")]
pub enum ViewState {
    Welcome(WelcomeView),
    Setup(SetupView),
    Test(TestView),
    Results(ResultsView),
}

impl ViewState {
    #[must_use]
    pub fn screen(&self) -> Screen {
        match self {
            ViewState::Welcome(_) => Screen::Welcome,
            ViewState::Setup(_) => Screen::Setup,
            ViewState::Test(_) => Screen::Test,
            ViewState::Results(_) => Screen::Results,
        }
    }

    #[must_use]
    pub fn is_reviewing(&self) -> bool {
        matches!(self, ViewState::Results(results) if results.review.is_some())
    }
}

/// Title, description and size of a loaded bank.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BankSummary {
    pub title: String,
    pub description: String,
    pub question_count: usize,
}

impl BankSummary {
    #[must_use]
    pub fn from_bank(bank: &QuestionBank) -> Self {
        Self {
            title: bank.title().to_owned(),
            description: bank.description().to_owned(),
            question_count: bank.len(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WelcomeView {
    /// A bank kept from a cancelled setup, if any.
    pub bank: Option<BankSummary>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SetupView {
    pub bank: Option<BankSummary>,
    pub config: SessionConfig,
    /// Questions the current config would administer.
    pub expected_questions: usize,
    pub can_start: bool,
}

/// One cell of the question navigator grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct NavigatorCell {
    pub index: usize,
    pub answered: bool,
    pub current: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TestView {
    pub session_id: SessionId,
    pub title: String,
    pub index: usize,
    pub total: usize,
    pub question: Question,
    pub selection: Option<usize>,
    /// Confirming will update an earlier answer rather than record a new one.
    pub has_answered_current: bool,
    pub elapsed_secs: u64,
    pub progress: SessionProgress,
    pub navigator: Vec<NavigatorCell>,
}

impl TestView {
    #[must_use]
    pub fn answered(&self) -> usize {
        self.progress.answered
    }

    #[must_use]
    pub fn can_confirm(&self) -> bool {
        self.selection.is_some()
    }

    #[must_use]
    pub fn can_go_previous(&self) -> bool {
        self.index > 0
    }

    #[must_use]
    pub fn can_go_next(&self) -> bool {
        self.index + 1 < self.total
    }
}

/// Score plus how long the run took.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ResultsSummary {
    pub results: Results,
    pub duration_secs: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResultsView {
    pub session_id: SessionId,
    pub title: String,
    pub summary: ResultsSummary,
    pub statuses: Vec<ReviewStatus>,
    /// Present only while review mode is active.
    pub review: Option<ReviewItem>,
}
