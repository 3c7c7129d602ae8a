mod plan;
mod progress;
mod review;
mod service;
mod view;
mod workflow;

// Public API of the session subsystem.
pub use crate::error::{SessionError, StateError};
pub use plan::{QuestionListBuilder, derive_question_list};
pub use progress::SessionProgress;
pub use review::{
    AnnotatedOption, OptionMark, ReviewItem, ReviewNavigator, ReviewStatus, annotate,
    review_statuses,
};
pub use service::{CompletedSession, ConfirmOutcome, TestSession};
pub use view::{
    BankSummary, NavigatorCell, ResultsSummary, ResultsView, Screen, SetupView, TestView,
    ViewState, WelcomeView,
};
pub use workflow::{Dispatch, QuizEvent, QuizMachine};
